//! Sequence execution: order, isolation, tagging

use serde_json::json;

use super::support::Harness;
use crate::core::block::BlockOutput;
use crate::core::parameter::ParameterBag;
use crate::devices::InputAction;
use crate::runtime::{BlockInvocation, SequenceExecutor};

fn invocation(value: serde_json::Value) -> BlockInvocation {
    serde_json::from_value(value).unwrap()
}

#[test]
fn test_outcomes_follow_input_order() {
    let h = Harness::builtin();
    let blocks = vec![
        invocation(json!({"type": "start", "id": "a"})),
        invocation(json!({"type": "move", "id": "b", "params": {"X": 10, "Y": 20}})),
        invocation(json!({"type": "join", "id": "c", "params": {"text1": "ab", "text2": "cd"}})),
    ];

    let outcomes = SequenceExecutor::new(&h.executor).run(&blocks);
    let ids: Vec<_> = outcomes.iter().map(|o| o.block_id.as_deref()).collect();
    assert_eq!(ids, vec![Some("a"), Some("b"), Some("c")]);
    assert!(outcomes.iter().all(|o| o.success));
    assert_eq!(outcomes[2].result, Some(BlockOutput::Text("abcd".into())));
}

#[test]
fn test_failure_does_not_stop_later_blocks() {
    let h = Harness::builtin();
    let blocks = vec![
        invocation(json!({"type": "teleport", "id": "1"})),
        invocation(json!({"type": "value", "id": "2", "params": {"value1": 1, "operator": "mod", "value2": 0}})),
        invocation(json!({"type": "move", "id": "3", "params": {"x": 5, "y": 6}})),
    ];

    let outcomes = SequenceExecutor::new(&h.executor).run(&blocks);
    assert_eq!(outcomes.len(), 3);
    assert_eq!(outcomes[0].error.as_deref(), Some("Unknown block type: teleport"));
    assert_eq!(
        outcomes[1].error.as_deref(),
        Some("Error executing value: modulo by zero")
    );
    assert!(outcomes[2].success);
    assert_eq!(h.driver.actions(), vec![InputAction::MoveTo(5, 6)]);
}

#[test]
fn test_blocks_without_ids() {
    let h = Harness::builtin();
    let blocks = vec![BlockInvocation::new("start", ParameterBag::new())];
    let outcomes = SequenceExecutor::new(&h.executor).run(&blocks);
    assert_eq!(outcomes[0].block_id, None);
}

#[test]
fn test_empty_sequence() {
    let h = Harness::builtin();
    assert!(SequenceExecutor::new(&h.executor).run(&[]).is_empty());
}

#[test]
fn test_side_effects_happen_in_order() {
    let h = Harness::builtin();
    let blocks: Vec<_> = (0..5)
        .map(|i| {
            BlockInvocation::new("move", ParameterBag::new().with("X", i as i64).with("Y", 0i64))
                .with_id(format!("m{}", i))
        })
        .collect();

    SequenceExecutor::new(&h.executor).run(&blocks);
    let expected: Vec<_> = (0..5).map(|i| InputAction::MoveTo(i, 0)).collect();
    assert_eq!(h.driver.actions(), expected);
}
