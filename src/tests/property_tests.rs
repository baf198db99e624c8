//! Property-based tests using proptest.
//!
//! Invariants that must hold for any input: sequence shape and isolation,
//! parameter coercion, number formatting.

use proptest::prelude::*;

use super::support::Harness;
use crate::core::block::BlockOutput;
use crate::core::format::fmt_float;
use crate::core::parameter::{Parameter, ParameterBag, ResolvedParams};
use crate::runtime::{BlockInvocation, SequenceExecutor};

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

/// Block types that run instantly: known, unknown, client-side and failing.
fn block_type() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("start".to_string()),
        Just("join".to_string()),
        Just("length".to_string()),
        Just("repeat".to_string()),
        Just("operator_add".to_string()),
        "[a-z]{3,10}_unknown",
    ]
}

fn invocation() -> impl Strategy<Value = BlockInvocation> {
    (block_type(), proptest::option::of("[a-z0-9]{1,8}"), any::<bool>()).prop_map(
        |(block_type, id, bad_params)| {
            let params = if bad_params {
                // Wrong type for `times` makes `repeat` fail.
                ParameterBag::new().with("times", "lots").with("text", "abc")
            } else {
                ParameterBag::new().with("times", 2i64).with("text", "abc")
            };
            BlockInvocation {
                block_type,
                id,
                params,
            }
        },
    )
}

// ---------------------------------------------------------------------------
// Sequence Properties
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// One outcome per block, in input order, each tagged with its block's id.
    #[test]
    fn sequence_preserves_length_and_order(blocks in proptest::collection::vec(invocation(), 0..20)) {
        let h = Harness::builtin();
        let outcomes = SequenceExecutor::new(&h.executor).run(&blocks);

        prop_assert_eq!(outcomes.len(), blocks.len());
        for (block, outcome) in blocks.iter().zip(&outcomes) {
            prop_assert_eq!(&outcome.block_id, &block.id);
            prop_assert!(outcome.success == outcome.error.is_none());
            prop_assert!(outcome.success == outcome.result.is_some());
        }
    }

    /// A block's outcome does not depend on what ran before it.
    #[test]
    fn sequence_items_are_isolated(blocks in proptest::collection::vec(invocation(), 1..12)) {
        let h = Harness::builtin();
        let in_sequence = SequenceExecutor::new(&h.executor).run(&blocks);

        for (block, outcome) in blocks.iter().zip(&in_sequence) {
            let alone = Harness::builtin().executor.execute_invocation(block);
            prop_assert_eq!(&alone.success, &outcome.success);
            prop_assert_eq!(&alone.result, &outcome.result);
            prop_assert_eq!(&alone.error, &outcome.error);
        }
    }

    /// Unregistered types never succeed unless they are client-side operators.
    #[test]
    fn unknown_types_fail_softly(name in "zz[a-z]{0,10}_unknown") {
        let h = Harness::builtin();
        let outcome = h.executor.execute(&name, &ParameterBag::new());
        prop_assert!(!outcome.success);
        prop_assert_eq!(outcome.error, Some(format!("Unknown block type: {}", name)));
    }
}

// ---------------------------------------------------------------------------
// Parameter Properties
// ---------------------------------------------------------------------------

proptest! {
    /// Integers sent as text or JSON numbers resolve to the same value.
    #[test]
    fn integer_text_and_number_agree(n in -1_000_000i64..1_000_000) {
        let schema = [Parameter::integer("times", 1)];
        let from_text = ResolvedParams::resolve(&schema, &ParameterBag::new().with("times", n.to_string())).unwrap();
        let from_number = ResolvedParams::resolve(&schema, &ParameterBag::new().with("times", n)).unwrap();
        prop_assert_eq!(from_text.integer("times").unwrap(), n);
        prop_assert_eq!(from_number.integer("times").unwrap(), n);
    }

    /// Text parameters are passed through untouched.
    #[test]
    fn text_is_never_altered(text in "\\PC*") {
        let schema = [Parameter::string("text", "")];
        let resolved = ResolvedParams::resolve(&schema, &ParameterBag::new().with("text", text.clone())).unwrap();
        prop_assert_eq!(resolved.text("text").unwrap(), text.as_str());
    }

    /// Float formatting reads back as the same number.
    #[test]
    fn fmt_float_round_trips(x in proptest::num::f64::NORMAL | proptest::num::f64::ZERO) {
        let text = fmt_float(x);
        prop_assert_eq!(text.parse::<f64>().unwrap(), x);
    }

    /// `length` counts characters, not bytes.
    #[test]
    fn length_counts_chars(text in "\\PC{0,40}") {
        let h = Harness::builtin();
        let outcome = h.executor.execute("length", &ParameterBag::new().with("text", text.clone()));
        prop_assert_eq!(outcome.result, Some(BlockOutput::Integer(text.chars().count() as i64)));
    }
}
