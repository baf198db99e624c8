//! Block categories and their handler modules
//!
//! Each category module exposes its handlers by symbol name. Manifests refer
//! to categories by name; [`builtin_modules`] is the full set this agent can
//! bind to.

pub mod computer;
pub mod console;
pub mod control;
pub mod keyboard;
pub mod mouse;
pub mod operators;
pub mod variables;

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::core::block::{BlockError, BlockHandler};
use crate::core::parameter::ResolvedParams;

/// Block category enumeration
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum BlockCategory {
    /// Console output blocks
    Console,
    /// Control flow and timing blocks
    Control,
    /// Arithmetic, logic and text operators
    Operators,
    /// Variable blocks (run by the editor itself)
    Variables,
    /// Keyboard input blocks
    Keyboard,
    /// Mouse input blocks
    Mouse,
    /// System blocks such as volume
    Computer,
    /// A manifest category this agent has no module for
    Custom(String),
}

impl BlockCategory {
    /// Name used in manifests
    pub fn name(&self) -> &str {
        match self {
            BlockCategory::Console => "console",
            BlockCategory::Control => "control",
            BlockCategory::Operators => "operators",
            BlockCategory::Variables => "variables",
            BlockCategory::Keyboard => "keyboard",
            BlockCategory::Mouse => "mouse",
            BlockCategory::Computer => "computer",
            BlockCategory::Custom(name) => name,
        }
    }

    pub fn from_name(name: &str) -> Self {
        match name {
            "console" => BlockCategory::Console,
            "control" => BlockCategory::Control,
            "operators" => BlockCategory::Operators,
            "variables" => BlockCategory::Variables,
            "keyboard" => BlockCategory::Keyboard,
            "mouse" => BlockCategory::Mouse,
            "computer" => BlockCategory::Computer,
            other => BlockCategory::Custom(other.to_string()),
        }
    }
}

impl std::fmt::Display for BlockCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl From<BlockCategory> for String {
    fn from(category: BlockCategory) -> Self {
        category.name().to_string()
    }
}

impl From<String> for BlockCategory {
    fn from(name: String) -> Self {
        BlockCategory::from_name(&name)
    }
}

/// A category's handlers, keyed by symbol.
#[derive(Debug, Clone)]
pub struct CategoryModule {
    pub category: BlockCategory,
    pub handlers: Vec<Arc<BlockHandler>>,
}

impl CategoryModule {
    pub fn new(category: BlockCategory, handlers: Vec<BlockHandler>) -> Self {
        Self {
            category,
            handlers: handlers.into_iter().map(Arc::new).collect(),
        }
    }

    pub fn handler(&self, symbol: &str) -> Option<&Arc<BlockHandler>> {
        self.handlers.iter().find(|h| h.symbol() == symbol)
    }
}

/// Every handler module compiled into the agent.
pub fn builtin_modules() -> Vec<CategoryModule> {
    vec![
        console::module(),
        control::module(),
        operators::module(),
        variables::module(),
        keyboard::module(),
        mouse::module(),
        computer::module(),
    ]
}

/// Longest wait or hold a single block may request.
pub const MAX_BLOCK_DURATION: Duration = Duration::from_secs(60 * 60);

/// Read a duration in seconds, rejecting negative, non-finite and
/// over-long values.
pub(crate) fn seconds(params: &ResolvedParams, id: &str) -> Result<(f64, Duration), BlockError> {
    let secs = params.number(id)?;
    let invalid = |reason: &str| BlockError::InvalidParameter {
        name: id.to_string(),
        reason: reason.to_string(),
    };
    if !secs.is_finite() || secs < 0.0 {
        return Err(invalid("duration must be a non-negative number of seconds"));
    }
    let duration = Duration::from_secs_f64(secs);
    if duration > MAX_BLOCK_DURATION {
        return Err(invalid("duration is longer than one hour"));
    }
    Ok((secs, duration))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::parameter::{Parameter, ParameterBag};

    #[test]
    fn test_category_names_round_trip() {
        for module in builtin_modules() {
            let name = module.category.name().to_string();
            assert_eq!(BlockCategory::from_name(&name), module.category);
        }
        assert_eq!(
            BlockCategory::from_name("web&apps"),
            BlockCategory::Custom("web&apps".into())
        );
    }

    #[test]
    fn test_symbols_unique_within_module() {
        for module in builtin_modules() {
            let mut symbols: Vec<_> = module.handlers.iter().map(|h| h.symbol()).collect();
            let before = symbols.len();
            symbols.sort_unstable();
            symbols.dedup();
            assert_eq!(before, symbols.len(), "duplicate symbol in {}", module.category);
        }
    }

    #[test]
    fn test_seconds_validation() {
        let schema = [Parameter::number("duration", 1.0)];
        let resolve = |raw: &str| {
            let bag = ParameterBag::new().with("duration", raw);
            ResolvedParams::resolve(&schema, &bag).unwrap()
        };

        let (secs, duration) = seconds(&resolve("0.25"), "duration").unwrap();
        assert_eq!(secs, 0.25);
        assert_eq!(duration, Duration::from_millis(250));

        assert!(seconds(&resolve("-1"), "duration").is_err());
        assert!(seconds(&resolve("inf"), "duration").is_err());
        assert!(seconds(&resolve("7200"), "duration").is_err());
    }
}
