//! Block Registry - maps block-type names to handlers
//!
//! The registry is built from two inputs:
//! - the category manifests, which declare which block types exist and the
//!   category each belongs to
//! - the built-in category modules, which supply the handler functions
//!
//! Construction never fails. A manifest category with no module, or a block
//! name with no handler, is logged and recorded in the [`RegistryReport`];
//! the rest of the registry stays usable. A registry is immutable once built;
//! the server reloads by building a new one and swapping it in.

use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

use crate::categories::{builtin_modules, BlockCategory, CategoryModule};
use crate::core::block::{BlockError, BlockHandler};
use crate::core::manifest::{ManifestFailure, ManifestSet};

/// Block names that collide with reserved words and the handler symbol
/// that implements each.
pub const RESERVED_ALIASES: &[(&str, &str)] = &[("if", "if_block"), ("while", "while_block")];

/// Handler symbol for a block type.
///
/// # Example
/// ```
/// use macro_agent::core::registry::handler_symbol;
///
/// assert_eq!(handler_symbol("if"), "if_block");
/// assert_eq!(handler_symbol("press_key"), "press_key");
/// ```
pub fn handler_symbol(block_type: &str) -> &str {
    RESERVED_ALIASES
        .iter()
        .find(|(name, _)| *name == block_type)
        .map(|(_, symbol)| *symbol)
        .unwrap_or(block_type)
}

/// How a registered block type resolved at build time
#[derive(Debug, Clone)]
pub enum Binding {
    /// A handler was found
    Bound(Arc<BlockHandler>),
    /// The manifest's category has no handler module
    MissingModule,
    /// The module exists but has no function with this symbol
    MissingHandler { symbol: String },
}

/// One block type known to the registry
#[derive(Debug, Clone)]
pub struct RegistryEntry {
    pub block_type: String,
    pub category: BlockCategory,
    pub binding: Binding,
}

impl RegistryEntry {
    /// The bound handler, or an [`BlockError::Unresolved`] naming what is
    /// missing.
    pub fn handler(&self) -> Result<&Arc<BlockHandler>, BlockError> {
        match &self.binding {
            Binding::Bound(handler) => Ok(handler),
            Binding::MissingModule => Err(BlockError::Unresolved {
                block_type: self.block_type.clone(),
                reason: format!("no handler module for category '{}'", self.category),
            }),
            Binding::MissingHandler { symbol } => Err(BlockError::Unresolved {
                block_type: self.block_type.clone(),
                reason: format!("category '{}' has no handler '{}'", self.category, symbol),
            }),
        }
    }

    pub fn is_bound(&self) -> bool {
        matches!(self.binding, Binding::Bound(_))
    }
}

/// A block type that is registered but has no handler
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnresolvedBlock {
    pub block_type: String,
    pub category: String,
    pub reason: String,
}

/// A block type declared by more than one manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockConflict {
    pub block_type: String,
    /// Category that owns the name (first in file-name order)
    pub kept: String,
    /// Category whose declaration was ignored
    pub ignored: String,
}

/// Summary of one registry build
#[derive(Debug, Clone, Default, Serialize)]
pub struct RegistryReport {
    pub categories_loaded: usize,
    pub blocks_loaded: usize,
    pub bound: usize,
    pub unresolved: Vec<UnresolvedBlock>,
    pub conflicts: Vec<BlockConflict>,
    pub manifest_failures: Vec<ManifestFailure>,
}

impl RegistryReport {
    /// True when every declared block has a handler and every manifest loaded.
    pub fn is_clean(&self) -> bool {
        self.unresolved.is_empty() && self.conflicts.is_empty() && self.manifest_failures.is_empty()
    }
}

/// Block-type lookup table
///
/// Lookups are O(1). The registry is cheap to share behind an `Arc`.
#[derive(Debug, Clone, Default)]
pub struct BlockRegistry {
    entries: HashMap<String, RegistryEntry>,
    report: RegistryReport,
}

impl BlockRegistry {
    /// Build a registry from loaded manifests and handler modules.
    ///
    /// # Arguments
    /// * `manifests` - Category manifests, in file-name order
    /// * `modules` - Handler modules available to bind against
    ///
    /// # Returns
    /// The registry. Problems are reported through [`BlockRegistry::report`]
    /// rather than as an error.
    pub fn build(manifests: &ManifestSet, modules: &[CategoryModule]) -> Self {
        let modules: HashMap<&str, &CategoryModule> =
            modules.iter().map(|m| (m.category.name(), m)).collect();

        let mut entries: HashMap<String, RegistryEntry> = HashMap::new();
        let mut report = RegistryReport {
            categories_loaded: manifests.manifests.len(),
            manifest_failures: manifests.failures.clone(),
            ..RegistryReport::default()
        };

        for manifest in &manifests.manifests {
            let category = BlockCategory::from_name(&manifest.name);
            let module = modules.get(manifest.name.as_str()).copied();
            if module.is_none() {
                warn!(category = %manifest.name, "no handler module for manifest category");
            }

            for block in &manifest.blocks {
                if block.name.is_empty() {
                    warn!(category = %manifest.name, "skipping manifest entry without a name");
                    continue;
                }

                if let Some(existing) = entries.get(&block.name) {
                    warn!(
                        block_type = %block.name,
                        kept = %existing.category,
                        ignored = %category,
                        "block type declared twice"
                    );
                    report.conflicts.push(BlockConflict {
                        block_type: block.name.clone(),
                        kept: existing.category.to_string(),
                        ignored: category.to_string(),
                    });
                    continue;
                }

                let binding = match module {
                    None => Binding::MissingModule,
                    Some(module) => {
                        let symbol = handler_symbol(&block.name);
                        match module.handler(symbol) {
                            Some(handler) => Binding::Bound(handler.clone()),
                            None => {
                                warn!(block_type = %block.name, category = %category, symbol, "handler not found");
                                Binding::MissingHandler {
                                    symbol: symbol.to_string(),
                                }
                            }
                        }
                    }
                };

                let entry = RegistryEntry {
                    block_type: block.name.clone(),
                    category: category.clone(),
                    binding,
                };
                match entry.handler() {
                    Ok(_) => report.bound += 1,
                    Err(error) => report.unresolved.push(UnresolvedBlock {
                        block_type: block.name.clone(),
                        category: category.to_string(),
                        reason: error.to_string(),
                    }),
                }
                entries.insert(block.name.clone(), entry);
            }
        }

        report.blocks_loaded = entries.len();
        report.unresolved.sort_by(|a, b| a.block_type.cmp(&b.block_type));
        info!(
            categories = report.categories_loaded,
            blocks = report.blocks_loaded,
            unresolved = report.unresolved.len(),
            "block registry built"
        );

        Self { entries, report }
    }

    /// Build against the handler modules compiled into the agent.
    pub fn with_builtin_modules(manifests: &ManifestSet) -> Self {
        Self::build(manifests, &builtin_modules())
    }

    /// Look up a block type
    ///
    /// # Returns
    /// `None` when no manifest declares the type.
    pub fn lookup(&self, block_type: &str) -> Option<&RegistryEntry> {
        self.entries.get(block_type)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn report(&self) -> &RegistryReport {
        &self.report
    }

    /// Registered block types, sorted.
    pub fn block_types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        types.sort_unstable();
        types
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::block::{BlockOutput, HandlerContext};
    use crate::core::manifest::CategoryManifest;
    use crate::core::parameter::{ParameterBag, ResolvedParams};

    fn echo(_ctx: &HandlerContext, _params: &ResolvedParams) -> Result<BlockOutput, BlockError> {
        Ok("echo".into())
    }

    fn test_modules() -> Vec<CategoryModule> {
        vec![CategoryModule::new(
            BlockCategory::Control,
            vec![
                BlockHandler::new("start", echo),
                BlockHandler::new("if_block", echo),
            ],
        )]
    }

    #[test]
    fn test_handler_symbol_aliases() {
        assert_eq!(handler_symbol("if"), "if_block");
        assert_eq!(handler_symbol("while"), "while_block");
        assert_eq!(handler_symbol("wait"), "wait");
    }

    #[test]
    fn test_build_binds_handlers() {
        let manifests = ManifestSet::new(vec![CategoryManifest::new("control", &["start", "if"])]);
        let registry = BlockRegistry::build(&manifests, &test_modules());

        assert_eq!(registry.len(), 2);
        let entry = registry.lookup("if").unwrap();
        assert!(entry.is_bound());
        assert_eq!(entry.category, BlockCategory::Control);

        let out = entry
            .handler()
            .unwrap()
            .invoke(&HandlerContext::simulated(), &ParameterBag::new())
            .unwrap();
        assert_eq!(out, BlockOutput::Text("echo".into()));
        assert!(registry.report().is_clean());
    }

    #[test]
    fn test_partial_failure_keeps_other_blocks() {
        let manifests = ManifestSet::new(vec![
            CategoryManifest::new("control", &["start", "teleport"]),
            CategoryManifest::new("web&apps", &["open_url"]),
        ]);
        let registry = BlockRegistry::build(&manifests, &test_modules());

        assert_eq!(registry.len(), 3);
        assert!(registry.lookup("start").unwrap().is_bound());

        let missing_handler = registry.lookup("teleport").unwrap();
        assert!(matches!(
            missing_handler.binding,
            Binding::MissingHandler { ref symbol } if symbol == "teleport"
        ));
        assert!(matches!(
            missing_handler.handler(),
            Err(BlockError::Unresolved { .. })
        ));

        let missing_module = registry.lookup("open_url").unwrap();
        assert!(matches!(missing_module.binding, Binding::MissingModule));

        let report = registry.report();
        assert_eq!(report.bound, 1);
        let unresolved: Vec<_> = report.unresolved.iter().map(|u| u.block_type.as_str()).collect();
        assert_eq!(unresolved, vec!["open_url", "teleport"]);
    }

    #[test]
    fn test_first_manifest_wins() {
        let manifests = ManifestSet::new(vec![
            CategoryManifest::new("control", &["start"]),
            CategoryManifest::new("console", &["start"]),
        ]);
        let registry = BlockRegistry::build(&manifests, &test_modules());

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.lookup("start").unwrap().category, BlockCategory::Control);
        assert_eq!(
            registry.report().conflicts,
            vec![BlockConflict {
                block_type: "start".into(),
                kept: "control".into(),
                ignored: "console".into(),
            }]
        );
    }

    #[test]
    fn test_unnamed_entries_skipped() {
        let manifests = ManifestSet::new(vec![CategoryManifest::new("control", &["", "start"])]);
        let registry = BlockRegistry::build(&manifests, &test_modules());
        assert_eq!(registry.block_types(), vec!["start"]);
    }

    #[test]
    fn test_build_is_deterministic() {
        let manifests = ManifestSet::embedded();
        let a = BlockRegistry::with_builtin_modules(&manifests);
        let b = BlockRegistry::with_builtin_modules(&manifests);
        assert_eq!(a.block_types(), b.block_types());
        assert_eq!(a.report().bound, b.report().bound);
    }

    #[test]
    fn test_embedded_manifests_fully_bound() {
        let registry = BlockRegistry::with_builtin_modules(&ManifestSet::embedded());
        let report = registry.report();
        assert!(report.is_clean(), "{:?}", report);
        assert_eq!(report.categories_loaded, 7);
        assert_eq!(report.bound, registry.len());
        assert!(registry.lookup("while").unwrap().is_bound());
        assert!(registry.lookup("type_string").unwrap().is_bound());
    }
}
