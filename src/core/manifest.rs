//! Block manifests
//!
//! A manifest is one JSON document per category:
//!
//! ```json
//! { "name": "keyboard", "colour": "#9966FF", "blocks": [ { "name": "press_key", ... } ] }
//! ```
//!
//! Only `name` and each block's `name` matter to dispatch. Every other key
//! (colour, state, editor definitions) is kept as loaded and handed back to
//! the editor through `GET /blocks`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Manifests compiled into the binary, in file-name order.
const EMBEDDED: &[(&str, &str)] = &[
    ("computer.json", include_str!("../../blocks/computer.json")),
    ("console.json", include_str!("../../blocks/console.json")),
    ("control.json", include_str!("../../blocks/control.json")),
    ("keyboard.json", include_str!("../../blocks/keyboard.json")),
    ("mouse.json", include_str!("../../blocks/mouse.json")),
    ("operators.json", include_str!("../../blocks/operators.json")),
    ("variables.json", include_str!("../../blocks/variables.json")),
];

/// One category document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryManifest {
    pub name: String,
    #[serde(default)]
    pub blocks: Vec<BlockManifestEntry>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One block definition inside a category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockManifestEntry {
    #[serde(default)]
    pub name: String,
    #[serde(flatten)]
    pub definition: Map<String, Value>,
}

impl BlockManifestEntry {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            definition: Map::new(),
        }
    }
}

impl CategoryManifest {
    pub fn new(name: impl Into<String>, blocks: &[&str]) -> Self {
        Self {
            name: name.into(),
            blocks: blocks.iter().copied().map(BlockManifestEntry::new).collect(),
            extra: Map::new(),
        }
    }

    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

/// A manifest file that could not be used.
#[derive(Debug, Clone, Serialize)]
pub struct ManifestFailure {
    pub file: String,
    pub error: String,
}

/// Where manifests are read from; kept so the agent can reload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestSource {
    Directory(PathBuf),
    Embedded,
}

impl ManifestSource {
    pub fn load(&self) -> Result<ManifestSet, ManifestError> {
        match self {
            ManifestSource::Directory(dir) => ManifestSet::load_dir(dir),
            ManifestSource::Embedded => Ok(ManifestSet::embedded()),
        }
    }
}

impl std::fmt::Display for ManifestSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ManifestSource::Directory(dir) => write!(f, "{}", dir.display()),
            ManifestSource::Embedded => f.write_str("<embedded>"),
        }
    }
}

/// All manifests from one load, plus the files that were skipped.
#[derive(Debug, Clone, Default)]
pub struct ManifestSet {
    pub manifests: Vec<CategoryManifest>,
    pub failures: Vec<ManifestFailure>,
}

impl ManifestSet {
    pub fn new(manifests: Vec<CategoryManifest>) -> Self {
        Self {
            manifests,
            failures: Vec::new(),
        }
    }

    /// Read every `*.json` file in `dir`, in file-name order.
    ///
    /// Only an unreadable directory is an error. A file that cannot be read
    /// or parsed is logged, recorded in `failures` and skipped.
    pub fn load_dir(dir: &Path) -> Result<Self, ManifestError> {
        let entries = fs::read_dir(dir).map_err(|source| ManifestError::Directory {
            path: dir.to_path_buf(),
            source,
        })?;

        let mut files: Vec<PathBuf> = entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "json"))
            .collect();
        files.sort();

        let mut set = ManifestSet::default();
        for path in files {
            let file = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            let loaded = fs::read_to_string(&path)
                .map_err(|source| ManifestError::Read {
                    path: path.clone(),
                    source,
                })
                .and_then(|text| {
                    CategoryManifest::parse(&text).map_err(|source| ManifestError::Parse {
                        path: path.clone(),
                        source,
                    })
                });
            set.push(file, loaded);
        }
        Ok(set)
    }

    /// The manifests built into the binary.
    pub fn embedded() -> Self {
        let mut set = ManifestSet::default();
        for (file, text) in EMBEDDED {
            let loaded = CategoryManifest::parse(text).map_err(|source| ManifestError::Parse {
                path: PathBuf::from(file),
                source,
            });
            set.push(file.to_string(), loaded);
        }
        set
    }

    fn push(&mut self, file: String, loaded: Result<CategoryManifest, ManifestError>) {
        match loaded {
            Ok(manifest) => {
                debug!(file = %file, category = %manifest.name, blocks = manifest.blocks.len(), "loaded manifest");
                self.manifests.push(manifest);
            }
            Err(error) => {
                warn!(file = %file, %error, "skipping manifest");
                self.failures.push(ManifestFailure {
                    file,
                    error: error.to_string(),
                });
            }
        }
    }

    /// Number of block entries across all manifests.
    pub fn block_count(&self) -> usize {
        self.manifests.iter().map(|m| m.blocks.len()).sum()
    }

    /// The document served to the editor: `{ "categories": [...] }`.
    pub fn document(&self) -> Value {
        serde_json::json!({ "categories": self.manifests })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("cannot read manifest directory {path}: {source}")]
    Directory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid manifest {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_extra_keys_survive_round_trip() {
        let text = r##"{
            "name": "mouse",
            "colour": "#4CBFE6",
            "blocks": [{ "name": "move", "message0": "move to %1" }]
        }"##;
        let manifest = CategoryManifest::parse(text).unwrap();
        assert_eq!(manifest.name, "mouse");
        assert_eq!(manifest.blocks[0].name, "move");
        assert_eq!(manifest.extra["colour"], "#4CBFE6");

        let value = serde_json::to_value(&manifest).unwrap();
        assert_eq!(value["blocks"][0]["message0"], "move to %1");
        assert_eq!(value["colour"], "#4CBFE6");
    }

    #[test]
    fn test_missing_blocks_is_empty() {
        let manifest = CategoryManifest::parse(r#"{"name": "debug"}"#).unwrap();
        assert!(manifest.blocks.is_empty());
    }

    #[test]
    fn test_load_dir_sorted_and_skips_bad_files() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("b.json"), r#"{"name":"second","blocks":[{"name":"y"}]}"#).unwrap();
        fs::write(dir.path().join("a.json"), r#"{"name":"first","blocks":[{"name":"x"}]}"#).unwrap();
        fs::write(dir.path().join("broken.json"), "{ not json").unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let set = ManifestSet::load_dir(dir.path()).unwrap();
        let names: Vec<_> = set.manifests.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["first", "second"]);
        assert_eq!(set.failures.len(), 1);
        assert_eq!(set.failures[0].file, "broken.json");
        assert_eq!(set.block_count(), 2);
    }

    #[test]
    fn test_missing_directory_is_error() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope");
        let err = ManifestSet::load_dir(&missing).unwrap_err();
        assert!(matches!(err, ManifestError::Directory { .. }));
    }

    #[test]
    fn test_embedded_manifests_parse() {
        let set = ManifestSet::embedded();
        assert!(set.failures.is_empty(), "{:?}", set.failures);
        assert_eq!(set.manifests.len(), EMBEDDED.len());
        assert!(set.manifests.iter().any(|m| m.name == "keyboard"));
    }

    #[test]
    fn test_document_shape() {
        let set = ManifestSet::new(vec![CategoryManifest::new("console", &["output"])]);
        let doc = set.document();
        assert_eq!(doc["categories"][0]["name"], "console");
        assert_eq!(doc["categories"][0]["blocks"][0]["name"], "output");
    }
}
