use serde::{Deserialize, Serialize};

/// One directory in a folder tree specification.
///
/// Entries use `"."` for the root and a `/`-separated path relative to it
/// (`"./Data"`). Parent paths must precede their children in the sequence;
/// the materializer relies on this ordering instead of re-deriving it.
///
/// The `files` field mirrors the shape of a filesystem walk and is accepted
/// so walk-derived specs load unmodified, but folder materialization never
/// creates files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderEntry {
    pub path: String,
    #[serde(default)]
    pub subfolders: Vec<String>,
    #[serde(default)]
    pub files: Vec<String>,
}

impl FolderEntry {
    pub fn new(path: impl Into<String>, subfolders: &[&str]) -> Self {
        Self {
            path: path.into(),
            subfolders: subfolders.iter().map(|s| s.to_string()).collect(),
            files: Vec::new(),
        }
    }
}

/// Join a spec-relative directory path and a subdirectory name.
pub fn join_path(dir: &str, name: &str) -> String {
    format!("{dir}/{name}")
}

/// Split a spec-relative path into (parent path, leaf name).
///
/// Bare names with no separator are treated as children of the root.
pub fn split_path(path: &str) -> (&str, &str) {
    path.rsplit_once('/').unwrap_or((".", path))
}
