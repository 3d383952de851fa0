//! Merging fragments into a single vendor tree.

use std::collections::BTreeMap;
use std::path::{Component, Path};

use path_clean::PathClean;
use tracing::{debug, info};

use crate::materialize::Fragment;
use crate::output::writer::write_tree_to;
use crate::{Error, Result};

/// One file in the composed tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    pub owner: String,
    /// The path as the owning fragment wrote it, before normalization.
    pub source_path: String,
    pub contents: Vec<u8>,
}

/// The complete vendor tree, keyed by normalized vendor-relative path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComposedTree {
    entries: BTreeMap<String, TreeEntry>,
}

impl ComposedTree {
    pub fn get(&self, path: &str) -> Option<&TreeEntry> {
        self.entries.get(path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TreeEntry)> {
        self.entries.iter().map(|(path, entry)| (path.as_str(), entry))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total size of all files in bytes.
    pub fn total_bytes(&self) -> usize {
        self.entries.values().map(|e| e.contents.len()).sum()
    }

    /// Writes every file under `dir`. See [`write_tree_to`].
    pub fn write_to(&self, dir: impl AsRef<Path>, overwrite: bool) -> Result<()> {
        write_tree_to(self, dir.as_ref(), overwrite)
    }
}

/// Merges fragments in the order given. Fails on the first destination two
/// fragments both claim.
pub fn compose(fragments: impl IntoIterator<Item = Fragment>) -> Result<ComposedTree> {
    let mut entries: BTreeMap<String, TreeEntry> = BTreeMap::new();
    let mut fragment_count = 0usize;

    for fragment in fragments {
        fragment_count += 1;
        for (source_path, contents) in fragment.files {
            let path = normalize(&source_path);

            if let Some(existing) = entries.get(&path) {
                return Err(Error::OutputCollision {
                    path,
                    first_owner: existing.owner.clone(),
                    first_path: existing.source_path.clone(),
                    second_owner: fragment.owner.clone(),
                    second_path: source_path,
                });
            }

            debug!(owner = %fragment.owner, path = %path, "adding to vendor tree");
            entries.insert(
                path,
                TreeEntry {
                    owner: fragment.owner.clone(),
                    source_path,
                    contents,
                },
            );
        }
    }

    info!(
        fragments = fragment_count,
        files = entries.len(),
        "composed vendor tree"
    );
    Ok(ComposedTree { entries })
}

/// `a/./b/../c.js` and `a\c.js` both become `a/c.js`.
fn normalize(path: &str) -> String {
    let cleaned = Path::new(&path.replace('\\', "/")).clean();
    cleaned
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            Component::ParentDir => Some("..".to_string()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
