//! File descriptor registry with path prefix remapping.

use std::borrow::Cow;

use rustc_hash::FxHashMap;
use tracing::trace;

use rill_types::{FileId, FileSet};

use super::metadata::{MetaId, MetaNode, MetadataArena};

/// Rewrite of a path prefix, as in `-fdebug-prefix-map=source=replacement`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct PrefixMap {
    pub source: String,
    pub replacement: String,
}

impl PrefixMap {
    pub fn new(source: impl Into<String>, replacement: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            replacement: replacement.into(),
        }
    }
}

/// One file descriptor per source file, created on first request.
#[derive(Debug, Default)]
pub struct FileRegistry {
    prefix_maps: Vec<PrefixMap>,
    files: FxHashMap<FileId, MetaId>,
}

impl FileRegistry {
    pub fn new(prefix_maps: Vec<PrefixMap>) -> Self {
        Self {
            prefix_maps,
            files: FxHashMap::default(),
        }
    }

    /// Apply the first prefix map whose source is a prefix of `path`.
    ///
    /// Matching is textual, not per path component: `/src` also matches
    /// `/srcfoo`.
    pub fn remap_path<'p>(&self, path: &'p str) -> Cow<'p, str> {
        for map in &self.prefix_maps {
            if let Some(rest) = path.strip_prefix(map.source.as_str()) {
                return Cow::Owned(format!("{}{rest}", map.replacement));
            }
        }
        Cow::Borrowed(path)
    }

    /// The descriptor of `file`, created on first use.
    pub fn file(&mut self, metadata: &mut MetadataArena, fset: &FileSet, file: FileId) -> MetaId {
        if let Some(&id) = self.files.get(&file) {
            return id;
        }
        let filename = self.remap_path(fset.name(file)).into_owned();
        trace!(%filename, "file descriptor");
        let id = metadata.push(MetaNode::File {
            filename,
            directory: String::new(),
        });
        self.files.insert(file, id);
        id
    }

    /// Number of file descriptors created so far.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}
