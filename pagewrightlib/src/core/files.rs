use std::collections::HashMap;
use std::fmt::Debug;
use std::path::{Component, Path, PathBuf};

use thiserror::Error;
use tracing::trace;

#[derive(Error, Debug)]
pub enum FileTreeError {
    #[error("file not found: '{0}'")]
    NotFound(String),
    #[error("path '{0}' must be relative and may not leave the tree root")]
    InvalidPath(String),
    #[error("failed to read '{path}'")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("'{0}' is not valid UTF-8")]
    NotUtf8(String),
}

/// A read-only tree of files addressed by slash-separated paths.
pub trait FileTree: Debug + Send + Sync {
    fn read(&self, path: &str) -> Result<Vec<u8>, FileTreeError>;

    fn read_to_string(&self, path: &str) -> Result<String, FileTreeError> {
        let bytes = self.read(path)?;
        String::from_utf8(bytes).map_err(|_| FileTreeError::NotUtf8(path.to_owned()))
    }
}

/// File tree backed by a directory on disk.
#[derive(Clone, Debug)]
pub struct DirTree {
    root: PathBuf,
}

impl DirTree {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        self.root.as_path()
    }

    fn system_path(&self, path: &str) -> Result<PathBuf, FileTreeError> {
        let mut system_path = self.root.clone();
        for component in Path::new(path).components() {
            match component {
                Component::Normal(part) => system_path.push(part),
                Component::CurDir => continue,
                _ => return Err(FileTreeError::InvalidPath(path.to_owned())),
            }
        }
        Ok(system_path)
    }
}

impl FileTree for DirTree {
    fn read(&self, path: &str) -> Result<Vec<u8>, FileTreeError> {
        let system_path = self.system_path(path)?;
        trace!(path = ?system_path, "reading file");
        std::fs::read(&system_path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => FileTreeError::NotFound(path.to_owned()),
            _ => FileTreeError::Io {
                path: path.to_owned(),
                source: e,
            },
        })
    }
}

/// File tree held entirely in memory.
#[derive(Clone, Debug, Default)]
pub struct MemoryTree {
    files: HashMap<String, Vec<u8>>,
}

impl MemoryTree {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_file<P: Into<String>, C: Into<Vec<u8>>>(mut self, path: P, content: C) -> Self {
        self.insert(path, content);
        self
    }

    pub fn insert<P: Into<String>, C: Into<Vec<u8>>>(&mut self, path: P, content: C) {
        self.files.insert(path.into(), content.into());
    }
}

impl FileTree for MemoryTree {
    fn read(&self, path: &str) -> Result<Vec<u8>, FileTreeError> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| FileTreeError::NotFound(path.to_owned()))
    }
}
