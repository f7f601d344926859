//! Arena-backed repository tree
//!
//! Folders and files are stored in two vectors and addressed by index. Each
//! folder keeps its children in insertion order plus name lookup maps, so
//! path resolution is one hash lookup per segment and a folder name can only
//! appear once under a given parent.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use super::host::{CodeHost, EntryKind, TreeEntry, TreeListing};

/// Index of a folder in the arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FolderId(usize);

/// Index of a file in the arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FileId(usize);

/// A file leaf
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileNode {
    pub name: String,
    /// Locator for fetching the content from the code host
    pub blob_url: Option<String>,
    pub sha: String,
    pub size: Option<u64>,
}

/// A folder and its children
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderNode {
    pub name: String,
    pub sha: String,
    files: Vec<FileId>,
    folders: Vec<FolderId>,
    file_index: HashMap<String, FileId>,
    folder_index: HashMap<String, FolderId>,
}

impl FolderNode {
    fn new(name: impl Into<String>, sha: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sha: sha.into(),
            files: Vec::new(),
            folders: Vec::new(),
            file_index: HashMap::new(),
            folder_index: HashMap::new(),
        }
    }

    /// Child files in insertion order
    pub fn files(&self) -> &[FileId] {
        &self.files
    }

    /// Child folders in insertion order
    pub fn folders(&self) -> &[FolderId] {
        &self.folders
    }
}

/// Hierarchical view of one repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryTree {
    repository: String,
    folders: Vec<FolderNode>,
    files: Vec<FileNode>,
}

const ROOT: FolderId = FolderId(0);
const INDENT: &str = "  ";

impl RepositoryTree {
    /// Create an empty tree whose root is named after the repository
    pub fn new(repository: impl Into<String>, root_sha: impl Into<String>) -> Self {
        let repository = repository.into();
        Self {
            folders: vec![FolderNode::new(repository.clone(), root_sha)],
            files: Vec::new(),
            repository,
        }
    }

    /// Build a tree from a flat recursive listing
    pub fn from_listing(repository: impl Into<String>, listing: &TreeListing) -> Self {
        let mut tree = Self::new(repository, listing.sha.clone());
        for entry in &listing.entries {
            tree.insert(entry);
        }
        debug!(
            repository = %tree.repository,
            folders = tree.folders.len(),
            files = tree.files.len(),
            "Built repository tree"
        );
        tree
    }

    /// Repository identifier the tree was built for
    pub fn repository(&self) -> &str {
        &self.repository
    }

    pub fn root(&self) -> FolderId {
        ROOT
    }

    pub fn folder(&self, id: FolderId) -> &FolderNode {
        &self.folders[id.0]
    }

    pub fn file(&self, id: FileId) -> &FileNode {
        &self.files[id.0]
    }

    /// Child folder of `parent` with exactly this name
    pub fn child_folder(&self, parent: FolderId, name: &str) -> Option<FolderId> {
        self.folder(parent).folder_index.get(name).copied()
    }

    /// Child file of `parent` with exactly this name
    pub fn child_file(&self, parent: FolderId, name: &str) -> Option<FileId> {
        self.folder(parent).file_index.get(name).copied()
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    /// Number of folders, excluding the root
    pub fn folder_count(&self) -> usize {
        self.folders.len() - 1
    }

    /// Insert one listing entry, creating missing intermediate folders
    pub fn insert(&mut self, entry: &TreeEntry) {
        let segments: Vec<&str> = entry.path.split('/').filter(|s| !s.is_empty()).collect();
        let Some((last, parents)) = segments.split_last() else {
            return;
        };

        let mut current = ROOT;
        for segment in parents {
            current = self.ensure_folder(current, segment, None);
        }

        match entry.kind {
            EntryKind::File => {
                self.add_file(
                    current,
                    FileNode {
                        name: last.to_string(),
                        blob_url: entry.url.clone(),
                        sha: entry.sha.clone(),
                        size: entry.size,
                    },
                );
            }
            EntryKind::Folder => {
                self.ensure_folder(current, last, Some(&entry.sha));
            }
        }
    }

    /// Return the named child folder, creating it if needed
    ///
    /// An explicit folder entry refreshes the hash of a folder that was
    /// first created as an intermediate.
    fn ensure_folder(&mut self, parent: FolderId, name: &str, sha: Option<&str>) -> FolderId {
        if let Some(existing) = self.child_folder(parent, name) {
            if let Some(sha) = sha {
                self.folders[existing.0].sha = sha.to_string();
            }
            return existing;
        }

        let id = FolderId(self.folders.len());
        self.folders.push(FolderNode::new(name, sha.unwrap_or_default()));
        let parent = &mut self.folders[parent.0];
        parent.folders.push(id);
        parent.folder_index.insert(name.to_string(), id);
        id
    }

    fn add_file(&mut self, parent: FolderId, node: FileNode) -> FileId {
        if let Some(existing) = self.child_file(parent, &node.name) {
            debug!(name = %node.name, "Duplicate file entry ignored");
            return existing;
        }

        let id = FileId(self.files.len());
        let name = node.name.clone();
        self.files.push(node);
        let parent = &mut self.folders[parent.0];
        parent.files.push(id);
        parent.file_index.insert(name, id);
        id
    }

    /// Resolve a slash-delimited path to a file node
    ///
    /// Returns `None` if any folder segment is missing or the last segment
    /// is not a file.
    pub fn resolve_file(&self, path: &str) -> Option<&FileNode> {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let (last, parents) = segments.split_last()?;

        let mut current = ROOT;
        for segment in parents {
            current = self.child_folder(current, segment)?;
        }

        self.child_file(current, last).map(|id| self.file(id))
    }

    /// Fetch a file's content through the code host
    ///
    /// Unknown paths and remote failures both yield `None`.
    pub async fn file_content(&self, path: &str, host: &dyn CodeHost) -> Option<String> {
        let node = self.resolve_file(path)?;
        let url = node.blob_url.as_deref()?;

        match host.blob_content(url).await {
            Ok(content) => Some(content),
            Err(e) => {
                error!(path, error = %e, "Failed to fetch file content");
                None
            }
        }
    }

    /// Indented text rendering of the whole tree
    ///
    /// Files of a folder come first as `-name`, then each subfolder as
    /// `|name` followed by its own contents one level deeper.
    pub fn render(&self) -> String {
        let mut out = String::new();
        self.render_folder(ROOT, 0, &mut out);
        out
    }

    fn render_folder(&self, id: FolderId, depth: usize, out: &mut String) {
        let folder = self.folder(id);
        let indent = INDENT.repeat(depth);
        for file in &folder.files {
            out.push_str(&format!("{}-{}\n", indent, self.file(*file).name));
        }
        for child in &folder.folders {
            out.push_str(&format!("{}|{}\n", indent, self.folder(*child).name));
            self.render_folder(*child, depth + 1, out);
        }
    }

    /// Convert to the recursive cache representation
    pub fn to_cached(&self) -> CachedFolder {
        self.cached_folder(ROOT)
    }

    fn cached_folder(&self, id: FolderId) -> CachedFolder {
        let folder = self.folder(id);
        CachedFolder {
            name: folder.name.clone(),
            sha: folder.sha.clone(),
            kind: NodeType::Folder,
            files: folder
                .files
                .iter()
                .map(|f| {
                    let file = self.file(*f);
                    CachedFile {
                        name: file.name.clone(),
                        blob_url: file.blob_url.clone(),
                        sha: file.sha.clone(),
                        size: file.size,
                        kind: NodeType::File,
                    }
                })
                .collect(),
            folders: folder.folders.iter().map(|c| self.cached_folder(*c)).collect(),
        }
    }

    /// Rebuild a tree from its cache representation
    pub fn from_cached(repository: impl Into<String>, cached: &CachedFolder) -> Self {
        let mut tree = Self::new(repository, cached.sha.clone());
        tree.folders[ROOT.0].name = cached.name.clone();
        tree.restore_children(ROOT, cached);
        tree
    }

    fn restore_children(&mut self, id: FolderId, cached: &CachedFolder) {
        for file in &cached.files {
            self.add_file(
                id,
                FileNode {
                    name: file.name.clone(),
                    blob_url: file.blob_url.clone(),
                    sha: file.sha.clone(),
                    size: file.size,
                },
            );
        }
        for folder in &cached.folders {
            let child = self.ensure_folder(id, &folder.name, Some(&folder.sha));
            self.restore_children(child, folder);
        }
    }
}

/// `type` discriminator in the cache format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    File,
    Folder,
}

/// Cached folder: `{"name","sha","type":"folder","files":[...],"folders":[...]}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedFolder {
    pub name: String,
    pub sha: String,
    #[serde(rename = "type")]
    pub kind: NodeType,
    #[serde(default)]
    pub files: Vec<CachedFile>,
    #[serde(default)]
    pub folders: Vec<CachedFolder>,
}

/// Cached file: `{"name","blob_url","sha","size","type":"file"}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedFile {
    pub name: String,
    pub blob_url: Option<String>,
    pub sha: String,
    pub size: Option<u64>,
    #[serde(rename = "type")]
    pub kind: NodeType,
}
