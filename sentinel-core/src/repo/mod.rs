//! Repository access: code host trait, tree model and tree cache

mod cache;
mod host;
mod tree;

pub use cache::{cache_key, MemoryCache, TreeCache};
pub use host::{ChangedFile, CodeHost, EntryKind, TreeEntry, TreeListing};
pub use tree::{
    CachedFile, CachedFolder, FileId, FileNode, FolderId, FolderNode, NodeType, RepositoryTree,
};
