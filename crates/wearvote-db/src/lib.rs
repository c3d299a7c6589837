pub mod document;
pub mod lifecycle;
pub mod notifications;
pub mod voting;

mod messages;
mod posts;
mod seed;
mod social;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use thiserror::Error;
use tracing::{debug, info};

pub use document::Document;
pub use posts::NewPost;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    InvalidInput(String),

    #[error("store lock poisoned")]
    Poisoned,

    #[error("store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("store document is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// The whole persisted state: one JSON document, kept in memory behind a
/// single-writer lock and rewritten in full on every mutation.
pub struct Store {
    path: Option<PathBuf>,
    doc: Mutex<Document>,
}

impl Store {
    /// Load the document at `path`, or create it from seed data if absent.
    pub fn open(path: &Path) -> Result<Self> {
        let doc = if path.exists() {
            let raw = fs::read_to_string(path)?;
            serde_json::from_str::<Document>(&raw)?
        } else {
            let doc = seed::document();
            write_document(path, &doc)?;
            info!("Seeded new document with {} users", doc.users.len());
            doc
        };

        info!(
            "Store opened at {} ({} users, {} posts, {} messages)",
            path.display(),
            doc.users.len(),
            doc.posts.len(),
            doc.messages.len()
        );

        Ok(Self {
            path: Some(path.to_path_buf()),
            doc: Mutex::new(doc),
        })
    }

    /// A store with no backing file.
    pub fn in_memory(doc: Document) -> Self {
        Self {
            path: None,
            doc: Mutex::new(doc),
        }
    }

    pub fn with_doc<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Document) -> Result<T>,
    {
        let doc = self.doc.lock().map_err(|_| StoreError::Poisoned)?;
        f(&doc)
    }

    /// Run `f` against a draft copy of the document. The draft replaces the
    /// live document only after `f` succeeds and the draft is on disk.
    pub fn with_doc_mut<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Document) -> Result<T>,
    {
        let mut doc = self.doc.lock().map_err(|_| StoreError::Poisoned)?;
        let mut draft = doc.clone();
        let out = f(&mut draft)?;

        if draft != *doc {
            if let Some(path) = &self.path {
                write_document(path, &draft)?;
            }
            *doc = draft;
        }

        Ok(out)
    }

    /// Clone of the current document.
    pub fn snapshot(&self) -> Result<Document> {
        self.with_doc(|doc| Ok(doc.clone()))
    }
}

/// Write to a sibling temp file, then rename over the target.
fn write_document(path: &Path, doc: &Document) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    fs::write(&tmp, serde_json::to_vec_pretty(doc)?)?;
    fs::rename(&tmp, path)?;
    debug!("Persisted document to {}", path.display());
    Ok(())
}
