//! tier::mock
//!
//! Mock tier implementation for deterministic testing.
//!
//! # Design
//!
//! The mock tier stores documents in memory, keyed by path. Listings are
//! ordinary documents registered with [`MockTier::with_listing`]. Failures
//! can be injected per path and per verb, and a rewrite hook can alter
//! UTF-8 documents on `PUT` to simulate unstable persistence. Documents
//! that are not UTF-8 are stored as sent.
//!
//! # Example
//!
//! ```
//! use tiercheck::core::types::{TierKind, TreePath};
//! use tiercheck::tier::mock::MockTier;
//! use tiercheck::tier::Tier;
//!
//! # tokio_test::block_on(async {
//! let tier = MockTier::new(TierKind::Api)
//!     .with_listing("/source", &["apache", "zlib"])
//!     .with_document("/source/apache/_meta", "<project name=\"apache\"/>");
//!
//! let meta = TreePath::new("/source/apache/_meta").unwrap();
//! let body = tier.get(&meta).await.unwrap();
//! tier.put(&meta, &body).await.unwrap();
//! assert_eq!(tier.get(&meta).await.unwrap(), body);
//! # });
//! ```

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use super::listing::render_listing;
use super::traits::{Tier, TierError};
use crate::core::types::{TierKind, TreePath};

/// Transformation applied to a document on `PUT`: `(path, body) -> stored`.
pub type Rewrite = Arc<dyn Fn(&str, &str) -> String + Send + Sync>;

/// Mock tier for testing.
///
/// Thread-safe via internal `Arc<Mutex<...>>` wrapping; clones share state.
#[derive(Clone)]
pub struct MockTier {
    kind: TierKind,
    inner: Arc<Mutex<MockTierInner>>,
}

/// Internal mutable state.
#[derive(Default)]
struct MockTierInner {
    /// Stored documents by path.
    documents: HashMap<String, Vec<u8>>,
    /// Injected failures.
    failures: Vec<FailOn>,
    /// Optional rewrite applied on PUT.
    rewrite: Option<Rewrite>,
    /// Recorded operations for verification.
    operations: Vec<MockOperation>,
}

/// Configuration for which request should fail.
#[derive(Debug, Clone)]
pub enum FailOn {
    /// Fail `GET path` with the given error.
    Get { path: String, error: TierError },
    /// Fail `PUT path` with the given error.
    Put { path: String, error: TierError },
}

/// Recorded operation for test verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockOperation {
    Get { path: String },
    Put { path: String, body: Vec<u8> },
}

impl std::fmt::Debug for MockTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.state();
        f.debug_struct("MockTier")
            .field("kind", &self.kind)
            .field("documents", &inner.documents.len())
            .field("failures", &inner.failures)
            .field("has_rewrite", &inner.rewrite.is_some())
            .finish()
    }
}

impl MockTier {
    /// Create a new empty mock tier.
    pub fn new(kind: TierKind) -> Self {
        Self {
            kind,
            inner: Arc::new(Mutex::new(MockTierInner::default())),
        }
    }

    /// Add a document at `path`.
    pub fn with_document(self, path: &str, body: &str) -> Self {
        self.insert_document(path, body);
        self
    }

    /// Add a document with arbitrary bytes at `path`.
    pub fn with_bytes(self, path: &str, body: &[u8]) -> Self {
        self.insert_bytes(path, body);
        self
    }

    /// Add a listing document at `path` enumerating `names` in order.
    pub fn with_listing(self, path: &str, names: &[&str]) -> Self {
        self.insert_document(path, &render_listing(names));
        self
    }

    /// Configure a failure. Several failures may be active at once.
    ///
    /// # Example
    ///
    /// ```
    /// use tiercheck::core::types::TierKind;
    /// use tiercheck::tier::mock::{FailOn, MockTier};
    /// use tiercheck::tier::TierError;
    ///
    /// let tier = MockTier::new(TierKind::Api).fail_on(FailOn::Get {
    ///     path: "/source/broken".into(),
    ///     error: TierError::Transport("connection reset".into()),
    /// });
    /// ```
    pub fn fail_on(self, fail_on: FailOn) -> Self {
        self.state().failures.push(fail_on);
        self
    }

    /// Rewrite every stored document on `PUT`.
    pub fn with_rewrite<F>(self, rewrite: F) -> Self
    where
        F: Fn(&str, &str) -> String + Send + Sync + 'static,
    {
        self.state().rewrite = Some(Arc::new(rewrite));
        self
    }

    /// Insert or replace a document.
    pub fn insert_document(&self, path: &str, body: &str) {
        self.insert_bytes(path, body.as_bytes());
    }

    /// Insert or replace a document given as bytes.
    pub fn insert_bytes(&self, path: &str, body: &[u8]) {
        self.state()
            .documents
            .insert(path.to_string(), body.to_vec());
    }

    /// Remove a document.
    pub fn remove_document(&self, path: &str) -> Option<Vec<u8>> {
        self.state().documents.remove(path)
    }

    /// Get a stored document (for test verification).
    pub fn document(&self, path: &str) -> Option<Vec<u8>> {
        self.state().documents.get(path).cloned()
    }

    /// Clear the failure configuration.
    pub fn clear_failures(&self) {
        self.state().failures.clear();
    }

    /// Get all recorded operations.
    pub fn operations(&self) -> Vec<MockOperation> {
        self.state().operations.clone()
    }

    /// Paths written so far, in order.
    pub fn puts(&self) -> Vec<String> {
        self.state()
            .operations
            .iter()
            .filter_map(|op| match op {
                MockOperation::Put { path, .. } => Some(path.clone()),
                MockOperation::Get { .. } => None,
            })
            .collect()
    }

    fn state(&self) -> MutexGuard<'_, MockTierInner> {
        self.inner.lock().expect("mock tier lock poisoned")
    }

    fn injected(&self, op: &MockOperation) -> Option<TierError> {
        self.state().failures.iter().find_map(|fail| match (fail, op) {
            (FailOn::Get { path, error }, MockOperation::Get { path: p }) if path == p => {
                Some(error.clone())
            }
            (FailOn::Put { path, error }, MockOperation::Put { path: p, .. }) if path == p => {
                Some(error.clone())
            }
            _ => None,
        })
    }
}

#[async_trait]
impl Tier for MockTier {
    fn kind(&self) -> TierKind {
        self.kind
    }

    async fn get(&self, path: &TreePath) -> Result<Vec<u8>, TierError> {
        let op = MockOperation::Get {
            path: path.to_string(),
        };
        self.state().operations.push(op.clone());

        if let Some(error) = self.injected(&op) {
            return Err(error);
        }

        self.document(path.as_str())
            .ok_or_else(|| TierError::NotFound(path.to_string()))
    }

    async fn put(&self, path: &TreePath, body: &[u8]) -> Result<(), TierError> {
        let op = MockOperation::Put {
            path: path.to_string(),
            body: body.to_vec(),
        };
        self.state().operations.push(op.clone());

        if let Some(error) = self.injected(&op) {
            return Err(error);
        }

        let mut inner = self.state();
        let stored = match (&inner.rewrite, std::str::from_utf8(body)) {
            (Some(rewrite), Ok(text)) => rewrite(path.as_str(), text).into_bytes(),
            _ => body.to_vec(),
        };
        inner.documents.insert(path.to_string(), stored);
        Ok(())
    }
}
