//! engine::roundtrip
//!
//! Read-modify-write idempotence checks on metadata documents.
//!
//! # Protocol
//!
//! For a node at `path`, against the authoritative tier:
//!
//! 1. `GET path/_meta` → D1 (failure: `FetchFailed`, stop)
//! 2. `PUT path/_meta` with D1 unchanged (failure: `WriteFailed`, stop)
//! 3. `GET path/_meta` → D2 (failure: `FetchFailed`, stop)
//! 4. D1 and D2 must be byte-identical (otherwise: `RoundTripMismatch`)
//!
//! The comparison is on raw bytes, not structure. Whitespace, attribute
//! order, empty-element spelling and encoding all count, because any drift
//! a write introduces is what this check exists to catch.

use std::borrow::Cow;
use std::sync::Arc;

use sha2::{Digest, Sha256};
use tracing::debug;

use super::report::{Discrepancy, DiscrepancyKind};
use crate::core::types::TreePath;
use crate::tier::Tier;

/// Longest excerpt of either document quoted in a mismatch.
const EXCERPT_LEN: usize = 80;

/// Round-trips metadata documents through one tier.
#[derive(Clone)]
pub struct RoundTripVerifier {
    tier: Arc<dyn Tier>,
}

impl std::fmt::Debug for RoundTripVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoundTripVerifier")
            .field("tier", &self.tier.kind())
            .finish()
    }
}

impl RoundTripVerifier {
    pub fn new(tier: Arc<dyn Tier>) -> Self {
        Self { tier }
    }

    /// Round-trip the metadata document of the node at `path`.
    ///
    /// # Errors
    ///
    /// Returns the single discrepancy that stopped verification. The path of
    /// the discrepancy is always the metadata document's path.
    pub async fn verify(&self, path: &TreePath) -> Result<(), Discrepancy> {
        let meta = path.meta();
        let tier = self.tier.kind();

        let original = self.tier.get(&meta).await.map_err(|e| {
            Discrepancy::new(
                meta.clone(),
                DiscrepancyKind::FetchFailed,
                format!("{} GET failed: {}", tier, e),
            )
        })?;
        if original.is_empty() {
            return Err(Discrepancy::new(
                meta,
                DiscrepancyKind::FetchFailed,
                format!("{} returned an empty document", tier),
            ));
        }

        self.tier.put(&meta, &original).await.map_err(|e| {
            Discrepancy::new(
                meta.clone(),
                DiscrepancyKind::WriteFailed,
                format!("{} rejected unchanged document: {}", tier, e),
            )
        })?;

        let reread = self.tier.get(&meta).await.map_err(|e| {
            Discrepancy::new(
                meta.clone(),
                DiscrepancyKind::FetchFailed,
                format!("{} GET after write failed: {}", tier, e),
            )
        })?;

        if original != reread {
            return Err(Discrepancy::new(
                meta,
                DiscrepancyKind::RoundTripMismatch,
                describe_mismatch(&original, &reread),
            ));
        }

        debug!(path = %meta, bytes = original.len(), "round trip stable");
        Ok(())
    }
}

/// Describe how `actual` differs from `expected`.
///
/// Carries both lengths and SHA-256 fingerprints, the first differing byte
/// offset, and a short excerpt of each document starting there.
pub fn describe_mismatch(expected: &[u8], actual: &[u8]) -> String {
    let offset = expected
        .iter()
        .zip(actual)
        .position(|(a, b)| a != b)
        .unwrap_or_else(|| expected.len().min(actual.len()));

    format!(
        "expected {} bytes (sha256 {}) vs actual {} bytes (sha256 {}); first difference at byte {}: expected {:?} vs actual {:?}",
        expected.len(),
        fingerprint(expected),
        actual.len(),
        fingerprint(actual),
        offset,
        excerpt(expected, offset),
        excerpt(actual, offset),
    )
}

fn fingerprint(document: &[u8]) -> String {
    let digest = Sha256::digest(document);
    hex::encode(&digest[..8])
}

/// Up to `EXCERPT_LEN` bytes of `document` from `offset`.
///
/// UTF-8 documents are cut on char boundaries; anything else is shown
/// lossily.
fn excerpt(document: &[u8], offset: usize) -> Cow<'_, str> {
    let text = match std::str::from_utf8(document) {
        Ok(text) => text,
        Err(_) => {
            let start = offset.min(document.len());
            let end = (start + EXCERPT_LEN).min(document.len());
            return String::from_utf8_lossy(&document[start..end]);
        }
    };

    let mut start = offset.min(text.len());
    while !text.is_char_boundary(start) {
        start -= 1;
    }
    let mut end = (start + EXCERPT_LEN).min(text.len());
    while !text.is_char_boundary(end) {
        end += 1;
    }
    Cow::Borrowed(&text[start..end])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::TierKind;
    use crate::tier::mock::{FailOn, MockOperation, MockTier};
    use crate::tier::TierError;

    const DOC: &str = "<package name=\"foo\"><title/></package>";

    fn foo() -> TreePath {
        TreePath::new("/source/foo").unwrap()
    }

    #[tokio::test]
    async fn stable_document_passes() {
        let api = MockTier::new(TierKind::Api).with_document("/source/foo/_meta", DOC);
        let verifier = RoundTripVerifier::new(Arc::new(api.clone()));

        assert!(verifier.verify(&foo()).await.is_ok());
        assert_eq!(
            api.operations(),
            vec![
                MockOperation::Get {
                    path: "/source/foo/_meta".into()
                },
                MockOperation::Put {
                    path: "/source/foo/_meta".into(),
                    body: DOC.into()
                },
                MockOperation::Get {
                    path: "/source/foo/_meta".into()
                },
            ]
        );
    }

    #[tokio::test]
    async fn cosmetic_change_is_a_mismatch() {
        let api = MockTier::new(TierKind::Api)
            .with_document("/source/foo/_meta", DOC)
            .with_rewrite(|_, body| body.replace("<title/>", "<title></title>"));
        let verifier = RoundTripVerifier::new(Arc::new(api));

        let d = verifier.verify(&foo()).await.unwrap_err();
        assert_eq!(d.kind, DiscrepancyKind::RoundTripMismatch);
        assert_eq!(d.path.as_str(), "/source/foo/_meta");
        assert!(d.detail.contains("first difference at byte 26"));
    }

    #[tokio::test]
    async fn fetch_failure_stops_before_write() {
        let api = MockTier::new(TierKind::Api);
        let verifier = RoundTripVerifier::new(Arc::new(api.clone()));

        let d = verifier.verify(&foo()).await.unwrap_err();
        assert_eq!(d.kind, DiscrepancyKind::FetchFailed);
        assert!(api.puts().is_empty());
    }

    #[tokio::test]
    async fn empty_document_is_a_fetch_failure() {
        let api = MockTier::new(TierKind::Api).with_document("/source/foo/_meta", "");
        let verifier = RoundTripVerifier::new(Arc::new(api.clone()));

        let d = verifier.verify(&foo()).await.unwrap_err();
        assert_eq!(d.kind, DiscrepancyKind::FetchFailed);
        assert!(d.detail.contains("empty document"));
        assert!(api.puts().is_empty());
    }

    #[tokio::test]
    async fn rejected_write_is_a_write_failure() {
        let api = MockTier::new(TierKind::Api)
            .with_document("/source/foo/_meta", DOC)
            .fail_on(FailOn::Put {
                path: "/source/foo/_meta".into(),
                error: TierError::Rejected {
                    status: 400,
                    message: "validation failed".into(),
                },
            });
        let verifier = RoundTripVerifier::new(Arc::new(api.clone()));

        let d = verifier.verify(&foo()).await.unwrap_err();
        assert_eq!(d.kind, DiscrepancyKind::WriteFailed);
        assert!(d.detail.contains("400"));
        // No re-read after a refused write.
        assert_eq!(api.operations().len(), 2);
    }

    #[test]
    fn describe_mismatch_reports_offset_and_lengths() {
        let detail = describe_mismatch(b"<a/>", b"<a></a>");
        assert!(detail.starts_with("expected 4 bytes"));
        assert!(detail.contains("actual 7 bytes"));
        assert!(detail.contains("first difference at byte 2"));
        assert!(detail.contains("expected \"/>\" vs actual \"></a>\""));
    }

    #[test]
    fn describe_mismatch_prefix_case() {
        let detail = describe_mismatch(b"<a/>", b"<a/>\n");
        assert!(detail.contains("first difference at byte 4"));
    }

    #[test]
    fn excerpt_stays_on_char_boundaries() {
        assert_eq!(excerpt("héllo".as_bytes(), 2), "éllo");
        assert_eq!(excerpt(b"abc", 10), "");
    }

    #[test]
    fn describe_mismatch_handles_non_utf8() {
        let detail = describe_mismatch(&[b'<', 0xff, b'a'], &[b'<', 0xff, b'b']);
        assert!(detail.contains("first difference at byte 2"));
        assert!(detail.contains("expected \"a\" vs actual \"b\""));
    }

    #[tokio::test]
    async fn non_utf8_document_round_trips_byte_for_byte() {
        let body = b"<package name=\"f\xf6\xf6\"/>";
        let api = MockTier::new(TierKind::Api).with_bytes("/source/foo/_meta", body);
        let verifier = RoundTripVerifier::new(Arc::new(api.clone()));

        assert!(verifier.verify(&foo()).await.is_ok());
        assert_eq!(api.document("/source/foo/_meta").unwrap(), body);
    }
}
