//! engine::differ
//!
//! Set comparison of one path's listings across both tiers.
//!
//! # Algorithm
//!
//! Both listings are folded into a map keyed by name, which sorts them in
//! case-sensitive byte order. Walking that map in ascending order emits one
//! `MissingInBackend` for every name only the API lists and one
//! `MissingInApi` for every name only the backend lists. Names listed by
//! both tiers produce nothing here; their content is the round-trip
//! verifier's concern.
//!
//! Duplicate names within one listing collapse to a single occurrence
//! unless [`DiffOptions::flag_duplicates`] is set, in which case each
//! duplicated name also yields a `DuplicateEntry` per offending tier.

use std::collections::BTreeMap;

use super::report::{Discrepancy, DiscrepancyKind};
use crate::core::types::{TierKind, TreePath};

/// Knobs for [`diff_with`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiffOptions {
    /// Report names listed more than once by a single tier.
    pub flag_duplicates: bool,
}

/// Compare two listings of `path` with default options.
pub fn diff(api: &[String], backend: &[String], path: &TreePath) -> Vec<Discrepancy> {
    diff_with(api, backend, path, DiffOptions::default())
}

/// Compare two listings of `path`.
///
/// The result is ordered by entry name. Each discrepancy is reported at the
/// child's path below `path`.
pub fn diff_with(
    api: &[String],
    backend: &[String],
    path: &TreePath,
    options: DiffOptions,
) -> Vec<Discrepancy> {
    // name -> (occurrences on api, occurrences on backend)
    let mut counts: BTreeMap<&str, (usize, usize)> = BTreeMap::new();
    for name in api {
        counts.entry(name.as_str()).or_default().0 += 1;
    }
    for name in backend {
        counts.entry(name.as_str()).or_default().1 += 1;
    }

    let mut out = Vec::new();
    for (name, (on_api, on_backend)) in counts {
        let child = child_path(path, name);

        if options.flag_duplicates {
            for (tier, seen) in [(TierKind::Api, on_api), (TierKind::Backend, on_backend)] {
                if seen > 1 {
                    out.push(Discrepancy::new(
                        child.clone(),
                        DiscrepancyKind::DuplicateEntry,
                        format!("entry '{}' listed {} times by {}", name, seen, tier),
                    ));
                }
            }
        }

        let only_on = match (on_api > 0, on_backend > 0) {
            (true, false) => TierKind::Api,
            (false, true) => TierKind::Backend,
            _ => continue,
        };
        out.push(Discrepancy::new(
            child,
            DiscrepancyKind::missing_from_other(only_on),
            format!(
                "entry '{}' listed by {} but not by {}",
                name,
                only_on,
                only_on.other()
            ),
        ));
    }
    out
}

/// Path for a listed child. Names that cannot form a segment are reported
/// against the listing path itself.
fn child_path(path: &TreePath, name: &str) -> TreePath {
    path.child(name).unwrap_or_else(|_| path.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn root() -> TreePath {
        TreePath::new("/source").unwrap()
    }

    #[test]
    fn identical_listings_yield_nothing() {
        let list = names(&["apache", "zlib"]);
        assert!(diff(&list, &list, &root()).is_empty());
    }

    #[test]
    fn order_does_not_matter() {
        let a = names(&["zlib", "apache"]);
        let b = names(&["apache", "zlib"]);
        assert!(diff(&a, &b, &root()).is_empty());
    }

    #[test]
    fn name_only_on_api_is_missing_in_backend() {
        let out = diff(&names(&["apache", "zlib"]), &names(&["apache"]), &root());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].kind, DiscrepancyKind::MissingInBackend);
        assert_eq!(out[0].path.as_str(), "/source/zlib");
        assert!(out[0].detail.contains("'zlib'"));
    }

    #[test]
    fn name_only_on_backend_is_missing_in_api() {
        let out = diff(&names(&[]), &names(&["apache"]), &root());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].kind, DiscrepancyKind::MissingInApi);
    }

    #[test]
    fn output_is_in_ascending_byte_order() {
        let out = diff(
            &names(&["zlib", "Zope", "b"]),
            &names(&["a", "apache"]),
            &root(),
        );
        let paths: Vec<&str> = out.iter().map(|d| d.path.as_str()).collect();
        // Uppercase sorts before lowercase in byte order.
        assert_eq!(
            paths,
            vec![
                "/source/Zope",
                "/source/a",
                "/source/apache",
                "/source/b",
                "/source/zlib"
            ]
        );
        assert_eq!(out[0].kind, DiscrepancyKind::MissingInBackend);
        assert_eq!(out[1].kind, DiscrepancyKind::MissingInApi);
    }

    #[test]
    fn duplicates_collapse_by_default() {
        let out = diff(&names(&["a", "a"]), &names(&["a"]), &root());
        assert!(out.is_empty());
    }

    #[test]
    fn duplicates_flagged_when_requested() {
        let options = DiffOptions {
            flag_duplicates: true,
        };
        let out = diff_with(&names(&["a", "a", "b"]), &names(&["a"]), &root(), options);

        assert_eq!(out.len(), 2);
        assert_eq!(out[0].kind, DiscrepancyKind::DuplicateEntry);
        assert_eq!(out[0].path.as_str(), "/source/a");
        assert!(out[0].detail.contains("2 times by api"));
        assert_eq!(out[1].kind, DiscrepancyKind::MissingInBackend);
    }

    #[test]
    fn one_sided_unusable_name_is_reported_at_parent() {
        let out = diff(&names(&["apache", ".."]), &names(&["apache"]), &root());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].kind, DiscrepancyKind::MissingInBackend);
        assert_eq!(out[0].path.as_str(), "/source");
        assert!(out[0].detail.contains("'..'"));
    }
}
