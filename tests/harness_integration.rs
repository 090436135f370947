//! Integration tests for the consistency harness.
//!
//! These tests drive full runs against in-memory tiers and verify:
//! - Listing differences between the API and the backend
//! - Round-trip idempotence of metadata documents
//! - Per-node failure isolation
//! - Report ordering under concurrent package verification

use std::sync::Arc;

use tiercheck::core::types::{TierKind, TreePath};
use tiercheck::engine::{
    ConsistencyReport, DiffOptions, DiscrepancyKind, Phase, TraversalDriver, TraversalOptions,
};
use tiercheck::tier::mock::{FailOn, MockTier};
use tiercheck::tier::{TierError, Tiers};

/// A project and its packages.
type Project<'a> = (&'a str, &'a [&'a str]);

/// Populate a tier with listings and metadata for `projects` below /source.
fn fixture(kind: TierKind, projects: &[Project<'_>]) -> MockTier {
    let names: Vec<&str> = projects.iter().map(|(name, _)| *name).collect();
    let mut tier = MockTier::new(kind).with_listing("/source", &names);

    for (project, packages) in projects {
        tier = tier
            .with_listing(&format!("/source/{}", project), packages)
            .with_document(
                &format!("/source/{}/_meta", project),
                &format!("<project name=\"{}\">\n  <title/>\n</project>\n", project),
            );
        for package in packages.iter() {
            tier = tier.with_document(
                &format!("/source/{}/{}/_meta", project, package),
                &format!(
                    "<package name=\"{}\" project=\"{}\"><title/></package>",
                    package, project
                ),
            );
        }
    }
    tier
}

const FIXTURE: &[Project<'static>] = &[
    ("apache", &["apache2", "httpd"]),
    ("zlib", &["zlib", "minizip"]),
];

fn options(concurrency: usize) -> TraversalOptions {
    TraversalOptions {
        concurrency,
        ..TraversalOptions::new(TreePath::new("/source").unwrap())
    }
}

async fn run(api: &MockTier, backend: &MockTier, options: TraversalOptions) -> ConsistencyReport {
    let tiers = Tiers::new(Arc::new(api.clone()), Arc::new(backend.clone()));
    TraversalDriver::new(tiers, options).run().await
}

fn entries(report: &ConsistencyReport) -> Vec<(DiscrepancyKind, String)> {
    report
        .discrepancies()
        .iter()
        .map(|d| (d.kind, d.path.to_string()))
        .collect()
}

mod listing_comparison {
    use super::*;

    #[tokio::test]
    async fn identical_tiers_are_clean() {
        let api = fixture(TierKind::Api, FIXTURE);
        let backend = fixture(TierKind::Backend, FIXTURE);

        let report = run(&api, &backend, options(1)).await;
        assert!(report.is_clean(), "{:?}", report.discrepancies());
    }

    #[tokio::test]
    async fn project_only_on_api_is_missing_in_backend() {
        let api = fixture(TierKind::Api, &[("apache", &[]), ("zlib", &[])]);
        let backend = fixture(TierKind::Backend, &[("apache", &[])]);

        let report = run(&api, &backend, options(1)).await;
        assert_eq!(
            entries(&report),
            vec![(DiscrepancyKind::MissingInBackend, "/source/zlib".to_string())]
        );
        assert!(report.discrepancies()[0].detail.contains("'zlib'"));
    }

    #[tokio::test]
    async fn package_differences_are_scoped_to_project() {
        let api = fixture(TierKind::Api, &[("apache", &["httpd", "mod_ssl"])]);
        let backend = fixture(TierKind::Backend, &[("apache", &["apache2", "httpd"])]);

        let report = run(
            &api,
            &backend,
            TraversalOptions {
                phase: Phase::Lists,
                ..options(1)
            },
        )
        .await;
        assert_eq!(
            entries(&report),
            vec![
                (
                    DiscrepancyKind::MissingInApi,
                    "/source/apache/apache2".to_string()
                ),
                (
                    DiscrepancyKind::MissingInBackend,
                    "/source/apache/mod_ssl".to_string()
                ),
            ]
        );
    }

    #[tokio::test]
    async fn duplicates_are_reported_only_when_enabled() {
        let api = fixture(TierKind::Api, FIXTURE).with_listing("/source", &["apache", "zlib", "zlib"]);
        let backend = fixture(TierKind::Backend, FIXTURE);

        let collapsed = run(&api, &backend, options(1)).await;
        assert!(collapsed.is_clean());

        let flagged = run(
            &api,
            &backend,
            TraversalOptions {
                diff: DiffOptions {
                    flag_duplicates: true,
                },
                phase: Phase::Lists,
                ..options(1)
            },
        )
        .await;
        assert_eq!(
            entries(&flagged),
            vec![(DiscrepancyKind::DuplicateEntry, "/source/zlib".to_string())]
        );
    }
}

mod round_trip {
    use super::*;

    #[tokio::test]
    async fn stable_documents_only_touch_the_api() {
        let api = fixture(TierKind::Api, FIXTURE);
        let backend = fixture(TierKind::Backend, FIXTURE);

        let report = run(&api, &backend, options(1)).await;
        assert!(report.is_clean());
        assert_eq!(
            api.puts(),
            vec![
                "/source/apache/_meta",
                "/source/apache/apache2/_meta",
                "/source/apache/httpd/_meta",
                "/source/zlib/_meta",
                "/source/zlib/zlib/_meta",
                "/source/zlib/minizip/_meta",
            ]
        );
        assert!(backend.puts().is_empty());
    }

    #[tokio::test]
    async fn cosmetic_rewrite_is_a_mismatch() {
        let api = fixture(TierKind::Api, &[("foo", &["foo"])]).with_rewrite(|path, body| {
            if path == "/source/foo/foo/_meta" {
                body.replace("<title/>", "<title></title>")
            } else {
                body.to_string()
            }
        });
        let backend = fixture(TierKind::Backend, &[("foo", &["foo"])]);

        let report = run(&api, &backend, options(1)).await;
        assert_eq!(
            entries(&report),
            vec![(
                DiscrepancyKind::RoundTripMismatch,
                "/source/foo/foo/_meta".to_string()
            )]
        );
        let detail = &report.discrepancies()[0].detail;
        assert!(detail.contains("sha256"));
        assert!(detail.contains("></title></package>"));
    }

    #[tokio::test]
    async fn missing_package_meta_is_a_fetch_failure() {
        let api = fixture(TierKind::Api, FIXTURE);
        api.remove_document("/source/apache/httpd/_meta");
        let backend = fixture(TierKind::Backend, FIXTURE);

        let report = run(&api, &backend, options(1)).await;
        assert_eq!(
            entries(&report),
            vec![(
                DiscrepancyKind::FetchFailed,
                "/source/apache/httpd/_meta".to_string()
            )]
        );
    }

    #[tokio::test]
    async fn rejected_write_does_not_stop_siblings() {
        let api = fixture(TierKind::Api, FIXTURE).fail_on(FailOn::Put {
            path: "/source/apache/apache2/_meta".into(),
            error: TierError::Rejected {
                status: 400,
                message: "validation failed".into(),
            },
        });
        let backend = fixture(TierKind::Backend, FIXTURE);

        let report = run(&api, &backend, options(1)).await;
        assert_eq!(
            entries(&report),
            vec![(
                DiscrepancyKind::WriteFailed,
                "/source/apache/apache2/_meta".to_string()
            )]
        );
        assert!(api.puts().contains(&"/source/apache/httpd/_meta".to_string()));
    }
}

mod failure_isolation {
    use super::*;

    const WITH_BROKEN: &[Project<'static>] = &[
        ("apache", &["httpd"]),
        ("broken", &["ghost"]),
        ("zlib", &["zlib"]),
    ];

    #[tokio::test]
    async fn broken_project_listing_yields_one_discrepancy() {
        let api = fixture(TierKind::Api, WITH_BROKEN).fail_on(FailOn::Get {
            path: "/source/broken".into(),
            error: TierError::Transport("connection reset by peer".into()),
        });
        let backend = fixture(TierKind::Backend, WITH_BROKEN);

        let report = run(&api, &backend, options(1)).await;
        assert_eq!(
            entries(&report),
            vec![(DiscrepancyKind::ListFailed, "/source/broken".to_string())]
        );
        assert!(report.discrepancies()[0].detail.contains("connection reset"));

        let puts = api.puts();
        assert!(puts.contains(&"/source/zlib/_meta".to_string()));
        assert!(puts.contains(&"/source/zlib/zlib/_meta".to_string()));
        assert!(!puts.contains(&"/source/broken/ghost/_meta".to_string()));
    }

    const TWO_PACKAGES: &[Project<'static>] = &[("apache", &["httpd", "zlib"])];

    #[tokio::test]
    async fn unusable_package_name_does_not_hide_siblings() {
        let api = fixture(TierKind::Api, TWO_PACKAGES)
            .with_listing("/source/apache", &["httpd", "..", "zlib"])
            .with_rewrite(|path, body| {
                if path == "/source/apache/_meta" {
                    body.to_string()
                } else {
                    format!("{}\n", body)
                }
            });
        let backend = fixture(TierKind::Backend, TWO_PACKAGES)
            .with_listing("/source/apache", &["httpd", "..", "zlib"]);

        let report = run(&api, &backend, options(1)).await;
        assert_eq!(
            entries(&report),
            vec![
                (
                    DiscrepancyKind::RoundTripMismatch,
                    "/source/apache/httpd/_meta".to_string()
                ),
                (DiscrepancyKind::ListFailed, "/source/apache".to_string()),
                (
                    DiscrepancyKind::RoundTripMismatch,
                    "/source/apache/zlib/_meta".to_string()
                ),
            ]
        );
        assert!(report.discrepancies()[1]
            .detail
            .contains("unusable package name '..'"));
        assert_eq!(
            api.puts(),
            vec![
                "/source/apache/_meta",
                "/source/apache/httpd/_meta",
                "/source/apache/zlib/_meta",
            ]
        );
    }

    #[tokio::test]
    async fn unusable_project_name_does_not_hide_siblings() {
        let api = fixture(TierKind::Api, FIXTURE).with_listing("/source", &["apache", "a/b", "zlib"]);
        let backend =
            fixture(TierKind::Backend, FIXTURE).with_listing("/source", &["apache", "a/b", "zlib"]);

        let report = run(&api, &backend, options(1)).await;
        assert_eq!(
            entries(&report),
            vec![(DiscrepancyKind::ListFailed, "/source".to_string())]
        );
        assert!(report.discrepancies()[0]
            .detail
            .contains("unusable project name 'a/b'"));
        assert_eq!(api.puts().len(), 6);
    }

    #[tokio::test]
    async fn unreachable_backend_still_round_trips() {
        let api = fixture(TierKind::Api, FIXTURE);
        let backend = MockTier::new(TierKind::Backend).fail_on(FailOn::Get {
            path: "/source".into(),
            error: TierError::Transport("connection refused".into()),
        });

        let report = run(&api, &backend, options(1)).await;
        assert_eq!(report.summary().get(&DiscrepancyKind::ListFailed), Some(&1));
        assert_eq!(report.summary().get(&DiscrepancyKind::PathMissing), Some(&2));
        assert_eq!(api.puts().len(), 6);
    }
}

mod ordering {
    use super::*;

    const WIDE: &[Project<'static>] = &[
        ("alpha", &["p1", "p2", "p3", "p4", "p5", "p6"]),
        ("beta", &["q1", "q2", "q3"]),
    ];

    fn unstable_api() -> MockTier {
        let api = fixture(TierKind::Api, WIDE).with_rewrite(|path, body| {
            if path.ends_with("/p5/_meta") || path.ends_with("/q1/_meta") {
                format!("{}\n", body)
            } else {
                body.to_string()
            }
        });
        api.remove_document("/source/alpha/p2/_meta");
        api
    }

    #[tokio::test]
    async fn concurrent_verification_matches_sequential_order() {
        let backend = fixture(TierKind::Backend, WIDE);

        let sequential = run(&unstable_api(), &backend, options(1)).await;
        let concurrent = run(&unstable_api(), &backend, options(4)).await;

        let expected = vec![
            (
                DiscrepancyKind::FetchFailed,
                "/source/alpha/p2/_meta".to_string(),
            ),
            (
                DiscrepancyKind::RoundTripMismatch,
                "/source/alpha/p5/_meta".to_string(),
            ),
            (
                DiscrepancyKind::RoundTripMismatch,
                "/source/beta/q1/_meta".to_string(),
            ),
        ];
        assert_eq!(entries(&sequential), expected);
        assert_eq!(entries(&concurrent), expected);
    }

    #[tokio::test]
    async fn projects_follow_api_listing_order() {
        let api = fixture(TierKind::Api, FIXTURE).with_listing("/source", &["zlib", "apache"]);
        let backend = fixture(TierKind::Backend, FIXTURE);

        let report = run(&api, &backend, options(1)).await;
        assert!(report.is_clean());
        assert_eq!(api.puts()[0], "/source/zlib/_meta");
    }
}
