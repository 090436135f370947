//! engine::driver
//!
//! Recursive descent over the source tree.
//!
//! # Stages
//!
//! ```text
//! ListingProjects -> PerVerifyPackage(project)* -> Done
//! ```
//!
//! - **ListingProjects**: list the root on both tiers and diff the listings.
//! - **PerVerifyPackage(project)**: for every project the API lists, in
//!   listing order: round-trip the project's metadata, list its packages on
//!   both tiers, diff them, then round-trip every package's metadata.
//! - **Done**: stamp and return the report.
//!
//! # Failure Semantics
//!
//! Every tier failure becomes a discrepancy on the path it concerns and
//! traversal moves on to the next sibling. Nothing aborts a run.
//!
//! A name listed twice is visited once.
//!
//! # Absent Paths
//!
//! A listing that is absent on a tier counts as empty. When exactly one tier
//! lacks the path, a `PathMissing` discrepancy is recorded, unless the
//! parent's diff already reported that node as missing on that tier.
//!
//! # Concurrency
//!
//! Packages of one project may be verified concurrently. Results are
//! buffered in listing order and each project's discrepancies are appended
//! to the report in one step, so the report never depends on scheduling.

use std::collections::BTreeSet;

use futures::stream::{self, StreamExt};
use tracing::{debug, info};

use super::differ::{diff_with, DiffOptions};
use super::lister::{Listing, TreeLister};
use super::report::{ConsistencyReport, Discrepancy, DiscrepancyKind};
use super::roundtrip::RoundTripVerifier;
use crate::core::types::{TierKind, TreePath};
use crate::tier::{TierError, Tiers};

/// Which checks a run performs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Phase {
    /// Listing comparison and round trips.
    #[default]
    All,
    /// Listing comparison only.
    Lists,
    /// Round trips only.
    Resubmit,
}

impl Phase {
    fn compares_lists(self) -> bool {
        matches!(self, Phase::All | Phase::Lists)
    }

    fn resubmits(self) -> bool {
        matches!(self, Phase::All | Phase::Resubmit)
    }
}

/// Settings for one traversal.
#[derive(Debug, Clone)]
pub struct TraversalOptions {
    /// Root of the tree; its children are projects
    pub root: TreePath,
    /// Packages verified at once within one project
    pub concurrency: usize,
    pub phase: Phase,
    pub diff: DiffOptions,
}

impl TraversalOptions {
    /// Sequential, all-phase traversal below `root`.
    pub fn new(root: TreePath) -> Self {
        Self {
            root,
            concurrency: 1,
            phase: Phase::All,
            diff: DiffOptions::default(),
        }
    }
}

/// Drives listing comparison and round trips over the whole tree.
#[derive(Debug)]
pub struct TraversalDriver {
    lister: TreeLister,
    verifier: RoundTripVerifier,
    options: TraversalOptions,
}

/// Where the traversal stands.
enum Stage {
    ListingProjects,
    PerVerifyPackage {
        projects: std::vec::IntoIter<String>,
        backend_projects: Option<BTreeSet<String>>,
    },
    Done,
}

/// The root listing as both tiers reported it.
struct RootListing {
    /// Projects the API lists, in listing order
    projects: Vec<String>,
    /// Projects the backend lists, if its listing succeeded
    backend_projects: Option<BTreeSet<String>>,
}

impl TraversalDriver {
    /// Create a driver. The API tier is authoritative for round trips.
    pub fn new(tiers: Tiers, options: TraversalOptions) -> Self {
        let verifier = RoundTripVerifier::new(tiers.api.clone());
        Self {
            lister: TreeLister::new(tiers),
            verifier,
            options,
        }
    }

    /// Walk the tree and collect every discrepancy.
    pub async fn run(&self) -> ConsistencyReport {
        let mut report = ConsistencyReport::begin();
        info!(
            run_id = %report.run_id,
            root = %self.options.root,
            phase = ?self.options.phase,
            concurrency = self.options.concurrency,
            "consistency run started"
        );

        let mut stage = Stage::ListingProjects;
        loop {
            stage = match stage {
                Stage::ListingProjects => {
                    let mut bucket = Vec::new();
                    let listing = self.list_projects(&mut bucket).await;
                    report.extend_path(bucket);
                    Stage::PerVerifyPackage {
                        projects: listing.projects.into_iter(),
                        backend_projects: listing.backend_projects,
                    }
                }
                Stage::PerVerifyPackage {
                    mut projects,
                    backend_projects,
                } => match projects.next() {
                    Some(project) => {
                        let reported_missing = backend_projects
                            .as_ref()
                            .is_some_and(|listed| !listed.contains(&project));
                        let bucket = self.visit_project(&project, reported_missing).await;
                        report.extend_path(bucket);
                        Stage::PerVerifyPackage {
                            projects,
                            backend_projects,
                        }
                    }
                    None => Stage::Done,
                },
                Stage::Done => break,
            };
        }

        let report = report.finish();
        info!(
            run_id = %report.run_id,
            discrepancies = report.len(),
            "consistency run finished"
        );
        report
    }

    /// List the root on both tiers and diff the listings.
    async fn list_projects(&self, bucket: &mut Vec<Discrepancy>) -> RootListing {
        let root = &self.options.root;

        let api = self.lister.list(TierKind::Api, root).await;
        if !self.options.phase.compares_lists() {
            let projects = match api {
                Ok(listing) => listing.into_names(),
                Err(e) => {
                    bucket.push(list_failed(root, TierKind::Api, &e));
                    Vec::new()
                }
            };
            return RootListing {
                projects: unique(projects),
                backend_projects: None,
            };
        }

        let backend = self.lister.list(TierKind::Backend, root).await;
        let (api_names, backend_names) = self.compare_listings(root, api, backend, false, bucket);

        RootListing {
            projects: unique(api_names),
            backend_projects: backend_names.map(|names| names.into_iter().collect()),
        }
    }

    /// Verify one project and everything below it.
    ///
    /// `reported_missing` is true when the root diff already flagged the
    /// project as absent from the backend.
    async fn visit_project(&self, name: &str, reported_missing: bool) -> Vec<Discrepancy> {
        let mut bucket = Vec::new();
        let project = match self.options.root.child(name) {
            Ok(path) => path,
            Err(e) => {
                bucket.push(Discrepancy::new(
                    self.options.root.clone(),
                    DiscrepancyKind::ListFailed,
                    format!("unusable project name '{}': {}", name, e),
                ));
                return bucket;
            }
        };
        debug!(%project, "visiting project");

        if self.options.phase.resubmits() {
            if let Err(d) = self.verifier.verify(&project).await {
                bucket.push(d);
            }
        }

        let api = self.lister.list(TierKind::Api, &project).await;
        let packages = if self.options.phase.compares_lists() {
            let backend = self.lister.list(TierKind::Backend, &project).await;
            self.compare_listings(&project, api, backend, reported_missing, &mut bucket)
                .0
        } else {
            match api {
                Ok(listing) => listing.into_names(),
                Err(e) => {
                    bucket.push(list_failed(&project, TierKind::Api, &e));
                    Vec::new()
                }
            }
        };

        if self.options.phase.resubmits() {
            let packages = unique(packages);
            bucket.extend(self.verify_packages(&project, &packages).await);
        }

        bucket
    }

    /// Round-trip every package of `project`, returning discrepancies in
    /// listing order.
    async fn verify_packages(&self, project: &TreePath, packages: &[String]) -> Vec<Discrepancy> {
        let concurrency = self.options.concurrency.max(1);

        let results: Vec<Option<Discrepancy>> = stream::iter(packages)
            .map(|name| async move {
                let package = match project.child(name) {
                    Ok(path) => path,
                    Err(e) => {
                        return Some(Discrepancy::new(
                            project.clone(),
                            DiscrepancyKind::ListFailed,
                            format!("unusable package name '{}': {}", name, e),
                        ))
                    }
                };
                self.verifier.verify(&package).await.err()
            })
            .buffered(concurrency)
            .collect()
            .await;

        results.into_iter().flatten().collect()
    }

    /// Turn both listings of `path` into discrepancies.
    ///
    /// Returns the API names (empty unless the API listing succeeded) and the
    /// backend names (`None` if the backend listing failed).
    fn compare_listings(
        &self,
        path: &TreePath,
        api: Result<Listing, TierError>,
        backend: Result<Listing, TierError>,
        backend_absence_reported: bool,
        bucket: &mut Vec<Discrepancy>,
    ) -> (Vec<String>, Option<Vec<String>>) {
        let api = api.map_err(|e| bucket.push(list_failed(path, TierKind::Api, &e)));
        let backend = backend.map_err(|e| bucket.push(list_failed(path, TierKind::Backend, &e)));

        match (api, backend) {
            (Ok(api), Ok(backend)) => {
                match (api.is_absent(), backend.is_absent()) {
                    (false, true) if !backend_absence_reported => {
                        bucket.push(path_missing(path, TierKind::Backend));
                    }
                    (true, false) => bucket.push(path_missing(path, TierKind::Api)),
                    _ => {}
                }
                let api_names = api.into_names();
                let backend_names = backend.into_names();
                bucket.extend(diff_with(
                    &api_names,
                    &backend_names,
                    path,
                    self.options.diff,
                ));
                (api_names, Some(backend_names))
            }
            (Ok(api), Err(())) => (api.into_names(), None),
            (Err(()), Ok(backend)) => (Vec::new(), Some(backend.into_names())),
            (Err(()), Err(())) => (Vec::new(), None),
        }
    }
}

/// Names in first-seen order, repeats dropped.
fn unique(names: Vec<String>) -> Vec<String> {
    let mut seen = BTreeSet::new();
    names
        .into_iter()
        .filter(|name| seen.insert(name.clone()))
        .collect()
}

fn list_failed(path: &TreePath, tier: TierKind, error: &TierError) -> Discrepancy {
    Discrepancy::new(
        path.clone(),
        DiscrepancyKind::ListFailed,
        format!("{} listing failed: {}", tier, error),
    )
}

fn path_missing(path: &TreePath, absent_on: TierKind) -> Discrepancy {
    Discrepancy::new(
        path.clone(),
        DiscrepancyKind::PathMissing,
        format!(
            "listed by {} but absent on {}",
            absent_on.other(),
            absent_on
        ),
    )
}
