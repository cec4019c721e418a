//! Structured observability hooks for repository operations.
//!
//! The repository never formats log lines itself; it calls a
//! [`RepositoryObserver`] at fixed points around each CMS boundary call.
//! [`TracingObserver`] turns those calls into `tracing` events such as
//! `event=cms.call.failed operation=publish_item input=abc`.

use crate::utils::error::RepositoryError;
use tracing::{debug, error, info, warn};

pub trait RepositoryObserver: Send + Sync {
    fn boundary_started(&self, _operation: &'static str, _input: &str) {}

    fn boundary_finished(&self, _operation: &'static str, _input: &str) {}

    /// Called exactly once per classified failure.
    fn boundary_failed(&self, _operation: &'static str, _input: &str, _error: &RepositoryError) {}

    fn query_built(&self, _operation: &'static str, _query: &str) {}

    /// Query that selects the project whose included entries will be republished.
    fn publish_query_built(&self, _query: &str) {}

    fn aggregate_missing(&self, _slug: &str) {}

    fn duplicate_slug(&self, _slug: &str, _matches: usize) {}

    fn publish_skipped(&self, _id: &str, _published_version: u32) {}

    fn entry_published(&self, _id: &str, _published_version: u32) {}

    /// The CMS bumps an entry's version on every publish, whether or not content changed.
    fn republish_quirk(&self, _id: &str, _requested_version: u32, _resulting_version: Option<u32>) {}
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl RepositoryObserver for TracingObserver {
    fn boundary_started(&self, operation: &'static str, input: &str) {
        debug!(event = "cms.call.started", operation = operation, input = %input);
    }

    fn boundary_finished(&self, operation: &'static str, input: &str) {
        debug!(event = "cms.call.finished", operation = operation, input = %input);
    }

    fn boundary_failed(&self, operation: &'static str, input: &str, err: &RepositoryError) {
        let cause = std::error::Error::source(err).map(ToString::to_string);
        error!(
            event = "cms.call.failed",
            operation = operation,
            input = %input,
            retryable = err.is_retryable(),
            cause = cause.as_deref().unwrap_or(""),
            "{}",
            err
        );
    }

    fn query_built(&self, operation: &'static str, query: &str) {
        debug!(event = "cms.query", operation = operation, query = %query);
    }

    fn publish_query_built(&self, query: &str) {
        info!(event = "cms.query.publish", operation = "publish_project", query = %query);
    }

    fn aggregate_missing(&self, slug: &str) {
        warn!(
            event = "project.missing",
            slug = %slug,
            "No pieces of targetable content found with the slug"
        );
    }

    fn duplicate_slug(&self, slug: &str, matches: usize) {
        warn!(
            event = "project.duplicate_slug",
            slug = %slug,
            matches = matches,
            "Multiple pieces of targetable content found with the same slug"
        );
    }

    fn publish_skipped(&self, id: &str, published_version: u32) {
        info!(event = "entry.publish_skipped", id = %id, published_version = published_version);
    }

    fn entry_published(&self, id: &str, published_version: u32) {
        info!(event = "entry.published", id = %id, published_version = published_version);
    }

    fn republish_quirk(&self, id: &str, requested_version: u32, resulting_version: Option<u32>) {
        debug!(
            event = "entry.version_bumped",
            id = %id,
            requested_version = requested_version,
            resulting_version = ?resulting_version,
            "CMS increments the entry version on every publish"
        );
    }
}
