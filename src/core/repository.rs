use crate::core::query::EntryQuery;
use crate::core::version::Staleness;
use crate::domain::model::{Entry, Environment, Project, Snapshot};
use crate::domain::ports::CmsClient;
use crate::utils::error::{classify, CmsError, Result};
use crate::utils::observer::{RepositoryObserver, TracingObserver};
use crate::utils::validation::require_argument;
use std::future::Future;

pub const PROJECT_CONTENT_TYPE: &str = "project";
pub const SLUG_FIELD: &str = "fields.slug";
/// Reference expansion for reads.
pub const READ_INCLUDE_DEPTH: u8 = 10;
/// Reference expansion when walking a project to publish it.
pub const PUBLISH_INCLUDE_DEPTH: u8 = 8;

fn project_query(slug: &str, depth: u8) -> EntryQuery {
    EntryQuery::content_type(PROJECT_CONTENT_TYPE)
        .field_equals(SLUG_FIELD, slug)
        .include(depth)
}

/// Which included entries `publish_project_with` republishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PublishPolicy {
    /// Republish every included entry at its latest version.
    #[default]
    Always,
    /// Only republish entries whose latest version is ahead of the published one.
    WhenStale,
}

/// Repository facade over the CMS: fetches projects, reads and writes
/// entries, and republishes stale content.
pub struct ContentRepository<C: CmsClient, O: RepositoryObserver = TracingObserver> {
    client: C,
    observer: O,
}

impl<C: CmsClient> ContentRepository<C> {
    pub fn new(client: C) -> Self {
        Self {
            client,
            observer: TracingObserver,
        }
    }
}

impl<C: CmsClient, O: RepositoryObserver> ContentRepository<C, O> {
    pub fn with_observer<P: RepositoryObserver>(self, observer: P) -> ContentRepository<C, P> {
        ContentRepository {
            client: self.client,
            observer,
        }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    /// Runs one boundary call, reporting start/finish and classifying any failure.
    async fn call<T, F>(&self, operation: &'static str, input: &str, fut: F) -> Result<T>
    where
        F: Future<Output = std::result::Result<T, CmsError>>,
    {
        self.observer.boundary_started(operation, input);
        match fut.await {
            Ok(value) => {
                self.observer.boundary_finished(operation, input);
                Ok(value)
            }
            Err(cause) => {
                let err = classify(operation, input, cause);
                self.observer.boundary_failed(operation, input, &err);
                Err(err)
            }
        }
    }

    /// Looks up the project with `slug` together with its included entries and assets.
    ///
    /// Returns `None` when nothing matches. When several projects share the
    /// slug the first one returned by the CMS wins and a warning is emitted.
    pub async fn fetch_aggregate(&self, slug: &str, use_preview: bool) -> Result<Option<Project>> {
        let slug = require_argument("slug", slug)?;
        let query = project_query(slug, READ_INCLUDE_DEPTH);
        self.observer.query_built("fetch_aggregate", &query.build());
        self.fetch_project("fetch_aggregate", slug, &query, use_preview)
            .await
    }

    async fn fetch_project(
        &self,
        operation: &'static str,
        slug: &str,
        query: &EntryQuery,
        use_preview: bool,
    ) -> Result<Option<Project>> {
        let collection = self
            .call(operation, slug, self.client.search_entries(query, use_preview))
            .await?;

        let matches = collection.items.len();
        let Some(root) = collection.items.into_iter().next() else {
            self.observer.aggregate_missing(slug);
            return Ok(None);
        };
        if matches > 1 {
            self.observer.duplicate_slug(slug, matches);
        }

        Ok(Some(Project::resolve(
            root,
            collection.included_entries,
            collection.included_assets,
        )))
    }

    pub async fn get_management_entry(&self, id: &str) -> Result<Entry> {
        let id = require_argument("id", id)?;
        self.call(
            "get_management_entry",
            id,
            self.client.get_management_entry(id),
        )
        .await
    }

    /// Writes `entry` using its current version as the concurrency token.
    ///
    /// A version mismatch comes back as a content error; callers re-fetch and retry.
    pub async fn update_entry(&self, entry: &Entry) -> Result<Entry> {
        let id = require_argument("entry", entry.id())?;
        self.call(
            "update_entry",
            id,
            self.client.create_or_update_entry(entry, entry.sys.version),
        )
        .await
    }

    pub async fn get_latest_snapshot(&self, id: &str) -> Result<Option<Snapshot>> {
        let id = require_argument("id", id)?;
        let snapshots = self
            .call(
                "get_latest_snapshot",
                id,
                self.client.get_snapshots_for_entry(id),
            )
            .await?;
        Ok(snapshots.into_iter().next())
    }

    pub async fn create_environment(&self, id: &str, name: &str) -> Result<Environment> {
        let name = require_argument("name", name)?;
        self.call(
            "create_environment",
            name,
            self.client.create_or_update_environment(id, name),
        )
        .await
    }

    /// Publishes entry `id` if it has unpublished edits and returns its published version.
    ///
    /// Calling it again with no intervening edit is a no-op that returns the same version.
    pub async fn publish_item(&self, id: &str) -> Result<u32> {
        let id = require_argument("id", id)?;
        let entry = self.get_management_entry(id).await?;
        self.publish_if_stale("publish_item", &entry).await
    }

    async fn publish_if_stale(&self, operation: &'static str, entry: &Entry) -> Result<u32> {
        match Staleness::of(entry) {
            Staleness::Current { published } => {
                self.observer.publish_skipped(entry.id(), published);
                Ok(published)
            }
            Staleness::Stale { latest, .. } => self.publish_at(operation, entry.id(), latest).await,
        }
    }

    async fn publish_at(&self, operation: &'static str, id: &str, version: u32) -> Result<u32> {
        let published = self
            .call(operation, id, self.client.publish_entry(id, version))
            .await?;
        self.observer
            .republish_quirk(id, version, published.sys.version);

        let Some(published_version) = published.published_version() else {
            let err = classify(
                operation,
                id,
                CmsError::Unexpected(format!("publish of {} returned no published version", id)),
            );
            self.observer.boundary_failed(operation, id, &err);
            return Err(err);
        };
        self.observer.entry_published(id, published_version);
        Ok(published_version)
    }

    /// Republishes every entry included by project `slug`, returning the ids published.
    ///
    /// The project root and its assets are not published. Returns `None` when
    /// no project matches the slug.
    pub async fn publish_project(&self, slug: &str) -> Result<Option<Vec<String>>> {
        self.publish_project_with(slug, PublishPolicy::Always).await
    }

    pub async fn publish_project_with(
        &self,
        slug: &str,
        policy: PublishPolicy,
    ) -> Result<Option<Vec<String>>> {
        let slug = require_argument("slug", slug)?;
        let query = project_query(slug, PUBLISH_INCLUDE_DEPTH);
        self.observer.publish_query_built(&query.build());
        let Some(project) = self
            .fetch_project("publish_project", slug, &query, false)
            .await?
        else {
            return Ok(None);
        };

        let mut published_ids = Vec::new();
        for included in project.included_entries() {
            // Delivery entries carry no versions, so re-read each one from management.
            let entry = self.get_management_entry(included.id()).await?;
            let version = match (policy, Staleness::of(&entry)) {
                (PublishPolicy::WhenStale, Staleness::Current { published }) => {
                    self.observer.publish_skipped(entry.id(), published);
                    continue;
                }
                _ => entry.latest_version(),
            };
            self.publish_at("publish_project", entry.id(), version).await?;
            published_ids.push(entry.id().to_string());
        }

        Ok(Some(published_ids))
    }
}
