use crate::core::query::EntryQuery;
use crate::domain::model::{Entry, EntryCollection, Environment, Snapshot};
use crate::utils::error::CmsError;
use async_trait::async_trait;

/// The hosted CMS, split into its delivery (read, no versions) and
/// management (versioned, writable) boundaries.
#[async_trait]
pub trait CmsClient: Send + Sync {
    async fn search_entries(
        &self,
        query: &EntryQuery,
        use_preview: bool,
    ) -> Result<EntryCollection, CmsError>;

    async fn get_management_entry(&self, id: &str) -> Result<Entry, CmsError>;

    /// Writes `entry`; `expected_version` is the optimistic-concurrency token.
    async fn create_or_update_entry(
        &self,
        entry: &Entry,
        expected_version: Option<u32>,
    ) -> Result<Entry, CmsError>;

    async fn publish_entry(&self, id: &str, version: u32) -> Result<Entry, CmsError>;

    /// Most recent first.
    async fn get_snapshots_for_entry(&self, id: &str) -> Result<Vec<Snapshot>, CmsError>;

    async fn create_or_update_environment(
        &self,
        id: &str,
        name: &str,
    ) -> Result<Environment, CmsError>;
}
