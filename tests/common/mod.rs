#![allow(dead_code)]

use async_trait::async_trait;
use content_repo::core::query::EntryQuery;
use content_repo::domain::model::{Fields, SystemProperties};
use content_repo::{
    Asset, CmsClient, CmsError, Entry, EntryCollection, Environment, FieldValue, RepositoryError,
    RepositoryObserver, Snapshot,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    /// The CMS answers with an error document.
    Api,
    /// Anything else: broken payloads, dropped connections.
    Broken,
}

#[derive(Default)]
pub struct CallCounts {
    pub search: AtomicUsize,
    pub get: AtomicUsize,
    pub update: AtomicUsize,
    pub publish: AtomicUsize,
    pub snapshots: AtomicUsize,
    pub environment: AtomicUsize,
}

impl CallCounts {
    pub fn total(&self) -> usize {
        [
            &self.search,
            &self.get,
            &self.update,
            &self.publish,
            &self.snapshots,
            &self.environment,
        ]
        .iter()
        .map(|c| c.load(Ordering::SeqCst))
        .sum()
    }
}

/// In-memory CMS with per-operation call counters.
#[derive(Default)]
pub struct FakeCms {
    pub calls: CallCounts,
    searches: Mutex<HashMap<String, EntryCollection>>,
    entries: Mutex<HashMap<String, Entry>>,
    snapshots: Mutex<HashMap<String, Vec<Snapshot>>>,
    queries: Mutex<Vec<(EntryQuery, bool)>>,
    published: Mutex<Vec<(String, u32)>>,
    failure: Mutex<Option<Failure>>,
    fail_publish_of: Mutex<Option<String>>,
    bump_on_publish: Mutex<bool>,
}

impl FakeCms {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_project(self, slug: &str, collection: EntryCollection) -> Self {
        self.searches
            .lock()
            .unwrap()
            .insert(slug.to_string(), collection);
        self
    }

    pub fn with_entry(self, entry: Entry) -> Self {
        self.entries
            .lock()
            .unwrap()
            .insert(entry.id().to_string(), entry);
        self
    }

    pub fn with_snapshots(self, id: &str, snapshots: Vec<Snapshot>) -> Self {
        self.snapshots
            .lock()
            .unwrap()
            .insert(id.to_string(), snapshots);
        self
    }

    pub fn failing(self, failure: Failure) -> Self {
        *self.failure.lock().unwrap() = Some(failure);
        self
    }

    pub fn failing_publish_of(self, id: &str) -> Self {
        *self.fail_publish_of.lock().unwrap() = Some(id.to_string());
        self
    }

    /// Mimics the CMS bumping `version` on every publish.
    pub fn bumping_versions_on_publish(self) -> Self {
        *self.bump_on_publish.lock().unwrap() = true;
        self
    }

    pub fn edit(&self, id: &str) {
        if let Some(entry) = self.entries.lock().unwrap().get_mut(id) {
            entry.sys.version = Some(entry.latest_version() + 1);
        }
    }

    pub fn entry(&self, id: &str) -> Option<Entry> {
        self.entries.lock().unwrap().get(id).cloned()
    }

    pub fn queries(&self) -> Vec<(EntryQuery, bool)> {
        self.queries.lock().unwrap().clone()
    }

    pub fn published(&self) -> Vec<(String, u32)> {
        self.published.lock().unwrap().clone()
    }

    pub fn publish_calls(&self) -> usize {
        self.calls.publish.load(Ordering::SeqCst)
    }

    fn check_failure(&self) -> Result<(), CmsError> {
        match *self.failure.lock().unwrap() {
            Some(Failure::Api) => Err(api_error(400, "InvalidQuery", "The query you sent was invalid")),
            Some(Failure::Broken) => Err(CmsError::from(
                serde_json::from_str::<serde_json::Value>("{\"items\": [").unwrap_err(),
            )),
            None => Ok(()),
        }
    }
}

pub fn api_error(status: u16, error_id: &str, message: &str) -> CmsError {
    CmsError::Api {
        status,
        error_id: error_id.to_string(),
        message: message.to_string(),
        request_id: Some("req-1".to_string()),
    }
}

#[async_trait]
impl CmsClient for FakeCms {
    async fn search_entries(
        &self,
        query: &EntryQuery,
        use_preview: bool,
    ) -> Result<EntryCollection, CmsError> {
        self.calls.search.fetch_add(1, Ordering::SeqCst);
        self.queries.lock().unwrap().push((query.clone(), use_preview));
        self.check_failure()?;

        let slug = query
            .field_filters()
            .iter()
            .find(|(field, _)| field == "fields.slug")
            .map(|(_, value)| value.clone())
            .unwrap_or_default();
        Ok(self
            .searches
            .lock()
            .unwrap()
            .get(&slug)
            .cloned()
            .unwrap_or_default())
    }

    async fn get_management_entry(&self, id: &str) -> Result<Entry, CmsError> {
        self.calls.get.fetch_add(1, Ordering::SeqCst);
        self.check_failure()?;
        self.entry(id)
            .ok_or_else(|| api_error(404, "NotFound", "The resource could not be found."))
    }

    async fn create_or_update_entry(
        &self,
        entry: &Entry,
        expected_version: Option<u32>,
    ) -> Result<Entry, CmsError> {
        self.calls.update.fetch_add(1, Ordering::SeqCst);
        self.check_failure()?;

        let mut entries = self.entries.lock().unwrap();
        let current = entries.get(entry.id()).and_then(|e| e.sys.version);
        if current != expected_version {
            return Err(api_error(409, "VersionMismatch", "Version mismatch error"));
        }
        let mut stored = entry.clone();
        stored.sys.version = Some(current.unwrap_or_default() + 1);
        entries.insert(stored.id().to_string(), stored.clone());
        Ok(stored)
    }

    async fn publish_entry(&self, id: &str, version: u32) -> Result<Entry, CmsError> {
        self.calls.publish.fetch_add(1, Ordering::SeqCst);
        self.check_failure()?;
        if self.fail_publish_of.lock().unwrap().as_deref() == Some(id) {
            return Err(api_error(422, "ValidationFailed", "Validation error"));
        }

        let bump = *self.bump_on_publish.lock().unwrap();
        let mut entries = self.entries.lock().unwrap();
        let entry = entries
            .get_mut(id)
            .ok_or_else(|| api_error(404, "NotFound", "The resource could not be found."))?;
        if entry.sys.version != Some(version) {
            return Err(api_error(409, "VersionMismatch", "Version mismatch error"));
        }
        entry.sys.published_version = Some(version);
        if bump {
            entry.sys.version = Some(version + 1);
        }
        self.published.lock().unwrap().push((id.to_string(), version));
        Ok(entry.clone())
    }

    async fn get_snapshots_for_entry(&self, id: &str) -> Result<Vec<Snapshot>, CmsError> {
        self.calls.snapshots.fetch_add(1, Ordering::SeqCst);
        self.check_failure()?;
        Ok(self
            .snapshots
            .lock()
            .unwrap()
            .get(id)
            .cloned()
            .unwrap_or_default())
    }

    async fn create_or_update_environment(
        &self,
        id: &str,
        name: &str,
    ) -> Result<Environment, CmsError> {
        self.calls.environment.fetch_add(1, Ordering::SeqCst);
        self.check_failure()?;
        Ok(Environment {
            sys: sys(id),
            name: name.to_string(),
        })
    }
}

/// Observer that records hook invocations as `hook:detail` strings.
#[derive(Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<String>>,
}

impl RecordingObserver {
    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.events()
            .iter()
            .filter(|e| e.starts_with(prefix))
            .count()
    }

    fn push(&self, event: String) {
        self.events.lock().unwrap().push(event);
    }
}

impl RepositoryObserver for RecordingObserver {
    fn boundary_started(&self, operation: &'static str, input: &str) {
        self.push(format!("started:{}:{}", operation, input));
    }

    fn boundary_failed(&self, operation: &'static str, input: &str, error: &RepositoryError) {
        let tier = if error.is_retryable() { "process" } else { "content" };
        self.push(format!("failed:{}:{}:{}", operation, input, tier));
    }

    fn publish_query_built(&self, query: &str) {
        self.push(format!("publish_query:{}", query));
    }

    fn aggregate_missing(&self, slug: &str) {
        self.push(format!("missing:{}", slug));
    }

    fn duplicate_slug(&self, slug: &str, matches: usize) {
        self.push(format!("duplicate:{}:{}", slug, matches));
    }

    fn publish_skipped(&self, id: &str, published_version: u32) {
        self.push(format!("skipped:{}:{}", id, published_version));
    }

    fn entry_published(&self, id: &str, published_version: u32) {
        self.push(format!("published:{}:{}", id, published_version));
    }
}

pub fn sys(id: &str) -> SystemProperties {
    SystemProperties {
        id: id.to_string(),
        ..Default::default()
    }
}

/// Delivery-shaped entry: no version information.
pub fn delivery_entry(id: &str) -> Entry {
    Entry {
        sys: sys(id),
        fields: Fields::new(),
    }
}

pub fn project_root(id: &str, slug: &str) -> Entry {
    let mut entry = delivery_entry(id);
    entry.sys.content_type = Some("project".to_string());
    entry
        .fields
        .insert("slug".to_string(), FieldValue::Text(slug.to_string()));
    entry
}

/// Management-shaped entry with version metadata.
pub fn managed_entry(id: &str, version: u32, published_version: Option<u32>) -> Entry {
    let mut entry = delivery_entry(id);
    entry.sys.version = Some(version);
    entry.sys.published_version = published_version;
    entry
}

pub fn asset(id: &str) -> Asset {
    Asset {
        sys: sys(id),
        fields: Fields::new(),
    }
}

pub fn collection(items: Vec<Entry>, included: Vec<Entry>, assets: Vec<Asset>) -> EntryCollection {
    EntryCollection {
        items,
        included_entries: included,
        included_assets: assets,
    }
}
