pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::CliConfig;

pub use adapters::ContentfulClient;
pub use config::{ContentfulConfig, ContentfulSettings};
pub use crate::core::repository::{ContentRepository, PublishPolicy};
pub use crate::core::version::{is_stale, Staleness};
pub use domain::model::{Asset, Entry, EntryCollection, Environment, FieldValue, Link, Project, Snapshot};
pub use domain::ports::CmsClient;
pub use utils::error::{CmsError, RepositoryError, Result};
pub use utils::observer::{RepositoryObserver, TracingObserver};
