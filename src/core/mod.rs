pub mod query;
pub mod repository;
pub mod version;

pub use crate::domain::model::{Entry, Project, Snapshot};
pub use crate::domain::ports::CmsClient;
pub use crate::utils::error::Result;
