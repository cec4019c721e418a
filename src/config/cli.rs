use crate::config::ContentfulSettings;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "content-repo")]
#[command(about = "Fetch and republish CMS projects")]
pub struct CliConfig {
    /// TOML file with CMS settings; `${VAR}` placeholders are read from the environment.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Overrides CONTENTFUL_ENVIRONMENT.
    #[arg(long, global = true)]
    pub environment: Option<String>,

    /// Overrides SPACE_ID.
    #[arg(long, global = true)]
    pub space_id: Option<String>,

    #[arg(long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Emit logs as JSON lines")]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Fetch a project and its included entries and assets.
    Fetch {
        slug: String,
        #[arg(long)]
        preview: bool,
    },
    /// Read an entry from the management API.
    Entry { id: String },
    /// Show the most recent snapshot of an entry.
    Snapshot { id: String },
    /// Publish a single entry if it has unpublished changes.
    PublishItem { id: String },
    /// Republish every entry included by a project.
    PublishProject {
        slug: String,
        /// Skip entries whose published version is already current.
        #[arg(long)]
        when_stale: bool,
    },
    CreateEnvironment { id: String, name: String },
}

impl CliConfig {
    /// Environment first, then the config file, then command-line overrides.
    pub fn settings(&self) -> crate::utils::error::Result<ContentfulSettings> {
        let mut settings = ContentfulSettings::from_env();
        if let Some(path) = &self.config {
            settings = settings.merge(ContentfulSettings::from_file(path)?);
        }
        Ok(settings.merge(ContentfulSettings {
            environment: self.environment.clone(),
            space_id: self.space_id.clone(),
            ..Default::default()
        }))
    }
}
