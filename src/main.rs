use anyhow::Context;
use clap::Parser;
use content_repo::config::cli::Command;
use content_repo::utils::logger;
use content_repo::{CliConfig, ContentRepository, ContentfulClient, PublishPolicy, RepositoryError};
use serde::Serialize;

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let rendered = serde_json::to_string_pretty(value).context("rendering result as JSON")?;
    println!("{}", rendered);
    Ok(())
}

async fn run(config: CliConfig) -> anyhow::Result<()> {
    let settings = config.settings()?;
    let client = ContentfulClient::new(settings.into_config()?)?;
    tracing::debug!("CMS config: {:?}", client.config());
    let repository = ContentRepository::new(client);

    match config.command {
        Command::Fetch { slug, preview } => {
            let project = repository.fetch_aggregate(&slug, preview).await?;
            print_json(&project)
        }
        Command::Entry { id } => print_json(&repository.get_management_entry(&id).await?),
        Command::Snapshot { id } => print_json(&repository.get_latest_snapshot(&id).await?),
        Command::PublishItem { id } => {
            let version = repository.publish_item(&id).await?;
            print_json(&serde_json::json!({ "id": id, "publishedVersion": version }))
        }
        Command::PublishProject { slug, when_stale } => {
            let policy = if when_stale {
                PublishPolicy::WhenStale
            } else {
                PublishPolicy::Always
            };
            let published = repository.publish_project_with(&slug, policy).await?;
            print_json(&published)
        }
        Command::CreateEnvironment { id, name } => {
            print_json(&repository.create_environment(&id, &name).await?)
        }
    }
}

fn exit_code(error: &anyhow::Error) -> i32 {
    match error.downcast_ref::<RepositoryError>() {
        Some(RepositoryError::Content { .. }) => 1,
        Some(RepositoryError::Process { .. }) => 2,
        Some(RepositoryError::InvalidArgument { .. } | RepositoryError::Config { .. }) => 3,
        None => 2,
    }
}

#[tokio::main]
async fn main() {
    let config = CliConfig::parse();

    if config.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(config.verbose);
    }

    if let Err(e) = run(config).await {
        if let Some(repo_error) = e.downcast_ref::<RepositoryError>() {
            tracing::error!("💡 Recovery suggestion: {}", repo_error.recovery_suggestion());
        }
        eprintln!("❌ {:#}", e);
        std::process::exit(exit_code(&e));
    }
}
