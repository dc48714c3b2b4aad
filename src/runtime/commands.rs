//! CLI command execution

use anyhow::{Context, Result};
use colored::Colorize;

use super::startup::{StartupContext, prepare_startup};
use crate::cli::{Commands, ConfigCommands};
use crate::config::StaticConfig;
use crate::services::{Resolution, ShortenOutcome};
use crate::storage::{MemoryStore, Repository};

/// 执行一条命令；除 serve 外，执行完即排空删除管道并关闭存储
pub async fn run_command(command: Commands, config: &StaticConfig) -> Result<()> {
    match command {
        Commands::Config { action } => run_config_command(action, config),
        Commands::Restore => restore(config).await,
        Commands::Serve => serve(config).await,
        other => {
            let ctx = prepare_startup(config).await?;
            let result = run_with_context(other, &ctx).await;
            ctx.shutdown().await;
            result
        }
    }
}

async fn serve(config: &StaticConfig) -> Result<()> {
    let ctx = prepare_startup(config).await?;
    ctx.link_service
        .ping()
        .await
        .context("Storage health check failed")?;

    println!(
        "{} linkvault ready ({} storage), press Ctrl+C to stop",
        "✓".bold().green(),
        ctx.repository.get_type().to_string().cyan()
    );
    crate::system::listen_for_shutdown(&ctx.pipeline, ctx.repository.clone(), ctx.drain_timeout)
        .await;
    Ok(())
}

async fn restore(config: &StaticConfig) -> Result<()> {
    if config.uses_database() {
        println!(
            "{} Database storage configured, there is no event log to replay",
            "ℹ".bold().blue()
        );
        return Ok(());
    }

    let store = MemoryStore::open(&config.storage)?;
    let restored = store.restore_from_file()?;
    let stats = store.stats().await?;
    store.close().await?;

    println!(
        "{} Replayed {} events from {}",
        "✓".bold().green(),
        restored.to_string().green(),
        store.log_path().display()
    );
    println!(
        "  sequence: {}  urls: {}  users: {}",
        store.sequence(),
        stats.urls,
        stats.users
    );
    Ok(())
}

async fn run_with_context(command: Commands, ctx: &StartupContext) -> Result<()> {
    let service = &ctx.link_service;

    match command {
        Commands::Shorten { url, user } => match service.shorten(&url, &user).await? {
            ShortenOutcome::Created(short_url) => {
                println!("{} {}", "✓ Created".bold().green(), short_url.cyan());
            }
            ShortenOutcome::Existing(short_url) => {
                println!("{} {}", "ℹ Already shortened".bold().yellow(), short_url.cyan());
            }
        },
        Commands::Get { short_id } => match service.resolve(&short_id).await? {
            Resolution::Found(original) => {
                println!("{} -> {}", short_id.cyan(), original.blue().underline());
            }
            Resolution::Gone => {
                println!("{} {} has been deleted", "✗".bold().red(), short_id.cyan());
            }
        },
        Commands::List { user, json } => {
            let urls = service.user_urls(&user).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&urls)?);
            } else if urls.is_empty() {
                println!("{} No URLs found for {}", "ℹ".bold().blue(), user);
            } else {
                for url in &urls {
                    println!("  {} -> {}", url.short_url.cyan(), url.original_url.blue());
                }
                println!(
                    "{} Total {} URLs",
                    "ℹ".bold().blue(),
                    urls.len().to_string().green()
                );
            }
        }
        Commands::Delete { short_ids, user } => {
            let count = short_ids.len();
            service.delete_urls(short_ids, &user)?;
            println!(
                "{} Queued deletion of {} URLs for {}",
                "✓".bold().green(),
                count,
                user
            );
        }
        Commands::Stats => {
            let stats = service.stats().await?;
            println!("urls:  {}", stats.urls.to_string().green());
            println!("users: {}", stats.users.to_string().green());
        }
        Commands::Serve | Commands::Restore | Commands::Config { .. } => {
            unreachable!("handled by run_command")
        }
    }
    Ok(())
}

fn run_config_command(action: ConfigCommands, config: &StaticConfig) -> Result<()> {
    match action {
        ConfigCommands::Generate { output_path, force } => {
            let path = output_path.unwrap_or_else(|| "config.example.toml".to_string());
            if std::path::Path::new(&path).exists() && !force {
                anyhow::bail!("{} already exists, pass --force to overwrite", path);
            }
            StaticConfig::default()
                .save_to_file(&path)
                .map_err(|e| anyhow::anyhow!("Failed to write {}: {}", path, e))?;
            println!("{} Sample configuration written to {}", "✓".bold().green(), path);
        }
        ConfigCommands::Show => {
            let rendered = toml::to_string_pretty(config).context("Failed to render config")?;
            println!("{}", rendered);
        }
    }
    Ok(())
}
