//! arfoto CLI: run the photo pipeline against the configured stores.
//!
//! Configuration comes from the environment (and `.env`); see `PipelineConfig::from_env`.

use anyhow::Context;
use arfoto_cli::{ar_link, avatar_from_args, describe_state, init_tracing};
use arfoto_core::{Locale, PipelineConfig, PipelineState};
use arfoto_db::create_document_store;
use arfoto_processing::{PathSelector, UploadDriver};
use arfoto_storage::create_storage;
use clap::{Parser, Subcommand};
use serde::Serialize;

#[derive(Parser)]
#[command(name = "arfoto", about = "AR photo gallery pipeline")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compress a photo, upload it and add it to the gallery
    Upload {
        /// Path to the photo
        file: std::path::PathBuf,
        /// Display name of the avatar in the photo
        #[arg(long)]
        avatar: String,
        /// Model file of the avatar
        #[arg(long)]
        model: String,
        /// Notification language: es or en (defaults to LOCALE)
        #[arg(long)]
        locale: Option<Locale>,
    },
    /// List the most recent gallery entries
    Gallery {
        #[arg(long, default_value = "20")]
        limit: usize,
    },
    /// Print AR viewer attributes and, for two-model scenes, the Scene Viewer link
    ArLink {
        #[arg(long)]
        avatar: String,
        #[arg(long)]
        model: String,
        /// Second model, only placed once the AR session opens
        #[arg(long)]
        secondary: Option<String>,
        /// Origin the model paths are served from
        #[arg(long, default_value = "http://localhost:3000")]
        origin: String,
        /// Page to return to when ARCore is unavailable
        #[arg(long)]
        fallback: Option<String>,
        #[arg(long)]
        locale: Option<Locale>,
    },
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize output")?;
    println!("{}", out);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Upload {
            file,
            avatar,
            model,
            locale,
        } => {
            let config = PipelineConfig::from_env().context("Invalid configuration")?;
            let locale = locale.unwrap_or(config.locale);
            let blobs = create_storage(&config)
                .await
                .context("Failed to initialize blob storage")?;
            let documents = create_document_store(&config)
                .await
                .context("Failed to initialize document store")?;
            let driver =
                UploadDriver::from_config(&config, blobs, documents).with_locale(locale);

            let mut transitions = driver.subscribe();
            let printer = tokio::spawn(async move {
                while let Ok(state) = transitions.recv().await {
                    if let Some(line) = describe_state(&state, locale) {
                        eprintln!("{}", line);
                    }
                    if matches!(state, PipelineState::Succeeded | PipelineState::Failed { .. }) {
                        break;
                    }
                }
            });

            let request = config
                .capture_sources
                .requests()
                .into_iter()
                .last()
                .context("No file request configured")?;
            let avatar = avatar_from_args(&avatar, &model, None);
            let outcome = driver
                .select_and_run(&PathSelector::new(&file), &request, &avatar)
                .await;

            // Nothing was published when the selection produced no run.
            if driver.state().is_idle() {
                printer.abort();
            } else {
                let _ = printer.await;
            }

            match outcome? {
                Some(record) => print_json(&record)?,
                None => eprintln!("No file selected"),
            }
        }
        Commands::Gallery { limit } => {
            let config = PipelineConfig::from_env().context("Invalid configuration")?;
            let documents = create_document_store(&config)
                .await
                .context("Failed to initialize document store")?;
            let records = documents
                .list(&config.gallery_collection, limit)
                .await
                .context("Failed to list gallery")?;
            print_json(&records)?;
        }
        Commands::ArLink {
            avatar,
            model,
            secondary,
            origin,
            fallback,
            locale,
        } => {
            let avatar = avatar_from_args(&avatar, &model, secondary.as_deref());
            let fallback = fallback.unwrap_or_else(|| origin.clone());
            let link = ar_link(&avatar, &origin, &fallback, locale.unwrap_or_default());
            print_json(&link)?;
        }
    }

    Ok(())
}
