//! Dataroom CLI: batch document upload from the command line.
//!
//! Reads pipeline configuration from the environment (see
//! `PipelineConfig::from_env`); without S3 settings the simulated backend is
//! used, which makes dry runs cheap.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use bytes::Bytes;
use clap::Parser;
use uuid::Uuid;

use dataroom_cli::{content_type_for, init_tracing};
use dataroom_core::models::UploadMode;
use dataroom_core::{Classifier, KeywordClassifier, PipelineConfig};
use dataroom_pipeline::{
    ConfirmationService, NewUploadFile, SessionOrchestrator, UploadCallbacks, UploadRequest,
};
use dataroom_storage::create_storage;

#[derive(Parser)]
#[command(name = "dataroom", about = "Batch document upload and classification")]
struct Cli {
    /// Target project id
    #[arg(long)]
    project: Uuid,

    /// Upload mode: manual or ai
    #[arg(long, default_value = "ai")]
    mode: UploadMode,

    /// Category label applied to every file (manual mode)
    #[arg(long)]
    category: Option<String>,

    /// Category code applied to every file (manual mode), e.g. 02.1
    #[arg(long)]
    code: Option<String>,

    /// Files to upload
    #[arg(required = true)]
    files: Vec<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = PipelineConfig::from_env().context("Failed to load pipeline configuration")?;
    let storage = create_storage(&config)
        .await
        .context("Failed to create storage backend")?;
    let classifier: Arc<dyn Classifier> = Arc::new(KeywordClassifier::default());
    let confirmer = Arc::new(ConfirmationService::new(
        storage.clone(),
        classifier.clone(),
    ));
    let orchestrator = SessionOrchestrator::new(storage, classifier, confirmer, config);

    let mut files = Vec::new();
    for path in &cli.files {
        let data = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("file")
            .to_string();
        files.push(NewUploadFile {
            content_type: content_type_for(&filename).to_string(),
            filename,
            data: Bytes::from(data),
        });
    }

    let callbacks = UploadCallbacks {
        on_progress: Some(Box::new(|update| {
            tracing::debug!(
                filename = %update.file.filename,
                progress = update.file.progress,
                overall = update.overall_progress,
                file = update.current_file_index,
                of = update.total_files,
                "upload progress"
            );
        })),
        on_file_complete: Some(Box::new(|file| match &file.classification {
            Some(c) => println!("{} -> {} [{}] ({})", file.filename, c.category, c.code, c.domain),
            None => println!("{} uploaded", file.filename),
        })),
        on_error: Some(Box::new(|file, reason| {
            eprintln!("{}: {}", file.filename, reason);
        })),
    };

    let request = UploadRequest {
        project_id: cli.project,
        files,
        mode: cli.mode,
        category: cli.category,
        category_code: cli.code,
    };

    let session = orchestrator.run(request, &callbacks).await?;

    println!(
        "{} of {} completed, {} failed, {} bytes uploaded",
        session.completed_files, session.total_files, session.failed_files, session.uploaded_bytes
    );

    if session.failed_files > 0 {
        std::process::exit(1);
    }

    Ok(())
}
