pub mod analysis;
pub mod error;
pub mod intake;
pub mod models;
pub mod pipeline;
pub mod settings;
pub mod utils;
pub mod view;

use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use log::{info, warn};
use serde_json::json;

use models::UploadCandidate;
use pipeline::AnalysisPipeline;
use settings::{PipelineSettings, SettingsStore};
use view::LogViewSink;

pub use error::{FailureReason, PipelineError};

/// Divisor applied to simulated delays when `CROPSCOPE_FAST` is set.
const FAST_MODE_FACTOR: u64 = 100;

/// Runs the pipeline headless over the files named on the command line.
pub fn run() -> Result<()> {
    utils::logging::init_logging();

    info!("CropScope starting up...");

    let settings = load_settings()?;
    let candidates: Vec<UploadCandidate> = std::env::args().skip(1).map(candidate_for).collect();

    if candidates.is_empty() {
        warn!("no files given; usage: cropscope <FILE>...");
        return Ok(());
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start tokio runtime")?;

    runtime.block_on(async move {
        let pipeline = AnalysisPipeline::new(settings, Arc::new(LogViewSink))?;
        pipeline
            .set_active_view(models::ViewContext::HealthAnalysis)
            .await;

        let report = pipeline.submit_files(candidates).await;
        info!(
            "{} file(s) accepted, {} rejected",
            report.accepted.len(),
            report.rejected.len()
        );

        pipeline.wait_idle().await;

        let summary = json!({
            "submission": report,
            "metrics": pipeline.metrics().await,
            "stats": pipeline.stats().await,
            "activity": pipeline.activity_log().await,
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);

        pipeline.shutdown().await;
        Ok::<(), anyhow::Error>(())
    })
}

fn load_settings() -> Result<PipelineSettings> {
    let mut settings = match std::env::var_os("CROPSCOPE_SETTINGS") {
        Some(path) => SettingsStore::new(PathBuf::from(path))?.pipeline(),
        None => PipelineSettings::default(),
    };

    let fast_mode = std::env::var("CROPSCOPE_FAST")
        .map(|value| value == "1" || value.eq_ignore_ascii_case("true"))
        .unwrap_or(false);
    if fast_mode {
        settings = settings.accelerated(FAST_MODE_FACTOR);
    }

    Ok(settings)
}

/// Missing or unreadable files are submitted with a size of zero.
fn candidate_for(arg: String) -> UploadCandidate {
    let byte_len = std::fs::metadata(&arg).map(|meta| meta.len()).unwrap_or(0);
    let file_name = std::path::Path::new(&arg)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| arg.clone());
    UploadCandidate::new(file_name, byte_len)
}
