//! Scout CLI, the command-line client for the ScoutAI API.
//!
//! Settings come from SCOUT_* environment variables (or a `.env` file); flags
//! override them per invocation.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use scout_api_client::{ApiClient, JobStatusPoller, JobsApi, UploadOrchestrator};
use scout_cli::{follow_events, init_tracing, print_json, report_error, watch_exit_code};
use scout_core::{ClientConfig, VideoFile};

#[derive(Parser)]
#[command(name = "scout", about = "ScoutAI video upload client")]
struct Cli {
    /// Backend base URL (overrides SCOUT_API_BASE)
    #[arg(long, global = true)]
    api_base: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload a video and create a processing job
    Upload {
        /// Path to the video file
        file: PathBuf,
        /// Declared content type (default: inferred from the extension)
        #[arg(long)]
        content_type: Option<String>,
        /// Owner of the job (overrides SCOUT_USER_ID)
        #[arg(long)]
        user_id: Option<String>,
        /// Match the video belongs to
        #[arg(long)]
        match_id: Option<String>,
        /// Keep polling the created job until it finishes
        #[arg(long)]
        watch: bool,
        /// Poll interval in milliseconds (overrides SCOUT_POLL_INTERVAL_MS)
        #[arg(long)]
        interval_ms: Option<u64>,
    },
    /// Fetch a job once and print it
    Status {
        /// Job ID
        job_id: String,
    },
    /// Poll a job until it completes or fails
    Watch {
        /// Job ID
        job_id: String,
        /// Poll interval in milliseconds (overrides SCOUT_POLL_INTERVAL_MS)
        #[arg(long)]
        interval_ms: Option<u64>,
    },
    /// Check that the backend is reachable
    Health,
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(code) => code,
        Err(error) => {
            report_error(&error);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let mut config = ClientConfig::from_env().context("Failed to load configuration")?;
    if let Some(api_base) = cli.api_base {
        config.api_base_url = api_base.trim_end_matches('/').to_string();
    }

    match cli.command {
        Commands::Upload {
            file,
            content_type,
            user_id,
            match_id,
            watch,
            interval_ms,
        } => {
            if let Some(user_id) = user_id {
                config.user_id = user_id;
            }
            if let Some(ms) = interval_ms {
                config.poll_interval = Duration::from_millis(ms);
            }
            let client = client_for(&config)?;

            let max_bytes = config.max_upload_bytes;
            let video = match content_type {
                Some(content_type) => {
                    VideoFile::from_path_with_type(&file, content_type, max_bytes).await
                }
                None => VideoFile::from_path(&file, max_bytes).await,
            }
            .with_context(|| format!("Failed to read {}", file.display()))?;

            let orchestrator = UploadOrchestrator::from_client(client.clone(), &config);
            tracing::info!(
                file_name = %video.file_name(),
                bytes = video.len(),
                user_id = %orchestrator.user_id(),
                "Uploading video"
            );
            let job = orchestrator.upload_for_match(&video, match_id).await?;
            print_json(&job)?;

            if watch {
                return watch_job(client, &job.job_id, config.poll_interval).await;
            }
        }
        Commands::Status { job_id } => {
            let client = client_for(&config)?;
            let job = client.get_job(&job_id).await?;
            print_json(&job)?;
        }
        Commands::Watch {
            job_id,
            interval_ms,
        } => {
            if let Some(ms) = interval_ms {
                config.poll_interval = Duration::from_millis(ms);
            }
            let client = client_for(&config)?;
            return watch_job(client, &job_id, config.poll_interval).await;
        }
        Commands::Health => {
            let client = client_for(&config)?;
            let index = client.index().await.map_err(|e| {
                anyhow::anyhow!("Backend at {} is unreachable: {}", client.base_url(), e)
            })?;
            print_json(&index)?;
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn client_for(config: &ClientConfig) -> anyhow::Result<Arc<ApiClient>> {
    config.validate().context("Invalid configuration")?;
    let client = ApiClient::from_config(config).context("Failed to create API client")?;
    Ok(Arc::new(client))
}

/// Print one line per update until the job is terminal or Ctrl-C is pressed.
async fn watch_job(
    client: Arc<ApiClient>,
    job_id: &str,
    interval: Duration,
) -> anyhow::Result<ExitCode> {
    let poller = JobStatusPoller::from_client(client);
    let (handle, mut events) = poller.track_events(job_id, interval)?;
    let last = follow_events(&handle, &mut events, tokio::signal::ctrl_c(), |line| {
        println!("{}", line)
    })
    .await;

    let state = handle.wait().await;
    Ok(ExitCode::from(watch_exit_code(state, last.as_ref())))
}
