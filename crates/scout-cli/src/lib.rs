use std::future::Future;

use anyhow::Context;
use scout_api_client::{PollEvent, PollHandle, PollState};
use scout_core::{ErrorMetadata, Job, JobStatus, LogLevel, ScoutError};
use serde::Serialize;
use tokio::sync::mpsc::UnboundedReceiver;

/// Exit code when a watched job ends in `FAILED`.
pub const EXIT_JOB_FAILED: u8 = 1;
/// Exit code when a watch is interrupted with Ctrl-C.
pub const EXIT_CANCELLED: u8 = 130;

/// Initialize tracing for the CLI. Logs go to stderr so stdout stays JSON.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

pub fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize response")?;
    println!("{}", out);
    Ok(())
}

/// Truncate a string to max_len characters, appending "..." if truncated.
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// One console line per poll update.
pub fn status_line(job: &Job) -> String {
    let mut line = format!("{}  {:<10}", job.job_id, job.status.as_str());
    if let Some(updated_at) = job.updated_at {
        line.push_str(&format!("  updated {}", updated_at.format("%H:%M:%S")));
    }
    if let Some(output) = &job.output_key {
        line.push_str(&format!("  output={}", output));
    }
    if let Some(metrics) = &job.metrics_key {
        line.push_str(&format!("  metrics={}", metrics));
    }
    if let Some(error) = &job.error {
        line.push_str(&format!("  error={}", truncate_string(error, 120)));
    }
    line.trim_end().to_string()
}

/// Suggested next step for a failed command, when the cause is a `ScoutError`.
pub fn error_hint(error: &anyhow::Error) -> Option<&'static str> {
    error
        .downcast_ref::<ScoutError>()
        .and_then(ErrorMetadata::suggested_action)
}

/// Log a failed command at the level its cause asks for, then print it.
pub fn report_error(error: &anyhow::Error) {
    match error.downcast_ref::<ScoutError>() {
        Some(cause) => {
            let code = cause.error_code();
            match cause.log_level() {
                LogLevel::Debug => tracing::debug!(error = %cause, code, "Command failed"),
                LogLevel::Warn => tracing::warn!(error = %cause, code, "Command failed"),
                LogLevel::Error => tracing::error!(error = %cause, code, "Command failed"),
            }
        }
        None => tracing::error!(error = %error, "Command failed"),
    }

    eprintln!("Error: {:#}", error);
    if let Some(hint) = error_hint(error) {
        eprintln!("Hint: {}", hint);
    }
}

/// Render poll events until the job is terminal or `interrupt` resolves, in
/// which case the session is cancelled. Returns the last snapshot seen.
///
/// `interrupt` is polled across iterations, so it fires even if it completes
/// while an event is being rendered.
pub async fn follow_events<F, W>(
    handle: &PollHandle,
    events: &mut UnboundedReceiver<PollEvent>,
    interrupt: F,
    mut render: W,
) -> Option<Job>
where
    F: Future,
    W: FnMut(String),
{
    tokio::pin!(interrupt);
    let mut last = None;

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Some(PollEvent::Update(job)) => {
                    render(status_line(&job));
                    last = Some(job);
                }
                Some(PollEvent::Terminal(_)) | None => break,
                Some(PollEvent::Error(message)) => {
                    eprintln!("status check failed: {}", truncate_string(&message, 200));
                }
            },
            _ = &mut interrupt => {
                tracing::info!(job_id = %handle.job_id(), "Interrupted, cancelling watch");
                handle.cancel();
                break;
            }
        }
    }

    last
}

/// Process exit code for a finished watch.
pub fn watch_exit_code(state: PollState, last: Option<&Job>) -> u8 {
    match state {
        PollState::TerminatedCancelled => EXIT_CANCELLED,
        _ if last.map(|job| job.status) == Some(JobStatus::Failed) => EXIT_JOB_FAILED,
        _ => 0,
    }
}
