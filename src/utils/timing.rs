use std::future::Future;
use std::time::Instant;

use chrono::{DateTime, Utc};
use tracing::info;

use crate::utils::logging::TIMING_TARGET;
use crate::vietqr::types::ResponseEnvelope;

const ARGS_PREVIEW_LIMIT: usize = 300;

#[derive(Debug)]
pub struct CommandTimer {
    command: &'static str,
    chat_id: i64,
    args: String,
    started_at: DateTime<Utc>,
    started_perf: Instant,
    completed: bool,
}

impl CommandTimer {
    pub fn start(command: &'static str, chat_id: i64, args: &str) -> Self {
        let args: String = args
            .replace('\n', " ")
            .chars()
            .take(ARGS_PREVIEW_LIMIT)
            .collect();
        let timer = CommandTimer {
            command,
            chat_id,
            args,
            started_at: Utc::now(),
            started_perf: Instant::now(),
            completed: false,
        };
        info!(
            target: TIMING_TARGET,
            "event=command_received command={} chat_id={} received_at={} args={:?}",
            timer.command,
            timer.chat_id,
            timer.started_at.to_rfc3339(),
            timer.args
        );
        timer
    }

    pub fn complete(&mut self, status: &str, detail: Option<&str>) {
        if self.completed {
            return;
        }
        self.completed = true;
        info!(
            target: TIMING_TARGET,
            "event=command_completed command={} chat_id={} started_at={} duration_s={:.3} status={} detail={}",
            self.command,
            self.chat_id,
            self.started_at.to_rfc3339(),
            self.started_perf.elapsed().as_secs_f64(),
            status,
            detail.unwrap_or_default()
        );
    }
}

impl Drop for CommandTimer {
    fn drop(&mut self) {
        self.complete("dropped", None);
    }
}

/// Wraps one VietQR call with `api_request`/`api_response` timing events.
pub async fn log_api_timing<F>(method: &str, url: &str, call: F) -> ResponseEnvelope
where
    F: Future<Output = ResponseEnvelope>,
{
    let started_perf = Instant::now();
    info!(
        target: TIMING_TARGET,
        "event=api_request method={} url={} started_at={}",
        method,
        url,
        Utc::now().to_rfc3339()
    );

    let envelope = call.await;

    info!(
        target: TIMING_TARGET,
        "event=api_response method={} url={} completed_at={} duration_s={:.3} code={}",
        method,
        url,
        Utc::now().to_rfc3339(),
        started_perf.elapsed().as_secs_f64(),
        envelope.code
    );
    envelope
}
