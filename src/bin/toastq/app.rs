use std::path::PathBuf;
use std::time::Duration;

use async_channel::Receiver;
use toastq::error::{ConfigError, Error as ToastError};
use toastq::telemetry::init_tracing;
use toastq::{QueueEvent, Settings, ToastQueue};
use tokio::signal;
use tokio::time::sleep;
use tracing::{info, warn};

use super::cli::Cli;

const DEFAULT_CONFIG: &str = "toastq.toml";
const HOVER: Duration = Duration::from_secs(1);
const DRAIN_POLL: Duration = Duration::from_millis(50);

pub async fn run(cli: Cli) -> toastq::Result<()> {
    init_tracing(cli.log_filter.as_deref(), cli.json_logs)?;

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG));
    let settings = apply_cli(Settings::from_env_and_file(&config_path)?, &cli)?;
    info!(
        position = %settings.queue.position,
        max_visible = settings.queue.max_visible.get(),
        duration_ms = settings.defaults.duration.as_millis(),
        "toast queue ready"
    );

    let queue = ToastQueue::new(&settings)?;
    let events = queue.events();
    let renderer = tokio::spawn(render(queue.clone(), events.clone()));

    tokio::select! {
        biased;
        _ = signal::ctrl_c() => {
            info!("shutdown signal received, dismissing toasts");
            queue.dismiss_all();
        }
        () = feed(&queue, cli.messages, cli.interval, cli.hover) => {}
    }

    drain(&queue).await;

    events.close();
    if let Err(err) = renderer.await {
        warn!(error = %err, "renderer task terminated unexpectedly");
    }
    Ok(())
}

fn apply_cli(mut settings: Settings, cli: &Cli) -> toastq::Result<Settings> {
    if let Some(position) = cli.position {
        settings.queue.position = position;
    }
    if let Some(max_visible) = cli.max_visible {
        if max_visible.get() > 100 {
            return Err(ToastError::from(ConfigError::InvalidField {
                field: "cli.max_visible",
                message: "value must be between 1 and 100".to_string(),
            }));
        }
        settings.queue.max_visible = max_visible;
    }
    if let Some(duration) = cli.duration {
        settings.defaults.duration = duration;
    }
    Ok(settings)
}

async fn feed(
    queue: &ToastQueue,
    messages: Vec<String>,
    interval: Duration,
    hover: Option<usize>,
) {
    for (index, message) in messages.into_iter().enumerate() {
        let id = queue.enqueue(message);
        if hover == Some(index) {
            let queue = queue.clone();
            tokio::spawn(async move {
                queue.pause(&id);
                sleep(HOVER).await;
                queue.resume(&id);
            });
        }
        sleep(interval).await;
    }
}

/// Waits for every toast to leave. The first Ctrl-C dismisses the rest, the
/// second gives up.
async fn drain(queue: &ToastQueue) {
    let mut interrupted = false;
    while !queue.is_empty() {
        tokio::select! {
            _ = signal::ctrl_c() => {
                if interrupted {
                    warn!(pending = queue.len(), "second interrupt, leaving toasts behind");
                    return;
                }
                interrupted = true;
                info!("shutdown signal received, dismissing toasts");
                queue.dismiss_all();
            }
            () = sleep(DRAIN_POLL) => {}
        }
    }
}

/// Stand-in for a real renderer: logs the stack after every change.
async fn render(queue: ToastQueue, events: Receiver<QueueEvent>) {
    while let Ok(event) = events.recv().await {
        let stack: Vec<String> = queue
            .render_order()
            .iter()
            .map(|toast| {
                let state = if toast.is_exiting() {
                    " (exiting)"
                } else if toast.is_paused() {
                    " (paused)"
                } else {
                    ""
                };
                format!("[{}] {}{state}", toast.variant, toast.message)
            })
            .collect();
        info!(?event, position = %queue.config().position, ?stack, "render");
    }
}
