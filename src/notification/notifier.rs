use std::io::{self, Write};
use std::path::PathBuf;
use std::process::{Output, Stdio};

use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, warn};

use super::{AlertSink, FleetEvent};
use crate::config::NotificationConfig;

/// Alert delivery to the operator's machine: bell, desktop/speech
/// notification, per-account event log and an optional hook command.
#[derive(Clone)]
pub struct Notifier {
    config: NotificationConfig,
}

impl Notifier {
    pub fn new(config: NotificationConfig) -> Self {
        Self { config }
    }

    pub async fn deliver(&self, event: &FleetEvent) {
        if !self.config.enabled {
            return;
        }

        if self.config.bell && event.event_type.is_error() {
            let mut stderr = std::io::stderr().lock();
            let _ = stderr.write_all(b"\x07");
            let _ = stderr.flush();
        }

        if self.config.desktop && event.event_type.needs_operator() {
            self.send_desktop_notification(event).await;
        }

        if self.config.event_log {
            self.write_event_log(event).await;
        }

        if let Some(hook) = &self.config.hook_command {
            self.run_hook(hook, event).await;
        }
    }

    async fn send_desktop_notification(&self, event: &FleetEvent) {
        let title = event.title();
        let body = event.body();

        #[cfg(target_os = "macos")]
        {
            let script = format!(
                r#"display notification "{}" with title "{}""#,
                body.replace('"', r#"\""#).replace('\n', " "),
                title.replace('"', r#"\""#)
            );

            let mut command = Command::new("osascript");
            command.args(["-e", &script]);
            let result = self.run_bounded(command).await;

            if let Err(e) = result {
                debug!(error = %e, "Failed to send desktop notification");
            }
        }

        #[cfg(target_os = "linux")]
        {
            // Termux ships a speech command instead of a notification daemon.
            let mut speak = Command::new("termux-tts-speak");
            speak.arg(event.spoken());
            let spoken = self.run_bounded(speak).await;

            if spoken.is_err() {
                let mut command = Command::new("notify-send");
                command.args([&title, &body]);
                let result = self.run_bounded(command).await;

                if let Err(e) = result {
                    debug!(error = %e, "Failed to send desktop notification");
                }
            }
        }

        #[cfg(not(any(target_os = "macos", target_os = "linux")))]
        {
            debug!(%title, %body, "Desktop notifications unsupported on this platform");
        }
    }

    fn log_path(&self, event: &FleetEvent) -> Option<PathBuf> {
        let logs_dir = self.config.logs_dir.as_ref()?;
        let name = match event.account_index {
            Some(index) => format!("account-{}.log", index),
            None => "fleet.log".to_string(),
        };
        Some(logs_dir.join(name))
    }

    async fn write_event_log(&self, event: &FleetEvent) {
        let (Some(logs_dir), Some(log_path)) = (&self.config.logs_dir, self.log_path(event))
        else {
            return;
        };

        let log_line = format!(
            "[{}] {}: {}\n",
            event.created_at.format("%Y-%m-%dT%H:%M:%SZ"),
            event.event_type.as_str(),
            event.spoken()
        );

        if let Err(e) = tokio::fs::create_dir_all(logs_dir).await {
            warn!(error = %e, "Failed to create logs directory");
            return;
        }

        let result = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)
            .await;

        match result {
            Ok(mut file) => {
                if let Err(e) = file.write_all(log_line.as_bytes()).await {
                    warn!(error = %e, "Failed to write event log");
                }
            }
            Err(e) => {
                warn!(error = %e, path = %log_path.display(), "Failed to open event log");
            }
        }
    }

    async fn run_hook(&self, hook_cmd: &str, event: &FleetEvent) {
        let json = match serde_json::to_string(event) {
            Ok(j) => j,
            Err(_) => return,
        };

        let account = event
            .account_index
            .map(|i| i.to_string())
            .unwrap_or_default();

        let mut command = Command::new("sh");
        command
            .args(["-c", hook_cmd])
            .env("FLEET_EVENT", event.event_type.as_str())
            .env("FLEET_ACCOUNT", account)
            .env("FLEET_EVENT_JSON", &json);

        if let Err(e) = self.run_bounded(command).await {
            debug!(error = %e, hook = %hook_cmd, "Failed to run hook");
        }
    }

    /// Wait for `command` at most `command_timeout`; the child is killed when
    /// the wait is abandoned.
    async fn run_bounded(&self, mut command: Command) -> io::Result<Output> {
        command.stdin(Stdio::null()).kill_on_drop(true);
        let limit = self.config.command_timeout();

        match tokio::time::timeout(limit, command.output()).await {
            Ok(result) => result,
            Err(_) => Err(io::Error::new(
                io::ErrorKind::TimedOut,
                format!("still running after {}s", limit.as_secs()),
            )),
        }
    }
}

impl AlertSink for Notifier {
    fn notify(&self, event: FleetEvent) {
        if !self.config.enabled {
            return;
        }

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let notifier = self.clone();
                handle.spawn(async move { notifier.deliver(&event).await });
            }
            Err(_) => debug!(event = event.event_type.as_str(), "No runtime, alert dropped"),
        }
    }
}
