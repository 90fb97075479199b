use reward_fleet::config::NotificationConfig;
use reward_fleet::notification::{AlertSink, EventType, FleetEvent, Notifier};

#[test]
fn test_event_type_as_str() {
    assert_eq!(EventType::FleetStarted.as_str(), "fleet.started");
    assert_eq!(EventType::FleetStopped.as_str(), "fleet.stopped");
    assert_eq!(EventType::RetryScheduled.as_str(), "call.retry");
    assert_eq!(EventType::CredentialRejected.as_str(), "credential.rejected");
    assert_eq!(EventType::MissionsUnavailable.as_str(), "missions.unavailable");
    assert_eq!(EventType::ClaimFailed.as_str(), "mission.claim_failed");
    assert_eq!(EventType::PingFailed.as_str(), "ping.failed");
}

#[test]
fn test_event_type_is_error() {
    assert!(EventType::RetryScheduled.is_error());
    assert!(EventType::CredentialRejected.is_error());
    assert!(EventType::PingFailed.is_error());

    assert!(!EventType::FleetStarted.is_error());
    assert!(!EventType::FleetStopped.is_error());
}

#[test]
fn test_only_rejected_credentials_need_operator() {
    assert!(EventType::CredentialRejected.needs_operator());
    assert!(!EventType::RetryScheduled.needs_operator());
    assert!(!EventType::ClaimFailed.needs_operator());
}

#[test]
fn test_fleet_event_creation() {
    let event = FleetEvent::new(EventType::ClaimFailed, 3);

    assert_eq!(event.event_type, EventType::ClaimFailed);
    assert_eq!(event.account_index, Some(3));
    assert!(event.action.is_none());
    assert!(event.message.is_none());
}

#[test]
fn test_fleet_event_title_and_body() {
    let event = FleetEvent::new(EventType::CredentialRejected, 2)
        .with_action("fetch_balance")
        .with_message("HTTP 403");

    assert!(event.title().contains("credential.rejected"));
    assert_eq!(event.body(), "Account 2\nAction: fetch_balance\nHTTP 403");

    let fleet = FleetEvent::fleet(EventType::FleetStopped).with_message("3 claims");
    assert!(fleet.account_index.is_none());
    assert_eq!(fleet.body(), "Fleet\n3 claims");
}

#[test]
fn test_fleet_event_json_omits_empty_fields() {
    let event = FleetEvent::fleet(EventType::FleetStarted);
    let json = serde_json::to_value(&event).unwrap();

    assert_eq!(json["event_type"], "fleet_started");
    assert!(json.get("account_index").is_none());
    assert!(json.get("message").is_none());
}

#[tokio::test]
async fn test_alert_sink_delivers_in_background() {
    let dir = tempfile::tempdir().unwrap();
    let notifier = Notifier::new(NotificationConfig {
        enabled: true,
        bell: false,
        desktop: false,
        event_log: true,
        logs_dir: Some(dir.path().to_path_buf()),
        hook_command: None,
        command_timeout_secs: 30,
    });

    notifier.notify(FleetEvent::new(EventType::PingFailed, 5).with_message("timed out"));

    let log = dir.path().join("account-5.log");
    let mut content = String::new();
    for _ in 0..50 {
        content = std::fs::read_to_string(&log).unwrap_or_default();
        if content.contains("timed out") {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    }
    assert!(content.contains("ping.failed"));
    assert!(content.contains("timed out"));
}

#[cfg(unix)]
#[tokio::test]
async fn test_hook_receives_event_environment() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("hook.out");
    let notifier = Notifier::new(NotificationConfig {
        enabled: true,
        bell: false,
        desktop: false,
        event_log: false,
        logs_dir: None,
        hook_command: Some(format!(
            "printf '%s %s' \"$FLEET_EVENT\" \"$FLEET_ACCOUNT\" > {}",
            out.display()
        )),
        command_timeout_secs: 30,
    });

    notifier
        .deliver(&FleetEvent::new(EventType::ClaimFailed, 7))
        .await;

    let content = std::fs::read_to_string(&out).unwrap();
    assert_eq!(content, "mission.claim_failed 7");
}
