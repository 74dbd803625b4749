//! Integration tests for resolving a query and dispatching its command.

use hubquick::commands::{EXECUTION_CATALOG, RESOLUTION_CATALOG};
use hubquick::devices::{ColorTable, Device};
use hubquick::dispatch::{CommandExecutor, Outcome};
use hubquick::hub::MockHubClient;
use hubquick::notify::RecordingNotifier;
use hubquick::resolve::resolve;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::time::Duration;

const DELAY: Duration = Duration::from_millis(10);

fn devices() -> Vec<Device> {
    vec![
        Device::new("1", "Kitchen Light", &["Switch", "SwitchLevel"]),
        Device::new("2", "Kitchen Light 2", &["Switch"]),
        Device::new("5", "Porch Bulb", &["Switch", "ColorControl"]),
    ]
}

async fn resolve_and_execute(
    query: &str,
    client: &MockHubClient,
    colors: &ColorTable,
    notifier: &RecordingNotifier,
) -> Option<Outcome> {
    let devices = devices();
    let resolved = resolve(query, &devices, &RESOLUTION_CATALOG);
    let device = resolved.device?;
    let outcome = CommandExecutor::new(client, colors, notifier)
        .with_retry_delay(DELAY)
        .execute(device, &resolved.command_keyword, &resolved.params)
        .await
        .unwrap();
    Some(outcome)
}

#[tokio::test]
async fn test_dim_from_free_text() {
    let client = MockHubClient::new().with_command_response(json!({"level": 40}));
    let colors = ColorTable::default();
    let notifier = RecordingNotifier::new();

    let outcome = resolve_and_execute("kitchen light dim 40", &client, &colors, &notifier)
        .await
        .unwrap();

    assert!(outcome.succeeded());
    let calls = client.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].path, "devices/1/setLevel");
    assert_eq!(calls[0].args, vec![json!(40)]);
    assert_eq!(notifier.messages(), vec!["Kitchen Light turned dim 40"]);
}

#[tokio::test]
async fn test_toggle_from_free_text() {
    let client = MockHubClient::new()
        .with_status_sequence("1", vec![json!({"switch": "on"}), json!({"switch": "off"})]);
    let colors = ColorTable::default();
    let notifier = RecordingNotifier::new();

    let outcome = resolve_and_execute("Kitchen Light toggle", &client, &colors, &notifier)
        .await
        .unwrap();

    assert_eq!(
        outcome,
        Outcome::Completed {
            keyword: "off".to_string(),
            succeeded: true,
            observed: Some("off".to_string()),
        }
    );
    assert_eq!(client.calls_to("devices/1/").len(), 1);
}

#[tokio::test]
async fn test_ambiguous_query_sends_nothing() {
    let client = MockHubClient::new();
    let colors = ColorTable::default();
    let notifier = RecordingNotifier::new();

    let outcome = resolve_and_execute("kitchen", &client, &colors, &notifier).await;

    assert!(outcome.is_none());
    assert!(client.calls().is_empty());
    assert!(notifier.messages().is_empty());
}

#[tokio::test]
async fn test_color_name_becomes_hex_map() {
    let client = MockHubClient::new().with_command_response(json!({"colorTemperature": 6500}));
    let colors = ColorTable::from_pairs([("Red", "#FF0000")]);
    let notifier = RecordingNotifier::new();

    let outcome = resolve_and_execute("porch bulb color red", &client, &colors, &notifier)
        .await
        .unwrap();

    let calls = client.calls_to("devices/5/setColor");
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].args, vec![json!({"hex": "FF0000"})]);
    assert!(!outcome.succeeded());
    assert_eq!(notifier.messages(), vec!["Porch Bulb failed color red"]);
}

#[tokio::test]
async fn test_hub_failure_is_an_error() {
    let client = MockHubClient::new().failing();
    let colors = ColorTable::default();
    let notifier = RecordingNotifier::new();
    let light = Device::new("1", "Kitchen Light", &["Switch"]);

    let result = CommandExecutor::new(&client, &colors, &notifier)
        .with_catalog(&EXECUTION_CATALOG)
        .with_retry_delay(DELAY)
        .execute(&light, "on", &[])
        .await;

    assert!(result.is_err());
    assert!(notifier.messages().is_empty());
}
