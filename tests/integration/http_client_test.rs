//! Integration tests for the Maker API HTTP client.

use hubquick::devices::{ColorTable, Device};
use hubquick::dispatch::CommandExecutor;
use hubquick::error::HubError;
use hubquick::hub::{self, HttpHubClient};
use hubquick::notify::RecordingNotifier;
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> HttpHubClient {
    HttpHubClient::new(
        format!("{}/apps/api/5", server.uri()),
        "token",
        Duration::from_secs(2),
    )
    .unwrap()
}

#[tokio::test]
async fn test_fetch_all_devices() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/apps/api/5/devices/all"))
        .and(query_param("access_token", "token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "id": "1",
                "name": "Generic Zigbee Bulb",
                "label": "Kitchen Light",
                "type": "Generic Zigbee Bulb",
                "capabilities": ["Switch", "SwitchLevel"],
                "attributes": {"switch": "on", "level": 40}
            },
            {"id": 2, "label": "Movie Time", "type": "Scene Activator", "capabilities": ["Switch"]}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let devices = hub::fetch_all_devices(&client_for(&server)).await.unwrap();

    let labels: Vec<_> = devices.iter().map(|d| d.label.as_str()).collect();
    assert_eq!(labels, vec!["Kitchen Light", "Movie Time"]);
    assert_eq!(devices[1].id, "2");
    assert!(devices[1].is_scene());
    assert!(devices[0].has_capability("SwitchLevel"));
}

#[tokio::test]
async fn test_empty_body_is_an_empty_catalog() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/apps/api/5/devices/all"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let devices = hub::fetch_all_devices(&client_for(&server)).await.unwrap();
    assert!(devices.is_empty());
}

#[tokio::test]
async fn test_device_status_normalizes_detail_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/apps/api/5/devices/7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "7",
            "label": "Front Door",
            "attributes": [
                {"name": "lock", "currentValue": "locked", "dataType": "ENUM"},
                {"name": "battery", "currentValue": 87, "dataType": "NUMBER"}
            ]
        })))
        .mount(&server)
        .await;

    let status = hub::device_status(&client_for(&server), "7").await.unwrap();
    assert_eq!(status.get("lock"), Some(&json!("locked")));
    assert_eq!(status.get("battery"), Some(&json!(87)));
}

#[tokio::test]
async fn test_rejected_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let err = hub::fetch_all_devices(&client_for(&server))
        .await
        .unwrap_err();
    assert!(matches!(err, HubError::Api(_)));
    assert!(err.to_string().contains("access token"));
}

#[tokio::test]
async fn test_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = hub::device_status(&client_for(&server), "1")
        .await
        .unwrap_err();
    assert!(err.to_string().contains("500"));
}

#[tokio::test]
async fn test_command_arguments_in_path() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/apps/api/5/devices/1/setLevel/40"))
        .and(query_param("access_token", "token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "1",
            "attributes": [{"name": "level", "currentValue": 40}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let colors = ColorTable::default();
    let notifier = RecordingNotifier::new();
    let light = Device::new("1", "Kitchen Light", &["Switch", "SwitchLevel"]);

    let outcome = CommandExecutor::new(&client, &colors, &notifier)
        .with_retry_delay(Duration::from_millis(10))
        .execute(&light, "dim", &["40".to_string()])
        .await
        .unwrap();

    assert!(outcome.succeeded());
    assert_eq!(notifier.messages(), vec!["Kitchen Light turned dim 40"]);
}
