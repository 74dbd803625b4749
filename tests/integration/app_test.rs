//! Integration tests for the command orchestrator.

use hubquick::app::Orchestrator;
use hubquick::cli::{Command, Toggle};
use hubquick::config::Config;
use hubquick::devices::Device;
use hubquick::hub::MockHubClient;
use hubquick::notify::RecordingNotifier;
use hubquick::persistence::{CatalogCache, MemorySecretStore, SecretStore};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;
use tempfile::{tempdir, TempDir};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct Harness {
    dir: TempDir,
    orchestrator: Orchestrator,
    notifier: Arc<RecordingNotifier>,
    secrets: Arc<MemorySecretStore>,
}

impl Harness {
    fn cache(&self) -> CatalogCache {
        CatalogCache::open(self.dir.path().join("cache")).unwrap()
    }

    fn config_path(&self) -> std::path::PathBuf {
        self.dir.path().join("config.toml")
    }
}

fn devices() -> Vec<Device> {
    vec![
        Device::new("1", "Kitchen Light", &["Switch", "SwitchLevel"]),
        Device::new("2", "Kitchen Light 2", &["Switch"]),
        Device::new("5", "Porch Bulb", &["Switch", "ColorControl"]),
    ]
}

fn harness(client: MockHubClient, colors_url: &str) -> Harness {
    let dir = tempdir().unwrap();
    let cache = CatalogCache::open(dir.path().join("cache")).unwrap();

    let mut config = Config::default();
    config.hub.retry_delay_ms = 10;
    config.catalog.colors_url = colors_url.to_string();

    let notifier = Arc::new(RecordingNotifier::new());
    let secrets = Arc::new(MemorySecretStore::with_secrets(&[("hubitat_api_key", "token")]));
    let orchestrator = Orchestrator::new(
        config,
        dir.path().join("config.toml"),
        secrets.clone(),
        cache,
        notifier.clone(),
    )
    .with_client(Arc::new(client));

    Harness {
        dir,
        orchestrator,
        notifier,
        secrets,
    }
}

async fn color_server() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/colors.json"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"#ff0000": "Red", "#0000ff": "Blue"})),
        )
        .mount(&server)
        .await;
    server
}

#[tokio::test]
async fn test_update_then_suggest_then_run() {
    let server = color_server().await;
    let client = MockHubClient::new()
        .with_devices(devices())
        .with_command_response(json!({"switch": "on"}));
    let mut h = harness(client, &format!("{}/colors.json", server.uri()));

    h.orchestrator.run(Command::Update).await.unwrap();
    assert_eq!(h.cache().load_devices().unwrap(), devices());
    assert_eq!(h.cache().load_colors().unwrap().resolve("red"), "FF0000");

    let list = h.orchestrator.suggestions("Porch Bulb color re").await.unwrap();
    let args: Vec<_> = list.items.iter().map(|i| i.arg.as_str()).collect();
    assert!(args.contains(&"run --device-uid 5 --device-command color --device-params red"));

    h.orchestrator
        .run(Command::Run {
            device_uid: "1".to_string(),
            device_command: "on".to_string(),
            device_params: vec![],
        })
        .await
        .unwrap();

    assert_eq!(
        h.notifier.messages(),
        vec!["Devices and colors updated", "Kitchen Light turned on"]
    );
}

#[tokio::test]
async fn test_suggestions_without_cached_devices() {
    let mut h = harness(MockHubClient::new(), "http://127.0.0.1:9/colors.json");
    h.orchestrator.run(Command::Reinit).await.unwrap();
    h.secrets.set("hubitat_api_key", "token").unwrap();

    let list = h.orchestrator.suggestions("kitchen").await.unwrap();

    assert_eq!(list.items.len(), 1);
    assert_eq!(list.items[0].title, "No Devices...");
    assert!(!list.items[0].valid);
}

#[tokio::test]
async fn test_do_with_ambiguous_query() {
    let server = color_server().await;
    let client = MockHubClient::new().with_devices(devices());
    let mut h = harness(client, &format!("{}/colors.json", server.uri()));
    h.orchestrator.run(Command::Update).await.unwrap();

    h.orchestrator
        .run(Command::Do {
            text: vec!["kitchen".to_string()],
        })
        .await
        .unwrap();

    assert_eq!(
        h.notifier.messages().last().map(String::as_str),
        Some("'kitchen' matches several devices: Kitchen Light, Kitchen Light 2")
    );
}

#[tokio::test]
async fn test_chooser_queries_do_not_contact_the_hub() {
    let hub = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    hub.set_nonblocking(true).unwrap();
    let hub_address = hub.local_addr().unwrap().to_string();

    let dir = tempdir().unwrap();
    let cache = CatalogCache::open(dir.path().join("cache")).unwrap();
    cache
        .store_devices(&[Device::new("1", "Kitchen Light", &["Switch", "SwitchLevel"])])
        .unwrap();
    let secrets = Arc::new(MemorySecretStore::with_secrets(&[
        ("hubitat_api_key", "token"),
        ("hubitat_hub_ip", hub_address.as_str()),
    ]));

    // Auto mode with show-status off.
    let orchestrator = Orchestrator::new(
        Config::default(),
        dir.path().join("config.toml"),
        secrets,
        cache,
        Arc::new(RecordingNotifier::new()),
    );
    for query in ["k", "ki", "kit", "Kitchen Light"] {
        let list = orchestrator.suggestions(query).await.unwrap();
        assert!(!list.items.is_empty(), "no items for '{query}'");
    }

    match hub.accept() {
        Ok((_, peer)) => panic!("hub was contacted from {peer}"),
        Err(e) => assert_eq!(e.kind(), std::io::ErrorKind::WouldBlock),
    }
}

#[test]
fn test_settings_persist() {
    let mut h = harness(MockHubClient::new(), "http://127.0.0.1:9/colors.json");

    tokio_test::block_on(async {
        h.orchestrator
            .run(Command::Showstatus { value: Toggle::On })
            .await
            .unwrap();
        h.orchestrator
            .run(Command::Hubid {
                id: "abc-123".to_string(),
            })
            .await
            .unwrap();
    });

    let saved = Config::load_from_file(&h.config_path()).unwrap();
    assert!(saved.display.show_status);
    assert_eq!(
        h.secrets.get("hubitat_hub_id").unwrap(),
        Some("abc-123".to_string())
    );
    assert_eq!(h.notifier.messages(), vec!["Show Status on", "Hub ID Saved"]);
}

#[test]
fn test_run_unknown_device_is_guidance() {
    let mut h = harness(MockHubClient::new(), "http://127.0.0.1:9/colors.json");

    let err = tokio_test::block_on(h.orchestrator.run(Command::Run {
        device_uid: "42".to_string(),
        device_command: "on".to_string(),
        device_params: vec![],
    }))
    .unwrap_err();

    assert!(err.is_guidance());
    assert!(err.to_string().contains("hb update"));
}
