use std::io::Write;
use std::time::Duration;

use bridge::{BridgeConfig, ConfigLoader};
use mockito::Matcher;
use tempfile::TempDir;

const FIRING: &str = r#"{
    "status": "success",
    "data": {
        "alerts": [
            {
                "labels": {"alertname": "CPUHigh", "instance": "db1", "job": "node", "severity": "critical"},
                "annotations": {"summary": "CPU above 90%"},
                "state": "firing",
                "activeAt": "2024-05-01T10:00:00Z"
            }
        ]
    }
}"#;

fn config_for(server: &mockito::Server, alerts_path: &str) -> BridgeConfig {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.yaml");
    let mut file = std::fs::File::create(&path).unwrap();
    write!(
        file,
        r#"
bot_token: "123:abc"
telegram_chat_id: 7
telegram_api_url: {url}
alert_manager_url: {url}{alerts_path}
polling_interval: 1h
repeat_notification_interval: 10m
request_timeout: 5s
"#,
        url = server.url(),
        alerts_path = alerts_path,
    )
    .unwrap();

    ConfigLoader::new(&path)
        .with_env(Default::default())
        .load()
        .unwrap()
}

async fn mock_get_me(server: &mut mockito::Server) -> mockito::Mock {
    server
        .mock("GET", "/bot123:abc/getMe")
        .with_status(200)
        .with_body(r#"{"ok":true,"result":{"id":1,"is_bot":true,"first_name":"Alerts","username":"alerts_bot"}}"#)
        .create_async()
        .await
}

async fn mock_send(server: &mut mockito::Server, text: Matcher, hits: usize) -> mockito::Mock {
    server
        .mock("POST", "/bot123:abc/sendMessage")
        .match_body(text)
        .with_status(200)
        .with_body(r#"{"ok":true,"result":{"message_id":1}}"#)
        .expect(hits)
        .create_async()
        .await
}

#[tokio::test]
async fn test_startup_then_first_tick() {
    let mut server = mockito::Server::new_async().await;
    let _me = mock_get_me(&mut server).await;
    let _alerts = server
        .mock("GET", "/api/v1/alerts")
        .with_status(200)
        .with_body(FIRING)
        .expect_at_least(2)
        .create_async()
        .await;
    let startup = mock_send(&mut server, Matcher::Regex("monitoring the system".into()), 1).await;
    let alert = mock_send(&mut server, Matcher::Regex("CPUHigh".into()), 1).await;

    let config = config_for(&server, "/api/v1/alerts");
    bridge::run(config, tokio::time::sleep(Duration::from_millis(500)))
        .await
        .unwrap();

    startup.assert_async().await;
    alert.assert_async().await;
}

#[tokio::test]
async fn test_unreachable_source_reports_service_down() {
    let mut server = mockito::Server::new_async().await;
    let _me = mock_get_me(&mut server).await;
    let _alerts = server
        .mock("GET", "/api/v1/alerts")
        .with_status(500)
        .create_async()
        .await;
    let down = mock_send(&mut server, Matcher::Regex("Service unavailable".into()), 1).await;

    let config = config_for(&server, "/api/v1/alerts");
    let result = bridge::run(config, std::future::pending()).await;

    assert!(result.is_err());
    down.assert_async().await;
}

#[tokio::test]
async fn test_rejected_token_is_fatal() {
    let mut server = mockito::Server::new_async().await;
    let _me = server
        .mock("GET", "/bot123:abc/getMe")
        .with_status(401)
        .with_body(r#"{"ok":false,"error_code":401,"description":"Unauthorized"}"#)
        .create_async()
        .await;

    let config = config_for(&server, "/api/v1/alerts");
    let result = bridge::run(config, std::future::pending()).await;
    assert!(result.is_err());
}
