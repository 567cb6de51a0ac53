//! Integration tests for the Telegram notifier against a local Bot API stub

use std::time::Duration;

use grid_trader::common::errors::BotError;
use grid_trader::common::traits::Notifier;
use grid_trader::common::types::SessionId;
use grid_trader::config::types::TelegramConfig;
use grid_trader::notify::{SessionEvent, TelegramNotifier};
use grid_trader::strategy::Action;
use rust_decimal_macros::dec;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn notifier_for(server: &MockServer) -> TelegramNotifier {
    let config = TelegramConfig {
        token: "123:abc".to_string(),
        chat_id: "4242".to_string(),
        api_url: server.uri(),
    };
    TelegramNotifier::new(&config, Duration::from_secs(2))
        .expect("Failed to create notifier")
        .expect("Notifier should be configured")
}

#[tokio::test]
async fn test_event_is_posted_to_chat() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/bot123:abc/sendMessage"))
        .and(body_json(serde_json::json!({
            "chat_id": "4242",
            "text": "[#3] Action executed: Bought at 89"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "ok": true })))
        .expect(1)
        .mount(&server)
        .await;

    let event = SessionEvent::TradeExecuted {
        symbol: "BTCUSDT".to_string(),
        action: Action::Bought(dec!(89)),
    };
    tokio_test::assert_ok!(notifier_for(&server).notify(SessionId(3), &event).await);
}

#[tokio::test]
async fn test_rejected_message_is_notification_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(403).set_body_json(serde_json::json!({
            "ok": false,
            "description": "Forbidden: bot was blocked by the user"
        })))
        .mount(&server)
        .await;

    let event = SessionEvent::Stopped {
        symbol: "ETHUSDT".to_string(),
    };
    let result = notifier_for(&server).notify(SessionId(1), &event).await;

    match result {
        Err(BotError::Notification(message)) => assert!(message.contains("403")),
        other => panic!("expected notification error, got {:?}", other),
    }
}
