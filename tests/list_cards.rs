mod common;

use bloss_bridge::envelope::{BlossError, Reply};
use async_trait::async_trait;
use bloss_bridge::transport::{channel, LoopbackTransport, Port, Transport, TransportError};
use bloss_bridge::{BlossClient, Error};
use serde_json::json;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Helper double that answers every request with `reply`.
fn helper(reply: serde_json::Value) -> LoopbackTransport {
    LoopbackTransport::new(move |mut host| {
        let reply = reply.clone();
        async move {
            while host.recv().await.is_some() {
                let _ = host.reply(&reply);
            }
        }
    })
}

#[tokio::test]
async fn sends_list_cards_command() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let record = seen.clone();
    let transport = LoopbackTransport::new(move |mut host| {
        let record = record.clone();
        async move {
            if let Some(request) = host.recv().await {
                record.lock().unwrap().push(request);
                let _ = host.reply(&json!({"Ok": {"ListCards": []}}));
            }
        }
    });

    let cards = BlossClient::new(transport).list_cards().await.unwrap();
    assert!(cards.is_empty());
    assert_eq!(*seen.lock().unwrap(), vec![json!({"command": "ListCards"})]);
}

#[tokio::test]
async fn preserves_helper_order_and_contents() {
    let cards = vec![
        common::card("Yubico", "16223637", "D2760001240103040006223637060000", 0xaa),
        common::card("Nitrokey", "000a1b2c", "D276000124010304000F000A1B2C0000", 0x01),
        common::card("Yubico", "00000001", "D2760001240103040006000000010000", 0x7f),
    ];
    let transport = helper(Reply::Cards(cards.clone()).to_wire());

    let listed = BlossClient::new(transport).list_cards().await.unwrap();
    assert_eq!(listed, cards);
}

#[tokio::test]
async fn rejects_with_decoded_helper_error() {
    let transport = helper(json!({"Error": {"PcscError": {"code": "0x8010002E"}}}));
    let err = BlossClient::new(transport).list_cards().await.unwrap_err();
    match err {
        Error::Bloss(e) => assert_eq!(e, BlossError::new("PcscError", json!({"code": "0x8010002E"}))),
        other => panic!("expected helper error, got {other:?}"),
    }
}

#[tokio::test]
async fn malformed_reply_fails_loudly() {
    let transport = helper(json!({"cards": []}));
    let err = BlossClient::new(transport).list_cards().await.unwrap_err();
    assert!(matches!(err, Error::Decode(_)), "got {err:?}");
    assert_eq!(err.kind(), "decode");
}

#[tokio::test]
async fn wrong_payload_for_operation_is_rejected() {
    let transport = helper(json!({"Ok": "AwaitTouch"}));
    let err = BlossClient::new(transport).list_cards().await.unwrap_err();
    assert!(matches!(
        err,
        Error::UnexpectedReply {
            operation: "ListCards",
            got: "AwaitTouch"
        }
    ));
}

#[tokio::test]
async fn helper_exiting_without_reply_is_disconnected() {
    let transport = LoopbackTransport::new(|mut host| async move {
        let _ = host.recv().await;
        host.disconnect(Some("Native host has exited.".into()));
    });
    let err = BlossClient::new(transport).list_cards().await.unwrap_err();
    assert_eq!(err.kind(), "disconnected");
}

/// A transport whose helper has already exited by the time the port is handed out.
struct ExitedAtStartup;

#[async_trait]
impl Transport for ExitedAtStartup {
    async fn connect_native(&self) -> Result<Port, TransportError> {
        let (port, host) = channel("exited");
        host.disconnect(Some("Native host has exited.".into()));
        Ok(port)
    }
}

#[tokio::test]
async fn helper_gone_before_request_is_disconnected_with_reason() {
    let err = BlossClient::new(ExitedAtStartup).list_cards().await.unwrap_err();
    assert_eq!(err.kind(), "disconnected", "got {err:?}");
    assert!(matches!(
        err,
        Error::Disconnected { reason: Some(ref r) } if r == "Native host has exited."
    ));
}

#[tokio::test]
async fn concurrent_calls_each_get_their_own_channel() {
    let transport = LoopbackTransport::new(|mut host| async move {
        if host.recv().await.is_some() {
            tokio::task::yield_now().await;
            let _ = host.reply(&Reply::Cards(vec![common::card("Yubico", "1", "A1", 1)]).to_wire());
        }
    });
    let client = BlossClient::new(transport);

    let (a, b, c) = tokio::join!(client.list_cards(), client.list_cards(), client.list_cards());
    for listed in [a, b, c] {
        assert_eq!(listed.unwrap()[0].aid, "A1");
    }
    assert_eq!(client.transport().connections(), 3);
}

#[tokio::test(start_paused = true)]
async fn request_timeout_rejects_with_timeout_kind() {
    let transport = LoopbackTransport::new(|mut host| async move {
        // Read the request and never answer.
        let _request = host.recv().await;
        let _ = host.recv().await;
    });
    let client = BlossClient::new(transport).with_request_timeout(Duration::from_secs(2));

    let err = client.list_cards().await.unwrap_err();
    assert!(matches!(err, Error::Timeout(limit) if limit == Duration::from_secs(2)));
    assert_eq!(err.kind(), "timeout");
}
