//! Handshake-strategy session establishment through the room key
//! directory, and message exchange once both sides have agreed.

use std::sync::Arc;
use std::time::Duration;

use gl_client::{Client, ClientConfig, LogService, MemoryLogService, Strategy};
use gl_proto::PayloadKind;

#[tokio::test]
async fn two_peers_agree_and_exchange() {
    let log = Arc::new(MemoryLogService::new());

    // Alice logs in first: she publishes her key and then blocks waiting
    // for a foreign key, so she must run concurrently with Bob.
    let alice_log: Arc<dyn LogService> = Arc::clone(&log) as _;
    let alice_task = tokio::spawn(async move {
        Client::login(alice_log, ClientConfig::default(), "alice", Strategy::Handshake).await
    });

    // Give Alice time to publish before Bob joins.
    tokio::time::sleep(Duration::from_millis(50)).await;

    let bob_log: Arc<dyn LogService> = Arc::clone(&log) as _;
    let bob = Client::login(bob_log, ClientConfig::default(), "bob", Strategy::Handshake)
        .await
        .expect("bob login");

    let alice = tokio::time::timeout(Duration::from_secs(2), alice_task)
        .await
        .expect("alice login timely")
        .expect("join")
        .expect("alice login");

    // Pairwise agreement: a message sealed by Alice opens for Bob.
    let mut bob_feed = bob.start_feed().await.expect("feed");
    alice.send_text("the wire is live").await.expect("send");

    let item = tokio::time::timeout(Duration::from_secs(2), bob_feed.recv())
        .await
        .expect("timely")
        .expect("item");
    assert_eq!(item.payload.user, "alice");
    assert_eq!(item.payload.content, "the wire is live");
    assert_eq!(item.payload.kind, PayloadKind::Text);
}

#[tokio::test]
async fn malformed_peer_key_does_not_abort_the_handshake() {
    let log = Arc::new(MemoryLogService::new());

    // Poison the directory with a key nobody can parse.
    log.publish_key(
        "messages",
        gl_crypto::handshake::PeerKey {
            identity: "mallory".into(),
            public_key: "???definitely-not-base64???".into(),
            published_at: 0,
        },
    )
    .await
    .expect("publish");

    let alice_log: Arc<dyn LogService> = Arc::clone(&log) as _;
    let alice_task = tokio::spawn(async move {
        Client::login(alice_log, ClientConfig::default(), "alice", Strategy::Handshake).await
    });

    tokio::time::sleep(Duration::from_millis(50)).await;

    // A well-formed peer arrives after the malformed one: the handshake
    // must still complete.
    let bob_log: Arc<dyn LogService> = Arc::clone(&log) as _;
    let _bob = Client::login(bob_log, ClientConfig::default(), "bob", Strategy::Handshake)
        .await
        .expect("bob login");

    let alice = tokio::time::timeout(Duration::from_secs(2), alice_task)
        .await
        .expect("timely")
        .expect("join");
    assert!(alice.is_ok(), "malformed peer key must not be fatal");
}
