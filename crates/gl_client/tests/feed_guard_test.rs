//! Behavioral guards: duplicate change-event suppression and the
//! one-send-in-flight rule, exercised with small trait doubles.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;

use gl_client::{Client, ClientConfig, LogService, Strategy, TransportError};
use gl_crypto::handshake::PeerKey;
use gl_crypto::kdf;
use gl_proto::record::SENDER_PLACEHOLDER;
use gl_proto::{codec, ChangeEvent, ChangeKind, LogRecord, NewRecord, Payload, RecordId};

fn passphrase() -> Strategy {
    Strategy::Passphrase("correct horse battery staple".into())
}

/// Delivers every prepared event twice — a change stream that redelivers.
struct DuplicatingLog {
    events: Vec<ChangeEvent>,
}

#[async_trait]
impl LogService for DuplicatingLog {
    async fn append(&self, _record: NewRecord) -> Result<RecordId, TransportError> {
        Err(TransportError("append unsupported".into()))
    }

    async fn subscribe_ordered(
        &self,
        _last_n: usize,
    ) -> Result<mpsc::UnboundedReceiver<ChangeEvent>, TransportError> {
        let (tx, rx) = mpsc::unbounded_channel();
        for event in &self.events {
            let _ = tx.send(event.clone());
            let _ = tx.send(event.clone());
        }
        Ok(rx)
    }

    async fn delete(&self, _id: &RecordId) -> Result<(), TransportError> {
        Ok(())
    }

    async fn publish_key(&self, _room: &str, _key: PeerKey) -> Result<(), TransportError> {
        Ok(())
    }

    async fn subscribe_keys(
        &self,
        _room: &str,
    ) -> Result<mpsc::UnboundedReceiver<PeerKey>, TransportError> {
        let (_tx, rx) = mpsc::unbounded_channel();
        Ok(rx)
    }
}

#[tokio::test]
async fn duplicate_record_ids_surface_once() {
    // Seal a record under the room key the client will derive.
    let sealer = gl_crypto::Session::establish(
        "alice",
        kdf::room_key_from_passphrase("correct horse battery staple"),
    );
    let envelope = codec::seal(&sealer, &Payload::text("alice", "once only"))
        .await
        .expect("seal");

    let record = LogRecord {
        id: RecordId("r-1".into()),
        sender: SENDER_PLACEHOLDER.into(),
        payload: envelope.to_wire_json(),
        timestamp: chrono::Utc::now().timestamp_millis(),
    };
    let log: Arc<dyn LogService> = Arc::new(DuplicatingLog {
        events: vec![ChangeEvent {
            kind: ChangeKind::Added,
            record,
        }],
    });

    let bob = Client::login(log, ClientConfig::default(), "bob", passphrase())
        .await
        .expect("login");
    let mut feed = bob.start_feed().await.expect("feed");

    let first = tokio::time::timeout(Duration::from_secs(2), feed.recv())
        .await
        .expect("timely")
        .expect("item");
    assert_eq!(first.payload.content, "once only");

    let second = tokio::time::timeout(Duration::from_millis(300), feed.recv()).await;
    assert!(second.is_err(), "duplicate delivery must be suppressed");
}

#[tokio::test]
async fn non_added_events_are_ignored() {
    let record = LogRecord {
        id: RecordId("r-2".into()),
        sender: SENDER_PLACEHOLDER.into(),
        payload: "{}".into(),
        timestamp: chrono::Utc::now().timestamp_millis(),
    };
    let log: Arc<dyn LogService> = Arc::new(DuplicatingLog {
        events: vec![
            ChangeEvent {
                kind: ChangeKind::Modified,
                record: record.clone(),
            },
            ChangeEvent {
                kind: ChangeKind::Removed,
                record,
            },
        ],
    });

    let bob = Client::login(log, ClientConfig::default(), "bob", passphrase())
        .await
        .expect("login");
    let mut feed = bob.start_feed().await.expect("feed");

    let quiet = tokio::time::timeout(Duration::from_millis(300), feed.recv()).await;
    assert!(quiet.is_err(), "modified/removed events must not surface");
}

/// An append that never returns until told to — holds a send in flight.
struct StallingLog {
    release: tokio::sync::Notify,
}

#[async_trait]
impl LogService for StallingLog {
    async fn append(&self, _record: NewRecord) -> Result<RecordId, TransportError> {
        self.release.notified().await;
        Ok(RecordId("r-stalled".into()))
    }

    async fn subscribe_ordered(
        &self,
        _last_n: usize,
    ) -> Result<mpsc::UnboundedReceiver<ChangeEvent>, TransportError> {
        let (_tx, rx) = mpsc::unbounded_channel();
        Ok(rx)
    }

    async fn delete(&self, _id: &RecordId) -> Result<(), TransportError> {
        Ok(())
    }

    async fn publish_key(&self, _room: &str, _key: PeerKey) -> Result<(), TransportError> {
        Ok(())
    }

    async fn subscribe_keys(
        &self,
        _room: &str,
    ) -> Result<mpsc::UnboundedReceiver<PeerKey>, TransportError> {
        let (_tx, rx) = mpsc::unbounded_channel();
        Ok(rx)
    }
}

#[tokio::test]
async fn second_send_while_one_is_in_flight_is_rejected() {
    let stalling = Arc::new(StallingLog {
        release: tokio::sync::Notify::new(),
    });
    let log: Arc<dyn LogService> = Arc::clone(&stalling) as _;

    let client = Arc::new(
        Client::login(log, ClientConfig::default(), "alice", passphrase())
            .await
            .expect("login"),
    );

    let in_flight = Arc::clone(&client);
    let first = tokio::spawn(async move { in_flight.send_text("first").await });

    // Let the first send reach the stalled append.
    tokio::time::sleep(Duration::from_millis(50)).await;

    let second = client.send_text("second").await;
    assert!(
        matches!(second, Err(gl_client::ClientError::SendInFlight)),
        "concurrent send must be rejected, not queued"
    );

    // Release the first send; it completes normally.
    stalling.release.notify_one();
    let first = tokio::time::timeout(Duration::from_secs(2), first)
        .await
        .expect("timely")
        .expect("join");
    assert!(first.is_ok());

    // And the guard is free again.
    let retry = tokio::spawn({
        let client = Arc::clone(&client);
        async move { client.send_text("third").await }
    });
    tokio::time::sleep(Duration::from_millis(50)).await;
    stalling.release.notify_one();
    assert!(retry.await.expect("join").is_ok());
}

#[tokio::test]
async fn transport_failure_surfaces_as_send_error() {
    struct FailingLog;

    #[async_trait]
    impl LogService for FailingLog {
        async fn append(&self, _record: NewRecord) -> Result<RecordId, TransportError> {
            Err(TransportError("store unreachable".into()))
        }

        async fn subscribe_ordered(
            &self,
            _last_n: usize,
        ) -> Result<mpsc::UnboundedReceiver<ChangeEvent>, TransportError> {
            let (_tx, rx) = mpsc::unbounded_channel();
            Ok(rx)
        }

        async fn delete(&self, _id: &RecordId) -> Result<(), TransportError> {
            Ok(())
        }

        async fn publish_key(&self, _room: &str, _key: PeerKey) -> Result<(), TransportError> {
            Ok(())
        }

        async fn subscribe_keys(
            &self,
            _room: &str,
        ) -> Result<mpsc::UnboundedReceiver<PeerKey>, TransportError> {
            let (_tx, rx) = mpsc::unbounded_channel();
            Ok(rx)
        }
    }

    let log: Arc<dyn LogService> = Arc::new(FailingLog);
    let client = Client::login(log, ClientConfig::default(), "alice", passphrase())
        .await
        .expect("login");

    let err = client.send_text("doomed").await;
    assert!(matches!(err, Err(gl_client::ClientError::Transport(_))));
}
