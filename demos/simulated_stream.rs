// Simulated Stream Example
//
// This example demonstrates:
// - Driving a ConnectionManager through its handle
// - Stream format negotiation against a server that only knows one name
// - Backoff reconnects after dropped sessions
//
// Usage:
//   cargo run --example simulated_stream -- "Front Door"

use std::env;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use log::{debug, error, info};
use streamlink::{
    ConnectionManager, ConnectionStatus, EventSink, ManagerConfig, PeerState, Result,
    SessionOptions, SignalingFailure, StatusSnapshot, StreamTarget, TransportAdapter, TransportError,
    TransportEvent, TransportSession,
};
use url::Url;

/// Transport whose server only publishes `rtp/front_door` and drops the
/// first two sessions it serves
struct SimulatedTransport {
    served: Arc<AtomicUsize>,
}

struct SimulatedSession {
    task: tokio::task::JoinHandle<()>,
}

#[async_trait::async_trait]
impl TransportAdapter for SimulatedTransport {
    async fn open(
        &self,
        signaling_url: &Url,
        _options: &SessionOptions,
        events: EventSink,
    ) -> std::result::Result<Box<dyn TransportSession>, TransportError> {
        let param = |key: &str| {
            signaling_url.query_pairs()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.into_owned())
                .unwrap_or_default()
        };
        let known = param("app") == "rtp" && param("stream") == "front_door";
        let served = self.served.clone();

        let task = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            if !known {
                events.emit(TransportEvent::OfferAnswerExchangeFailed(
                    SignalingFailure::new(Some(200), Some(-400), "stream not found"),
                ));
                return;
            }

            events.emit(TransportEvent::ConnectionStateChanged(PeerState::Connected));
            if served.fetch_add(1, Ordering::SeqCst) < 2 {
                tokio::time::sleep(Duration::from_millis(300)).await;
                events.emit(TransportEvent::ConnectionStateChanged(PeerState::Disconnected));
            }
        });

        Ok(Box::new(SimulatedSession { task }))
    }
}

#[async_trait::async_trait]
impl TransportSession for SimulatedSession {
    async fn close(&mut self) {
        self.task.abort();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let stream_id = env::args().nth(1).unwrap_or_else(|| "Front Door".to_string());

    let config = ManagerConfig::builder()
        .signaling_url("http://127.0.0.1:8080/index/api/webrtc")
        .backoff(Duration::from_millis(200), Duration::from_secs(2))
        .format_retry_delay(Duration::from_millis(50))
        .build()?;

    let transport = SimulatedTransport {
        served: Arc::new(AtomicUsize::new(0)),
    };
    let handle = ConnectionManager::new(config, transport)?.spawn();
    let mut snapshots = handle.subscribe();

    info!("Connecting to live/{}", stream_id);
    handle.connect(StreamTarget::new("live", stream_id))?;

    let mut stable_plays = 0;
    while snapshots.changed().await.is_ok() {
        let snapshot: StatusSnapshot = (*snapshots.borrow_and_update()).clone();
        info!(
            "[{}] {} (retry {}/{}, format {}/{})",
            snapshot.status,
            snapshot.status_message,
            snapshot.retry_count,
            snapshot.max_attempts,
            snapshot.candidate_index + 1,
            snapshot.candidate_count,
        );

        match snapshot.status {
            ConnectionStatus::Playing => {
                stable_plays += 1;
                if stable_plays == 3 {
                    break;
                }
            }
            ConnectionStatus::Error => {
                error!("Giving up: {}", snapshot.error_message.unwrap_or_default());
                break;
            }
            status if status.is_active() => {
                debug!("Waiting on the manager ({})", status);
            }
            _ => {}
        }
    }

    handle.destroy()?;
    handle.join().await?;
    info!("Done");
    Ok(())
}
