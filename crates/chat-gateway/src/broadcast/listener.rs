//! Broadcast listener
//!
//! Receives envelopes from the event bus and writes them to the sessions of
//! their recipients that live on this process. Delivery is at most once: a
//! recipient connected elsewhere is served by that process's listener, and a
//! recipient connected nowhere simply misses the event.

use crate::connection::{ConnectionRegistry, OutboundFrame};
use chat_cache::ReceivedMessage;
use chat_core::BroadcastEnvelope;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;

/// Single consumer task per process dispatching bus envelopes to sessions
pub struct BroadcastListener {
    registry: Arc<ConnectionRegistry>,
    shutdown_tx: watch::Sender<bool>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl BroadcastListener {
    /// Create a listener over the registry; nothing runs until [`start`](Self::start)
    pub fn new(registry: Arc<ConnectionRegistry>) -> Self {
        let (shutdown_tx, _) = watch::channel(false);
        Self {
            registry,
            shutdown_tx,
            task: Mutex::new(None),
        }
    }

    /// Spawn the consumer task.
    ///
    /// Only the first call starts a task; later calls are logged and ignored.
    pub fn start(&self, receiver: broadcast::Receiver<ReceivedMessage>) -> bool {
        let mut task = self.task.lock();
        if task.is_some() {
            tracing::warn!("Broadcast listener is already running");
            return false;
        }

        let registry = self.registry.clone();
        let shutdown = self.shutdown_tx.subscribe();
        *task = Some(tokio::spawn(run(registry, receiver, shutdown)));

        tracing::info!("Broadcast listener started");
        true
    }

    /// Signal the consumer task to stop and wait for it to finish
    pub async fn stop(&self) {
        self.shutdown_tx.send_replace(true);

        let task = self.task.lock().take();
        if let Some(task) = task {
            if let Err(e) = task.await {
                tracing::warn!(error = %e, "Broadcast listener task failed");
            }
            tracing::info!("Broadcast listener stopped");
        }
    }

    /// Whether the consumer task is alive
    pub fn is_running(&self) -> bool {
        self.task
            .lock()
            .as_ref()
            .is_some_and(|task| !task.is_finished())
    }

    /// Deliver one envelope to local recipients, returning the number of
    /// successful writes
    pub fn dispatch(&self, envelope: &BroadcastEnvelope) -> usize {
        dispatch(&self.registry, envelope)
    }
}

impl Drop for BroadcastListener {
    fn drop(&mut self) {
        self.shutdown_tx.send_replace(true);
    }
}

impl std::fmt::Debug for BroadcastListener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BroadcastListener")
            .field("registry", &self.registry)
            .field("running", &self.is_running())
            .finish()
    }
}

/// Consumer loop; processes envelopes in bus order until shutdown or until
/// the bus closes
async fn run(
    registry: Arc<ConnectionRegistry>,
    mut receiver: broadcast::Receiver<ReceivedMessage>,
    mut shutdown: watch::Receiver<bool>,
) {
    loop {
        tokio::select! {
            biased;

            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
            received = receiver.recv() => {
                match received {
                    Ok(message) => {
                        handle(&registry, message);
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "Broadcast listener lagged behind, envelopes dropped");
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        tracing::warn!("Event bus closed");
                        break;
                    }
                }
            }
        }
    }

    tracing::info!("Broadcast listener loop ended");
}

/// Decode a bus message and dispatch it
fn handle(registry: &ConnectionRegistry, message: ReceivedMessage) -> usize {
    let Some(envelope) = message.envelope else {
        match message.topic {
            Some(topic) => tracing::warn!(
                topic = %topic,
                error = message.decode_error.as_deref().unwrap_or("unknown"),
                "Discarding undecodable envelope"
            ),
            None => tracing::debug!(
                channel = %message.channel,
                "Discarding message from unknown channel"
            ),
        }
        return 0;
    };

    dispatch(registry, &envelope)
}

/// Serialize once and write the same frame to every local recipient
fn dispatch(registry: &ConnectionRegistry, envelope: &BroadcastEnvelope) -> usize {
    let frame: OutboundFrame = match envelope.to_json() {
        Ok(json) => Arc::from(json),
        Err(e) => {
            tracing::error!(kind = envelope.kind(), error = %e, "Failed to serialize envelope");
            return 0;
        }
    };

    let mut sent = 0;
    for recipient in &envelope.recipient_ids {
        let Some(connection) = registry.lookup(*recipient) else {
            continue;
        };

        match connection.try_send(frame.clone()) {
            Ok(()) => sent += 1,
            Err(mpsc::error::TrySendError::Full(_)) => tracing::warn!(
                user_id = %recipient,
                session_id = %connection.session_id(),
                kind = envelope.kind(),
                "Outbound queue full, dropping frame"
            ),
            Err(mpsc::error::TrySendError::Closed(_)) => tracing::debug!(
                user_id = %recipient,
                session_id = %connection.session_id(),
                "Session writer gone, dropping frame"
            ),
        }
    }

    tracing::trace!(
        kind = envelope.kind(),
        recipients = envelope.recipient_ids.len(),
        sent,
        "Envelope dispatched"
    );

    sent
}
