//! Completion messages for the authorization handshake.
//!
//! The redirect page (the loopback callback server in this CLI) posts a
//! structured signal onto a process-wide bus; the handshake listener consumes
//! it. The bus mirrors the cross-window messaging surface the flow was
//! designed around, origin tag included.

use serde::Deserialize;
use serde_json::Value;
use tokio::sync::broadcast;

/// A message posted by another context, tagged with the origin it came from.
#[derive(Debug, Clone)]
pub struct WindowMessage {
    pub origin: String,
    pub data: Value,
}

/// The two signals the listener recognizes. A message that does not parse
/// into one of these shapes is ignored without settling the handshake.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HandshakeSignal {
    /// The flow completed. `platform` is carried for the caller's benefit
    /// and never interpreted here.
    OauthSuccess {
        #[serde(default)]
        platform: Option<String>,
    },
    /// The flow failed; `error` is the provider's human-readable reason.
    OauthError {
        #[serde(default)]
        error: Option<String>,
        #[serde(default)]
        platform: Option<String>,
    },
}

const BUS_CAPACITY: usize = 32;

/// Process-wide message channel. Cloning shares the underlying bus.
#[derive(Debug, Clone)]
pub struct MessageBus {
    tx: broadcast::Sender<WindowMessage>,
}

impl MessageBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(BUS_CAPACITY);
        Self { tx }
    }

    /// Posts a message to every live subscriber. Posting with no subscribers
    /// drops the message silently.
    pub fn post(&self, origin: impl Into<String>, data: Value) {
        let _ = self.tx.send(WindowMessage {
            origin: origin.into(),
            data,
        });
    }

    pub fn subscribe(&self) -> MessageSubscription {
        MessageSubscription {
            rx: Some(self.tx.subscribe()),
        }
    }

    #[cfg(test)]
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for MessageBus {
    fn default() -> Self {
        Self::new()
    }
}

/// One handshake's registration on the bus.
///
/// Disposal is idempotent and also happens on drop, so every exit path of a
/// handshake releases the registration exactly once.
pub struct MessageSubscription {
    rx: Option<broadcast::Receiver<WindowMessage>>,
}

impl MessageSubscription {
    /// Waits for the next message. Returns `None` once the subscription is
    /// disposed or the bus itself is gone.
    pub async fn recv(&mut self) -> Option<WindowMessage> {
        let rx = self.rx.as_mut()?;
        loop {
            match rx.recv().await {
                Ok(message) => return Some(message),
                // Slow consumers skip overwritten messages rather than erroring.
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => {
                    self.rx = None;
                    return None;
                }
            }
        }
    }

    pub fn dispose(&mut self) {
        self.rx = None;
    }

    pub fn is_disposed(&self) -> bool {
        self.rx.is_none()
    }
}
