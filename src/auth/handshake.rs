//! The cross-context authorization handshake.
//!
//! One call to [`PopupLauncher::authorize`] opens the authorization window,
//! arms a message listener and a closure watchdog, and suspends the caller
//! until the first of {success signal, error signal, window closed} settles
//! the attempt. Settlement happens exactly once; the window handle, the
//! message subscription and the polling timer are released on every exit
//! path.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::{oneshot, Mutex};

use crate::auth::messages::{HandshakeSignal, MessageBus, MessageSubscription};
use crate::auth::window::{PopupHandle, PopupOpener, PopupRequest};

/// How often the watchdog checks whether the user closed the window.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Rejection reason when an error signal carries no message of its own.
pub const GENERIC_DENIAL: &str = "Authentication failed";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HandshakeError {
    /// The environment refused to open the window. Terminal; not retried here.
    #[error("popup blocked: the browser refused to open the authorization window")]
    PopupBlocked,

    /// The user closed the window before completing the flow. Distinct from
    /// [`HandshakeError::Denied`] so callers can tell cancellation apart from
    /// a provider-reported failure.
    #[error("authorization window was closed before completing sign-in")]
    ClosedByUser,

    /// The callback page reported a failure.
    #[error("{0}")]
    Denied(String),

    /// Both observers went away without settling. Callers guard the whole
    /// flow with a timeout, so this surfaces only on internal shutdown.
    #[error("authorization handshake interrupted before completion")]
    Interrupted,
}

/// Transient state of one in-progress authorization attempt.
struct HandshakeSession<H: PopupHandle> {
    popup: Option<H>,
    active: bool,
}

impl<H: PopupHandle> HandshakeSession<H> {
    fn new(popup: H) -> Self {
        Self {
            popup: Some(popup),
            active: true,
        }
    }

    fn popup_closed(&self) -> bool {
        !self.active
            || self
                .popup
                .as_ref()
                .map(PopupHandle::is_closed)
                .unwrap_or(true)
    }

    /// Ends the session, closing the window if it is still open. Safe to
    /// call repeatedly; later calls are no-ops.
    fn end(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;
        if let Some(mut popup) = self.popup.take() {
            if !popup.is_closed() {
                popup.close();
            }
        }
    }
}

/// Single-assignment settlement cell shared by the two observers.
///
/// Claiming is `take()` on the inner sender: the first writer wins and every
/// later `settle` observes `false` and must not touch the session.
#[derive(Clone)]
struct SettleCell {
    tx: Arc<Mutex<Option<oneshot::Sender<Result<(), HandshakeError>>>>>,
}

impl SettleCell {
    fn new(tx: oneshot::Sender<Result<(), HandshakeError>>) -> Self {
        Self {
            tx: Arc::new(Mutex::new(Some(tx))),
        }
    }

    async fn settle(&self, outcome: Result<(), HandshakeError>) -> bool {
        match self.tx.lock().await.take() {
            Some(tx) => {
                let _ = tx.send(outcome);
                true
            }
            None => false,
        }
    }

    async fn is_settled(&self) -> bool {
        self.tx.lock().await.is_none()
    }
}

/// Launches authorization windows and coordinates their completion.
pub struct PopupLauncher<O: PopupOpener> {
    opener: O,
    bus: MessageBus,
    expected_origin: String,
    poll_interval: Duration,
}

impl<O: PopupOpener> PopupLauncher<O> {
    /// `expected_origin` is the only origin completion messages are accepted
    /// from; anything else is dropped without comment.
    pub fn new(opener: O, bus: MessageBus, expected_origin: impl Into<String>) -> Self {
        Self {
            opener,
            bus,
            expected_origin: expected_origin.into(),
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Runs one authorization handshake to completion.
    ///
    /// Fulfillment carries no payload; callers re-read whatever state the
    /// flow produced (stored authorization code, refreshed account list)
    /// from their own session store. There is no retry in here; a failed
    /// attempt is reported and retrying is the caller's decision.
    pub async fn authorize(&self, request: PopupRequest) -> Result<(), HandshakeError> {
        // A blocked popup is reported before any observer is armed.
        let popup = self
            .opener
            .open(&request)
            .ok_or(HandshakeError::PopupBlocked)?;

        let session = Arc::new(Mutex::new(HandshakeSession::new(popup)));
        let subscription = self.bus.subscribe();
        let (tx, rx) = oneshot::channel();
        let cell = SettleCell::new(tx);

        let listener = tokio::spawn(run_listener(
            subscription,
            self.expected_origin.clone(),
            Arc::clone(&session),
            cell.clone(),
        ));
        let watchdog = tokio::spawn(run_watchdog(
            self.poll_interval,
            Arc::clone(&session),
            cell.clone(),
        ));

        let outcome = rx
            .await
            .unwrap_or_else(|_| Err(HandshakeError::Interrupted));

        // Whichever observer lost the race is torn down here, together with
        // anything the winner did not already release.
        listener.abort();
        watchdog.abort();
        session.lock().await.end();

        outcome
    }
}

async fn run_listener<H: PopupHandle>(
    mut subscription: MessageSubscription,
    expected_origin: String,
    session: Arc<Mutex<HandshakeSession<H>>>,
    cell: SettleCell,
) {
    while let Some(message) = subscription.recv().await {
        // Mandatory origin check: cross-origin traffic is dropped silently,
        // it must never settle or error the handshake.
        if message.origin != expected_origin {
            continue;
        }

        let signal = match serde_json::from_value::<HandshakeSignal>(message.data) {
            Ok(signal) => signal,
            Err(_) => continue,
        };

        let outcome = match signal {
            HandshakeSignal::OauthSuccess { .. } => Ok(()),
            HandshakeSignal::OauthError { error, .. } => Err(HandshakeError::Denied(
                error.unwrap_or_else(|| GENERIC_DENIAL.to_string()),
            )),
        };

        // Claim the cell before closing the window, otherwise the watchdog
        // could observe the close and call it user abandonment.
        if cell.settle(outcome).await {
            subscription.dispose();
            session.lock().await.end();
        }
        break;
    }
}

async fn run_watchdog<H: PopupHandle>(
    every: Duration,
    session: Arc<Mutex<HandshakeSession<H>>>,
    cell: SettleCell,
) {
    let mut ticker = tokio::time::interval(every);
    // The first tick of a tokio interval completes immediately.
    ticker.tick().await;
    loop {
        ticker.tick().await;
        if cell.is_settled().await {
            break;
        }
        if session.lock().await.popup_closed() {
            if cell.settle(Err(HandshakeError::ClosedByUser)).await {
                session.lock().await.end();
            }
            break;
        }
    }
}
