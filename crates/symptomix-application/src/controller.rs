//! Chat exchange controller.
//!
//! Owns the transcript and layout of one conversation and drives every
//! submission through `idle → pending → rendered | error-rendered`:
//!
//! 1. trim the input, ignore it when empty
//! 2. activate the layout, append the `user` entry and a `pending` placeholder
//! 3. call the backend on a spawned task
//! 4. swap the placeholder for a `bot` or `bot-error` entry
//!
//! Steps 2 and 4 each happen under a single lock acquisition, and every
//! mutation is published as a [`TranscriptEvent`].

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use symptomix_core::{
    ChatBackend, ClientConfig, EntryId, ExchangeState, InFlightPolicy, LayoutState,
    OutgoingMessage, Reply, Result, SessionContext, SymptomixError, Transcript,
};
use tokio::sync::{Mutex, broadcast};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::events::TranscriptEvent;

const DEFAULT_EVENT_BUFFER: usize = 100;

/// Tunables for a controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerOptions {
    pub policy: InFlightPolicy,
    /// Upper bound for one backend call; unbounded when `None`.
    pub request_timeout: Option<Duration>,
    /// Capacity of the transcript event channel.
    pub event_buffer: usize,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            policy: InFlightPolicy::default(),
            request_timeout: None,
            event_buffer: DEFAULT_EVENT_BUFFER,
        }
    }
}

impl ControllerOptions {
    pub fn from_config(config: &ClientConfig) -> Self {
        Self {
            policy: config.in_flight_policy,
            request_timeout: config.request_timeout(),
            ..Self::default()
        }
    }
}

/// Result of handing input to [`ChatExchangeController::submit`].
#[derive(Debug)]
pub enum Submission {
    /// Input was empty after trimming; nothing happened.
    Ignored,
    /// The in-flight policy refused the submission; nothing happened.
    Rejected { in_flight: usize },
    /// The controller was shut down or restarted; nothing happened.
    Closed,
    /// Placeholder is shown and the request is on its way.
    Started(ExchangeHandle),
}

/// Handle to a running exchange.
///
/// Dropping the handle does not stop the exchange.
#[derive(Debug)]
pub struct ExchangeHandle {
    user_entry: EntryId,
    pending_entry: EntryId,
    task: JoinHandle<Result<ExchangeReport>>,
}

impl ExchangeHandle {
    pub fn user_entry(&self) -> EntryId {
        self.user_entry
    }

    pub fn pending_entry(&self) -> EntryId {
        self.pending_entry
    }

    /// Waits for the exchange to reach its terminal state.
    pub async fn finished(self) -> Result<ExchangeReport> {
        self.task
            .await
            .map_err(|err| SymptomixError::internal(format!("exchange task failed: {err}")))?
    }
}

/// How an exchange ended.
#[derive(Debug, Clone, PartialEq)]
pub struct ExchangeReport {
    pub state: ExchangeState,
    /// The `bot` or `bot-error` entry that replaced the placeholder.
    pub terminal_entry: EntryId,
    /// The failure behind an `error-rendered` exchange. Never shown to the user.
    pub error: Option<SymptomixError>,
}

#[derive(Debug, Default)]
struct ConversationState {
    transcript: Transcript,
    layout: LayoutState,
}

struct Inner {
    session: SessionContext,
    backend: Arc<dyn ChatBackend>,
    options: ControllerOptions,
    state: Mutex<ConversationState>,
    events: broadcast::Sender<TranscriptEvent>,
    in_flight: AtomicUsize,
    cancel: CancellationToken,
}

/// Drives submissions for one conversation.
///
/// Cheap to clone; clones share the same transcript.
#[derive(Clone)]
pub struct ChatExchangeController {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for ChatExchangeController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatExchangeController")
            .field("session", &self.inner.session)
            .finish_non_exhaustive()
    }
}

impl ChatExchangeController {
    /// Creates a controller with an empty transcript and centered layout.
    pub fn new(
        session: SessionContext,
        backend: Arc<dyn ChatBackend>,
        options: ControllerOptions,
    ) -> Self {
        let (events, _) = broadcast::channel(options.event_buffer.max(1));
        tracing::info!(session = %session.id, policy = %options.policy, "conversation started");
        Self {
            inner: Arc::new(Inner {
                session,
                backend,
                options,
                state: Mutex::new(ConversationState::default()),
                events,
                in_flight: AtomicUsize::new(0),
                cancel: CancellationToken::new(),
            }),
        }
    }

    pub fn session(&self) -> &SessionContext {
        &self.inner.session
    }

    pub fn options(&self) -> ControllerOptions {
        self.inner.options
    }

    /// Subscribes to transcript events published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<TranscriptEvent> {
        self.inner.events.subscribe()
    }

    /// Snapshot of the transcript.
    pub async fn transcript(&self) -> Transcript {
        self.inner.state.lock().await.transcript.clone()
    }

    pub async fn layout(&self) -> LayoutState {
        self.inner.state.lock().await.layout
    }

    /// Number of exchanges waiting on the backend.
    pub fn in_flight(&self) -> usize {
        self.inner.in_flight.load(Ordering::SeqCst)
    }

    /// Submits raw user input.
    ///
    /// Returns once the user entry and placeholder are in the transcript; the
    /// backend call continues on its own task. Failures never escape: they
    /// end as a `bot-error` entry.
    pub async fn submit(&self, raw: &str) -> Submission {
        let message = match OutgoingMessage::new(raw, &self.inner.session) {
            Ok(message) => message,
            Err(_) => {
                tracing::debug!("ignoring empty submission");
                return Submission::Ignored;
            }
        };

        if self.is_shut_down() {
            tracing::debug!(session = %self.inner.session.id, "submission to a closed conversation");
            return Submission::Closed;
        }

        let guard = match InFlightGuard::acquire(&self.inner) {
            Ok(guard) => guard,
            Err(in_flight) => {
                tracing::warn!(
                    session = %self.inner.session.id,
                    in_flight,
                    "submission rejected while an exchange is outstanding"
                );
                return Submission::Rejected { in_flight };
            }
        };

        let (user_entry, pending_entry) = self.inner.begin(&message).await;

        let inner = Arc::clone(&self.inner);
        let task = tokio::spawn(async move {
            let _guard = guard;
            inner.complete(message, pending_entry).await
        });

        Submission::Started(ExchangeHandle {
            user_entry,
            pending_entry,
            task,
        })
    }

    /// Submits and waits for the terminal state.
    ///
    /// `Ok(None)` means the input was empty. A rejected submission is
    /// reported as `SymptomixError::Busy`, one to a closed controller as
    /// `SymptomixError::Cancelled`.
    pub async fn submit_and_wait(&self, raw: &str) -> Result<Option<ExchangeReport>> {
        match self.submit(raw).await {
            Submission::Ignored => Ok(None),
            Submission::Rejected { in_flight } => Err(SymptomixError::Busy { in_flight }),
            Submission::Closed => Err(SymptomixError::Cancelled),
            Submission::Started(handle) => handle.finished().await.map(Some),
        }
    }

    /// Cancels every outstanding exchange and refuses new submissions.
    ///
    /// Cancelled exchanges still end with a `bot-error` entry.
    pub fn shutdown(&self) {
        self.inner.cancel.cancel();
    }

    pub fn is_shut_down(&self) -> bool {
        self.inner.cancel.is_cancelled()
    }

    /// Starts over: cancels outstanding exchanges, drops the backend-side
    /// history and returns a fresh controller for the same session id.
    ///
    /// If the backend reset fails or outlives the request timeout, this
    /// controller is left untouched.
    pub async fn restart(&self) -> Result<Self> {
        let inner = &self.inner;
        inner.bounded(inner.backend.reset(&inner.session.id)).await?;
        self.shutdown();
        tracing::info!(session = %inner.session.id, "conversation restarted");
        Ok(Self::new(
            SessionContext::new(inner.session.id.clone()),
            Arc::clone(&inner.backend),
            inner.options,
        ))
    }
}

impl Inner {
    /// Optimistic render: layout, user entry, placeholder.
    async fn begin(&self, message: &OutgoingMessage) -> (EntryId, EntryId) {
        let mut state = self.state.lock().await;

        if state.layout.activate() {
            self.publish(TranscriptEvent::LayoutActivated);
        }
        let user = state.transcript.push_user(message.text()).clone();
        let pending = state.transcript.push_pending().clone();
        let ids = (user.id, pending.id);

        self.publish(TranscriptEvent::EntryAppended(user));
        self.publish(TranscriptEvent::EntryAppended(pending));
        ids
    }

    /// Network call and terminal render.
    async fn complete(&self, message: OutgoingMessage, pending: EntryId) -> Result<ExchangeReport> {
        let machine = ExchangeState::Idle.send();
        let outcome = self.call_backend(&message).await;

        if let Err(err) = &outcome {
            tracing::error!(
                session = %self.session.id,
                error = %err,
                "chat exchange failed"
            );
        }

        let mut state = self.state.lock().await;
        let terminal = state.transcript.resolve_pending(pending, &outcome)?.clone();
        let report = ExchangeReport {
            state: machine.complete(&outcome),
            terminal_entry: terminal.id,
            error: outcome.err(),
        };

        self.publish(TranscriptEvent::EntryRemoved(pending));
        self.publish(TranscriptEvent::EntryAppended(terminal));
        Ok(report)
    }

    async fn call_backend(&self, message: &OutgoingMessage) -> Result<Reply> {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(SymptomixError::Cancelled),
            outcome = self.bounded(self.backend.send(message)) => outcome,
        }
    }

    /// Applies the per-request timeout to one backend call.
    async fn bounded<T, F>(&self, request: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        match self.options.request_timeout {
            Some(limit) => tokio::time::timeout(limit, request)
                .await
                .unwrap_or(Err(SymptomixError::Timeout {
                    seconds: limit.as_secs(),
                })),
            None => request.await,
        }
    }

    fn publish(&self, event: TranscriptEvent) {
        // No subscribers is fine; the transcript snapshot stays authoritative.
        let _ = self.events.send(event);
    }
}

/// Counts an exchange as in flight until dropped.
struct InFlightGuard {
    inner: Arc<Inner>,
}

impl InFlightGuard {
    /// Registers a new exchange, or returns the current count if the policy refuses it.
    fn acquire(inner: &Arc<Inner>) -> std::result::Result<Self, usize> {
        match inner.options.policy {
            InFlightPolicy::Concurrent => {
                inner.in_flight.fetch_add(1, Ordering::SeqCst);
            }
            InFlightPolicy::Reject => {
                inner
                    .in_flight
                    .compare_exchange(0, 1, Ordering::SeqCst, Ordering::SeqCst)?;
            }
        }
        Ok(Self {
            inner: Arc::clone(inner),
        })
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.inner.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}
