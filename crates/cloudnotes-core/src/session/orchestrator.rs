//! Session orchestrator: owns the UI loop, the long-lived auth pipelines,
//! and the fire-and-forget backend operations.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::auth::AuthEvent;
use crate::backend::{AccessLevel, BackendClient, SignInRequest};
use crate::config::OrchestratorConfig;
use crate::models::{Note, NoteId};
use crate::{Error, Result};

use super::model::UiModel;
use super::reconciler::{Action, ListReason, Message, Reconciler, SignalSource};
use super::subscription::{CancelToken, Subscription};

type Callback = Box<dyn FnOnce() + Send>;

/// Work delivered to the UI loop. Each item carries the token of the
/// subscription that produced it and is skipped once that is cancelled.
enum Command {
    /// Live auth signal; the token stays pending for the stream's lifetime.
    Event(Message, CancelToken),
    /// One-shot request completion, applied only if it claims the token.
    Apply(Message, CancelToken),
    Deliver(Callback, CancelToken),
    Flush(oneshot::Sender<()>),
    Shutdown,
}

/// What a successful request hands to the UI loop.
enum Completion {
    Apply(Message),
    Deliver(Callback),
}

/// Issues backend requests and routes their completions to the UI loop.
#[derive(Clone)]
struct Dispatcher {
    backend: BackendClient,
    commands: mpsc::Sender<Command>,
    /// Session epoch as last published by the UI loop.
    epoch: Arc<AtomicU64>,
}

impl Dispatcher {
    fn current_epoch(&self) -> u64 {
        self.epoch.load(Ordering::Acquire)
    }

    fn request<T, Fut, F>(
        &self,
        operation: &'static str,
        request: Fut,
        on_success: F,
        on_failure: Option<Message>,
    ) -> Subscription
    where
        T: Send + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
        F: FnOnce(T) -> Option<Completion> + Send + 'static,
    {
        let commands = self.commands.clone();
        Subscription::spawn(move |token| async move {
            let outcome = request.await;
            if token.is_cancelled() {
                debug!(operation, "Completion suppressed after cancel");
                return;
            }

            let command = match outcome {
                Ok(value) => {
                    info!(operation, "Request succeeded");
                    match on_success(value) {
                        Some(Completion::Apply(message)) => Command::Apply(message, token),
                        Some(Completion::Deliver(callback)) => Command::Deliver(callback, token),
                        None => {
                            token.complete();
                            return;
                        }
                    }
                }
                Err(error) => {
                    error!(operation, %error, "Request failed");
                    match on_failure {
                        Some(message) => Command::Apply(message, token),
                        None => {
                            token.complete();
                            return;
                        }
                    }
                }
            };

            if commands.send(command).await.is_err() {
                debug!(operation, "UI loop stopped, dropping completion");
            }
        })
    }

    fn list_notes(&self, reason: ListReason) -> Subscription {
        let backend = self.backend.clone();
        let on_failure = match reason {
            ListReason::SignedIn { epoch } => Some(Message::NotesListFailed { epoch }),
            ListReason::Requested { .. } => None,
        };
        self.request(
            "list_notes",
            async move { backend.data().list_notes().await },
            move |records| {
                let notes = records.into_iter().map(Note::from).collect::<Vec<_>>();
                info!(count = notes.len(), "Listed notes");
                Some(Completion::Apply(Message::NotesListed { reason, notes }))
            },
            on_failure,
        )
    }

    fn fetch_session(&self) -> Subscription {
        let backend = self.backend.clone();
        self.request(
            "fetch_session",
            async move { backend.auth().fetch_session().await },
            |status| {
                info!(is_signed_in = status.is_signed_in, "Fetched current session");
                Some(Completion::Apply(Message::SignInChanged {
                    is_signed_in: status.is_signed_in,
                    source: SignalSource::InitialFetch,
                }))
            },
            None,
        )
    }

    fn watch_auth_events(&self, mut events: broadcast::Receiver<AuthEvent>) -> Subscription {
        let commands = self.commands.clone();
        Subscription::spawn(move |token| async move {
            loop {
                match events.recv().await {
                    Ok(event) => {
                        let Some(message) = Message::from_auth_event(&event) else {
                            debug!(%event, "Ignoring auth event without sign-in status");
                            continue;
                        };
                        if token.is_cancelled() {
                            break;
                        }
                        info!(%event, "Auth event received");
                        if commands
                            .send(Command::Event(message, token.clone()))
                            .await
                            .is_err()
                        {
                            debug!("UI loop stopped, ending auth event pipeline");
                            break;
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "Auth event stream lagged, events were dropped");
                    }
                    Err(RecvError::Closed) => {
                        // No resubscription: live sign-in updates end here.
                        error!(error = %Error::StreamTerminated, "Auth event stream ended");
                        break;
                    }
                }
            }
        })
    }
}

/// Single task owning the UI model. Every mutation funnels through here.
struct UiLoop {
    reconciler: Reconciler,
    commands: mpsc::Receiver<Command>,
    model: watch::Sender<UiModel>,
    dispatcher: Dispatcher,
}

impl UiLoop {
    async fn run(mut self) {
        while let Some(command) = self.commands.recv().await {
            match command {
                Command::Event(message, token) => {
                    if token.is_cancelled() {
                        debug!(?message, "Skipping event from released pipeline");
                        continue;
                    }
                    self.apply(message);
                }
                Command::Apply(message, token) => {
                    if !token.complete() {
                        debug!(?message, "Skipping completion of cancelled request");
                        continue;
                    }
                    self.apply(message);
                }
                Command::Deliver(callback, token) => {
                    if !token.complete() {
                        debug!("Skipping callback of cancelled request");
                        continue;
                    }
                    callback();
                }
                Command::Flush(done) => {
                    let _ = done.send(());
                }
                Command::Shutdown => break,
            }
        }
        info!("UI loop stopped");
    }

    fn apply(&mut self, message: Message) {
        let action = self.reconciler.apply(message);
        self.dispatcher
            .epoch
            .store(self.reconciler.epoch(), Ordering::Release);
        let next = self.reconciler.model();
        self.model.send_if_modified(|current| {
            if current == next {
                false
            } else {
                current.clone_from(next);
                true
            }
        });

        if let Some(Action::ListNotes { epoch }) = action {
            info!(epoch, "Signed in with no notes loaded, listing notes");
            // Detached: the load completes through the UI loop like any request.
            let _load = self.dispatcher.list_notes(ListReason::SignedIn { epoch });
        }
    }
}

/// Façade binding the UI to the backend.
///
/// Construct once at startup with [`SessionOrchestrator::start`]; observe
/// state through [`SessionOrchestrator::model`]. All operations are
/// fire-and-forget: outcomes show up as model changes and log output.
pub struct SessionOrchestrator {
    dispatcher: Dispatcher,
    model: watch::Receiver<UiModel>,
    ui_loop: JoinHandle<()>,
    lifetime: Vec<Subscription>,
}

impl SessionOrchestrator {
    /// Spawn the UI loop and the two auth pipelines (initial session fetch
    /// and live event stream).
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(backend: BackendClient, config: OrchestratorConfig) -> Self {
        let (command_tx, command_rx) = mpsc::channel(config.channel_capacity.max(1));
        let (model_tx, model_rx) = watch::channel(UiModel::default());
        let dispatcher = Dispatcher {
            backend,
            commands: command_tx,
            epoch: Arc::default(),
        };

        let ui_loop = tokio::spawn(
            UiLoop {
                reconciler: Reconciler::new(),
                commands: command_rx,
                model: model_tx,
                dispatcher: dispatcher.clone(),
            }
            .run(),
        );

        // Subscribe before fetching so no event between the two is missed.
        let events = dispatcher.backend.auth().events();
        let lifetime = vec![
            dispatcher.watch_auth_events(events),
            dispatcher.fetch_session(),
        ];
        info!("Session orchestrator started");

        Self {
            dispatcher,
            model: model_rx,
            ui_loop,
            lifetime,
        }
    }

    /// Receiver that observes every published model change.
    pub fn model(&self) -> watch::Receiver<UiModel> {
        self.model.clone()
    }

    pub fn snapshot(&self) -> UiModel {
        self.model.borrow().clone()
    }

    /// Start the provider's sign-in flow. Sign-in status changes only
    /// through the resulting auth event.
    pub fn sign_in(&self, request: SignInRequest) -> Subscription {
        let backend = self.dispatcher.backend.clone();
        let email = request.email.clone();
        self.dispatcher.request(
            "sign_in",
            async move { backend.auth().sign_in(request).await },
            move |()| {
                info!(%email, "Sign in completed");
                None
            },
            None,
        )
    }

    pub fn sign_out(&self) -> Subscription {
        let backend = self.dispatcher.backend.clone();
        self.dispatcher.request(
            "sign_out",
            async move { backend.auth().sign_out().await },
            |()| None,
            None,
        )
    }

    /// Fetch all notes and append them to the model. The result is dropped
    /// if the session ends before it arrives.
    pub fn list_notes(&self) -> Subscription {
        let epoch = self.dispatcher.current_epoch();
        self.dispatcher.list_notes(ListReason::Requested { epoch })
    }

    pub fn create_note(&self, note: Note) -> Subscription {
        let backend = self.dispatcher.backend.clone();
        let epoch = self.dispatcher.current_epoch();
        let record = note.to_record();
        self.dispatcher.request(
            "create_note",
            async move { backend.data().create_note(record).await },
            move |created| {
                let note = Note::from(created);
                info!(note_id = %note.id, "Created note");
                Some(Completion::Apply(Message::NoteCreated { note, epoch }))
            },
            None,
        )
    }

    pub fn delete_note(&self, id: &NoteId) -> Subscription {
        let backend = self.dispatcher.backend.clone();
        let id = id.clone();
        self.dispatcher.request(
            "delete_note",
            async move { backend.data().delete_note(&id).await },
            |deleted| {
                let id = NoteId::from(deleted.id);
                info!(note_id = %id, "Deleted note");
                Some(Completion::Apply(Message::NoteDeleted(id)))
            },
            None,
        )
    }

    pub fn store_image(&self, key: &str, bytes: Vec<u8>, access: AccessLevel) -> Subscription {
        let backend = self.dispatcher.backend.clone();
        let key = key.to_string();
        let size = bytes.len();
        self.dispatcher.request(
            "store_image",
            {
                let key = key.clone();
                async move { backend.storage().upload(&key, bytes, access).await }
            },
            move |()| {
                info!(%key, size, ?access, "Stored image");
                None
            },
            None,
        )
    }

    /// Download an image. `on_complete` runs once on the UI loop with the
    /// bytes on success; it never runs on failure or after cancellation.
    pub fn retrieve_image<F>(&self, key: &str, access: AccessLevel, on_complete: F) -> Subscription
    where
        F: FnOnce(Vec<u8>) + Send + 'static,
    {
        let backend = self.dispatcher.backend.clone();
        let key = key.to_string();
        self.dispatcher.request(
            "retrieve_image",
            {
                let key = key.clone();
                async move { backend.storage().download(&key, access).await }
            },
            move |bytes| {
                info!(%key, size = bytes.len(), ?access, "Retrieved image");
                Some(Completion::Deliver(Box::new(move || on_complete(bytes))))
            },
            None,
        )
    }

    pub fn delete_image(&self, key: &str, access: AccessLevel) -> Subscription {
        let backend = self.dispatcher.backend.clone();
        let key = key.to_string();
        self.dispatcher.request(
            "delete_image",
            {
                let key = key.clone();
                async move { backend.storage().remove(&key, access).await }
            },
            move |()| {
                info!(%key, ?access, "Deleted image");
                None
            },
            None,
        )
    }

    /// Wait until every completion queued so far has been applied.
    pub async fn flush(&self) {
        let (done_tx, done_rx) = oneshot::channel();
        if self
            .dispatcher
            .commands
            .send(Command::Flush(done_tx))
            .await
            .is_ok()
        {
            let _ = done_rx.await;
        }
    }

    /// Release the auth pipelines and stop the UI loop.
    pub async fn shutdown(self) {
        for subscription in &self.lifetime {
            subscription.cancel();
        }
        if self
            .dispatcher
            .commands
            .send(Command::Shutdown)
            .await
            .is_err()
        {
            warn!("UI loop already stopped");
        }
        if let Err(error) = self.ui_loop.await {
            error!("UI loop task failed: {}", error);
        }
        info!("Session orchestrator shut down");
    }
}
