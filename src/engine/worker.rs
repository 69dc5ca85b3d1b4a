//! Async front end for a match.
//!
//! A [`MatchWorker`] owns one [`MatchEngine`] and applies [`Intent`]s from
//! an mpsc channel one at a time, so every rules operation on the match is
//! serialized. After each intent the worker publishes a fresh
//! [`MatchView`] on a watch channel. Clients talk to the worker through a
//! cloneable [`MatchHandle`].

use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::core::PlayerId;
use crate::error::{Result, RulesError};
use crate::events::Event;
use crate::priority::SpecialAction;
use crate::stack::StackItem;
use crate::turn::TurnState;

use super::match_engine::{MatchEngine, MatchView, PriorityOutcome};

/// Default intent queue depth.
pub const DEFAULT_QUEUE_CAPACITY: usize = 64;

type Reply<T> = oneshot::Sender<Result<T>>;

/// A request to change or read the match.
pub enum Intent {
    Pass { player: PlayerId, reply: Option<Reply<PriorityOutcome>> },
    Push { item: StackItem, reply: Option<Reply<()>> },
    ActivateMana { player: PlayerId, ability_id: String, reply: Option<Reply<()>> },
    SpecialAction { action: SpecialAction, reply: Option<Reply<()>> },
    Publish { event: Event, reply: Option<Reply<Event>> },
    AdvanceStep { reply: Option<Reply<TurnState>> },
    Snapshot { reply: oneshot::Sender<MatchView> },
}

impl std::fmt::Debug for Intent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Intent::Pass { player, .. } => write!(f, "Pass({player})"),
            Intent::Push { item, .. } => write!(f, "Push({})", item.id),
            Intent::ActivateMana { ability_id, .. } => write!(f, "ActivateMana({ability_id})"),
            Intent::SpecialAction { action, .. } => write!(f, "SpecialAction({})", action.action_type),
            Intent::Publish { event, .. } => write!(f, "Publish({})", event.event_type),
            Intent::AdvanceStep { .. } => f.write_str("AdvanceStep"),
            Intent::Snapshot { .. } => f.write_str("Snapshot"),
        }
    }
}

fn send_reply<T>(reply: Option<Reply<T>>, result: Result<T>) {
    match reply {
        Some(tx) => {
            // The client may have stopped waiting.
            let _ = tx.send(result);
        }
        None => {
            if let Err(err) = result {
                warn!(error = %err, "intent failed with no one waiting");
            }
        }
    }
}

/// Owns a match engine and drains its intent queue.
pub struct MatchWorker {
    engine: MatchEngine,
    intents: mpsc::Receiver<Intent>,
    views: watch::Sender<MatchView>,
}

impl MatchWorker {
    /// Wrap `engine` and return the worker with a handle to it.
    pub fn new(engine: MatchEngine, capacity: usize) -> (Self, MatchHandle) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let (views_tx, views_rx) = watch::channel(engine.view());
        let worker = Self {
            engine,
            intents: rx,
            views: views_tx,
        };
        let handle = MatchHandle { tx, views: views_rx };
        (worker, handle)
    }

    /// Start a worker on the current tokio runtime.
    ///
    /// The join handle yields the engine once every handle is dropped.
    pub fn spawn(engine: MatchEngine) -> (MatchHandle, JoinHandle<MatchEngine>) {
        let (worker, handle) = Self::new(engine, DEFAULT_QUEUE_CAPACITY);
        (handle, tokio::spawn(worker.run()))
    }

    /// Apply intents until every sender is gone, then hand the engine back.
    pub async fn run(mut self) -> MatchEngine {
        info!("match worker started");
        while let Some(intent) = self.intents.recv().await {
            debug!(intent = ?intent, "apply intent");
            self.apply(intent);
        }
        info!("match worker stopped");
        self.engine
    }

    fn apply(&mut self, intent: Intent) {
        match intent {
            Intent::Pass { player, reply } => {
                let result = self.engine.pass_priority(&player);
                self.finish(reply, result);
            }
            Intent::Push { item, reply } => {
                self.engine.push(item);
                self.finish(reply, Ok(()));
            }
            Intent::ActivateMana {
                player,
                ability_id,
                reply,
            } => {
                let result = self.engine.activate_mana_ability(&player, &ability_id);
                self.finish(reply, result);
            }
            Intent::SpecialAction { action, reply } => {
                let result = self.engine.take_special_action(&action);
                self.finish(reply, result);
            }
            Intent::Publish { event, reply } => {
                let event = self.engine.publish(event);
                self.finish(reply, Ok(event));
            }
            Intent::AdvanceStep { reply } => {
                let state = self.engine.advance_step();
                self.finish(reply, Ok(state));
            }
            Intent::Snapshot { reply } => {
                let _ = reply.send(self.engine.view());
            }
        }
    }

    /// Publish the new view, then answer the client.
    fn finish<T>(&self, reply: Option<Reply<T>>, result: Result<T>) {
        self.views.send_replace(self.engine.view());
        send_reply(reply, result);
    }
}

/// Client side of a running match.
#[derive(Clone, Debug)]
pub struct MatchHandle {
    tx: mpsc::Sender<Intent>,
    views: watch::Receiver<MatchView>,
}

impl MatchHandle {
    async fn request<T>(&self, build: impl FnOnce(Option<Reply<T>>) -> Intent) -> Result<T> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(build(Some(reply)))
            .await
            .map_err(|_| RulesError::WorkerClosed)?;
        rx.await.map_err(|_| RulesError::WorkerClosed)?
    }

    /// Queue an intent without waiting for its result.
    pub async fn submit(&self, intent: Intent) -> Result<()> {
        self.tx.send(intent).await.map_err(|_| RulesError::WorkerClosed)
    }

    pub async fn pass_priority(&self, player: impl Into<PlayerId>) -> Result<PriorityOutcome> {
        let player = player.into();
        self.request(|reply| Intent::Pass { player, reply }).await
    }

    pub async fn push(&self, item: StackItem) -> Result<()> {
        self.request(|reply| Intent::Push { item, reply }).await
    }

    pub async fn activate_mana(&self, player: impl Into<PlayerId>, ability_id: impl Into<String>) -> Result<()> {
        let player = player.into();
        let ability_id = ability_id.into();
        self.request(|reply| Intent::ActivateMana {
            player,
            ability_id,
            reply,
        })
        .await
    }

    pub async fn take_special_action(&self, action: SpecialAction) -> Result<()> {
        self.request(|reply| Intent::SpecialAction { action, reply }).await
    }

    pub async fn publish(&self, event: Event) -> Result<Event> {
        self.request(|reply| Intent::Publish { event, reply }).await
    }

    pub async fn advance_step(&self) -> Result<TurnState> {
        self.request(|reply| Intent::AdvanceStep { reply }).await
    }

    /// A view taken after every intent queued before this call.
    pub async fn view(&self) -> Result<MatchView> {
        let (reply, rx) = oneshot::channel();
        self.submit(Intent::Snapshot { reply }).await?;
        rx.await.map_err(|_| RulesError::WorkerClosed)
    }

    /// The most recently published view, without queueing.
    #[must_use]
    pub fn snapshot(&self) -> MatchView {
        self.views.borrow().clone()
    }

    /// Receiver that is notified whenever the view changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<MatchView> {
        self.views.clone()
    }
}
