//! Error types for the rules core.
//!
//! Every variant is a structural misuse or a content failure local to one
//! match. Rules-legality outcomes are not errors; see
//! [`LegalityVerdict`](crate::stack::LegalityVerdict).

use thiserror::Error;

use crate::core::{EntityId, PlayerId};

#[derive(Error, Debug)]
pub enum RulesError {
    #[error("stack empty")]
    EmptyStack,

    #[error("stack item not found: {0}")]
    StackItemNotFound(String),

    #[error("maximum resolution depth ({max}) exceeded")]
    MaxResolutionDepth { max: usize },

    #[error("no item currently resolving")]
    NotResolving,

    #[error("stack item {id} failed to resolve: {source}")]
    ResolutionFailed {
        id: String,
        #[source]
        source: Box<RulesError>,
    },

    #[error("resolution mismatch: expected {expected}, got {actual}")]
    ResolutionMismatch { expected: String, actual: String },

    #[error("mana ability {0} is already activating")]
    AlreadyActivating(String),

    #[error("mana ability not found: {0}")]
    ManaAbilityNotFound(String),

    #[error("failed to activate mana ability {id}: {source}")]
    ManaAbilityFailed {
        id: String,
        #[source]
        source: Box<RulesError>,
    },

    #[error("mana abilities cannot be activated: {0}")]
    ManaAbilitiesDisabled(String),

    #[error("triggered mana abilities exceeded {limit} iterations")]
    TriggeredManaLimit { limit: usize },

    #[error("payment already in progress for {0}")]
    PaymentInProgress(String),

    #[error("no payment in progress")]
    NoActivePayment,

    #[error("payment mismatch: expected {expected}, got {actual}")]
    PaymentMismatch { expected: String, actual: String },

    #[error("priority window already open: {0}")]
    PriorityWindowOpen(String),

    #[error("no choice in progress")]
    NoChoicePending,

    #[error("invalid choice: {0}")]
    InvalidChoice(String),

    #[error("special action {action} not allowed: {reason}")]
    SpecialActionNotAllowed { action: String, reason: String },

    #[error("watcher key already registered: {0}")]
    DuplicateWatcher(String),

    #[error("watcher not found: {0}")]
    WatcherNotFound(String),

    #[error("invalid targets: {0}")]
    InvalidTargets(String),

    #[error("player {0} does not have priority")]
    NotPriorityPlayer(PlayerId),

    #[error("unknown object: {0}")]
    UnknownObject(EntityId),

    #[error("{0}")]
    Content(String),

    #[error("configuration error: {0}")]
    Config(#[from] serde_json::Error),

    #[error("match worker is closed")]
    WorkerClosed,
}

impl RulesError {
    /// Build a content failure from any displayable cause.
    pub fn content(message: impl std::fmt::Display) -> Self {
        Self::Content(message.to_string())
    }
}

pub type Result<T> = std::result::Result<T, RulesError>;
