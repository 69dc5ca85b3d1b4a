//! The match-wide payment window.

use tracing::debug;

use crate::error::{Result, RulesError};

use super::state::PaymentState;

/// Holds the one payment in progress, if any.
#[derive(Clone, Debug, Default)]
pub struct PaymentWindowManager {
    active: Option<PaymentState>,
    history: Vec<String>,
}

impl PaymentWindowManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a payment window.
    ///
    /// Fails with `PaymentInProgress` if another payment is open.
    pub fn begin_payment(&mut self, state: PaymentState) -> Result<()> {
        if let Some(active) = &self.active {
            return Err(RulesError::PaymentInProgress(active.id.clone()));
        }
        debug!(id = %state.id, controller = %state.controller, "begin payment");
        self.active = Some(state);
        Ok(())
    }

    /// Close the payment for `id` and return its final state.
    pub fn end_payment(&mut self, id: &str) -> Result<PaymentState> {
        let active = self.active.as_ref().ok_or(RulesError::NoActivePayment)?;
        if active.id != id {
            return Err(RulesError::PaymentMismatch {
                expected: active.id.clone(),
                actual: id.to_string(),
            });
        }
        let state = self.active.take().ok_or(RulesError::NoActivePayment)?;
        debug!(id = %state.id, paid = state.is_fully_paid(), "end payment");
        self.history.push(state.id.clone());
        Ok(state)
    }

    #[must_use]
    pub fn active(&self) -> Option<&PaymentState> {
        self.active.as_ref()
    }

    pub fn active_mut(&mut self) -> Option<&mut PaymentState> {
        self.active.as_mut()
    }

    #[must_use]
    pub fn is_payment_in_progress(&self) -> bool {
        self.active.is_some()
    }

    /// Ids of completed payments, oldest first.
    #[must_use]
    pub fn history(&self) -> &[String] {
        &self.history
    }

    pub fn reset(&mut self) {
        self.active = None;
        self.history.clear();
    }
}
