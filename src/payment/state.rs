//! Costs and the payment state of one spell or ability.

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::core::PlayerId;

/// Where a payment is in its sequence.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStep {
    /// Special payment (convoke, delve) may happen before normal mana.
    #[default]
    Before,
    /// Normal mana abilities may be activated.
    Normal,
    /// Special payment was used; normal mana abilities are blocked.
    After,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CostType {
    Mana,
    Tap,
    Sacrifice,
    Discard,
    Life,
    Exile,
    Other,
}

/// One component of a total cost.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cost {
    pub cost_type: CostType,
    /// Mana, life or card count, where it applies.
    pub amount: u32,
    pub description: String,
    pub paid: bool,
}

impl Cost {
    pub fn new(cost_type: CostType, amount: u32, description: impl Into<String>) -> Self {
        Self {
            cost_type,
            amount,
            description: description.into(),
            paid: false,
        }
    }

    pub fn mana(amount: u32, description: impl Into<String>) -> Self {
        Self::new(CostType::Mana, amount, description)
    }

    pub fn tap() -> Self {
        Self::new(CostType::Tap, 0, "{T}")
    }
}

/// Payment progress for one spell or ability.
///
/// The state starts in [`PaymentStep::Before`] with mana abilities
/// allowed and `mana_remaining` set to the sum of its mana costs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentState {
    pub id: String,
    pub controller: PlayerId,
    costs: Vec<Cost>,
    step: PaymentStep,
    allow_mana_abilities: bool,
    allow_special_actions: bool,
    paid_types: FxHashSet<CostType>,
    total_mana_paid: u32,
    mana_remaining: u32,
}

impl PaymentState {
    pub fn new(id: impl Into<String>, controller: impl Into<PlayerId>, costs: Vec<Cost>) -> Self {
        let mana_remaining = costs
            .iter()
            .filter(|c| c.cost_type == CostType::Mana && !c.paid)
            .map(|c| c.amount)
            .sum();
        Self {
            id: id.into(),
            controller: controller.into(),
            costs,
            step: PaymentStep::Before,
            allow_mana_abilities: true,
            allow_special_actions: true,
            paid_types: FxHashSet::default(),
            total_mana_paid: 0,
            mana_remaining,
        }
    }

    #[must_use]
    pub fn step(&self) -> PaymentStep {
        self.step
    }

    /// Move to `step`. Entering `After` blocks normal mana abilities for
    /// the rest of this payment, even if the step later changes again.
    pub fn set_step(&mut self, step: PaymentStep) {
        self.step = step;
        if step == PaymentStep::After {
            self.allow_mana_abilities = false;
        }
    }

    #[must_use]
    pub fn can_activate_mana_abilities(&self) -> bool {
        self.allow_mana_abilities
    }

    #[must_use]
    pub fn can_take_special_actions(&self) -> bool {
        self.allow_special_actions
    }

    pub fn set_allow_special_actions(&mut self, allowed: bool) {
        self.allow_special_actions = allowed;
    }

    /// Mark the cost at `index` paid. Returns false if there is none.
    pub fn mark_cost_paid(&mut self, index: usize) -> bool {
        let Some(cost) = self.costs.get_mut(index) else {
            return false;
        };
        cost.paid = true;
        self.paid_types.insert(cost.cost_type);
        true
    }

    /// Mark every cost of `cost_type` paid.
    pub fn mark_type_paid(&mut self, cost_type: CostType) {
        for cost in self.costs.iter_mut().filter(|c| c.cost_type == cost_type) {
            cost.paid = true;
        }
        self.paid_types.insert(cost_type);
    }

    #[must_use]
    pub fn is_cost_paid(&self, cost_type: CostType) -> bool {
        self.paid_types.contains(&cost_type)
    }

    /// Record `amount` mana paid.
    ///
    /// Once nothing remains, the mana costs count as paid. Overpayment is
    /// recorded in the total but never drives the remainder below zero.
    pub fn pay_mana(&mut self, amount: u32) {
        self.total_mana_paid = self.total_mana_paid.saturating_add(amount);
        self.mana_remaining = self.mana_remaining.saturating_sub(amount);
        if self.mana_remaining == 0 && self.costs.iter().any(|c| c.cost_type == CostType::Mana) {
            self.mark_type_paid(CostType::Mana);
        }
    }

    pub fn set_mana_remaining(&mut self, amount: u32) {
        self.mana_remaining = amount;
    }

    #[must_use]
    pub fn mana_remaining(&self) -> u32 {
        self.mana_remaining
    }

    #[must_use]
    pub fn total_mana_paid(&self) -> u32 {
        self.total_mana_paid
    }

    #[must_use]
    pub fn costs(&self) -> &[Cost] {
        &self.costs
    }

    /// Every cost is marked paid and no mana remains.
    #[must_use]
    pub fn is_fully_paid(&self) -> bool {
        self.costs.iter().all(|c| c.paid) && self.mana_remaining == 0
    }
}
