//! Cost payment and resolution-time choices.
//!
//! Only one payment window is open at a time per match. A payment walks
//! through [`PaymentStep`]s; once special payment moves it to
//! [`PaymentStep::After`], normal mana abilities stay blocked for the
//! rest of that payment.
//!
//! Choices made while a spell resolves are queued on a [`ChoiceManager`]
//! and answered one at a time.

mod choice;
mod state;
mod window;

pub use choice::{Choice, ChoiceManager, ChoiceType};
pub use state::{Cost, CostType, PaymentState, PaymentStep};
pub use window::PaymentWindowManager;
