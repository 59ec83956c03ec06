//! Client side of the storefront cart: service seam, identity, alerts and
//! the controller that ties them to the cart screen state.

pub mod controller;
pub mod identity;
pub mod notifier;
pub mod service;

pub use controller::{
    format_price, total_price, ActionOutcome, CartController, CartViewState, OrderAttempt,
    ViewFlags,
};
pub use identity::{FixedIdentity, IdentityProvider};
pub use notifier::{Alert, Notifier, RecordingNotifier};
pub use service::{CartService, CartServiceError, HttpCartService, OrderOutcome};

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod controller_tests;
