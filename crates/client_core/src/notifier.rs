//! User-facing alerts raised by the cart controller.

use std::{fmt, sync::Mutex};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Alert {
    CartEmpty,
    AddressIncomplete,
    OrderPlaced,
    OrderRejected { message: String },
    OrderFailed,
}

impl fmt::Display for Alert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Alert::CartEmpty => f.write_str("Cart is empty!"),
            Alert::AddressIncomplete => f.write_str("Please fill all address fields"),
            Alert::OrderPlaced => f.write_str("Order placed successfully ✅"),
            Alert::OrderRejected { message } => write!(f, "Failed to place order: {message}"),
            Alert::OrderFailed => f.write_str("Error placing order ❌"),
        }
    }
}

pub trait Notifier: Send + Sync {
    fn notify(&self, alert: Alert);
}

/// Keeps every alert in memory for later inspection.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    alerts: Mutex<Vec<Alert>>,
}

impl RecordingNotifier {
    pub fn alerts(&self) -> Vec<Alert> {
        match self.alerts.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn take(&self) -> Vec<Alert> {
        match self.alerts.lock() {
            Ok(mut guard) => std::mem::take(&mut *guard),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, alert: Alert) {
        match self.alerts.lock() {
            Ok(mut guard) => guard.push(alert),
            Err(poisoned) => poisoned.into_inner().push(alert),
        }
    }
}
