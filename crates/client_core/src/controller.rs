//! Cart view controller: owns the screen state and drives the cart service.

use std::sync::Arc;

use shared::{
    domain::{Address, AddressField, CartItem, ProductId},
    protocol::OrderRequest,
};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::{
    identity::IdentityProvider,
    notifier::{Alert, Notifier},
    service::{CartService, OrderOutcome},
};

pub fn total_price(items: &[CartItem]) -> f64 {
    // Float `Sum` starts from -0.0, which would print as "$-0.00".
    items.iter().fold(0.0, |sum, item| sum + item.line_total())
}

pub fn format_price(amount: f64) -> String {
    format!("${amount:.2}")
}

/// Independent screen flags.
///
/// `loading` is only true until the first cart fetch settles. While it is
/// set the checkout form cannot be opened. `placing_order` is set only for the
/// duration of one `place_order` call and blocks a second submission; other
/// cart mutations stay available while an order is in flight.
/// `show_address_form` alone is the idle checkout state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewFlags {
    pub loading: bool,
    pub show_address_form: bool,
    pub placing_order: bool,
}

impl Default for ViewFlags {
    fn default() -> Self {
        Self {
            loading: true,
            show_address_form: false,
            placing_order: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CartViewState {
    pub items: Vec<CartItem>,
    pub flags: ViewFlags,
    pub address: Address,
}

impl CartViewState {
    pub fn total(&self) -> f64 {
        total_price(&self.items)
    }

    pub fn formatted_total(&self) -> String {
        format_price(self.total())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    Applied,
    Skipped,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderAttempt {
    EmptyCart,
    IncompleteAddress,
    AlreadyInFlight,
    Placed,
    Rejected { message: String },
    Failed,
}

#[derive(Debug, Clone, Copy)]
enum CartMutation {
    Remove(ProductId),
    UpdateQuantity(ProductId, u32),
    Clear,
}

impl CartMutation {
    fn name(self) -> &'static str {
        match self {
            CartMutation::Remove(_) => "remove_item",
            CartMutation::UpdateQuantity(..) => "update_quantity",
            CartMutation::Clear => "clear_cart",
        }
    }

    fn product_id(self) -> Option<i64> {
        match self {
            CartMutation::Remove(id) | CartMutation::UpdateQuantity(id, _) => Some(id.0),
            CartMutation::Clear => None,
        }
    }
}

pub struct CartController {
    service: Arc<dyn CartService>,
    identity: Arc<dyn IdentityProvider>,
    notifier: Arc<dyn Notifier>,
    state: Mutex<CartViewState>,
    // Held for the whole of a mutation plus its reload so overlapping user
    // actions apply in the order they were issued.
    mutations: Mutex<()>,
}

impl CartController {
    pub fn new(
        service: Arc<dyn CartService>,
        identity: Arc<dyn IdentityProvider>,
        notifier: Arc<dyn Notifier>,
    ) -> Arc<Self> {
        Arc::new(Self {
            service,
            identity,
            notifier,
            state: Mutex::new(CartViewState::default()),
            mutations: Mutex::new(()),
        })
    }

    pub async fn snapshot(&self) -> CartViewState {
        self.state.lock().await.clone()
    }

    pub async fn total(&self) -> f64 {
        self.state.lock().await.total()
    }

    pub async fn formatted_total(&self) -> String {
        self.state.lock().await.formatted_total()
    }

    /// Fetches the cart and replaces the local copy. On failure the previous
    /// items are kept. Either way the loading flag is cleared.
    pub async fn load_cart(&self) -> ActionOutcome {
        let user_id = self.identity.user_id();
        let result = self.service.fetch_cart(user_id).await;

        let mut state = self.state.lock().await;
        state.flags.loading = false;
        match result {
            Ok(items) => {
                debug!(user_id = user_id.0, items = items.len(), "cart loaded");
                state.items = items;
                ActionOutcome::Applied
            }
            Err(err) => {
                error!(user_id = user_id.0, error = %err, "failed to fetch cart");
                ActionOutcome::Failed
            }
        }
    }

    pub async fn remove_item(&self, product_id: ProductId) -> ActionOutcome {
        let _gate = self.mutations.lock().await;
        self.apply_mutation(CartMutation::Remove(product_id)).await
    }

    /// Quantities below one are ignored without contacting the service.
    pub async fn update_quantity(&self, product_id: ProductId, quantity: i64) -> ActionOutcome {
        if quantity < 1 {
            debug!(product_id = product_id.0, quantity, "ignoring quantity below one");
            return ActionOutcome::Skipped;
        }
        let Ok(quantity) = u32::try_from(quantity) else {
            warn!(product_id = product_id.0, quantity, "ignoring out of range quantity");
            return ActionOutcome::Skipped;
        };

        let _gate = self.mutations.lock().await;
        self.apply_mutation(CartMutation::UpdateQuantity(product_id, quantity))
            .await
    }

    pub async fn clear_cart(&self) -> ActionOutcome {
        let _gate = self.mutations.lock().await;
        self.apply_mutation(CartMutation::Clear).await
    }

    /// Reveals the address form. Does not check whether the cart is empty.
    /// Refused while the first load is pending, since no checkout control is
    /// shown on the loading screen.
    pub async fn proceed_to_checkout(&self) -> bool {
        let mut state = self.state.lock().await;
        if state.flags.loading {
            debug!("checkout requested before cart finished loading");
            return false;
        }
        state.flags.show_address_form = true;
        true
    }

    pub async fn cancel_checkout(&self) {
        self.state.lock().await.flags.show_address_form = false;
    }

    pub async fn set_address_field(&self, field: AddressField, value: impl Into<String>) {
        self.state.lock().await.address.set_field(field, value);
    }

    pub async fn place_order(&self) -> OrderAttempt {
        let user_id = self.identity.user_id();

        let order = {
            let mut state = self.state.lock().await;
            if state.flags.placing_order {
                debug!("order already in flight");
                return OrderAttempt::AlreadyInFlight;
            }
            if state.items.is_empty() {
                None
            } else if !state.address.is_complete() {
                Some(Err(state.address.missing_required_fields()))
            } else {
                state.flags.placing_order = true;
                Some(Ok(OrderRequest::from_cart(
                    user_id,
                    &state.items,
                    &state.address,
                )))
            }
        };

        let order = match order {
            None => {
                self.notifier.notify(Alert::CartEmpty);
                return OrderAttempt::EmptyCart;
            }
            Some(Err(missing)) => {
                let missing: Vec<&str> = missing.iter().map(|field| field.as_str()).collect();
                debug!(?missing, "address incomplete");
                self.notifier.notify(Alert::AddressIncomplete);
                return OrderAttempt::IncompleteAddress;
            }
            Some(Ok(order)) => order,
        };

        let attempt = match self.service.create_order(&order).await {
            Ok(OrderOutcome::Accepted { message }) => {
                info!(
                    user_id = user_id.0,
                    items = order.items.len(),
                    message = message.as_deref().unwrap_or_default(),
                    "order placed"
                );
                self.notifier.notify(Alert::OrderPlaced);
                let _gate = self.mutations.lock().await;
                self.apply_mutation(CartMutation::Clear).await;
                OrderAttempt::Placed
            }
            Ok(OrderOutcome::Rejected { status, message }) => {
                let message = message.unwrap_or_else(|| "unknown error".to_string());
                warn!(user_id = user_id.0, %status, %message, "order rejected");
                self.notifier.notify(Alert::OrderRejected {
                    message: message.clone(),
                });
                OrderAttempt::Rejected { message }
            }
            Err(err) => {
                error!(user_id = user_id.0, error = %err, "failed to place order");
                self.notifier.notify(Alert::OrderFailed);
                OrderAttempt::Failed
            }
        };

        let mut state = self.state.lock().await;
        if attempt == OrderAttempt::Placed {
            state.flags.show_address_form = false;
        }
        state.flags.placing_order = false;
        attempt
    }

    /// Issues one mutation and reloads on success. Callers hold the gate.
    async fn apply_mutation(&self, mutation: CartMutation) -> ActionOutcome {
        let user_id = self.identity.user_id();
        let result = match mutation {
            CartMutation::Remove(product_id) => {
                self.service.remove_item(user_id, product_id).await
            }
            CartMutation::UpdateQuantity(product_id, quantity) => {
                self.service
                    .update_quantity(user_id, product_id, quantity)
                    .await
            }
            CartMutation::Clear => self.service.clear_cart(user_id).await,
        };

        match result {
            Ok(()) => {
                debug!(
                    operation = mutation.name(),
                    product_id = mutation.product_id(),
                    "cart mutation applied"
                );
                self.load_cart().await;
                ActionOutcome::Applied
            }
            Err(err) => {
                error!(
                    operation = mutation.name(),
                    product_id = mutation.product_id(),
                    error = %err,
                    "cart mutation failed"
                );
                ActionOutcome::Failed
            }
        }
    }
}
