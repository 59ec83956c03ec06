use super::*;
use std::sync::Arc;

use async_trait::async_trait;
use shared::{
    domain::{AddressField, CartItem, ProductId, UserId},
    protocol::OrderRequest,
};
use tokio::sync::{Mutex, Notify};

#[derive(Clone, Copy)]
enum OrderBehavior {
    Accept,
    TransportFailure,
    HoldUntilReleased,
}

struct ScriptedCartService {
    items: Mutex<Vec<CartItem>>,
    fail_fetches_after: Mutex<Option<usize>>,
    fetches: Mutex<usize>,
    order_behavior: OrderBehavior,
    orders: Mutex<Vec<OrderRequest>>,
    order_received: Notify,
    release_order: Notify,
}

impl ScriptedCartService {
    fn new(items: Vec<CartItem>, order_behavior: OrderBehavior) -> Self {
        Self {
            items: Mutex::new(items),
            fail_fetches_after: Mutex::new(None),
            fetches: Mutex::new(0),
            order_behavior,
            orders: Mutex::new(Vec::new()),
            order_received: Notify::new(),
            release_order: Notify::new(),
        }
    }
}

/// A genuine reqwest connection error from a port nobody listens on.
async fn connection_refused() -> CartServiceError {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    match reqwest::Client::new()
        .get(format!("http://{addr}/"))
        .send()
        .await
    {
        Err(err) => CartServiceError::Transport(err),
        Ok(response) => panic!("closed port answered with {}", response.status()),
    }
}

#[async_trait]
impl CartService for ScriptedCartService {
    async fn fetch_cart(&self, _user_id: UserId) -> Result<Vec<CartItem>, CartServiceError> {
        let mut fetches = self.fetches.lock().await;
        *fetches += 1;
        if let Some(limit) = *self.fail_fetches_after.lock().await {
            if *fetches > limit {
                return Err(connection_refused().await);
            }
        }
        Ok(self.items.lock().await.clone())
    }

    async fn remove_item(
        &self,
        _user_id: UserId,
        product_id: ProductId,
    ) -> Result<(), CartServiceError> {
        self.items
            .lock()
            .await
            .retain(|item| item.product_id != product_id);
        Ok(())
    }

    async fn update_quantity(
        &self,
        _user_id: UserId,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<(), CartServiceError> {
        for item in self.items.lock().await.iter_mut() {
            if item.product_id == product_id {
                item.quantity = quantity;
            }
        }
        Ok(())
    }

    async fn clear_cart(&self, _user_id: UserId) -> Result<(), CartServiceError> {
        self.items.lock().await.clear();
        Ok(())
    }

    async fn create_order(&self, order: &OrderRequest) -> Result<OrderOutcome, CartServiceError> {
        self.orders.lock().await.push(order.clone());
        match self.order_behavior {
            OrderBehavior::Accept => Ok(OrderOutcome::Accepted { message: None }),
            OrderBehavior::TransportFailure => Err(connection_refused().await),
            OrderBehavior::HoldUntilReleased => {
                self.order_received.notify_one();
                self.release_order.notified().await;
                Ok(OrderOutcome::Accepted { message: None })
            }
        }
    }
}

fn item(id: i64, price: f64, quantity: u32) -> CartItem {
    CartItem {
        product_id: ProductId(id),
        product_name: format!("product-{id}"),
        product_price: price,
        quantity,
        product_images: Vec::new(),
    }
}

fn scripted_controller(
    service: Arc<ScriptedCartService>,
) -> (Arc<CartController>, Arc<RecordingNotifier>) {
    let notifier = Arc::new(RecordingNotifier::default());
    let controller = CartController::new(
        service,
        Arc::new(FixedIdentity(UserId(5))),
        notifier.clone(),
    );
    (controller, notifier)
}

async fn ready_for_order(controller: &CartController) {
    controller.load_cart().await;
    controller.proceed_to_checkout().await;
    for (field, value) in [
        (AddressField::Name, "Ravi"),
        (AddressField::Street, "Park Street"),
        (AddressField::City, "Kolkata"),
        (AddressField::Mobile, "9000000001"),
    ] {
        controller.set_address_field(field, value).await;
    }
}

#[tokio::test]
async fn transport_failure_on_order_shows_generic_alert() {
    let service = Arc::new(ScriptedCartService::new(
        vec![item(1, 2.5, 4)],
        OrderBehavior::TransportFailure,
    ));
    let (controller, notifier) = scripted_controller(service.clone());
    ready_for_order(&controller).await;

    assert_eq!(controller.place_order().await, OrderAttempt::Failed);
    assert_eq!(notifier.alerts(), vec![Alert::OrderFailed]);

    let snapshot = controller.snapshot().await;
    assert!(!snapshot.flags.placing_order);
    assert!(snapshot.flags.show_address_form);
    assert_eq!(snapshot.items.len(), 1);
    assert_eq!(service.orders.lock().await.len(), 1);
}

#[tokio::test]
async fn refused_connection_surfaces_as_transport_error() {
    assert!(matches!(
        connection_refused().await,
        CartServiceError::Transport(_)
    ));
}

#[tokio::test]
async fn order_uses_identity_and_current_cart_snapshot() {
    let service = Arc::new(ScriptedCartService::new(
        vec![item(1, 2.5, 4), item(9, 1.25, 2)],
        OrderBehavior::Accept,
    ));
    let (controller, _notifier) = scripted_controller(service.clone());
    ready_for_order(&controller).await;
    controller.update_quantity(ProductId(9), 3).await;

    assert_eq!(controller.place_order().await, OrderAttempt::Placed);

    let orders = service.orders.lock().await;
    assert_eq!(orders[0].user_id, UserId(5));
    let quantities: Vec<(i64, u32)> = orders[0]
        .items
        .iter()
        .map(|line| (line.product_id.0, line.quantity))
        .collect();
    assert_eq!(quantities, vec![(1, 4), (9, 3)]);
    assert_eq!(orders[0].address.city, "Kolkata");
}

#[tokio::test]
async fn second_order_while_in_flight_is_ignored() {
    let service = Arc::new(ScriptedCartService::new(
        vec![item(1, 10.0, 1)],
        OrderBehavior::HoldUntilReleased,
    ));
    let (controller, notifier) = scripted_controller(service.clone());
    ready_for_order(&controller).await;

    let first = tokio::spawn({
        let controller = controller.clone();
        async move { controller.place_order().await }
    });
    service.order_received.notified().await;

    assert!(controller.snapshot().await.flags.placing_order);
    assert_eq!(
        controller.place_order().await,
        OrderAttempt::AlreadyInFlight
    );

    service.release_order.notify_one();
    assert_eq!(first.await.expect("join"), OrderAttempt::Placed);

    let snapshot = controller.snapshot().await;
    assert!(!snapshot.flags.placing_order);
    assert!(!snapshot.flags.show_address_form);
    assert!(snapshot.items.is_empty());
    assert_eq!(notifier.alerts(), vec![Alert::OrderPlaced]);
    assert_eq!(service.orders.lock().await.len(), 1);
}

#[tokio::test]
async fn failed_reload_after_mutation_keeps_previous_items() {
    let service = Arc::new(ScriptedCartService::new(
        vec![item(1, 3.0, 1), item(2, 4.0, 2)],
        OrderBehavior::Accept,
    ));
    *service.fail_fetches_after.lock().await = Some(1);
    let (controller, _notifier) = scripted_controller(service.clone());
    controller.load_cart().await;

    assert_eq!(
        controller.remove_item(ProductId(1)).await,
        ActionOutcome::Applied
    );

    let snapshot = controller.snapshot().await;
    assert_eq!(snapshot.items.len(), 2);
    assert_eq!(controller.formatted_total().await, "$11.00");
}

#[tokio::test]
async fn checkout_waits_for_first_load() {
    let service = Arc::new(ScriptedCartService::new(Vec::new(), OrderBehavior::Accept));
    let (controller, _notifier) = scripted_controller(service);

    assert!(!controller.proceed_to_checkout().await);
    assert!(!controller.snapshot().await.flags.show_address_form);

    controller.load_cart().await;
    assert!(
        controller.proceed_to_checkout().await,
        "checkout opens even for an empty cart"
    );
    assert!(controller.snapshot().await.flags.show_address_form);
}

#[tokio::test]
async fn cancel_checkout_hides_form_but_keeps_address() {
    let service = Arc::new(ScriptedCartService::new(
        vec![item(1, 1.0, 1)],
        OrderBehavior::Accept,
    ));
    let (controller, _notifier) = scripted_controller(service);
    ready_for_order(&controller).await;

    controller.cancel_checkout().await;

    let snapshot = controller.snapshot().await;
    assert!(!snapshot.flags.show_address_form);
    assert_eq!(snapshot.address.name, "Ravi");
}

#[tokio::test]
async fn optional_address_fields_do_not_block_order() {
    let service = Arc::new(ScriptedCartService::new(
        vec![item(1, 1.0, 1)],
        OrderBehavior::Accept,
    ));
    let (controller, notifier) = scripted_controller(service.clone());
    ready_for_order(&controller).await;
    controller.set_address_field(AddressField::Flat, "").await;
    controller.set_address_field(AddressField::State, "").await;

    assert_eq!(controller.place_order().await, OrderAttempt::Placed);
    assert_eq!(notifier.take(), vec![Alert::OrderPlaced]);
    assert!(notifier.alerts().is_empty());
}

#[tokio::test]
async fn cart_edits_proceed_while_order_is_in_flight() {
    let service = Arc::new(ScriptedCartService::new(
        vec![item(1, 10.0, 1), item(2, 4.0, 1)],
        OrderBehavior::HoldUntilReleased,
    ));
    let (controller, _notifier) = scripted_controller(service.clone());
    ready_for_order(&controller).await;

    let order = tokio::spawn({
        let controller = controller.clone();
        async move { controller.place_order().await }
    });
    service.order_received.notified().await;

    assert_eq!(
        controller.remove_item(ProductId(2)).await,
        ActionOutcome::Applied
    );
    assert_eq!(
        controller.update_quantity(ProductId(1), 2).await,
        ActionOutcome::Applied
    );
    assert!(controller.snapshot().await.flags.placing_order);

    service.release_order.notify_one();
    assert_eq!(order.await.expect("join"), OrderAttempt::Placed);
    assert!(controller.snapshot().await.items.is_empty());
}
