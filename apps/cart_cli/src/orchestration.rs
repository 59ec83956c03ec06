//! Maps prompt commands onto controller operations.

use client_core::{ActionOutcome, CartController};

use crate::commands::{CartCommand, HELP};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Redraw,
    Message,
    Quit,
}

pub async fn dispatch(controller: &CartController, cmd: CartCommand) -> Flow {
    let cmd_name = match &cmd {
        CartCommand::Show => "show",
        CartCommand::Remove(_) => "remove_item",
        CartCommand::SetQuantity { .. } => "update_quantity",
        CartCommand::Clear => "clear_cart",
        CartCommand::Checkout => "proceed_to_checkout",
        CartCommand::Cancel => "cancel_checkout",
        CartCommand::Address { .. } => "set_address_field",
        CartCommand::Place => "place_order",
        CartCommand::Help => "help",
        CartCommand::Quit => "quit",
    };
    tracing::debug!(command = cmd_name, "dispatching cart command");

    match cmd {
        CartCommand::Show => Flow::Redraw,
        CartCommand::Remove(product_id) => {
            log_outcome(cmd_name, controller.remove_item(product_id).await);
            Flow::Redraw
        }
        CartCommand::SetQuantity {
            product_id,
            quantity,
        } => {
            log_outcome(
                cmd_name,
                controller.update_quantity(product_id, quantity).await,
            );
            Flow::Redraw
        }
        CartCommand::Clear => {
            log_outcome(cmd_name, controller.clear_cart().await);
            Flow::Redraw
        }
        CartCommand::Checkout => {
            controller.proceed_to_checkout().await;
            Flow::Redraw
        }
        CartCommand::Cancel => {
            controller.cancel_checkout().await;
            Flow::Redraw
        }
        CartCommand::Address { field, value } => {
            controller.set_address_field(field, value).await;
            Flow::Redraw
        }
        CartCommand::Place => {
            let attempt = controller.place_order().await;
            tracing::debug!(?attempt, "order attempt finished");
            Flow::Redraw
        }
        CartCommand::Help => {
            println!("{HELP}");
            Flow::Message
        }
        CartCommand::Quit => Flow::Quit,
    }
}

fn log_outcome(cmd_name: &str, outcome: ActionOutcome) {
    if outcome == ActionOutcome::Skipped {
        tracing::info!(command = cmd_name, "nothing to do");
    }
}
