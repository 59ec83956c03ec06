//! Text rendering of the cart screen.

use std::fmt::Write as _;

use client_core::{format_price, Alert, CartViewState, Notifier};
use shared::domain::AddressField;

const HEADERS: [&str; 4] = ["Product", "Price", "Quantity", "Total"];

pub fn render_cart(state: &CartViewState) -> String {
    if state.flags.loading {
        return "Loading cart...\n".to_string();
    }

    let mut out = String::from("Your Cart\n\n");

    if state.items.is_empty() {
        out.push_str("Your cart is empty\n");
    } else {
        let rows: Vec<[String; 4]> = state
            .items
            .iter()
            .map(|item| {
                [
                    format!("#{} {}", item.product_id, item.product_name),
                    format_price(item.product_price),
                    item.quantity.to_string(),
                    format_price(item.line_total()),
                ]
            })
            .collect();

        let mut widths = HEADERS.map(|header| header.chars().count());
        for row in &rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.chars().count());
            }
        }

        push_row(&mut out, &HEADERS.map(str::to_string), &widths);
        let rule: Vec<String> = widths.iter().map(|width| "-".repeat(*width)).collect();
        let _ = writeln!(out, "{}", rule.join("-+-"));
        for (row, item) in rows.iter().zip(&state.items) {
            push_row(&mut out, row, &widths);
            if let Some(image) = item.primary_image() {
                let _ = writeln!(out, "    image: {image}");
            }
        }

        let _ = writeln!(out, "\nTotal: {}", state.formatted_total());
        out.push_str("[checkout] Proceed to Checkout   [clear] Clear Cart\n");
    }

    if state.flags.show_address_form {
        out.push_str("\nEnter Delivery Address\n");
        for field in AddressField::ALL {
            let _ = writeln!(
                out,
                "  {:<18} {}",
                format!("{}:", field.label()),
                state.address.field(field)
            );
        }
        let place = if state.flags.placing_order {
            "Placing Order..."
        } else {
            "Place Order"
        };
        let _ = writeln!(out, "[place] {place}   [cancel] Cancel");
    }

    out
}

fn push_row(out: &mut String, cells: &[String; 4], widths: &[usize; 4]) {
    let line: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, &width)| format!("{cell:<width$}"))
        .collect();
    let _ = writeln!(out, "{}", line.join(" | ").trim_end());
}

/// Prints alerts straight to stdout, between redraws.
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, alert: Alert) {
        println!("\n>> {alert}\n");
    }
}
