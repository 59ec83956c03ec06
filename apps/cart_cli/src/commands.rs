//! Interactive commands typed at the cart prompt.

use shared::domain::{AddressField, ProductId, UnknownAddressField};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartCommand {
    Show,
    Remove(ProductId),
    SetQuantity { product_id: ProductId, quantity: i64 },
    Clear,
    Checkout,
    Cancel,
    Address { field: AddressField, value: String },
    Place,
    Help,
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("empty command")]
    Empty,
    #[error("unknown command '{0}' (type 'help')")]
    Unknown(String),
    #[error("missing {0}")]
    MissingArgument(&'static str),
    #[error("{arg} must be a whole number, got '{value}'")]
    InvalidNumber { arg: &'static str, value: String },
    #[error(transparent)]
    UnknownField(#[from] UnknownAddressField),
}

pub const HELP: &str = "\
commands:
  show                    redraw the cart
  remove <id>             remove a product
  qty <id> <quantity>     change a quantity (must be at least 1)
  clear                   empty the cart
  checkout                open the delivery address form
  address <field> <text>  set name, flat, street, city, state or mobile
  place                   place the order
  cancel                  close the address form
  quit                    exit";

fn number(arg: &'static str, raw: Option<&str>) -> Result<i64, CommandError> {
    let raw = raw.ok_or(CommandError::MissingArgument(arg))?;
    raw.parse::<i64>().map_err(|_| CommandError::InvalidNumber {
        arg,
        value: raw.to_string(),
    })
}

pub fn parse_command(line: &str) -> Result<CartCommand, CommandError> {
    let line = line.trim();
    let mut parts = line.split_whitespace();
    let Some(verb) = parts.next() else {
        return Err(CommandError::Empty);
    };

    match verb.to_ascii_lowercase().as_str() {
        "show" | "ls" => Ok(CartCommand::Show),
        "remove" | "rm" => Ok(CartCommand::Remove(ProductId(number(
            "product id",
            parts.next(),
        )?))),
        "qty" | "quantity" => {
            let product_id = ProductId(number("product id", parts.next())?);
            let quantity = number("quantity", parts.next())?;
            Ok(CartCommand::SetQuantity {
                product_id,
                quantity,
            })
        }
        "clear" => Ok(CartCommand::Clear),
        "checkout" => Ok(CartCommand::Checkout),
        "cancel" => Ok(CartCommand::Cancel),
        "address" | "addr" => {
            let field = parts
                .next()
                .ok_or(CommandError::MissingArgument("address field"))?
                .parse::<AddressField>()?;
            let value = parts.collect::<Vec<_>>().join(" ");
            Ok(CartCommand::Address { field, value })
        }
        "place" | "order" => Ok(CartCommand::Place),
        "help" | "?" => Ok(CartCommand::Help),
        "quit" | "exit" | "q" => Ok(CartCommand::Quit),
        other => Err(CommandError::Unknown(other.to_string())),
    }
}
