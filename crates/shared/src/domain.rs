use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_newtype!(UserId);
id_newtype!(ProductId);

/// One line of a user's cart as returned by the cart service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    pub product_id: ProductId,
    pub product_name: String,
    pub product_price: f64,
    pub quantity: u32,
    #[serde(default)]
    pub product_images: Vec<String>,
}

impl CartItem {
    pub fn line_total(&self) -> f64 {
        self.product_price * f64::from(self.quantity)
    }

    pub fn primary_image(&self) -> Option<&str> {
        self.product_images.first().map(String::as_str)
    }
}

/// Delivery address captured at checkout. Only held client-side until an
/// order is submitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub name: String,
    pub flat: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub mobile: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressField {
    Name,
    Flat,
    Street,
    City,
    State,
    Mobile,
}

impl AddressField {
    pub const ALL: [AddressField; 6] = [
        AddressField::Name,
        AddressField::Flat,
        AddressField::Street,
        AddressField::City,
        AddressField::State,
        AddressField::Mobile,
    ];

    pub const REQUIRED: [AddressField; 4] = [
        AddressField::Name,
        AddressField::Street,
        AddressField::City,
        AddressField::Mobile,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            AddressField::Name => "name",
            AddressField::Flat => "flat",
            AddressField::Street => "street",
            AddressField::City => "city",
            AddressField::State => "state",
            AddressField::Mobile => "mobile",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AddressField::Name => "Name",
            AddressField::Flat => "Flat / House No",
            AddressField::Street => "Street / Locality",
            AddressField::City => "City",
            AddressField::State => "State",
            AddressField::Mobile => "Mobile",
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown address field '{0}' (expected one of name, flat, street, city, state, mobile)")]
pub struct UnknownAddressField(pub String);

impl FromStr for AddressField {
    type Err = UnknownAddressField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        AddressField::ALL
            .into_iter()
            .find(|field| field.as_str() == lower)
            .ok_or_else(|| UnknownAddressField(s.to_string()))
    }
}

impl Address {
    pub fn field(&self, field: AddressField) -> &str {
        match field {
            AddressField::Name => &self.name,
            AddressField::Flat => &self.flat,
            AddressField::Street => &self.street,
            AddressField::City => &self.city,
            AddressField::State => &self.state,
            AddressField::Mobile => &self.mobile,
        }
    }

    pub fn set_field(&mut self, field: AddressField, value: impl Into<String>) {
        let slot = match field {
            AddressField::Name => &mut self.name,
            AddressField::Flat => &mut self.flat,
            AddressField::Street => &mut self.street,
            AddressField::City => &mut self.city,
            AddressField::State => &mut self.state,
            AddressField::Mobile => &mut self.mobile,
        };
        *slot = value.into();
    }

    /// Required fields that are still empty. Whitespace counts as filled.
    pub fn missing_required_fields(&self) -> Vec<AddressField> {
        AddressField::REQUIRED
            .into_iter()
            .filter(|field| self.field(*field).is_empty())
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.missing_required_fields().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_address() -> Address {
        Address {
            name: "Asha".into(),
            flat: "4B".into(),
            street: "MG Road".into(),
            city: "Pune".into(),
            state: "MH".into(),
            mobile: "9800000000".into(),
        }
    }

    #[test]
    fn optional_fields_do_not_block_completion() {
        let mut address = full_address();
        address.flat.clear();
        address.state.clear();
        assert!(address.is_complete());
    }

    #[test]
    fn reports_each_missing_required_field() {
        let mut address = full_address();
        address.name.clear();
        address.mobile.clear();
        assert_eq!(
            address.missing_required_fields(),
            vec![AddressField::Name, AddressField::Mobile]
        );
        assert!(!address.is_complete());
    }

    #[test]
    fn parses_field_names_case_insensitively() {
        assert_eq!("City".parse::<AddressField>(), Ok(AddressField::City));
        assert!("zip".parse::<AddressField>().is_err());
    }

    #[test]
    fn cart_item_images_default_to_empty() {
        let item: CartItem = serde_json::from_str(
            r#"{"product_id":1,"product_name":"Widget","product_price":9.99,"quantity":2}"#,
        )
        .expect("json");
        assert_eq!(item.product_id, ProductId(1));
        assert!(item.primary_image().is_none());
        assert!((item.line_total() - 19.98).abs() < 1e-9);
    }
}
