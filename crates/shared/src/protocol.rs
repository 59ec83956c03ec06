use serde::{Deserialize, Serialize};

use crate::domain::{Address, CartItem, ProductId, UserId};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CartResponse {
    #[serde(default)]
    pub items: Option<Vec<CartItem>>,
}

impl CartResponse {
    pub fn into_items(self) -> Vec<CartItem> {
        self.items.unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveItemRequest {
    pub user_id: UserId,
    pub product_id: ProductId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateQuantityRequest {
    pub user_id: UserId,
    pub product_id: ProductId,
    pub quantity: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity: u32,
    pub product_price: f64,
}

impl From<&CartItem> for OrderItem {
    fn from(item: &CartItem) -> Self {
        Self {
            product_id: item.product_id,
            product_name: item.product_name.clone(),
            quantity: item.quantity,
            product_price: item.product_price,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    pub user_id: UserId,
    pub items: Vec<OrderItem>,
    pub address: Address,
}

impl OrderRequest {
    pub fn from_cart(user_id: UserId, items: &[CartItem], address: &Address) -> Self {
        Self {
            user_id,
            items: items.iter().map(OrderItem::from).collect(),
            address: address.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderResponse {
    #[serde(default)]
    pub message: Option<String>,
}
