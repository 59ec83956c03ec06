//! HTTP seam to the remote cart/order service.

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use shared::{
    domain::{CartItem, ProductId, UserId},
    error::ApiError,
    protocol::{CartResponse, OrderRequest, OrderResponse, RemoveItemRequest, UpdateQuantityRequest},
};
use thiserror::Error;
use tracing::debug;
use url::Url;

#[derive(Debug, Error)]
pub enum CartServiceError {
    #[error("invalid service url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("service responded with {status}: {}", .message.as_deref().unwrap_or("no message"))]
    Status {
        status: StatusCode,
        message: Option<String>,
    },
    #[error("malformed response body: {0}")]
    Decode(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum OrderOutcome {
    Accepted { message: Option<String> },
    Rejected { status: StatusCode, message: Option<String> },
}

#[async_trait]
pub trait CartService: Send + Sync {
    async fn fetch_cart(&self, user_id: UserId) -> Result<Vec<CartItem>, CartServiceError>;
    async fn remove_item(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<(), CartServiceError>;
    async fn update_quantity(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<(), CartServiceError>;
    async fn clear_cart(&self, user_id: UserId) -> Result<(), CartServiceError>;
    async fn create_order(&self, order: &OrderRequest) -> Result<OrderOutcome, CartServiceError>;
}

pub struct HttpCartService {
    http: Client,
    base_url: Url,
}

impl HttpCartService {
    pub fn new(base_url: &str) -> Result<Self, CartServiceError> {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(http: Client, base_url: &str) -> Result<Self, CartServiceError> {
        let trimmed = base_url.trim().trim_end_matches('/');
        let base_url = Url::parse(&format!("{trimmed}/"))?;
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, CartServiceError> {
        let url = self.base_url.join(path)?;
        debug!(%method, %url, "cart service request");
        Ok(self.http.request(method, url))
    }
}

async fn decode_json<T: DeserializeOwned>(response: Response) -> Result<T, CartServiceError> {
    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|err| CartServiceError::Decode(err.to_string()))
}

/// Turns a non-2xx response into `CartServiceError::Status`, keeping the
/// server's message when the body carries one.
async fn ensure_success(response: Response) -> Result<Response, CartServiceError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response
        .bytes()
        .await
        .ok()
        .and_then(|bytes| serde_json::from_slice::<ApiError>(&bytes).ok())
        .and_then(|body| body.detail().map(str::to_owned));
    Err(CartServiceError::Status { status, message })
}

#[async_trait]
impl CartService for HttpCartService {
    async fn fetch_cart(&self, user_id: UserId) -> Result<Vec<CartItem>, CartServiceError> {
        let response = self
            .request(Method::GET, &format!("cart/{user_id}"))?
            .send()
            .await?;
        let response = ensure_success(response).await?;
        let body: CartResponse = decode_json(response).await?;
        Ok(body.into_items())
    }

    async fn remove_item(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<(), CartServiceError> {
        let response = self
            .request(Method::DELETE, "cart/remove")?
            .json(&RemoveItemRequest {
                user_id,
                product_id,
            })
            .send()
            .await?;
        ensure_success(response).await?;
        Ok(())
    }

    async fn update_quantity(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<(), CartServiceError> {
        let response = self
            .request(Method::PUT, "cart/update")?
            .json(&UpdateQuantityRequest {
                user_id,
                product_id,
                quantity,
            })
            .send()
            .await?;
        ensure_success(response).await?;
        Ok(())
    }

    async fn clear_cart(&self, user_id: UserId) -> Result<(), CartServiceError> {
        let response = self
            .request(Method::DELETE, &format!("cart/clear/{user_id}"))?
            .send()
            .await?;
        ensure_success(response).await?;
        Ok(())
    }

    async fn create_order(&self, order: &OrderRequest) -> Result<OrderOutcome, CartServiceError> {
        let response = self
            .request(Method::POST, "orders/create")?
            .json(order)
            .send()
            .await?;
        let status = response.status();

        // The body is decoded before the status is looked at, so an
        // unreadable body is a failure even on 2xx.
        let body: OrderResponse = decode_json(response).await?;
        if status.is_success() {
            Ok(OrderOutcome::Accepted {
                message: body.message,
            })
        } else {
            Ok(OrderOutcome::Rejected {
                status,
                message: body.message,
            })
        }
    }
}
