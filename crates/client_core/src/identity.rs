use shared::domain::UserId;

/// Source of the user whose cart is being managed.
pub trait IdentityProvider: Send + Sync {
    fn user_id(&self) -> UserId;
}

/// Single hardcoded user; stands in until a real session layer exists.
#[derive(Debug, Clone, Copy)]
pub struct FixedIdentity(pub UserId);

impl Default for FixedIdentity {
    fn default() -> Self {
        Self(UserId(1))
    }
}

impl IdentityProvider for FixedIdentity {
    fn user_id(&self) -> UserId {
        self.0
    }
}
