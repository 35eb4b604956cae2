use serde::{Deserialize, Serialize};

/// Claims embedded in the JWT access token issued by the identity provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // user id
    pub exp: usize,
    pub iat: usize,
}

/// The token subject, available to handlers as an extractor.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: String,
}
