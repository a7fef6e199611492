use serde::{Deserialize, Serialize};

/// JWT payload used for authentication.
///
/// `sub` carries the user's role rather than an identifier; the user id
/// travels in `jti`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    pub sub: String, // role
    pub jti: String, // user ID
    pub iat: usize,  // issued at (unix timestamp)
    pub exp: usize,  // expires at (unix timestamp)
    pub iss: String, // issuer
    pub aud: String, // audience
}

impl Claims {
    /// User id embedded in the token, if it is numeric.
    pub fn user_id(&self) -> Option<i64> {
        self.jti.parse::<i64>().ok()
    }
}
