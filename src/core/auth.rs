use serde::{Deserialize, Serialize};

/// Identity presented with a request. Tokens are minted and decoded by the
/// external session layer; this subsystem only ever reads the role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthToken {
    pub role: String,
}

/// Role check for privileged operations. Fails closed: an absent token is
/// never authorized, whatever the allowed set.
pub fn is_authorized(token: Option<&AuthToken>, allowed_roles: &[&str]) -> bool {
    match token {
        None => false,
        Some(token) => allowed_roles.contains(&token.role.as_str()),
    }
}
