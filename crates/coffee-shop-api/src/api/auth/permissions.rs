//! Permission guard

use tracing::debug;

use super::{AuthError, Claims};

/// View drinks with full recipes
pub const GET_DRINKS_DETAIL: &str = "get:drinks-detail";
/// Create drinks
pub const POST_DRINKS: &str = "post:drinks";
/// Edit drinks
pub const PATCH_DRINKS: &str = "patch:drinks";
/// Delete drinks
pub const DELETE_DRINKS: &str = "delete:drinks";

/// Require `required` to be among the token's `permissions` claim
pub fn check_permission(required: &str, claims: &Claims) -> Result<(), AuthError> {
    let permissions = claims
        .permissions
        .as_ref()
        .ok_or(AuthError::PermissionsMissing)?;

    if permissions.iter().any(|p| p == required) {
        debug!("Permission {} granted to {}", required, claims.sub);
        Ok(())
    } else {
        Err(AuthError::PermissionNotFound)
    }
}
