use crate::auth::jwt::AuthUser;
use crate::error::ApiError;

/// The one access rule for per-appointment operations: the caller must be
/// the owning user or an admin.
pub fn owner_or_admin(caller: &AuthUser, owner_id: i64) -> Result<(), ApiError> {
    if caller.is_admin() || caller.id == owner_id {
        Ok(())
    } else {
        Err(ApiError::Forbidden)
    }
}

/// Listing scope, decided before any query runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CitaScope {
    All,
    OwnedBy(i64),
}

pub fn list_scope(caller: &AuthUser) -> CitaScope {
    if caller.is_admin() {
        CitaScope::All
    } else {
        CitaScope::OwnedBy(caller.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::repo::{ROLE_ADMIN, ROLE_CLIENT};

    fn caller(id: i64, role: &str) -> AuthUser {
        AuthUser {
            id,
            username: "someone".into(),
            role: role.into(),
        }
    }

    #[test]
    fn owner_is_permitted() {
        assert!(owner_or_admin(&caller(3, ROLE_CLIENT), 3).is_ok());
    }

    #[test]
    fn admin_is_permitted_on_any_appointment() {
        assert!(owner_or_admin(&caller(1, ROLE_ADMIN), 99).is_ok());
    }

    #[test]
    fn third_party_is_forbidden() {
        let err = owner_or_admin(&caller(4, ROLE_CLIENT), 3).unwrap_err();
        assert!(matches!(err, ApiError::Forbidden));
    }

    #[test]
    fn admin_lists_everything_client_lists_own() {
        assert_eq!(list_scope(&caller(1, ROLE_ADMIN)), CitaScope::All);
        assert_eq!(list_scope(&caller(7, ROLE_CLIENT)), CitaScope::OwnedBy(7));
    }
}
