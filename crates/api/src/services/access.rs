//! Ownership checks shared by every resource.

use thiserror::Error;

use pawgo_core::UserId;

use crate::models::CurrentUser;

/// The caller may not act on the record.
#[derive(Debug, Error)]
#[error("you do not have access to this {0}")]
pub struct Forbidden(pub &'static str);

/// Allow `actor` if they own the record or are an admin.
///
/// # Errors
///
/// Returns [`Forbidden`] naming `what` otherwise.
pub fn ensure_owner(actor: &CurrentUser, owner: UserId, what: &'static str) -> Result<(), Forbidden> {
    ensure_any_of(actor, &[owner], what)
}

/// Allow `actor` if they are one of `parties` or an admin.
///
/// # Errors
///
/// Returns [`Forbidden`] naming `what` otherwise.
pub fn ensure_any_of(
    actor: &CurrentUser,
    parties: &[UserId],
    what: &'static str,
) -> Result<(), Forbidden> {
    if actor.is_admin() || parties.contains(&actor.id) {
        Ok(())
    } else {
        tracing::debug!(user_id = %actor.id, what, "Access denied");
        Err(Forbidden(what))
    }
}

/// Allow only the user `id` itself. Admins get no bypass.
///
/// # Errors
///
/// Returns [`Forbidden`] naming `what` otherwise.
pub fn ensure_is(actor: &CurrentUser, id: UserId, what: &'static str) -> Result<(), Forbidden> {
    if actor.id == id {
        Ok(())
    } else {
        tracing::debug!(user_id = %actor.id, what, "Access denied");
        Err(Forbidden(what))
    }
}

#[cfg(test)]
mod tests {
    use pawgo_core::UserRole;

    use super::*;

    fn user(id: i32, role: UserRole) -> CurrentUser {
        CurrentUser {
            id: UserId::new(id),
            role,
        }
    }

    #[test]
    fn test_owner_passes() {
        let owner = user(1, UserRole::PetOwner);
        assert!(ensure_owner(&owner, UserId::new(1), "pet").is_ok());
    }

    #[test]
    fn test_non_owner_is_forbidden_whatever_their_role() {
        for role in [UserRole::PetOwner, UserRole::ServiceProvider] {
            let err = ensure_owner(&user(2, role), UserId::new(1), "pet").unwrap_err();
            assert_eq!(err.to_string(), "you do not have access to this pet");
        }
    }

    #[test]
    fn test_admin_passes_every_check() {
        let admin = user(9, UserRole::Admin);
        assert!(ensure_owner(&admin, UserId::new(1), "order").is_ok());
        assert!(ensure_any_of(&admin, &[], "appointment").is_ok());
    }

    #[test]
    fn test_any_party_passes() {
        let provider = user(5, UserRole::ServiceProvider);
        let parties = [UserId::new(1), UserId::new(5)];
        assert!(ensure_any_of(&provider, &parties, "appointment").is_ok());
        assert!(ensure_any_of(&user(6, UserRole::PetOwner), &parties, "appointment").is_err());
    }

    #[test]
    fn test_ensure_is_has_no_admin_bypass() {
        let author = UserId::new(3);
        assert!(ensure_is(&user(3, UserRole::PetOwner), author, "review").is_ok());
        assert!(ensure_is(&user(4, UserRole::PetOwner), author, "review").is_err());
        let err = ensure_is(&user(9, UserRole::Admin), author, "review").unwrap_err();
        assert_eq!(err.to_string(), "you do not have access to this review");
    }
}
