use tracing::warn;
use uuid::Uuid;

use crate::error::AppError;

/// Anything with a single owning identity.
pub trait Owned {
    fn owner(&self) -> Uuid;
}

/// Only the owner may mutate or delete. Plain identity equality, no roles.
pub fn authorize(owner: Uuid, caller: Uuid) -> Result<(), AppError> {
    if owner == caller {
        Ok(())
    } else {
        warn!(%owner, %caller, "ownership check denied");
        Err(AppError::forbidden())
    }
}

pub fn ensure_owner(resource: &impl Owned, caller: Uuid) -> Result<(), AppError> {
    authorize(resource.owner(), caller)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Thing(Uuid);

    impl Owned for Thing {
        fn owner(&self) -> Uuid {
            self.0
        }
    }

    #[test]
    fn owner_is_allowed() {
        let id = Uuid::new_v4();
        assert!(authorize(id, id).is_ok());
        assert!(ensure_owner(&Thing(id), id).is_ok());
    }

    #[test]
    fn anyone_else_is_forbidden() {
        let err = ensure_owner(&Thing(Uuid::new_v4()), Uuid::new_v4()).unwrap_err();
        assert!(matches!(err, AppError::Forbidden(ref m) if m == "User not authorized"));
    }
}
