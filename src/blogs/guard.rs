//! Ownership rule for blog mutations.

use super::repo_types::Blog;
use crate::{auth::Authentication, error::AppError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    Unauthenticated,
    TokenInvalid,
    NotPermitted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(DenyReason),
    NotFound,
}

impl Decision {
    /// Turns anything but `Allow` into the error reported to the caller.
    pub fn into_result(self) -> Result<(), AppError> {
        match self {
            Decision::Allow => Ok(()),
            Decision::NotFound => Err(AppError::NotFound("blog not found".into())),
            Decision::Deny(DenyReason::Unauthenticated) => Err(AppError::Unauthenticated),
            Decision::Deny(DenyReason::TokenInvalid) => Err(AppError::TokenInvalid),
            Decision::Deny(DenyReason::NotPermitted) => Err(AppError::Unauthorized),
        }
    }
}

/// Authentication is checked before existence, so anonymous callers learn
/// nothing about which ids exist.
pub fn authorize_mutation(auth: &Authentication, blog: Option<&Blog>) -> Decision {
    let principal = match auth {
        Authentication::Anonymous => return Decision::Deny(DenyReason::Unauthenticated),
        Authentication::Rejected => return Decision::Deny(DenyReason::TokenInvalid),
        Authentication::Verified(p) => p,
    };
    match blog {
        None => Decision::NotFound,
        Some(b) if b.owner == principal.user_id => Decision::Allow,
        Some(_) => Decision::Deny(DenyReason::NotPermitted),
    }
}

pub fn authorize_delete(auth: &Authentication, blog: Option<&Blog>) -> Decision {
    authorize_mutation(auth, blog)
}

pub fn authorize_update(auth: &Authentication, blog: Option<&Blog>) -> Decision {
    authorize_mutation(auth, blog)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Principal;
    use time::OffsetDateTime;
    use uuid::Uuid;

    fn blog_owned_by(owner: Uuid) -> Blog {
        Blog {
            id: Uuid::new_v4(),
            title: "Owned".into(),
            author: None,
            url: "www.example.org".into(),
            likes: 0,
            owner,
            created_at: OffsetDateTime::UNIX_EPOCH,
        }
    }

    fn signed_in(user_id: Uuid) -> Authentication {
        Authentication::Verified(Principal {
            user_id,
            username: "someone".into(),
        })
    }

    #[test]
    fn anonymous_is_denied_for_any_blog() {
        let blog = blog_owned_by(Uuid::new_v4());
        let expected = Decision::Deny(DenyReason::Unauthenticated);
        assert_eq!(authorize_delete(&Authentication::Anonymous, Some(&blog)), expected);
        assert_eq!(authorize_delete(&Authentication::Anonymous, None), expected);
    }

    #[test]
    fn rejected_token_is_denied() {
        let blog = blog_owned_by(Uuid::new_v4());
        assert_eq!(
            authorize_delete(&Authentication::Rejected, Some(&blog)),
            Decision::Deny(DenyReason::TokenInvalid)
        );
    }

    #[test]
    fn missing_blog_is_not_found() {
        assert_eq!(authorize_delete(&signed_in(Uuid::new_v4()), None), Decision::NotFound);
    }

    #[test]
    fn other_owner_is_denied() {
        let blog = blog_owned_by(Uuid::new_v4());
        assert_eq!(
            authorize_delete(&signed_in(Uuid::new_v4()), Some(&blog)),
            Decision::Deny(DenyReason::NotPermitted)
        );
        assert_eq!(
            authorize_update(&signed_in(Uuid::new_v4()), Some(&blog)),
            Decision::Deny(DenyReason::NotPermitted)
        );
    }

    #[test]
    fn owner_is_allowed() {
        let owner = Uuid::new_v4();
        let blog = blog_owned_by(owner);
        assert_eq!(authorize_delete(&signed_in(owner), Some(&blog)), Decision::Allow);
        assert_eq!(authorize_update(&signed_in(owner), Some(&blog)), Decision::Allow);
    }

    #[test]
    fn decisions_map_to_errors() {
        assert!(Decision::Allow.into_result().is_ok());
        assert!(matches!(
            Decision::NotFound.into_result(),
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            Decision::Deny(DenyReason::NotPermitted).into_result(),
            Err(AppError::Unauthorized)
        ));
        assert!(matches!(
            Decision::Deny(DenyReason::Unauthenticated).into_result(),
            Err(AppError::Unauthenticated)
        ));
    }
}
