//! crates/photo_sharing_core/src/policy.rs
//!
//! The authorization policy: a pure decision over (session, resource, action).
//! It never touches storage; callers load the resources it needs first.

use crate::domain::{Comment, Photo, Session};
use crate::error::EngineError;

/// The thing an action targets. `None` marks a resource being created.
#[derive(Debug, Clone, Copy)]
pub enum Resource<'a> {
    Photo(Option<&'a Photo>),
    Comment {
        photo: &'a Photo,
        comment: Option<&'a Comment>,
    },
    Like(&'a Photo),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Create,
    Edit,
    Delete,
    Toggle,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DenyReason {
    Unauthenticated,
    Forbidden(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(DenyReason),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }

    /// Turns a denial into the matching engine error.
    pub fn into_result(self) -> Result<(), EngineError> {
        match self {
            Decision::Allow => Ok(()),
            Decision::Deny(DenyReason::Unauthenticated) => Err(EngineError::Unauthorized),
            Decision::Deny(DenyReason::Forbidden(why)) => Err(EngineError::Forbidden(why.to_string())),
        }
    }
}

fn allow_if(condition: bool, why: &'static str) -> Decision {
    if condition {
        Decision::Allow
    } else {
        Decision::Deny(DenyReason::Forbidden(why))
    }
}

/// Decides whether `session` may perform `action` on `resource`.
///
/// Authentication is checked first, so an anonymous caller is always told
/// `Unauthenticated` and never `Forbidden`.
pub fn decide(session: &Session, resource: Resource<'_>, action: Action) -> Decision {
    let Some(actor) = session.identity() else {
        return Decision::Deny(DenyReason::Unauthenticated);
    };

    match (resource, action) {
        (Resource::Photo(None), Action::Create) => Decision::Allow,
        (Resource::Photo(Some(photo)), Action::Edit) => allow_if(
            photo.owner_id == actor.id,
            "only the owner can edit this photo",
        ),
        (Resource::Photo(Some(photo)), Action::Delete) => allow_if(
            photo.owner_id == actor.id,
            "only the owner can delete this photo",
        ),
        (Resource::Comment { comment: None, .. }, Action::Create) => Decision::Allow,
        (Resource::Comment { comment: Some(comment), .. }, Action::Edit) => allow_if(
            comment.author_id == actor.id,
            "only the author can edit this comment",
        ),
        (Resource::Comment { photo, comment: Some(comment) }, Action::Delete) => allow_if(
            comment.author_id == actor.id || photo.owner_id == actor.id,
            "only the author or the photo owner can delete this comment",
        ),
        // The engine always toggles the actor's own membership.
        (Resource::Like(_), Action::Toggle) => Decision::Allow,
        _ => Decision::Deny(DenyReason::Forbidden("unsupported action")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Identity, UserId};
    use chrono::Utc;
    use rstest::{fixture, rstest};
    use uuid::Uuid;

    struct Cast {
        owner: UserId,
        author: UserId,
        stranger: UserId,
        photo: Photo,
        comment: Comment,
    }

    fn session_for(id: UserId) -> Session {
        Session::Authenticated(Identity {
            id,
            login_name: "user".into(),
            first_name: "F".into(),
            last_name: "L".into(),
        })
    }

    #[fixture]
    fn cast() -> Cast {
        let owner = Uuid::new_v4();
        let author = Uuid::new_v4();
        let comment = Comment {
            id: Uuid::new_v4(),
            author_id: author,
            text: "nice".into(),
            created_at: Utc::now(),
        };
        let mut photo = Photo::new(Uuid::new_v4(), owner, "a.jpg".into(), Utc::now());
        photo.comments.push(comment.clone());
        Cast {
            owner,
            author,
            stranger: Uuid::new_v4(),
            photo,
            comment,
        }
    }

    #[rstest]
    fn anonymous_is_unauthenticated_for_everything(cast: Cast) {
        let anon = Session::Anonymous;
        let cases = [
            (Resource::Photo(None), Action::Create),
            (Resource::Photo(Some(&cast.photo)), Action::Delete),
            (
                Resource::Comment {
                    photo: &cast.photo,
                    comment: Some(&cast.comment),
                },
                Action::Edit,
            ),
            (Resource::Like(&cast.photo), Action::Toggle),
        ];
        for (resource, action) in cases {
            assert_eq!(
                decide(&anon, resource, action),
                Decision::Deny(DenyReason::Unauthenticated)
            );
        }
    }

    #[rstest]
    fn any_user_may_create_and_toggle(cast: Cast) {
        let s = session_for(cast.stranger);
        assert!(decide(&s, Resource::Photo(None), Action::Create).is_allowed());
        let new_comment = Resource::Comment {
            photo: &cast.photo,
            comment: None,
        };
        assert!(decide(&s, new_comment, Action::Create).is_allowed());
        assert!(decide(&s, Resource::Like(&cast.photo), Action::Toggle).is_allowed());
    }

    #[rstest]
    #[case(Action::Edit)]
    #[case(Action::Delete)]
    fn only_owner_may_change_photo(cast: Cast, #[case] action: Action) {
        let photo = Resource::Photo(Some(&cast.photo));
        assert!(decide(&session_for(cast.owner), photo, action).is_allowed());
        assert!(!decide(&session_for(cast.author), photo, action).is_allowed());
        assert!(!decide(&session_for(cast.stranger), photo, action).is_allowed());
    }

    #[rstest]
    fn comment_edit_is_author_only(cast: Cast) {
        let res = Resource::Comment {
            photo: &cast.photo,
            comment: Some(&cast.comment),
        };
        assert!(decide(&session_for(cast.author), res, Action::Edit).is_allowed());
        assert!(!decide(&session_for(cast.owner), res, Action::Edit).is_allowed());
        assert!(!decide(&session_for(cast.stranger), res, Action::Edit).is_allowed());
    }

    #[rstest]
    fn comment_delete_allows_author_or_photo_owner(cast: Cast) {
        let res = Resource::Comment {
            photo: &cast.photo,
            comment: Some(&cast.comment),
        };
        assert!(decide(&session_for(cast.author), res, Action::Delete).is_allowed());
        assert!(decide(&session_for(cast.owner), res, Action::Delete).is_allowed());
        assert!(matches!(
            decide(&session_for(cast.stranger), res, Action::Delete),
            Decision::Deny(DenyReason::Forbidden(_))
        ));
    }

    #[rstest]
    fn unsupported_pairs_are_denied(cast: Cast) {
        let s = session_for(cast.owner);
        assert!(!decide(&s, Resource::Like(&cast.photo), Action::Delete).is_allowed());
        assert!(!decide(&s, Resource::Photo(Some(&cast.photo)), Action::Toggle).is_allowed());
    }

    #[test]
    fn denial_maps_to_engine_errors() {
        assert!(matches!(
            Decision::Deny(DenyReason::Unauthenticated).into_result(),
            Err(EngineError::Unauthorized)
        ));
        assert!(matches!(
            Decision::Deny(DenyReason::Forbidden("no")).into_result(),
            Err(EngineError::Forbidden(_))
        ));
        assert!(Decision::Allow.into_result().is_ok());
    }
}
