//! `AuthUser` extractor: reads the caller identity forwarded by the auth gateway.

use axum::extract::{FromRequestParts, OptionalFromRequestParts};
use axum::http::request::Parts;

use tutorhub_core::error::AppError;
use tutorhub_core::types::{TeacherId, UserId};
use tutorhub_service::context::{RequestContext, UserRole};

use crate::error::ApiError;

/// Header carrying the caller's user id.
pub const USER_ID_HEADER: &str = "x-user-id";
/// Header carrying the caller's role.
pub const USER_ROLE_HEADER: &str = "x-user-role";
/// Header carrying the teacher id of a teacher caller.
pub const TEACHER_ID_HEADER: &str = "x-teacher-id";

/// Extracted caller context available in handlers.
#[derive(Debug, Clone)]
pub struct AuthUser(pub RequestContext);

impl AuthUser {
    /// Returns the inner `RequestContext`.
    pub fn context(&self) -> &RequestContext {
        &self.0
    }
}

impl std::ops::Deref for AuthUser {
    type Target = RequestContext;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

fn header<'a>(parts: &'a Parts, name: &str) -> Result<Option<&'a str>, AppError> {
    parts
        .headers
        .get(name)
        .map(|v| {
            v.to_str()
                .map_err(|_| AppError::authentication(format!("Header {name} is not valid text")))
        })
        .transpose()
}

fn context_from_parts(parts: &Parts) -> Result<RequestContext, AppError> {
    let user_id: UserId = header(parts, USER_ID_HEADER)?
        .ok_or_else(|| AppError::authentication("Missing X-User-Id header"))?
        .parse::<UserId>()
        .map_err(|e| AppError::authentication(format!("Invalid X-User-Id header: {e}")))?;

    let role: UserRole = header(parts, USER_ROLE_HEADER)?
        .ok_or_else(|| AppError::authentication("Missing X-User-Role header"))?
        .parse::<UserRole>()?;

    let teacher_id: Option<TeacherId> = header(parts, TEACHER_ID_HEADER)?
        .map(|raw| {
            raw.parse::<TeacherId>().map_err(|e| {
                AppError::authentication(format!("Invalid X-Teacher-Id header: {e}"))
            })
        })
        .transpose()?;

    if role == UserRole::Teacher && teacher_id.is_none() {
        return Err(AppError::authentication(
            "Teacher requests must carry the X-Teacher-Id header",
        ));
    }

    Ok(RequestContext::new(user_id, role, teacher_id))
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(AuthUser(context_from_parts(parts)?))
    }
}

/// Anonymous when no user header is present; a malformed context is still
/// rejected.
impl<S> OptionalFromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> Result<Option<Self>, Self::Rejection> {
        if !parts.headers.contains_key(USER_ID_HEADER) {
            return Ok(None);
        }
        Ok(Some(AuthUser(context_from_parts(parts)?)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts(headers: &[(&str, &str)]) -> Parts {
        let mut builder = Request::builder().uri("/materials");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn test_teacher_context() {
        let ctx = context_from_parts(&parts(&[
            ("X-User-Id", "10"),
            ("X-User-Role", "Teacher"),
            ("X-Teacher-Id", "3"),
        ]))
        .unwrap();
        assert_eq!(ctx.user_id, UserId::new(10));
        assert_eq!(ctx.role, UserRole::Teacher);
        assert_eq!(ctx.teacher_id, Some(TeacherId::new(3)));
    }

    #[test]
    fn test_teacher_without_teacher_id_is_rejected() {
        let err = context_from_parts(&parts(&[("X-User-Id", "10"), ("X-User-Role", "teacher")]))
            .unwrap_err();
        assert_eq!(err.kind, tutorhub_core::error::ErrorKind::Authentication);
    }

    #[test]
    fn test_missing_and_malformed_headers() {
        assert!(context_from_parts(&parts(&[])).is_err());
        assert!(context_from_parts(&parts(&[("X-User-Id", "x"), ("X-User-Role", "admin")])).is_err());
        assert!(context_from_parts(&parts(&[("X-User-Id", "1"), ("X-User-Role", "guest")])).is_err());
    }
}
