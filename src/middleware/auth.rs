use axum::{
    extract::{FromRef, FromRequestParts},
    http::{HeaderMap, header, request::Parts},
};
use cookie::{Cookie, SameSite, time::Duration};
use jsonwebtoken::{DecodingKey, Validation, decode};

use crate::{
    config::AuthConfig, dto::auth::Claims, error::AppError, models::Role, state::AppState,
};

pub const ACCESS_TOKEN_COOKIE: &str = "access_token";

#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: i32,
    pub username: String,
    pub role: Role,
}

impl AuthUser {
    pub fn is_staff(&self) -> bool {
        matches!(self.role, Role::Admin | Role::Staff)
    }
}

pub fn ensure_role(user: &AuthUser, role: Role) -> Result<(), AppError> {
    if user.role != role {
        return Err(AppError::Forbidden);
    }
    Ok(())
}

pub fn ensure_admin(user: &AuthUser) -> Result<(), AppError> {
    ensure_role(user, Role::Admin)
}

/// Admins and staff share the back-office permissions.
pub fn ensure_staff(user: &AuthUser) -> Result<(), AppError> {
    if !user.is_staff() {
        return Err(AppError::Forbidden);
    }
    Ok(())
}

pub fn ensure_owner_or_staff(user: &AuthUser, owner_id: i32) -> Result<(), AppError> {
    if user.user_id != owner_id && !user.is_staff() {
        return Err(AppError::Forbidden);
    }
    Ok(())
}

pub fn decode_token(auth: &AuthConfig, token: &str) -> Result<Claims, AppError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(auth.jwt_secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::Unauthorized("Invalid or expired token".into()))
}

/// Looks up a cookie by name in the `Cookie` request headers.
pub fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(Cookie::split_parse)
        .filter_map(Result::ok)
        .find(|cookie| cookie.name() == name)
        .map(|cookie| cookie.value_trimmed().to_owned())
        .filter(|value| !value.is_empty())
}

fn base_cookie(auth: &AuthConfig, value: String, max_age: Duration) -> Cookie<'static> {
    Cookie::build((ACCESS_TOKEN_COOKIE, value))
        .http_only(true)
        .same_site(SameSite::Lax)
        .path("/")
        .secure(auth.secure_cookie)
        .max_age(max_age)
        .build()
}

/// Cookie carrying a freshly issued token; lives as long as the token.
pub fn session_cookie(auth: &AuthConfig, token: &str) -> Cookie<'static> {
    base_cookie(
        auth,
        token.to_owned(),
        Duration::hours(auth.token_ttl_hours),
    )
}

pub fn cleared_cookie(auth: &AuthConfig) -> Cookie<'static> {
    base_cookie(auth, String::new(), Duration::ZERO)
}

fn bearer_token(headers: &HeaderMap) -> Result<Option<&str>, AppError> {
    let Some(auth_header) = headers.get(header::AUTHORIZATION) else {
        return Ok(None);
    };
    let auth_str = auth_header
        .to_str()
        .map_err(|_| AppError::Unauthorized("Invalid Authorization header".into()))?;

    let token = auth_str
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::Unauthorized("Invalid Authorization scheme".into()))?;
    Ok(Some(token.trim()))
}

impl<S> FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);

        let token = match bearer_token(&parts.headers)? {
            Some(token) => token.to_owned(),
            None => cookie_value(&parts.headers, ACCESS_TOKEN_COOKIE)
                .ok_or_else(|| AppError::Unauthorized("No token provided".into()))?,
        };

        let claims = decode_token(&state.auth, &token)?;

        let user_id = claims
            .sub
            .parse::<i32>()
            .map_err(|_| AppError::Unauthorized("Invalid user id in token".into()))?;
        let role = claims
            .role
            .parse::<Role>()
            .map_err(|_| AppError::Unauthorized("Invalid role in token".into()))?;

        Ok(AuthUser {
            user_id,
            username: claims.username,
            role,
        })
    }
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    fn user(role: Role) -> AuthUser {
        AuthUser {
            user_id: 7,
            username: "tester".into(),
            role,
        }
    }

    #[test]
    fn finds_cookie_among_several() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; access_token=abc.def.ghi; lang=en"),
        );
        assert_eq!(
            cookie_value(&headers, ACCESS_TOKEN_COOKIE).as_deref(),
            Some("abc.def.ghi")
        );
        assert_eq!(cookie_value(&headers, "missing"), None);
    }

    #[test]
    fn quoted_cookie_value_is_unquoted() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("access_token=\"abc.def.ghi\""),
        );
        assert_eq!(
            cookie_value(&headers, ACCESS_TOKEN_COOKIE).as_deref(),
            Some("abc.def.ghi")
        );
    }

    #[test]
    fn empty_cookie_value_counts_as_absent() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("access_token="));
        assert_eq!(cookie_value(&headers, ACCESS_TOKEN_COOKIE), None);
    }

    #[test]
    fn session_cookie_is_http_only_and_expires_with_the_token() {
        let mut auth = AuthConfig::new("secret");
        let cookie = session_cookie(&auth, "tok");
        assert_eq!(cookie.value(), "tok");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.max_age(), Some(Duration::hours(24)));
        assert!(!cookie.to_string().contains("Secure"));

        auth.secure_cookie = true;
        assert_eq!(session_cookie(&auth, "tok").secure(), Some(true));
        let cleared = cleared_cookie(&auth).to_string();
        assert!(cleared.starts_with("access_token=;"));
        assert!(cleared.contains("Max-Age=0"));
    }

    #[test]
    fn rejects_non_bearer_scheme() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic Zm9v"));
        assert!(matches!(
            bearer_token(&headers),
            Err(AppError::Unauthorized(_))
        ));
    }

    #[test]
    fn role_guards() {
        assert!(ensure_admin(&user(Role::Admin)).is_ok());
        assert!(matches!(
            ensure_admin(&user(Role::Staff)),
            Err(AppError::Forbidden)
        ));
        assert!(ensure_staff(&user(Role::Staff)).is_ok());
        assert!(ensure_staff(&user(Role::Customer)).is_err());
        assert!(ensure_owner_or_staff(&user(Role::Customer), 7).is_ok());
        assert!(ensure_owner_or_staff(&user(Role::Customer), 8).is_err());
        assert!(ensure_owner_or_staff(&user(Role::Staff), 8).is_ok());
    }
}
