use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts},
    middleware::Next,
    response::Response,
};
use service_core::error::AppError;

use crate::services::{Identity, TokenService};

/// Bearer-token gate for protected routes.
///
/// * no `Authorization: Bearer <token>` header: 401, before anything else
/// * a token that does not verify: 403
/// * otherwise the [`Identity`] is stored in the request extensions
pub async fn auth_middleware(
    State(tokens): State<TokenService>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(&req).ok_or_else(|| {
        AppError::Unauthorized(anyhow::anyhow!("Missing or invalid Authorization header"))
    })?;

    let identity = tokens.verify(token).map_err(|reason| {
        tracing::debug!(reason = %reason, "Rejected session token");
        AppError::Forbidden(anyhow::anyhow!("Invalid or expired token"))
    })?;

    tracing::Span::current().record("user_id", tracing::field::display(identity.subject_id));
    req.extensions_mut().insert(identity);

    Ok(next.run(req).await)
}

/// Token from `Authorization: Bearer <token>`; the scheme name is matched
/// case-insensitively.
fn bearer_token(req: &Request) -> Option<&str> {
    let value = req
        .headers()
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .trim();

    let (scheme, token) = value.split_once(char::is_whitespace)?;
    if !scheme.eq_ignore_ascii_case("Bearer") {
        return None;
    }

    Some(token.trim()).filter(|token| !token.is_empty())
}

/// Extractor for the identity attached by [`auth_middleware`].
#[derive(Debug, Clone)]
pub struct AuthUser(pub Identity);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let identity = parts.extensions.get::<Identity>().ok_or_else(|| {
            AppError::InternalError(anyhow::anyhow!(
                "Auth identity missing from request extensions"
            ))
        })?;

        Ok(AuthUser(identity.clone()))
    }
}
