//! Authentication middleware and role gate.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};
use log::debug;

use super::{AuthError, Role, TokenIssuer};

/// Extract a Bearer token from an Authorization header value.
fn bearer_token_from_header(header_value: &str) -> Result<&str, AuthError> {
    let mut parts = header_value.split_whitespace();
    let scheme = parts.next().ok_or(AuthError::InvalidAuthHeader)?;

    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AuthError::InvalidAuthHeader);
    }

    let token = parts.next().ok_or(AuthError::InvalidAuthHeader)?;
    if parts.next().is_some() {
        return Err(AuthError::InvalidAuthHeader);
    }

    Ok(token)
}

/// Authenticated caller, attached to the request by [`auth_middleware`].
///
/// Holds exactly what the verified token asserted. Downstream handlers read
/// identity from here and nowhere else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub user_id: String,
    pub role: Role,
}

impl CurrentUser {
    pub fn id(&self) -> &str {
        &self.user_id
    }
}

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or(AuthError::MissingAuthHeader)
    }
}

/// Authentication middleware.
///
/// Verifies the `Authorization: Bearer <token>` header and injects
/// [`CurrentUser`] into request extensions. Any failure short-circuits with
/// 401 before the inner handler runs.
pub async fn auth_middleware(
    State(tokens): State<TokenIssuer>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingAuthHeader)?
        .to_str()
        .map_err(|_| AuthError::InvalidAuthHeader)?;

    let token = bearer_token_from_header(header)?;
    let claims = tokens.verify(token)?;

    debug!("Authenticated {} as {}", claims.user_id, claims.role);
    req.extensions_mut().insert(CurrentUser {
        user_id: claims.user_id,
        role: claims.role,
    });

    Ok(next.run(req).await)
}

/// Role gate. Layer it inside [`auth_middleware`]:
///
/// ```ignore
/// router
///     .layer(from_fn_with_state(Role::Admin, require_role))
///     .layer(from_fn_with_state(tokens, auth_middleware))
/// ```
///
/// Without an authenticated caller the request is rejected with 401; with the
/// wrong role, 403.
pub async fn require_role(
    State(required): State<Role>,
    req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let user = req
        .extensions()
        .get::<CurrentUser>()
        .ok_or(AuthError::MissingAuthHeader)?;

    if user.role != required {
        debug!(
            "Denied {} ({}) on route requiring {}",
            user.user_id, user.role, required
        );
        return Err(AuthError::Forbidden(required));
    }

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    };

    use axum::{
        Router,
        body::Body,
        http::{Request as HttpRequest, StatusCode},
        middleware::from_fn_with_state,
        routing::get,
    };
    use tower::ServiceExt;

    use super::*;

    const SECRET: &[u8] = b"middleware-test-secret-at-least-32-characters";

    #[test]
    fn test_bearer_token_from_header_valid() {
        assert_eq!(
            bearer_token_from_header("Bearer abc.def.ghi").unwrap(),
            "abc.def.ghi"
        );
        assert_eq!(
            bearer_token_from_header("bearer   token123").unwrap(),
            "token123"
        );
        assert_eq!(
            bearer_token_from_header("   Bearer\tmixed-case ").unwrap(),
            "mixed-case"
        );
    }

    #[test]
    fn test_bearer_token_from_header_invalid() {
        let cases = [
            "",
            "Bearer",
            "Bearer ",
            "Token something",
            "Bearer token extra",
            "bear token",
            "abc.def.ghi",
        ];

        for case in cases {
            assert!(
                bearer_token_from_header(case).is_err(),
                "{case} should fail"
            );
        }
    }

    /// Router whose only handler records that it ran and echoes the caller.
    fn gated_router(tokens: TokenIssuer, role: Option<Role>, reached: Arc<AtomicBool>) -> Router {
        let handler = move |user: CurrentUser| {
            let reached = reached.clone();
            async move {
                reached.store(true, Ordering::SeqCst);
                format!("{}:{}", user.user_id, user.role)
            }
        };

        let mut router = Router::new().route("/protected", get(handler));
        if let Some(role) = role {
            router = router.layer(from_fn_with_state(role, require_role));
        }
        router.layer(from_fn_with_state(tokens, auth_middleware))
    }

    async fn call(router: Router, auth: Option<&str>) -> (StatusCode, String) {
        let mut builder = HttpRequest::builder().uri("/protected");
        if let Some(value) = auth {
            builder = builder.header(AUTHORIZATION, value);
        }
        let response = router
            .oneshot(builder.body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), 4096)
            .await
            .unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_valid_token_reaches_handler_with_claims() {
        let tokens = TokenIssuer::new(SECRET, 3600);
        let token = tokens.issue("usr_42", Role::Candidate).unwrap();
        let reached = Arc::new(AtomicBool::new(false));

        let (status, body) = call(
            gated_router(tokens, None, reached.clone()),
            Some(&format!("Bearer {}", token)),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "usr_42:candidate");
        assert!(reached.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_rejections_never_reach_handler() {
        let tokens = TokenIssuer::new(SECRET, 3600);
        let other = TokenIssuer::new(b"some-other-secret-also-32-characters-long", 3600);
        let foreign = other.issue("usr_1", Role::Admin).unwrap();
        let expired = TokenIssuer::new(SECRET, 10)
            .issue_at("usr_1", Role::Admin, chrono::Utc::now().timestamp() - 60)
            .unwrap();

        let cases = [
            None,
            Some("Basic dXNlcjpwYXNz".to_string()),
            Some("Bearer".to_string()),
            Some("Bearer not-a-jwt".to_string()),
            Some(format!("Bearer {}", foreign)),
            Some(format!("Bearer {}", expired)),
        ];

        for case in cases {
            let reached = Arc::new(AtomicBool::new(false));
            let (status, _) = call(
                gated_router(tokens.clone(), None, reached.clone()),
                case.as_deref(),
            )
            .await;
            assert_eq!(status, StatusCode::UNAUTHORIZED, "{case:?}");
            assert!(!reached.load(Ordering::SeqCst), "{case:?} reached handler");
        }
    }

    #[tokio::test]
    async fn test_role_gate() {
        let tokens = TokenIssuer::new(SECRET, 3600);
        let admin = format!("Bearer {}", tokens.issue("usr_a", Role::Admin).unwrap());
        let candidate = format!("Bearer {}", tokens.issue("usr_c", Role::Candidate).unwrap());

        let reached = Arc::new(AtomicBool::new(false));
        let router = gated_router(tokens.clone(), Some(Role::Admin), reached.clone());
        let (status, _) = call(router, Some(&candidate)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert!(!reached.load(Ordering::SeqCst));

        let router = gated_router(tokens.clone(), Some(Role::Admin), reached.clone());
        let (status, body) = call(router, Some(&admin)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "usr_a:admin");
        assert!(reached.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_role_gate_without_authentication_is_401() {
        let reached = Arc::new(AtomicBool::new(false));
        let flag = reached.clone();
        let router = Router::new()
            .route(
                "/protected",
                get(move || {
                    let flag = flag.clone();
                    async move {
                        flag.store(true, Ordering::SeqCst);
                    }
                }),
            )
            .layer(from_fn_with_state(Role::Candidate, require_role));

        let (status, _) = call(router, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(!reached.load(Ordering::SeqCst));
    }
}
