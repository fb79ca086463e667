//! Registration and login.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::OnceCell;
use tracing::{info, instrument, warn};

use super::{AuthError, PasswordHasher, Role, TokenIssuer};
use crate::db::is_unique_violation;
use crate::user::{NewUser, UserInfo, UserRepository};

/// Plaintext hashed once per process so that a login for an unknown email
/// costs the same bcrypt work as a wrong password.
const TIMING_DUMMY_PASSWORD: &str = "jobboard-timing-dummy";

/// Successful login: a bearer token and the public identity it belongs to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserInfo,
}

/// Orchestrates registration (hash + persist) and login (lookup + verify +
/// issue).
#[derive(Clone)]
pub struct AuthService {
    users: UserRepository,
    hasher: PasswordHasher,
    tokens: TokenIssuer,
    dummy_hash: Arc<OnceCell<String>>,
}

impl AuthService {
    pub fn new(users: UserRepository, hasher: PasswordHasher, tokens: TokenIssuer) -> Self {
        Self {
            users,
            hasher,
            tokens,
            dummy_hash: Arc::new(OnceCell::new()),
        }
    }

    pub fn tokens(&self) -> &TokenIssuer {
        &self.tokens
    }

    /// Register a new user. Returns the public projection, never the hash.
    ///
    /// Duplicate detection is left to the store's UNIQUE constraint, so two
    /// concurrent registrations for one email yield exactly one row.
    #[instrument(skip(self, name, password))]
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
        role: &str,
    ) -> Result<UserInfo, AuthError> {
        let name = required(name, "Name")?;
        let email = normalize_email(email)?;
        required(password, "Password")?;
        let role: Role = role.trim().parse().map_err(AuthError::Validation)?;

        let password_hash = self.hasher.hash_async(password.to_string()).await?;

        let user = self
            .users
            .create(NewUser {
                name: name.to_string(),
                email,
                password_hash,
                role,
            })
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    AuthError::DuplicateEmail
                } else {
                    AuthError::Internal(format!("{:#}", e))
                }
            })?;

        info!(user_id = %user.user_id, role = %user.role, "Registered new user");
        Ok(user.into())
    }

    /// Verify credentials and issue a token.
    ///
    /// Unknown email and wrong password both yield
    /// [`AuthError::InvalidCredentials`].
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, AuthError> {
        let email = normalize_email(email)?;
        required(password, "Password")?;

        let user = self
            .users
            .get_by_email(&email)
            .await
            .map_err(|e| AuthError::Internal(format!("{:#}", e)))?;

        let Some(user) = user else {
            let dummy = self.dummy_hash().await?;
            self.hasher
                .verify_async(password.to_string(), dummy.to_string())
                .await;
            warn!("Login failed: unknown email");
            return Err(AuthError::InvalidCredentials);
        };

        if !self
            .hasher
            .verify_async(password.to_string(), user.password_hash.clone())
            .await
        {
            warn!(user_id = %user.user_id, "Login failed: wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        let token = self.tokens.issue(&user.user_id, user.role)?;
        info!(user_id = %user.user_id, "User logged in");

        Ok(LoginResponse {
            token,
            user: user.into(),
        })
    }

    /// Load the public projection of an authenticated caller.
    ///
    /// A valid token for a user that no longer exists is treated as
    /// unauthenticated.
    #[instrument(skip(self))]
    pub async fn me(&self, user_id: &str) -> Result<UserInfo, AuthError> {
        self.users
            .get(user_id)
            .await
            .map_err(|e| AuthError::Internal(format!("{:#}", e)))?
            .map(UserInfo::from)
            .ok_or_else(|| AuthError::InvalidToken("user no longer exists".to_string()))
    }

    async fn dummy_hash(&self) -> Result<&str, AuthError> {
        let hasher = self.hasher;
        self.dummy_hash
            .get_or_try_init(|| hasher.hash_async(TIMING_DUMMY_PASSWORD.to_string()))
            .await
            .map(String::as_str)
    }
}

fn required<'a>(value: &'a str, field: &str) -> Result<&'a str, AuthError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AuthError::Validation(format!("{} is required", field)));
    }
    Ok(trimmed)
}

/// Trim and lowercase an email, rejecting values without a `local@domain`
/// shape.
fn normalize_email(email: &str) -> Result<String, AuthError> {
    let email = required(email, "Email")?.to_lowercase();

    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    };
    if !valid {
        return Err(AuthError::Validation(
            "Please provide a valid email".to_string(),
        ));
    }

    Ok(email)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tokio::sync::Barrier;

    use super::*;
    use crate::db::Database;

    const SECRET: &[u8] = b"service-test-secret-at-least-32-characters";

    async fn service() -> AuthService {
        let db = Database::in_memory().await.unwrap();
        AuthService::new(
            UserRepository::new(db.pool().clone()),
            PasswordHasher::new(4),
            TokenIssuer::new(SECRET, 3600),
        )
    }

    #[tokio::test]
    async fn test_register_then_login_round_trip() {
        let service = service().await;

        for (email, role) in [("admin@x.io", Role::Admin), ("cand@x.io", Role::Candidate)] {
            let user = service
                .register("Ada", email, "hunter22", role.as_str())
                .await
                .unwrap();
            assert_eq!(user.role, role);
            assert_eq!(user.email, email);

            let login = service.login(email, "hunter22").await.unwrap();
            assert_eq!(login.user, user);

            let claims = service.tokens().verify(&login.token).unwrap();
            assert_eq!(claims.user_id, user.user_id);
            assert_eq!(claims.role, role);
        }
    }

    #[tokio::test]
    async fn test_register_validation() {
        let service = service().await;

        let cases = [
            ("", "a@x.io", "pw", "admin"),
            ("   ", "a@x.io", "pw", "admin"),
            ("Ada", "", "pw", "admin"),
            ("Ada", "not-an-email", "pw", "admin"),
            ("Ada", "a@x.io", "   ", "admin"),
            ("Ada", "a@x.io", "pw", "superuser"),
            ("Ada", "a@x.io", "pw", "Admin"),
            ("Ada", "a@x.io", "pw", ""),
        ];

        for (name, email, password, role) in cases {
            let err = service
                .register(name, email, password, role)
                .await
                .unwrap_err();
            assert!(
                matches!(err, AuthError::Validation(_)),
                "{name:?}/{email:?}/{password:?}/{role:?} gave {err:?}"
            );
        }
    }

    #[tokio::test]
    async fn test_email_is_normalized() {
        let service = service().await;

        let user = service
            .register("Ada", "  Ada@Example.COM ", "pw", "candidate")
            .await
            .unwrap();
        assert_eq!(user.email, "ada@example.com");

        assert!(service.login("ADA@example.com", "pw").await.is_ok());
        assert!(matches!(
            service
                .register("Other", "ada@EXAMPLE.com", "pw", "admin")
                .await,
            Err(AuthError::DuplicateEmail)
        ));
    }

    #[tokio::test]
    async fn test_duplicate_email() {
        let service = service().await;

        service
            .register("Ada", "dup@x.io", "pw1", "admin")
            .await
            .unwrap();
        let err = service
            .register("Bob", "dup@x.io", "pw2", "candidate")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::DuplicateEmail));

        // The first registration still logs in.
        assert!(service.login("dup@x.io", "pw1").await.is_ok());
    }

    #[tokio::test]
    async fn test_concurrent_duplicate_registration() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::new(&dir.path().join("race.db"), 8).await.unwrap();
        let service = AuthService::new(
            UserRepository::new(db.pool().clone()),
            PasswordHasher::new(4),
            TokenIssuer::new(SECRET, 3600),
        );

        const ATTEMPTS: usize = 8;
        let barrier = Arc::new(Barrier::new(ATTEMPTS));
        let mut handles = Vec::with_capacity(ATTEMPTS);

        for i in 0..ATTEMPTS {
            let service = service.clone();
            let barrier = barrier.clone();
            handles.push(tokio::spawn(async move {
                barrier.wait().await;
                service
                    .register(&format!("User {i}"), "race@x.io", "pw", "candidate")
                    .await
            }));
        }

        let mut created = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => created += 1,
                Err(AuthError::DuplicateEmail) => {}
                Err(other) => panic!("unexpected error: {other:?}"),
            }
        }
        assert_eq!(created, 1);

        let (rows,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users WHERE email = ?")
            .bind("race@x.io")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(rows, 1);
    }

    #[tokio::test]
    async fn test_login_failures_are_indistinguishable() {
        let service = service().await;
        service
            .register("Ada", "ada@x.io", "right", "candidate")
            .await
            .unwrap();

        let wrong_password = service.login("ada@x.io", "wrong").await.unwrap_err();
        let unknown_email = service.login("nobody@x.io", "right").await.unwrap_err();

        assert!(matches!(wrong_password, AuthError::InvalidCredentials));
        assert!(matches!(unknown_email, AuthError::InvalidCredentials));
        assert_eq!(wrong_password.to_string(), unknown_email.to_string());
    }

    #[tokio::test]
    async fn test_password_is_not_trimmed() {
        let service = service().await;
        service
            .register("Ada", "ada@x.io", " padded ", "candidate")
            .await
            .unwrap();

        assert!(service.login("ada@x.io", " padded ").await.is_ok());
        assert!(matches!(
            service.login("ada@x.io", "padded").await,
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_me() {
        let service = service().await;
        let user = service
            .register("Ada", "ada@x.io", "pw", "admin")
            .await
            .unwrap();

        assert_eq!(service.me(&user.user_id).await.unwrap(), user);
        assert!(service.me("usr_gone").await.unwrap_err().is_unauthenticated());
    }
}
