//! Identity use-cases: login, admin-gated user creation and first-start seeding.
//!
//! HTTP handlers and the seed step at startup both go through [`UserService`].

use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::{
    CreateUserDto, DomainError, DomainResult, User, UserRepositoryInterface, UserRole,
};
use crate::infrastructure::crypto::jwt::{create_token, JwtConfig};
use crate::infrastructure::crypto::password::{hash_password, verify_password, MAX_PASSWORD_BYTES};
use crate::shared::InfraError;

const INVALID_CREDENTIALS: &str = "Invalid credentials";

/// Authentication result returned after a successful login
#[derive(Debug, Clone)]
pub struct AuthResult {
    pub token: String,
    pub role: UserRole,
    pub expires_in: i64,
    pub user: User,
}

/// Fields of a user creation request, after JSON decoding
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub role: UserRole,
}

/// Identity service, generic over the user repository.
pub struct UserService<R: UserRepositoryInterface> {
    repo: Arc<R>,
    jwt_config: JwtConfig,
    bcrypt_cost: u32,
    /// Verified against on unknown usernames so both login failures cost one bcrypt check.
    decoy_hash: Option<String>,
}

impl<R: UserRepositoryInterface> UserService<R> {
    pub fn new(repo: Arc<R>, jwt_config: JwtConfig, bcrypt_cost: u32) -> Self {
        let decoy_hash = match hash_password(&uuid::Uuid::new_v4().to_string(), bcrypt_cost) {
            Ok(hash) => Some(hash),
            Err(e) => {
                warn!(error = %e, "Could not prepare decoy password hash");
                None
            }
        };
        Self {
            repo,
            jwt_config,
            bcrypt_cost,
            decoy_hash,
        }
    }

    pub fn jwt_config(&self) -> &JwtConfig {
        &self.jwt_config
    }

    // ── Authentication ──────────────────────────────────────────

    /// Verify credentials and issue a signed token.
    ///
    /// Unknown usernames and wrong passwords produce the same error.
    pub async fn login(&self, username: &str, password: &str) -> DomainResult<AuthResult> {
        let Some(user) = self.repo.get_user_by_username(username).await? else {
            if let Some(decoy) = &self.decoy_hash {
                let _ = verify_password(password, decoy);
            }
            info!(username, "Login rejected: unknown user");
            return Err(DomainError::Unauthorized(INVALID_CREDENTIALS.into()));
        };

        let valid = verify_password(password, &user.password_hash).unwrap_or_else(|e| {
            warn!(user_id = %user.id, error = %e, "Stored password hash is unreadable");
            false
        });
        if !valid {
            info!(username, "Login rejected: wrong password");
            return Err(DomainError::Unauthorized(INVALID_CREDENTIALS.into()));
        }

        let token = create_token(&user.id, &user.username, user.role, &self.jwt_config)
            .map_err(InfraError::from)?;

        info!(user_id = %user.id, role = %user.role, "Login succeeded");
        Ok(AuthResult {
            token,
            role: user.role,
            expires_in: self.jwt_config.expiration_hours * 3600,
            user,
        })
    }

    // ── User creation ───────────────────────────────────────────

    /// Create a user on behalf of `actor_role`. Only admins may do this.
    pub async fn create_user(&self, actor_role: UserRole, new_user: NewUser) -> DomainResult<User> {
        if !actor_role.is_admin() {
            return Err(DomainError::Forbidden("Only admins can create users".into()));
        }
        self.insert_user(new_user).await
    }

    async fn insert_user(&self, new_user: NewUser) -> DomainResult<User> {
        let username = new_user.username.trim();
        if username.is_empty() {
            return Err(DomainError::Validation("Username is required".into()));
        }
        if new_user.password.is_empty() {
            return Err(DomainError::Validation("Password is required".into()));
        }
        if new_user.password.len() > MAX_PASSWORD_BYTES {
            return Err(DomainError::Validation(format!(
                "Password must be at most {MAX_PASSWORD_BYTES} bytes"
            )));
        }

        // Cheap pre-check; the unique index still decides under races.
        if self.repo.get_user_by_username(username).await?.is_some() {
            return Err(DomainError::Conflict("Username already exists".into()));
        }

        let password_hash =
            hash_password(&new_user.password, self.bcrypt_cost).map_err(InfraError::from)?;

        let user = self
            .repo
            .create_user(CreateUserDto {
                username: username.to_string(),
                password_hash,
                role: new_user.role,
            })
            .await?;

        info!(user_id = %user.id, username = %user.username, role = %user.role, "User created");
        Ok(user)
    }

    // ── Seeding ─────────────────────────────────────────────────

    /// Insert the given accounts when no admin exists yet.
    ///
    /// Returns the number of accounts created; zero when an admin is already
    /// present, which makes repeated starts idempotent.
    pub async fn seed_if_no_admin(&self, accounts: Vec<NewUser>) -> DomainResult<usize> {
        if self.repo.count_by_role(UserRole::Admin).await? > 0 {
            return Ok(0);
        }

        let mut created = 0;
        for account in accounts {
            match self.insert_user(account).await {
                Ok(_) => created += 1,
                Err(DomainError::Conflict(_)) => {}
                Err(e) => return Err(e),
            }
        }
        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::Utc;

    use super::*;
    use crate::infrastructure::crypto::jwt::verify_token;

    /// Vec-backed repository so service rules can be tested without SQLite
    #[derive(Default)]
    struct FakeRepo {
        users: Mutex<Vec<User>>,
    }

    #[async_trait]
    impl UserRepositoryInterface for FakeRepo {
        async fn create_user(&self, dto: CreateUserDto) -> DomainResult<User> {
            let mut users = self.users.lock().unwrap();
            if users.iter().any(|u| u.username == dto.username) {
                return Err(DomainError::Conflict("Username already exists".into()));
            }
            let user = User {
                id: format!("id-{}", users.len() + 1),
                username: dto.username,
                password_hash: dto.password_hash,
                role: dto.role,
                created_at: Utc::now(),
            };
            users.push(user.clone());
            Ok(user)
        }

        async fn get_user_by_username(&self, username: &str) -> DomainResult<Option<User>> {
            let users = self.users.lock().unwrap();
            Ok(users.iter().find(|u| u.username == username).cloned())
        }

        async fn count_by_role(&self, role: UserRole) -> DomainResult<u64> {
            let users = self.users.lock().unwrap();
            Ok(users.iter().filter(|u| u.role == role).count() as u64)
        }
    }

    fn service() -> UserService<FakeRepo> {
        let jwt = JwtConfig {
            secret: "unit-secret".into(),
            expiration_hours: 24,
            issuer: "service-monitor".into(),
        };
        UserService::new(Arc::new(FakeRepo::default()), jwt, 4)
    }

    fn new_user(username: &str, password: &str, role: UserRole) -> NewUser {
        NewUser {
            username: username.into(),
            password: password.into(),
            role,
        }
    }

    #[tokio::test]
    async fn login_issues_token_with_role() {
        let svc = service();
        svc.create_user(UserRole::Admin, new_user("ops", "pw", UserRole::Reader))
            .await
            .unwrap();

        let result = svc.login("ops", "pw").await.unwrap();
        assert_eq!(result.role, UserRole::Reader);
        assert_eq!(result.expires_in, 86_400);

        let claims = verify_token(&result.token, svc.jwt_config()).unwrap();
        assert_eq!(claims.sub, result.user.id);
        assert_eq!(claims.role, UserRole::Reader);
    }

    #[tokio::test]
    async fn login_failures_are_indistinguishable() {
        let svc = service();
        svc.create_user(UserRole::Admin, new_user("ops", "pw", UserRole::Reader))
            .await
            .unwrap();

        let unknown = svc.login("nobody", "pw").await.unwrap_err();
        let wrong = svc.login("ops", "nope").await.unwrap_err();
        assert!(matches!(unknown, DomainError::Unauthorized(_)));
        assert_eq!(unknown.to_string(), wrong.to_string());
    }

    #[tokio::test]
    async fn passwords_are_hashed() {
        let svc = service();
        let user = svc
            .create_user(UserRole::Admin, new_user("ops", "plaintext", UserRole::Admin))
            .await
            .unwrap();
        assert_ne!(user.password_hash, "plaintext");
        assert!(user.password_hash.starts_with("$2"));
    }

    #[tokio::test]
    async fn readers_cannot_create_users() {
        let svc = service();
        let err = svc
            .create_user(UserRole::Reader, new_user("x", "pw", UserRole::Reader))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));
        assert!(svc.login("x", "pw").await.is_err());
    }

    #[tokio::test]
    async fn duplicate_username_conflicts() {
        let svc = service();
        svc.create_user(UserRole::Admin, new_user("dup", "first", UserRole::Reader))
            .await
            .unwrap();
        let err = svc
            .create_user(UserRole::Admin, new_user("dup", "second", UserRole::Admin))
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::Conflict(_)));
        assert_eq!(svc.login("dup", "first").await.unwrap().role, UserRole::Reader);
        assert!(svc.login("dup", "second").await.is_err());
    }

    #[tokio::test]
    async fn blank_fields_are_rejected() {
        let svc = service();
        let err = svc
            .create_user(UserRole::Admin, new_user("  ", "pw", UserRole::Reader))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        let err = svc
            .create_user(UserRole::Admin, new_user("someone", "", UserRole::Reader))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[tokio::test]
    async fn overlong_passwords_are_rejected() {
        let svc = service();
        let long = format!("{}SECRET-TAIL-0123456789", "a".repeat(72));
        let err = svc
            .create_user(UserRole::Admin, new_user("long", &long, UserRole::Reader))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        assert!(svc.login("long", &long).await.is_err());

        // 72 bytes is still accepted, counted in bytes rather than characters
        let exact = "a".repeat(72);
        svc.create_user(UserRole::Admin, new_user("exact", &exact, UserRole::Reader))
            .await
            .unwrap();
        assert!(svc.login("exact", &exact).await.is_ok());

        let wide = "é".repeat(37);
        let err = svc
            .create_user(UserRole::Admin, new_user("wide", &wide, UserRole::Reader))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[tokio::test]
    async fn unknown_user_pays_for_a_hash_check() {
        let jwt = JwtConfig {
            secret: "unit-secret".into(),
            expiration_hours: 24,
            issuer: "service-monitor".into(),
        };
        let svc = UserService::new(Arc::new(FakeRepo::default()), jwt, 10);
        assert!(svc.decoy_hash.as_deref().is_some_and(|h| h.starts_with("$2b$10$")));

        svc.create_user(UserRole::Admin, new_user("ops", "pw", UserRole::Reader))
            .await
            .unwrap();

        let timed = |username: &'static str| {
            let svc = &svc;
            async move {
                let start = std::time::Instant::now();
                for _ in 0..3 {
                    assert!(svc.login(username, "nope").await.is_err());
                }
                start.elapsed()
            }
        };
        let unknown = timed("nobody").await;
        let wrong = timed("ops").await;
        assert!(
            unknown * 4 >= wrong,
            "unknown user took {unknown:?}, wrong password took {wrong:?}"
        );
    }

    #[tokio::test]
    async fn seeding_runs_once() {
        let svc = service();
        let accounts = || {
            vec![
                new_user("admin", "admin123", UserRole::Admin),
                new_user("reader", "reader123", UserRole::Reader),
            ]
        };

        assert_eq!(svc.seed_if_no_admin(accounts()).await.unwrap(), 2);
        assert_eq!(svc.seed_if_no_admin(accounts()).await.unwrap(), 0);
        assert_eq!(svc.login("admin", "admin123").await.unwrap().role, UserRole::Admin);
        assert_eq!(svc.login("reader", "reader123").await.unwrap().role, UserRole::Reader);
    }
}
