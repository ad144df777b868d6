//! Account authentication and registration behind repository and hasher
//! ports. The HTTP layer turns a successful login into a session identity.

use std::sync::Arc;

use async_trait::async_trait;
use opencourse_core::{AppResult, Role};
use opencourse_domain::{EmailAddress, UserId, validate_password};

/// Stored account record as the user repository returns it.
#[derive(Debug, Clone)]
pub struct UserRecord {
    /// Stable account identifier.
    pub id: UserId,
    /// Normalized email address.
    pub email: String,
    /// Optional display name shown on course records.
    pub display_name: Option<String>,
    /// Role tier.
    pub role: Role,
    /// Argon2id password hash.
    pub password_hash: String,
}

/// Outcome of a credential check.
#[derive(Debug, Clone)]
pub enum AuthOutcome {
    /// Credentials matched a stored account.
    Authenticated(UserRecord),
    /// Unknown email or wrong password; deliberately indistinguishable.
    Failed,
}

/// Repository port for account records.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Finds an account by email, case-insensitively.
    async fn find_by_email(&self, email: &str) -> AppResult<Option<UserRecord>>;

    /// Creates an account and returns its identifier.
    async fn create(
        &self,
        email: &str,
        display_name: Option<&str>,
        role: Role,
        password_hash: &str,
    ) -> AppResult<UserId>;
}

/// Password hashing port.
pub trait PasswordHasher: Send + Sync {
    /// Hashes a plaintext password for storage.
    fn hash_password(&self, password: &str) -> AppResult<String>;

    /// Verifies a plaintext password against a stored hash.
    fn verify_password(&self, password: &str, hash: &str) -> AppResult<bool>;
}

/// Validated input for account creation.
#[derive(Debug)]
pub struct RegisterParams {
    /// Requested email address.
    pub email: String,
    /// Plaintext password; validated and hashed before storage.
    pub password: String,
    /// Optional display name.
    pub display_name: Option<String>,
    /// Role to provision. Self-service registration always passes `Student`.
    pub role: Role,
}

/// Application service for login and registration.
#[derive(Clone)]
pub struct UserService {
    user_repository: Arc<dyn UserRepository>,
    password_hasher: Arc<dyn PasswordHasher>,
}

impl UserService {
    /// Creates a user service from its ports.
    #[must_use]
    pub fn new(
        user_repository: Arc<dyn UserRepository>,
        password_hasher: Arc<dyn PasswordHasher>,
    ) -> Self {
        Self {
            user_repository,
            password_hasher,
        }
    }

    /// Authenticates an account with email and password.
    ///
    /// Returns [`AuthOutcome::Failed`] for unknown email and wrong password
    /// alike, so callers cannot enumerate accounts.
    pub async fn login(&self, email: &str, password: &str) -> AppResult<AuthOutcome> {
        let Some(user) = self.user_repository.find_by_email(email).await? else {
            // Hash anyway so unknown-email and wrong-password take
            // comparable time.
            let _ = self.password_hasher.hash_password(password);
            return Ok(AuthOutcome::Failed);
        };

        if self
            .password_hasher
            .verify_password(password, &user.password_hash)?
        {
            Ok(AuthOutcome::Authenticated(user))
        } else {
            Ok(AuthOutcome::Failed)
        }
    }

    /// Creates an account after validating email shape and password strength.
    pub async fn register(&self, params: RegisterParams) -> AppResult<UserId> {
        let email = EmailAddress::new(params.email)?;
        validate_password(&params.password)?;

        let password_hash = self.password_hasher.hash_password(&params.password)?;

        self.user_repository
            .create(
                email.as_str(),
                params.display_name.as_deref(),
                params.role,
                &password_hash,
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use opencourse_core::{AppError, AppResult, Role};
    use opencourse_domain::UserId;
    use tokio::sync::Mutex;

    use super::*;

    /// Reversible stand-in hasher; hashes are `hashed:<password>`.
    struct StubPasswordHasher;

    impl PasswordHasher for StubPasswordHasher {
        fn hash_password(&self, password: &str) -> AppResult<String> {
            Ok(format!("hashed:{password}"))
        }

        fn verify_password(&self, password: &str, hash: &str) -> AppResult<bool> {
            Ok(hash == format!("hashed:{password}"))
        }
    }

    #[derive(Default)]
    struct InMemoryUserRepository {
        users: Mutex<Vec<UserRecord>>,
    }

    #[async_trait::async_trait]
    impl UserRepository for InMemoryUserRepository {
        async fn find_by_email(&self, email: &str) -> AppResult<Option<UserRecord>> {
            Ok(self
                .users
                .lock()
                .await
                .iter()
                .find(|user| user.email.eq_ignore_ascii_case(email))
                .cloned())
        }

        async fn create(
            &self,
            email: &str,
            display_name: Option<&str>,
            role: Role,
            password_hash: &str,
        ) -> AppResult<UserId> {
            let mut users = self.users.lock().await;
            if users.iter().any(|user| user.email == email) {
                return Err(AppError::Conflict(
                    "an account with this email already exists".to_owned(),
                ));
            }

            let id = UserId::new();
            users.push(UserRecord {
                id,
                email: email.to_owned(),
                display_name: display_name.map(ToOwned::to_owned),
                role,
                password_hash: password_hash.to_owned(),
            });
            Ok(id)
        }
    }

    fn service() -> (UserService, Arc<InMemoryUserRepository>) {
        let repository = Arc::new(InMemoryUserRepository::default());
        (
            UserService::new(repository.clone(), Arc::new(StubPasswordHasher)),
            repository,
        )
    }

    fn valid_registration() -> RegisterParams {
        RegisterParams {
            email: "bob@example.com".to_owned(),
            password: "a-long-enough-password".to_owned(),
            display_name: Some("Bob".to_owned()),
            role: Role::Student,
        }
    }

    #[tokio::test]
    async fn register_then_login_succeeds() {
        let (service, _) = service();
        assert!(service.register(valid_registration()).await.is_ok());

        let outcome = service
            .login("bob@example.com", "a-long-enough-password")
            .await;
        assert!(matches!(outcome, Ok(AuthOutcome::Authenticated(_))));
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_email_fail_identically() {
        let (service, _) = service();
        assert!(service.register(valid_registration()).await.is_ok());

        let wrong_password = service.login("bob@example.com", "not-the-password").await;
        let unknown_email = service.login("nobody@example.com", "whatever-here").await;

        assert!(matches!(wrong_password, Ok(AuthOutcome::Failed)));
        assert!(matches!(unknown_email, Ok(AuthOutcome::Failed)));
    }

    #[tokio::test]
    async fn register_normalizes_the_email() {
        let (service, repository) = service();
        let mut params = valid_registration();
        params.email = "  BOB@Example.COM ".to_owned();

        assert!(service.register(params).await.is_ok());
        let users = repository.users.lock().await;
        assert_eq!(users[0].email, "bob@example.com");
    }

    #[tokio::test]
    async fn register_rejects_weak_passwords_and_bad_emails() {
        let (service, _) = service();

        let mut weak = valid_registration();
        weak.password = "short".to_owned();
        assert!(matches!(
            service.register(weak).await,
            Err(AppError::Validation(_))
        ));

        let mut malformed = valid_registration();
        malformed.email = "not-an-email".to_owned();
        assert!(matches!(
            service.register(malformed).await,
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn duplicate_email_is_a_conflict() {
        let (service, _) = service();
        assert!(service.register(valid_registration()).await.is_ok());
        assert!(matches!(
            service.register(valid_registration()).await,
            Err(AppError::Conflict(_))
        ));
    }
}
