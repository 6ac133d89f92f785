//! User service for registration and authentication

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::user::{validate_password, validate_username, User, UserId, UserRepository};
use crate::domain::DomainError;

use super::password::PasswordHasher;

/// Request for registering a new user
#[derive(Debug, Clone)]
pub struct RegisterUserRequest {
    pub username: String,
    pub password: String,
}

/// Request for updating a user's password
#[derive(Debug, Clone)]
pub struct UpdatePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

/// User service for registration, login, and password management
#[derive(Debug)]
pub struct UserService<R: UserRepository, H: PasswordHasher> {
    repository: Arc<R>,
    hasher: Arc<H>,
}

impl<R: UserRepository, H: PasswordHasher> UserService<R, H> {
    pub fn new(repository: Arc<R>, hasher: Arc<H>) -> Self {
        Self { repository, hasher }
    }

    /// Register a new user with a generated ID
    pub async fn register(&self, request: RegisterUserRequest) -> Result<User, DomainError> {
        validate_username(&request.username).map_err(|e| DomainError::validation(e.to_string()))?;
        validate_password(&request.password).map_err(|e| DomainError::validation(e.to_string()))?;

        if self.repository.username_exists(&request.username).await? {
            return Err(DomainError::conflict(format!(
                "Username '{}' already exists",
                request.username
            )));
        }

        let user_id = UserId::new(Uuid::new_v4().to_string())
            .map_err(|e| DomainError::invalid_id(e.to_string()))?;

        let password_hash = self.hasher.hash(&request.password)?;

        let user = User::new(user_id, &request.username, password_hash);

        self.repository.create(user).await
    }

    /// Authenticate a user with username and password.
    ///
    /// Unknown usernames and wrong passwords fail with distinct messages
    /// so the client can prompt for registration.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<User, DomainError> {
        let user = self
            .repository
            .get_by_username(username)
            .await?
            .ok_or_else(|| {
                DomainError::unauthorized("User does not exist; please register first")
            })?;

        if !self.hasher.verify(password, user.password_hash()) {
            return Err(DomainError::unauthorized("Incorrect password"));
        }

        if !user.is_active() {
            return Err(DomainError::forbidden("User account is disabled"));
        }

        self.repository.record_login(user.id()).await?;

        // Re-fetch to pick up last_login_at
        self.repository
            .get(user.id())
            .await?
            .ok_or_else(|| DomainError::not_found(format!("User '{}' not found", username)))
    }

    /// Get a user by ID
    pub async fn get(&self, id: &str) -> Result<Option<User>, DomainError> {
        let user_id = UserId::new(id).map_err(|e| DomainError::invalid_id(e.to_string()))?;
        self.repository.get(&user_id).await
    }

    /// Update a user's password after verifying the current one
    pub async fn update_password(
        &self,
        id: &str,
        request: UpdatePasswordRequest,
    ) -> Result<User, DomainError> {
        let user_id = UserId::new(id).map_err(|e| DomainError::invalid_id(e.to_string()))?;

        let mut user = self
            .repository
            .get(&user_id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("User '{}' not found", id)))?;

        if !self.hasher.verify(&request.current_password, user.password_hash()) {
            return Err(DomainError::validation("Current password is incorrect"));
        }

        validate_password(&request.new_password)
            .map_err(|e| DomainError::validation(e.to_string()))?;

        let new_hash = self.hasher.hash(&request.new_password)?;
        user.set_password_hash(new_hash);

        self.repository.update(&user).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::user::password::Argon2Hasher;
    use crate::infrastructure::user::repository::InMemoryUserRepository;

    fn create_service() -> UserService<InMemoryUserRepository, Argon2Hasher> {
        let repository = Arc::new(InMemoryUserRepository::new());
        let hasher = Arc::new(Argon2Hasher::new());
        UserService::new(repository, hasher)
    }

    fn make_request(username: &str, password: &str) -> RegisterUserRequest {
        RegisterUserRequest {
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn test_register_user() {
        let service = create_service();

        let user = service
            .register(make_request("testuser", "secure_password123"))
            .await
            .unwrap();

        assert_eq!(user.username(), "testuser");
        assert!(user.is_active());
        assert!(user.last_login_at().is_none());
        // The stored hash is never the plaintext
        assert_ne!(user.password_hash(), "secure_password123");
    }

    #[tokio::test]
    async fn test_register_chinese_username() {
        let service = create_service();

        let user = service
            .register(make_request("訂閱達人", "secure_password123"))
            .await
            .unwrap();

        assert_eq!(user.username(), "訂閱達人");
    }

    #[tokio::test]
    async fn test_register_invalid_username() {
        let service = create_service();

        // Too short
        let result = service.register(make_request("ab", "secure_password123")).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_register_invalid_password() {
        let service = create_service();

        // Too short
        let result = service.register(make_request("testuser", "short")).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_register_duplicate_username() {
        let service = create_service();

        service
            .register(make_request("testuser", "secure_password123"))
            .await
            .unwrap();

        let result = service
            .register(make_request("testuser", "other_password456"))
            .await;

        assert!(matches!(result, Err(DomainError::Conflict { .. })));
    }

    #[tokio::test]
    async fn test_authenticate_success_records_login() {
        let service = create_service();

        service
            .register(make_request("testuser", "secure_password123"))
            .await
            .unwrap();

        let user = service
            .authenticate("testuser", "secure_password123")
            .await
            .unwrap();

        assert_eq!(user.username(), "testuser");
        assert!(user.last_login_at().is_some());
    }

    #[tokio::test]
    async fn test_authenticate_unknown_user() {
        let service = create_service();

        let result = service.authenticate("nobody", "password123").await;

        assert!(matches!(result, Err(DomainError::Unauthorized { .. })));
    }

    #[tokio::test]
    async fn test_authenticate_wrong_password() {
        let service = create_service();

        service
            .register(make_request("testuser", "secure_password123"))
            .await
            .unwrap();

        let result = service.authenticate("testuser", "wrong_password").await;

        assert!(matches!(result, Err(DomainError::Unauthorized { .. })));
    }

    #[tokio::test]
    async fn test_authenticate_suspended_user() {
        let repository = Arc::new(InMemoryUserRepository::new());
        let hasher = Arc::new(Argon2Hasher::new());
        let service = UserService::new(Arc::clone(&repository), Arc::clone(&hasher));

        let user = service
            .register(make_request("testuser", "secure_password123"))
            .await
            .unwrap();

        let mut suspended = user.clone();
        suspended.suspend();
        repository.update(&suspended).await.unwrap();

        let result = service.authenticate("testuser", "secure_password123").await;

        assert!(matches!(result, Err(DomainError::Forbidden { .. })));
    }

    #[tokio::test]
    async fn test_update_password() {
        let service = create_service();

        let user = service
            .register(make_request("testuser", "old_password123"))
            .await
            .unwrap();

        service
            .update_password(
                user.id().as_str(),
                UpdatePasswordRequest {
                    current_password: "old_password123".to_string(),
                    new_password: "new_password456".to_string(),
                },
            )
            .await
            .unwrap();

        assert!(service
            .authenticate("testuser", "old_password123")
            .await
            .is_err());
        assert!(service
            .authenticate("testuser", "new_password456")
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_update_password_wrong_current() {
        let service = create_service();

        let user = service
            .register(make_request("testuser", "current_password1"))
            .await
            .unwrap();

        let result = service
            .update_password(
                user.id().as_str(),
                UpdatePasswordRequest {
                    current_password: "wrong_current".to_string(),
                    new_password: "new_password456".to_string(),
                },
            )
            .await;

        assert!(matches!(result, Err(DomainError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_update_password_rejects_weak_new_password() {
        let service = create_service();

        let user = service
            .register(make_request("testuser", "current_password1"))
            .await
            .unwrap();

        let result = service
            .update_password(
                user.id().as_str(),
                UpdatePasswordRequest {
                    current_password: "current_password1".to_string(),
                    new_password: "short".to_string(),
                },
            )
            .await;

        assert!(matches!(result, Err(DomainError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_get_by_id() {
        let service = create_service();

        let user = service
            .register(make_request("testuser", "secure_password123"))
            .await
            .unwrap();

        let retrieved = service.get(user.id().as_str()).await.unwrap();
        assert!(retrieved.is_some());

        let missing = service
            .get(&Uuid::new_v4().to_string())
            .await
            .unwrap();
        assert!(missing.is_none());
    }
}
