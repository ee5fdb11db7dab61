use std::sync::Arc;

use async_trait::async_trait;
use auth::AuthenticationError;
use auth::Authenticator;
use chrono::Utc;

use crate::domain::user::models::CreateUserCommand;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::LoginCommand;
use crate::domain::user::models::Password;
use crate::domain::user::models::Profile;
use crate::domain::user::models::Role;
use crate::domain::user::models::Session;
use crate::domain::user::models::SignupCommand;
use crate::domain::user::models::UpdateUserCommand;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::models::Username;
use crate::user::errors::UserError;
use crate::user::ports::UserRepository;
use crate::user::ports::UserServicePort;

/// Domain service implementation for user operations.
///
/// Argon2 work is moved onto the blocking pool so a slow hash never stalls
/// the request workers.
pub struct UserService<UR>
where
    UR: UserRepository,
{
    repository: Arc<UR>,
    authenticator: Arc<Authenticator>,
}

impl<UR> UserService<UR>
where
    UR: UserRepository,
{
    /// Create a new user service with injected dependencies.
    ///
    /// # Arguments
    /// * `repository` - Credential store implementation
    /// * `authenticator` - Password hashing and token issuance
    pub fn new(repository: Arc<UR>, authenticator: Arc<Authenticator>) -> Self {
        Self {
            repository,
            authenticator,
        }
    }

    async fn hash_password(&self, password: Password) -> Result<String, UserError> {
        let authenticator = Arc::clone(&self.authenticator);

        tokio::task::spawn_blocking(move || authenticator.hash_password(password.expose()))
            .await
            .map_err(|e| UserError::Unknown(format!("Password hashing task failed: {}", e)))?
            .map_err(|e| UserError::Password(e.to_string()))
    }

    async fn insert_user(
        &self,
        username: Username,
        email: EmailAddress,
        password: Password,
        role: Role,
        profile: Profile,
    ) -> Result<User, UserError> {
        let password_hash = self.hash_password(password).await?;

        let user = User {
            id: UserId::new(),
            username,
            email,
            password_hash,
            role,
            profile,
            created_at: Utc::now(),
        };

        self.repository.create(user).await
    }
}

#[async_trait]
impl<UR> UserServicePort for UserService<UR>
where
    UR: UserRepository,
{
    async fn signup(&self, command: SignupCommand) -> Result<User, UserError> {
        let user = self
            .insert_user(
                command.username,
                command.email,
                command.password,
                Role::User,
                command.profile,
            )
            .await?;

        tracing::info!(user_id = %user.id, role = %user.role, "User signed up");

        Ok(user)
    }

    async fn login(&self, command: LoginCommand) -> Result<Session, UserError> {
        let email = command.email.trim();

        let user = self
            .repository
            .find_by_email(email)
            .await?
            .ok_or_else(|| UserError::NotFoundByEmail(email.to_string()))?;

        let authenticator = Arc::clone(&self.authenticator);
        let password_hash = user.password_hash.clone();
        let identity = user.identity();
        let password = command.password;

        let result = tokio::task::spawn_blocking(move || {
            authenticator.authenticate(password.expose(), &password_hash, &identity)
        })
        .await
        .map_err(|e| UserError::Unknown(format!("Password verification task failed: {}", e)))?
        .map_err(|e| match e {
            AuthenticationError::InvalidCredentials => {
                tracing::warn!(user_id = %user.id, "Login rejected: invalid credentials");
                UserError::InvalidCredentials
            }
            AuthenticationError::PasswordError(err) => UserError::Password(err.to_string()),
            AuthenticationError::TokenError(err) => UserError::Token(err.to_string()),
        })?;

        tracing::info!(user_id = %user.id, role = %user.role, "User logged in");

        Ok(Session {
            user,
            token: result.access_token,
            claims: result.claims,
        })
    }

    async fn create_user(&self, command: CreateUserCommand) -> Result<User, UserError> {
        let user = self
            .insert_user(
                command.username,
                command.email,
                command.password,
                command.role,
                command.profile,
            )
            .await?;

        tracing::info!(user_id = %user.id, role = %user.role, "User created");

        Ok(user)
    }

    async fn get_user(&self, id: &UserId) -> Result<User, UserError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or(UserError::NotFound(id.to_string()))
    }

    async fn list_users(&self) -> Result<Vec<User>, UserError> {
        self.repository.list_all().await
    }

    async fn update_user(
        &self,
        id: &UserId,
        command: UpdateUserCommand,
    ) -> Result<User, UserError> {
        let mut user = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or(UserError::NotFound(id.to_string()))?;

        if let Some(new_username) = command.username {
            user.username = new_username;
        }

        if let Some(new_email) = command.email {
            user.email = new_email;
        }

        if let Some(new_role) = command.role {
            user.role = new_role;
        }

        if let Some(location) = command.location {
            user.profile.location = location;
        }

        if let Some(country) = command.country {
            user.profile.country = country;
        }

        if let Some(gender) = command.gender {
            user.profile.gender = gender;
        }

        if let Some(new_password) = command.password {
            user.password_hash = self.hash_password(new_password).await?;
        }

        let updated_user = self.repository.update(user).await?;

        tracing::info!(user_id = %updated_user.id, role = %updated_user.role, "User updated");

        Ok(updated_user)
    }

    async fn delete_user(&self, id: &UserId) -> Result<(), UserError> {
        self.repository.delete(id).await?;

        tracing::info!(user_id = %id, "User deleted");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use mockall::mock;

    use super::*;

    mock! {
        pub TestUserRepository {}

        #[async_trait]
        impl UserRepository for TestUserRepository {
            async fn create(&self, user: User) -> Result<User, UserError>;
            async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError>;
            async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserError>;
            async fn list_all(&self) -> Result<Vec<User>, UserError>;
            async fn update(&self, user: User) -> Result<User, UserError>;
            async fn delete(&self, id: &UserId) -> Result<(), UserError>;
        }
    }

    const SECRET: &[u8] = b"test-secret-key-for-jwt-signing-at-least-32-bytes";

    fn authenticator() -> Arc<Authenticator> {
        Arc::new(Authenticator::new(SECRET))
    }

    fn alice_profile() -> Profile {
        Profile {
            location: "X".to_string(),
            country: "Y".to_string(),
            gender: "f".to_string(),
        }
    }

    fn signup_command() -> SignupCommand {
        SignupCommand {
            username: Username::new("alice".to_string()).unwrap(),
            email: EmailAddress::new("alice@x.com".to_string()).unwrap(),
            password: Password::new("secret123".to_string()),
            profile: alice_profile(),
        }
    }

    fn stored_user(authenticator: &Authenticator, password: &str, role: Role) -> User {
        User {
            id: UserId::new(),
            username: Username::new("alice".to_string()).unwrap(),
            email: EmailAddress::new("alice@x.com".to_string()).unwrap(),
            password_hash: authenticator.hash_password(password).unwrap(),
            role,
            profile: alice_profile(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_signup_hashes_password_and_defaults_role() {
        let mut repository = MockTestUserRepository::new();

        repository
            .expect_create()
            .withf(|user| {
                user.username.as_str() == "alice"
                    && user.email.as_str() == "alice@x.com"
                    && user.role == Role::User
                    && user.password_hash != "secret123"
                    && user.password_hash.starts_with("$argon2")
                    && user.profile.country == "Y"
            })
            .times(1)
            .returning(|user| Ok(user));

        let authenticator = authenticator();
        let service = UserService::new(Arc::new(repository), Arc::clone(&authenticator));

        let user = service.signup(signup_command()).await.unwrap();

        assert_eq!(user.role, Role::User);
        assert!(authenticator
            .verify_password("secret123", &user.password_hash)
            .unwrap());
    }

    #[tokio::test]
    async fn test_signup_twice_produces_different_hashes() {
        let mut repository = MockTestUserRepository::new();
        repository.expect_create().times(2).returning(|user| Ok(user));

        let service = UserService::new(Arc::new(repository), authenticator());

        let first = service.signup(signup_command()).await.unwrap();
        let second = service.signup(signup_command()).await.unwrap();

        assert_ne!(first.password_hash, second.password_hash);
    }

    #[tokio::test]
    async fn test_signup_duplicate_email() {
        let mut repository = MockTestUserRepository::new();

        repository.expect_create().times(1).returning(|user| {
            Err(UserError::EmailAlreadyExists(
                user.email.as_str().to_string(),
            ))
        });

        let service = UserService::new(Arc::new(repository), authenticator());

        let result = service.signup(signup_command()).await;
        assert!(matches!(result, Err(UserError::EmailAlreadyExists(_))));
    }

    #[tokio::test]
    async fn test_login_success_issues_user_token() {
        let authenticator = authenticator();
        let user = stored_user(&authenticator, "secret123", Role::User);
        let user_id = user.id;

        let mut repository = MockTestUserRepository::new();
        repository
            .expect_find_by_email()
            .times(1)
            .returning(move |_| Ok(Some(user.clone())));

        let service = UserService::new(Arc::new(repository), Arc::clone(&authenticator));

        let session = service
            .login(LoginCommand {
                email: "alice@x.com".to_string(),
                password: Password::new("secret123".to_string()),
            })
            .await
            .unwrap();

        assert_eq!(session.user.id, user_id);
        let claims = authenticator.validate_token(&session.token).unwrap();
        assert_eq!(claims.role, Role::User);
        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(claims.email, "alice@x.com");
        assert_eq!(claims, session.claims);
    }

    #[tokio::test]
    async fn test_login_unknown_email() {
        let mut repository = MockTestUserRepository::new();
        repository
            .expect_find_by_email()
            .times(1)
            .returning(|_| Ok(None));

        let service = UserService::new(Arc::new(repository), authenticator());

        let result = service
            .login(LoginCommand {
                email: "nobody@x.com".to_string(),
                password: Password::new("secret123".to_string()),
            })
            .await;

        assert!(matches!(result, Err(UserError::NotFoundByEmail(_))));
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let authenticator = authenticator();
        let user = stored_user(&authenticator, "secret123", Role::User);

        let mut repository = MockTestUserRepository::new();
        repository
            .expect_find_by_email()
            .times(1)
            .returning(move |_| Ok(Some(user.clone())));

        let service = UserService::new(Arc::new(repository), authenticator);

        let result = service
            .login(LoginCommand {
                email: "alice@x.com".to_string(),
                password: Password::new("wrong".to_string()),
            })
            .await;

        assert!(matches!(result, Err(UserError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_create_user_keeps_requested_role() {
        let mut repository = MockTestUserRepository::new();
        repository
            .expect_create()
            .withf(|user| user.role == Role::Admin)
            .times(1)
            .returning(|user| Ok(user));

        let service = UserService::new(Arc::new(repository), authenticator());

        let user = service
            .create_user(CreateUserCommand {
                username: Username::new("root".to_string()).unwrap(),
                email: EmailAddress::new("root@x.com".to_string()).unwrap(),
                password: Password::new("changeme".to_string()),
                role: Role::Admin,
                profile: Profile::default(),
            })
            .await
            .unwrap();

        assert_eq!(user.role, Role::Admin);
    }

    #[tokio::test]
    async fn test_get_user_not_found() {
        let mut repository = MockTestUserRepository::new();
        repository.expect_find_by_id().times(1).returning(|_| Ok(None));

        let service = UserService::new(Arc::new(repository), authenticator());

        let result = service.get_user(&UserId::new()).await;
        assert!(matches!(result, Err(UserError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_update_user_rehashes_password_and_changes_role() {
        let authenticator = authenticator();
        let user = stored_user(&authenticator, "secret123", Role::User);
        let old_hash = user.password_hash.clone();

        let mut repository = MockTestUserRepository::new();
        repository
            .expect_find_by_id()
            .times(1)
            .returning(move |_| Ok(Some(user.clone())));
        repository
            .expect_update()
            .withf(move |user| {
                user.role == Role::Admin
                    && user.password_hash != old_hash
                    && user.profile.location == "Library"
                    && user.profile.country == "Y"
            })
            .times(1)
            .returning(|user| Ok(user));

        let service = UserService::new(Arc::new(repository), Arc::clone(&authenticator));

        let updated = service
            .update_user(
                &UserId::new(),
                UpdateUserCommand {
                    password: Some(Password::new("new-secret".to_string())),
                    role: Some(Role::Admin),
                    location: Some("Library".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert!(authenticator
            .verify_password("new-secret", &updated.password_hash)
            .unwrap());
    }

    #[tokio::test]
    async fn test_delete_user_not_found() {
        let mut repository = MockTestUserRepository::new();
        repository
            .expect_delete()
            .times(1)
            .returning(|id| Err(UserError::NotFound(id.to_string())));

        let service = UserService::new(Arc::new(repository), authenticator());

        let result = service.delete_user(&UserId::new()).await;
        assert!(matches!(result, Err(UserError::NotFound(_))));
    }
}
