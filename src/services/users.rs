//! Authentication and user management service

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use validator::Validate;

use crate::{
    config::PaginationConfig,
    error::{AppError, AppResult},
    models::{
        pagination::Page,
        user::{LoginUser, RegisterUser, Role, User, UserPage, UserQuery},
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct UsersService {
    repository: Repository,
    pagination: PaginationConfig,
}

impl UsersService {
    pub fn new(repository: Repository, pagination: PaginationConfig) -> Self {
        Self {
            repository,
            pagination,
        }
    }

    /// Register a new reader account
    pub async fn register(&self, request: RegisterUser) -> AppResult<User> {
        request.validate()?;

        let email = request.email.trim();
        let hash = hash_password(&request.password)?;
        let user = self.repository.users.create(email, &hash, Role::User).await?;

        tracing::info!("User {} registered as {}", user.id, user.email);
        Ok(user)
    }

    /// Check credentials and the requested role, returning the user profile
    pub async fn login(&self, request: LoginUser) -> AppResult<User> {
        request.validate()?;

        let user = self
            .repository
            .users
            .get_by_email(request.email.trim())
            .await?
            .ok_or_else(|| AppError::NotFound("User does not exist, please register".to_string()))?;

        if user.role != request.role {
            return Err(AppError::Authorization(format!(
                "Account is not allowed to sign in as {}",
                request.role
            )));
        }

        if !verify_password(&user.password, &request.password)? {
            return Err(AppError::Authentication("Invalid email or password".to_string()));
        }

        Ok(user)
    }

    /// Search users
    pub async fn search_users(&self, query: &UserQuery) -> AppResult<UserPage> {
        let page = Page::resolve(query.page, query.size, self.pagination)?;
        let (users, total) = self.repository.users.search(query, page).await?;

        Ok(UserPage {
            users,
            page_count: page.page_count(total),
            total_users: total,
        })
    }

    /// Create the configured admin account when no admin exists yet
    pub async fn ensure_admin(&self, email: &str, password: &str) -> AppResult<()> {
        if self.repository.users.admin_exists().await? {
            return Ok(());
        }

        let hash = hash_password(password)?;
        let admin = self.repository.users.create(email, &hash, Role::Admin).await?;
        tracing::info!("Created initial admin account {}", admin.email);
        Ok(())
    }
}

/// Hash a password using Argon2
pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
    Ok(hash.to_string())
}

/// Verify a password against a stored Argon2 hash
pub fn verify_password(hash: &str, password: &str) -> AppResult<bool> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|_| AppError::Internal("Invalid password hash".to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}
