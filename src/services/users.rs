use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::{self, AuthError};
use crate::database::models::User;
use crate::database::Repository;
use crate::services::{required, DomainError, DomainResult};
use crate::types::UserRole;

#[derive(Debug, Deserialize)]
pub struct RegisterInput {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginInput {
    pub email: Option<String>,
    pub password: Option<String>,
}

pub const MIN_PASSWORD_LEN: usize = 8;
pub const MAX_NAME_LEN: usize = 100;

pub struct UserService {
    pool: PgPool,
}

impl UserService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn repo(&self) -> Repository<User> {
        Repository::new(User::TABLE, self.pool.clone())
    }

    /// Create a STUDENT account with a bcrypt password hash.
    pub async fn register(&self, input: RegisterInput) -> DomainResult<User> {
        let (name, email, password) = validate_registration(&input)?;

        let repo = self.repo();
        if repo.count(repo.filter()?.eq("email", email.as_str())?).await? > 0 {
            tracing::warn!("Registration rejected for existing email");
            return Err(DomainError::BadRequest("User already exists".to_string()));
        }

        let password_hash = auth::hash_password(&password)?;
        let inserted = sqlx::query_as::<_, User>(
            "INSERT INTO users (id, name, email, password_hash, role, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, now(), now()) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(&name)
        .bind(&email)
        .bind(&password_hash)
        .bind(UserRole::Student)
        .fetch_one(&self.pool)
        .await
        .map_err(crate::database::DatabaseError::from);

        match inserted {
            Ok(user) => {
                tracing::info!("Registered user {}", user.id);
                Ok(user)
            }
            Err(e) if e.is_unique_violation() => Err(DomainError::BadRequest("User already exists".to_string())),
            Err(e) => Err(e.into()),
        }
    }

    /// Check credentials. Unknown email and wrong password fail the same way.
    pub async fn authenticate(&self, input: LoginInput) -> DomainResult<User> {
        let email = normalize_email(input.email.as_deref().unwrap_or_default());
        let password = input.password.unwrap_or_default();
        if email.is_empty() || password.is_empty() {
            return Err(AuthError::InvalidCredentials.into());
        }

        let repo = self.repo();
        let user = repo.select_one(repo.filter()?.eq("email", email.as_str())?).await?;
        match user {
            Some(user) if auth::verify_password(&password, &user.password_hash) => Ok(user),
            _ => {
                tracing::warn!("Failed login attempt");
                Err(AuthError::InvalidCredentials.into())
            }
        }
    }

    pub async fn find(&self, id: Uuid) -> DomainResult<User> {
        self.repo()
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::NotFound("User not found".to_string()))
    }
}

pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Loose structural check: one `@`, non-empty local part, dotted domain, no spaces.
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let mut parts = email.split('@');
    let (local, domain) = match (parts.next(), parts.next(), parts.next()) {
        (Some(l), Some(d), None) => (l, d),
        _ => return false,
    };
    !local.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !domain.contains("..")
}

fn validate_registration(input: &RegisterInput) -> DomainResult<(String, String, String)> {
    let name = required("name", input.name.as_deref())?;
    if name.chars().count() > MAX_NAME_LEN {
        return Err(DomainError::invalid("name", format!("name must be at most {} characters", MAX_NAME_LEN)));
    }

    let email = normalize_email(&required("email", input.email.as_deref())?);
    if !is_valid_email(&email) {
        return Err(DomainError::invalid("email", "Invalid email address"));
    }

    let password = input.password.clone().unwrap_or_default();
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(DomainError::invalid(
            "password",
            format!("password must be at least {} characters", MIN_PASSWORD_LEN),
        ));
    }

    Ok((name, email, password))
}
