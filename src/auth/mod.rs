use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;
use uuid::Uuid;

use crate::db::Database;
use crate::models::{User, ROLE_ACCOUNTANT, ROLE_BUSINESS};
use crate::utils::now_rfc3339;

pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("{field} is required")]
    MissingField { field: &'static str },

    #[error("password must be at least {MIN_PASSWORD_LEN} characters")]
    WeakPassword,

    #[error("an account with this email already exists")]
    EmailInUse,

    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("the selected role does not match this account")]
    RoleMismatch,

    #[error("unknown role")]
    UnknownRole,

    #[error("record store: {0}")]
    Store(#[from] rusqlite::Error),
}

#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub user_id: String,
    pub name: String,
    pub email: String,
    pub role: String,
    pub assigned_clients: Vec<String>,
}

impl Session {
    pub fn for_user(user: &User) -> Self {
        Session {
            user_id: user.id.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role.clone(),
            assigned_clients: user.assigned_clients.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SignUpPayload {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: String,
    pub assigned_clients: Option<String>,
}

pub fn sign_up(db: &Database, payload: &SignUpPayload) -> Result<User, AuthError> {
    let name = required_field("name", &payload.name)?;
    let email = required_field("email", &payload.email)?;
    let role = required_field("role", &payload.role)?;

    if role != ROLE_BUSINESS && role != ROLE_ACCOUNTANT {
        return Err(AuthError::UnknownRole);
    }
    if payload.password.len() < MIN_PASSWORD_LEN {
        return Err(AuthError::WeakPassword);
    }
    if db.get_user_by_email(&email)?.is_some() {
        return Err(AuthError::EmailInUse);
    }

    // Accountants may register with a comma-separated list of client emails
    // they manage.
    let assigned_clients = if role == ROLE_ACCOUNTANT {
        payload
            .assigned_clients
            .as_deref()
            .unwrap_or("")
            .split(',')
            .map(|email| email.trim().to_string())
            .filter(|email| !email.is_empty())
            .collect()
    } else {
        Vec::new()
    };

    let now = now_rfc3339();
    let user = User {
        id: Uuid::new_v4().to_string(),
        name,
        email,
        password_hash: hash_password(&payload.password),
        role,
        assigned_clients,
        created_at: now.clone(),
        updated_at: now,
    };

    db.insert_user(&user)?;
    Ok(user)
}

pub fn sign_in(db: &Database, email: &str, password: &str, role: &str) -> Result<Session, AuthError> {
    let email = required_field("email", email)?;
    let role = required_field("role", role)?;
    if password.is_empty() {
        return Err(AuthError::MissingField { field: "password" });
    }

    let user = db
        .get_user_by_email(&email)?
        .ok_or(AuthError::InvalidCredentials)?;

    if !verify_password(&user.password_hash, password) {
        return Err(AuthError::InvalidCredentials);
    }
    if user.role != role {
        return Err(AuthError::RoleMismatch);
    }

    Ok(Session::for_user(&user))
}

pub fn hash_password(password: &str) -> String {
    let salt = Uuid::new_v4().simple().to_string();
    format!("{}${}", salt, digest(&salt, password))
}

pub fn verify_password(stored: &str, password: &str) -> bool {
    match stored.split_once('$') {
        Some((salt, expected)) => digest(salt, password) == expected,
        None => false,
    }
}

fn digest(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

fn required_field(field: &'static str, value: &str) -> Result<String, AuthError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AuthError::MissingField { field });
    }
    Ok(trimmed.to_string())
}
