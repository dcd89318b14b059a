use rand::{rngs::OsRng, RngCore};
use time::OffsetDateTime;
use tracing::{debug, info, warn};

use crate::{
    auth::{
        dto::{LoginRequest, PublicUser, RegisterRequest},
        password::{hash_password, needs_rehash, verify_password},
        repo::{User, UserStatus},
    },
    error::AppError,
    storage::UserStore,
};

pub const MIN_PASSWORD_LEN: usize = 6;

pub const REGISTERED_MESSAGE: &str = "Account created. Pay for the chosen plan and send the \
receipt to the administrator on WhatsApp. Your access will be released once the payment is approved.";

const INVALID_CREDENTIALS: &str = "Invalid credentials";

fn random_hex(len: usize) -> String {
    let mut bytes = vec![0u8; len];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// 8 random bytes, hex-encoded.
pub fn generate_id() -> String {
    random_hex(8)
}

/// 16 random bytes, hex-encoded.
pub fn generate_session_token() -> String {
    random_hex(16)
}

/// Trimmed value, or `None` when absent or blank.
fn present(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn not_approved(status: UserStatus) -> AppError {
    AppError::Forbidden {
        message: "Your account is not approved yet. Wait for the administrator to confirm \
                  the payment for your plan."
            .into(),
        status,
    }
}

/// Creates a pending account. Registration does not log the user in.
pub async fn register(store: &UserStore, req: RegisterRequest) -> Result<String, AppError> {
    let password = req.password.filter(|p| !p.is_empty());
    let (Some(name), Some(email), Some(password), Some(plan)) =
        (present(req.name), present(req.email), password, present(req.plan))
    else {
        return Err(AppError::Validation(
            "Name, email, password and plan are required".into(),
        ));
    };

    let email = email.to_lowercase();
    if password.chars().count() < MIN_PASSWORD_LEN {
        warn!("password too short");
        return Err(AppError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters long"
        )));
    }

    let password_hash = hash_password(&password)?;

    let user_id = store
        .mutate(|users| {
            if users.find_by_email(&email).is_some() {
                return Err(AppError::Conflict(
                    "An account with this email already exists. Try logging in.".into(),
                ));
            }
            let user = User {
                id: generate_id(),
                name,
                email: email.clone(),
                password_hash,
                plan,
                status: UserStatus::Pending,
                created_at: OffsetDateTime::now_utc(),
                session_token: None,
            };
            let id = user.id.clone();
            users.users.push(user);
            Ok(id)
        })
        .await
        .map_err(|e| {
            if matches!(e, AppError::Conflict(_)) {
                warn!(%email, "email already registered");
            }
            e
        })?;

    info!(%user_id, %email, "user registered");
    Ok(REGISTERED_MESSAGE.to_string())
}

/// Checks credentials and issues a fresh session token for an approved user.
pub async fn login(
    store: &UserStore,
    req: LoginRequest,
) -> Result<(String, PublicUser), AppError> {
    let password = req.password.filter(|p| !p.is_empty());
    let (Some(email), Some(password)) = (present(req.email), password) else {
        return Err(AppError::Validation("Email and password are required".into()));
    };

    let Some(user) = store.read(|users| users.find_by_email(&email).cloned()).await else {
        warn!(%email, "login unknown email");
        return Err(AppError::Unauthorized(INVALID_CREDENTIALS.into()));
    };

    let ok = verify_password(&password, &user.password_hash).unwrap_or_else(|e| {
        warn!(error = %e, user_id = %user.id, "stored password hash is unreadable");
        false
    });
    if !ok {
        warn!(%email, user_id = %user.id, "login invalid password");
        return Err(AppError::Unauthorized(INVALID_CREDENTIALS.into()));
    }

    if user.status != UserStatus::Approved {
        warn!(user_id = %user.id, status = %user.status, "login before approval");
        return Err(not_approved(user.status));
    }

    let upgraded_hash = if needs_rehash(&user.password_hash) {
        Some(hash_password(&password)?)
    } else {
        None
    };

    let token = generate_session_token();
    let profile = store
        .mutate(|users| {
            let u = users
                .find_by_id_mut(&user.id)
                .ok_or_else(|| AppError::Unauthorized(INVALID_CREDENTIALS.into()))?;
            if u.status != UserStatus::Approved {
                return Err(not_approved(u.status.clone()));
            }
            u.session_token = Some(token.clone());
            if let Some(hash) = upgraded_hash {
                debug!(user_id = %u.id, "upgraded legacy password to argon2");
                u.password_hash = hash;
            }
            Ok(PublicUser::from(&*u))
        })
        .await?;

    info!(user_id = %user.id, %email, "user logged in");
    Ok((token, profile))
}

/// Resolves a session token to an approved user.
pub async fn authenticate(store: &UserStore, token: Option<&str>) -> Result<User, AppError> {
    let Some(token) = token.map(str::trim).filter(|t| !t.is_empty()) else {
        return Err(AppError::Unauthorized("Missing session token".into()));
    };

    let user = store
        .read(|users| users.find_by_session_token(token).cloned())
        .await
        .ok_or_else(|| AppError::Unauthorized("Invalid session".into()))?;

    if user.status != UserStatus::Approved {
        warn!(user_id = %user.id, status = %user.status, "session for unapproved user");
        return Err(not_approved(user.status));
    }
    Ok(user)
}
