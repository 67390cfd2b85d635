use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{extract::State, http::StatusCode, routing::post, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    error::{AppError, Result},
    extract::Json,
    services::token,
    AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
}

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub email: Option<String>,
    pub fullname: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SignupResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub message: String,
    pub token: String,
}

fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|_| AppError::Internal("Failed to hash password".to_string()))
}

fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|_| AppError::Internal("Invalid password hash".to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

async fn signup(
    State(state): State<AppState>,
    Json(body): Json<SignupRequest>,
) -> Result<(StatusCode, Json<SignupResponse>)> {
    let (email, fullname, password) = match (body.email, body.fullname, body.password) {
        (Some(e), Some(f), Some(p)) if !e.is_empty() && !f.is_empty() && !p.is_empty() => {
            (e, f, p)
        }
        _ => {
            return Err(AppError::Validation(
                "Email, password, and full name are required.".to_string(),
            ))
        }
    };

    let email = normalize_email(&email);
    let fullname = fullname.trim().to_string();
    tracing::debug!(%email, "signup attempt");

    let existing = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE email = ?")
        .bind(&email)
        .fetch_one(&state.db.pool)
        .await?;

    if existing > 0 {
        tracing::warn!(%email, "signup rejected, email already in use");
        return Err(AppError::Validation(
            "Email is already registered. Please use a different one.".to_string(),
        ));
    }

    let password_hash = hash_password(&password)?;

    let user_id = Uuid::new_v4().to_string();
    let now = Utc::now().to_rfc3339();

    sqlx::query(
        "INSERT INTO users (id, email, fullname, password_hash, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(&user_id)
    .bind(&email)
    .bind(&fullname)
    .bind(&password_hash)
    .bind(&now)
    .bind(&now)
    .execute(&state.db.pool)
    .await?;

    tracing::debug!(%email, "user created");

    // Registration does not issue a token; login is a separate step.
    Ok((
        StatusCode::CREATED,
        Json(SignupResponse {
            success: true,
            message: format!("Account created successfully. Welcome, {fullname}!"),
        }),
    ))
}

async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    let (email, password) = match (body.email, body.password) {
        (Some(e), Some(p)) if !e.is_empty() && !p.is_empty() => (e, p),
        _ => {
            return Err(AppError::Validation(
                "Email & password are required.".to_string(),
            ))
        }
    };

    let email = normalize_email(&email);
    tracing::debug!(%email, "login attempt");

    // Unknown email and wrong password are reported distinctly, a usability
    // choice carried over knowingly despite the enumeration side channel.
    let user = sqlx::query_as::<_, (String, String)>(
        "SELECT id, password_hash FROM users WHERE email = ?",
    )
    .bind(&email)
    .fetch_optional(&state.db.pool)
    .await?
    .ok_or_else(|| {
        tracing::warn!(%email, "login failed, user not found");
        AppError::NotFound(
            "User not found. Please check your email or register for a new account.".to_string(),
        )
    })?;

    let (user_id, password_hash) = user;

    if !verify_password(&password, &password_hash)? {
        tracing::warn!(%email, "login failed, invalid password");
        return Err(AppError::Unauthorized(
            "Invalid password. Please try again.".to_string(),
        ));
    }

    let token = token::issue(&user_id, &state.config.jwt_secret)?;
    tracing::debug!(%email, "user logged in");

    Ok(Json(LoginResponse {
        success: true,
        message: "User logged in successfully".to_string(),
        token,
    }))
}
