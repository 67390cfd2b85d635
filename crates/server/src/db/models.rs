use serde::{Deserialize, Serialize};

use crate::lang::Language;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: String,
    pub email: String,
    pub fullname: String,
    // The credential hash must never leave the server, in any response.
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Project {
    pub id: String,
    pub name: String,
    #[serde(rename = "projectLanguage")]
    pub language: Language,
    pub version: String,
    pub code: String,
    #[serde(rename = "createdBy")]
    pub owner_id: String,
    pub created_at: String,
    pub updated_at: String,
}
