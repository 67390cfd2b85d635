use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    db::models::Project,
    error::{AppError, Result},
    extract::Json,
    lang::Language,
    middleware::auth::AuthUser,
    AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/createProject", post(create_project))
        .route("/saveProject", put(save_project))
        .route("/project", get(list_projects))
        .route("/project/:id", get(get_project))
        .route("/deleteProject", delete(delete_project))
        .route("/editProject", put(edit_project))
}

#[derive(Debug, Deserialize)]
pub struct CreateProjectRequest {
    pub name: Option<String>,
    #[serde(rename = "projectLanguage")]
    pub project_language: Option<String>,
    pub version: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SaveProjectRequest {
    #[serde(rename = "projectId")]
    pub project_id: Option<String>,
    pub code: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DeleteProjectRequest {
    #[serde(rename = "projectId")]
    pub project_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct EditProjectRequest {
    #[serde(rename = "projectId")]
    pub project_id: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreateProjectResponse {
    pub success: bool,
    pub message: String,
    #[serde(rename = "projectId")]
    pub project_id: String,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ProjectResponse {
    pub success: bool,
    pub message: String,
    pub project: Project,
}

#[derive(Debug, Serialize)]
pub struct ProjectListResponse {
    pub success: bool,
    pub message: String,
    pub projects: Vec<Project>,
}

fn validate_name(name: &str) -> Result<String> {
    let name = name.trim();
    // Bounds are in characters, not bytes; multibyte names count per glyph.
    let length = name.chars().count();
    if length < 3 || length > 20 {
        return Err(AppError::Validation(
            "Project name must be between 3 and 20 characters.".to_string(),
        ));
    }
    Ok(name.to_string())
}

async fn create_project(
    State(state): State<AppState>,
    user: AuthUser,
    Json(body): Json<CreateProjectRequest>,
) -> Result<(StatusCode, Json<CreateProjectResponse>)> {
    let (name, language, version) = match (body.name, body.project_language, body.version) {
        (Some(n), Some(l), Some(v)) if !n.is_empty() && !l.is_empty() && !v.is_empty() => {
            (n, l, v)
        }
        _ => {
            return Err(AppError::Validation(
                "'name', 'projectLanguage', and 'version' are required.".to_string(),
            ))
        }
    };

    let name = validate_name(&name)?;
    let language: Language = language
        .parse()
        .map_err(|e: crate::lang::UnsupportedLanguage| AppError::Validation(e.to_string()))?;

    let project_id = Uuid::new_v4().to_string();
    let now = Utc::now().to_rfc3339();

    sqlx::query(
        "INSERT INTO projects (id, name, language, version, code, owner_id, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&project_id)
    .bind(&name)
    .bind(language.as_str())
    .bind(version.trim())
    .bind(language.starter_code())
    .bind(&user.id)
    .bind(&now)
    .bind(&now)
    .execute(&state.db.pool)
    .await?;

    tracing::debug!(%project_id, owner = %user.id, "project created");

    Ok((
        StatusCode::CREATED,
        Json(CreateProjectResponse {
            success: true,
            message: format!("Project '{name}' created successfully."),
            project_id,
        }),
    ))
}

async fn save_project(
    State(state): State<AppState>,
    user: AuthUser,
    Json(body): Json<SaveProjectRequest>,
) -> Result<Json<StatusResponse>> {
    let (project_id, code) = match (body.project_id, body.code) {
        (Some(p), Some(c)) if !p.is_empty() => (p, c),
        _ => {
            return Err(AppError::Validation(
                "Both 'projectId' and 'code' are required.".to_string(),
            ))
        }
    };

    // The update itself is owner-filtered, so a mismatched owner is
    // indistinguishable from a missing project.
    let result = sqlx::query(
        "UPDATE projects SET code = ?, updated_at = ? WHERE id = ? AND owner_id = ?",
    )
    .bind(code.trim())
    .bind(Utc::now().to_rfc3339())
    .bind(&project_id)
    .bind(&user.id)
    .execute(&state.db.pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(
            "Project not found or update failed.".to_string(),
        ));
    }

    Ok(Json(StatusResponse {
        success: true,
        message: "Project updated successfully.".to_string(),
    }))
}

async fn list_projects(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<ProjectListResponse>> {
    let projects = sqlx::query_as::<_, Project>("SELECT * FROM projects WHERE owner_id = ?")
        .bind(&user.id)
        .fetch_all(&state.db.pool)
        .await?;

    Ok(Json(ProjectListResponse {
        success: true,
        message: "Projects fetched successfully.".to_string(),
        projects,
    }))
}

async fn get_project(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<ProjectResponse>> {
    let project =
        sqlx::query_as::<_, Project>("SELECT * FROM projects WHERE id = ? AND owner_id = ?")
            .bind(&id)
            .bind(&user.id)
            .fetch_optional(&state.db.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Project not found.".to_string()))?;

    Ok(Json(ProjectResponse {
        success: true,
        message: format!("Project with id : {id} fetched successfully"),
        project,
    }))
}

async fn delete_project(
    State(state): State<AppState>,
    user: AuthUser,
    Json(body): Json<DeleteProjectRequest>,
) -> Result<Json<StatusResponse>> {
    let project_id = match body.project_id {
        Some(p) if !p.is_empty() => p,
        _ => return Err(AppError::Validation("'projectId' is required.".to_string())),
    };

    // One atomic owner-filtered delete; zero rows means absent or not ours.
    let result = sqlx::query("DELETE FROM projects WHERE id = ? AND owner_id = ?")
        .bind(&project_id)
        .bind(&user.id)
        .execute(&state.db.pool)
        .await?;

    if result.rows_affected() == 0 {
        tracing::warn!(%project_id, "delete matched no owned project");
        return Err(AppError::NotFound(
            "Project not found or you are not authorized.".to_string(),
        ));
    }

    tracing::debug!(%project_id, owner = %user.id, "project deleted");

    Ok(Json(StatusResponse {
        success: true,
        message: "Project deleted successfully.".to_string(),
    }))
}

async fn edit_project(
    State(state): State<AppState>,
    user: AuthUser,
    Json(body): Json<EditProjectRequest>,
) -> Result<Json<ProjectResponse>> {
    let (project_id, name) = match (body.project_id, body.name) {
        (Some(p), Some(n)) if !p.is_empty() && !n.is_empty() => (p, n),
        _ => {
            return Err(AppError::Validation(
                "'projectId' and 'name' are required.".to_string(),
            ))
        }
    };

    let name = validate_name(&name)?;

    let mut project =
        sqlx::query_as::<_, Project>("SELECT * FROM projects WHERE id = ? AND owner_id = ?")
            .bind(&project_id)
            .bind(&user.id)
            .fetch_optional(&state.db.pool)
            .await?
            .ok_or_else(|| {
                AppError::NotFound("Project not found or you're not authorized.".to_string())
            })?;

    let now = Utc::now().to_rfc3339();
    sqlx::query("UPDATE projects SET name = ?, updated_at = ? WHERE id = ? AND owner_id = ?")
        .bind(&name)
        .bind(&now)
        .bind(&project_id)
        .bind(&user.id)
        .execute(&state.db.pool)
        .await?;

    project.name = name;
    project.updated_at = now;

    tracing::debug!(%project_id, owner = %user.id, "project renamed");

    Ok(Json(ProjectResponse {
        success: true,
        message: "Project updated successfully.".to_string(),
        project,
    }))
}
