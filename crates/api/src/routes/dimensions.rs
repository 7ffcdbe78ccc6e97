//! Dimension directory routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::error;
use uuid::Uuid;
use validator::Validate;

use crate::middleware::Caller;
use crate::routes::{bad_request, error_response, forbidden};
use crate::AppState;
use ledgra_db::repositories::dimension::{
    CreateDimensionTypeInput, CreateDimensionValueInput, DimensionError, DimensionRepository,
};

/// Creates the dimension routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/dimensions/types", get(list_types))
        .route("/dimensions/types", post(create_type))
        .route("/dimensions/types/{type_id}/values", get(list_values))
        .route("/dimensions/types/{type_id}/values", post(create_value))
        .route("/dimensions/values/{value_id}/deactivate", post(deactivate_value))
}

/// Request body for creating a dimension type.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTypeRequest {
    /// Unique code (e.g. "CC").
    #[validate(length(min = 1, max = 32))]
    pub code: String,
    /// Display name.
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    /// Sort order for display.
    #[serde(default)]
    pub sort_order: i16,
}

/// Request body for creating a dimension value.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateValueRequest {
    /// Unique code within the type (e.g. "CC-01").
    #[validate(length(min = 1, max = 32))]
    pub code: String,
    /// Display name.
    #[validate(length(min = 1, max = 255))]
    pub name: String,
}

/// Response for a dimension type.
#[derive(Debug, Serialize)]
pub struct DimensionTypeResponse {
    /// Dimension type ID.
    pub id: Uuid,
    /// Code.
    pub code: String,
    /// Name.
    pub name: String,
    /// Whether values of this type may be used on new lines.
    pub is_active: bool,
    /// Sort order.
    pub sort_order: i16,
}

/// Response for a dimension value.
#[derive(Debug, Serialize)]
pub struct DimensionValueResponse {
    /// Dimension value ID.
    pub id: Uuid,
    /// The owning dimension type.
    pub dimension_type_id: Uuid,
    /// Code.
    pub code: String,
    /// Name.
    pub name: String,
    /// Whether this value may be used on new lines.
    pub is_active: bool,
}

/// GET `/dimensions/types` - List dimension types.
async fn list_types(State(state): State<AppState>, _caller: Caller) -> Response {
    let repo = DimensionRepository::new((*state.db).clone());
    match repo.list_dimension_types().await {
        Ok(models) => {
            let types: Vec<DimensionTypeResponse> = models
                .into_iter()
                .map(|m| DimensionTypeResponse {
                    id: m.id,
                    code: m.code,
                    name: m.name,
                    is_active: m.is_active,
                    sort_order: m.sort_order,
                })
                .collect();
            (StatusCode::OK, Json(json!({ "dimension_types": types }))).into_response()
        }
        Err(e) => dimension_error(&e),
    }
}

/// POST `/dimensions/types` - Create a dimension type.
async fn create_type(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Json(request): Json<CreateTypeRequest>,
) -> Response {
    if !caller.can_manage_directory() {
        return forbidden("Caller may not manage dimensions");
    }
    if let Err(e) = request.validate() {
        return bad_request(e.to_string());
    }

    let repo = DimensionRepository::new((*state.db).clone());
    match repo
        .create_dimension_type(CreateDimensionTypeInput {
            code: request.code,
            name: request.name,
            sort_order: request.sort_order,
        })
        .await
    {
        Ok(m) => (
            StatusCode::CREATED,
            Json(DimensionTypeResponse {
                id: m.id,
                code: m.code,
                name: m.name,
                is_active: m.is_active,
                sort_order: m.sort_order,
            }),
        )
            .into_response(),
        Err(e) => dimension_error(&e),
    }
}

/// GET `/dimensions/types/{type_id}/values` - List values of a type.
async fn list_values(
    State(state): State<AppState>,
    _caller: Caller,
    Path(type_id): Path<Uuid>,
) -> Response {
    let repo = DimensionRepository::new((*state.db).clone());
    match repo.list_dimension_values(type_id).await {
        Ok(models) => {
            let values: Vec<DimensionValueResponse> = models
                .into_iter()
                .map(|m| DimensionValueResponse {
                    id: m.id,
                    dimension_type_id: m.dimension_type_id,
                    code: m.code,
                    name: m.name,
                    is_active: m.is_active,
                })
                .collect();
            (StatusCode::OK, Json(json!({ "dimension_values": values }))).into_response()
        }
        Err(e) => dimension_error(&e),
    }
}

/// POST `/dimensions/types/{type_id}/values` - Create a dimension value.
async fn create_value(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Path(type_id): Path<Uuid>,
    Json(request): Json<CreateValueRequest>,
) -> Response {
    if !caller.can_manage_directory() {
        return forbidden("Caller may not manage dimensions");
    }
    if let Err(e) = request.validate() {
        return bad_request(e.to_string());
    }

    let repo = DimensionRepository::new((*state.db).clone());
    match repo
        .create_dimension_value(CreateDimensionValueInput {
            dimension_type_id: type_id,
            code: request.code,
            name: request.name,
        })
        .await
    {
        Ok(m) => (
            StatusCode::CREATED,
            Json(DimensionValueResponse {
                id: m.id,
                dimension_type_id: m.dimension_type_id,
                code: m.code,
                name: m.name,
                is_active: m.is_active,
            }),
        )
            .into_response(),
        Err(e) => dimension_error(&e),
    }
}

/// POST `/dimensions/values/{value_id}/deactivate` - Deactivate a value.
async fn deactivate_value(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Path(value_id): Path<Uuid>,
) -> Response {
    if !caller.can_manage_directory() {
        return forbidden("Caller may not manage dimensions");
    }
    let repo = DimensionRepository::new((*state.db).clone());
    match repo.deactivate_dimension_value(value_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => dimension_error(&e),
    }
}

fn dimension_error(e: &DimensionError) -> Response {
    match e {
        DimensionError::DuplicateTypeCode(code) | DimensionError::DuplicateValueCode(code) => {
            error_response(409, "DUPLICATE_CODE", format!("Code '{code}' already exists"))
        }
        DimensionError::TypeNotFound(id) => error_response(
            404,
            "DIMENSION_TYPE_NOT_FOUND",
            format!("Dimension type not found: {id}"),
        ),
        DimensionError::ValueNotFound(id) => error_response(
            404,
            "DIMENSION_VALUE_NOT_FOUND",
            format!("Dimension value not found: {id}"),
        ),
        DimensionError::Database(err) => {
            error!(error = %err, "dimension repository failure");
            error_response(500, "DATABASE_ERROR", "An error occurred".to_string())
        }
    }
}
