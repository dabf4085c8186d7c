use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    middleware::RequestId,
    models::{ClothingId, ClothingItem, ClothingPatch, NewClothingItem},
    routes::AppState,
};

const NOT_FOUND_MESSAGE: &str = "Clothing item not found";

#[derive(Debug, Deserialize)]
pub struct CreateClothingRequest {
    pub name: Option<String>,
    pub weather_conditions: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateClothingRequest {
    pub name: Option<String>,
    pub weather_conditions: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl CreateClothingRequest {
    fn validate(self) -> AppResult<NewClothingItem> {
        match (self.name, self.weather_conditions) {
            (Some(name), Some(conditions)) => {
                if name.trim().is_empty() {
                    return Err(AppError::Validation("name must not be empty".to_string()));
                }
                Ok(NewClothingItem::new(name, conditions))
            }
            (name, conditions) => {
                let missing: Vec<&str> = [
                    name.is_none().then_some("name"),
                    conditions.is_none().then_some("weather_conditions"),
                ]
                .into_iter()
                .flatten()
                .collect();
                Err(AppError::Validation(format!(
                    "Missing required fields: {}",
                    missing.join(", ")
                )))
            }
        }
    }
}

impl UpdateClothingRequest {
    fn validate(self) -> AppResult<ClothingPatch> {
        if self.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            return Err(AppError::Validation("name must not be empty".to_string()));
        }
        let patch = ClothingPatch::new(self.name, self.weather_conditions);
        if patch.is_empty() {
            return Err(AppError::Validation("No fields to update".to_string()));
        }
        Ok(patch)
    }
}

/// A malformed or non-JSON body is a validation failure
fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> AppResult<T> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| AppError::Validation(rejection.body_text()))
}

/// An id that does not parse cannot name a stored item
fn parse_id(raw: &str) -> AppResult<ClothingId> {
    raw.parse()
        .map_err(|_| AppError::NotFound(NOT_FOUND_MESSAGE.to_string()))
}

/// List all clothing items
pub async fn list(State(state): State<Arc<AppState>>) -> AppResult<Json<Vec<ClothingItem>>> {
    let records = state.clothing_store.list().await?;
    Ok(Json(records.into_iter().map(ClothingItem::from).collect()))
}

/// Fetch one clothing item
pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> AppResult<Json<ClothingItem>> {
    let id = parse_id(&id)?;
    let record = state
        .clothing_store
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(NOT_FOUND_MESSAGE.to_string()))?;

    Ok(Json(ClothingItem::from(record)))
}

/// Create a clothing item
pub async fn create(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    payload: Result<Json<CreateClothingRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<ClothingItem>)> {
    let item = json_body(payload)?.validate()?;
    let record = state.clothing_store.create(item).await?;

    tracing::info!(
        request_id = %request_id,
        id = %record.id,
        name = %record.name,
        "Clothing item created"
    );

    Ok((StatusCode::CREATED, Json(ClothingItem::from(record))))
}

/// Partially update a clothing item
pub async fn update(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateClothingRequest>, JsonRejection>,
) -> AppResult<Json<MessageResponse>> {
    let id = parse_id(&id)?;
    let patch = json_body(payload)?.validate()?;

    let affected = state.clothing_store.update(id, patch).await?;
    if affected == 0 {
        return Err(AppError::NotFound(NOT_FOUND_MESSAGE.to_string()));
    }

    tracing::info!(request_id = %request_id, id = %id, "Clothing item updated");

    Ok(Json(MessageResponse {
        message: "Clothing item updated successfully".to_string(),
    }))
}

/// Delete a clothing item
pub async fn delete(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Path(id): Path<String>,
) -> AppResult<Json<MessageResponse>> {
    let id = parse_id(&id)?;

    let affected = state.clothing_store.delete(id).await?;
    if affected == 0 {
        return Err(AppError::NotFound(NOT_FOUND_MESSAGE.to_string()));
    }

    tracing::info!(request_id = %request_id, id = %id, "Clothing item deleted");

    Ok(Json(MessageResponse {
        message: "Clothing item deleted successfully".to_string(),
    }))
}
