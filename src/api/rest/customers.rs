use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::post;
use axum::Json;
use axum::Router;
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::partner::Customer;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/customers", post(create_customer))
        .route("/customers/:id", axum::routing::get(get_customer))
}

#[derive(Deserialize)]
pub struct CreateCustomerRequest {
    pub phone_number: String,
    pub full_name: String,
}

async fn create_customer(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateCustomerRequest>,
) -> Result<(StatusCode, Json<Customer>), AppError> {
    if payload.phone_number.trim().is_empty() {
        return Err(AppError::BadRequest(
            "phone_number cannot be empty".to_string(),
        ));
    }

    let customer = Customer {
        id: Uuid::new_v4(),
        phone_number: payload.phone_number,
        full_name: payload.full_name,
        created_at: Utc::now(),
    };

    state.customers.insert(customer.id, customer.clone());
    Ok((StatusCode::CREATED, Json(customer)))
}

async fn get_customer(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Customer>, AppError> {
    let customer = state
        .customers
        .get(&id)
        .ok_or_else(|| AppError::NotFound(format!("customer {id} not found")))?;

    Ok(Json(customer.value().clone()))
}
