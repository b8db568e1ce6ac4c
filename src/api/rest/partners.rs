use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, patch, post};
use axum::Json;
use axum::Router;
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::booking::VehicleType;
use crate::models::partner::{GeoPoint, Partner};
use crate::models::wallet::PartnerWallet;
use crate::state::AppState;
use crate::wallet;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/partners", post(create_partner).get(list_partners))
        .route("/partners/:id", get(get_partner))
        .route("/partners/:id/location", patch(update_location))
        .route("/partners/:id/live", patch(update_live))
}

#[derive(Deserialize)]
pub struct CreatePartnerRequest {
    pub phone_number: String,
    pub name: String,
    pub vehicle_type: Option<Value>,
    pub notification_channel: Option<String>,
    pub location: Option<GeoPoint>,
}

/// Registers a partner; the wallet is created alongside, starting empty.
async fn create_partner(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreatePartnerRequest>,
) -> Result<(StatusCode, Json<Partner>), AppError> {
    if payload.phone_number.trim().is_empty() {
        return Err(AppError::BadRequest(
            "phone_number cannot be empty".to_string(),
        ));
    }

    let vehicle_type = match &payload.vehicle_type {
        Some(raw) if !raw.is_null() => Some(
            VehicleType::resolve(raw)
                .ok_or_else(|| AppError::BadRequest(format!("unknown vehicle type: {raw}")))?,
        ),
        _ => None,
    };

    let now = Utc::now();
    let partner = Partner {
        id: Uuid::new_v4(),
        phone_number: payload.phone_number,
        name: payload.name,
        vehicle_type,
        location: payload.location,
        is_live: false,
        notification_channel: payload.notification_channel,
        is_approved: false,
        rating: None,
        created_at: now,
        updated_at: now,
    };

    state
        .wallets
        .insert(partner.id, PartnerWallet::new(partner.id, now));
    state.partners.insert(partner.id, partner.clone());

    Ok((StatusCode::CREATED, Json(partner)))
}

async fn list_partners(State(state): State<Arc<AppState>>) -> Json<Vec<Partner>> {
    let partners = state
        .partners
        .iter()
        .map(|entry| entry.value().clone())
        .collect();
    Json(partners)
}

async fn get_partner(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Partner>, AppError> {
    let partner = state
        .partners
        .get(&id)
        .ok_or_else(|| AppError::NotFound(format!("partner {id} not found")))?;

    Ok(Json(partner.value().clone()))
}

#[derive(Deserialize)]
pub struct UpdateLocationRequest {
    pub location: GeoPoint,
}

/// Location pushes are only applied while the partner is live; a push from an
/// offline device is acknowledged but ignored.
async fn update_location(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateLocationRequest>,
) -> Result<Json<Value>, AppError> {
    let mut partner = state
        .partners
        .get_mut(&id)
        .ok_or_else(|| AppError::NotFound(format!("partner {id} not found")))?;

    if !partner.is_live {
        return Ok(Json(json!({
            "message": "partner is not live; location not updated"
        })));
    }

    partner.location = Some(payload.location);
    partner.updated_at = Utc::now();

    Ok(Json(json!({ "message": "location updated" })))
}

#[derive(Deserialize)]
pub struct UpdateLiveRequest {
    pub is_live: bool,
}

/// Going live is gated by wallet entitlement; going offline never is.
async fn update_live(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateLiveRequest>,
) -> Result<Json<Partner>, AppError> {
    let mut partner = state
        .partners
        .get_mut(&id)
        .ok_or_else(|| AppError::NotFound(format!("partner {id} not found")))?;

    if payload.is_live {
        let now = Utc::now();
        let entitled = state
            .wallets
            .get(&id)
            .is_some_and(|w| wallet::can_activate(&w, now));
        if !entitled {
            return Err(AppError::Conflict(
                "wallet has no ride credits or active validity window".to_string(),
            ));
        }
    }

    partner.is_live = payload.is_live;
    partner.updated_at = Utc::now();

    Ok(Json(partner.clone()))
}
