use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::Json;
use axum::Router;
use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::dispatch::queue::enqueue_booking;
use crate::error::AppError;
use crate::lifecycle;
use crate::models::booking::{Booking, BookingStatus, BookingType, VehicleType};
use crate::models::event::{BookingEvent, BookingEventKind};
use crate::models::partner::GeoPoint;
use crate::state::AppState;

const AVERAGE_SPEED_KMH: f64 = 30.0;
const DROP_BUFFER_MINUTES: i64 = 10;
const DROP_FALLBACK_MINUTES: i64 = 60;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/bookings/start", post(start_booking))
        .route("/bookings", get(list_bookings))
        .route("/bookings/:id", get(get_booking))
        .route("/bookings/validate-pickup-otp", post(validate_pickup_otp))
        .route("/bookings/validate-drop-otp", post(validate_drop_otp))
        .route("/bookings/:id/accept", post(accept_booking))
        .route("/bookings/:id/status", post(update_status))
        .route("/bookings/:id/rate", post(submit_rating))
        .route("/bookings/:id/emergency", post(report_emergency))
}

#[derive(Deserialize)]
pub struct StartBookingRequest {
    pub customer_id: Uuid,
    pub pickup_address: String,
    pub pickup_point: Option<GeoPoint>,
    pub drop_address: String,
    pub drop_point: Option<GeoPoint>,
    pub fare: Decimal,
    /// Catalog id or symbolic name; resolved once here, never downstream.
    pub vehicle_type: Option<Value>,
    #[serde(default)]
    pub booking_type: BookingType,
    pub scheduled_time: Option<String>,
    pub pickup_time: Option<String>,
    pub drop_time: Option<String>,
    pub distance_km: Option<f64>,
    pub weight: Option<String>,
    pub dimensions: Option<String>,
    pub boxes: Option<u32>,
    #[serde(default)]
    pub helper_required: bool,
    pub instructions: Option<String>,
}

async fn start_booking(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<StartBookingRequest>,
) -> Result<(StatusCode, Json<Booking>), AppError> {
    if !state.customers.contains_key(&payload.customer_id) {
        return Err(AppError::NotFound(format!(
            "customer {} not found",
            payload.customer_id
        )));
    }

    let vehicle_type = match &payload.vehicle_type {
        Some(raw) if !raw.is_null() => Some(
            VehicleType::resolve(raw)
                .ok_or_else(|| AppError::BadRequest(format!("unknown vehicle type: {raw}")))?,
        ),
        _ => None,
    };

    let now = Utc::now();

    let scheduled_time = match payload.booking_type {
        BookingType::Scheduled => {
            let raw = payload.scheduled_time.as_deref().ok_or_else(|| {
                AppError::BadRequest(
                    "scheduled_time is required for scheduled bookings".to_string(),
                )
            })?;
            let scheduled = parse_datetime(raw).ok_or_else(|| {
                AppError::BadRequest("scheduled_time is not a valid date-time".to_string())
            })?;
            if scheduled <= now {
                return Err(AppError::BadRequest(
                    "scheduled_time must be in the future".to_string(),
                ));
            }
            Some(scheduled)
        }
        BookingType::Immediate => payload.scheduled_time.as_deref().and_then(parse_datetime),
    };

    let pickup_time = payload
        .pickup_time
        .as_deref()
        .and_then(parse_datetime)
        .unwrap_or_else(|| match payload.booking_type {
            BookingType::Immediate => now,
            // checked above: scheduled bookings always carry a scheduled_time
            BookingType::Scheduled => scheduled_time.unwrap_or(now),
        });

    let drop_time = payload
        .drop_time
        .as_deref()
        .and_then(parse_datetime)
        .unwrap_or_else(|| pickup_time + estimate_duration(payload.distance_km));

    // rng scoped so the handler future stays Send
    let (pickup_otp, drop_otp) = {
        let mut rng = rand::thread_rng();
        (
            format!("{}", rng.gen_range(1000..=9999)),
            format!("{}", rng.gen_range(1000..=9999)),
        )
    };

    let booking = Booking {
        id: Uuid::new_v4(),
        customer_id: payload.customer_id,
        partner_id: None,
        pickup_address: payload.pickup_address,
        pickup_point: payload.pickup_point,
        drop_address: payload.drop_address,
        drop_point: payload.drop_point,
        pickup_time,
        drop_time,
        status: BookingStatus::Created,
        amount: payload.fare,
        pickup_otp: Some(pickup_otp),
        drop_otp: Some(drop_otp),
        vehicle_type,
        booking_type: payload.booking_type,
        scheduled_time,
        distance_km: payload.distance_km,
        weight: payload.weight,
        dimensions: payload.dimensions,
        boxes: payload.boxes,
        helper_required: payload.helper_required,
        instructions: payload.instructions,
        rating: None,
        review: None,
        rating_submitted: false,
        emergency_reported: false,
        emergency_type: None,
        emergency_description: None,
        emergency_location: None,
        created_at: now,
        modified_at: now,
    };

    state.bookings.insert(booking.id, booking.clone());
    let _ = state
        .booking_events_tx
        .send(BookingEvent::now(booking.id, BookingEventKind::Created));

    // Scheduled bookings skip fan-out entirely; activation is external.
    if payload.booking_type == BookingType::Immediate {
        enqueue_booking(&state, booking.id).await?;
    }

    Ok((StatusCode::CREATED, Json(booking)))
}

/// Estimated travel time at 30 km/h plus a loading buffer; a flat hour when
/// the distance is unknown.
fn estimate_duration(distance_km: Option<f64>) -> Duration {
    match distance_km {
        Some(d) if d.is_finite() && d >= 0.0 => {
            let travel_minutes = (d / AVERAGE_SPEED_KMH * 60.0).round() as i64;
            Duration::minutes(travel_minutes + DROP_BUFFER_MINUTES)
        }
        _ => Duration::minutes(DROP_FALLBACK_MINUTES),
    }
}

fn parse_datetime(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

async fn list_bookings(State(state): State<Arc<AppState>>) -> Json<Vec<Booking>> {
    let bookings = state
        .bookings
        .iter()
        .map(|entry| entry.value().clone())
        .collect();
    Json(bookings)
}

async fn get_booking(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Booking>, AppError> {
    let booking = state
        .bookings
        .get(&id)
        .ok_or_else(|| AppError::NotFound(format!("booking {id} not found")))?;

    Ok(Json(booking.value().clone()))
}

#[derive(Deserialize)]
pub struct OtpRequest {
    pub booking_id: Uuid,
    pub otp: Option<String>,
}

async fn validate_pickup_otp(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<OtpRequest>,
) -> Result<Json<Value>, AppError> {
    let otp = require_otp(payload.otp.as_deref())?;
    let drop_info = lifecycle::validate_pickup_otp(&state, payload.booking_id, otp)?;

    Ok(Json(json!({
        "message": "pickup confirmed",
        "drop_address": drop_info.drop_address,
        "drop_point": drop_info.drop_point,
    })))
}

async fn validate_drop_otp(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<OtpRequest>,
) -> Result<Json<Value>, AppError> {
    let otp = require_otp(payload.otp.as_deref())?;
    lifecycle::validate_drop_otp(&state, payload.booking_id, otp)?;

    Ok(Json(json!({ "message": "booking completed" })))
}

fn require_otp(otp: Option<&str>) -> Result<&str, AppError> {
    match otp {
        Some(otp) if !otp.is_empty() => Ok(otp),
        _ => Err(AppError::BadRequest("otp is required".to_string())),
    }
}

#[derive(Deserialize)]
pub struct AcceptRequest {
    pub partner_id: Uuid,
}

async fn accept_booking(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AcceptRequest>,
) -> Result<Json<Booking>, AppError> {
    let booking = lifecycle::accept_booking(&state, id, payload.partner_id)?;
    Ok(Json(booking))
}

#[derive(Deserialize)]
pub struct UpdateStatusRequest {
    pub status: BookingStatus,
}

async fn update_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateStatusRequest>,
) -> Result<Json<Booking>, AppError> {
    let booking = lifecycle::update_status(&state, id, payload.status)?;
    Ok(Json(booking))
}

#[derive(Deserialize)]
pub struct RatingRequest {
    pub rating: u8,
    pub review: Option<String>,
}

async fn submit_rating(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<RatingRequest>,
) -> Result<Json<Booking>, AppError> {
    let booking = lifecycle::submit_ride_rating(&state, id, payload.rating, payload.review)?;
    Ok(Json(booking))
}

#[derive(Deserialize, Default)]
pub struct EmergencyRequest {
    pub emergency_type: Option<String>,
    pub description: Option<String>,
    pub customer_location: Option<GeoPoint>,
}

async fn report_emergency(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    payload: Option<Json<EmergencyRequest>>,
) -> Result<Json<Value>, AppError> {
    let report = payload
        .map(|Json(body)| lifecycle::EmergencyReport {
            emergency_type: body.emergency_type,
            description: body.description,
            customer_location: body.customer_location,
        })
        .unwrap_or_default();
    lifecycle::report_emergency(&state, id, report)?;

    Ok(Json(json!({ "message": "emergency reported" })))
}
