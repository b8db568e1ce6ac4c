use chrono::Utc;
use serde::Serialize;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::booking::{Booking, BookingStatus};
use crate::models::event::{BookingEvent, BookingEventKind};
use crate::models::partner::GeoPoint;
use crate::state::AppState;
use crate::wallet;

#[derive(Debug, Clone, Serialize)]
pub struct DropInfo {
    pub drop_address: String,
    pub drop_point: Option<GeoPoint>,
}

/// Confirms pickup. The status precondition doubles as the re-entrancy guard:
/// a duplicate call after success sees the advanced status and is rejected
/// without re-triggering side effects.
pub fn validate_pickup_otp(
    state: &AppState,
    booking_id: Uuid,
    otp: &str,
) -> Result<DropInfo, AppError> {
    let mut booking = state
        .bookings
        .get_mut(&booking_id)
        .ok_or_else(|| AppError::NotFound(format!("booking {booking_id} not found")))?;

    if booking.status != BookingStatus::Created {
        return Err(AppError::Conflict(format!(
            "pickup already confirmed or booking closed (status: {:?})",
            booking.status
        )));
    }

    if booking.pickup_otp.as_deref() != Some(otp) {
        warn!(booking_id = %booking_id, "invalid pickup OTP");
        return Err(AppError::BadRequest("invalid pickup OTP".to_string()));
    }

    booking.status = BookingStatus::InTransit;
    booking.modified_at = Utc::now();

    let info = DropInfo {
        drop_address: booking.drop_address.clone(),
        drop_point: booking.drop_point,
    };
    drop(booking);

    let _ = state
        .booking_events_tx
        .send(BookingEvent::now(booking_id, BookingEventKind::PickupConfirmed));

    info!(booking_id = %booking_id, "pickup confirmed, booking in transit");
    Ok(info)
}

/// Confirms drop: completes the booking and consumes one ride credit from the
/// assigned partner's wallet. The status write and the wallet decrement run
/// in the same guarded sequence; a missing wallet is logged, not surfaced.
pub fn validate_drop_otp(state: &AppState, booking_id: Uuid, otp: &str) -> Result<(), AppError> {
    let mut booking = state
        .bookings
        .get_mut(&booking_id)
        .ok_or_else(|| AppError::NotFound(format!("booking {booking_id} not found")))?;

    if !booking.status.is_in_progress() {
        return Err(AppError::Conflict(format!(
            "booking is not in transit (status: {:?})",
            booking.status
        )));
    }

    if booking.drop_otp.as_deref() != Some(otp) {
        warn!(booking_id = %booking_id, "invalid drop OTP");
        return Err(AppError::BadRequest("invalid drop OTP".to_string()));
    }

    booking.status = BookingStatus::Completed;
    booking.modified_at = Utc::now();
    let partner_id = booking.partner_id;
    drop(booking);

    match partner_id {
        Some(partner_id) => match wallet::consume_one_ride(state, partner_id, booking_id) {
            Ok(remaining) => {
                info!(
                    booking_id = %booking_id,
                    partner_id = %partner_id,
                    rides_remaining = remaining,
                    "booking completed"
                );
            }
            Err(err) => {
                error!(
                    booking_id = %booking_id,
                    partner_id = %partner_id,
                    error = %err,
                    "wallet decrement failed on completion"
                );
            }
        },
        None => {
            warn!(booking_id = %booking_id, "booking completed without an assigned partner");
        }
    }

    let _ = state
        .booking_events_tx
        .send(BookingEvent::now(booking_id, BookingEventKind::Completed));

    Ok(())
}

/// First-accept wins: only an unassigned booking in created status can be
/// claimed, so a second concurrent accept sees the precondition fail.
pub fn accept_booking(
    state: &AppState,
    booking_id: Uuid,
    partner_id: Uuid,
) -> Result<Booking, AppError> {
    {
        let partner = state
            .partners
            .get(&partner_id)
            .ok_or_else(|| AppError::NotFound(format!("partner {partner_id} not found")))?;
        if !partner.is_live {
            return Err(AppError::Conflict("partner is not live".to_string()));
        }
    }

    let mut booking = state
        .bookings
        .get_mut(&booking_id)
        .ok_or_else(|| AppError::NotFound(format!("booking {booking_id} not found")))?;

    if booking.status != BookingStatus::Created || booking.partner_id.is_some() {
        return Err(AppError::Conflict(
            "booking already accepted or closed".to_string(),
        ));
    }

    booking.partner_id = Some(partner_id);
    booking.modified_at = Utc::now();
    let snapshot = booking.clone();
    drop(booking);

    let _ = state.booking_events_tx.send(BookingEvent::now(
        booking_id,
        BookingEventKind::Accepted { partner_id },
    ));

    info!(booking_id = %booking_id, partner_id = %partner_id, "booking accepted");
    Ok(snapshot)
}

/// Generic status transition. OTP-gated edges (into in_transit and completed)
/// are reserved for the OTP endpoints; this path permits the arriving step
/// and cancellation from any non-terminal state.
pub fn update_status(
    state: &AppState,
    booking_id: Uuid,
    next: BookingStatus,
) -> Result<Booking, AppError> {
    let mut booking = state
        .bookings
        .get_mut(&booking_id)
        .ok_or_else(|| AppError::NotFound(format!("booking {booking_id} not found")))?;

    if matches!(next, BookingStatus::InTransit | BookingStatus::Completed) {
        return Err(AppError::BadRequest(format!(
            "status {next:?} requires OTP validation"
        )));
    }

    if !booking.status.can_transition_to(next) {
        return Err(AppError::Conflict(format!(
            "cannot transition from {:?} to {:?}",
            booking.status, next
        )));
    }

    booking.status = next;
    booking.modified_at = Utc::now();
    let snapshot = booking.clone();
    drop(booking);

    let _ = state.booking_events_tx.send(BookingEvent::now(
        booking_id,
        BookingEventKind::StatusChanged { status: next },
    ));

    Ok(snapshot)
}

/// Accepts a rating exactly once, only for completed bookings, then refreshes
/// the partner's mean rating across all of their rated bookings.
pub fn submit_ride_rating(
    state: &AppState,
    booking_id: Uuid,
    rating: u8,
    review: Option<String>,
) -> Result<Booking, AppError> {
    if !(1..=5).contains(&rating) {
        return Err(AppError::BadRequest(
            "rating must be an integer between 1 and 5".to_string(),
        ));
    }

    let mut booking = state
        .bookings
        .get_mut(&booking_id)
        .ok_or_else(|| AppError::NotFound(format!("booking {booking_id} not found")))?;

    if booking.status != BookingStatus::Completed {
        return Err(AppError::Conflict(
            "only completed bookings can be rated".to_string(),
        ));
    }
    if booking.rating_submitted {
        return Err(AppError::Conflict(
            "rating already submitted for this booking".to_string(),
        ));
    }

    booking.rating = Some(rating);
    booking.review = review;
    booking.rating_submitted = true;
    booking.modified_at = Utc::now();
    let partner_id = booking.partner_id;
    let snapshot = booking.clone();
    drop(booking);

    if let Some(partner_id) = partner_id {
        refresh_partner_rating(state, partner_id);
    }

    Ok(snapshot)
}

fn refresh_partner_rating(state: &AppState, partner_id: Uuid) {
    let ratings: Vec<u8> = state
        .bookings
        .iter()
        .filter(|entry| entry.value().partner_id == Some(partner_id))
        .filter_map(|entry| entry.value().rating)
        .collect();

    if ratings.is_empty() {
        return;
    }

    let mean = ratings.iter().map(|&r| f64::from(r)).sum::<f64>() / ratings.len() as f64;
    let rounded = (mean * 10.0).round() / 10.0;

    if let Some(mut partner) = state.partners.get_mut(&partner_id) {
        partner.rating = Some(rounded);
        partner.updated_at = Utc::now();
        info!(partner_id = %partner_id, rating = rounded, "partner rating refreshed");
    }
}

/// Best-effort emergency flag; valid at any booking status and never changes
/// the status itself.
pub fn report_emergency(
    state: &AppState,
    booking_id: Uuid,
    report: EmergencyReport,
) -> Result<(), AppError> {
    let mut booking = state
        .bookings
        .get_mut(&booking_id)
        .ok_or_else(|| AppError::NotFound(format!("booking {booking_id} not found")))?;

    booking.emergency_reported = true;
    booking.emergency_type = report.emergency_type;
    booking.emergency_description = report.description;
    booking.emergency_location = report.customer_location;
    booking.modified_at = Utc::now();

    error!(booking_id = %booking_id, "emergency reported for booking");
    Ok(())
}

#[derive(Debug, Clone, Default)]
pub struct EmergencyReport {
    pub emergency_type: Option<String>,
    pub description: Option<String>,
    pub customer_location: Option<GeoPoint>,
}
