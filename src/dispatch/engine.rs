use std::sync::Arc;
use std::time::Instant;

use tokio::sync::mpsc;
use tokio::time::timeout;
use tracing::{info, warn};
use uuid::Uuid;

use crate::dispatch::eligibility::filter_eligible;
use crate::dispatch::notify::PushPayload;
use crate::geo;
use crate::models::booking::Booking;
use crate::models::event::{BookingEvent, BookingEventKind};
use crate::models::partner::GeoPoint;
use crate::state::AppState;

/// Background fan-out engine. Pulls newly created immediate bookings off the
/// dispatch queue and notifies eligible nearby partners, best-effort and
/// at-most-once: a failed or timed-out send is skipped, never retried.
pub async fn run_dispatch_engine(state: Arc<AppState>, mut booking_rx: mpsc::Receiver<Uuid>) {
    info!("dispatch engine started");

    while let Some(booking_id) = booking_rx.recv().await {
        state.metrics.bookings_in_queue.dec();

        let start = Instant::now();
        let outcome = match dispatch_booking(&state, booking_id).await {
            Some(notified) => {
                let _ = state.booking_events_tx.send(BookingEvent::now(
                    booking_id,
                    BookingEventKind::Dispatched { notified },
                ));
                info!(booking_id = %booking_id, notified, "booking dispatched");
                "success"
            }
            None => {
                warn!(booking_id = %booking_id, "booking vanished before dispatch");
                "error"
            }
        };

        let elapsed = start.elapsed().as_secs_f64();
        state
            .metrics
            .dispatch_latency_seconds
            .with_label_values(&[outcome])
            .observe(elapsed);
        state
            .metrics
            .dispatches_total
            .with_label_values(&[outcome])
            .inc();
    }

    warn!("dispatch engine stopped: queue channel closed");
}

/// Returns the number of partners notified, or None if the booking no longer
/// exists in the store.
async fn dispatch_booking(state: &AppState, booking_id: Uuid) -> Option<usize> {
    let booking = state.bookings.get(&booking_id)?.value().clone();

    let Some(center) = booking.pickup_point else {
        warn!(booking_id = %booking_id, "booking has no pickup coordinates; skipping fan-out");
        return Some(0);
    };

    let candidates: Vec<(Uuid, Option<GeoPoint>)> = state
        .partners
        .iter()
        .filter(|entry| entry.value().is_live)
        .map(|entry| (*entry.key(), entry.value().location))
        .collect();

    let ranked = geo::nearby(&center, state.dispatch.radius_meters, candidates);
    let eligible = filter_eligible(
        &ranked,
        booking.vehicle_type,
        &state.partners,
        state.dispatch.max_fanout,
    );

    let mut notified = 0;
    for candidate in eligible {
        if notify_partner(state, &booking, &candidate.channel, candidate.id).await {
            notified += 1;
        }
    }

    Some(notified)
}

async fn notify_partner(
    state: &AppState,
    booking: &Booking,
    channel: &str,
    partner_id: Uuid,
) -> bool {
    let payload = PushPayload {
        booking_id: booking.id,
        pickup_address: booking.pickup_address.clone(),
        drop_address: booking.drop_address.clone(),
        fare: booking.amount,
        distance_km: booking.distance_km,
    };

    let send = state.notifier.send(channel, payload);
    let outcome = match timeout(state.dispatch.notify_timeout, send).await {
        Ok(Ok(())) => "success",
        Ok(Err(err)) => {
            warn!(
                booking_id = %booking.id,
                partner_id = %partner_id,
                error = %err,
                "push notification failed; skipping partner"
            );
            "error"
        }
        Err(_) => {
            warn!(
                booking_id = %booking.id,
                partner_id = %partner_id,
                "push notification timed out; skipping partner"
            );
            "timeout"
        }
    };

    state
        .metrics
        .notifications_total
        .with_label_values(&[outcome])
        .inc();

    outcome == "success"
}
