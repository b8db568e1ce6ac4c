use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::booking::BookingStatus;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BookingEventKind {
    Created,
    Dispatched { notified: usize },
    Accepted { partner_id: Uuid },
    PickupConfirmed,
    Completed,
    StatusChanged { status: BookingStatus },
}

/// Broadcast to WebSocket subscribers as booking lifecycle milestones occur.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingEvent {
    pub booking_id: Uuid,
    #[serde(flatten)]
    pub kind: BookingEventKind,
    pub at: DateTime<Utc>,
}

impl BookingEvent {
    pub fn now(booking_id: Uuid, kind: BookingEventKind) -> Self {
        Self {
            booking_id,
            kind,
            at: Utc::now(),
        }
    }
}
