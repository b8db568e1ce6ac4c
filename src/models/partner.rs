use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::booking::VehicleType;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

/// A transport provider/driver. Location is pushed periodically by the
/// partner's device and may be absent until the first push.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Partner {
    pub id: Uuid,
    pub phone_number: String,
    pub name: String,
    pub vehicle_type: Option<VehicleType>,
    pub location: Option<GeoPoint>,
    pub is_live: bool,
    pub notification_channel: Option<String>,
    pub is_approved: bool,
    /// Mean of this partner's rated bookings, rounded to 1 decimal.
    pub rating: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Partner {
    pub fn has_notification_channel(&self) -> bool {
        self.notification_channel
            .as_deref()
            .is_some_and(|channel| !channel.trim().is_empty())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    pub id: Uuid,
    pub phone_number: String,
    pub full_name: String,
    pub created_at: DateTime<Utc>,
}
