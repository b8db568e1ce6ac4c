use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::models::partner::GeoPoint;

/// Vehicle catalog. Incoming requests may reference a vehicle by numeric
/// catalog id or by symbolic name; both resolve to this enum once, at the
/// API boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VehicleType {
    Bike,
    Auto,
    MiniTruck,
    Truck,
}

impl VehicleType {
    pub fn from_id(id: u64) -> Option<Self> {
        match id {
            1 => Some(Self::Bike),
            2 => Some(Self::Auto),
            3 => Some(Self::MiniTruck),
            4 => Some(Self::Truck),
            _ => None,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "bike" => Some(Self::Bike),
            "auto" => Some(Self::Auto),
            "mini_truck" => Some(Self::MiniTruck),
            "truck" => Some(Self::Truck),
            _ => None,
        }
    }

    /// Accepts either a catalog id or a name; anything else is unknown.
    pub fn resolve(raw: &Value) -> Option<Self> {
        match raw {
            Value::Number(n) => n.as_u64().and_then(Self::from_id),
            Value::String(s) => Self::from_name(s),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingType {
    #[default]
    Immediate,
    Scheduled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Created,
    InTransit,
    Arriving,
    Completed,
    Cancelled,
}

impl BookingStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    pub fn is_in_progress(self) -> bool {
        matches!(self, Self::InTransit | Self::Arriving)
    }

    fn rank(self) -> u8 {
        match self {
            Self::Created => 0,
            Self::InTransit => 1,
            Self::Arriving => 2,
            Self::Completed => 3,
            Self::Cancelled => 4,
        }
    }

    /// Status only moves one step forward along created → in_transit →
    /// arriving → completed, with completion also reachable straight from
    /// in_transit; cancellation is reachable from any non-terminal state.
    pub fn can_transition_to(self, next: Self) -> bool {
        if self.is_terminal() || next == self {
            return false;
        }
        if next == Self::Cancelled {
            return true;
        }
        if self == Self::InTransit && next == Self::Completed {
            return true;
        }
        next.rank() == self.rank() + 1
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub partner_id: Option<Uuid>,
    pub pickup_address: String,
    pub pickup_point: Option<GeoPoint>,
    pub drop_address: String,
    pub drop_point: Option<GeoPoint>,
    pub pickup_time: DateTime<Utc>,
    pub drop_time: DateTime<Utc>,
    pub status: BookingStatus,
    pub amount: Decimal,
    pub pickup_otp: Option<String>,
    pub drop_otp: Option<String>,
    pub vehicle_type: Option<VehicleType>,
    pub booking_type: BookingType,
    pub scheduled_time: Option<DateTime<Utc>>,
    pub distance_km: Option<f64>,
    pub weight: Option<String>,
    pub dimensions: Option<String>,
    pub boxes: Option<u32>,
    pub helper_required: bool,
    pub instructions: Option<String>,
    pub rating: Option<u8>,
    pub review: Option<String>,
    pub rating_submitted: bool,
    pub emergency_reported: bool,
    pub emergency_type: Option<String>,
    pub emergency_description: Option<String>,
    pub emergency_location: Option<GeoPoint>,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

impl Booking {
    pub fn can_be_rated(&self) -> bool {
        self.status == BookingStatus::Completed && !self.rating_submitted
    }
}
