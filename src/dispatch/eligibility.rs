use dashmap::DashMap;
use uuid::Uuid;

use crate::models::booking::VehicleType;
use crate::models::partner::Partner;

#[derive(Debug, Clone)]
pub struct EligiblePartner {
    pub id: Uuid,
    pub channel: String,
    pub distance_km: f64,
}

/// Narrows a geo-ranked candidate list to partners that can actually take the
/// booking: matching vehicle type (when required) and a registered, non-empty
/// notification channel. Distance order is preserved; failures are silent
/// exclusions. `max_fanout` of 0 means unlimited.
pub fn filter_eligible(
    ranked: &[(Uuid, f64)],
    required_vehicle: Option<VehicleType>,
    partners: &DashMap<Uuid, Partner>,
    max_fanout: usize,
) -> Vec<EligiblePartner> {
    let mut eligible = Vec::new();

    for (partner_id, distance_km) in ranked {
        let Some(partner) = partners.get(partner_id) else {
            continue;
        };

        if let Some(required) = required_vehicle {
            if partner.vehicle_type != Some(required) {
                continue;
            }
        }

        if !partner.has_notification_channel() {
            continue;
        }

        let channel = partner
            .notification_channel
            .clone()
            .unwrap_or_default();

        eligible.push(EligiblePartner {
            id: *partner_id,
            channel,
            distance_km: *distance_km,
        });

        if max_fanout > 0 && eligible.len() >= max_fanout {
            break;
        }
    }

    eligible
}
