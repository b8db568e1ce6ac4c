use uuid::Uuid;

use crate::models::partner::GeoPoint;

const EARTH_RADIUS_KM: f64 = 6_371.0;

pub fn haversine_km(a: &GeoPoint, b: &GeoPoint) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let delta_lat = (b.lat - a.lat).to_radians();
    let delta_lng = (b.lng - a.lng).to_radians();

    let sin_lat = (delta_lat / 2.0).sin();
    let sin_lng = (delta_lng / 2.0).sin();

    let haversine = sin_lat * sin_lat + lat1.cos() * lat2.cos() * sin_lng * sin_lng;
    let central_angle = 2.0 * haversine.sqrt().asin();

    EARTH_RADIUS_KM * central_angle
}

/// Radius query over last-known partner locations. Candidates without a
/// location are excluded, not errored. Results are ordered closest-first.
pub fn nearby(
    center: &GeoPoint,
    radius_meters: f64,
    candidates: impl IntoIterator<Item = (Uuid, Option<GeoPoint>)>,
) -> Vec<(Uuid, f64)> {
    let radius_km = radius_meters / 1_000.0;

    let mut within: Vec<(Uuid, f64)> = candidates
        .into_iter()
        .filter_map(|(id, location)| {
            let location = location?;
            let distance_km = haversine_km(center, &location);
            (distance_km <= radius_km).then_some((id, distance_km))
        })
        .collect();

    within.sort_by(|a, b| a.1.total_cmp(&b.1));
    within
}
