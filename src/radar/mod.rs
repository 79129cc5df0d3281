use crate::contact::NearbyContact;
use crate::geo::Coordinate;
use serde::Serialize;
use std::f64::consts::FRAC_PI_2;


/// Largest amount a displayed distance can exceed the exact one by
const ROUNDING_SLACK_KM: f64 = 0.005;

/// Circular plotting area in pixel space
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RadarSurface {
    pub center_x: f64,
    pub center_y: f64,
    pub max_radius_px: f64,
}

impl RadarSurface {
    /// Square surface of `size_px` with the disc inset by `padding_px`
    pub fn square(size_px: f64, padding_px: f64) -> Self {
        let half = size_px / 2.0;
        Self {
            center_x: half,
            center_y: half,
            max_radius_px: (half - padding_px).max(0.0),
        }
    }
}

/// A contact placed on the radar
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RadarBlip {
    pub x: f64,
    pub y: f64,
    /// Bearing from the user in degrees, clockwise from north
    pub bearing_deg: f64,
    pub contact: NearbyContact,
}

/// Place nearby contacts on the radar disc.
///
/// The bearing treats degree differences as flat (`atan2(Δlon, Δlat)`), so it
/// is only good for visual placement. North maps to screen up and pixel
/// distance scales linearly with `distance_km / radius_km`. Entries beyond the
/// radius are dropped; since `distance_km` is rounded, an entry up to half a
/// display unit past the radius is kept and drawn on the rim.
pub fn project(
    user: Coordinate,
    nearby: &[NearbyContact],
    surface: &RadarSurface,
    radius_km: f64,
) -> Vec<RadarBlip> {
    if radius_km <= 0.0 {
        return Vec::new();
    }

    nearby
        .iter()
        .filter(|n| n.distance_km <= radius_km + ROUNDING_SLACK_KM)
        .map(|n| {
            let d_lat = n.contact.position.latitude - user.latitude;
            let d_lon = n.contact.position.longitude - user.longitude;
            let bearing = d_lon.atan2(d_lat);

            let r = (n.distance_km / radius_km).min(1.0) * surface.max_radius_px;
            let screen_angle = bearing - FRAC_PI_2;

            RadarBlip {
                x: surface.center_x + r * screen_angle.cos(),
                y: surface.center_y + r * screen_angle.sin(),
                bearing_deg: bearing.to_degrees().rem_euclid(360.0),
                contact: n.clone(),
            }
        })
        .collect()
}
