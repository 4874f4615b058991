//! Presentation of normalized quakes: timestamps, popups and markers.
//!
//! Nothing here runs during normalization. Strings are built only when a
//! surface renders.

use chrono::DateTime;
use html_escape::{encode_double_quoted_attribute, encode_text};
use serde::Serialize;
use std::fmt;

use crate::classify::{classify, marker_radius};
use crate::normalize::Quake;

/// Formats epoch milliseconds as e.g. `Tue, 18 Oct 2026 20:54:00 GMT`.
pub fn format_timestamp(millis: i64) -> String {
    DateTime::from_timestamp_millis(millis)
        .map(|dt| dt.format("%a, %d %b %Y %H:%M:%S GMT").to_string())
        .unwrap_or_else(|| "Invalid Date".to_string())
}

/// Popup body for one quake. Formats on `Display`.
pub struct Popup<'a>(pub &'a Quake);

impl fmt::Display for Popup<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let q = self.0;
        write!(f, "<h3>{}</h3><hr>", encode_text(&q.title))?;

        f.write_str("<strong>Magnitude: </strong>")?;
        if q.has_magnitude() {
            write!(f, "{}", q.magnitude)?;
        } else {
            f.write_str("unknown")?;
        }

        f.write_str("<br><strong>Time: </strong>")?;
        match q.occurred_at {
            Some(ms) => f.write_str(&format_timestamp(ms))?,
            None => f.write_str("unknown")?,
        }

        f.write_str("<br><strong>Significance: </strong>")?;
        match q.significance {
            Some(sig) => write!(f, "{sig}/1000")?,
            None => f.write_str("unknown/1000")?,
        }

        write!(
            f,
            "<br><strong>More info: </strong><a href=\"{}\">USGS Earthquake Event Page</a>",
            encode_double_quoted_attribute(&q.detail_url)
        )
    }
}

/// Circle marker as handed to the page script.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub lat: f64,
    pub lng: f64,
    /// Not clamped here. Negative or `NaN` radii reach the page as-is
    /// (`NaN` serializes as `null`) and are clamped there.
    pub radius: f64,
    pub color: &'static str,
    pub popup: String,
}

impl Marker {
    /// `None` when the quake has no usable coordinates.
    pub fn for_quake(quake: &Quake) -> Option<Self> {
        if !quake.is_placeable() {
            return None;
        }
        Some(Self {
            lat: quake.latitude,
            lng: quake.longitude,
            radius: marker_radius(quake.magnitude),
            color: classify(quake.magnitude).color(),
            popup: Popup(quake).to_string(),
        })
    }
}
