use serde::Serialize;

use crate::classify::{MagnitudeClass, classify};
use crate::normalize::Quake;

/// Summary of one bucket's quakes.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct QuakeStats {
    pub total: usize,
    /// Indexed by [`MagnitudeClass::index`].
    pub by_class: [usize; 6],
    pub missing_magnitude: usize,
    pub unplaceable: usize,
    pub max_magnitude: Option<f64>,
}

impl QuakeStats {
    pub fn from_quakes(quakes: &[Quake]) -> Self {
        let mut s = QuakeStats {
            total: quakes.len(),
            ..Default::default()
        };

        for q in quakes {
            s.by_class[classify(q.magnitude).index()] += 1;

            if !q.has_magnitude() {
                s.missing_magnitude += 1;
            } else if q.magnitude.is_finite() {
                s.max_magnitude = Some(match s.max_magnitude {
                    Some(m) => m.max(q.magnitude),
                    None => q.magnitude,
                });
            }

            if !q.is_placeable() {
                s.unplaceable += 1;
            }
        }

        s
    }

    pub fn pct(part: usize, total: usize) -> f64 {
        if total == 0 {
            0.0
        } else {
            (part as f64 / total as f64) * 100.0
        }
    }

    pub fn class_count(&self, class: MagnitudeClass) -> usize {
        self.by_class[class.index()]
    }

    /// Share of quakes at magnitude 5 or above. Quakes with no magnitude
    /// are left out even though they are drawn in the same class.
    pub fn strong_pct(&self) -> f64 {
        Self::pct(
            self.class_count(MagnitudeClass::Class5) - self.missing_magnitude,
            self.total,
        )
    }
}
