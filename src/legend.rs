//! Legend: last update time plus a count line per bucket.

use html_escape::encode_text;
use std::fmt;

use crate::feeds::BucketKey;
use crate::ledger::{LedgerSnapshot, latest_update};
use crate::present::format_timestamp;

/// A rendered view of one ledger snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Legend {
    pub updated: String,
    pub counts: Vec<(BucketKey, usize)>,
}

pub struct LegendPresenter;

impl LegendPresenter {
    /// "Updated" is the newest generation time across all buckets, not the
    /// time of whichever bucket refreshed last, so it does not depend on
    /// completion order.
    pub fn present(snapshot: &LedgerSnapshot) -> Legend {
        let updated = latest_update(snapshot)
            .map(format_timestamp)
            .unwrap_or_else(|| "pending".to_string());
        let counts = BucketKey::ALL
            .into_iter()
            .map(|b| (b, snapshot.get(&b).map(|e| e.count).unwrap_or_default()))
            .collect();
        Legend { updated, counts }
    }
}

impl Legend {
    pub fn lines(&self) -> Vec<String> {
        let mut lines = Vec::with_capacity(self.counts.len() + 1);
        lines.push(format!("Updated: {}", self.updated));
        for (bucket, count) in &self.counts {
            lines.push(format!("{}: {}", bucket.legend_label(), count));
        }
        lines
    }

    pub fn to_html(&self) -> String {
        self.lines()
            .iter()
            .map(|l| format!("<p>{}</p>", encode_text(l)))
            .collect()
    }
}

impl fmt::Display for Legend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.lines().join(" | "))
    }
}
