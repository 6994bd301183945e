use std::time::Duration;

use serde::Deserialize;

/// Options that control how discovery behaves.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DiscoverOptions {
    /// Maximum Levenshtein distance accepted by semantic matching.
    pub max_edit_distance: usize,
    /// Minimum shared columns for a view-to-table candidate.
    pub min_view_overlap_count: usize,
    /// Minimum fraction of a view's columns matched in the candidate table.
    pub min_view_overlap_ratio: f64,
    /// Per-table budget for FK introspection calls, in seconds.
    pub fk_timeout_secs: u64,
}

impl Default for DiscoverOptions {
    fn default() -> Self {
        Self {
            max_edit_distance: 2,
            min_view_overlap_count: 3,
            min_view_overlap_ratio: 0.5,
            fk_timeout_secs: 10,
        }
    }
}

impl DiscoverOptions {
    pub fn fk_timeout(&self) -> Duration {
        Duration::from_secs(self.fk_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_thresholds() {
        let options = DiscoverOptions::default();
        assert_eq!(options.max_edit_distance, 2);
        assert_eq!(options.min_view_overlap_count, 3);
        assert_eq!(options.min_view_overlap_ratio, 0.5);
        assert_eq!(options.fk_timeout(), Duration::from_secs(10));
    }
}
