use crate::edge::{ConfidenceTier, EdgeKind};

/// Upper bound for confidence scores.
pub const MAX_SCORE: u8 = 100;

/// Score at or above which a heuristic edge is rated `High`.
pub const HIGH_CUTOFF: u8 = 90;

/// Score at or above which a heuristic edge is rated `Medium`.
pub const MEDIUM_CUTOFF: u8 = 70;

/// Map a method's raw score to the canonical confidence tier.
///
/// One lookup shared by every discovery method, so edges from different
/// methods stay comparable. `Absolute` is reserved for edges backed by a
/// real database constraint regardless of score.
pub fn tier_for(kind: EdgeKind, score: u8) -> ConfidenceTier {
    if kind == EdgeKind::DatabaseFk {
        return ConfidenceTier::Absolute;
    }
    if score >= HIGH_CUTOFF {
        ConfidenceTier::High
    } else if score >= MEDIUM_CUTOFF {
        ConfidenceTier::Medium
    } else {
        ConfidenceTier::Low
    }
}

/// Clamp a raw signal into the `0..=100` score range.
pub fn clamp_score(raw: i32) -> u8 {
    raw.clamp(0, MAX_SCORE as i32) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_fk_is_always_absolute() {
        assert_eq!(tier_for(EdgeKind::DatabaseFk, 100), ConfidenceTier::Absolute);
        assert_eq!(tier_for(EdgeKind::DatabaseFk, 0), ConfidenceTier::Absolute);
    }

    #[test]
    fn tier_boundaries() {
        assert_eq!(tier_for(EdgeKind::SmartFk, 95), ConfidenceTier::High);
        assert_eq!(tier_for(EdgeKind::ViewSource, 90), ConfidenceTier::High);
        assert_eq!(tier_for(EdgeKind::ViewSource, 89), ConfidenceTier::Medium);
        assert_eq!(tier_for(EdgeKind::SemanticMatch, 70), ConfidenceTier::Medium);
        assert_eq!(tier_for(EdgeKind::SemanticMatch, 69), ConfidenceTier::Low);
    }

    #[test]
    fn no_heuristic_reaches_absolute() {
        for kind in [
            EdgeKind::ViewSource,
            EdgeKind::SmartFk,
            EdgeKind::SemanticMatch,
            EdgeKind::CardinalityMatch,
        ] {
            assert_ne!(tier_for(kind, 100), ConfidenceTier::Absolute);
        }
    }

    #[test]
    fn clamps_out_of_range_scores() {
        assert_eq!(clamp_score(-5), 0);
        assert_eq!(clamp_score(140), 100);
        assert_eq!(clamp_score(85), 85);
    }
}
