/// A single entry in the grade ladder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GradeTier {
    /// Display label, e.g. "B+" or "SSS".
    pub label: &'static str,

    /// Minimum score required to reach this tier.
    pub min_score: u64,

    /// Badge color used when rendering this tier, as a hex triplet without `#`.
    pub color: &'static str,
}

/// The grade ladder, ascending by `min_score`. The first entry has
/// `min_score = 0` so every score maps to some tier.
pub const GRADE_TIERS: [GradeTier; 18] = [
    GradeTier { label: "D-", min_score: 0, color: "933" },
    GradeTier { label: "D", min_score: 5, color: "933" },
    GradeTier { label: "D+", min_score: 10, color: "933" },
    GradeTier { label: "C-", min_score: 20, color: "999" },
    GradeTier { label: "C", min_score: 30, color: "999" },
    GradeTier { label: "C+", min_score: 40, color: "999" },
    GradeTier { label: "B-", min_score: 60, color: "669" },
    GradeTier { label: "B", min_score: 80, color: "669" },
    GradeTier { label: "B+", min_score: 100, color: "669" },
    GradeTier { label: "A-", min_score: 150, color: "396" },
    GradeTier { label: "A", min_score: 200, color: "396" },
    GradeTier { label: "A+", min_score: 300, color: "396" },
    GradeTier { label: "S-", min_score: 500, color: "FB2" },
    GradeTier { label: "S", min_score: 800, color: "FB2" },
    GradeTier { label: "S+", min_score: 1200, color: "FB2" },
    GradeTier { label: "SS", min_score: 2000, color: "F84" },
    GradeTier { label: "SS+", min_score: 3500, color: "F84" },
    GradeTier { label: "SSS", min_score: 5000, color: "F42" },
];

/// Label of the lowest tier, used as the default grade before scoring.
pub const LOWEST_GRADE: &str = GRADE_TIERS[0].label;

/// Find the highest tier whose threshold the score meets.
///
/// Scans the ladder from the top so a score equal to a tier's `min_score`
/// selects that tier rather than the one below it.
#[must_use]
pub fn tier_for_score(score: u64) -> &'static GradeTier {
    GRADE_TIERS
        .iter()
        .rev()
        .find(|tier| score >= tier.min_score)
        .unwrap_or(&GRADE_TIERS[0])
}

/// Look up the badge color for a grade label, defaulting to neutral gray
/// for labels not present in the ladder.
#[must_use]
pub fn color_for_grade(label: &str) -> &'static str {
    GRADE_TIERS
        .iter()
        .find(|tier| tier.label == label)
        .map_or("999", |tier| tier.color)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ladder_is_ascending_and_starts_at_zero() {
        assert_eq!(GRADE_TIERS[0].min_score, 0);
        for pair in GRADE_TIERS.windows(2) {
            assert!(pair[0].min_score < pair[1].min_score);
        }
    }

    #[test]
    fn ladder_has_eighteen_tiers() {
        assert_eq!(GRADE_TIERS.len(), 18);
        assert_eq!(GRADE_TIERS[0].label, "D-");
        assert_eq!(GRADE_TIERS[17].label, "SSS");
    }

    #[test]
    fn zero_score_is_lowest_tier() {
        assert_eq!(tier_for_score(0).label, "D-");
    }

    #[test]
    fn exact_threshold_selects_that_tier() {
        assert_eq!(tier_for_score(5).label, "D");
        assert_eq!(tier_for_score(100).label, "B+");
        assert_eq!(tier_for_score(1200).label, "S+");
        assert_eq!(tier_for_score(5000).label, "SSS");
    }

    #[test]
    fn just_below_threshold_selects_previous_tier() {
        assert_eq!(tier_for_score(4).label, "D-");
        assert_eq!(tier_for_score(99).label, "B");
        assert_eq!(tier_for_score(4999).label, "SS+");
    }

    #[test]
    fn huge_score_is_top_tier() {
        assert_eq!(tier_for_score(u64::MAX).label, "SSS");
    }

    #[test]
    fn color_lookup() {
        assert_eq!(color_for_grade("D-"), "933");
        assert_eq!(color_for_grade("A+"), "396");
        assert_eq!(color_for_grade("SSS"), "F42");
        assert_eq!(color_for_grade("not-a-grade"), "999");
    }
}
