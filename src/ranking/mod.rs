mod grade;
mod scorer;

pub use grade::{GRADE_TIERS, GradeTier, LOWEST_GRADE, color_for_grade, tier_for_score};
pub use scorer::{rank, score};
