use serde::{Deserialize, Serialize};

// Band edges of the raw matching score. Raw scores observed in practice sit
// roughly in [-10.4, 17]; anything outside the bands is clamped.
const FLOOR_SCORE: f64 = -8.0;
const GOOD_SCORE: f64 = 2.5;
const CEILING_SCORE: f64 = 4.0;
const GOOD_PERCENT: f64 = 80.0;

/// Map a raw matching score onto an integer percentage in `[0, 100]`.
///
/// Piecewise linear and monotonic non-decreasing:
///
/// | raw score        | percentage                          |
/// |------------------|-------------------------------------|
/// | `< -8`           | 0                                   |
/// | `[-8, 2.5)`      | `((s + 8) / 10.5) * 80`             |
/// | `[2.5, 4)`       | `80 + ((s - 2.5) / 1.5) * 20`       |
/// | `>= 4`           | 100                                 |
///
/// The result is floored. NaN maps to 0 so the function stays total.
pub fn normalize_score(score: f64) -> u8 {
    if score.is_nan() {
        return 0;
    }

    let percentage = if score < FLOOR_SCORE {
        0.0
    } else if score < GOOD_SCORE {
        ((score - FLOOR_SCORE) / (GOOD_SCORE - FLOOR_SCORE)) * GOOD_PERCENT
    } else if score < CEILING_SCORE {
        GOOD_PERCENT
            + ((score - GOOD_SCORE) / (CEILING_SCORE - GOOD_SCORE)) * (100.0 - GOOD_PERCENT)
    } else {
        100.0
    };

    percentage.floor().clamp(0.0, 100.0) as u8
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchQuality {
    Poor,
    Fair,
    Good,
    VeryGood,
    Excellent,
}

impl MatchQuality {
    /// Bucket a normalized percentage (not a raw score).
    pub fn from_percentage(percentage: u8) -> Self {
        match percentage {
            0..=19 => Self::Poor,
            20..=39 => Self::Fair,
            40..=59 => Self::Good,
            60..=79 => Self::VeryGood,
            _ => Self::Excellent,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Poor => "Poor match",
            Self::Fair => "Fair match",
            Self::Good => "Good match",
            Self::VeryGood => "Very good match",
            Self::Excellent => "Excellent match",
        }
    }
}

impl std::fmt::Display for MatchQuality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

pub fn match_quality_label(percentage: u8) -> &'static str {
    MatchQuality::from_percentage(percentage).label()
}

/// Longer explanation shown next to a ranked career.
pub fn match_reasoning(percentage: u8) -> &'static str {
    if percentage >= 85 {
        "Exceptional match - Your strengths, interests, and values align exceptionally well with this career."
    } else if percentage >= 75 {
        "Strong match - This career aligns well with your profile and natural inclinations."
    } else if percentage >= 65 {
        "Good match - Many aspects of this career suit your abilities and preferences."
    } else {
        "Moderate match - Some elements of this career align with your profile."
    }
}
