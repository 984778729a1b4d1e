use crate::compare_floats::clamp_to_range;
use crate::errors::EstimationError;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

pub const SCORE_MIN: f64 = 0.;
pub const SCORE_MAX: f64 = 100.;
/// Score of a building exactly at the green benchmark.
pub const SCORE_AT_GREEN: f64 = 50.;

/// Grade of a score, from `1+` (best) to `7`.
#[derive(
    Clone, Copy, Debug, Deserialize, Display, EnumIter, EnumString, Eq, Hash, PartialEq, Serialize,
)]
pub enum ScoreLevel {
    #[serde(rename = "1+")]
    #[strum(serialize = "1+")]
    OnePlus,
    #[serde(rename = "1")]
    #[strum(serialize = "1")]
    One,
    #[serde(rename = "2")]
    #[strum(serialize = "2")]
    Two,
    #[serde(rename = "3")]
    #[strum(serialize = "3")]
    Three,
    #[serde(rename = "4")]
    #[strum(serialize = "4")]
    Four,
    #[serde(rename = "5")]
    #[strum(serialize = "5")]
    Five,
    #[serde(rename = "6")]
    #[strum(serialize = "6")]
    Six,
    #[serde(rename = "7")]
    #[strum(serialize = "7")]
    Seven,
}

impl ScoreLevel {
    /// Inclusive lower score bound of the level.
    pub fn lower_bound(&self) -> f64 {
        match self {
            ScoreLevel::OnePlus => 90.,
            ScoreLevel::One => 80.,
            ScoreLevel::Two => 70.,
            ScoreLevel::Three => 60.,
            ScoreLevel::Four => 50.,
            ScoreLevel::Five => 40.,
            ScoreLevel::Six => 20.,
            ScoreLevel::Seven => 0.,
        }
    }

    /// Level of a score within `[0, 100]`; lower scores fall into `7`.
    pub fn from_score(score: f64) -> Self {
        [
            ScoreLevel::OnePlus,
            ScoreLevel::One,
            ScoreLevel::Two,
            ScoreLevel::Three,
            ScoreLevel::Four,
            ScoreLevel::Five,
            ScoreLevel::Six,
        ]
        .into_iter()
        .find(|level| score >= level.lower_bound())
        .unwrap_or(ScoreLevel::Seven)
    }
}

/// Benchmark positions a building is scored against. Lower values are better.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScoringScale {
    /// value scoring 100 on the BERSe scale, 90 on the R-BERS one
    pub lower: f64,
    /// green benchmark, scoring 50
    pub g: f64,
    /// value scoring 0
    pub max: f64,
    /// score points between the green benchmark and `lower`
    pub lower_spread: f64,
}

impl ScoringScale {
    /// Piecewise-linear score of a value, clamped to `[0, 100]`.
    ///
    /// When the benchmarks collapse onto each other the score is 50 at the green benchmark, 100
    /// below it and 0 above it.
    pub fn score(&self, value: f64) -> Result<f64, EstimationError> {
        let Self {
            lower,
            g,
            max,
            lower_spread,
        } = *self;

        let score = if value <= g {
            if is_close!(g, lower, rel_tol = 1e-09, abs_tol = 1e-10) {
                if is_close!(value, g, rel_tol = 1e-09, abs_tol = 1e-10) {
                    SCORE_AT_GREEN
                } else {
                    SCORE_MAX
                }
            } else {
                SCORE_AT_GREEN + lower_spread * (g - value) / (g - lower)
            }
        } else if is_close!(max, g, rel_tol = 1e-09, abs_tol = 1e-10) {
            SCORE_MIN
        } else {
            SCORE_AT_GREEN * (max - value) / (max - g)
        };

        if score.is_nan() {
            return Err(EstimationError::data(format!(
                "Score of {value} against benchmarks (lower {lower}, g {g}, max {max}) is undefined."
            )));
        }

        Ok(clamp_to_range(score, SCORE_MIN, SCORE_MAX))
    }
}

/// The numeric result of one estimation.
///
/// BERSe results carry `est_cei` only; R-BERS results carry the full set of CEI benchmarks,
/// with `est_eui_min` and `est_cei_min` holding the "n" benchmark.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct EstimationResult {
    pub est_eui: f64,
    pub est_eui_min: f64,
    pub est_eui_g: f64,
    pub est_eui_m: f64,
    pub est_eui_max: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub est_cei: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub est_cei_min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub est_cei_g: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub est_cei_m: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub est_cei_max: Option<f64>,
    pub est_score: f64,
    pub est_score_level: ScoreLevel,
}
