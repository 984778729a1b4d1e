use crate::compare_floats::max_of_2;
use crate::core::scoring::{EstimationResult, ScoreLevel};
use anyhow::bail;
use csv::WriterBuilder;
use serde::Serialize;
use std::io::Write;
use strum::IntoEnumIterator;
use strum_macros::Display;

const TICK_SCORES: [f64; 9] = [100., 90., 80., 70., 60., 50., 40., 20., 0.];

/// Quantity the curve is drawn over.
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum CurveQuantity {
    #[strum(serialize = "EUI")]
    Eui,
    #[strum(serialize = "CEI")]
    Cei,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CurveTick {
    pub score: f64,
    pub position: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LevelBand {
    pub level: ScoreLevel,
    pub start: f64,
    pub end: f64,
}

/// Positions of the score ticks and level bands on the EUI (or CEI) axis, with the building's
/// own marker.
#[derive(Clone, Debug, PartialEq)]
pub struct ScoringCurve {
    pub quantity: CurveQuantity,
    pub ticks: Vec<CurveTick>,
    pub bands: Vec<LevelBand>,
    /// the building's value, never drawn below the minimum benchmark
    pub marker: f64,
    pub score: f64,
    pub level: ScoreLevel,
}

#[derive(Serialize)]
struct CurveRow {
    element: &'static str,
    label: String,
    start: f64,
    end: f64,
}

impl ScoringCurve {
    /// R-BERS results are drawn over CEI, BERSe results over EUI.
    pub fn from_result(result: &EstimationResult) -> anyhow::Result<Self> {
        let (quantity, value, min, g, max) = match (
            result.est_cei,
            result.est_cei_min,
            result.est_cei_g,
            result.est_cei_max,
        ) {
            (Some(cei), Some(cei_min), Some(cei_g), Some(cei_max)) => {
                (CurveQuantity::Cei, cei, cei_min, cei_g, cei_max)
            }
            _ => (
                CurveQuantity::Eui,
                result.est_eui,
                result.est_eui_min,
                result.est_eui_g,
                result.est_eui_max,
            ),
        };

        if [value, min, g, max].iter().any(|position| !position.is_finite()) {
            bail!("Cannot draw a {quantity} curve through non-finite benchmarks (min {min}, g {g}, max {max}) or value {value}");
        }
        if !(min <= g && g <= max) {
            bail!("{quantity} benchmarks are out of order: min {min}, g {g}, max {max}");
        }

        let positions = tick_positions(min, g, max);
        let ticks = TICK_SCORES
            .iter()
            .zip(positions)
            .map(|(&score, position)| CurveTick { score, position })
            .collect();
        let bands = ScoreLevel::iter()
            .zip(positions.windows(2))
            .map(|(level, window)| LevelBand {
                level,
                start: window[0],
                end: window[1],
            })
            .collect();

        Ok(Self {
            quantity,
            ticks,
            bands,
            marker: max_of_2(value, min),
            score: result.est_score,
            level: result.est_score_level,
        })
    }

    pub fn write_csv(&self, writer: impl Write) -> anyhow::Result<()> {
        let mut writer = WriterBuilder::new().from_writer(writer);

        for tick in &self.ticks {
            writer.serialize(CurveRow {
                element: "tick",
                label: tick.score.to_string(),
                start: tick.position,
                end: tick.position,
            })?;
        }
        for band in &self.bands {
            writer.serialize(CurveRow {
                element: "band",
                label: band.level.to_string(),
                start: band.start,
                end: band.end,
            })?;
        }
        writer.serialize(CurveRow {
            element: "marker",
            label: format!("{} {:.2} (score {:.1}, level {})", self.quantity, self.marker, self.score, self.level),
            start: self.marker,
            end: self.marker,
        })?;

        writer.flush()?;

        Ok(())
    }
}

/// Ticks for scores 100 to 50 split `[min, g]` in fifths; ticks for 40, 20 and 0 sit at odd
/// fifths of `[g, max]`.
fn tick_positions(min: f64, g: f64, max: f64) -> [f64; 9] {
    let mut positions = [0.; 9];
    for i in 0..6 {
        positions[i] = g - (g - min) * (5 - i) as f64 / 5.;
    }
    for i in 0..3 {
        positions[6 + i] = g + (max - g) * (2 * i + 1) as f64 / 5.;
    }
    positions
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[fixture]
    fn office_result() -> EstimationResult {
        EstimationResult {
            est_eui: 80.,
            est_eui_min: 50.,
            est_eui_g: 100.,
            est_eui_m: 150.,
            est_eui_max: 200.,
            est_cei: Some(40.72),
            est_cei_min: None,
            est_cei_g: None,
            est_cei_m: None,
            est_cei_max: None,
            est_score: 70.,
            est_score_level: ScoreLevel::Two,
        }
    }

    #[rstest]
    fn test_tick_positions(office_result: EstimationResult) {
        let curve = ScoringCurve::from_result(&office_result).unwrap();

        assert_eq!(curve.quantity, CurveQuantity::Eui);
        let positions: Vec<f64> = curve.ticks.iter().map(|tick| tick.position).collect();
        for (position, expected) in positions
            .iter()
            .zip([50., 60., 70., 80., 90., 100., 120., 160., 200.])
        {
            assert_relative_eq!(*position, expected);
        }
        assert_eq!(curve.ticks[0].score, 100.);
        assert_eq!(curve.ticks[8].score, 0.);
    }

    #[rstest]
    fn test_level_bands_lie_between_ticks(office_result: EstimationResult) {
        let curve = ScoringCurve::from_result(&office_result).unwrap();

        assert_eq!(curve.bands.len(), 8);
        assert_eq!(curve.bands[0].level, ScoreLevel::OnePlus);
        assert_eq!(curve.bands[7].level, ScoreLevel::Seven);
        assert_relative_eq!(curve.bands[2].start, 70.);
        assert_relative_eq!(curve.bands[2].end, 80.);
    }

    #[rstest]
    fn test_marker_is_clamped_to_minimum(mut office_result: EstimationResult) {
        office_result.est_eui = 20.;

        let curve = ScoringCurve::from_result(&office_result).unwrap();

        assert_eq!(curve.marker, 50.);
    }

    #[rstest]
    fn test_residential_result_is_drawn_over_carbon(mut office_result: EstimationResult) {
        office_result.est_cei = Some(30.);
        office_result.est_cei_min = Some(20.);
        office_result.est_cei_g = Some(40.);
        office_result.est_cei_m = Some(50.);
        office_result.est_cei_max = Some(60.);

        let curve = ScoringCurve::from_result(&office_result).unwrap();

        assert_eq!(curve.quantity, CurveQuantity::Cei);
        assert_eq!(curve.marker, 30.);
        assert_relative_eq!(curve.ticks[5].position, 40.);
    }

    #[rstest]
    fn test_non_finite_benchmark_is_rejected(mut office_result: EstimationResult) {
        office_result.est_eui_g = f64::NAN;

        assert!(ScoringCurve::from_result(&office_result).is_err());
    }

    #[rstest]
    fn test_csv_has_a_row_per_tick_band_and_marker(office_result: EstimationResult) {
        let mut buffer = vec![];
        ScoringCurve::from_result(&office_result)
            .unwrap()
            .write_csv(&mut buffer)
            .unwrap();

        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "element,label,start,end");
        assert_eq!(lines.len(), 1 + 9 + 8 + 1);
        assert_eq!(lines[1], "tick,100,50.0,50.0");
        assert!(lines[18].starts_with("marker,"));
    }
}
