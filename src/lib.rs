mod compare_floats;
pub mod core;
pub mod errors;
mod form_input;
pub mod input;
pub mod output;
pub mod scoring_curve;
mod statistics;
#[cfg(test)]
mod tests;

#[macro_use]
extern crate is_close;
extern crate lazy_static;

pub use crate::core::coefficients::CoefficientTables;
pub use crate::core::scoring::{EstimationResult, ScoreLevel};
use crate::core::building::Building;
use crate::errors::{BersError, PostprocessingError};
use crate::input::{ingest_for_processing, ingest_form_for_processing};
use crate::output::Output;
use crate::scoring_curve::ScoringCurve;
use bitflags::bitflags;
use std::io::{Read, Write};
use std::sync::Arc;
use tracing::{info, warn};

bitflags! {
    #[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
    pub struct ProjectFlags: u32 {
        /// input is a flat web-form submission rather than a nested building input
        const FORM_INPUT = 0b1;
        /// also write the intermediate values of the estimation
        const BREAKDOWN = 0b10;
    }
}

/// Estimates one building.
///
/// The result is written under the `results` key of the output. The scoring curve follows on a
/// best-effort basis under `scoring_curve`, and the breakdown under `breakdown` when asked for.
/// Tables default to the bundled ones.
pub fn run_project(
    input: impl Read,
    output: impl Output,
    tables: Option<Arc<CoefficientTables>>,
    flags: &ProjectFlags,
) -> anyhow::Result<EstimationResult> {
    let input_for_processing = if flags.contains(ProjectFlags::FORM_INPUT) {
        ingest_form_for_processing(input)
    } else {
        ingest_for_processing(input)
    }
    .map_err(BersError::InvalidRequest)?;

    info!(
        "Estimating {} building {}",
        input_for_processing.estimation_system(),
        input_for_processing.building_name().unwrap_or("(unnamed)")
    );

    let input = input_for_processing.finalize();
    let tables = tables.unwrap_or_else(CoefficientTables::bundled);

    let mut building =
        Building::from_input(tables, &input).map_err(BersError::FailureInEstimation)?;
    let result = building
        .estimate()
        .map_err(BersError::FailureInEstimation)?;

    if !output.is_noop() {
        write_json(&output, "results", &result)
            .map_err(|error| BersError::ErrorInPostprocessing(PostprocessingError::new(error)))?;

        if let Err(error) = write_scoring_curve(&output, &result) {
            warn!("Could not write scoring curve: {error:#}");
        }

        if flags.contains(ProjectFlags::BREAKDOWN) {
            if let Some(breakdown) = building.breakdown() {
                write_json(&output, "breakdown", &breakdown).map_err(|error| {
                    BersError::ErrorInPostprocessing(PostprocessingError::new(error))
                })?;
            }
        }
    }

    Ok(result)
}

fn write_json(
    output: &impl Output,
    location_key: &str,
    value: &impl serde::Serialize,
) -> anyhow::Result<()> {
    let mut writer = output.writer_for_location_key(location_key, "json")?;
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.flush()?;

    Ok(())
}

fn write_scoring_curve(output: &impl Output, result: &EstimationResult) -> anyhow::Result<()> {
    let curve = ScoringCurve::from_result(result)?;
    let writer = output.writer_for_location_key("scoring_curve", "csv")?;

    curve.write_csv(writer)
}
