use crate::compare_floats::{max_of_2, min_of_2};
use crate::errors::EstimationError;
use crate::input::EnergyConsumptionInput;

const MONTHLY_READINGS_PER_YEAR: usize = 12;
const BIMONTHLY_READINGS_PER_YEAR: usize = 6;

// smallest accepted ratio of the lowest to the highest yearly mean
const MIN_ANNUAL_MEAN_RATIO: f64 = 0.8;
// smallest accepted ratio of the lowest to the highest single reading
const MIN_READING_RATIO: f64 = 0.5;

/// Annual metered consumption in kWh.
///
/// A series of readings has to cover whole years; the result is the mean yearly total.
pub fn annual_consumption(ec: &EnergyConsumptionInput) -> Result<f64, EstimationError> {
    match ec {
        EnergyConsumptionInput::Annual(consumption) => {
            if !(consumption.is_finite() && *consumption >= 0.) {
                return Err(EstimationError::configuration(format!(
                    "Annual energy consumption must be a non-negative number, not {consumption}."
                )));
            }
            Ok(*consumption)
        }
        EnergyConsumptionInput::Monthly { monthly } => {
            series_annual_consumption(monthly, MONTHLY_READINGS_PER_YEAR, "monthly")
        }
        EnergyConsumptionInput::Bimonthly { bimonthly } => {
            series_annual_consumption(bimonthly, BIMONTHLY_READINGS_PER_YEAR, "bimonthly")
        }
    }
}

fn series_annual_consumption(
    readings: &[f64],
    readings_per_year: usize,
    series_name: &str,
) -> Result<f64, EstimationError> {
    if readings.is_empty() || readings.len() % readings_per_year != 0 {
        return Err(EstimationError::configuration(format!(
            "{} {series_name} readings do not cover whole years of {readings_per_year} readings.",
            readings.len()
        )));
    }

    if let Some(reading) = readings.iter().find(|reading| !(**reading > 0.)) {
        return Err(EstimationError::configuration(format!(
            "Energy consumption readings must be positive, found {reading}."
        )));
    }

    let annual_means: Vec<f64> = readings
        .chunks(readings_per_year)
        .map(|year| year.iter().sum::<f64>() / readings_per_year as f64)
        .collect();

    let annual_mean_ratio = spread_ratio(&annual_means);
    if annual_mean_ratio < MIN_ANNUAL_MEAN_RATIO {
        return Err(EstimationError::configuration(format!(
            "The lowest yearly mean of the {series_name} readings is {:.0}% of the highest, below the accepted {:.0}%.",
            annual_mean_ratio * 100.,
            MIN_ANNUAL_MEAN_RATIO * 100.
        )));
    }

    let reading_ratio = spread_ratio(readings);
    if reading_ratio < MIN_READING_RATIO {
        return Err(EstimationError::configuration(format!(
            "The lowest {series_name} reading is {:.0}% of the highest, below the accepted {:.0}%.",
            reading_ratio * 100.,
            MIN_READING_RATIO * 100.
        )));
    }

    let n_years = (readings.len() / readings_per_year) as f64;
    Ok(readings.iter().sum::<f64>() / n_years)
}

fn spread_ratio(values: &[f64]) -> f64 {
    let (lowest, highest) = values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lowest, highest), value| {
            (min_of_2(lowest, *value), max_of_2(highest, *value))
        });

    lowest / highest
}
