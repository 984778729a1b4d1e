/// Carbon emission coefficient of grid electricity, in kgCO2e/kWh
pub const COEF_ECE: f64 = 0.509;
/// Carbon emission coefficient of natural gas, in kgCO2e/kWh-equivalent
pub const COEF_GCE: f64 = 2.114;

pub const HOURS_PER_YEAR: u32 = 8_760;
pub const DAYS_PER_YEAR: u32 = 365;
pub const MINUTES_PER_HOUR: u32 = 60;
pub const LITRES_PER_CUBIC_METRE: u32 = 1_000;

/// Convert an emission in kgCO2e into the equivalent electricity use in kWh.
pub fn carbon_to_electricity(carbon: f64) -> f64 {
    carbon / COEF_ECE
}

/// Convert a volumetric flow in m3/h into L/min.
pub fn cubic_metres_per_hour_to_litres_per_minute(flow: f64) -> f64 {
    flow * LITRES_PER_CUBIC_METRE as f64 / MINUTES_PER_HOUR as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::*;

    #[rstest]
    fn test_carbon_to_electricity() {
        assert_relative_eq!(carbon_to_electricity(50.9), 100.);
    }

    #[rstest]
    fn test_cubic_metres_per_hour_to_litres_per_minute() {
        assert_relative_eq!(cubic_metres_per_hour_to_litres_per_minute(0.6), 10.);
    }
}
