use crate::core::coefficients::es_operation::remap_section_id;
use crate::core::coefficients::eui_benchmark::{EuiBenchmarkRow, EuiBenchmarkTable};
use crate::core::coefficients::region::{ClimateZone, CDD_REFERENCE_TOWN_CODES};
use crate::core::coefficients::CoefficientTables;
use crate::core::energy_section::{AcOperation, SectionBenchmark};
use crate::errors::EstimationError;
use polyfit_rs::polyfit_rs::polyfit;
use std::str::FromStr;
use strum_macros::{Display, EnumString};

#[derive(Clone, Copy, Debug, Display, EnumString, Eq, PartialEq)]
#[strum(serialize_all = "lowercase")]
pub enum EuiParameter {
    Min,
    M,
    Max,
}

impl EuiParameter {
    pub fn parse(parameter: &str) -> Result<Self, EstimationError> {
        EuiParameter::from_str(parameter).map_err(|_| {
            EstimationError::usage(format!(
                "Invalid EUI parameter {parameter:?}. \"min\", \"m\", \"max\" are the options."
            ))
        })
    }
}

#[derive(Clone, Copy, Debug, Display, EnumString, Eq, PartialEq)]
#[strum(serialize_all = "lowercase")]
pub enum EuiComponent {
    Eeui,
    Leui,
    Aeui,
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum AeuiSource {
    ClimateZone(ClimateZone),
    /// linear fit of the N/C/S columns against the reference towns' CDD ratios, evaluated at
    /// the building town's own ratio
    Regression {
        reference_cdd_ratios: [f64; 3],
        cdd_ratio: f64,
    },
}

/// Resolves benchmark EUI components of energy sections for one building location.
#[derive(Clone, Debug)]
pub struct EuiCriteria<'a> {
    tables: &'a CoefficientTables,
    aeui_source: AeuiSource,
}

impl<'a> EuiCriteria<'a> {
    /// Arguments
    /// * `climate_zone` - benchmark column to read AEUI from when not adjusting
    /// * `address` - county and town, needed for climate adjustment
    /// * `climate_adjustment` - interpolate AEUI across climate zones from cooling degree days
    pub fn new(
        tables: &'a CoefficientTables,
        climate_zone: Option<ClimateZone>,
        address: Option<(&str, &str)>,
        climate_adjustment: bool,
    ) -> Result<Self, EstimationError> {
        let aeui_source = if climate_adjustment {
            let (county, town) = address.ok_or_else(|| {
                EstimationError::configuration(
                    "Climate adjustment needs both the county and the town of the building.",
                )
            })?;

            let mut reference_cdd_ratios = [0.; 3];
            for (ratio, (town_code, _)) in reference_cdd_ratios
                .iter_mut()
                .zip(CDD_REFERENCE_TOWN_CODES.iter())
            {
                *ratio = tables.regions.cdd_ratio_for_town_code(*town_code)?;
            }

            AeuiSource::Regression {
                reference_cdd_ratios,
                cdd_ratio: tables.regions.cdd_ratio(county, town)?,
            }
        } else {
            AeuiSource::ClimateZone(climate_zone.ok_or_else(|| {
                EstimationError::configuration(
                    "Climate zone is not given and climate adjustment is off.",
                )
            })?)
        };

        Ok(Self {
            tables,
            aeui_source,
        })
    }

    fn table(&self, parameter: EuiParameter) -> &EuiBenchmarkTable {
        match parameter {
            EuiParameter::Min => &self.tables.eui_min,
            EuiParameter::M => &self.tables.eui_m,
            EuiParameter::Max => &self.tables.eui_max,
        }
    }

    /// One benchmark value. A missing EEUI or LEUI cell is a data error; a missing AEUI cell
    /// reads as NaN so the caller can report every section at once.
    pub fn criteria(
        &self,
        section_id: &str,
        ac_operation: AcOperation,
        parameter: EuiParameter,
        component: EuiComponent,
    ) -> Result<f64, EstimationError> {
        let section_id = remap_section_id(section_id);
        let row = self.table(parameter).row(section_id)?;

        let defined = |value: Option<f64>| {
            value.filter(|value| !value.is_nan()).ok_or_else(|| {
                EstimationError::data(format!(
                    "{component} ({parameter}) is not defined for es {section_id}."
                ))
            })
        };

        match component {
            EuiComponent::Eeui => defined(row.eeui),
            EuiComponent::Leui => defined(row.leui),
            EuiComponent::Aeui => self.aeui(row, ac_operation),
        }
    }

    fn aeui(&self, row: &EuiBenchmarkRow, ac_operation: AcOperation) -> Result<f64, EstimationError> {
        match self.aeui_source {
            AeuiSource::ClimateZone(climate_zone) => Ok(row.aeui(climate_zone, ac_operation)),
            AeuiSource::Regression {
                reference_cdd_ratios,
                cdd_ratio,
            } => {
                let reference_aeui: Vec<f64> = CDD_REFERENCE_TOWN_CODES
                    .iter()
                    .map(|(_, climate_zone)| row.aeui(*climate_zone, ac_operation))
                    .collect();
                if reference_aeui.iter().any(|aeui| aeui.is_nan()) {
                    return Ok(f64::NAN);
                }

                let coefficients = polyfit(&reference_cdd_ratios, &reference_aeui, 1)
                    .map_err(|err| EstimationError::data(format!("AEUI regression failed: {err}")))?;

                // coefficients run from the constant term upwards
                Ok(coefficients[0] + coefficients[1] * cdd_ratio)
            }
        }
    }

    /// Every benchmark component of a section in one go.
    pub fn benchmark(
        &self,
        section_id: &str,
        ac_operation: AcOperation,
    ) -> Result<SectionBenchmark, EstimationError> {
        let value = |parameter, component| self.criteria(section_id, ac_operation, parameter, component);

        Ok(SectionBenchmark {
            eeui_m: value(EuiParameter::M, EuiComponent::Eeui)?,
            leui_min: value(EuiParameter::Min, EuiComponent::Leui)?,
            leui_m: value(EuiParameter::M, EuiComponent::Leui)?,
            leui_max: value(EuiParameter::Max, EuiComponent::Leui)?,
            aeui_min: value(EuiParameter::Min, EuiComponent::Aeui)?,
            aeui_m: value(EuiParameter::M, EuiComponent::Aeui)?,
            aeui_max: value(EuiParameter::Max, EuiComponent::Aeui)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use pretty_assertions::assert_eq;
    use rstest::*;
    use std::sync::Arc;

    #[fixture]
    fn tables() -> Arc<CoefficientTables> {
        CoefficientTables::bundled()
    }

    #[rstest]
    fn test_criteria_by_climate_zone(tables: Arc<CoefficientTables>) {
        let criteria = EuiCriteria::new(&tables, Some(ClimateZone::N), None, false).unwrap();

        assert_relative_eq!(
            criteria
                .criteria("B2", AcOperation::Interval, EuiParameter::M, EuiComponent::Aeui)
                .unwrap(),
            108.
        );
        assert_relative_eq!(
            criteria
                .criteria("B2", AcOperation::Continue, EuiParameter::M, EuiComponent::Aeui)
                .unwrap(),
            172.8
        );
        assert_relative_eq!(
            criteria
                .criteria("B2", AcOperation::Continue, EuiParameter::M, EuiComponent::Eeui)
                .unwrap(),
            62.
        );
    }

    #[rstest]
    fn test_benchmark_is_ordered(tables: Arc<CoefficientTables>) {
        let criteria = EuiCriteria::new(&tables, Some(ClimateZone::S), None, false).unwrap();
        let benchmark = criteria.benchmark("A1", AcOperation::Interval).unwrap();

        assert!(benchmark.leui_min <= benchmark.leui_m && benchmark.leui_m <= benchmark.leui_max);
        assert!(benchmark.aeui_min <= benchmark.aeui_m && benchmark.aeui_m <= benchmark.aeui_max);
        assert!(!benchmark.has_missing_aeui());
    }

    #[rstest]
    fn test_climate_adjustment_regresses_over_reference_towns(tables: Arc<CoefficientTables>) {
        let criteria =
            EuiCriteria::new(&tables, None, Some(("臺北市", "大安區")), true).unwrap();

        let ratios: Vec<f64> = CDD_REFERENCE_TOWN_CODES
            .iter()
            .map(|(code, _)| tables.regions.cdd_ratio_for_town_code(*code).unwrap())
            .collect();
        let row = tables.eui_m.row("B2").unwrap();
        let aeui: Vec<f64> = [ClimateZone::N, ClimateZone::C, ClimateZone::S]
            .iter()
            .map(|zone| row.aeui(*zone, AcOperation::Interval))
            .collect();

        // ordinary least squares by hand
        let mean_x = ratios.iter().sum::<f64>() / 3.;
        let mean_y = aeui.iter().sum::<f64>() / 3.;
        let slope = ratios
            .iter()
            .zip(&aeui)
            .map(|(x, y)| (x - mean_x) * (y - mean_y))
            .sum::<f64>()
            / ratios.iter().map(|x| (x - mean_x).powi(2)).sum::<f64>();
        let intercept = mean_y - slope * mean_x;
        let cdd_ratio = tables.regions.cdd_ratio("臺北市", "大安區").unwrap();

        assert_relative_eq!(
            criteria
                .criteria("B2", AcOperation::Interval, EuiParameter::M, EuiComponent::Aeui)
                .unwrap(),
            intercept + slope * cdd_ratio,
            max_relative = 1e-6
        );
    }

    #[rstest]
    fn test_missing_zone_without_adjustment(tables: Arc<CoefficientTables>) {
        assert!(EuiCriteria::new(&tables, None, Some(("臺北市", "大安區")), false)
            .unwrap_err()
            .is_configuration());
        assert!(EuiCriteria::new(&tables, Some(ClimateZone::N), None, true)
            .unwrap_err()
            .is_configuration());
    }

    #[rstest]
    fn test_unknown_section_is_a_data_error(tables: Arc<CoefficientTables>) {
        let criteria = EuiCriteria::new(&tables, Some(ClimateZone::C), None, false).unwrap();
        assert!(criteria
            .benchmark("Z9", AcOperation::Interval)
            .unwrap_err()
            .is_data());
    }

    #[rstest]
    #[case("min", EuiParameter::Min)]
    #[case("m", EuiParameter::M)]
    #[case("max", EuiParameter::Max)]
    fn test_eui_parameter(#[case] text: &str, #[case] expected: EuiParameter) {
        assert_eq!(EuiParameter::parse(text).unwrap(), expected);
        assert_eq!(expected.to_string(), text);
    }

    #[rstest]
    fn test_invalid_eui_parameter_is_a_usage_error() {
        assert!(EuiParameter::parse("median").unwrap_err().is_usage());
    }
}
