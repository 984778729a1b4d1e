pub mod aquatic;
pub mod areas;
pub mod data_center;
pub mod heater;
pub mod hospitality;
pub mod parking_garage;
pub mod transport;
pub mod water_tower;

use crate::core::coefficients::es_operation::DEFAULT_SUB_SECTION;
use crate::core::coefficients::region::ClimateZone;
use crate::core::coefficients::CoefficientTables;
use crate::errors::EstimationError;
use crate::input::EstimationSystem;

/// What a facility knows about the building it belongs to when it resolves its coefficients.
#[derive(Clone, Copy, Debug)]
pub struct FacilityContext<'a> {
    pub tables: &'a CoefficientTables,
    pub estimation_system: EstimationSystem,
    pub building_type: &'a str,
    pub climate_zone: ClimateZone,
}

impl<'a> FacilityContext<'a> {
    pub(crate) fn operating_hours(&self, section_id: &str) -> Result<f64, EstimationError> {
        self.tables
            .es_operation
            .operating_hours(section_id, DEFAULT_SUB_SECTION)
    }

    pub(crate) fn operating_days(&self, section_id: &str) -> Result<f64, EstimationError> {
        self.tables
            .es_operation
            .operating_days(section_id, DEFAULT_SUB_SECTION)
    }
}

/// Area of a facility, falling back to the area of the section that embeds it.
pub(crate) fn facility_area(
    a: Option<f64>,
    section_area: Option<f64>,
    facility_name: &str,
) -> Result<f64, EstimationError> {
    a.or(section_area).ok_or_else(|| {
        EstimationError::configuration(format!("Area of {facility_name} is not defined."))
    })
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use std::sync::Arc;

    pub(crate) fn context(
        tables: &Arc<CoefficientTables>,
        estimation_system: EstimationSystem,
        climate_zone: ClimateZone,
    ) -> FacilityContext<'_> {
        FacilityContext {
            tables,
            estimation_system,
            building_type: "B2",
            climate_zone,
        }
    }
}
