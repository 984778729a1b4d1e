use super::FacilityContext;
use crate::core::coefficients::facility_tables::HeaterFuel;
use crate::core::units::{COEF_ECE, COEF_GCE};
use crate::errors::EstimationError;
use crate::input::HeaterInput;

/// Heater types whose hot water runs through a distribution pipeline, so the pipeline
/// insulation credit applies: electric, and the gas instantaneous, storage and heat-recovery
/// types. Heat pumps and solar heaters heat at the point of use.
const PIPELINE_HEATER_TYPES: [&str; 4] = ["1", "2.1", "2.2", "2.3"];

#[derive(Clone, Debug)]
pub struct Heater {
    pub(crate) heater_type: String,
    pub(crate) quantity: f64,
    pub(crate) fuel: HeaterFuel,
    pub(crate) coef_emission_intensity: f64, // kgCO2e per heater and year
    pub(crate) coef_eff: f64,
    pub(crate) coef_eff_powersaving_hotwater_pipeline: f64,
}

impl Heater {
    pub fn new(context: &FacilityContext, input: &HeaterInput) -> Result<Self, EstimationError> {
        let facilities = &context.tables.facilities;
        let (fuel, yce) = facilities.heater_emission(&input.heater_type)?;
        let fuel_multiplier = match fuel {
            HeaterFuel::Electricity => COEF_ECE,
            HeaterFuel::Gas => COEF_GCE,
        };

        Ok(Self {
            heater_type: input.heater_type.clone(),
            quantity: input.quantity,
            fuel,
            coef_emission_intensity: yce * fuel_multiplier,
            coef_eff: facilities.heater_efficiency(&input.energy_rating)?,
            coef_eff_powersaving_hotwater_pipeline: input.coef_eff_powersaving_hotwater_pipeline,
        })
    }

    pub fn fuel(&self) -> HeaterFuel {
        self.fuel
    }

    pub fn has_hot_water_pipeline(&self) -> bool {
        PIPELINE_HEATER_TYPES.contains(&self.heater_type.as_str())
    }

    /// Annual emission of the installed heaters per household member, in kgCO2e.
    pub fn reference_emission(&self) -> f64 {
        self.quantity * self.coef_emission_intensity
    }

    /// Like [`Self::reference_emission`] with the rated efficiency and pipeline credits.
    pub fn simulated_emission(&self) -> f64 {
        let pipeline = if self.has_hot_water_pipeline() {
            self.coef_eff_powersaving_hotwater_pipeline
        } else {
            1.0
        };

        self.reference_emission() * self.coef_eff * pipeline
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::coefficients::region::ClimateZone;
    use crate::core::coefficients::CoefficientTables;
    use crate::core::facility::test_support::context;
    use crate::input::EstimationSystem;
    use approx::assert_relative_eq;
    use pretty_assertions::assert_eq;
    use rstest::*;
    use std::sync::Arc;

    #[fixture]
    fn tables() -> Arc<CoefficientTables> {
        CoefficientTables::bundled()
    }

    fn heater_input(heater_type: &str, energy_rating: &str) -> HeaterInput {
        HeaterInput {
            heater_type: heater_type.to_string(),
            quantity: 2.,
            energy_rating: energy_rating.to_string(),
            coef_eff_powersaving_hotwater_pipeline: 0.9,
        }
    }

    #[rstest]
    fn test_gas_heater_with_pipeline(tables: Arc<CoefficientTables>) {
        let context = context(&tables, EstimationSystem::Rbers, ClimateZone::N);
        let heater = Heater::new(&context, &heater_input("2.1", "2")).unwrap();

        assert_eq!(heater.fuel(), HeaterFuel::Gas);
        assert!(heater.has_hot_water_pipeline());
        assert_relative_eq!(heater.coef_emission_intensity, 110. * 2.114);
        assert_relative_eq!(heater.reference_emission(), 2. * 110. * 2.114);
        assert_relative_eq!(heater.simulated_emission(), 2. * 110. * 2.114 * 0.8 * 0.9);
    }

    #[rstest]
    fn test_heat_pump_ignores_pipeline_credit(tables: Arc<CoefficientTables>) {
        let context = context(&tables, EstimationSystem::Rbers, ClimateZone::N);
        let heater = Heater::new(&context, &heater_input("3", "none")).unwrap();

        assert!(!heater.has_hot_water_pipeline());
        assert_relative_eq!(heater.simulated_emission(), 2. * 160. * 0.509);
    }

    #[rstest]
    fn test_unknown_heater_type(tables: Arc<CoefficientTables>) {
        let context = context(&tables, EstimationSystem::Rbers, ClimateZone::N);
        assert!(Heater::new(&context, &heater_input("9", "none"))
            .unwrap_err()
            .is_data());
    }
}
