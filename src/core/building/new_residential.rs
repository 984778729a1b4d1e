use super::{BuildingCommon, SectionBreakdown};
use crate::core::coefficients::CoefficientTables;
use crate::core::criteria::EuiCriteria;
use crate::core::energy_section::{AcOperation, EnergySection, NonResidentialEnergySection};
use crate::core::facility::water_tower::{average_hydraulic_head, combined_pumping_efficiency, WaterTower};
use crate::core::scoring::{EstimationResult, ScoreLevel, ScoringScale};
use crate::core::units::{carbon_to_electricity, COEF_ECE, DAYS_PER_YEAR, LITRES_PER_CUBIC_METRE};
use crate::errors::EstimationError;
use crate::input::{BuildingInput, EnergySectionInput, NonResidentialEnergySectionInput};
use serde::Serialize;
use std::str::FromStr;
use std::sync::Arc;
use strum_macros::{Display, EnumString};
use tracing::{debug, info};

// benchmark carbon of a green building and of the best ("n") building, relative to the median
const GREEN_SHARE: f64 = 0.9;
const BEST_SHARE: f64 = 0.7;
const SCORE_SPREAD: f64 = 40.;

const ENVELOPE_CREDIT: f64 = 0.12;
const PERSONS_PER_HOUSE: f64 = 4.;
const PERSONS_PER_SUITE: f64 = 2.;
const PERSONS_PER_BIG_HOUSEHOLD: f64 = 3.;

// water drawn through the pumps: share of the consumption, and m3 per person and day
const PUMPED_WATER_SHARE: f64 = 0.6;
const RESIDENTIAL_WATER_PER_PERSON: f64 = 0.225;
// kWh per m3 and metre of head
const PUMPING_INTENSITY: f64 = 0.0183;

const RESIDENTIAL_SECTION_PREFIX: char = 'R';
const PUBLIC_SECTION_PREFIX: char = 'P';

#[derive(Clone, Copy, Debug, Display, EnumString, Eq, PartialEq, Serialize)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum ResidentialType {
    House,
    Apartment,
}

/// Household counts of an apartment building.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Households {
    /// suites of up to two rooms
    pub n_suite: f64,
    /// households of three rooms or more
    pub n_household_big: f64,
}

impl Households {
    pub fn n_household(&self) -> f64 {
        self.n_suite + self.n_household_big
    }

    pub fn n_people_per_household(&self) -> Result<f64, EstimationError> {
        let n_household = self.n_household();
        if !(n_household > 0.) {
            return Err(EstimationError::configuration(
                "An apartment building needs at least one household.",
            ));
        }

        Ok((PERSONS_PER_SUITE * self.n_suite + PERSONS_PER_BIG_HOUSEHOLD * self.n_household_big)
            / n_household)
    }
}

/// Efficiency multipliers of the building as designed.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct DesignEfficiency {
    pub coef_eff_ac_residential: f64,
    pub coef_eff_ac_nonresidential: f64,
    pub coef_eff_envelope: f64,
    pub coef_eff_lighting_residential: f64,
    pub coef_eff_lighting_nonresidential: f64,
}

impl DesignEfficiency {
    fn from_input(input: &BuildingInput) -> Self {
        Self {
            coef_eff_ac_residential: input.coef_eff_ac_residential,
            coef_eff_ac_nonresidential: input.coef_eff_ac_nonresidential,
            coef_eff_envelope: input.coef_eff_envelope,
            coef_eff_lighting_residential: input.coef_eff_lighting_residential,
            coef_eff_lighting_nonresidential: input.coef_eff_lighting_nonresidential,
        }
    }

    fn ac(&self, section: &EnergySection) -> f64 {
        let coef_eff_ac = if is_residential_section(section.id()) {
            self.coef_eff_ac_residential
        } else {
            self.coef_eff_ac_nonresidential
        };

        coef_eff_ac - ENVELOPE_CREDIT * self.coef_eff_envelope
    }

    fn lighting(&self, section: &EnergySection) -> f64 {
        if is_residential_section(section.id()) {
            self.coef_eff_lighting_residential
        } else {
            self.coef_eff_lighting_nonresidential
        }
    }
}

fn is_residential_section(section_id: &str) -> bool {
    section_id.starts_with(RESIDENTIAL_SECTION_PREFIX)
}

/// Public equipment of an apartment building: energy in kWh/year, carbon in kgCO2e/year.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct PublicEquipment {
    pub hydraulic_head_total: f64, // m
    pub ec_ventilation: f64,
    pub ec_elevator: f64,
    pub ec_water_pumping: f64,
    pub coef_eff_water_pumping: f64,
    pub est_mce: f64,
    pub est_mce_simulated: f64,
}

/// Values of the last R-BERS estimation.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NewBuildingBreakdown {
    pub building_type: ResidentialType,
    pub est_a_es_comm: f64,
    pub est_n_household: Option<f64>,
    pub est_n_people_per_household: f64,
    pub est_fce: f64,
    pub public_equipment: Option<PublicEquipment>,
    pub est_cei_n: f64,
    pub est_cei_g: f64,
    pub est_cei_m: f64,
    pub est_cei_max: f64,
    pub est_ace_simulated: f64,
    pub est_lce_simulated: f64,
    pub est_fce_simulated: f64,
    pub est_total_simulated_carbon_emission: f64,
    pub est_cei: f64,
    pub est_eui: f64,
    pub est_score: f64,
    pub est_score_level: ScoreLevel,
    pub energy_section: Vec<SectionBreakdown>,
}

/// A new residential building, scored under R-BERS on its simulated carbon emission.
#[derive(Clone, Debug)]
pub struct NewBuilding {
    common: BuildingCommon,
    residential_type: ResidentialType,
    households: Option<Households>,
    design_efficiency: DesignEfficiency,
    nonresidential_energy_sections: Vec<NonResidentialEnergySection>,
    breakdown: Option<NewBuildingBreakdown>,
}

impl NewBuilding {
    pub fn from_input(
        tables: Arc<CoefficientTables>,
        input: &BuildingInput,
    ) -> Result<Self, EstimationError> {
        let residential_type = ResidentialType::from_str(&input.building_type).map_err(|_| {
            EstimationError::configuration(format!(
                "Building type {:?} is not available in R-BERS. \"house\" and \"apartment\" are the options.",
                input.building_type
            ))
        })?;

        let households = match residential_type {
            ResidentialType::House => None,
            ResidentialType::Apartment => Some(Households {
                n_suite: input.n_suite.ok_or_else(|| {
                    EstimationError::configuration("Numbers of suites are not defined.")
                })?,
                n_household_big: input.n_household_big.ok_or_else(|| {
                    EstimationError::configuration(
                        "Numbers of households with more than two rooms are not defined.",
                    )
                })?,
            }),
        };

        if !input.exclusive_energy_section.is_empty() {
            return Err(EstimationError::usage(
                "The building class is residential, cannot create exclusive energy sections.",
            ));
        }

        let mut building = Self {
            common: BuildingCommon::new(tables, input)?,
            residential_type,
            households,
            design_efficiency: DesignEfficiency::from_input(input),
            nonresidential_energy_sections: vec![],
            breakdown: None,
        };

        for section in &input.energy_section {
            building.create_energy_section(section)?;
        }
        for section in &input.nonresidential_energy_section {
            building.create_nonresidential_energy_section(section)?;
        }
        building.common.create_facilities(input)?;

        Ok(building)
    }

    pub fn common(&self) -> &BuildingCommon {
        &self.common
    }

    pub fn residential_type(&self) -> ResidentialType {
        self.residential_type
    }

    pub fn households(&self) -> Option<Households> {
        self.households
    }

    pub fn nonresidential_energy_sections(&self) -> &[NonResidentialEnergySection] {
        &self.nonresidential_energy_sections
    }

    pub fn breakdown(&self) -> Option<&NewBuildingBreakdown> {
        self.breakdown.as_ref()
    }

    /// Only residential (`R*`) and public (`P*`) sections exist in a residential building.
    pub fn create_energy_section(&mut self, input: &EnergySectionInput) -> Result<(), EstimationError> {
        if !input.id.starts_with([RESIDENTIAL_SECTION_PREFIX, PUBLIC_SECTION_PREFIX]) {
            return Err(EstimationError::usage(format!(
                "Energy section {} is not a residential or public section, cannot create it in a residential building.",
                input.id
            )));
        }

        self.common.create_energy_section(input)
    }

    pub fn create_nonresidential_energy_section(
        &mut self,
        input: &NonResidentialEnergySectionInput,
    ) -> Result<(), EstimationError> {
        let section = NonResidentialEnergySection::new(
            &self.common.tables,
            &input.nonresidential_energy_section_type,
            input.a,
        )?;
        self.nonresidential_energy_sections.push(section);
        Ok(())
    }

    fn n_people_per_household(&self) -> Result<f64, EstimationError> {
        match self.households {
            Some(households) => households.n_people_per_household(),
            None => Ok(PERSONS_PER_HOUSE),
        }
    }

    /// Pumping energy in kWh/year for the residents and the non-residential sections.
    fn water_pumping_energy(
        &self,
        households: Households,
        hydraulic_head_total: f64,
    ) -> Result<f64, EstimationError> {
        let days = DAYS_PER_YEAR as f64;
        let residential_water = PUMPED_WATER_SHARE
            * RESIDENTIAL_WATER_PER_PERSON
            * days
            * households.n_people_per_household()?
            * households.n_household();
        let nonresidential_water = PUMPED_WATER_SHARE
            * days
            * self
                .nonresidential_energy_sections
                .iter()
                .map(NonResidentialEnergySection::water_per_day)
                .sum::<f64>()
            / LITRES_PER_CUBIC_METRE as f64;

        Ok(PUMPING_INTENSITY * (residential_water + nonresidential_water) * hydraulic_head_total)
    }

    fn public_equipment(&self, households: Households) -> Result<PublicEquipment, EstimationError> {
        let facilities = self.common.facilities();
        let hydraulic_head_total =
            average_hydraulic_head(facilities.water_towers(), WaterTower::pumping_capacity)?;
        let ec_water_pumping = self.water_pumping_energy(households, hydraulic_head_total)?;
        let coef_eff_water_pumping =
            combined_pumping_efficiency(facilities.water_towers(), households.n_household())?;

        let ec_ventilation = facilities.ventilation_energy();
        let ec_elevator = facilities.elevator_reference_energy();

        Ok(PublicEquipment {
            hydraulic_head_total,
            ec_ventilation,
            ec_elevator,
            ec_water_pumping,
            coef_eff_water_pumping,
            est_mce: (ec_ventilation + ec_elevator + ec_water_pumping) * COEF_ECE,
            est_mce_simulated: (facilities.simulated_ventilation_energy()
                + facilities.elevator_energy()
                + ec_water_pumping * coef_eff_water_pumping)
                * COEF_ECE,
        })
    }

    pub fn estimate(&mut self) -> Result<EstimationResult, EstimationError> {
        self.breakdown = None;

        if self.common.energy_sections.is_empty() {
            return Err(EstimationError::configuration(
                "Energy sections of the residential building are not defined.",
            ));
        }

        for section in self.common.energy_sections.iter_mut() {
            section.force_ac_operation(AcOperation::Interval);
            section.set_operation_ratio(1.0);
        }

        let tables = Arc::clone(&self.common.tables);
        let criteria = EuiCriteria::new(&tables, Some(self.common.site.climate_zone), None, false)?;
        self.common.resolve_benchmarks(&criteria)?;

        let common = &self.common;
        let facilities = common.facilities();
        let est_a_es_comm = common.common_area()?;
        let est_n_people_per_household = self.n_people_per_household()?;

        let est_fce = est_n_people_per_household * facilities.heater_reference_emission();
        let public_equipment = match self.households {
            Some(households) => Some(self.public_equipment(households)?),
            None => None,
        };
        let est_mce = public_equipment.map_or(0., |equipment| equipment.est_mce);
        let est_mce_simulated = public_equipment.map_or(0., |equipment| equipment.est_mce_simulated);

        let median_cei = common
            .area_intensity(|_, derived| (derived.aeui_m + derived.leui_m) * COEF_ECE)?
            + (est_fce + est_mce) / est_a_es_comm;
        let est_cei_max = common
            .area_intensity(|_, derived| (derived.aeui_max + derived.leui_max) * COEF_ECE)?
            + (est_fce + est_mce) / est_a_es_comm;
        let est_cei_g = GREEN_SHARE * median_cei;
        let est_cei_n = BEST_SHARE * median_cei;
        let est_cei_m = median_cei;
        debug!(
            est_fce, est_mce, est_cei_n, est_cei_g, est_cei_m, est_cei_max,
            "benchmark CEI"
        );

        let design = self.design_efficiency;
        let est_ace_simulated = est_a_es_comm
            * common.area_intensity(|section, derived| {
                derived.aeui_m * COEF_ECE * design.ac(section)
            })?;
        let est_lce_simulated = est_a_es_comm
            * common.area_intensity(|section, derived| {
                derived.leui_m * COEF_ECE * design.lighting(section)
            })?;
        let est_fce_simulated = est_n_people_per_household * facilities.heater_simulated_emission();
        let est_total_simulated_carbon_emission =
            est_ace_simulated + est_lce_simulated + est_fce_simulated + est_mce_simulated;
        let est_cei = est_total_simulated_carbon_emission / est_a_es_comm;
        debug!(
            est_ace_simulated, est_lce_simulated, est_fce_simulated, est_mce_simulated, est_cei,
            "simulated carbon emission"
        );

        let est_score = ScoringScale {
            lower: est_cei_n,
            g: est_cei_g,
            max: est_cei_max,
            lower_spread: SCORE_SPREAD,
        }
        .score(est_cei)?;
        let est_score_level = ScoreLevel::from_score(est_score);
        let est_eui = carbon_to_electricity(est_cei);
        info!(
            building = common.building_name().unwrap_or_default(),
            est_cei, est_score, %est_score_level, "R-BERS estimation finished"
        );

        let breakdown = NewBuildingBreakdown {
            building_type: self.residential_type,
            est_a_es_comm,
            est_n_household: self.households.map(|households| households.n_household()),
            est_n_people_per_household,
            est_fce,
            public_equipment,
            est_cei_n,
            est_cei_g,
            est_cei_m,
            est_cei_max,
            est_ace_simulated,
            est_lce_simulated,
            est_fce_simulated,
            est_total_simulated_carbon_emission,
            est_cei,
            est_eui,
            est_score,
            est_score_level,
            energy_section: common.section_breakdown(),
        };
        self.breakdown = Some(breakdown);

        Ok(EstimationResult {
            est_eui,
            est_eui_min: carbon_to_electricity(est_cei_n),
            est_eui_g: carbon_to_electricity(est_cei_g),
            est_eui_m: carbon_to_electricity(est_cei_m),
            est_eui_max: carbon_to_electricity(est_cei_max),
            est_cei: Some(est_cei),
            est_cei_min: Some(est_cei_n),
            est_cei_g: Some(est_cei_g),
            est_cei_m: Some(est_cei_m),
            est_cei_max: Some(est_cei_max),
            est_score,
            est_score_level,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    #[case("house", ResidentialType::House)]
    #[case("Apartment", ResidentialType::Apartment)]
    fn test_residential_type(#[case] text: &str, #[case] expected: ResidentialType) {
        assert_eq!(ResidentialType::from_str(text).unwrap(), expected);
    }

    #[rstest]
    fn test_people_per_household() {
        let households = Households {
            n_suite: 20.,
            n_household_big: 30.,
        };

        assert_relative_eq!(households.n_household(), 50.);
        assert_relative_eq!(households.n_people_per_household().unwrap(), 130. / 50.);
    }

    #[rstest]
    fn test_empty_apartment_is_rejected() {
        let households = Households {
            n_suite: 0.,
            n_household_big: 0.,
        };

        assert!(households
            .n_people_per_household()
            .unwrap_err()
            .is_configuration());
    }

    #[rstest]
    fn test_envelope_credit_applies_to_ac_only() {
        let design = DesignEfficiency {
            coef_eff_ac_residential: 0.9,
            coef_eff_ac_nonresidential: 0.8,
            coef_eff_envelope: 0.5,
            coef_eff_lighting_residential: 0.7,
            coef_eff_lighting_nonresidential: 0.6,
        };
        let residential = EnergySection::new("R1", 100., "INTERVAL", None, None, None).unwrap();
        let public = EnergySection::new("P2", 100., "INTERVAL", None, None, None).unwrap();

        assert_relative_eq!(design.ac(&residential), 0.84);
        assert_relative_eq!(design.ac(&public), 0.74);
        assert_relative_eq!(design.lighting(&residential), 0.7);
        assert_relative_eq!(design.lighting(&public), 0.6);
    }
}
