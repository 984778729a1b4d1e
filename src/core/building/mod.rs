pub mod consumption;
pub mod existing;
pub mod facilities;
pub mod new_residential;

use crate::core::coefficients::region::ClimateZone;
use crate::core::coefficients::CoefficientTables;
use crate::core::criteria::EuiCriteria;
use crate::core::energy_section::{EnergySection, SectionDerived};
use crate::core::facility::aquatic::{Pool, PoolKind, SportBathroom};
use crate::core::facility::areas::{ActivityArea, DiningArea};
use crate::core::facility::heater::Heater;
use crate::core::facility::hospitality::{Hospital, Hotel};
use crate::core::facility::parking_garage::ParkingGarage;
use crate::core::facility::transport::{Elevator, Escalator};
use crate::core::facility::water_tower::WaterTower;
use crate::core::facility::FacilityContext;
use crate::core::scoring::EstimationResult;
use crate::errors::EstimationError;
use crate::input::{
    ActivityAreaInput, BuildingInput, DiningAreaInput, ElevatorInput, EnergySectionInput,
    EscalatorInput, EstimationSystem, HeaterInput, HospitalInput, HotelInput,
    ParkingGarageInput, PoolInput, SportBathroomInput, WaterTowerInput,
};
use existing::{ExistingBuilding, ExistingBuildingBreakdown};
use facilities::Facilities;
use itertools::Itertools;
use new_residential::{NewBuilding, NewBuildingBreakdown};
use serde::Serialize;
use std::sync::Arc;
use strum_macros::Display;

#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
#[strum(serialize_all = "lowercase")]
pub enum BuildingClass {
    /// existing buildings of any use, scored on metered consumption
    General,
    /// new residential buildings, scored on simulated carbon emission
    Residential,
}

impl From<EstimationSystem> for BuildingClass {
    fn from(estimation_system: EstimationSystem) -> Self {
        match estimation_system {
            EstimationSystem::Berse => BuildingClass::General,
            EstimationSystem::Rbers => BuildingClass::Residential,
        }
    }
}

/// Where a building stands, resolved once at construction.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BuildingSite {
    pub county: String,
    pub town: String,
    pub climate_zone: ClimateZone,
    pub urban_region: f64,
}

impl BuildingSite {
    /// A coordinate takes precedence over the written address.
    pub fn resolve(
        tables: &CoefficientTables,
        coordinate: Option<(f64, f64)>,
        county: Option<&str>,
        town: Option<&str>,
    ) -> Result<Self, EstimationError> {
        let (county, town) = match (coordinate, county, town) {
            (Some((longitude, latitude)), _, _) => {
                tables.town_boundaries.locate(longitude, latitude)?
            }
            (None, Some(county), Some(town)) => (county.trim().to_string(), town.trim().to_string()),
            _ => {
                return Err(EstimationError::configuration(
                    "Building location is not defined: give a coordinate or both county and town.",
                ))
            }
        };

        Ok(Self {
            climate_zone: tables.regions.climate_zone(&county, &town)?,
            urban_region: tables.regions.urban_region(&county, &town)?,
            county,
            town,
        })
    }
}

/// Benchmark values of one section as kept in a breakdown.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SectionBreakdown {
    pub id: String,
    pub a: f64,
    #[serde(flatten)]
    pub derived: SectionDerived,
}

/// State shared by both building classes: location, common sections and facilities.
#[derive(Clone, Debug)]
pub struct BuildingCommon {
    tables: Arc<CoefficientTables>,
    estimation_system: EstimationSystem,
    building_type: String,
    building_name: Option<String>,
    site: BuildingSite,
    n_stories_total: f64,
    energy_sections: Vec<EnergySection>,
    facilities: Facilities,
}

impl BuildingCommon {
    fn new(tables: Arc<CoefficientTables>, input: &BuildingInput) -> Result<Self, EstimationError> {
        if input.building_type.is_empty() {
            return Err(EstimationError::configuration("Building type is not defined."));
        }

        let site = BuildingSite::resolve(
            &tables,
            input.building_coordinate,
            input.building_address_county.as_deref(),
            input.building_address_town.as_deref(),
        )?;

        Ok(Self {
            tables,
            estimation_system: input.estimation_system,
            building_type: input.building_type.clone(),
            building_name: input.building_name.clone(),
            site,
            n_stories_total: input.building_n_stories_above_ground
                + input.building_n_stories_below_ground
                + input.building_floor_offset,
            energy_sections: vec![],
            facilities: Facilities::default(),
        })
    }

    pub fn tables(&self) -> &CoefficientTables {
        &self.tables
    }

    pub fn estimation_system(&self) -> EstimationSystem {
        self.estimation_system
    }

    pub fn building_type(&self) -> &str {
        &self.building_type
    }

    pub fn building_name(&self) -> Option<&str> {
        self.building_name.as_deref()
    }

    pub fn site(&self) -> &BuildingSite {
        &self.site
    }

    pub fn n_stories_total(&self) -> f64 {
        self.n_stories_total
    }

    pub fn energy_sections(&self) -> &[EnergySection] {
        &self.energy_sections
    }

    pub fn facilities(&self) -> &Facilities {
        &self.facilities
    }

    fn facility_context(&self) -> FacilityContext<'_> {
        FacilityContext {
            tables: &self.tables,
            estimation_system: self.estimation_system,
            building_type: &self.building_type,
            climate_zone: self.site.climate_zone,
        }
    }

    /// Creates a common section along with the facilities embedded in it.
    pub fn create_energy_section(&mut self, input: &EnergySectionInput) -> Result<(), EstimationError> {
        let n_room = input
            .hotel
            .as_ref()
            .map(|hotel| hotel.n_room)
            .or(input.hospital.as_ref().map(|hospital| hospital.n_hospitalbed));

        let section = EnergySection::new(
            &input.id,
            input.a,
            &input.ac_operation,
            input.ac_type.as_deref(),
            input.es_sub,
            n_room,
        )?;

        let section_area = Some(section.a());
        if let Some(hotel) = &input.hotel {
            self.create_hotel(hotel);
        }
        if let Some(hospital) = &input.hospital {
            self.create_hospital(hospital);
        }
        if let Some(sport_bathroom) = &input.sportbathroom {
            self.create_sport_bathroom(sport_bathroom, section_area)?;
        }
        if let Some(pool) = &input.swimmingpool {
            self.create_pool(PoolKind::SwimmingPool, pool)?;
        }
        if let Some(spa) = &input.spa {
            self.create_pool(PoolKind::Spa, spa)?;
        }
        if let Some(dining_area) = &input.diningarea {
            self.create_dining_area(dining_area, section_area)?;
        }
        if let Some(exhibition_area) = &input.exhibitionarea {
            self.create_exhibition_area(exhibition_area, section_area)?;
        }
        if let Some(performance_area) = &input.performancearea {
            self.create_performance_area(performance_area, section_area)?;
        }

        self.energy_sections.push(section);
        Ok(())
    }

    pub fn create_elevator(&mut self, input: &ElevatorInput) -> Result<(), EstimationError> {
        let elevator = Elevator::new(&self.facility_context(), input)?;
        self.facilities.elevators.push(elevator);
        Ok(())
    }

    pub fn create_escalator(&mut self, input: &EscalatorInput) -> Result<(), EstimationError> {
        let escalator = Escalator::new(&self.facility_context(), input)?;
        self.facilities.escalators.push(escalator);
        Ok(())
    }

    pub fn create_water_tower(&mut self, input: &WaterTowerInput) {
        self.facilities.water_towers.push(WaterTower::new(input));
    }

    pub fn create_hotel(&mut self, input: &HotelInput) {
        self.facilities.hotels.push(Hotel::new(input));
    }

    pub fn create_hospital(&mut self, input: &HospitalInput) {
        self.facilities.hospitals.push(Hospital::new(input));
    }

    pub fn create_sport_bathroom(
        &mut self,
        input: &SportBathroomInput,
        section_area: Option<f64>,
    ) -> Result<(), EstimationError> {
        let sport_bathroom = SportBathroom::new(&self.facility_context(), input, section_area)?;
        self.facilities.sport_bathrooms.push(sport_bathroom);
        Ok(())
    }

    pub fn create_pool(&mut self, kind: PoolKind, input: &PoolInput) -> Result<(), EstimationError> {
        let pool = Pool::new(&self.facility_context(), kind, input)?;
        match kind {
            PoolKind::SwimmingPool => self.facilities.swimming_pools.push(pool),
            PoolKind::Spa => self.facilities.spas.push(pool),
        }
        Ok(())
    }

    pub fn create_dining_area(
        &mut self,
        input: &DiningAreaInput,
        section_area: Option<f64>,
    ) -> Result<(), EstimationError> {
        let dining_area = DiningArea::new(&self.facility_context(), input, section_area)?;
        self.facilities.dining_areas.push(dining_area);
        Ok(())
    }

    pub fn create_exhibition_area(
        &mut self,
        input: &ActivityAreaInput,
        section_area: Option<f64>,
    ) -> Result<(), EstimationError> {
        let area = ActivityArea::exhibition(&self.facility_context(), input, section_area)?;
        self.facilities.exhibition_areas.push(area);
        Ok(())
    }

    pub fn create_performance_area(
        &mut self,
        input: &ActivityAreaInput,
        section_area: Option<f64>,
    ) -> Result<(), EstimationError> {
        let area = ActivityArea::performance(&self.facility_context(), input, section_area)?;
        self.facilities.performance_areas.push(area);
        Ok(())
    }

    pub fn create_heater(&mut self, input: &HeaterInput) -> Result<(), EstimationError> {
        let heater = Heater::new(&self.facility_context(), input)?;
        self.facilities.heaters.push(heater);
        Ok(())
    }

    pub fn create_parking_garage(&mut self, input: &ParkingGarageInput) {
        self.facilities
            .parking_garages
            .push(ParkingGarage::new(input));
    }

    /// Creates the building-level facility lists of an input.
    fn create_facilities(&mut self, input: &BuildingInput) -> Result<(), EstimationError> {
        for elevator in &input.elevator {
            self.create_elevator(elevator)?;
        }
        for escalator in &input.escalator {
            self.create_escalator(escalator)?;
        }
        for water_tower in &input.watertower {
            self.create_water_tower(water_tower);
        }
        for hotel in &input.hotel {
            self.create_hotel(hotel);
        }
        for hospital in &input.hospital {
            self.create_hospital(hospital);
        }
        for sport_bathroom in &input.sportbathroom {
            self.create_sport_bathroom(sport_bathroom, None)?;
        }
        for pool in &input.swimmingpool {
            self.create_pool(PoolKind::SwimmingPool, pool)?;
        }
        for spa in &input.spa {
            self.create_pool(PoolKind::Spa, spa)?;
        }
        for dining_area in &input.diningarea {
            self.create_dining_area(dining_area, None)?;
        }
        for exhibition_area in &input.exhibitionarea {
            self.create_exhibition_area(exhibition_area, None)?;
        }
        for performance_area in &input.performancearea {
            self.create_performance_area(performance_area, None)?;
        }
        for heater in &input.heater {
            self.create_heater(heater)?;
        }
        for parking_garage in &input.parkinggarage {
            self.create_parking_garage(parking_garage);
        }

        Ok(())
    }

    /// Total common-section floor area, which every intensity is taken over.
    pub(crate) fn common_area(&self) -> Result<f64, EstimationError> {
        let area: f64 = self.energy_sections.iter().map(EnergySection::a).sum();
        if !(area > 0.) {
            return Err(EstimationError::configuration(
                "Common energy sections have no floor area to take intensities over.",
            ));
        }

        Ok(area)
    }

    /// Second pass over the common sections. Every section missing an AEUI benchmark is named
    /// in the one error.
    pub(crate) fn resolve_benchmarks(&mut self, criteria: &EuiCriteria) -> Result<(), EstimationError> {
        let benchmarks: Vec<_> = self
            .energy_sections
            .iter()
            .map(|section| criteria.benchmark(section.id(), section.ac_operation()))
            .try_collect()?;

        let missing = self
            .energy_sections
            .iter()
            .zip(&benchmarks)
            .filter(|(_, benchmark)| benchmark.has_missing_aeui())
            .map(|(section, _)| format!("{} ({})", section.id(), section.ac_operation()))
            .join(", ");
        if !missing.is_empty() {
            return Err(EstimationError::data(format!(
                "aeui_min, aeui_m or aeui_max is not defined for energy sections {missing}."
            )));
        }

        for (section, benchmark) in self.energy_sections.iter_mut().zip(benchmarks) {
            section.set_benchmark(benchmark)?;
        }

        Ok(())
    }

    /// Area-weighted sum of a derived value over the common sections, taken per unit of
    /// common area.
    pub(crate) fn area_intensity(
        &self,
        value: impl Fn(&EnergySection, &SectionDerived) -> f64,
    ) -> Result<f64, EstimationError> {
        let area = self.common_area()?;
        let mut total = 0.;
        for section in &self.energy_sections {
            total += section.a() * value(section, section.derived_or_err()?);
        }

        Ok(total / area)
    }

    pub(crate) fn section_breakdown(&self) -> Vec<SectionBreakdown> {
        self.energy_sections
            .iter()
            .filter_map(|section| {
                section.derived().map(|derived| SectionBreakdown {
                    id: section.id().to_string(),
                    a: section.a(),
                    derived: *derived,
                })
            })
            .collect()
    }
}

/// Intermediate values of the last estimation.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Breakdown {
    Existing(ExistingBuildingBreakdown),
    New(NewBuildingBreakdown),
}

/// One building, dispatching to the estimation of its class.
#[derive(Clone, Debug)]
pub enum Building {
    Existing(ExistingBuilding),
    New(NewBuilding),
}

impl Building {
    /// Builds the aggregate of the class matching the input's estimation system.
    pub fn from_input(
        tables: Arc<CoefficientTables>,
        input: &BuildingInput,
    ) -> Result<Self, EstimationError> {
        Ok(match BuildingClass::from(input.estimation_system) {
            BuildingClass::General => Building::Existing(ExistingBuilding::from_input(tables, input)?),
            BuildingClass::Residential => Building::New(NewBuilding::from_input(tables, input)?),
        })
    }

    pub fn class(&self) -> BuildingClass {
        match self {
            Building::Existing(_) => BuildingClass::General,
            Building::New(_) => BuildingClass::Residential,
        }
    }

    pub fn common(&self) -> &BuildingCommon {
        match self {
            Building::Existing(building) => building.common(),
            Building::New(building) => building.common(),
        }
    }

    pub fn estimate(&mut self) -> Result<EstimationResult, EstimationError> {
        match self {
            Building::Existing(building) => building.estimate(),
            Building::New(building) => building.estimate(),
        }
    }

    /// `None` until an estimation has completed.
    pub fn breakdown(&self) -> Option<Breakdown> {
        match self {
            Building::Existing(building) => building.breakdown().cloned().map(Breakdown::Existing),
            Building::New(building) => building.breakdown().cloned().map(Breakdown::New),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[fixture]
    fn tables() -> Arc<CoefficientTables> {
        CoefficientTables::bundled()
    }

    #[rstest]
    fn test_coordinate_takes_precedence_over_address(tables: Arc<CoefficientTables>) {
        let site = BuildingSite::resolve(
            &tables,
            Some((121.538, 25.028)),
            Some("高雄市"),
            Some("前鎮區"),
        )
        .unwrap();

        assert_eq!(site.county, "臺北市");
        assert_eq!(site.town, "大安區");
        assert_eq!(site.climate_zone, ClimateZone::N);
        assert_eq!(site.urban_region, 1.0);
    }

    #[rstest]
    fn test_site_from_address(tables: Arc<CoefficientTables>) {
        let site = BuildingSite::resolve(&tables, None, Some("高雄市"), Some("前鎮區")).unwrap();
        assert_eq!(site.climate_zone, ClimateZone::S);
    }

    #[rstest]
    #[case(None, None)]
    #[case(Some("臺北市"), None)]
    #[case(None, Some("大安區"))]
    fn test_undefined_location(
        tables: Arc<CoefficientTables>,
        #[case] county: Option<&str>,
        #[case] town: Option<&str>,
    ) {
        assert!(BuildingSite::resolve(&tables, None, county, town)
            .unwrap_err()
            .is_configuration());
    }

    #[rstest]
    fn test_building_class_follows_estimation_system() {
        assert_eq!(
            BuildingClass::from(EstimationSystem::Berse),
            BuildingClass::General
        );
        assert_eq!(
            BuildingClass::from(EstimationSystem::Rbers),
            BuildingClass::Residential
        );
        assert_eq!(BuildingClass::Residential.to_string(), "residential");
    }
}
