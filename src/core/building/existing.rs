use super::consumption::annual_consumption;
use super::facilities::required_weighted_average;
use super::{BuildingCommon, SectionBreakdown};
use crate::core::coefficients::CoefficientTables;
use crate::core::criteria::EuiCriteria;
use crate::core::energy_section::{EnergySection, ExclusiveEnergySection};
use crate::core::facility::data_center::DataCenter;
use crate::core::facility::water_tower::average_hydraulic_head;
use crate::core::scoring::{EstimationResult, ScoreLevel, ScoringScale};
use crate::core::units::{COEF_ECE, DAYS_PER_YEAR};
use crate::errors::EstimationError;
use crate::input::{BuildingInput, CommonHeatingMethod, ExclusiveEnergySectionInput};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

// kWh per m3 of hot water
const HEATING_COEFFICIENT_HE: f64 = 45.1;
const HEATING_COEFFICIENT_HPE: f64 = 13.2;

// share of the median AC and lighting benchmarks a green building uses
const GREEN_SHARE: f64 = 0.8;
const SCORE_SPREAD: f64 = 50.;

// m3 of make-up water per m2 of water-cooled floor: per AC operating hour, and fixed
const WATERCOOLED_WATER_PER_HOUR: f64 = 0.00036;
const WATERCOOLED_WATER_BASE: f64 = 0.32;
// kWh per m3 and metre of head
const PUMPING_INTENSITY: f64 = 0.02;

// sections whose water intensity is given per guest room or bed
const PER_ROOM_WATER_SECTIONS: [&str; 2] = ["H1", "H2"];

/// Exclusive sections with a fixed EUI in kWh/(m2.year).
const FIXED_EXCLUSIVE_EUI: [(&str, f64); 21] = [
    ("N1-1-1", 330.),
    ("N1-1-2", 250.),
    ("N1-2-1", 665.),
    ("N1-2-2", 530.),
    ("N1-3-1", 1318.),
    ("N1-3-2", 900.),
    ("N1-4-1", 989.),
    ("N1-4-2", 675.),
    ("N1-5", 387.),
    ("N1-6", 1500.),
    ("N1-7", 530.),
    ("N3-1-1", 26.7),
    ("N3-1-2", 35.3),
    ("N3-2-1", 21.3),
    ("N3-2-2", 29.9),
    ("N3-3-1", 41.9),
    ("N4-1", 3.2),
    ("N4-2", 6.1),
    ("N4-3", 80.),
    ("N5", 545.),
    ("N6", 910.),
];

const ZERO_ENERGY_EXCLUSIVE_SECTIONS: [&str; 3] = ["N9", "N10", "N12"];
const RESERVED_EXCLUSIVE_SECTION: &str = "N11";

// kWh per m2 and hour of use of a hot-spring section
const HOT_SPRING_INTENSITY: f64 = 0.124;

fn heating_coefficient(method: CommonHeatingMethod) -> f64 {
    match method {
        CommonHeatingMethod::HE => HEATING_COEFFICIENT_HE,
        CommonHeatingMethod::HPE => HEATING_COEFFICIENT_HPE,
        CommonHeatingMethod::Other => 0.,
    }
}

/// Base and slope of the operation ratio of performance sections, applied to the area-weighted
/// share of their standard operating days actually in use.
fn performance_operation_coefficients(section_id: &str) -> Option<(f64, f64)> {
    match section_id {
        "F1" => Some((0.17, 0.83)),
        "F2" => Some((0.21, 0.77)),
        "G1" => Some((0.39, 0.60)),
        "G2" => Some((0.31, 0.67)),
        _ => None,
    }
}

const EXHIBITION_SECTIONS: [&str; 4] = ["D1", "D2", "D3", "E1"];
const EXHIBITION_STANDARD_DAYS: f64 = 273.;

/// Area-weighted benchmark EUI components of the common sections.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct AggregateEui {
    pub est_aeui_min: f64,
    pub est_aeui_m: f64,
    pub est_aeui_max: f64,
    pub est_leui_min: f64,
    pub est_leui_m: f64,
    pub est_leui_max: f64,
    pub est_eeui_m: f64,
}

/// Values of the last BERSe estimation.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ExistingBuildingBreakdown {
    pub ec: f64, // kWh/year
    pub est_a_es_comm: f64,
    pub est_a_es_exclusive: f64,
    #[serde(flatten)]
    pub aggregate: AggregateEui,
    pub est_eui_min: f64,
    pub est_eui_g: f64,
    pub est_eui_m: f64,
    pub est_eui_max: f64,
    pub est_e_n: f64,
    pub est_e_t: f64,
    pub hydraulic_head_total: f64,
    pub est_q_w: f64,
    pub est_q_aw: f64,
    pub est_e_p: f64,
    pub est_q_hw: f64,
    pub est_e_h: f64,
    pub est_eui_main: f64,
    pub est_eui_m_adj: f64,
    pub est_eui: f64,
    pub est_eui_total: f64,
    pub est_cei: f64,
    pub est_score: f64,
    pub est_score_level: Option<ScoreLevel>,
    pub energy_section: Vec<SectionBreakdown>,
}

/// An existing building of any use, scored under BERSe on its metered consumption.
#[derive(Clone, Debug)]
pub struct ExistingBuilding {
    common: BuildingCommon,
    exclusive_energy_sections: Vec<ExclusiveEnergySection>,
    climate_adjustment: bool,
    ec: f64,
    ec_other: f64,
    est_q_rw: f64,
    ec_heating_comm: CommonHeatingMethod,
    breakdown: Option<ExistingBuildingBreakdown>,
}

impl ExistingBuilding {
    pub fn from_input(
        tables: Arc<CoefficientTables>,
        input: &BuildingInput,
    ) -> Result<Self, EstimationError> {
        let ec = input.ec.as_ref().ok_or_else(|| {
            EstimationError::configuration("Energy consumption (ec) of the building is not defined.")
        })?;

        if !input.nonresidential_energy_section.is_empty() {
            return Err(EstimationError::usage(
                "The building class is general, cannot create non-residential energy sections.",
            ));
        }

        let mut building = Self {
            common: BuildingCommon::new(tables, input)?,
            exclusive_energy_sections: vec![],
            climate_adjustment: input.climate_adjustment,
            ec: annual_consumption(ec)?,
            ec_other: input.ec_other,
            est_q_rw: input.est_q_rw,
            ec_heating_comm: input.ec_heating_comm,
            breakdown: None,
        };

        for section in &input.energy_section {
            building.common.create_energy_section(section)?;
        }
        for section in &input.exclusive_energy_section {
            building.create_exclusive_energy_section(section)?;
        }
        building.common.create_facilities(input)?;

        Ok(building)
    }

    pub fn common(&self) -> &BuildingCommon {
        &self.common
    }

    pub fn common_mut(&mut self) -> &mut BuildingCommon {
        &mut self.common
    }

    pub fn exclusive_energy_sections(&self) -> &[ExclusiveEnergySection] {
        &self.exclusive_energy_sections
    }

    /// Annual metered consumption in kWh.
    pub fn ec(&self) -> f64 {
        self.ec
    }

    pub fn breakdown(&self) -> Option<&ExistingBuildingBreakdown> {
        self.breakdown.as_ref()
    }

    /// Creates an exclusive section, and the data center embedded in it if any.
    pub fn create_exclusive_energy_section(
        &mut self,
        input: &ExclusiveEnergySectionInput,
    ) -> Result<(), EstimationError> {
        if input.id == RESERVED_EXCLUSIVE_SECTION {
            return Err(EstimationError::usage(format!(
                "Please avoid using {RESERVED_EXCLUSIVE_SECTION}. Use the other exclusive energy sections instead."
            )));
        }

        let section =
            ExclusiveEnergySection::new(&self.common.tables, &input.id, input.a, input.coef_usage_h)?;
        if let Some(data_center) = &input.datacenter {
            let data_center = DataCenter::new(data_center, Some(section.a()))?;
            self.common.facilities.data_centers.push(data_center);
        }

        self.exclusive_energy_sections.push(section);
        Ok(())
    }

    /// SO_r of a common section, 1.0 unless a facility describes how the section is used.
    fn operation_ratio(&self, section: &EnergySection) -> Result<f64, EstimationError> {
        let facilities = &self.common.facilities;
        let section_id = section.id();

        if EXHIBITION_SECTIONS.contains(&section_id) && !facilities.exhibition_areas.is_empty() {
            let days_in_use: f64 = facilities
                .exhibition_areas
                .iter()
                .map(|area| area.a * area.coef_usage_d)
                .sum();
            let standard_days: f64 = facilities
                .exhibition_areas
                .iter()
                .map(|area| area.a * EXHIBITION_STANDARD_DAYS)
                .sum();
            if !(standard_days > 0.) {
                return Err(EstimationError::data(
                    "Weights of exhibition area days (area) add up to zero.",
                ));
            }

            return Ok(0.52 + 0.45 * days_in_use / standard_days);
        }

        if let Some((base, slope)) = performance_operation_coefficients(section_id) {
            if !facilities.performance_areas.is_empty() {
                let standard_days = self.common.facility_context().operating_days(section_id)?;
                let share_in_use = required_weighted_average(
                    facilities
                        .performance_areas
                        .iter()
                        .map(|area| (area.coef_usage_d / standard_days, area.a)),
                    "performance area days (area)",
                )?;

                return Ok(base + slope * share_in_use);
            }
        }

        Ok(match section_id {
            "H1" => facilities
                .hotel_occupancy()?
                .map_or(1.0, |occupancy| 0.58 + 0.571 * occupancy),
            "H2" => facilities
                .hospital_occupancy()?
                .map_or(1.0, |occupancy| 0.25 + 0.94 * occupancy),
            _ => 1.0,
        })
    }

    /// e_n of one exclusive section, in kWh/year.
    fn exclusive_energy(&self, section: &ExclusiveEnergySection) -> Result<f64, EstimationError> {
        let facilities = &self.common.facilities;
        let section_id = section.id();
        let days = DAYS_PER_YEAR as f64;

        if let Some((_, eui)) = FIXED_EXCLUSIVE_EUI.iter().find(|(id, _)| *id == section_id) {
            return Ok(eui * section.a());
        }

        let missing = |facility: &str| {
            EstimationError::usage(format!(
                "Please create {facility} first: exclusive energy section {section_id} depends on it."
            ))
        };

        Ok(match section_id {
            "N2-1-1" | "N2-1-2" => {
                let occupancy = facilities.hotel_occupancy()?.ok_or_else(|| missing("hotel"))?;
                let (rate, safety) = if section_id == "N2-1-1" {
                    (5.85, 2.0)
                } else {
                    (3.85, 1.5)
                };
                facilities.hotel_rooms() * rate * days * occupancy * safety
            }
            "N2-2" => {
                let occupancy = facilities
                    .hospital_occupancy()?
                    .ok_or_else(|| missing("hospital"))?;
                facilities.hospital_beds() * 0.93 * days * occupancy * 1.5
            }
            "N2-1-3" => {
                if facilities.dining_areas.is_empty() {
                    return Err(missing("dining area"));
                }
                let dining_area: f64 = facilities.dining_areas.iter().map(|area| area.a).sum();
                let meals_per_day = required_weighted_average(
                    facilities
                        .dining_areas
                        .iter()
                        .map(|area| (area.n_meal_per_day as f64, area.a)),
                    "meals per day (area)",
                )?;
                dining_area * 0.09 * meals_per_day * days * 0.7 * 1.5
            }
            "N7" => {
                let hours = section.coef_usage_h().ok_or_else(|| {
                    EstimationError::configuration("Operating hours of N7 are not defined.")
                })?;
                HOT_SPRING_INTENSITY * section.a() * hours
            }
            "N8" => {
                if facilities.data_centers.is_empty() {
                    return Err(missing("data center"));
                }
                facilities.data_center_energy()
            }
            id if ZERO_ENERGY_EXCLUSIVE_SECTIONS.contains(&id) => 0.,
            RESERVED_EXCLUSIVE_SECTION => {
                return Err(EstimationError::usage(format!(
                    "Please avoid using {RESERVED_EXCLUSIVE_SECTION}. Use the other exclusive energy sections instead."
                )))
            }
            id => {
                return Err(EstimationError::data(format!(
                    "Exclusive energy section {id} has no energy formula."
                )))
            }
        })
    }

    /// Water use of the common sections in m3/year. Guest-room and ward sections have their
    /// intensity given per room.
    fn common_water_use(&self) -> Result<f64, EstimationError> {
        let es_operation = &self.common.tables.es_operation;
        let mut total = 0.;
        for section in &self.common.energy_sections {
            let intensity = es_operation.water_intensity(section.id(), section.es_sub())?;
            total += if PER_ROOM_WATER_SECTIONS.contains(&section.id()) {
                let n_room = section.n_room().filter(|n_room| *n_room > 0.).ok_or_else(|| {
                    EstimationError::configuration(format!(
                        "Energy section {} needs the number of rooms of its hotel or hospital.",
                        section.id()
                    ))
                })?;
                section.a() * intensity / n_room
            } else {
                section.a() * intensity
            };
        }

        Ok(total)
    }

    /// Make-up water of water-cooled air conditioning in m3/year.
    fn watercooled_water_use(&self) -> Result<f64, EstimationError> {
        let es_operation = &self.common.tables.es_operation;
        let climate_zone = self.common.site.climate_zone;
        let mut total = 0.;
        for section in self
            .common
            .energy_sections
            .iter()
            .filter(|section| section.is_watercooled())
        {
            let ac_hours = es_operation.ac_operating_hours(
                section.id(),
                climate_zone,
                section.ac_operation(),
                section.es_sub(),
            )?;
            total += (WATERCOOLED_WATER_PER_HOUR * ac_hours + WATERCOOLED_WATER_BASE) * section.a();
        }

        Ok(total)
    }

    pub fn estimate(&mut self) -> Result<EstimationResult, EstimationError> {
        self.breakdown = None;

        if self.common.energy_sections.is_empty() && self.exclusive_energy_sections.is_empty() {
            return Err(EstimationError::configuration(
                "Energy section and exclusive energy section are not defined.",
            ));
        }

        let operation_ratios: Vec<f64> = self
            .common
            .energy_sections
            .iter()
            .map(|section| self.operation_ratio(section))
            .collect::<Result<_, _>>()?;
        for (section, so_r) in self
            .common
            .energy_sections
            .iter_mut()
            .zip(operation_ratios)
        {
            section.set_operation_ratio(so_r);
        }

        let tables = Arc::clone(&self.common.tables);
        let site = self.common.site.clone();
        let criteria = EuiCriteria::new(
            &tables,
            Some(site.climate_zone),
            Some((site.county.as_str(), site.town.as_str())),
            self.climate_adjustment,
        )?;
        self.common.resolve_benchmarks(&criteria)?;

        let common = &self.common;
        let ur = site.urban_region;
        let est_a_es_comm = common.common_area()?;
        let aggregate = AggregateEui {
            est_aeui_min: common.area_intensity(|_, derived| derived.aeui_min)?,
            est_aeui_m: common.area_intensity(|_, derived| derived.aeui_m)?,
            est_aeui_max: common.area_intensity(|_, derived| derived.aeui_max)?,
            est_leui_min: common.area_intensity(|_, derived| derived.leui_min)?,
            est_leui_m: common.area_intensity(|_, derived| derived.leui_m)?,
            est_leui_max: common.area_intensity(|_, derived| derived.leui_max)?,
            est_eeui_m: common.area_intensity(|_, derived| derived.eeui_m)?,
        };
        let est_eui_g = ur
            * (GREEN_SHARE * aggregate.est_aeui_m
                + GREEN_SHARE * aggregate.est_leui_m
                + aggregate.est_eeui_m);
        let est_eui_min =
            ur * (aggregate.est_aeui_min + aggregate.est_leui_min + aggregate.est_eeui_m);
        let est_eui_m = ur * (aggregate.est_aeui_m + aggregate.est_leui_m + aggregate.est_eeui_m);
        let est_eui_max =
            ur * (aggregate.est_aeui_max + aggregate.est_leui_max + aggregate.est_eeui_m);
        debug!(
            ?aggregate,
            est_eui_min, est_eui_g, est_eui_m, est_eui_max, "benchmark EUI of common sections"
        );

        let exclusive_energies: Vec<f64> = self
            .exclusive_energy_sections
            .iter()
            .map(|section| self.exclusive_energy(section))
            .collect::<Result<_, _>>()?;
        for (section, e_n) in self
            .exclusive_energy_sections
            .iter_mut()
            .zip(&exclusive_energies)
        {
            section.set_e_n(*e_n);
        }
        let est_e_n: f64 = exclusive_energies.iter().sum();
        let est_a_es_exclusive: f64 = self
            .exclusive_energy_sections
            .iter()
            .map(ExclusiveEnergySection::a)
            .sum();

        let common = &self.common;
        let facilities = &common.facilities;
        let est_e_t = facilities.elevator_energy() + facilities.escalator_energy();

        let hydraulic_head_total =
            average_hydraulic_head(&facilities.water_towers, |tower| Ok(tower.a))?;
        let est_q_w = self.common_water_use()? + facilities.water_use();
        let est_q_aw = self.watercooled_water_use()?;
        let est_e_p = PUMPING_INTENSITY * hydraulic_head_total * (est_q_w + est_q_aw - self.est_q_rw)
            + facilities.pool_energy();

        let est_q_hw = facilities.hot_water_use();
        let est_e_h =
            heating_coefficient(self.ec_heating_comm) * est_q_hw + facilities.pool_heating_energy();
        debug!(
            est_e_n, est_e_t, hydraulic_head_total, est_q_w, est_q_aw, est_e_p, est_q_hw, est_e_h,
            "energy of exclusive sections and facilities"
        );

        let est_eui_main = (self.ec - ur * (est_e_n + est_e_t + est_e_p + est_e_h) - self.ec_other)
            / est_a_es_comm;
        let est_eui_m_adj = ur
            * common.area_intensity(|_, derived| {
                (derived.aeui_m + derived.leui_m + derived.eeui_m) * derived.so_r
            })?;
        let est_eui = est_eui_m + est_eui_main - est_eui_m_adj;
        let est_eui_total = self.ec / (est_a_es_comm + est_a_es_exclusive);
        let est_cei = est_eui * COEF_ECE;
        debug!(est_eui_main, est_eui_m_adj, est_eui, est_eui_total, "measured EUI");

        let est_score = ScoringScale {
            lower: est_eui_min,
            g: est_eui_g,
            max: est_eui_max,
            lower_spread: SCORE_SPREAD,
        }
        .score(est_eui)?;
        let est_score_level = ScoreLevel::from_score(est_score);
        info!(
            building = common.building_name().unwrap_or_default(),
            est_eui, est_score, %est_score_level, "BERSe estimation finished"
        );

        self.breakdown = Some(ExistingBuildingBreakdown {
            ec: self.ec,
            est_a_es_comm,
            est_a_es_exclusive,
            aggregate,
            est_eui_min,
            est_eui_g,
            est_eui_m,
            est_eui_max,
            est_e_n,
            est_e_t,
            hydraulic_head_total,
            est_q_w,
            est_q_aw,
            est_e_p,
            est_q_hw,
            est_e_h,
            est_eui_main,
            est_eui_m_adj,
            est_eui,
            est_eui_total,
            est_cei,
            est_score,
            est_score_level: Some(est_score_level),
            energy_section: self.common.section_breakdown(),
        });

        Ok(EstimationResult {
            est_eui,
            est_eui_min,
            est_eui_g,
            est_eui_m,
            est_eui_max,
            est_cei: Some(est_cei),
            est_cei_min: None,
            est_cei_g: None,
            est_cei_m: None,
            est_cei_max: None,
            est_score,
            est_score_level,
        })
    }
}
