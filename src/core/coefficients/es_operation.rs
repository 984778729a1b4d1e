use super::region::ClimateZone;
use super::section_id_from_label;
use crate::core::energy_section::AcOperation;
use crate::errors::EstimationError;
use indexmap::IndexMap;
use serde::Deserialize;
use std::io::Read;

/// Operating-schedule coefficients of the energy section types.
///
/// Lookups remap the hot-spring exclusive section `N7` onto the common section `L6-1`, and the
/// compound parking section `J4` is resolved through its sub-section key.
#[derive(Clone, Debug)]
pub struct EsOperationTable {
    by_section: IndexMap<String, SectionOperation>,
    by_sub_section: IndexMap<(String, String), SectionOperation>,
}

pub const DEFAULT_SUB_SECTION: u32 = 1;

const COMPOUND_SECTION_ID: &str = "J4";

#[derive(Clone, Debug, Deserialize)]
struct SectionOperation {
    #[serde(rename = "Energy_Section")]
    energy_section: String,
    #[serde(rename = "Sub-section")]
    sub_section: Option<String>,
    #[serde(rename = "YOH")]
    yoh: Option<f64>,
    #[serde(rename = "YOD")]
    yod: Option<f64>,
    #[serde(rename = "Qw")]
    qw: Option<f64>,
    #[serde(rename = "YAH_N_CONTINUE")]
    yah_n_continue: Option<f64>,
    #[serde(rename = "YAH_N_INTERVAL")]
    yah_n_interval: Option<f64>,
    #[serde(rename = "YAH_C_CONTINUE")]
    yah_c_continue: Option<f64>,
    #[serde(rename = "YAH_C_INTERVAL")]
    yah_c_interval: Option<f64>,
    #[serde(rename = "YAH_S_CONTINUE")]
    yah_s_continue: Option<f64>,
    #[serde(rename = "YAH_S_INTERVAL")]
    yah_s_interval: Option<f64>,
}

impl SectionOperation {
    fn yah(&self, climate_zone: ClimateZone, ac_operation: AcOperation) -> Option<f64> {
        match (climate_zone, ac_operation) {
            (ClimateZone::N, AcOperation::Continue) => self.yah_n_continue,
            (ClimateZone::N, AcOperation::Interval) => self.yah_n_interval,
            (ClimateZone::C, AcOperation::Continue) => self.yah_c_continue,
            (ClimateZone::C, AcOperation::Interval) => self.yah_c_interval,
            (ClimateZone::S, AcOperation::Continue) => self.yah_s_continue,
            (ClimateZone::S, AcOperation::Interval) => self.yah_s_interval,
        }
    }
}

impl EsOperationTable {
    pub(crate) fn from_csv(csv: impl Read) -> Result<Self, EstimationError> {
        let mut by_section: IndexMap<String, SectionOperation> = Default::default();
        let mut by_sub_section: IndexMap<(String, String), SectionOperation> = Default::default();

        let mut reader = csv::Reader::from_reader(csv);
        for row in reader.deserialize() {
            let row: SectionOperation = row.map_err(|err| {
                EstimationError::data(format!("Could not read section operation table: {err}"))
            })?;
            let section_id = section_id_from_label(&row.energy_section).to_string();

            if let Some(sub_section) = row.sub_section.as_deref().filter(|sub| !sub.is_empty()) {
                by_sub_section
                    .entry((
                        section_id.clone(),
                        section_id_from_label(sub_section).to_string(),
                    ))
                    .or_insert_with(|| row.clone());
            }
            by_section.entry(section_id).or_insert(row);
        }

        Ok(Self {
            by_section,
            by_sub_section,
        })
    }

    fn operation_for(
        &self,
        section_id: &str,
        section_sub: u32,
        coefficient_name: &str,
    ) -> Result<&SectionOperation, EstimationError> {
        let section_id = remap_section_id(section_id);
        let operation = if section_id == COMPOUND_SECTION_ID {
            self.by_sub_section
                .get(&(section_id.to_string(), section_sub.to_string()))
        } else {
            self.by_section.get(section_id)
        };

        operation.ok_or_else(|| {
            EstimationError::data(format!(
                "{coefficient_name} is not defined for es {section_id}."
            ))
        })
    }

    fn defined(
        value: Option<f64>,
        coefficient_name: &str,
        section_id: &str,
    ) -> Result<f64, EstimationError> {
        value.filter(|value| !value.is_nan()).ok_or_else(|| {
            EstimationError::data(format!(
                "{coefficient_name} is not defined for es {}.",
                remap_section_id(section_id)
            ))
        })
    }

    /// YOH, operating hours per year
    pub fn operating_hours(&self, section_id: &str, section_sub: u32) -> Result<f64, EstimationError> {
        let operation = self.operation_for(section_id, section_sub, "YOH")?;
        Self::defined(operation.yoh, "YOH", section_id)
    }

    /// YOD, operating days per year
    pub fn operating_days(&self, section_id: &str, section_sub: u32) -> Result<f64, EstimationError> {
        let operation = self.operation_for(section_id, section_sub, "YOD")?;
        Self::defined(operation.yod, "YOD", section_id)
    }

    /// Qw, water use intensity in m3/(m2.year); per room for guest rooms and wards
    pub fn water_intensity(&self, section_id: &str, section_sub: u32) -> Result<f64, EstimationError> {
        let operation = self.operation_for(section_id, section_sub, "Qw")?;
        Self::defined(operation.qw, "Qw", section_id)
    }

    /// YAH, air-conditioning operating hours per year
    pub fn ac_operating_hours(
        &self,
        section_id: &str,
        climate_zone: ClimateZone,
        ac_operation: AcOperation,
        section_sub: u32,
    ) -> Result<f64, EstimationError> {
        let operation = self.operation_for(section_id, section_sub, "YAH")?;
        Self::defined(
            operation.yah(climate_zone, ac_operation),
            "YAH",
            section_id,
        )
    }

    pub fn contains_section(&self, section_id: &str) -> bool {
        self.by_section.contains_key(remap_section_id(section_id))
    }
}

/// The hot-spring exclusive section shares its schedule with the common hot-spring bath.
pub(crate) fn remap_section_id(section_id: &str) -> &str {
    match section_id {
        "N7" => "L6-1",
        other => other,
    }
}
