use super::region::ClimateZone;
use super::{read_csv_rows, section_id_from_label};
use crate::core::energy_section::AcOperation;
use crate::errors::EstimationError;
use indexmap::IndexMap;
use serde::Deserialize;
use std::io::Read;

/// One of the three benchmark tables (min, m or max) of per-section EUI components.
#[derive(Clone, Debug)]
pub struct EuiBenchmarkTable {
    rows: IndexMap<String, EuiBenchmarkRow>,
}

#[derive(Clone, Debug, Deserialize)]
pub(crate) struct EuiBenchmarkRow {
    #[serde(rename = "Energy_Section")]
    energy_section: String,
    #[serde(rename = "EEUI")]
    pub(crate) eeui: Option<f64>,
    #[serde(rename = "LEUI")]
    pub(crate) leui: Option<f64>,
    #[serde(rename = "AEUI_N_CONTINUE")]
    aeui_n_continue: Option<f64>,
    #[serde(rename = "AEUI_N_INTERVAL")]
    aeui_n_interval: Option<f64>,
    #[serde(rename = "AEUI_C_CONTINUE")]
    aeui_c_continue: Option<f64>,
    #[serde(rename = "AEUI_C_INTERVAL")]
    aeui_c_interval: Option<f64>,
    #[serde(rename = "AEUI_S_CONTINUE")]
    aeui_s_continue: Option<f64>,
    #[serde(rename = "AEUI_S_INTERVAL")]
    aeui_s_interval: Option<f64>,
}

impl EuiBenchmarkRow {
    /// AEUI cell for a climate zone and AC operation; an empty cell reads as NaN.
    pub(crate) fn aeui(&self, climate_zone: ClimateZone, ac_operation: AcOperation) -> f64 {
        match (climate_zone, ac_operation) {
            (ClimateZone::N, AcOperation::Continue) => self.aeui_n_continue,
            (ClimateZone::N, AcOperation::Interval) => self.aeui_n_interval,
            (ClimateZone::C, AcOperation::Continue) => self.aeui_c_continue,
            (ClimateZone::C, AcOperation::Interval) => self.aeui_c_interval,
            (ClimateZone::S, AcOperation::Continue) => self.aeui_s_continue,
            (ClimateZone::S, AcOperation::Interval) => self.aeui_s_interval,
        }
        .unwrap_or(f64::NAN)
    }
}

impl EuiBenchmarkTable {
    pub(crate) fn from_csv(csv: impl Read, parameter_name: &str) -> Result<Self, EstimationError> {
        let mut rows: IndexMap<String, EuiBenchmarkRow> = Default::default();
        for row in read_csv_rows::<EuiBenchmarkRow>(csv, &format!("EUI criteria ({parameter_name})"))? {
            rows.entry(section_id_from_label(&row.energy_section).to_string())
                .or_insert(row);
        }

        Ok(Self { rows })
    }

    pub(crate) fn row(&self, section_id: &str) -> Result<&EuiBenchmarkRow, EstimationError> {
        self.rows.get(section_id).ok_or_else(|| {
            EstimationError::data(format!("EUI criteria are not defined for es {section_id}."))
        })
    }

    #[cfg(test)]
    pub(crate) fn section_ids(&self) -> impl Iterator<Item = &str> {
        self.rows.keys().map(String::as_str)
    }
}
