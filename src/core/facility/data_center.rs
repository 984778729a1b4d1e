use super::facility_area;
use crate::errors::EstimationError;
use crate::input::DataCenterInput;

#[derive(Clone, Debug)]
pub struct DataCenter {
    pub(crate) a: f64,
    pub(crate) coef_power_cabinetrack: f64, // kW per m2 of rack floor
}

impl DataCenter {
    pub fn new(input: &DataCenterInput, section_area: Option<f64>) -> Result<Self, EstimationError> {
        Ok(Self {
            a: facility_area(input.a, section_area, "data center")?,
            coef_power_cabinetrack: input.coef_power_cabinetrack,
        })
    }

    /// Annual energy use of the IT load and its cooling, in kWh.
    pub fn annual_energy(&self) -> f64 {
        self.a * (2630. * self.coef_power_cabinetrack + 51.)
    }
}
