use crate::input::ParkingGarageInput;

#[derive(Clone, Debug)]
pub struct ParkingGarage {
    pub(crate) a: f64,
    pub(crate) ec_ventilation: f64, // kWh/(m2.year)
    pub(crate) coef_eff_powersaving_ventilation: f64,
}

impl ParkingGarage {
    pub fn new(input: &ParkingGarageInput) -> Self {
        Self {
            a: input.a,
            ec_ventilation: input.ec_ventilation,
            coef_eff_powersaving_ventilation: input.coef_eff_powersaving_ventilation,
        }
    }

    pub fn ventilation_energy(&self) -> f64 {
        self.a * self.ec_ventilation
    }

    pub fn simulated_ventilation_energy(&self) -> f64 {
        self.ventilation_energy() * self.coef_eff_powersaving_ventilation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::*;

    #[rstest]
    fn test_ventilation_energy() {
        let garage = ParkingGarage::new(&ParkingGarageInput {
            a: 1500.,
            ec_ventilation: 12.,
            coef_eff_powersaving_ventilation: 0.7,
        });

        assert_relative_eq!(garage.ventilation_energy(), 18000.);
        assert_relative_eq!(garage.simulated_ventilation_energy(), 12600.);
    }
}
