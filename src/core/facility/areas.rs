use super::{facility_area, FacilityContext};
use crate::errors::EstimationError;
use crate::input::{ActivityAreaInput, DiningAreaInput};

// dish washing by hand uses this share of the machine's hot water
const HAND_WASHING_SHARE: f64 = 0.283;

/// Hot water intensity (m3 per m2 and day) and the section whose operating days apply, by
/// meals served a day.
fn dining_coefficients(n_meal_per_day: u32) -> Result<(f64, &'static str), EstimationError> {
    match n_meal_per_day {
        1 => Ok((0.00284, "I1")),
        2 => Ok((0.00568, "I2")),
        3 => Ok((0.00852, "I3")),
        4 => Ok((0.02840, "I5")),
        _ => Err(EstimationError::configuration(format!(
            "A dining area serves 1 to 4 meals a day, not {n_meal_per_day}."
        ))),
    }
}

#[derive(Clone, Debug)]
pub struct DiningArea {
    pub(crate) a: f64,
    pub(crate) n_meal_per_day: u32,
    pub(crate) coef_usage_d: f64,
    pub(crate) coef_usage_i_hotwater: f64,
}

impl DiningArea {
    pub fn new(
        context: &FacilityContext,
        input: &DiningAreaInput,
        section_area: Option<f64>,
    ) -> Result<Self, EstimationError> {
        let (intensity, schedule_section) = dining_coefficients(input.n_meal_per_day)?;
        let coef_usage_i_hotwater = if input.washdishes_by_hand {
            intensity * HAND_WASHING_SHARE
        } else {
            intensity
        };

        Ok(Self {
            a: facility_area(input.a, section_area, "dining area")?,
            n_meal_per_day: input.n_meal_per_day,
            coef_usage_d: match input.coef_usage_d {
                Some(days) => days,
                None => context.operating_days(schedule_section)?,
            },
            coef_usage_i_hotwater,
        })
    }

    pub fn hot_water_use(&self) -> f64 {
        self.coef_usage_i_hotwater * self.a * self.coef_usage_d
    }
}

/// An exhibition or performance area, open on a number of days a year.
#[derive(Clone, Debug)]
pub struct ActivityArea {
    pub(crate) a: f64,
    pub(crate) coef_usage_d: f64,
}

impl ActivityArea {
    fn new(
        context: &FacilityContext,
        input: &ActivityAreaInput,
        section_area: Option<f64>,
        schedule_section: &str,
        facility_name: &str,
    ) -> Result<Self, EstimationError> {
        Ok(Self {
            a: facility_area(input.a, section_area, facility_name)?,
            coef_usage_d: match input.coef_usage_d {
                Some(days) => days,
                None => context.operating_days(schedule_section)?,
            },
        })
    }

    pub fn exhibition(
        context: &FacilityContext,
        input: &ActivityAreaInput,
        section_area: Option<f64>,
    ) -> Result<Self, EstimationError> {
        Self::new(context, input, section_area, "D1", "exhibition area")
    }

    pub fn performance(
        context: &FacilityContext,
        input: &ActivityAreaInput,
        section_area: Option<f64>,
    ) -> Result<Self, EstimationError> {
        Self::new(context, input, section_area, "F1", "performance area")
    }
}
