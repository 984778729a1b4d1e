use crate::input::{HospitalInput, HotelInput};

// annual water use per occupied unit (m3)
const WATER_PER_HOTEL_ROOM: f64 = 73.0;
const WATER_PER_HOSPITAL_BED: f64 = 91.3;
// annual hot water use per occupied unit (m3)
const HOT_WATER_PER_HOTEL_ROOM: f64 = 10.2;
const HOT_WATER_PER_HOSPITAL_BED: f64 = 12.8;

#[derive(Clone, Debug)]
pub struct Hotel {
    pub(crate) n_room: f64,
    pub(crate) coef_usage_r_room: f64, // occupancy
}

impl Hotel {
    pub fn new(input: &HotelInput) -> Self {
        Self {
            n_room: input.n_room,
            coef_usage_r_room: input.coef_usage_r_room,
        }
    }

    pub fn occupied_rooms(&self) -> f64 {
        self.n_room * self.coef_usage_r_room
    }

    pub fn water_use(&self) -> f64 {
        WATER_PER_HOTEL_ROOM * self.occupied_rooms()
    }

    pub fn hot_water_use(&self) -> f64 {
        HOT_WATER_PER_HOTEL_ROOM * self.occupied_rooms()
    }
}

#[derive(Clone, Debug)]
pub struct Hospital {
    pub(crate) n_hospitalbed: f64,
    pub(crate) coef_usage_r_hospitalbed: f64,
}

impl Hospital {
    pub fn new(input: &HospitalInput) -> Self {
        Self {
            n_hospitalbed: input.n_hospitalbed,
            coef_usage_r_hospitalbed: input.coef_usage_r_hospitalbed,
        }
    }

    pub fn occupied_beds(&self) -> f64 {
        self.n_hospitalbed * self.coef_usage_r_hospitalbed
    }

    pub fn water_use(&self) -> f64 {
        WATER_PER_HOSPITAL_BED * self.occupied_beds()
    }

    pub fn hot_water_use(&self) -> f64 {
        HOT_WATER_PER_HOSPITAL_BED * self.occupied_beds()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::*;

    #[rstest]
    fn test_hotel_water() {
        let hotel = Hotel::new(&HotelInput {
            n_room: 120.,
            coef_usage_r_room: 0.75,
        });

        assert_relative_eq!(hotel.water_use(), 73. * 90.);
        assert_relative_eq!(hotel.hot_water_use(), 10.2 * 90.);
    }

    #[rstest]
    fn test_hospital_water() {
        let hospital = Hospital::new(&HospitalInput {
            n_hospitalbed: 200.,
            coef_usage_r_hospitalbed: 1.0,
        });

        assert_relative_eq!(hospital.water_use(), 91.3 * 200.);
        assert_relative_eq!(hospital.hot_water_use(), 12.8 * 200.);
    }
}
