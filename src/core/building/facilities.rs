use crate::core::facility::aquatic::{Pool, SportBathroom};
use crate::core::facility::areas::{ActivityArea, DiningArea};
use crate::core::facility::data_center::DataCenter;
use crate::core::facility::heater::Heater;
use crate::core::facility::hospitality::{Hospital, Hotel};
use crate::core::facility::parking_garage::ParkingGarage;
use crate::core::facility::transport::{Elevator, Escalator};
use crate::core::facility::water_tower::WaterTower;
use crate::errors::EstimationError;
use crate::statistics::weighted_average;

/// Every facility a building owns, with the sums both estimation systems draw on.
#[derive(Clone, Debug, Default)]
pub struct Facilities {
    pub(crate) elevators: Vec<Elevator>,
    pub(crate) escalators: Vec<Escalator>,
    pub(crate) water_towers: Vec<WaterTower>,
    pub(crate) hotels: Vec<Hotel>,
    pub(crate) hospitals: Vec<Hospital>,
    pub(crate) sport_bathrooms: Vec<SportBathroom>,
    pub(crate) swimming_pools: Vec<Pool>,
    pub(crate) spas: Vec<Pool>,
    pub(crate) dining_areas: Vec<DiningArea>,
    pub(crate) exhibition_areas: Vec<ActivityArea>,
    pub(crate) performance_areas: Vec<ActivityArea>,
    pub(crate) data_centers: Vec<DataCenter>,
    pub(crate) heaters: Vec<Heater>,
    pub(crate) parking_garages: Vec<ParkingGarage>,
}

/// Weighted mean that must exist for the formula asking for it.
pub(crate) fn required_weighted_average(
    pairs: impl IntoIterator<Item = (f64, f64)>,
    quantity: &str,
) -> Result<f64, EstimationError> {
    weighted_average(pairs).ok_or_else(|| {
        EstimationError::data(format!("Weights of {quantity} add up to zero."))
    })
}

impl Facilities {
    pub fn elevators(&self) -> &[Elevator] {
        &self.elevators
    }

    pub fn water_towers(&self) -> &[WaterTower] {
        &self.water_towers
    }

    pub(crate) fn elevator_energy(&self) -> f64 {
        self.elevators.iter().map(Elevator::annual_energy).sum()
    }

    pub(crate) fn elevator_reference_energy(&self) -> f64 {
        self.elevators.iter().map(Elevator::reference_energy).sum()
    }

    pub(crate) fn escalator_energy(&self) -> f64 {
        self.escalators.iter().map(Escalator::annual_energy).sum()
    }

    fn pools(&self) -> impl Iterator<Item = &Pool> {
        self.swimming_pools.iter().chain(self.spas.iter())
    }

    /// Water use of hotels, hospitals, sport bathrooms, pools and spas.
    pub(crate) fn water_use(&self) -> f64 {
        self.hotels.iter().map(Hotel::water_use).sum::<f64>()
            + self.hospitals.iter().map(Hospital::water_use).sum::<f64>()
            + self
                .sport_bathrooms
                .iter()
                .map(SportBathroom::water_use)
                .sum::<f64>()
            + self.pools().map(Pool::water_use).sum::<f64>()
    }

    /// Pumping, filtering and nozzle energy of pools and spas.
    pub(crate) fn pool_energy(&self) -> f64 {
        self.pools()
            .map(|pool| pool.pumping_energy() + pool.process_energy() + pool.nozzle_energy())
            .sum()
    }

    /// Hot water drawn through the building's common heating.
    pub(crate) fn hot_water_use(&self) -> f64 {
        self.hotels.iter().map(Hotel::hot_water_use).sum::<f64>()
            + self.hospitals.iter().map(Hospital::hot_water_use).sum::<f64>()
            + self
                .dining_areas
                .iter()
                .map(DiningArea::hot_water_use)
                .sum::<f64>()
            + self
                .sport_bathrooms
                .iter()
                .map(SportBathroom::hot_water_use)
                .sum::<f64>()
    }

    /// Heating energy of pool and spa water, each group at its volume-weighted heating
    /// coefficient.
    pub(crate) fn pool_heating_energy(&self) -> f64 {
        [&self.swimming_pools, &self.spas]
            .into_iter()
            .map(|pools| {
                let hot_water: f64 = pools.iter().map(Pool::hot_water_use).sum();
                weighted_average(pools.iter().map(|pool| (pool.ec_heating, pool.v)))
                    .map_or(0., |ec_heating| ec_heating * hot_water)
            })
            .sum()
    }

    pub(crate) fn ventilation_energy(&self) -> f64 {
        self.parking_garages
            .iter()
            .map(ParkingGarage::ventilation_energy)
            .sum()
    }

    pub(crate) fn simulated_ventilation_energy(&self) -> f64 {
        self.parking_garages
            .iter()
            .map(ParkingGarage::simulated_ventilation_energy)
            .sum()
    }

    pub(crate) fn heater_reference_emission(&self) -> f64 {
        self.heaters.iter().map(Heater::reference_emission).sum()
    }

    pub(crate) fn heater_simulated_emission(&self) -> f64 {
        self.heaters.iter().map(Heater::simulated_emission).sum()
    }

    pub(crate) fn data_center_energy(&self) -> f64 {
        self.data_centers.iter().map(DataCenter::annual_energy).sum()
    }

    pub(crate) fn hotel_rooms(&self) -> f64 {
        self.hotels.iter().map(|hotel| hotel.n_room).sum()
    }

    /// Room-weighted occupancy of the hotels, `None` without hotels.
    pub(crate) fn hotel_occupancy(&self) -> Result<Option<f64>, EstimationError> {
        if self.hotels.is_empty() {
            return Ok(None);
        }

        required_weighted_average(
            self.hotels
                .iter()
                .map(|hotel| (hotel.coef_usage_r_room, hotel.n_room)),
            "hotel occupancy (rooms)",
        )
        .map(Some)
    }

    pub(crate) fn hospital_beds(&self) -> f64 {
        self.hospitals
            .iter()
            .map(|hospital| hospital.n_hospitalbed)
            .sum()
    }

    /// Bed-weighted occupancy of the hospitals, `None` without hospitals.
    pub(crate) fn hospital_occupancy(&self) -> Result<Option<f64>, EstimationError> {
        if self.hospitals.is_empty() {
            return Ok(None);
        }

        required_weighted_average(
            self.hospitals
                .iter()
                .map(|hospital| (hospital.coef_usage_r_hospitalbed, hospital.n_hospitalbed)),
            "hospital occupancy (beds)",
        )
        .map(Some)
    }
}
