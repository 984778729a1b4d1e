pub mod building;
pub mod coefficients;
pub mod criteria;
pub mod energy_section;
pub mod facility;
pub mod location;
pub mod scoring;
pub mod units;
