// --- File: crates/shabbat_times/src/lib.rs ---
pub mod cities;
pub mod doc;
pub mod format;
pub mod handlers;
pub mod occasion;
#[cfg(test)]
mod occasion_proptest;
#[cfg(test)]
mod occasion_test;
pub mod routes;
pub mod solar;

pub use occasion::{
    candle_lighting, next_occasion_date, Occasion, OccasionCalculator, OccasionError,
    DEFAULT_CANDLE_LIGHTING_OFFSET,
};
pub use solar::{SolarError, SolarTimeProvider, SpaSolarProvider, SunTimes};
