pub mod area;
pub mod classifier;
pub mod farming;
pub mod geocoding;
pub mod geometry;
pub mod ndvi;
pub mod quiz;
pub mod selection;
pub mod temperature;
