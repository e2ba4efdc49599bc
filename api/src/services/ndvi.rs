//! Vegetation health from an NDVI value.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Below this NDVI the vegetation is considered stressed or absent.
pub const HEALTHY_THRESHOLD: f64 = 0.2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum VegetationState {
    #[serde(rename = "OK")]
    Ok,
    #[serde(rename = "KO")]
    Ko,
    #[serde(rename = "unknown")]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct NdviStatus {
    /// The NDVI value that was classified (null when not a finite number)
    pub value: Option<f64>,
    pub status: VegetationState,
    /// Display color: green, red or gray
    pub color: &'static str,
    pub description: &'static str,
}

pub fn ndvi_status(value: f64) -> NdviStatus {
    if !value.is_finite() || !(-1.0..=1.0).contains(&value) {
        return NdviStatus {
            value: value.is_finite().then_some(value),
            status: VegetationState::Unknown,
            color: "gray",
            description: "NDVI value out of range",
        };
    }

    if value < HEALTHY_THRESHOLD {
        NdviStatus {
            value: Some(value),
            status: VegetationState::Ko,
            color: "red",
            description: "Sparse or stressed vegetation",
        }
    } else {
        NdviStatus {
            value: Some(value),
            status: VegetationState::Ok,
            color: "green",
            description: "Healthy vegetation",
        }
    }
}
