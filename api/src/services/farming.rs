//! Crop catalogue and the static starter areas of the farming simulation.

use rand::Rng;
use serde::Serialize;
use utoipa::ToSchema;

use crate::services::classifier::SoilType;

/// Chance that a crop ignores its soil requirement when suggesting crops for a
/// measured climate.
const SOIL_FLEXIBILITY: f64 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum CropType {
    Fruit,
    Vegetable,
    Legume,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Crop {
    pub id: u32,
    pub name: &'static str,
    #[serde(rename = "type")]
    pub crop_type: CropType,
    /// Lowest temperature the crop tolerates (°C)
    pub min_temperature: i32,
    /// Highest temperature the crop tolerates (°C)
    pub max_temperature: i32,
    pub soil_requirement: SoilType,
    /// Emoji shown on the farm plot
    pub image: &'static str,
    pub description: &'static str,
}

impl Crop {
    pub fn tolerates(&self, temperature: i32) -> bool {
        (self.min_temperature..=self.max_temperature).contains(&temperature)
    }
}

pub const CROPS: [Crop; 6] = [
    Crop {
        id: 1,
        name: "Mediterranean Potato",
        crop_type: CropType::Vegetable,
        min_temperature: 10,
        max_temperature: 25,
        soil_requirement: SoilType::Sandy,
        image: "🥔",
        description: "Hardy potato variety perfect for Mediterranean coastal areas.",
    },
    Crop {
        id: 2,
        name: "Heritage Tomato",
        crop_type: CropType::Fruit,
        min_temperature: 15,
        max_temperature: 30,
        soil_requirement: SoilType::ClayRich,
        image: "🍅",
        description: "Classic tomato variety thriving in rich clay soils.",
    },
    Crop {
        id: 3,
        name: "Alpine Spinach",
        crop_type: CropType::Vegetable,
        min_temperature: -5,
        max_temperature: 15,
        soil_requirement: SoilType::Rocky,
        image: "🥬",
        description: "Cold-resistant leafy green adapted to mountain conditions.",
    },
    Crop {
        id: 4,
        name: "Tropical Beans",
        crop_type: CropType::Legume,
        min_temperature: 20,
        max_temperature: 35,
        soil_requirement: SoilType::Volcanic,
        image: "🫘",
        description: "Nitrogen-fixing beans that thrive in volcanic tropical soil.",
    },
    Crop {
        id: 5,
        name: "Coastal Strawberry",
        crop_type: CropType::Fruit,
        min_temperature: 5,
        max_temperature: 20,
        soil_requirement: SoilType::Sandy,
        image: "🍓",
        description: "Sweet strawberry variety adapted to coastal sandy soils.",
    },
    Crop {
        id: 6,
        name: "European Wheat",
        crop_type: CropType::Vegetable,
        min_temperature: 0,
        max_temperature: 20,
        soil_requirement: SoilType::ClayRich,
        image: "🌾",
        description: "Traditional wheat variety perfect for European plains.",
    },
];

/// Position of a starter area on the stylized map, in percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct MapPosition {
    pub x: u8,
    pub y: u8,
}

/// One of the hand-made areas offered before any measured data is loaded.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FarmArea {
    pub id: u32,
    pub name: &'static str,
    pub temperature: i32,
    pub soil_type: SoilType,
    pub description: &'static str,
    pub coordinates: MapPosition,
}

pub const FARM_AREAS: [FarmArea; 4] = [
    FarmArea {
        id: 1,
        name: "Mediterranean Coast",
        temperature: 18,
        soil_type: SoilType::Sandy,
        description: "Warm coastal area with sandy soil, perfect for Mediterranean crops.",
        coordinates: MapPosition { x: 30, y: 40 },
    },
    FarmArea {
        id: 2,
        name: "European Plains",
        temperature: 8,
        soil_type: SoilType::ClayRich,
        description: "Temperate region with nutrient-rich clay soil, ideal for grains.",
        coordinates: MapPosition { x: 60, y: 30 },
    },
    FarmArea {
        id: 3,
        name: "Mountain Highlands",
        temperature: 2,
        soil_type: SoilType::Rocky,
        description: "Cool mountainous area with rocky terrain, suitable for hardy vegetables.",
        coordinates: MapPosition { x: 45, y: 60 },
    },
    FarmArea {
        id: 4,
        name: "Tropical Valleys",
        temperature: 28,
        soil_type: SoilType::Volcanic,
        description: "Warm tropical area with volcanic soil rich in minerals.",
        coordinates: MapPosition { x: 70, y: 50 },
    },
];

pub fn farm_area(id: u32) -> Option<&'static FarmArea> {
    FARM_AREAS.iter().find(|a| a.id == id)
}

/// Crops that tolerate `temperature` and require exactly `soil`.
pub fn suitable_crops(temperature: i32, soil: SoilType) -> Vec<&'static Crop> {
    CROPS
        .iter()
        .filter(|c| c.tolerates(temperature) && c.soil_requirement == soil)
        .collect()
}

/// Like [`suitable_crops`], but each crop may ignore its soil requirement
/// with a fixed probability. Used for quiz generation on measured climates.
pub fn crops_for_climate(
    temperature: i32,
    soil: SoilType,
    rng: &mut impl Rng,
) -> Vec<&'static Crop> {
    CROPS
        .iter()
        .filter(|c| {
            c.tolerates(temperature)
                && (c.soil_requirement == soil || rng.gen_bool(SOIL_FLEXIBILITY))
        })
        .collect()
}
