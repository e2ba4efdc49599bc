//! Quiz questions: the fixed starter set and questions generated from a
//! measured location.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;
use utoipa::ToSchema;

use crate::helpers::round_half_up;
use crate::services::area::{Area, LocationData};
use crate::services::classifier::{ClimateZone, SoilType};
use crate::services::farming::{crops_for_climate, Crop, CROPS};
use crate::services::temperature::{MAX_TEMP_C, MIN_TEMP_C};

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    pub id: u64,
    pub question: String,
    pub options: Vec<String>,
    /// Index into `options`
    pub correct_answer: usize,
    pub explanation: String,
    pub area_id: u32,
}

impl QuizQuestion {
    /// Shuffle `correct` in among `wrong` and record where it landed.
    fn shuffled(
        id: u64,
        question: String,
        correct: String,
        wrong: Vec<String>,
        explanation: String,
        area_id: u32,
        rng: &mut impl Rng,
    ) -> Self {
        let mut options = wrong;
        options.push(correct.clone());
        options.shuffle(rng);
        let correct_answer = options.iter().position(|o| *o == correct).unwrap_or(0);
        Self {
            id,
            question,
            options,
            correct_answer,
            explanation,
            area_id,
        }
    }
}

/// Labels for a day/night temperature pattern, hottest first.
pub const TEMPERATURE_PATTERNS: [&str; 8] = [
    "Hot with large daily variation",
    "Consistently hot conditions",
    "Moderate with significant daily swings",
    "Temperate conditions",
    "Cool with moderate variation",
    "Cool stable conditions",
    "Cold with daily fluctuation",
    "Consistently cold conditions",
];

const WRONG_ADAPTATIONS: [&str; 4] = [
    "Use only greenhouse farming",
    "Plant crops randomly throughout the year",
    "Ignore soil moisture levels",
    "Use identical farming methods worldwide",
];

const WRONG_SOIL_BENEFITS: [&str; 4] = [
    "Poor water retention",
    "Low nutrient content",
    "Difficult to cultivate",
    "Unsuitable for most crops",
];

// ---------------------------------------------------------------------------
// Starter questions
// ---------------------------------------------------------------------------

/// The hand-written question for one of the starter farm areas.
pub fn starter_question(area_id: u32) -> Option<QuizQuestion> {
    let (question, options, correct_answer, explanation): (&str, [&str; 4], usize, &str) =
        match area_id {
            1 => (
                "Given the temperature of 18°C and sandy soil, which crop would be best suited for this Mediterranean area?",
                ["Mediterranean Potato", "Heritage Tomato", "Alpine Spinach", "Tropical Beans"],
                0,
                "Mediterranean Potato is perfect for 18°C temperature and sandy coastal soil conditions.",
            ),
            2 => (
                "With clay-rich soil and 8°C temperature, what would grow best in these European plains?",
                ["Coastal Strawberry", "European Wheat", "Heritage Tomato", "Tropical Beans"],
                1,
                "European Wheat thrives in clay-rich soil and can handle 8°C temperatures perfectly.",
            ),
            3 => (
                "In rocky soil at 2°C, which crop can survive these mountain highland conditions?",
                ["Heritage Tomato", "Alpine Spinach", "Mediterranean Potato", "Coastal Strawberry"],
                1,
                "Alpine Spinach is specifically adapted for rocky soil and cold mountain temperatures.",
            ),
            4 => (
                "The volcanic soil at 28°C is ideal for which tropical crop?",
                ["Tropical Beans", "European Wheat", "Alpine Spinach", "Mediterranean Potato"],
                0,
                "Tropical Beans love warm volcanic soil and thrive at 28°C temperatures.",
            ),
            _ => return None,
        };

    Some(QuizQuestion {
        id: u64::from(area_id),
        question: question.to_string(),
        options: options.iter().map(|o| o.to_string()).collect(),
        correct_answer,
        explanation: explanation.to_string(),
        area_id,
    })
}

// ---------------------------------------------------------------------------
// Generated questions
// ---------------------------------------------------------------------------

pub fn temperature_pattern(day_temp: i32, night_temp: i32) -> &'static str {
    let diff = (i64::from(day_temp) - i64::from(night_temp)).abs();
    let avg = (f64::from(day_temp) + f64::from(night_temp)) / 2.0;

    let idx = if avg > 25.0 {
        if diff > 10 { 0 } else { 1 }
    } else if avg > 15.0 {
        if diff > 12 { 2 } else { 3 }
    } else if avg > 5.0 {
        if diff > 8 { 4 } else { 5 }
    } else if diff > 5 {
        6
    } else {
        7
    };
    TEMPERATURE_PATTERNS[idx]
}

/// Farming practices suited to a climate zone; the first is the model answer.
pub fn climate_adaptations(zone: ClimateZone) -> [&'static str; 3] {
    match zone {
        ClimateZone::Tropical | ClimateZone::TropicalRainforest | ClimateZone::TropicalMonsoon => [
            "Use shade cloth to protect from intense sun",
            "Implement efficient drainage systems",
            "Choose heat-resistant crop varieties",
        ],
        ClimateZone::Subtropical | ClimateZone::Mediterranean => [
            "Plan for wet and dry seasons",
            "Use mulching to retain moisture",
            "Select drought-tolerant varieties",
        ],
        ClimateZone::AridDesert | ClimateZone::SemiArid | ClimateZone::Steppe => [
            "Use drip irrigation to conserve water",
            "Plant windbreaks against soil erosion",
            "Select drought-tolerant varieties",
        ],
        ClimateZone::Continental | ClimateZone::ColdDesert => [
            "Use cold-frame protection",
            "Select short-season varieties",
            "Implement wind protection",
        ],
        ClimateZone::Subarctic | ClimateZone::Tundra | ClimateZone::Polar => [
            "Use greenhouse cultivation",
            "Employ soil heating systems",
            "Choose arctic-adapted varieties",
        ],
        ClimateZone::Temperate => [
            "Rotate crops seasonally",
            "Use frost protection methods",
            "Implement season extension techniques",
        ],
    }
}

/// Agricultural advantages of a soil type; the first is the model answer.
pub fn soil_benefits(soil: SoilType) -> [&'static str; 3] {
    match soil {
        SoilType::Sandy => ["Excellent drainage", "Easy to work with", "Good root penetration"],
        SoilType::ClayRich => [
            "High nutrient retention",
            "Good water holding capacity",
            "Rich in minerals",
        ],
        SoilType::Volcanic => [
            "Exceptional fertility",
            "Rich in trace minerals",
            "Good structure",
        ],
        SoilType::Rocky => ["Good drainage", "Mineral rich", "Suitable for hardy crops"],
        SoilType::Loamy => [
            "Perfect balance of nutrients",
            "Ideal water retention",
            "Easy cultivation",
        ],
        SoilType::Peaty => [
            "High organic content",
            "Excellent for root vegetables",
            "Rich in nutrients",
        ],
    }
}

/// Up to three distinct candidates, skipping anything equal to `correct`.
fn distractors<T: PartialEq + Copy>(correct: T, candidates: impl IntoIterator<Item = T>) -> Vec<T> {
    let mut picked: Vec<T> = Vec::with_capacity(3);
    for candidate in candidates {
        if candidate != correct && !picked.contains(&candidate) {
            picked.push(candidate);
        }
        if picked.len() == 3 {
            break;
        }
    }
    picked
}

fn degrees(values: Vec<i32>) -> Vec<String> {
    values.into_iter().map(|v| format!("{}°C", v)).collect()
}

#[derive(Debug, Clone, Copy)]
enum QuestionKind {
    Temperature,
    CropSuitability,
    ClimateAdaptation,
    SoilBenefit,
}

const QUESTION_KINDS: [QuestionKind; 4] = [
    QuestionKind::Temperature,
    QuestionKind::CropSuitability,
    QuestionKind::ClimateAdaptation,
    QuestionKind::SoilBenefit,
];

/// Generate one multiple-choice question about a measured location.
pub fn generate_climate_quiz(location: &LocationData, rng: &mut impl Rng) -> QuizQuestion {
    let base_id = chrono::Utc::now().timestamp_millis().max(0) as u64;
    let area = &location.area;
    // Keeps the difference/average arithmetic inside i32
    let day = location.day_temp.clamp(MIN_TEMP_C, MAX_TEMP_C);
    let night = location.night_temp.clamp(MIN_TEMP_C, MAX_TEMP_C);

    match QUESTION_KINDS[rng.gen_range(0..QUESTION_KINDS.len())] {
        QuestionKind::Temperature => temperature_question(base_id, day, night, area, rng),
        QuestionKind::CropSuitability => {
            let suitable = crops_for_climate(day, area.soil_type, rng);
            crop_question(base_id + 1, day, &suitable, area, rng)
        }
        QuestionKind::ClimateAdaptation => adaptation_question(base_id + 2, area, rng),
        QuestionKind::SoilBenefit => soil_question(base_id + 3, area, rng),
    }
}

fn temperature_question(
    id: u64,
    day: i32,
    night: i32,
    area: &Area,
    rng: &mut impl Rng,
) -> QuizQuestion {
    let diff = (day - night).abs();
    let avg = round_half_up(f64::from(day + night) / 2.0) as i32;
    let zone = area.climate_zone;

    let (question, correct, wrong, explanation) = match rng.gen_range(0..3) {
        0 => (
            format!(
                "In {}, the day temperature is {}°C and night temperature is {}°C. What is the temperature difference?",
                area.name, day, night
            ),
            format!("{}°C", diff),
            degrees(distractors(diff, [diff + 5, diff - 3, diff + 8])),
            format!(
                "The temperature difference between day ({}°C) and night ({}°C) is {}°C. This daily temperature variation affects crop selection and farming practices in {} climates.",
                day, night, diff, zone
            ),
        ),
        1 => (
            format!(
                "With day temperature of {}°C and night temperature of {}°C in {}, what is the average temperature?",
                day, night, area.name
            ),
            format!("{}°C", avg),
            degrees(distractors(avg, [avg + 3, avg - 2, day, avg + 5, avg - 4])),
            format!(
                "The average temperature is calculated as ({}°C + {}°C) ÷ 2 = {}°C. This average helps determine suitable crops for the region.",
                day, night, avg
            ),
        ),
        _ => {
            let pattern = temperature_pattern(day, night);
            (
                format!(
                    "Based on the temperature data (Day: {}°C, Night: {}°C) in {}, this represents which climate pattern?",
                    day, night, area.name
                ),
                pattern.to_string(),
                distractors(pattern, TEMPERATURE_PATTERNS)
                    .into_iter()
                    .map(str::to_string)
                    .collect(),
                format!(
                    "With day temperatures of {}°C and night temperatures of {}°C, this shows {} conditions typical of {} regions.",
                    day,
                    night,
                    pattern.to_lowercase(),
                    zone
                ),
            )
        }
    };

    QuizQuestion::shuffled(id, question, correct, wrong, explanation, area.id, rng)
}

fn crop_question(
    id: u64,
    temperature: i32,
    suitable: &[&'static Crop],
    area: &Area,
    rng: &mut impl Rng,
) -> QuizQuestion {
    let correct = suitable.first().copied().unwrap_or(&CROPS[0]);
    let is_suitable = |c: &Crop| suitable.iter().any(|s| s.id == c.id);

    // Prefer crops that do not fit; top up from the rest of the catalogue.
    let candidates = CROPS
        .iter()
        .filter(|&c| !is_suitable(c))
        .chain(CROPS.iter().filter(|&c| is_suitable(c)))
        .map(|c| c.name);

    QuizQuestion::shuffled(
        id,
        format!(
            "With {} climate, {}°C daytime temperature, and {} soil in {}, which crop would be most suitable?",
            area.climate_zone.label().to_lowercase(),
            temperature,
            area.soil_type.label().to_lowercase(),
            area.name
        ),
        correct.name.to_string(),
        distractors(correct.name, candidates)
            .into_iter()
            .map(str::to_string)
            .collect(),
        format!(
            "{} is ideal for this location because it thrives in temperatures between {}°C and {}°C and grows well in {} soil.",
            correct.name,
            correct.min_temperature,
            correct.max_temperature,
            correct.soil_requirement.label().to_lowercase()
        ),
        area.id,
        rng,
    )
}

fn adaptation_question(id: u64, area: &Area, rng: &mut impl Rng) -> QuizQuestion {
    let correct = climate_adaptations(area.climate_zone)[0];

    QuizQuestion::shuffled(
        id,
        format!(
            "In the {} climate zone of {}, what farming adaptation would be most effective?",
            area.climate_zone, area.name
        ),
        correct.to_string(),
        distractors(correct, WRONG_ADAPTATIONS)
            .into_iter()
            .map(str::to_string)
            .collect(),
        format!(
            "In {} climates, {} is essential for successful agriculture due to the specific temperature and precipitation patterns.",
            area.climate_zone.label().to_lowercase(),
            correct.to_lowercase()
        ),
        area.id,
        rng,
    )
}

fn soil_question(id: u64, area: &Area, rng: &mut impl Rng) -> QuizQuestion {
    let correct = soil_benefits(area.soil_type)[0];

    QuizQuestion::shuffled(
        id,
        format!(
            "The {} soil in {} provides which main advantage for agriculture?",
            area.soil_type.label().to_lowercase(),
            area.name
        ),
        correct.to_string(),
        distractors(correct, WRONG_SOIL_BENEFITS)
            .into_iter()
            .map(str::to_string)
            .collect(),
        format!(
            "{} soil is beneficial because it offers {}, making it suitable for various agricultural practices.",
            area.soil_type,
            correct.to_lowercase()
        ),
        area.id,
        rng,
    )
}
