// SPDX-License-Identifier: GPL-3.0-only

//! Derived display values for the product screen
//!
//! Pure functions over a normalized [`Product`]. Nothing here touches
//! screen state.

use crate::catalog::{NutriScoreGrade, Nutrient, NutrientLevel, Product};
use crate::constants::{Color, UNKNOWN_LABEL, palette};
use chrono::DateTime;
use serde::{Serialize, Serializer};
use std::fmt;

/// Shown under the Eco-Score when the environmental section is expanded
pub const ENVIRONMENTAL_NOTE: &str =
    "Environmental data for this product is limited. More information may be added in the future.";

/// Nutri-Score verdict
pub fn score_label(grade: NutriScoreGrade) -> &'static str {
    match grade {
        NutriScoreGrade::A => "Excellent",
        NutriScoreGrade::B => "Good",
        NutriScoreGrade::C => "Fair",
        NutriScoreGrade::D => "Poor",
        NutriScoreGrade::E => "Unhealthy",
        NutriScoreGrade::Unknown => UNKNOWN_LABEL,
    }
}

/// Badge color for a Nutri-Score
pub fn score_color(grade: NutriScoreGrade) -> Color {
    match grade {
        NutriScoreGrade::A => palette::GREEN_500,
        NutriScoreGrade::B => palette::GREEN_400,
        NutriScoreGrade::C => palette::YELLOW_400,
        NutriScoreGrade::D => palette::ORANGE_400,
        NutriScoreGrade::E => palette::RED_500,
        NutriScoreGrade::Unknown => palette::ZINC_400,
    }
}

/// Dot color for a nutrient level
pub fn level_color(level: NutrientLevel) -> Color {
    match level {
        NutrientLevel::Low => palette::GREEN_500,
        NutrientLevel::Moderate => palette::YELLOW_500,
        NutrientLevel::High => palette::RED_500,
        NutrientLevel::Unset => palette::ZINC_600,
    }
}

/// Record completeness as shown to the user
///
/// `Unknown` and `Percent(0)` are different things: one is missing data,
/// the other an empty record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completeness {
    Percent(u8),
    Unknown,
}

impl Completeness {
    /// Progress bar width in percent; empty when unknown
    pub fn bar_percent(&self) -> u8 {
        match self {
            Completeness::Percent(p) => *p,
            Completeness::Unknown => 0,
        }
    }
}

impl fmt::Display for Completeness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Completeness::Percent(p) => write!(f, "{}%", p),
            Completeness::Unknown => f.write_str(UNKNOWN_LABEL),
        }
    }
}

impl Serialize for Completeness {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Completeness::Percent(p) => serializer.serialize_u8(*p),
            Completeness::Unknown => serializer.serialize_str(UNKNOWN_LABEL),
        }
    }
}

pub fn completeness_percent(product: &Product) -> Completeness {
    match product.completeness {
        Some(c) => Completeness::Percent((c.clamp(0.0, 1.0) * 100.0).round() as u8),
        None => Completeness::Unknown,
    }
}

/// Last modification date as `YYYY-MM-DD` (UTC), or "Unknown"
pub fn formatted_last_modified(product: &Product) -> String {
    product
        .last_modified_epoch_seconds
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| UNKNOWN_LABEL.to_string())
}

/// Eco-Score grade for display, e.g. "B"
pub fn eco_score_label(product: &Product) -> String {
    product
        .ecoscore_grade
        .as_deref()
        .map(str::to_uppercase)
        .unwrap_or_else(|| UNKNOWN_LABEL.to_string())
}

/// One line of the nutrition table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NutrientRow {
    pub nutrient: Nutrient,
    pub label: &'static str,
    /// Amount with unit, e.g. "30.9 g"
    pub value: String,
    pub level: NutrientLevel,
    #[serde(serialize_with = "serialize_color")]
    pub level_color: Color,
}

/// Nutrition table rows, each colored by its own nutrient's level
pub fn nutrient_rows(product: &Product) -> Vec<NutrientRow> {
    Nutrient::ALL
        .iter()
        .map(|&nutrient| {
            let level = product.level(nutrient);
            NutrientRow {
                nutrient,
                label: nutrient.label(),
                value: format!("{} {}", product.nutrient(nutrient), nutrient.unit()),
                level,
                level_color: level_color(level),
            }
        })
        .collect()
}

/// A category chip
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryChip {
    /// Raw catalog tag, stable identity
    pub tag: String,
    pub label: String,
}

/// Everything the product screen renders once data is ready
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductDisplay {
    pub code: String,
    pub brand: String,
    pub name: String,
    /// `None` renders the "No image available" placeholder
    pub image_url: Option<String>,
    pub nutriscore_grade: NutriScoreGrade,
    pub nutriscore_label: &'static str,
    #[serde(serialize_with = "serialize_color")]
    pub nutriscore_color: Color,
    /// e.g. "Nutritional values per 100g"
    pub nutrition_heading: Option<String>,
    pub nutrients: Vec<NutrientRow>,
    /// Empty renders "No categories available"
    pub categories: Vec<CategoryChip>,
    pub eco_score: String,
    /// Detail text of the environmental section
    pub environmental_note: &'static str,
    pub completeness: Completeness,
    pub last_modified: String,
}

impl ProductDisplay {
    pub fn from_product(product: &Product) -> Self {
        Self {
            code: product.code.clone(),
            brand: product
                .brand
                .clone()
                .unwrap_or_else(|| "Unknown Brand".to_string()),
            name: product
                .name
                .clone()
                .unwrap_or_else(|| "Unknown Product".to_string()),
            image_url: product.image_url.clone(),
            nutriscore_grade: product.nutriscore_grade,
            nutriscore_label: score_label(product.nutriscore_grade),
            nutriscore_color: score_color(product.nutriscore_grade),
            nutrition_heading: product
                .nutrition_data_per
                .as_ref()
                .map(|per| format!("Nutritional values per {}", per)),
            nutrients: nutrient_rows(product),
            categories: product
                .categories
                .iter()
                .map(|tag| CategoryChip {
                    tag: tag.raw().to_string(),
                    label: tag.label().to_string(),
                })
                .collect(),
            eco_score: eco_score_label(product),
            environmental_note: ENVIRONMENTAL_NOTE,
            completeness: completeness_percent(product),
            last_modified: formatted_last_modified(product),
        }
    }
}

fn serialize_color<S: Serializer>(color: &Color, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&color.to_hex())
}
