// SPDX-License-Identifier: GPL-3.0-only

//! Catalog payload and the normalized product model
//!
//! The raw types mirror the catalog JSON and are all-optional. [`normalize`]
//! turns a raw product into a [`Product`] in which every nutrient and level
//! is present, so no absent field reaches the display layer.

use crate::app::scan::ProductCode;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Top-level catalog response: `{status, product?}`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogResponse {
    /// 1 when the product exists
    #[serde(default, deserialize_with = "lenient_number")]
    pub status: Option<f64>,
    #[serde(default)]
    pub product: Option<RawProduct>,
}

impl CatalogResponse {
    /// The product, if the catalog says it was found
    pub fn into_found(self) -> Option<RawProduct> {
        match self.status {
            Some(status) if status == 1.0 => self.product,
            _ => None,
        }
    }
}

/// Product fields consumed from the catalog
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawProduct {
    #[serde(deserialize_with = "lenient_text")]
    pub code: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub product_name: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub brands: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub image_front_url: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub nutriscore_grade: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub nutriments: HashMap<String, serde_json::Value>,
    #[serde(deserialize_with = "null_as_default")]
    pub nutrient_levels: HashMap<String, serde_json::Value>,
    #[serde(deserialize_with = "lenient_text_list")]
    pub categories_tags: Vec<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub ecoscore_grade: Option<String>,
    #[serde(deserialize_with = "lenient_number")]
    pub completeness: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub last_modified_t: Option<f64>,
    #[serde(deserialize_with = "lenient_text")]
    pub nutrition_data_per: Option<String>,
}

/// Accept numbers, numeric strings and null
fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(number_from_value))
}

/// Accept strings and numbers (`"code": 3017620422003`); anything else is absent
fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(text_from_value))
}

/// A list of strings, skipping entries that are not text; anything but a list is empty
fn lenient_text_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Array(items)) => items.iter().filter_map(text_from_value).collect(),
        _ => Vec::new(),
    })
}

fn text_from_value(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn number_from_value(value: &serde_json::Value) -> Option<f64> {
    match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|n| n.is_finite())
}

/// Nutri-Score letter grade
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NutriScoreGrade {
    A,
    B,
    C,
    D,
    E,
    #[default]
    Unknown,
}

impl NutriScoreGrade {
    pub const ALL: [NutriScoreGrade; 6] = [
        NutriScoreGrade::A,
        NutriScoreGrade::B,
        NutriScoreGrade::C,
        NutriScoreGrade::D,
        NutriScoreGrade::E,
        NutriScoreGrade::Unknown,
    ];

    /// Total: anything other than a-e is `Unknown`
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "a" => Self::A,
            "b" => Self::B,
            "c" => Self::C,
            "d" => Self::D,
            "e" => Self::E,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::A => "a",
            Self::B => "b",
            Self::C => "c",
            Self::D => "d",
            Self::E => "e",
            Self::Unknown => "unknown",
        }
    }
}

/// Catalog traffic-light level for a nutrient
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NutrientLevel {
    Low,
    Moderate,
    High,
    #[default]
    Unset,
}

impl NutrientLevel {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "low" => Self::Low,
            "moderate" => Self::Moderate,
            "high" => Self::High,
            _ => Self::Unset,
        }
    }
}

/// Nutrients shown on the product screen, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Nutrient {
    EnergyKcal,
    Fat,
    SaturatedFat,
    Carbohydrates,
    Sugars,
    Proteins,
    Salt,
}

impl Nutrient {
    pub const ALL: [Nutrient; 7] = [
        Nutrient::EnergyKcal,
        Nutrient::Fat,
        Nutrient::SaturatedFat,
        Nutrient::Carbohydrates,
        Nutrient::Sugars,
        Nutrient::Proteins,
        Nutrient::Salt,
    ];

    /// Key in `nutriments` and `nutrient_levels`
    pub fn key(&self) -> &'static str {
        match self {
            Nutrient::EnergyKcal => "energy-kcal",
            Nutrient::Fat => "fat",
            Nutrient::SaturatedFat => "saturated-fat",
            Nutrient::Carbohydrates => "carbohydrates",
            Nutrient::Sugars => "sugars",
            Nutrient::Proteins => "proteins",
            Nutrient::Salt => "salt",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Nutrient::EnergyKcal => "Energy",
            Nutrient::Fat => "Fat",
            Nutrient::SaturatedFat => "Saturated Fat",
            Nutrient::Carbohydrates => "Carbohydrates",
            Nutrient::Sugars => "Sugars",
            Nutrient::Proteins => "Protein",
            Nutrient::Salt => "Salt",
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            Nutrient::EnergyKcal => "kcal",
            _ => "g",
        }
    }
}

/// A raw category tag such as `en:sweet-spreads`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct CategoryTag(String);

impl CategoryTag {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// The tag as the catalog sent it
    pub fn raw(&self) -> &str {
        &self.0
    }

    /// Display label without the locale namespace (`en:snacks` -> `snacks`)
    pub fn label(&self) -> &str {
        match self.0.split_once(':') {
            Some((namespace, rest)) if is_locale_namespace(namespace) && !rest.is_empty() => rest,
            _ => &self.0,
        }
    }
}

/// Namespaces are short language codes: `en`, `fr`, `xx`, `pt-br`, `zh_hant`
fn is_locale_namespace(namespace: &str) -> bool {
    (2..=7).contains(&namespace.len())
        && namespace.chars().next().is_some_and(|c| c.is_ascii_alphabetic())
        && namespace
            .chars()
            .all(|c| c.is_ascii_alphabetic() || c == '-' || c == '_')
}

/// Normalized product
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Product {
    pub code: String,
    pub brand: Option<String>,
    pub name: Option<String>,
    pub image_url: Option<String>,
    pub nutriscore_grade: NutriScoreGrade,
    /// Every [`Nutrient`], 0 when the catalog had no value
    pub nutriments: BTreeMap<Nutrient, f64>,
    /// Every [`Nutrient`], `Unset` when the catalog had no level
    pub nutrient_levels: BTreeMap<Nutrient, NutrientLevel>,
    pub categories: Vec<CategoryTag>,
    pub ecoscore_grade: Option<String>,
    /// In [0, 1]
    pub completeness: Option<f64>,
    pub last_modified_epoch_seconds: Option<i64>,
    /// Reference quantity for the nutriments, e.g. "100g"
    pub nutrition_data_per: Option<String>,
}

impl Product {
    pub fn nutrient(&self, nutrient: Nutrient) -> f64 {
        self.nutriments.get(&nutrient).copied().unwrap_or(0.0)
    }

    pub fn level(&self, nutrient: Nutrient) -> NutrientLevel {
        self.nutrient_levels
            .get(&nutrient)
            .copied()
            .unwrap_or_default()
    }
}

/// Build a [`Product`] from a found catalog entry
///
/// `requested` stands in for the code when the payload omits it.
pub fn normalize(raw: RawProduct, requested: &ProductCode) -> Product {
    let nutriments = Nutrient::ALL
        .iter()
        .map(|n| {
            let amount = raw
                .nutriments
                .get(n.key())
                .and_then(number_from_value)
                .unwrap_or(0.0);
            (*n, amount)
        })
        .collect();

    let nutrient_levels = Nutrient::ALL
        .iter()
        .map(|n| {
            let level = raw
                .nutrient_levels
                .get(n.key())
                .and_then(|v| v.as_str())
                .map(NutrientLevel::parse)
                .unwrap_or_default();
            (*n, level)
        })
        .collect();

    Product {
        code: non_blank(raw.code).unwrap_or_else(|| requested.as_str().to_string()),
        brand: non_blank(raw.brands),
        name: non_blank(raw.product_name),
        image_url: non_blank(raw.image_front_url),
        nutriscore_grade: raw
            .nutriscore_grade
            .as_deref()
            .map(NutriScoreGrade::parse)
            .unwrap_or_default(),
        nutriments,
        nutrient_levels,
        categories: raw
            .categories_tags
            .into_iter()
            .filter(|tag| !tag.trim().is_empty())
            .map(CategoryTag::new)
            .collect(),
        ecoscore_grade: non_blank(raw.ecoscore_grade),
        completeness: raw.completeness.map(|c| c.clamp(0.0, 1.0)),
        last_modified_epoch_seconds: raw.last_modified_t.map(|t| t as i64),
        nutrition_data_per: non_blank(raw.nutrition_data_per),
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code() -> ProductCode {
        ProductCode::new("3017620422003").unwrap()
    }

    #[test]
    fn test_status_classification() {
        let found: CatalogResponse =
            serde_json::from_str(r#"{"status": 1, "product": {"code": "1"}}"#).unwrap();
        assert!(found.into_found().is_some());

        let missing: CatalogResponse = serde_json::from_str(r#"{"status": 0}"#).unwrap();
        assert!(missing.into_found().is_none());

        // A product without status 1 still counts as not found
        let stray: CatalogResponse =
            serde_json::from_str(r#"{"status": 0, "product": {"code": "1"}}"#).unwrap();
        assert!(stray.into_found().is_none());

        let no_status: CatalogResponse = serde_json::from_str("{}").unwrap();
        assert!(no_status.into_found().is_none());
    }

    #[test]
    fn test_loosely_typed_fields_are_accepted() {
        let found: CatalogResponse = serde_json::from_str(
            r#"{"status": 1, "product": {
                "code": 3017620422003,
                "product_name": null,
                "brands": ["Ferrero"],
                "categories_tags": ["en:snacks", null, 7, {"id": "x"}, "en:sweet-spreads"]
            }}"#,
        )
        .unwrap();
        let product = normalize(found.into_found().unwrap(), &ProductCode::new("other").unwrap());

        assert_eq!(product.code, "3017620422003");
        assert_eq!(product.name, None);
        assert_eq!(product.brand, None);
        let raw: Vec<&str> = product.categories.iter().map(CategoryTag::raw).collect();
        assert_eq!(raw, ["en:snacks", "7", "en:sweet-spreads"]);
    }

    #[test]
    fn test_normalize_empty_product_is_total() {
        let product = normalize(RawProduct::default(), &code());

        assert_eq!(product.code, "3017620422003");
        assert_eq!(product.nutriscore_grade, NutriScoreGrade::Unknown);
        assert_eq!(product.nutriments.len(), Nutrient::ALL.len());
        assert_eq!(product.nutrient_levels.len(), Nutrient::ALL.len());
        for nutrient in Nutrient::ALL {
            assert_eq!(product.nutrient(nutrient), 0.0);
            assert_eq!(product.level(nutrient), NutrientLevel::Unset);
        }
        assert!(product.categories.is_empty());
        assert_eq!(product.completeness, None);
        assert_eq!(product.last_modified_epoch_seconds, None);
    }

    #[test]
    fn test_normalize_reads_fields() {
        let raw: RawProduct = serde_json::from_value(serde_json::json!({
            "code": "3017620422003",
            "product_name": "Nutella",
            "brands": "Ferrero",
            "nutriscore_grade": "E",
            "nutriments": {"energy-kcal": 539, "fat": "30.9", "sugars": 56.3, "salt": null},
            "nutrient_levels": {"fat": "high", "saturated-fat": "high", "sugars": "high", "salt": "low"},
            "categories_tags": ["en:snacks", "en:sweet-spreads"],
            "completeness": 0.875,
            "last_modified_t": 1700000000,
            "nutrition_data_per": "100g"
        }))
        .unwrap();
        let product = normalize(raw, &code());

        assert_eq!(product.name.as_deref(), Some("Nutella"));
        assert_eq!(product.brand.as_deref(), Some("Ferrero"));
        assert_eq!(product.nutriscore_grade, NutriScoreGrade::E);
        assert_eq!(product.nutrient(Nutrient::EnergyKcal), 539.0);
        assert_eq!(product.nutrient(Nutrient::Fat), 30.9);
        assert_eq!(product.nutrient(Nutrient::Salt), 0.0);
        assert_eq!(product.level(Nutrient::Salt), NutrientLevel::Low);
        assert_eq!(product.level(Nutrient::Proteins), NutrientLevel::Unset);
        assert_eq!(product.completeness, Some(0.875));
        assert_eq!(product.last_modified_epoch_seconds, Some(1_700_000_000));
    }

    #[test]
    fn test_category_labels_strip_locale() {
        let snacks = CategoryTag::new("en:snacks");
        assert_eq!(snacks.label(), "snacks");
        assert_eq!(snacks.raw(), "en:snacks");
        assert_eq!(CategoryTag::new("fr:pâtes-à-tartiner").label(), "pâtes-à-tartiner");
        assert_eq!(CategoryTag::new("plain").label(), "plain");
        assert_eq!(CategoryTag::new("en:").label(), "en:");
        assert_eq!(CategoryTag::new("12:30").label(), "12:30");
    }

    #[test]
    fn test_completeness_is_clamped() {
        let raw = RawProduct {
            completeness: Some(1.2),
            ..Default::default()
        };
        assert_eq!(normalize(raw, &code()).completeness, Some(1.0));
    }

    #[test]
    fn test_grade_parse_is_total() {
        assert_eq!(NutriScoreGrade::parse("a"), NutriScoreGrade::A);
        assert_eq!(NutriScoreGrade::parse("not-applicable"), NutriScoreGrade::Unknown);
        assert_eq!(NutriScoreGrade::parse(""), NutriScoreGrade::Unknown);
    }
}
