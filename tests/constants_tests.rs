// SPDX-License-Identifier: MPL-2.0

//! Integration tests for constants module

use scanfeast::app::display::{level_color, score_color};
use scanfeast::catalog::{NutriScoreGrade, NutrientLevel};
use scanfeast::constants::{Color, palette};

#[test]
fn test_color_hex() {
    assert_eq!(palette::GREEN_500.to_hex(), "#22c55e");
    assert_eq!(palette::RED_500.to_hex(), "#ef4444");
    assert_eq!(Color::from_rgb8(0, 0, 0).to_hex(), "#000000");
}

#[test]
fn test_score_colors_are_distinct() {
    // Every grade should be distinguishable at a glance
    let colors: Vec<Color> = NutriScoreGrade::ALL.iter().map(|&g| score_color(g)).collect();
    for (i, a) in colors.iter().enumerate() {
        for b in &colors[i + 1..] {
            assert_ne!(a, b, "Nutri-Score colors should not repeat");
        }
    }
}

#[test]
fn test_unset_level_is_neutral() {
    let unset = level_color(NutrientLevel::Unset);
    for level in [NutrientLevel::Low, NutrientLevel::Moderate, NutrientLevel::High] {
        assert_ne!(level_color(level), unset);
    }
}
