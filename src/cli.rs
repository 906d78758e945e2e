// SPDX-License-Identifier: GPL-3.0-only

//! CLI commands
//!
//! - `lookup`: fetch one product code and print the product screen
//! - `decode`: list the barcodes found in image files
//! - `scan`: walk entry → scan → product with image files as the camera

use scanfeast::app::display::ProductDisplay;
use scanfeast::app::entry::{handle_scan_press, scan_button_label};
use scanfeast::app::frame_processor::QrDetector;
use scanfeast::app::{DecodeOutcome, ProductScreen, ProductView, Section, SectionExpansion};
use scanfeast::backends::camera::{CameraFacing, CameraFeed, ImageFeed};
use scanfeast::backends::permission::{
    CameraAuthority, FixedAuthority, PermissionGate, PermissionStatus, TerminalAuthority,
};
use scanfeast::catalog::NutrientLevel;
use scanfeast::navigation::HistoryNavigator;
use scanfeast::{Config, HttpCatalog, ProductCode, ScanController};
use std::fmt::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

type CliResult = Result<(), Box<dyn std::error::Error>>;

const BAR_WIDTH: usize = 20;

/// Look up a single product code
pub async fn lookup(config: &Config, code: &str, json: bool) -> CliResult {
    let code = ProductCode::new(code).ok_or("product code must not be empty")?;
    let catalog = Arc::new(HttpCatalog::new(config.clone())?);

    let mut screen = ProductScreen::new(catalog, code);
    screen.load().await;
    print_view(&screen.view(), json)?;
    screen.unmount();
    Ok(())
}

/// Print every barcode found in the given images
pub async fn decode(config: &Config, images: Vec<PathBuf>) -> CliResult {
    let mut feed = ImageFeed::new(
        images,
        QrDetector::with_max_dimension(config.max_frame_dimension),
    );

    let mut found = 0;
    while let Some(detection) = feed.next_detection().await {
        found += 1;
        match detection.bounds {
            Some(b) => println!(
                "{}\t{}\tx={:.3} y={:.3} w={:.3} h={:.3}",
                detection.symbology, detection.data, b.x, b.y, b.width, b.height
            ),
            None => println!("{}\t{}", detection.symbology, detection.data),
        }
    }

    if found == 0 {
        println!("No barcodes found.");
    }
    Ok(())
}

/// Full scan flow over image files
pub async fn scan(
    config: &Config,
    images: Vec<PathBuf>,
    yes: bool,
    front: bool,
    json: bool,
) -> CliResult {
    if yes {
        let gate = PermissionGate::new(FixedAuthority::answering(PermissionStatus::Granted));
        run_scan(config, gate, images, front, json).await
    } else {
        let gate = PermissionGate::new(TerminalAuthority::default());
        run_scan(config, gate, images, front, json).await
    }
}

async fn run_scan<A: CameraAuthority>(
    config: &Config,
    mut gate: PermissionGate<A>,
    images: Vec<PathBuf>,
    front: bool,
    json: bool,
) -> CliResult {
    let mut nav = HistoryNavigator::new();

    eprintln!("[{}]", scan_button_label(gate.current_status()));
    if let Err(e) = handle_scan_press(&mut gate, &mut nav).await {
        eprintln!("{}", e);
        return Ok(());
    }

    let feed = ImageFeed::new(
        images,
        QrDetector::with_max_dimension(config.max_frame_dimension),
    );
    let mut scanner = ScanController::new(feed, config.default_facing);
    if front != (config.default_facing == CameraFacing::Front) {
        scanner.flip();
    }
    if !scanner.activate(&gate, &mut nav) {
        return Ok(());
    }

    while let Some(outcome) = scanner.pump().await {
        if outcome == DecodeOutcome::Recorded {
            break;
        }
    }

    let Some(code) = scanner.confirm(&mut nav) else {
        println!("No barcode found.");
        scanner.go_back(&mut nav);
        return Ok(());
    };
    if let Some(event) = &scanner.state().pending_result {
        eprintln!(
            "Scanned {} ({})",
            event.raw_value,
            event.symbology.display_name()
        );
    }
    tracing::debug!(path = nav.current_path(), code = %code, "Navigated");

    let catalog = Arc::new(HttpCatalog::new(config.clone())?);
    let mut screen = ProductScreen::mount(&nav, catalog)?;
    screen.load().await;
    print_view(&screen.view(), json)?;
    screen.unmount();
    Ok(())
}

fn print_view(view: &ProductView, json: bool) -> CliResult {
    if json {
        println!("{}", serde_json::to_string_pretty(view)?);
        return Ok(());
    }

    match view {
        ProductView::Loading { message } => println!("{}", message),
        ProductView::Error { message, retry, .. } => {
            println!("{}", message);
            println!("[{}]", retry);
        }
        ProductView::Ready { product, sections } => print!("{}", render_product(product, sections)),
    }
    Ok(())
}

/// Text form of the product screen, one card after another
fn render_product(product: &ProductDisplay, sections: &SectionExpansion) -> String {
    let mut out = String::new();
    // Writing to a String cannot fail
    let _ = write_product(&mut out, product, sections);
    out
}

fn write_product(
    out: &mut String,
    product: &ProductDisplay,
    sections: &SectionExpansion,
) -> fmt::Result {
    writeln!(out, "{}", product.brand)?;
    writeln!(out, "{}", product.name)?;
    writeln!(out, "Code: {}", product.code)?;
    match &product.image_url {
        Some(url) => writeln!(out, "Image: {}", url)?,
        None => writeln!(out, "No image available")?,
    }

    writeln!(out)?;
    writeln!(
        out,
        "{} Nutrition Score",
        chevron(sections.is_expanded(Section::Nutrition))
    )?;
    writeln!(
        out,
        "  Nutri-Score {} ({})",
        product.nutriscore_grade.as_str().to_uppercase(),
        product.nutriscore_label
    )?;
    if sections.is_expanded(Section::Nutrition) {
        if let Some(heading) = &product.nutrition_heading {
            writeln!(out, "  {}", heading)?;
        }
        for row in &product.nutrients {
            writeln!(
                out,
                "  {:<14} {:>12}  {}",
                row.label,
                row.value,
                level_marker(row.level)
            )?;
        }
    }

    writeln!(out)?;
    writeln!(out, "Product Categories")?;
    if product.categories.is_empty() {
        writeln!(out, "  No categories available")?;
    } else {
        let labels: Vec<&str> = product.categories.iter().map(|c| c.label.as_str()).collect();
        writeln!(out, "  {}", labels.join(", "))?;
    }

    writeln!(out)?;
    writeln!(
        out,
        "{} Environmental Impact",
        chevron(sections.is_expanded(Section::Environmental))
    )?;
    writeln!(out, "  Eco-Score: {}", product.eco_score)?;
    if sections.is_expanded(Section::Environmental) {
        writeln!(out, "  {}", product.environmental_note)?;
    }

    writeln!(out)?;
    writeln!(out, "Data Quality")?;
    writeln!(
        out,
        "  Completeness [{}] {}",
        progress_bar(product.completeness.bar_percent()),
        product.completeness
    )?;
    writeln!(out, "  Last modified: {}", product.last_modified)
}

fn chevron(expanded: bool) -> &'static str {
    if expanded { "v" } else { ">" }
}

fn level_marker(level: NutrientLevel) -> &'static str {
    match level {
        NutrientLevel::Low => "low",
        NutrientLevel::Moderate => "moderate",
        NutrientLevel::High => "high",
        NutrientLevel::Unset => "",
    }
}

fn progress_bar(percent: u8) -> String {
    let filled = (usize::from(percent.min(100)) * BAR_WIDTH + 50) / 100;
    format!("{}{}", "#".repeat(filled), "-".repeat(BAR_WIDTH - filled))
}
