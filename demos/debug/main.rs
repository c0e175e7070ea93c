//! Kite debug output: renders a named pattern to an SVG document on stdout.
//!
//! ```text
//! main.rs       entry point (this file)
//! patterns/     pattern shapes, one module per topic
//! ```
//!
//! Usage:
//! ```text
//! cargo run --example debug                        # default (stroke_joins)
//! cargo run --example debug -- dashes > dashes.svg
//! RUST_LOG=kite=debug cargo run --example debug -- polar
//! ```

mod patterns;

use kite::geometry::{Bounds2, Shape};

/// Margin around the drawing, in user units.
const MARGIN: f64 = 1.0;

fn main() {
    // Default: WARN for everything, INFO for kite.
    // Override with RUST_LOG env var (e.g. RUST_LOG=kite=trace).
    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing_subscriber::filter::LevelFilter::WARN.into())
        .add_directive("kite=info".parse().unwrap_or_default());
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let name = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "stroke_joins".to_owned());
    let Some(layers) = patterns::build(&name) else {
        eprintln!(
            "unknown pattern '{name}', expected one of: {}",
            patterns::PATTERNS.join(", ")
        );
        std::process::exit(2);
    };
    tracing::info!(pattern = %name, layers = layers.len(), "rendering");
    println!("{}", svg_document(&layers));
}

fn svg_document(layers: &[patterns::Layer]) -> String {
    let bounds = layers
        .iter()
        .fold(Bounds2::EMPTY, |acc, layer| acc.union(&layer.shape.bounds()))
        .dilated(MARGIN);
    let mut svg = format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" viewBox=\"{} {} {} {}\">\n",
        bounds.min_x(),
        bounds.min_y(),
        bounds.width(),
        bounds.height()
    );
    for layer in layers {
        svg.push_str(&path_element(&layer.shape, layer.fill, layer.color));
    }
    svg.push_str("</svg>");
    svg
}

fn path_element(shape: &Shape, fill: bool, color: &str) -> String {
    let paint = if fill {
        format!("fill=\"{color}\" fill-opacity=\"0.5\" stroke=\"none\"")
    } else {
        format!("fill=\"none\" stroke=\"{color}\" stroke-width=\"0.05\"")
    };
    format!("  <path d=\"{}\" {paint}/>\n", shape.svg_path())
}
