//! Drives a spinner in real time against an in-memory document and renders
//! each pass as a row of shaded cells, one per spoke.
//!
//! Run with `RUST_LOG=debug` to watch the lifecycle.

use std::io::Write;
use std::thread;
use std::time::{Duration, Instant};

use throbber::prelude::*;

const SHADES: &[char] = &[' ', '.', ':', '-', '=', '+', '*', '#', '@'];

fn shade(alpha: f64) -> char {
    let index = (alpha.clamp(0.0, 1.0) * (SHADES.len() - 1) as f64).round() as usize;
    SHADES[index]
}

fn main() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();

    let doc = MemoryDocument::new();
    let placeholder = doc.create_element("div");
    if let Err(e) = doc.append_child(&doc.root(), &placeholder) {
        log::error!("Could not build the demo page: {}", e);
        return;
    }

    let config = SpinnerConfig::new()
        .spoke_count(16)
        .style(Style::Trail)
        .style_variant(1)
        .period(Period::Normal);
    let mut spinner = match Spinner::with_config(doc.clone(), RecordingSurface::new(), config) {
        Ok(spinner) => spinner,
        Err(e) => {
            log::error!("Invalid spinner configuration: {}", e);
            return;
        }
    };

    if let Err(e) = spinner.attach(Some(placeholder)) {
        log::error!("Attach failed: {}", e);
        return;
    }

    let begin = Instant::now();
    let mut flipped = false;
    let mut restyled = false;
    let mut stdout = std::io::stdout();

    while begin.elapsed() < Duration::from_secs(6) {
        let wait = spinner.update();

        let row: String = spinner
            .surface()
            .strokes()
            .iter()
            .map(|stroke| shade(stroke.alpha))
            .collect();
        let written = write!(
            stdout,
            "\r[{}] {:>6.2} / {:.0}  {:<6}",
            row,
            spinner.frame(),
            spinner.total_frames(),
            spinner.style()
        )
        .and_then(|()| stdout.flush());
        if let Err(e) = written {
            log::error!("Could not write to the terminal: {}", e);
            break;
        }

        let elapsed = begin.elapsed();
        if !flipped && elapsed > Duration::from_secs(2) {
            flipped = true;
            if let Err(e) = spinner.set_clockwise(false) {
                log::warn!("Direction change rejected: {}", e);
            }
        }
        if !restyled && elapsed > Duration::from_secs(4) {
            restyled = true;
            let update = ConfigUpdate::new().style("wave").period(Period::Short);
            if let Err(e) = spinner.set_configuration(&update) {
                log::warn!("Reconfiguration rejected: {}", e);
            }
        }

        match wait {
            Some(wait) => thread::sleep(wait),
            None => break,
        }
    }

    println!();
    match spinner.detach() {
        Some(node) => log::info!("Restored {:?}", node),
        None => log::warn!("Nothing was restored"),
    }
}
