//! Scroll Demo
//!
//! Drives a headless portfolio page from top to bottom and prints what each
//! section did. Set `RUST_LOG=folio_app=debug` to see the lifecycle.
//!
//! Run with: cargo run -p folio_app --example scroll_demo [-- path/to/folio.toml]

use anyhow::{Context, Result};
use folio_app::logging::init_logging;
use folio_app::prelude::*;

const FRAME_MS: f32 = 16.0;

fn main() -> Result<()> {
    init_logging();

    let config = match std::env::args().nth(1) {
        Some(path) => {
            FolioConfig::load(&path).with_context(|| format!("loading config from {path}"))?
        }
        None => FolioConfig::default(),
    };

    let page = Page::new(StaticEnvironment::desktop());
    let mut site = Site::new(page, &config, SiteContent::sample()).context("building site")?;
    site.mount();
    print_phases(&site, "mounted");

    // Let the intro curtain and the hero entrance play out
    let mut frames = 0;
    while site.frame(FRAME_MS) {
        frames += 1;
    }
    tracing::info!(frames, "intro finished");

    let height = site.page().viewport().height;
    let mut y = 0.0;
    while y < 3000.0 {
        y += height / 4.0;
        site.scroll_to(y);
        for _ in 0..30 {
            site.frame(FRAME_MS);
        }
    }
    print_phases(&site, "scrolled to bottom");

    match site.showcase_view() {
        ShowcaseView::Scene3D(cloud) => println!(
            "showcase: 3D point cloud with {} nodes and {} links",
            cloud.nodes.len(),
            cloud.segments.len()
        ),
        ShowcaseView::Canvas2D(bars) => {
            println!("showcase: 2D bars ({}), {} bars", bars.reason, bars.bars.len())
        }
        ShowcaseView::StaticGrid(tiles) => {
            println!("showcase: static grid, {} tiles", tiles.0.len())
        }
        ShowcaseView::Placeholder => println!("showcase: still checking"),
    }

    site.unmount();
    print_phases(&site, "unmounted");
    Ok(())
}

fn print_phases(site: &Site, when: &str) {
    println!("-- {when}");
    for (name, phase) in site.phases() {
        println!("   {name:<12} {phase:?}");
    }
}
