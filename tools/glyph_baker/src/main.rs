use anyhow::{Context, Result};
use clap::{Arg, Command};
use std::path::{Path, PathBuf};

use glyph_engine::config::{Config, FontConfig};
use glyph_engine::foundation::logging;
use glyph_engine::text::{FontFace, GlyphAtlas, GlyphAtlasBuilder};

fn main() -> Result<()> {
    logging::init();

    let matches = Command::new("glyph_baker")
        .about("Rasterizes every named glyph of a font into .pnct geometry and .txtr texture assets")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Font configuration (.toml or .ron); built-in defaults when omitted"),
        )
        .arg(
            Arg::new("png-dir")
                .long("png-dir")
                .value_name("DIR")
                .help("Also write each baked glyph as a PNG into this directory"),
        )
        .get_matches();

    let config = match matches.get_one::<String>("config") {
        Some(path) => FontConfig::load_from_file(path)
            .with_context(|| format!("Failed to load font configuration {}", path))?,
        None => FontConfig::default(),
    };
    config.validate().context("Invalid font configuration")?;

    let face = FontFace::open(&config.font_path, config.pixel_size_f32())
        .with_context(|| format!("Failed to open font {}", config.font_path.display()))?;

    let atlas = GlyphAtlasBuilder::new(config.pixel_scale)
        .build(&face)
        .context("Failed to build glyph atlas")?;

    for path in [&config.geometry_path, &config.texture_path] {
        if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create output directory {}", dir.display()))?;
        }
    }
    atlas
        .write_files(&config.geometry_path, &config.texture_path)
        .context("Failed to write glyph assets")?;

    if let Some(dir) = matches.get_one::<String>("png-dir") {
        export_pngs(&atlas, &PathBuf::from(dir))?;
    }

    let report = atlas.report();
    println!("{} glyphs recognized under {}", report.emitted, report.total_glyphs);
    if !report.skipped.is_empty() {
        println!("{} glyphs skipped", report.skipped.len());
    }
    Ok(())
}

fn export_pngs(atlas: &GlyphAtlas, dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create PNG directory {}", dir.display()))?;

    let mut written = 0;
    for (name, image) in atlas.glyph_images() {
        let Some(file_name) = png_file_name(name) else {
            log::warn!("Glyph name {:?} is not a safe file name; PNG skipped", name);
            continue;
        };
        let image = image.with_context(|| format!("Bad bitmap for glyph {}", name))?;
        if image.width == 0 || image.height == 0 {
            continue;
        }
        image
            .save_png(dir.join(file_name))
            .with_context(|| format!("Failed to write PNG for glyph {}", name))?;
        written += 1;
    }

    log::info!("Wrote {} glyph PNGs to {}", written, dir.display());
    Ok(())
}

/// `<name>.png`, or `None` when the name would escape the output directory
fn png_file_name(name: &str) -> Option<String> {
    let unsafe_name = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains(['/', '\\', '\0'])
        || Path::new(name).is_absolute();
    (!unsafe_name).then(|| format!("{}.png", name))
}
