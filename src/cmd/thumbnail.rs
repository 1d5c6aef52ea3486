use std::path::Path;

use anyhow::{Context, Result};

use crosspost::{Config, ImageAsset, ThumbnailSynthesizer};

pub fn cmd_thumbnail(config: &Config, title: &str, site: &str, output: &Path) -> Result<()> {
    let png = ThumbnailSynthesizer::new().synthesize(title, site)?;
    let asset = ImageAsset::compressed(&png, config.max_image_bytes)?;
    std::fs::write(output, &asset.bytes)
        .with_context(|| format!("writing {}", output.display()))?;
    println!("💾 Saved {} bytes to {}", asset.len(), output.display());
    Ok(())
}
