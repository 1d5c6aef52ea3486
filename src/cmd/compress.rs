use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crosspost::ImageAsset;

pub fn cmd_compress(file: &Path, max_bytes: usize, output: Option<PathBuf>) -> Result<()> {
    let raw = std::fs::read(file).with_context(|| format!("reading {}", file.display()))?;
    let asset = ImageAsset::compressed(&raw, max_bytes)?;

    let output = output.unwrap_or_else(|| default_output(file));
    std::fs::write(&output, &asset.bytes)
        .with_context(|| format!("writing {}", output.display()))?;
    println!(
        "💾 {} -> {} bytes, saved to {}",
        raw.len(),
        asset.len(),
        output.display()
    );
    Ok(())
}

fn default_output(file: &Path) -> PathBuf {
    let stem = file
        .file_stem()
        .map_or_else(|| "image".into(), |s| s.to_string_lossy());
    file.with_file_name(format!("{stem}.compressed.jpg"))
}
