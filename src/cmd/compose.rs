use std::io::Read;

use anyhow::{Context, Result};

use crosspost::{Composer, Config, PostProperties};

/// Print the action a post would produce. Nothing is published.
pub async fn cmd_compose(config: Config, file: &str) -> Result<()> {
    let json = if file == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("reading properties from stdin")?;
        buf
    } else {
        std::fs::read_to_string(file).with_context(|| format!("reading {file}"))?
    };
    let properties: PostProperties =
        serde_json::from_str(&json).context("parsing post properties")?;

    let composer = Composer::new(config)?;
    let action = composer.compose(&properties).await?;
    println!("{}", serde_json::to_string_pretty(&action)?);
    Ok(())
}
