use anyhow::Result;

use crosspost::uri_to_post_url;

pub fn cmd_post_url(profile: &str, uri: &str) -> Result<()> {
    println!("{}", uri_to_post_url(profile, uri)?);
    Ok(())
}
