//! Record URIs and public post URLs.
//!
//! The backend names posts `at://{account}/{collection}/{rkey}`, for
//! example `at://did:plc:abc/app.bsky.feed.post/xyz`. Publicly they live
//! at `{profile_base}/{account}/post/{rkey}`, where `post` is the last
//! segment of the collection NSID.

use std::fmt;
use std::str::FromStr;

use url::Url;

use crate::error::{Error, Result};

const SCHEME: &str = "at://";

/// A parsed record URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtUri {
    pub authority: String,
    pub collection: String,
    pub rkey: String,
}

impl AtUri {
    /// Last dotted segment of the collection (`app.bsky.feed.post` → `post`).
    pub fn record_type(&self) -> &str {
        self.collection
            .rsplit('.')
            .next()
            .unwrap_or(&self.collection)
    }
}

impl FromStr for AtUri {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let rest = s
            .strip_prefix(SCHEME)
            .ok_or_else(|| Error::invalid_url(s, "missing at:// scheme"))?;
        let mut parts = rest.split('/');
        let (Some(authority), Some(collection), Some(rkey), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(Error::invalid_url(s, "expected at://{account}/{collection}/{rkey}"));
        };
        if authority.is_empty() || collection.is_empty() || rkey.is_empty() {
            return Err(Error::invalid_url(s, "empty URI segment"));
        }
        Ok(Self {
            authority: authority.to_string(),
            collection: collection.to_string(),
            rkey: rkey.to_string(),
        })
    }
}

impl fmt::Display for AtUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{SCHEME}{}/{}/{}", self.authority, self.collection, self.rkey)
    }
}

/// Convert a record URI to its public URL under `profile_base`.
///
/// ```rust
/// use crosspost::uri::uri_to_post_url;
///
/// let url = uri_to_post_url("https://bsky.app/profile", "at://did:plc:abc/app.bsky.feed.post/xyz").unwrap();
/// assert_eq!(url, "https://bsky.app/profile/did:plc:abc/post/xyz");
/// ```
pub fn uri_to_post_url(profile_base: &str, uri: &str) -> Result<String> {
    let uri: AtUri = uri.parse()?;
    Ok(format!(
        "{}/{}/{}/{}",
        profile_base.trim_end_matches('/'),
        uri.authority,
        uri.record_type(),
        uri.rkey
    ))
}

/// Split a public post URL under `profile_base` into `(account, rkey)`.
pub fn parse_post_url(profile_base: &str, url: &str) -> Result<(String, String)> {
    let base = profile_base.trim_end_matches('/');
    let rest = url
        .strip_prefix(base)
        .and_then(|rest| rest.strip_prefix('/'))
        .ok_or_else(|| Error::invalid_url(url, format!("not under {base}")))?;
    let rest = rest.split(['?', '#']).next().unwrap_or(rest);

    let segments: Vec<&str> = rest.trim_end_matches('/').split('/').collect();
    match segments.as_slice() {
        [account, "post", rkey] if !account.is_empty() && !rkey.is_empty() => {
            Ok(((*account).to_string(), (*rkey).to_string()))
        }
        _ => Err(Error::invalid_url(url, "expected {profile}/{account}/post/{rkey}")),
    }
}

/// `true` if `target` lives under `profile_base`: same scheme, host and
/// port, and a path below the base path.
pub fn is_same_origin(target: &str, profile_base: &str) -> bool {
    let (Ok(target), Ok(base)) = (Url::parse(target), Url::parse(profile_base)) else {
        return false;
    };
    if target.scheme() != base.scheme()
        || target.host_str() != base.host_str()
        || target.port_or_known_default() != base.port_or_known_default()
    {
        return false;
    }
    let base_path = base.path().trim_end_matches('/');
    let path = target.path();
    base_path.is_empty()
        || path == base_path
        || path
            .strip_prefix(base_path)
            .is_some_and(|rest| rest.starts_with('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_uri_to_post_url() {
        assert_eq!(
            uri_to_post_url("https://me.example", "at://did:plc:abc/app.bsky.feed.post/xyz")
                .unwrap(),
            "https://me.example/did:plc:abc/post/xyz"
        );
    }

    #[test]
    fn trailing_slash_on_base_is_ignored() {
        assert_eq!(
            uri_to_post_url("https://bsky.app/profile/", "at://did:plc:abc/app.bsky.feed.repost/k")
                .unwrap(),
            "https://bsky.app/profile/did:plc:abc/repost/k"
        );
    }

    #[test]
    fn rejects_malformed_uris() {
        assert!(uri_to_post_url("https://b", "https://not/at/uri").is_err());
        assert!(uri_to_post_url("https://b", "at://did:plc:abc/app.bsky.feed.post").is_err());
        assert!(uri_to_post_url("https://b", "at://did/x/y/z").is_err());
        assert!(uri_to_post_url("https://b", "at:///x/y").is_err());
    }

    #[test]
    fn at_uri_round_trips_through_display() {
        let raw = "at://did:plc:abc/app.bsky.feed.like/3k";
        let uri: AtUri = raw.parse().unwrap();
        assert_eq!(uri.record_type(), "like");
        assert_eq!(uri.to_string(), raw);
    }

    #[test]
    fn parses_post_urls() {
        let (account, rkey) =
            parse_post_url("https://bsky.app/profile", "https://bsky.app/profile/alice.example/post/3kabc?ref=x")
                .unwrap();
        assert_eq!(account, "alice.example");
        assert_eq!(rkey, "3kabc");

        assert!(parse_post_url("https://bsky.app/profile", "https://bsky.app/profile/alice").is_err());
        assert!(parse_post_url("https://bsky.app/profile", "https://other.example/a/post/b").is_err());
        assert!(parse_post_url("https://me.example", "https://me.example/p9").is_err());
    }

    #[test]
    fn same_origin_requires_host_and_path_prefix() {
        assert!(is_same_origin("https://me.example/p9", "https://me.example"));
        assert!(is_same_origin("https://bsky.app/profile/a/post/b", "https://bsky.app/profile"));
        assert!(!is_same_origin("https://bsky.app/profiles/a", "https://bsky.app/profile"));
        assert!(!is_same_origin("https://other.example/post", "https://me.example"));
        assert!(!is_same_origin("http://me.example/p9", "https://me.example"));
        assert!(!is_same_origin("not a url", "https://me.example"));
    }
}
