pub mod compose;
pub mod compress;
pub mod metadata;
pub mod post_url;
pub mod thumbnail;
