pub mod artist;
pub mod artist_venue;
pub mod genres;
pub mod show;
pub mod venue;

/// Stored when a form leaves the image link blank.
pub const DEFAULT_IMAGE_LINK: &str = "/static/default.jpg";
