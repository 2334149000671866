pub mod aggregation;
pub mod artist;
pub mod error;
pub mod search;
pub mod show;
pub mod venue;

/// Blank image links fall back to the shared placeholder.
pub fn image_link_or_default(image_link: String) -> String {
    if image_link.trim().is_empty() {
        crate::entities::DEFAULT_IMAGE_LINK.to_string()
    } else {
        image_link
    }
}
