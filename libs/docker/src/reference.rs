//! Image reference splitting for pulls.

/// Tag pulled when a reference names neither a tag nor a digest.
pub const DEFAULT_TAG: &str = "latest";

/// Split an image reference into repository and tag (or digest).
///
/// A colon followed by a path segment is a registry port, not a tag.
pub fn split_image_ref(image_ref: &str) -> (&str, &str) {
    if let Some((name, digest)) = image_ref.rsplit_once('@') {
        return (name, digest);
    }

    if let Some((name, tag)) = image_ref.rsplit_once(':') {
        if !tag.contains('/') {
            return (name, tag);
        }
    }

    (image_ref, DEFAULT_TAG)
}
