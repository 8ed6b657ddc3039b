/*!
 * Upload Validation Helpers
 *
 * Decide whether an uploaded file may enter the identity pipeline, based on
 * its filename. Checked before any image decoding or OCR takes place.
 */

/// Extensions accepted by `POST /upload`
pub const ALLOWED_IMAGE_EXTENSIONS: [&str; 3] = [".jpg", ".jpeg", ".png"];

pub const INVALID_FORMAT_MESSAGE: &str = "Invalid file format. Should be .jpeg, .jpg or .png";

/// Determine if a filename carries one of the accepted image extensions
pub fn is_allowed_image(filename: &str) -> bool {
    let extension = extract_extension(filename);
    ALLOWED_IMAGE_EXTENSIONS.contains(&extension.as_str())
}

/// Extract file extension from filename (lowercased, including the dot)
pub fn extract_extension(filename: &str) -> String {
    // Only look at the final path component so "dir.png/scan" has no extension
    let name = filename.rsplit(['/', '\\']).next().unwrap_or(filename);
    if let Some(pos) = name.rfind('.') {
        name[pos..].to_lowercase()
    } else {
        String::new()
    }
}
