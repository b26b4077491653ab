use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    JPEG,
    PNG,
    WebP,
}

/// Source formats whose extension is rewritten on output.
const REWRITTEN_SOURCES: [ImageFormat; 2] = [ImageFormat::JPEG, ImageFormat::PNG];

impl ImageFormat {
    /// Get file extensions associated with this format
    pub fn extensions(&self) -> &[&str] {
        match self {
            Self::JPEG => &["jpg", "jpeg"],
            Self::PNG => &["png"],
            Self::WebP => &["webp"],
        }
    }

    /// Check if the extension matches this format
    pub fn matches_extension(&self, ext: &str) -> bool {
        let ext = ext.to_lowercase();
        self.extensions().contains(&ext.as_str())
    }

    /// Get the primary extension for this format
    pub fn primary_extension(&self) -> &str {
        self.extensions()[0]
    }
}

/// Rewrites a trailing `.jpg`, `.jpeg` or `.png` (any case) to the
/// extension of `target`.
///
/// Any other name is returned unchanged, including names that already end in
/// the target extension and names with no extension at all.
pub fn rewrite_extension(file_name: &str, target: ImageFormat) -> String {
    if let Some((stem, ext)) = file_name.rsplit_once('.') {
        if REWRITTEN_SOURCES.iter().any(|f| f.matches_extension(ext)) {
            return format!("{stem}.{}", target.primary_extension());
        }
    }
    file_name.to_string()
}
