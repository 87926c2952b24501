//! Conversion registry and dispatcher
//!
//! A static table mapping a fragment's base mime type to the ordered set of
//! mime types it may be rendered as, plus the dispatcher that performs the
//! byte transform. Policy failures (`ConversionNotAllowed`) are distinct from
//! transform failures (`ConversionFailed`): the former means the table forbids
//! the target, the latter means the target was legal but the bytes would not
//! cooperate (e.g., malformed CSV).

mod raster;
mod text;

use crate::{Error, Result};

/// Allowed targets shared by every raster base type: all five image formats
/// are mutually convertible, including the no-op convert-to-self.
const IMAGE_FORMATS: &[&str] = &[
    "image/png",
    "image/jpeg",
    "image/webp",
    "image/avif",
    "image/gif",
];

/// A fragment's base type, keyed by its mime type with parameters stripped.
///
/// Each variant carries its allowed-target list (itself always included), so
/// conversion legality is a table lookup rather than chained conditionals.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BaseType {
    Plain,
    Markdown,
    Html,
    Csv,
    Json,
    Yaml,
    Png,
    Jpeg,
    Webp,
    Avif,
    Gif,
}

impl BaseType {
    /// Look up a base type by mime type (without parameters).
    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime {
            "text/plain" => Some(BaseType::Plain),
            "text/markdown" => Some(BaseType::Markdown),
            "text/html" => Some(BaseType::Html),
            "text/csv" => Some(BaseType::Csv),
            "application/json" => Some(BaseType::Json),
            "application/yaml" => Some(BaseType::Yaml),
            "image/png" => Some(BaseType::Png),
            "image/jpeg" => Some(BaseType::Jpeg),
            "image/webp" => Some(BaseType::Webp),
            "image/avif" => Some(BaseType::Avif),
            "image/gif" => Some(BaseType::Gif),
            _ => None,
        }
    }

    /// The canonical mime type for this base type.
    pub fn mime(&self) -> &'static str {
        match self {
            BaseType::Plain => "text/plain",
            BaseType::Markdown => "text/markdown",
            BaseType::Html => "text/html",
            BaseType::Csv => "text/csv",
            BaseType::Json => "application/json",
            BaseType::Yaml => "application/yaml",
            BaseType::Png => "image/png",
            BaseType::Jpeg => "image/jpeg",
            BaseType::Webp => "image/webp",
            BaseType::Avif => "image/avif",
            BaseType::Gif => "image/gif",
        }
    }

    /// The ordered list of mime types this base type may be rendered as.
    pub fn formats(&self) -> &'static [&'static str] {
        match self {
            BaseType::Plain => &["text/plain"],
            BaseType::Markdown => &["text/markdown", "text/html", "text/plain"],
            BaseType::Html => &["text/html", "text/plain"],
            BaseType::Csv => &["text/csv", "text/plain", "application/json"],
            BaseType::Json => &["application/json", "application/yaml", "text/plain"],
            BaseType::Yaml => &["application/yaml", "text/plain"],
            BaseType::Png
            | BaseType::Jpeg
            | BaseType::Webp
            | BaseType::Avif
            | BaseType::Gif => IMAGE_FORMATS,
        }
    }

    pub fn is_image(&self) -> bool {
        matches!(
            self,
            BaseType::Png | BaseType::Jpeg | BaseType::Webp | BaseType::Avif | BaseType::Gif
        )
    }
}

/// Allowed target mime types for a base mime type; empty for unknown types.
pub fn formats(mime: &str) -> &'static [&'static str] {
    BaseType::from_mime(mime).map_or(&[], |base| base.formats())
}

/// Resolve a filename extension to its target mime type.
pub fn extension_to_mime(ext: &str) -> Option<&'static str> {
    match ext {
        "txt" => Some("text/plain"),
        "md" => Some("text/markdown"),
        "html" => Some("text/html"),
        "csv" => Some("text/csv"),
        "json" => Some("application/json"),
        "yaml" | "yml" => Some("application/yaml"),
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "webp" => Some("image/webp"),
        "avif" => Some("image/avif"),
        "gif" => Some("image/gif"),
        _ => None,
    }
}

/// Convert `data` from the `base` mime type to the `target` mime type.
///
/// Legality is checked against the registry table first; only then does the
/// dispatcher run a transform. Same-type conversion returns the bytes
/// unchanged.
pub fn convert(base: &str, data: &[u8], target: &str) -> Result<Vec<u8>> {
    let not_allowed = || Error::ConversionNotAllowed {
        from: base.to_string(),
        to: target.to_string(),
    };

    let base_type = BaseType::from_mime(base).ok_or_else(not_allowed)?;
    if !base_type.formats().contains(&target) {
        return Err(not_allowed());
    }

    if base_type.mime() == target {
        return Ok(data.to_vec());
    }

    match (base_type, target) {
        (BaseType::Markdown, "text/html") => text::markdown_to_html(data),
        (BaseType::Html, "text/plain") => text::html_to_plain(data),
        (BaseType::Csv, "application/json") => text::csv_to_json(data),
        (BaseType::Json, "application/yaml") => text::json_to_yaml(data),
        // Remaining text-family targets are a UTF-8 pass-through
        (_, "text/plain") if !base_type.is_image() => text::to_utf8_text(data),
        (base_type, target) if base_type.is_image() => raster::transcode(data, target),
        // Unreachable while the arms above cover every table entry
        _ => Err(not_allowed()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_formats_is_reflexive_for_every_entry() {
        for mime in [
            "text/plain",
            "text/markdown",
            "text/html",
            "text/csv",
            "application/json",
            "application/yaml",
            "image/png",
            "image/jpeg",
            "image/webp",
            "image/avif",
            "image/gif",
        ] {
            assert!(
                formats(mime).contains(&mime),
                "{mime} should list itself as a target"
            );
        }
    }

    #[test]
    fn test_formats_unknown_is_empty() {
        assert!(formats("application/msword").is_empty());
        assert!(formats("").is_empty());
    }

    #[test]
    fn test_extension_mapping() {
        assert_eq!(extension_to_mime("txt"), Some("text/plain"));
        assert_eq!(extension_to_mime("md"), Some("text/markdown"));
        assert_eq!(extension_to_mime("jpg"), Some("image/jpeg"));
        assert_eq!(extension_to_mime("jpeg"), Some("image/jpeg"));
        assert_eq!(extension_to_mime("yml"), Some("application/yaml"));
        assert_eq!(extension_to_mime("yaml"), Some("application/yaml"));
        assert_eq!(extension_to_mime("exe"), None);
    }

    #[test]
    fn test_identity_conversion_is_byte_exact() {
        let data = b"## Hey\n\nHi **you**";
        let out = convert("text/markdown", data, "text/markdown").unwrap();
        assert_eq!(out, data);
    }

    #[test]
    fn test_disallowed_conversion() {
        let err = convert("text/plain", b"hihihi", "text/html").unwrap_err();
        assert!(matches!(err, Error::ConversionNotAllowed { .. }));
        assert_eq!(err.status(), 415);
    }

    #[test]
    fn test_unknown_base_is_disallowed() {
        let err = convert("application/msword", b"x", "text/plain").unwrap_err();
        assert!(matches!(err, Error::ConversionNotAllowed { .. }));
    }

    #[test]
    fn test_text_to_image_is_disallowed() {
        let err = convert("text/markdown", b"# hi", "image/png").unwrap_err();
        assert!(matches!(err, Error::ConversionNotAllowed { .. }));
    }

    #[test]
    fn test_markdown_to_plain_passes_through() {
        let out = convert("text/markdown", b"## Hey", "text/plain").unwrap();
        assert_eq!(out, b"## Hey");
    }

    #[test]
    fn test_allowed_but_malformed_is_conversion_failed() {
        // Legal target, but the payload is not valid UTF-8 text
        let err = convert("text/markdown", &[0xff, 0xfe], "text/html").unwrap_err();
        assert!(matches!(err, Error::ConversionFailed { .. }));
    }
}
