//! Utility functions for output naming and URL handling

use crate::types::Record;

/// Derive the deterministic output name for a record's photo
///
/// The name is `{id}-{address}{extension}`, where the extension (including
/// its dot) comes from the photo URL's path, or nothing if the URL carries
/// no extension. Path separators and NUL bytes in the address are replaced
/// with `_` so the name stays a single path component; the replacement is
/// deterministic, so journal keys remain stable across runs.
///
/// # Examples
///
/// ```
/// use listing_dl::types::Record;
/// use listing_dl::utils::output_name;
///
/// let record = Record {
///     id: 42,
///     address: "12 Main St".to_string(),
///     owner_name: String::new(),
///     price: 0,
///     photo_url: "http://img.example.com/photos/42.jpg?size=large".to_string(),
/// };
/// assert_eq!(output_name(&record), "42-12 Main St.jpg");
/// ```
#[must_use]
pub fn output_name(record: &Record) -> String {
    let address = sanitize_component(&record.address);
    let extension = url_extension(&record.photo_url);
    format!("{}-{}{}", record.id, address, extension)
}

/// Extract the file extension (including the leading dot) from a URL's path
///
/// Query strings and fragments are ignored. Returns an empty string when the
/// URL does not parse or its last path segment has no extension.
///
/// # Examples
///
/// ```
/// use listing_dl::utils::url_extension;
///
/// assert_eq!(url_extension("http://x.example/a/photo.png"), ".png");
/// assert_eq!(url_extension("http://x.example/a/photo.png?w=640"), ".png");
/// assert_eq!(url_extension("http://x.example/a/photo"), "");
/// ```
#[must_use]
pub fn url_extension(raw_url: &str) -> String {
    let Ok(parsed) = url::Url::parse(raw_url) else {
        return String::new();
    };

    let Some(last_segment) = parsed
        .path_segments()
        .and_then(|mut segments| segments.next_back())
    else {
        return String::new();
    };

    match std::path::Path::new(last_segment)
        .extension()
        .and_then(|e| e.to_str())
    {
        Some(ext) if !ext.is_empty() => format!(".{ext}"),
        _ => String::new(),
    }
}

/// Replace characters that would split a filename into multiple path components
fn sanitize_component(raw: &str) -> String {
    raw.replace(['/', '\\', '\0'], "_")
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: i64, address: &str, photo_url: &str) -> Record {
        Record {
            id,
            address: address.to_string(),
            owner_name: String::new(),
            price: 0,
            photo_url: photo_url.to_string(),
        }
    }

    #[test]
    fn output_name_combines_id_address_and_extension() {
        let r = record(7, "9 Elm Ave", "http://img.example.com/p/7.jpeg");
        assert_eq!(output_name(&r), "7-9 Elm Ave.jpeg");
    }

    #[test]
    fn output_name_without_extension_has_no_dot() {
        let r = record(7, "9 Elm Ave", "http://img.example.com/p/7");
        assert_eq!(output_name(&r), "7-9 Elm Ave");
    }

    #[test]
    fn output_name_sanitizes_path_separators() {
        let r = record(3, "Unit 4/12 High St", "http://img.example.com/3.png");
        assert_eq!(output_name(&r), "3-Unit 4_12 High St.png");
    }

    #[test]
    fn output_name_is_deterministic() {
        let r = record(11, "1\\2", "http://img.example.com/11.gif");
        assert_eq!(output_name(&r), output_name(&r));
    }

    #[test]
    fn url_extension_ignores_query_string() {
        assert_eq!(
            url_extension("http://img.example.com/a.webp?width=640&h=480"),
            ".webp"
        );
    }

    #[test]
    fn url_extension_on_unparseable_url_is_empty() {
        assert_eq!(url_extension("not a url"), "");
        assert_eq!(url_extension(""), "");
    }

    #[test]
    fn url_extension_on_bare_host_is_empty() {
        assert_eq!(url_extension("http://img.example.com"), "");
    }

    #[test]
    fn url_extension_on_dotted_directory_uses_last_segment_only() {
        assert_eq!(url_extension("http://x.example/v1.2/photo.jpg"), ".jpg");
        assert_eq!(url_extension("http://x.example/v1.2/photo"), "");
    }
}
