//! URL validation and thumbnail resizing
//!
//! Every URL leaving the crate goes through [`normalize_url`]: only absolute
//! `http`/`https` URLs survive, everything else becomes `None`.

use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

/// `=w120-h120` style size token used by the image CDN
static WIDTH_HEIGHT_TOKEN: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"=w\d+-h\d+").ok());

/// `/s120-c` style size token embedded in the path
static PATH_SIZE_TOKEN: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"/s\d+-c").ok());

fn has_http_scheme(s: &str) -> bool {
    let lower = s.get(..8).unwrap_or(s).to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Canonical form of an absolute http(s) URL, `None` for anything else
pub fn normalize_url(input: &str) -> Option<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() || !has_http_scheme(trimmed) {
        return None;
    }
    Url::parse(trimmed).ok().map(|url| url.to_string())
}

/// Same as [`normalize_url`] for optional values
pub fn normalize_opt(input: Option<&str>) -> Option<String> {
    input.and_then(normalize_url)
}

/// Cheap scheme check, no parsing
pub fn is_absolute_http_url(input: &str) -> bool {
    has_http_scheme(input.trim())
}

/// Rewrite the CDN size tokens of a thumbnail URL to a `size`x`size` square
///
/// URLs without a known token are only normalized.
pub fn make_square_thumb(url: &str, size: u32) -> Option<String> {
    let normalized = normalize_url(url)?;

    let mut resized = normalized;
    if let Some(re) = WIDTH_HEIGHT_TOKEN.as_ref() {
        resized = re
            .replace_all(&resized, format!("=w{size}-h{size}").as_str())
            .into_owned();
    }
    if let Some(re) = PATH_SIZE_TOKEN.as_ref() {
        resized = re
            .replace_all(&resized, format!("/s{size}-c").as_str())
            .into_owned();
    }

    normalize_url(&resized)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_url() {
        assert_eq!(normalize_url("not a url"), None);
        assert_eq!(normalize_url(""), None);
        assert_eq!(normalize_url("   "), None);
        assert_eq!(normalize_url("/relative/path.jpg"), None);
        assert_eq!(normalize_url("ftp://example.com/x"), None);
        assert_eq!(
            normalize_url("https://example.com/x").as_deref(),
            Some("https://example.com/x")
        );
        assert_eq!(
            normalize_url("  HTTPS://Example.COM  ").as_deref(),
            Some("https://example.com/")
        );
    }

    #[test]
    fn test_is_absolute_http_url() {
        assert!(is_absolute_http_url("http://a"));
        assert!(is_absolute_http_url(" HTTPS://a"));
        assert!(!is_absolute_http_url("//cdn.example.com/a.jpg"));
        assert!(!is_absolute_http_url(""));
    }

    #[test]
    fn test_make_square_thumb_width_height() {
        let url = "https://lh3.googleusercontent.com/abc=w60-h60-l90-rj";
        assert_eq!(
            make_square_thumb(url, 512).as_deref(),
            Some("https://lh3.googleusercontent.com/abc=w512-h512-l90-rj")
        );
    }

    #[test]
    fn test_make_square_thumb_path_token() {
        let url = "https://yt3.ggpht.com/abc/s88-c-k-c0x00ffffff-no-rj";
        assert_eq!(
            make_square_thumb(url, 512).as_deref(),
            Some("https://yt3.ggpht.com/abc/s512-c-k-c0x00ffffff-no-rj")
        );
    }

    #[test]
    fn test_make_square_thumb_idempotent() {
        let url = "https://lh3.googleusercontent.com/abc=w120-h90-l90-rj";
        let once = make_square_thumb(url, 512).unwrap();
        let twice = make_square_thumb(&once, 512).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_make_square_thumb_unknown_pattern() {
        assert_eq!(
            make_square_thumb("https://i.ytimg.com/vi/xyz/hqdefault.jpg", 512).as_deref(),
            Some("https://i.ytimg.com/vi/xyz/hqdefault.jpg")
        );
        assert_eq!(make_square_thumb("garbage", 512), None);
    }
}
