//! Process-wide response policy.
//!
//! Three fixed tables drive the writer: the surrogate-cache directive per
//! status, the MIME types worth compressing, and the canned HTML error pages.
//! They are built once on first access and only ever read afterwards, so any
//! number of concurrent requests may consult them.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

/// Directive for successes and transient errors.
pub const SHORT: &str = "max-age=10";
/// Directive for errors a retry will not fix.
pub const LONG: &str = "max-age=86400";

/// Bodies at or below this length are never compressed.
pub const MIN_COMPRESS_LEN: usize = 20;

pub const TEXT_CONTENT: &str = "text/plain; charset=utf-8";
pub const HTML_CONTENT: &str = "text/html; charset=utf-8";

/// Builds a complete static HTML document at compile time.
macro_rules! page {
    ($title:literal, $text:literal) => {
        concat!(
            "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n<title>",
            $title,
            "</title>\n</head>\n<body>\n<h1>",
            $title,
            "</h1>\n<p>",
            $text,
            "</p>\n</body>\n</html>\n"
        )
    };
}

static COMPRESSIBLE: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    HashSet::from([
        "text/html",
        "application/x-javascript",
        "text/css",
        "application/javascript",
        "text/javascript",
        "text/plain",
        "text/xml",
        "application/json",
        "application/vnd.ms-fontobject",
        "application/x-font-opentype",
        "application/x-font-truetype",
        "application/x-font-ttf",
        "application/xml",
        "font/eot",
        "font/opentype",
        "font/otf",
        "image/svg+xml",
        "image/vnd.microsoft.icon",
        // domain types
        "application/vnd.geo+json",
        "application/cap+xml",
        "text/csv",
    ])
});

static ERROR_PAGES: LazyLock<HashMap<u16, &'static str>> = LazyLock::new(|| {
    HashMap::from([
        (400, page!("400 - Bad Request", "The request could not be understood. Please check the URL and query parameters.")),
        (404, page!("404 - Not Found", "The page you requested could not be found.")),
        (405, page!("405 - Method Not Allowed", "That method is not supported for this resource.")),
        (500, page!("500 - Internal Server Error", "Something went wrong on our side. Please try again later.")),
        (503, page!("503 - Service Unavailable", "The service is temporarily unavailable. Please try again later.")),
    ])
});

/// Surrogate-Control directive for a non-200 status. Unknown codes get
/// [`SHORT`].
pub fn surrogate_control(code: u16) -> &'static str {
    match code {
        400 | 405       => LONG,
        404 | 500 | 503 => SHORT,
        _               => SHORT,
    }
}

/// Whether `content_type` (parameters such as `; charset=` are ignored) is
/// on the compression allow-list.
pub fn is_compressible(content_type: &str) -> bool {
    let mime = content_type.split(';').next().unwrap_or("").trim();
    COMPRESSIBLE.contains(mime)
}

/// Canned error page for `code`, falling back to the 500 page.
pub fn error_page(code: u16) -> &'static str {
    ERROR_PAGES
        .get(&code)
        .or_else(|| ERROR_PAGES.get(&500))
        .copied()
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn directives() {
        assert_eq!(surrogate_control(400), LONG);
        assert_eq!(surrogate_control(405), LONG);
        assert_eq!(surrogate_control(404), SHORT);
        assert_eq!(surrogate_control(500), SHORT);
        assert_eq!(surrogate_control(503), SHORT);
        assert_eq!(surrogate_control(999), SHORT);
    }

    #[test]
    fn compressible_ignores_parameters() {
        assert!(is_compressible("text/csv"));
        assert!(is_compressible("text/plain; charset=utf-8"));
        assert!(is_compressible(" application/vnd.geo+json ;q=1"));
        assert!(!is_compressible("image/png"));
        assert!(!is_compressible(""));
    }

    #[test]
    fn pages_fall_back_to_internal_error() {
        assert!(error_page(404).contains("404 - Not Found"));
        assert!(error_page(405).contains("405 - Method Not Allowed"));
        assert_eq!(error_page(999), error_page(500));
        assert!(error_page(418).contains("500 - Internal Server Error"));
    }

    proptest! {
        #[test]
        fn unmapped_codes_are_short(code in 100u16..1000) {
            prop_assume!(code != 400 && code != 405);
            prop_assert_eq!(surrogate_control(code), SHORT);
        }
    }
}
