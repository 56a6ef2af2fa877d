//! Content-type sniffing for responses whose handler set none.
//!
//! Looks at no more than the first 512 bytes, in the order of the WHATWG
//! MIME sniffing algorithm: HTML-ish markup, byte-order marks, well-known
//! binary signatures, then plain text versus octet stream.

const SNIFF_LEN: usize = 512;

/// HTML tags recognised after leading whitespace. Matched case-insensitively
/// and must be followed by a space or `>`.
const HTML_TAGS: &[&[u8]] = &[
    b"<!DOCTYPE HTML",
    b"<HTML",
    b"<HEAD",
    b"<SCRIPT",
    b"<IFRAME",
    b"<H1",
    b"<DIV",
    b"<FONT",
    b"<TABLE",
    b"<A",
    b"<STYLE",
    b"<TITLE",
    b"<B",
    b"<BODY",
    b"<BR",
    b"<P",
    b"<!--",
];

const SIGNATURES: &[(&[u8], &str)] = &[
    (b"%PDF-", "application/pdf"),
    (b"%!PS-Adobe-", "application/postscript"),
    (b"\xFE\xFF", "text/plain; charset=utf-16be"),
    (b"\xFF\xFE", "text/plain; charset=utf-16le"),
    (b"\xEF\xBB\xBF", "text/plain; charset=utf-8"),
    (b"GIF87a", "image/gif"),
    (b"GIF89a", "image/gif"),
    (b"\x89PNG\x0D\x0A\x1A\x0A", "image/png"),
    (b"\xFF\xD8\xFF", "image/jpeg"),
    (b"BM", "image/bmp"),
    (b"\x00\x00\x01\x00", "image/x-icon"),
    (b"OggS\x00", "application/ogg"),
    (b"\x1F\x8B\x08", "application/x-gzip"),
    (b"PK\x03\x04", "application/zip"),
    (b"Rar!\x1A\x07\x00", "application/x-rar-compressed"),
    (b"\x00asm", "application/wasm"),
];

/// Best guess at the content type of `body`.
pub fn content_type(body: &[u8]) -> &'static str {
    let data = &body[..body.len().min(SNIFF_LEN)];

    let start = data.iter().position(|b| !is_ws(*b)).unwrap_or(data.len());
    let trimmed = &data[start..];

    if HTML_TAGS.iter().any(|tag| html_tag(trimmed, tag)) {
        return "text/html; charset=utf-8";
    }
    if trimmed.starts_with(b"<?xml") {
        return "text/xml; charset=utf-8";
    }

    if let Some((_, mime)) = SIGNATURES.iter().find(|(sig, _)| data.starts_with(sig)) {
        return *mime;
    }

    if data.iter().any(|b| is_binary(*b)) {
        "application/octet-stream"
    } else {
        "text/plain; charset=utf-8"
    }
}

fn html_tag(data: &[u8], tag: &[u8]) -> bool {
    if data.len() <= tag.len() || !data[..tag.len()].eq_ignore_ascii_case(tag) {
        return false;
    }
    matches!(data[tag.len()], b' ' | b'>')
}

fn is_ws(b: u8) -> bool {
    matches!(b, b'\t' | b'\n' | b'\x0C' | b'\r' | b' ')
}

fn is_binary(b: u8) -> bool {
    matches!(b, 0x00..=0x08 | 0x0B | 0x0E..=0x1A | 0x1C..=0x1F)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_is_text() {
        assert_eq!(content_type(b""), "text/plain; charset=utf-8");
    }

    #[test]
    fn markup() {
        assert_eq!(content_type(b"  <html><body>"), "text/html; charset=utf-8");
        assert_eq!(content_type(b"<!doctype html>"), "text/html; charset=utf-8");
        assert_eq!(content_type(b"<?xml version=\"1.0\"?>"), "text/xml; charset=utf-8");
        // A tag prefix alone is not enough.
        assert_eq!(content_type(b"<Bogus"), "text/plain; charset=utf-8");
    }

    #[test]
    fn binary_signatures() {
        assert_eq!(content_type(b"\x89PNG\x0D\x0A\x1A\x0A...."), "image/png");
        assert_eq!(content_type(b"%PDF-1.7"), "application/pdf");
        assert_eq!(content_type(b"\x01\x02\x03"), "application/octet-stream");
    }

    #[test]
    fn json_is_plain_text() {
        assert_eq!(content_type(br#"{"id":1}"#), "text/plain; charset=utf-8");
    }
}
