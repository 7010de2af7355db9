pub mod http_fetcher;

use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use encoding_rs::{Encoding, UTF_8};
use regex::bytes::Regex;
use tracing::debug;
use url::Url;

use crate::app::Result;

pub use http_fetcher::HttpFetcher;

static META_CHARSET_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<meta[^>]*?charset\s*=\s*["']?\s*([a-z0-9_:.\-]+)"#)
        .expect("META_CHARSET_RE should compile")
});

/// Bytes scanned for a `<meta charset>` declaration
const META_SNIFF_BYTES: usize = 1024;

#[derive(Debug, Clone)]
pub struct FetchResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    /// URL after any redirects
    pub final_url: Url,
    pub body: Vec<u8>,
}

impl FetchResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Character encoding of the body.
    ///
    /// The `content-type` charset wins, then a `<meta charset>` near the top
    /// of the page, then UTF-8.
    pub fn encoding(&self) -> &'static Encoding {
        self.header("content-type")
            .and_then(header_charset)
            .and_then(|label| Encoding::for_label(label.as_bytes()))
            .or_else(|| meta_charset(&self.body))
            .unwrap_or(UTF_8)
    }

    /// Body decoded with [`encoding`](Self::encoding). A byte-order mark overrides it.
    pub fn text(&self) -> String {
        let (text, used, had_errors) = self.encoding().decode(&self.body);
        if had_errors {
            debug!("{}: malformed {} sequences replaced", self.final_url, used.name());
        }
        text.into_owned()
    }
}

fn header_charset(content_type: &str) -> Option<&str> {
    content_type.split(';').skip(1).find_map(|param| {
        let (key, value) = param.split_once('=')?;
        key.trim()
            .eq_ignore_ascii_case("charset")
            .then(|| value.trim().trim_matches(|c| c == '"' || c == '\''))
    })
}

fn meta_charset(body: &[u8]) -> Option<&'static Encoding> {
    let head = &body[..body.len().min(META_SNIFF_BYTES)];
    let label = META_CHARSET_RE.captures(head)?.get(1)?;
    Encoding::for_label(label.as_bytes())
}

#[async_trait]
pub trait Fetcher {
    async fn fetch(&self, url: &Url, timeout: Duration) -> Result<FetchResponse>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let response = FetchResponse {
            status: 200,
            headers: vec![("Content-Type".into(), "text/html".into())],
            final_url: Url::parse("https://example.com/").unwrap(),
            body: b"<html></html>".to_vec(),
        };
        assert_eq!(response.header("content-type"), Some("text/html"));
        assert_eq!(response.header("etag"), None);
        assert_eq!(response.text(), "<html></html>");
    }

    fn response(content_type: &str, body: &[u8]) -> FetchResponse {
        FetchResponse {
            status: 200,
            headers: vec![("content-type".into(), content_type.into())],
            final_url: Url::parse("https://example.com/").unwrap(),
            body: body.to_vec(),
        }
    }

    // "陈天宇宙" in GBK
    const GBK_BYTES: &[u8] = &[0xB3, 0xC2, 0xCC, 0xEC, 0xD3, 0xEE, 0xD6, 0xE6];

    #[test]
    fn test_header_charset_decodes_gbk() {
        let page = response("text/html; charset=gbk", GBK_BYTES);
        assert_eq!(page.encoding(), encoding_rs::GBK);
        assert_eq!(page.text(), "陈天宇宙");

        let quoted = response("text/html; Charset=\"GBK\"", GBK_BYTES);
        assert_eq!(quoted.text(), "陈天宇宙");
    }

    #[test]
    fn test_meta_charset_used_without_header_charset() {
        let mut body = b"<html><head><meta charset=\"gb2312\"></head><body>".to_vec();
        body.extend_from_slice(GBK_BYTES);
        body.extend_from_slice(b"</body></html>");

        let page = response("text/html", &body);
        assert!(page.text().contains("陈天宇宙"));

        let mut legacy = b"<meta http-equiv=\"Content-Type\" content=\"text/html; charset=GBK\">".to_vec();
        legacy.extend_from_slice(GBK_BYTES);
        assert!(response("text/html", &legacy).text().ends_with("陈天宇宙"));
    }

    #[test]
    fn test_defaults_to_utf8() {
        let page = response("text/html", "<p>陈天宇宙</p>".as_bytes());
        assert_eq!(page.encoding(), UTF_8);
        assert_eq!(page.text(), "<p>陈天宇宙</p>");

        let unknown = response("text/html; charset=no-such-charset", "ok".as_bytes());
        assert_eq!(unknown.encoding(), UTF_8);
    }
}
