use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Node};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::app::{FolioError, Result};
use crate::extractor::ExtractedRegion;

static BLANK_RUN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n[^\S\n]*\n(?:[^\S\n]*\n)+").expect("BLANK_RUN_RE should compile"));
static STAR_RULE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*{10,}").expect("STAR_RULE_RE should compile"));
static DASH_RULE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"-{10,}").expect("DASH_RULE_RE should compile"));
static EQUALS_RULE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"={10,}").expect("EQUALS_RULE_RE should compile"));

const BLOCK_TAGS: &[&str] = &[
    "p", "div", "section", "article", "main", "header", "footer", "figure", "figcaption", "table",
    "thead", "tbody", "tfoot", "dl", "dt", "dd", "address", "details", "summary", "center",
    "fieldset",
];

/// Configuration for the markdown normalizer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizerConfig {
    /// Minimum trimmed body length in characters (default: 100)
    pub min_body_chars: usize,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self { min_body_chars: 100 }
    }
}

#[derive(Debug, Clone)]
pub struct Normalizer {
    min_body_chars: usize,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(NormalizerConfig::default())
    }
}

impl Normalizer {
    pub fn new(config: NormalizerConfig) -> Self {
        Self {
            min_body_chars: config.min_body_chars,
        }
    }

    pub fn min_body_chars(&self) -> usize {
        self.min_body_chars
    }

    /// Render a region to markdown, clean it, and apply the length gate.
    pub fn normalize(&self, region: &ExtractedRegion<'_>, base: Option<&Url>) -> Result<String> {
        let markdown = self.to_markdown(region.element, base);
        self.validate(&markdown)?;
        Ok(markdown)
    }

    /// Render an element subtree to cleaned markdown without validation.
    pub fn to_markdown(&self, element: ElementRef<'_>, base: Option<&Url>) -> String {
        let mut out = String::new();
        Renderer { base }.render_children(element, &mut out);
        clean(&out)
    }

    pub fn validate(&self, body: &str) -> Result<()> {
        let chars = body.trim().chars().count();
        if chars < self.min_body_chars {
            return Err(FolioError::Validation {
                chars,
                minimum: self.min_body_chars,
            });
        }
        Ok(())
    }
}

/// Cleanup passes applied to rendered flow text.
///
/// Blank-line runs collapse to one blank line, every line is trimmed, then
/// runs of ten or more `*`, `-` or `=` shrink to three. Idempotent.
pub fn clean(text: &str) -> String {
    let text = text.replace("\r\n", "\n").replace('\r', "\n");
    let text = BLANK_RUN_RE.replace_all(&text, "\n\n");

    let text = text.lines().map(str::trim).collect::<Vec<_>>().join("\n");

    let text = STAR_RULE_RE.replace_all(&text, "***");
    let text = DASH_RULE_RE.replace_all(&text, "---");
    let text = EQUALS_RULE_RE.replace_all(&text, "===");

    text.trim().to_string()
}

struct Renderer<'u> {
    base: Option<&'u Url>,
}

impl Renderer<'_> {
    fn render_children(&self, element: ElementRef<'_>, out: &mut String) {
        for child in element.children() {
            match child.value() {
                Node::Text(text) => push_inline_text(out, text),
                Node::Element(_) => {
                    if let Some(child) = ElementRef::wrap(child) {
                        self.render_element(child, out);
                    }
                }
                _ => {}
            }
        }
    }

    fn render_inner(&self, element: ElementRef<'_>) -> String {
        let mut inner = String::new();
        self.render_children(element, &mut inner);
        inner
    }

    fn render_element(&self, element: ElementRef<'_>, out: &mut String) {
        let name = element.value().name();

        match name {
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                let level = name[1..].parse::<usize>().unwrap_or(1);
                let text = single_line(&self.render_inner(element));
                if !text.is_empty() {
                    out.push_str(&format!("\n\n{} {}\n\n", "#".repeat(level), text));
                }
            }
            "br" => out.push('\n'),
            "hr" => out.push_str("\n\n---\n\n"),
            "ul" | "ol" => self.render_list(element, name == "ol", out),
            "blockquote" => {
                let inner = clean(&self.render_inner(element));
                if !inner.is_empty() {
                    let quoted = inner
                        .lines()
                        .map(|line| if line.is_empty() { ">".to_string() } else { format!("> {}", line) })
                        .collect::<Vec<_>>()
                        .join("\n");
                    out.push_str(&format!("\n\n{}\n\n", quoted));
                }
            }
            "pre" => {
                let code = element.text().collect::<String>();
                let code = code.trim_matches('\n');
                if !code.trim().is_empty() {
                    out.push_str(&format!("\n\n```\n{}\n```\n\n", code));
                }
            }
            "code" => {
                let code = element.text().collect::<String>();
                if !code.trim().is_empty() {
                    out.push_str(&format!("`{}`", code.trim()));
                }
            }
            "strong" | "b" => push_wrapped(out, &self.render_inner(element), "**"),
            "em" | "i" => push_wrapped(out, &self.render_inner(element), "*"),
            "a" => self.render_link(element, out),
            "img" => self.render_image(element, out),
            "tr" => {
                out.push('\n');
                self.render_children(element, out);
                out.push('\n');
            }
            "td" | "th" => {
                self.render_children(element, out);
                out.push(' ');
            }
            _ if BLOCK_TAGS.contains(&name) => {
                out.push_str("\n\n");
                self.render_children(element, out);
                out.push_str("\n\n");
            }
            _ => self.render_children(element, out),
        }
    }

    fn render_list(&self, list: ElementRef<'_>, ordered: bool, out: &mut String) {
        out.push_str("\n\n");
        let mut number = 0;

        for child in list.children().filter_map(ElementRef::wrap) {
            if child.value().name() != "li" {
                self.render_element(child, out);
                continue;
            }

            number += 1;
            let item = self
                .render_inner(child)
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .collect::<Vec<_>>()
                .join("\n  ");

            if item.is_empty() {
                continue;
            }

            if ordered {
                out.push_str(&format!("{}. {}\n", number, item));
            } else {
                out.push_str(&format!("- {}\n", item));
            }
        }

        out.push('\n');
    }

    fn render_link(&self, anchor: ElementRef<'_>, out: &mut String) {
        let text = single_line(&self.render_inner(anchor));
        let href = anchor
            .value()
            .attr("href")
            .map(str::trim)
            .filter(|href| !href.is_empty() && !href.to_ascii_lowercase().starts_with("javascript:"));

        match href {
            Some(href) if !text.is_empty() => {
                out.push_str(&format!("[{}]({})", text, self.resolve(href)));
            }
            _ => out.push_str(&text),
        }
    }

    fn render_image(&self, image: ElementRef<'_>, out: &mut String) {
        let element = image.value();
        let src = element
            .attr("src")
            .or_else(|| element.attr("data-src"))
            .map(str::trim)
            .filter(|src| !src.is_empty());

        if let Some(src) = src {
            let alt = single_line(element.attr("alt").unwrap_or(""));
            out.push_str(&format!("![{}]({})", alt, self.resolve(src)));
        }
    }

    fn resolve(&self, href: &str) -> String {
        self.base
            .and_then(|base| base.join(href).ok())
            .map(|url| url.to_string())
            .unwrap_or_else(|| href.to_string())
    }
}

fn single_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn push_wrapped(out: &mut String, inner: &str, marker: &str) {
    let text = single_line(inner);
    if !text.is_empty() {
        out.push_str(marker);
        out.push_str(&text);
        out.push_str(marker);
    }
}

/// Append a text node with whitespace runs collapsed, keeping edge spacing.
fn push_inline_text(out: &mut String, text: &str) {
    let words = text.split_whitespace().collect::<Vec<_>>();
    let needs_gap = !out.is_empty() && !out.ends_with(char::is_whitespace);

    if words.is_empty() {
        if !text.is_empty() && needs_gap {
            out.push(' ');
        }
        return;
    }

    if text.starts_with(char::is_whitespace) && needs_gap {
        out.push(' ');
    }
    out.push_str(&words.join(" "));
    if text.ends_with(char::is_whitespace) {
        out.push(' ');
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::{ContentExtractor, ExtractorConfig};
    use scraper::Html;

    fn render(html: &str) -> String {
        let page = Html::parse_document(html);
        let body = page.root_element();
        let base = Url::parse("https://example.com/posts/one").unwrap();
        Normalizer::default().to_markdown(body, Some(&base))
    }

    #[test]
    fn test_headings_paragraphs_and_links() {
        let markdown = render(
            r#"<body><h2>Section  Title</h2><p>Read the <a href="/docs">docs page</a> now.</p><p>Second <strong>bold</strong> paragraph.</p></body>"#,
        );
        assert_eq!(
            markdown,
            "## Section Title\n\nRead the [docs page](https://example.com/docs) now.\n\nSecond **bold** paragraph."
        );
    }

    #[test]
    fn test_images_and_lists() {
        let markdown = render(
            r#"<body><img src="img/a.png" alt="A chart"><ul><li>one</li><li>two</li></ul><ol><li>first</li><li>second</li></ol></body>"#,
        );
        assert!(markdown.contains("![A chart](https://example.com/posts/img/a.png)"));
        assert!(markdown.contains("- one\n- two"));
        assert!(markdown.contains("1. first\n2. second"));
    }

    #[test]
    fn test_blockquote_and_code() {
        let markdown = render(
            "<body><blockquote><p>Quoted line</p></blockquote><pre>let x = 1;\nlet y = 2;</pre><p>Use <code>cargo</code></p></body>",
        );
        assert!(markdown.contains("> Quoted line"));
        assert!(markdown.contains("```\nlet x = 1;\nlet y = 2;\n```"));
        assert!(markdown.contains("Use `cargo`"));
    }

    #[test]
    fn test_comments_are_dropped() {
        let markdown = render("<body><p>Visible<!-- hidden note --></p></body>");
        assert_eq!(markdown, "Visible");
    }

    #[test]
    fn test_blank_line_collapse() {
        assert_eq!(clean("a\n\n\n\nb"), "a\n\nb");
        assert_eq!(clean("a\n  \n\t\n \nb"), "a\n\nb");
        assert_eq!(clean("a\n\nb"), "a\n\nb");
    }

    #[test]
    fn test_lines_are_trimmed() {
        assert_eq!(clean("  first  \n\tsecond\t"), "first\nsecond");
    }

    #[test]
    fn test_rule_characters_collapse() {
        assert_eq!(clean("**********"), "***");
        assert_eq!(clean("before\n--------------------\nafter"), "before\n---\nafter");
        assert_eq!(clean("============"), "===");
        assert_eq!(clean("---------"), "---------");
    }

    #[test]
    fn test_clean_is_idempotent() {
        let inputs = [
            "",
            "plain",
            "\n\n\n  lead  \n\n\n\ntrail \n\n",
            "a\r\n\r\n\r\nb",
            "*********-*********************\n\n\n=========== x ----------",
            "  # Title  \n\n\n\n  body\t\n   \n  \n\nend",
            "***\n\n\n***",
        ];
        for input in inputs {
            let once = clean(input);
            assert_eq!(clean(&once), once, "input: {:?}", input);
        }
    }

    #[test]
    fn test_validity_gate_rejects_short_body() {
        let normalizer = Normalizer::default();
        let body = "x".repeat(80);
        let err = normalizer.validate(&format!("  {body}  ")).unwrap_err();
        assert!(matches!(err, FolioError::Validation { chars: 80, minimum: 100 }));
        assert!(normalizer.validate(&"x".repeat(100)).is_ok());
    }

    #[test]
    fn test_normalize_extracted_region() {
        let text = "Long enough paragraph text. ".repeat(5);
        let html = format!(
            "<html><body><nav>Menu</nav><article><h1>Title</h1><p>{text}</p></article></body></html>"
        );
        let mut page = Html::parse_document(&html);
        let extractor = ContentExtractor::new(ExtractorConfig::default()).unwrap();
        let region = extractor.extract(&mut page).unwrap();

        let body = Normalizer::default().normalize(&region, None).unwrap();
        assert!(body.starts_with("# Title\n\nLong enough paragraph text."));
        assert!(!body.contains("Menu"));
    }

    #[test]
    fn test_normalize_rejects_short_region() {
        let html = format!("<html><body><article><p>{}</p></article></body></html>", "y".repeat(80));
        let mut page = Html::parse_document(&html);
        let extractor = ContentExtractor::new(ExtractorConfig::default()).unwrap();
        let region = extractor.extract(&mut page).unwrap();

        let err = Normalizer::default().normalize(&region, None).unwrap_err();
        assert!(matches!(err, FolioError::Validation { chars: 80, .. }));
    }
}
