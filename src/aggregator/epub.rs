//! EPUB 3 packaging for an [`Anthology`].
//!
//! Document bodies are flow text. They are escaped for XHTML first and only
//! then split into blocks and given heading, paragraph and bold markup, so
//! markup in a body can never reach the output as live tags.

use std::io::{Cursor, Write};
use std::sync::LazyLock;

use chrono::Utc;
use html_escape::{encode_double_quoted_attribute, encode_text};
use regex::Regex;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::app::Result;
use crate::domain::{Anthology, Document};

static BLOCK_SPLIT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n(?:[^\S\n]*\n)+").expect("BLOCK_SPLIT_RE should compile"));
static BOLD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*([^*\n]+?)\*\*").expect("BOLD_RE should compile"));

pub const MIMETYPE: &str = "application/epub+zip";
pub const INTRO_TITLE: &str = "Introduction";

const CONTAINER_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
  <rootfiles>
    <rootfile full-path="OEBPS/content.opf" media-type="application/oebps-package+xml"/>
  </rootfiles>
</container>
"#;

/// One navigation entry, in reading order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TocEntry {
    pub id: String,
    pub href: String,
    pub title: String,
}

/// Table of contents: the introduction, then every document by sequence index.
pub fn toc_entries(anthology: &Anthology) -> Vec<TocEntry> {
    let intro = TocEntry {
        id: "intro".to_string(),
        href: "intro.xhtml".to_string(),
        title: INTRO_TITLE.to_string(),
    };

    std::iter::once(intro)
        .chain(anthology.documents().iter().map(|doc| {
            let id = chapter_id(doc);
            TocEntry {
                href: format!("{}.xhtml", id),
                id,
                title: doc.title().to_string(),
            }
        }))
        .collect()
}

fn chapter_id(doc: &Document) -> String {
    format!("chapter_{:03}", doc.sequence_index())
}

/// Build the complete EPUB archive in memory.
pub fn package(anthology: &Anthology) -> Result<Vec<u8>> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let stored = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    let deflated = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    // mimetype must be the first entry and uncompressed
    zip.start_file("mimetype", stored)?;
    zip.write_all(MIMETYPE.as_bytes())?;

    zip.start_file("META-INF/container.xml", deflated)?;
    zip.write_all(CONTAINER_XML.as_bytes())?;

    let toc = toc_entries(anthology);

    zip.start_file("OEBPS/content.opf", deflated)?;
    zip.write_all(content_opf(anthology, &toc).as_bytes())?;

    zip.start_file("OEBPS/nav.xhtml", deflated)?;
    zip.write_all(nav_xhtml(anthology, &toc).as_bytes())?;

    zip.start_file("OEBPS/toc.ncx", deflated)?;
    zip.write_all(toc_ncx(anthology, &toc).as_bytes())?;

    zip.start_file("OEBPS/intro.xhtml", deflated)?;
    zip.write_all(intro_xhtml(anthology).as_bytes())?;

    for doc in anthology.documents() {
        zip.start_file(format!("OEBPS/{}.xhtml", chapter_id(doc)), deflated)?;
        zip.write_all(chapter_xhtml(doc, anthology.language()).as_bytes())?;
    }

    Ok(zip.finish()?.into_inner())
}

fn content_opf(anthology: &Anthology, toc: &[TocEntry]) -> String {
    let meta = anthology.meta();
    let mut opf = String::new();

    opf.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    opf.push_str("<package xmlns=\"http://www.idpf.org/2007/opf\" version=\"3.0\" unique-identifier=\"book-id\">\n");
    opf.push_str("  <metadata xmlns:dc=\"http://purl.org/dc/elements/1.1/\">\n");
    opf.push_str(&format!("    <dc:identifier id=\"book-id\">{}</dc:identifier>\n", xml_text(&meta.identifier)));
    opf.push_str(&format!("    <dc:title>{}</dc:title>\n", xml_text(&meta.title)));
    opf.push_str(&format!("    <dc:language>{}</dc:language>\n", xml_text(&meta.language)));
    for (i, author) in meta.authors.iter().enumerate() {
        opf.push_str(&format!(
            "    <dc:creator id=\"creator-{}\">{}</dc:creator>\n",
            i + 1,
            xml_text(author)
        ));
    }
    opf.push_str(&format!("    <dc:description>{}</dc:description>\n", xml_text(&meta.description)));
    opf.push_str(&format!("    <dc:source>{}</dc:source>\n", xml_text(meta.source_url.as_str())));
    opf.push_str(&format!(
        "    <dc:date>{}</dc:date>\n",
        anthology.generated_at().format("%Y-%m-%d")
    ));
    opf.push_str(&format!(
        "    <meta property=\"dcterms:modified\">{}</meta>\n",
        anthology.generated_at().with_timezone(&Utc).format("%Y-%m-%dT%H:%M:%SZ")
    ));
    opf.push_str("  </metadata>\n");

    opf.push_str("  <manifest>\n");
    opf.push_str("    <item id=\"ncx\" href=\"toc.ncx\" media-type=\"application/x-dtbncx+xml\"/>\n");
    opf.push_str("    <item id=\"nav\" href=\"nav.xhtml\" media-type=\"application/xhtml+xml\" properties=\"nav\"/>\n");
    for entry in toc {
        opf.push_str(&format!(
            "    <item id=\"{}\" href=\"{}\" media-type=\"application/xhtml+xml\"/>\n",
            entry.id, entry.href
        ));
    }
    opf.push_str("  </manifest>\n");

    opf.push_str("  <spine toc=\"ncx\">\n");
    opf.push_str("    <itemref idref=\"nav\"/>\n");
    for entry in toc {
        opf.push_str(&format!("    <itemref idref=\"{}\"/>\n", entry.id));
    }
    opf.push_str("  </spine>\n");
    opf.push_str("</package>\n");

    opf
}

fn nav_xhtml(anthology: &Anthology, toc: &[TocEntry]) -> String {
    let items = toc
        .iter()
        .map(|entry| format!("      <li><a href=\"{}\">{}</a></li>", entry.href, xml_text(&entry.title)))
        .collect::<Vec<_>>()
        .join("\n");

    xhtml_page(
        anthology.language(),
        anthology.title(),
        &format!(
            "<nav epub:type=\"toc\" id=\"toc\">\n    <h1>{}</h1>\n    <ol>\n{}\n    </ol>\n  </nav>",
            xml_text(anthology.title()),
            items
        ),
    )
}

fn toc_ncx(anthology: &Anthology, toc: &[TocEntry]) -> String {
    let nav_points = toc
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            format!(
                "    <navPoint id=\"navpoint-{n}\" playOrder=\"{n}\">\n      <navLabel><text>{}</text></navLabel>\n      <content src=\"{}\"/>\n    </navPoint>",
                xml_text(&entry.title),
                entry.href,
                n = i + 1
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<ncx xmlns="http://www.daisy.org/z3986/2005/ncx/" version="2005-1">
  <head>
    <meta name="dtb:uid" content="{}"/>
    <meta name="dtb:depth" content="1"/>
  </head>
  <docTitle><text>{}</text></docTitle>
  <navMap>
{}
  </navMap>
</ncx>
"#,
        encode_double_quoted_attribute(&xml_safe(anthology.identifier())),
        xml_text(anthology.title()),
        nav_points
    )
}

fn intro_xhtml(anthology: &Anthology) -> String {
    let meta = anthology.meta();
    let source = meta.source_url.as_str();

    let body = format!(
        "<h1>{}</h1>\n  <p>{}</p>\n  <p>Source: <a href=\"{}\">{}</a></p>\n  <p>Generated: {}</p>\n  <p>Documents: {}</p>",
        xml_text(&meta.title),
        xml_text(&meta.description),
        encode_double_quoted_attribute(source),
        xml_text(source),
        anthology.generated_at().format("%Y-%m-%d %H:%M"),
        anthology.documents().len()
    );

    xhtml_page(anthology.language(), INTRO_TITLE, &body)
}

pub fn chapter_xhtml(doc: &Document, language: &str) -> String {
    let source = doc.source_url().as_str();

    let body = format!(
        "<h1>{}</h1>\n  <p><strong>Source:</strong> <a href=\"{}\">{}</a></p>\n  <p><strong>Retrieved:</strong> {}</p>\n  <hr/>\n{}",
        xml_text(doc.title()),
        encode_double_quoted_attribute(source),
        xml_text(source),
        doc.retrieved_at().format("%Y-%m-%d"),
        body_to_xhtml(doc.body())
    );

    xhtml_page(language, doc.title(), &body)
}

fn xhtml_page(language: &str, title: &str, body: &str) -> String {
    let lang = encode_double_quoted_attribute(language);
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE html>
<html xmlns="http://www.w3.org/1999/xhtml" xmlns:epub="http://www.idpf.org/2007/ops" lang="{lang}" xml:lang="{lang}">
<head>
  <title>{}</title>
</head>
<body>
  {}
</body>
</html>
"#,
        xml_text(title),
        body
    )
}

/// Convert normalized flow text to the XHTML subset used in chapters.
///
/// Escaping runs on the whole body before any block is inspected.
pub fn body_to_xhtml(body: &str) -> String {
    let escaped = xml_text(body);

    BLOCK_SPLIT_RE
        .split(&escaped)
        .map(str::trim)
        .filter(|block| !block.is_empty())
        .map(render_block)
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_block(block: &str) -> String {
    let (first, rest) = match block.split_once('\n') {
        Some((first, rest)) => (first.trim(), Some(rest)),
        None => (block.trim(), None),
    };

    if let Some((level, text)) = heading(first) {
        let heading = format!("<h{level}>{}</h{level}>", bold(text));
        return match rest {
            Some(rest) if !rest.trim().is_empty() => format!("{}\n{}", heading, paragraph(rest)),
            _ => heading,
        };
    }

    if rest.is_none() && first.chars().all(|c| c == '-') && first.len() >= 3 {
        return "<hr/>".to_string();
    }

    paragraph(block)
}

fn heading(line: &str) -> Option<(usize, &str)> {
    let hashes = line.chars().take_while(|&c| c == '#').count();
    if !(1..=6).contains(&hashes) {
        return None;
    }

    let text = line[hashes..].strip_prefix(' ')?.trim();
    if text.is_empty() {
        return None;
    }

    Some((hashes.min(3), text))
}

fn paragraph(block: &str) -> String {
    let lines = block
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("<br/>\n");

    format!("<p>{}</p>", bold(&lines))
}

fn bold(text: &str) -> String {
    BOLD_RE.replace_all(text, "<strong>$1</strong>").into_owned()
}

/// Escape `&`, `<` and `>` after dropping characters XML cannot carry.
fn xml_text(text: &str) -> String {
    encode_text(&xml_safe(text)).into_owned()
}

fn xml_safe(text: &str) -> String {
    text.chars()
        .filter(|&c| matches!(c, '\t' | '\n' | '\r') || (c >= ' ' && c != '\u{FFFE}' && c != '\u{FFFF}'))
        .collect()
}
