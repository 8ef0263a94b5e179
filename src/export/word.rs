//! Word export of the result bundle.

use super::bundle::{ResultBundle, section_title};
use crate::document::WordDocument;
use crate::error::Result;
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

/// File name of the Word export.
pub const WORD_FILE_NAME: &str = "Generated_Test_Cases.docx";

/// Title heading of the Word export.
pub const DOCUMENT_TITLE: &str = "Generated Test Cases";

static BLANK_LINES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\r?\n[ \t]*\r?\n").expect("Invalid blank line regex"));

static TEST_CASE_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)test[ _-]*case[ _-]*id\s*:").expect("Invalid test case regex"));

/// Lay out the bundle as a Word document.
///
/// Structure:
/// - level 1 title
/// - per section: level 2 heading, then its text split on blank lines;
///   every `Test Case ID:` line becomes a level 3 heading and the lines
///   between headings become body paragraphs
/// - a section without text renders as one empty paragraph
pub fn build_word_document(bundle: &ResultBundle) -> WordDocument {
    let mut doc = WordDocument::new();
    doc.add_heading(DOCUMENT_TITLE, 1);

    for key in bundle.ordered_keys() {
        doc.add_heading(section_title(key), 2);

        let text = bundle.get(key).trim();
        if text.is_empty() {
            doc.add_paragraph("");
            continue;
        }

        for block in BLANK_LINES.split(text) {
            let block = block.trim();
            if block.is_empty() {
                continue;
            }
            add_block(&mut doc, block);
        }
    }

    doc
}

fn add_block(doc: &mut WordDocument, block: &str) {
    let mut pending: Vec<&str> = Vec::new();

    for line in block.lines() {
        if TEST_CASE_ID.is_match(line) {
            flush_paragraph(doc, &mut pending);
            doc.add_heading(clean_heading(line), 3);
        } else {
            pending.push(line);
        }
    }
    flush_paragraph(doc, &mut pending);
}

fn flush_paragraph(doc: &mut WordDocument, lines: &mut Vec<&str>) {
    let text = lines.join("\n");
    if !text.trim().is_empty() {
        doc.add_paragraph(text.trim());
    }
    lines.clear();
}

/// Strip Markdown emphasis, heading, and bullet markers from a heading line.
fn clean_heading(line: &str) -> String {
    line.replace("**", "")
        .replace("__", "")
        .trim()
        .trim_start_matches(['#', '-', '*', '>', ' '])
        .trim()
        .to_string()
}

/// Write the Word export to `path`.
pub fn export_word<P: AsRef<Path>>(bundle: &ResultBundle, path: P) -> Result<()> {
    build_word_document(bundle).save(path)
}
