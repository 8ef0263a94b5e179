//! Minimal `.docx` writer.
//!
//! Produces a package with the five parts Word needs to open a document
//! that uses the built-in `Title` and `Heading1`-`Heading9` styles.

use crate::error::{Result, TestgenError};
use crate::fs::atomic_write;
use quick_xml::escape::escape;
use std::io::{Cursor, Write};
use std::path::Path;
use zip::CompressionMethod;
use zip::write::{SimpleFileOptions, ZipWriter};

/// Deepest heading level Word provides a built-in style for.
const MAX_HEADING_LEVEL: u8 = 9;

const CONTENT_TYPES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/><Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/></Types>"#;

const ROOT_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;

const DOCUMENT_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/></Relationships>"#;

const WORDML_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

/// A top-level block of a generated document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    /// Heading at level 0 (`Title`) through 9.
    Heading { level: u8, text: String },
    /// Body paragraph in the default style.
    Paragraph(String),
}

/// In-memory document built from headings and paragraphs.
#[derive(Debug, Clone, Default)]
pub struct WordDocument {
    blocks: Vec<Block>,
}

impl WordDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a heading. Level 0 uses the `Title` style; levels above 9
    /// are clamped to 9.
    pub fn add_heading(&mut self, text: impl Into<String>, level: u8) -> &mut Self {
        self.blocks.push(Block::Heading {
            level: level.min(MAX_HEADING_LEVEL),
            text: text.into(),
        });
        self
    }

    /// Append a body paragraph. `\n` becomes a line break, `\t` a tab.
    pub fn add_paragraph(&mut self, text: impl Into<String>) -> &mut Self {
        self.blocks.push(Block::Paragraph(text.into()));
        self
    }

    #[cfg(test)]
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Render `word/document.xml`.
    pub fn document_xml(&self) -> String {
        let mut body = String::new();
        for block in &self.blocks {
            match block {
                Block::Heading { level, text } => {
                    body.push_str("<w:p><w:pPr><w:pStyle w:val=\"");
                    body.push_str(&heading_style_id(*level));
                    body.push_str("\"/></w:pPr>");
                    push_run(&mut body, text);
                    body.push_str("</w:p>");
                }
                Block::Paragraph(text) => {
                    body.push_str("<w:p>");
                    push_run(&mut body, text);
                    body.push_str("</w:p>");
                }
            }
        }

        format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n\
             <w:document xmlns:w=\"{ns}\"><w:body>{body}\
             <w:sectPr><w:pgSz w:w=\"12240\" w:h=\"15840\"/>\
             <w:pgMar w:top=\"1440\" w:right=\"1440\" w:bottom=\"1440\" w:left=\"1440\" \
             w:header=\"720\" w:footer=\"720\" w:gutter=\"0\"/></w:sectPr>\
             </w:body></w:document>",
            ns = WORDML_NS,
            body = body
        )
    }

    /// Serialize the whole package to bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let parts = [
            ("[Content_Types].xml", CONTENT_TYPES_XML.to_string()),
            ("_rels/.rels", ROOT_RELS_XML.to_string()),
            ("word/_rels/document.xml.rels", DOCUMENT_RELS_XML.to_string()),
            ("word/styles.xml", styles_xml()),
            (super::DOCUMENT_PART, self.document_xml()),
        ];

        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));

        for (name, content) in parts {
            zip.start_file(name, options)
                .map_err(|e| TestgenError::Io(format!("failed to add {} to .docx: {}", name, e)))?;
            zip.write_all(content.as_bytes())
                .map_err(|e| TestgenError::Io(format!("failed to write {} to .docx: {}", name, e)))?;
        }

        let cursor = zip
            .finish()
            .map_err(|e| TestgenError::Io(format!("failed to finish .docx package: {}", e)))?;
        Ok(cursor.into_inner())
    }

    /// Write the package to `path` atomically.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        atomic_write(path, &self.to_bytes()?)
    }
}

fn heading_style_id(level: u8) -> String {
    if level == 0 {
        "Title".to_string()
    } else {
        format!("Heading{}", level)
    }
}

/// Append a single run, mapping tabs and newlines to their WordprocessingML
/// elements and dropping characters XML 1.0 cannot carry.
fn push_run(out: &mut String, text: &str) {
    out.push_str("<w:r>");
    let mut segment = String::new();

    let flush = |out: &mut String, segment: &mut String| {
        if !segment.is_empty() {
            out.push_str("<w:t xml:space=\"preserve\">");
            out.push_str(&escape(segment.as_str()));
            out.push_str("</w:t>");
            segment.clear();
        }
    };

    let mut chars = text.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '\t' => {
                flush(out, &mut segment);
                out.push_str("<w:tab/>");
            }
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                flush(out, &mut segment);
                out.push_str("<w:br/>");
            }
            '\n' => {
                flush(out, &mut segment);
                out.push_str("<w:br/>");
            }
            c if is_xml_char(c) => segment.push(c),
            _ => {}
        }
    }
    flush(out, &mut segment);
    out.push_str("</w:r>");
}

fn is_xml_char(c: char) -> bool {
    matches!(c, '\u{20}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}' | '\u{10000}'..='\u{10FFFF}')
}

fn styles_xml() -> String {
    let mut styles = String::new();
    styles.push_str(
        "<w:style w:type=\"paragraph\" w:default=\"1\" w:styleId=\"Normal\">\
         <w:name w:val=\"Normal\"/><w:qFormat/>\
         <w:rPr><w:sz w:val=\"22\"/></w:rPr></w:style>",
    );
    styles.push_str(
        "<w:style w:type=\"paragraph\" w:styleId=\"Title\">\
         <w:name w:val=\"Title\"/><w:basedOn w:val=\"Normal\"/><w:next w:val=\"Normal\"/><w:qFormat/>\
         <w:rPr><w:b/><w:sz w:val=\"56\"/></w:rPr></w:style>",
    );

    for level in 1..=MAX_HEADING_LEVEL {
        // 16pt for Heading1 down to 11pt, in half-points.
        let size = 32u32.saturating_sub(u32::from(level - 1) * 2).max(22);
        styles.push_str(&format!(
            "<w:style w:type=\"paragraph\" w:styleId=\"Heading{level}\">\
             <w:name w:val=\"heading {level}\"/><w:basedOn w:val=\"Normal\"/>\
             <w:next w:val=\"Normal\"/><w:qFormat/>\
             <w:pPr><w:keepNext/><w:spacing w:before=\"240\" w:after=\"60\"/>\
             <w:outlineLvl w:val=\"{outline}\"/></w:pPr>\
             <w:rPr><w:b/><w:sz w:val=\"{size}\"/></w:rPr></w:style>",
            level = level,
            outline = level - 1,
            size = size
        ));
    }

    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n\
         <w:styles xmlns:w=\"{}\">{}</w:styles>",
        WORDML_NS, styles
    )
}
