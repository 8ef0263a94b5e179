//! Paragraph extraction from `.docx` files.

use super::DOCUMENT_PART;
use crate::error::{Result, TestgenError};
use quick_xml::events::{BytesStart, Event as XmlEvent};
use quick_xml::reader::Reader;
use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;

/// Read a `.docx` file and join its body paragraphs with `\n`.
///
/// Empty paragraphs contribute empty lines; an empty document yields `""`.
pub fn read_requirements<P: AsRef<Path>>(path: P) -> Result<String> {
    Ok(read_paragraphs(path)?.join("\n"))
}

/// Read the text of every body paragraph, in document order.
pub fn read_paragraphs<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| {
        TestgenError::Document(format!("failed to open '{}': {}", path.display(), e))
    })?;

    let xml = read_document_part(file).map_err(|e| match e {
        TestgenError::Document(msg) => {
            TestgenError::Document(format!("'{}': {}", path.display(), msg))
        }
        other => other,
    })?;

    paragraphs_from_xml(&xml)
}

fn read_document_part<R: Read + Seek>(source: R) -> Result<String> {
    let mut archive = zip::ZipArchive::new(source)
        .map_err(|e| TestgenError::Document(format!("not a valid .docx package: {}", e)))?;

    let mut entry = archive.by_name(DOCUMENT_PART).map_err(|e| {
        TestgenError::Document(format!("missing {} in package: {}", DOCUMENT_PART, e))
    })?;

    let mut xml = String::new();
    entry.read_to_string(&mut xml).map_err(|e| {
        TestgenError::Document(format!("failed to read {}: {}", DOCUMENT_PART, e))
    })?;

    Ok(xml)
}

/// Extract body paragraph texts from a `word/document.xml` payload.
///
/// Only paragraphs that are direct children of `w:body` are returned, so
/// tables, content controls (`w:sdt`) and text boxes are skipped. A
/// paragraph's text is read from its runs (`w:r`, also inside a
/// `w:hyperlink`): `w:t` contributes its text, `w:tab` and `w:ptab` become
/// `\t`, text-wrapping `w:br` and `w:cr` become `\n`, and
/// `w:noBreakHyphen` becomes `-`. Page and column breaks contribute
/// nothing. Paragraph properties (`w:pPr`, including tab stops) are never
/// read as text.
pub fn paragraphs_from_xml(xml: &str) -> Result<Vec<String>> {
    let mut reader = Reader::from_str(xml);
    let mut paragraphs = Vec::new();

    // Qualified names of the currently open elements.
    let mut stack: Vec<Vec<u8>> = Vec::new();
    // Stack index of the body paragraph being collected.
    let mut paragraph_at: Option<usize> = None;
    let mut in_text = false;
    let mut current = String::new();

    loop {
        let event = reader.read_event().map_err(|e| {
            TestgenError::Document(format!(
                "malformed {} at byte {}: {}",
                DOCUMENT_PART,
                reader.buffer_position(),
                e
            ))
        })?;

        match event {
            XmlEvent::Start(e) => {
                let name = e.name().as_ref().to_vec();
                match name.as_slice() {
                    b"w:p" if paragraph_at.is_none() && parent_is(&stack, b"w:body") => {
                        paragraph_at = Some(stack.len());
                        current.clear();
                    }
                    b"w:t" if in_run(&stack, paragraph_at) => in_text = true,
                    _ if in_run(&stack, paragraph_at) => {
                        current.push_str(run_content(&e)?);
                    }
                    _ => {}
                }
                stack.push(name);
            }
            XmlEvent::Empty(e) => match e.name().as_ref() {
                b"w:p" if paragraph_at.is_none() && parent_is(&stack, b"w:body") => {
                    paragraphs.push(String::new())
                }
                _ if in_run(&stack, paragraph_at) => current.push_str(run_content(&e)?),
                _ => {}
            },
            XmlEvent::End(e) => {
                if e.name().as_ref() == b"w:t" {
                    in_text = false;
                }
                if paragraph_at.is_some_and(|at| at + 1 == stack.len()) {
                    paragraphs.push(std::mem::take(&mut current));
                    paragraph_at = None;
                }
                stack.pop();
            }
            XmlEvent::Text(text) if in_text => {
                let unescaped = text.unescape().map_err(|e| {
                    TestgenError::Document(format!("invalid text in {}: {}", DOCUMENT_PART, e))
                })?;
                current.push_str(&unescaped);
            }
            XmlEvent::Eof => break,
            _ => {}
        }
    }

    Ok(paragraphs)
}

fn parent_is(stack: &[Vec<u8>], name: &[u8]) -> bool {
    stack.last().is_some_and(|last| last.as_slice() == name)
}

/// Whether the next element is a direct child of a run of the collected
/// paragraph.
fn in_run(stack: &[Vec<u8>], paragraph_at: Option<usize>) -> bool {
    let Some(at) = paragraph_at else {
        return false;
    };
    if !parent_is(stack, b"w:r") {
        return false;
    }
    let run_at = stack.len() - 1;
    run_at == at + 1 || (run_at == at + 2 && stack[at + 1].as_slice() == b"w:hyperlink")
}

/// Text contributed by a non-`w:t` run child.
fn run_content(element: &BytesStart<'_>) -> Result<&'static str> {
    let content = match element.name().as_ref() {
        b"w:tab" | b"w:ptab" => "\t",
        b"w:cr" => "\n",
        b"w:noBreakHyphen" => "-",
        b"w:br" => {
            let kind = element.try_get_attribute("w:type").map_err(|e| {
                TestgenError::Document(format!("invalid w:br in {}: {}", DOCUMENT_PART, e))
            })?;
            match kind {
                Some(attr) if attr.value.as_ref() != b"textWrapping" => "",
                _ => "\n",
            }
        }
        _ => "",
    };
    Ok(content)
}
