//! Word (`.docx`) document codec.
//!
//! A `.docx` file is a ZIP container whose body lives in
//! `word/document.xml`. This module provides:
//!
//! - **Reader**: flattens body paragraphs into plain text
//! - **Writer**: builds a minimal, valid document of headings and paragraphs
//!
//! Only what the pipeline needs is supported: paragraph text in, headings
//! and paragraphs out. Formatting, tables, and images are not modelled.

mod reader;
mod writer;


pub use reader::{paragraphs_from_xml, read_paragraphs, read_requirements};
pub use writer::{Block, WordDocument};

/// Archive entry holding the document body.
pub const DOCUMENT_PART: &str = "word/document.xml";
