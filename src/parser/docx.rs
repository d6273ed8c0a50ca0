//! DOCX backend: ZIP container to document item stream.
//!
//! Streams `word/document.xml` with quick-xml and produces the ordered
//! paragraph/table item stream. Merged table regions are expanded into the
//! physical representation the merge reconciler expects: `w:gridSpan`
//! repeats the cell text span-many times and a `w:vMerge` continuation
//! inherits the text of the cell directly above at the same grid column.

use std::fs::File;
use std::io::{Cursor, Read};
use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use unicode_normalization::UnicodeNormalization;
use zip::ZipArchive;

use super::options::{ErrorMode, ParseOptions};
use crate::error::{Error, Result};
use crate::model::{Document, Item, Metadata, Paragraph, RawTable};

/// Main document part inside the container.
const DOCUMENT_PART: &str = "word/document.xml";

/// Core properties part (optional).
const CORE_PART: &str = "docProps/core.xml";

/// Parser for DOCX containers.
pub struct DocxParser {
    data: Vec<u8>,
    options: ParseOptions,
}

impl DocxParser {
    /// Open a DOCX file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_options(path, ParseOptions::default())
    }

    /// Open a DOCX file with custom options.
    pub fn open_with_options<P: AsRef<Path>>(path: P, options: ParseOptions) -> Result<Self> {
        let mut data = Vec::new();
        File::open(path)?.read_to_end(&mut data)?;
        Self::from_bytes_with_options(&data, options)
    }

    /// Create a parser from bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::from_bytes_with_options(data, ParseOptions::default())
    }

    /// Create a parser from bytes with custom options.
    pub fn from_bytes_with_options(data: &[u8], options: ParseOptions) -> Result<Self> {
        if !crate::detect::is_docx_bytes(data) {
            return Err(Error::UnknownFormat);
        }
        Ok(Self {
            data: data.to_vec(),
            options,
        })
    }

    /// Create a parser from a reader.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Self::from_reader_with_options(reader, ParseOptions::default())
    }

    /// Create a parser from a reader with custom options.
    pub fn from_reader_with_options<R: Read>(mut reader: R, options: ParseOptions) -> Result<Self> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::from_bytes_with_options(&data, options)
    }

    /// The active options.
    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    /// Parse the container into a [`Document`].
    pub fn parse(&self) -> Result<Document> {
        let mut archive = ZipArchive::new(Cursor::new(&self.data))?;

        let xml = read_part(&mut archive, DOCUMENT_PART)?
            .ok_or_else(|| Error::MissingPart(DOCUMENT_PART.to_string()))?;
        let mut document = parse_document_xml(&xml, self.options.error_mode)?;

        if self.options.extract_metadata {
            if let Some(core) = read_part(&mut archive, CORE_PART)? {
                document.metadata = parse_core_properties(&core);
            }
        }

        Ok(document)
    }
}

fn read_part<R: Read + std::io::Seek>(
    archive: &mut ZipArchive<R>,
    name: &str,
) -> Result<Option<String>> {
    match archive.by_name(name) {
        Ok(mut part) => {
            let mut content = String::new();
            part.read_to_string(&mut content)
                .map_err(|e| Error::Encoding(format!("{}: {}", name, e)))?;
            Ok(Some(content))
        }
        Err(zip::result::ZipError::FileNotFound) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Vertical merge marker on a physical cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VMerge {
    Restart,
    Continue,
}

#[derive(Default)]
struct CellState {
    text: String,
    grid_span: usize,
    vmerge: Option<VMerge>,
}

#[derive(Default)]
struct TableState {
    rows: Vec<Vec<String>>,
    current_row: Vec<String>,
    cell: Option<CellState>,
    depth: usize,
    malformed: Option<String>,
}

#[derive(Default)]
struct ParaState {
    text: String,
    style: Option<String>,
    bold: bool,
}

/// Parse the main document XML into the item stream.
pub(crate) fn parse_document_xml(xml: &str, error_mode: ErrorMode) -> Result<Document> {
    let mut reader = Reader::from_str(xml);
    let mut document = Document::new();

    let mut paragraph: Option<ParaState> = None;
    let mut table: Option<TableState> = None;
    let mut in_text = false;
    let mut in_run_props = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                handle_open(
                    &e,
                    true,
                    &mut document,
                    &mut paragraph,
                    &mut table,
                    &mut in_text,
                    &mut in_run_props,
                )?;
            }
            Ok(Event::Empty(e)) => {
                handle_open(
                    &e,
                    false,
                    &mut document,
                    &mut paragraph,
                    &mut table,
                    &mut in_text,
                    &mut in_run_props,
                )?;
            }
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"t" => in_text = false,
                b"rPr" => in_run_props = false,
                b"p" => finish_paragraph(&mut document, &mut paragraph, &mut table),
                b"tc" => finish_cell(&mut table),
                b"tr" => {
                    if let Some(t) = table.as_mut() {
                        if t.depth == 1 {
                            t.rows.push(std::mem::take(&mut t.current_row));
                        }
                    }
                }
                b"tbl" => finish_table(&mut document, &mut table, error_mode)?,
                _ => {}
            },
            Ok(Event::Text(e)) => {
                if in_text {
                    let text = e
                        .unescape()
                        .map_err(|err| Error::Xml(err.to_string()))?;
                    append_text(&text, &mut paragraph, &mut table);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::Xml(format!(
                    "error at position {}: {}",
                    reader.buffer_position(),
                    e
                )))
            }
            _ => {}
        }
    }

    Ok(document)
}

#[allow(clippy::too_many_arguments)]
fn handle_open(
    e: &BytesStart,
    has_children: bool,
    document: &mut Document,
    paragraph: &mut Option<ParaState>,
    table: &mut Option<TableState>,
    in_text: &mut bool,
    in_run_props: &mut bool,
) -> Result<()> {
    match e.local_name().as_ref() {
        b"tbl" => match table.as_mut() {
            // Nested tables contribute their text to the enclosing cell.
            Some(t) => t.depth += 1,
            None => {
                *table = Some(TableState {
                    depth: 1,
                    ..Default::default()
                })
            }
        },
        b"tc" => {
            if let Some(t) = table.as_mut() {
                if t.depth == 1 {
                    t.cell = Some(CellState {
                        grid_span: 1,
                        ..Default::default()
                    });
                }
            }
        }
        b"gridSpan" => {
            if let Some(cell) = table.as_mut().and_then(|t| t.cell.as_mut()) {
                if let Some(val) = attr_value(e, b"val") {
                    cell.grid_span = val.parse::<usize>().unwrap_or(1).max(1);
                }
            }
        }
        b"vMerge" => {
            if let Some(cell) = table.as_mut().and_then(|t| t.cell.as_mut()) {
                cell.vmerge = match attr_value(e, b"val").as_deref() {
                    Some("restart") => Some(VMerge::Restart),
                    // A bare <w:vMerge/> continues the merge from above.
                    _ => Some(VMerge::Continue),
                };
            }
        }
        b"p" => {
            if table.is_none() {
                if has_children {
                    *paragraph = Some(ParaState::default());
                } else {
                    // Self-closing empty paragraph.
                    push_paragraph(document, ParaState::default());
                }
            }
        }
        b"pStyle" => {
            if let Some(p) = paragraph.as_mut() {
                p.style = attr_value(e, b"val");
            }
        }
        b"rPr" => {
            if has_children {
                *in_run_props = true;
            }
        }
        b"b" => {
            if *in_run_props {
                let off = matches!(attr_value(e, b"val").as_deref(), Some("false") | Some("0"));
                if let Some(p) = paragraph.as_mut() {
                    p.bold = p.bold || !off;
                }
            }
        }
        b"rStyle" => {
            // Bold character style id used by the source corpus.
            if attr_value(e, b"val").as_deref() == Some("a3") {
                if let Some(p) = paragraph.as_mut() {
                    p.bold = true;
                }
            }
        }
        b"t" => {
            if has_children {
                *in_text = true;
            }
        }
        b"tab" | b"br" => append_text(" ", paragraph, table),
        _ => {}
    }
    Ok(())
}

fn append_text(text: &str, paragraph: &mut Option<ParaState>, table: &mut Option<TableState>) {
    if let Some(cell) = table.as_mut().and_then(|t| t.cell.as_mut()) {
        cell.text.push_str(text);
    } else if let Some(p) = paragraph.as_mut() {
        p.text.push_str(text);
    }
}

fn finish_paragraph(
    document: &mut Document,
    paragraph: &mut Option<ParaState>,
    table: &mut Option<TableState>,
) {
    if let Some(cell) = table.as_mut().and_then(|t| t.cell.as_mut()) {
        // Paragraph breaks inside a cell become spaces.
        cell.text.push(' ');
        return;
    }
    if let Some(state) = paragraph.take() {
        push_paragraph(document, state);
    }
}

fn push_paragraph(document: &mut Document, state: ParaState) {
    let position = document.items.len();
    let text: String = normalize_ws(&state.text).nfc().collect();
    document.push(Item::Paragraph(Paragraph::new(
        text,
        state.style,
        state.bold,
        position,
    )));
}

fn finish_cell(table: &mut Option<TableState>) {
    let Some(t) = table.as_mut() else { return };
    if t.depth != 1 {
        return;
    }
    let Some(cell) = t.cell.take() else { return };

    let text: String = normalize_ws(&cell.text).nfc().collect();
    let span = cell.grid_span;
    let cursor = t.current_row.len();

    if cell.vmerge == Some(VMerge::Continue) {
        // Inherit the texts of the physical columns directly above.
        match t.rows.last() {
            Some(prev_row) if cursor + span <= prev_row.len() => {
                for k in 0..span {
                    t.current_row.push(prev_row[cursor + k].clone());
                }
            }
            _ => {
                t.malformed.get_or_insert_with(|| {
                    format!(
                        "vertical merge continuation at row {} column {} has no cell above",
                        t.rows.len(),
                        cursor
                    )
                });
                // Keep the row aligned so later cells stay recoverable.
                for _ in 0..span {
                    t.current_row.push(text.clone());
                }
            }
        }
    } else {
        for _ in 0..span {
            t.current_row.push(text.clone());
        }
    }
}

fn finish_table(
    document: &mut Document,
    table: &mut Option<TableState>,
    error_mode: ErrorMode,
) -> Result<()> {
    let Some(t) = table.as_mut() else {
        return Ok(());
    };
    t.depth -= 1;
    if t.depth > 0 {
        return Ok(());
    }

    let Some(state) = table.take() else {
        return Ok(());
    };
    if let Some(reason) = state.malformed {
        match error_mode {
            ErrorMode::Lenient => {
                log::warn!("skipping malformed table: {}", reason);
                return Ok(());
            }
            ErrorMode::Strict => return Err(Error::MalformedTable(reason)),
        }
    }

    document.push(Item::Table(RawTable::new(state.rows)));
    Ok(())
}

fn attr_value(e: &BytesStart, name: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.local_name().as_ref() == name)
        .and_then(|a| a.unescape_value().ok())
        .map(|v| v.into_owned())
}

fn normalize_ws(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Parse docProps/core.xml into [`Metadata`]. Malformed fields are
/// silently dropped; the part is purely informational.
pub(crate) fn parse_core_properties(xml: &str) -> Metadata {
    let mut reader = Reader::from_str(xml);
    let mut metadata = Metadata::default();
    let mut current: Option<Vec<u8>> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                current = Some(e.local_name().as_ref().to_vec());
            }
            Ok(Event::End(_)) => current = None,
            Ok(Event::Text(e)) => {
                let Some(field) = current.as_deref() else {
                    continue;
                };
                let Ok(value) = e.unescape() else { continue };
                let value = value.trim().to_string();
                if value.is_empty() {
                    continue;
                }
                match field {
                    b"title" => metadata.title = Some(value),
                    b"creator" => metadata.creator = Some(value),
                    b"subject" => metadata.subject = Some(value),
                    b"created" => {
                        metadata.created = chrono::DateTime::parse_from_rfc3339(&value)
                            .ok()
                            .map(|d| d.to_utc());
                    }
                    b"modified" => {
                        metadata.modified = chrono::DateTime::parse_from_rfc3339(&value)
                            .ok()
                            .map(|d| d.to_utc());
                    }
                    _ => {}
                }
            }
            Ok(Event::Eof) | Err(_) => break,
            _ => {}
        }
    }

    metadata
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wrap(body: &str) -> String {
        format!(
            "<?xml version=\"1.0\"?><w:document xmlns:w=\"http://schemas.openxmlformats.org/wordprocessingml/2006/main\"><w:body>{}</w:body></w:document>",
            body
        )
    }

    fn para(text: &str) -> String {
        format!("<w:p><w:r><w:t>{}</w:t></w:r></w:p>", text)
    }

    fn cell(text: &str) -> String {
        format!("<w:tc>{}</w:tc>", para(text))
    }

    #[test]
    fn test_parse_paragraphs_and_positions() {
        let xml = wrap(&format!("{}{}", para("First"), para("Second")));
        let doc = parse_document_xml(&xml, ErrorMode::Strict).unwrap();

        let texts: Vec<_> = doc.paragraphs().map(|p| p.text.clone()).collect();
        assert_eq!(texts, ["First", "Second"]);
        let positions: Vec<_> = doc.paragraphs().map(|p| p.position).collect();
        assert_eq!(positions, [0, 1]);
    }

    #[test]
    fn test_parse_paragraph_style_and_bold() {
        let xml = wrap(
            "<w:p><w:pPr><w:pStyle w:val=\"1\"/></w:pPr>\
             <w:r><w:rPr><w:b/></w:rPr><w:t>Heading</w:t></w:r></w:p>",
        );
        let doc = parse_document_xml(&xml, ErrorMode::Strict).unwrap();
        let p = doc.paragraphs().next().unwrap();
        assert_eq!(p.style.as_deref(), Some("1"));
        assert!(p.bold);
        assert!(p.is_heading());
    }

    #[test]
    fn test_parse_simple_table() {
        let xml = wrap(&format!(
            "<w:tbl><w:tr>{}{}</w:tr><w:tr>{}{}</w:tr></w:tbl>",
            cell("A"),
            cell("B"),
            cell("C"),
            cell("D")
        ));
        let doc = parse_document_xml(&xml, ErrorMode::Strict).unwrap();
        let (_, table) = doc.tables().next().unwrap();
        assert_eq!(table.rows, vec![vec!["A", "B"], vec!["C", "D"]]);
    }

    #[test]
    fn test_grid_span_expands_cells() {
        let xml = wrap(
            "<w:tbl><w:tr>\
             <w:tc><w:tcPr><w:gridSpan w:val=\"2\"/></w:tcPr><w:p><w:r><w:t>Wide</w:t></w:r></w:p></w:tc>\
             <w:tc><w:p><w:r><w:t>N</w:t></w:r></w:p></w:tc>\
             </w:tr></w:tbl>",
        );
        let doc = parse_document_xml(&xml, ErrorMode::Strict).unwrap();
        let (_, table) = doc.tables().next().unwrap();
        assert_eq!(table.rows, vec![vec!["Wide", "Wide", "N"]]);
    }

    #[test]
    fn test_vmerge_inherits_text_from_above() {
        let xml = wrap(
            "<w:tbl>\
             <w:tr><w:tc><w:tcPr><w:vMerge w:val=\"restart\"/></w:tcPr><w:p><w:r><w:t>Span</w:t></w:r></w:p></w:tc>\
             <w:tc><w:p><w:r><w:t>R1</w:t></w:r></w:p></w:tc></w:tr>\
             <w:tr><w:tc><w:tcPr><w:vMerge/></w:tcPr><w:p/></w:tc>\
             <w:tc><w:p><w:r><w:t>R2</w:t></w:r></w:p></w:tc></w:tr>\
             </w:tbl>",
        );
        let doc = parse_document_xml(&xml, ErrorMode::Strict).unwrap();
        let (_, table) = doc.tables().next().unwrap();
        assert_eq!(table.rows, vec![vec!["Span", "R1"], vec!["Span", "R2"]]);
    }

    #[test]
    fn test_vmerge_without_cell_above_strict() {
        // First row has one cell, second row continues a merge in a
        // column that has nothing above it.
        let xml = wrap(
            "<w:tbl>\
             <w:tr><w:tc><w:p><w:r><w:t>A</w:t></w:r></w:p></w:tc></w:tr>\
             <w:tr><w:tc><w:p><w:r><w:t>B</w:t></w:r></w:p></w:tc>\
             <w:tc><w:tcPr><w:vMerge/></w:tcPr><w:p/></w:tc></w:tr>\
             </w:tbl>",
        );
        let err = parse_document_xml(&xml, ErrorMode::Strict).unwrap_err();
        assert!(matches!(err, Error::MalformedTable(_)));
    }

    #[test]
    fn test_vmerge_without_cell_above_lenient_skips_table() {
        let xml = wrap(&format!(
            "{}<w:tbl>\
             <w:tr><w:tc><w:p><w:r><w:t>A</w:t></w:r></w:p></w:tc></w:tr>\
             <w:tr><w:tc><w:p><w:r><w:t>B</w:t></w:r></w:p></w:tc>\
             <w:tc><w:tcPr><w:vMerge/></w:tcPr><w:p/></w:tc></w:tr>\
             </w:tbl>{}",
            para("before"),
            para("after")
        ));
        let doc = parse_document_xml(&xml, ErrorMode::Lenient).unwrap();
        assert_eq!(doc.table_count(), 0);
        assert_eq!(doc.paragraph_count(), 2);
    }

    #[test]
    fn test_cell_paragraphs_join_with_space() {
        let xml = wrap(&format!(
            "<w:tbl><w:tr><w:tc>{}{}</w:tc></w:tr></w:tbl>",
            para("line one"),
            para("line two")
        ));
        let doc = parse_document_xml(&xml, ErrorMode::Strict).unwrap();
        let (_, table) = doc.tables().next().unwrap();
        assert_eq!(table.rows, vec![vec!["line one line two"]]);
    }

    #[test]
    fn test_nested_table_text_flows_into_cell() {
        let xml = wrap(
            "<w:tbl><w:tr><w:tc>\
             <w:p><w:r><w:t>outer</w:t></w:r></w:p>\
             <w:tbl><w:tr><w:tc><w:p><w:r><w:t>inner</w:t></w:r></w:p></w:tc></w:tr></w:tbl>\
             </w:tc></w:tr></w:tbl>",
        );
        let doc = parse_document_xml(&xml, ErrorMode::Strict).unwrap();
        assert_eq!(doc.table_count(), 1);
        let (_, table) = doc.tables().next().unwrap();
        assert_eq!(table.rows, vec![vec!["outer inner"]]);
    }

    #[test]
    fn test_core_properties() {
        let xml = "<?xml version=\"1.0\"?>\
            <cp:coreProperties xmlns:cp=\"http://schemas.openxmlformats.org/package/2006/metadata/core-properties\" \
             xmlns:dc=\"http://purl.org/dc/elements/1.1/\" xmlns:dcterms=\"http://purl.org/dc/terms/\">\
            <dc:title>Свод правил</dc:title>\
            <dc:creator>НИИ</dc:creator>\
            <dcterms:created>2020-05-01T10:00:00Z</dcterms:created>\
            </cp:coreProperties>";
        let metadata = parse_core_properties(xml);
        assert_eq!(metadata.title.as_deref(), Some("Свод правил"));
        assert_eq!(metadata.creator.as_deref(), Some("НИИ"));
        assert!(metadata.created.is_some());
    }
}
