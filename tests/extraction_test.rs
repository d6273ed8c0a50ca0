//! End-to-end extraction tests over synthetic in-memory DOCX containers.

use std::io::{Cursor, Write};

use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use undocx::{
    extract_dir, is_docx_bytes, parse_bytes, parse_bytes_with_options, ErrorMode, JsonFormat,
    ParseOptions, TableKind, TableRecord, Undocx,
};

const DOCUMENT_HEAD: &str = "<?xml version=\"1.0\"?>\
<w:document xmlns:w=\"http://schemas.openxmlformats.org/wordprocessingml/2006/main\"><w:body>";
const DOCUMENT_TAIL: &str = "</w:body></w:document>";

fn para(text: &str) -> String {
    format!("<w:p><w:r><w:t>{}</w:t></w:r></w:p>", text)
}

fn cell(text: &str) -> String {
    format!("<w:tc><w:p><w:r><w:t>{}</w:t></w:r></w:p></w:tc>", text)
}

fn row(cells: &[String]) -> String {
    format!("<w:tr>{}</w:tr>", cells.concat())
}

fn build_docx(body: &str) -> Vec<u8> {
    build_docx_with_core(body, None)
}

fn build_docx_with_core(body: &str, core: Option<&str>) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();

    writer.start_file("word/document.xml", options).unwrap();
    writer.write_all(DOCUMENT_HEAD.as_bytes()).unwrap();
    writer.write_all(body.as_bytes()).unwrap();
    writer.write_all(DOCUMENT_TAIL.as_bytes()).unwrap();

    if let Some(core) = core {
        writer.start_file("docProps/core.xml", options).unwrap();
        writer.write_all(core.as_bytes()).unwrap();
    }

    writer.finish().unwrap().into_inner()
}

fn sample_body() -> String {
    let table = format!(
        "<w:tbl>{}{}</w:tbl>",
        row(&[cell("Марка"), cell("Коэффициент")]),
        row(&[cell("С245"), cell("1.0")]),
    );
    format!(
        "{}{}{}",
        para("Расчетные значения принимают по таблице 5.2 настоящего раздела."),
        para("Таблица 5.2 — Коэффициенты условий работы"),
        table
    )
}

#[test]
fn detects_synthetic_container() {
    let data = build_docx(&para("hello"));
    assert!(is_docx_bytes(&data));
    assert!(!is_docx_bytes(b"plain text"));
}

#[test]
fn parses_paragraphs_and_tables_in_order() {
    let doc = parse_bytes(&build_docx(&sample_body())).unwrap();

    assert_eq!(doc.paragraph_count(), 2);
    assert_eq!(doc.table_count(), 1);

    let (position, table) = doc.tables().next().unwrap();
    assert_eq!(position, 2);
    assert_eq!(table.rows.len(), 2);
    assert_eq!(table.rows[0], ["Марка", "Коэффициент"]);
}

#[test]
fn extracts_record_with_id_title_and_context() {
    let result = Undocx::new().parse_bytes(&build_docx(&sample_body())).unwrap();
    let records = result.records();

    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert_eq!(record.id.as_deref(), Some("5.2"));
    assert_eq!(record.kind, TableKind::Table);
    assert!(record.title.as_deref().unwrap().contains("Таблица 5.2"));
    assert!(record
        .context
        .as_deref()
        .unwrap()
        .contains("по таблице 5.2"));
}

#[test]
fn vertical_merge_survives_the_round_trip() {
    // Header spans two columns; the first body column is vertically merged.
    let body = format!(
        "<w:tbl>{}{}{}</w:tbl>",
        "<w:tr><w:tc><w:tcPr><w:gridSpan w:val=\"2\"/></w:tcPr><w:p><w:r><w:t>Шапка</w:t></w:r></w:p></w:tc></w:tr>",
        "<w:tr><w:tc><w:tcPr><w:vMerge w:val=\"restart\"/></w:tcPr><w:p><w:r><w:t>Группа</w:t></w:r></w:p></w:tc><w:tc><w:p><w:r><w:t>1</w:t></w:r></w:p></w:tc></w:tr>",
        "<w:tr><w:tc><w:tcPr><w:vMerge/></w:tcPr><w:p/></w:tc><w:tc><w:p><w:r><w:t>2</w:t></w:r></w:p></w:tc></w:tr>",
    );
    let result = Undocx::new().parse_bytes(&build_docx(&body)).unwrap();
    let records = result.records();
    let record = &records[0];

    // Row 0: one origin spanning both columns (serialized as one entry).
    let header = &record.rows[0][0];
    assert_eq!(header.text.as_deref(), Some("Шапка"));
    assert_eq!(header.cols, Some(2));

    // Row 1 origin spans two rows; row 2 starts with its placeholder.
    let group = &record.rows[1][0];
    assert_eq!(group.text.as_deref(), Some("Группа"));
    assert_eq!(group.rows, Some(2));
    let placeholder = &record.rows[2][0];
    assert_eq!(placeholder.text, None);
    assert_eq!(placeholder.id, group.id);

    // Serialized records reload into an identical structure.
    let json = undocx::render::to_json(record, JsonFormat::Pretty).unwrap();
    let reloaded: TableRecord = serde_json::from_str(&json).unwrap();
    assert_eq!(reloaded.rows[2][0].id, record.rows[1][0].id);
}

#[test]
fn strict_mode_rejects_short_merge_rows() {
    // Continuation cell with no row above it to inherit from.
    let body = format!(
        "<w:tbl>{}</w:tbl>",
        "<w:tr><w:tc><w:tcPr><w:vMerge/></w:tcPr><w:p/></w:tc></w:tr>"
    );
    let data = build_docx(&body);

    let strict = ParseOptions::default().with_error_mode(ErrorMode::Strict);
    assert!(parse_bytes_with_options(&data, strict).is_err());

    // Lenient mode skips the table and keeps the document.
    let doc = parse_bytes(&data).unwrap();
    assert_eq!(doc.table_count(), 0);
}

#[test]
fn reads_core_properties() {
    let core = "<?xml version=\"1.0\"?>\
<cp:coreProperties xmlns:cp=\"http://schemas.openxmlformats.org/package/2006/metadata/core-properties\" \
xmlns:dc=\"http://purl.org/dc/elements/1.1/\">\
<dc:title>СП 16</dc:title><dc:creator>НИЦ</dc:creator>\
</cp:coreProperties>";
    let doc = parse_bytes(&build_docx_with_core(&para("x"), Some(core))).unwrap();

    assert_eq!(doc.metadata.title.as_deref(), Some("СП 16"));
    assert_eq!(doc.metadata.creator.as_deref(), Some("НИЦ"));
}

#[test]
fn batch_extraction_writes_one_file_per_table() {
    let src = tempfile::tempdir().unwrap();
    let dst = tempfile::tempdir().unwrap();

    std::fs::write(src.path().join("doc a.docx"), build_docx(&sample_body())).unwrap();
    std::fs::write(src.path().join("broken.docx"), b"not a container").unwrap();
    std::fs::write(src.path().join("notes.txt"), b"ignored").unwrap();

    let summary = extract_dir(src.path(), dst.path(), &ParseOptions::default()).unwrap();

    assert_eq!(summary.files_ok, 1);
    assert_eq!(summary.files_failed, 1);
    assert_eq!(summary.tables_extracted, 1);

    let output = dst.path().join("doc_a.0.json");
    let record: TableRecord =
        serde_json::from_str(&std::fs::read_to_string(output).unwrap()).unwrap();
    assert_eq!(record.label, "doc_a.0");
    assert_eq!(record.id.as_deref(), Some("5.2"));
}
