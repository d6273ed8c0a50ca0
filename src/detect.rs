//! DOCX format detection and validation.

use std::fs::File;
use std::io::{BufReader, Cursor, Read};
use std::path::Path;

use crate::error::{Error, Result};

/// DOCX container information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocxFormat {
    /// Path of the main document part inside the container
    pub main_part: String,
    /// Whether the container carries core properties metadata
    pub has_core_properties: bool,
}

impl std::fmt::Display for DocxFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "DOCX ({})", self.main_part)
    }
}

/// ZIP local file header magic: PK\x03\x04
const ZIP_MAGIC: &[u8] = b"PK\x03\x04";

/// Detect the DOCX format from a file path.
///
/// # Returns
/// * `Ok(DocxFormat)` if the file is a DOCX container
/// * `Err(Error::UnknownFormat)` otherwise
pub fn detect_format_from_path<P: AsRef<Path>>(path: P) -> Result<DocxFormat> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);
    let mut data = Vec::new();
    reader.read_to_end(&mut data)?;
    detect_format_from_bytes(&data)
}

/// Detect the DOCX format from bytes.
///
/// Checks the ZIP magic, then opens the archive and looks for the
/// `word/document.xml` part that every DOCX carries.
pub fn detect_format_from_bytes(data: &[u8]) -> Result<DocxFormat> {
    if !data.starts_with(ZIP_MAGIC) {
        return Err(Error::UnknownFormat);
    }

    let archive =
        zip::ZipArchive::new(Cursor::new(data)).map_err(|_| Error::UnknownFormat)?;

    let mut main_part = None;
    let mut has_core_properties = false;
    for name in archive.file_names() {
        match name {
            "word/document.xml" => main_part = Some(name.to_string()),
            "docProps/core.xml" => has_core_properties = true,
            _ => {}
        }
    }

    match main_part {
        Some(main_part) => Ok(DocxFormat {
            main_part,
            has_core_properties,
        }),
        None => Err(Error::UnknownFormat),
    }
}

/// Check if a file is a DOCX container.
pub fn is_docx<P: AsRef<Path>>(path: P) -> bool {
    detect_format_from_path(path).is_ok()
}

/// Check if bytes are a DOCX container.
pub fn is_docx_bytes(data: &[u8]) -> bool {
    detect_format_from_bytes(data).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    fn build_container(parts: &[(&str, &str)]) -> Vec<u8> {
        let mut buffer = Cursor::new(Vec::new());
        {
            let mut writer = zip::ZipWriter::new(&mut buffer);
            for (name, content) in parts {
                writer
                    .start_file(name.to_string(), SimpleFileOptions::default())
                    .unwrap();
                writer.write_all(content.as_bytes()).unwrap();
            }
            writer.finish().unwrap();
        }
        buffer.into_inner()
    }

    #[test]
    fn test_detect_empty_data() {
        assert!(matches!(
            detect_format_from_bytes(&[]),
            Err(Error::UnknownFormat)
        ));
    }

    #[test]
    fn test_detect_non_zip_data() {
        assert!(matches!(
            detect_format_from_bytes(b"%PDF-1.7 definitely not a docx"),
            Err(Error::UnknownFormat)
        ));
    }

    #[test]
    fn test_detect_zip_without_document_part() {
        let data = build_container(&[("other.txt", "hello")]);
        assert!(matches!(
            detect_format_from_bytes(&data),
            Err(Error::UnknownFormat)
        ));
    }

    #[test]
    fn test_detect_valid_docx() {
        let data = build_container(&[
            ("word/document.xml", "<w:document/>"),
            ("docProps/core.xml", "<cp:coreProperties/>"),
        ]);
        let format = detect_format_from_bytes(&data).unwrap();
        assert_eq!(format.main_part, "word/document.xml");
        assert!(format.has_core_properties);
        assert!(is_docx_bytes(&data));
    }
}
