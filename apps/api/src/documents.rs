//! Document normalization — uploaded CV bytes to a flat text blob.
//!
//! Never fails: problems come back as an "Error reading file: ..." string,
//! which then flows through the pipeline like any other résumé text.

use std::io::{Cursor, Read};

use quick_xml::escape::resolve_predefined_entity;
use quick_xml::events::Event;
use quick_xml::Reader;
use tracing::warn;

const READ_ERROR_PREFIX: &str = "Error reading file";

/// Extracts text from a PDF, Word (.docx) or plain-text upload.
/// Unsupported extensions yield an empty string.
pub async fn extract_text(file_name: &str, data: Vec<u8>) -> String {
    let extension = std::path::Path::new(file_name)
        .extension()
        .and_then(|v| v.to_str())
        .map(|v| v.to_ascii_lowercase())
        .unwrap_or_default();

    let result = match extension.as_str() {
        // PDF parsing is CPU-bound and may panic on malformed input.
        "pdf" => tokio::task::spawn_blocking(move || extract_pdf_text(&data))
            .await
            .unwrap_or_else(|e| Err(anyhow::anyhow!("PDF parser aborted: {e}"))),
        "docx" => extract_docx_text(&data),
        "txt" => String::from_utf8(data).map_err(anyhow::Error::from),
        _ => {
            warn!("Unsupported document type: {file_name}");
            return String::new();
        }
    };

    result.unwrap_or_else(|e| {
        warn!("Failed to read {file_name}: {e}");
        format!("{READ_ERROR_PREFIX}: {e}")
    })
}

fn extract_pdf_text(data: &[u8]) -> anyhow::Result<String> {
    let text = pdf_extract::extract_text_from_mem(data)?;
    Ok(text)
}

/// Word body text: one line per `<w:p>`, built from the `<w:t>` runs inside
/// it. Run whitespace is kept so split runs join correctly; `<w:tab/>` and
/// `<w:br/>` inside a run become a tab and a line break.
fn extract_docx_text(data: &[u8]) -> anyhow::Result<String> {
    let mut archive = zip::ZipArchive::new(Cursor::new(data))?;
    let mut xml = String::new();
    archive
        .by_name("word/document.xml")?
        .read_to_string(&mut xml)?;

    let mut reader = Reader::from_str(&xml);
    let mut lines = Vec::new();
    let mut paragraph = String::new();
    let mut in_run = false;
    let mut in_text = false;

    loop {
        match reader.read_event()? {
            Event::Start(tag) => match tag.name().as_ref() {
                b"w:r" => in_run = true,
                b"w:t" => in_text = in_run,
                _ => {}
            },
            Event::End(tag) => match tag.name().as_ref() {
                b"w:r" => in_run = false,
                b"w:t" => in_text = false,
                b"w:p" => finish_paragraph(&mut paragraph, &mut lines),
                _ => {}
            },
            Event::Empty(tag) if in_run => match tag.name().as_ref() {
                b"w:tab" => paragraph.push('\t'),
                b"w:br" | b"w:cr" => paragraph.push('\n'),
                _ => {}
            },
            Event::Text(text) if in_text => paragraph.push_str(&text.xml_content()?),
            Event::GeneralRef(entity) if in_text => {
                if let Some(c) = entity.resolve_char_ref()? {
                    paragraph.push(c);
                } else if let Some(resolved) = resolve_predefined_entity(&entity.decode()?) {
                    paragraph.push_str(resolved);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }
    finish_paragraph(&mut paragraph, &mut lines);

    Ok(lines.join("\n"))
}

fn finish_paragraph(paragraph: &mut String, lines: &mut Vec<String>) {
    let line = paragraph.trim();
    if !line.is_empty() {
        lines.push(line.to_string());
    }
    paragraph.clear();
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn docx_with_paragraphs(paragraphs: &[&str]) -> Vec<u8> {
        let body: String = paragraphs
            .iter()
            .map(|p| format!("<w:p><w:r><w:t>{p}</w:t></w:r></w:p>"))
            .collect();
        docx_with_body(&body)
    }

    fn docx_with_body(body: &str) -> Vec<u8> {
        let xml = format!(
            r#"<?xml version="1.0" encoding="UTF-8"?><w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{body}</w:body></w:document>"#
        );

        let mut buffer = Cursor::new(Vec::new());
        {
            let mut zip = zip::ZipWriter::new(&mut buffer);
            zip.start_file("word/document.xml", zip::write::SimpleFileOptions::default())
                .unwrap();
            zip.write_all(xml.as_bytes()).unwrap();
            zip.finish().unwrap();
        }
        buffer.into_inner()
    }

    #[tokio::test]
    async fn test_plain_text_passthrough() {
        let text = extract_text("cv.TXT", "Jane Li\nPhD".as_bytes().to_vec()).await;
        assert_eq!(text, "Jane Li\nPhD");
    }

    #[tokio::test]
    async fn test_invalid_utf8_reports_error_text() {
        let text = extract_text("cv.txt", vec![0xff, 0xfe, 0x00]).await;
        assert!(text.starts_with("Error reading file:"));
    }

    #[tokio::test]
    async fn test_docx_paragraphs_joined_by_newline() {
        let data = docx_with_paragraphs(&["Wang Fang", "Research Assistant", "PCR and qPCR"]);
        let text = extract_text("resume.docx", data).await;
        assert_eq!(text, "Wang Fang\nResearch Assistant\nPCR and qPCR");
    }

    #[tokio::test]
    async fn test_docx_split_runs_keep_spaces_and_entities() {
        let body = concat!(
            r#"<w:p><w:pPr><w:tabs><w:tab w:val="left" w:pos="720"/></w:tabs></w:pPr>"#,
            r#"<w:r><w:t xml:space="preserve">Wang </w:t></w:r><w:r><w:t>Fang</w:t></w:r></w:p>"#,
            r#"<w:p><w:r><w:t>PCR &amp; qPCR</w:t><w:tab/><w:t>5 years</w:t></w:r></w:p>"#,
            r#"<w:p><w:r><w:t>   </w:t></w:r></w:p>"#,
        );
        let text = extract_text("resume.docx", docx_with_body(body)).await;
        assert_eq!(text, "Wang Fang\nPCR & qPCR\t5 years");
    }

    #[tokio::test]
    async fn test_corrupt_documents_report_error_text() {
        let docx = extract_text("resume.docx", b"not a zip".to_vec()).await;
        assert!(docx.starts_with("Error reading file:"));

        let pdf = extract_text("resume.pdf", b"not a pdf".to_vec()).await;
        assert!(pdf.starts_with("Error reading file:"));
    }

    #[tokio::test]
    async fn test_unsupported_extension_is_empty() {
        assert_eq!(extract_text("photo.png", vec![1, 2, 3]).await, "");
        assert_eq!(extract_text("no_extension", vec![]).await, "");
    }
}
