use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use bytes::Bytes;

use crate::resume::PipelineError;

/// Pulls the text out of a document on local disk, page by page in page order.
pub trait TextExtractor: Send + Sync {
    fn extract(&self, path: &Path) -> Result<String, PipelineError>;
}

/// `pdf-extract` backed extractor.
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfTextExtractor;

impl TextExtractor for PdfTextExtractor {
    fn extract(&self, path: &Path) -> Result<String, PipelineError> {
        pdf_extract::extract_text(path).map_err(|e| PipelineError::Decode(e.to_string()))
    }
}

/// Spools the downloaded object to a temporary file and extracts its text.
/// The file is removed when extraction finishes, whatever the outcome.
///
/// Whitespace-only text counts as no text at all.
pub async fn extract_document_text(
    extractor: Arc<dyn TextExtractor>,
    document: Bytes,
) -> Result<String, PipelineError> {
    let text = tokio::task::spawn_blocking(move || {
        let mut file = tempfile::Builder::new()
            .prefix("resume-")
            .suffix(".pdf")
            .tempfile()
            .map_err(|e| PipelineError::Decode(format!("cannot create temp file: {e}")))?;
        file.write_all(&document)
            .and_then(|_| file.flush())
            .map_err(|e| PipelineError::Decode(format!("cannot spool document: {e}")))?;
        extractor.extract(file.path())
    })
    .await
    .map_err(|e| PipelineError::Decode(format!("text extraction aborted: {e}")))??;

    if text.trim().is_empty() {
        return Err(PipelineError::EmptyDocument);
    }
    Ok(text)
}


#[cfg(test)]
mod tests {
    use super::testing::PlainTextExtractor;
    use super::*;

    #[tokio::test]
    async fn test_extracted_text_is_returned() {
        let text = extract_document_text(
            Arc::new(PlainTextExtractor),
            Bytes::from_static(b"Jane Doe\nRust Engineer"),
        )
        .await
        .unwrap();
        assert_eq!(text, "Jane Doe\nRust Engineer");
    }

    #[tokio::test]
    async fn test_whitespace_only_text_is_empty_document() {
        let err = extract_document_text(Arc::new(PlainTextExtractor), Bytes::from_static(b" \n\n "))
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::EmptyDocument));
    }

    /// A minimal PDF with one line of Helvetica text per page and an exact
    /// cross-reference table.
    fn pdf_with_pages(pages: &[&str]) -> Vec<u8> {
        let font_id = 3 + 2 * pages.len();
        let kids: Vec<String> = (0..pages.len())
            .map(|i| format!("{} 0 R", 3 + 2 * i))
            .collect();

        let mut objects = vec![
            "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
            format!(
                "<< /Type /Pages /Kids [{}] /Count {} >>",
                kids.join(" "),
                pages.len()
            ),
        ];
        for (i, text) in pages.iter().enumerate() {
            let content = format!("BT /F1 18 Tf 72 720 Td ({text}) Tj ET");
            objects.push(format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] \
                 /Resources << /Font << /F1 {font_id} 0 R >> >> /Contents {} 0 R >>",
                4 + 2 * i
            ));
            objects.push(format!(
                "<< /Length {} >>\nstream\n{content}\nendstream",
                content.len()
            ));
        }
        objects.push(
            "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>"
                .to_string(),
        );

        let mut pdf = b"%PDF-1.4\n".to_vec();
        let mut offsets = Vec::new();
        for (i, body) in objects.iter().enumerate() {
            offsets.push(pdf.len());
            pdf.extend_from_slice(format!("{} 0 obj\n{body}\nendobj\n", i + 1).as_bytes());
        }
        let xref_at = pdf.len();
        pdf.extend_from_slice(format!("xref\n0 {}\n", objects.len() + 1).as_bytes());
        pdf.extend_from_slice(b"0000000000 65535 f \n");
        for offset in offsets {
            pdf.extend_from_slice(format!("{offset:010} 00000 n \n").as_bytes());
        }
        pdf.extend_from_slice(
            format!(
                "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{xref_at}\n%%EOF\n",
                objects.len() + 1
            )
            .as_bytes(),
        );
        pdf
    }

    #[tokio::test]
    async fn test_pdf_text_follows_page_order() {
        let pdf = pdf_with_pages(&["Jane", "Engineer"]);
        let text = extract_document_text(Arc::new(PdfTextExtractor), Bytes::from(pdf))
            .await
            .unwrap();

        let first = text.find("Jane").expect("page one text");
        let second = text.find("Engineer").expect("page two text");
        assert!(first < second);
    }

    #[tokio::test]
    async fn test_pdf_without_text_is_empty_document() {
        let pdf = pdf_with_pages(&[""]);
        let err = extract_document_text(Arc::new(PdfTextExtractor), Bytes::from(pdf))
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::EmptyDocument));
    }

    #[tokio::test]
    async fn test_pdf_extractor_rejects_non_pdf_bytes() {
        let err = extract_document_text(
            Arc::new(PdfTextExtractor),
            Bytes::from_static(b"this is not a pdf"),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, PipelineError::Decode(_)));
    }

    #[test]
    fn test_temp_file_is_cleaned_up() {
        struct RecordPath(std::sync::Mutex<Option<std::path::PathBuf>>);
        impl TextExtractor for RecordPath {
            fn extract(&self, path: &Path) -> Result<String, PipelineError> {
                assert!(path.exists());
                *self.0.lock().unwrap() = Some(path.to_path_buf());
                Ok("text".to_string())
            }
        }

        let recorder = Arc::new(RecordPath(std::sync::Mutex::new(None)));
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(extract_document_text(recorder.clone(), Bytes::from_static(b"x")))
            .unwrap();

        let path = recorder.0.lock().unwrap().clone().unwrap();
        assert!(!path.exists());
    }
}
