//! PDF text extraction.
//!
//! Pages are extracted in document order and each one is followed by `\n`,
//! including the last. A document that yields no text at all is an error,
//! never an empty string: an empty resume would let the model invent one.
//! Page text is kept exactly as the parser returns it.
//! Password-protected documents are rejected.

use std::path::Path;

use async_trait::async_trait;
use tracing::info;

use crate::errors::AppError;

const PDF_MAGIC: &[u8] = b"%PDF-";

/// Turns a stored resume file into plain text.
///
/// The optimizer holds an `Arc<dyn TextExtractor>` so tests can bypass PDF parsing.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    async fn extract(&self, path: &Path) -> Result<String, AppError>;
}

/// `pdf-extract` backed extractor. Parsing runs on the blocking pool.
pub struct PdfTextExtractor;

#[async_trait]
impl TextExtractor for PdfTextExtractor {
    async fn extract(&self, path: &Path) -> Result<String, AppError> {
        extract_text(path).await
    }
}

/// Reads the PDF at `path` and returns the text of all pages.
pub async fn extract_text(path: &Path) -> Result<String, AppError> {
    let bytes = tokio::fs::read(path).await.map_err(|e| {
        AppError::Extraction(format!("could not open '{}': {e}", path.display()))
    })?;

    // pdf-extract can panic on hostile input; the JoinError carries that out.
    let text = tokio::task::spawn_blocking(move || extract_text_from_bytes(&bytes))
        .await
        .map_err(|e| AppError::Extraction(format!("PDF parser aborted: {e}")))??;

    info!(
        "Extracted {} characters from '{}'",
        text.chars().count(),
        path.display()
    );
    Ok(text)
}

/// Extracts text from an in-memory PDF. CPU-bound; call from a blocking context.
pub fn extract_text_from_bytes(bytes: &[u8]) -> Result<String, AppError> {
    if !bytes.starts_with(PDF_MAGIC) {
        return Err(AppError::Extraction(
            "file is not a valid PDF (missing %PDF- header)".to_string(),
        ));
    }

    let pages = pdf_extract::extract_text_from_mem_by_pages(bytes)
        .map_err(|e| AppError::Extraction(format!("could not parse PDF: {e}")))?;

    join_pages(pages)
}

/// Concatenates page texts, one trailing newline per page.
fn join_pages(pages: Vec<String>) -> Result<String, AppError> {
    if pages.is_empty() {
        return Err(AppError::Extraction("PDF has no pages".to_string()));
    }

    if pages.iter().all(|p| p.trim().is_empty()) {
        return Err(AppError::Extraction(
            "PDF contains no extractable text (scanned or image-only?)".to_string(),
        ));
    }

    let mut text = String::new();
    for page in &pages {
        text.push_str(page);
        text.push('\n');
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_pages_appends_newline_after_every_page() {
        let text = join_pages(vec!["Jane Doe".to_string(), "Education".to_string()]).unwrap();
        assert_eq!(text, "Jane Doe\nEducation\n");
    }

    #[test]
    fn test_join_pages_keeps_blank_pages_in_order() {
        let text = join_pages(vec![
            "first".to_string(),
            "   ".to_string(),
            "third".to_string(),
        ])
        .unwrap();
        assert_eq!(text, "first\n   \nthird\n");
    }

    #[test]
    fn test_join_pages_keeps_page_text_unmodified() {
        let text = join_pages(vec!["  Jane Doe\n".to_string()]).unwrap();
        assert_eq!(text, "  Jane Doe\n\n");
    }

    #[test]
    fn test_join_pages_grows_with_page_count() {
        let one = join_pages(vec!["Experience".to_string()]).unwrap();
        let two = join_pages(vec!["Experience".to_string(), "Skills".to_string()]).unwrap();
        assert!(two.len() >= one.len());
    }

    #[test]
    fn test_join_pages_rejects_zero_pages() {
        assert!(matches!(join_pages(vec![]), Err(AppError::Extraction(_))));
    }

    #[test]
    fn test_join_pages_rejects_image_only_document() {
        let result = join_pages(vec!["\n\n".to_string(), String::new()]);
        assert!(matches!(result, Err(AppError::Extraction(_))));
    }

    #[test]
    fn test_non_pdf_bytes_are_rejected() {
        let result = extract_text_from_bytes(b"Jane Doe, Software Engineer");
        assert!(matches!(result, Err(AppError::Extraction(_))));
    }

    #[test]
    fn test_corrupt_pdf_is_rejected() {
        let result = extract_text_from_bytes(b"%PDF-1.7\n%%garbage without xref\n%%EOF");
        assert!(matches!(result, Err(AppError::Extraction(_))));
    }

    /// One-page PDF protected by the standard security handler (RC4, rev 2)
    /// with a user password, so the empty password does not open it.
    fn password_protected_pdf() -> Vec<u8> {
        let content: Vec<u8> = (0u8..48).map(|i| i.wrapping_mul(37) ^ 0xA5).collect();
        let hex32 = |byte: u8| format!("{byte:02X}").repeat(32);

        let objects: Vec<Vec<u8>> = vec![
            b"<< /Type /Catalog /Pages 2 0 R >>".to_vec(),
            b"<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_vec(),
            b"<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] /Contents 4 0 R \
              /Resources << /Font << /F1 5 0 R >> >> >>"
                .to_vec(),
            [
                format!("<< /Length {} >>\nstream\n", content.len()).into_bytes(),
                content,
                b"\nendstream".to_vec(),
            ]
            .concat(),
            b"<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>".to_vec(),
            format!(
                "<< /Filter /Standard /V 1 /R 2 /O <{}> /U <{}> /P -44 >>",
                hex32(0x3C),
                hex32(0x11)
            )
            .into_bytes(),
        ];

        let mut pdf = b"%PDF-1.4\n".to_vec();
        let mut offsets = Vec::new();
        for (i, body) in objects.iter().enumerate() {
            offsets.push(pdf.len());
            pdf.extend_from_slice(format!("{} 0 obj\n", i + 1).as_bytes());
            pdf.extend_from_slice(body);
            pdf.extend_from_slice(b"\nendobj\n");
        }

        let xref_at = pdf.len();
        pdf.extend_from_slice(format!("xref\n0 {}\n", objects.len() + 1).as_bytes());
        pdf.extend_from_slice(b"0000000000 65535 f \n");
        for offset in offsets {
            pdf.extend_from_slice(format!("{offset:010} 00000 n \n").as_bytes());
        }
        let id = "0123456789ABCDEF0123456789ABCDEF";
        pdf.extend_from_slice(
            format!(
                "trailer\n<< /Size {} /Root 1 0 R /Encrypt 6 0 R /ID [<{id}> <{id}>] >>\n\
                 startxref\n{xref_at}\n%%EOF\n",
                objects.len() + 1
            )
            .as_bytes(),
        );
        pdf
    }

    #[test]
    fn test_password_protected_pdf_is_rejected() {
        let result = extract_text_from_bytes(&password_protected_pdf());
        match result {
            Err(AppError::Extraction(_)) => {}
            other => panic!("expected an extraction error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_password_protected_upload_yields_no_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("locked.pdf");
        std::fs::write(&path, password_protected_pdf()).unwrap();

        let result = extract_text(&path).await;
        assert!(matches!(result, Err(AppError::Extraction(_))));
    }

    #[tokio::test]
    async fn test_missing_file_is_an_extraction_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = extract_text(&dir.path().join("absent.pdf")).await;
        assert!(matches!(result, Err(AppError::Extraction(_))));
    }

    #[tokio::test]
    async fn test_empty_file_is_an_extraction_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.pdf");
        std::fs::write(&path, b"").unwrap();
        let result = extract_text(&path).await;
        assert!(matches!(result, Err(AppError::Extraction(_))));
    }

    #[tokio::test]
    async fn test_extracts_text_from_rendered_resume() {
        let pdf = crate::render::render_pdf("# Jane Doe\n\nSoftware Engineer with Python").unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("resume.pdf");
        std::fs::write(&path, pdf).unwrap();

        let text = extract_text(&path).await.unwrap();
        assert!(!text.trim().is_empty());
        assert!(text.ends_with('\n'));
        assert!(text.contains("Jane"));
    }
}
