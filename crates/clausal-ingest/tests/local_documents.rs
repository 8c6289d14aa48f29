//! Integration tests for clausal-ingest
//!
//! These tests ingest documents from the local filesystem and chunk them.

use clausal_domain::ContentType;
use clausal_ingest::{Chunker, IngestConfig, IngestError, Ingestor};
use std::io::Write;
use tempfile::TempDir;

fn write_file(dir: &TempDir, name: &str, bytes: &[u8]) -> String {
    let path = dir.path().join(name);
    std::fs::write(&path, bytes).unwrap();
    path.to_string_lossy().into_owned()
}

fn ingestor() -> Ingestor {
    Ingestor::new(IngestConfig::default()).unwrap()
}

#[tokio::test]
async fn test_ingest_plain_text() {
    let dir = TempDir::new().unwrap();
    let path = write_file(
        &dir,
        "policy.txt",
        b"Section 1.  Definitions\r\n\r\n\r\nThe  grace period is thirty days.\n",
    );

    let doc = ingestor().ingest(&path).await.unwrap();
    assert_eq!(doc.content_type, ContentType::PlainText);
    assert_eq!(doc.text, "Section 1. Definitions\n\nThe grace period is thirty days.");
    assert_eq!(doc.source, path);
}

#[tokio::test]
async fn test_ingest_email_strips_transport_headers() {
    let dir = TempDir::new().unwrap();
    let path = write_file(
        &dir,
        "notice.eml",
        b"Received: by mx\nFrom: hr@example.com\nTo: staff@example.com\nSubject: Leave\n\nAnnual leave is 24 days.",
    );

    let doc = ingestor().ingest(&path).await.unwrap();
    assert_eq!(doc.content_type, ContentType::Email);
    assert!(doc.text.starts_with("From: hr@example.com\nSubject: Leave"));
    assert!(!doc.text.contains("Received"));
    assert!(doc.text.ends_with("Annual leave is 24 days."));
}

#[tokio::test]
async fn test_ingest_docx() {
    let dir = TempDir::new().unwrap();
    let mut buf = Vec::new();
    {
        let mut zip = zip::ZipWriter::new(std::io::Cursor::new(&mut buf));
        zip.start_file("word/document.xml", zip::write::SimpleFileOptions::default())
            .unwrap();
        zip.write_all(
            br#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body><w:p><w:r><w:t>Clause 4.2</w:t></w:r></w:p><w:p><w:r><w:t>Maternity cover after 24 months.</w:t></w:r></w:p></w:body></w:document>"#,
        )
        .unwrap();
        zip.finish().unwrap();
    }
    let path = write_file(&dir, "contract.docx", &buf);

    let doc = ingestor().ingest(&path).await.unwrap();
    assert_eq!(doc.content_type, ContentType::Docx);
    assert_eq!(doc.text, "Clause 4.2\n\nMaternity cover after 24 months.");
}

#[tokio::test]
async fn test_reingesting_same_content_gives_same_id() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "a.txt", b"Same words.");
    let first = ingestor().ingest(&path).await.unwrap();
    let second = ingestor().ingest(&path).await.unwrap();
    assert_eq!(first.id, second.id);

    std::fs::write(&path, b"Changed words.").unwrap();
    let third = ingestor().ingest(&path).await.unwrap();
    assert_ne!(first.id, third.id);
}

#[tokio::test]
async fn test_oversized_document_is_parse_error() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "big.txt", &vec![b'a'; 2048]);
    let ingestor = Ingestor::new(IngestConfig {
        max_document_bytes: 1024,
        ..Default::default()
    })
    .unwrap();

    let err = ingestor.ingest(&path).await.unwrap_err();
    assert!(matches!(err, IngestError::Parse { .. }));
    assert!(err.to_string().contains("limit"));
}

#[tokio::test]
async fn test_corrupt_pdf_is_parse_error() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "broken.pdf", b"%PDF-1.4 this is not really a pdf");
    let err = ingestor().ingest(&path).await.unwrap_err();
    assert!(matches!(err, IngestError::Parse { .. }));
}

#[tokio::test]
async fn test_binary_without_known_type_is_parse_error() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "blob.bin", &[0xff, 0xfe, 0x00, 0x9f, 0x80]);
    let err = ingestor().ingest(&path).await.unwrap_err();
    assert!(matches!(err, IngestError::Parse { .. }));
}

#[tokio::test]
async fn test_ingest_then_chunk() {
    let dir = TempDir::new().unwrap();
    let body: String = (1..=30)
        .map(|n| format!("{}. Clause number {} applies to members.", n, n))
        .collect::<Vec<_>>()
        .join("\n\n");
    let path = write_file(&dir, "long.txt", body.as_bytes());

    let doc = ingestor().ingest(&path).await.unwrap();
    let chunks = Chunker::new(40, 8).chunk(&doc);

    assert!(chunks.len() > 1);
    assert!(chunks.iter().all(|c| c.word_count <= 40));
    assert!(chunks[0].text.starts_with("1. Clause number 1"));
    assert!(chunks.last().unwrap().text.ends_with("30 applies to members."));
}
