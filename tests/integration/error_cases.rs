//! Integration tests for error handling and edge cases.

use pdfmerge::error::GENERIC_FAILURE_MESSAGE;
use pdfmerge::io::{PdfReader, PdfWriter};
use pdfmerge::merge::{Merger, merge_pdfs};
use pdfmerge::{MergeConfig, MergeError, MergeSession, SizeLimit};
use rstest::rstest;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::common::{broken_input, input};

#[rstest]
#[case(0)]
#[case(1)]
fn test_too_few_inputs(#[case] count: usize) {
    let inputs: Vec<_> = (0..count).map(|i| input(&format!("F{i}"), 1)).collect();

    let err = merge_pdfs(&inputs).unwrap_err();

    assert!(matches!(err, MergeError::NotEnoughInputs { count: c } if c == count));
}

#[test]
fn test_one_bad_input_fails_the_whole_merge() {
    let inputs = [
        input("A", 1),
        input("B", 2),
        broken_input("broken.pdf"),
        input("D", 1),
    ];

    let err = Merger::new().merge(&inputs).unwrap_err();

    match &err {
        MergeError::Decode { index, name, .. } => {
            assert_eq!(*index, 2);
            assert_eq!(name, "broken.pdf");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(err.user_message(), GENERIC_FAILURE_MESSAGE);
    assert_eq!(err.exit_code(), 3);
}

#[test]
fn test_empty_file_is_a_decode_error() {
    let inputs = [input("A", 1), pdfmerge::InputFile::new("empty.pdf", Vec::new())];
    assert!(merge_pdfs(&inputs).unwrap_err().is_decode());
}

#[tokio::test]
async fn test_missing_input_file() {
    let result = PdfReader::new()
        .read_all(&[PathBuf::from("/nonexistent/file.pdf")])
        .await;

    let err = result.unwrap_err();
    assert!(matches!(err, MergeError::ReadFailed { .. }));
    assert_eq!(err.exit_code(), 2);
}

#[tokio::test]
async fn test_enforced_limit_rejects_before_decoding() {
    let config = MergeConfig {
        size_limit: SizeLimit::Enforce,
        max_file_size: 32,
        ..Default::default()
    };
    let session = MergeSession::new(config).unwrap();
    // The broken input is small enough to pass the check; the oversized
    // valid one must be reported first.
    session.add_files([input("Big", 3), broken_input("x")]);

    let err = session.merge().await.unwrap_err();

    match err {
        MergeError::FileTooLarge { name, limit, .. } => {
            assert_eq!(name, "Big.pdf");
            assert_eq!(limit, 32);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(!session.is_busy());
}

#[tokio::test]
async fn test_advisory_limit_does_not_block() {
    let config = MergeConfig {
        size_limit: SizeLimit::Advisory,
        max_file_size: 1,
        ..Default::default()
    };
    let session = MergeSession::new(config).unwrap();
    session.add_files([input("A", 1), input("B", 1)]);

    let download = session.merge().await.unwrap();
    assert_eq!(download.statistics.total_pages, 2);
}

#[test]
fn test_invalid_config_is_rejected() {
    assert!(MergeConfig::from_json(r#"{ "file_name": "" }"#).is_err());
    assert!(MergeConfig::from_json(r#"{ "unknown": true }"#).is_err());
    assert!(MergeConfig::from_json(r#"{ "size_limit": "sometimes" }"#).is_err());
}

#[tokio::test]
async fn test_existing_output_is_kept() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("merged.pdf");
    std::fs::write(&output, b"previous").unwrap();

    let bytes = merge_pdfs(&[input("A", 1), input("B", 1)]).unwrap();
    let err = PdfWriter::new().save(&bytes, &output).await.unwrap_err();

    assert!(matches!(err, MergeError::OutputExists { .. }));
    assert_eq!(std::fs::read(&output).unwrap(), b"previous");
}

#[tokio::test]
async fn test_missing_output_directory() {
    let writer = PdfWriter::new();
    let result = writer
        .can_write(Path::new("/nonexistent/dir/merged.pdf"))
        .await;
    assert!(matches!(result, Err(MergeError::InvalidConfig { .. })));
}
