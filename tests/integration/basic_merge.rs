//! Integration tests for successful merges.

use lopdf::{Document, Object};
use pdfmerge::io::{PdfReader, PdfWriter};
use pdfmerge::merge::{Merger, merge_pdfs};
use pdfmerge::{InputFile, MergeConfig, MergeSession};
use tempfile::TempDir;

use crate::common::{input, page_labels, pdf_with_nested_tree, pdf_with_pages, write_fixture};

#[test]
fn test_merge_keeps_input_and_page_order() {
    let inputs = [input("A", 2), input("B", 1), input("C", 3)];

    let bytes = merge_pdfs(&inputs).unwrap();

    assert_eq!(
        page_labels(&bytes),
        ["A-Page-1", "A-Page-2", "B-Page-1", "C-Page-1", "C-Page-2", "C-Page-3"]
    );
}

#[test]
fn test_reordered_inputs_reorder_output() {
    let bytes = merge_pdfs(&[input("C", 1), input("A", 1)]).unwrap();
    assert_eq!(page_labels(&bytes), ["C-Page-1", "A-Page-1"]);
}

#[test]
fn test_rerun_is_structurally_equivalent() {
    let inputs = [input("A", 2), input("B", 2)];
    let merger = Merger::new();

    let first = merger.merge(&inputs).unwrap();
    let second = merger.merge(&inputs).unwrap();

    assert_eq!(page_labels(&first.bytes), page_labels(&second.bytes));
    assert_eq!(first.statistics.total_pages, second.statistics.total_pages);
    assert_eq!(
        first.statistics.pages_per_file,
        second.statistics.pages_per_file
    );
}

#[test]
fn test_zero_page_input_contributes_nothing() {
    let inputs = [input("A", 2), input("Empty", 0), input("B", 1)];

    let merged = Merger::new().merge(&inputs).unwrap();

    assert_eq!(merged.statistics.total_pages, 3);
    assert_eq!(merged.statistics.pages_per_file, [2, 0, 1]);
    assert_eq!(
        page_labels(&merged.bytes),
        ["A-Page-1", "A-Page-2", "B-Page-1"]
    );
}

#[test]
fn test_same_file_twice() {
    let a = input("A", 1);
    let bytes = merge_pdfs(&[a.clone(), a]).unwrap();
    assert_eq!(page_labels(&bytes), ["A-Page-1", "A-Page-1"]);
}

#[test]
fn test_inherited_attributes_survive_the_copy() {
    let inputs = [
        InputFile::new("nested.pdf", pdf_with_nested_tree("N", 2)),
        input("B", 1),
    ];

    let bytes = merge_pdfs(&inputs).unwrap();
    let doc = Document::load_mem(&bytes).unwrap();
    let pages = doc.get_pages();

    for page_id in pages.values().take(2) {
        let page = doc.get_dictionary(*page_id).unwrap();
        assert_eq!(page.get(b"Rotate").unwrap().as_i64().unwrap(), 90);
        assert!(page.has(b"MediaBox"));

        let resources = match page.get(b"Resources").unwrap() {
            Object::Reference(id) => doc.get_dictionary(*id).unwrap(),
            Object::Dictionary(dict) => dict,
            other => panic!("unexpected resources: {other:?}"),
        };
        assert!(resources.has(b"Font"));
    }

    // The page from the flat input is not affected by the nested one.
    let last = doc.get_dictionary(pages[&3]).unwrap();
    assert!(!last.has(b"Rotate"));
    assert_eq!(page_labels(&bytes), ["N-Page-1", "N-Page-2", "B-Page-1"]);
}

#[tokio::test]
async fn test_merge_files_from_disk() {
    let dir = TempDir::new().unwrap();
    let paths = vec![
        write_fixture(dir.path(), "second.pdf", &pdf_with_pages("S", 1)),
        write_fixture(dir.path(), "first.pdf", &pdf_with_pages("F", 2)),
    ];

    let inputs = PdfReader::new().read_all(&paths).await.unwrap();
    let merged = Merger::new().merge_async(inputs).await.unwrap();

    let output = dir.path().join("merged.pdf");
    PdfWriter::new()
        .save(&merged.bytes, &output)
        .await
        .unwrap();

    let written = std::fs::read(&output).unwrap();
    assert_eq!(page_labels(&written), ["S-Page-1", "F-Page-1", "F-Page-2"]);
}

#[tokio::test]
async fn test_session_download_to_directory() {
    let dir = TempDir::new().unwrap();
    let config = MergeConfig {
        file_name: "combined.pdf".to_string(),
        ..Default::default()
    };
    let session = MergeSession::new(config).unwrap();
    session.add_files([input("A", 1), input("B", 1)]);

    let download = session.merge().await.unwrap();
    assert_eq!(download.file_name, "combined.pdf");
    assert_eq!(download.content_type(), "application/pdf");
    assert_eq!(&*session.registry().fetch(&download.url).unwrap(), &*download.bytes);

    let stats = download
        .save_to_dir(dir.path(), &PdfWriter::new())
        .await
        .unwrap();
    assert_eq!(stats.output_path, dir.path().join("combined.pdf"));
    assert_eq!(
        page_labels(&std::fs::read(&stats.output_path).unwrap()),
        ["A-Page-1", "B-Page-1"]
    );
}
