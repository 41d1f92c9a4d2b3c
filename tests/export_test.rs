//! JSON/Excel出力の統合テスト

use orgchart_common::compare::ComparisonReport;
use orgchart_common::tree::OrgTree;
use orgchart_common::types::OrgNode;
use orgchart_viewer::cli::ExportFormat;
use orgchart_viewer::export;
use tempfile::tempdir;

fn create_test_tree(width: usize) -> OrgTree {
    let children = (1..=width)
        .map(|i| OrgNode::new(format!("/1/{}", i), format!("Member {}", i), "Engineer"))
        .collect();
    let root = OrgNode::new("/1", "Dana", "CEO").with_children(children);
    OrgTree::from_root(root).expect("ツリー構築失敗")
}

#[test]
fn test_export_json_round_trips() {
    let dir = tempdir().expect("Failed to create temp dir");
    let tree = create_test_tree(3);

    let written = export::export_tree(&tree, &ExportFormat::Json, dir.path(), "org_1").unwrap();
    assert_eq!(written, vec![dir.path().join("org_1.json")]);

    let content = std::fs::read_to_string(&written[0]).unwrap();
    let reloaded = OrgTree::from_json(&content).unwrap();
    assert_eq!(reloaded.len(), 4);
    assert_eq!(reloaded.node(reloaded.root()).name_str(), "Dana");
}

#[test]
fn test_export_excel_to_explicit_file() {
    let dir = tempdir().expect("Failed to create temp dir");
    let tree = create_test_tree(5);
    let output = dir.path().join("chart.xlsx");

    let written = export::export_tree(&tree, &ExportFormat::Excel, &output, "ignored").unwrap();
    assert_eq!(written, vec![output.clone()]);

    let bytes = std::fs::read(&output).unwrap();
    assert_eq!(&bytes[..2], b"PK");
}

#[test]
fn test_export_both_uses_file_stem() {
    let dir = tempdir().expect("Failed to create temp dir");
    let tree = create_test_tree(2);
    let output = dir.path().join("quarter.json");

    let written = export::export_tree(&tree, &ExportFormat::Both, &output, "ignored").unwrap();
    assert_eq!(written, vec![dir.path().join("quarter.json"), dir.path().join("quarter.xlsx")]);
    assert!(written.iter().all(|p| p.exists()));
}

#[test]
fn test_export_comparison() {
    let dir = tempdir().expect("Failed to create temp dir");
    let report = ComparisonReport::from_json(
        r#"{"table1": {"upload_date": "2024-01-01"}, "table2": {"upload_date": "2024-02-01"},
            "changes": {"changed": [], "added": [{"name": "Omer"}], "removed": []}}"#,
    )
    .unwrap();

    let written = export::export_comparison(&report, &ExportFormat::Both, dir.path(), "compare_1_2").unwrap();
    assert_eq!(written.len(), 2);

    let json = std::fs::read_to_string(&written[0]).unwrap();
    let reloaded = ComparisonReport::from_json(&json).unwrap();
    assert_eq!(reloaded, report);
}

#[test]
fn test_output_paths_for_both_in_directory() {
    let dir = tempdir().expect("Failed to create temp dir");
    let (json, xlsx) = export::output_paths_for_both(dir.path(), "org_9");
    assert_eq!(json, dir.path().join("org_9.json"));
    assert_eq!(xlsx, dir.path().join("org_9.xlsx"));
}
