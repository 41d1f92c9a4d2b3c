//! テキスト表示とAPIレスポンスのデコード

use orgchart_common::compare::ComparisonReport;
use orgchart_common::expansion::ExpansionState;
use orgchart_common::filter::NodeFilter;
use orgchart_common::render::{render, RenderContext};
use orgchart_common::search::{SearchFields, SearchState};
use orgchart_common::tree::OrgTree;
use orgchart_common::types::{FolderEntry, SearchResponse, TimelineResponse};
use orgchart_viewer::view;
use std::collections::HashSet;

/// `/org-data` の記録済みレスポンス
const ORG_JSON: &str = r#"{
    "name": "Dana", "role": "CEO", "hierarchical_structure": "/1",
    "children": [
        {"name": "Avi", "role": "CTO", "hierarchical_structure": "/1/1", "children": [
            {"name": "Anna", "role": "Engineer", "hierarchical_structure": "/1/1/1"},
            {"name": "Ben", "role": "Engineer", "hierarchical_structure": "/1/1/2", "children": [
                {"name": "Joanne", "role": "Intern", "hierarchical_structure": "/1/1/2/1"}
            ]}
        ]},
        {"name": "Noa", "role": "CFO", "hierarchical_structure": "/1/2"}
    ]
}"#;

fn tree() -> OrgTree {
    OrgTree::from_json(ORG_JSON).expect("org-data のデコード失敗")
}

#[test]
fn test_default_tree_text() {
    let tree = tree();
    let expansion = ExpansionState::new();
    let pass = render(Some(&tree), &RenderContext::new(&expansion));

    let expected = [
        "   [-] Dana (CEO)",
        "   ├── [-] Avi (CTO)",
        "   │   ├──     Anna (Engineer)",
        "   │   └── [+] Ben (Engineer)",
        "   └──     Noa (CFO)",
    ];
    let text = view::render_tree(&pass);
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines, expected);
}

#[test]
fn test_search_marks_current_and_matches() {
    let tree = tree();
    let mut expansion = ExpansionState::new();
    let mut search = SearchState::new();
    search.update(Some(&tree), "ann", SearchFields::NAME);
    for key in search.results() {
        let id = tree.id_of(key).unwrap();
        expansion.reveal(&tree, id);
    }

    let ctx = RenderContext::new(&expansion).with_search(&search);
    let text = view::render_tree(&render(Some(&tree), &ctx));

    assert!(text.contains(">> │   ├──     [Ann]a (Engineer)"), "{}", text);
    assert!(text.contains("*  │       └──     Jo[ann]e (Intern)"), "{}", text);
}

#[test]
fn test_org_mode_and_highlight() {
    let tree = tree();
    let expansion = ExpansionState::new();
    let highlighted: HashSet<String> = ["/1/2".to_string()].into_iter().collect();
    let ctx = RenderContext::new(&expansion)
        .with_org_mode(true)
        .with_highlighted(&highlighted);
    let text = view::render_tree(&render(Some(&tree), &ctx));

    assert!(text.starts_with("   [-] CEO (Dana)"));
    assert!(text.contains("*  └──     CFO (Noa)"));
}

#[test]
fn test_filter_removes_subtree() {
    let tree = tree();
    let mut expansion = ExpansionState::new();
    expansion.expand_all();
    let filter = NodeFilter::new(vec!["Dana".into(), "CFO".into()]);
    let ctx = RenderContext::new(&expansion).with_filter(&filter);
    let pass = render(Some(&tree), &ctx);

    assert_eq!(pass.len(), 2);
    let text = view::render_tree(&pass);
    assert!(!text.contains("Avi"));
    assert!(text.contains("Noa"));
}

#[test]
fn test_empty_pass() {
    let expansion = ExpansionState::new();
    let pass = render(None, &RenderContext::new(&expansion));
    assert_eq!(view::render_tree(&pass), "(表示するノードがありません)\n");
}

#[test]
fn test_reports() {
    let tree = tree();
    let avi = tree.find_by_name("Avi").unwrap();
    let text = view::render_reports(&tree, avi);
    assert!(text.contains("経路: Dana > Avi"));
    assert!(text.contains("直属の部下: 2人"));
    assert!(text.contains("間接の部下: 1人"));
}

#[test]
fn test_folders_text() {
    let folders: Vec<FolderEntry> = serde_json::from_str(
        r#"[{"id": 1, "name": "HQ", "tables": [{"id": 3, "name": "2023", "upload_date": "2023-01-01"}]}]"#,
    )
    .unwrap();
    let text = view::render_folders(&folders);
    assert!(text.contains("HQ (id: 1)"));
    assert!(text.contains("#3"));
    assert!(text.contains("[2023-01-01]"));
    assert_eq!(view::render_folders(&[]), "フォルダがありません\n");
}

#[test]
fn test_search_response_text() {
    let response: SearchResponse = serde_json::from_str(
        r#"{"results": [{"person_id": 17, "name": "Dana", "role": "CEO", "department": "Board", "email": "d@x.io"}]}"#,
    )
    .unwrap();
    assert_eq!(response.results[0].extra["email"], "d@x.io");

    let text = view::render_search(&response);
    assert!(text.contains("17"));
    assert!(text.contains("Board"));
    assert!(text.ends_with("1件\n"));
}

#[test]
fn test_timeline_text() {
    let response: TimelineResponse = serde_json::from_str(
        r#"{
            "timeline": [
                {"table_id": 1, "name": "Q1", "upload_date": "2024-01-01",
                 "org_tree": null,
                 "person_info": {"name": "Anna", "role": "Engineer", "hierarchical_structure": "/1/1/1"}}
            ],
            "cv": [{"role": "Engineer", "startDate": "2024-01-01", "endDate": null}]
        }"#,
    )
    .unwrap();

    let text = view::render_timeline(&response);
    assert!(text.contains("2024-01-01  Q1"));
    assert!(text.contains("2024-01-01 ~ 現在  Engineer"));
}

#[test]
fn test_comparison_text() {
    let report = ComparisonReport::from_json(
        r#"{
            "table1": {"id": 1, "name": "Q1", "upload_date": "2024-01-01T00:00:00"},
            "table2": {"id": 2, "name": "Q2", "upload_date": "2024-01-11T00:00:00"},
            "aggregated_report": {
                "total_employees": {"before": 10, "after": 12},
                "new_employees": 3, "departed_employees": 1,
                "promotion_rate": 10.0, "turnover_rate": 10.0,
                "role_changes": {"total": 2},
                "department_size_changes": {"R&D": {"before": 4, "after": 6, "change": 2}}
            },
            "changes": {"changed": [], "added": [{"name": "Omer", "role": "Intern"}], "removed": []}
        }"#,
    )
    .unwrap();

    let text = view::render_comparison(&report);
    assert!(text.contains("10日"));
    assert!(text.contains("従業員数: 10 → 12"));
    assert!(text.contains("R&D"));
    assert!(text.contains("(+2)"));
    assert!(text.contains("+ Omer"));
}
