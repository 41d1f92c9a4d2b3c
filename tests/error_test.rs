//! エラーケーステスト
//!
//! APIレスポンス・設定・入力の異常系

use orgchart_viewer::config::Config;
use orgchart_viewer::error::OrgChartError;
use tempfile::tempdir;

/// 本文がJSONで `error` があればそれがメッセージになる
#[test]
fn test_from_status_json_error() {
    let err = OrgChartError::from_status(404, r#"{"error": "Table not found"}"#);
    match err {
        OrgChartError::Api { status, message } => {
            assert_eq!(status, 404);
            assert_eq!(message, "Table not found");
        }
        other => panic!("Api ではない: {:?}", other),
    }
}

/// JSONでない本文は先頭200文字
#[test]
fn test_from_status_plain_body() {
    let body = "x".repeat(500);
    let err = OrgChartError::from_status(500, &body);
    match err {
        OrgChartError::Api { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message.len(), 200);
        }
        other => panic!("Api ではない: {:?}", other),
    }
}

/// `error` 以外のキーしかないJSONは本文そのまま
#[test]
fn test_from_status_json_without_error_field() {
    let err = OrgChartError::from_status(400, r#"{"detail": "bad"}"#);
    assert!(matches!(err, OrgChartError::Api { message, .. } if message.contains("detail")));
}

/// テーブル取得の 404 はテーブル不在として扱う
#[test]
fn test_for_table_maps_not_found() {
    let err = OrgChartError::from_status(404, r#"{"error": "Table not found"}"#).for_table(7);
    assert!(matches!(err, OrgChartError::TableNotFound(7)));
    assert_eq!(err.to_string(), "テーブルが見つかりません: 7");

    let err = OrgChartError::from_status(500, "boom").for_table(7);
    assert!(matches!(err, OrgChartError::Api { status: 500, .. }));
}

/// 壊れた設定ファイル
#[test]
fn test_broken_config_file() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("config.json");
    std::fs::write(&path, "{ not json").unwrap();

    let result = Config::load_from(&path);
    assert!(matches!(result, Err(OrgChartError::JsonParse(_))));
}

/// 共通ライブラリのエラーはそのまま表示される
#[test]
fn test_common_error_is_transparent() {
    let common = orgchart_common::Error::DuplicateKey("/1/2".into());
    let expected = common.to_string();
    let err: OrgChartError = common.into();
    assert_eq!(err.to_string(), expected);
}

/// OrgChartErrorのDisplay実装確認
#[test]
fn test_error_display() {
    let errors = vec![
        OrgChartError::Config("テスト設定エラー".to_string()),
        OrgChartError::Api { status: 502, message: "Bad Gateway".to_string() },
        OrgChartError::TableNotFound(7),
        OrgChartError::PersonNotFound("Dana".to_string()),
        OrgChartError::InvalidArgument("不正な引数".to_string()),
        OrgChartError::Prompt("入力中断".to_string()),
    ];

    for err in errors {
        let display = format!("{}", err);
        assert!(!display.is_empty(), "エラーメッセージが空: {:?}", err);
    }
}
