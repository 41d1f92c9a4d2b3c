//! 対話入力（テーブル選択・更新前の確認）

use crate::error::{OrgChartError, Result};
use dialoguer::{Confirm, Select};
use orgchart_common::types::FolderEntry;

/// 選択肢の一覧（テーブルID, 表示名）。フォルダ順・テーブル順
pub fn table_choices(folders: &[FolderEntry]) -> Vec<(i64, String)> {
    folders
        .iter()
        .flat_map(|folder| {
            folder.tables.iter().map(move |table| {
                let date = table
                    .upload_date
                    .as_deref()
                    .map(|d| d.get(..10).unwrap_or(d))
                    .unwrap_or("-");
                (table.id, format!("{} / {} ({})", folder.name, table.name, date))
            })
        })
        .collect()
}

/// 対話式でテーブルを選ぶ。テーブルが無ければ None
pub fn select_table(folders: &[FolderEntry]) -> Result<Option<i64>> {
    let choices = table_choices(folders);
    if choices.is_empty() {
        println!("⚠ テーブルがありません。先に upload してください");
        return Ok(None);
    }

    let labels: Vec<&str> = choices.iter().map(|(_, label)| label.as_str()).collect();
    let selected = Select::new()
        .with_prompt("📋 テーブルを選択")
        .items(&labels)
        .default(0)
        .interact_opt()
        .map_err(|e| OrgChartError::Prompt(e.to_string()))?;

    Ok(selected.map(|i| choices[i].0))
}

/// y/N の確認。`assume_yes` なら聞かずに true
pub fn confirm(message: &str, assume_yes: bool) -> Result<bool> {
    if assume_yes {
        return Ok(true);
    }
    Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| OrgChartError::Prompt(e.to_string()))
}
