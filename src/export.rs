use crate::cli::ExportFormat;
use crate::error::Result;
use orgchart_common::compare::ComparisonReport;
use orgchart_common::export::excel_core;
use orgchart_common::tree::OrgTree;
use std::path::{Path, PathBuf};
use tracing::debug;

/// 組織表シートの名前
const ORG_SHEET: &str = "Org Chart";

fn output_path_for_format(output: &Path, title: &str, extension: &str) -> PathBuf {
    if output.is_dir() || output.extension().is_none() {
        output.join(format!("{}.{}", title, extension))
    } else {
        output.to_path_buf()
    }
}

/// JSONとExcelを同じ名前で並べる
pub fn output_paths_for_both(output: &Path, title: &str) -> (PathBuf, PathBuf) {
    if output.is_dir() || output.extension().is_none() {
        (
            output.join(format!("{}.json", title)),
            output.join(format!("{}.xlsx", title)),
        )
    } else {
        let parent = output.parent().unwrap_or_else(|| Path::new("."));
        let stem = output.file_stem().and_then(|s| s.to_str()).unwrap_or(title);
        (
            parent.join(format!("{}.json", stem)),
            parent.join(format!("{}.xlsx", stem)),
        )
    }
}

fn write_json<T: serde::Serialize>(value: &T, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    std::fs::write(path, json)?;
    debug!(path = %path.display(), "json written");
    Ok(())
}

fn write_bytes(bytes: &[u8], path: &Path) -> Result<()> {
    std::fs::write(path, bytes)?;
    debug!(path = %path.display(), bytes = bytes.len(), "workbook written");
    Ok(())
}

/// 組織ツリーを書き出す。書いたファイルの一覧を返す
pub fn export_tree(tree: &OrgTree, format: &ExportFormat, output: &Path, title: &str) -> Result<Vec<PathBuf>> {
    let root = tree.to_org_node(tree.root());
    let mut written = Vec::new();

    match format {
        ExportFormat::Json => {
            let path = output_path_for_format(output, title, "json");
            write_json(&root, &path)?;
            written.push(path);
        }
        ExportFormat::Excel => {
            let path = output_path_for_format(output, title, "xlsx");
            write_bytes(&excel_core::org_tree_workbook(tree, ORG_SHEET)?, &path)?;
            written.push(path);
        }
        ExportFormat::Both => {
            let (json_path, excel_path) = output_paths_for_both(output, title);
            write_json(&root, &json_path)?;
            write_bytes(&excel_core::org_tree_workbook(tree, ORG_SHEET)?, &excel_path)?;
            written.push(json_path);
            written.push(excel_path);
        }
    }
    Ok(written)
}

/// 比較レポートを書き出す
pub fn export_comparison(
    report: &ComparisonReport,
    format: &ExportFormat,
    output: &Path,
    title: &str,
) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();

    match format {
        ExportFormat::Json => {
            let path = output_path_for_format(output, title, "json");
            write_json(report, &path)?;
            written.push(path);
        }
        ExportFormat::Excel => {
            let path = output_path_for_format(output, title, "xlsx");
            write_bytes(&excel_core::comparison_workbook(report)?, &path)?;
            written.push(path);
        }
        ExportFormat::Both => {
            let (json_path, excel_path) = output_paths_for_both(output, title);
            write_json(report, &json_path)?;
            write_bytes(&excel_core::comparison_workbook(report)?, &excel_path)?;
            written.push(json_path);
            written.push(excel_path);
        }
    }
    Ok(written)
}
