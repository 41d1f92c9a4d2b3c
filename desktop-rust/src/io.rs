use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use orgchart_common::export::excel_core::org_tree_workbook;
use orgchart_common::OrgTree;

/// ルートノードの JSON（`/org-data` のレスポンスと同じ形）を読む
pub fn load_org_tree(path: &Path) -> Result<OrgTree> {
    let content = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let tree = OrgTree::from_json(&content).with_context(|| format!("parse {}", path.display()))?;
    Ok(tree)
}

pub fn save_org_tree(path: &Path, tree: &OrgTree) -> Result<()> {
    let content = serde_json::to_string_pretty(&tree.to_org_node(tree.root()))?;
    fs::write(path, content).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

pub fn write_excel(path: &Path, tree: &OrgTree) -> Result<()> {
    let bytes = org_tree_workbook(tree, "Org Chart").context("build workbook")?;
    fs::write(path, bytes).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

/// 元ファイルと同じ場所に拡張子を替えたパス（org.json → org.xlsx）
pub fn default_export_path(source: &Path, extension: &str) -> PathBuf {
    let stem = source
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or("orgchart");
    source.with_file_name(format!("{stem}.{extension}"))
}
