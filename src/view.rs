//! 端末向けのテキスト表示
//!
//! 描画パスを罫線付きのツリーとして書き出す。検索一致部分は `[...]`、
//! 現在の検索結果は `>>`、一致・ハイライトは `*` で示す。

use orgchart_common::compare::{ChangeKind, ComparisonReport};
use orgchart_common::language::truncate;
use orgchart_common::render::{Decoration, LabelPart, RenderPass, RenderedNode};
use orgchart_common::tree::{NodeId, OrgTree};
use orgchart_common::types::{FolderEntry, SearchResponse, TimelineResponse};
use std::fmt::Write;

/// 役職・名前の表示上限
const LABEL_WIDTH: usize = 40;

fn label(parts: &[LabelPart]) -> String {
    parts
        .iter()
        .map(|p| if p.matched { format!("[{}]", p.text) } else { p.text.clone() })
        .collect()
}

fn marker(decoration: Decoration) -> &'static str {
    match decoration {
        Decoration::Current => ">> ",
        Decoration::Match | Decoration::Highlighted => "*  ",
        Decoration::None => "   ",
    }
}

fn disclosure(node: &RenderedNode) -> &'static str {
    match (node.has_disclosure, node.expanded) {
        (false, _) => "    ",
        (true, true) => "[-] ",
        (true, false) => "[+] ",
    }
}

fn is_last_child(pass: &RenderPass, index: usize) -> bool {
    pass.get(index)
        .and_then(|n| n.parent)
        .and_then(|p| pass.get(p))
        .map_or(true, |p| p.children.last() == Some(&index))
}

/// 罫線の接頭辞（祖先ごとに "│   " か空白）
fn guide(pass: &RenderPass, index: usize) -> String {
    let Some(node) = pass.get(index) else {
        return String::new();
    };
    if node.parent.is_none() {
        return String::new();
    }

    let mut columns = Vec::new();
    let mut cursor = node.parent;
    while let Some(i) = cursor {
        let ancestor = &pass.nodes()[i];
        if ancestor.parent.is_some() {
            columns.push(if is_last_child(pass, i) { "    " } else { "│   " });
        }
        cursor = ancestor.parent;
    }
    columns.reverse();

    let mut out = columns.concat();
    out.push_str(if is_last_child(pass, index) { "└── " } else { "├── " });
    out
}

/// 描画パス全体をテキストに
pub fn render_tree(pass: &RenderPass) -> String {
    if pass.is_empty() {
        return "(表示するノードがありません)\n".to_string();
    }

    let mut out = String::new();
    for (i, node) in pass.nodes().iter().enumerate() {
        let primary = truncate(Some(label(&node.primary).as_str()), LABEL_WIDTH);
        let secondary = truncate(Some(label(&node.secondary).as_str()), LABEL_WIDTH);
        let _ = writeln!(
            out,
            "{}{}{}{} ({})",
            marker(node.decoration),
            guide(pass, i),
            disclosure(node),
            primary,
            secondary
        );
    }
    out
}

pub fn render_folders(folders: &[FolderEntry]) -> String {
    if folders.is_empty() {
        return "フォルダがありません\n".to_string();
    }
    let mut out = String::new();
    for folder in folders {
        let _ = writeln!(out, "📁 {} (id: {})", folder.name, folder.id);
        for table in &folder.tables {
            let date = table.upload_date.as_deref().unwrap_or("-");
            let _ = writeln!(out, "    #{:<5} {}  [{}]", table.id, table.name, date);
        }
    }
    out
}

pub fn render_search(response: &SearchResponse) -> String {
    if response.results.is_empty() {
        return "該当なし\n".to_string();
    }
    let mut out = String::new();
    for person in &response.results {
        let id = person.person_id.as_ref().map(|v| v.to_string()).unwrap_or_else(|| "-".into());
        let department = person.department.as_deref().unwrap_or("-");
        let _ = writeln!(out, "{:<10} {:<24} {:<24} {}", id, person.name, person.role, department);
    }
    let _ = writeln!(out, "{}件", response.results.len());
    out
}

/// 直属・間接の部下
pub fn render_reports(tree: &OrgTree, id: NodeId) -> String {
    let node = tree.node(id);
    let mut out = String::new();
    let _ = writeln!(out, "{} ({})", node.display_name(), node.display_role());

    let path: Vec<&str> = tree.path_to(id).into_iter().map(|p| tree.node(p).display_name()).collect();
    let _ = writeln!(out, "  経路: {}", path.join(" > "));

    let direct = tree.direct_reports(id);
    let _ = writeln!(out, "  直属の部下: {}人", direct.len());
    for child in &direct {
        let c = tree.node(*child);
        let _ = writeln!(out, "    - {} ({})", c.display_name(), c.display_role());
    }
    let _ = writeln!(out, "  間接の部下: {}人", tree.indirect_reports(id).len());
    out
}

pub fn render_timeline(response: &TimelineResponse) -> String {
    let mut out = String::new();
    if response.timeline.is_empty() {
        out.push_str("在籍記録がありません\n");
    }
    for entry in &response.timeline {
        let role = entry
            .person_info
            .as_ref()
            .map(|p| p.display_role().to_string())
            .unwrap_or_else(|| "-".into());
        let _ = writeln!(out, "{}  {:<20} {}", entry.upload_date, entry.name, role);
    }
    if let Some(cv) = &response.cv {
        out.push_str("\n経歴:\n");
        for item in cv {
            let end = item.end_date.as_deref().unwrap_or("現在");
            let _ = writeln!(out, "  {} ~ {}  {}", item.start_date, end, item.role);
        }
    }
    out
}

pub fn render_comparison(report: &ComparisonReport) -> String {
    let mut out = String::new();
    let name = |t: &orgchart_common::compare::TableSnapshot| t.name.clone().unwrap_or_else(|| "?".into());
    let _ = writeln!(
        out,
        "{} ({}) → {} ({})  {}日",
        name(&report.table1),
        report.table1.upload_date,
        name(&report.table2),
        report.table2.upload_date,
        report.time_difference_days()
    );

    if let Some(agg) = &report.aggregated_report {
        if let Some(total) = agg.total_employees {
            let _ = writeln!(out, "従業員数: {} → {}", total.before, total.after);
        }
        let _ = writeln!(out, "入社: {}  退社: {}", agg.new_employees, agg.departed_employees);
        let _ = writeln!(out, "昇進率: {:.1}%  離職率: {:.1}%", agg.promotion_rate, agg.turnover_rate);
    }

    let shares = report.structure_breakdown();
    if !shares.is_empty() {
        out.push_str("\n構造変化:\n");
        for share in shares {
            let _ = writeln!(out, "  {:<16} {:>5} ({}%)", share.name, share.value, share.percent);
        }
    }

    let departments = report.department_size_rows();
    if !departments.is_empty() {
        out.push_str("\n部署規模:\n");
        for row in departments {
            let _ = writeln!(out, "  {:<20} {:>5} → {:<5} ({:+})", row.name, row.before, row.after, row.change);
        }
    }

    let changes = report.change_rows();
    if !changes.is_empty() {
        out.push_str("\n個別の変更:\n");
        for row in changes {
            let sign = match row.kind {
                ChangeKind::Changed => "~",
                ChangeKind::Added => "+",
                ChangeKind::Removed => "-",
            };
            let _ = writeln!(out, "  {} {}", sign, row.name);
            for detail in row.details {
                let _ = writeln!(out, "      {}", detail);
            }
        }
    }
    out
}
