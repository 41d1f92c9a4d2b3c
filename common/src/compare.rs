//! 2テーブル比較レポート
//!
//! `/compare` のレスポンスをデコードし、ダッシュボード・CLIで表示する
//! 集計値（日数差・構造変化の内訳・部署規模の変化・個別変更行）を作る。

use crate::error::{Error, Result};
use crate::types::Scalar;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const MILLIS_PER_DAY: f64 = 86_400_000.0;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableSnapshot {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub upload_date: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BeforeAfter {
    pub before: f64,
    pub after: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChangeTotal {
    pub total: i64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DepartmentSize {
    pub before: i64,
    pub after: i64,
    pub change: i64,
    pub percent_change: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregatedReport {
    pub total_employees: Option<BeforeAfter>,
    pub new_employees: i64,
    pub departed_employees: i64,
    pub promotion_rate: f64,
    pub turnover_rate: f64,
    pub department_changes: Option<ChangeTotal>,
    pub role_changes: Option<ChangeTotal>,
    pub rank_changes: Option<ChangeTotal>,
    pub reporting_line_changes: Option<ChangeTotal>,
    pub department_size_changes: BTreeMap<String, DepartmentSize>,
    pub org_depth_analysis: Option<BeforeAfter>,
}

/// 属性が変わった人（フィールド名 → [旧, 新]）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChangedPerson {
    pub name: String,
    pub changes: BTreeMap<String, (serde_json::Value, serde_json::Value)>,
}

/// 追加・削除された人
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonDelta {
    pub name: String,
    pub role: Option<String>,
    pub department: Option<String>,
    pub rank: Option<Scalar>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChangeSet {
    pub changed: Vec<ChangedPerson>,
    pub added: Vec<PersonDelta>,
    pub removed: Vec<PersonDelta>,
}

/// `/compare` のレスポンス
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComparisonReport {
    pub table1: TableSnapshot,
    pub table2: TableSnapshot,
    pub aggregated_report: Option<AggregatedReport>,
    pub changes: Option<ChangeSet>,
}

/// 構造変化の1区分
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StructureShare {
    pub name: &'static str,
    pub value: i64,
    /// 全体に対する割合（小数1桁の文字列）
    pub percent: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DepartmentRow {
    pub name: String,
    pub before: i64,
    pub after: i64,
    pub change: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ChangeKind {
    Changed,
    Added,
    Removed,
}

/// 変更一覧の1行
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChangeRow {
    pub kind: ChangeKind,
    pub name: String,
    pub details: Vec<String>,
}

/// アップロード日時の解釈（ISO 8601 の日時・日付のみ・オフセット付き）
pub fn parse_upload_date(s: &str) -> Result<NaiveDateTime> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.naive_utc());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(dt);
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f") {
        return Ok(dt);
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .ok_or_else(|| Error::InvalidDate(s.to_string()))
}

fn value_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Null => "N/A".to_string(),
        serde_json::Value::String(s) if s.is_empty() => "N/A".to_string(),
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn delta_details(person: &PersonDelta) -> Vec<String> {
    let or_na = |v: Option<&str>| v.filter(|s| !s.is_empty()).unwrap_or("N/A").to_string();
    vec![
        format!("Role: {}", or_na(person.role.as_deref())),
        format!("Department: {}", or_na(person.department.as_deref())),
        format!(
            "Rank: {}",
            person.rank.as_ref().map_or_else(|| "N/A".to_string(), |r| r.to_string())
        ),
    ]
}

impl ComparisonReport {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// 2テーブルのアップロード日の差（日、切り上げ）。解釈できなければ 0
    pub fn time_difference_days(&self) -> i64 {
        match (
            parse_upload_date(&self.table1.upload_date),
            parse_upload_date(&self.table2.upload_date),
        ) {
            (Ok(a), Ok(b)) => {
                let millis = (b - a).num_milliseconds().abs() as f64;
                (millis / MILLIS_PER_DAY).ceil() as i64
            }
            _ => 0,
        }
    }

    /// 部署・役職・ランク・報告ラインの変化件数と割合
    pub fn structure_breakdown(&self) -> Vec<StructureShare> {
        let Some(report) = &self.aggregated_report else {
            return Vec::new();
        };
        let totals = [
            ("Department", report.department_changes),
            ("Role", report.role_changes),
            ("Rank", report.rank_changes),
            ("Reporting Line", report.reporting_line_changes),
        ]
        .map(|(name, c)| (name, c.map_or(0, |c| c.total)));
        let sum: i64 = totals.iter().map(|(_, v)| v).sum();

        totals
            .into_iter()
            .map(|(name, value)| StructureShare {
                name,
                value,
                percent: if sum == 0 {
                    "0.0".to_string()
                } else {
                    format!("{:.1}", value as f64 / sum as f64 * 100.0)
                },
            })
            .collect()
    }

    /// 部署ごとの人数の変化（部署名が空なら "Unknown"）
    pub fn department_size_rows(&self) -> Vec<DepartmentRow> {
        let Some(report) = &self.aggregated_report else {
            return Vec::new();
        };
        report
            .department_size_changes
            .iter()
            .map(|(name, size)| DepartmentRow {
                name: if name.is_empty() { "Unknown".to_string() } else { name.clone() },
                before: size.before,
                after: size.after,
                change: size.change,
            })
            .collect()
    }

    /// 変更・追加・削除の順の一覧
    pub fn change_rows(&self) -> Vec<ChangeRow> {
        let Some(changes) = &self.changes else {
            return Vec::new();
        };
        let changed = changes.changed.iter().map(|p| ChangeRow {
            kind: ChangeKind::Changed,
            name: p.name.clone(),
            details: p
                .changes
                .iter()
                .map(|(field, (old, new))| format!("{}: {} → {}", field, value_text(old), value_text(new)))
                .collect(),
        });
        let added = changes.added.iter().map(|p| ChangeRow {
            kind: ChangeKind::Added,
            name: p.name.clone(),
            details: delta_details(p),
        });
        let removed = changes.removed.iter().map(|p| ChangeRow {
            kind: ChangeKind::Removed,
            name: p.name.clone(),
            details: delta_details(p),
        });
        changed.chain(added).chain(removed).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REPORT: &str = r#"{
        "table1": {"id": 1, "name": "Q1", "upload_date": "2024-01-01T00:00:00"},
        "table2": {"id": 2, "name": "Q2", "upload_date": "2024-03-31T12:00:00"},
        "aggregated_report": {
            "total_employees": {"before": 120, "after": 131},
            "new_employees": 14,
            "departed_employees": 3,
            "promotion_rate": 4.25,
            "turnover_rate": 2.5,
            "department_changes": {"total": 3},
            "role_changes": {"total": 5},
            "rank_changes": {"total": 0},
            "reporting_line_changes": {"total": 4},
            "department_size_changes": {
                "R&D": {"before": 40, "after": 48, "change": 8, "percent_change": 20.0},
                "": {"before": 2, "after": 1, "change": -1}
            }
        },
        "changes": {
            "changed": [{"name": "Anna", "changes": {"role": ["Engineer", "Lead"], "rank": [null, 3]}}],
            "added": [{"name": "Omer", "role": "Intern"}],
            "removed": [{"name": "Ben", "role": "Engineer", "department": "R&D", "rank": 2}]
        }
    }"#;

    #[test]
    fn test_time_difference_rounds_up() {
        let report = ComparisonReport::from_json(REPORT).unwrap();
        // 90日と12時間
        assert_eq!(report.time_difference_days(), 91);
    }

    #[test]
    fn test_time_difference_unparsable() {
        let mut report = ComparisonReport::from_json(REPORT).unwrap();
        report.table2.upload_date = "yesterday".into();
        assert_eq!(report.time_difference_days(), 0);
    }

    #[test]
    fn test_time_difference_order_independent() {
        let mut report = ComparisonReport::default();
        report.table1.upload_date = "2024-02-10".into();
        report.table2.upload_date = "2024-02-01T00:00:00Z".into();
        assert_eq!(report.time_difference_days(), 9);
    }

    #[test]
    fn test_parse_upload_date_errors() {
        assert!(parse_upload_date("2024-13-01").is_err());
        assert!(matches!(parse_upload_date("x"), Err(Error::InvalidDate(s)) if s == "x"));
    }

    #[test]
    fn test_structure_breakdown() {
        let report = ComparisonReport::from_json(REPORT).unwrap();
        let shares = report.structure_breakdown();
        let summary: Vec<_> = shares.iter().map(|s| (s.name, s.value, s.percent.as_str())).collect();
        assert_eq!(
            summary,
            vec![
                ("Department", 3, "25.0"),
                ("Role", 5, "41.7"),
                ("Rank", 0, "0.0"),
                ("Reporting Line", 4, "33.3"),
            ]
        );
    }

    #[test]
    fn test_structure_breakdown_zero_total() {
        let report = ComparisonReport {
            aggregated_report: Some(AggregatedReport::default()),
            ..Default::default()
        };
        assert!(report.structure_breakdown().iter().all(|s| s.percent == "0.0"));
        assert!(ComparisonReport::default().structure_breakdown().is_empty());
    }

    #[test]
    fn test_department_rows() {
        let report = ComparisonReport::from_json(REPORT).unwrap();
        let rows = report.department_size_rows();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].name, "Unknown");
        assert_eq!(rows[0].change, -1);
        assert_eq!(rows[1].name, "R&D");
        assert_eq!(rows[1].after, 48);
    }

    #[test]
    fn test_change_rows() {
        let report = ComparisonReport::from_json(REPORT).unwrap();
        let rows = report.change_rows();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].kind, ChangeKind::Changed);
        assert_eq!(rows[0].details, vec!["rank: N/A → 3", "role: Engineer → Lead"]);
        assert_eq!(rows[1].details[1], "Department: N/A");
        assert_eq!(rows[2].kind, ChangeKind::Removed);
        assert_eq!(rows[2].details[2], "Rank: 2");
    }
}
