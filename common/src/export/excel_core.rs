//! Excel生成（共通ライブラリ）
//!
//! 組織表と比較レポートを xlsx のバイト列として生成する。

use super::{flatten_tree, ORG_COLUMNS};
use crate::compare::ComparisonReport;
use crate::error::{Error, Result};
use crate::render::LevelColor;
use crate::tree::OrgTree;
use rust_xlsxwriter::*;

fn xlsx_err(context: &str) -> impl Fn(XlsxError) -> Error + '_ {
    move |e| Error::Export(format!("{}: {}", context, e))
}

fn header_format() -> Format {
    Format::new()
        .set_bold()
        .set_font_color(Color::RGB(0x333333))
        .set_background_color(Color::RGB(0xF5F5F5))
        .set_border(FormatBorder::Thin)
        .set_border_color(Color::RGB(0xAAAAAA))
}

fn write_header(sheet: &mut Worksheet, headers: &[&str]) -> Result<()> {
    let format = header_format();
    for (col, title) in headers.iter().enumerate() {
        sheet
            .write_string_with_format(0, col as u16, *title, &format)
            .map_err(xlsx_err("見出し書き込みエラー"))?;
    }
    sheet.set_freeze_panes(1, 0).map_err(xlsx_err("ウィンドウ枠固定エラー"))?;
    Ok(())
}

fn level_format(color: LevelColor) -> Format {
    let [r, g, b] = color.fill_rgb();
    Format::new().set_background_color(Color::RGB(((r as u32) << 16) | ((g as u32) << 8) | b as u32))
}

/// 組織表（階層ごとに色分け）
pub fn org_tree_workbook(tree: &OrgTree, sheet_name: &str) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(sheet_name).map_err(xlsx_err("シート名設定エラー"))?;
    write_header(sheet, &ORG_COLUMNS)?;

    for (i, row) in flatten_tree(tree).iter().enumerate() {
        let format = level_format(LevelColor::for_depth(row.depth));
        for (col, value) in row.cells().iter().enumerate() {
            sheet
                .write_string_with_format(i as u32 + 1, col as u16, value, &format)
                .map_err(xlsx_err("セル書き込みエラー"))?;
        }
    }
    for (col, width) in [24.0, 8.0, 24.0, 24.0, 20.0, 28.0, 12.0, 8.0, 24.0].iter().enumerate() {
        sheet
            .set_column_width(col as u16, *width)
            .map_err(xlsx_err("列幅設定エラー"))?;
    }

    workbook.save_to_buffer().map_err(xlsx_err("Excel保存エラー"))
}

/// 比較レポート（概要・構造変化・部署規模・変更一覧の4シート）
pub fn comparison_workbook(report: &ComparisonReport) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();

    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Overview").map_err(xlsx_err("シート名設定エラー"))?;
        write_header(sheet, &["Metric", "Value"])?;
        let agg = report.aggregated_report.clone().unwrap_or_default();
        let total = agg.total_employees.unwrap_or_default();
        let rows: [(&str, String); 6] = [
            ("Time Difference", format!("{} days", report.time_difference_days())),
            ("Total Employees", format!("{} → {}", total.before, total.after)),
            ("New Employees", agg.new_employees.to_string()),
            ("Departed Employees", agg.departed_employees.to_string()),
            ("Promotion Rate", format!("{:.2}%", agg.promotion_rate)),
            ("Turnover Rate", format!("{:.2}%", agg.turnover_rate)),
        ];
        for (i, (label, value)) in rows.iter().enumerate() {
            let r = i as u32 + 1;
            sheet.write_string(r, 0, *label).map_err(xlsx_err("セル書き込みエラー"))?;
            sheet.write_string(r, 1, value).map_err(xlsx_err("セル書き込みエラー"))?;
        }
        sheet.set_column_width(0, 24.0).map_err(xlsx_err("列幅設定エラー"))?;
        sheet.set_column_width(1, 20.0).map_err(xlsx_err("列幅設定エラー"))?;
    }

    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Structure").map_err(xlsx_err("シート名設定エラー"))?;
        write_header(sheet, &["Change", "Count", "Percent"])?;
        for (i, share) in report.structure_breakdown().iter().enumerate() {
            let r = i as u32 + 1;
            sheet.write_string(r, 0, share.name).map_err(xlsx_err("セル書き込みエラー"))?;
            sheet.write_number(r, 1, share.value as f64).map_err(xlsx_err("セル書き込みエラー"))?;
            sheet
                .write_string(r, 2, format!("{}%", share.percent))
                .map_err(xlsx_err("セル書き込みエラー"))?;
        }
    }

    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Departments").map_err(xlsx_err("シート名設定エラー"))?;
        write_header(sheet, &["Department", "Before", "After", "Change"])?;
        for (i, row) in report.department_size_rows().iter().enumerate() {
            let r = i as u32 + 1;
            sheet.write_string(r, 0, &row.name).map_err(xlsx_err("セル書き込みエラー"))?;
            sheet.write_number(r, 1, row.before as f64).map_err(xlsx_err("セル書き込みエラー"))?;
            sheet.write_number(r, 2, row.after as f64).map_err(xlsx_err("セル書き込みエラー"))?;
            sheet.write_number(r, 3, row.change as f64).map_err(xlsx_err("セル書き込みエラー"))?;
        }
    }

    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Changes").map_err(xlsx_err("シート名設定エラー"))?;
        write_header(sheet, &["Type", "Name", "Details"])?;
        let wrap = Format::new().set_text_wrap();
        for (i, row) in report.change_rows().iter().enumerate() {
            let r = i as u32 + 1;
            sheet
                .write_string(r, 0, format!("{:?}", row.kind))
                .map_err(xlsx_err("セル書き込みエラー"))?;
            sheet.write_string(r, 1, &row.name).map_err(xlsx_err("セル書き込みエラー"))?;
            sheet
                .write_string_with_format(r, 2, row.details.join("\n"), &wrap)
                .map_err(xlsx_err("セル書き込みエラー"))?;
        }
        sheet.set_column_width(2, 48.0).map_err(xlsx_err("列幅設定エラー"))?;
    }

    workbook.save_to_buffer().map_err(xlsx_err("Excel保存エラー"))
}
