//! 2テーブルの比較ダッシュボード

use crate::state::{ChartState, Modal};
use leptos::prelude::*;
use orgchart_common::compare::{ChangeKind, ComparisonReport};
use orgchart_common::request::LoadState;

fn table_select(state: ChartState, selected: RwSignal<Option<i64>>, label: &'static str) -> impl IntoView {
    let options = move || {
        state.folders.with(|f| {
            f.loaded().map(|folders| {
                folders
                    .iter()
                    .flat_map(|folder| {
                        folder.tables.iter().map(move |table| {
                            let id = table.id;
                            let text = format!(
                                "{} / {} ({})",
                                folder.name,
                                table.name,
                                table.upload_date.as_deref().unwrap_or("-")
                            );
                            view! {
                                <option value=id.to_string() selected=move || selected.get() == Some(id)>{text}</option>
                            }
                        })
                    })
                    .collect_view()
            })
        })
    };

    view! {
        <div class="form-group">
            <label>{label}</label>
            <select on:change=move |ev| selected.set(event_target_value(&ev).parse().ok())>
                <option value="" selected=move || selected.get().is_none()>"選択してください"</option>
                {options}
            </select>
        </div>
    }
}

fn report_view(report: ComparisonReport) -> impl IntoView {
    let days = report.time_difference_days();
    let summary = report.aggregated_report.clone().map(|r| {
        let employees = r
            .total_employees
            .map(|t| format!("{} → {}", t.before, t.after))
            .unwrap_or_else(|| "-".to_string());
        view! {
            <ul class="summary">
                <li>{format!("従業員数: {}", employees)}</li>
                <li>{format!("入社: {} / 退社: {}", r.new_employees, r.departed_employees)}</li>
                <li>{format!("昇進率: {:.1}% / 離職率: {:.1}%", r.promotion_rate, r.turnover_rate)}</li>
            </ul>
        }
    });

    let structure = report
        .structure_breakdown()
        .into_iter()
        .map(|share| {
            view! {
                <tr>
                    <td>{share.name}</td>
                    <td>{share.value}</td>
                    <td>{format!("{}%", share.percent)}</td>
                </tr>
            }
        })
        .collect_view();

    let departments = report
        .department_size_rows()
        .into_iter()
        .map(|row| {
            view! {
                <tr>
                    <td>{row.name}</td>
                    <td>{row.before}</td>
                    <td>{row.after}</td>
                    <td>{format!("{:+}", row.change)}</td>
                </tr>
            }
        })
        .collect_view();

    let changes = report
        .change_rows()
        .into_iter()
        .map(|row| {
            let (class, mark) = match row.kind {
                ChangeKind::Changed => ("changed", "~"),
                ChangeKind::Added => ("added", "+"),
                ChangeKind::Removed => ("removed", "-"),
            };
            view! {
                <li class=class>
                    {format!("{} {}", mark, row.name)}
                    <span class="text-muted">{row.details.join(", ")}</span>
                </li>
            }
        })
        .collect_view();

    view! {
        <p>{format!("期間: {}日", days)}</p>
        {summary}
        <h3>"構造の変化"</h3>
        <table class="structure">{structure}</table>
        <h3>"部署規模"</h3>
        <table class="departments">
            <tr><th>"部署"</th><th>"前"</th><th>"後"</th><th>"増減"</th></tr>
            {departments}
        </table>
        <h3>"変更一覧"</h3>
        <ul class="changes">{changes}</ul>
    }
}

#[component]
pub fn ComparePanel(state: ChartState) -> impl IntoView {
    let first = RwSignal::new(None::<i64>);
    let second = RwSignal::new(state.table_id.get_untracked());

    let run = move |_| {
        if let (Some(a), Some(b)) = (first.get_untracked(), second.get_untracked()) {
            state.load_comparison(a, b);
        }
    };

    let result = move || {
        state.comparison.with(|c| match c {
            LoadState::Idle => ().into_any(),
            LoadState::Loading => view! { <p class="text-muted">"比較中..."</p> }.into_any(),
            LoadState::Failed(e) => view! { <p class="error">{e.clone()}</p> }.into_any(),
            LoadState::Loaded(report) => report_view(report.clone()).into_any(),
        })
    };

    view! {
        <div class="modal compare-panel">
            <div class="modal-header">
                <h2>"テーブル比較"</h2>
                <button class="btn btn-tertiary btn-small" on:click=move |_| state.modal.set(Modal::None)>"×"</button>
            </div>
            {table_select(state, first, "比較元")}
            {table_select(state, second, "比較先")}
            <div class="modal-actions">
                <button
                    class="btn btn-primary"
                    disabled=move || first.get().is_none() || second.get().is_none() || first.get() == second.get()
                    on:click=run
                >
                    "比較"
                </button>
            </div>
            {result}
        </div>
    }
}
