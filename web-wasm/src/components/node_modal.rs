//! ノード詳細（人物情報・在籍履歴・部下一覧・編集）

use crate::state::{ChartState, Modal};
use leptos::prelude::*;
use orgchart_common::edit::{HierarchyEdit, PersonalEdit, PERSONAL_FIELDS};
use orgchart_common::language::{detect_language, truncate};
use orgchart_common::request::LoadState;
use orgchart_common::tree::NodeId;
use orgchart_common::types::{OrgNode, TimelineResponse, UpdateType};

/// 部下一覧で最初に出す人数
const REPORTS_PREVIEW: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Details,
    Reports,
    Hierarchy,
    Personal,
}

#[derive(Debug, Clone)]
struct ReportRow {
    key: String,
    name: String,
    role: String,
}

/// ノードの右隣に出す。位置が分からなければ中央
fn modal_style(state: ChartState, key: &str) -> String {
    let position = state.observer.with_value(|o| o.positions.get(key));
    let scale = state.viewport.with_untracked(|v| v.transform().scale);
    match position {
        Some(p) => format!(
            "position: absolute; left: {}px; top: {}px;",
            p.x + 300.0 * scale,
            p.y.max(8.0)
        ),
        None => "position: absolute; left: 50%; top: 20%; transform: translateX(-50%);".to_string(),
    }
}

/// 直属と間接の部下
fn report_rows(state: ChartState, key: &str) -> (Vec<ReportRow>, Vec<ReportRow>) {
    state.tree.with_untracked(|t| {
        let Some((tree, id)) = t.loaded().and_then(|tree| tree.id_of(key).map(|id| (tree, id))) else {
            return (Vec::new(), Vec::new());
        };
        let rows = |ids: Vec<NodeId>| {
            ids.into_iter()
                .map(|id| {
                    let node = tree.node(id);
                    ReportRow {
                        key: tree.key(id).to_string(),
                        name: node.display_name().to_string(),
                        role: node.display_role().to_string(),
                    }
                })
                .collect::<Vec<_>>()
        };
        (rows(tree.direct_reports(id)), rows(tree.indirect_reports(id)))
    })
}

fn detail_row(label: &'static str, value: Option<String>) -> impl IntoView {
    view! {
        <tr>
            <th>{label}</th>
            <td>{truncate(value.as_deref(), 40)}</td>
        </tr>
    }
}

fn details_view(node: OrgNode) -> impl IntoView {
    let script = detect_language(node.name_str());
    view! {
        <div dir=script.text_direction() class=script.font_class()>
            <h2>{node.display_name().to_string()}</h2>
            <table class="details">
                {detail_row("役職", node.role.clone())}
                {detail_row("部署", node.department.clone())}
                {detail_row("メール", node.email.clone())}
                {detail_row("社員ID", node.person_id.as_ref().map(|v| v.to_string()))}
                {detail_row("ランク", node.rank.as_ref().map(|v| v.to_string()))}
                {detail_row("生年月日", node.birth_date.clone())}
                {detail_row("部下", Some(node.children.len().to_string()))}
            </table>
        </div>
    }
}

fn timeline_view(timeline: TimelineResponse) -> impl IntoView {
    let entries = timeline
        .timeline
        .into_iter()
        .map(|entry| {
            let role = entry
                .person_info
                .as_ref()
                .map(|p| p.display_role().to_string())
                .unwrap_or_else(|| "-".to_string());
            view! {
                <li>
                    <span class="date">{entry.upload_date}</span>
                    " "
                    <span>{entry.name}</span>
                    ": "
                    <span>{role}</span>
                </li>
            }
        })
        .collect_view();
    let cv = timeline.cv.unwrap_or_default().into_iter().map(|c| {
        let end = c.end_date.unwrap_or_else(|| "現在".to_string());
        view! { <li>{format!("{} ({} - {})", c.role, c.start_date, end)}</li> }
    });

    view! {
        <h3>"在籍履歴"</h3>
        <ul class="timeline">{entries}</ul>
        <h3>"経歴"</h3>
        <ul class="cv">{cv.collect_view()}</ul>
    }
}

fn report_list(state: ChartState, title: &'static str, rows: Vec<ReportRow>) -> impl IntoView {
    let show_all = RwSignal::new(false);
    let total = rows.len();
    let rows = StoredValue::new(rows);
    let items = move || {
        let limit = if show_all.get() { total } else { REPORTS_PREVIEW };
        rows.with_value(|rows| {
            rows.iter()
                .take(limit)
                .map(|row| {
                    let key = row.key.clone();
                    view! {
                        <li>
                            <button class="btn-link" on:click=move |_| state.open_node(key.clone())>
                                {row.name.clone()}
                            </button>
                            " "
                            <span class="text-muted">{row.role.clone()}</span>
                        </li>
                    }
                })
                .collect_view()
        })
    };

    view! {
        <h3>{format!("{} ({})", title, total)}</h3>
        <Show when=move || { total > 0 } fallback=|| view! { <p class="text-muted">"該当者なし"</p> }>
            <ul class="reports">{items}</ul>
        </Show>
        <Show when=move || { total > REPORTS_PREVIEW && !show_all.get() }>
            <button class="btn btn-tertiary btn-small" on:click=move |_| show_all.set(true)>
                {format!("すべて表示 ({})", total)}
            </button>
        </Show>
    }
}

/// 送信中・失敗の表示
fn update_status(state: ChartState) -> impl IntoView {
    move || {
        state.update.with(|u| match u {
            LoadState::Loading => view! { <p class="text-muted">"更新中..."</p> }.into_any(),
            LoadState::Failed(e) => view! { <p class="error">{e.clone()}</p> }.into_any(),
            _ => ().into_any(),
        })
    }
}

fn form_error(error: RwSignal<Option<String>>) -> impl IntoView {
    move || error.get().map(|e| view! { <p class="error">{e}</p> })
}

fn target_select(state: ChartState, edit: RwSignal<HierarchyEdit>) -> impl IntoView {
    move || {
        state.candidates.with(|c| match c {
            LoadState::Idle | LoadState::Loading => {
                view! { <p class="text-muted">"候補を読み込み中..."</p> }.into_any()
            }
            LoadState::Failed(e) => view! { <p class="error">{e.clone()}</p> }.into_any(),
            LoadState::Loaded(people) => {
                let people = people.clone();
                let options = people
                    .iter()
                    .enumerate()
                    .map(|(i, p)| {
                        let text = format!("{} ({} - {})", p.name, p.role, p.department.as_deref().unwrap_or("-"));
                        let person_id = p.person_id.clone();
                        let selected = move || {
                            edit.with(|e| e.target.as_ref().map(|t| &t.person_id) == Some(&person_id))
                        };
                        view! { <option value=i.to_string() selected=selected>{text}</option> }
                    })
                    .collect_view();
                view! {
                    <div class="form-group">
                        <label>{move || edit.with(|e| e.target_label())}</label>
                        <select on:change=move |ev| {
                            let picked = event_target_value(&ev)
                                .parse::<usize>()
                                .ok()
                                .and_then(|i| people.get(i).cloned());
                            edit.update(|e| e.target = picked);
                        }>
                            <option value="" selected=move || edit.with(|e| e.target.is_none())>
                                "選択してください"
                            </option>
                            {options}
                        </select>
                    </div>
                }
                .into_any()
            }
        })
    }
}

fn hierarchy_form(state: ChartState, edit: RwSignal<HierarchyEdit>) -> impl IntoView {
    let types = [UpdateType::Override, UpdateType::CreateNew]
        .into_iter()
        .map(|t| {
            view! {
                <option value=t.as_str() selected=move || edit.with(|e| e.update_type == Some(t))>
                    {t.label()}
                </option>
            }
        })
        .collect_view();

    view! {
        <div class="form-group">
            <label>"変更の種類"</label>
            <select on:change=move |ev| {
                if let Ok(t) = event_target_value(&ev).parse::<UpdateType>() {
                    edit.update(|e| e.set_update_type(t));
                }
            }>
                <option value="" selected=move || edit.with(|e| e.update_type.is_none())>"選択してください"</option>
                {types}
            </select>
        </div>
        <Show when=move || edit.with(|e| e.update_type.is_some())>
            {target_select(state, edit)}
        </Show>
        <Show when=move || edit.with(|e| e.needs_new_role())>
            <div class="form-group">
                <label>"新しい役職"</label>
                <input
                    type="text"
                    dir=move || edit.with(|e| detect_language(&e.new_role).text_direction())
                    prop:value=move || edit.with(|e| e.new_role.clone())
                    on:input=move |ev| edit.update(|e| e.new_role = event_target_value(&ev))
                />
            </div>
        </Show>
    }
}

fn hierarchy_review(edit: RwSignal<HierarchyEdit>) -> impl IntoView {
    edit.with_untracked(|e| {
        let kind = e.update_type.map(|t| t.label()).unwrap_or("-");
        let target = e.target.as_ref().map(|t| t.name.clone()).unwrap_or_default();
        let role = e.needs_new_role().then(|| e.new_role.trim().to_string());
        view! {
            <h3>"変更内容の確認"</h3>
            <table class="details">
                <tr><th>"変更の種類"</th><td>{kind}</td></tr>
                <tr><th>{e.target_label()}</th><td>{target}</td></tr>
                {role.map(|r| view! { <tr><th>"新しい役職"</th><td>{r}</td></tr> })}
            </table>
        }
    })
}

/// 上書き、または別の上司の下に新しいノードを作る
fn hierarchy_section(state: ChartState, node: OrgNode) -> impl IntoView {
    let edit = RwSignal::new(HierarchyEdit::new());
    let error = RwSignal::new(None::<String>);
    state.load_candidates(node.clone());
    let node = StoredValue::new(node);

    let review = move |_| {
        let result = node.with_value(|n| edit.try_update(|e| e.review(n)));
        error.set(match result {
            Some(Err(e)) => Some(e.to_string()),
            _ => None,
        });
    };
    let confirm = move |_| match node.with_value(|n| edit.with_untracked(|e| e.request(n))) {
        Ok(request) => {
            error.set(None);
            state.submit_hierarchy(request);
        }
        Err(e) => error.set(Some(e.to_string())),
    };
    let busy = move || state.update.with(|u| u.is_loading());

    view! {
        <div class="edit-section">
            <Show
                when=move || edit.with(|e| e.is_reviewing())
                fallback=move || {
                    view! {
                        {hierarchy_form(state, edit)}
                        <button class="btn btn-primary" on:click=review>"確認へ"</button>
                    }
                }
            >
                {hierarchy_review(edit)}
                <button class="btn btn-secondary" on:click=move |_| edit.update(|e| e.back())>"戻る"</button>
                <button class="btn btn-primary" disabled=busy on:click=confirm>"変更を確定"</button>
            </Show>
            {form_error(error)}
            {update_status(state)}
        </div>
    }
}

/// 選んだテーブルすべてで同名の人物を更新する
fn personal_section(state: ChartState, node: OrgNode) -> impl IntoView {
    let edit = RwSignal::new(PersonalEdit::from_node(&node, state.table_id.get_untracked()));
    let error = RwSignal::new(None::<String>);
    let node = StoredValue::new(node);

    let fields = PERSONAL_FIELDS
        .into_iter()
        .map(|(key, label)| {
            let input_type = if key == "birth_date" { "date" } else { "text" };
            view! {
                <div class="form-group">
                    <label>{label}</label>
                    <input
                        type=input_type
                        prop:value=move || edit.with(|e| e.value(key).to_string())
                        on:input=move |ev| edit.update(|e| e.set(key, event_target_value(&ev)))
                    />
                </div>
            }
        })
        .collect_view();

    let tables = state
        .folder_tables()
        .into_iter()
        .map(|table| {
            let id = table.id;
            view! {
                <label class="filter-option">
                    <input
                        type="checkbox"
                        prop:checked=move || edit.with(|e| e.is_table_selected(id))
                        on:change=move |_| edit.update(|e| e.toggle_table(id))
                    />
                    {table.name}
                </label>
            }
        })
        .collect_view();

    let submit = move |_| match node.with_value(|n| edit.with_untracked(|e| e.request(n))) {
        Ok(request) => {
            error.set(None);
            state.submit_personal(request);
        }
        Err(e) => error.set(Some(e.to_string())),
    };

    view! {
        <div class="edit-section">
            {fields}
            <h4>"更新するテーブル"</h4>
            <div class="filter-options">{tables}</div>
            {form_error(error)}
            {update_status(state)}
            <button class="btn btn-primary" disabled=move || state.update.with(|u| u.is_loading()) on:click=submit>
                "保存"
            </button>
        </div>
    }
}

#[component]
pub fn NodeModal(state: ChartState, node_key: String) -> impl IntoView {
    let node = state.tree.with_untracked(|t| {
        t.loaded()
            .and_then(|tree| tree.id_of(&node_key).map(|id| tree.node(id).clone()))
    });
    let style = modal_style(state, &node_key);
    let section = RwSignal::new(Section::Details);

    let timeline = move || {
        state.timeline.with(|t| match t {
            LoadState::Idle => ().into_any(),
            LoadState::Loading => view! { <p class="text-muted">"履歴を読み込み中..."</p> }.into_any(),
            LoadState::Failed(e) => view! { <p class="error">{e.clone()}</p> }.into_any(),
            LoadState::Loaded(timeline) => timeline_view(timeline.clone()).into_any(),
        })
    };

    let tab = move |target: Section, label: &'static str| {
        view! {
            <button
                class=move || {
                    if section.get() == target { "btn btn-primary btn-small" } else { "btn btn-secondary btn-small" }
                }
                on:click=move |_| section.set(target)
            >
                {label}
            </button>
        }
    };

    let body = match node {
        None => view! { <p>"ノードが見つかりません"</p> }.into_any(),
        Some(node) => {
            let (direct, indirect) = report_rows(state, &node_key);
            let node = StoredValue::new(node);
            let content = move || match section.get() {
                Section::Details => view! { {details_view(node.get_value())} {timeline} }.into_any(),
                Section::Reports => view! {
                    {report_list(state, "直属の部下", direct.clone())}
                    {report_list(state, "間接の部下", indirect.clone())}
                }
                .into_any(),
                Section::Hierarchy => hierarchy_section(state, node.get_value()).into_any(),
                Section::Personal => personal_section(state, node.get_value()).into_any(),
            };
            view! {
                <nav class="modal-tabs">
                    {tab(Section::Details, "詳細")}
                    {tab(Section::Reports, "部下")}
                    {tab(Section::Hierarchy, "階層の変更")}
                    {tab(Section::Personal, "個人情報の更新")}
                </nav>
                {content}
            }
            .into_any()
        }
    };

    view! {
        <div class="modal node-modal" style=style>
            <button class="btn btn-tertiary btn-small close" on:click=move |_| state.modal.set(Modal::None)>
                "×"
            </button>
            {body}
        </div>
    }
}
