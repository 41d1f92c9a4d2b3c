//! フォルダ・テーブル選択

use crate::state::{ChartState, Modal};
use leptos::prelude::*;
use orgchart_common::request::LoadState;
use orgchart_common::types::FolderEntry;

fn folder_view(state: ChartState, folder: FolderEntry) -> impl IntoView {
    let tables = folder
        .tables
        .into_iter()
        .map(|table| {
            let id = table.id;
            let is_current = move || state.table_id.get() == Some(id);
            view! {
                <li>
                    <button
                        class=move || if is_current() { "table-item current" } else { "table-item" }
                        on:click=move |_| state.load_table(id)
                    >
                        <span class="table-name">{table.name}</span>
                        <span class="text-muted">{table.upload_date.unwrap_or_default()}</span>
                    </button>
                </li>
            }
        })
        .collect_view();

    view! {
        <section class="folder">
            <h3>{format!("📁 {}", folder.name)}</h3>
            <ul>{tables}</ul>
        </section>
    }
}

#[component]
pub fn TableSelection(state: ChartState) -> impl IntoView {
    let body = move || {
        state.folders.with(|f| match f {
            LoadState::Idle | LoadState::Loading => {
                view! { <p class="text-muted">"読み込み中..."</p> }.into_any()
            }
            LoadState::Failed(e) => view! {
                <p class="error">{e.clone()}</p>
                <button class="btn btn-secondary btn-small" on:click=move |_| state.load_folders()>
                    "再読み込み"
                </button>
            }
            .into_any(),
            LoadState::Loaded(folders) if folders.is_empty() => {
                view! { <p>"フォルダがありません。アップロードから追加してください"</p> }.into_any()
            }
            LoadState::Loaded(folders) => folders
                .iter()
                .cloned()
                .map(|folder| folder_view(state, folder))
                .collect_view()
                .into_any(),
        })
    };

    view! {
        <div class="modal table-selection">
            <div class="modal-header">
                <h2>"テーブルを選択"</h2>
                <button class="btn btn-tertiary btn-small" on:click=move |_| state.modal.set(Modal::None)>"×"</button>
            </div>
            {body}
        </div>
    }
}
