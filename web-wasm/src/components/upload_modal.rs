//! 組織表（CSV / Excel）のアップロード
//!
//! 既存フォルダへの追加か新規フォルダ作成かを選ぶ。成功したら一覧を
//! 読み直し、作成されたテーブルを開く。

use crate::state::{ChartState, Modal};
use leptos::prelude::*;
use orgchart_common::request::LoadState;
use wasm_bindgen_futures::spawn_local;

/// YYYY-MM-DD 形式か
fn is_iso_date(s: &str) -> bool {
    let parts: Vec<&str> = s.split('-').collect();
    parts.len() == 3
        && [4, 2, 2].iter().zip(&parts).all(|(len, p)| p.len() == *len && p.bytes().all(|b| b.is_ascii_digit()))
}

fn is_supported_file(name: &str) -> bool {
    let lower = name.to_lowercase();
    lower.ends_with(".csv") || lower.ends_with(".xlsx") || lower.ends_with(".xls")
}

#[component]
pub fn UploadModal(state: ChartState) -> impl IntoView {
    let file_ref = NodeRef::<leptos::html::Input>::new();
    let date = RwSignal::new(String::new());
    let folder_id = RwSignal::new(state.folder_id());
    let folder_name = RwSignal::new(String::new());
    let status = RwSignal::new(LoadState::<String>::Idle);

    let submit = move |_| {
        let file = file_ref
            .get_untracked()
            .and_then(|input| input.files())
            .and_then(|files| files.get(0));
        let Some(file) = file else {
            status.set(LoadState::Failed("ファイルを選択してください".into()));
            return;
        };
        if !is_supported_file(&file.name()) {
            status.set(LoadState::Failed("CSV または Excel ファイルを選択してください".into()));
            return;
        }
        let upload_date = date.get_untracked();
        if !is_iso_date(&upload_date) {
            status.set(LoadState::Failed("日付を YYYY-MM-DD で入力してください".into()));
            return;
        }
        let folder = folder_id.get_untracked();
        let name = folder_name.get_untracked();
        if folder.is_none() && name.trim().is_empty() {
            status.set(LoadState::Failed("フォルダを選ぶか新しいフォルダ名を入力してください".into()));
            return;
        }

        status.set(LoadState::Loading);
        let client = state.client();
        spawn_local(async move {
            let folder_name = folder.is_none().then_some(name.as_str());
            match client.upload(&file, &upload_date, folder, folder_name).await {
                Ok(response) => {
                    let message = response.message.clone().unwrap_or_else(|| "アップロードしました".to_string());
                    state.notice.set(Some(message.clone()));
                    status.set(LoadState::Loaded(message));
                    state.load_folders();
                    if let Some(table_id) = response.table_id {
                        state.load_table(table_id);
                    }
                }
                Err(e) => status.set(LoadState::Failed(e)),
            }
        });
    };

    let folder_options = move || {
        state.folders.with(|f| {
            f.loaded()
                .map(|folders| {
                    folders
                        .iter()
                        .map(|folder| {
                            let id = folder.id;
                            view! {
                                <option value=id.to_string() selected=move || folder_id.get() == Some(id)>
                                    {folder.name.clone()}
                                </option>
                            }
                        })
                        .collect_view()
                })
        })
    };

    view! {
        <div class="modal upload-modal">
            <div class="modal-header">
                <h2>"組織表をアップロード"</h2>
                <button class="btn btn-tertiary btn-small" on:click=move |_| state.modal.set(Modal::None)>"×"</button>
            </div>
            <div class="form-group">
                <label for="upload-file">"ファイル（CSV / Excel）"</label>
                <input node_ref=file_ref type="file" id="upload-file" accept=".csv,.xlsx,.xls" />
            </div>
            <div class="form-group">
                <label for="upload-date">"基準日"</label>
                <input
                    type="date"
                    id="upload-date"
                    prop:value=move || date.get()
                    on:input=move |ev| date.set(event_target_value(&ev))
                />
            </div>
            <div class="form-group">
                <label for="upload-folder">"フォルダ"</label>
                <select
                    id="upload-folder"
                    on:change=move |ev| folder_id.set(event_target_value(&ev).parse().ok())
                >
                    <option value="" selected=move || folder_id.get().is_none()>"新しいフォルダ"</option>
                    {folder_options}
                </select>
            </div>
            <Show when=move || folder_id.get().is_none()>
                <div class="form-group">
                    <label for="upload-folder-name">"新しいフォルダ名"</label>
                    <input
                        type="text"
                        id="upload-folder-name"
                        prop:value=move || folder_name.get()
                        on:input=move |ev| folder_name.set(event_target_value(&ev))
                    />
                </div>
            </Show>
            {move || status.with(|s| match s {
                LoadState::Idle => ().into_any(),
                LoadState::Loading => view! { <p class="text-muted">"アップロード中..."</p> }.into_any(),
                LoadState::Loaded(m) => view! { <p class="success">{m.clone()}</p> }.into_any(),
                LoadState::Failed(e) => view! { <p class="error">{e.clone()}</p> }.into_any(),
            })}
            <div class="modal-actions">
                <button
                    class="btn btn-primary"
                    disabled=move || status.with(|s| s.is_loading())
                    on:click=submit
                >
                    "アップロード"
                </button>
            </div>
        </div>
    }
}
