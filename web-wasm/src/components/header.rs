//! ヘッダー（テーブル名と操作ボタン）

use crate::components::chart::center_chart;
use crate::state::{ChartState, Modal};
use leptos::prelude::*;
use orgchart_common::expansion::GlobalSignal;
use orgchart_common::layout::TreeLayout;
use orgchart_common::types::find_table;

/// 表示中テーブルの "フォルダ / テーブル" 表記
fn table_title(state: ChartState) -> String {
    let Some(table_id) = state.table_id.get() else {
        return "テーブル未選択".to_string();
    };
    state.folders.with(|f| {
        f.loaded()
            .and_then(|folders| find_table(folders, table_id))
            .map(|(folder, table)| format!("{} / {}", folder.name, table.name))
            .unwrap_or_else(|| format!("テーブル #{}", table_id))
    })
}

#[component]
pub fn Header(state: ChartState, tree_layout: Memo<TreeLayout>) -> impl IntoView {
    let open = move |modal: Modal| move |_: web_sys::MouseEvent| state.modal.set(modal.clone());

    view! {
        <header class="header">
            <h1>{move || table_title(state)}</h1>
            <nav class="toolbar">
                <button class="btn btn-secondary btn-small" on:click=open(Modal::TableSelection)>
                    "テーブル変更"
                </button>
                <button class="btn btn-secondary btn-small" on:click=open(Modal::Filter)>
                    {move || {
                        let n = state.filter.with(|f| f.terms().len());
                        if n > 0 { format!("フィルタ ({})", n) } else { "フィルタ".to_string() }
                    }}
                </button>
                <button
                    class=move || {
                        if state.settings.with(|s| s.org_mode) {
                            "btn btn-primary btn-small"
                        } else {
                            "btn btn-secondary btn-small"
                        }
                    }
                    on:click=move |_| state.toggle_org_mode()
                >
                    "組織モード"
                </button>
                <button class="btn btn-secondary btn-small" on:click=move |_| state.search_open.update(|o| *o = !*o)>
                    "検索"
                </button>
                <button
                    class="btn btn-secondary btn-small"
                    on:click=move |_| tree_layout.with_untracked(|l| center_chart(state, l))
                >
                    "中央へ"
                </button>
                <button class="btn btn-secondary btn-small" on:click=move |_| state.apply_global(GlobalSignal::ExpandAll)>
                    "すべて開く"
                </button>
                <button class="btn btn-secondary btn-small" on:click=move |_| state.apply_global(GlobalSignal::CollapseAll)>
                    "すべて閉じる"
                </button>
                <button class="btn btn-secondary btn-small" on:click=open(Modal::Upload)>
                    "アップロード"
                </button>
                <button class="btn btn-secondary btn-small" on:click=open(Modal::Compare)>
                    "比較"
                </button>
                <button class="btn btn-tertiary btn-small" on:click=open(Modal::Help)>
                    "?"
                </button>
            </nav>
        </header>
    }
}
