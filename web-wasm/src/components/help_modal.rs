//! ショートカット一覧

use crate::state::{ChartState, Modal};
use leptos::prelude::*;
use orgchart_common::shortcuts::SHORTCUTS;

#[component]
pub fn HelpModal(state: ChartState) -> impl IntoView {
    let rows = SHORTCUTS
        .iter()
        .map(|s| {
            view! {
                <tr>
                    <td><kbd>{s.label()}</kbd></td>
                    <td>{s.description}</td>
                </tr>
            }
        })
        .collect_view();

    view! {
        <div class="modal help-modal">
            <div class="modal-header">
                <h2>"キーボードショートカット"</h2>
                <button class="btn btn-tertiary btn-small" on:click=move |_| state.modal.set(Modal::None)>"×"</button>
            </div>
            <table class="shortcuts">{rows}</table>
            <p class="text-muted">
                "ドラッグで移動、ホイールで拡大縮小。ノードをクリックで詳細、長押しでハイライト、右クリックで開閉"
            </p>
        </div>
    }
}
