//! 読み込み中インジケータ

use crate::state::ChartState;
use leptos::prelude::*;

#[component]
pub fn ProgressBar(state: ChartState) -> impl IntoView {
    let busy = move || {
        state.tree.with(|t| t.is_loading())
            || state.folders.with(|f| f.is_loading())
            || state.comparison.with(|c| c.is_loading())
    };

    view! {
        <Show when=busy>
            <div class="progress-container">
                <div class="progress-bar">
                    <div class="progress-fill indeterminate" />
                </div>
                <p class="progress-text">
                    {move || if state.tree.with(|t| t.is_loading()) { "組織図を読み込み中..." } else { "読み込み中..." }}
                </p>
            </div>
        </Show>
    }
}
