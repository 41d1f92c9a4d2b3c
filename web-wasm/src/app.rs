//! メインアプリケーションコンポーネント

use crate::components::{
    chart::{center_chart, chart_memos, ChartViewport},
    compare_panel::ComparePanel,
    filter_modal::FilterModal,
    header::Header,
    help_modal::HelpModal,
    node_modal::NodeModal,
    progress_bar::ProgressBar,
    search_bar::SearchBar,
    table_selection::TableSelection,
    upload_modal::UploadModal,
};
use crate::state::{ChartState, Modal};
use crate::storage::WebSettings;
use leptos::ev;
use leptos::prelude::*;
use orgchart_common::expansion::GlobalSignal;
use orgchart_common::filter::NodeFilter;
use orgchart_common::layout::TreeLayout;
use orgchart_common::shortcuts::{Action, Shortcut};
use orgchart_common::viewport::{Point, ZoomLimits, KEY_PAN_STEP, KEY_ZOOM_FACTOR};
use wasm_bindgen::JsCast;
use web_sys::KeyboardEvent;

/// 入力欄にフォーカスがあるか
fn typing_in_field(ev: &KeyboardEvent) -> bool {
    ev.target()
        .and_then(|t| t.dyn_into::<web_sys::Element>().ok())
        .map(|el| matches!(el.tag_name().as_str(), "INPUT" | "TEXTAREA" | "SELECT"))
        .unwrap_or(false)
}

fn run_action(state: ChartState, tree_layout: Memo<TreeLayout>, action: Action) {
    match action {
        Action::Help => state.modal.set(Modal::Help),
        Action::ChangeTable => state.modal.set(Modal::TableSelection),
        Action::Filter => state.modal.set(Modal::Filter),
        Action::ClearFilter => state.filter.set(NodeFilter::default()),
        Action::ToggleOrgMode => state.toggle_org_mode(),
        Action::ToggleSearch => state.search_open.update(|o| *o = !*o),
        Action::Center => tree_layout.with_untracked(|l| center_chart(state, l)),
        Action::ExpandAll => state.apply_global(GlobalSignal::ExpandAll),
        Action::CollapseAll => state.apply_global(GlobalSignal::CollapseAll),
        Action::Upload => state.modal.set(Modal::Upload),
        Action::Compare => state.modal.set(Modal::Compare),
        Action::ZoomIn | Action::ZoomOut => {
            let Some(container) = state.container.get_untracked() else {
                return;
            };
            let factor = if action == Action::ZoomIn { KEY_ZOOM_FACTOR } else { 1.0 / KEY_ZOOM_FACTOR };
            let anchor = Point::new(container.width / 2.0, container.height / 2.0);
            let limits = ZoomLimits::from_measurements(Some(container), Some(tree_layout.with_untracked(|l| l.bounds())));
            state.viewport.update(|v| {
                v.zoom_step(factor, anchor, limits);
            });
        }
        pan => {
            if let Some((dx, dy)) = pan.pan_delta(KEY_PAN_STEP) {
                state.viewport.update(|v| v.pan_by_screen(dx, dy));
            }
        }
    }
}

#[component]
pub fn App() -> impl IntoView {
    let settings = WebSettings::load();
    let last_table = settings.last_table_id;
    let state = ChartState::new(settings);
    let (pass, tree_layout) = chart_memos(state);

    state.load_folders();
    match last_table {
        Some(id) => state.load_table(id),
        None => state.modal.set(Modal::TableSelection),
    }

    let keydown = window_event_listener(ev::keydown, move |ev: KeyboardEvent| {
        if ev.key() == "Escape" {
            state.modal.set(Modal::None);
            return;
        }
        let ctrl = ev.ctrl_key() || ev.meta_key();
        if !ctrl && typing_in_field(&ev) {
            return;
        }
        if let Some(action) = Shortcut::from_key(&ev.key(), ctrl) {
            ev.prevent_default();
            run_action(state, tree_layout, action);
        }
    });
    on_cleanup(move || keydown.remove());

    let modal = move || {
        let key = match state.modal.get() {
            Modal::None => return ().into_any(),
            Modal::Help => return view! { <HelpModal state=state /> }.into_any(),
            Modal::TableSelection => return view! { <TableSelection state=state /> }.into_any(),
            Modal::Filter => return view! { <FilterModal state=state /> }.into_any(),
            Modal::Upload => return view! { <UploadModal state=state /> }.into_any(),
            Modal::Compare => return view! { <ComparePanel state=state /> }.into_any(),
            Modal::Node(key) => key,
        };
        view! { <NodeModal state=state node_key=key /> }.into_any()
    };

    let tree_error = move || {
        state.tree.with(|t| {
            t.error().map(|e| {
                let message = e.to_string();
                view! {
                    <div class="error-banner">
                        {message}
                        <button class="btn btn-secondary btn-small" on:click=move |_| state.reload()>"再試行"</button>
                    </div>
                }
            })
        })
    };

    view! {
        <div class="container">
            <Header state=state tree_layout=tree_layout />
            <Show when=move || state.search_open.get()>
                <SearchBar state=state />
            </Show>
            {move || state.notice.get().map(|notice| view! {
                <div class="notice" on:click=move |_| state.notice.set(None)>{notice}</div>
            })}
            {tree_error}
            <ProgressBar state=state />
            <main class="chart-area">
                <ChartViewport state=state tree_layout=tree_layout pass=pass />
                {modal}
            </main>
        </div>
    }
}
