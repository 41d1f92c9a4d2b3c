//! 名前検索バー（Enter で次、Shift+Enter で前）

use crate::state::ChartState;
use leptos::prelude::*;
use web_sys::KeyboardEvent;

#[component]
pub fn SearchBar(state: ChartState) -> impl IntoView {
    let input_ref = NodeRef::<leptos::html::Input>::new();

    Effect::new(move |_| {
        if let Some(input) = input_ref.get() {
            let _ = input.focus();
        }
    });

    let on_keydown = move |ev: KeyboardEvent| match ev.key().as_str() {
        "Enter" if ev.shift_key() => state.prev_result(),
        "Enter" => state.next_result(),
        "Escape" => {
            state.search.update(|s| s.clear());
            state.search_open.set(false);
        }
        _ => {}
    };

    let position = move || {
        state.search.with(|s| match s.position_label() {
            Some(label) => label,
            None if !s.term().trim().is_empty() => "0件".to_string(),
            None => String::new(),
        })
    };

    view! {
        <div class="search-bar">
            <input
                node_ref=input_ref
                type="search"
                placeholder="名前で検索..."
                prop:value=move || state.search.with(|s| s.term().to_string())
                on:input=move |ev| state.run_search(&event_target_value(&ev))
                on:keydown=on_keydown
            />
            <span class="search-position">{position}</span>
            <button class="btn btn-secondary btn-small" on:click=move |_| state.prev_result()>"▲"</button>
            <button class="btn btn-secondary btn-small" on:click=move |_| state.next_result()>"▼"</button>
            <button
                class="btn btn-tertiary btn-small"
                on:click=move |_| {
                    state.search.update(|s| s.clear());
                    state.search_open.set(false);
                }
            >
                "×"
            </button>
        </div>
    }
}
