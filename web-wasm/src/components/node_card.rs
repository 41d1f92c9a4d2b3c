//! 組織図の1ノード
//!
//! 主ボタンは押下時間でクリック（詳細）と長押し（ハイライト）を分け、
//! 副ボタンは開閉を切り替える。

use crate::state::{now, ChartState};
use gloo::timers::future::TimeoutFuture;
use leptos::prelude::*;
use orgchart_common::language::detect_language;
use orgchart_common::layout::NodeBox;
use orgchart_common::press::{PressOutcome, LONG_PRESS_THRESHOLD};
use orgchart_common::render::{LabelPart, RenderedNode};
use wasm_bindgen_futures::spawn_local;
use web_sys::PointerEvent;

pub fn handle_outcome(state: ChartState, outcome: PressOutcome) {
    match outcome {
        PressOutcome::Click(key) => state.open_node(key),
        PressOutcome::LongPress(key) => state.toggle_highlight(&key),
        PressOutcome::ToggleExpand(key) => state.toggle_expand(&key),
    }
}

fn label_view(parts: Vec<LabelPart>) -> impl IntoView {
    parts
        .into_iter()
        .map(|part| {
            if part.matched {
                view! { <mark class="bg-yellow-200">{part.text}</mark> }.into_any()
            } else {
                view! { <span>{part.text}</span> }.into_any()
            }
        })
        .collect_view()
}

#[component]
pub fn NodeCard(state: ChartState, node: RenderedNode, bx: NodeBox) -> impl IntoView {
    let script = detect_language(&node.primary_text());
    let key = node.key.clone();

    let on_pointerdown = {
        let key = key.clone();
        move |ev: PointerEvent| match ev.button() {
            0 => {
                state.press.update(|p| p.press_primary(key.clone(), now()));
                spawn_local(async move {
                    TimeoutFuture::new(LONG_PRESS_THRESHOLD.as_millis() as u32).await;
                    if let Some(Some(outcome)) = state.press.try_update(|p| p.tick(now())) {
                        handle_outcome(state, outcome);
                    }
                });
            }
            2 => {
                ev.prevent_default();
                ev.stop_propagation();
                if let Some(outcome) = state.press.try_update(|p| p.press_secondary(key.clone())) {
                    handle_outcome(state, outcome);
                }
            }
            _ => {}
        }
    };

    let on_pointerup = {
        let key = key.clone();
        move |ev: PointerEvent| {
            if ev.button() != 0 {
                return;
            }
            if let Some(Some(outcome)) = state.press.try_update(|p| p.release(&key, now())) {
                handle_outcome(state, outcome);
            }
        }
    };

    let on_toggle = {
        let key = key.clone();
        move |ev: web_sys::MouseEvent| {
            ev.stop_propagation();
            state.toggle_expand(&key);
        }
    };

    let class = format!(
        "org-node absolute rounded-lg border-2 shadow-sm p-3 select-none cursor-pointer {} {} {}",
        node.color.css_class(),
        node.decoration.css_class(),
        script.font_class()
    );
    let style = format!(
        "left: {}px; top: {}px; width: {}px; height: {}px;",
        bx.x, bx.y, bx.width, bx.height
    );
    let has_disclosure = node.has_disclosure;
    let expanded = node.expanded;

    view! {
        <div
            class=class
            style=style
            dir=script.text_direction()
            on:pointerdown=on_pointerdown
            on:pointerup=on_pointerup
            on:pointerleave=move |_| state.press.update(|p| p.cancel())
            on:contextmenu=|ev: web_sys::MouseEvent| ev.prevent_default()
        >
            <div class=format!("flex items-start justify-between gap-2 {}", script.flex_direction_class())>
                <div class=format!("flex-1 min-w-0 {}", script.text_align_class())>
                    <div class="font-bold truncate">{label_view(node.primary)}</div>
                    <div class="text-sm text-gray-600 truncate">{label_view(node.secondary)}</div>
                </div>
                {has_disclosure.then(|| view! {
                    <button
                        class="disclosure w-6 h-6 rounded-full bg-white border text-xs"
                        on:pointerdown=|ev: PointerEvent| ev.stop_propagation()
                        on:click=on_toggle
                    >
                        {if expanded { "−" } else { "+" }}
                    </button>
                })}
            </div>
        </div>
    }
}
