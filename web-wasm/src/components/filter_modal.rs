//! フィルタ選択（名前・役職の候補から複数選ぶ）

use crate::state::{ChartState, Modal};
use leptos::prelude::*;
use orgchart_common::filter::{FilterField, FilterPicker, NodeFilter};
use web_sys::KeyboardEvent;

#[component]
pub fn FilterModal(state: ChartState) -> impl IntoView {
    let picker = RwSignal::new(state.tree.with_untracked(|t| {
        state.filter.with_untracked(|f| FilterPicker::new(t.loaded(), f))
    }));

    let apply = move |_| {
        state.filter.set(picker.with_untracked(|p| p.apply()));
        state.modal.set(Modal::None);
    };
    let clear = move |_| {
        state.filter.set(NodeFilter::default());
        state.modal.set(Modal::None);
    };

    let field_button = move |field: FilterField, label: &'static str| {
        view! {
            <button
                class=move || {
                    if picker.with(|p| p.field == field) {
                        "btn btn-primary btn-small"
                    } else {
                        "btn btn-secondary btn-small"
                    }
                }
                on:click=move |_| picker.update(|p| p.set_field(field))
            >
                {label}
            </button>
        }
    };

    let options = move || {
        picker.with(|p| {
            p.options()
                .into_iter()
                .take(100)
                .map(|option| {
                    let option = option.to_string();
                    let checked = p.is_selected(&option);
                    let value = option.clone();
                    view! {
                        <label class="filter-option">
                            <input
                                type="checkbox"
                                prop:checked=checked
                                on:change=move |_| picker.update(|p| p.toggle(&value))
                            />
                            {option}
                        </label>
                    }
                })
                .collect_view()
        })
    };

    let selected = move || {
        picker.with(|p| {
            p.selected()
                .iter()
                .cloned()
                .map(|term| {
                    let value = term.clone();
                    view! {
                        <span class="chip" on:click=move |_| picker.update(|p| p.toggle(&value))>
                            {term}" ×"
                        </span>
                    }
                })
                .collect_view()
        })
    };

    view! {
        <div class="modal filter-modal">
            <div class="modal-header">
                <h2>"フィルタ"</h2>
                <button class="btn btn-tertiary btn-small" on:click=move |_| state.modal.set(Modal::None)>"×"</button>
            </div>
            <div class="filter-fields">
                {field_button(FilterField::Name, "名前")}
                {field_button(FilterField::Role, "役職")}
            </div>
            <div class="form-group">
                <input
                    type="text"
                    placeholder="候補を絞り込み（Enterで追加）"
                    prop:value=move || picker.with(|p| p.input.clone())
                    on:input=move |ev| picker.update(|p| p.input = event_target_value(&ev))
                    on:keydown=move |ev: KeyboardEvent| {
                        if ev.key() == "Enter" {
                            picker.update(|p| {
                                p.add_custom();
                            });
                        }
                    }
                />
            </div>
            <div class="filter-selected">{selected}</div>
            <div class="filter-options">{options}</div>
            <div class="modal-actions">
                <button class="btn btn-tertiary" on:click=clear>"解除"</button>
                <button class="btn btn-primary" on:click=apply>"適用"</button>
            </div>
        </div>
    }
}
