//! パン・ズームできる組織図の表示領域
//!
//! ノードの位置は共通ライブラリのレイアウト結果をそのまま使い、
//! 全体を1つの `transform` で動かす。ドラッグ中だけ window に
//! pointermove/pointerup を登録する。

use crate::components::node_card::NodeCard;
use crate::state::ChartState;
use leptos::ev;
use leptos::prelude::*;
use orgchart_common::layout::{layout, LayoutConfig, TreeLayout};
use orgchart_common::render::{render, RenderContext, RenderPass, RenderTracker};
use orgchart_common::viewport::{Point, PointerButton, Size, ZoomLimits};
use web_sys::{PointerEvent, WheelEvent};

/// これ以上動いたらドラッグとみなす（px）
const DRAG_SLOP: f64 = 4.0;

fn pointer_button(button: i16) -> Option<PointerButton> {
    match button {
        0 => Some(PointerButton::Primary),
        1 => Some(PointerButton::Middle),
        2 => Some(PointerButton::Secondary),
        _ => None,
    }
}

/// ルートを画面中央に
pub fn center_chart(state: ChartState, tree_layout: &TreeLayout) {
    let Some(container) = state.container.get_untracked() else {
        return;
    };
    if let Some(root) = tree_layout.boxes().first() {
        let target = Point::new(root.center_x(), root.y + container.height / 4.0);
        state.viewport.update(|v| v.center_on(target, container));
    }
}

/// 描画パスを作る（ツリー・展開・検索・フィルタ・ハイライト・組織モード）
pub fn render_pass(state: ChartState) -> RenderPass {
    state.tree.with(|tree| {
        state.expansion.with(|expansion| {
            state.search.with(|search| {
                state.filter.with(|filter| {
                    state.highlighted.with(|highlighted| {
                        let org_mode = state.settings.with(|s| s.org_mode);
                        let ctx = RenderContext::new(expansion)
                            .with_search(search)
                            .with_filter(filter)
                            .with_highlighted(highlighted)
                            .with_org_mode(org_mode);
                        render(tree.loaded(), &ctx)
                    })
                })
            })
        })
    })
}

#[component]
pub fn ChartViewport(state: ChartState, tree_layout: Memo<TreeLayout>, pass: Memo<RenderPass>) -> impl IntoView {
    let container_ref = NodeRef::<leptos::html::Div>::new();
    let tracker = StoredValue::new(RenderTracker::new());
    let observer = state.observer;
    let drag_handles = StoredValue::new_local(Vec::<WindowListenerHandle>::new());
    let last_pointer = StoredValue::new(None::<(f64, f64)>);
    let drag_origin = StoredValue::new(None::<(f64, f64)>);

    let measure = move || {
        if let Some(el) = container_ref.get() {
            let rect = el.get_bounding_client_rect();
            state.container.set(Some(Size::new(rect.width(), rect.height())));
        }
    };
    Effect::new(move |_| {
        if container_ref.get().is_some() {
            measure();
        }
    });
    let resize = window_event_listener(ev::resize, move |_| measure());
    on_cleanup(move || resize.remove());

    // 新しいツリーが届いたら中央へ
    Effect::new(move |_| {
        if state.tree.with(|t| t.loaded().is_some()) {
            tree_layout.with_untracked(|l| center_chart(state, l));
        }
    });

    // 出現・消滅と画面位置の通知
    Effect::new(move |_| {
        let transform = state.viewport.with(|v| v.transform());
        pass.with(|p| {
            state.tree.with_untracked(|t| {
                tracker.update_value(|tr| observer.update_value(|o| tr.sync(t.loaded(), p, o)));
            });
        });
        tree_layout.with(|l| {
            tracker.with_value(|tr| observer.update_value(|o| tr.report_positions(l, &transform, o)));
        });
    });

    let limits = move || {
        let content = tree_layout.with_untracked(|l| l.bounds());
        ZoomLimits::from_measurements(state.container.get_untracked(), Some(content))
    };

    let stop_drag = move || {
        state.viewport.update(|v| v.pointer_up());
        last_pointer.set_value(None);
        drag_origin.set_value(None);
        drag_handles.update_value(|handles| {
            for handle in handles.drain(..) {
                handle.remove();
            }
        });
    };
    on_cleanup(stop_drag);

    let on_pointerdown = move |ev: PointerEvent| {
        let Some(button) = pointer_button(ev.button()) else {
            return;
        };
        if !state.viewport.try_update(|v| v.pointer_down(button)).unwrap_or(false) {
            return;
        }
        let origin = (ev.client_x() as f64, ev.client_y() as f64);
        last_pointer.set_value(Some(origin));
        drag_origin.set_value(Some(origin));

        let on_move = window_event_listener(ev::pointermove, move |ev: PointerEvent| {
            let (x, y) = (ev.client_x() as f64, ev.client_y() as f64);
            if let Some((lx, ly)) = last_pointer.get_value() {
                state.viewport.update(|v| {
                    v.pointer_move(x - lx, y - ly);
                });
            }
            last_pointer.set_value(Some((x, y)));
            // 動かしたらクリック・長押しにはしない
            if let Some((ox, oy)) = drag_origin.get_value() {
                if (x - ox).hypot(y - oy) > DRAG_SLOP {
                    state.press.update(|p| p.cancel());
                }
            }
        });
        let on_up = window_event_listener(ev::pointerup, move |_| stop_drag());
        drag_handles.update_value(|handles| {
            handles.push(on_move);
            handles.push(on_up);
        });
    };

    let on_wheel = move |ev: WheelEvent| {
        ev.prevent_default();
        let Some(el) = container_ref.get_untracked() else {
            return;
        };
        let rect = el.get_bounding_client_rect();
        let pointer = Point::new(ev.client_x() as f64 - rect.left(), ev.client_y() as f64 - rect.top());
        let limits = limits();
        state.viewport.update(|v| {
            v.wheel(ev.delta_y(), pointer, limits);
        });
    };

    let content_style = move || {
        let (transform, transition) = state.viewport.with(|v| (v.css_transform(), v.transition()));
        let bounds = tree_layout.with(|l| l.bounds());
        format!(
            "transform: {}; transition: {}; transform-origin: 0 0; width: {}px; height: {}px;",
            transform, transition, bounds.width, bounds.height
        )
    };

    let connectors = move || {
        tree_layout.with(|l| {
            l.links()
                .iter()
                .flat_map(|link| link.segments.iter().copied())
                .map(|line| {
                    view! {
                        <line
                            x1=line.from.x.to_string()
                            y1=line.from.y.to_string()
                            x2=line.to.x.to_string()
                            y2=line.to.y.to_string()
                            stroke="#9ca3af"
                            stroke-width="2"
                        />
                    }
                })
                .collect_view()
        })
    };

    let nodes = move || {
        pass.with(|p| {
            tree_layout.with(|l| {
                p.nodes()
                    .iter()
                    .filter_map(|node| {
                        l.box_of(&node.key)
                            .map(|bx| view! { <NodeCard state=state node=node.clone() bx=bx.clone() /> })
                    })
                    .collect_view()
            })
        })
    };

    view! {
        <div
            node_ref=container_ref
            class=move || {
                if state.viewport.with(|v| v.is_dragging()) {
                    "chart-container relative overflow-hidden w-full h-full cursor-grabbing"
                } else {
                    "chart-container relative overflow-hidden w-full h-full cursor-grab"
                }
            }
            style="touch-action: none;"
            on:pointerdown=on_pointerdown
            on:wheel=on_wheel
            on:contextmenu=|ev: web_sys::MouseEvent| ev.prevent_default()
        >
            <div class="chart-content absolute left-0 top-0" style=content_style>
                <svg
                    class="absolute left-0 top-0 pointer-events-none"
                    width=move || tree_layout.with(|l| l.bounds().width.to_string())
                    height=move || tree_layout.with(|l| l.bounds().height.to_string())
                >
                    {connectors}
                </svg>
                {nodes}
            </div>
            <Show when=move || pass.with(|p| p.is_empty()) && state.tree.with(|t| t.loaded().is_some())>
                <p class="absolute inset-0 flex items-center justify-center text-gray-500">
                    "フィルタに一致するノードがありません"
                </p>
            </Show>
        </div>
    }
}

/// 描画パスとレイアウトのメモ
pub fn chart_memos(state: ChartState) -> (Memo<RenderPass>, Memo<TreeLayout>) {
    let pass = Memo::new(move |_| render_pass(state));
    let tree_layout = Memo::new(move |_| pass.with(|p| layout(p, &LayoutConfig::default())));
    (pass, tree_layout)
}
