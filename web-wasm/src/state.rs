//! 画面全体の状態とバックエンド呼び出し
//!
//! 各シグナルはコピー可能なハンドルなので `ChartState` ごとコンポーネントに渡す。
//! 非同期の結果は `RequestTracker` のチケットが最新のときだけ反映する。

use crate::api::ApiClient;
use crate::storage::WebSettings;
use leptos::prelude::*;
use orgchart_common::compare::ComparisonReport;
use orgchart_common::edit::{candidates, CANDIDATE_COLUMNS};
use orgchart_common::expansion::{ExpansionState, GlobalSignal};
use orgchart_common::filter::NodeFilter;
use orgchart_common::press::PressTracker;
use orgchart_common::render::{NodeObserver, PositionIndex};
use orgchart_common::request::{LoadState, RequestSlot, RequestTracker};
use orgchart_common::search::{SearchFields, SearchState};
use orgchart_common::tree::OrgTree;
use orgchart_common::types::{
    find_table, FolderEntry, HierarchyUpdateRequest, OrgNode, PersonRecord, PersonalUpdateRequest, TableEntry,
    TimelineResponse, UpdateResponse,
};
use orgchart_common::viewport::{Size, ViewportController};
use std::collections::HashSet;
use std::time::Duration;
use wasm_bindgen_futures::spawn_local;

/// 開いているモーダル
#[derive(Debug, Clone, PartialEq)]
pub enum Modal {
    None,
    Help,
    TableSelection,
    Filter,
    Upload,
    Compare,
    /// ノード詳細（hierarchical_structure）
    Node(String),
}

/// ページ読み込みからの経過時間（長押し判定用）
pub fn now() -> Duration {
    Duration::from_secs_f64(js_sys::Date::now().max(0.0) / 1000.0)
}

/// 描画されたノードの位置を覚え、出現を開発者コンソールに出す
#[derive(Debug, Default)]
pub struct ChartObserver {
    pub positions: PositionIndex,
}

impl NodeObserver for ChartObserver {
    fn on_rendered(&mut self, node: &OrgNode) {
        gloo::console::debug!(format!("rendered {}", node.hierarchical_structure));
    }

    fn on_unrendered(&mut self, key: &str) {
        self.positions.on_unrendered(key);
    }

    fn on_position(&mut self, key: &str, x: f64, y: f64) {
        self.positions.on_position(key, x, y);
    }
}

#[derive(Clone, Copy)]
pub struct ChartState {
    pub settings: RwSignal<WebSettings>,
    pub requests: RwSignal<RequestTracker>,
    pub folders: RwSignal<LoadState<Vec<FolderEntry>>>,
    pub table_id: RwSignal<Option<i64>>,
    pub tree: RwSignal<LoadState<OrgTree>>,
    pub expansion: RwSignal<ExpansionState>,
    pub search: RwSignal<SearchState>,
    pub search_open: RwSignal<bool>,
    pub filter: RwSignal<NodeFilter>,
    pub highlighted: RwSignal<HashSet<String>>,
    pub viewport: RwSignal<ViewportController>,
    pub press: RwSignal<PressTracker>,
    pub container: RwSignal<Option<Size>>,
    pub modal: RwSignal<Modal>,
    pub timeline: RwSignal<LoadState<TimelineResponse>>,
    pub comparison: RwSignal<LoadState<ComparisonReport>>,
    /// 階層変更の移動先候補
    pub candidates: RwSignal<LoadState<Vec<PersonRecord>>>,
    /// 編集の送信状態（成功時はサーバのメッセージ）
    pub update: RwSignal<LoadState<String>>,
    /// 画面上部に出すお知らせ・エラー
    pub notice: RwSignal<Option<String>>,
    /// 描画済みノードの画面位置（詳細モーダルの配置に使う）
    pub observer: StoredValue<ChartObserver>,
}

impl ChartState {
    pub fn new(settings: WebSettings) -> Self {
        Self {
            settings: RwSignal::new(settings),
            requests: RwSignal::new(RequestTracker::new()),
            folders: RwSignal::new(LoadState::Idle),
            table_id: RwSignal::new(None),
            tree: RwSignal::new(LoadState::Idle),
            expansion: RwSignal::new(ExpansionState::new()),
            search: RwSignal::new(SearchState::new()),
            search_open: RwSignal::new(false),
            filter: RwSignal::new(NodeFilter::default()),
            highlighted: RwSignal::new(HashSet::new()),
            viewport: RwSignal::new(ViewportController::new()),
            press: RwSignal::new(PressTracker::new()),
            container: RwSignal::new(None),
            modal: RwSignal::new(Modal::None),
            timeline: RwSignal::new(LoadState::Idle),
            comparison: RwSignal::new(LoadState::Idle),
            candidates: RwSignal::new(LoadState::Idle),
            update: RwSignal::new(LoadState::Idle),
            notice: RwSignal::new(None),
            observer: StoredValue::new(ChartObserver::default()),
        }
    }

    pub fn client(&self) -> ApiClient {
        self.settings.with_untracked(|s| ApiClient::new(&s.api_base_url))
    }

    fn begin(&self, slot: RequestSlot) -> Option<orgchart_common::request::RequestTicket> {
        self.requests.try_update(|r| r.begin(slot))
    }

    /// 表示中テーブルのフォルダ
    pub fn folder_id(&self) -> Option<i64> {
        let table_id = self.table_id.get_untracked()?;
        self.folders
            .with_untracked(|f| f.loaded().and_then(|folders| find_table(folders, table_id)).map(|(f, _)| f.id))
    }

    /// 表示中テーブルと同じフォルダのテーブル
    pub fn folder_tables(&self) -> Vec<TableEntry> {
        let Some(table_id) = self.table_id.get_untracked() else {
            return Vec::new();
        };
        self.folders.with_untracked(|f| {
            f.loaded()
                .and_then(|folders| find_table(folders, table_id))
                .map(|(folder, _)| folder.tables.clone())
                .unwrap_or_default()
        })
    }

    pub fn save_settings(&self) {
        if let Err(e) = self.settings.with_untracked(|s| s.save()) {
            self.notice.set(Some(e));
        }
    }

    pub fn load_folders(self) {
        let Some(ticket) = self.begin(RequestSlot::Folders) else {
            return;
        };
        self.folders.set(LoadState::Loading);
        let client = self.client();
        spawn_local(async move {
            let result = client.folder_structure().await;
            self.requests.with_untracked(|r| {
                self.folders.update(|f| {
                    f.settle(r, &ticket, result);
                });
            });
        });
    }

    /// テーブルを切り替える。表示状態はすべて初期化
    pub fn load_table(self, table_id: i64) {
        let Some(ticket) = self.begin(RequestSlot::OrgData) else {
            return;
        };
        self.requests.update(|r| {
            r.invalidate(RequestSlot::Search);
            r.invalidate(RequestSlot::Timeline);
            r.invalidate(RequestSlot::Update);
        });
        self.candidates.set(LoadState::Idle);
        self.update.set(LoadState::Idle);
        self.table_id.set(Some(table_id));
        self.tree.set(LoadState::Loading);
        self.expansion.update(|e| e.reset());
        self.search.update(|s| s.clear());
        self.highlighted.update(|h| h.clear());
        self.viewport.update(|v| v.reset());
        self.press.update(|p| p.cancel());
        self.modal.set(Modal::None);

        self.settings.update(|s| s.last_table_id = Some(table_id));
        self.save_settings();

        let client = self.client();
        spawn_local(async move {
            let result = client
                .org_data(table_id)
                .await
                .and_then(|root| OrgTree::from_root(root).map_err(|e| e.to_string()));
            self.requests.with_untracked(|r| {
                self.tree.update(|t| {
                    t.settle(r, &ticket, result);
                });
            });
        });
    }

    pub fn reload(self) {
        if let Some(id) = self.table_id.get_untracked() {
            self.load_table(id);
        }
    }

    /// ローカル検索。現在の結果が見えるように祖先を開く
    pub fn run_search(self, term: &str) {
        self.tree.with_untracked(|t| {
            let tree = t.loaded();
            self.search.update(|s| s.update(tree, term, SearchFields::NAME));
        });
        self.reveal_current();
    }

    pub fn next_result(self) {
        self.search.update(|s| {
            s.next();
        });
        self.reveal_current();
    }

    pub fn prev_result(self) {
        self.search.update(|s| {
            s.prev();
        });
        self.reveal_current();
    }

    fn reveal_current(self) {
        let Some(key) = self.search.with_untracked(|s| s.current_key().map(str::to_string)) else {
            return;
        };
        self.tree.with_untracked(|t| {
            if let Some(tree) = t.loaded() {
                if let Some(id) = tree.id_of(&key) {
                    self.expansion.update(|e| e.reveal(tree, id));
                }
            }
        });
    }

    pub fn toggle_expand(self, key: &str) {
        self.tree.with_untracked(|t| {
            if let Some(tree) = t.loaded() {
                if let Some(id) = tree.id_of(key) {
                    self.expansion.update(|e| {
                        e.toggle(tree, id);
                    });
                }
            }
        });
    }

    pub fn apply_global(self, signal: GlobalSignal) {
        self.expansion.update(|e| e.apply_global(signal));
    }

    pub fn toggle_highlight(self, key: &str) {
        self.highlighted.update(|h| {
            if !h.remove(key) {
                h.insert(key.to_string());
            }
        });
    }

    pub fn toggle_org_mode(self) {
        self.settings.update(|s| s.org_mode = !s.org_mode);
        self.save_settings();
    }

    /// 詳細モーダルを開き、在籍履歴を取りに行く
    pub fn open_node(self, key: String) {
        let name = self.tree.with_untracked(|t| {
            t.loaded()
                .and_then(|tree| tree.id_of(&key).map(|id| tree.node(id).name_str().to_string()))
        });
        self.candidates.set(LoadState::Idle);
        self.update.set(LoadState::Idle);
        self.modal.set(Modal::Node(key));
        if let Some(name) = name.filter(|n| !n.is_empty()) {
            self.load_timeline(name);
        }
    }

    /// 人物の在籍履歴を取得
    pub fn load_timeline(self, name: String) {
        let Some(folder_id) = self.folder_id() else {
            self.timeline.set(LoadState::Failed("フォルダが不明です".into()));
            return;
        };
        let Some(ticket) = self.begin(RequestSlot::Timeline) else {
            return;
        };
        let table_id = self.table_id.get_untracked();
        self.timeline.set(LoadState::Loading);
        let client = self.client();
        spawn_local(async move {
            let result = client.timeline(folder_id, &name, table_id).await;
            self.requests.with_untracked(|r| {
                self.timeline.update(|t| {
                    t.settle(r, &ticket, result);
                });
            });
        });
    }

    pub fn load_comparison(self, table1_id: i64, table2_id: i64) {
        let Some(ticket) = self.begin(RequestSlot::Compare) else {
            return;
        };
        self.comparison.set(LoadState::Loading);
        let client = self.client();
        spawn_local(async move {
            let result = client.compare(table1_id, table2_id).await;
            self.requests.with_untracked(|r| {
                self.comparison.update(|c| {
                    c.settle(r, &ticket, result);
                });
            });
        });
    }

    /// 同じテーブルの人物を取得し、移動先の候補にする
    pub fn load_candidates(self, node: OrgNode) {
        let (Some(folder_id), Some(table_id)) = (self.folder_id(), self.table_id.get_untracked()) else {
            self.candidates.set(LoadState::Failed("フォルダが不明です".into()));
            return;
        };
        let Some(ticket) = self.begin(RequestSlot::Search) else {
            return;
        };
        self.candidates.set(LoadState::Loading);
        let client = self.client();
        spawn_local(async move {
            let result = client
                .search(folder_id, table_id, "", &CANDIDATE_COLUMNS)
                .await
                .map(|response| candidates(&response.results, &node));
            self.requests.with_untracked(|r| {
                self.candidates.update(|c| {
                    c.settle(r, &ticket, result);
                });
            });
        });
    }

    pub fn submit_hierarchy(self, request: HierarchyUpdateRequest) {
        let (Some(folder_id), Some(table_id)) = (self.folder_id(), self.table_id.get_untracked()) else {
            self.update.set(LoadState::Failed("フォルダが不明です".into()));
            return;
        };
        let client = self.client();
        self.run_update(async move { client.update_hierarchy(folder_id, table_id, &request).await });
    }

    pub fn submit_personal(self, request: PersonalUpdateRequest) {
        let Some(folder_id) = self.folder_id() else {
            self.update.set(LoadState::Failed("フォルダが不明です".into()));
            return;
        };
        let client = self.client();
        self.run_update(async move { client.update_person(folder_id, &request).await });
    }

    /// 更新に成功したらツリーを丸ごと取り直す
    fn run_update<F>(self, call: F)
    where
        F: std::future::Future<Output = Result<UpdateResponse, String>> + 'static,
    {
        let Some(ticket) = self.begin(RequestSlot::Update) else {
            return;
        };
        self.update.set(LoadState::Loading);
        spawn_local(async move {
            let result = call
                .await
                .map(|response| response.message.unwrap_or_else(|| "更新しました".to_string()));
            let applied = self.requests.with_untracked(|r| self.update.try_update(|u| u.settle(r, &ticket, result.clone())));
            if applied == Some(true) {
                if let Ok(message) = result {
                    self.notice.set(Some(message));
                    self.reload();
                }
            }
        });
    }
}
