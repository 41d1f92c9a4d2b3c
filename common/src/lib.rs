//! Org Chart Common Library
//!
//! CLI・Web(WASM)・デスクトップで共有される組織図エンジン。I/O は持たない。
//!
//! - tree / expansion / search / filter: 組織ツリーと表示状態
//! - render / layout: 表示ノードの列挙と座標計算
//! - viewport / press: パン・ズームとクリック・長押しの判定
//! - edit: 人物の階層・個人情報の編集フォーム

pub mod compare;
pub mod edit;
pub mod error;
pub mod expansion;
pub mod export;
pub mod filter;
pub mod language;
pub mod layout;
pub mod press;
pub mod render;
pub mod request;
pub mod search;
pub mod shortcuts;
pub mod tree;
pub mod types;
pub mod viewport;

pub use compare::ComparisonReport;
pub use edit::{HierarchyEdit, PersonalEdit};
pub use error::{Error, Result};
pub use expansion::{ExpansionState, GlobalSignal};
pub use filter::{FilterField, FilterPicker, NodeFilter};
pub use language::{detect_language, truncate, Script};
pub use layout::{layout, LayoutConfig, NodeBox, TreeLayout};
pub use press::{Clock, ManualClock, PressOutcome, PressTracker, SystemClock};
pub use render::{
    render, Connector, Decoration, LevelColor, NodeObserver, PositionIndex, RenderContext, RenderPass,
    RenderTracker, RenderedNode,
};
pub use request::{LoadState, RequestSlot, RequestTicket, RequestTracker};
pub use search::{search_by_name, SearchFields, SearchState};
pub use shortcuts::{Action, Shortcut};
pub use tree::{NodeId, OrgTree};
pub use types::{FolderEntry, OrgNode, TableEntry};
pub use viewport::{Point, PointerButton, Size, ViewportController, ViewportTransform, ZoomLimits};
