//! 非同期リクエストの状態と古いレスポンスの破棄
//!
//! リクエストごとにチケットを発行し、完了時にそのチケットが同じ枠の
//! 最新でなければ結果を捨てる。テーブル切替で遅れて届いた前テーブルの
//! データが画面を上書きすることを防ぐ。

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// リクエストの枠（同じ枠では最新のリクエストだけが有効）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RequestSlot {
    Folders,
    OrgData,
    Search,
    Timeline,
    Compare,
    Update,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestTicket {
    slot: RequestSlot,
    generation: u64,
}

impl RequestTicket {
    pub fn slot(&self) -> RequestSlot {
        self.slot
    }
}

#[derive(Debug, Clone, Default)]
pub struct RequestTracker {
    latest: HashMap<RequestSlot, u64>,
    counter: u64,
}

impl RequestTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// 新しいリクエストを開始。同じ枠の以前のチケットは無効になる
    pub fn begin(&mut self, slot: RequestSlot) -> RequestTicket {
        self.counter += 1;
        self.latest.insert(slot, self.counter);
        RequestTicket {
            slot,
            generation: self.counter,
        }
    }

    pub fn is_current(&self, ticket: &RequestTicket) -> bool {
        self.latest.get(&ticket.slot) == Some(&ticket.generation)
    }

    /// 実行中のリクエストを捨てる（結果は反映されない）
    pub fn invalidate(&mut self, slot: RequestSlot) {
        self.counter += 1;
        self.latest.insert(slot, self.counter);
    }
}

/// 読み込み状態
#[derive(Debug, Clone, Default, PartialEq)]
pub enum LoadState<T> {
    #[default]
    Idle,
    Loading,
    Loaded(T),
    Failed(String),
}

impl<T> LoadState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, LoadState::Loading)
    }

    pub fn loaded(&self) -> Option<&T> {
        match self {
            LoadState::Loaded(v) => Some(v),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            LoadState::Failed(e) => Some(e),
            _ => None,
        }
    }

    /// チケットが最新のときだけ結果を反映。反映したら true
    pub fn settle<E: std::fmt::Display>(
        &mut self,
        tracker: &RequestTracker,
        ticket: &RequestTicket,
        result: Result<T, E>,
    ) -> bool {
        if !tracker.is_current(ticket) {
            return false;
        }
        *self = match result {
            Ok(v) => LoadState::Loaded(v),
            Err(e) => LoadState::Failed(e.to_string()),
        };
        true
    }
}
