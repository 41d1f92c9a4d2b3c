//! キーボードショートカット

use serde::{Deserialize, Serialize};

/// ショートカットで起動する操作
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    Help,
    ChangeTable,
    Filter,
    ClearFilter,
    ToggleOrgMode,
    ToggleSearch,
    Center,
    ExpandAll,
    CollapseAll,
    Upload,
    Compare,
    PanLeft,
    PanRight,
    PanUp,
    PanDown,
    ZoomIn,
    ZoomOut,
}

/// キー定義
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shortcut {
    pub key: &'static str,
    pub ctrl: bool,
    pub action: Action,
    pub description: &'static str,
}

pub const SHORTCUTS: &[Shortcut] = &[
    Shortcut { key: "h", ctrl: true, action: Action::Help, description: "Open this help modal" },
    Shortcut { key: "g", ctrl: true, action: Action::ChangeTable, description: "Change table" },
    Shortcut { key: "s", ctrl: true, action: Action::Filter, description: "Filter nodes" },
    Shortcut { key: "r", ctrl: true, action: Action::ClearFilter, description: "Remove search filter" },
    Shortcut { key: "o", ctrl: true, action: Action::ToggleOrgMode, description: "Toggle Org Mode" },
    Shortcut { key: "f", ctrl: true, action: Action::ToggleSearch, description: "Toggle searchbar" },
    Shortcut { key: "c", ctrl: true, action: Action::Center, description: "Center the chart" },
    Shortcut { key: "e", ctrl: true, action: Action::ExpandAll, description: "Expand all nodes" },
    Shortcut { key: "q", ctrl: true, action: Action::CollapseAll, description: "Collapse all nodes" },
    Shortcut { key: "u", ctrl: true, action: Action::Upload, description: "Upload new table" },
    Shortcut { key: "m", ctrl: true, action: Action::Compare, description: "Compare tables" },
    Shortcut { key: "arrowleft", ctrl: false, action: Action::PanLeft, description: "Navigate the chart" },
    Shortcut { key: "arrowright", ctrl: false, action: Action::PanRight, description: "Navigate the chart" },
    Shortcut { key: "arrowup", ctrl: false, action: Action::PanUp, description: "Navigate the chart" },
    Shortcut { key: "arrowdown", ctrl: false, action: Action::PanDown, description: "Navigate the chart" },
    Shortcut { key: "=", ctrl: false, action: Action::ZoomIn, description: "Zoom in" },
    Shortcut { key: "-", ctrl: false, action: Action::ZoomOut, description: "Zoom out" },
];

impl Shortcut {
    /// `KeyboardEvent.key` と Ctrl の有無から操作を引く（大文字小文字無視）
    pub fn from_key(key: &str, ctrl: bool) -> Option<Action> {
        let key = key.to_lowercase();
        SHORTCUTS
            .iter()
            .find(|s| s.key == key && s.ctrl == ctrl)
            .map(|s| s.action)
    }

    /// ヘルプ表示用の "Ctrl + H" 形式
    pub fn label(&self) -> String {
        let key = match self.key {
            "arrowleft" => "←".to_string(),
            "arrowright" => "→".to_string(),
            "arrowup" => "↑".to_string(),
            "arrowdown" => "↓".to_string(),
            other => other.to_uppercase(),
        };
        if self.ctrl {
            format!("Ctrl + {}", key)
        } else {
            key
        }
    }
}

impl Action {
    /// 矢印キーのパン方向（画面px）
    pub fn pan_delta(self, step: f64) -> Option<(f64, f64)> {
        match self {
            Action::PanLeft => Some((step, 0.0)),
            Action::PanRight => Some((-step, 0.0)),
            Action::PanUp => Some((0.0, step)),
            Action::PanDown => Some((0.0, -step)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_key() {
        assert_eq!(Shortcut::from_key("e", true), Some(Action::ExpandAll));
        assert_eq!(Shortcut::from_key("E", true), Some(Action::ExpandAll));
        assert_eq!(Shortcut::from_key("e", false), None);
        assert_eq!(Shortcut::from_key("ArrowLeft", false), Some(Action::PanLeft));
        assert_eq!(Shortcut::from_key("ArrowLeft", true), None);
        assert_eq!(Shortcut::from_key("=", false), Some(Action::ZoomIn));
        assert_eq!(Shortcut::from_key("x", true), None);
    }

    #[test]
    fn test_labels() {
        assert_eq!(SHORTCUTS[0].label(), "Ctrl + H");
        assert_eq!(SHORTCUTS.iter().find(|s| s.action == Action::PanUp).unwrap().label(), "↑");
    }

    #[test]
    fn test_pan_delta_moves_content_with_arrow() {
        assert_eq!(Action::PanLeft.pan_delta(50.0), Some((50.0, 0.0)));
        assert_eq!(Action::PanDown.pan_delta(50.0), Some((0.0, -50.0)));
        assert_eq!(Action::ZoomIn.pan_delta(50.0), None);
    }

    #[test]
    fn test_keys_are_unique() {
        for (i, a) in SHORTCUTS.iter().enumerate() {
            for b in &SHORTCUTS[i + 1..] {
                assert!(!(a.key == b.key && a.ctrl == b.ctrl), "{}", a.key);
            }
        }
    }
}
