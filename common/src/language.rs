//! 表示言語の判定と表示補助
//!
//! ヘブライ文字・アラビア文字を含む文字列は右から左に表示する。

use serde::{Deserialize, Serialize};

/// 文字列の書字系
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Script {
    Hebrew,
    Arabic,
    #[default]
    Default,
}

fn is_hebrew(c: char) -> bool {
    matches!(c, '\u{0590}'..='\u{05FF}' | '\u{FB1D}'..='\u{FB4F}')
}

fn is_arabic(c: char) -> bool {
    matches!(
        c,
        '\u{0600}'..='\u{06FF}'
            | '\u{0750}'..='\u{077F}'
            | '\u{08A0}'..='\u{08FF}'
            | '\u{FB50}'..='\u{FDFF}'
            | '\u{FE70}'..='\u{FEFF}'
    )
}

/// ヘブライ文字を1文字でも含めば Hebrew、次にアラビア文字
pub fn detect_language(text: &str) -> Script {
    if text.chars().any(is_hebrew) {
        Script::Hebrew
    } else if text.chars().any(is_arabic) {
        Script::Arabic
    } else {
        Script::Default
    }
}

impl Script {
    pub fn is_rtl(self) -> bool {
        self != Script::Default
    }

    /// `dir` 属性の値
    pub fn text_direction(self) -> &'static str {
        if self.is_rtl() {
            "rtl"
        } else {
            "ltr"
        }
    }

    pub fn font_class(self) -> &'static str {
        match self {
            Script::Hebrew => "font-hebrew",
            Script::Arabic | Script::Default => "font-merriweather",
        }
    }

    pub fn text_align_class(self) -> &'static str {
        if self.is_rtl() {
            "text-right"
        } else {
            "text-left"
        }
    }

    pub fn flex_direction_class(self) -> &'static str {
        if self.is_rtl() {
            "flex-row-reverse"
        } else {
            "flex-row"
        }
    }
}

/// `max` 文字を超えたら切り詰めて "..." を付ける。値が無ければ "N/A"
pub fn truncate(text: Option<&str>, max: usize) -> String {
    let Some(text) = text else {
        return "N/A".to_string();
    };
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max).collect();
    out.push_str("...");
    out
}
