//! ツリー内検索
//!
//! - 名前（と役職）の大文字小文字を無視した部分一致検索
//! - 検索結果の巡回（次へ / 前へ、端で折り返し）
//! - 表示ラベル中の一致部分の切り出し

use crate::tree::{NodeId, OrgTree};
use serde::{Deserialize, Serialize};

/// 検索対象のフィールド
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchFields {
    pub name: bool,
    pub role: bool,
}

impl SearchFields {
    pub const NAME: SearchFields = SearchFields { name: true, role: false };
    pub const NAME_AND_ROLE: SearchFields = SearchFields { name: true, role: true };
}

/// 大文字小文字を無視した部分一致（前後の空白は無視）
pub fn contains_ignore_case(text: &str, term: &str) -> bool {
    let needle = term.trim().to_lowercase();
    !needle.is_empty() && text.to_lowercase().contains(&needle)
}

/// 名前で幅優先検索
pub fn search_by_name(tree: &OrgTree, term: &str) -> Vec<NodeId> {
    search_nodes(tree, term, SearchFields::NAME)
}

/// 指定フィールドで幅優先検索。空の検索語は結果なし
pub fn search_nodes(tree: &OrgTree, term: &str, fields: SearchFields) -> Vec<NodeId> {
    if term.trim().is_empty() {
        return Vec::new();
    }
    tree.breadth_first()
        .into_iter()
        .filter(|&id| {
            let node = tree.node(id);
            (fields.name && contains_ignore_case(node.name_str(), term))
                || (fields.role && contains_ignore_case(node.role_str(), term))
        })
        .collect()
}

/// 現在の検索語・結果・選択位置
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchState {
    term: String,
    results: Vec<String>,
    current: Option<usize>,
}

impl SearchState {
    pub fn new() -> Self {
        Self::default()
    }

    /// 検索語を更新して結果を作り直す。先頭の結果が選択される
    pub fn update(&mut self, tree: Option<&OrgTree>, term: &str, fields: SearchFields) {
        self.term = term.to_string();
        self.results = match tree {
            Some(tree) => search_nodes(tree, term, fields)
                .into_iter()
                .map(|id| tree.key(id).to_string())
                .collect(),
            None => Vec::new(),
        };
        self.current = if self.results.is_empty() { None } else { Some(0) };
    }

    /// 結果リストを直接設定（バックエンド検索の結果など）
    pub fn set_results(&mut self, term: &str, results: Vec<String>) {
        self.term = term.to_string();
        self.current = if results.is_empty() { None } else { Some(0) };
        self.results = results;
    }

    pub fn term(&self) -> &str {
        &self.term
    }

    pub fn results(&self) -> &[String] {
        &self.results
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn current_key(&self) -> Option<&str> {
        self.current.and_then(|i| self.results.get(i)).map(|s| s.as_str())
    }

    pub fn is_match(&self, key: &str) -> bool {
        self.results.iter().any(|k| k == key)
    }

    pub fn is_current(&self, key: &str) -> bool {
        self.current_key() == Some(key)
    }

    /// 次の結果へ（末尾の次は先頭）
    pub fn next(&mut self) -> Option<&str> {
        if self.results.is_empty() {
            return None;
        }
        let len = self.results.len();
        self.current = Some(self.current.map_or(0, |i| (i + 1) % len));
        self.current_key()
    }

    /// 前の結果へ（先頭の前は末尾）
    pub fn prev(&mut self) -> Option<&str> {
        if self.results.is_empty() {
            return None;
        }
        let len = self.results.len();
        self.current = Some(self.current.map_or(len - 1, |i| (i + len - 1) % len));
        self.current_key()
    }

    /// "3/7" 形式の位置表示。結果が無ければ None
    pub fn position_label(&self) -> Option<String> {
        if self.term.trim().is_empty() {
            return None;
        }
        self.current
            .map(|i| format!("{}/{}", i + 1, self.results.len()))
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// 表示ラベルの断片
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment<'a> {
    pub text: &'a str,
    pub matched: bool,
}

/// 検索語に一致する部分（大文字小文字無視、重ならない）を切り出す
///
/// 元の表記はそのまま残る。検索語が空なら全体が非一致の1断片。
pub fn highlight_segments<'a>(text: &'a str, term: &str) -> Vec<Segment<'a>> {
    if text.is_empty() {
        return Vec::new();
    }
    let needle = term.trim().to_lowercase();
    if needle.is_empty() {
        return vec![Segment { text, matched: false }];
    }

    // 小文字化した文字列の各バイトが、元の文字列のどの文字から来たか
    let mut lowered = String::with_capacity(text.len());
    let mut origin: Vec<usize> = Vec::with_capacity(text.len());
    for (i, c) in text.char_indices() {
        let before = lowered.len();
        lowered.extend(c.to_lowercase());
        origin.extend(std::iter::repeat(i).take(lowered.len() - before));
    }

    let mut segments = Vec::new();
    let mut cursor = 0;
    let mut from = 0;

    while let Some(pos) = lowered[from..].find(&needle) {
        let start_l = from + pos;
        let end_l = start_l + needle.len();
        from = end_l;

        let start = origin[start_l].max(cursor);
        let last = origin[end_l - 1];
        let end = last + text[last..].chars().next().map_or(0, char::len_utf8);
        if end <= start {
            continue;
        }

        if start > cursor {
            segments.push(Segment { text: &text[cursor..start], matched: false });
        }
        segments.push(Segment { text: &text[start..end], matched: true });
        cursor = end;
    }

    if cursor < text.len() {
        segments.push(Segment { text: &text[cursor..], matched: false });
    }
    segments
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::tests::sample_tree;

    fn matched(segments: &[Segment]) -> Vec<String> {
        segments
            .iter()
            .filter(|s| s.matched)
            .map(|s| s.text.to_string())
            .collect()
    }

    #[test]
    fn test_search_by_name_breadth_first() {
        let tree = sample_tree();
        let results = search_by_name(&tree, "ann");
        let keys: Vec<_> = results.iter().map(|&id| tree.key(id)).collect();
        // Anna (depth 2) が Joanne (depth 3) より先
        assert_eq!(keys, vec!["/1/1/1", "/1/1/2/1"]);
    }

    #[test]
    fn test_search_empty_term() {
        let tree = sample_tree();
        assert!(search_by_name(&tree, "").is_empty());
        assert!(search_by_name(&tree, "   ").is_empty());
    }

    #[test]
    fn test_search_role() {
        let tree = sample_tree();
        assert!(search_by_name(&tree, "engineer").is_empty());
        assert_eq!(search_nodes(&tree, "engineer", SearchFields::NAME_AND_ROLE).len(), 2);
    }

    #[test]
    fn test_highlight_anna() {
        let segments = highlight_segments("Anna", "ann");
        assert_eq!(
            segments,
            vec![
                Segment { text: "Ann", matched: true },
                Segment { text: "a", matched: false },
            ]
        );
    }

    #[test]
    fn test_highlight_multiple_occurrences() {
        let segments = highlight_segments("Anna Hannah", "AN");
        assert_eq!(matched(&segments), vec!["An", "an"]);
        let joined: String = segments.iter().map(|s| s.text).collect();
        assert_eq!(joined, "Anna Hannah");
    }

    #[test]
    fn test_highlight_no_term() {
        assert_eq!(highlight_segments("Anna", ""), vec![Segment { text: "Anna", matched: false }]);
        assert!(highlight_segments("", "a").is_empty());
    }

    #[test]
    fn test_highlight_non_ascii() {
        let segments = highlight_segments("ÉLODIE", "élo");
        assert_eq!(matched(&segments), vec!["ÉLO"]);

        let segments = highlight_segments("דנה כהן", "כהן");
        assert_eq!(matched(&segments), vec!["כהן"]);
    }

    #[test]
    fn test_search_state_navigation_wraps() {
        let tree = sample_tree();
        let mut state = SearchState::new();
        state.update(Some(&tree), "n", SearchFields::NAME);
        // Dana, Noa, Anna, Ben, Joanne
        assert_eq!(state.results().len(), 5);
        assert_eq!(state.current_key(), Some("/1"));
        assert_eq!(state.position_label().as_deref(), Some("1/5"));

        assert_eq!(state.prev(), Some("/1/1/2/1"));
        assert_eq!(state.next(), Some("/1"));
        state.next();
        assert!(state.is_current("/1/2"));
        assert!(state.is_match("/1/1/1"));
        assert!(!state.is_current("/1/1/1"));
    }

    #[test]
    fn test_search_state_without_results() {
        let tree = sample_tree();
        let mut state = SearchState::new();
        state.update(Some(&tree), "zzz", SearchFields::NAME);
        assert_eq!(state.next(), None);
        assert_eq!(state.position_label(), None);

        state.update(None, "ann", SearchFields::NAME);
        assert!(state.results().is_empty());
    }

    #[test]
    fn test_set_results_and_clear() {
        let mut state = SearchState::new();
        state.set_results("x", vec!["/1/2".into(), "/1".into()]);
        assert_eq!(state.current_key(), Some("/1/2"));
        state.clear();
        assert_eq!(state.term(), "");
        assert!(state.current_key().is_none());
    }
}
