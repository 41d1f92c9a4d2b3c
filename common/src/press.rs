//! クリックと長押しの判定
//!
//! `Idle -> Pressed { key, since } -> (Click | LongPress)` の状態機械。
//! 時刻は呼び出し側が `Duration` で渡すので、実時間を待たずにテストできる。

use std::time::{Duration, Instant};

/// 長押しとみなすまでの時間
pub const LONG_PRESS_THRESHOLD: Duration = Duration::from_millis(500);

/// 押下の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PressOutcome {
    /// 閾値前に離した: ノード選択
    Click(String),
    /// 閾値を超えて押し続けた: ハイライト切替（クリックは発生しない）
    LongPress(String),
    /// 副ボタン: 開閉切替
    ToggleExpand(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum PressState {
    Idle,
    Pressed { key: String, since: Duration },
    /// 長押しを通知済み。離すまで何も起こさない
    Held { key: String },
}

/// 経過時間の取得元
pub trait Clock {
    fn now(&self) -> Duration;
}

/// 生成時点からの実経過時間
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self { origin: Instant::now() }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// 手動で進める時計
#[derive(Debug, Clone, Copy, Default)]
pub struct ManualClock {
    now: Duration,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&mut self, by: Duration) {
        self.now += by;
    }

    pub fn set(&mut self, now: Duration) {
        self.now = now;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.now
    }
}

#[derive(Debug, Clone)]
pub struct PressTracker {
    state: PressState,
    threshold: Duration,
}

impl Default for PressTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl PressTracker {
    pub fn new() -> Self {
        Self::with_threshold(LONG_PRESS_THRESHOLD)
    }

    pub fn with_threshold(threshold: Duration) -> Self {
        Self {
            state: PressState::Idle,
            threshold,
        }
    }

    /// 押下中のノード
    pub fn pressed_key(&self) -> Option<&str> {
        match &self.state {
            PressState::Idle => None,
            PressState::Pressed { key, .. } | PressState::Held { key } => Some(key),
        }
    }

    /// 主ボタン押下。前の押下は破棄される
    pub fn press_primary(&mut self, key: impl Into<String>, now: Duration) {
        self.state = PressState::Pressed {
            key: key.into(),
            since: now,
        };
    }

    /// 押し続けて閾値を超えたら一度だけ LongPress
    pub fn tick(&mut self, now: Duration) -> Option<PressOutcome> {
        match &self.state {
            PressState::Pressed { key, since } if now.saturating_sub(*since) >= self.threshold => {
                let key = key.clone();
                self.state = PressState::Held { key: key.clone() };
                Some(PressOutcome::LongPress(key))
            }
            _ => None,
        }
    }

    /// 離した。押したノードと違うノード上で離した場合は何も起きない
    pub fn release(&mut self, key: &str, now: Duration) -> Option<PressOutcome> {
        let state = std::mem::replace(&mut self.state, PressState::Idle);
        match state {
            PressState::Pressed { key: pressed, since } if pressed == key => {
                if now.saturating_sub(since) >= self.threshold {
                    Some(PressOutcome::LongPress(pressed))
                } else {
                    Some(PressOutcome::Click(pressed))
                }
            }
            _ => None,
        }
    }

    /// ポインタがノード外へ出た
    pub fn cancel(&mut self) {
        self.state = PressState::Idle;
    }

    /// 副ボタンは押下時間に関係なく開閉。保留中の主ボタン押下は取り消す
    pub fn press_secondary(&mut self, key: impl Into<String>) -> PressOutcome {
        self.state = PressState::Idle;
        PressOutcome::ToggleExpand(key.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn test_short_press_is_click() {
        let mut tracker = PressTracker::new();
        tracker.press_primary("/1", ms(1000));
        assert_eq!(tracker.tick(ms(1200)), None);
        assert_eq!(tracker.release("/1", ms(1499)), Some(PressOutcome::Click("/1".into())));
        assert_eq!(tracker.pressed_key(), None);
    }

    #[test]
    fn test_long_press_suppresses_click() {
        let mut clock = ManualClock::new();
        let mut tracker = PressTracker::new();
        tracker.press_primary("/1/2", clock.now());

        clock.advance(ms(499));
        assert_eq!(tracker.tick(clock.now()), None);
        clock.advance(ms(1));
        assert_eq!(tracker.tick(clock.now()), Some(PressOutcome::LongPress("/1/2".into())));
        clock.advance(ms(300));
        assert_eq!(tracker.tick(clock.now()), None);
        assert_eq!(tracker.release("/1/2", clock.now()), None);
    }

    #[test]
    fn test_long_press_detected_on_release_without_tick() {
        let mut tracker = PressTracker::new();
        tracker.press_primary("/1", ms(0));
        assert_eq!(tracker.release("/1", ms(650)), Some(PressOutcome::LongPress("/1".into())));
    }

    #[test]
    fn test_cancel_and_release_elsewhere() {
        let mut tracker = PressTracker::new();
        tracker.press_primary("/1", ms(0));
        tracker.cancel();
        assert_eq!(tracker.release("/1", ms(10)), None);

        tracker.press_primary("/1", ms(0));
        assert_eq!(tracker.release("/1/1", ms(10)), None);
    }

    #[test]
    fn test_secondary_always_toggles() {
        let mut tracker = PressTracker::new();
        tracker.press_primary("/1", ms(0));
        assert_eq!(tracker.press_secondary("/1"), PressOutcome::ToggleExpand("/1".into()));
        assert_eq!(tracker.tick(ms(2000)), None);
        assert_eq!(tracker.release("/1", ms(2000)), None);
    }

    #[test]
    fn test_custom_threshold() {
        let mut tracker = PressTracker::with_threshold(ms(100));
        tracker.press_primary("/x", ms(0));
        assert_eq!(tracker.tick(ms(100)), Some(PressOutcome::LongPress("/x".into())));
    }
}
