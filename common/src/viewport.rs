//! パン・ズームの変換
//!
//! コンテンツ座標 p と画面座標 q の関係は `q = offset + scale * p`。
//! ドラッグは画面上の移動量を現在の倍率で割ってオフセットに足す。
//! ホイールズームはポインタ位置を固定点としてオフセットを補正する。
//! 倍率の書き込みは必ず `[min, max]` のクランプを通る。

use serde::{Deserialize, Serialize};

/// 最大倍率
pub const MAX_SCALE: f64 = 3.0;
/// 計測できないときの最小倍率
pub const FALLBACK_MIN_SCALE: f64 = 0.1;
/// ホイール1単位あたりの倍率変化
pub const WHEEL_SENSITIVITY: f64 = 0.001;
/// 矢印キー1回のパン量（画面px）
pub const KEY_PAN_STEP: f64 = 50.0;
/// `=` / `-` キーの倍率
pub const KEY_ZOOM_FACTOR: f64 = 1.1;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// 幅・高さがともに正の有限値
    pub fn is_measurable(self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

/// パンのオフセット（x, y）と倍率
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportTransform {
    pub x: f64,
    pub y: f64,
    pub scale: f64,
}

impl Default for ViewportTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl ViewportTransform {
    pub const IDENTITY: ViewportTransform = ViewportTransform { x: 0.0, y: 0.0, scale: 1.0 };

    pub const fn new(x: f64, y: f64, scale: f64) -> Self {
        Self { x, y, scale }
    }

    /// コンテンツ座標 → 画面座標
    pub fn to_screen(&self, p: Point) -> Point {
        Point::new(self.x + self.scale * p.x, self.y + self.scale * p.y)
    }

    /// 画面座標 → コンテンツ座標
    pub fn to_content(&self, q: Point) -> Point {
        Point::new((q.x - self.x) / self.scale, (q.y - self.y) / self.scale)
    }

    /// CSS の transform 値（原点は左上）
    pub fn css(&self) -> String {
        format!("translate({}px, {}px) scale({})", self.x, self.y, self.scale)
    }
}

/// 倍率の上下限（常に `0 < min <= max`）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomLimits {
    min: f64,
    max: f64,
}

impl Default for ZoomLimits {
    fn default() -> Self {
        Self {
            min: FALLBACK_MIN_SCALE,
            max: MAX_SCALE,
        }
    }
}

impl ZoomLimits {
    /// 有限で `0 < min <= max` のときだけ作れる
    pub fn new(min: f64, max: f64) -> Option<Self> {
        if min.is_finite() && max.is_finite() && min > 0.0 && min <= max {
            Some(Self { min, max })
        } else {
            None
        }
    }

    /// コンテナとコンテンツの描画サイズから上下限を決める
    ///
    /// 最小は幅比・高さ比の小さい方の半分。どちらかが計測できなければ 0.1。
    pub fn from_measurements(container: Option<Size>, content: Option<Size>) -> Self {
        match (container, content) {
            (Some(container), Some(content)) if container.is_measurable() && content.is_measurable() => {
                let ratio = (container.width / content.width).min(container.height / content.height);
                Self::new((ratio * 0.5).min(MAX_SCALE), MAX_SCALE).unwrap_or_default()
            }
            _ => Self::default(),
        }
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn clamp(&self, scale: f64) -> f64 {
        scale.max(self.min).min(self.max)
    }
}

/// ポインタのボタン
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
}

/// ドラッグとホイールでビューポートを動かす
#[derive(Debug, Clone, PartialEq)]
pub struct ViewportController {
    transform: ViewportTransform,
    initial: ViewportTransform,
    dragging: bool,
}

impl Default for ViewportController {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewportController {
    pub fn new() -> Self {
        Self::with_transform(ViewportTransform::IDENTITY)
    }

    /// 倍率は既定の上下限に収める。オフセットか倍率が壊れていれば原点・等倍
    pub fn with_transform(initial: ViewportTransform) -> Self {
        let initial = if initial.x.is_finite() && initial.y.is_finite() && initial.scale.is_finite() && initial.scale > 0.0 {
            ViewportTransform {
                scale: ZoomLimits::default().clamp(initial.scale),
                ..initial
            }
        } else {
            ViewportTransform::IDENTITY
        };
        Self {
            transform: initial,
            initial,
            dragging: false,
        }
    }

    pub fn transform(&self) -> ViewportTransform {
        self.transform
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// 主ボタンのみドラッグを開始する。ドラッグ中の再押下は無視
    pub fn pointer_down(&mut self, button: PointerButton) -> bool {
        if button != PointerButton::Primary || self.dragging {
            return false;
        }
        self.dragging = true;
        true
    }

    /// ドラッグ中なら画面上の移動量 / 倍率 をオフセットに足す
    pub fn pointer_move(&mut self, dx: f64, dy: f64) -> bool {
        if !self.dragging || !dx.is_finite() || !dy.is_finite() {
            return false;
        }
        self.transform.x += dx / self.transform.scale;
        self.transform.y += dy / self.transform.scale;
        true
    }

    pub fn pointer_up(&mut self) {
        self.dragging = false;
    }

    /// ホイールズーム。倍率は `1 - delta_y * 0.001` 倍
    pub fn wheel(&mut self, delta_y: f64, pointer: Point, limits: ZoomLimits) -> ViewportTransform {
        if !delta_y.is_finite() {
            return self.transform;
        }
        self.zoom_at(1.0 - delta_y * WHEEL_SENSITIVITY, pointer, limits)
    }

    /// 任意倍率でズーム（キーボード操作）
    pub fn zoom_step(&mut self, factor: f64, anchor: Point, limits: ZoomLimits) -> ViewportTransform {
        self.zoom_at(factor, anchor, limits)
    }

    fn zoom_at(&mut self, factor: f64, anchor: Point, limits: ZoomLimits) -> ViewportTransform {
        if !factor.is_finite() || !anchor.is_finite() {
            return self.transform;
        }
        let old = self.transform;
        if old.scale <= 0.0 {
            return old;
        }
        let scale = limits.clamp(old.scale * factor);
        let ratio = (scale - old.scale) / old.scale;
        self.transform = ViewportTransform {
            x: old.x - (anchor.x - old.x) * ratio,
            y: old.y - (anchor.y - old.y) * ratio,
            scale,
        };
        self.transform
    }

    /// 画面上の量でパン（矢印キー）
    pub fn pan_by_screen(&mut self, dx: f64, dy: f64) {
        if dx.is_finite() && dy.is_finite() {
            self.transform.x += dx / self.transform.scale;
            self.transform.y += dy / self.transform.scale;
        }
    }

    /// コンテンツ上の点をコンテナ中央に合わせる
    pub fn center_on(&mut self, content: Point, container: Size) {
        if !content.is_finite() || !container.is_measurable() {
            return;
        }
        let s = self.transform.scale;
        self.transform.x = container.width / 2.0 - s * content.x;
        self.transform.y = container.height / 2.0 - s * content.y;
    }

    /// 初期状態に戻す（ドラッグも終了）
    pub fn reset(&mut self) {
        self.transform = self.initial;
        self.dragging = false;
    }

    pub fn css_transform(&self) -> String {
        self.transform.css()
    }

    /// ドラッグ中は即時反映、それ以外は緩やかに
    pub fn transition(&self) -> &'static str {
        if self.dragging {
            "none"
        } else {
            "transform 0.3s ease-out"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() <= 1e-9 * a.abs().max(b.abs()).max(1.0)
    }

    #[test]
    fn test_default_transform() {
        let vp = ViewportController::new();
        assert_eq!(vp.transform(), ViewportTransform::new(0.0, 0.0, 1.0));
        assert!(!vp.is_dragging());
        assert_eq!(vp.transition(), "transform 0.3s ease-out");
    }

    #[test]
    fn test_pan_divides_by_scale() {
        for scale in [0.5, 2.0] {
            let mut vp = ViewportController::with_transform(ViewportTransform::new(10.0, 20.0, scale));
            assert!(vp.pointer_down(PointerButton::Primary));
            assert!(vp.pointer_move(30.0, -12.0));
            let t = vp.transform();
            assert_eq!(t.x - 10.0, 30.0 / scale);
            assert_eq!(t.y - 20.0, -12.0 / scale);
            assert_eq!(t.scale, scale);
        }
    }

    #[test]
    fn test_pan_only_while_dragging() {
        let mut vp = ViewportController::new();
        assert!(!vp.pointer_move(5.0, 5.0));
        assert!(!vp.pointer_down(PointerButton::Secondary));
        assert!(!vp.pointer_move(5.0, 5.0));

        assert!(vp.pointer_down(PointerButton::Primary));
        assert!(!vp.pointer_down(PointerButton::Primary));
        assert_eq!(vp.transition(), "none");
        vp.pointer_up();
        assert!(!vp.pointer_move(5.0, 5.0));
        assert_eq!(vp.transform(), ViewportTransform::IDENTITY);
    }

    #[test]
    fn test_wheel_keeps_point_under_pointer() {
        let pointer = Point::new(412.0, 233.0);
        for scale in [0.3, 1.0, 2.4] {
            let mut vp = ViewportController::with_transform(ViewportTransform::new(-50.0, 75.0, scale));
            let before = vp.transform().to_content(pointer);
            vp.wheel(-120.0, pointer, ZoomLimits::default());
            let after = vp.transform().to_content(pointer);
            assert!(close(before.x, after.x), "{} -> {}", before.x, after.x);
            assert!(close(before.y, after.y), "{} -> {}", before.y, after.y);
        }
    }

    #[test]
    fn test_wheel_factor() {
        let mut vp = ViewportController::new();
        let t = vp.wheel(100.0, Point::new(0.0, 0.0), ZoomLimits::default());
        assert!(close(t.scale, 0.9));
        let t = vp.wheel(-100.0, Point::new(0.0, 0.0), ZoomLimits::default());
        assert!(close(t.scale, 0.99));
    }

    #[test]
    fn test_wheel_clamps_repeatedly() {
        let limits = ZoomLimits::from_measurements(Some(Size::new(800.0, 600.0)), Some(Size::new(4000.0, 1200.0)));
        assert!(close(limits.min(), 0.1));

        let mut vp = ViewportController::new();
        for _ in 0..200 {
            let t = vp.wheel(500.0, Point::new(100.0, 100.0), limits);
            assert!(t.scale >= limits.min());
        }
        assert_eq!(vp.transform().scale, limits.min());

        for _ in 0..200 {
            let t = vp.wheel(-500.0, Point::new(100.0, 100.0), limits);
            assert!(t.scale <= MAX_SCALE);
        }
        assert_eq!(vp.transform().scale, MAX_SCALE);

        // 1回で係数が負になる量でも倍率は正のまま
        let t = vp.wheel(5000.0, Point::new(0.0, 0.0), limits);
        assert_eq!(t.scale, limits.min());
    }

    #[test]
    fn test_zoom_limits_fallback() {
        assert_eq!(ZoomLimits::from_measurements(None, Some(Size::new(10.0, 10.0))), ZoomLimits::default());
        assert_eq!(
            ZoomLimits::from_measurements(Some(Size::new(800.0, 600.0)), Some(Size::new(0.0, 100.0))),
            ZoomLimits::default()
        );
        assert_eq!(
            ZoomLimits::from_measurements(Some(Size::new(f64::NAN, 600.0)), Some(Size::new(10.0, 10.0))),
            ZoomLimits::default()
        );
        // 小さいコンテンツでも最小が最大を超えない
        let limits = ZoomLimits::from_measurements(Some(Size::new(800.0, 600.0)), Some(Size::new(10.0, 10.0)));
        assert_eq!(limits.min(), MAX_SCALE);
    }

    #[test]
    fn test_non_finite_input_ignored() {
        let mut vp = ViewportController::new();
        vp.wheel(f64::NAN, Point::new(0.0, 0.0), ZoomLimits::default());
        vp.wheel(10.0, Point::new(f64::INFINITY, 0.0), ZoomLimits::default());
        vp.pointer_down(PointerButton::Primary);
        vp.pointer_move(f64::NAN, 1.0);
        vp.pan_by_screen(f64::INFINITY, 0.0);
        assert_eq!(vp.transform(), ViewportTransform::IDENTITY);
    }

    #[test]
    fn test_keyboard_pan_and_zoom() {
        let mut vp = ViewportController::with_transform(ViewportTransform::new(0.0, 0.0, 2.0));
        vp.pan_by_screen(KEY_PAN_STEP, -KEY_PAN_STEP);
        assert_eq!(vp.transform().x, 25.0);
        assert_eq!(vp.transform().y, -25.0);

        let t = vp.zoom_step(KEY_ZOOM_FACTOR, Point::new(0.0, 0.0), ZoomLimits::default());
        assert!(close(t.scale, 2.2));
    }

    #[test]
    fn test_center_on() {
        let mut vp = ViewportController::with_transform(ViewportTransform::new(0.0, 0.0, 0.5));
        let target = Point::new(600.0, 400.0);
        let container = Size::new(1000.0, 800.0);
        vp.center_on(target, container);
        assert_eq!(vp.transform().to_screen(target), Point::new(500.0, 400.0));

        vp.center_on(target, Size::new(0.0, 0.0));
        assert_eq!(vp.transform().to_screen(target), Point::new(500.0, 400.0));
    }

    #[test]
    fn test_reset_restores_initial() {
        let initial = ViewportTransform::new(5.0, 6.0, 1.5);
        let mut vp = ViewportController::with_transform(initial);
        vp.pointer_down(PointerButton::Primary);
        vp.pointer_move(100.0, 100.0);
        vp.reset();
        assert_eq!(vp.transform(), initial);
        assert!(!vp.is_dragging());
    }

    #[test]
    fn test_degenerate_initial_scale_is_not_applied() {
        let mut vp = ViewportController::with_transform(ViewportTransform::new(0.0, 0.0, 0.0));
        assert_eq!(vp.transform(), ViewportTransform::IDENTITY);
        vp.pointer_down(PointerButton::Primary);
        vp.pointer_move(10.0, 10.0);
        assert_eq!(vp.transform(), ViewportTransform::new(10.0, 10.0, 1.0));
        let t = vp.wheel(-100.0, Point::new(0.0, 0.0), ZoomLimits::default());
        assert!(t.x.is_finite() && t.y.is_finite());

        // 保存された値から戻した変換も同じ扱い
        let restored: ViewportTransform = serde_json::from_str(r#"{"x":3.0,"y":4.0,"scale":-2.0}"#).unwrap();
        let vp = ViewportController::with_transform(restored);
        assert_eq!(vp.transform(), ViewportTransform::IDENTITY);

        let vp = ViewportController::with_transform(ViewportTransform::new(f64::NAN, 0.0, 1.0));
        assert_eq!(vp.transform(), ViewportTransform::IDENTITY);

        // 範囲外の倍率は上下限に収める
        let vp = ViewportController::with_transform(ViewportTransform::new(1.0, 2.0, 50.0));
        assert_eq!(vp.transform(), ViewportTransform::new(1.0, 2.0, MAX_SCALE));
        let vp = ViewportController::with_transform(ViewportTransform::new(1.0, 2.0, 0.001));
        assert_eq!(vp.transform().scale, FALLBACK_MIN_SCALE);
    }

    #[test]
    fn test_zoom_limits_reject_degenerate_bounds() {
        assert_eq!(ZoomLimits::new(0.0, 3.0), None);
        assert_eq!(ZoomLimits::new(-1.0, 3.0), None);
        assert_eq!(ZoomLimits::new(2.0, 1.0), None);
        assert_eq!(ZoomLimits::new(f64::NAN, 3.0), None);
        let limits = ZoomLimits::new(0.5, 0.5).unwrap();
        assert_eq!(limits.clamp(10.0), 0.5);

        // 極端に大きいコンテンツでも最小は正
        let limits = ZoomLimits::from_measurements(Some(Size::new(1.0, 1.0)), Some(Size::new(f64::MAX, f64::MAX)));
        assert!(limits.min() > 0.0);

        let mut vp = ViewportController::new();
        for _ in 0..3 {
            let t = vp.wheel(2000.0, Point::new(5.0, 5.0), limits);
            assert!(t.scale > 0.0 && t.x.is_finite() && t.y.is_finite());
        }
    }

    #[test]
    fn test_css_transform() {
        let vp = ViewportController::with_transform(ViewportTransform::new(12.5, -4.0, 0.75));
        assert_eq!(vp.css_transform(), "translate(12.5px, -4px) scale(0.75)");
    }

    #[test]
    fn test_transform_serde_round_trip() {
        let t = ViewportTransform::new(-31.5, 18.25, 1.375);
        let json = serde_json::to_string(&t).unwrap();
        assert_eq!(json, r#"{"x":-31.5,"y":18.25,"scale":1.375}"#);
        let back: ViewportTransform = serde_json::from_str(&json).unwrap();
        assert_eq!(back, t);
        let p = Point::new(33.0, 44.0);
        assert_eq!(back.to_screen(p), t.to_screen(p));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn arb_transform() -> impl Strategy<Value = ViewportTransform> {
            (-5000.0f64..5000.0, -5000.0f64..5000.0, 0.1f64..=3.0)
                .prop_map(|(x, y, scale)| ViewportTransform::new(x, y, scale))
        }

        proptest! {
            #[test]
            fn prop_wheel_anchor_is_fixed(
                start in arb_transform(),
                delta in -600.0f64..600.0,
                px in 0.0f64..2000.0,
                py in 0.0f64..2000.0,
            ) {
                let pointer = Point::new(px, py);
                let mut vp = ViewportController::with_transform(start);
                let before = vp.transform().to_content(pointer);
                vp.wheel(delta, pointer, ZoomLimits::default());
                let after = vp.transform().to_content(pointer);
                prop_assert!((before.x - after.x).abs() <= 1e-6 * before.x.abs().max(1.0));
                prop_assert!((before.y - after.y).abs() <= 1e-6 * before.y.abs().max(1.0));
            }

            #[test]
            fn prop_scale_stays_in_limits(
                deltas in prop::collection::vec(-2000.0f64..2000.0, 1..60),
                container in (1.0f64..3000.0, 1.0f64..3000.0),
                content in (1.0f64..20000.0, 1.0f64..20000.0),
            ) {
                let limits = ZoomLimits::from_measurements(
                    Some(Size::new(container.0, container.1)),
                    Some(Size::new(content.0, content.1)),
                );
                let mut vp = ViewportController::new();
                for d in deltas {
                    let t = vp.wheel(d, Point::new(10.0, 10.0), limits);
                    prop_assert!(t.scale > 0.0);
                    prop_assert!(t.scale >= limits.min() && t.scale <= limits.max());
                }
            }
        }
    }
}
