use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver};
use std::time::Duration;

use anyhow::Result;
use eframe::egui::{self, Align2, Color32, FontId, Pos2, Rect, RichText, Sense, Stroke, Vec2};
use eframe::egui::{FontData, FontDefinitions, FontFamily};

use orgchart_common::{
    layout, Action, Clock, Decoration, GlobalSignal, LayoutConfig, Point, PointerButton, PressOutcome, RenderPass,
    Shortcut, Size, TreeLayout, ViewportTransform, ZoomLimits,
};
use orgchart_common::shortcuts::SHORTCUTS;
use orgchart_common::viewport::{KEY_PAN_STEP, KEY_ZOOM_FACTOR};

use crate::io::{default_export_path, load_org_tree, save_org_tree, write_excel};
use crate::model::ViewerState;

const DETAIL_FIELDS: &[&str] = &["Role", "Department", "Email", "Person ID", "Rank", "Birth date"];

pub struct DesktopApp {
    state: ViewerState,
    status: String,
    export_status: String,
    export_rx: Option<Receiver<UiMessage>>,
    exporting: bool,
    show_help: bool,
    show_search: bool,
    /// 直近フレームの描画領域（中央寄せ・キーズーム用）
    container: Option<Size>,
    content: Option<Size>,
    center_pending: bool,
}

enum UiMessage {
    ExportDone { message: String },
}

impl DesktopApp {
    fn open_json(&mut self) {
        if let Some(path) = rfd::FileDialog::new().add_filter("JSON", &["json"]).pick_file() {
            match self.load_from_path(&path) {
                Ok(_) => self.status = format!("Loaded {}", path.display()),
                Err(err) => self.status = format!("Load failed: {err:#}"),
            }
        }
    }

    fn reload_json(&mut self) {
        let Some(path) = self.state.source_path.clone() else {
            self.status = "No source file loaded".to_string();
            return;
        };
        match self.load_from_path(&path) {
            Ok(_) => self.status = format!("Reloaded {}", path.display()),
            Err(err) => self.status = format!("Reload failed: {err:#}"),
        }
    }

    fn load_from_path(&mut self, path: &Path) -> Result<()> {
        let tree = load_org_tree(path)?;
        self.state.replace_tree(tree, path.to_path_buf());
        self.center_pending = true;
        Ok(())
    }

    fn save_json(&mut self) {
        let (Some(tree), Some(source)) = (&self.state.tree, &self.state.source_path) else {
            self.status = "No source file loaded".to_string();
            return;
        };
        let default_path = default_export_path(source, "json");
        if let Some(path) = rfd::FileDialog::new()
            .set_file_name(default_path.file_name().and_then(|s| s.to_str()).unwrap_or("orgchart.json"))
            .save_file()
        {
            match save_org_tree(&path, tree) {
                Ok(_) => self.status = format!("Saved {}", path.display()),
                Err(err) => self.status = format!("Save failed: {err:#}"),
            }
        }
    }

    fn run_export(&mut self) {
        let (Some(tree), Some(source)) = (&self.state.tree, &self.state.source_path) else {
            self.export_status = "No source file loaded".to_string();
            return;
        };
        let default_path = default_export_path(source, "xlsx");
        let Some(output) = rfd::FileDialog::new()
            .add_filter("Excel", &["xlsx"])
            .set_file_name(default_path.file_name().and_then(|s| s.to_str()).unwrap_or("orgchart.xlsx"))
            .save_file()
        else {
            return;
        };

        let tree = tree.clone();
        let (tx, rx) = mpsc::channel();
        self.export_rx = Some(rx);
        self.exporting = true;
        self.export_status = "Export running...".to_string();

        std::thread::spawn(move || {
            let message = match write_excel(&output, &tree) {
                Ok(_) => format!("Exported {}", output.display()),
                Err(err) => format!("Export failed: {err:#}"),
            };
            let _ = tx.send(UiMessage::ExportDone { message });
        });
    }

    fn poll_messages(&mut self) {
        if let Some(rx) = &self.export_rx {
            if let Ok(UiMessage::ExportDone { message }) = rx.try_recv() {
                self.export_status = message;
                self.exporting = false;
                self.export_rx = None;
            }
        }
    }

    fn center(&mut self, tree_layout: &TreeLayout) {
        let (Some(container), Some(root)) = (self.container, tree_layout.boxes().first()) else {
            return;
        };
        let target = Point::new(root.center_x(), root.y + container.height / 4.0);
        self.state.viewport.center_on(target, container);
    }

    fn handle_outcome(&mut self, outcome: PressOutcome) {
        match outcome {
            PressOutcome::Click(key) => self.state.selected = Some(key),
            PressOutcome::LongPress(key) => self.state.toggle_highlight(&key),
            PressOutcome::ToggleExpand(key) => self.state.toggle_expand(&key),
        }
    }

    fn run_action(&mut self, action: Action, tree_layout: &TreeLayout) {
        match action {
            Action::Help => self.show_help = !self.show_help,
            Action::ChangeTable => self.open_json(),
            Action::Filter | Action::ToggleSearch => self.show_search = !self.show_search,
            Action::ClearFilter => {
                self.state.filter_input.clear();
                self.state.apply_filter_input();
            }
            Action::ToggleOrgMode => self.state.org_mode = !self.state.org_mode,
            Action::Center => self.center(tree_layout),
            Action::ExpandAll => self.state.expansion.apply_global(GlobalSignal::ExpandAll),
            Action::CollapseAll => self.state.expansion.apply_global(GlobalSignal::CollapseAll),
            Action::Upload | Action::Compare => {
                self.status = "Upload and compare need the backend (use the orgchart CLI)".to_string();
            }
            Action::ZoomIn | Action::ZoomOut => {
                let Some(container) = self.container else {
                    return;
                };
                let factor = if action == Action::ZoomIn { KEY_ZOOM_FACTOR } else { 1.0 / KEY_ZOOM_FACTOR };
                let anchor = Point::new(container.width / 2.0, container.height / 2.0);
                let limits = ZoomLimits::from_measurements(Some(container), self.content);
                self.state.viewport.zoom_step(factor, anchor, limits);
            }
            pan => {
                if let Some((dx, dy)) = pan.pan_delta(KEY_PAN_STEP) {
                    self.state.viewport.pan_by_screen(dx, dy);
                }
            }
        }
    }

    fn handle_keys(&mut self, ctx: &egui::Context, tree_layout: &TreeLayout) {
        if ctx.wants_keyboard_input() {
            return;
        }
        let actions: Vec<Action> = ctx.input(|i| {
            i.events
                .iter()
                .filter_map(|event| match event {
                    egui::Event::Key { key, pressed: true, modifiers, .. } => {
                        Shortcut::from_key(key_name(*key), modifiers.command)
                    }
                    _ => None,
                })
                .collect()
        });
        for action in actions {
            self.run_action(action, tree_layout);
        }
    }

    fn render_sidebar(&mut self, ui: &mut egui::Ui) {
        if self.show_search {
            ui.heading("Search");
            let response = ui.text_edit_singleline(&mut self.state.search_input);
            if response.changed() {
                self.state.run_search();
            }
            if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                self.state.next_result();
            }
            ui.horizontal(|ui| {
                if ui.button("▲").clicked() {
                    self.state.prev_result();
                }
                if ui.button("▼").clicked() {
                    self.state.next_result();
                }
                if let Some(label) = self.state.search.position_label() {
                    ui.label(label);
                }
            });
            ui.separator();

            ui.heading("Filter");
            ui.label(RichText::new("Names or roles, comma separated").color(Color32::from_gray(170)));
            ui.text_edit_singleline(&mut self.state.filter_input);
            ui.horizontal(|ui| {
                if ui.button("Apply").clicked() {
                    self.state.apply_filter_input();
                }
                if ui.button("Clear").clicked() {
                    self.state.filter_input.clear();
                    self.state.apply_filter_input();
                }
            });
            ui.separator();
        }

        ui.heading("Details");
        let Some(tree) = &self.state.tree else {
            ui.label("Open an org JSON file.");
            return;
        };
        let Some(node) = self.state.selected.as_deref().and_then(|k| tree.id_of(k)).map(|id| tree.node(id)) else {
            ui.label("Click a node to see details.");
            return;
        };
        ui.label(RichText::new(node.display_name()).strong().size(16.0));
        let values = [
            node.role.clone(),
            node.department.clone(),
            node.email.clone(),
            node.person_id.as_ref().map(|v| v.to_string()),
            node.rank.as_ref().map(|v| v.to_string()),
            node.birth_date.clone(),
        ];
        egui::Grid::new("details").striped(true).show(ui, |ui| {
            for (label, value) in DETAIL_FIELDS.iter().zip(values) {
                ui.label(RichText::new(*label).color(Color32::from_gray(200)));
                ui.label(orgchart_common::truncate(value.as_deref(), 40));
                ui.end_row();
            }
        });
        ui.label(format!("{} direct reports", node.children.len()));
    }

    fn render_canvas(&mut self, ui: &mut egui::Ui, pass: &RenderPass, tree_layout: &TreeLayout) {
        let (response, painter) = ui.allocate_painter(ui.available_size(), Sense::click_and_drag());
        let origin = response.rect.min;
        self.container = Some(Size::new(response.rect.width() as f64, response.rect.height() as f64));
        self.content = Some(tree_layout.bounds());
        if self.center_pending && !tree_layout.boxes().is_empty() {
            self.center(tree_layout);
            self.center_pending = false;
        }

        let local = |pos: Pos2| Point::new((pos.x - origin.x) as f64, (pos.y - origin.y) as f64);
        let transform = self.state.viewport.transform();
        let hit = |pos: Pos2| {
            tree_layout
                .hit_test(transform.to_content(local(pos)))
                .map(|b| b.key.clone())
        };

        // パン
        for (egui_button, button) in [
            (egui::PointerButton::Primary, PointerButton::Primary),
            (egui::PointerButton::Middle, PointerButton::Middle),
        ] {
            if response.drag_started_by(egui_button) {
                self.state.press.cancel();
                self.state.viewport.pointer_down(button);
            }
        }
        if response.dragged() {
            let delta = response.drag_delta();
            self.state.viewport.pointer_move(delta.x as f64, delta.y as f64);
        }
        if response.drag_stopped() {
            self.state.viewport.pointer_up();
        }

        // クリック・長押し
        let (pressed, released, pointer) =
            ui.input(|i| (i.pointer.primary_pressed(), i.pointer.primary_released(), i.pointer.interact_pos()));
        let now = self.state.clock.now();
        if pressed && response.hovered() {
            if let Some(key) = pointer.and_then(hit) {
                self.state.press.press_primary(key, now);
            }
        }
        if let Some(outcome) = self.state.press.tick(now) {
            self.handle_outcome(outcome);
        }
        if released {
            match pointer.and_then(hit) {
                Some(key) => {
                    if let Some(outcome) = self.state.press.release(&key, now) {
                        self.handle_outcome(outcome);
                    }
                }
                None => self.state.press.cancel(),
            }
        }
        if response.secondary_clicked() {
            if let Some(key) = pointer.and_then(hit) {
                let outcome = self.state.press.press_secondary(key);
                self.handle_outcome(outcome);
            }
        }
        if self.state.press.pressed_key().is_some() {
            ui.ctx().request_repaint_after(Duration::from_millis(50));
        }

        // ホイールズーム（上スクロールで拡大）
        if let Some(hover) = response.hover_pos() {
            let scroll = ui.input(|i| i.raw_scroll_delta.y);
            if scroll != 0.0 {
                let limits = ZoomLimits::from_measurements(self.container, self.content);
                self.state.viewport.wheel(-scroll as f64, local(hover), limits);
            }
        }

        paint_chart(&painter, origin, &self.state.viewport.transform(), pass, tree_layout);
        if pass.is_empty() && self.state.tree.is_some() {
            painter.text(
                response.rect.center(),
                Align2::CENTER_CENTER,
                "No nodes match the filter",
                FontId::proportional(16.0),
                Color32::from_gray(150),
            );
        }
    }

    fn render_help(&mut self, ctx: &egui::Context) {
        let mut open = self.show_help;
        egui::Window::new("Keyboard shortcuts").open(&mut open).show(ctx, |ui| {
            egui::Grid::new("shortcuts").striped(true).show(ui, |ui| {
                for shortcut in SHORTCUTS {
                    ui.label(RichText::new(shortcut.label()).monospace());
                    ui.label(shortcut.description);
                    ui.end_row();
                }
            });
            ui.separator();
            ui.label("Drag to pan, wheel to zoom. Click a node for details, hold to highlight, right-click to expand or collapse.");
        });
        self.show_help = open;
    }
}

/// egui のキーを `Shortcut::from_key` の表記へ
fn key_name(key: egui::Key) -> &'static str {
    match key {
        egui::Key::ArrowLeft => "arrowleft",
        egui::Key::ArrowRight => "arrowright",
        egui::Key::ArrowUp => "arrowup",
        egui::Key::ArrowDown => "arrowdown",
        egui::Key::Equals | egui::Key::Plus => "=",
        egui::Key::Minus => "-",
        other => other.name(),
    }
}

fn rgb(c: [u8; 3]) -> Color32 {
    Color32::from_rgb(c[0], c[1], c[2])
}

fn paint_chart(
    painter: &egui::Painter,
    origin: Pos2,
    transform: &ViewportTransform,
    pass: &RenderPass,
    tree_layout: &TreeLayout,
) {
    let scale = transform.scale as f32;
    let to_screen = |p: Point| {
        let q = transform.to_screen(p);
        Pos2::new(origin.x + q.x as f32, origin.y + q.y as f32)
    };

    let link_stroke = Stroke::new((2.0 * scale).max(1.0), Color32::from_gray(150));
    for link in tree_layout.links() {
        for line in &link.segments {
            painter.line_segment([to_screen(line.from), to_screen(line.to)], link_stroke);
        }
    }

    for node in pass.nodes() {
        let Some(b) = tree_layout.box_of(&node.key) else {
            continue;
        };
        let min = to_screen(Point::new(b.x, b.y));
        let rect = Rect::from_min_size(min, Vec2::new(b.width as f32 * scale, b.height as f32 * scale));
        if !painter.clip_rect().intersects(rect) {
            continue;
        }

        let (fill, stroke) = match node.decoration {
            Decoration::Current => (Color32::from_rgb(255, 237, 213), Stroke::new(4.0, Color32::from_rgb(249, 115, 22))),
            d if d.is_border() => (rgb(node.color.fill_rgb()), Stroke::new(3.0, Color32::from_rgb(96, 165, 250))),
            _ => (rgb(node.color.fill_rgb()), Stroke::new(2.0, rgb(node.color.border_rgb()))),
        };
        painter.rect(rect, 8.0 * scale, fill, stroke);

        let primary = orgchart_common::truncate(Some(node.primary_text().as_str()), 28);
        let secondary = orgchart_common::truncate(Some(node.secondary_text().as_str()), 32);
        painter.text(
            rect.center() - Vec2::new(0.0, 18.0 * scale),
            Align2::CENTER_CENTER,
            primary,
            FontId::proportional(18.0 * scale),
            Color32::from_gray(20),
        );
        painter.text(
            rect.center() + Vec2::new(0.0, 12.0 * scale),
            Align2::CENTER_CENTER,
            secondary,
            FontId::proportional(14.0 * scale),
            Color32::from_gray(70),
        );
        if node.has_disclosure {
            painter.text(
                Pos2::new(rect.center().x, rect.bottom() - 14.0 * scale),
                Align2::CENTER_CENTER,
                if node.expanded { "−" } else { "+" },
                FontId::monospace(16.0 * scale),
                Color32::from_gray(40),
            );
        }
    }
}

pub fn configure_fonts(ctx: &egui::Context) {
    let mut fonts = FontDefinitions::default();
    // 日本語・ヘブライ語の名前を表示できるフォント
    let candidates = [
        r"C:\Windows\Fonts\meiryo.ttc",
        r"C:\Windows\Fonts\msgothic.ttc",
        "/System/Library/Fonts/Supplemental/Arial Unicode.ttf",
        "/usr/share/fonts/truetype/noto/NotoSansCJK-Regular.ttc",
        "/usr/share/fonts/opentype/noto/NotoSansCJK-Regular.ttc",
    ];

    for path in candidates {
        if let Ok(data) = std::fs::read(path) {
            fonts.font_data.insert("fallback".to_string(), FontData::from_owned(data));
            fonts.families.entry(FontFamily::Proportional).or_default().insert(0, "fallback".to_string());
            fonts.families.entry(FontFamily::Monospace).or_default().insert(0, "fallback".to_string());
            ctx.set_fonts(fonts);
            return;
        }
    }
}

impl DesktopApp {
    /// 起動引数でファイルが渡されたら開く
    pub fn new(initial: Option<PathBuf>) -> Self {
        let mut app = Self {
            state: ViewerState::default(),
            status: String::new(),
            export_status: String::new(),
            export_rx: None,
            exporting: false,
            show_help: false,
            show_search: true,
            container: None,
            content: None,
            center_pending: false,
        };
        if let Some(path) = initial {
            match app.load_from_path(&path) {
                Ok(_) => app.status = format!("Loaded {}", path.display()),
                Err(err) => app.status = format!("Load failed: {err:#}"),
            }
        }
        app
    }
}

impl eframe::App for DesktopApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.exporting {
            ctx.request_repaint();
        }
        self.poll_messages();

        let pass = self.state.render_pass();
        let tree_layout = layout(&pass, &LayoutConfig::default());
        self.handle_keys(ctx, &tree_layout);

        egui::TopBottomPanel::top("top").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("Open JSON").clicked() {
                        self.open_json();
                        ui.close_menu();
                    }
                    if ui.button("Reload JSON").clicked() {
                        self.reload_json();
                        ui.close_menu();
                    }
                    let loaded = self.state.tree.is_some();
                    if ui.add_enabled(loaded, egui::Button::new("Save JSON")).clicked() {
                        self.save_json();
                        ui.close_menu();
                    }
                    if ui.add_enabled(loaded && !self.exporting, egui::Button::new("Export Excel")).clicked() {
                        self.run_export();
                        ui.close_menu();
                    }
                });

                ui.menu_button("View", |ui| {
                    if ui.button("Expand all").clicked() {
                        self.run_action(Action::ExpandAll, &tree_layout);
                        ui.close_menu();
                    }
                    if ui.button("Collapse all").clicked() {
                        self.run_action(Action::CollapseAll, &tree_layout);
                        ui.close_menu();
                    }
                    if ui.button("Center").clicked() {
                        self.run_action(Action::Center, &tree_layout);
                        ui.close_menu();
                    }
                    ui.checkbox(&mut self.state.org_mode, "Org mode");
                    ui.checkbox(&mut self.show_search, "Search panel");
                    if ui.button("Shortcuts").clicked() {
                        self.show_help = true;
                        ui.close_menu();
                    }
                });

                ui.separator();
                ui.label(format!("{:.0}%", self.state.viewport.transform().scale * 100.0));
                if !self.state.highlighted.is_empty() {
                    ui.label(format!("{} highlighted", self.state.highlighted.len()));
                }
                if !self.export_status.is_empty() {
                    ui.label(RichText::new(&self.export_status).color(Color32::from_rgb(246, 196, 69)));
                }
                if !self.status.is_empty() {
                    ui.label(RichText::new(&self.status).color(Color32::from_gray(170)));
                }
            });
        });

        egui::SidePanel::left("side").resizable(true).show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                self.render_sidebar(ui);
            });
        });

        // 検索・フィルタの変更を同じフレームで反映
        let pass = self.state.render_pass();
        let tree_layout = layout(&pass, &LayoutConfig::default());
        egui::CentralPanel::default().show(ctx, |ui| {
            self.render_canvas(ui, &pass, &tree_layout);
        });

        self.render_help(ctx);
    }
}
