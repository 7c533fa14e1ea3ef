use anyhow::Context as _;
use loader::TileLoader;
use mapplot::prelude::*;
use std::{collections::VecDeque, time::Duration};

mod loader;

/// Events kept in the side panel log
const EVENT_LOG_LEN: usize = 12;

/// Standalone map viewer.
///
/// Usage: `mapplot-app [config.json]`. `MAPPLOT_CENTER="lat,lng"` overrides
/// the configured center.
fn main() -> anyhow::Result<()> {
    env_logger::init();

    let mut config = match std::env::args().nth(1) {
        Some(path) => MapPlotConfig::from_file(&path)
            .with_context(|| format!("failed to load config from {path}"))?,
        None => MapPlotConfig::default(),
    };
    if let Ok(center) = std::env::var("MAPPLOT_CENTER") {
        let center: LatLng = center.parse().context("MAPPLOT_CENTER")?;
        config.center = [center.lat, center.lng];
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([config.width as f32 + 260.0, config.height as f32 + 40.0])
            .with_title("mapplot"),
        ..Default::default()
    };

    let app = MapPlotApp::new(config)?;
    eframe::run_native("mapplot-app", options, Box::new(move |_cc| Box::new(app)))
        .map_err(|e| anyhow::anyhow!("viewer exited with an error: {e}"))
}

/// The main application struct
struct MapPlotApp {
    map: MapPlot,
    bus: Rc<EventBus>,
    _mount: MountGuard,
    loader: TileLoader,
    selected_preset: &'static str,
    event_log: VecDeque<String>,
    visible_tiles: usize,
    hovered_url: Option<String>,
}

impl MapPlotApp {
    fn new(config: MapPlotConfig) -> anyhow::Result<Self> {
        let map = MapPlot::new(config)?;
        let bus = EventBus::new();
        let mount = map.mount(&bus);
        let loader = TileLoader::new().context("failed to start tile loader")?;

        Ok(Self {
            map,
            bus,
            _mount: mount,
            loader,
            selected_preset: "",
            event_log: VecDeque::new(),
            visible_tiles: 0,
            hovered_url: None,
        })
    }

    fn location_presets(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.label("Quick locations:");

            let presets = [
                ("United States", LatLng::new(37.8, -96.0), 4),
                ("New York", LatLng::new(40.7128, -74.0060), 11),
                ("London", LatLng::new(51.5074, -0.1278), 11),
                ("Tokyo", LatLng::new(35.6762, 139.6503), 11),
                ("Sydney", LatLng::new(-33.8688, 151.2093), 11),
            ];

            for (name, center, zoom) in presets {
                if ui
                    .selectable_label(self.selected_preset == name, name)
                    .clicked()
                {
                    self.selected_preset = name;
                    self.map.set_zoom(zoom);
                    self.map.set_center(center);
                }
            }
        });
    }

    /// Translates this frame's egui pointer state into bus events, in
    /// press, move, release, wheel order
    fn forward_input(&self, ui: &egui::Ui, response: &egui::Response, origin: egui::Pos2) {
        let (pressed, released, position, moved, scroll) = ui.input(|i| {
            (
                i.pointer.primary_pressed(),
                i.pointer.primary_released(),
                i.pointer.latest_pos(),
                i.pointer.delta() != egui::Vec2::ZERO,
                i.raw_scroll_delta.y,
            )
        });
        let Some(position) = position else {
            return;
        };
        let position = Point::new((position.x - origin.x) as f64, (position.y - origin.y) as f64);
        let target = if response.hovered() {
            EventTarget::Container
        } else {
            EventTarget::Window
        };

        if pressed && target == EventTarget::Container {
            self.bus.dispatch(target, &InputEvent::PointerDown { position });
        }
        if moved {
            self.bus.dispatch(target, &InputEvent::PointerMove { position });
        }
        if released {
            self.bus.dispatch(target, &InputEvent::PointerUp { position });
        }
        if scroll != 0.0 && target == EventTarget::Container {
            // egui reports wheel-up as positive; the map follows the DOM convention.
            let delta_y = -scroll as f64;
            self.bus.dispatch(target, &InputEvent::Wheel { delta_y, position });
        }
    }

    fn paint(&mut self, ui: &egui::Ui, rect: egui::Rect) {
        let painter = ui.painter_at(rect);
        painter.rect_filled(rect, 0.0, egui::Color32::from_rgb(170, 211, 223));

        let frame = self.map.frame();
        let hover = ui.input(|i| i.pointer.hover_pos());
        self.hovered_url = None;

        for tile in &frame.tiles {
            let min = rect.min + egui::vec2(tile.left as f32, tile.top as f32);
            let tile_rect = egui::Rect::from_min_size(min, egui::Vec2::splat(tile.size as f32));
            if hover.is_some_and(|pos| tile_rect.contains(pos)) {
                self.hovered_url = Some(tile.url.clone());
            }

            if let Some(texture) = self.loader.texture(tile.coord) {
                let uv = egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0));
                painter.image(texture.id(), tile_rect, uv, egui::Color32::WHITE);
                continue;
            }

            // Placeholder while the image loads, or for good if it failed.
            let shade = if (tile.coord.x + tile.coord.y) % 2 == 0 {
                egui::Color32::from_rgb(242, 239, 233)
            } else {
                egui::Color32::from_rgb(232, 228, 220)
            };
            painter.rect_filled(tile_rect, 0.0, shade);
            painter.rect_stroke(tile_rect, 0.0, egui::Stroke::new(1.0, egui::Color32::GRAY));
            let label = if self.loader.is_failed(tile.coord) {
                format!("{} (failed)", tile.coord)
            } else {
                tile.coord.to_string()
            };
            painter.text(
                tile_rect.center(),
                egui::Align2::CENTER_CENTER,
                label,
                egui::FontId::monospace(14.0),
                egui::Color32::DARK_GRAY,
            );
        }

        for marker in &frame.markers {
            let pos = rect.min + egui::vec2(marker.position.x as f32, marker.position.y as f32);
            painter.circle_filled(pos, 5.0, egui::Color32::from_rgb(200, 40, 40));
            if let Some(label) = &marker.label {
                painter.text(
                    pos + egui::vec2(8.0, 0.0),
                    egui::Align2::LEFT_CENTER,
                    label,
                    egui::FontId::proportional(12.0),
                    egui::Color32::BLACK,
                );
            }
        }

        painter.text(
            rect.right_bottom() - egui::vec2(4.0, 4.0),
            egui::Align2::RIGHT_BOTTOM,
            "© OpenStreetMap contributors",
            egui::FontId::proportional(11.0),
            egui::Color32::DARK_GRAY,
        );
    }

    fn record_events(&mut self) {
        for event in self.map.take_events() {
            let line = match event {
                MapEvent::MoveStart { focus } => {
                    format!("drag start at {:.4}, {:.4}", focus.lat, focus.lng)
                }
                MapEvent::MoveEnd { focus } => {
                    format!("drag end at {:.4}, {:.4}", focus.lat, focus.lng)
                }
                MapEvent::ZoomChanged { from, to } => format!("zoom {from} -> {to}"),
            };
            log::debug!("{line}");
            self.event_log.push_front(line);
            self.event_log.truncate(EVENT_LOG_LEN);
        }

        let diff = self.map.update_visible_tiles();
        if !diff.is_empty() {
            let map = &self.map;
            self.loader.sync(&diff, |coord| map.tile_url(coord));
            self.visible_tiles = map.tile_grid().keys().len();
        }
    }
}

impl eframe::App for MapPlotApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.loader.poll(ctx);
        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            ui.horizontal(|ui| {
                self.location_presets(ui);

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let viewport = self.map.viewport();
                    let focus = viewport.focal_lat_lng();
                    ui.label(format!(
                        "Focus: {:.4}, {:.4} | Zoom: {}",
                        focus.lat,
                        focus.lng,
                        viewport.zoom()
                    ));
                });
            });
        });

        egui::SidePanel::left("info_panel").resizable(true).show(ctx, |ui| {
            ui.heading("View");
            ui.separator();

            let viewport = self.map.viewport();
            let pixel_center = viewport.pixel_center();
            ui.label(format!("Dragging: {}", self.map.is_dragging()));
            ui.label(format!(
                "Pixel center: {:.1}, {:.1}",
                pixel_center.x, pixel_center.y
            ));
            ui.label(format!(
                "Visible tiles: {} ({} loaded, {} loading)",
                self.visible_tiles,
                self.loader.loaded(),
                self.loader.pending()
            ));
            ui.label(format!("Points: {}", self.map.points().len()));

            let mut logical = viewport.zoom_anchor() == ZoomAnchor::LogicalCenter;
            if ui
                .checkbox(&mut logical, "Zoom resets to configured center")
                .changed()
            {
                self.map.set_zoom_anchor(if logical {
                    ZoomAnchor::LogicalCenter
                } else {
                    ZoomAnchor::PixelCenter
                });
            }

            if ui.button("Recenter").clicked() {
                self.map.set_center(viewport.center());
            }

            ui.separator();
            ui.label("Tile under pointer:");
            ui.monospace(self.hovered_url.as_deref().unwrap_or("-"));

            ui.separator();
            ui.heading("Events");
            for line in &self.event_log {
                ui.label(line);
            }
        });

        egui::CentralPanel::default()
            .frame(egui::Frame::none())
            .show(ctx, |ui| {
                let (rect, response) =
                    ui.allocate_exact_size(ui.available_size(), egui::Sense::click_and_drag());
                self.map.resize(rect.width() as f64, rect.height() as f64);
                self.forward_input(ui, &response, rect.min);
                self.paint(ui, rect);
            });

        self.record_events();
        if self.loader.pending() > 0 {
            // Workers don't touch the UI; check back for finished downloads.
            ctx.request_repaint_after(Duration::from_millis(50));
        }
    }
}
