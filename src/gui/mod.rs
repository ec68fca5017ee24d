pub mod canvas;
pub mod theme;

use crate::draw::surface::DrawingSurface;
use crate::gateway::AiGateway;
use crate::prompts::Verdict;
use crate::session::Orchestrator;
use crate::status::{StatusDisplay, StatusView};
use canvas::TouchTracker;
use eframe::egui;
use std::sync::Arc;
use std::time::{Duration, Instant};

const TITLE: &str = "FUTURE JOB DOODLE";
const CANVAS_MIN_HEIGHT: f32 = 180.0;
const FOOTER_RESERVE: f32 = 130.0;
const REPLY_POLL_INTERVAL: Duration = Duration::from_millis(100);

pub struct DoodleApp {
    orchestrator: Orchestrator,
    surface: DrawingSurface,
    status: StatusDisplay,
    touches: TouchTracker,
    canvas_texture: Option<(egui::TextureHandle, u64)>,
}

impl DoodleApp {
    pub fn new(cc: &eframe::CreationContext<'_>, gateway: Arc<dyn AiGateway>) -> Self {
        theme::apply(&cc.egui_ctx);
        Self {
            orchestrator: Orchestrator::new(gateway),
            surface: DrawingSurface::new(),
            status: StatusDisplay::new(),
            touches: TouchTracker::default(),
            canvas_texture: None,
        }
    }

    fn sync_texture(&mut self, ctx: &egui::Context) {
        let Some(buffer) = self.surface.buffer() else {
            return;
        };
        let revision = self.surface.revision();
        if matches!(&self.canvas_texture, Some((_, seen)) if *seen == revision) {
            return;
        }
        let image = egui::ColorImage::from_rgba_unmultiplied(
            [buffer.width as usize, buffer.height as usize],
            &buffer.pixels,
        );
        match self.canvas_texture.as_mut() {
            Some((texture, seen)) => {
                texture.set(image, egui::TextureOptions::LINEAR);
                *seen = revision;
            }
            None => {
                let texture = ctx.load_texture("drawing-surface", image, egui::TextureOptions::LINEAR);
                self.canvas_texture = Some((texture, revision));
            }
        }
    }

    fn status_ui(&mut self, ui: &mut egui::Ui, now: Instant) {
        let state = self.orchestrator.state();
        let view = self.status.view(
            state.job.as_ref(),
            state.loading,
            state.generation_error(),
            now,
        );
        egui::Frame::none()
            .fill(theme::PANEL)
            .stroke(egui::Stroke::new(3.0, theme::GOLD))
            .inner_margin(egui::Margin::same(12.0))
            .show(ui, |ui| {
                ui.set_width(ui.available_width());
                match view {
                    StatusView::Generating { label } => {
                        ui.label(egui::RichText::new(label).color(theme::GOLD));
                    }
                    StatusView::Error { message } => {
                        ui.label(egui::RichText::new(message).color(theme::CHERRY));
                    }
                    StatusView::Job { title, description } => {
                        ui.label(egui::RichText::new(title).heading().color(theme::GOLD));
                        ui.label(description);
                    }
                    StatusView::Placeholder { message } => {
                        ui.label(message);
                    }
                }
            });
    }

    fn canvas_ui(&mut self, ui: &mut egui::Ui) {
        let width = ui.available_width();
        let height = (ui.available_height() - FOOTER_RESERVE).max(CANVAS_MIN_HEIGHT);
        let (rect, _response) =
            ui.allocate_exact_size(egui::vec2(width, height), egui::Sense::drag());

        self.surface
            .resize((rect.width(), rect.height()), ui.ctx().pixels_per_point());
        let bounds = canvas::surface_rect(rect);
        let events = ui.input(|i| i.events.clone());
        let actions = self.touches.translate(&events);
        canvas::dispatch(&mut self.surface, actions, bounds);
        self.sync_texture(ui.ctx());

        let painter = ui.painter_at(rect);
        if let Some((texture, _)) = &self.canvas_texture {
            painter.image(
                texture.id(),
                rect,
                egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                egui::Color32::WHITE,
            );
        }
        painter.rect_stroke(rect.shrink(1.5), 0.0, egui::Stroke::new(3.0, theme::SKY));
    }

    fn feedback_ui(&self, ui: &mut egui::Ui) {
        let state = self.orchestrator.state();
        if state.analyzing {
            ui.label(egui::RichText::new("Looking at your drawing...").color(theme::GOLD));
        } else if let Some(message) = state.analysis_error() {
            ui.label(egui::RichText::new(message).color(theme::CHERRY));
        } else if let Some(notice) = state.notice {
            ui.label(egui::RichText::new(notice.message()).color(theme::GOLD));
        } else if let Some(compliment) = &state.compliment {
            let color = match state.verdict() {
                Some(Verdict::TryAgain) => theme::CHERRY,
                _ => theme::MINT,
            };
            ui.label(egui::RichText::new(compliment).strong().color(color));
        }
    }
}

impl eframe::App for DoodleApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.orchestrator.poll();
        let now = Instant::now();

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.heading(egui::RichText::new(TITLE).color(theme::GOLD));
            });
            ui.add_space(8.0);

            let busy = self.orchestrator.state().is_busy();
            if ui
                .add_enabled(!busy, egui::Button::new("START: Who will I be?"))
                .clicked()
            {
                self.orchestrator.generate_job(&mut self.surface);
            }
            ui.add_space(8.0);
            self.status_ui(ui, now);
            ui.add_space(8.0);

            self.canvas_ui(ui);
            ui.add_space(8.0);

            let state = self.orchestrator.state();
            let can_check = state.job.is_some() && !state.is_busy();
            let loading = state.loading;
            ui.horizontal(|ui| {
                if ui.add_enabled(!loading, egui::Button::new("Clear")).clicked() {
                    self.surface.clear();
                }
                if ui
                    .add_enabled(can_check, egui::Button::new("Check my drawing!"))
                    .clicked()
                {
                    self.orchestrator.check_drawing(&self.surface);
                }
            });
            ui.add_space(6.0);
            self.feedback_ui(ui);
        });

        if let Some(wait) = self.status.indicator().until_next_tick(now) {
            ctx.request_repaint_after(wait);
        }
        if self.orchestrator.state().is_busy() {
            ctx.request_repaint_after(REPLY_POLL_INTERVAL);
        }
    }
}
