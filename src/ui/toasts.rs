//! Toast overlay in the bottom-right corner.

use super::colors;
use crate::state::{AppState, ToastLevel};
use eframe::egui::{self, RichText};
use web_time::{Duration, Instant};

pub fn render_toasts(ctx: &egui::Context, state: &mut AppState) {
    let toasts = state.notifications.visible(Instant::now());

    if !toasts.is_empty() {
        egui::Area::new(egui::Id::new("toasts"))
            .anchor(egui::Align2::RIGHT_BOTTOM, egui::vec2(-12.0, -12.0))
            .order(egui::Order::Foreground)
            .interactable(false)
            .show(ctx, |ui| {
                for toast in &toasts {
                    let fill = match toast.level {
                        ToastLevel::Success => colors::toast::SUCCESS_FILL,
                        ToastLevel::Warning => colors::toast::WARNING_FILL,
                    };
                    egui::Frame::new()
                        .fill(fill)
                        .corner_radius(4.0)
                        .inner_margin(egui::Margin::symmetric(12, 8))
                        .show(ui, |ui| {
                            ui.set_max_width(320.0);
                            ui.label(RichText::new(&toast.message).color(colors::toast::TEXT));
                        });
                    ui.add_space(6.0);
                }
            });
    }

    // Keep ticking so delayed toasts appear and shown ones expire
    if state.notifications.is_active() {
        ctx.request_repaint_after(Duration::from_millis(250));
    }
}
