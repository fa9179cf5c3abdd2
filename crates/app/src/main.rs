use anyhow::{anyhow, Result};
use composer::OutputView;
use eframe::egui::{self, Color32, RichText};
use shared::WritingMode;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod state;
mod utils;

use state::AppState;

const ROYAL: Color32 = Color32::from_rgb(46, 36, 89);
const GOLD: Color32 = Color32::from_rgb(212, 175, 55);
const ERROR_RED: Color32 = Color32::from_rgb(190, 40, 40);

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let (settings, loaded) = utils::load_settings_or_default();
    info!(loaded, model = %settings.model.gemini_model, "settings ready");
    let state = AppState::new(settings)?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1100.0, 760.0])
            .with_min_inner_size([720.0, 520.0]),
        vsync: true,
        ..Default::default()
    };
    eframe::run_native(
        "Augustus",
        options,
        Box::new(move |_cc| Box::new(AugustusApp { state })),
    )
    .map_err(|e| anyhow!("failed to run UI: {e}"))
}

struct AugustusApp {
    state: AppState,
}

impl eframe::App for AugustusApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let s = &mut self.state;
        s.poll_generation();

        render_header(ctx, s);
        render_mode_selector(ctx, s);
        render_status_bar(ctx, s);
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.columns(2, |columns| {
                render_input(&mut columns[0], s);
                render_output(&mut columns[1], s);
            });
        });
        render_settings_window(ctx, s);
    }
}

fn render_header(ctx: &egui::Context, s: &mut AppState) {
    egui::TopBottomPanel::top("header")
        .frame(
            egui::Frame::none()
                .fill(ROYAL)
                .inner_margin(egui::Margin::symmetric(16.0, 10.0)),
        )
        .show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.vertical(|ui| {
                    ui.label(RichText::new("AUGUSTUS").size(24.0).strong().color(Color32::WHITE));
                    ui.label(RichText::new("THE GENERATION ENGINE").size(11.0).color(GOLD));
                });
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("Settings").clicked() {
                        s.open_settings();
                    }
                    ui.label(
                        RichText::new(format!("Powered by {}", s.settings.model.gemini_model))
                            .color(Color32::LIGHT_GRAY),
                    );
                });
            });
        });
}

fn render_mode_selector(ctx: &egui::Context, s: &mut AppState) {
    egui::TopBottomPanel::top("modes").show(ctx, |ui| {
        ui.add_space(8.0);
        ui.horizontal(|ui| {
            for mode in WritingMode::all() {
                let selected = s.writing.mode() == *mode;
                let mut text =
                    RichText::new(format!("{}\n{}", mode.display_name(), mode.tagline()));
                if selected {
                    text = text.strong().color(ROYAL);
                }
                if ui.add(egui::SelectableLabel::new(selected, text)).clicked() {
                    s.writing.select_mode(*mode);
                }
                ui.add_space(8.0);
            }
        });
        ui.add_space(8.0);
    });
}

fn render_status_bar(ctx: &egui::Context, s: &AppState) {
    egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
        ui.horizontal(|ui| {
            let status = if s.writing.is_streaming() { "Streaming" } else { "Ready" };
            ui.label(RichText::new(status).weak());
            ui.separator();
            ui.label(RichText::new(format!("Mode: {}", s.writing.mode().display_name())).weak());
            if let Some(notice) = &s.notice {
                ui.separator();
                ui.label(notice);
            }
        });
    });
}

fn render_input(ui: &mut egui::Ui, s: &mut AppState) {
    ui.heading("Input");
    ui.label(RichText::new(s.writing.mode().tagline()).weak());
    ui.add_space(4.0);

    egui::ScrollArea::vertical()
        .id_source("input_scroll")
        .max_height((ui.available_height() - 40.0).max(120.0))
        .show(ui, |ui| {
            ui.add(
                egui::TextEdit::multiline(&mut s.writing.input_text)
                    .desired_width(f32::INFINITY)
                    .desired_rows(18)
                    .hint_text("Enter a topic, an outline or a passage to work on..."),
            );
        });

    ui.add_space(6.0);
    ui.horizontal(|ui| {
        let chars = s.writing.input_text.chars().count();
        ui.label(RichText::new(format!("{chars} characters")).weak());
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            let label = if s.writing.is_streaming() { "Generating..." } else { "Generate" };
            let button = egui::Button::new(RichText::new(label).strong());
            if ui.add_enabled(s.writing.can_generate(), button).clicked() {
                let ctx = ui.ctx().clone();
                s.start_generation(&ctx);
            }
            if s.writing.is_streaming() && ui.button("Stop waiting").clicked() {
                s.writing.abandon();
            }
        });
    });
}

fn render_output(ui: &mut egui::Ui, s: &mut AppState) {
    let mut copy_requested = false;
    ui.horizontal(|ui| {
        ui.heading("Output");
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if ui
                .add_enabled(s.writing.can_copy(), egui::Button::new("Copy"))
                .clicked()
            {
                copy_requested = true;
            }
            if s.writing.is_streaming() {
                ui.spinner();
            }
        });
    });
    ui.separator();

    match s.writing.output_view() {
        OutputView::AwaitingInstructions => {
            ui.vertical_centered(|ui| {
                ui.add_space(60.0);
                ui.label(RichText::new("Awaiting Instructions").size(18.0).strong());
                ui.label(RichText::new("Select a mode and provide input to begin.").weak());
            });
        }
        OutputView::Thinking => {
            ui.vertical_centered(|ui| {
                ui.add_space(60.0);
                ui.spinner();
                ui.label("Augustus is thinking...");
            });
        }
        OutputView::Text {
            text,
            streaming,
            complete,
        } => {
            if !streaming && !complete {
                ui.label(RichText::new("Stopped waiting; this response is incomplete.").weak());
            }
            egui::ScrollArea::vertical()
                .id_source("output_scroll")
                .auto_shrink([false, false])
                .stick_to_bottom(true)
                .show(ui, |ui| {
                    ui.label(RichText::new(text).size(15.0));
                });
        }
        OutputView::Error(message) => {
            ui.vertical_centered(|ui| {
                ui.add_space(60.0);
                ui.label(RichText::new("Generation Halted").size(18.0).strong().color(ERROR_RED));
                ui.label(message);
            });
        }
    }

    if copy_requested {
        s.copy_output();
    }
}

fn render_settings_window(ctx: &egui::Context, s: &mut AppState) {
    if !s.show_settings {
        return;
    }
    let mut open = true;
    let mut save = false;
    egui::Window::new("Settings")
        .open(&mut open)
        .collapsible(false)
        .resizable(false)
        .show(ctx, |ui| {
            egui::Grid::new("settings_grid")
                .num_columns(2)
                .spacing([12.0, 8.0])
                .show(ui, |ui| {
                    ui.label("Gemini API key");
                    ui.add(
                        egui::TextEdit::singleline(&mut s.api_key_draft)
                            .password(true)
                            .hint_text("Falls back to GEMINI_API_KEY"),
                    );
                    ui.end_row();

                    ui.label("Model");
                    ui.text_edit_singleline(&mut s.model_draft);
                    ui.end_row();
                });
            ui.add_space(8.0);
            if ui.button("Save").clicked() {
                save = true;
            }
        });

    if save {
        match s.apply_settings() {
            Ok(()) => {
                s.notice = Some("Settings saved".into());
                open = false;
            }
            Err(e) => {
                warn!(error = %e, "failed to apply settings");
                s.notice = Some(format!("Could not save settings: {e}"));
            }
        }
    }
    if !open {
        s.show_settings = false;
    }
}
