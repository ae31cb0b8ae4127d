use std::path::PathBuf;
use std::sync::mpsc::channel;
use crate::app::file_dialogs;
use crate::app::format::TargetFormat;
use crate::app::image_processing::{self, ConversionResult};
use crate::app::{App, ConversionProgress, ConversionUpdate};
use egui::{Color32, Frame, ProgressBar, RichText, Rounding, Slider, Stroke};

const ACCENT: Color32 = Color32::from_rgb(100, 200, 250);

enum ListAction {
    Toggle(usize),
    RemoveSelected,
    ClearAll,
}

pub fn render(app: &mut App, ctx: &egui::Context) {
    let dropped: Vec<PathBuf> = ctx
        .input()
        .raw
        .dropped_files
        .iter()
        .filter_map(|file| file.path.clone())
        .collect();
    if !dropped.is_empty() {
        let added = app.add_files(dropped);
        app.logger.log(format!("{} file(s) dropped onto the window.", added));
    }

    let frame = Frame {
        fill: Color32::from_rgb(30, 30, 40),
        rounding: Rounding::same(10.0),
        stroke: Stroke::new(1.0, ACCENT),
        inner_margin: egui::style::Margin::same(20.0),
        ..Default::default()
    };

    egui::CentralPanel::default().frame(frame).show(ctx, |ui| {
        ui.heading(RichText::new("Image Converter").size(28.0).color(ACCENT));
        ui.add_space(10.0);

        // Drop zone
        ui.group(|ui| {
            ui.set_min_width(ui.available_width());
            ui.set_min_height(40.0);
            ui.centered_and_justified(|ui| {
                ui.label("Drag and drop files here or click 'Add Files'");
            });
        });

        ui.add_space(5.0);
        let mut action = None;

        ui.horizontal(|ui| {
            if ui.button("Add Files").clicked() {
                if let Some(files) = file_dialogs::select_images() {
                    let added = app.add_files(files);
                    app.logger.log(format!("{} image(s) added.", added));
                }
            }
            if ui.button("Remove Selected").clicked() {
                action = Some(ListAction::RemoveSelected);
            }
            if ui.button("Clear All").clicked() {
                action = Some(ListAction::ClearAll);
            }
        });

        // File list
        ui.group(|ui| {
            ui.set_min_width(ui.available_width());
            ui.label(RichText::new(format!("Files ({})", app.input_files.len())).size(16.0).color(ACCENT));
            egui::ScrollArea::vertical()
                .id_source("file_list")
                .max_height(180.0)
                .auto_shrink([false; 2])
                .show(ui, |ui| {
                    for (index, file) in app.input_files.iter().enumerate() {
                        let selected = app.selected_files.contains(&index);
                        let response = ui
                            .selectable_label(selected, file.display().to_string())
                            .context_menu(|ui| {
                                if ui.button("Remove Selected").clicked() {
                                    action = Some(ListAction::RemoveSelected);
                                    ui.close_menu();
                                }
                                if ui.button("Clear All").clicked() {
                                    action = Some(ListAction::ClearAll);
                                    ui.close_menu();
                                }
                            });
                        if response.clicked() {
                            action = Some(ListAction::Toggle(index));
                        }
                    }
                });
        });

        match action {
            Some(ListAction::Toggle(index)) => app.toggle_selected(index),
            Some(ListAction::RemoveSelected) => {
                let removed = app.remove_selected();
                app.logger.log(format!("{} file(s) removed.", removed));
            }
            Some(ListAction::ClearAll) => {
                app.clear_all();
                app.logger.log("File list cleared.".to_string());
            }
            None => {}
        }

        ui.add_space(10.0);

        // Conversion Settings
        ui.horizontal(|ui| {
            egui::ComboBox::from_label("Select Output Format")
                .selected_text(app.target_format.name())
                .show_ui(ui, |ui| {
                    for format in TargetFormat::ALL {
                        ui.selectable_value(&mut app.target_format, format, format.name());
                    }
                });
            ui.add_space(20.0);
            let lossy = app.target_format.is_lossy();
            ui.add_enabled(lossy, egui::Checkbox::new(&mut app.quality_enabled, "Custom quality"));
            ui.add_enabled(
                lossy && app.quality_enabled,
                Slider::new(&mut app.compression_quality, 1..=100).text("Quality"),
            );
        });

        ui.add_space(5.0);
        if ui.button("Select Output Directory").clicked() {
            if let Some(dir) = file_dialogs::select_output_directory(&app.output_directory) {
                app.output_directory = dir;
                app.logger.log(format!("Output directory set to {}.", app.output_directory.display()));
            }
        }
        ui.label(format!("Output Dir: {}", app.output_directory.display()));

        ui.add_space(10.0);
        let convert = ui.add_enabled(
            !app.is_converting(),
            egui::Button::new(RichText::new("Convert Images").size(16.0)),
        );
        if convert.clicked() {
            start_conversion(app);
        }

        ui.add_space(10.0);

        // Results
        ui.group(|ui| {
            ui.set_min_width(ui.available_width());
            ui.label(RichText::new("Results").size(16.0).color(ACCENT));

            let progress = &app.conversion_progress;
            if app.is_converting() && progress.total > 0 {
                let progress_ratio = progress.completed as f32 / progress.total as f32;
                ui.add(ProgressBar::new(progress_ratio).text(format!("{} / {}", progress.completed, progress.total)));
            }

            egui::ScrollArea::vertical()
                .id_source("results")
                .max_height(200.0)
                .auto_shrink([false; 2])
                .show(ui, |ui| {
                    for result in &app.results {
                        let color = match result {
                            ConversionResult::Success(_) => Color32::GREEN,
                            ConversionResult::Failure { .. } => Color32::RED,
                        };
                        ui.label(RichText::new(result.report_line()).color(color));
                    }
                });

            if let Some(message) = &app.completion_message {
                ui.label(RichText::new(message).color(Color32::from_rgb(200, 200, 200)));
            }
        });

        ui.add_space(10.0);

        // Conversion Log
        ui.group(|ui| {
            ui.set_min_width(ui.available_width());
            ui.label(RichText::new("Conversion Log").size(16.0).color(ACCENT));

            egui::ScrollArea::vertical()
                .id_source("log")
                .max_height(ui.available_height())
                .auto_shrink([false; 2])
                .show(ui, |ui| {
                    let logs = app.log_messages.lock();
                    for log in logs.iter() {
                        if log.contains("error") || log.contains("failed") {
                            ui.label(RichText::new(log).color(Color32::RED));
                        } else {
                            ui.label(log);
                        }
                    }
                });
        });
    });
}

fn start_conversion(app: &mut App) {
    app.results.clear();
    app.completion_message = None;

    if app.input_files.is_empty() {
        app.logger.warn("No images selected for conversion.".to_string());
        file_dialogs::warn_no_files();
        return;
    }

    let input_files = app.input_files.clone();
    let settings = app.settings();
    let logger = app.logger.clone();
    let total = input_files.len();

    app.conversion_progress = ConversionProgress { total, completed: 0 };
    let (sender, receiver) = channel();
    app.conversion_receiver = Some(receiver);

    std::thread::spawn(move || {
        let report = image_processing::convert_images(&input_files, &settings, &logger, |index, result| {
            // The window may already be closed; nothing left to report to.
            let _ = sender.send(ConversionUpdate::FileConverted(result.clone()));
            let _ = sender.send(ConversionUpdate::Progress(index + 1, total));
        });
        logger.log(format!(
            "{} converted, {} failed.",
            report.succeeded(),
            report.failed()
        ));
        let _ = sender.send(ConversionUpdate::Completed(report.elapsed));
    });
}
