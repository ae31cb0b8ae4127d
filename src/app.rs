// app.rs
pub mod error;
pub mod file_dialogs;
pub mod format;
pub mod gui;
pub mod image_processing;

use eframe::egui;
use eframe::App as EframeApp;
use format::TargetFormat;
use image_processing::{ConversionResult, ConversionSettings};
use parking_lot::Mutex;
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::mpsc::{Receiver, TryRecvError};
use std::sync::Arc;
use std::time::Duration;
use crate::utils::Logger;

pub struct App {
    pub input_files: Vec<PathBuf>,
    pub selected_files: BTreeSet<usize>,
    pub target_format: TargetFormat,
    pub output_directory: PathBuf,
    pub compression_quality: u8,
    pub quality_enabled: bool,
    pub conversion_progress: ConversionProgress,
    pub results: Vec<ConversionResult>,
    pub completion_message: Option<String>,
    pub log_messages: Arc<Mutex<Vec<String>>>,
    pub logger: Logger,
    pub conversion_receiver: Option<Receiver<ConversionUpdate>>,
}

#[derive(Clone, Debug)]
pub enum ConversionUpdate {
    Progress(usize, usize),  // (completed, total)
    FileConverted(ConversionResult),
    Completed(Duration),
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ConversionProgress {
    pub total: usize,
    pub completed: usize,
}

impl Default for App {
    fn default() -> Self {
        let settings = ConversionSettings::default();
        let log_messages = Arc::new(Mutex::new(Vec::new()));
        Self {
            input_files: Vec::new(),
            selected_files: BTreeSet::new(),
            target_format: settings.format,
            output_directory: settings.output_directory,
            compression_quality: settings.format.default_quality(),
            quality_enabled: settings.quality.is_some(),
            conversion_progress: ConversionProgress::default(),
            results: Vec::new(),
            completion_message: None,
            logger: Logger::new(log_messages.clone()),
            log_messages,
            conversion_receiver: None,
        }
    }
}

impl App {
    /// Appends files that are not listed yet, keeping their order.
    pub fn add_files<I>(&mut self, files: I) -> usize
    where
        I: IntoIterator<Item = PathBuf>,
    {
        let mut added = 0;
        for file in files {
            if !self.input_files.contains(&file) {
                self.input_files.push(file);
                added += 1;
            }
        }
        added
    }

    pub fn toggle_selected(&mut self, index: usize) {
        if !self.selected_files.remove(&index) && index < self.input_files.len() {
            self.selected_files.insert(index);
        }
    }

    pub fn remove_selected(&mut self) -> usize {
        let selected = std::mem::take(&mut self.selected_files);
        for index in selected.iter().rev() {
            if *index < self.input_files.len() {
                self.input_files.remove(*index);
            }
        }
        selected.len()
    }

    pub fn clear_all(&mut self) {
        self.input_files.clear();
        self.selected_files.clear();
    }

    pub fn is_converting(&self) -> bool {
        self.conversion_receiver.is_some()
    }

    pub fn settings(&self) -> ConversionSettings {
        ConversionSettings {
            format: self.target_format,
            output_directory: self.output_directory.clone(),
            quality: self.quality_enabled.then_some(self.compression_quality),
        }
    }

    /// Applies pending updates from the conversion thread. Returns whether
    /// anything changed.
    pub fn drain_updates(&mut self) -> bool {
        let Some(receiver) = &self.conversion_receiver else {
            return false;
        };

        let mut changed = false;
        let mut completed = false;
        loop {
            let update = match receiver.try_recv() {
                Ok(update) => update,
                Err(TryRecvError::Empty) => break,
                // Worker thread went away without reporting completion.
                Err(TryRecvError::Disconnected) => {
                    completed = true;
                    break;
                }
            };
            changed = true;
            match update {
                ConversionUpdate::Progress(done, total) => {
                    self.conversion_progress.completed = done;
                    self.conversion_progress.total = total;
                }
                ConversionUpdate::FileConverted(result) => {
                    self.results.push(result);
                }
                ConversionUpdate::Completed(elapsed) => {
                    self.completion_message = Some(image_processing::completion_message(elapsed));
                    completed = true;
                }
            }
        }

        if completed {
            self.conversion_receiver = None;
        }
        changed
    }
}

impl EframeApp for App {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let needs_redraw = self.drain_updates();

        // Render the GUI
        gui::render(self, ctx);

        if needs_redraw || self.is_converting() {
            ctx.request_repaint();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc::channel;

    fn paths(names: &[&str]) -> Vec<PathBuf> {
        names.iter().map(PathBuf::from).collect()
    }

    #[test]
    fn defaults_match_the_converter_window() {
        let app = App::default();
        assert_eq!(app.target_format, TargetFormat::Jpeg);
        assert_eq!(app.compression_quality, 75);
        assert!(!app.quality_enabled);
        assert_eq!(app.settings().quality, None);
        assert!(app.input_files.is_empty());
        assert!(!app.is_converting());
    }

    #[test]
    fn settings_carry_quality_only_when_enabled() {
        let mut app = App::default();
        app.compression_quality = 55;
        assert_eq!(app.settings().quality, None);

        app.quality_enabled = true;
        assert_eq!(app.settings().quality, Some(55));
    }

    #[test]
    fn add_files_skips_duplicates_and_keeps_order() {
        let mut app = App::default();
        assert_eq!(app.add_files(paths(&["b.png", "a.png"])), 2);
        assert_eq!(app.add_files(paths(&["a.png", "c.png", "b.png"])), 1);
        assert_eq!(app.input_files, paths(&["b.png", "a.png", "c.png"]));
    }

    #[test]
    fn remove_selected_removes_exactly_the_selection() {
        let mut app = App::default();
        app.add_files(paths(&["0.png", "1.png", "2.png", "3.png"]));
        app.toggle_selected(1);
        app.toggle_selected(3);
        app.toggle_selected(2);
        app.toggle_selected(2);

        assert_eq!(app.remove_selected(), 2);
        assert_eq!(app.input_files, paths(&["0.png", "2.png"]));
        assert!(app.selected_files.is_empty());
    }

    #[test]
    fn toggle_ignores_indices_past_the_list() {
        let mut app = App::default();
        app.add_files(paths(&["only.png"]));
        app.toggle_selected(5);
        assert!(app.selected_files.is_empty());
    }

    #[test]
    fn clear_all_empties_list_and_selection() {
        let mut app = App::default();
        app.add_files(paths(&["x.png", "y.png"]));
        app.toggle_selected(0);
        app.clear_all();
        assert!(app.input_files.is_empty());
        assert!(app.selected_files.is_empty());
    }

    #[test]
    fn drain_updates_collects_results_until_completed() {
        let mut app = App::default();
        let (sender, receiver) = channel();
        app.conversion_receiver = Some(receiver);

        let success = ConversionResult::Success(PathBuf::from("out/a.png"));
        sender.send(ConversionUpdate::FileConverted(success.clone())).unwrap();
        sender.send(ConversionUpdate::Progress(1, 2)).unwrap();
        assert!(app.drain_updates());
        assert!(app.is_converting());
        assert_eq!(app.conversion_progress, ConversionProgress { total: 2, completed: 1 });

        sender.send(ConversionUpdate::Completed(Duration::from_millis(2500))).unwrap();
        assert!(app.drain_updates());
        assert!(!app.is_converting());
        assert_eq!(app.results, vec![success]);
        assert_eq!(
            app.completion_message.as_deref(),
            Some("Conversion completed in 2.50 seconds.")
        );
        assert!(!app.drain_updates());
    }

    #[test]
    fn dropped_worker_ends_the_conversion() {
        let mut app = App::default();
        let (sender, receiver) = channel::<ConversionUpdate>();
        app.conversion_receiver = Some(receiver);
        drop(sender);

        app.drain_updates();
        assert!(!app.is_converting());
        assert!(app.completion_message.is_none());
    }
}
