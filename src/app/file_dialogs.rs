// file_dialogs.rs
use crate::app::format::INPUT_EXTENSIONS;
use rfd::{FileDialog, MessageButtons, MessageDialog, MessageLevel};
use std::path::{Path, PathBuf};

pub fn select_images() -> Option<Vec<PathBuf>> {
    FileDialog::new()
        .set_title("Select Image Files")
        .add_filter("Image", INPUT_EXTENSIONS)
        .add_filter("All files", &["*"])
        .pick_files()
}

pub fn select_output_directory(current: &Path) -> Option<PathBuf> {
    FileDialog::new().set_directory(current).pick_folder()
}

pub fn warn_no_files() {
    MessageDialog::new()
        .set_level(MessageLevel::Warning)
        .set_title("No files")
        .set_description("Please add some image files to convert.")
        .set_buttons(MessageButtons::Ok)
        .show();
}
