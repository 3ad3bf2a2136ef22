pub mod assembly;
pub mod convert;
pub mod fetch;
pub mod info;

use crate::error::{CliError, Result};
use macromol::engine::config::BuildOptions;
use macromol::workflows::file::File;
use std::path::Path;
use tracing::info;

pub fn load(path: &Path, options: &BuildOptions) -> Result<File> {
    info!("Loading input structure from {:?}", path);
    File::open_with_options(path, options).map_err(|e| CliError::FileParsing {
        path: path.to_path_buf(),
        source: e,
    })
}

pub fn save(file: &File, path: &Path) -> Result<()> {
    file.save(path).map_err(|e| CliError::FileWriting {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Rounds every coordinate of every model.
pub fn trim(file: &mut File, places: Option<u32>) {
    if places.is_none() {
        return;
    }
    for model in file.models_mut() {
        let atoms = model.atom_ids();
        model.trim(&atoms, places);
    }
}
