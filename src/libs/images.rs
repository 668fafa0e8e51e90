//! Reminder images shown alongside primary interruptions.

use crate::libs::config::{AssetsConfig, ImageSelection};
use rand::seq::SliceRandom;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

const IMAGE_EXTENSIONS: [&str; 2] = ["png", "gif"];

#[derive(Debug, Clone)]
pub struct ImageCatalog {
    images: Vec<PathBuf>,
    selection: ImageSelection,
    cursor: usize,
}

impl ImageCatalog {
    /// Scans `directory` for `.png` and `.gif` files.
    ///
    /// Files are ordered by their numeric stem (`1.png`, `2.gif`, `10.png`);
    /// files without a numeric stem follow, ordered by name.
    pub fn load(directory: &Path, selection: ImageSelection) -> io::Result<Self> {
        let mut images = Vec::new();
        for entry in fs::read_dir(directory)? {
            let path = entry?.path();
            let is_image = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| IMAGE_EXTENSIONS.iter().any(|known| ext.eq_ignore_ascii_case(known)));
            if path.is_file() && is_image {
                images.push(path);
            }
        }
        images.sort_by_key(|path| sort_key(path));
        Ok(Self::from_paths(images, selection))
    }

    pub fn from_config(config: &AssetsConfig) -> io::Result<Self> {
        Self::load(&config.directory, config.selection)
    }

    pub fn from_paths(images: Vec<PathBuf>, selection: ImageSelection) -> Self {
        Self { images, selection, cursor: 0 }
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn images(&self) -> &[PathBuf] {
        &self.images
    }

    /// Picks the image for the next reminder, or `None` if there are none.
    pub fn next_image(&mut self) -> Option<PathBuf> {
        match self.selection {
            ImageSelection::Rotate => {
                let image = self.images.get(self.cursor)?.clone();
                self.cursor = (self.cursor + 1) % self.images.len();
                Some(image)
            }
            ImageSelection::Random => self.images.choose(&mut rand::thread_rng()).cloned(),
        }
    }
}

fn sort_key(path: &Path) -> (u8, u64, String) {
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
    match stem.parse::<u64>() {
        Ok(number) => (0, number, stem.to_string()),
        Err(_) => (1, 0, stem.to_string()),
    }
}
