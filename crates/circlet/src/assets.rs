use serde_json::Value;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const OPEN_GLYPH: &str = "hamburger-open";
pub const CLOSE_GLYPH: &str = "hamburger-close";

#[derive(Error, Debug)]
pub enum AssetError {
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid animation data in {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Lottie animations for the main toggle button. Either may be missing; the button then
/// simply has no glyph for that state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GlyphAssets {
    open: Option<Value>,
    close: Option<Value>,
}

impl GlyphAssets {
    pub fn new(open: Option<Value>, close: Option<Value>) -> Self {
        Self { open, close }
    }

    pub fn load(dir: &Path) -> Self {
        let load = |name: &str| match read_glyph(dir, name) {
            Ok(value) => Some(value),
            Err(e) => {
                log::warn!("Main button glyph unavailable: {}", e);
                None
            }
        };
        Self {
            open: load(OPEN_GLYPH),
            close: load(CLOSE_GLYPH),
        }
    }

    pub fn open(&self) -> Option<&Value> {
        self.open.as_ref()
    }

    pub fn close(&self) -> Option<&Value> {
        self.close.as_ref()
    }
}

fn read_glyph(dir: &Path, name: &str) -> Result<Value, AssetError> {
    let path = dir.join(format!("{name}.json"));
    let raw = fs_err::read_to_string(&path).map_err(|source| AssetError::Read {
        path: path.clone(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| AssetError::Parse { path, source })
}
