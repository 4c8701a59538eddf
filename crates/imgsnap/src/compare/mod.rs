pub mod diff;
pub mod engine;

use std::path::{Path, PathBuf};

use base64::Engine as _;

use crate::error::Result;
use crate::store;

/// One screenshot to check against the baseline named `id` under `dir`.
#[derive(Debug, Clone)]
pub struct ComparisonRequest {
    dir: PathBuf,
    id: String,
    screenshot: Vec<u8>,
}

impl ComparisonRequest {
    /// `screenshot` is the encoded PNG.
    pub fn new(
        dir: impl Into<PathBuf>,
        id: impl Into<String>,
        screenshot: Vec<u8>,
    ) -> Result<Self> {
        let id = id.into();
        store::validate_id(&id)?;
        Ok(Self {
            dir: dir.into(),
            id,
            screenshot,
        })
    }

    /// `screenshot` is a base64-encoded PNG, as returned by most browser drivers.
    pub fn from_base64(
        dir: impl Into<PathBuf>,
        id: impl Into<String>,
        screenshot: &str,
    ) -> Result<Self> {
        let bytes = base64::engine::general_purpose::STANDARD.decode(screenshot.trim())?;
        Self::new(dir, id, bytes)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn screenshot(&self) -> &[u8] {
        &self.screenshot
    }
}

/// What happened to the diff artifact of a failing comparison.
#[derive(Debug, Clone, PartialEq)]
pub enum DiffArtifact {
    Written(PathBuf),
    /// Encoding or writing failed. The comparison still failed.
    Failed(String),
}

/// Result of a single comparison.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// No baseline existed; the screenshot became the baseline.
    Established { baseline: PathBuf },
    Pass {
        diff_pixels: u64,
        score: f64,
    },
    Fail {
        diff_pixels: u64,
        score: f64,
        /// `Some((base_w, base_h, cur_w, cur_h))` when the images differ in size.
        dimension_mismatch: Option<(u32, u32, u32, u32)>,
        diff: DiffArtifact,
    },
}

impl Outcome {
    pub fn passed(&self) -> bool {
        !matches!(self, Self::Fail { .. })
    }
}
