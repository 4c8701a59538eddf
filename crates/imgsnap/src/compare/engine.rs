use std::io::ErrorKind;
use std::sync::Arc;

use image::RgbaImage;
use tracing::{debug, info, warn};

use super::diff::{DifyDiffer, PixelDiffer, pad_to};
use super::{ComparisonRequest, DiffArtifact, Outcome};
use crate::codec;
use crate::config::ComparisonConfig;
use crate::error::{Error, Result};
use crate::store::{BaselineStore, Established};

/// Decides pass/fail for one screenshot.
///
/// Holds no state of its own between calls: everything persistent lives in
/// the [`BaselineStore`] files under the request's directory.
#[derive(Clone)]
pub struct Comparison {
    request: ComparisonRequest,
    config: ComparisonConfig,
    differ: Arc<dyn PixelDiffer>,
}

impl Comparison {
    pub fn new(request: ComparisonRequest) -> Self {
        Self {
            request,
            config: ComparisonConfig::default(),
            differ: Arc::new(DifyDiffer),
        }
    }

    pub fn with_config(mut self, config: ComparisonConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_differ(mut self, differ: impl PixelDiffer + 'static) -> Self {
        self.differ = Arc::new(differ);
        self
    }

    pub fn request(&self) -> &ComparisonRequest {
        &self.request
    }

    pub fn store(&self) -> BaselineStore {
        BaselineStore::new(self.request.dir())
    }

    /// `true` = pass (including first-run establishment).
    pub fn compare(&self) -> Result<bool> {
        self.run().map(|outcome| outcome.passed())
    }

    pub fn run(&self) -> Result<Outcome> {
        self.config.validate()?;
        let store = self.store();
        let existing = store.load_baseline(self.request.id())?;
        self.decide(&store, existing)
    }

    /// Replace the baseline with this screenshot, dropping any diff artifact.
    pub fn reset(&self) -> Result<Outcome> {
        self.config.validate()?;
        // Refuse to drop a good baseline for an undecodable screenshot.
        codec::decode(self.request.screenshot(), "candidate")?;

        let store = self.store();
        let id = self.request.id();
        store.remove_diff(id)?;
        if store.remove_baseline(id)? {
            info!(id = %id, "baseline removed for reset");
        }
        self.decide(&store, None)
    }

    /// Run on tokio's blocking pool; decoding and diffing are CPU-bound.
    pub async fn run_async(self) -> Result<Outcome> {
        tokio::task::spawn_blocking(move || self.run())
            .await
            .map_err(|e| Error::TaskPanicked(e.to_string()))?
    }

    fn decide(&self, store: &BaselineStore, existing: Option<Vec<u8>>) -> Result<Outcome> {
        let id = self.request.id();
        let baseline = match existing {
            Some(bytes) => bytes,
            None => {
                if let Some(outcome) = self.establish(store)? {
                    return Ok(outcome);
                }
                // Lost the race to another writer: compare against theirs.
                store.load_baseline(id)?.ok_or_else(|| {
                    Error::io(store.baseline_path(id), ErrorKind::NotFound.into())
                })?
            }
        };
        self.compare_against(store, &baseline)
    }

    /// `Ok(None)` when someone else created the baseline first.
    fn establish(&self, store: &BaselineStore) -> Result<Option<Outcome>> {
        let id = self.request.id();
        let png = self.request.screenshot();
        codec::decode(png, "candidate")?;

        match store.save_baseline(id, png)? {
            Established::Created => {
                let baseline = store.baseline_path(id);
                info!(id = %id, path = %baseline.display(), "baseline established");
                Ok(Some(Outcome::Established { baseline }))
            }
            Established::AlreadyExists => {
                warn!(id = %id, "baseline appeared concurrently, comparing against it");
                Ok(None)
            }
        }
    }

    fn compare_against(&self, store: &BaselineStore, baseline_png: &[u8]) -> Result<Outcome> {
        let id = self.request.id();
        let current_png = self.request.screenshot();

        if baseline_png == current_png {
            debug!(id = %id, "byte-identical to baseline");
            return Ok(Outcome::Pass {
                diff_pixels: 0,
                score: 0.0,
            });
        }

        let left = codec::decode(baseline_png, "baseline")?;
        let right = codec::decode(current_png, "candidate")?;

        let dimension_mismatch = if left.dimensions() != right.dimensions() {
            Some((left.width(), left.height(), right.width(), right.height()))
        } else {
            None
        };

        // Pad both to the larger canvas so the diff image shows the size change.
        let (left, right) = if dimension_mismatch.is_some() {
            let max_w = left.width().max(right.width());
            let max_h = left.height().max(right.height());
            (pad_to(&left, max_w, max_h), pad_to(&right, max_w, max_h))
        } else {
            (left, right)
        };

        let result = self.differ.diff(left, right, &self.config)?;
        let score = result.score();
        debug!(
            id = %id,
            diff_pixels = result.diff_pixels,
            total_pixels = result.total_pixels,
            score,
            tolerance = self.config.tolerance,
            "compared against baseline"
        );

        // A size change always fails, however small the padded area is.
        if dimension_mismatch.is_none() && score <= self.config.tolerance {
            return Ok(Outcome::Pass {
                diff_pixels: result.diff_pixels,
                score,
            });
        }

        let diff = self.write_diff(store, result.diff_image);
        Ok(Outcome::Fail {
            diff_pixels: result.diff_pixels,
            score,
            dimension_mismatch,
            diff,
        })
    }

    /// Best-effort: the verdict is already FAIL, so errors are only reported.
    fn write_diff(&self, store: &BaselineStore, diff_image: Option<RgbaImage>) -> DiffArtifact {
        let id = self.request.id();
        let Some(diff_image) = diff_image else {
            warn!(id = %id, "differ produced no diff image");
            return DiffArtifact::Failed("differ produced no diff image".to_owned());
        };

        match codec::encode(&diff_image).and_then(|png| store.save_diff(id, &png)) {
            Ok(path) => {
                debug!(id = %id, path = %path.display(), "wrote diff artifact");
                DiffArtifact::Written(path)
            }
            Err(e) => {
                warn!(id = %id, error = %e, "failed to write diff artifact");
                DiffArtifact::Failed(e.to_string())
            }
        }
    }
}

/// Compare `request` with the default differ and the given tolerance.
pub fn compare(request: ComparisonRequest, tolerance: f64) -> Result<bool> {
    let config = ComparisonConfig::default().with_tolerance(tolerance);
    Comparison::new(request).with_config(config).compare()
}
