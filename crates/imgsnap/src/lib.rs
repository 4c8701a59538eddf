//! Capture-once, compare-forever PNG snapshot testing.
//!
//! The first screenshot seen for an identifier becomes its baseline under
//! `<dir>/__img_snapshots__/<id>.snap.png`. Later screenshots are diffed
//! against it; when more than the tolerated fraction of pixels differ the
//! comparison fails and a diff image is written to `<id>.diff.png`.
//!
//! ```no_run
//! let passed = imgsnap::generate_comparison("tests", "button_1", "iVBORw0KGgo...")?;
//! assert!(passed);
//! # Ok::<(), imgsnap::Error>(())
//! ```

pub mod codec;
pub mod compare;
pub mod config;
pub mod error;
pub mod harness;
pub mod store;

use std::path::Path;

pub use self::compare::diff::{DiffResult, DifyDiffer, PixelDiffer};
pub use self::compare::engine::{Comparison, compare};
pub use self::compare::{ComparisonRequest, DiffArtifact, Outcome};
pub use self::config::ComparisonConfig;
pub use self::error::{Error, Result};
pub use self::harness::{PanicReporter, Reporter, ScreenshotContext, assert_screenshot};
pub use self::store::BaselineStore;

/// Compare a base64-encoded PNG against the baseline `id` under `dir`
/// with the default policy. `Ok(false)` means a visual regression.
pub fn generate_comparison(dir: impl AsRef<Path>, id: &str, screenshot: &str) -> Result<bool> {
    generate_comparison_with(dir, id, screenshot, &ComparisonConfig::default())
}

/// [`generate_comparison`] with an explicit policy.
pub fn generate_comparison_with(
    dir: impl AsRef<Path>,
    id: &str,
    screenshot: &str,
    config: &ComparisonConfig,
) -> Result<bool> {
    let request = ComparisonRequest::from_base64(dir.as_ref(), id, screenshot)?;
    Comparison::new(request).with_config(config.clone()).compare()
}

/// Async variant of [`Comparison::run`] for callers already on a tokio runtime.
pub async fn compare_async(
    request: ComparisonRequest,
    config: ComparisonConfig,
) -> Result<Outcome> {
    Comparison::new(request).with_config(config).run_async().await
}
