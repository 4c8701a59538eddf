//! Glue for calling the comparison from test functions.
//!
//! A [`ScreenshotContext`] lives for one test and hands out
//! `<title>_1`, `<title>_2`, ... so several screenshots in the same test get
//! distinct baselines.

use std::path::Path;

use tracing::debug;

use crate::config::ComparisonConfig;
use crate::error::Result;

pub const REGRESSION_MESSAGE: &str = "visual regression detected";

/// Per-test identifier sequence.
#[derive(Debug, Clone)]
pub struct ScreenshotContext {
    title: String,
    count: u32,
}

impl ScreenshotContext {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            count: 0,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Number of identifiers handed out so far.
    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn next_id(&mut self) -> String {
        self.count += 1;
        format!("{}_{}", self.title, self.count)
    }
}

/// Where pass/fail verdicts go.
pub trait Reporter {
    fn pass(&mut self);
    fn fail(&mut self, message: &str);
}

/// Fails by panicking, which is what `#[test]` functions expect.
#[derive(Debug, Default, Clone, Copy)]
pub struct PanicReporter;

impl Reporter for PanicReporter {
    fn pass(&mut self) {}

    fn fail(&mut self, message: &str) {
        panic!("{message}");
    }
}

/// Compare the next screenshot of this test and report the verdict.
///
/// I/O and decode failures are returned, not reported as regressions.
pub fn assert_screenshot(
    ctx: &mut ScreenshotContext,
    reporter: &mut impl Reporter,
    dir: impl AsRef<Path>,
    screenshot: &str,
) -> Result<bool> {
    assert_screenshot_with(ctx, reporter, dir, screenshot, &ComparisonConfig::default())
}

pub fn assert_screenshot_with(
    ctx: &mut ScreenshotContext,
    reporter: &mut impl Reporter,
    dir: impl AsRef<Path>,
    screenshot: &str,
    config: &ComparisonConfig,
) -> Result<bool> {
    let id = ctx.next_id();
    let passed = crate::generate_comparison_with(dir.as_ref(), &id, screenshot, config)?;
    debug!(id = %id, passed, "screenshot assertion");
    if passed {
        reporter.pass();
    } else {
        reporter.fail(&format!("{REGRESSION_MESSAGE}: {id}"));
    }
    Ok(passed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_count_up_from_one() {
        let mut ctx = ScreenshotContext::new("title");
        assert_eq!(ctx.count(), 0);
        let ids: Vec<String> = (0..3).map(|_| ctx.next_id()).collect();
        assert_eq!(ids, ["title_1", "title_2", "title_3"]);
        assert_eq!(ctx.count(), 3);
    }

    #[test]
    fn contexts_are_independent() {
        let mut a = ScreenshotContext::new("a");
        let mut b = ScreenshotContext::new("b");
        a.next_id();
        a.next_id();
        assert_eq!(b.next_id(), "b_1");
        assert_eq!(a.next_id(), "a_3");
    }

    #[test]
    #[should_panic(expected = "visual regression detected")]
    fn panic_reporter_panics_on_fail() {
        PanicReporter.fail("visual regression detected: x_1");
    }
}
