mod common;

use imgsnap::harness::{REGRESSION_MESSAGE, assert_screenshot_with};
use imgsnap::{ComparisonConfig, PanicReporter, Reporter, ScreenshotContext, assert_screenshot};

use common::{BLUE, RED, b64, solid_png};

#[derive(Default)]
struct Recorder {
    passes: usize,
    failures: Vec<String>,
}

impl Reporter for Recorder {
    fn pass(&mut self) {
        self.passes += 1;
    }

    fn fail(&mut self, message: &str) {
        self.failures.push(message.to_owned());
    }
}

#[test]
fn each_screenshot_in_a_test_gets_its_own_baseline() {
    let tmp = tempfile::tempdir().unwrap();
    let mut ctx = ScreenshotContext::new("menu opens");
    let mut rec = Recorder::default();

    for color in [RED, BLUE, RED] {
        let shot = b64(&solid_png(6, 6, color));
        assert!(assert_screenshot(&mut ctx, &mut rec, tmp.path(), &shot).unwrap());
    }
    assert_eq!(rec.passes, 3);

    let snaps = tmp.path().join("__img_snapshots__");
    for n in 1..=3 {
        assert!(snaps.join(format!("menu opens_{n}.snap.png")).is_file());
    }
}

#[test]
fn regression_is_reported_not_returned_as_error() {
    let tmp = tempfile::tempdir().unwrap();
    let mut rec = Recorder::default();

    let mut first_run = ScreenshotContext::new("header");
    assert_screenshot(&mut first_run, &mut rec, tmp.path(), &b64(&solid_png(6, 6, RED))).unwrap();

    // Same test, next run: a fresh context allocates header_1 again.
    let mut second_run = ScreenshotContext::new("header");
    let passed =
        assert_screenshot(&mut second_run, &mut rec, tmp.path(), &b64(&solid_png(6, 6, BLUE)))
            .unwrap();
    assert!(!passed);
    assert_eq!(rec.passes, 1);
    assert_eq!(rec.failures, [format!("{REGRESSION_MESSAGE}: header_1")]);
}

#[test]
fn io_errors_propagate_without_a_report() {
    let tmp = tempfile::tempdir().unwrap();
    let mut ctx = ScreenshotContext::new("broken");
    let mut rec = Recorder::default();
    let err = assert_screenshot(&mut ctx, &mut rec, tmp.path(), "@@").unwrap_err();
    assert!(matches!(err, imgsnap::Error::Base64(_)));
    assert_eq!(rec.passes, 0);
    assert!(rec.failures.is_empty());
    // The id was still consumed.
    assert_eq!(ctx.count(), 1);
}

#[test]
fn custom_tolerance_through_the_adapter() {
    let tmp = tempfile::tempdir().unwrap();
    let mut rec = Recorder::default();
    let everything = ComparisonConfig::default().with_tolerance(1.0);

    let mut ctx = ScreenshotContext::new("lenient");
    assert_screenshot(&mut ctx, &mut rec, tmp.path(), &b64(&solid_png(4, 4, RED))).unwrap();
    let mut ctx = ScreenshotContext::new("lenient");
    let passed = assert_screenshot_with(
        &mut ctx,
        &mut rec,
        tmp.path(),
        &b64(&solid_png(4, 4, BLUE)),
        &everything,
    )
    .unwrap();
    assert!(passed);
    assert!(rec.failures.is_empty());
}

#[test]
#[should_panic(expected = "visual regression detected: panicky_1")]
fn panic_reporter_fails_the_test() {
    let tmp = tempfile::tempdir().unwrap();
    let mut ctx = ScreenshotContext::new("panicky");
    assert_screenshot(&mut ctx, &mut PanicReporter, tmp.path(), &b64(&solid_png(4, 4, RED)))
        .unwrap();
    let mut ctx = ScreenshotContext::new("panicky");
    let shot = b64(&solid_png(4, 4, BLUE));
    let _ = assert_screenshot(&mut ctx, &mut PanicReporter, tmp.path(), &shot);
}
