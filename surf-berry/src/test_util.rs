//! 测试辅助.

use approx::assert_abs_diff_eq;
use std::sync::Once;

static LOGGER: Once = Once::new();

/// 安装 `simple_logger`, 进程内只生效一次.
pub(crate) fn init_logger() {
    LOGGER.call_once(|| {
        let _ = simple_logger::SimpleLogger::new()
            .with_level(log::LevelFilter::Debug)
            .init();
    });
}

/// 比较指标值. `NaN` 与 `NaN`, `inf` 与同号 `inf` 视为相等, 其余精确到小数点后 3 位.
#[track_caller]
pub(crate) fn assert_metric_eq(actual: f64, expected: f64) {
    if expected.is_nan() {
        assert!(actual.is_nan(), "expected NaN, got {actual}");
    } else if expected.is_infinite() {
        assert_eq!(actual, expected);
    } else {
        assert_abs_diff_eq!(actual, expected, epsilon = 1.5e-3);
    }
}

/// 逐分量调用 [`assert_metric_eq`].
#[track_caller]
pub(crate) fn assert_pair_eq(actual: (f64, f64), expected: (f64, f64)) {
    assert_metric_eq(actual.0, expected.0);
    assert_metric_eq(actual.1, expected.1);
}
