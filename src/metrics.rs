use std::sync::LazyLock;

use prometheus::*;

static METRIC_SUBMIT_COUNT: LazyLock<IntCounterVec> = LazyLock::new(|| {
    register_int_counter_vec!(
        "ghost_submit_count",
        "count of ghost submissions",
        &["ghostclass", "status"]
    )
    .unwrap()
});

static METRIC_SUBMIT_DURATION: LazyLock<HistogramVec> = LazyLock::new(|| {
    register_histogram_vec!(
        "ghost_submit_duration",
        "duration of the submission pipeline in seconds",
        &["ghostclass"]
    )
    .unwrap()
});

/// 增加提交计数
pub fn inc_submit(ghostclass: &str, ok: bool) {
    let status = if ok { "ok" } else { "error" };
    METRIC_SUBMIT_COUNT.with_label_values(&[ghostclass, status]).inc();
}

pub fn observe_submit_duration(ghostclass: &str, duration: f64) {
    METRIC_SUBMIT_DURATION.with_label_values(&[ghostclass]).observe(duration);
}
