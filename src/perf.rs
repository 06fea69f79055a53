use std::time::Duration;

use crate::context::Context;
use crate::env::Environment;
use crate::logging::LogLevel;

/// Navigation timing marks in milliseconds since the time origin.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NavigationTiming {
    pub navigation_start: f64,
    pub load_event_end: f64,
}

impl NavigationTiming {
    pub fn load_duration(&self) -> Option<Duration> {
        let elapsed_ms = self.load_event_end - self.navigation_start;
        (elapsed_ms.is_finite() && elapsed_ms >= 0.0)
            .then(|| Duration::from_micros((elapsed_ms * 1_000.0).round() as u64))
    }
}

pub struct PerformanceMonitor;

impl PerformanceMonitor {
    /// Reports once the page has loaded; immediately when that already happened.
    pub fn mount<E: Environment>(ctx: &Context<E>) {
        let ctx_for_load = ctx.clone();
        ctx.env.when_loaded(Box::new(move || {
            report_page_load(&ctx_for_load);
        }));
    }
}

pub fn report_page_load<E: Environment>(ctx: &Context<E>) -> Option<Duration> {
    let Some(timing) = ctx.env.navigation_timing() else {
        ctx.log(LogLevel::Debug, "page_load_timing_unavailable", serde_json::json!({}));
        return None;
    };

    let duration = timing.load_duration()?;
    ctx.log(
        LogLevel::Info,
        "page_loaded",
        serde_json::json!({ "duration_ms": duration.as_millis() as u64 }),
    );
    Some(duration)
}
