//! Timing and geometry knobs for the behaviour layer.
//!
//! Defaults can be overridden by a JSON document embedded in the page as
//! `<script id="site-config" type="application/json">`. Values outside their
//! bounds fall back to the default rather than failing startup.

use std::time::Duration;

use serde::Deserialize;

use crate::env::Dom;
use crate::error::ConfigError;
use crate::logging::LogLevel;

pub const CONFIG_ELEMENT_ID: &str = "site-config";

const DEFAULT_NAV_OFFSET_PX: f64 = 70.0;
const DEFAULT_SECTION_MARKER_OFFSET_PX: f64 = 100.0;
const DEFAULT_SCROLLED_THRESHOLD_PX: f64 = 100.0;
const DEFAULT_SCROLL_THROTTLE_MS: u64 = 100;
const DEFAULT_RESIZE_DEBOUNCE_MS: u64 = 150;
const DEFAULT_SKILL_BAR_DELAY_MS: u64 = 200;
const DEFAULT_SUBMISSION_DELAY_MS: u64 = 1_500;
const DEFAULT_SUBMISSION_SUCCESS_RATE: f64 = 0.9;
const DEFAULT_NOTIFICATION_ENTER_MS: u64 = 100;
const DEFAULT_NOTIFICATION_LIFETIME_MS: u64 = 5_000;
const DEFAULT_NOTIFICATION_EXIT_MS: u64 = 300;
const DEFAULT_THEME_STORAGE_KEY: &str = "theme";
const DEFAULT_CV_PATH: &str = "assets/cv.pdf";
const DEFAULT_WORKER_SCRIPT: &str = "/sw.js";
const DEFAULT_LOG_LEVEL: LogLevel = LogLevel::Info;

const OFFSET_PX_BOUNDS: (f64, f64) = (0.0, 1_000.0);
const SCROLL_THROTTLE_MS_BOUNDS: (u64, u64) = (16, 1_000);
const RESIZE_DEBOUNCE_MS_BOUNDS: (u64, u64) = (0, 2_000);
const SKILL_BAR_DELAY_MS_BOUNDS: (u64, u64) = (0, 5_000);
const SUBMISSION_DELAY_MS_BOUNDS: (u64, u64) = (0, 30_000);
const SUBMISSION_SUCCESS_RATE_BOUNDS: (f64, f64) = (0.0, 1.0);
const NOTIFICATION_ENTER_MS_BOUNDS: (u64, u64) = (0, 2_000);
const NOTIFICATION_LIFETIME_MS_BOUNDS: (u64, u64) = (500, 60_000);
const NOTIFICATION_EXIT_MS_BOUNDS: (u64, u64) = (0, 2_000);

#[derive(Clone, Debug, PartialEq)]
pub struct SiteConfig {
    pub nav_offset: f64,
    pub section_marker_offset: f64,
    pub scrolled_threshold: f64,
    pub scroll_throttle: Duration,
    pub resize_debounce: Duration,
    pub skill_bar_delay: Duration,
    pub submission_delay: Duration,
    pub submission_success_rate: f64,
    pub notification_enter_delay: Duration,
    pub notification_lifetime: Duration,
    pub notification_exit: Duration,
    pub theme_storage_key: String,
    pub cv_path: String,
    pub worker_script: String,
    pub log_level: LogLevel,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self::from_overrides(SiteConfigOverrides::default())
    }
}

#[derive(Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct SiteConfigOverrides {
    nav_offset_px: Option<f64>,
    section_marker_offset_px: Option<f64>,
    scrolled_threshold_px: Option<f64>,
    scroll_throttle_ms: Option<u64>,
    resize_debounce_ms: Option<u64>,
    skill_bar_delay_ms: Option<u64>,
    submission_delay_ms: Option<u64>,
    submission_success_rate: Option<f64>,
    notification_enter_ms: Option<u64>,
    notification_lifetime_ms: Option<u64>,
    notification_exit_ms: Option<u64>,
    theme_storage_key: Option<String>,
    cv_path: Option<String>,
    worker_script: Option<String>,
    log_level: Option<String>,
}

impl SiteConfig {
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let overrides: SiteConfigOverrides = serde_json::from_str(raw)?;
        Ok(Self::from_overrides(overrides))
    }

    /// Reads the embedded config document. A page without one yields defaults.
    pub fn from_document<D: Dom>(dom: &D) -> Result<Self, ConfigError> {
        let raw = dom
            .element_by_id(CONFIG_ELEMENT_ID)
            .map(|node| dom.text_content(&node))
            .filter(|raw| !raw.trim().is_empty());

        match raw {
            Some(raw) => Self::from_json(&raw),
            None => Ok(Self::default()),
        }
    }

    fn from_overrides(overrides: SiteConfigOverrides) -> Self {
        Self {
            nav_offset: bounded_px(overrides.nav_offset_px, DEFAULT_NAV_OFFSET_PX),
            section_marker_offset: bounded_px(
                overrides.section_marker_offset_px,
                DEFAULT_SECTION_MARKER_OFFSET_PX,
            ),
            scrolled_threshold: bounded_px(
                overrides.scrolled_threshold_px,
                DEFAULT_SCROLLED_THRESHOLD_PX,
            ),
            scroll_throttle: bounded_ms(
                overrides.scroll_throttle_ms,
                DEFAULT_SCROLL_THROTTLE_MS,
                SCROLL_THROTTLE_MS_BOUNDS,
            ),
            resize_debounce: bounded_ms(
                overrides.resize_debounce_ms,
                DEFAULT_RESIZE_DEBOUNCE_MS,
                RESIZE_DEBOUNCE_MS_BOUNDS,
            ),
            skill_bar_delay: bounded_ms(
                overrides.skill_bar_delay_ms,
                DEFAULT_SKILL_BAR_DELAY_MS,
                SKILL_BAR_DELAY_MS_BOUNDS,
            ),
            submission_delay: bounded_ms(
                overrides.submission_delay_ms,
                DEFAULT_SUBMISSION_DELAY_MS,
                SUBMISSION_DELAY_MS_BOUNDS,
            ),
            submission_success_rate: overrides
                .submission_success_rate
                .filter(|value| {
                    (SUBMISSION_SUCCESS_RATE_BOUNDS.0..=SUBMISSION_SUCCESS_RATE_BOUNDS.1)
                        .contains(value)
                })
                .unwrap_or(DEFAULT_SUBMISSION_SUCCESS_RATE),
            notification_enter_delay: bounded_ms(
                overrides.notification_enter_ms,
                DEFAULT_NOTIFICATION_ENTER_MS,
                NOTIFICATION_ENTER_MS_BOUNDS,
            ),
            notification_lifetime: bounded_ms(
                overrides.notification_lifetime_ms,
                DEFAULT_NOTIFICATION_LIFETIME_MS,
                NOTIFICATION_LIFETIME_MS_BOUNDS,
            ),
            notification_exit: bounded_ms(
                overrides.notification_exit_ms,
                DEFAULT_NOTIFICATION_EXIT_MS,
                NOTIFICATION_EXIT_MS_BOUNDS,
            ),
            theme_storage_key: non_empty_or(overrides.theme_storage_key, DEFAULT_THEME_STORAGE_KEY),
            cv_path: non_empty_or(overrides.cv_path, DEFAULT_CV_PATH),
            worker_script: non_empty_or(overrides.worker_script, DEFAULT_WORKER_SCRIPT),
            log_level: overrides
                .log_level
                .as_deref()
                .and_then(LogLevel::parse)
                .unwrap_or(DEFAULT_LOG_LEVEL),
        }
    }
}

fn bounded_ms(value: Option<u64>, default: u64, bounds: (u64, u64)) -> Duration {
    Duration::from_millis(
        value
            .filter(|value| (bounds.0..=bounds.1).contains(value))
            .unwrap_or(default),
    )
}

fn bounded_px(value: Option<f64>, default: f64) -> f64 {
    value
        .filter(|value| {
            value.is_finite() && (OFFSET_PX_BOUNDS.0..=OFFSET_PX_BOUNDS.1).contains(value)
        })
        .unwrap_or(default)
}

fn non_empty_or(value: Option<String>, default: &str) -> String {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| default.to_string())
}
