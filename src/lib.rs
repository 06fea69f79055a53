//! Client-side behaviour for the static portfolio page.
//!
//! Every component talks to the page through the [`env::Environment`]
//! traits, so the same code drives the live DOM on wasm32 and an in-memory
//! page in tests.

pub mod app;
pub mod config;
pub mod contact;
pub mod context;
pub mod env;
pub mod error;
pub mod lazy;
pub mod logging;
pub mod modal;
pub mod nav;
pub mod notify;
pub mod observer;
pub mod perf;
pub mod projects;
pub mod ratelimit;
pub mod reveal;
pub mod scroll;
pub mod theme;

#[cfg(target_arch = "wasm32")]
pub mod frontend;

#[cfg(test)]
pub(crate) mod testing;

pub use app::App;
pub use config::SiteConfig;
pub use context::Context;
pub use env::Environment;
