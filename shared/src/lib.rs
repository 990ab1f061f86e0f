//! Core of the reports panel: list reports, list cases, link a report to a
//! case.
//!
//! The core is a `crux_core` app ([`App`], [`Model`], [`Event`],
//! [`ViewModel`]) that talks to the outside world only through its
//! [`Capabilities`]; a shell executes the resulting [`Effect`]s. The `shell`
//! feature provides an async shell backed by `reqwest`.

#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod api;
pub mod app;
pub mod capabilities;
pub mod config;
pub mod event;
pub mod model;
pub mod view;

#[cfg(feature = "shell")]
pub mod shell;

use std::time::Duration;

pub use api::{ApiConfig, ApiError, ApiResult};
pub use app::App;
pub use capabilities::{Capabilities, Effect};
pub use config::{Config, ConfigError};
pub use event::Event;
pub use model::{Case, CaseId, LoadPhase, Model, Report, ReportId, ToastKind, ToastMessage};
pub use view::{render_text, ViewModel, ViewState};

/// Fixed page size for the report listing.
pub const REPORT_LIMIT: usize = 50;
pub const LIST_TIMEOUT: Duration = Duration::from_secs(30);
pub const LINK_TIMEOUT: Duration = Duration::from_secs(15);

#[must_use]
pub fn get_current_time_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}
