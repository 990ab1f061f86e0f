use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fmt;

use crate::api::{ApiConfig, ApiError};
use crate::get_current_time_ms;

// --- Typed IDs ---
//
// The service sends identifiers either as JSON numbers or strings; both
// collapse to the same canonical text so `1` and `"1"` compare equal.

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Number(serde_json::Number),
    Text(String),
}

impl From<RawId> for String {
    fn from(raw: RawId) -> Self {
        match raw {
            RawId::Number(n) => n.to_string(),
            RawId::Text(s) => s,
        }
    }
}

macro_rules! typed_id {
    ($name:ident) => {
        #[derive(Serialize, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(s: impl Into<String>) -> Self {
                Self(s.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn is_empty(&self) -> bool {
                self.0.trim().is_empty()
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                RawId::deserialize(deserializer).map(|raw| Self(raw.into()))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self::new(s)
            }
        }
    };
}

typed_id!(ReportId);
typed_id!(CaseId);

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Report {
    pub id: ReportId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub case_id: Option<CaseId>,
}

impl Report {
    /// `CASE-{case_id}` when linked, `None` otherwise.
    #[must_use]
    pub fn case_label(&self) -> String {
        match &self.case_id {
            Some(case_id) => format!("CASE-{case_id}"),
            None => "None".to_string(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Case {
    pub id: CaseId,
    #[serde(default)]
    pub case_number: String,
    #[serde(default)]
    pub title: String,
}

impl Case {
    #[must_use]
    pub fn option_label(&self) -> String {
        format!("{} – {}", self.case_number, self.title)
    }
}

/// Replaces the entry whose id matches `updated.id`, keeping every other
/// entry and the overall order. Returns false when nothing matched.
pub fn replace_report(reports: &mut [Report], updated: Report) -> bool {
    match reports.iter_mut().find(|r| r.id == updated.id) {
        Some(slot) => {
            *slot = updated;
            true
        }
        None => false,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadPhase {
    Initial,
    Loading,
    Loaded,
    Errored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Collection {
    Reports,
    Cases,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ToastMessage {
    pub message: String,
    pub kind: ToastKind,
    pub created_at_ms: u64,
    pub duration_ms: u64,
}

impl ToastMessage {
    #[must_use]
    pub fn new(message: impl Into<String>, kind: ToastKind) -> Self {
        Self {
            message: message.into(),
            kind,
            created_at_ms: get_current_time_ms(),
            duration_ms: kind.default_duration_ms(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToastKind {
    Info,
    Success,
    Error,
}

impl ToastKind {
    #[must_use]
    pub const fn default_duration_ms(self) -> u64 {
        match self {
            Self::Info => 3000,
            Self::Success => 2000,
            Self::Error => 5000,
        }
    }
}

/// Everything the panel knows. Only `App::update` mutates it.
///
/// `api` is empty until the shell mounts the panel with a configuration.
#[derive(Debug, Default)]
pub struct Model {
    pub api: Option<ApiConfig>,
    pub reports: Vec<Report>,
    pub cases: Vec<Case>,
    pub loading: bool,
    pub error: Option<ApiError>,
    pub started: bool,
    pub generation: u64,
    pub outstanding: BTreeSet<Collection>,
    pub pending_links: HashMap<ReportId, CaseId>,
    pub active_toast: Option<ToastMessage>,
}

impl Model {
    #[must_use]
    pub fn phase(&self) -> LoadPhase {
        if !self.started {
            LoadPhase::Initial
        } else if self.error.is_some() {
            LoadPhase::Errored
        } else if self.loading {
            LoadPhase::Loading
        } else {
            LoadPhase::Loaded
        }
    }

    /// Starts a new load attempt and returns its generation.
    pub fn begin_load(&mut self) -> u64 {
        self.generation += 1;
        self.started = true;
        self.loading = true;
        self.error = None;
        self.outstanding = [Collection::Reports, Collection::Cases].into_iter().collect();
        self.generation
    }

    /// Marks one listing fetch as finished. The first error wins and ends
    /// loading; later errors are dropped.
    pub fn finish_fetch(&mut self, collection: Collection, error: Option<ApiError>) {
        self.outstanding.remove(&collection);

        if let Some(error) = error {
            if self.error.is_none() {
                self.error = Some(error);
            }
            self.loading = false;
        } else if self.outstanding.is_empty() {
            self.loading = false;
        }
    }

    #[must_use]
    pub fn report(&self, id: &ReportId) -> Option<&Report> {
        self.reports.iter().find(|r| &r.id == id)
    }

    #[must_use]
    pub fn is_link_pending(&self, id: &ReportId) -> bool {
        self.pending_links.contains_key(id)
    }

    pub fn show_toast(&mut self, message: impl Into<String>, kind: ToastKind) -> ToastMessage {
        let toast = ToastMessage::new(message, kind);
        self.active_toast = Some(toast.clone());
        toast
    }

    pub fn clear_toast(&mut self) {
        self.active_toast = None;
    }
}
