//! Presentation contract: what a shell draws, derived purely from the model.

use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

use crate::model::{ToastKind, ToastMessage};

pub const SELECT_PLACEHOLDER: &str = "Link to Case…";
pub const LOADING_TEXT: &str = "Loading…";
pub const PANEL_TITLE: &str = "Reports";

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct CaseOption {
    pub value: String,
    pub label: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct CaseSelector {
    pub placeholder: String,
    pub options: Vec<CaseOption>,
    /// Value of the case being linked right now, if any.
    pub selected: Option<String>,
    pub disabled: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReportItem {
    pub id: String,
    pub title: String,
    pub content: String,
    pub case_label: String,
    pub selector: CaseSelector,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ViewState {
    Loading,
    Error { message: String },
    Ready { reports: Vec<ReportItem> },
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ToastView {
    pub message: String,
    pub kind: ToastKind,
    pub duration_ms: u64,
}

impl From<&ToastMessage> for ToastView {
    fn from(t: &ToastMessage) -> Self {
        Self {
            message: t.message.clone(),
            kind: t.kind,
            duration_ms: t.duration_ms,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ViewModel {
    pub state: ViewState,
    pub toast: Option<ToastView>,
}

impl ViewModel {
    #[must_use]
    pub fn report_count(&self) -> usize {
        match &self.state {
            ViewState::Ready { reports } => reports.len(),
            _ => 0,
        }
    }
}

/// Plain-text rendering of the panel. Output depends only on `view`.
#[must_use]
pub fn render_text(view: &ViewModel) -> String {
    let mut out = String::new();

    match &view.state {
        ViewState::Loading => out.push_str(LOADING_TEXT),
        ViewState::Error { message } => {
            let _ = write!(out, "[!] {message}");
        }
        ViewState::Ready { reports } => {
            out.push_str(PANEL_TITLE);
            for item in reports {
                out.push('\n');
                render_report(&mut out, item);
            }
        }
    }

    if let Some(toast) = &view.toast {
        let marker = match toast.kind {
            ToastKind::Info => "i",
            ToastKind::Success => "✓",
            ToastKind::Error => "✗",
        };
        let _ = write!(out, "\n\n({marker}) {}", toast.message);
    }

    out.push('\n');
    out
}

fn render_report(out: &mut String, item: &ReportItem) {
    let _ = writeln!(out, "----");
    let _ = writeln!(out, "{} (ID: {})", item.title, item.id);
    let _ = writeln!(out, "Case: {}", item.case_label);
    let _ = writeln!(out, "{}", item.content);

    let selector = &item.selector;
    let current = selector
        .selected
        .as_ref()
        .and_then(|value| selector.options.iter().find(|o| &o.value == value))
        .map_or(selector.placeholder.as_str(), |o| o.label.as_str());
    let state = if selector.disabled { " (linking…)" } else { "" };
    let _ = write!(out, "[{current}]{state}");

    for option in &selector.options {
        let _ = write!(out, "\n  {} = {}", option.value, option.label);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, case_label: &str) -> ReportItem {
        ReportItem {
            id: id.into(),
            title: "A".into(),
            content: "x".into(),
            case_label: case_label.into(),
            selector: CaseSelector {
                placeholder: SELECT_PLACEHOLDER.into(),
                options: vec![CaseOption {
                    value: "9".into(),
                    label: "C-9 – Theft".into(),
                }],
                selected: None,
                disabled: false,
            },
        }
    }

    #[test]
    fn test_render_loading() {
        let view = ViewModel {
            state: ViewState::Loading,
            toast: None,
        };
        assert_eq!(render_text(&view), "Loading…\n");
    }

    #[test]
    fn test_render_error_has_no_selectors() {
        let view = ViewModel {
            state: ViewState::Error {
                message: "connection refused".into(),
            },
            toast: None,
        };
        let text = render_text(&view);
        assert_eq!(text, "[!] connection refused\n");
        assert!(!text.contains(SELECT_PLACEHOLDER));
        assert!(!text.contains("(ID:"));
    }

    #[test]
    fn test_render_ready() {
        let view = ViewModel {
            state: ViewState::Ready {
                reports: vec![item("1", "None"), item("2", "CASE-9")],
            },
            toast: None,
        };
        let text = render_text(&view);

        assert!(text.starts_with("Reports\n----\nA (ID: 1)\nCase: None\nx\n[Link to Case…]"));
        assert!(text.contains("Case: CASE-9"));
        assert!(text.contains("  9 = C-9 – Theft"));
        assert_eq!(text.matches("(ID:").count(), view.report_count());
    }

    #[test]
    fn test_render_pending_selector() {
        let mut pending = item("1", "None");
        pending.selector.selected = Some("9".into());
        pending.selector.disabled = true;

        let view = ViewModel {
            state: ViewState::Ready {
                reports: vec![pending],
            },
            toast: None,
        };
        assert!(render_text(&view).contains("[C-9 – Theft] (linking…)"));
    }

    #[test]
    fn test_render_toast() {
        let view = ViewModel {
            state: ViewState::Loading,
            toast: Some(ToastView {
                message: "Error: Failed: 404 not found".into(),
                kind: ToastKind::Error,
                duration_ms: 5000,
            }),
        };
        assert_eq!(
            render_text(&view),
            "Loading…\n\n(✗) Error: Failed: 404 not found\n"
        );
    }

    #[test]
    fn test_render_is_idempotent() {
        let view = ViewModel {
            state: ViewState::Ready {
                reports: vec![item("1", "None")],
            },
            toast: None,
        };
        assert_eq!(render_text(&view), render_text(&view));
    }
}
