use crate::api::ApiConfig;
use crate::capabilities::HttpOutput;
use crate::model::{CaseId, ReportId};

#[derive(Debug, Clone, Default)]
pub enum Event {
    #[default]
    Noop,

    /// The panel was mounted against a service; starts the initial load.
    Mounted(ApiConfig),
    Reload,

    ReportsResponse {
        generation: u64,
        result: Box<HttpOutput>,
    },
    CasesResponse {
        generation: u64,
        result: Box<HttpOutput>,
    },

    /// A case was picked in a report's selector. An empty `case_id` is the
    /// placeholder option.
    CaseSelected {
        report_id: String,
        case_id: String,
    },
    LinkResponse {
        report_id: ReportId,
        case_id: CaseId,
        result: Box<HttpOutput>,
    },

    DismissToast,
}

impl Event {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Noop => "noop",
            Self::Mounted(_) => "mounted",
            Self::Reload => "reload",
            Self::ReportsResponse { .. } => "reports_response",
            Self::CasesResponse { .. } => "cases_response",
            Self::CaseSelected { .. } => "case_selected",
            Self::LinkResponse { .. } => "link_response",
            Self::DismissToast => "dismiss_toast",
        }
    }

    #[must_use]
    pub const fn is_user_initiated(&self) -> bool {
        matches!(
            self,
            Self::Reload | Self::CaseSelected { .. } | Self::DismissToast
        )
    }
}
