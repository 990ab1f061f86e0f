use tracing::instrument;

use super::Transport;
use crate::api::{self, ApiConfig, ApiRequest, ApiResult, Reply};
use crate::model::{Case, CaseId, Report, ReportId};

/// Direct async access to the service, outside the event loop.
pub struct ApiClient<T> {
    config: ApiConfig,
    transport: T,
}

impl<T: Transport> ApiClient<T> {
    pub fn new(config: ApiConfig, transport: T) -> Self {
        Self { config, transport }
    }

    async fn execute(&self, request: ApiRequest) -> ApiResult<Reply> {
        let request = request.into_protocol(&self.config);
        Reply::from_protocol(self.transport.execute(request).await)
    }

    #[instrument(skip(self))]
    pub async fn list_reports(&self, limit: usize) -> ApiResult<Vec<Report>> {
        let request = api::list_reports_request(&self.config, limit)?;
        api::decode_reports(&self.execute(request).await?)
    }

    #[instrument(skip(self))]
    pub async fn list_cases(&self) -> ApiResult<Vec<Case>> {
        let request = api::list_cases_request(&self.config)?;
        api::decode_cases(&self.execute(request).await?)
    }

    #[instrument(skip_all, fields(report_id = %report_id, case_id = %case_id))]
    pub async fn link_report(&self, report_id: &ReportId, case_id: &CaseId) -> ApiResult<Report> {
        let request = api::link_report_request(&self.config, report_id, case_id)?;
        api::decode_link(&self.execute(request).await?)
    }
}
