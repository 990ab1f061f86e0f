use tracing::{debug, info, warn};

use crate::api::{self, ApiError, Reply};
use crate::capabilities::{Capabilities, HttpOutput};
use crate::event::Event;
use crate::model::{
    replace_report, CaseId, Collection, LoadPhase, Model, Report, ReportId, ToastKind,
};
use crate::view::{CaseOption, CaseSelector, ReportItem, ViewModel, ViewState, SELECT_PLACEHOLDER};
use crate::REPORT_LIMIT;

#[derive(Default)]
pub struct App;

impl App {
    fn start_load(model: &mut Model, caps: &Capabilities) {
        let Some(config) = model.api.clone() else {
            warn!("load requested before the panel was mounted");
            return;
        };

        let generation = model.begin_load();
        info!(generation, "loading reports and cases");

        match api::list_reports_request(&config, REPORT_LIMIT) {
            Ok(request) => request
                .into_builder(&config, &caps.http)
                .send(move |result| Event::ReportsResponse {
                    generation,
                    result: Box::new(result),
                }),
            Err(e) => model.finish_fetch(Collection::Reports, Some(e)),
        }

        match api::list_cases_request(&config) {
            Ok(request) => request
                .into_builder(&config, &caps.http)
                .send(move |result| Event::CasesResponse {
                    generation,
                    result: Box::new(result),
                }),
            Err(e) => model.finish_fetch(Collection::Cases, Some(e)),
        }

        caps.render.render();
    }

    fn is_stale(model: &Model, generation: u64, what: &str) -> bool {
        if generation == model.generation {
            return false;
        }
        debug!(
            generation,
            current = model.generation,
            "dropping stale {what} response"
        );
        true
    }

    fn handle_reports_response(
        generation: u64,
        result: HttpOutput,
        model: &mut Model,
        caps: &Capabilities,
    ) {
        if Self::is_stale(model, generation, "reports") {
            return;
        }

        match Reply::from_output(result).and_then(|reply| api::decode_reports(&reply)) {
            Ok(reports) => {
                info!(count = reports.len(), "reports loaded");
                model.reports = reports;
                model.finish_fetch(Collection::Reports, None);
            }
            Err(e) => {
                warn!(code = e.code(), error = %e, "failed to load reports");
                model.finish_fetch(Collection::Reports, Some(e));
            }
        }

        caps.render.render();
    }

    fn handle_cases_response(
        generation: u64,
        result: HttpOutput,
        model: &mut Model,
        caps: &Capabilities,
    ) {
        if Self::is_stale(model, generation, "cases") {
            return;
        }

        match Reply::from_output(result).and_then(|reply| api::decode_cases(&reply)) {
            Ok(cases) => {
                info!(count = cases.len(), "cases loaded");
                model.cases = cases;
                model.finish_fetch(Collection::Cases, None);
            }
            Err(e) => {
                warn!(code = e.code(), error = %e, "failed to load cases");
                model.finish_fetch(Collection::Cases, Some(e));
            }
        }

        caps.render.render();
    }

    fn request_link(report_id: &str, case_id: &str, model: &mut Model, caps: &Capabilities) {
        let report_id = ReportId::new(report_id);
        let case_id = CaseId::new(case_id);

        if case_id.is_empty() {
            debug!(%report_id, "placeholder selected, nothing to link");
            return;
        }

        let phase = model.phase();
        if phase != LoadPhase::Loaded {
            debug!(%report_id, ?phase, "selectors are not shown, ignoring link");
            return;
        }

        if model.report(&report_id).is_none() {
            warn!(%report_id, "link requested for a report that is not loaded");
            return;
        }

        if model.is_link_pending(&report_id) {
            debug!(%report_id, "link already in flight");
            return;
        }

        let Some(config) = model.api.as_ref() else {
            warn!(%report_id, "link requested before the panel was mounted");
            return;
        };

        match api::link_report_request(config, &report_id, &case_id) {
            Ok(request) => {
                info!(%report_id, %case_id, "linking report");
                let builder = request.into_builder(config, &caps.http);
                model
                    .pending_links
                    .insert(report_id.clone(), case_id.clone());
                builder.send(move |result| Event::LinkResponse {
                    report_id,
                    case_id,
                    result: Box::new(result),
                });
            }
            Err(e) => Self::notify_link_failure(&report_id, &e, model, caps),
        }

        caps.render.render();
    }

    fn handle_link_response(
        report_id: &ReportId,
        case_id: &CaseId,
        result: HttpOutput,
        model: &mut Model,
        caps: &Capabilities,
    ) {
        model.pending_links.remove(report_id);

        match Reply::from_output(result).and_then(|reply| api::decode_link(&reply)) {
            Ok(updated) => Self::apply_link(report_id, case_id, updated, model, caps),
            Err(e) => Self::notify_link_failure(report_id, &e, model, caps),
        }

        caps.render.render();
    }

    fn apply_link(
        report_id: &ReportId,
        case_id: &CaseId,
        updated: Report,
        model: &mut Model,
        caps: &Capabilities,
    ) {
        if &updated.id != report_id {
            warn!(%report_id, returned = %updated.id, "link response names a different report");
        }

        let label = updated.case_label();
        let updated_id = updated.id.clone();
        let toast = if replace_report(&mut model.reports, updated) {
            info!(report_id = %updated_id, %case_id, "report linked");
            model.show_toast(
                format!("Report {updated_id} linked to {label}"),
                ToastKind::Success,
            )
        } else {
            // a reload replaced the list while the link was in flight
            info!(report_id = %updated_id, %case_id, "linked report is no longer listed");
            model.show_toast(
                format!("Report {updated_id} linked to {label}; it is no longer in the list"),
                ToastKind::Info,
            )
        };
        caps.notify.show(toast);
    }

    fn notify_link_failure(
        report_id: &ReportId,
        error: &ApiError,
        model: &mut Model,
        caps: &Capabilities,
    ) {
        warn!(%report_id, code = error.code(), error = %error, "link failed");
        let toast = model.show_toast(format!("Error: {error}"), ToastKind::Error);
        caps.notify.show(toast);
    }

    fn build_report_items(model: &Model) -> Vec<ReportItem> {
        let options: Vec<CaseOption> = model
            .cases
            .iter()
            .map(|c| CaseOption {
                value: c.id.to_string(),
                label: c.option_label(),
            })
            .collect();

        model
            .reports
            .iter()
            .map(|report| {
                let pending = model.pending_links.get(&report.id);
                ReportItem {
                    id: report.id.to_string(),
                    title: report.title.clone(),
                    content: report.content.clone(),
                    case_label: report.case_label(),
                    selector: CaseSelector {
                        placeholder: SELECT_PLACEHOLDER.to_string(),
                        options: options.clone(),
                        selected: pending.map(ToString::to_string),
                        disabled: pending.is_some(),
                    },
                }
            })
            .collect()
    }
}

impl crux_core::App for App {
    type Event = Event;
    type Model = Model;
    type ViewModel = ViewModel;
    type Capabilities = Capabilities;

    fn update(&self, event: Event, model: &mut Model, caps: &Capabilities) {
        let event_name = event.name();
        if event.is_user_initiated() {
            info!(event = event_name, "user action");
        } else {
            debug!(event = event_name, "event");
        }

        match event {
            Event::Noop => {}

            Event::Mounted(config) => {
                if model.phase() == LoadPhase::Initial {
                    info!(base_url = %config.base_url(), "panel mounted");
                    model.api = Some(config);
                    Self::start_load(model, caps);
                } else {
                    debug!("already mounted");
                }
            }

            Event::Reload => Self::start_load(model, caps),

            Event::ReportsResponse { generation, result } => {
                Self::handle_reports_response(generation, *result, model, caps);
            }

            Event::CasesResponse { generation, result } => {
                Self::handle_cases_response(generation, *result, model, caps);
            }

            Event::CaseSelected { report_id, case_id } => {
                Self::request_link(&report_id, &case_id, model, caps);
            }

            Event::LinkResponse {
                report_id,
                case_id,
                result,
            } => {
                Self::handle_link_response(&report_id, &case_id, *result, model, caps);
            }

            Event::DismissToast => {
                model.clear_toast();
                caps.render.render();
            }
        }
    }

    fn view(&self, model: &Model) -> ViewModel {
        let state = match model.phase() {
            LoadPhase::Initial | LoadPhase::Loading => ViewState::Loading,
            LoadPhase::Errored => ViewState::Error {
                message: model
                    .error
                    .as_ref()
                    .map_or_else(|| "An unknown error occurred".to_string(), ToString::to_string),
            },
            LoadPhase::Loaded => ViewState::Ready {
                reports: Self::build_report_items(model),
            },
        };

        ViewModel {
            state,
            toast: model.active_toast.as_ref().map(Into::into),
        }
    }
}
