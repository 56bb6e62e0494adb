//! In-memory [`SonarApi`] used by unit tests. Responses are queued per
//! endpoint and every call is recorded in order.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};

use super::{
    ApiResponse, ISSUES_SEARCH_PATH, MEASURES_PATH, PROJECT_CREATE_PATH, QUALITY_GATE_PATH,
    SonarApi, TOKEN_GENERATE_PATH, TOKEN_REVOKE_PATH,
};
use crate::error::{Result, SonarError};
use crate::models::ServiceStatus;

#[derive(Debug, Default)]
pub(crate) struct ScriptedApi {
    statuses: RefCell<VecDeque<ServiceStatus>>,
    responses: RefCell<HashMap<&'static str, VecDeque<(u16, String)>>>,
    calls: RefCell<Vec<String>>,
}

impl ScriptedApi {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_statuses(self, statuses: impl IntoIterator<Item = ServiceStatus>) -> Self {
        self.statuses.borrow_mut().extend(statuses);
        self
    }

    pub(crate) fn respond(self, endpoint: &'static str, status: u16, body: impl Into<String>) -> Self {
        self.responses
            .borrow_mut()
            .entry(endpoint)
            .or_default()
            .push_back((status, body.into()));
        self
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    pub(crate) fn count(&self, call: &str) -> usize {
        self.calls.borrow().iter().filter(|entry| *entry == call).count()
    }

    fn record(&self, call: impl Into<String>) {
        self.calls.borrow_mut().push(call.into());
    }

    fn next(&self, endpoint: &'static str) -> Result<ApiResponse> {
        let queued = self
            .responses
            .borrow_mut()
            .get_mut(endpoint)
            .and_then(VecDeque::pop_front);
        match queued {
            Some((status, body)) => Ok(ApiResponse::new(endpoint, status, body)),
            None => Err(SonarError::Fetch {
                endpoint: endpoint.to_string(),
                status: 599,
                body_excerpt: "no scripted response".to_string(),
            }),
        }
    }
}

impl SonarApi for ScriptedApi {
    fn system_status(&self) -> ServiceStatus {
        self.record("system_status");
        self.statuses
            .borrow_mut()
            .pop_front()
            .unwrap_or(ServiceStatus::Unreachable)
    }

    fn create_project(&self, _key: &str, _name: &str) -> Result<ApiResponse> {
        self.record("create_project");
        self.next(PROJECT_CREATE_PATH)
    }

    fn generate_token(&self, _name: &str) -> Result<ApiResponse> {
        self.record("generate_token");
        self.next(TOKEN_GENERATE_PATH)
    }

    fn revoke_token(&self, _name: &str) -> Result<ApiResponse> {
        self.record("revoke_token");
        self.next(TOKEN_REVOKE_PATH)
    }

    fn quality_gate(&self, _project_key: &str) -> Result<ApiResponse> {
        self.record("quality_gate");
        self.next(QUALITY_GATE_PATH)
    }

    fn measures(&self, _project_key: &str, _metric_keys: &[&str]) -> Result<ApiResponse> {
        self.record("measures");
        self.next(MEASURES_PATH)
    }

    fn issues_page(&self, _project_key: &str, page: u32, _page_size: u32) -> Result<ApiResponse> {
        self.record(format!("issues_page:{page}"));
        self.next(ISSUES_SEARCH_PATH)
    }
}
