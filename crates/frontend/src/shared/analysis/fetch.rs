use super::error::FetchError;
use super::query::{encode_pairs, endpoint_path, selection_pairs};
use super::view_state::{AnalysisSelection, SharedViewState, SortOrder};
use async_trait::async_trait;
use contracts::dashboards::d500_client_analytics::{
    AnalysisId, AnalysisPayload, ApiErrorBody, Filters, StatusOptions,
};
use std::rc::Rc;

/// Raw HTTP response as seen by the orchestrator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub status_text: String,
    pub body: String,
}

impl HttpResponse {
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// GET capability. `Err` means the transport itself failed (no response).
#[async_trait(?Send)]
pub trait Transport {
    async fn get(&self, url: &str) -> Result<HttpResponse, String>;
}

/// Immutable snapshot of a selection taken at dispatch time.
///
/// Its identity (analysis, filters, page, sort, page size) decides whether a late response is
/// still relevant.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchRequest {
    pub analysis: AnalysisId,
    pub filters: Filters,
    pub page: u32,
    pub rows_per_page: u32,
    pub sort_order: SortOrder,
    path: String,
    query: String,
}

impl FetchRequest {
    pub fn from_selection(selection: &AnalysisSelection) -> Self {
        Self {
            analysis: selection.analysis,
            filters: selection.filters.clone(),
            page: selection.page,
            rows_per_page: selection.rows_per_page,
            sort_order: selection.sort_order,
            path: endpoint_path(selection.analysis, &selection.filters),
            query: encode_pairs(&selection_pairs(selection)),
        }
    }

    pub fn url(&self, base_url: &str) -> String {
        let base = base_url.trim_end_matches('/');
        if self.query.is_empty() {
            format!("{}/api/{}", base, self.path)
        } else {
            format!("{}/api/{}?{}", base, self.path, self.query)
        }
    }

    /// Does the live selection still ask for exactly this?
    pub fn matches(&self, selection: &AnalysisSelection) -> bool {
        self.analysis == selection.analysis
            && self.page == selection.page
            && self.rows_per_page == selection.rows_per_page
            && self.sort_order == selection.sort_order
            && self.filters == selection.filters
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FetchOutcome {
    pub payload: AnalysisPayload,
    /// Set when the page had to be clamped into the new page range
    pub clamped_to: Option<u32>,
}

/// Issues analysis requests and applies the stale-response guard
pub struct FetchOrchestrator {
    base_url: String,
    transport: Rc<dyn Transport>,
}

impl FetchOrchestrator {
    pub fn new(base_url: impl Into<String>, transport: Rc<dyn Transport>) -> Self {
        Self {
            base_url: base_url.into(),
            transport,
        }
    }

    /// Fetches `request` and stores the result in `state`.
    ///
    /// Completion is checked against the live selection before anything else: a response (or
    /// error) for a selection that is no longer active yields `FetchError::Stale` and leaves
    /// `state` untouched.
    pub async fn run(
        &self,
        state: &SharedViewState,
        request: &FetchRequest,
    ) -> Result<FetchOutcome, FetchError> {
        let url = request.url(&self.base_url);
        log::debug!("GET {}", url);

        let result = self.transport.get(&url).await;

        let still_active = state
            .borrow()
            .active()
            .map(|selection| request.matches(selection))
            .unwrap_or(false);
        if !still_active {
            log::debug!("Discarding stale response for {}", url);
            return Err(FetchError::Stale);
        }

        let response = result.map_err(FetchError::Network)?;
        if !response.ok() {
            return Err(FetchError::Http {
                status: response.status,
                message: http_error_message(&response),
            });
        }

        let payload: AnalysisPayload = serde_json::from_str(&response.body)
            .map_err(|e| FetchError::Decode(e.to_string()))?;

        let clamped_to = state.borrow_mut().store_result(payload.clone());
        Ok(FetchOutcome {
            payload,
            clamped_to,
        })
    }
}

impl FetchOrchestrator {
    /// Choices for the contract and access status filters; not tied to any selection
    pub async fn status_options(&self) -> Result<StatusOptions, FetchError> {
        let url = format!(
            "{}/api/filters/contract_statuses",
            self.base_url.trim_end_matches('/')
        );
        let response = self
            .transport
            .get(&url)
            .await
            .map_err(FetchError::Network)?;
        if !response.ok() {
            return Err(FetchError::Http {
                status: response.status,
                message: http_error_message(&response),
            });
        }
        serde_json::from_str(&response.body).map_err(|e| FetchError::Decode(e.to_string()))
    }
}

/// Server-supplied `error`/`message`, else the status line
pub fn http_error_message(response: &HttpResponse) -> String {
    serde_json::from_str::<ApiErrorBody>(&response.body)
        .ok()
        .and_then(ApiErrorBody::into_message)
        .unwrap_or_else(|| format!("HTTP {} - {}", response.status, response.status_text))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::shared::analysis::view_state::ViewState;
    use contracts::dashboards::d500_client_analytics::FilterField;
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use tokio::sync::oneshot;

    type Reply = Result<HttpResponse, String>;

    /// Transport whose responses are released by the test, in any order
    #[derive(Default)]
    pub(crate) struct ScriptedTransport {
        pub requests: RefCell<Vec<String>>,
        pending: RefCell<VecDeque<oneshot::Receiver<Reply>>>,
        immediate: RefCell<VecDeque<Reply>>,
    }

    impl ScriptedTransport {
        /// Next request waits until the returned sender fires
        pub fn defer(&self) -> oneshot::Sender<Reply> {
            let (tx, rx) = oneshot::channel();
            self.pending.borrow_mut().push_back(rx);
            tx
        }

        pub fn respond(&self, reply: Reply) {
            self.immediate.borrow_mut().push_back(reply);
        }
    }

    #[async_trait(?Send)]
    impl Transport for ScriptedTransport {
        async fn get(&self, url: &str) -> Result<HttpResponse, String> {
            self.requests.borrow_mut().push(url.to_string());
            if let Some(reply) = self.immediate.borrow_mut().pop_front() {
                return reply;
            }
            let rx = self.pending.borrow_mut().pop_front();
            match rx {
                Some(rx) => rx.await.unwrap_or_else(|_| Err("dropped".to_string())),
                None => Err("no scripted response".to_string()),
            }
        }
    }

    pub(crate) fn ok_json(body: &str) -> Reply {
        Ok(HttpResponse {
            status: 200,
            status_text: "OK".to_string(),
            body: body.to_string(),
        })
    }

    fn select(state: &SharedViewState, analysis: AnalysisId, filters: Filters) -> FetchRequest {
        let selection = AnalysisSelection::new(analysis, 50).with_filters(&filters);
        let request = FetchRequest::from_selection(&selection);
        state.borrow_mut().set_active_analysis(selection);
        request
    }

    #[tokio::test]
    async fn test_stale_response_is_discarded() {
        let transport = Rc::new(ScriptedTransport::default());
        let orchestrator = FetchOrchestrator::new("", transport.clone());
        let state = ViewState::shared();

        let release_a = transport.defer();
        let request_a = select(&state, AnalysisId::Cancellations, Filters::new());

        let run_a = orchestrator.run(&state, &request_a);
        let switch_and_release = async {
            let request_b = select(&state, AnalysisId::Negativacao, Filters::new());
            let _ = release_a.send(ok_json(r#"{"data":[{"a":1}],"total_rows":1}"#));
            request_b
        };
        let (result_a, request_b) = tokio::join!(run_a, switch_and_release);

        assert_eq!(result_a, Err(FetchError::Stale));
        let state_ref = state.borrow();
        assert!(state_ref.payload().is_none());
        assert_eq!(state_ref.active().map(|s| s.total_rows), Some(0));
        assert_eq!(state_ref.active().map(|s| s.analysis), Some(request_b.analysis));
    }

    #[tokio::test]
    async fn test_only_final_filter_response_wins() {
        let transport = Rc::new(ScriptedTransport::default());
        let orchestrator = FetchOrchestrator::new("", transport.clone());
        let state = ViewState::shared();

        let release_x = transport.defer();
        let release_y = transport.defer();
        let request_x = select(
            &state,
            AnalysisId::CancellationsByCity,
            Filters::new().with_text(FilterField::StartDate, "2024-01-01"),
        );
        let run_x = orchestrator.run(&state, &request_x);

        let run_y = async {
            let request_y = select(
                &state,
                AnalysisId::CancellationsByCity,
                Filters::new().with_text(FilterField::StartDate, "2024-02-01"),
            );
            let pending = orchestrator.run(&state, &request_y);
            // Y answers first, X arrives late
            let _ = release_y.send(ok_json(r#"{"data":[{"Cidade":"Y"}]}"#));
            let result = pending.await;
            let _ = release_x.send(ok_json(r#"{"data":[{"Cidade":"X"}]}"#));
            result
        };

        let (result_x, result_y) = tokio::join!(run_x, run_y);

        assert_eq!(result_x, Err(FetchError::Stale));
        let outcome = result_y.unwrap();
        assert_eq!(outcome.payload.rows()[0]["Cidade"], "Y");
        let stored = state.borrow().payload().cloned().unwrap();
        assert_eq!(stored.rows()[0]["Cidade"], "Y");
    }

    #[tokio::test]
    async fn test_http_error_prefers_server_message() {
        let transport = Rc::new(ScriptedTransport::default());
        let orchestrator = FetchOrchestrator::new("http://api", transport.clone());
        let state = ViewState::shared();

        transport.respond(Ok(HttpResponse {
            status: 400,
            status_text: "Bad Request".to_string(),
            body: r#"{"error":"Datas obrigatórias"}"#.to_string(),
        }));
        transport.respond(Ok(HttpResponse {
            status: 502,
            status_text: "Bad Gateway".to_string(),
            body: "<html>".to_string(),
        }));
        transport.respond(Err("connection refused".to_string()));

        let request = select(&state, AnalysisId::Sellers, Filters::new());
        let first = orchestrator.run(&state, &request).await;
        let second = orchestrator.run(&state, &request).await;
        let third = orchestrator.run(&state, &request).await;

        assert_eq!(
            first,
            Err(FetchError::Http {
                status: 400,
                message: "Datas obrigatórias".to_string()
            })
        );
        assert_eq!(
            second,
            Err(FetchError::Http {
                status: 502,
                message: "HTTP 502 - Bad Gateway".to_string()
            })
        );
        assert_eq!(third, Err(FetchError::Network("connection refused".to_string())));
        assert_eq!(
            transport.requests.borrow()[0],
            "http://api/api/custom_analysis/sellers"
        );
    }

    #[tokio::test]
    async fn test_malformed_body_is_decode_error() {
        let transport = Rc::new(ScriptedTransport::default());
        let orchestrator = FetchOrchestrator::new("", transport.clone());
        let state = ViewState::shared();
        transport.respond(ok_json("not json"));

        let request = select(&state, AnalysisId::Sellers, Filters::new());
        let result = orchestrator.run(&state, &request).await;

        assert!(matches!(result, Err(FetchError::Decode(_))));
        assert!(state.borrow().payload().is_none());
    }

    #[test]
    fn test_request_url_includes_only_set_filters() {
        let selection = AnalysisSelection::new(AnalysisId::CancellationsByNeighborhood, 50)
            .with_filters(
                &Filters::new()
                    .with_text(FilterField::City, "São Paulo")
                    .with_text(FilterField::Relevance, ""),
            );
        let request = FetchRequest::from_selection(&selection);
        assert_eq!(
            request.url("http://h/"),
            "http://h/api/custom_analysis/cancellations_by_neighborhood?city=S%C3%A3o%20Paulo"
        );
    }

    #[tokio::test]
    async fn test_status_options() {
        let transport = Rc::new(ScriptedTransport::default());
        let orchestrator = FetchOrchestrator::new("http://api/", transport.clone());
        transport.respond(ok_json(
            r#"{"status_contrato":["Ativo","Suspenso"],"status_acesso":["Bloqueado"]}"#,
        ));

        let options = orchestrator.status_options().await.unwrap();

        assert_eq!(options.status_contrato, vec!["Ativo", "Suspenso"]);
        assert_eq!(options.status_acesso, vec!["Bloqueado"]);
        assert_eq!(
            transport.requests.borrow()[0],
            "http://api/api/filters/contract_statuses"
        );
    }
}
