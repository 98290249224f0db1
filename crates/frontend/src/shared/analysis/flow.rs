//! Filter-driven re-query flow: state change, fetch, then paint.

use super::catalog::{self, required_notice, resolve_drill, RenderPlan, WidgetPlan};
use super::chart::{ChartClick, ChartRenderer, ChartType, ClickCallback};
use super::error::FetchError;
use super::fetch::{FetchOrchestrator, FetchRequest};
use super::layout::{LayoutEngine, WidgetContent};
use super::pagination::{compute_pagination, go_to, PaginationState, PaginationView};
use super::presentation::{SectionView, ViewSink};
use super::view_state::{AnalysisSelection, SharedViewState, ViewState};
use contracts::dashboards::d500_client_analytics::{AnalysisId, AnalysisPayload, DrillDown, Filters};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SlotStatus {
    #[default]
    Idle,
    Loading,
    Rendered,
    Errored,
}

/// Grid and chart collaborators of a slot that paints widgets
pub struct WidgetHost {
    pub layout: LayoutEngine,
    pub charts: ChartRenderer,
}

pub type DrillHandler = Rc<dyn Fn(DrillDown)>;

/// One analysis slot (the main report or the detail view)
pub struct AnalysisFlow {
    state: SharedViewState,
    orchestrator: Rc<FetchOrchestrator>,
    sink: Rc<dyn ViewSink>,
    widgets: Option<RefCell<WidgetHost>>,
    on_drill: RefCell<Option<DrillHandler>>,
    rows_per_page: u32,
    status: Cell<SlotStatus>,
}

impl AnalysisFlow {
    pub fn new(
        orchestrator: Rc<FetchOrchestrator>,
        sink: Rc<dyn ViewSink>,
        widgets: Option<WidgetHost>,
        rows_per_page: u32,
    ) -> Self {
        Self {
            state: ViewState::shared(),
            orchestrator,
            sink,
            widgets: widgets.map(RefCell::new),
            on_drill: RefCell::new(None),
            rows_per_page: rows_per_page.max(1),
            status: Cell::new(SlotStatus::Idle),
        }
    }

    /// Receives chart clicks and table drill cells, already resolved to a detail view
    pub fn set_drill_handler(&self, handler: DrillHandler) {
        *self.on_drill.borrow_mut() = Some(handler);
    }

    pub fn state(&self) -> SharedViewState {
        self.state.clone()
    }

    pub fn status(&self) -> SlotStatus {
        self.status.get()
    }

    pub fn active_analysis(&self) -> Option<AnalysisId> {
        self.state.borrow().active_analysis()
    }

    /// Starts `analysis` from scratch with exactly `filters`, tearing down the previous one
    pub async fn select(&self, analysis: AnalysisId, filters: &Filters) {
        self.teardown(analysis);
        self.state
            .borrow_mut()
            .set_active_analysis(AnalysisSelection::new(analysis, self.rows_per_page).with_filters(filters));
        self.refresh().await;
    }

    /// Merges `changed` into the active selection and re-queries.
    ///
    /// Switching analysis clears every widget before the fetch starts.
    pub async fn on_filter_changed(&self, analysis: AnalysisId, changed: &Filters, reset_page: bool) {
        if self.active_analysis() != Some(analysis) {
            self.select(analysis, changed).await;
            return;
        }
        {
            let mut state = self.state.borrow_mut();
            state.merge_filters(changed);
            if reset_page {
                state.set_page(1);
            }
        }
        self.refresh().await;
    }

    /// Moves to `page`, clamped to the known page range, keeping every filter
    pub async fn go_to_page(&self, page: i64) {
        let Some(selection) = self.state.borrow().active().cloned() else {
            return;
        };
        let mut pagination = PaginationState::from_selection(&selection);
        let mut target = None;
        go_to(&mut pagination, page, |p| target = Some(p));
        if let Some(target) = target {
            self.state.borrow_mut().set_page(target);
            self.refresh().await;
        }
    }

    /// Flips the sort order of a sortable analysis and restarts at page 1
    pub async fn toggle_sort(&self) {
        {
            let mut state = self.state.borrow_mut();
            let Some(selection) = state.active() else {
                return;
            };
            if !selection.analysis.is_sortable() {
                return;
            }
            let order = selection.sort_order.toggled();
            state.set_sort_order(order);
            state.set_page(1);
        }
        self.refresh().await;
    }

    pub async fn clear_filters(&self) {
        if self.active_analysis().is_none() {
            return;
        }
        self.state.borrow_mut().clear_filters();
        self.refresh().await;
    }

    /// Re-issues the active selection as it stands
    pub async fn refresh(&self) {
        let mut clamp_retry = true;
        loop {
            let Some(request) = self.state.borrow().active().map(FetchRequest::from_selection) else {
                return;
            };

            if let Some(field) = request.analysis.missing_required(&request.filters) {
                self.clear_widgets();
                self.status.set(SlotStatus::Idle);
                self.sink.show_notice(required_notice(field));
                return;
            }

            self.status.set(SlotStatus::Loading);
            self.sink.loading(request.analysis);

            match self.orchestrator.run(&self.state, &request).await {
                // a newer request owns the slot now
                Err(FetchError::Stale) => return,
                Err(e) => {
                    log::warn!("{} failed: {}", request.analysis, e);
                    self.status.set(SlotStatus::Errored);
                    if let Some(message) = e.user_message() {
                        self.sink.show_error(&message);
                    }
                    return;
                }
                Ok(outcome) => {
                    if clamp_retry && outcome.clamped_to.is_some() && outcome.payload.is_empty() {
                        clamp_retry = false;
                        continue;
                    }
                    self.paint(&request, &outcome.payload);
                    return;
                }
            }
        }
    }

    /// Redraws a live chart with another type, from its stored spec
    pub fn change_chart_type(&self, widget_id: &str, chart_type: ChartType) {
        let Some(widgets) = &self.widgets else {
            return;
        };
        let mut widgets = widgets.borrow_mut();
        let mut state = self.state.borrow_mut();
        if widgets.charts.change_type(&mut state, widget_id, chart_type).is_none() {
            log::warn!("No chart at '{}' to switch to {}", widget_id, chart_type.key());
        }
    }

    pub fn save_layout(&self) -> bool {
        let (Some(widgets), Some(analysis)) = (&self.widgets, self.active_analysis()) else {
            return false;
        };
        widgets.borrow().layout.save_layout(analysis.key())
    }

    /// Reconfigures the grid for `width` and reflows charts when the mode changed
    pub fn handle_viewport(&self, width: u32) {
        let Some(widgets) = &self.widgets else {
            return;
        };
        let mut widgets = widgets.borrow_mut();
        if widgets.layout.apply_viewport(width) {
            widgets.charts.resize_all(&self.state.borrow());
        }
    }

    /// Reflows every live chart; skipped while widgets are being rebuilt
    pub fn resize_charts(&self) {
        let Some(widgets) = &self.widgets else {
            return;
        };
        if let (Ok(widgets), Ok(state)) = (widgets.try_borrow(), self.state.try_borrow()) {
            widgets.charts.resize_all(&state);
        }
    }

    /// Back to `Idle` with nothing on screen
    pub fn reset(&self) {
        self.clear_widgets();
        self.state.borrow_mut().reset();
        self.status.set(SlotStatus::Idle);
        self.sink.clear();
    }

    fn teardown(&self, next: AnalysisId) {
        self.clear_widgets();
        if let Some(widgets) = &self.widgets {
            widgets.borrow_mut().layout.set_namespace(next.key());
        }
        self.sink.clear();
    }

    fn clear_widgets(&self) {
        if let Some(widgets) = &self.widgets {
            let mut widgets = widgets.borrow_mut();
            widgets.charts.destroy_all(&mut self.state.borrow_mut());
            widgets.layout.clear();
        }
    }

    fn paint(&self, request: &FetchRequest, payload: &AnalysisPayload) {
        let plan = catalog::plan(request.analysis, payload, &request.filters);

        if !payload.cities().is_empty() {
            self.sink.show_cities(payload.cities());
        }

        let RenderPlan {
            cards,
            table,
            tables,
            widgets,
            notice,
            browse,
        } = plan;
        self.paint_widgets(request, widgets);

        let pagination = if request.analysis.is_paginated() {
            self.state
                .borrow()
                .active()
                .map(|s| compute_pagination(&PaginationState::from_selection(s)))
                .unwrap_or_default()
        } else {
            PaginationView::hidden()
        };

        self.sink.show_content(SectionView {
            analysis: request.analysis,
            title: request.analysis.title().to_string(),
            cards,
            table,
            tables,
            browse,
            pagination,
            sortable: request.analysis.is_sortable(),
            sort_order: request.sort_order,
            notice,
        });
        self.status.set(SlotStatus::Rendered);
    }

    fn paint_widgets(&self, request: &FetchRequest, plans: Vec<WidgetPlan>) {
        let Some(widgets) = &self.widgets else {
            if !plans.is_empty() {
                log::warn!("{} has widgets but the slot has no grid", request.analysis);
            }
            return;
        };
        let mut widgets = widgets.borrow_mut();
        let mut state = self.state.borrow_mut();
        widgets.charts.destroy_all(&mut state);
        widgets.layout.clear();

        for plan in plans {
            let placed = match plan {
                WidgetPlan::Chart(chart) => {
                    let content = WidgetContent::Chart {
                        title: chart.spec.title.clone(),
                        type_options: chart.type_options,
                        selected: chart.spec.chart_type,
                    };
                    let placed = widgets.layout.place(&chart.id, chart.default_rect, content);
                    if placed.is_ok() {
                        let on_click = chart.drill.and_then(|rule| {
                            let handler = self.on_drill.borrow().clone()?;
                            let snapshot = request.filters.clone();
                            let callback: ClickCallback = Rc::new(move |click: ChartClick| {
                                if let Some(drill) = resolve_drill(&rule, &click, &snapshot) {
                                    handler(drill);
                                }
                            });
                            Some(callback)
                        });
                        widgets.charts.render(&mut state, &chart.id, chart.spec, on_click);
                    }
                    placed.map(|_| chart.id)
                }
                WidgetPlan::Table {
                    id,
                    default_rect,
                    table,
                } => widgets
                    .layout
                    .place(&id, default_rect, WidgetContent::Table(table))
                    .map(|_| id),
                WidgetPlan::Message {
                    id,
                    default_rect,
                    text,
                } => widgets
                    .layout
                    .place(&id, default_rect, WidgetContent::Message(text))
                    .map(|_| id),
            };
            if let Err(e) = placed {
                log::error!("Widget not placed: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::analysis::chart::tests::FakeCharts;
    use crate::shared::analysis::chart::ChartHandle;
    use crate::shared::analysis::fetch::tests::{ok_json, ScriptedTransport};
    use crate::shared::analysis::fetch::HttpResponse;
    use crate::shared::analysis::layout::tests::{FakeGrid, MemoryStore, SETTINGS};
    use contracts::dashboards::d500_client_analytics::FilterField;

    #[derive(Debug, Clone, PartialEq)]
    enum Event {
        Loading(AnalysisId),
        Error(String),
        Notice(String),
        Content(SectionView),
        Clear,
        Cities(Vec<String>),
    }

    #[derive(Default)]
    struct RecordingSink {
        events: RefCell<Vec<Event>>,
    }

    impl RecordingSink {
        fn last_content(&self) -> Option<SectionView> {
            self.events.borrow().iter().rev().find_map(|e| match e {
                Event::Content(view) => Some(view.clone()),
                _ => None,
            })
        }

        fn last(&self) -> Option<Event> {
            self.events.borrow().last().cloned()
        }
    }

    impl ViewSink for RecordingSink {
        fn loading(&self, analysis: AnalysisId) {
            self.events.borrow_mut().push(Event::Loading(analysis));
        }
        fn show_error(&self, message: &str) {
            self.events.borrow_mut().push(Event::Error(message.to_string()));
        }
        fn show_notice(&self, message: &str) {
            self.events.borrow_mut().push(Event::Notice(message.to_string()));
        }
        fn show_content(&self, view: SectionView) {
            self.events.borrow_mut().push(Event::Content(view));
        }
        fn clear(&self) {
            self.events.borrow_mut().push(Event::Clear);
        }
        fn show_cities(&self, cities: &[String]) {
            self.events.borrow_mut().push(Event::Cities(cities.to_vec()));
        }
    }

    struct Harness {
        transport: Rc<ScriptedTransport>,
        sink: Rc<RecordingSink>,
        grid: Rc<FakeGrid>,
        charts: Rc<FakeCharts>,
        flow: AnalysisFlow,
    }

    fn harness() -> Harness {
        let transport = Rc::new(ScriptedTransport::default());
        let sink = Rc::new(RecordingSink::default());
        let grid = Rc::new(FakeGrid::default());
        let charts = Rc::new(FakeCharts::default());
        let store = Rc::new(MemoryStore::default());
        let host = WidgetHost {
            layout: LayoutEngine::new(grid.clone(), store, SETTINGS),
            charts: ChartRenderer::new(charts.clone()),
        };
        let flow = AnalysisFlow::new(
            Rc::new(FetchOrchestrator::new("http://api", transport.clone())),
            sink.clone(),
            Some(host),
            50,
        );
        Harness {
            transport,
            sink,
            grid,
            charts,
            flow,
        }
    }

    const BY_CITY: &str = r#"{"data":[{"Cidade":"X","Cancelados":5,"Negativados":2,"Total":7}],
        "total_cancelados":5,"total_negativados":2,"grand_total":7,"cities":["X","Y"]}"#;

    fn server_error() -> Result<HttpResponse, String> {
        Ok(HttpResponse {
            status: 500,
            status_text: "Internal Server Error".to_string(),
            body: r#"{"error":"Banco indisponível"}"#.to_string(),
        })
    }

    #[tokio::test]
    async fn test_table_analysis_renders_rows_without_pagination() {
        let h = harness();
        h.transport.respond(ok_json(
            r#"{"data":[{"Cliente":"A"},{"Cliente":"B"},{"Cliente":"C"}],"total_rows":3}"#,
        ));

        h.flow.select(AnalysisId::Cancellations, &Filters::new()).await;

        let view = h.sink.last_content().unwrap();
        assert_eq!(view.table.as_ref().map(|t| t.rows.len()), Some(3));
        assert!(!view.pagination.visible);
        assert!(view.sortable);
        assert_eq!(h.flow.status(), SlotStatus::Rendered);
        assert_eq!(
            h.transport.requests.borrow().as_slice(),
            ["http://api/api/custom_analysis/cancellations?limit=50&offset=0&sort_order=desc"]
        );
    }

    #[tokio::test]
    async fn test_city_chart_click_drills_with_snapshot() {
        let h = harness();
        let drilled = Rc::new(RefCell::new(Vec::new()));
        let sink = drilled.clone();
        h.flow
            .set_drill_handler(Rc::new(move |d: DrillDown| sink.borrow_mut().push(d)));
        h.transport.respond(ok_json(BY_CITY));

        h.flow
            .select(AnalysisId::CancellationsByCity, &Filters::new())
            .await;

        assert_eq!(h.grid.ids(), vec!["cityAnalysisChart", "cityAnalysisTable"]);
        let live = h.charts.live_for("cityAnalysisChart");
        assert_eq!(live.len(), 1);
        {
            let charts = h.charts.live.borrow();
            let datasets = &charts[&live[0]].1.data.datasets;
            assert_eq!(datasets.len(), 2);
            assert!(datasets.iter().all(|d| d.data.len() == 1));
        }
        assert!(h
            .sink
            .events
            .borrow()
            .contains(&Event::Cities(vec!["X".to_string(), "Y".to_string()])));

        h.charts.click(ChartHandle(live[0]), 0, 0);

        let drilled = drilled.borrow();
        assert_eq!(drilled.len(), 1);
        assert_eq!(drilled[0].target, AnalysisId::CityClients);
        assert_eq!(drilled[0].filters.text(FilterField::City), "X");
        assert_eq!(drilled[0].filters.text(FilterField::ClientType), "cancelado");
    }

    #[tokio::test]
    async fn test_failed_refetch_keeps_widgets_of_same_analysis() {
        let h = harness();
        h.transport.respond(ok_json(BY_CITY));
        h.flow
            .select(AnalysisId::CancellationsByCity, &Filters::new())
            .await;

        h.transport.respond(server_error());
        h.flow
            .on_filter_changed(
                AnalysisId::CancellationsByCity,
                &Filters::new().with_text(FilterField::StartDate, "2024-01-01"),
                true,
            )
            .await;

        assert_eq!(h.sink.last(), Some(Event::Error("Banco indisponível".to_string())));
        assert_eq!(h.flow.status(), SlotStatus::Errored);
        assert_eq!(h.grid.ids().len(), 2);
        assert_eq!(h.charts.live_for("cityAnalysisChart").len(), 1);
    }

    #[tokio::test]
    async fn test_failed_switch_leaves_no_widgets() {
        let h = harness();
        h.transport.respond(ok_json(BY_CITY));
        h.flow
            .select(AnalysisId::CancellationsByCity, &Filters::new())
            .await;

        h.transport.respond(Err("connection refused".to_string()));
        h.flow
            .on_filter_changed(AnalysisId::Sellers, &Filters::new(), true)
            .await;

        assert!(h.grid.ids().is_empty());
        assert!(h.charts.live.borrow().is_empty());
        assert_eq!(h.flow.state().borrow().chart_count(), 0);
        assert_eq!(
            h.sink.last(),
            Some(Event::Error(
                "Falha de conexão com o servidor. Tente novamente.".to_string()
            ))
        );
    }

    #[tokio::test]
    async fn test_missing_required_filter_skips_fetch() {
        let h = harness();

        h.flow
            .select(
                AnalysisId::BillingByCity,
                &Filters::new().with_text(FilterField::StartDate, "2024-01-01"),
            )
            .await;

        assert!(h.transport.requests.borrow().is_empty());
        assert_eq!(
            h.sink.last(),
            Some(Event::Notice("Por favor, selecione as datas.".to_string()))
        );
        assert_eq!(h.flow.status(), SlotStatus::Idle);
    }

    #[tokio::test]
    async fn test_neighborhood_without_city_loads_city_list() {
        let h = harness();
        h.transport
            .respond(ok_json(r#"{"data":[],"cities":["X","Y"]}"#));

        h.flow
            .select(AnalysisId::CancellationsByNeighborhood, &Filters::new())
            .await;

        assert_eq!(
            h.transport.requests.borrow().as_slice(),
            ["http://api/api/custom_analysis/cancellations_by_neighborhood"]
        );
        assert!(h
            .sink
            .events
            .borrow()
            .contains(&Event::Cities(vec!["X".to_string(), "Y".to_string()])));
        let view = h.sink.last_content().unwrap();
        assert_eq!(view.notice.as_deref(), Some("Por favor, selecione uma cidade."));
        assert!(view.cards.is_empty());
        assert!(h.grid.ids().is_empty());
        assert_eq!(h.flow.status(), SlotStatus::Rendered);
    }

    #[tokio::test]
    async fn test_client_history_is_addressed_by_path() {
        let h = harness();
        h.transport.respond(ok_json(
            r#"{"equipamentos":[],"os":[{"ID":1,"Assunto":"Sem sinal"}],"atendimentos":[]}"#,
        ));
        let filters = Filters::new()
            .with_text(FilterField::ContractId, "42")
            .with_text(FilterField::ClientName, "Ana Maria");

        h.flow
            .select(AnalysisId::CancellationContext, &filters)
            .await;

        assert_eq!(
            h.transport.requests.borrow().as_slice(),
            ["http://api/api/details/cancellation_context/42/Ana%20Maria"]
        );
        let view = h.sink.last_content().unwrap();
        assert_eq!(view.tables.len(), 1);
        assert!(view.table.is_none());
        assert!(!view.pagination.visible);
    }

    #[tokio::test]
    async fn test_page_past_end_is_refetched_once() {
        let h = harness();
        h.transport
            .respond(ok_json(r#"{"data":[{"Cliente":"A"}],"total_rows":300}"#));
        h.flow.select(AnalysisId::Cancellations, &Filters::new()).await;

        h.transport.respond(ok_json(r#"{"data":[],"total_rows":50}"#));
        h.transport
            .respond(ok_json(r#"{"data":[{"Cliente":"A"}],"total_rows":50}"#));
        h.flow.go_to_page(6).await;

        let requests = h.transport.requests.borrow();
        assert_eq!(requests.len(), 3);
        assert!(requests[1].contains("offset=250"));
        assert!(requests[2].contains("offset=0"));
        assert_eq!(h.flow.state().borrow().active().map(|s| s.page), Some(1));
        let view = h.sink.last_content().unwrap();
        assert_eq!(view.pagination.total_pages, 1);
        assert!(!view.pagination.visible);
    }

    #[tokio::test]
    async fn test_sort_toggle_restarts_at_first_page() {
        let h = harness();
        h.transport
            .respond(ok_json(r#"{"data":[{"Cliente":"A"}],"total_rows":300}"#));
        h.flow.select(AnalysisId::Negativacao, &Filters::new()).await;
        h.transport
            .respond(ok_json(r#"{"data":[{"Cliente":"A"}],"total_rows":300}"#));
        h.flow.go_to_page(3).await;

        h.transport
            .respond(ok_json(r#"{"data":[{"Cliente":"A"}],"total_rows":300}"#));
        h.flow.toggle_sort().await;

        let requests = h.transport.requests.borrow();
        assert!(requests[2].ends_with("limit=50&offset=0&sort_order=asc"));
        let view = h.sink.last_content().unwrap();
        assert_eq!(view.pagination.label, "Página 1 de 6");
    }

    #[tokio::test]
    async fn test_only_latest_city_is_painted() {
        let h = harness();
        let neighborhoods = |city: &str| {
            ok_json(&format!(
                r#"{{"data":[{{"Bairro":"{}-Centro","Cancelados":1,"Negativados":0}}]}}"#,
                city
            ))
        };
        let release_x = h.transport.defer();
        let release_y = h.transport.defer();

        let city_x = Filters::new().with_text(FilterField::City, "X");
        let city_y = Filters::new().with_text(FilterField::City, "Y");
        let first = h.flow.select(AnalysisId::CancellationsByNeighborhood, &city_x);
        let second = async {
            h.flow
                .on_filter_changed(AnalysisId::CancellationsByNeighborhood, &city_y, true)
                .await
        };
        let release = async {
            let _ = release_y.send(neighborhoods("Y"));
            let _ = release_x.send(neighborhoods("X"));
        };
        tokio::join!(first, second, release);

        let contents: Vec<SectionView> = h
            .sink
            .events
            .borrow()
            .iter()
            .filter_map(|e| match e {
                Event::Content(v) => Some(v.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(contents.len(), 1);
        let live = h.charts.live_for("neighborhoodChart");
        assert_eq!(live.len(), 1);
        let charts = h.charts.live.borrow();
        assert_eq!(charts[&live[0]].1.data.labels, vec!["Y-Centro"]);
    }

    #[tokio::test]
    async fn test_mobile_switch_resizes_live_charts() {
        let h = harness();
        h.transport.respond(ok_json(BY_CITY));
        h.flow
            .select(AnalysisId::CancellationsByCity, &Filters::new())
            .await;
        let live = h.charts.live_for("cityAnalysisChart");

        h.flow.handle_viewport(500);
        assert_eq!(*h.charts.resized.borrow(), live);

        // same mode, nothing to reflow
        h.flow.handle_viewport(420);
        assert_eq!(h.charts.resized.borrow().len(), 1);
        assert_eq!(h.grid.modes.borrow().len(), 1);
    }

    #[tokio::test]
    async fn test_chart_type_switch_replaces_handle() {
        let h = harness();
        h.transport.respond(ok_json(BY_CITY));
        h.flow
            .select(AnalysisId::CancellationsByCity, &Filters::new())
            .await;
        let before = h.charts.live_for("cityAnalysisChart");

        h.flow
            .change_chart_type("cityAnalysisChart", ChartType::BarHorizontal);

        let after = h.charts.live_for("cityAnalysisChart");
        assert_eq!(after.len(), 1);
        assert_ne!(after, before);
        assert_eq!(*h.charts.destroyed.borrow(), before);
        assert_eq!(
            h.flow.state().borrow().chart("cityAnalysisChart"),
            Some(ChartHandle(after[0]))
        );
        let charts = h.charts.live.borrow();
        assert_eq!(charts[&after[0]].1.data.datasets.len(), 2);
        // one fetch; the switch redraws from the kept spec
        assert_eq!(h.transport.requests.borrow().len(), 1);
    }

    #[tokio::test]
    async fn test_clear_filters_requeries_unfiltered() {
        let h = harness();
        h.transport
            .respond(ok_json(r#"{"data":[{"Cliente":"A"}],"total_rows":1}"#));
        h.flow
            .select(
                AnalysisId::Cancellations,
                &Filters::new()
                    .with_text(FilterField::StartDate, "2024-01-01")
                    .with_text(FilterField::SearchTerm, "Ana"),
            )
            .await;

        h.transport
            .respond(ok_json(r#"{"data":[{"Cliente":"B"}],"total_rows":1}"#));
        h.flow.clear_filters().await;

        let requests = h.transport.requests.borrow();
        assert_eq!(requests.len(), 2);
        assert!(requests[0].contains("search_term=Ana&start_date=2024-01-01"));
        assert_eq!(
            requests[1],
            "http://api/api/custom_analysis/cancellations?limit=50&offset=0&sort_order=desc"
        );
        assert_eq!(
            h.flow.state().borrow().active().map(|s| s.filters.active_count()),
            Some(0)
        );
    }

    #[tokio::test]
    async fn test_reset_returns_to_idle() {
        let h = harness();
        h.transport.respond(ok_json(BY_CITY));
        h.flow
            .select(AnalysisId::CancellationsByCity, &Filters::new())
            .await;

        h.flow.reset();

        assert_eq!(h.flow.status(), SlotStatus::Idle);
        assert!(h.flow.active_analysis().is_none());
        assert!(h.grid.ids().is_empty());
        assert_eq!(h.sink.last(), Some(Event::Clear));
    }
}
