use super::chart::ChartHandle;
use super::pagination::PaginationState;
use contracts::dashboards::d500_client_analytics::{AnalysisId, AnalysisPayload, Filters};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            SortOrder::Asc => SortOrder::Desc,
            SortOrder::Desc => SortOrder::Asc,
        }
    }
}

/// Which report is on screen and with which parameters
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisSelection {
    pub analysis: AnalysisId,
    pub filters: Filters,
    pub sort_order: SortOrder,
    /// 1-based
    pub page: u32,
    pub rows_per_page: u32,
    /// Authoritative only after a successful fetch
    pub total_rows: u64,
}

impl AnalysisSelection {
    pub fn new(analysis: AnalysisId, rows_per_page: u32) -> Self {
        Self {
            analysis,
            filters: Filters::new(),
            sort_order: SortOrder::default(),
            page: 1,
            rows_per_page: rows_per_page.max(1),
            total_rows: 0,
        }
    }

    pub fn with_filters(mut self, filters: &Filters) -> Self {
        self.filters = filters.normalized();
        self
    }

    pub fn total_pages(&self) -> u32 {
        PaginationState::from_selection(self).total_pages()
    }
}

/// Single-writer store of the active analysis, its last payload and the live chart handles.
///
/// Mutations never fetch; callers decide when to re-query.
#[derive(Debug, Default)]
pub struct ViewState {
    active: Option<AnalysisSelection>,
    payload: Option<AnalysisPayload>,
    charts: BTreeMap<String, ChartHandle>,
}

pub type SharedViewState = Rc<RefCell<ViewState>>;

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> SharedViewState {
        Rc::new(RefCell::new(Self::new()))
    }

    pub fn active(&self) -> Option<&AnalysisSelection> {
        self.active.as_ref()
    }

    pub fn active_analysis(&self) -> Option<AnalysisId> {
        self.active.as_ref().map(|s| s.analysis)
    }

    pub fn payload(&self) -> Option<&AnalysisPayload> {
        self.payload.as_ref()
    }

    /// Replaces the selection wholesale and forgets the previous payload
    pub fn set_active_analysis(&mut self, selection: AnalysisSelection) {
        self.active = Some(selection);
        self.payload = None;
    }

    /// Back to `Idle`: no selection, no payload
    pub fn reset(&mut self) {
        self.active = None;
        self.payload = None;
    }

    pub fn merge_filters(&mut self, partial: &Filters) {
        if let Some(selection) = self.active.as_mut() {
            selection.filters.merge(partial);
        }
    }

    pub fn set_page(&mut self, page: u32) {
        if let Some(selection) = self.active.as_mut() {
            selection.page = page.max(1);
        }
    }

    pub fn set_sort_order(&mut self, sort_order: SortOrder) {
        if let Some(selection) = self.active.as_mut() {
            selection.sort_order = sort_order;
        }
    }

    /// Defaults for the same analysis: no filters, page 1, descending
    pub fn clear_filters(&mut self) {
        if let Some(selection) = self.active.as_mut() {
            *selection = AnalysisSelection::new(selection.analysis, selection.rows_per_page);
        }
    }

    /// Stores a successful result and clamps the page into range.
    ///
    /// Returns the new page when clamping moved it.
    pub fn store_result(&mut self, payload: AnalysisPayload) -> Option<u32> {
        let mut clamped = None;
        if let Some(selection) = self.active.as_mut() {
            selection.total_rows = payload.total_rows();
            let last = selection.total_pages().max(1);
            if selection.page > last {
                selection.page = last;
                clamped = Some(last);
            }
        }
        self.payload = Some(payload);
        clamped
    }

    /// Returns the handle previously recorded under `widget_id`
    pub fn record_chart(&mut self, widget_id: &str, handle: ChartHandle) -> Option<ChartHandle> {
        self.charts.insert(widget_id.to_string(), handle)
    }

    pub fn drop_chart(&mut self, widget_id: &str) -> Option<ChartHandle> {
        self.charts.remove(widget_id)
    }

    pub fn drop_all_charts(&mut self) -> Vec<(String, ChartHandle)> {
        std::mem::take(&mut self.charts).into_iter().collect()
    }

    pub fn chart(&self, widget_id: &str) -> Option<ChartHandle> {
        self.charts.get(widget_id).copied()
    }

    pub fn chart_handles(&self) -> Vec<ChartHandle> {
        self.charts.values().copied().collect()
    }

    pub fn chart_count(&self) -> usize {
        self.charts.len()
    }
}
