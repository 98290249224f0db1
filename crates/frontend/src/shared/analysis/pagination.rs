use super::view_state::AnalysisSelection;

/// Page bookkeeping of one paginated section
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationState {
    /// 1-based
    pub current_page: u32,
    pub rows_per_page: u32,
    pub total_rows: u64,
}

impl PaginationState {
    pub fn new(current_page: u32, rows_per_page: u32, total_rows: u64) -> Self {
        Self {
            current_page: current_page.max(1),
            rows_per_page: rows_per_page.max(1),
            total_rows,
        }
    }

    pub fn from_selection(selection: &AnalysisSelection) -> Self {
        Self::new(selection.page, selection.rows_per_page, selection.total_rows)
    }

    /// `ceil(total_rows / rows_per_page)`; zero rows is zero pages
    pub fn total_pages(&self) -> u32 {
        let pages = self.total_rows.div_ceil(u64::from(self.rows_per_page.max(1)));
        u32::try_from(pages).unwrap_or(u32::MAX)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PaginationView {
    pub current_page: u32,
    pub total_pages: u32,
    pub prev_enabled: bool,
    pub next_enabled: bool,
    pub label: String,
    /// Controls are removed, not disabled, when there is at most one page
    pub visible: bool,
}

impl PaginationView {
    pub fn hidden() -> Self {
        Self::default()
    }
}

pub fn compute_pagination(state: &PaginationState) -> PaginationView {
    let total_pages = state.total_pages();
    PaginationView {
        current_page: state.current_page,
        total_pages,
        prev_enabled: state.current_page > 1,
        next_enabled: state.current_page < total_pages,
        label: format!("Página {} de {}", state.current_page, total_pages),
        visible: state.total_rows > 0 && total_pages > 1,
    }
}

/// `page` clamped into `[1, max(total_pages, 1)]`
pub fn clamp_page(page: i64, total_pages: u32) -> u32 {
    let last = i64::from(total_pages.max(1));
    // in range of u32 after the clamp
    page.clamp(1, last) as u32
}

/// Moves to `page` (clamped) and hands the new page to `refetch`.
///
/// Other filters are not touched; `refetch` only receives the page.
pub fn go_to<F>(state: &mut PaginationState, page: i64, refetch: F) -> u32
where
    F: FnOnce(u32),
{
    let target = clamp_page(page, state.total_pages());
    state.current_page = target;
    refetch(target);
    target
}
