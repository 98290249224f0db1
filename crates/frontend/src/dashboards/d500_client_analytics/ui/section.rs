use super::sink::SectionState;
use crate::shared::analysis::view_state::SortOrder;
use crate::shared::components::data_table::DataTable;
use crate::shared::components::pagination_controls::PaginationControls;
use crate::shared::components::stat_card::StatCardRow;
use crate::shared::icons::icon;
use contracts::dashboards::d500_client_analytics::DrillDown;
use leptos::prelude::*;
use thaw::{Button, ButtonAppearance, ButtonSize, Spinner};

fn sort_label(order: SortOrder) -> &'static str {
    match order {
        SortOrder::Asc => "Ordem: crescente",
        SortOrder::Desc => "Ordem: decrescente",
    }
}

/// Cards, tables and pagination of one analysis slot
#[component]
pub fn AnalysisSection(
    #[prop(into)] state: Signal<SectionState>,
    on_page: Callback<i64>,
    on_sort: Callback<()>,
    on_drill: Callback<DrillDown>,
) -> impl IntoView {
    move || match state.get() {
        SectionState::Idle => view! { <></> }.into_any(),
        SectionState::Loading(analysis) => view! {
            <div class="analysis-loading">
                <Spinner />
                <span>{format!("Carregando {}...", analysis.title())}</span>
            </div>
        }
        .into_any(),
        SectionState::Error(message) => view! {
            <div class="analysis-error" role="alert">{message}</div>
        }
        .into_any(),
        SectionState::Notice(message) => view! {
            <div class="analysis-notice">{message}</div>
        }
        .into_any(),
        SectionState::Content(section) => {
            let pagination = section.pagination.clone();
            let sort = section.sortable.then(|| {
                view! {
                    <Button
                        size=ButtonSize::Small
                        appearance=ButtonAppearance::Subtle
                        on_click=move |_| on_sort.run(())
                    >
                        {icon("sort")}
                        {sort_label(section.sort_order)}
                    </Button>
                }
            });
            let browse = section.browse.map(|drill| {
                view! {
                    <Button
                        size=ButtonSize::Small
                        appearance=ButtonAppearance::Secondary
                        on_click=move |_| on_drill.run(drill.clone())
                    >
                        "Ver tabela completa"
                    </Button>
                }
            });
            let tables = section
                .tables
                .into_iter()
                .map(|table| view! { <DataTable table=table on_drill=on_drill /> })
                .collect_view();
            view! {
                <div class="analysis-section">
                    <StatCardRow cards=section.cards />
                    {sort}
                    {browse}
                    {section.notice.map(|n| view! { <div class="analysis-notice">{n}</div> })}
                    {section.table.map(|table| view! { <DataTable table=table on_drill=on_drill /> })}
                    {tables}
                    <PaginationControls
                        view=Signal::derive(move || pagination.clone())
                        on_page_change=on_page
                    />
                </div>
            }
            .into_any()
        }
    }
}
