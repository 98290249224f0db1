use crate::shared::analysis::pagination::PaginationView;
use crate::shared::icons::icon;
use leptos::prelude::*;

/// Prev/next controls of a paginated section. Renders nothing unless `view.visible`.
#[component]
pub fn PaginationControls(
    #[prop(into)] view: Signal<PaginationView>,
    /// Requested page (1-based, unclamped)
    on_page_change: Callback<i64>,
) -> impl IntoView {
    move || {
        let current = view.get();
        if !current.visible {
            return view! { <></> }.into_any();
        }
        let page = i64::from(current.current_page);
        view! {
            <div class="pagination-controls">
                <button
                    class="pagination-btn"
                    on:click=move |_| on_page_change.run(page - 1)
                    disabled=!current.prev_enabled
                    title="Página anterior"
                >
                    {icon("chevron-left")}
                    "Anterior"
                </button>
                <span class="pagination-info">{current.label.clone()}</span>
                <button
                    class="pagination-btn"
                    on:click=move |_| on_page_change.run(page + 1)
                    disabled=!current.next_enabled
                    title="Próxima página"
                >
                    "Próxima"
                    {icon("chevron-right")}
                </button>
            </div>
        }
        .into_any()
    }
}
