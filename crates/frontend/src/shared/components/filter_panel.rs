use crate::shared::icons::icon;
use leptos::prelude::*;

/// Collapsible panel around the filter form
#[component]
pub fn FilterPanel(
    #[prop(into)] is_expanded: RwSignal<bool>,
    /// Badge next to the title
    #[prop(into)]
    active_filters_count: Signal<usize>,
    /// Buttons kept visible when the panel is collapsed
    #[prop(into)]
    actions: ViewFn,
    children: ChildrenFn,
) -> impl IntoView {
    let toggle_expanded = move |_| {
        is_expanded.update(|e| *e = !*e);
    };

    view! {
        <div class="filter-panel">
            <div class="filter-panel-header">
                <div class="filter-panel-header__left" on:click=toggle_expanded>
                    <span class=move || {
                        if is_expanded.get() {
                            "filter-panel__chevron filter-panel__chevron--expanded"
                        } else {
                            "filter-panel__chevron"
                        }
                    }>{icon("chevron-down")}</span>
                    {icon("filter")}
                    <span class="filter-panel__title">"Filtros"</span>
                    {move || {
                        let count = active_filters_count.get();
                        (count > 0).then(|| view! { <span class="badge badge--primary">{count}</span> })
                    }}
                </div>
                <div class="filter-panel-header__right">{actions.run()}</div>
            </div>

            <div class=move || {
                if is_expanded.get() {
                    "filter-panel__collapsible filter-panel__collapsible--expanded"
                } else {
                    "filter-panel__collapsible filter-panel__collapsible--collapsed"
                }
            }>
                <div class="filter-panel-content">{children()}</div>
            </div>
        </div>
    }
}
