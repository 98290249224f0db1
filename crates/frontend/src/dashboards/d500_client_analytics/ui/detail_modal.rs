use super::section::AnalysisSection;
use super::sink::SectionState;
use crate::shared::icons::icon;
use crate::shared::modal_frame::ModalFrame;
use contracts::dashboards::d500_client_analytics::{AnalysisId, DrillDown};
use leptos::prelude::*;
use thaw::{Button, ButtonAppearance, ButtonSize};

/// Drill-down slot: a paginated detail in a modal, with sibling tabs for client views
#[component]
pub fn DetailModal(
    #[prop(into)] open: Signal<bool>,
    #[prop(into)] title: Signal<String>,
    #[prop(into)] state: Signal<SectionState>,
    #[prop(into)] tabs: Signal<Vec<(&'static str, DrillDown)>>,
    #[prop(into)] active: Signal<Option<AnalysisId>>,
    on_close: Callback<()>,
    on_page: Callback<i64>,
    on_drill: Callback<DrillDown>,
) -> impl IntoView {
    let no_sort = Callback::new(|_: ()| {});

    let tab_bar = move || {
        let tabs = tabs.get();
        (!tabs.is_empty()).then(|| {
            let buttons = tabs
                .into_iter()
                .map(|(label, drill)| {
                    let target = drill.target;
                    let appearance = move || {
                        if active.get() == Some(target) {
                            ButtonAppearance::Primary
                        } else {
                            ButtonAppearance::Subtle
                        }
                    };
                    view! {
                        <Button
                            size=ButtonSize::Small
                            appearance=appearance
                            on_click=move |_| on_drill.run(drill.clone())
                        >
                            {label}
                        </Button>
                    }
                })
                .collect_view();
            view! { <div class="detail-tabs" role="tablist">{buttons}</div> }
        })
    };

    move || {
        open.get().then(|| {
            view! {
                <ModalFrame on_close=on_close modal_class="detail-modal">
                    <div class="modal-header">
                        <h2 class="modal-title">{move || title.get()}</h2>
                        <button
                            class="button button--ghost"
                            title="Fechar"
                            on:click=move |_| on_close.run(())
                        >
                            {icon("x")}
                        </button>
                    </div>
                    {tab_bar}
                    <div class="modal-body">
                        <AnalysisSection
                            state=state
                            on_page=on_page
                            on_sort=no_sort
                            on_drill=on_drill
                        />
                    </div>
                </ModalFrame>
            }
        })
    }
}
