use super::detail_modal::DetailModal;
use super::filter_bar::FilterBar;
use super::section::AnalysisSection;
use super::sink::{SectionState, SignalSink};
use crate::shared::analysis::catalog;
use crate::shared::analysis::chart::ChartRenderer;
use crate::shared::analysis::fetch::FetchOrchestrator;
use crate::shared::analysis::flow::{AnalysisFlow, WidgetHost};
use crate::shared::analysis::layout::LayoutEngine;
use crate::shared::browser::chartjs::ChartJsBackend;
use crate::shared::browser::gridstack::{GridStackBackend, TypeChangeCallback};
use crate::shared::browser::storage::LocalStorageStore;
use crate::shared::browser::transport::GlooTransport;
use crate::shared::config::{load_config, DashboardConfig};
use contracts::dashboards::d500_client_analytics::{AnalysisId, DrillDown, Filters, StatusOptions};
use gloo_timers::future::TimeoutFuture;
use leptos::html::Div;
use leptos::prelude::*;
use leptos::task::spawn_local;
use std::rc::Rc;

/// Delay before charts reflow after a drag or resize in the grid
const GRID_SETTLE_MS: u32 = 250;
const SAVED_BADGE_MS: u32 = 1500;

fn viewport_width() -> Option<u32> {
    web_sys::window()?
        .inner_width()
        .ok()?
        .as_f64()
        .map(|w| w.max(0.0) as u32)
}

/// Client analytics dashboard: analysis picker, filters, widget grid and drill-down modal
#[component]
pub fn ClientAnalyticsDashboard() -> impl IntoView {
    match load_config() {
        Ok(config) => view! { <DashboardView config=config /> }.into_any(),
        Err(e) => {
            log::error!("{}", e);
            view! {
                <div class="analysis-error" role="alert">{e.to_string()}</div>
            }
            .into_any()
        }
    }
}

#[component]
fn DashboardView(config: DashboardConfig) -> impl IntoView {
    let main_sink = SignalSink::new();
    let detail_sink = SignalSink::new();

    let orchestrator = Rc::new(FetchOrchestrator::new(
        config.api.base_url.clone(),
        Rc::new(GlooTransport),
    ));
    let detail_flow = StoredValue::new_local(Rc::new(AnalysisFlow::new(
        orchestrator.clone(),
        Rc::new(detail_sink),
        None,
        config.pagination.detail_rows_per_page,
    )));
    let orchestrator = StoredValue::new_local(orchestrator);
    // set once the grid host is in the DOM
    let main_flow = StoredValue::new_local(None::<Rc<AnalysisFlow>>);

    let analysis = RwSignal::new(None::<AnalysisId>);
    let status_options = RwSignal::new(StatusOptions::default());
    let detail_open = RwSignal::new(false);
    let detail_title = RwSignal::new(String::new());
    let detail_tabs = RwSignal::new(Vec::<(&'static str, DrillDown)>::new());
    let detail_active = RwSignal::new(None::<AnalysisId>);
    let layout_saved = RwSignal::new(false);
    let grid_ref = NodeRef::<Div>::new();

    let layout_config = config.layout;
    let layout_settings = config.layout_settings();
    let rows_per_page = config.pagination.rows_per_page;

    let open_detail = move |drill: DrillDown| {
        let Some(flow) = detail_flow.try_get_value() else {
            return;
        };
        log::debug!("Drill-down into {} ({})", drill.target, drill.title);
        detail_title.set(drill.title.clone());
        detail_tabs.set(catalog::detail_tabs(&drill));
        detail_active.set(Some(drill.target));
        detail_open.set(true);
        spawn_local(async move {
            flow.select(drill.target, &drill.filters).await;
        });
    };

    let with_main = move |run: fn(Rc<AnalysisFlow>)| {
        if let Some(flow) = main_flow.try_get_value().flatten() {
            run(flow);
        }
    };

    // Mount the grid once its host exists
    Effect::new(move |_| {
        let Some(host) = grid_ref.get() else {
            return;
        };
        if main_flow.with_value(Option::is_some) {
            return;
        }

        let on_change: Rc<dyn Fn()> = Rc::new(move || {
            spawn_local(async move {
                TimeoutFuture::new(GRID_SETTLE_MS).await;
                with_main(|flow| flow.resize_charts());
            });
        });
        let on_type_change: TypeChangeCallback = Rc::new(move |widget_id: String, chart_type| {
            if let Some(flow) = main_flow.try_get_value().flatten() {
                flow.change_chart_type(&widget_id, chart_type);
            }
        });

        let grid = match GridStackBackend::mount(&host, &layout_config, on_change, on_type_change) {
            Ok(grid) => grid,
            Err(e) => {
                log::error!("Grid mount failed: {}", e);
                main_sink.section.set(SectionState::Error(e.to_string()));
                return;
            }
        };
        let widgets = WidgetHost {
            layout: LayoutEngine::new(Rc::new(grid), Rc::new(LocalStorageStore), layout_settings),
            charts: ChartRenderer::new(Rc::new(ChartJsBackend::default())),
        };
        let flow = Rc::new(AnalysisFlow::new(
            orchestrator.get_value(),
            Rc::new(main_sink),
            Some(widgets),
            rows_per_page,
        ));
        flow.set_drill_handler(Rc::new(open_detail));
        if let Some(width) = viewport_width() {
            flow.handle_viewport(width);
        }
        main_flow.set_value(Some(flow.clone()));

        // a pick made before the grid existed was only recorded
        if let Some(picked) = analysis.get_untracked() {
            spawn_local(async move {
                flow.select(picked, &Filters::new()).await;
            });
        }
    });

    let _resize = window_event_listener(leptos::ev::resize, move |_| {
        let Some(width) = viewport_width() else {
            return;
        };
        if let Some(flow) = main_flow.try_get_value().flatten() {
            flow.handle_viewport(width);
        }
    });

    // Status choices for the contract filters
    Effect::new(move |_| {
        let orchestrator = orchestrator.get_value();
        spawn_local(async move {
            match orchestrator.status_options().await {
                Ok(options) => status_options.set(options),
                Err(e) => log::warn!("Status options unavailable: {}", e),
            }
        });
    });

    let on_pick = move |ev| {
        let key = event_target_value(&ev);
        let Some(picked) = AnalysisId::from_key(&key) else {
            return;
        };
        analysis.set(Some(picked));
        // before mount the pick waits for the grid effect
        if let Some(flow) = main_flow.get_value() {
            spawn_local(async move {
                flow.select(picked, &Filters::new()).await;
            });
        }
    };

    let on_apply = Callback::new(move |filters: Filters| {
        let (Some(current), Some(flow)) = (analysis.get_untracked(), main_flow.get_value()) else {
            return;
        };
        spawn_local(async move {
            flow.on_filter_changed(current, &filters, true).await;
        });
    });

    let on_clear = Callback::new(move |_: ()| {
        with_main(|flow| spawn_local(async move { flow.clear_filters().await }));
    });

    let on_save_layout = Callback::new(move |_: ()| {
        let Some(flow) = main_flow.get_value() else {
            return;
        };
        if flow.save_layout() {
            layout_saved.set(true);
            spawn_local(async move {
                TimeoutFuture::new(SAVED_BADGE_MS).await;
                layout_saved.set(false);
            });
        } else {
            log::warn!("Layout not saved");
        }
    });

    let on_page = Callback::new(move |page: i64| {
        if let Some(flow) = main_flow.get_value() {
            spawn_local(async move { flow.go_to_page(page).await });
        }
    });

    let on_sort = Callback::new(move |_: ()| {
        with_main(|flow| spawn_local(async move { flow.toggle_sort().await }));
    });

    let on_drill = Callback::new(open_detail);

    let on_detail_page = Callback::new(move |page: i64| {
        let flow = detail_flow.get_value();
        spawn_local(async move { flow.go_to_page(page).await });
    });

    let on_detail_close = Callback::new(move |_: ()| {
        detail_open.set(false);
        detail_tabs.set(Vec::new());
        detail_active.set(None);
        detail_flow.get_value().reset();
    });

    view! {
        <div class="client-analytics">
            <header class="client-analytics__header">
                <h1>"Análise de clientes"</h1>
                <label class="analysis-picker">
                    <span>"Análise"</span>
                    <select on:change=on_pick>
                        <option value="" selected=move || analysis.get().is_none()>
                            "Selecione uma análise"
                        </option>
                        {AnalysisId::MAIN
                            .iter()
                            .map(|id| {
                                let id = *id;
                                view! {
                                    <option
                                        value=id.key()
                                        selected=move || analysis.get() == Some(id)
                                    >
                                        {id.title()}
                                    </option>
                                }
                            })
                            .collect_view()}
                    </select>
                </label>
            </header>

            <Show when=move || analysis.get().is_some()>
                <FilterBar
                    analysis=analysis
                    cities=main_sink.cities
                    status_options=status_options
                    on_apply=on_apply
                    on_clear=on_clear
                    on_save_layout=on_save_layout
                    layout_saved=layout_saved
                />
            </Show>

            <AnalysisSection
                state=main_sink.section
                on_page=on_page
                on_sort=on_sort
                on_drill=on_drill
            />

            <div class="grid-stack" node_ref=grid_ref></div>

            <DetailModal
                open=detail_open
                title=detail_title
                state=detail_sink.section
                tabs=detail_tabs
                active=detail_active
                on_close=on_detail_close
                on_page=on_detail_page
                on_drill=on_drill
            />
        </div>
    }
}
