use crate::shared::components::filter_panel::FilterPanel;
use crate::shared::icons::icon;
use contracts::dashboards::d500_client_analytics::{
    AnalysisId, FilterField, FilterValue, Filters, StatusOptions,
};
use leptos::prelude::*;
use std::collections::BTreeSet;
use thaw::{Button, ButtonAppearance};

const RELEVANCE_BUCKETS: [(&str, &str); 5] = [
    ("0-6", "0 a 6 meses"),
    ("7-12", "7 a 12 meses"),
    ("13-24", "13 a 24 meses"),
    ("25-36", "25 a 36 meses"),
    ("37+", "Mais de 36 meses"),
];

const MONTHS: [(&str, &str); 12] = [
    ("01", "Janeiro"),
    ("02", "Fevereiro"),
    ("03", "Março"),
    ("04", "Abril"),
    ("05", "Maio"),
    ("06", "Junho"),
    ("07", "Julho"),
    ("08", "Agosto"),
    ("09", "Setembro"),
    ("10", "Outubro"),
    ("11", "Novembro"),
    ("12", "Dezembro"),
];

/// Form values of the main filter bar
#[derive(Clone, Copy)]
struct FilterInputs {
    start_date: RwSignal<String>,
    end_date: RwSignal<String>,
    date: RwSignal<String>,
    year: RwSignal<String>,
    month: RwSignal<String>,
    city: RwSignal<String>,
    relevance: RwSignal<String>,
    contract_status: RwSignal<String>,
    access_status: RwSignal<BTreeSet<String>>,
    search_term: RwSignal<String>,
}

impl FilterInputs {
    fn new() -> Self {
        Self {
            start_date: RwSignal::new(String::new()),
            end_date: RwSignal::new(String::new()),
            date: RwSignal::new(String::new()),
            year: RwSignal::new(String::new()),
            month: RwSignal::new(String::new()),
            city: RwSignal::new(String::new()),
            relevance: RwSignal::new(String::new()),
            contract_status: RwSignal::new(String::new()),
            access_status: RwSignal::new(BTreeSet::new()),
            search_term: RwSignal::new(String::new()),
        }
    }

    fn reset(&self) {
        for field in [
            self.start_date,
            self.end_date,
            self.date,
            self.year,
            self.month,
            self.city,
            self.relevance,
            self.contract_status,
            self.search_term,
        ] {
            field.set(String::new());
        }
        self.access_status.set(BTreeSet::new());
    }

    /// Every field `analysis` accepts, blanks included so a merge clears them
    fn to_filters(&self, analysis: AnalysisId) -> Filters {
        let text_fields = [
            (FilterField::StartDate, self.start_date),
            (FilterField::EndDate, self.end_date),
            (FilterField::Date, self.date),
            (FilterField::Year, self.year),
            (FilterField::Month, self.month),
            (FilterField::City, self.city),
            (FilterField::Relevance, self.relevance),
            (FilterField::ContractStatus, self.contract_status),
            (FilterField::SearchTerm, self.search_term),
        ];
        let mut filters = text_fields
            .into_iter()
            .filter(|(field, _)| analysis.accepts(*field))
            .fold(Filters::new(), |acc, (field, value)| {
                acc.with_text(field, value.get_untracked().trim().to_string())
            });
        if analysis.accepts(FilterField::AccessStatus) {
            filters = filters.with(
                FilterField::AccessStatus,
                FilterValue::Set(self.access_status.get_untracked()),
            );
        }
        filters
    }

    fn active_count(&self, analysis: AnalysisId) -> usize {
        self.to_filters(analysis).active_count()
    }
}

#[component]
pub fn FilterBar(
    #[prop(into)] analysis: Signal<Option<AnalysisId>>,
    #[prop(into)] cities: Signal<Vec<String>>,
    #[prop(into)] status_options: Signal<StatusOptions>,
    on_apply: Callback<Filters>,
    on_clear: Callback<()>,
    on_save_layout: Callback<()>,
    #[prop(into)] layout_saved: Signal<bool>,
) -> impl IntoView {
    let inputs = FilterInputs::new();
    let is_expanded = RwSignal::new(true);
    let applied_count = RwSignal::new(0usize);

    // a new analysis starts from a blank form
    Effect::new(move |_| {
        analysis.track();
        inputs.reset();
        applied_count.set(0);
    });

    let accepts = move |field: FilterField| analysis.get().is_some_and(|a| a.accepts(field));

    let apply = move || {
        let Some(current) = analysis.get_untracked() else {
            return;
        };
        applied_count.set(inputs.active_count(current));
        on_apply.run(inputs.to_filters(current));
    };

    let clear = move || {
        inputs.reset();
        applied_count.set(0);
        on_clear.run(());
    };

    let actions = move || {
        view! {
            <Button appearance=ButtonAppearance::Primary on_click=move |_| apply()>
                {icon("refresh")}
                "Aplicar"
            </Button>
            <Button appearance=ButtonAppearance::Secondary on_click=move |_| clear()>
                "Limpar filtros"
            </Button>
            <Button appearance=ButtonAppearance::Subtle on_click=move |_| on_save_layout.run(())>
                {icon("save")}
                {move || if layout_saved.get() { "Salvo!" } else { "Salvar layout" }}
            </Button>
        }
    };

    let date_input = move |label: &'static str, value: RwSignal<String>| {
        view! {
            <label class="filter-field">
                <span>{label}</span>
                <input
                    type="date"
                    prop:value=move || value.get()
                    on:change=move |ev| value.set(event_target_value(&ev))
                />
            </label>
        }
    };

    view! {
        <FilterPanel
            is_expanded=is_expanded
            active_filters_count=Signal::derive(move || applied_count.get())
            actions=actions
        >
            <div class="filter-grid">
                <Show when=move || accepts(FilterField::SearchTerm)>
                    <label class="filter-field">
                        <span>"Buscar cliente"</span>
                        <input
                            type="text"
                            placeholder="Nome ou contrato"
                            prop:value=move || inputs.search_term.get()
                            on:input=move |ev| inputs.search_term.set(event_target_value(&ev))
                            on:keydown=move |ev: leptos::ev::KeyboardEvent| {
                                if ev.key() == "Enter" {
                                    apply();
                                }
                            }
                        />
                    </label>
                </Show>
                <Show when=move || accepts(FilterField::StartDate)>
                    {date_input("Data inicial", inputs.start_date)}
                </Show>
                <Show when=move || accepts(FilterField::EndDate)>
                    {date_input("Data final", inputs.end_date)}
                </Show>
                <Show when=move || accepts(FilterField::Date)>
                    {date_input("Dia de referência", inputs.date)}
                </Show>
                <Show when=move || accepts(FilterField::Year)>
                    <label class="filter-field">
                        <span>"Ano"</span>
                        <input
                            type="number"
                            min="2000"
                            max="2100"
                            placeholder="Todos"
                            prop:value=move || inputs.year.get()
                            on:input=move |ev| inputs.year.set(event_target_value(&ev))
                        />
                    </label>
                </Show>
                <Show when=move || accepts(FilterField::Month)>
                    <label class="filter-field">
                        <span>"Mês"</span>
                        <select
                            prop:value=move || inputs.month.get()
                            on:change=move |ev| inputs.month.set(event_target_value(&ev))
                        >
                            <option value="">"Todos"</option>
                            {MONTHS
                                .iter()
                                .map(|(value, label)| view! { <option value=*value>{*label}</option> })
                                .collect_view()}
                        </select>
                    </label>
                </Show>
                <Show when=move || accepts(FilterField::City)>
                    <label class="filter-field">
                        <span>"Cidade"</span>
                        <select
                            prop:value=move || inputs.city.get()
                            on:change=move |ev| inputs.city.set(event_target_value(&ev))
                        >
                            <option value="">"Todas"</option>
                            {move || {
                                cities
                                    .get()
                                    .into_iter()
                                    .map(|city| {
                                        let label = city.clone();
                                        view! { <option value=city>{label}</option> }
                                    })
                                    .collect_view()
                            }}
                        </select>
                    </label>
                </Show>
                <Show when=move || accepts(FilterField::Relevance)>
                    <label class="filter-field">
                        <span>"Permanência"</span>
                        <select
                            prop:value=move || inputs.relevance.get()
                            on:change=move |ev| inputs.relevance.set(event_target_value(&ev))
                        >
                            <option value="">"Todas"</option>
                            {RELEVANCE_BUCKETS
                                .iter()
                                .map(|(value, label)| view! { <option value=*value>{*label}</option> })
                                .collect_view()}
                        </select>
                    </label>
                </Show>
                <Show when=move || accepts(FilterField::ContractStatus)>
                    <label class="filter-field">
                        <span>"Status do contrato"</span>
                        <select
                            prop:value=move || inputs.contract_status.get()
                            on:change=move |ev| inputs.contract_status.set(event_target_value(&ev))
                        >
                            <option value="">"Todos"</option>
                            {move || {
                                status_options
                                    .get()
                                    .status_contrato
                                    .into_iter()
                                    .map(|status| {
                                        let label = status.clone();
                                        view! { <option value=status>{label}</option> }
                                    })
                                    .collect_view()
                            }}
                        </select>
                    </label>
                </Show>
                <Show when=move || accepts(FilterField::AccessStatus)>
                    <fieldset class="filter-field filter-field--checks">
                        <legend>"Status de acesso"</legend>
                        {move || {
                            status_options
                                .get()
                                .status_acesso
                                .into_iter()
                                .map(|status| {
                                    let key = status.clone();
                                    let checked_key = status.clone();
                                    view! {
                                        <label class="filter-check">
                                            <input
                                                type="checkbox"
                                                prop:checked=move || {
                                                    inputs.access_status.with(|s| s.contains(&checked_key))
                                                }
                                                on:change=move |ev| {
                                                    let on = event_target_checked(&ev);
                                                    let key = key.clone();
                                                    inputs.access_status.update(|set| {
                                                        if on {
                                                            set.insert(key);
                                                        } else {
                                                            set.remove(&key);
                                                        }
                                                    });
                                                }
                                            />
                                            <span>{status}</span>
                                        </label>
                                    }
                                })
                                .collect_view()
                        }}
                    </fieldset>
                </Show>
            </div>
        </FilterPanel>
    }
}
