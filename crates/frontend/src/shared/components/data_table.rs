use crate::shared::analysis::presentation::TableModel;
use contracts::dashboards::d500_client_analytics::DrillDown;
use leptos::prelude::*;

/// Read-only table; cells carrying a drill-down are rendered as links
#[component]
pub fn DataTable(table: TableModel, on_drill: Callback<DrillDown>) -> impl IntoView {
    let TableModel {
        title,
        headers,
        rows,
    } = table;

    view! {
        <div class="data-table-section">
            {title.map(|t| view! { <h3 class="data-table__title">{t}</h3> })}
            <div class="table-wrapper">
                <table class="data-table">
                    <thead>
                        <tr>
                            {headers.into_iter().map(|h| view! { <th>{h}</th> }).collect_view()}
                        </tr>
                    </thead>
                    <tbody>
                        {rows
                            .into_iter()
                            .map(|row| {
                                view! {
                                    <tr>
                                        {row
                                            .into_iter()
                                            .map(|cell| match cell.drill {
                                                Some(drill) => {
                                                    view! {
                                                        <td>
                                                            <a
                                                                href="#"
                                                                class="drill-link"
                                                                on:click=move |ev| {
                                                                    ev.prevent_default();
                                                                    on_drill.run(drill.clone());
                                                                }
                                                            >
                                                                {cell.text}
                                                            </a>
                                                        </td>
                                                    }
                                                        .into_any()
                                                }
                                                None => view! { <td>{cell.text}</td> }.into_any(),
                                            })
                                            .collect_view()}
                                    </tr>
                                }
                            })
                            .collect_view()}
                    </tbody>
                </table>
            </div>
        </div>
    }
}
