use crate::dashboards::ClientAnalyticsDashboard;
use leptos::prelude::*;

#[component]
pub fn App() -> impl IntoView {
    view! {
        <main class="app">
            <ClientAnalyticsDashboard />
        </main>
    }
}
