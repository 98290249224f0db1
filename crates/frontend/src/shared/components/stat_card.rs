use crate::shared::analysis::presentation::{SummaryCard, Tone};
use leptos::prelude::*;

fn tone_class(tone: Tone) -> &'static str {
    match tone {
        Tone::Neutral => "stat-card",
        Tone::Danger => "stat-card stat-card--error",
        Tone::Warning => "stat-card stat-card--warning",
        Tone::Info => "stat-card stat-card--info",
        Tone::Accent => "stat-card stat-card--accent",
        Tone::Success => "stat-card stat-card--success",
    }
}

#[component]
pub fn StatCard(card: SummaryCard) -> impl IntoView {
    view! {
        <div class=tone_class(card.tone)>
            <div class="stat-card__content">
                <div class="stat-card__label">{card.title}</div>
                <div class="stat-card__value">{card.value}</div>
            </div>
        </div>
    }
}

/// Row of summary cards; nothing when `cards` is empty
#[component]
pub fn StatCardRow(cards: Vec<SummaryCard>) -> impl IntoView {
    (!cards.is_empty()).then(|| {
        view! {
            <div class="stat-card-row">
                {cards.into_iter().map(|card| view! { <StatCard card=card /> }).collect_view()}
            </div>
        }
    })
}
