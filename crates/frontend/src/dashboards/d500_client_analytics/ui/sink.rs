use crate::shared::analysis::presentation::{SectionView, ViewSink};
use contracts::dashboards::d500_client_analytics::AnalysisId;
use leptos::prelude::*;

/// What one analysis slot currently shows outside the grid
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SectionState {
    #[default]
    Idle,
    Loading(AnalysisId),
    Error(String),
    Notice(String),
    Content(SectionView),
}

/// [`ViewSink`] writing into Leptos signals
#[derive(Clone, Copy)]
pub struct SignalSink {
    pub section: RwSignal<SectionState>,
    pub cities: RwSignal<Vec<String>>,
}

impl SignalSink {
    pub fn new() -> Self {
        Self {
            section: RwSignal::new(SectionState::Idle),
            cities: RwSignal::new(Vec::new()),
        }
    }
}

impl ViewSink for SignalSink {
    fn loading(&self, analysis: AnalysisId) {
        self.section.set(SectionState::Loading(analysis));
    }

    fn show_error(&self, message: &str) {
        self.section.set(SectionState::Error(message.to_string()));
    }

    fn show_notice(&self, message: &str) {
        self.section.set(SectionState::Notice(message.to_string()));
    }

    fn show_content(&self, view: SectionView) {
        self.section.set(SectionState::Content(view));
    }

    fn clear(&self) {
        self.section.set(SectionState::Idle);
    }

    fn show_cities(&self, cities: &[String]) {
        self.cities.set(cities.to_vec());
    }
}
