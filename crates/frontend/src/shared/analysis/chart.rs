use super::error::RenderError;
use super::view_state::ViewState;
use crate::shared::number_format::{format_money_whole, format_number_int, format_share};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartType {
    BarVertical,
    BarHorizontal,
    Line,
    Doughnut,
    Pie,
}

impl ChartType {
    pub fn is_radial(&self) -> bool {
        matches!(self, ChartType::Doughnut | ChartType::Pie)
    }

    pub fn key(&self) -> &'static str {
        match self {
            ChartType::BarVertical => "bar_vertical",
            ChartType::BarHorizontal => "bar_horizontal",
            ChartType::Line => "line",
            ChartType::Doughnut => "doughnut",
            ChartType::Pie => "pie",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        [
            ChartType::BarVertical,
            ChartType::BarHorizontal,
            ChartType::Line,
            ChartType::Doughnut,
            ChartType::Pie,
        ]
        .into_iter()
        .find(|t| t.key() == key)
    }

    /// Caption of the chart type selector
    pub fn label(&self) -> &'static str {
        match self {
            ChartType::BarVertical => "Barra V",
            ChartType::BarHorizontal => "Barra H",
            ChartType::Line => "Linha",
            ChartType::Doughnut => "Rosca",
            ChartType::Pie => "Pizza",
        }
    }

    fn chartjs_type(&self) -> &'static str {
        match self {
            ChartType::BarVertical | ChartType::BarHorizontal => "bar",
            ChartType::Line => "line",
            ChartType::Doughnut => "doughnut",
            ChartType::Pie => "pie",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormatMode {
    Currency,
    #[default]
    Number,
    /// Value already is a percentage
    Percent,
    Days,
    Raw,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub label: String,
    pub values: Vec<f64>,
    /// `None` picks from the palette
    pub color: Option<String>,
}

impl Dataset {
    pub fn new(label: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            label: label.into(),
            values,
            color: None,
        }
    }

    pub fn with_color(mut self, color: &str) -> Self {
        self.color = Some(color.to_string());
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartOptions {
    pub format: FormatMode,
    /// `None` = per-type default (hidden on line charts)
    pub value_labels: Option<bool>,
    pub legend: bool,
    pub stacked: bool,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            format: FormatMode::Number,
            value_labels: None,
            legend: true,
            stacked: false,
        }
    }
}

/// Everything needed to (re)draw one chart
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    pub chart_type: ChartType,
    pub title: String,
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
    pub options: ChartOptions,
}

impl ChartSpec {
    pub fn new(chart_type: ChartType, title: impl Into<String>, labels: Vec<String>) -> Self {
        Self {
            chart_type,
            title: title.into(),
            labels,
            datasets: Vec::new(),
            options: ChartOptions::default(),
        }
    }

    pub fn dataset(mut self, dataset: Dataset) -> Self {
        self.datasets.push(dataset);
        self
    }

    pub fn format(mut self, format: FormatMode) -> Self {
        self.options.format = format;
        self
    }

    pub fn stacked(mut self) -> Self {
        self.options.stacked = true;
        self
    }

    pub fn without_legend(mut self) -> Self {
        self.options.legend = false;
        self
    }

    pub fn with_value_labels(mut self, show: bool) -> Self {
        self.options.value_labels = Some(show);
        self
    }

    pub fn shows_value_labels(&self) -> bool {
        self.options
            .value_labels
            .unwrap_or(self.chart_type != ChartType::Line)
    }
}

/// Opaque id of a live chart inside a [`ChartBackend`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ChartHandle(pub u64);

/// Resolved hit-test of a click
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartClick {
    pub label: String,
    pub dataset_label: String,
    pub index: usize,
}

pub type ClickCallback = Rc<dyn Fn(ChartClick)>;

/// Raw hit-test callback: `(dataset_index, element_index)`
pub type HitCallback = Rc<dyn Fn(usize, usize)>;

const PALETTE: [&str; 12] = [
    "#4299e1", "#667eea", "#805ad5", "#d53f8c", "#dd6b20", "#ed8936", "#ecc94b", "#48bb78",
    "#38b2ac", "#4fd1c5", "#a0aec0", "#4a5568",
];

fn palette(index: usize) -> &'static str {
    PALETTE[index % PALETTE.len()]
}

/// Label rendered on one data point
pub fn format_value_label(value: f64, format: FormatMode, chart_type: ChartType, total: f64) -> String {
    match format {
        FormatMode::Number if chart_type.is_radial() => {
            format!("{}\n({})", format_number_int(value), format_share(value, total))
        }
        FormatMode::Number => format_number_int(value),
        FormatMode::Currency => format_money_whole(value),
        FormatMode::Percent => format!("{:.1}%", value),
        FormatMode::Days => format!("{:.1} dias", value),
        FormatMode::Raw => value.to_string(),
    }
}

/// Share of each value in the sum of the first dataset
pub fn percentage_labels(spec: &ChartSpec) -> Vec<String> {
    let Some(first) = spec.datasets.first() else {
        return Vec::new();
    };
    let total: f64 = first.values.iter().sum();
    first.values.iter().map(|v| format_share(*v, total)).collect()
}

/// Value labels per dataset per point
pub fn value_labels(spec: &ChartSpec) -> Vec<Vec<String>> {
    let total: f64 = spec
        .datasets
        .first()
        .map(|d| d.values.iter().sum())
        .unwrap_or(0.0);
    spec.datasets
        .iter()
        .map(|d| {
            d.values
                .iter()
                .map(|v| format_value_label(*v, spec.options.format, spec.chart_type, total))
                .collect()
        })
        .collect()
}

// Chart.js configuration

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Paint {
    One(String),
    Many(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartJsDataset {
    pub label: String,
    pub data: Vec<f64>,
    pub background_color: Paint,
    pub border_color: Paint,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tension: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartJsData {
    pub labels: Vec<String>,
    pub datasets: Vec<ChartJsDataset>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Axis {
    pub begin_at_zero: bool,
    pub stacked: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scales {
    pub x: Axis,
    pub y: Axis,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Toggle {
    pub display: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Legend {
    pub display: bool,
    pub position: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Plugins {
    pub title: Toggle,
    pub legend: Legend,
    pub datalabels: Toggle,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartJsOptions {
    pub responsive: bool,
    pub maintain_aspect_ratio: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index_axis: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scales: Option<Scales>,
    pub plugins: Plugins,
}

/// Serializable Chart.js config plus the pre-formatted value labels the adapter wires into
/// the datalabels formatter
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartConfig {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub data: ChartJsData,
    pub options: ChartJsOptions,
    #[serde(skip)]
    pub value_labels: Vec<Vec<String>>,
}

impl ChartConfig {
    pub fn from_spec(spec: &ChartSpec) -> Self {
        let chart_type = spec.chart_type;
        let datasets = spec
            .datasets
            .iter()
            .enumerate()
            .map(|(i, d)| dataset_config(chart_type, d, i, spec.labels.len()))
            .collect();

        let stacked = spec.options.stacked;
        let (index_axis, scales) = match chart_type {
            ChartType::Doughnut | ChartType::Pie => (None, None),
            ChartType::BarVertical => (
                Some("x"),
                Some(Scales {
                    x: Axis { begin_at_zero: false, stacked },
                    y: Axis { begin_at_zero: true, stacked },
                }),
            ),
            ChartType::BarHorizontal => (
                Some("y"),
                Some(Scales {
                    x: Axis { begin_at_zero: true, stacked },
                    y: Axis { begin_at_zero: false, stacked },
                }),
            ),
            ChartType::Line => (
                None,
                Some(Scales {
                    x: Axis { begin_at_zero: false, stacked: false },
                    y: Axis { begin_at_zero: false, stacked: false },
                }),
            ),
        };

        Self {
            kind: chart_type.chartjs_type(),
            data: ChartJsData {
                labels: spec.labels.clone(),
                datasets,
            },
            options: ChartJsOptions {
                responsive: true,
                maintain_aspect_ratio: false,
                index_axis,
                scales,
                plugins: Plugins {
                    title: Toggle { display: false },
                    legend: Legend {
                        display: spec.options.legend,
                        position: "top",
                    },
                    datalabels: Toggle {
                        display: spec.shows_value_labels(),
                    },
                },
            },
            value_labels: value_labels(spec),
        }
    }
}

fn dataset_config(chart_type: ChartType, d: &Dataset, index: usize, points: usize) -> ChartJsDataset {
    match chart_type {
        ChartType::Doughnut | ChartType::Pie => {
            let colors: Vec<String> = match &d.color {
                Some(c) => vec![c.clone(); points],
                None => (0..points).map(|i| format!("{}E6", palette(i))).collect(),
            };
            ChartJsDataset {
                label: d.label.clone(),
                data: d.values.clone(),
                background_color: Paint::Many(colors),
                border_color: Paint::One("#ffffff".to_string()),
                fill: None,
                tension: None,
            }
        }
        ChartType::BarVertical | ChartType::BarHorizontal => {
            let color = d.color.clone().unwrap_or_else(|| format!("{}B3", palette(index)));
            ChartJsDataset {
                label: d.label.clone(),
                data: d.values.clone(),
                background_color: Paint::One(color.clone()),
                border_color: Paint::One(color),
                fill: None,
                tension: None,
            }
        }
        ChartType::Line => {
            let color = d.color.clone().unwrap_or_else(|| palette(index).to_string());
            ChartJsDataset {
                label: d.label.clone(),
                data: d.values.clone(),
                background_color: Paint::One(format!("{}33", color)),
                border_color: Paint::One(color),
                fill: Some(true),
                tension: Some(0.1),
            }
        }
    }
}

/// Charting library capability
pub trait ChartBackend {
    /// Is a container with this widget id mounted?
    fn has_target(&self, widget_id: &str) -> bool;
    fn create(
        &self,
        widget_id: &str,
        config: &ChartConfig,
        on_hit: Option<HitCallback>,
    ) -> Result<ChartHandle, RenderError>;
    fn destroy(&self, handle: ChartHandle);
    fn resize(&self, handle: ChartHandle);
}

struct RenderedChart {
    spec: ChartSpec,
    on_click: Option<ClickCallback>,
}

/// Creates and replaces charts bound to widget ids, keeping the handle map in [`ViewState`]
pub struct ChartRenderer {
    backend: Rc<dyn ChartBackend>,
    rendered: BTreeMap<String, RenderedChart>,
}

impl ChartRenderer {
    pub fn new(backend: Rc<dyn ChartBackend>) -> Self {
        Self {
            backend,
            rendered: BTreeMap::new(),
        }
    }

    /// Destroys whatever lives at `widget_id`, then draws `spec` there.
    ///
    /// A missing container is logged and ignored.
    pub fn render(
        &mut self,
        state: &mut ViewState,
        widget_id: &str,
        spec: ChartSpec,
        on_click: Option<ClickCallback>,
    ) -> Option<ChartHandle> {
        self.destroy(state, widget_id);

        if !self.backend.has_target(widget_id) {
            log::error!("{}", RenderError::TargetMissing(widget_id.to_string()));
            return None;
        }

        let config = ChartConfig::from_spec(&spec);
        let on_hit = on_click.clone().map(|callback| hit_resolver(&spec, callback));

        match self.backend.create(widget_id, &config, on_hit) {
            Ok(handle) => {
                state.record_chart(widget_id, handle);
                self.rendered
                    .insert(widget_id.to_string(), RenderedChart { spec, on_click });
                Some(handle)
            }
            Err(e) => {
                log::error!("Chart '{}' not created: {}", widget_id, e);
                None
            }
        }
    }

    /// Redraws a live chart with another type, same data and click handler
    pub fn change_type(
        &mut self,
        state: &mut ViewState,
        widget_id: &str,
        chart_type: ChartType,
    ) -> Option<ChartHandle> {
        let previous = self.rendered.get(widget_id)?;
        let mut spec = previous.spec.clone();
        let on_click = previous.on_click.clone();
        spec.chart_type = chart_type;
        self.render(state, widget_id, spec, on_click)
    }

    pub fn spec(&self, widget_id: &str) -> Option<&ChartSpec> {
        self.rendered.get(widget_id).map(|r| &r.spec)
    }

    pub fn destroy(&mut self, state: &mut ViewState, widget_id: &str) {
        self.rendered.remove(widget_id);
        if let Some(handle) = state.drop_chart(widget_id) {
            self.backend.destroy(handle);
        }
    }

    pub fn destroy_all(&mut self, state: &mut ViewState) {
        self.rendered.clear();
        for (_, handle) in state.drop_all_charts() {
            self.backend.destroy(handle);
        }
    }

    pub fn resize_all(&self, state: &ViewState) {
        for handle in state.chart_handles() {
            self.backend.resize(handle);
        }
    }
}

fn hit_resolver(spec: &ChartSpec, callback: ClickCallback) -> HitCallback {
    let labels = spec.labels.clone();
    let dataset_labels: Vec<String> = spec.datasets.iter().map(|d| d.label.clone()).collect();
    Rc::new(move |dataset_index, index| {
        let Some(label) = labels.get(index) else {
            return;
        };
        callback(ChartClick {
            label: label.clone(),
            dataset_label: dataset_labels.get(dataset_index).cloned().unwrap_or_default(),
            index,
        });
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};

    /// In-memory chart library
    #[derive(Default)]
    pub(crate) struct FakeCharts {
        next: Cell<u64>,
        pub missing_targets: RefCell<Vec<String>>,
        pub live: RefCell<BTreeMap<u64, (String, ChartConfig)>>,
        pub hits: RefCell<BTreeMap<u64, HitCallback>>,
        pub destroyed: RefCell<Vec<u64>>,
        pub resized: RefCell<Vec<u64>>,
    }

    impl FakeCharts {
        pub fn live_for(&self, widget_id: &str) -> Vec<u64> {
            self.live
                .borrow()
                .iter()
                .filter(|(_, (id, _))| id == widget_id)
                .map(|(h, _)| *h)
                .collect()
        }

        pub fn click(&self, handle: ChartHandle, dataset_index: usize, index: usize) {
            let hit = self.hits.borrow().get(&handle.0).cloned();
            if let Some(hit) = hit {
                hit(dataset_index, index);
            }
        }
    }

    impl ChartBackend for FakeCharts {
        fn has_target(&self, widget_id: &str) -> bool {
            !self.missing_targets.borrow().iter().any(|m| m == widget_id)
        }

        fn create(
            &self,
            widget_id: &str,
            config: &ChartConfig,
            on_hit: Option<HitCallback>,
        ) -> Result<ChartHandle, RenderError> {
            let id = self.next.get() + 1;
            self.next.set(id);
            self.live
                .borrow_mut()
                .insert(id, (widget_id.to_string(), config.clone()));
            if let Some(hit) = on_hit {
                self.hits.borrow_mut().insert(id, hit);
            }
            Ok(ChartHandle(id))
        }

        fn destroy(&self, handle: ChartHandle) {
            self.live.borrow_mut().remove(&handle.0);
            self.hits.borrow_mut().remove(&handle.0);
            self.destroyed.borrow_mut().push(handle.0);
        }

        fn resize(&self, handle: ChartHandle) {
            self.resized.borrow_mut().push(handle.0);
        }
    }

    fn doughnut() -> ChartSpec {
        ChartSpec::new(
            ChartType::Doughnut,
            "Contratos por Status",
            vec!["A".into(), "B".into(), "C".into(), "D".into()],
        )
        .dataset(Dataset::new("Contagem", vec![10.0, 20.0, 30.0, 0.0]))
    }

    #[test]
    fn test_percentage_labels_are_stable() {
        let spec = doughnut();
        let first = percentage_labels(&spec);
        assert_eq!(first, vec!["16.7%", "33.3%", "50.0%", "0%"]);
        assert_eq!(percentage_labels(&spec), first);

        let labels = value_labels(&spec);
        assert_eq!(labels[0][0], "10\n(16.7%)");
        assert_eq!(labels[0][3], "0\n(0%)");
    }

    #[test]
    fn test_value_label_modes() {
        assert_eq!(
            format_value_label(1234.4, FormatMode::Currency, ChartType::BarVertical, 0.0),
            "R$ 1.234"
        );
        assert_eq!(
            format_value_label(12.46, FormatMode::Days, ChartType::BarHorizontal, 0.0),
            "12.5 dias"
        );
        assert_eq!(
            format_value_label(4321.0, FormatMode::Number, ChartType::BarVertical, 0.0),
            "4.321"
        );
        assert_eq!(
            format_value_label(3.5, FormatMode::Raw, ChartType::Line, 0.0),
            "3.5"
        );
    }

    #[test]
    fn test_axis_dispatch() {
        let labels = vec!["x".to_string()];
        let vertical = ChartConfig::from_spec(
            &ChartSpec::new(ChartType::BarVertical, "t", labels.clone())
                .dataset(Dataset::new("a", vec![1.0])),
        );
        assert_eq!(vertical.kind, "bar");
        assert_eq!(vertical.options.index_axis, Some("x"));
        assert!(vertical.options.scales.as_ref().unwrap().y.begin_at_zero);

        let horizontal = ChartConfig::from_spec(&ChartSpec::new(
            ChartType::BarHorizontal,
            "t",
            labels.clone(),
        ));
        assert_eq!(horizontal.options.index_axis, Some("y"));
        assert!(horizontal.options.scales.as_ref().unwrap().x.begin_at_zero);

        let radial = ChartConfig::from_spec(&doughnut());
        assert!(radial.options.scales.is_none());

        let line = ChartConfig::from_spec(&ChartSpec::new(ChartType::Line, "t", labels.clone()));
        assert!(!line.options.plugins.datalabels.display);
        let line_labeled = ChartConfig::from_spec(
            &ChartSpec::new(ChartType::Line, "t", labels).with_value_labels(true),
        );
        assert!(line_labeled.options.plugins.datalabels.display);
    }

    #[test]
    fn test_render_replaces_previous_chart() {
        let backend = Rc::new(FakeCharts::default());
        let mut renderer = ChartRenderer::new(backend.clone());
        let mut state = ViewState::new();

        let first = renderer.render(&mut state, "mainChart1", doughnut(), None);
        let second = renderer.render(&mut state, "mainChart1", doughnut(), None);

        assert_ne!(first, second);
        assert_eq!(backend.live_for("mainChart1").len(), 1);
        assert_eq!(state.chart("mainChart1"), second);
        assert_eq!(*backend.destroyed.borrow(), vec![first.unwrap().0]);
    }

    #[test]
    fn test_missing_target_fails_soft() {
        let backend = Rc::new(FakeCharts::default());
        backend.missing_targets.borrow_mut().push("gone".to_string());
        let mut renderer = ChartRenderer::new(backend.clone());
        let mut state = ViewState::new();

        assert_eq!(renderer.render(&mut state, "gone", doughnut(), None), None);
        assert_eq!(state.chart_count(), 0);
    }

    #[test]
    fn test_click_resolves_labels_and_survives_type_change() {
        let backend = Rc::new(FakeCharts::default());
        let mut renderer = ChartRenderer::new(backend.clone());
        let mut state = ViewState::new();
        let clicks = Rc::new(RefCell::new(Vec::new()));
        let sink = clicks.clone();
        let on_click: ClickCallback = Rc::new(move |c| sink.borrow_mut().push(c));

        let spec = ChartSpec::new(ChartType::BarVertical, "t", vec!["X".into(), "Y".into()])
            .dataset(Dataset::new("Cancelados", vec![5.0, 1.0]))
            .dataset(Dataset::new("Negativados", vec![2.0, 0.0]));
        renderer.render(&mut state, "w", spec, Some(on_click));
        let handle = renderer.change_type(&mut state, "w", ChartType::BarHorizontal).unwrap();

        backend.click(handle, 1, 0);

        assert_eq!(
            *clicks.borrow(),
            vec![ChartClick {
                label: "X".into(),
                dataset_label: "Negativados".into(),
                index: 0
            }]
        );
        assert_eq!(
            renderer.spec("w").map(|s| s.chart_type),
            Some(ChartType::BarHorizontal)
        );
        assert_eq!(backend.live_for("w").len(), 1);
    }
}
