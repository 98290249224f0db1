//! GridStack reached through the `GridStack` global.

use crate::shared::analysis::chart::ChartType;
use crate::shared::analysis::error::RenderError;
use crate::shared::analysis::layout::{GridBackend, GridMode, WidgetContent, WidgetSpec};
use crate::shared::analysis::presentation::TableModel;
use crate::shared::config::LayoutConfig;
use contracts::dashboards::d500_client_analytics::LayoutEntry;
use serde::Serialize;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_name = GridStack)]
    type JsGrid;

    #[wasm_bindgen(static_method_of = JsGrid, js_class = "GridStack", js_name = init, catch)]
    fn init(options: &JsValue, element: &web_sys::HtmlElement) -> Result<JsGrid, JsValue>;

    #[wasm_bindgen(method, js_name = addWidget, catch)]
    fn add_widget(this: &JsGrid, options: &JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(method, js_name = removeWidget)]
    fn remove_widget(this: &JsGrid, element: &JsValue);

    #[wasm_bindgen(method, js_name = removeAll)]
    fn remove_all(this: &JsGrid);

    #[wasm_bindgen(method)]
    fn save(this: &JsGrid, save_content: bool) -> JsValue;

    #[wasm_bindgen(method)]
    fn column(this: &JsGrid, columns: u32);

    #[wasm_bindgen(method, js_name = setStatic)]
    fn set_static(this: &JsGrid, static_grid: bool);

    #[wasm_bindgen(method)]
    fn on(this: &JsGrid, event: &str, callback: &js_sys::Function);
}

/// DOM id of the canvas inside a chart widget
pub fn canvas_id(widget_id: &str) -> String {
    format!("{}-canvas", widget_id)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GridOptions {
    cell_height: u32,
    margin: u32,
    column: u32,
    min_row: u32,
    float: bool,
}

#[derive(Serialize)]
struct WidgetOptions<'a> {
    id: &'a str,
    x: u32,
    y: u32,
    w: u32,
    h: u32,
    content: String,
}

pub type TypeChangeCallback = Rc<dyn Fn(String, ChartType)>;

pub struct GridStackBackend {
    grid: JsGrid,
    _on_change: Closure<dyn Fn()>,
    _on_select: Closure<dyn Fn(web_sys::Event)>,
}

impl GridStackBackend {
    /// Initialises GridStack on `host`.
    ///
    /// `on_change` fires after the user moved or resized a widget; `on_type_change` when a
    /// chart type selector inside a widget changes.
    pub fn mount(
        host: &web_sys::HtmlElement,
        layout: &LayoutConfig,
        on_change: Rc<dyn Fn()>,
        on_type_change: TypeChangeCallback,
    ) -> Result<Self, RenderError> {
        let options = serde_wasm_bindgen::to_value(&GridOptions {
            cell_height: layout.cell_height,
            margin: layout.margin,
            column: layout.columns,
            min_row: 1,
            float: true,
        })
        .map_err(|e| RenderError::Backend(e.to_string()))?;
        let grid = JsGrid::init(&options, host).map_err(|e| RenderError::Backend(format!("{:?}", e)))?;

        let change = Closure::wrap(Box::new(move || on_change()) as Box<dyn Fn()>);
        grid.on("change", change.as_ref().unchecked_ref());

        let select = Closure::wrap(Box::new(move |event: web_sys::Event| {
            let Some(select) = event
                .target()
                .and_then(|t| t.dyn_into::<web_sys::HtmlSelectElement>().ok())
            else {
                return;
            };
            let Some(widget_id) = select.get_attribute("data-widget") else {
                return;
            };
            if let Some(chart_type) = ChartType::from_key(&select.value()) {
                on_type_change(widget_id, chart_type);
            }
        }) as Box<dyn Fn(web_sys::Event)>);
        host.add_event_listener_with_callback("change", select.as_ref().unchecked_ref())
            .map_err(|e| RenderError::Backend(format!("{:?}", e)))?;

        Ok(Self {
            grid,
            _on_change: change,
            _on_select: select,
        })
    }
}

fn item_selector(widget_id: &str) -> String {
    format!(".grid-stack-item[gs-id=\"{}\"]", escape(widget_id))
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

fn chart_html(id: &str, title: &str, options: &[ChartType], selected: ChartType) -> String {
    let selector = if options.len() > 1 {
        let items: String = options
            .iter()
            .map(|t| {
                format!(
                    "<option value=\"{}\"{}>{}</option>",
                    t.key(),
                    if *t == selected { " selected" } else { "" },
                    t.label()
                )
            })
            .collect();
        format!(
            "<select class=\"chart-type-select\" data-widget=\"{}\">{}</select>",
            escape(id),
            items
        )
    } else {
        String::new()
    };
    format!(
        "<div class=\"chart-container-header\"><h3 class=\"chart-title\">{}</h3>{}</div>\
         <div class=\"chart-canvas-container\"><canvas id=\"{}\"></canvas></div>",
        escape(title),
        selector,
        escape(&canvas_id(id))
    )
}

fn table_html(table: &TableModel) -> String {
    let title = table
        .title
        .as_deref()
        .map(|t| format!("<h3 class=\"chart-title\">{}</h3>", escape(t)))
        .unwrap_or_default();
    let head: String = table
        .headers
        .iter()
        .map(|h| format!("<th>{}</th>", escape(h)))
        .collect();
    let body: String = table
        .rows
        .iter()
        .map(|row| {
            let cells: String = row
                .iter()
                .map(|c| format!("<td>{}</td>", escape(&c.text)))
                .collect();
            format!("<tr>{}</tr>", cells)
        })
        .collect();
    format!(
        "{}<div class=\"widget-table-wrapper\"><table class=\"data-table\"><thead><tr>{}</tr></thead><tbody>{}</tbody></table></div>",
        title, head, body
    )
}

fn widget_html(spec: &WidgetSpec) -> String {
    match &spec.content {
        WidgetContent::Chart {
            title,
            type_options,
            selected,
        } => chart_html(&spec.id, title, type_options, *selected),
        WidgetContent::Table(table) => table_html(table),
        WidgetContent::Message(text) => {
            format!("<p class=\"widget-message\">{}</p>", escape(text))
        }
    }
}

impl GridBackend for GridStackBackend {
    fn add_widget(&self, spec: &WidgetSpec) -> Result<(), RenderError> {
        let options = WidgetOptions {
            id: &spec.id,
            x: spec.rect.x,
            y: spec.rect.y,
            w: spec.rect.w,
            h: spec.rect.h,
            content: widget_html(spec),
        };
        let options = serde_wasm_bindgen::to_value(&options)
            .map_err(|e| RenderError::Backend(e.to_string()))?;
        self.grid
            .add_widget(&options)
            .map(|_| ())
            .map_err(|e| RenderError::Backend(format!("{:?}", e)))
    }

    fn remove_widget(&self, widget_id: &str) {
        self.grid
            .remove_widget(&JsValue::from_str(&item_selector(widget_id)));
    }

    fn remove_all(&self) {
        self.grid.remove_all();
    }

    fn current_rects(&self) -> Vec<LayoutEntry> {
        match serde_wasm_bindgen::from_value::<Vec<LayoutEntry>>(self.grid.save(false)) {
            Ok(entries) => entries,
            Err(e) => {
                log::warn!("GridStack layout not readable: {}", e);
                Vec::new()
            }
        }
    }

    fn configure(&self, mode: GridMode) {
        self.grid.column(mode.columns);
        self.grid.set_static(mode.static_grid);
    }
}
