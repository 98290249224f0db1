//! Chart.js (with chartjs-plugin-datalabels) reached through the `Chart` global.

use super::gridstack::canvas_id;
use crate::shared::analysis::chart::{ChartBackend, ChartConfig, ChartHandle, HitCallback};
use crate::shared::analysis::error::RenderError;
use js_sys::{Array, Reflect};
use serde::Serialize;
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_name = Chart)]
    type JsChart;

    #[wasm_bindgen(constructor, js_class = "Chart", catch)]
    fn new(canvas: &web_sys::HtmlCanvasElement, config: &JsValue) -> Result<JsChart, JsValue>;

    #[wasm_bindgen(method)]
    fn destroy(this: &JsChart);

    #[wasm_bindgen(method)]
    fn resize(this: &JsChart);
}

type Formatter = Closure<dyn Fn(JsValue, JsValue) -> JsValue>;
type ClickHandler = Closure<dyn Fn(JsValue, Array)>;

struct LiveChart {
    chart: JsChart,
    // dropped only after `destroy`
    _formatter: Option<Formatter>,
    _on_click: Option<ClickHandler>,
}

#[derive(Default)]
pub struct ChartJsBackend {
    next: Cell<u64>,
    live: RefCell<BTreeMap<u64, LiveChart>>,
}

fn js_err(e: JsValue) -> RenderError {
    RenderError::Backend(format!("{:?}", e))
}

fn prop(target: &JsValue, key: &str) -> Result<JsValue, RenderError> {
    Reflect::get(target, &JsValue::from_str(key)).map_err(js_err)
}

fn set_prop(target: &JsValue, key: &str, value: &JsValue) -> Result<(), RenderError> {
    Reflect::set(target, &JsValue::from_str(key), value)
        .map(|_| ())
        .map_err(js_err)
}

fn index_of(value: &JsValue, key: &str) -> Option<usize> {
    Reflect::get(value, &JsValue::from_str(key))
        .ok()
        .and_then(|v| v.as_f64())
        .map(|v| v as usize)
}

fn find_canvas(widget_id: &str) -> Option<web_sys::HtmlCanvasElement> {
    web_sys::window()?
        .document()?
        .get_element_by_id(&canvas_id(widget_id))?
        .dyn_into::<web_sys::HtmlCanvasElement>()
        .ok()
}

/// Datalabels formatter showing the precomputed label of positive values only
fn formatter(labels: Vec<Vec<String>>) -> Formatter {
    Closure::wrap(Box::new(move |value: JsValue, ctx: JsValue| -> JsValue {
        if value.as_f64().unwrap_or(0.0) <= 0.0 {
            return JsValue::from_str("");
        }
        let text = index_of(&ctx, "datasetIndex")
            .zip(index_of(&ctx, "dataIndex"))
            .and_then(|(d, i)| labels.get(d).and_then(|row| row.get(i)))
            .cloned()
            .unwrap_or_default();
        JsValue::from_str(&text)
    }) as Box<dyn Fn(JsValue, JsValue) -> JsValue>)
}

fn click_handler(on_hit: HitCallback) -> ClickHandler {
    Closure::wrap(Box::new(move |_event: JsValue, elements: Array| {
        let first = elements.get(0);
        if first.is_undefined() {
            return;
        }
        if let (Some(dataset), Some(index)) =
            (index_of(&first, "datasetIndex"), index_of(&first, "index"))
        {
            on_hit(dataset, index);
        }
    }) as Box<dyn Fn(JsValue, Array)>)
}

impl ChartBackend for ChartJsBackend {
    fn has_target(&self, widget_id: &str) -> bool {
        find_canvas(widget_id).is_some()
    }

    fn create(
        &self,
        widget_id: &str,
        config: &ChartConfig,
        on_hit: Option<HitCallback>,
    ) -> Result<ChartHandle, RenderError> {
        let canvas =
            find_canvas(widget_id).ok_or_else(|| RenderError::TargetMissing(widget_id.to_string()))?;

        let serializer = serde_wasm_bindgen::Serializer::json_compatible();
        let js_config = config
            .serialize(&serializer)
            .map_err(|e| RenderError::Backend(e.to_string()))?;
        let options = prop(&js_config, "options")?;

        let formatter = if config.options.plugins.datalabels.display {
            let formatter = formatter(config.value_labels.clone());
            let datalabels = prop(&prop(&options, "plugins")?, "datalabels")?;
            set_prop(&datalabels, "formatter", formatter.as_ref())?;
            Some(formatter)
        } else {
            None
        };

        let on_click = match on_hit {
            Some(on_hit) => {
                let handler = click_handler(on_hit);
                set_prop(&options, "onClick", handler.as_ref())?;
                Some(handler)
            }
            None => None,
        };

        let chart = JsChart::new(&canvas, &js_config).map_err(js_err)?;

        let id = self.next.get() + 1;
        self.next.set(id);
        self.live.borrow_mut().insert(
            id,
            LiveChart {
                chart,
                _formatter: formatter,
                _on_click: on_click,
            },
        );
        log::debug!("Chart {} created for '{}'", id, widget_id);
        Ok(ChartHandle(id))
    }

    fn destroy(&self, handle: ChartHandle) {
        let removed = self.live.borrow_mut().remove(&handle.0);
        if let Some(live) = removed {
            live.chart.destroy();
        }
    }

    fn resize(&self, handle: ChartHandle) {
        if let Some(live) = self.live.borrow().get(&handle.0) {
            live.chart.resize();
        }
    }
}
