use serde::Deserialize;
use serde_json::{Map, Value};
use wasm_bindgen::prelude::*;
use workflow_layout::layout_json;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WorkflowLayoutOptions {
    pretty: Option<bool>,
    /// Layout config keys (`nodeWidth`, `rowGap`, `anchorX`, ...).
    #[serde(flatten)]
    layout: Map<String, Value>,
}

fn layout_with_options(
    graph_json: &str,
    options: &WorkflowLayoutOptions,
) -> workflow_layout::Result<String> {
    let overrides =
        (!options.layout.is_empty()).then(|| Value::Object(options.layout.clone()).to_string());
    layout_json(graph_json, overrides.as_deref(), options.pretty.unwrap_or(false))
}

#[wasm_bindgen]
pub fn layout_workflow(graph_json: &str, options_json: Option<String>) -> Result<String, JsValue> {
    let options = if let Some(raw_options) = options_json {
        serde_json::from_str::<WorkflowLayoutOptions>(&raw_options)
            .map_err(|error| JsValue::from_str(&error.to_string()))?
    } else {
        WorkflowLayoutOptions::default()
    };

    layout_with_options(graph_json, &options).map_err(|error| JsValue::from_str(&error.to_string()))
}
