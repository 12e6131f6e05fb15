//! JavaScript callbacks adapted to the grid's measurement and comparator seams.

use std::cmp::Ordering;

use js_sys::Function;
use serde::Serialize;
use serde_json::Value;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

use crate::layout::TextMeasurer;
use crate::rows::{Comparator, ComparatorLookup};

/// Convert a row to a plain JS object (maps become objects, not `Map`s).
pub(crate) fn row_to_js(row: &Value) -> JsValue {
    row.serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .unwrap_or(JsValue::UNDEFINED)
}

/// `text => width` measurer supplied by the page, usually backed by
/// `CanvasRenderingContext2D.measureText`
pub(crate) struct JsMeasurer {
    measure: Function,
}

impl JsMeasurer {
    pub(crate) fn new(measure: Function) -> Self {
        Self { measure }
    }
}

impl TextMeasurer for JsMeasurer {
    fn text_width(&self, text: &str) -> f64 {
        self.measure
            .call1(&JsValue::NULL, &JsValue::from_str(text))
            .ok()
            .and_then(|v| v.as_f64())
            .unwrap_or(0.0)
    }
}

/// `(column, descending) => ((a, b) => number) | undefined`
pub(crate) struct JsComparators {
    lookup: Function,
}

impl JsComparators {
    pub(crate) fn new(lookup: Function) -> Self {
        Self { lookup }
    }
}

impl ComparatorLookup<Value> for JsComparators {
    fn comparator_for(&self, column: &str, descending: bool) -> Option<Comparator<Value>> {
        let compare = self
            .lookup
            .call2(
                &JsValue::NULL,
                &JsValue::from_str(column),
                &JsValue::from_bool(descending),
            )
            .ok()?
            .dyn_into::<Function>()
            .ok()?;
        Some(Box::new(move |left: &Value, right: &Value| {
            compare
                .call2(&JsValue::NULL, &row_to_js(left), &row_to_js(right))
                .ok()
                .and_then(|v| v.as_f64())
                .and_then(|n| n.partial_cmp(&0.0))
                .unwrap_or(Ordering::Equal)
        }))
    }
}
