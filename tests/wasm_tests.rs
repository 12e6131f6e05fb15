//! Browser facade tests. Run with `wasm-pack test --headless --chrome`.
#![cfg(target_arch = "wasm32")]
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

use js_sys::{Array, Function, Reflect};
use wasm_bindgen::JsValue;
use wasm_bindgen_test::*;
use vgrid::GridView;

wasm_bindgen_test_configure!(run_in_browser);

fn view() -> GridView {
    GridView::from_json(
        r#"{"columns": [{"name": "id", "width": 60}, {"name": "name", "width": "100%"}]}"#,
    )
    .unwrap()
}

fn rows() -> JsValue {
    js_sys::JSON::parse(r#"[{"id": 1, "name": "bob"}, {"id": 2, "name": "Alice"}, {"id": 3, "name": "al"}]"#)
        .unwrap()
}

#[wasm_bindgen_test]
fn test_filter_and_window_rows() {
    let mut v = view();
    v.set_rows(rows(), false).unwrap();
    v.resize(400.0, 200.0);
    assert_eq!(v.filter("name", "AL", false).unwrap(), 2);
    v.update_window().unwrap();
    let rows = Array::from(&v.window_rows().unwrap());
    assert_eq!(rows.length(), 2);
    let first = rows.get(0);
    let origin = Reflect::get(&first, &"originIndex".into()).unwrap();
    assert_eq!(origin.as_f64(), Some(1.0));
}

#[wasm_bindgen_test]
fn test_js_measurer_sizes_auto_columns() {
    let mut v = GridView::from_json(r#"{"columns": [{"name": "abc"}, {"name": "rest", "width": "100%"}]}"#)
        .unwrap();
    v.set_measurer(Function::new_with_args("text", "return text.length * 10;"));
    v.table_width_changed(300.0, true);
    let widths = v.column_widths().unwrap();
    let columns = Array::from(&Reflect::get(&widths, &"columns".into()).unwrap());
    let width = Reflect::get(&columns.get(0), &"actualWidth".into()).unwrap();
    assert_eq!(width.as_f64(), Some(50.0));
}

#[wasm_bindgen_test]
fn test_js_comparator_override() {
    let mut v = view();
    v.set_rows(rows(), false).unwrap();
    // Sort names by length
    v.set_comparator(Function::new_with_args(
        "column, descending",
        "return column === 'name' ? (a, b) => (a.name.length - b.name.length) * (descending ? -1 : 1) : undefined;",
    ));
    v.sort("name", Some(false), false).unwrap();
    let first = v.data_for_row(0).unwrap();
    let name = Reflect::get(&first, &"name".into()).unwrap();
    assert_eq!(name.as_string().as_deref(), Some("al"));
}

#[wasm_bindgen_test]
fn test_destroy_cancels_and_rejects_mutation() {
    let mut v = view();
    v.schedule_layout(Function::new_no_args(""), 50);
    assert!(v.layout_pending());
    v.destroy();
    assert!(!v.layout_pending());
    assert!(v.set_rows(rows(), false).is_err());
}
