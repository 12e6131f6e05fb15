//! CLI tool for vgrid - lays out a grid and prints the rendered window as JSON
//!
//! Usage:
//!   vgrid_cli <options.json> <rows.json>                   # Default 800x600 viewport
//!   vgrid_cli <options.json> <rows.json> --width 1024 --height 300 --scroll 480
//!   vgrid_cli <options.json> <rows.json> --sort name:desc --filter name=al -v

#![allow(clippy::exit)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::indexing_slicing)]

use std::env;
use std::fs;
use std::io::{self, Write};
use std::process;

use serde_json::{json, Value};
use simplelog::{Config, LevelFilter, WriteLogger};
use vgrid::DataGrid;

const USAGE: &str = "Usage: vgrid_cli <options.json> <rows.json> [--width W] [--height H] \
[--scroll Y] [--sort col[:desc]] [--filter col=text] [-v|-vv]";

struct Args {
    options_path: String,
    rows_path: String,
    width: f64,
    height: f64,
    scroll: f64,
    sort: Option<(String, bool)>,
    filter: Option<(String, String)>,
    level: LevelFilter,
}

fn fail(message: &str) -> ! {
    eprintln!("{message}");
    process::exit(1);
}

fn number(flag: &str, value: Option<String>) -> f64 {
    value
        .and_then(|v| v.parse().ok())
        .unwrap_or_else(|| fail(&format!("{flag} expects a number")))
}

fn parse_args() -> Args {
    let mut positional = Vec::new();
    let mut args = Args {
        options_path: String::new(),
        rows_path: String::new(),
        width: 800.0,
        height: 600.0,
        scroll: 0.0,
        sort: None,
        filter: None,
        level: LevelFilter::Warn,
    };

    let mut iter = env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--width" => args.width = number("--width", iter.next()),
            "--height" => args.height = number("--height", iter.next()),
            "--scroll" => args.scroll = number("--scroll", iter.next()),
            "--sort" => {
                let spec = iter.next().unwrap_or_else(|| fail("--sort expects a column"));
                args.sort = Some(match spec.split_once(':') {
                    Some((column, dir)) => (column.to_string(), dir == "desc"),
                    None => (spec, false),
                });
            }
            "--filter" => {
                let spec = iter.next().unwrap_or_else(|| fail("--filter expects col=text"));
                let (column, text) = spec
                    .split_once('=')
                    .unwrap_or_else(|| fail("--filter expects col=text"));
                args.filter = Some((column.to_string(), text.to_string()));
            }
            "-v" => args.level = LevelFilter::Debug,
            "-vv" => args.level = LevelFilter::Trace,
            "-h" | "--help" => {
                println!("{USAGE}");
                process::exit(0);
            }
            _ => positional.push(arg),
        }
    }

    if positional.len() != 2 {
        fail(USAGE);
    }
    args.rows_path = positional.pop().unwrap();
    args.options_path = positional.pop().unwrap();
    args
}

fn main() {
    let args = parse_args();
    WriteLogger::init(args.level, Config::default(), io::stderr())
        .expect("Failed to initialize logger");

    let options = fs::read_to_string(&args.options_path)
        .unwrap_or_else(|e| fail(&format!("Error reading {}: {e}", args.options_path)));
    let rows = fs::read_to_string(&args.rows_path)
        .unwrap_or_else(|e| fail(&format!("Error reading {}: {e}", args.rows_path)));
    let rows: Vec<Value> = serde_json::from_str(&rows)
        .unwrap_or_else(|e| fail(&format!("Error parsing rows: {e}")));

    let mut grid: DataGrid<Value> = DataGrid::from_json(&options)
        .unwrap_or_else(|e| fail(&format!("Error in options: {e}")));
    grid.set_rows(rows, true);

    if let Some((column, descending)) = &args.sort {
        if let Err(e) = grid.sort(column, Some(*descending), false) {
            fail(&format!("Error sorting: {e}"));
        }
    }
    if let Some((column, text)) = &args.filter {
        if let Err(e) = grid.filter(column, text, false) {
            fail(&format!("Error filtering: {e}"));
        }
    }

    grid.resize(args.width, args.height);
    let update = grid.scroll_to(args.scroll);

    let columns: Vec<Value> = grid
        .column_widths()
        .columns
        .iter()
        .map(|c| json!({ "name": c.name, "width": c.actual_width }))
        .collect();
    let rows: Vec<Value> = grid
        .window_rows()
        .into_iter()
        .map(|r| json!({ "originIndex": r.origin_index, "row": r.row }))
        .collect();
    let output = json!({
        "columns": columns,
        "window": update.window,
        "totalHeight": grid.total_scroll_height(),
        "rows": rows,
    });

    let text = serde_json::to_string_pretty(&output)
        .unwrap_or_else(|e| fail(&format!("Error serializing JSON: {e}")));
    io::stdout().write_all(text.as_bytes()).unwrap();
    println!();
}
