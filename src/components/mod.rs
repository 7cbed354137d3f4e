#![allow(clippy::needless_pass_by_value)]

pub mod app;
pub mod canvas_viewport;
pub mod controls;
pub mod flow_canvas;
pub mod flow_map;
pub mod legend;
pub mod live_status;
pub mod stats_panel;
