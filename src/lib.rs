#![allow(clippy::implicit_hasher)]

pub mod logging;
pub mod models;
pub mod components;
pub mod api;
pub mod constants;
pub mod time;
pub mod geometry;
pub mod flow;
pub mod live;

pub use components::app::App;
