//! Todo Page Frontend Entry Point

mod models;
mod config;
mod service;
mod page;
mod view;
mod store;
mod context;
mod components;
mod app;


use app::App;
use config::PageConfig;
use leptos::prelude::*;

fn main() {
    console_error_panic_hook::set_once();

    let config = PageConfig::from_env();
    let level = config.as_ref().map(PageConfig::log_level).unwrap_or(log::LevelFilter::Info);
    if let Err(e) = console_logger::init_logger("TodoPage", level) {
        log::warn!("[APP] Keeping existing logger: {}", e);
    }

    let config = config.unwrap_or_else(|e| {
        log::warn!("[CONFIG] {}; using defaults", e);
        PageConfig::default()
    });
    mount_to_body(move || view! { <App config=config.clone() /> });
}
