//! treeweb web crate.
//!
//! Everything the demo application needs around the core renderer:
//!
//! - `config`: [`AppConfig`], the definitions shared by server and client.
//! - `page`: the `index.html` tree, built with `treeweb-core`.
//! - `client`: the embedded browser runtime and its bootstrap object.
//! - `sim`: the random-walk simulation and the shared [`StateStore`].
//! - `build`: rebuild-on-staleness for the page and the script.
//! - `adapters::axum` (feature `axum`): HTTP routes over an [`AppState`].

#[cfg(feature = "axum")]
pub mod adapters;
pub mod build;
pub mod client;
pub mod config;
pub mod error;
pub mod page;
pub mod sim;

#[cfg(feature = "axum")]
pub use adapters::axum::{AppState, router};
pub use build::{BuildReport, default_sources, do_build, needs_build};
pub use client::{ClientBootstrap, TREEWEB_CLIENT_JS, client_script, readout_color};
pub use config::AppConfig;
pub use error::WebError;
pub use page::{build_index_page, make_body, render_index};
pub use sim::{SimState, Snapshot, StateStore, parse_step_size, step};
