//! HTTP API handlers for dlens-ex

pub mod buildinfo;
pub mod error;
pub mod events;
pub mod health;
pub mod lists;
pub mod thread;
pub mod ui;

pub use buildinfo::get_build_info;
pub use error::ApiError;
pub use events::event_stream;
pub use health::health_routes;
pub use lists::{list_precomputed, list_stored};
pub use thread::{
    apply_selection, click, close_thread, hover, open_thread, register, unregister,
};
pub use ui::{serve_app_js, serve_index};
