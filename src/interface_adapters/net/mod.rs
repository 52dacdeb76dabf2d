// Network adapter modules split by viewer sockets vs watch-control HTTP routes.

pub mod client;
pub mod internal;

pub use client::ws_handler;
pub use internal::{stop_handler, watch_handler, watch_status_handler};
