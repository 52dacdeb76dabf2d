pub mod domain;
pub mod frameworks;
pub mod interface_adapters;
pub mod use_cases;

pub use frameworks::config::http_port;
pub use frameworks::server::{run, run_with_config};
pub use frameworks::viewer::run_viewer_with_config;
