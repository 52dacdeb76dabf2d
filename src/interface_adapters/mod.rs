// Interface adapters: log scanning, wire protocol, fan-out and network handling.

pub mod broadcast;
pub mod http;
pub mod log_format;
pub mod net;
pub mod paths;
pub mod protocol;
pub mod routes;
pub mod state;
pub mod utils;
pub mod viewer;
