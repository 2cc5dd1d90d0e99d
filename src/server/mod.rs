pub mod config;
mod http_layers;
mod profile_routes;
pub mod server;
pub(self) mod session;
pub mod state;
mod track_routes;

pub use config::ServerConfig;
pub use http_layers::*;
pub use server::{make_app, run_server};
pub use state::ServerState;
