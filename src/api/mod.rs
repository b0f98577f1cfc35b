pub mod handlers;
pub mod server;

pub use handlers::{AppState, ConfigInfo};
pub use server::{build_router, run_server, ServerConfig};
