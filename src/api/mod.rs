pub mod routes;
mod server;
pub use server::{app, cors_layer, serve};
pub mod public;
mod state;
pub use state::AppState;
