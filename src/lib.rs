pub mod app;
pub mod config;
pub mod counter;
pub mod errors;
pub mod handlers;
pub mod input;
pub mod models;
pub mod state;
pub mod storage;
pub mod ui;
pub mod variants;

pub use app::router;
pub use config::Config;
pub use state::AppState;
