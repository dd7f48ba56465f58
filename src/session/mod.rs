pub mod canvas_session;
pub mod config;
pub mod host;
