// Web Interface module root
pub mod routes;
pub mod status;
pub mod types;
pub mod web_server;

// Re-export commonly used items
pub use status::StatusBoard;
pub use web_server::WebServer;
