pub mod activity;
pub mod admission;
pub mod configuration;
pub mod container_management;
pub mod controller;
pub mod error_handling;
pub mod lifecycle;
pub mod web_interface;

pub use controller::Controller;
