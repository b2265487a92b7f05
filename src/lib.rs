pub mod api;
pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod forms;
pub mod search;
pub mod session;
