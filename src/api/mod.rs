pub mod middleware;
pub mod models;
pub mod render;
pub mod routes;
pub mod tags;
