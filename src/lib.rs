pub mod config;
pub mod constants;
pub mod detection;
pub mod landmarks;
pub mod logging;
pub mod middleware;
pub mod protocol;
pub mod response;
pub mod routes;
pub mod session;
pub mod state;
