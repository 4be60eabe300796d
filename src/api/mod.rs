//! HTTP layer: handlers, routes and middleware

pub mod middleware;
pub mod services;
