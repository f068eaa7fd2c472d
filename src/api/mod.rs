//! HTTP layer: the catch-all push handler, middleware and DTOs.

pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod routes;
