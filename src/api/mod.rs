pub mod extract;
pub mod middleware;
pub mod openapi;
pub mod routes;
