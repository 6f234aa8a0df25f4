pub mod admin;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod names;
pub mod routes;
pub mod tickets;

pub use routes::create_router;
