pub mod auth;
pub mod comments;
pub mod error;
pub mod follows;
pub mod likes;
pub mod middleware;
pub mod posts;
pub mod profiles;
pub mod routes;

mod serialize;
