pub mod handlers;
pub mod http;
pub mod jwt_repository;
pub mod models;
pub mod repository;
