pub mod db;
pub mod error;
pub mod guards;
pub mod handlers;
pub mod models;
pub mod service;
pub mod validation;

pub use db::create_pool;
