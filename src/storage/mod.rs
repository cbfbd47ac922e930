//! Storage layer for docbrief

pub mod db;
pub mod models;

pub use db::Database;
pub use models::*;
