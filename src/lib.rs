// Library exports for the server binary and integration tests

pub mod api;
pub mod config;
pub mod db;
pub mod import;
pub mod library;
pub mod pagination;
pub mod storage;
pub mod streaming;
