pub mod analytics;
pub mod api;
pub mod cache;
pub mod config;
pub mod db;
pub mod domain;
pub mod error;
pub mod ingress;
pub mod state;
