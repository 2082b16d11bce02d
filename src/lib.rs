pub mod analytics;
pub mod catalog;
pub mod client;
pub mod config;
pub mod db;
pub mod environment;
pub mod errors;
pub mod normalization;
pub mod records;
pub mod routes;
pub mod session;
pub mod timer;
pub mod urls;
pub mod user;
pub mod workout;
