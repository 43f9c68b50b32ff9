pub mod app;
pub mod auth;
pub mod cli;
pub mod config;
pub mod database;
pub mod error;
pub mod graph;
pub mod handlers;
pub mod middleware;
pub mod services;
