pub mod cli;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod observer;
pub mod server;
pub mod services;
pub mod tree;
pub mod types;

#[cfg(test)]
pub mod testing;
