pub mod app;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod fetcher;
pub mod logging;
pub mod model;
pub mod output;
pub mod runner;
pub mod session;
pub mod utils;
pub mod view;

#[cfg(test)]
mod tests;
