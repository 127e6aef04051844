pub mod collector;
pub mod common;
pub mod config;
pub mod controller;
pub mod converter;
pub mod error;
pub mod logging;
pub mod state;
pub mod worker;

#[cfg(test)]
mod testing;
