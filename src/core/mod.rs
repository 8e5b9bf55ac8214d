pub mod agent;
pub mod app;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod paths;
pub mod payload;
pub mod report;
pub mod util;
