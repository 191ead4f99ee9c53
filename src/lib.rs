pub mod args;
pub mod calculator;
pub mod config;
pub mod data;
pub mod error;
pub mod logging;
pub mod prices;
pub mod refresh;
pub mod report;
pub mod server;
pub mod sources;
pub mod util;
