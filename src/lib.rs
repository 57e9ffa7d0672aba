pub mod config;
pub mod db;
pub mod generation;
pub mod logging;
pub mod services;
pub mod workers;
