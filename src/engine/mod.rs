pub mod client;
pub mod discovery;
pub mod download;
pub mod error;
pub mod runner;
pub mod trial;
pub mod types;
