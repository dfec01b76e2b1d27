pub mod auth;
pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod logging;
pub mod model;
pub mod store;
pub mod subtasks;
pub mod suggest;
pub mod tasks;
pub mod view;
pub mod workflow;
