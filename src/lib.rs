pub mod app;
pub mod catalog;
pub mod config;
pub mod policy;
pub mod reconcile;
pub mod rows;
pub mod shared;
pub mod system;
pub mod transfer;
pub mod ui;
