pub mod auth;
pub mod backend;
pub mod carousel;
pub mod config;
pub mod controllers;
pub mod error;
pub mod filter;
pub mod fixtures;
pub mod forms;
pub mod models;
pub mod repository;
pub mod router;
pub mod utils;
pub mod websockets;
