pub mod error;
pub mod ports;
pub mod repo;
pub mod scoring;
pub mod seed;
pub mod service;
