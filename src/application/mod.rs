pub mod error;
pub mod receipt;
pub mod service;
