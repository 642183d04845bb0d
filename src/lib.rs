// src/lib.rs
pub mod config;
pub mod models;
pub mod hash;
pub mod parser;
pub mod scanner;
pub mod library;
pub mod select;
pub mod writer;
pub mod engine;

pub use models::*;
pub use hash::*;
pub use parser::*;
pub use scanner::*;
pub use library::*;
pub use select::*;
pub use writer::*;
