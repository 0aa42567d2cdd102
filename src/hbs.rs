//! Main module for template engine functionality

pub mod ast;
pub mod engine;
pub mod error;
pub mod escape;
pub mod helpers;
pub mod lexing;
pub mod location;
pub mod logger;
pub mod options;
pub mod parsing;
pub mod registry;
pub mod render;
