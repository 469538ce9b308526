// quill_ast - Abstract Syntax Tree definitions for the quill language
//! This crate provides the AST primitives shared across the quill compiler
//! pipeline. The inference layer only consumes position information, so the
//! crate currently exposes the span types and keeps richer node definitions
//! with the parser front-end.

pub mod types;

pub use types::*;
