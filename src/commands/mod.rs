//! Command implementations for the fbcgen CLI

pub mod generate;
