//! `framecast` command-line front-end.
//!
//! Assembles a frame collection from image paths, runs one generation and
//! renders the generation state to the terminal.

pub mod args;
pub mod render;
