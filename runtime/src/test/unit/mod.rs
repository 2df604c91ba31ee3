pub mod compiler;
pub mod config;
pub mod synth;
