//! Error types for kernel creation and execution.

use std::path::PathBuf;

use snafu::Snafu;

/// Result type for runtime operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors that can occur while creating or calling a kernel.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    /// Scratch directory for the compiler could not be created.
    #[snafu(display("failed to create scratch directory: {source}"))]
    TempDir { source: std::io::Error },

    /// Writing a source or header file failed.
    #[snafu(display("failed to write {}: {source}", path.display()))]
    Io { path: PathBuf, source: std::io::Error },

    /// The compiler executable could not be started.
    #[snafu(display("failed to run '{}': {source}. Is it installed?", program.display()))]
    CompilerSpawn { program: PathBuf, source: std::io::Error },

    /// The compiler rejected the source or produced an unusable module.
    #[snafu(display("compilation failed: {reason}"))]
    Compilation { reason: String },

    /// Native target setup or JIT construction failed.
    #[snafu(display("failed to create jit: {reason}"))]
    EngineInit { reason: String },

    /// Module was built for a different data layout than the running engine.
    #[snafu(display("incompatible data layout: engine uses '{expected}', module has '{actual}'"))]
    IncompatibleTarget { expected: String, actual: String },

    /// Adding a module to a logical library failed.
    #[snafu(display("failed to add module to {library}: {reason}"))]
    Link { library: String, reason: String },

    /// The entry symbol is missing after linking.
    #[snafu(display("failed to resolve entry symbol '{symbol}' in {library}"))]
    SymbolNotFound { library: String, symbol: String },

    /// Wrong number of buffers handed to a typed kernel call.
    #[snafu(display("kernel expects {expected} {what} buffers, got {actual}"))]
    ArityMismatch { what: &'static str, expected: usize, actual: usize },
}
