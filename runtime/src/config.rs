//! JIT configuration.
//!
//! Provides typed configuration for the compiler and execution engine with a
//! bon builder. The process-wide registry reads it from the environment.

use std::path::PathBuf;

use bon::bon;
use inkwell::OptimizationLevel;

/// Settings shared by every kernel compiled in this process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JitConfig {
    /// Compiler executable used to lower source to LLVM bitcode.
    pub clang: PathBuf,
    /// 0..=3. Drives both `-O<n>` and the JIT code generator.
    pub opt_level: u8,
    /// Flags placed before the per-kernel caller arguments.
    pub extra_args: Vec<String>,
}

#[bon]
impl JitConfig {
    /// Create a configuration with builder pattern.
    #[builder]
    pub fn builder(
        #[builder(default = PathBuf::from("clang"), into)] clang: PathBuf,
        #[builder(default = 2)] opt_level: u8,
        #[builder(default)] extra_args: Vec<String>,
    ) -> Self {
        Self { clang, opt_level: opt_level.min(3), extra_args }
    }

    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// * `MOROK_CLANG` - Compiler executable (default: `clang`)
    /// * `MOROK_JIT_OPT` - Optimization level 0..=3 (default: 2)
    /// * `MOROK_JIT_ARGS` - Extra whitespace-separated compiler flags
    pub fn from_env() -> Self {
        let clang = std::env::var_os("MOROK_CLANG").map(PathBuf::from).unwrap_or_else(|| PathBuf::from("clang"));
        let opt_level = std::env::var("MOROK_JIT_OPT").ok().and_then(|s| s.parse().ok()).unwrap_or(2);
        let extra_args = std::env::var("MOROK_JIT_ARGS")
            .map(|s| s.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default();

        Self::builder().clang(clang).opt_level(opt_level).extra_args(extra_args).build()
    }

    /// `-O<n>` flag matching the configured level.
    pub fn opt_flag(&self) -> String {
        format!("-O{}", self.opt_level)
    }

    /// Code generation level for the execution engine.
    pub fn optimization_level(&self) -> OptimizationLevel {
        match self.opt_level {
            0 => OptimizationLevel::None,
            1 => OptimizationLevel::Less,
            2 => OptimizationLevel::Default,
            _ => OptimizationLevel::Aggressive,
        }
    }
}

impl Default for JitConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}
