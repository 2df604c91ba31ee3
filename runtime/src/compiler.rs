//! Compiler frontend adapter.
//!
//! Lowers a translation unit to LLVM bitcode via `clang -c -emit-llvm` and
//! parses the result into a caller-owned LLVM context. The returned module
//! borrows that context, so the context must outlive every use of it.

use std::path::Path;
use std::process::Command;

use inkwell::context::Context;
use inkwell::memory_buffer::MemoryBuffer;
use inkwell::module::Module;
use snafu::ResultExt;

use crate::config::JitConfig;
use crate::engine::TargetInfo;
use crate::error::{CompilationSnafu, CompilerSpawnSnafu, IoSnafu, Result, TempDirSnafu};
use crate::synth::{TENSOR_HEADER, TENSOR_HEADER_NAME};

/// Source language of a translation unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Language {
    C,
    #[default]
    Cpp,
}

impl Language {
    /// Value for clang's `-x` flag.
    pub const fn clang_name(&self) -> &'static str {
        match self {
            Self::C => "c",
            Self::Cpp => "c++",
        }
    }

    pub const fn extension(&self) -> &'static str {
        match self {
            Self::C => "c",
            Self::Cpp => "cpp",
        }
    }
}

/// Parsed and verified LLVM module, scoped to its context.
pub struct CompiledModule<'ctx> {
    module: Module<'ctx>,
}

impl<'ctx> CompiledModule<'ctx> {
    pub fn module(&self) -> &Module<'ctx> {
        &self.module
    }

    pub fn into_module(self) -> Module<'ctx> {
        self.module
    }

    /// Triple and data layout the compiler picked for this module.
    pub fn target(&self) -> TargetInfo {
        TargetInfo::of(&self.module)
    }
}

/// Compile `source` into `context`.
///
/// `args` are passed to the compiler after the configured flags, so callers
/// can add include paths, defines or override optimization.
pub fn compile<'ctx>(
    source: &str,
    language: Language,
    args: &[String],
    context: &'ctx Context,
    config: &JitConfig,
) -> Result<CompiledModule<'ctx>> {
    let tmp_dir = tempfile::tempdir().context(TempDirSnafu)?;

    let include_dir = tmp_dir.path().join("include");
    std::fs::create_dir(&include_dir).context(IoSnafu { path: include_dir.clone() })?;
    write_file(&include_dir.join(TENSOR_HEADER_NAME), TENSOR_HEADER)?;

    let src_path = tmp_dir.path().join(format!("source.{}", language.extension()));
    let bc_path = tmp_dir.path().join("source.bc");
    write_file(&src_path, source)?;

    let mut command = Command::new(&config.clang);
    command
        .arg("-x")
        .arg(language.clang_name())
        .arg(config.opt_flag())
        .arg("-I")
        .arg(&include_dir)
        .args(&config.extra_args)
        .args(args)
        .args(["-c", "-emit-llvm", "-o"])
        .arg(&bc_path)
        .arg(&src_path);

    tracing::trace!(command = ?command, "invoking compiler");

    let output = command.output().context(CompilerSpawnSnafu { program: config.clang.clone() })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return CompilationSnafu { reason: format!("{} exited with {}:\n{stderr}", config.clang.display(), output.status) }
            .fail();
    }

    let buffer = MemoryBuffer::create_from_file(&bc_path)
        .map_err(|e| CompilationSnafu { reason: format!("failed to read bitcode: {e}") }.build())?;
    let module = context
        .create_module_from_ir(buffer)
        .map_err(|e| CompilationSnafu { reason: format!("failed to parse bitcode: {e}") }.build())?;

    if let Err(err) = module.verify() {
        return CompilationSnafu { reason: format!("module verification failed: {err}") }.fail();
    }

    tracing::debug!(
        module.triple = %TargetInfo::of(&module).triple,
        module.functions = module.get_functions().count(),
        "compiled translation unit"
    );

    Ok(CompiledModule { module })
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    std::fs::write(path, contents).context(IoSnafu { path: path.to_path_buf() })
}
