//! Runtime compilation and dispatch of custom-call kernels.
//!
//! Kernel source is wrapped in a synthesized entry point, compiled to LLVM
//! bitcode by clang, linked into its own logical library inside a
//! process-wide MCJIT engine, and registered under a fresh identifier. The
//! tensor runtime later calls [`cpu_callback`] with that identifier in the
//! first input slot and the bridge dispatches to the compiled code.
//!
//! # Creating and calling a kernel
//!
//! ```ignore
//! use morok_call_dtype::TensorSpec;
//! use morok_call_runtime::{create_kernel, kernel};
//!
//! let spec = TensorSpec::from(("float", [4]));
//! let id = create_kernel(
//!     "void myfn(morok::tensor<float, 4>& out, const morok::tensor<float, 4>& in) { out = in; }",
//!     &[spec.clone()],
//!     &[spec],
//!     &[],
//! )?;
//! unsafe { kernel(id).unwrap().execute(&[out.as_mut_ptr().cast()], &[input.as_ptr().cast()])? };
//! ```

pub mod bridge;
pub mod compiler;
pub mod config;
pub mod engine;
pub mod error;
pub mod kernel;
pub mod registry;
pub mod synth;


pub use bridge::{CUSTOM_CALL_TARGET, CustomCallTarget, OutputSlots, cpu_callback, custom_call_target};
pub use compiler::{CompiledModule, Language, compile};
pub use config::JitConfig;
pub use engine::{JitEngine, LogicalLibrary, TargetInfo, engine_constructions};
pub use error::*;
pub use kernel::{EntryFn, Kernel, KernelId};
pub use registry::{KernelRegistry, create_kernel, kernel, registry};
pub use synth::{ENTRY_SYMBOL, KERNEL_FN, synthesize};
