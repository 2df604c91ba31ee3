//! Global kernel registry.
//!
//! Maps kernel identifiers to compiled kernels for the lifetime of the
//! process. There is exactly one registry (see [`registry`]) because there is
//! exactly one execution engine.
//!
//! # Thread Safety
//!
//! - Creation is fully serialized by a mutex that also guards identifier
//!   allocation and lazy engine construction. Compiling and linking into the
//!   shared engine are never interleaved.
//! - Records live behind a `parking_lot::RwLock`. Creation takes the write
//!   side only for the final insert, so lookups are not held up by a compile
//!   in progress. parking_lot's eventual fairness keeps writers from starving.
//!
//! There is a single writer path. The record map is only written from
//! [`KernelRegistry::create`] while the creation mutex is held, so the two
//! locks are always taken in the same order (creation mutex, then record map)
//! and inserts are serialized with identifier allocation. Lookups take only
//! the read side of the record map.
//!
//! Records are never updated or removed.

use std::collections::HashMap;
use std::sync::Arc;

use inkwell::context::Context;
use morok_call_dtype::TensorSpec;
use once_cell::sync::Lazy;
use parking_lot::{Mutex, RwLock};

use crate::Result;
use crate::compiler::{Language, compile};
use crate::config::JitConfig;
use crate::engine::{JitEngine, TargetInfo};
use crate::kernel::{Kernel, KernelId};
use crate::synth::{ENTRY_SYMBOL, synthesize};

/// State touched only while creating a kernel.
struct Session {
    last_id: i64,
    engine: Option<JitEngine>,
}

/// Registry of every kernel created in this process.
pub struct KernelRegistry {
    config: JitConfig,
    session: Mutex<Session>,
    kernels: RwLock<HashMap<KernelId, Arc<Kernel>>>,
}

impl KernelRegistry {
    fn new(config: JitConfig) -> Self {
        Self { config, session: Mutex::new(Session { last_id: 0, engine: None }), kernels: RwLock::new(HashMap::new()) }
    }

    pub fn config(&self) -> &JitConfig {
        &self.config
    }

    /// Compile `source` and register it as a new kernel.
    ///
    /// `source` must define `myfn`, taking one tensor view per output followed
    /// by one per input. `args` go to the compiler after the configured
    /// flags.
    ///
    /// A failed creation still consumes its identifier; identifiers are
    /// unique and increasing, not gap-free.
    pub fn create(
        &self,
        source: &str,
        outputs: &[TensorSpec],
        inputs: &[TensorSpec],
        args: &[String],
    ) -> Result<KernelId> {
        let mut session = self.session.lock();
        session.last_id += 1;
        let id = KernelId(session.last_id);

        let _span = tracing::debug_span!("create_kernel", kernel.id = %id).entered();

        let unit = synthesize(source, outputs, inputs);
        tracing::trace!(source = %unit, "synthesized translation unit");

        // Declared first so it drops last if any step below fails.
        let context = Box::new(Context::create());
        // SAFETY: The context is boxed, so its address is stable. Everything
        // borrowing it is either dropped before `context` on the error paths
        // (locals drop in reverse order) or handed to the engine together with
        // the box, which keeps both alive for the rest of the process.
        let context_ref: &'static Context = unsafe { &*(context.as_ref() as *const Context) };

        let module = compile(&unit, Language::Cpp, args, context_ref, &self.config).inspect_err(|e| {
            tracing::debug!(error = %e, "kernel compilation failed");
        })?;

        let engine = JitEngine::ensure_initialized(&mut session.engine, &module, self.config.optimization_level())?;
        engine.admit(&module)?;

        let mut library = engine.create_library(library_name(id), context_ref)?;
        library.link(module)?;
        let address = library.resolve(ENTRY_SYMBOL)?;
        let library_name = library.name().to_string();
        engine.retain(id, library, context);

        // SAFETY: `address` is the synthesized `entry`, whose signature is fixed
        // by the synthesizer, and its library was just retained for good.
        let kernel = unsafe { Kernel::from_address(id, outputs.to_vec(), inputs.to_vec(), library_name, address) };

        tracing::debug!(
            kernel.library = %kernel.library(),
            kernel.outputs = outputs.len(),
            kernel.inputs = inputs.len(),
            kernel.entry = %format!("{address:#x}"),
            "kernel created"
        );

        self.kernels.write().insert(id, Arc::new(kernel));
        Ok(id)
    }

    /// Look up a kernel record.
    pub fn get(&self, id: KernelId) -> Option<Arc<Kernel>> {
        self.kernels.read().get(&id).cloned()
    }

    pub fn len(&self) -> usize {
        self.kernels.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.kernels.read().is_empty()
    }

    /// Target fixed by the first kernel, if any kernel was created yet.
    pub fn target(&self) -> Option<TargetInfo> {
        self.session.lock().engine.as_ref().map(|engine| engine.target().clone())
    }

    /// Number of logical libraries held by the engine.
    pub fn library_count(&self) -> usize {
        self.session.lock().engine.as_ref().map_or(0, JitEngine::library_count)
    }
}

fn library_name(id: KernelId) -> String {
    format!("morokdl_{id}")
}

static REGISTRY: Lazy<KernelRegistry> = Lazy::new(|| KernelRegistry::new(JitConfig::from_env()));

/// The process-wide kernel registry.
///
/// Lazily initialized on first access with [`JitConfig::from_env`].
pub fn registry() -> &'static KernelRegistry {
    &REGISTRY
}

/// Create a kernel in the process-wide registry.
///
/// `TensorSpec::from((name, dims))` builds a descriptor from the
/// `(element type name, dims)` pair a host runtime usually has at hand.
///
/// # Example
///
/// ```ignore
/// let id = morok_call_runtime::create_kernel(
///     "void myfn(morok::tensor<float, 4>& out, const morok::tensor<float, 4>& in) { out = in; }",
///     &[TensorSpec::from(("float", [4]))],
///     &[TensorSpec::from(("float", [4]))],
///     &[],
/// )?;
/// ```
pub fn create_kernel(source: &str, outputs: &[TensorSpec], inputs: &[TensorSpec], args: &[String]) -> Result<KernelId> {
    registry().create(source, outputs, inputs, args)
}

/// Look up a kernel in the process-wide registry.
pub fn kernel(id: KernelId) -> Option<Arc<Kernel>> {
    registry().get(id)
}
