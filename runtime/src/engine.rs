//! Process-wide native execution engine.
//!
//! The first compiled module fixes the target triple and data layout for the
//! rest of the process. Every kernel gets its own logical library: an MCJIT
//! instance seeded from an empty stub module, so all kernels can export the
//! same entry symbol without colliding.
//!
//! Nothing here is ever unloaded. Libraries, their modules and their LLVM
//! contexts stay alive until process exit because compiled call sites may
//! invoke a kernel at any later time.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use inkwell::OptimizationLevel;
use inkwell::context::Context;
use inkwell::execution_engine::ExecutionEngine;
use inkwell::module::Module;
use inkwell::targets::{InitializationConfig, Target, TargetData, TargetTriple};

use crate::compiler::CompiledModule;
use crate::error::{EngineInitSnafu, IncompatibleTargetSnafu, LinkSnafu, Result, SymbolNotFoundSnafu};
use crate::kernel::KernelId;

static CONSTRUCTIONS: AtomicUsize = AtomicUsize::new(0);

/// Number of execution engines built so far in this process. Never above 1.
pub fn engine_constructions() -> usize {
    CONSTRUCTIONS.load(Ordering::Acquire)
}

/// Target triple and data layout, as LLVM spells them.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TargetInfo {
    pub triple: String,
    pub data_layout: String,
}

impl TargetInfo {
    pub fn of(module: &Module<'_>) -> Self {
        Self {
            triple: module.get_triple().as_str().to_string_lossy().into_owned(),
            data_layout: module.get_data_layout().as_str().to_string_lossy().into_owned(),
        }
    }

    /// Stamp this triple and layout onto `module`.
    fn pin(&self, module: &Module<'_>) {
        module.set_triple(&TargetTriple::create(&self.triple));
        let target_data = TargetData::create(&self.data_layout);
        module.set_data_layout(&target_data.get_data_layout());
    }
}

/// JIT state shared by all kernels of the process.
pub struct JitEngine {
    target: TargetInfo,
    opt_level: OptimizationLevel,
    libraries: HashMap<KernelId, RetainedLibrary>,
}

// SAFETY: The engine holds LLVM handles (`Rc`-counted inkwell wrappers and
// raw contexts) that are not thread-aware. The registry only reaches the
// engine through its creation mutex, so at most one thread touches these
// handles at a time and no handle is ever shared outside that lock.
unsafe impl Send for JitEngine {}

impl JitEngine {
    /// Return the engine in `slot`, building it from `from` on first use.
    ///
    /// The caller must hold the lock guarding `slot`; that lock is what makes
    /// concurrent first use build exactly one engine.
    pub fn ensure_initialized<'a>(
        slot: &'a mut Option<JitEngine>,
        from: &CompiledModule<'_>,
        opt_level: OptimizationLevel,
    ) -> Result<&'a mut JitEngine> {
        let engine = match slot.take() {
            Some(engine) => engine,
            None => Self::new(from.target(), opt_level)?,
        };
        Ok(slot.insert(engine))
    }

    fn new(target: TargetInfo, opt_level: OptimizationLevel) -> Result<Self> {
        Target::initialize_native(&InitializationConfig::default())
            .map_err(|reason| EngineInitSnafu { reason }.build())?;
        ExecutionEngine::link_in_mc_jit();

        CONSTRUCTIONS.fetch_add(1, Ordering::AcqRel);
        tracing::debug!(
            engine.triple = %target.triple,
            engine.data_layout = %target.data_layout,
            engine.opt_level = ?opt_level,
            "execution engine created"
        );

        Ok(Self { target, opt_level, libraries: HashMap::new() })
    }

    pub fn target(&self) -> &TargetInfo {
        &self.target
    }

    pub fn library_count(&self) -> usize {
        self.libraries.len()
    }

    /// Reject modules built for another data layout.
    pub fn admit(&self, module: &CompiledModule<'_>) -> Result<()> {
        let actual = module.target();
        if actual.data_layout != self.target.data_layout {
            return IncompatibleTargetSnafu { expected: self.target.data_layout.clone(), actual: actual.data_layout }
                .fail();
        }
        Ok(())
    }

    /// Allocate a fresh linking namespace backed by `context`.
    pub fn create_library(&self, name: String, context: &'static Context) -> Result<LogicalLibrary> {
        let stub = context.create_module(&name);
        self.target.pin(&stub);

        let engine = stub
            .create_jit_execution_engine(self.opt_level)
            .map_err(|e| EngineInitSnafu { reason: format!("{name}: {e}") }.build())?;

        tracing::trace!(library = %name, "logical library created");
        Ok(LogicalLibrary { name, engine, modules: vec![stub] })
    }

    /// Keep a linked library and its context alive for the process lifetime.
    pub fn retain(&mut self, id: KernelId, library: LogicalLibrary, context: Box<Context>) {
        debug_assert!(!self.libraries.contains_key(&id), "kernel id {id} linked twice");
        self.libraries.insert(id, RetainedLibrary { library, _context: context });
    }
}

/// Isolated linking unit holding one kernel's code.
pub struct LogicalLibrary {
    name: String,
    engine: ExecutionEngine<'static>,
    modules: Vec<Module<'static>>,
}

impl LogicalLibrary {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Add a compiled module's code to this library.
    pub fn link(&mut self, module: CompiledModule<'static>) -> Result<()> {
        let module = module.into_module();
        self.engine.add_module(&module).map_err(|()| {
            LinkSnafu { library: self.name.clone(), reason: "module is already owned by an execution engine" }.build()
        })?;
        self.modules.push(module);
        tracing::trace!(library = %self.name, modules = self.modules.len(), "module linked");
        Ok(())
    }

    /// Address of `symbol` within this library only.
    pub fn resolve(&self, symbol: &str) -> Result<usize> {
        self.engine.get_function_address(symbol).map_err(|e| {
            tracing::debug!(library = %self.name, symbol, error = ?e, "symbol lookup failed");
            SymbolNotFoundSnafu { library: self.name.clone(), symbol }.build()
        })
    }
}

// Field order matters: the library (engine and modules) drops before the
// context it was built in.
struct RetainedLibrary {
    library: LogicalLibrary,
    _context: Box<Context>,
}
