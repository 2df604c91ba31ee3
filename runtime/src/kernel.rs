//! Compiled kernel records.

use std::ffi::c_void;
use std::fmt;

use morok_call_dtype::TensorSpec;

use crate::Result;
use crate::error::ArityMismatchSnafu;

/// Process-unique kernel handle.
///
/// Travels through the custom-call convention as an 8-byte integer in the
/// first input slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct KernelId(pub i64);

impl KernelId {
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for KernelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Signature of the synthesized `entry` function.
pub type EntryFn = unsafe extern "C" fn(outs: *const *mut c_void, ins: *const *const c_void);

/// A compiled kernel ready for execution.
///
/// Immutable once registered. The entry address was copied out of the
/// kernel's logical library at creation time; the library is not consulted
/// again.
#[derive(Debug)]
pub struct Kernel {
    id: KernelId,
    outputs: Vec<TensorSpec>,
    inputs: Vec<TensorSpec>,
    library: String,
    entry: EntryFn,
}

impl Kernel {
    /// # Safety
    ///
    /// `address` must be the resolved address of a function with the
    /// [`EntryFn`] signature that stays mapped for the rest of the process.
    pub(crate) unsafe fn from_address(
        id: KernelId,
        outputs: Vec<TensorSpec>,
        inputs: Vec<TensorSpec>,
        library: String,
        address: usize,
    ) -> Self {
        // SAFETY: Guaranteed by the caller.
        let entry = unsafe { std::mem::transmute::<usize, EntryFn>(address) };
        Self { id, outputs, inputs, library, entry }
    }

    pub fn id(&self) -> KernelId {
        self.id
    }

    pub fn outputs(&self) -> &[TensorSpec] {
        &self.outputs
    }

    pub fn inputs(&self) -> &[TensorSpec] {
        &self.inputs
    }

    /// Name of the logical library holding this kernel's code.
    pub fn library(&self) -> &str {
        &self.library
    }

    pub fn entry_address(&self) -> usize {
        self.entry as usize
    }

    /// Execute the kernel with explicit output and input buffers.
    ///
    /// Buffer counts are checked against the declared specs; sizes and
    /// element types are not.
    ///
    /// # Safety
    ///
    /// Every pointer must reference a live buffer at least as large as its
    /// spec describes, for the duration of the call. Output buffers must not
    /// alias each other.
    pub unsafe fn execute(&self, outs: &[*mut u8], ins: &[*const u8]) -> Result<()> {
        if outs.len() != self.outputs.len() {
            return ArityMismatchSnafu { what: "output", expected: self.outputs.len(), actual: outs.len() }.fail();
        }
        if ins.len() != self.inputs.len() {
            return ArityMismatchSnafu { what: "input", expected: self.inputs.len(), actual: ins.len() }.fail();
        }

        tracing::debug!(kernel.id = %self.id, kernel.outputs = outs.len(), kernel.inputs = ins.len(), "executing kernel");

        // SAFETY: `*mut u8`/`*const u8` and `*mut c_void`/`*const c_void` share layout.
        unsafe { self.call_raw(outs.as_ptr().cast(), ins.as_ptr().cast()) };
        Ok(())
    }

    /// Call the entry point with pre-arranged pointer arrays.
    ///
    /// # Safety
    ///
    /// `outs` must point to `outputs().len()` valid output pointers and
    /// `ins` to `inputs().len()` valid input pointers.
    pub unsafe fn call_raw(&self, outs: *const *mut c_void, ins: *const *const c_void) {
        // SAFETY: Guaranteed by the caller; `entry` came from the JIT with this signature.
        unsafe { (self.entry)(outs, ins) }
    }
}
