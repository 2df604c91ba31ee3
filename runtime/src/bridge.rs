//! Custom-call invocation bridge.
//!
//! The tensor runtime calls [`cpu_callback`] for every kernel created through
//! the registry, using this convention:
//!
//! - `ins[0]` points to the 8-byte kernel identifier
//! - `ins[1..]` are the kernel's declared inputs, in order
//! - `out` is the sole output buffer when the kernel declares exactly one
//!   output, otherwise a pointer to an array of output buffer pointers
//!
//! An identifier the registry does not know is fatal: the process aborts
//! with a diagnostic. It means a compiled call site and the registry
//! disagree, which no caller can recover from mid-computation.

use std::ffi::{CStr, c_void};

use crate::kernel::{Kernel, KernelId};
use crate::registry::registry;

/// Capsule name the tensor runtime recognises as a custom-call target.
pub const CUSTOM_CALL_TARGET: &CStr = c"xla._CUSTOM_CALL_TARGET";

/// Native callback plus the marker it must be registered under.
#[derive(Debug, Clone, Copy)]
pub struct CustomCallTarget {
    pub name: &'static CStr,
    pub function: unsafe extern "C" fn(out: *mut c_void, ins: *const *const c_void),
}

impl CustomCallTarget {
    pub fn as_ptr(&self) -> *const c_void {
        self.function as *const c_void
    }
}

/// The dispatch target shared by every kernel.
pub fn custom_call_target() -> CustomCallTarget {
    CustomCallTarget { name: CUSTOM_CALL_TARGET, function: cpu_callback }
}

/// Output pointers arranged for the entry function.
#[derive(Debug)]
pub enum OutputSlots<'a> {
    /// The caller's `out` is itself the only output buffer.
    Single([*mut c_void; 1]),
    /// The caller's `out` pointed at this array of output buffers.
    Array(&'a [*mut c_void]),
}

impl<'a> OutputSlots<'a> {
    /// Interpret the raw `out` argument for a kernel with `count` outputs.
    ///
    /// # Safety
    ///
    /// When `count > 1`, `out` must point to `count` readable pointers that
    /// stay valid for `'a`.
    pub unsafe fn from_raw(out: *mut c_void, count: usize) -> Self {
        match count {
            0 => Self::Array(&[]),
            1 => Self::Single([out]),
            // SAFETY: Guaranteed by the caller.
            n => Self::Array(unsafe { std::slice::from_raw_parts(out as *const *mut c_void, n) }),
        }
    }

    pub fn as_slice(&self) -> &[*mut c_void] {
        match self {
            Self::Single(slot) => slot.as_slice(),
            Self::Array(slots) => slots,
        }
    }
}

/// Read the kernel identifier from the first input slot.
///
/// # Safety
///
/// `ins` must point to at least one pointer, and `ins[0]` to 8 readable bytes.
unsafe fn read_identifier(ins: *const *const c_void) -> KernelId {
    // SAFETY: Guaranteed by the caller; the identifier buffer has no alignment promise.
    unsafe { KernelId((*ins).cast::<i64>().read_unaligned()) }
}

/// Dispatch one call to `kernel`.
///
/// # Safety
///
/// `ins` must hold `kernel.inputs().len()` valid input pointers and `out`
/// must follow the output convention for `kernel.outputs().len()` outputs.
pub unsafe fn dispatch(kernel: &Kernel, out: *mut c_void, ins: &[*const c_void]) {
    // SAFETY: Guaranteed by the caller.
    let outs = unsafe { OutputSlots::from_raw(out, kernel.outputs().len()) };

    tracing::trace!(
        kernel.id = %kernel.id(),
        kernel.outputs = outs.as_slice().len(),
        kernel.inputs = ins.len(),
        "calling kernel"
    );
    // SAFETY: Both arrays carry exactly the declared number of pointers.
    unsafe { kernel.call_raw(outs.as_slice().as_ptr(), ins.as_ptr()) };
    tracing::trace!(kernel.id = %kernel.id(), "kernel returned");
}

/// Entry point registered with the tensor runtime.
///
/// # Safety
///
/// Must be called with the convention described in the module docs, with
/// buffers matching the shapes the kernel was created with.
pub unsafe extern "C" fn cpu_callback(out: *mut c_void, ins: *const *const c_void) {
    // SAFETY: Guaranteed by the caller.
    let id = unsafe { read_identifier(ins) };

    let Some(kernel) = registry().get(id) else {
        fatal_unknown_kernel(id);
    };

    // SAFETY: The identifier slot is followed by one pointer per declared input.
    let inputs = unsafe { std::slice::from_raw_parts(ins.add(1), kernel.inputs().len()) };
    // SAFETY: Guaranteed by the caller.
    unsafe { dispatch(&kernel, out, inputs) };
}

/// Unmangled alias of [`cpu_callback`] for hosts that resolve it by name.
///
/// # Safety
///
/// Same contract as [`cpu_callback`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn morok_cpu_callback(out: *mut c_void, ins: *const *const c_void) {
    // SAFETY: Same contract.
    unsafe { cpu_callback(out, ins) }
}

#[cold]
fn fatal_unknown_kernel(id: KernelId) -> ! {
    tracing::error!(kernel.id = %id, "couldn't find kernel for custom call");
    eprintln!("fatal: couldn't find kernel with identifier {id}");
    std::process::abort()
}
