//! Kernel sources and shortcuts shared by the unit tests.

use std::ffi::c_void;

use morok_call_dtype::{ScalarKind, TensorSpec};

use crate::{KernelId, create_kernel};

pub fn f32_spec(dims: &[usize]) -> TensorSpec {
    TensorSpec::scalar(ScalarKind::Float32, dims)
}

pub fn i64_spec(dims: &[usize]) -> TensorSpec {
    TensorSpec::scalar(ScalarKind::Int64, dims)
}

/// `out = in` over `n` floats.
pub fn copy_source(n: usize) -> String {
    format!(
        "void myfn(morok::tensor<float, {n}>& out, const morok::tensor<float, {n}>& in) {{\n\
         \x20 for (int i = 0; i < {n}; ++i) out.data()[i] = in.data()[i];\n\
         }}\n"
    )
}

/// Writes `value` into a single int64 output; no inputs.
pub fn constant_source(value: i64) -> String {
    format!("void myfn(morok::tensor<int64_t, 1>& out) {{ out.data()[0] = {value}; }}\n")
}

/// Increments a single int64 output; counts how often the kernel ran.
pub const COUNTER_SOURCE: &str = "void myfn(morok::tensor<int64_t, 1>& out) { out.data()[0] += 1; }\n";

/// Two outputs over four floats: `doubled = 2 * in`, `shifted = in + 1`.
pub const TWO_OUTPUT_SOURCE: &str = r#"
void myfn(morok::tensor<float, 4>& doubled, morok::tensor<float, 4>& shifted, const morok::tensor<float, 4>& in) {
  for (int i = 0; i < 4; ++i) {
    doubled.data()[i] = in.data()[i] * 2.0f;
    shifted.data()[i] = in.data()[i] + 1.0f;
  }
}
"#;

pub fn create(source: &str, outputs: &[TensorSpec], inputs: &[TensorSpec]) -> KernelId {
    create_kernel(source, outputs, inputs, &[]).expect("kernel should compile")
}

/// Build the `ins` array of the custom-call convention.
pub fn call_inputs(id: &i64, inputs: &[*const c_void]) -> Vec<*const c_void> {
    let mut ins = Vec::with_capacity(inputs.len() + 1);
    ins.push(id as *const i64 as *const c_void);
    ins.extend_from_slice(inputs);
    ins
}
