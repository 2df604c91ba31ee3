//! C++ translation unit synthesis for custom-call kernels.
//!
//! Wraps user kernel source with an exported entry point that turns raw
//! pointer arrays into shaped tensor views and forwards them to `myfn`.
//!
//! # Entry Signature
//!
//! ```c
//! extern "C" void entry(void** outs, void** ins);
//! ```
//! - `outs[i]` = i-th declared output buffer
//! - `ins[i]` = i-th declared input buffer
//!
//! `myfn` receives every output (mutable) followed by every input (const),
//! each in declaration order.

use morok_call_dtype::TensorSpec;

/// Symbol exported by every synthesized translation unit.
pub const ENTRY_SYMBOL: &str = "entry";

/// Name of the user function the entry point calls.
pub const KERNEL_FN: &str = "myfn";

/// Include name of the bundled tensor view header.
pub const TENSOR_HEADER_NAME: &str = "morok_tensor";

/// Contents of the bundled tensor view header.
pub const TENSOR_HEADER: &str = include_str!("../include/morok_tensor");

/// Render the tensor view type for one buffer, e.g. `const morok::tensor<float, 2, 3>`.
pub fn view_type(spec: &TensorSpec, is_const: bool) -> String {
    let mut ty = String::new();
    if is_const {
        ty.push_str("const ");
    }
    ty.push_str("morok::tensor<");
    ty.push_str(spec.element().cpp_name());
    for dim in spec.dims() {
        ty.push_str(&format!(", {dim}"));
    }
    ty.push('>');
    ty
}

/// Build the full translation unit around `source`.
///
/// Type names are inserted as given; nothing here validates them.
pub fn synthesize(source: &str, outputs: &[TensorSpec], inputs: &[TensorSpec]) -> String {
    let mut code_lines: Vec<String> = Vec::new();

    code_lines.push("#include <cstdint>".to_string());
    code_lines.push(format!("#include <{TENSOR_HEADER_NAME}>"));
    code_lines.push(source.to_string());

    code_lines.push(format!("extern \"C\" void {ENTRY_SYMBOL}(void** __restrict__ outs, void** __restrict__ ins) {{"));

    let mut args: Vec<String> = Vec::with_capacity(outputs.len() + inputs.len());

    for (i, spec) in outputs.iter().enumerate() {
        let ty = view_type(spec, false);
        code_lines.push(format!("  {ty}& out_{i} = *({ty}*)outs[{i}];"));
        args.push(format!("out_{i}"));
    }

    for (i, spec) in inputs.iter().enumerate() {
        let ty = view_type(spec, true);
        code_lines.push(format!("  {ty}& in_{i} = *({ty}*)ins[{i}];"));
        args.push(format!("in_{i}"));
    }

    code_lines.push(format!("  {KERNEL_FN}({});", args.join(", ")));
    code_lines.push("}".to_string());

    let mut unit = code_lines.join("\n");
    unit.push('\n');
    unit
}
