//! Compiler frontend tests. These need `clang` (or `MOROK_CLANG`) on the host.

use inkwell::context::Context;
use morok_call_dtype::TensorSpec;

use crate::Error;
use crate::compiler::{Language, compile};
use crate::config::JitConfig;
use crate::synth::synthesize;
use crate::test::helpers::{copy_source, f32_spec};

#[test]
fn test_compile_c_function() {
    let context = Context::create();
    let src = r#"
void add_kernel(float* out, const float* a, const float* b) {
    out[0] = a[0] + b[0];
}
"#;
    let compiled = compile(src, Language::C, &[], &context, &JitConfig::from_env()).unwrap();
    assert!(compiled.module().get_function("add_kernel").is_some());
    assert!(!compiled.target().triple.is_empty());
    assert!(!compiled.target().data_layout.is_empty());
}

#[test]
fn test_compile_synthesized_unit_exports_entry() {
    let context = Context::create();
    let unit = synthesize(&copy_source(4), &[f32_spec(&[4])], &[f32_spec(&[4])]);
    let compiled = compile(&unit, Language::Cpp, &[], &context, &JitConfig::from_env()).unwrap();
    assert!(compiled.module().get_function("entry").is_some());
}

#[test]
fn test_tensor_header_supports_scalars_and_nesting() {
    let source = r#"
void myfn(morok::tensor<double>& total, const morok::tensor<double, 2, 3>& m) {
  double s = 0;
  for (int i = 0; i < 2; ++i)
    for (int j = 0; j < 3; ++j)
      s += m[i][j];
  total = s;
}
"#;
    let context = Context::create();
    let outputs = [TensorSpec::from(("double", []))];
    let inputs = [TensorSpec::from(("double", [2, 3]))];
    let unit = synthesize(source, &outputs, &inputs);
    assert!(compile(&unit, Language::Cpp, &[], &context, &JitConfig::from_env()).is_ok());
}

#[test]
fn test_kernels_may_use_exceptions() {
    let source = r#"
void myfn(morok::tensor<int32_t, 1>& out) {
  try {
    throw 7;
  } catch (int code) {
    out.data()[0] = code;
  }
}
"#;
    let context = Context::create();
    let unit = synthesize(source, &[TensorSpec::from(("int32_t", [1]))], &[]);
    let compiled = compile(&unit, Language::Cpp, &[], &context, &JitConfig::from_env()).unwrap();
    assert!(compiled.module().get_function("entry").is_some());
}

#[test]
fn test_caller_args_reach_the_compiler() {
    let context = Context::create();
    let src = "int value() { return SCALE * 2; }";
    let args = vec!["-DSCALE=21".to_string()];
    let compiled = compile(src, Language::C, &args, &context, &JitConfig::from_env()).unwrap();
    assert!(compiled.module().get_function("value").is_some());

    let err = compile(src, Language::C, &[], &context, &JitConfig::from_env()).err();
    assert!(matches!(err, Some(Error::Compilation { .. })), "{err:?}");
}

#[test]
fn test_syntax_error_is_compilation_failure() {
    let context = Context::create();
    let err = compile("this is not C++", Language::Cpp, &[], &context, &JitConfig::from_env()).err().unwrap();
    assert!(matches!(err, Error::Compilation { .. }));
    assert!(err.to_string().starts_with("compilation failed"), "{err}");
}

#[test]
fn test_missing_compiler_is_reported() {
    let context = Context::create();
    let config = JitConfig::builder().clang("/nonexistent/morok/clang").build();
    let err = compile("int x;", Language::C, &[], &context, &config).err().unwrap();
    assert!(matches!(err, Error::CompilerSpawn { .. }), "{err:?}");
    assert!(err.to_string().contains("/nonexistent/morok/clang"));
}
