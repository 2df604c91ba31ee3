use morok_call_dtype::TensorSpec;
use proptest::prelude::*;
use test_case::test_case;

use crate::synth::{ENTRY_SYMBOL, KERNEL_FN, TENSOR_HEADER, synthesize, view_type};
use crate::test::helpers::{f32_spec, i64_spec};

#[test_case("float", &[], false, "morok::tensor<float>"; "rank0")]
#[test_case("float", &[4], false, "morok::tensor<float, 4>"; "rank1")]
#[test_case("double", &[2, 3], true, "const morok::tensor<double, 2, 3>"; "const_rank2")]
#[test_case("int64_t", &[0], true, "const morok::tensor<int64_t, 0>"; "zero_dim")]
#[test_case("my::type", &[1, 1, 1], false, "morok::tensor<my::type, 1, 1, 1>"; "named_type")]
fn test_view_type(element: &str, dims: &[usize], is_const: bool, expected: &str) {
    assert_eq!(view_type(&TensorSpec::from((element, dims)), is_const), expected);
}

#[test]
fn test_single_output_single_input() {
    let unit = synthesize("void myfn(int);", &[f32_spec(&[4])], &[f32_spec(&[4])]);

    assert!(unit.starts_with("#include <cstdint>\n#include <morok_tensor>\n"), "{unit}");
    assert!(unit.contains("extern \"C\" void entry(void** __restrict__ outs, void** __restrict__ ins) {"), "{unit}");
    assert!(unit.contains("  morok::tensor<float, 4>& out_0 = *(morok::tensor<float, 4>*)outs[0];"), "{unit}");
    assert!(unit.contains("  const morok::tensor<float, 4>& in_0 = *(const morok::tensor<float, 4>*)ins[0];"), "{unit}");
    assert!(unit.contains("  myfn(out_0, in_0);"), "{unit}");
    assert!(unit.ends_with("}\n"));
}

#[test]
fn test_outputs_precede_inputs_in_declaration_order() {
    let outputs = [f32_spec(&[2]), i64_spec(&[3])];
    let inputs = [f32_spec(&[5]), f32_spec(&[6]), i64_spec(&[])];
    let unit = synthesize("", &outputs, &inputs);

    let position = |needle: &str| unit.find(needle).unwrap_or_else(|| panic!("missing {needle} in {unit}"));
    let order = [
        position("morok::tensor<float, 2>& out_0"),
        position("morok::tensor<int64_t, 3>& out_1"),
        position("const morok::tensor<float, 5>& in_0"),
        position("const morok::tensor<float, 6>& in_1"),
        position("const morok::tensor<int64_t>& in_2"),
    ];
    assert!(order.windows(2).all(|w| w[0] < w[1]), "{unit}");
    assert!(unit.contains("  myfn(out_0, out_1, in_0, in_1, in_2);"), "{unit}");
}

#[test]
fn test_empty_outputs_and_inputs() {
    let unit = synthesize("void myfn() {}", &[], &[]);
    assert!(!unit.contains("outs["), "{unit}");
    assert!(!unit.contains("ins["), "{unit}");
    assert!(unit.contains("  myfn();"), "{unit}");
}

#[test]
fn test_zero_inputs_only_outputs() {
    let unit = synthesize("", &[i64_spec(&[1])], &[]);
    assert!(unit.contains("outs[0]"));
    assert!(!unit.contains("ins["));
    assert!(unit.contains("  myfn(out_0);"));
}

#[test]
fn test_source_and_type_names_are_verbatim() {
    let source = "template <class T> void myfn(T& out) { /* keep me */ }";
    let outputs = [TensorSpec::from(("not a type!", [3]))];
    let unit = synthesize(source, &outputs, &[]);

    assert_eq!(unit.matches(source).count(), 1);
    assert!(unit.contains("morok::tensor<not a type!, 3>"), "{unit}");
}

#[test]
fn test_fixed_names() {
    assert_eq!(ENTRY_SYMBOL, "entry");
    assert_eq!(KERNEL_FN, "myfn");
    assert!(TENSOR_HEADER.contains("namespace morok"));
    assert!(TENSOR_HEADER.contains("struct tensor<T, N, Rest...>"));
}

proptest! {
    #[test]
    fn slot_counts_match_specs(
        outputs in prop::collection::vec(TensorSpec::generator(), 0..4),
        inputs in prop::collection::vec(TensorSpec::generator(), 0..4),
    ) {
        let unit = synthesize("", &outputs, &inputs);
        prop_assert_eq!(unit.matches("*)outs[").count(), outputs.len());
        prop_assert_eq!(unit.matches("*)ins[").count(), inputs.len());
        prop_assert_eq!(unit.matches("myfn(").count(), 1);
    }

    #[test]
    fn every_spec_type_is_rendered(spec in TensorSpec::named_generator()) {
        let unit = synthesize("", &[spec.clone()], &[spec.clone()]);
        let mutable_view = format!("{}& out_0", view_type(&spec, false));
        let const_view = format!("{}& in_0", view_type(&spec, true));
        prop_assert!(unit.contains(&mutable_view));
        prop_assert!(unit.contains(&const_view));
    }
}
