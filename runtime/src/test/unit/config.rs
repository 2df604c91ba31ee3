use inkwell::OptimizationLevel;
use test_case::test_case;

use crate::config::JitConfig;

#[test]
fn test_builder_defaults() {
    let config = JitConfig::builder().build();
    assert_eq!(config.clang, std::path::PathBuf::from("clang"));
    assert_eq!(config.opt_level, 2);
    assert!(config.extra_args.is_empty());
    assert_eq!(config, JitConfig::default());
}

#[test]
fn test_builder_overrides() {
    let config =
        JitConfig::builder().clang("/opt/llvm/bin/clang").opt_level(0).extra_args(vec!["-DFOO=1".into()]).build();
    assert_eq!(config.clang, std::path::PathBuf::from("/opt/llvm/bin/clang"));
    assert_eq!(config.opt_flag(), "-O0");
    assert_eq!(config.extra_args, vec!["-DFOO=1".to_string()]);
}

#[test_case(0, OptimizationLevel::None; "o0")]
#[test_case(1, OptimizationLevel::Less; "o1")]
#[test_case(2, OptimizationLevel::Default; "o2")]
#[test_case(3, OptimizationLevel::Aggressive; "o3")]
fn test_optimization_level(level: u8, expected: OptimizationLevel) {
    let config = JitConfig::builder().opt_level(level).build();
    assert_eq!(config.optimization_level(), expected);
    assert_eq!(config.opt_flag(), format!("-O{level}"));
}

#[test]
fn test_opt_level_is_clamped() {
    let config = JitConfig::builder().opt_level(9).build();
    assert_eq!(config.opt_level, 3);
    assert_eq!(config.opt_flag(), "-O3");
}
