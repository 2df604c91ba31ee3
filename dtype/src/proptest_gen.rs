use crate::*;
use proptest::prelude::*;

#[rustfmt::skip]
impl ScalarKind {
    pub fn int_generator() -> impl Strategy<Value = Self> {
        prop_oneof![
            Just(Self::Int8), Just(Self::Int16), Just(Self::Int32), Just(Self::Int64),
            Just(Self::UInt8), Just(Self::UInt16), Just(Self::UInt32), Just(Self::UInt64)
        ]
    }

    pub fn float_generator() -> impl Strategy<Value = Self> {
        prop_oneof![
            Just(Self::Float16), Just(Self::BFloat16), Just(Self::Float32), Just(Self::Float64)
        ]
    }
}

impl TensorSpec {
    /// Scalar-typed specs of rank 0..=4 with small dimensions.
    pub fn generator() -> impl Strategy<Value = Self> {
        (any::<ScalarKind>(), prop::collection::vec(0usize..8, 0..=4))
            .prop_map(|(kind, dims)| TensorSpec::new(kind, dims))
    }

    /// Specs whose element type is an arbitrary identifier-like name.
    pub fn named_generator() -> impl Strategy<Value = Self> {
        ("[A-Za-z_][A-Za-z0-9_:]{0,12}", prop::collection::vec(0usize..8, 0..=4))
            .prop_map(|(name, dims)| TensorSpec::new(name, dims))
    }
}
