//! Property-based tests for specialization and token synthesis.
//!
//! Generates random flat layouts (primitive or parametric elements, literal or
//! parametric dims) and checks:
//! 1. Token strings are the in-order concatenation of per-field tokens
//! 2. Specializing with no bindings leaves free parameters unchanged
//! 3. Binding in two steps equals binding all at once
//! 4. Unknown names and non-integer lengths are always binding errors

use packlayout::primitive::{self, PrimitiveType};
use packlayout::{Arg, Bindings, ErrorKind, Field, FieldType, StructDef, TypeParam};
use proptest::prelude::*;
use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Debug, Clone)]
enum Elem {
    Prim(PrimitiveType),
    Param(&'static str),
}

#[derive(Debug, Clone)]
enum Dim {
    Lit(u64),
    Param(&'static str),
}

const TYPE_PARAMS: [&str; 2] = ["T", "U"];
const LEN_PARAMS: [&str; 2] = ["N", "M"];

fn primitive_strategy() -> impl Strategy<Value = PrimitiveType> {
    let all: Vec<PrimitiveType> = primitive::all().collect();
    prop::sample::select(all)
}

fn elem_strategy() -> impl Strategy<Value = Elem> {
    prop_oneof![
        3 => primitive_strategy().prop_map(Elem::Prim),
        1 => prop::sample::select(TYPE_PARAMS.to_vec()).prop_map(Elem::Param),
    ]
}

fn dim_strategy() -> impl Strategy<Value = Dim> {
    prop_oneof![
        3 => (1u64..6).prop_map(Dim::Lit),
        1 => prop::sample::select(LEN_PARAMS.to_vec()).prop_map(Dim::Param),
    ]
}

fn fields_strategy() -> impl Strategy<Value = Vec<(Elem, Vec<Dim>)>> {
    prop::collection::vec((elem_strategy(), prop::collection::vec(dim_strategy(), 0..3)), 0..6)
}

fn build(fields: &[(Elem, Vec<Dim>)]) -> Arc<StructDef> {
    let fields = fields
        .iter()
        .enumerate()
        .map(|(i, (elem, dims))| {
            let mut ty = match elem {
                Elem::Prim(p) => FieldType::new(*p),
                Elem::Param(name) => FieldType::new(TypeParam::new(*name)),
            };
            for d in dims {
                let arg = match d {
                    Dim::Lit(n) => Arg::Length(*n),
                    Dim::Param(name) => Arg::from(TypeParam::new(*name)),
                };
                ty = ty.dim(arg).expect("valid dim");
            }
            Field::new(format!("f{}", i), ty)
        })
        .collect();
    StructDef::define("Generated", fields).expect("define")
}

/// Binds every free parameter: type parameters to `int32`, lengths to 3.
fn full_bindings(def: &StructDef) -> BTreeMap<String, Arg> {
    def.free_params()
        .iter()
        .map(|p| {
            let arg = if TYPE_PARAMS.contains(&p.as_str()) {
                Arg::from(primitive::INT32)
            } else {
                Arg::Length(3)
            };
            (p.clone(), arg)
        })
        .collect()
}

proptest! {
    #[test]
    fn token_is_concatenation_of_field_tokens(fields in fields_strategy()) {
        let def = build(&fields);
        let resolved = def.specialize(Bindings::Named(full_bindings(&def))).expect("specialize");
        prop_assert!(resolved.is_resolved());

        let mut expected = String::new();
        for f in resolved.fields() {
            let single = StructDef::define("One", vec![f.clone()]).expect("define");
            expected.push_str(single.token_string().expect("resolved"));
        }
        prop_assert_eq!(resolved.token_string(), Some(expected.as_str()));
    }

    #[test]
    fn empty_bindings_keep_free_params(fields in fields_strategy()) {
        let def = build(&fields);
        let same = def.specialize(Bindings::new()).expect("no-op");
        prop_assert_eq!(same.free_params(), def.free_params());
        prop_assert_eq!(same.token_string(), def.token_string());
    }

    #[test]
    fn two_step_equals_one_step(fields in fields_strategy()) {
        let def = build(&fields);
        let all = full_bindings(&def);
        let (first, second): (BTreeMap<_, _>, BTreeMap<_, _>) =
            all.clone().into_iter().partition(|(k, _)| TYPE_PARAMS.contains(&k.as_str()));

        let one = def.specialize(Bindings::Named(all)).expect("one step");
        let two = def
            .specialize(Bindings::Named(first))
            .and_then(|s| s.specialize(Bindings::Named(second)))
            .expect("two steps");
        prop_assert_eq!(one.token_string(), two.token_string());
        prop_assert_eq!(one.byte_size(), two.byte_size());
    }

    #[test]
    fn forwarding_through_nesting_matches_direct(fields in fields_strategy()) {
        let def = build(&fields);
        let direct = def.specialize(Bindings::Named(full_bindings(&def))).expect("direct");

        // forward each parameter under a renamed outer parameter, then bind the outer
        let renamed: BTreeMap<String, Arg> = def
            .free_params()
            .iter()
            .map(|p| (p.clone(), Arg::from(TypeParam::new(format!("Outer{}", p)))))
            .collect();
        let inner = def.specialize(Bindings::Named(renamed)).expect("forward");
        let outer = StructDef::define("Outer", vec![Field::new("inner", inner)]).expect("nest");
        let outer_bindings: BTreeMap<String, Arg> = full_bindings(&def)
            .into_iter()
            .map(|(k, v)| (format!("Outer{}", k), v))
            .collect();
        let nested = outer.specialize(Bindings::Named(outer_bindings)).expect("bind outer");
        prop_assert_eq!(nested.token_string(), direct.token_string());
    }

    #[test]
    fn unknown_name_always_rejected(fields in fields_strategy(), bogus in "[a-z]{3,8}") {
        let def = build(&fields);
        let mut map = full_bindings(&def);
        map.insert(bogus, Arg::Length(1));
        let err = def.specialize(Bindings::Named(map)).unwrap_err();
        prop_assert_eq!(err.kind(), ErrorKind::Binding);
    }

    #[test]
    fn type_bound_to_length_always_rejected(fields in fields_strategy(), p in primitive_strategy()) {
        let def = build(&fields);
        let mut map = full_bindings(&def);
        let length_params: Vec<String> = map
            .keys()
            .filter(|k| LEN_PARAMS.contains(&k.as_str()))
            .cloned()
            .collect();
        prop_assume!(!length_params.is_empty());
        map.insert(length_params[0].clone(), Arg::from(p));
        let err = def.specialize(Bindings::Named(map)).unwrap_err();
        prop_assert_eq!(err.kind(), ErrorKind::Binding);
    }

    #[test]
    fn swapping_distinct_fields_changes_token(a in primitive_strategy(), b in primitive_strategy()) {
        prop_assume!(a != b);
        let ab = StructDef::define("AB", vec![Field::new("x", a), Field::new("y", b)]).expect("define");
        let ba = StructDef::define("BA", vec![Field::new("x", b), Field::new("y", a)]).expect("define");
        prop_assert_ne!(ab.token_string(), ba.token_string());
    }
}
