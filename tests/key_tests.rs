use pretty_assertions::{assert_eq, assert_ne};
use yazr::{ArgValue, CacheKey, CallArgs, Ignore};

fn derive(base: &str, args: &CallArgs, typed: bool, ignore: &Ignore) -> CacheKey {
    CacheKey::derive(base, args, typed, ignore)
}

#[test]
fn test_equal_calls_derive_equal_keys() {
    let a = CallArgs::new().arg(3).arg("x").kwarg("mode", "fast");
    let b = CallArgs::new().arg(3).arg("x").kwarg("mode", "fast");
    assert_eq!(
        derive("f", &a, false, &Ignore::new()),
        derive("f", &b, false, &Ignore::new())
    );
}

#[test]
fn test_differing_args_derive_distinct_keys() {
    let a = CallArgs::new().arg(3);
    let b = CallArgs::new().arg(4);
    assert_ne!(
        derive("f", &a, false, &Ignore::new()),
        derive("f", &b, false, &Ignore::new())
    );
}

#[test]
fn test_base_identity_distinguishes_callables() {
    let args = CallArgs::new().arg(3);
    assert_ne!(
        derive("f", &args, false, &Ignore::new()),
        derive("g", &args, false, &Ignore::new())
    );
}

#[test]
fn test_untyped_integral_float_collides_with_int() {
    let int_call = CallArgs::new().arg(3);
    let float_call = CallArgs::new().arg(3.0);
    assert_eq!(
        derive("f", &int_call, false, &Ignore::new()),
        derive("f", &float_call, false, &Ignore::new())
    );
}

#[test]
fn test_typed_distinguishes_int_from_float() {
    let int_call = CallArgs::new().arg(3);
    let float_call = CallArgs::new().arg(3.0);
    assert_ne!(
        derive("f", &int_call, true, &Ignore::new()),
        derive("f", &float_call, true, &Ignore::new())
    );
}

#[test]
fn test_kwargs_are_order_normalized() {
    let ab = CallArgs::new().kwarg("a", 1).kwarg("b", 2);
    let ba = CallArgs::new().kwarg("b", 2).kwarg("a", 1);
    assert_eq!(
        derive("f", &ab, false, &Ignore::new()),
        derive("f", &ba, false, &Ignore::new())
    );
}

#[test]
fn test_positional_and_keyword_boundary_is_unambiguous() {
    // A trailing positional string must not collide with a keyword pair
    let positional = CallArgs::new().arg("mode=fast");
    let keyword = CallArgs::new().kwarg("mode", "fast");
    assert_ne!(
        derive("f", &positional, false, &Ignore::new()),
        derive("f", &keyword, false, &Ignore::new())
    );
}

#[test]
fn test_ignored_keyword_does_not_affect_key() {
    let ignore = Ignore::new().name("verbose");
    let quiet = CallArgs::new().arg(1).kwarg("verbose", false);
    let loud = CallArgs::new().arg(1).kwarg("verbose", true);
    assert_eq!(
        derive("f", &quiet, false, &ignore),
        derive("f", &loud, false, &ignore)
    );
}

#[test]
fn test_ignored_position_does_not_affect_key() {
    let ignore = Ignore::new().position(1);
    let a = CallArgs::new().arg(1).arg("session-a");
    let b = CallArgs::new().arg(1).arg("session-b");
    assert_eq!(
        derive("f", &a, false, &ignore),
        derive("f", &b, false, &ignore)
    );
}

#[test]
fn test_store_key_is_deterministic() {
    let args = CallArgs::new().arg(3).kwarg("mode", "fast");
    let first = derive("f", &args, true, &Ignore::new()).store_key();
    let second = derive("f", &args, true, &Ignore::new()).store_key();
    assert_eq!(first, second);
}

#[test]
fn test_seq_and_null_arguments() {
    let seq = ArgValue::Seq(vec![ArgValue::Int(1), ArgValue::Str("two".into())]);
    let a = CallArgs::new().arg(seq.clone()).arg(ArgValue::Null);
    let b = CallArgs::new().arg(seq).arg(ArgValue::Null);
    assert_eq!(
        derive("f", &a, false, &Ignore::new()),
        derive("f", &b, false, &Ignore::new())
    );
}
