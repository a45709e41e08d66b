//! Unit tests for method descriptors

use core_types::{Method, MethodFlags, ValueType, VmError};

fn flags(is_static: bool, is_native: bool) -> MethodFlags {
    MethodFlags {
        is_static,
        is_native,
    }
}

#[test]
fn test_thread_run_signature() {
    let run = Method::new("run", "()V", flags(false, false), 1, 2).unwrap();
    assert_eq!(run.name(), "run");
    assert_eq!(run.descriptor(), "()V");
    assert_eq!(run.arg_value_types(), &[ValueType::Object]);
    assert_eq!(run.return_type(), ValueType::Void);
    assert!(!run.is_static());
}

#[test]
fn test_main_signature() {
    let main = Method::new("main", "([Ljava/lang/String;)V", flags(true, false), 1, 3).unwrap();
    assert_eq!(main.arg_value_types(), &[ValueType::Array]);
    assert_eq!(main.max_locals(), 1);
    assert_eq!(main.max_stack(), 3);
}

#[test]
fn test_sub_word_kinds_are_kept_distinct() {
    let m = Method::new("m", "(BCSZ)V", flags(true, false), 4, 0).unwrap();
    assert_eq!(
        m.arg_value_types(),
        &[ValueType::Byte, ValueType::Char, ValueType::Short, ValueType::Boolean]
    );
}

#[test]
fn test_arg_value_type_lookup() {
    let m = Method::new("m", "(JF)D", flags(false, false), 3, 4).unwrap();
    assert_eq!(m.arg_value_type(0), Some(ValueType::Object));
    assert_eq!(m.arg_value_type(1), Some(ValueType::Long));
    assert_eq!(m.arg_value_type(2), Some(ValueType::Float));
    assert_eq!(m.arg_value_type(3), None);
    assert_eq!(m.return_type(), ValueType::Double);
}

#[test]
fn test_native_flag() {
    let m = Method::new("currentTimeMillis", "()J", flags(true, true), 0, 0).unwrap();
    assert!(m.is_native());
    assert!(m.arg_value_types().is_empty());
}

#[test]
fn test_rejects_missing_return_type() {
    let err = Method::new("m", "(I)", flags(true, false), 1, 0).unwrap_err();
    assert!(matches!(err, VmError::InvalidDescriptor { .. }));
}
