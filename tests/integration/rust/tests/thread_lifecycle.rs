//! Thread lifecycle across the process-wide registry
//!
//! Launches an entry-point thread that starts application threads, and checks
//! registration, retirement and the final registry state.

use std::sync::Arc;
use std::time::Duration;

use core_types::{Method, MethodFlags, ObjectRef, Value, VmResult};
use integration_tests::{init_tracing, Op, ToyInterpreter};
use vm_runtime::{
    registry, Interpreter, RuntimeConfig, Thread, ThreadEnv, ThreadRegistry, ThreadState,
};

fn worker_code() -> Vec<Op> {
    vec![
        Op::IConst(6),
        Op::Invoke("fact".to_string()),
        Op::Emit,
        Op::Return,
    ]
}

fn run_method() -> Arc<Method> {
    Arc::new(Method::new("run", "()V", MethodFlags::default(), 1, 4).unwrap())
}

/// Only this test touches the process-wide state
#[test]
fn test_global_vm_lifecycle() {
    init_tracing();
    RuntimeConfig::default()
        .with_thread_max_stack_size(64)
        .install()
        .unwrap();
    let registry = registry::initialize().unwrap();

    let mut toy = ToyInterpreter::new();
    toy.define("fact", "(I)I", 1, ToyInterpreter::factorial_code());
    let main = toy.define(
        "main",
        "([Ljava/lang/String;)V",
        1,
        vec![
            Op::IConst(5),
            Op::Invoke("fact".to_string()),
            Op::Emit,
            Op::Return,
        ],
    );
    let run = run_method();
    toy.register(Arc::clone(&run), worker_code());
    let toy = Arc::new(toy);

    let worker_env = ThreadEnv::from_global(Arc::clone(&toy) as Arc<dyn Interpreter>).unwrap();
    let launcher = {
        let toy = Arc::clone(&toy);
        move |thread: &mut Thread| -> VmResult<Option<Value>> {
            // Only the entry frame starts workers
            if thread.frames().len() == 1 {
                for _ in 0..4 {
                    let obj = Value::Instance(ObjectRef::new("java/lang/Thread"));
                    Thread::java(Arc::clone(&run), obj.clone(), &worker_env).create(obj)?;
                }
            }
            toy.interp(thread)
        }
    };
    let main_env = ThreadEnv::from_global(Arc::new(launcher)).unwrap();

    let handle = Thread::main(main, vec![Value::Null], &main_env)
        .create(Value::Null)
        .unwrap();

    assert_eq!(registry.state_of(&handle), ThreadState::Died);
    let mut output = toy.output();
    output.sort_unstable();
    assert_eq!(output, vec![120, 720, 720, 720, 720]);

    let snapshot = registry.snapshot();
    assert_eq!(snapshot.app_thread_count, 0);
    assert!(snapshot.states.is_empty());
    assert_eq!(registry.thread_count(), 4);

    let removed = registry::shutdown().unwrap();
    assert!(Arc::ptr_eq(&removed, &registry));
}

#[test]
fn test_worker_threads_with_private_registry() {
    init_tracing();
    let mut toy = ToyInterpreter::new();
    toy.define("fact", "(I)I", 1, ToyInterpreter::factorial_code());
    let run = run_method();
    toy.register(Arc::clone(&run), worker_code());
    let toy = Arc::new(toy);

    let registry = Arc::new(ThreadRegistry::new());
    let env = ThreadEnv::new(
        Arc::clone(&registry),
        Arc::clone(&toy) as Arc<dyn Interpreter>,
        &RuntimeConfig::default().with_thread_max_stack_size(16),
    );

    let handles: Vec<_> = (0..6)
        .map(|_| {
            let obj = Value::Instance(ObjectRef::new("java/lang/Thread"));
            Thread::java(Arc::clone(&run), obj.clone(), &env)
                .create(obj)
                .unwrap()
        })
        .collect();

    assert!(registry.wait_for_app_threads_timeout(Duration::from_secs(10)));
    assert_eq!(toy.output(), vec![720; 6]);
    for handle in &handles {
        assert_eq!(registry.state_of(handle), ThreadState::Died);
        assert!(handle.execution_handle().is_some());
        assert!(matches!(handle.vm_thread_object(), Some(Value::Instance(_))));
    }
}
