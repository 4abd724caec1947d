use atomics::{
    ArrayBuffer, ElementKind, TypedArray, Value, atomics_exchange, atomics_load, atomics_store,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

fn shared_view(kind: ElementKind, length: usize) -> Value {
    let buffer = ArrayBuffer::new_shared(length * kind.element_size()).unwrap();
    Value::from(TypedArray::over(buffer, kind).unwrap())
}

fn as_i64(value: Value) -> i64 {
    value.as_number().expect("atomics always return numbers") as i64
}

/// Every value written by an exchange is observed exactly once: either by a
/// later exchange or as the final cell content.
#[test]
fn test_concurrent_exchanges_conserve_tokens() {
    const AGENTS: i32 = 8;
    const ROUNDS: i32 = 5_000;

    for kind in [ElementKind::Int8, ElementKind::Uint16, ElementKind::Int32] {
        let view = shared_view(kind, 1);
        let index = Value::SmallInt(0);

        let handles: Vec<_> = (0..AGENTS)
            .map(|agent| {
                let view = view.clone();
                let index = index.clone();
                thread::spawn(move || {
                    let token = Value::SmallInt(agent + 1);
                    let mut seen = 0i64;
                    for _ in 0..ROUNDS {
                        seen += as_i64(atomics_exchange(&view, &index, &token).unwrap());
                    }
                    seen
                })
            })
            .collect();

        let seen: i64 = handles
            .into_iter()
            .map(|h| h.join().expect("Agent thread panicked"))
            .sum();
        let written: i64 = (1..=AGENTS as i64).map(|t| t * ROUNDS as i64).sum();
        let remaining = as_i64(atomics_load(&view, &index).unwrap());

        assert_eq!(
            written,
            seen + remaining,
            "{kind:?}: exchanged values must be conserved"
        );
    }
}

/// Readers racing a writer only ever observe whole values.
#[test]
fn test_loads_never_observe_torn_values() {
    const WRITES: usize = 20_000;

    let patterns: [(ElementKind, f64); 3] = [
        (ElementKind::Uint32, 4_294_967_295.0),
        (ElementKind::Uint16, 65_535.0),
        (ElementKind::Int32, -1.0),
    ];

    for (kind, all_ones) in patterns {
        let view = shared_view(kind, 4);
        let index = Value::SmallInt(2);
        let done = Arc::new(AtomicBool::new(false));

        let readers: Vec<_> = (0..3)
            .map(|_| {
                let view = view.clone();
                let index = index.clone();
                let done = Arc::clone(&done);
                thread::spawn(move || {
                    let mut observations = 0usize;
                    while !done.load(Ordering::Acquire) {
                        let value = atomics_load(&view, &index).unwrap().as_number().unwrap();
                        assert!(
                            value == 0.0 || value == all_ones,
                            "{kind:?}: torn read {value}"
                        );
                        observations += 1;
                    }
                    observations
                })
            })
            .collect();

        let all_ones_value = Value::from_f64(all_ones);
        let zero = Value::SmallInt(0);
        for i in 0..WRITES {
            let operand = if i % 2 == 0 { &all_ones_value } else { &zero };
            if i % 3 == 0 {
                atomics_exchange(&view, &index, operand).unwrap();
            } else {
                atomics_store(&view, &index, operand).unwrap();
            }
        }
        done.store(true, Ordering::Release);

        for reader in readers {
            reader.join().expect("Reader thread panicked");
        }
    }
}

/// Agents working on disjoint cells of one buffer never disturb each other.
#[test]
fn test_neighbouring_cells_are_independent() {
    const AGENTS: i32 = 4;
    const ROUNDS: i32 = 2_000;

    let view = shared_view(ElementKind::Int8, AGENTS as usize);

    let handles: Vec<_> = (0..AGENTS)
        .map(|agent| {
            let view = view.clone();
            thread::spawn(move || {
                let index = Value::SmallInt(agent);
                for round in 0..ROUNDS {
                    let value = Value::SmallInt(round % 100);
                    atomics_store(&view, &index, &value).unwrap();
                    assert_eq!(atomics_load(&view, &index).unwrap(), value);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("Agent thread panicked");
    }

    for agent in 0..AGENTS {
        assert_eq!(
            atomics_load(&view, &Value::SmallInt(agent)).unwrap(),
            Value::SmallInt((ROUNDS - 1) % 100)
        );
    }
}
