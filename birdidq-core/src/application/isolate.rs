// birdidq-core/src/application/isolate.rs

use std::panic::{self, AssertUnwindSafe};

/// Runs `f` on every item, in order. A failing item, including one that panics,
/// never stops the items after it.
pub fn isolate_each<T, R, E, F, P>(items: &[T], mut f: F, on_panic: P) -> Vec<Result<R, E>>
where
    F: FnMut(&T) -> Result<R, E>,
    P: Fn(String) -> E,
{
    items
        .iter()
        .map(|item| {
            panic::catch_unwind(AssertUnwindSafe(|| f(item))).unwrap_or_else(|payload| {
                let message = payload
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "panic".to_string());
                Err(on_panic(message))
            })
        })
        .collect()
}
