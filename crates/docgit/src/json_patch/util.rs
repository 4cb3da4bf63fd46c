//! Helpers built on top of the operation model.

use docgit_json_pointer::Pointer;
use serde_json::Value;

use super::types::Op;

/// Builds `test` operations asserting the current value at every location a
/// destructive operation in `ops` is about to overwrite or drop.
///
/// Prepending the result to `ops` turns the patch into an optimistic one: it
/// fails with a test assertion instead of clobbering a value that changed
/// underneath the caller. Locations that do not resolve in `input` are
/// skipped, as are duplicates.
///
/// # Example
///
/// ```
/// use docgit::json_patch::{create_tests, Op};
/// use docgit_json_pointer::Pointer;
/// use serde_json::json;
///
/// let input = json!({"a": 1, "b": 2});
/// let ops = [Op::Remove { path: Pointer::parse("/a").unwrap() }];
/// let tests = create_tests(&input, &ops);
/// assert_eq!(
///     tests,
///     vec![Op::Test { path: Pointer::parse("/a").unwrap(), value: json!(1) }]
/// );
/// ```
pub fn create_tests(input: &Value, ops: &[Op]) -> Vec<Op> {
    let mut seen: Vec<&Pointer> = Vec::new();
    let mut tests = Vec::new();
    for op in ops.iter().filter(|op| op.is_destructive()) {
        let locations = op.from().into_iter().chain(std::iter::once(op.path()));
        for location in locations {
            if seen.contains(&location) {
                continue;
            }
            seen.push(location);
            if let Some(current) = location.resolve(input) {
                tests.push(Op::Test {
                    path: location.clone(),
                    value: current.clone(),
                });
            }
        }
    }
    tests
}

// ── Tests ─────────────────────────────────────────────────────────────────
