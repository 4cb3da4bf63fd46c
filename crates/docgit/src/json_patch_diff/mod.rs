//! JSON Patch diff: generate a JSON Patch from two document values.
//!
//! The produced operations are meant to be applied strictly left to right.
//! Arrays are aligned with a longest-common-subsequence pass so unchanged
//! elements are never touched; every other pair of values is either recursed
//! into (same container kind) or replaced wholesale.
//!
//! A root of `null` stands for an absent tree, so diffing from or to
//! "nothing" collapses to a single root `replace`.

use docgit_json_pointer::{Pointer, APPEND_MARKER};
use serde_json::{Map, Value};

use crate::json_patch::hooks::{deep_clone, values_equal, AtomicLeaves, ValueHooks};
use crate::json_patch::types::Op;

// ── Public API ────────────────────────────────────────────────────────────

/// Generate a JSON Patch (list of operations) that transforms `input` into
/// `output`.
///
/// # Example
///
/// ```
/// use docgit::json_patch_diff::diff;
/// use serde_json::json;
///
/// let ops = diff(&json!({"foo": ["bar", "baz"]}), &json!({"foo": ["bar", "qux", "baz"]}));
/// assert_eq!(ops.len(), 1);
/// assert_eq!(ops[0].op_name(), "add");
/// assert_eq!(ops[0].path().to_string(), "/foo/1");
/// ```
pub fn diff(input: &Value, output: &Value) -> Vec<Op> {
    diff_with(input, output, &AtomicLeaves)
}

/// [`diff`] that offers every node to `hooks` before the structural rules.
pub fn diff_with(input: &Value, output: &Value, hooks: &dyn ValueHooks) -> Vec<Op> {
    let mut ops = Vec::new();
    diff_node(&mut ops, &Pointer::root(), input, output, hooks);
    ops
}

// ── Core recursive differ ─────────────────────────────────────────────────

fn diff_node(
    ops: &mut Vec<Op>,
    ptr: &Pointer,
    input: &Value,
    output: &Value,
    hooks: &dyn ValueHooks,
) {
    if let Some(custom) = hooks.diff(input, output, ptr) {
        ops.extend(custom);
        return;
    }
    // A hook that only answers equality makes the pair atomic.
    if let Some(equal) = hooks.equals(input, output) {
        if !equal {
            replace(ops, ptr, output, hooks);
        }
        return;
    }
    match (input, output) {
        (Value::Object(a), Value::Object(b)) => diff_obj(ops, ptr, a, b, hooks),
        (Value::Array(a), Value::Array(b)) => diff_arr(ops, ptr, a, b, hooks),
        _ if input == output => {}
        _ => replace(ops, ptr, output, hooks),
    }
}

fn replace(ops: &mut Vec<Op>, ptr: &Pointer, output: &Value, hooks: &dyn ValueHooks) {
    ops.push(Op::Replace {
        path: ptr.clone(),
        value: deep_clone(output, hooks),
    });
}

fn diff_obj(
    ops: &mut Vec<Op>,
    ptr: &Pointer,
    input: &Map<String, Value>,
    output: &Map<String, Value>,
    hooks: &dyn ValueHooks,
) {
    for key in input.keys() {
        if !output.contains_key(key) {
            ops.push(Op::Remove {
                path: ptr.child(key.as_str()),
            });
        }
    }
    for (key, out_val) in output {
        let path = ptr.child(key.as_str());
        match input.get(key) {
            None => ops.push(Op::Add {
                path,
                value: deep_clone(out_val, hooks),
            }),
            Some(in_val) => diff_node(ops, &path, in_val, out_val, hooks),
        }
    }
}

/// Emits, in order:
/// 1. recursions into elements that kept their slot but changed value,
///    addressed by input index;
/// 2. removals of input-only elements, highest index first;
/// 3. additions of output-only elements at their final index, lowest first,
///    using the append marker when the index equals the current length.
fn diff_arr(
    ops: &mut Vec<Op>,
    ptr: &Pointer,
    input: &[Value],
    output: &[Value],
    hooks: &dyn ValueHooks,
) {
    let (n, m) = (input.len(), output.len());

    let mut head = 0;
    while head < n && head < m && values_equal(&input[head], &output[head], hooks) {
        head += 1;
    }
    let mut tail = 0;
    while tail < n - head
        && tail < m - head
        && values_equal(&input[n - 1 - tail], &output[m - 1 - tail], hooks)
    {
        tail += 1;
    }

    let anchors = lcs_pairs(&input[head..n - tail], &output[head..m - tail], hooks)
        .into_iter()
        .map(|(i, j)| (i + head, j + head))
        .chain(std::iter::once((n - tail, m - tail)));

    let mut modified = Vec::new();
    let mut removed = Vec::new();
    let mut added = Vec::new();
    let (mut next_in, mut next_out) = (head, head);
    for (i, j) in anchors {
        let paired = (i - next_in).min(j - next_out);
        modified.extend((0..paired).map(|k| (next_in + k, next_out + k)));
        removed.extend(next_in + paired..i);
        added.extend(next_out + paired..j);
        next_in = i + 1;
        next_out = j + 1;
    }

    for (i, j) in modified {
        diff_node(ops, &ptr.child(i.to_string()), &input[i], &output[j], hooks);
    }
    for &i in removed.iter().rev() {
        ops.push(Op::Remove {
            path: ptr.child(i.to_string()),
        });
    }
    let mut len = n - removed.len();
    for j in added {
        let token = if j == len {
            APPEND_MARKER.to_string()
        } else {
            j.to_string()
        };
        ops.push(Op::Add {
            path: ptr.child(token),
            value: deep_clone(&output[j], hooks),
        });
        len += 1;
    }
}

/// Index pairs of one longest common subsequence of `a` and `b`, ascending.
fn lcs_pairs(a: &[Value], b: &[Value], hooks: &dyn ValueHooks) -> Vec<(usize, usize)> {
    let (n, m) = (a.len(), b.len());
    if n == 0 || m == 0 {
        return Vec::new();
    }
    let width = m + 1;
    let mut eq = vec![false; n * m];
    let mut table = vec![0u32; (n + 1) * width];
    for i in (0..n).rev() {
        for j in (0..m).rev() {
            let same = values_equal(&a[i], &b[j], hooks);
            eq[i * m + j] = same;
            table[i * width + j] = if same {
                table[(i + 1) * width + j + 1] + 1
            } else {
                table[(i + 1) * width + j].max(table[i * width + j + 1])
            };
        }
    }

    let mut pairs = Vec::with_capacity(table[0] as usize);
    let (mut i, mut j) = (0, 0);
    while i < n && j < m {
        if eq[i * m + j] {
            pairs.push((i, j));
            i += 1;
            j += 1;
        } else if table[(i + 1) * width + j] >= table[i * width + j + 1] {
            i += 1;
        } else {
            j += 1;
        }
    }
    pairs
}

// ── Tests ─────────────────────────────────────────────────────────────────
