use docgit::codec::{Patch, PatcherKind};
use docgit::json_patch::{apply_ops, AtomicLeaves};
use docgit::{diff, Op, Pointer};
use proptest::prelude::*;
use serde_json::{json, Map, Value};

fn arb_json() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        (-50i64..50).prop_map(Value::from),
        "[a-z]{0,4}".prop_map(Value::String),
    ];
    leaf.prop_recursive(4, 48, 5, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..5).prop_map(Value::Array),
            prop::collection::vec(("[a-z~/]{0,3}", inner), 0..5)
                .prop_map(|entries| Value::Object(entries.into_iter().collect::<Map<_, _>>())),
        ]
    })
}

fn ptr(raw: &str) -> Pointer {
    Pointer::parse(raw).expect("valid pointer")
}

proptest! {
    #[test]
    fn diff_of_identical_trees_is_empty(x in arb_json()) {
        prop_assert!(diff(&x, &x).is_empty());
        let patch = Patch::create(PatcherKind::MiniJsonPatch, &x, &x, &AtomicLeaves)
            .expect("encodable");
        prop_assert!(patch.is_none());
    }

    #[test]
    fn diff_then_apply_reaches_target(x in arb_json(), y in arb_json()) {
        let ops = diff(&x, &y);
        let applied = apply_ops(x.clone(), &ops, &AtomicLeaves).expect("diff applies");
        prop_assert_eq!(applied, y.clone());

        for patcher in [PatcherKind::JsonPatch, PatcherKind::MiniJsonPatch] {
            let patch = Patch::between(patcher, &x, &y, &AtomicLeaves).expect("encodable");
            let decoded = patch.decode().expect("decodable");
            prop_assert_eq!(&decoded, &ops);
            let rebuilt = patch.apply(x.clone(), &AtomicLeaves).expect("patch applies");
            prop_assert_eq!(rebuilt, y.clone());
        }
    }

    #[test]
    fn lowering_preserves_the_result(a in arb_json(), b in arb_json()) {
        let x = json!({"doc": a});
        let y = json!({"doc": b});
        let mut ops = vec![
            Op::Test { path: ptr(""), value: x.clone() },
            Op::Move { from: ptr("/doc"), path: ptr("/stash") },
            Op::Copy { from: ptr("/stash"), path: ptr("/doc") },
            Op::Remove { path: ptr("/stash") },
        ];
        ops.extend(diff(&x, &y));

        let verbose = Patch::encode(PatcherKind::JsonPatch, &ops).expect("encodable");
        let compact = Patch::encode_lowered(PatcherKind::MiniJsonPatch, &x, &ops, &AtomicLeaves)
            .expect("lowerable");
        prop_assert!(compact.decode().expect("decodable").iter().all(Op::is_mutation));

        let via_verbose = verbose.apply(x.clone(), &AtomicLeaves).expect("applies");
        let via_compact = compact.apply(x.clone(), &AtomicLeaves).expect("applies");
        prop_assert_eq!(&via_verbose, &y);
        prop_assert_eq!(&via_compact, &y);
    }
}
