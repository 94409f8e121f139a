#![no_main]

//! Arbitrary mutation and attach/detach sequences against a recording router.
//!
//! Checked after every step:
//! - the live stack holds unique identities and the routes a model predicts;
//! - each patch starts from the previous patch's result (empty after attach);
//! - no patch happens while detached;
//! - the factory builds at most one unit per identity per attachment.

use std::collections::HashSet;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use waypoint_core::{ElementId, RouterError, RoutingStack};
use waypoint_harness::{TestContainer, test_router};

#[derive(Debug, Arbitrary)]
struct LifecycleCase {
    initial: Vec<u8>,
    ops: Vec<Op>,
}

#[derive(Debug, Arbitrary)]
enum Op {
    Push(u8),
    BringForward(u8),
    Pop,
    PopUntil(u8),
    ReplaceTop(u8),
    Clear,
    Attach(u8),
    Detach,
}

fn apply(stack: &RoutingStack<u8>, op: &Op) -> RoutingStack<u8> {
    match op {
        Op::Push(route) => stack.push(*route),
        Op::BringForward(index) => match stack.get(usize::from(*index) % stack.len().max(1)) {
            Some(element) => stack.push_element(element.clone()),
            None => stack.clone(),
        },
        Op::Pop => stack.pop(),
        Op::PopUntil(route) => stack.pop_until_route(route),
        Op::ReplaceTop(route) => stack.replace_top(*route),
        Op::Clear => stack.clear(),
        Op::Attach(_) | Op::Detach => stack.clone(),
    }
}

fuzz_target!(|case: LifecycleCase| {
    let initial: Vec<u8> = case.initial.into_iter().take(32).collect();
    let mut router = test_router(initial.iter().copied());
    let mut model = RoutingStack::from_routes(initial);
    let mut attached = false;
    let mut created_before_attach = 0usize;
    let mut last_presented: Vec<ElementId> = Vec::new();

    for op in case.ops.iter().take(256) {
        let patches_before = router.patcher().len();
        match op {
            Op::Attach(id) => {
                let before = router.factory().created_count();
                let result = router.attach(TestContainer::new(u32::from(*id), "fuzz"));
                if attached {
                    assert_eq!(result, Err(RouterError::AlreadyAttached));
                    assert_eq!(router.patcher().len(), patches_before);
                } else {
                    assert_eq!(result, Ok(()));
                    attached = true;
                    created_before_attach = before;
                    last_presented.clear();
                }
            }
            Op::Detach => {
                let container = router.detach().expect("owner thread");
                assert_eq!(container.is_some(), attached);
                attached = false;
                assert_eq!(router.patcher().len(), patches_before);
                assert!(router.presented().expect("owner thread").is_empty());
            }
            mutation => {
                router.execute(|live| apply(live, mutation)).expect("owner thread");
                let expected = apply(&model, mutation);
                let live = router.stack().expect("owner thread");
                assert!(live.same_routes(&expected));
                model = live.clone();
                let patches = if attached { patches_before + 1 } else { patches_before };
                assert_eq!(router.patcher().len(), patches);
            }
        }

        let live = router.stack().expect("owner thread");
        let ids: HashSet<ElementId> = live.ids().collect();
        assert_eq!(ids.len(), live.len());

        if attached && router.patcher().len() > patches_before {
            let record = router.patcher().last().expect("patched");
            assert_eq!(record.old_ids, last_presented);
            assert!(record.new_ids.iter().copied().eq(live.ids()));
            last_presented = record.new_ids.clone();

            let presented = router.presented().expect("owner thread");
            assert!(presented.ids().eq(live.ids()));

            let since_attach = &router.factory().created()[created_before_attach..];
            let distinct: HashSet<_> = since_attach.iter().collect();
            assert_eq!(distinct.len(), since_attach.len());
        }
    }

    assert!(router.stack().expect("owner thread").same_routes(&model));
});
