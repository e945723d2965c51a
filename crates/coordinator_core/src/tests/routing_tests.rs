use presentation::{headless::HeadlessUnit, PresentableUnit};
use shared::{
    domain::{Sender, UnitId},
    error::CoordinatorError,
    protocol::{Message, NavigationEvent},
};

use crate::{
    support::{count, kinds, log, Claim, Recording, Spy},
    tree::CoordinatorTree,
};

#[test]
fn first_claiming_component_handles_exclusively() {
    let mut tree = CoordinatorTree::new();
    let parent_log = log();
    let child_log = log();
    let parent = tree.insert(Recording::new(&parent_log));
    let child = tree.insert(Recording::new(&child_log));
    tree.add(parent, child).expect("add");

    let seen = log();
    let first = log();
    let second = log();
    tree.add_component(child, Spy { seen: seen.clone() }).expect("spy");
    tree.add_component(
        child,
        Claim {
            kind: "back",
            handled: first.clone(),
        },
    )
    .expect("first claim");
    tree.add_component(
        child,
        Claim {
            kind: "back",
            handled: second.clone(),
        },
    )
    .expect("second claim");
    assert_eq!(tree.component_count(child), 3);

    tree.send(child, Message::Back(Sender::External)).expect("send");

    assert_eq!(seen.borrow().len(), 1);
    assert_eq!(kinds(&first), vec![(child, "back")]);
    assert!(second.borrow().is_empty());
    assert!(child_log.borrow().is_empty(), "local handler must not run");
    assert!(parent_log.borrow().is_empty(), "parent must not see it");
}

#[test]
fn declined_message_is_forwarded_to_parent_exactly_once() {
    let mut tree = CoordinatorTree::new();
    let parent_log = log();
    let child_log = log();
    let parent = tree.insert(Recording::new(&parent_log).handling("skip"));
    let child = tree.insert(Recording::new(&child_log));
    tree.add(parent, child).expect("add");
    tree.add_component(
        child,
        Claim {
            kind: "back",
            handled: log(),
        },
    )
    .expect("claim");

    tree.send(child, Message::Skip(child.into())).expect("send");

    assert_eq!(kinds(&child_log), vec![(child, "skip")]);
    assert_eq!(kinds(&parent_log), vec![(parent, "skip")]);
}

#[test]
fn forwarding_climbs_without_bouncing_back() {
    let mut tree = CoordinatorTree::new();
    let messages = log();
    let root = tree.insert(Recording::new(&messages));
    let middle = tree.insert(Recording::new(&messages));
    let leaf = tree.insert(Recording::new(&messages));
    tree.add(root, middle).expect("middle");
    tree.add(middle, leaf).expect("leaf");

    tree.send(leaf, Message::Cancel(leaf.into())).expect("send");

    assert_eq!(
        kinds(&messages),
        vec![(leaf, "cancel"), (middle, "cancel"), (root, "cancel")]
    );
}

#[test]
fn root_discards_unhandled_messages() {
    let mut tree = CoordinatorTree::new();
    let messages = log();
    let root = tree.insert(Recording::new(&messages));

    tree.send(root, Message::Done(Sender::External))
        .expect("discarding is not an error");

    assert_eq!(count(&messages, root, "done"), 1);
}

#[test]
fn sending_to_a_destroyed_coordinator_fails() {
    let mut tree = CoordinatorTree::new();
    let messages = log();
    let gone = tree.insert(Recording::new(&messages));
    tree.destroy(gone).expect("destroy");

    assert_eq!(
        tree.send(gone, Message::Done(Sender::External)),
        Err(CoordinatorError::UnknownCoordinator(gone))
    );
}

#[test]
fn units_reach_the_coordinator_bound_to_them() {
    let mut tree = CoordinatorTree::new();
    let messages = log();
    let screen = HeadlessUnit::new("screen");
    let owner = tree.insert(Recording::new(&messages).handling("did_appear"));
    tree.bind_unit(screen.id(), owner).expect("bind");

    let appeared = Message::Navigation(NavigationEvent::DidAppear(screen.id().into()));
    assert!(tree.send_from_unit(screen.id(), appeared.clone()).expect("send"));
    assert!(!tree
        .send_from_unit(UnitId(u64::MAX), appeared)
        .expect("unbound unit"));

    let received = messages.borrow();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].1.sender(), Some(Sender::Unit(screen.id())));
}

#[test]
fn handlers_see_the_original_sender() {
    let mut tree = CoordinatorTree::new();
    let parent_log = log();
    let parent = tree.insert(Recording::new(&parent_log).handling("done"));
    let child = tree.insert(Recording::new(&log()));
    let grandchild = tree.insert(Recording::new(&log()));
    tree.add(parent, child).expect("child");
    tree.add(child, grandchild).expect("grandchild");

    tree.send(grandchild, Message::Done(grandchild.into())).expect("send");

    let received = parent_log.borrow();
    assert_eq!(
        received[0].1.sender().and_then(|sender| sender.coordinator()),
        Some(grandchild),
        "parent can tell the message came from a grandchild"
    );
}
