use std::thread;

use presentation::{headless::HeadlessUnit, UnitRef};
use shared::{
    domain::{CoordinatorId, PresentType, Sender},
    error::CoordinatorError,
    protocol::Message,
};

use crate::{
    flow::NavigationFlowCoordinator,
    mailbox::{mailbox, MailboxError},
    support::{kinds, log, Recording},
    tree::CoordinatorTree,
};

#[test]
fn drain_delivers_in_posting_order() {
    let mut tree = CoordinatorTree::new();
    let received = log();
    let target = tree.insert(
        Recording::new(&received)
            .handling("back")
            .handling("skip"),
    );
    let (tx, inbox) = mailbox(8);

    tx.post(target, Message::Back(Sender::External)).expect("back");
    tx.post(target, Message::Skip(Sender::External)).expect("skip");
    assert_eq!(inbox.len(), 2);

    assert_eq!(inbox.drain(&mut tree).expect("drain"), 2);
    assert!(inbox.is_empty());
    assert_eq!(kinds(&received), vec![(target, "back"), (target, "skip")]);
}

#[test]
fn full_mailbox_rejects_without_blocking() {
    let (tx, inbox) = mailbox(1);
    let target = CoordinatorTree::new().insert(crate::tree::PassthroughCoordinator);

    tx.post(target, Message::Done(Sender::External)).expect("first");
    let err = tx
        .post(target, Message::Done(Sender::External))
        .expect_err("second");

    assert_eq!(err, MailboxError::Full { capacity: 1 });
    assert_eq!(inbox.len(), 1);
}

#[test]
fn zero_capacity_still_holds_one_message() {
    let (tx, inbox) = mailbox(0);
    let target = CoordinatorTree::new().insert(crate::tree::PassthroughCoordinator);

    tx.post(target, Message::Done(Sender::External)).expect("queued");

    assert_eq!(inbox.len(), 1);
}

#[test]
fn messages_for_destroyed_coordinators_are_dropped() {
    let mut tree = CoordinatorTree::new();
    let received = log();
    let gone = tree.insert(Recording::new(&received));
    let alive = tree.insert(Recording::new(&received).handling("cancel"));
    let (tx, inbox) = mailbox(4);

    tx.post(gone, Message::Cancel(Sender::External)).expect("post");
    tx.post(alive, Message::Cancel(Sender::External)).expect("post");
    tree.destroy(gone).expect("destroy");

    assert_eq!(inbox.drain(&mut tree).expect("drain"), 1);
    assert_eq!(kinds(&received), vec![(alive, "cancel")]);
}

#[test]
fn posting_after_the_inbox_is_gone_fails() {
    let (tx, inbox) = mailbox(4);
    let target = CoordinatorTree::new().insert(crate::tree::PassthroughCoordinator);
    drop(inbox);

    assert_eq!(
        tx.post(target, Message::Done(Sender::External)),
        Err(MailboxError::Disconnected)
    );
}

#[test]
fn other_threads_can_post() {
    let mut tree = CoordinatorTree::new();
    let received = log();
    let target = tree.insert(Recording::new(&received).handling("custom"));
    let (tx, inbox) = mailbox(16);

    let workers: Vec<_> = (0..4)
        .map(|worker| {
            let tx = tx.clone();
            thread::spawn(move || {
                tx.post(
                    target,
                    Message::custom("sync_finished", Sender::External, serde_json::json!({ "worker": worker })),
                )
            })
        })
        .collect();
    for worker in workers {
        worker.join().expect("join").expect("post");
    }

    assert_eq!(inbox.drain(&mut tree).expect("drain"), 4);
    assert_eq!(received.borrow().len(), 4);
}

#[test]
fn failed_delivery_stops_the_drain_and_keeps_the_rest_queued() {
    let mut tree = CoordinatorTree::new();
    let received = log();
    let stateless = tree.insert(NavigationFlowCoordinator::<usize>::new(
        HeadlessUnit::new("nav"),
        |_: &usize| Vec::<UnitRef>::new(),
        |_: &CoordinatorTree, _: CoordinatorId| None::<usize>,
    ));
    let target = tree.insert(Recording::new(&received).handling("back"));
    let (tx, inbox) = mailbox(4);

    tx.post(stateless, Message::trigger_flow(false, PresentType::Present))
        .expect("trigger");
    tx.post(target, Message::Back(Sender::External)).expect("back");

    assert_eq!(
        inbox.drain(&mut tree),
        Err(CoordinatorError::MissingFlowState {
            coordinator: stateless
        })
    );
    assert_eq!(inbox.len(), 1);
    assert!(received.borrow().is_empty());

    assert_eq!(inbox.drain(&mut tree).expect("next drain"), 1);
    assert_eq!(kinds(&received), vec![(target, "back")]);
}
