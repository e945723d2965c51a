//! Queue through which other threads hand messages to the control thread.
//! The tree itself is single-threaded; only the sending half crosses threads.

use crossbeam_channel::{bounded, Receiver, Sender as ChannelSender, TrySendError};
use shared::{domain::CoordinatorId, error::CoordinatorResult, protocol::Message};
use thiserror::Error;
use tracing::{debug, warn};

use crate::tree::CoordinatorTree;

#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    pub target: CoordinatorId,
    pub message: Message,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MailboxError {
    #[error("mailbox is full ({capacity} messages queued)")]
    Full { capacity: usize },
    #[error("control thread is no longer receiving messages")]
    Disconnected,
}

#[derive(Clone)]
pub struct MailboxSender {
    tx: ChannelSender<Envelope>,
    capacity: usize,
}

impl MailboxSender {
    pub fn post(&self, target: CoordinatorId, message: Message) -> Result<(), MailboxError> {
        let kind = message.kind();
        match self.tx.try_send(Envelope { target, message }) {
            Ok(()) => {
                debug!(coordinator = target.0, message = kind, "queued message");
                Ok(())
            }
            Err(TrySendError::Full(_)) => {
                warn!(coordinator = target.0, message = kind, "mailbox is full");
                Err(MailboxError::Full {
                    capacity: self.capacity,
                })
            }
            Err(TrySendError::Disconnected(_)) => Err(MailboxError::Disconnected),
        }
    }
}

pub struct Mailbox {
    rx: Receiver<Envelope>,
}

impl Mailbox {
    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }

    /// Delivers everything queued so far, in order. Messages addressed to
    /// coordinators that no longer exist are dropped.
    ///
    /// Stops at the first message whose handling fails and returns that
    /// error. Messages behind it stay queued for the next drain; the count
    /// of messages delivered before the failure is not reported.
    pub fn drain(&self, tree: &mut CoordinatorTree) -> CoordinatorResult<usize> {
        let mut delivered = 0;
        while let Ok(Envelope { target, message }) = self.rx.try_recv() {
            if !tree.contains(target) {
                warn!(
                    coordinator = target.0,
                    message = message.kind(),
                    "dropping message for destroyed coordinator"
                );
                continue;
            }
            tree.send(target, message)?;
            delivered += 1;
        }
        Ok(delivered)
    }
}

pub fn mailbox(capacity: usize) -> (MailboxSender, Mailbox) {
    let capacity = capacity.max(1);
    let (tx, rx) = bounded(capacity);
    (MailboxSender { tx, capacity }, Mailbox { rx })
}
