use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::{PresentType, ReloadOptions, Sender};

/// Ask a flow coordinator to recompute what it shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerFlowMessage {
    #[serde(default = "default_true")]
    pub animated: bool,
    #[serde(default)]
    pub present_type: PresentType,
}

impl TriggerFlowMessage {
    pub fn new(animated: bool, present_type: PresentType) -> Self {
        Self {
            animated,
            present_type,
        }
    }
}

impl Default for TriggerFlowMessage {
    fn default() -> Self {
        Self::new(true, PresentType::Present)
    }
}

/// Broadcast that a coordinator (and possibly its children) should reload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReloadMessage {
    #[serde(default = "default_true")]
    pub animated: bool,
    #[serde(default = "default_reload_options")]
    pub options: ReloadOptions,
    /// Direction used for the coordinator's own trigger.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub present_type: Option<PresentType>,
}

impl ReloadMessage {
    pub fn new(options: ReloadOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }
}

impl Default for ReloadMessage {
    fn default() -> Self {
        Self {
            animated: true,
            options: ReloadOptions::All,
            present_type: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum NavigationEvent {
    DidAppear(Sender),
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UserActivity {
    pub activity_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub user_info: BTreeMap<String, String>,
}

/// Application-defined event routed like any other message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomMessage {
    pub name: String,
    pub sender: Sender,
    #[serde(default)]
    pub payload: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum Message {
    /// Work finished; the receiver decides what comes next.
    Done(Sender),
    /// Work abandoned without completing.
    Cancel(Sender),
    Back(Sender),
    Skip(Sender),
    Reload(ReloadMessage),
    TriggerFlow(TriggerFlowMessage),
    Navigation(NavigationEvent),
    UserActivity(Option<UserActivity>),
    Custom(CustomMessage),
}

impl Message {
    pub fn trigger_flow(animated: bool, present_type: PresentType) -> Self {
        Message::TriggerFlow(TriggerFlowMessage::new(animated, present_type))
    }

    pub fn custom(name: impl Into<String>, sender: Sender, payload: serde_json::Value) -> Self {
        Message::Custom(CustomMessage {
            name: name.into(),
            sender,
            payload,
        })
    }

    pub fn sender(&self) -> Option<Sender> {
        match self {
            Message::Done(sender)
            | Message::Cancel(sender)
            | Message::Back(sender)
            | Message::Skip(sender)
            | Message::Navigation(NavigationEvent::DidAppear(sender)) => Some(*sender),
            Message::Custom(custom) => Some(custom.sender),
            Message::Reload(_) | Message::TriggerFlow(_) | Message::UserActivity(_) => None,
        }
    }

    /// Same message re-addressed from `sender`. Variants without a sender are
    /// returned unchanged.
    pub fn with_sender(self, sender: Sender) -> Self {
        match self {
            Message::Done(_) => Message::Done(sender),
            Message::Cancel(_) => Message::Cancel(sender),
            Message::Back(_) => Message::Back(sender),
            Message::Skip(_) => Message::Skip(sender),
            Message::Navigation(NavigationEvent::DidAppear(_)) => {
                Message::Navigation(NavigationEvent::DidAppear(sender))
            }
            Message::Custom(custom) => Message::Custom(CustomMessage { sender, ..custom }),
            other => other,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Message::Done(_) => "done",
            Message::Cancel(_) => "cancel",
            Message::Back(_) => "back",
            Message::Skip(_) => "skip",
            Message::Reload(_) => "reload",
            Message::TriggerFlow(_) => "trigger_flow",
            Message::Navigation(NavigationEvent::DidAppear(_)) => "did_appear",
            Message::UserActivity(_) => "user_activity",
            Message::Custom(_) => "custom",
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_reload_options() -> ReloadOptions {
    ReloadOptions::All
}
