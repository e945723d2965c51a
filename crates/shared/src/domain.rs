use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub u64);

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}#{}", stringify!($name), self.0)
            }
        }
    };
}

id_newtype!(CoordinatorId);
id_newtype!(UnitId);

/// Who emitted a message. Handlers compare this against what they expect
/// before trusting any state the message implies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum Sender {
    Coordinator(CoordinatorId),
    Unit(UnitId),
    External,
}

impl Sender {
    pub fn coordinator(&self) -> Option<CoordinatorId> {
        match self {
            Sender::Coordinator(id) => Some(*id),
            _ => None,
        }
    }

    pub fn unit(&self) -> Option<UnitId> {
        match self {
            Sender::Unit(id) => Some(*id),
            _ => None,
        }
    }
}

impl From<CoordinatorId> for Sender {
    fn from(value: CoordinatorId) -> Self {
        Sender::Coordinator(value)
    }
}

impl From<UnitId> for Sender {
    fn from(value: UnitId) -> Self {
        Sender::Unit(value)
    }
}

/// Direction a flow is reconciled in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PresentType {
    /// Replace the displayed stack with the target.
    #[default]
    Present,
    /// Pretend the target was underneath the current stack and pop back to it.
    Dismiss,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReloadOptions {
    All,
    OnlyChildren,
    #[default]
    IgnoreChildren,
}

impl ReloadOptions {
    pub fn includes_self(self) -> bool {
        self != ReloadOptions::OnlyChildren
    }

    pub fn includes_children(self) -> bool {
        self != ReloadOptions::IgnoreChildren
    }
}
