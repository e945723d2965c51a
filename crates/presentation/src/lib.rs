//! Capabilities the coordinator tree needs from the UI layer. The tree never
//! looks inside a unit; it only asks for identity, visibility and the handful
//! of stack and modal operations below.

use std::rc::Rc;

use serde::{Deserialize, Serialize};
use shared::domain::UnitId;

pub mod headless;

pub type UnitRef = Rc<dyn PresentableUnit>;

/// Called once a modal transition finishes.
pub type Completion = Box<dyn FnOnce()>;

/// Transition settings handed to the UI layer untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransitionConfig {
    pub style: String,
    pub full_screen: bool,
}

impl Default for TransitionConfig {
    fn default() -> Self {
        Self {
            style: "cover_vertical".into(),
            full_screen: true,
        }
    }
}

pub trait PresentableUnit {
    fn id(&self) -> UnitId;

    /// True while the unit is attached to a visible display.
    fn is_currently_visible(&self) -> bool;

    /// Unit modally shown on top of this one, if any.
    fn presented_unit(&self) -> Option<UnitRef>;

    fn show_modal(
        &self,
        unit: UnitRef,
        animated: bool,
        transition: &TransitionConfig,
        on_complete: Option<Completion>,
    );

    fn dismiss_modal(&self, animated: bool, on_complete: Option<Completion>);

    /// Replaces the navigation stack this unit hosts. Units that are not
    /// navigation containers ignore it.
    fn set_stack(&self, units: Vec<UnitRef>, animated: bool);

    fn stack(&self) -> Vec<UnitRef>;
}

pub trait DisplayHost {
    fn make_visible(&self);
}

pub fn unit_ids(units: &[UnitRef]) -> Vec<UnitId> {
    units.iter().map(|unit| unit.id()).collect()
}
