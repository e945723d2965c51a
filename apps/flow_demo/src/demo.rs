//! Onboarding flow wired onto headless units: welcome, login, home, plus a
//! settings sheet presented modally over the onboarding stack.

use std::{cell::RefCell, collections::HashMap, rc::Rc};

use coordinator_core::{
    config::Settings, BuildableFlowCoordinator, Builder, BuilderResult, Component,
    ComposableBuilder, Coordinator, CoordinatorTree, Description, Disposition,
    MissingStatePolicy, NavigationFlowCoordinator,
};
use presentation::{
    headless::{HeadlessDisplay, HeadlessUnit},
    PresentableUnit, TransitionConfig, UnitRef,
};
use serde::Serialize;
use shared::{
    domain::{CoordinatorId, PresentType, UnitId},
    error::CoordinatorResult,
    protocol::Message,
};
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Welcome,
    Login,
    Home,
}

#[derive(Debug, Default)]
pub struct Session {
    pub seen_welcome: bool,
    pub signed_in: bool,
    pub finished: bool,
    /// Pages of the settings sheet, `None` while it is closed.
    pub settings_depth: Option<usize>,
    pub flow_done: bool,
}

pub type SharedSession = Rc<RefCell<Session>>;

type SettingsFlow = NavigationFlowCoordinator<usize>;

struct StepBuilder {
    screen: Screen,
    unit: UnitRef,
    session: SharedSession,
    when: fn(&Session) -> bool,
}

impl Builder for StepBuilder {
    fn name(&self) -> &str {
        match self.screen {
            Screen::Welcome => "welcome",
            Screen::Login => "login",
            Screen::Home => "home",
        }
    }

    fn describable(&self, _tree: &CoordinatorTree, _coordinator: CoordinatorId) -> Option<Description> {
        (self.when)(&self.session.borrow()).then(|| Description::new(self.screen))
    }

    fn build(
        &self,
        description: &Description,
        _tree: &mut CoordinatorTree,
        _coordinator: CoordinatorId,
    ) -> Option<BuilderResult> {
        (description.downcast_ref::<Screen>() == Some(&self.screen))
            .then(|| BuilderResult::from_unit(self.unit.clone()))
    }
}

const EVENTS: &[&str] = &[
    "continue",
    "sign_in",
    "sign_out",
    "finish",
    "open_settings",
    "open_account",
    "close_settings",
];

/// Applies user events to the session and re-runs the onboarding flow.
struct SessionEvents {
    session: SharedSession,
    transition: TransitionConfig,
    missing_state: MissingStatePolicy,
    settings_nav: Rc<HeadlessUnit>,
    settings_pages: Vec<UnitRef>,
}

impl SessionEvents {
    fn settings_flow(&self) -> SettingsFlow {
        let pages = self.settings_pages.clone();
        let session = self.session.clone();
        SettingsFlow::new(
            self.settings_nav.clone(),
            move |depth: &usize| pages[..(*depth).min(pages.len())].to_vec(),
            move |_: &CoordinatorTree, _: CoordinatorId| session.borrow().settings_depth,
        )
        .with_missing_state(self.missing_state)
    }

    fn handle_settings(
        &self,
        event: &str,
        tree: &mut CoordinatorTree,
        flow: CoordinatorId,
        animated: bool,
    ) -> CoordinatorResult<()> {
        let open = tree.find_child::<SettingsFlow>(flow);
        match (event, open) {
            ("open_settings", None) => {
                self.session.borrow_mut().settings_depth = Some(1);
                let settings = tree.insert(self.settings_flow());
                tree.present_child(flow, settings, animated, &self.transition, None)?;
                tree.send(settings, Message::trigger_flow(false, PresentType::Present))
            }
            ("open_account", Some(settings)) => {
                self.session.borrow_mut().settings_depth = Some(2);
                tree.send(settings, Message::trigger_flow(animated, PresentType::Present))
            }
            ("close_settings", Some(settings)) => {
                self.session.borrow_mut().settings_depth = None;
                tree.dismiss_child(flow, settings, animated, None)?;
                Ok(())
            }
            (event, _) => {
                info!(event, "settings event does not apply right now");
                Ok(())
            }
        }
    }
}

impl Component for SessionEvents {
    fn can_handle(&self, message: &Message, _tree: &CoordinatorTree, _coordinator: CoordinatorId) -> bool {
        match message {
            Message::Custom(custom) => EVENTS.contains(&custom.name.as_str()),
            Message::Back(_) => {
                let session = self.session.borrow();
                session.seen_welcome && !session.signed_in
            }
            _ => false,
        }
    }

    fn handle(
        &self,
        message: &Message,
        tree: &mut CoordinatorTree,
        coordinator: CoordinatorId,
    ) -> CoordinatorResult<()> {
        let animated = tree.should_animate(coordinator);
        let direction = match message {
            Message::Back(_) => {
                self.session.borrow_mut().seen_welcome = false;
                PresentType::Dismiss
            }
            Message::Custom(custom) => {
                let event = custom.name.as_str();
                match event {
                    "continue" => self.session.borrow_mut().seen_welcome = true,
                    "sign_in" => self.session.borrow_mut().signed_in = true,
                    "finish" => self.session.borrow_mut().finished = true,
                    "sign_out" => {
                        let mut session = self.session.borrow_mut();
                        session.signed_in = false;
                        session.finished = false;
                    }
                    _ => return self.handle_settings(event, tree, coordinator, animated),
                }
                if event == "sign_out" {
                    PresentType::Dismiss
                } else {
                    PresentType::Present
                }
            }
            _ => return Ok(()),
        };

        tree.send(coordinator, Message::trigger_flow(animated, direction))
    }
}

/// Application root. Receives the onboarding flow's completion.
struct DemoApp {
    session: SharedSession,
}

impl Coordinator for DemoApp {
    fn name(&self) -> &str {
        "app"
    }

    fn handle(
        &self,
        _tree: &mut CoordinatorTree,
        _me: CoordinatorId,
        message: &Message,
    ) -> CoordinatorResult<Disposition> {
        match message {
            Message::Done(sender) => {
                info!(?sender, "onboarding finished");
                self.session.borrow_mut().flow_done = true;
                Ok(Disposition::Handled)
            }
            _ => Ok(Disposition::Declined),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Snapshot {
    pub step: String,
    pub stack: Vec<String>,
    pub presented: Option<String>,
    pub modal_stack: Vec<String>,
    pub coordinators: usize,
    pub finished: bool,
}

pub struct Demo {
    tree: CoordinatorTree,
    app: CoordinatorId,
    flow: CoordinatorId,
    nav: Rc<HeadlessUnit>,
    names: HashMap<UnitId, String>,
    session: SharedSession,
}

impl Demo {
    pub fn new(settings: &Settings) -> CoordinatorResult<Self> {
        let session = SharedSession::default();
        let nav = HeadlessUnit::new("onboarding");
        let welcome = HeadlessUnit::new("welcome");
        let login = HeadlessUnit::new("login");
        let home = HeadlessUnit::new("home");
        let settings_nav = HeadlessUnit::new("settings_nav");
        let settings_page = HeadlessUnit::new("settings");
        let account_page = HeadlessUnit::new("account");

        let names = [
            &nav,
            &welcome,
            &login,
            &home,
            &settings_nav,
            &settings_page,
            &account_page,
        ]
        .into_iter()
        .map(|unit| (unit.id(), unit.name().to_string()))
        .collect();

        let step = |screen, unit: &Rc<HeadlessUnit>, when: fn(&Session) -> bool| StepBuilder {
            screen,
            unit: unit.clone(),
            session: session.clone(),
            when,
        };
        let builder = ComposableBuilder::new()
            .with(step(Screen::Welcome, &welcome, |s| !s.seen_welcome))
            .with(step(Screen::Login, &login, |s| !s.signed_in))
            .with(step(Screen::Home, &home, |s| !s.finished));

        let mut tree = CoordinatorTree::new();
        let display = HeadlessDisplay::new(Some(nav.clone()));
        let app = tree.insert_root(
            display,
            DemoApp {
                session: session.clone(),
            },
        );
        let flow = tree.insert(BuildableFlowCoordinator::new(nav.clone(), builder));
        tree.add(app, flow)?;
        tree.add_component(
            flow,
            SessionEvents {
                session: session.clone(),
                transition: settings.default_transition.clone(),
                missing_state: settings.missing_state,
                settings_nav,
                settings_pages: vec![settings_page, account_page],
            },
        )?;

        Ok(Self {
            tree,
            app,
            flow,
            nav,
            names,
            session,
        })
    }

    pub fn flow(&self) -> CoordinatorId {
        self.flow
    }

    pub fn tree_mut(&mut self) -> &mut CoordinatorTree {
        &mut self.tree
    }

    pub fn show(&self) -> CoordinatorResult<()> {
        self.tree.show(self.app)
    }

    pub fn send(&mut self, message: Message) -> CoordinatorResult<()> {
        self.tree.send(self.flow, message)
    }

    fn names(&self, ids: impl IntoIterator<Item = UnitId>) -> Vec<String> {
        ids.into_iter()
            .map(|id| self.names.get(&id).cloned().unwrap_or_else(|| id.to_string()))
            .collect()
    }

    pub fn snapshot(&self, step: impl Into<String>) -> Snapshot {
        let presented = self.nav.presented_unit();
        Snapshot {
            step: step.into(),
            stack: self.names(self.nav.stack_ids()),
            presented: presented
                .as_ref()
                .and_then(|unit| self.names(Some(unit.id())).pop()),
            modal_stack: presented
                .map(|unit| self.names(unit.stack().iter().map(|page| page.id())))
                .unwrap_or_default(),
            coordinators: self.tree.len(),
            finished: self.session.borrow().flow_done,
        }
    }
}
