//! The `Stateful` capability: declare, materialize, replace and merge state.

use std::rc::Rc;

use serde_json::Map;

use crate::advice::{Advice, AdviceId, When};
use crate::{Attrs, Declaration, IntoState, State, StateDefinition, StateError};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Declarations are accepted.
    Setup,
    /// The declaration has been materialized into the first state.
    Initialized,
}

/// Per-instance storage a host embeds to become [`Stateful`].
pub struct StateSlot<H> {
    current: State,
    installed: bool,
    phase: Phase,
    declaration: Declaration<H>,
    advice: Advice<H>,
}

impl<H> Default for StateSlot<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> StateSlot<H> {
    pub fn new() -> Self {
        Self {
            current: State::empty(),
            installed: false,
            phase: Phase::Setup,
            declaration: Declaration::default(),
            advice: Advice::default(),
        }
    }

    pub fn state(&self) -> &State {
        &self.current
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn declaration(&self) -> &Declaration<H> {
        &self.declaration
    }

    pub fn advice(&self) -> &Advice<H> {
        &self.advice
    }

    pub fn advice_mut(&mut self) -> &mut Advice<H> {
        &mut self.advice
    }

    fn declare(&mut self, definition: StateDefinition<H>) -> Result<(), StateError> {
        if self.phase == Phase::Initialized {
            return Err(StateError::DeclaredAfterInitialize);
        }
        self.declaration.declare(definition)
    }

    // Returns the previously installed state, if any.
    fn install(&mut self, next: State) -> Option<State> {
        let prev = std::mem::replace(&mut self.current, next);
        std::mem::replace(&mut self.installed, true).then_some(prev)
    }
}

/// Local, replaceable component state with change notification.
///
/// Hosts embed a [`StateSlot<Self>`] and expose their attribute mapping;
/// everything else is provided. Override [`Stateful::state_changed`] to react
/// to transitions from inside the host, or register advice from outside.
///
/// ```rust
/// use stately_core::*;
///
/// struct Toggle {
///     attr: Attrs,
///     slot: StateSlot<Toggle>,
/// }
///
/// impl Stateful for Toggle {
///     fn attr(&self) -> &Attrs { &self.attr }
///     fn state_slot(&self) -> &StateSlot<Self> { &self.slot }
///     fn state_slot_mut(&mut self) -> &mut StateSlot<Self> { &mut self.slot }
/// }
///
/// let mut t = Toggle { attr: Attrs::new(), slot: StateSlot::new() };
/// t.initial_state(json!({ "on": false })).unwrap();
/// t.initialize_state();
/// t.merge_state(json!({ "on": true }));
/// assert_eq!(t.state().get("on"), Some(&json!(true)));
/// ```
pub trait Stateful: Sized + 'static {
    fn attr(&self) -> &Attrs;
    fn state_slot(&self) -> &StateSlot<Self>;
    fn state_slot_mut(&mut self) -> &mut StateSlot<Self>;

    /// Called after every successful transition, between before and after
    /// advice. No-op by default.
    fn state_changed(&mut self, _state: &State, _previous: Option<&State>) {}

    fn state(&self) -> &State {
        self.state_slot().state()
    }

    /// Declares the initial state. Single-shot: a second declaration fails
    /// with [`StateError::InvalidStateDeclaration`] and the first is kept.
    fn initial_state(
        &mut self,
        definition: impl Into<StateDefinition<Self>>,
    ) -> Result<(), StateError> {
        self.state_slot_mut().declare(definition.into())
    }

    /// Materializes the declaration and installs it through
    /// [`Stateful::replace_state`]. Runs once; later calls return the current
    /// state untouched.
    fn initialize_state(&mut self) -> State {
        if self.state_slot().phase() == Phase::Initialized {
            log::warn!("initialize_state called twice; keeping the current state");
            return self.state().clone();
        }
        let definition = {
            let slot = self.state_slot_mut();
            slot.phase = Phase::Initialized;
            slot.declaration.take()
        };
        let initial = match definition {
            Some(definition) => definition.materialize(self),
            None => State::empty(),
        };
        log::debug!("materialized initial state with {} key(s)", initial.len());
        self.replace_state(initial)
    }

    /// Installs `candidate` as the new state and notifies. Absent or
    /// non-mapping candidates are ignored and the current state is returned.
    fn replace_state(&mut self, candidate: impl IntoState) -> State {
        let Some(next) = candidate.into_state() else {
            log::trace!("replace_state ignored an absent or non-mapping candidate");
            return self.state().clone();
        };
        let previous = self.state_slot_mut().install(next.clone());
        notify_state_changed(self, &next, previous.as_ref());
        next
    }

    /// Shallow merge of `changes` onto the current state. Always installs a
    /// new state, even when `changes` is empty or absent.
    fn merge_state(&mut self, changes: impl IntoState) -> State {
        let next = match changes.into_state() {
            Some(changes) => self.state().merged(changes.as_map()),
            None => self.state().merged(&Map::new()),
        };
        self.replace_state(next)
    }

    fn before_state_changed(
        &mut self,
        f: impl Fn(&mut Self, &State, Option<&State>) + 'static,
    ) -> AdviceId {
        self.state_slot_mut()
            .advice_mut()
            .add(When::Before, Rc::new(f))
    }

    fn after_state_changed(
        &mut self,
        f: impl Fn(&mut Self, &State, Option<&State>) + 'static,
    ) -> AdviceId {
        self.state_slot_mut()
            .advice_mut()
            .add(When::After, Rc::new(f))
    }

    fn remove_state_advice(&mut self, id: AdviceId) -> bool {
        self.state_slot_mut().advice_mut().remove(id)
    }
}

fn notify_state_changed<H: Stateful>(host: &mut H, state: &State, previous: Option<&State>) {
    let before = host.state_slot().advice().snapshot(When::Before);
    let after = host.state_slot().advice().snapshot(When::After);
    for advice in &before {
        advice(&mut *host, state, previous);
    }
    host.state_changed(state, previous);
    for advice in &after {
        advice(&mut *host, state, previous);
    }
}
