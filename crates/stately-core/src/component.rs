//! # Components
//!
//! A minimal host for [`Stateful`]: a `ComponentDef` describes a kind of
//! component (default attributes, an optional state declaration, setup and
//! after-initialize hooks) and `initialize` stamps out independent
//! `Component` instances.
//!
//! ```rust
//! use stately_core::*;
//!
//! let mut counter = ComponentDef::new("counter");
//! counter.attributes(json!({ "initial_number": 10 }));
//! counter
//!     .initial_state(
//!         StateFields::<Component>::new()
//!             .value("count", 0)
//!             .computed("current", from_attr("initial_number")),
//!     )
//!     .unwrap();
//!
//! let c = counter.initialize(()).unwrap();
//! assert_eq!(c.state().to_value(), json!({ "count": 0, "current": 10 }));
//! ```
//!
//! Initialization order for each instance:
//!
//! 1. attributes: definition defaults, then per-instance overrides;
//! 2. the definition-level state declaration (if any) is handed to the instance;
//! 3. `setup` hooks, in registration order (they may declare state themselves);
//! 4. state materialization;
//! 5. `after_initialize` hooks, in registration order.

use std::rc::Rc;

use serde_json::Value;

use crate::{Attrs, Declaration, IntoState, StateDefinition, StateError, StateSlot, Stateful};

type SetupHook = Rc<dyn Fn(&mut Component) -> Result<(), StateError>>;
type InitHook = Rc<dyn Fn(&mut Component)>;

pub struct ComponentDef {
    name: String,
    defaults: Attrs,
    declaration: Declaration<Component>,
    setup: Vec<SetupHook>,
    after_initialize: Vec<InitHook>,
}

impl ComponentDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            defaults: Attrs::new(),
            declaration: Declaration::default(),
            setup: Vec::new(),
            after_initialize: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Default attributes; later calls merge over earlier ones.
    pub fn attributes(&mut self, defaults: impl IntoState) -> &mut Self {
        if let Some(defaults) = defaults.into_state() {
            for (k, v) in defaults.iter() {
                self.defaults.insert(k.to_owned(), v.clone());
            }
        }
        self
    }

    /// Declares initial state for every instance of this component.
    /// Single-shot, like [`Stateful::initial_state`].
    pub fn initial_state(
        &mut self,
        definition: impl Into<StateDefinition<Component>>,
    ) -> Result<&mut Self, StateError> {
        self.declaration.declare(definition.into())?;
        Ok(self)
    }

    /// Runs on each new instance before its state is materialized.
    pub fn setup(
        &mut self,
        f: impl Fn(&mut Component) -> Result<(), StateError> + 'static,
    ) -> &mut Self {
        self.setup.push(Rc::new(f));
        self
    }

    /// Runs on each new instance once its state is materialized.
    pub fn after_initialize(&mut self, f: impl Fn(&mut Component) + 'static) -> &mut Self {
        self.after_initialize.push(Rc::new(f));
        self
    }

    /// Creates and initializes a new instance. `overrides` are merged over the
    /// default attributes; pass `()` for none.
    pub fn initialize(&self, overrides: impl IntoState) -> Result<Component, StateError> {
        let mut attr = self.defaults.clone();
        if let Some(overrides) = overrides.into_state() {
            for (k, v) in overrides.iter() {
                attr.insert(k.to_owned(), v.clone());
            }
        }

        let mut component = Component {
            name: self.name.clone(),
            attr,
            slot: StateSlot::new(),
        };

        if let Some(definition) = self.declaration.get() {
            component.initial_state(definition.clone())?;
        }
        for hook in &self.setup {
            hook(&mut component)?;
        }

        component.initialize_state();
        for hook in &self.after_initialize {
            hook(&mut component);
        }

        log::debug!(
            "initialized component '{}' ({} attr(s), {} state key(s))",
            component.name,
            component.attr.len(),
            component.state().len()
        );
        Ok(component)
    }
}

/// An initialized component instance.
pub struct Component {
    name: String,
    attr: Attrs,
    slot: StateSlot<Component>,
}

impl Component {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Attribute lookup; `None` when unset.
    pub fn attr_value(&self, key: &str) -> Option<&Value> {
        self.attr.get(key)
    }

    /// Host-side attribute edits. State already computed from attributes is
    /// not recomputed.
    pub fn attr_mut(&mut self) -> &mut Attrs {
        &mut self.attr
    }

    /// Drops all state advice. The state itself lives as long as the instance.
    pub fn teardown(&mut self) {
        let n = self.slot.advice().len();
        self.slot.advice_mut().clear();
        log::debug!("tore down component '{}' ({} advice removed)", self.name, n);
    }
}

impl Stateful for Component {
    fn attr(&self) -> &Attrs {
        &self.attr
    }

    fn state_slot(&self) -> &StateSlot<Self> {
        &self.slot
    }

    fn state_slot_mut(&mut self) -> &mut StateSlot<Self> {
        &mut self.slot
    }
}
