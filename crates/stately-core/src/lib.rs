//! # Component state
//!
//! Stately gives components a small, local, replaceable state with change
//! notification. There are four main pieces:
//!
//! - `initial_state` — declare the state once, during setup.
//! - `replace_state` / `merge_state` — move to a new state.
//! - `from_state` / `to_state` / `from_attr` — accessor factories.
//! - `state_changed` + advice — react to every transition.
//!
//! ## Declaring
//!
//! A declaration is either a set of fields (literals, or producers evaluated
//! against the instance) or one producer for the whole mapping. It is
//! materialized once per instance, after the host finished initializing and
//! its attributes are in place:
//!
//! ```rust
//! use stately_core::*;
//!
//! let mut def = ComponentDef::new("counter");
//! def.attributes(json!({ "initial_number": 10 }));
//! def.initial_state(
//!     StateFields::<Component>::new()
//!         .value("alive", true)
//!         .value("count", 0)
//!         .computed("current", |c: &Component| c.attr_value("initial_number").cloned()),
//! )
//! .unwrap();
//!
//! let c = def.initialize(()).unwrap();
//! assert_eq!(c.state().to_value(), json!({ "alive": true, "count": 0, "current": 10 }));
//! ```
//!
//! Only one declaration is allowed per instance; a second one returns
//! `StateError::InvalidStateDeclaration`.
//!
//! ## Transitions
//!
//! `State` is immutable. `replace_state` installs a new mapping as-is,
//! `merge_state` installs a shallow copy with some keys overwritten. Both
//! return the new state and always produce a fresh `State` (see
//! `State::ptr_eq`). Absent or non-object candidates are ignored:
//!
//! ```rust
//! use stately_core::*;
//!
//! let mut def = ComponentDef::new("demo");
//! def.initial_state(json!({ "alive": true, "count": 0 })).unwrap();
//! let mut c = def.initialize(()).unwrap();
//!
//! c.merge_state(json!({ "count": 2 }));
//! assert_eq!(c.state().to_value(), json!({ "alive": true, "count": 2 }));
//!
//! c.replace_state(json!({ "count": 3 }));
//! assert_eq!(c.state().to_value(), json!({ "count": 3 }));
//!
//! c.replace_state(()); // no-op
//! assert_eq!(c.state().to_value(), json!({ "count": 3 }));
//! ```
//!
//! ## Observing
//!
//! Every successful transition calls `state_changed(state, previous)`,
//! wrapped by any before/after advice registered on the instance:
//!
//! ```rust
//! use std::cell::Cell;
//! use std::rc::Rc;
//! use stately_core::*;
//!
//! let mut c = ComponentDef::new("demo").initialize(()).unwrap();
//! let seen = Rc::new(Cell::new(0));
//! let id = c.after_state_changed({
//!     let seen = seen.clone();
//!     move |_, _, _| seen.set(seen.get() + 1)
//! });
//!
//! c.merge_state(json!({ "a": 1 }));
//! c.remove_state_advice(id);
//! c.merge_state(json!({ "a": 2 }));
//! assert_eq!(seen.get(), 1);
//! ```
//!
//! Everything is single-threaded: states are `Rc`-backed and the callbacks
//! run synchronously, before the transition returns.

pub mod accessors;
pub mod advice;
pub mod component;
pub mod definition;
pub mod error;
pub mod prelude;
pub mod state;
pub mod stateful;

pub use accessors::*;
pub use advice::{AdviceId, StateAdvice, When};
pub use component::*;
pub use definition::*;
pub use error::*;
pub use prelude::*;
pub use state::*;
pub use stateful::*;
