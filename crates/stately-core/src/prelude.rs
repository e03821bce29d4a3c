pub use crate::accessors::{from_attr, from_state, to_state};
pub use crate::advice::AdviceId;
pub use crate::component::{Component, ComponentDef};
pub use crate::definition::{StateDefinition, StateFields};
pub use crate::error::StateError;
pub use crate::state::{Attrs, IntoState, State};
pub use crate::stateful::{StateSlot, Stateful};
pub use serde_json::{Value, json};
