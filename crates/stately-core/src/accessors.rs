//! Accessor factories.
//!
//! Each factory captures only a key. The returned closure takes the instance
//! explicitly, so one accessor can serve any number of components:
//!
//! ```rust
//! use stately_core::*;
//!
//! let mut def = ComponentDef::new("toggle");
//! def.initial_state(json!({ "active": false })).unwrap();
//! let mut c = def.initialize(json!({ "id": "t1" })).unwrap();
//!
//! let get_active = from_state::<Component>("active");
//! let set_active = to_state::<Component>("active");
//! let get_id = from_attr::<Component>("id");
//!
//! set_active(&mut c, json!(true));
//! assert_eq!(get_active(&c), Some(json!(true)));
//! assert_eq!(get_id(&c), Some(json!("t1")));
//! ```

use serde_json::{Map, Value};

use crate::{State, Stateful};

/// `state[key]` of the instance it is called with, read at call time.
pub fn from_state<H: Stateful>(key: &str) -> impl Fn(&H) -> Option<Value> + Clone + use<H> {
    let key = key.to_owned();
    move |host: &H| host.state().get(&key).cloned()
}

/// Merges `{key: value}` into the instance it is called with.
pub fn to_state<H: Stateful>(key: &str) -> impl Fn(&mut H, Value) -> State + Clone + use<H> {
    let key = key.to_owned();
    move |host: &mut H, value: Value| {
        let mut changes = Map::new();
        changes.insert(key.clone(), value);
        host.merge_state(changes)
    }
}

/// `attr[key]` of the instance it is called with.
pub fn from_attr<H: Stateful>(key: &str) -> impl Fn(&H) -> Option<Value> + Clone + use<H> {
    let key = key.to_owned();
    move |host: &H| host.attr().get(&key).cloned()
}
