use std::fmt;
use std::rc::Rc;

use serde_json::{Map, Value};

/// Per-component attribute mapping, populated by the host before
/// initialization completes.
pub type Attrs = Map<String, Value>;

/// A component's current state: an immutable mapping shared by `Rc`.
///
/// Transitions never edit a `State` in place; they install a new one. Two
/// handles are the *same* state when [`State::ptr_eq`] holds, and *equal*
/// states when their contents match (`==`).
#[derive(Clone, Default)]
pub struct State(Rc<Map<String, Value>>);

impl State {
    pub fn new(map: Map<String, Value>) -> Self {
        Self(Rc::new(map))
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds a state from a JSON value. Only objects are states.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self::new(map)),
            _ => None,
        }
    }

    /// Identity comparison; distinct transitions never produce `ptr_eq` states.
    pub fn ptr_eq(a: &State, b: &State) -> bool {
        Rc::ptr_eq(&a.0, &b.0)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn to_value(&self) -> Value {
        Value::Object((*self.0).clone())
    }

    /// Shallow copy of `self` with every key of `changes` overwritten.
    ///
    /// Nested objects and arrays are replaced wholesale. The result is always
    /// a fresh allocation, even when `changes` is empty.
    pub fn merged(&self, changes: &Map<String, Value>) -> State {
        let mut next = (*self.0).clone();
        for (k, v) in changes {
            next.insert(k.clone(), v.clone());
        }
        State::new(next)
    }
}

impl PartialEq for State {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl fmt::Debug for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.0.iter()).finish()
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match serde_json::to_string(&*self.0) {
            Ok(s) => f.write_str(&s),
            Err(_) => Err(fmt::Error),
        }
    }
}

impl From<Map<String, Value>> for State {
    fn from(map: Map<String, Value>) -> Self {
        State::new(map)
    }
}

/// Anything `replace_state` / `merge_state` accept as a candidate.
///
/// `()` stands for "called without an argument". Candidates that are absent
/// or are not mappings convert to `None`.
pub trait IntoState {
    fn into_state(self) -> Option<State>;
}

impl IntoState for State {
    fn into_state(self) -> Option<State> {
        Some(self)
    }
}

impl IntoState for &State {
    fn into_state(self) -> Option<State> {
        Some(self.clone())
    }
}

impl IntoState for Map<String, Value> {
    fn into_state(self) -> Option<State> {
        Some(State::new(self))
    }
}

impl IntoState for Value {
    fn into_state(self) -> Option<State> {
        State::from_value(self)
    }
}

impl<T: IntoState> IntoState for Option<T> {
    fn into_state(self) -> Option<State> {
        self.and_then(IntoState::into_state)
    }
}

impl IntoState for () {
    fn into_state(self) -> Option<State> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn merged_is_shallow_and_fresh() {
        let base = State::from_value(json!({"alive": true, "arr": [1, 2, 3]})).unwrap();
        let Value::Object(changes) = json!({"arr": []}) else {
            unreachable!()
        };
        let next = base.merged(&changes);

        assert!(!State::ptr_eq(&base, &next));
        assert_eq!(next.get("arr"), Some(&json!([])));
        assert_eq!(next.get("alive"), Some(&json!(true)));
        assert_eq!(base.get("arr"), Some(&json!([1, 2, 3])));

        let same_contents = base.merged(&Map::new());
        assert_eq!(same_contents, base);
        assert!(!State::ptr_eq(&same_contents, &base));
    }

    #[test]
    fn only_objects_are_states() {
        assert!(json!(null).into_state().is_none());
        assert!(json!(5).into_state().is_none());
        assert!(json!([1]).into_state().is_none());
        assert!(().into_state().is_none());
        assert!(None::<State>.into_state().is_none());
        assert!(json!({}).into_state().is_some());
    }

    #[test]
    fn display_keeps_insertion_order() {
        let s = State::from_value(json!({"zeta": 1, "alpha": 2})).unwrap();
        insta::assert_snapshot!(s.to_string(), @r#"{"zeta":1,"alpha":2}"#);
    }
}
