//! Declared-but-not-yet-materialized initial state.

use std::rc::Rc;

use serde_json::{Map, Value};

use crate::{State, StateError};

/// Produces a value with the owning component as context.
pub type Producer<H> = Rc<dyn Fn(&H) -> Value>;

fn producer<H, V, F>(f: F) -> Producer<H>
where
    H: 'static,
    F: Fn(&H) -> V + 'static,
    V: Into<Value> + 'static,
{
    Rc::new(move |h: &H| f(h).into())
}

pub enum Field<H> {
    Literal(Value),
    Computed(Producer<H>),
}

impl<H> Clone for Field<H> {
    fn clone(&self) -> Self {
        match self {
            Field::Literal(v) => Field::Literal(v.clone()),
            Field::Computed(f) => Field::Computed(f.clone()),
        }
    }
}

impl<H> Field<H> {
    fn resolve(&self, host: &H) -> Value {
        match self {
            Field::Literal(v) => v.clone(),
            Field::Computed(f) => f(host),
        }
    }
}

/// Ordered key → field declaration.
///
/// ```rust
/// use stately_core::*;
///
/// let fields = StateFields::<Component>::new()
///     .value("active", false)
///     .value("counter", 0)
///     .computed("id", from_attr("id"));
/// assert_eq!(fields.len(), 3);
/// ```
pub struct StateFields<H> {
    entries: Vec<(String, Field<H>)>,
}

impl<H> Default for StateFields<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> Clone for StateFields<H> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
        }
    }
}

impl<H> StateFields<H> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Literal field. The value is cloned into every instance's state, so
    /// instances sharing a declaration never alias each other's data.
    pub fn value(self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.field(key.into(), Field::Literal(value.into()))
    }

    /// Field computed at materialization time, with the instance as context.
    pub fn computed<V, F>(self, key: impl Into<String>, f: F) -> Self
    where
        H: 'static,
        F: Fn(&H) -> V + 'static,
        V: Into<Value> + 'static,
    {
        self.field(key.into(), Field::Computed(producer(f)))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    // Repeated keys keep their first position; the last write wins.
    fn field(mut self, key: String, field: Field<H>) -> Self {
        if let Some(slot) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            slot.1 = field;
        } else {
            self.entries.push((key, field));
        }
        self
    }

    fn resolve(&self, host: &H) -> Map<String, Value> {
        self.entries
            .iter()
            .map(|(k, field)| (k.clone(), field.resolve(host)))
            .collect()
    }
}

impl<H> From<Map<String, Value>> for StateFields<H> {
    fn from(map: Map<String, Value>) -> Self {
        map.into_iter()
            .fold(StateFields::new(), |fields, (k, v)| fields.value(k, v))
    }
}

/// How a component declares its initial state: per-key fields, or one
/// producer returning the whole mapping.
pub enum StateDefinition<H> {
    Fields(StateFields<H>),
    Producer(Producer<H>),
}

impl<H> Clone for StateDefinition<H> {
    fn clone(&self) -> Self {
        match self {
            StateDefinition::Fields(f) => StateDefinition::Fields(f.clone()),
            StateDefinition::Producer(p) => StateDefinition::Producer(p.clone()),
        }
    }
}

impl<H> StateDefinition<H> {
    pub fn fields() -> StateFields<H> {
        StateFields::new()
    }

    /// Full-state producer, called once per instance at materialization.
    pub fn from_fn<F>(f: F) -> Self
    where
        H: 'static,
        F: Fn(&H) -> Value + 'static,
    {
        StateDefinition::Producer(Rc::new(f))
    }

    /// Resolves the definition against `host` into a brand-new state.
    pub fn materialize(&self, host: &H) -> State {
        match self {
            StateDefinition::Fields(fields) => State::new(fields.resolve(host)),
            StateDefinition::Producer(produce) => match produce(host) {
                Value::Object(map) => State::new(map),
                other => {
                    log::warn!(
                        "initial state producer returned a non-object ({}); using an empty state",
                        kind(&other)
                    );
                    State::empty()
                }
            },
        }
    }
}

fn kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

impl<H> From<StateFields<H>> for StateDefinition<H> {
    fn from(fields: StateFields<H>) -> Self {
        StateDefinition::Fields(fields)
    }
}

impl<H> From<Map<String, Value>> for StateDefinition<H> {
    fn from(map: Map<String, Value>) -> Self {
        StateDefinition::Fields(map.into())
    }
}

/// Non-object values have no keys and declare an empty field set.
impl<H> From<Value> for StateDefinition<H> {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) => map.into(),
            _ => StateDefinition::Fields(StateFields::new()),
        }
    }
}

/// Single-shot holder for a pending declaration.
pub struct Declaration<H> {
    pending: Option<StateDefinition<H>>,
}

impl<H> Default for Declaration<H> {
    fn default() -> Self {
        Self { pending: None }
    }
}

impl<H> Declaration<H> {
    /// Records `definition`. A second declaration is rejected and the first
    /// one is kept.
    pub fn declare(&mut self, definition: StateDefinition<H>) -> Result<(), StateError> {
        if self.pending.is_some() {
            return Err(StateError::InvalidStateDeclaration);
        }
        self.pending = Some(definition);
        Ok(())
    }

    pub fn is_declared(&self) -> bool {
        self.pending.is_some()
    }

    pub fn get(&self) -> Option<&StateDefinition<H>> {
        self.pending.as_ref()
    }

    pub fn take(&mut self) -> Option<StateDefinition<H>> {
        self.pending.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Ctx {
        n: i64,
    }

    #[test]
    fn fields_resolve_in_declaration_order() {
        let def: StateDefinition<Ctx> = StateDefinition::fields()
            .value("count", 0)
            .computed("current", |c: &Ctx| c.n)
            .value("label", "x")
            .into();

        let state = def.materialize(&Ctx { n: 10 });
        assert_eq!(state.keys().collect::<Vec<_>>(), ["count", "current", "label"]);
        assert_eq!(state.to_value(), json!({"count": 0, "current": 10, "label": "x"}));
    }

    #[test]
    fn repeated_key_keeps_position_last_write_wins() {
        let fields = StateFields::<Ctx>::new()
            .value("a", 1)
            .value("b", 2)
            .value("a", 3);
        assert_eq!(fields.keys().collect::<Vec<_>>(), ["a", "b"]);
        let state = StateDefinition::from(fields).materialize(&Ctx { n: 0 });
        assert_eq!(state.get("a"), Some(&json!(3)));
    }

    #[test]
    fn producer_returning_non_object_yields_empty_state() {
        let def = StateDefinition::from_fn(|_: &Ctx| json!(42));
        assert!(def.materialize(&Ctx { n: 0 }).is_empty());

        let def = StateDefinition::from_fn(|c: &Ctx| json!({"n": c.n}));
        assert_eq!(def.materialize(&Ctx { n: 7 }).get("n"), Some(&json!(7)));
    }

    #[test]
    fn non_object_literal_declares_nothing() {
        let def: StateDefinition<Ctx> = json!("nope").into();
        assert!(def.materialize(&Ctx { n: 0 }).is_empty());
    }

    #[test]
    fn declaration_is_single_shot() {
        let mut d = Declaration::<Ctx>::default();
        assert!(d.declare(json!({"alive": true}).into()).is_ok());
        assert_eq!(
            d.declare(json!({"dead": true}).into()),
            Err(StateError::InvalidStateDeclaration)
        );
        let kept = d.take().unwrap().materialize(&Ctx { n: 0 });
        assert_eq!(kept.to_value(), json!({"alive": true}));
    }
}
