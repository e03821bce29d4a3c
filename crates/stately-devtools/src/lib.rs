use std::cell::RefCell;
use std::rc::Rc;

use serde::Serialize;
use serde_json::Value;

use stately_core::{AdviceId, State, Stateful};

/// One observed transition.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TransitionRecord {
    pub seq: u64,
    /// Keys whose value differs from the previous state (added, changed or
    /// removed), in the order they appear.
    pub changed: Vec<String>,
    pub state: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous: Option<Value>,
}

impl TransitionRecord {
    fn capture(seq: u64, state: &State, previous: Option<&State>) -> Self {
        let changed = match previous {
            None => state.keys().map(str::to_owned).collect(),
            Some(prev) => state
                .iter()
                .filter(|(k, v)| prev.get(k) != Some(*v))
                .map(|(k, _)| k.to_owned())
                .chain(
                    prev.keys()
                        .filter(|k| !state.contains_key(k))
                        .map(str::to_owned),
                )
                .collect(),
        };
        Self {
            seq,
            changed,
            state: state.to_value(),
            previous: previous.map(State::to_value),
        }
    }
}

/// Records every state transition of the hosts it is attached to.
///
/// The log is shared: clones see the same records, so one clone can be moved
/// into UI code while another is inspected.
#[derive(Clone, Default)]
pub struct TransitionLog {
    inner: Rc<RefCell<Inner>>,
}

#[derive(Default)]
struct Inner {
    next_seq: u64,
    records: Vec<TransitionRecord>,
    limit: Option<usize>,
}

impl TransitionLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keeps only the most recent `limit` records; `0` keeps none.
    pub fn with_limit(limit: usize) -> Self {
        let log = Self::new();
        log.inner.borrow_mut().limit = Some(limit);
        log
    }

    /// Starts recording `host`'s transitions. Returns the advice id to pass to
    /// [`TransitionLog::detach`].
    pub fn attach<H: Stateful>(&self, host: &mut H) -> AdviceId {
        let inner = self.inner.clone();
        host.after_state_changed(move |_, state, previous| {
            let mut inner = inner.borrow_mut();
            inner.next_seq += 1;
            let record = TransitionRecord::capture(inner.next_seq, state, previous);
            log::trace!("state transition #{}: {:?}", record.seq, record.changed);
            inner.records.push(record);
            if let Some(limit) = inner.limit {
                let excess = inner.records.len().saturating_sub(limit);
                inner.records.drain(..excess);
            }
        })
    }

    pub fn detach<H: Stateful>(&self, host: &mut H, id: AdviceId) -> bool {
        host.remove_state_advice(id)
    }

    pub fn records(&self) -> Vec<TransitionRecord> {
        self.inner.borrow().records.clone()
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.inner.borrow_mut().records.clear();
    }

    /// One summary line per record, e.g. `#2 count: {"alive":true,"count":1}`.
    pub fn lines(&self) -> Vec<String> {
        self.inner
            .borrow()
            .records
            .iter()
            .map(|r| {
                let changed = if r.previous.is_none() {
                    "initial".to_string()
                } else if r.changed.is_empty() {
                    "unchanged".to_string()
                } else {
                    r.changed.join(",")
                };
                format!("#{} {}: {}", r.seq, changed, r.state)
            })
            .collect()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.inner.borrow().records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stately_core::{ComponentDef, json};

    fn counter() -> ComponentDef {
        let mut def = ComponentDef::new("counter");
        def.initial_state(json!({ "alive": true, "count": 0 }))
            .unwrap();
        def
    }

    #[test]
    fn test_records_transitions_from_initialization() {
        let log = TransitionLog::new();
        let mut def = counter();
        def.setup({
            let log = log.clone();
            move |c| {
                log.attach(c);
                Ok(())
            }
        });

        let mut c = def.initialize(()).unwrap();
        c.merge_state(json!({ "count": 1 }));
        c.merge_state(());
        c.replace_state(json!({ "count": 1 }));

        insta::assert_snapshot!(log.lines().join("\n"), @r#"
        #1 initial: {"alive":true,"count":0}
        #2 count: {"alive":true,"count":1}
        #3 unchanged: {"alive":true,"count":1}
        #4 alive: {"count":1}
        "#);
    }

    #[test]
    fn test_detach_and_limit() {
        let log = TransitionLog::with_limit(2);
        let mut c = counter().initialize(()).unwrap();
        let id = log.attach(&mut c);
        for n in 1..=3 {
            c.merge_state(json!({ "count": n }));
        }
        assert_eq!(
            log.records().iter().map(|r| r.seq).collect::<Vec<_>>(),
            [2, 3]
        );

        assert!(log.detach(&mut c, id));
        c.merge_state(json!({ "count": 9 }));
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn test_zero_limit_keeps_nothing() {
        let log = TransitionLog::with_limit(0);
        let mut c = counter().initialize(()).unwrap();
        log.attach(&mut c);
        c.merge_state(json!({ "count": 1 }));
        assert!(log.is_empty());
        c.merge_state(json!({ "count": 2 }));
        assert!(log.lines().is_empty());
    }

    #[test]
    fn test_records_serialize() {
        let log = TransitionLog::new();
        let mut c = counter().initialize(()).unwrap();
        log.attach(&mut c);
        c.merge_state(json!({ "count": 2 }));

        let parsed: Value = serde_json::from_str(&log.to_json().unwrap()).unwrap();
        assert_eq!(
            parsed,
            json!([{
                "seq": 1,
                "changed": ["count"],
                "state": { "alive": true, "count": 2 },
                "previous": { "alive": true, "count": 0 }
            }])
        );
    }
}
