//! Before/after advice around `state_changed`.
//!
//! External code observes transitions by registering advice on the instance
//! rather than rewriting its methods. Dispatch works on a snapshot of the
//! registry, so advice may register/remove advice or trigger further
//! transitions while running.

use std::cell::Cell;
use std::rc::Rc;

use smallvec::SmallVec;

use crate::State;

/// Advice callback: `(host, state, previous_state)`.
pub type StateAdvice<H> = Rc<dyn Fn(&mut H, &State, Option<&State>)>;

thread_local! {
    static NEXT_ADVICE_ID: Cell<u64> = const { Cell::new(1) };
}

/// Unique per thread, so an id taken from one instance never matches advice
/// registered on another.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AdviceId(u64);

impl AdviceId {
    fn next() -> Self {
        NEXT_ADVICE_ID.with(|n| {
            let id = n.get();
            n.set(id + 1);
            AdviceId(id)
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum When {
    Before,
    After,
}

type Entries<H> = SmallVec<[(AdviceId, StateAdvice<H>); 2]>;

pub struct Advice<H> {
    before: Entries<H>,
    after: Entries<H>,
}

impl<H> Default for Advice<H> {
    fn default() -> Self {
        Self {
            before: SmallVec::new(),
            after: SmallVec::new(),
        }
    }
}

impl<H> Advice<H> {
    pub fn add(&mut self, when: When, f: StateAdvice<H>) -> AdviceId {
        let id = AdviceId::next();
        match when {
            When::Before => self.before.push((id, f)),
            When::After => self.after.push((id, f)),
        }
        id
    }

    /// Returns `false` if `id` was not registered (or already removed).
    pub fn remove(&mut self, id: AdviceId) -> bool {
        let n = self.before.len() + self.after.len();
        self.before.retain(|(i, _)| *i != id);
        self.after.retain(|(i, _)| *i != id);
        n != self.before.len() + self.after.len()
    }

    pub fn clear(&mut self) {
        self.before.clear();
        self.after.clear();
    }

    pub fn len(&self) -> usize {
        self.before.len() + self.after.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn snapshot(&self, when: When) -> SmallVec<[StateAdvice<H>; 2]> {
        let entries = match when {
            When::Before => &self.before,
            When::After => &self.after,
        };
        entries.iter().map(|(_, f)| f.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop(_: &mut (), _: &State, _: Option<&State>) {}

    #[test]
    fn remove_reports_whether_anything_went() {
        let mut advice = Advice::<()>::default();
        let a = advice.add(When::Before, Rc::new(noop));
        let b = advice.add(When::After, Rc::new(noop));
        assert_ne!(a, b);
        assert_eq!(advice.len(), 2);

        assert!(advice.remove(a));
        assert!(!advice.remove(a));
        assert_eq!(advice.snapshot(When::Before).len(), 0);
        assert_eq!(advice.snapshot(When::After).len(), 1);

        advice.clear();
        assert!(advice.is_empty());
    }

    #[test]
    fn ids_are_not_shared_between_registries() {
        let mut first = Advice::<()>::default();
        let mut second = Advice::<()>::default();
        let kept = first.add(When::After, Rc::new(noop));
        let other = second.add(When::After, Rc::new(noop));
        assert_ne!(kept, other);

        assert!(!first.remove(other));
        assert_eq!(first.len(), 1);
        assert!(first.remove(kept));
    }
}
