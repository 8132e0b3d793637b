//! The state machine compiled from a usage spec.
//!
//! States live in an arena owned by the compiled command; transitions
//! refer to states by [`StateId`]. The graph may contain cycles
//! (introduced by `...`), so traversals carry a visited set.

use std::collections::HashSet;

use crate::matcher::Matcher;

pub(crate) mod engine;

#[cfg(feature = "debug")]
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct StateId(usize);

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Transition {
    pub(crate) matcher: Matcher,
    pub(crate) next: StateId,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct State {
    pub(crate) terminal: bool,
    pub(crate) transitions: Vec<Transition>,
}

#[derive(Debug, Default)]
pub(crate) struct Fsm {
    states: Vec<State>,
}

impl Fsm {
    pub(crate) fn add_state(&mut self) -> StateId {
        self.states.push(State::default());
        StateId(self.states.len() - 1)
    }

    pub(crate) fn state(&self, id: StateId) -> &State {
        &self.states[id.0]
    }

    pub(crate) fn set_terminal(&mut self, id: StateId) {
        self.states[id.0].terminal = true;
    }

    pub(crate) fn add_transition(&mut self, from: StateId, matcher: Matcher, to: StateId) {
        self.states[from.0]
            .transitions
            .push(Transition { matcher, next: to });
    }

    /// Copy every transition of `from` onto `onto`. Used by the spec
    /// parser to splice a fragment's entry state into a sequence tail.
    pub(crate) fn absorb(&mut self, onto: StateId, from: StateId) {
        let transitions = self.states[from.0].transitions.clone();
        self.states[onto.0].transitions.extend(transitions);
    }

    /// Deep-copy the fragment reachable from `start`, returning the
    /// copies of `start` and `end`. Matchers are shared by value; states
    /// are duplicated so the copy can be rewired independently.
    pub(crate) fn clone_fragment(&mut self, start: StateId, end: StateId) -> (StateId, StateId) {
        let mut reachable = Vec::default();
        let mut seen = HashSet::new();
        let mut pending = vec![start];
        while let Some(id) = pending.pop() {
            if !seen.insert(id) {
                continue;
            }
            reachable.push(id);
            for transition in &self.states[id.0].transitions {
                pending.push(transition.next);
            }
        }
        let mut mapping = std::collections::HashMap::new();
        for id in &reachable {
            let copy = self.add_state();
            self.states[copy.0].terminal = self.states[id.0].terminal;
            mapping.insert(*id, copy);
        }
        // A detached exit state (degenerate fragment) maps to a fresh
        // state; its transitions would point outside the fragment.
        if !mapping.contains_key(&end) {
            let copy = self.add_state();
            self.states[copy.0].terminal = self.states[end.0].terminal;
            mapping.insert(end, copy);
        }
        for id in &reachable {
            let transitions: Vec<Transition> = self.states[id.0]
                .transitions
                .iter()
                .map(|t| Transition {
                    matcher: t.matcher.clone(),
                    next: mapping[&t.next],
                })
                .collect();
            self.states[mapping[id].0].transitions = transitions;
        }

        (mapping[&start], mapping[&end])
    }

    /// True when no `Arg` matcher is reachable from `start`: the
    /// certification that lets a sequence reorder adjacent fragments.
    pub(crate) fn is_option_only(&self, start: StateId) -> bool {
        let mut seen = HashSet::new();
        let mut pending = vec![start];
        while let Some(id) = pending.pop() {
            if !seen.insert(id) {
                continue;
            }
            for transition in &self.states[id.0].transitions {
                if matches!(transition.matcher, Matcher::Arg { .. }) {
                    return false;
                }
                pending.push(transition.next);
            }
        }
        true
    }

    /// Ready the machine for the engine: eliminate shortcut transitions,
    /// propagate terminality, and order every transition list by matcher
    /// priority.
    pub(crate) fn prepare(&mut self, root: StateId) {
        let mut visited = HashSet::new();
        self.simplify(root, &mut visited);

        #[cfg(feature = "debug")]
        {
            debug!(
                states = self.states.len(),
                reachable = visited.len(),
                "prepared usage automaton"
            );
        }

        for (index, state) in self.states.iter_mut().enumerate() {
            // An opts-end self loop consumes no input; dropping it keeps
            // the language and guarantees the engine makes progress.
            state
                .transitions
                .retain(|t| !(t.next == StateId(index) && t.matcher == Matcher::OptsEnd));
            state.transitions.sort_by_key(|t| t.matcher.priority());
            debug_assert!(
                !visited.contains(&StateId(index))
                    || state.transitions.iter().all(|t| !t.matcher.is_shortcut()),
                "simplify must remove every shortcut"
            );
        }
    }

    fn simplify(&mut self, id: StateId, visited: &mut HashSet<StateId>) {
        if !visited.insert(id) {
            return;
        }

        let nexts: Vec<StateId> = self.states[id.0]
            .transitions
            .iter()
            .map(|t| t.next)
            .collect();
        for next in nexts {
            self.simplify(next, visited);
        }

        while self.simplify_self(id) {}
    }

    /// Remove one outgoing shortcut, splicing in the target's
    /// transitions and terminality. Returns false once none remain.
    fn simplify_self(&mut self, id: StateId) -> bool {
        let position = self.states[id.0]
            .transitions
            .iter()
            .position(|t| t.matcher.is_shortcut());
        let Some(position) = position else {
            return false;
        };

        let next = self.states[id.0].transitions.remove(position).next;
        let absorbed = self.states[next.0].transitions.clone();
        let terminal = self.states[next.0].terminal;

        let state = &mut self.states[id.0];
        for transition in absorbed {
            if !state.transitions.contains(&transition) {
                state.transitions.push(transition);
            }
        }
        if terminal {
            state.terminal = true;
        }

        true
    }
}
