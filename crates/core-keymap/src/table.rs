//! Binding table compiled into a key trie.
//!
//! Each node may carry a terminal (index into the binding vector) and a small
//! set of outgoing edges. Lookups never allocate. Removal rebuilds the trie,
//! which is fine at the scale of a mode's command set.

use smallvec::SmallVec;
use tracing::trace;

use core_events::{KeyInput, KeyInputSet};

use crate::{CommandBinding, KeymapError};

#[derive(Debug, Clone)]
struct Edge {
    key: KeyInput,
    next: usize,
}

#[derive(Debug, Clone)]
struct Node {
    terminal: Option<usize>,
    edges: SmallVec<[Edge; 4]>,
}

impl Node {
    fn new() -> Self {
        Self {
            terminal: None,
            edges: SmallVec::new(),
        }
    }
}

/// Lookup result for a partial key sequence.
#[derive(Debug, Clone, Copy)]
pub enum Resolution<'a> {
    /// Exactly one binding has these keys and none extends them.
    Matched(&'a CommandBinding),
    /// A binding has these keys, but longer bindings start with them too.
    Ambiguous(&'a CommandBinding),
    /// Strict prefix of at least one binding.
    NeedMore,
    NoMatch,
}

#[derive(Debug)]
pub struct BindingTable {
    nodes: Vec<Node>,
    bindings: Vec<CommandBinding>,
}

impl Default for BindingTable {
    fn default() -> Self {
        Self::new()
    }
}

impl BindingTable {
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::new()],
            bindings: Vec::new(),
        }
    }

    pub fn build<I: IntoIterator<Item = CommandBinding>>(bindings: I) -> Result<Self, KeymapError> {
        let mut table = Self::new();
        for b in bindings {
            table.add(b)?;
        }
        Ok(table)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Registered bindings in no particular order.
    pub fn commands(&self) -> impl Iterator<Item = &CommandBinding> {
        self.bindings.iter()
    }

    /// Register a binding. A second binding for the same keys is rejected and
    /// the table is left unchanged.
    pub fn add(&mut self, binding: CommandBinding) -> Result<(), KeymapError> {
        if self.get(binding.keys()).is_some() {
            return Err(KeymapError::DuplicateBinding(binding.keys().clone()));
        }
        let idx = self.bindings.len();
        self.insert_path(idx, binding.keys());
        self.bindings.push(binding);
        Ok(())
    }

    /// Remove the binding for `keys`, returning it. Absent keys are ignored.
    pub fn remove(&mut self, keys: &[KeyInput]) -> Option<CommandBinding> {
        let idx = self.bindings.iter().position(|b| b.keys().as_slice() == keys)?;
        let removed = self.bindings.swap_remove(idx);
        self.rebuild();
        Some(removed)
    }

    pub fn get(&self, keys: &[KeyInput]) -> Option<&CommandBinding> {
        let node = self.walk(keys)?;
        self.nodes[node].terminal.map(|i| &self.bindings[i])
    }

    pub fn contains(&self, keys: &[KeyInput]) -> bool {
        self.get(keys).is_some()
    }

    pub fn resolve(&self, keys: &[KeyInput]) -> Resolution<'_> {
        let Some(node_idx) = self.walk(keys) else {
            return Resolution::NoMatch;
        };
        let node = &self.nodes[node_idx];
        match (node.terminal, node.edges.is_empty()) {
            (Some(i), true) => Resolution::Matched(&self.bindings[i]),
            (Some(i), false) => Resolution::Ambiguous(&self.bindings[i]),
            (None, false) => Resolution::NeedMore,
            (None, true) => Resolution::NoMatch,
        }
    }

    /// Longest motion binding whose keys are a strict prefix of `keys`.
    pub fn longest_motion_prefix(&self, keys: &[KeyInput]) -> Option<&CommandBinding> {
        let mut node_idx = 0usize;
        let mut best = None;
        for key in keys.iter().take(keys.len().saturating_sub(1)) {
            let Some(next) = self.step(node_idx, *key) else {
                break;
            };
            node_idx = next;
            if let Some(i) = self.nodes[node_idx].terminal
                && self.bindings[i].is_motion()
            {
                best = Some(&self.bindings[i]);
            }
        }
        best
    }

    /// True when any binding whose keys start with `prefix` satisfies `pred`.
    pub fn any_under<P>(&self, prefix: &[KeyInput], pred: P) -> bool
    where
        P: Fn(&CommandBinding) -> bool,
    {
        let Some(start) = self.walk(prefix) else {
            return false;
        };
        let mut stack = vec![start];
        while let Some(idx) = stack.pop() {
            let node = &self.nodes[idx];
            if let Some(i) = node.terminal
                && pred(&self.bindings[i])
            {
                return true;
            }
            stack.extend(node.edges.iter().map(|e| e.next));
        }
        false
    }

    fn step(&self, node_idx: usize, key: KeyInput) -> Option<usize> {
        self.nodes[node_idx]
            .edges
            .iter()
            .find(|e| e.key == key)
            .map(|e| e.next)
    }

    fn walk(&self, keys: &[KeyInput]) -> Option<usize> {
        let mut node_idx = 0usize;
        for (i, key) in keys.iter().enumerate() {
            node_idx = self.step(node_idx, *key)?;
            trace!(target: "input.map", step = i, key = %key, node = node_idx, "advance");
        }
        Some(node_idx)
    }

    fn insert_path(&mut self, idx: usize, keys: &KeyInputSet) {
        let mut cur = 0usize;
        for key in keys.iter() {
            cur = match self.step(cur, *key) {
                Some(next) => next,
                None => {
                    let new_idx = self.nodes.len();
                    self.nodes.push(Node::new());
                    self.nodes[cur].edges.push(Edge {
                        key: *key,
                        next: new_idx,
                    });
                    new_idx
                }
            };
        }
        self.nodes[cur].terminal = Some(idx);
    }

    fn rebuild(&mut self) {
        self.nodes.clear();
        self.nodes.push(Node::new());
        let keys: Vec<KeyInputSet> = self.bindings.iter().map(|b| b.keys().clone()).collect();
        for (idx, k) in keys.iter().enumerate() {
            self.insert_path(idx, k);
        }
        trace!(
            target: "input.map",
            bindings = self.bindings.len(),
            nodes = self.nodes.len(),
            "trie_rebuilt"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CommandFlags, CommandResult};
    use pretty_assertions::assert_eq;

    fn keys(s: &str) -> KeyInputSet {
        KeyInputSet::from_notation(s).unwrap()
    }

    fn simple(s: &str) -> CommandBinding {
        CommandBinding::simple(keys(s), CommandFlags::empty(), |_| CommandResult::Completed)
    }

    fn motion(s: &str) -> CommandBinding {
        CommandBinding::motion(keys(s), CommandFlags::empty(), |_| CommandResult::Completed)
    }

    fn kind(r: Resolution<'_>) -> String {
        match r {
            Resolution::Matched(b) => format!("matched {}", b.keys()),
            Resolution::Ambiguous(b) => format!("ambiguous {}", b.keys()),
            Resolution::NeedMore => "need more".into(),
            Resolution::NoMatch => "no match".into(),
        }
    }

    #[test]
    fn duplicate_add_is_rejected() {
        let mut t = BindingTable::new();
        t.add(simple("dd")).unwrap();
        let err = t.add(simple("dd")).unwrap_err();
        assert_eq!(err, KeymapError::DuplicateBinding(keys("dd")));
        assert_eq!(t.len(), 1);
    }

    #[test]
    fn duplicate_add_with_other_kind_is_rejected() {
        let mut t = BindingTable::new();
        t.add(simple("x")).unwrap();
        assert!(t.add(motion("x")).is_err());
        assert!(!t.get(&keys("x")).unwrap().is_motion());
    }

    #[test]
    fn remove_absent_is_noop() {
        let mut t = BindingTable::build([simple("a")]).unwrap();
        assert!(t.remove(&keys("zz")).is_none());
        assert_eq!(t.len(), 1);
        assert!(t.contains(&keys("a")));
    }

    #[test]
    fn remove_rebuilds_paths() {
        let mut t = BindingTable::build([simple("ab"), simple("ac"), simple("b")]).unwrap();
        assert!(t.remove(&keys("ab")).is_some());
        assert_eq!(kind(t.resolve(&keys("ab"))), "no match");
        assert_eq!(kind(t.resolve(&keys("a"))), "need more");
        assert_eq!(kind(t.resolve(&keys("ac"))), "matched ac");
        assert_eq!(kind(t.resolve(&keys("b"))), "matched b");
        t.remove(&keys("ac"));
        assert_eq!(kind(t.resolve(&keys("a"))), "no match");
    }

    #[test]
    fn resolve_variants() {
        let t = BindingTable::build([simple("aa"), simple("aab"), simple("g<C-d>")]).unwrap();
        assert_eq!(kind(t.resolve(&keys("a"))), "need more");
        assert_eq!(kind(t.resolve(&keys("aa"))), "ambiguous aa");
        assert_eq!(kind(t.resolve(&keys("aab"))), "matched aab");
        assert_eq!(kind(t.resolve(&keys("aac"))), "no match");
        assert_eq!(kind(t.resolve(&keys("g<C-d>"))), "matched g<C-d>");
        assert_eq!(kind(t.resolve(&keys("gd"))), "no match");
    }

    #[test]
    fn longest_motion_prefix_is_strict() {
        let t = BindingTable::build([motion("a"), motion("aa"), simple("aab")]).unwrap();
        let m = t.longest_motion_prefix(&keys("aac")).unwrap();
        assert_eq!(m.keys(), &keys("aa"));
        assert_eq!(t.longest_motion_prefix(&keys("aa")).unwrap().keys(), &keys("a"));
        assert!(t.longest_motion_prefix(&keys("a")).is_none());
    }

    #[test]
    fn longest_motion_prefix_skips_simple_bindings() {
        let t = BindingTable::build([simple("a"), simple("ab")]).unwrap();
        assert!(t.longest_motion_prefix(&keys("ac")).is_none());
    }

    #[test]
    fn any_under_searches_subtree() {
        let esc = CommandBinding::simple(keys("q<Esc>"), CommandFlags::HANDLES_ESCAPE, |_| {
            CommandResult::Completed
        });
        let t = BindingTable::build([esc, simple("qa")]).unwrap();
        assert!(t.any_under(&keys("q"), CommandBinding::handles_escape));
        assert!(t.any_under(&keys("q<Esc>"), CommandBinding::handles_escape));
        assert!(!t.any_under(&keys("qa"), CommandBinding::handles_escape));
        assert!(!t.any_under(&keys("z"), |_| true));
    }
}
