//! Membership registry and read-routing cursor
//!
//! Single source of truth for cluster membership and the current leader
//! pointer. One mutex domain covers members, leader index, and the
//! round-robin cursor; contention is low and correctness matters more
//! than throughput here.

use crate::common::{Error, Result};
use std::sync::Mutex;

#[derive(Debug, Default)]
struct RegistryInner {
    /// Known node addresses, insertion-ordered, deduplicated. Grow-only:
    /// there is no removal protocol, departure shows up only as RPC failure.
    members: Vec<String>,
    /// Index into `members`, or None before any node has registered.
    leader: Option<usize>,
    /// Round-robin position for read routing; persists across calls.
    cursor: usize,
}

#[derive(Debug, Default)]
pub struct MembershipRegistry {
    inner: Mutex<RegistryInner>,
}

impl MembershipRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a member if unknown. Idempotent.
    pub fn add_member(&self, addr: &str) {
        let mut inner = self.lock();
        if !inner.members.iter().any(|m| m == addr) {
            inner.members.push(addr.to_string());
        }
    }

    /// First-node bootstrap: claim leadership for `addr` only when no
    /// leader has ever been established. Returns true when it did.
    pub fn bootstrap_leader(&self, addr: &str) -> bool {
        let mut inner = self.lock();
        if inner.leader.is_some() {
            return false;
        }
        if let Some(pos) = inner.members.iter().position(|m| m == addr) {
            inner.leader = Some(pos);
            true
        } else {
            false
        }
    }

    /// Re-leadering after a failed forward to the previous leader.
    pub fn force_leader(&self, addr: &str) {
        let mut inner = self.lock();
        if let Some(pos) = inner.members.iter().position(|m| m == addr) {
            inner.leader = Some(pos);
        }
    }

    /// An election winner announces itself. Unknown addresses are refused;
    /// known ones get the leader pointer and the full membership snapshot
    /// back.
    pub fn declare_leader(&self, addr: &str) -> Result<Vec<String>> {
        let mut inner = self.lock();
        match inner.members.iter().position(|m| m == addr) {
            Some(pos) => {
                inner.leader = Some(pos);
                Ok(inner.members.clone())
            }
            None => Err(Error::NotMember(addr.to_string())),
        }
    }

    pub fn leader_address(&self) -> Option<String> {
        let inner = self.lock();
        inner.leader.map(|i| inner.members[i].clone())
    }

    /// Write routing target: the current leader, if any.
    pub fn write_node(&self) -> Option<String> {
        self.leader_address()
    }

    /// Read routing: advance the round-robin cursor one slot, skipping the
    /// leader unless it is the only member. The skip rule is re-evaluated
    /// against the current snapshot on every call.
    pub fn next_read_node(&self) -> Option<String> {
        let mut inner = self.lock();
        if inner.members.is_empty() {
            return None;
        }
        let len = inner.members.len();
        let mut pos = inner.cursor % len;
        if len > 1 && Some(pos) == inner.leader {
            pos = (pos + 1) % len;
        }
        inner.cursor = (pos + 1) % len;
        Some(inner.members[pos].clone())
    }

    pub fn members(&self) -> Vec<String> {
        self.lock().members.clone()
    }

    pub fn len(&self) -> usize {
        self.lock().members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().members.is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, RegistryInner> {
        self.inner.lock().expect("registry poisoned")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_registration_becomes_leader() {
        let reg = MembershipRegistry::new();
        reg.add_member("a:1");
        assert!(reg.bootstrap_leader("a:1"));
        assert_eq!(reg.leader_address().as_deref(), Some("a:1"));

        reg.add_member("b:2");
        assert!(!reg.bootstrap_leader("b:2"));
        assert_eq!(reg.leader_address().as_deref(), Some("a:1"));
    }

    #[test]
    fn declare_leader_refuses_unknown_address() {
        let reg = MembershipRegistry::new();
        reg.add_member("a:1");
        assert!(matches!(
            reg.declare_leader("ghost:9"),
            Err(Error::NotMember(_))
        ));

        let snapshot = reg.declare_leader("a:1").unwrap();
        assert_eq!(snapshot, vec!["a:1"]);
    }

    #[test]
    fn round_robin_skips_leader_and_visits_all_followers() {
        let reg = MembershipRegistry::new();
        for m in ["a:1", "b:2", "c:3"] {
            reg.add_member(m);
        }
        reg.bootstrap_leader("a:1");

        // Two followers, each visited once before repeating.
        let first = reg.next_read_node().unwrap();
        let second = reg.next_read_node().unwrap();
        let third = reg.next_read_node().unwrap();
        assert_ne!(first, "a:1");
        assert_ne!(second, "a:1");
        assert_ne!(first, second);
        assert_eq!(third, first);
    }

    #[test]
    fn single_member_serves_reads_despite_leading() {
        let reg = MembershipRegistry::new();
        reg.add_member("a:1");
        reg.bootstrap_leader("a:1");
        assert_eq!(reg.next_read_node().as_deref(), Some("a:1"));
        assert_eq!(reg.next_read_node().as_deref(), Some("a:1"));
    }

    #[test]
    fn empty_registry_routes_nothing() {
        let reg = MembershipRegistry::new();
        assert_eq!(reg.next_read_node(), None);
        assert_eq!(reg.write_node(), None);
    }

    #[test]
    fn skip_rule_follows_leader_changes() {
        let reg = MembershipRegistry::new();
        for m in ["a:1", "b:2"] {
            reg.add_member(m);
        }
        reg.bootstrap_leader("a:1");
        assert_eq!(reg.next_read_node().as_deref(), Some("b:2"));

        reg.declare_leader("b:2").unwrap();
        assert_eq!(reg.next_read_node().as_deref(), Some("a:1"));
        assert_eq!(reg.next_read_node().as_deref(), Some("a:1"));
    }
}
