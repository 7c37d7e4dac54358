//! Node role state machine
//!
//! All election state lives in a single [`NodeState`] struct behind one
//! mutex. RPC handlers and the timer loop both mutate it, so every
//! read-modify-write goes through an accessor on [`NodeAgent`] and no lock
//! is ever held across an await point.

use crate::node::store::LineStore;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// The three mutually exclusive roles a node holds at any instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Follower,
    Candidate,
    Leader,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Follower => write!(f, "follower"),
            Role::Candidate => write!(f, "candidate"),
            Role::Leader => write!(f, "leader"),
        }
    }
}

/// Election and membership state owned by one node agent.
#[derive(Debug)]
pub struct NodeState {
    /// Election epoch; never decremented.
    pub term: u64,
    pub role: Role,
    /// Vote tally, meaningful only while `role == Candidate`.
    pub votes: usize,
    /// Last accepted leader contact.
    pub last_heartbeat: Instant,
    /// Best-known leader; may be stale.
    pub leader_address: Option<String>,
    /// Known member addresses, insertion-ordered, deduplicated,
    /// always containing this node's own address. Grow-only.
    pub members: Vec<String>,
}

/// Owner of a node's state, storage, and identity.
pub struct NodeAgent {
    address: String,
    proxy_addr: String,
    rpc_timeout: Duration,
    store: LineStore,
    state: Mutex<NodeState>,
}

impl NodeAgent {
    pub fn new(
        address: String,
        proxy_addr: String,
        rpc_timeout: Duration,
        store: LineStore,
    ) -> Self {
        let state = NodeState {
            term: 0,
            role: Role::Follower,
            votes: 0,
            last_heartbeat: Instant::now(),
            leader_address: None,
            members: vec![address.clone()],
        };
        Self {
            address,
            proxy_addr,
            rpc_timeout,
            store,
            state: Mutex::new(state),
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn proxy_addr(&self) -> &str {
        &self.proxy_addr
    }

    pub fn rpc_timeout(&self) -> Duration {
        self.rpc_timeout
    }

    pub fn store(&self) -> &LineStore {
        &self.store
    }

    fn lock(&self) -> MutexGuard<'_, NodeState> {
        self.state.lock().expect("node state poisoned")
    }

    // === RPC-driven transitions ===

    /// Accept a heartbeat: reset the failure-detection timer and force the
    /// role to Follower. A leader hearing another leader steps down here,
    /// which is what reconciles split authority once messages flow again.
    pub fn observe_heartbeat(&self) {
        let mut s = self.lock();
        if s.role == Role::Leader {
            tracing::info!(term = s.term, "received foreign heartbeat, stepping down");
        }
        s.role = Role::Follower;
        s.votes = 0;
        s.last_heartbeat = Instant::now();
    }

    /// Vote-granting rule: grant iff the candidate's term is strictly
    /// greater than ours. Granting adopts the term and reverts to Follower.
    /// No log-completeness check is made; this is a simplified election.
    pub fn handle_vote_request(&self, candidate: &str, term: u64) -> (bool, u64) {
        let mut s = self.lock();
        if term > s.term {
            tracing::info!(candidate, term, "granting vote");
            s.term = term;
            s.role = Role::Follower;
            s.votes = 0;
            (true, s.term)
        } else {
            tracing::debug!(candidate, term, current = s.term, "refusing vote");
            (false, s.term)
        }
    }

    // === Election-driven transitions ===

    /// Enter a new campaign: Candidate role, next term, self-vote.
    /// Returns the campaign term and the peers to solicit.
    pub fn begin_election(&self) -> (u64, Vec<String>) {
        let mut s = self.lock();
        s.role = Role::Candidate;
        s.term += 1;
        s.votes = 1;
        let peers = peers_of(&s, &self.address);
        (s.term, peers)
    }

    /// Count a granted vote, but only while still campaigning in the same
    /// term. Late grants arriving after a step-down are discarded here.
    pub fn record_vote(&self, term: u64) -> usize {
        let mut s = self.lock();
        if s.role == Role::Candidate && s.term == term {
            s.votes += 1;
        }
        s.votes
    }

    /// Promote to Leader iff still a Candidate in `term` holding a strict
    /// majority of the known membership.
    pub fn try_become_leader(&self, term: u64) -> bool {
        let mut s = self.lock();
        if s.role == Role::Candidate && s.term == term && s.votes > s.members.len() / 2 {
            s.role = Role::Leader;
            s.leader_address = Some(self.address.clone());
            true
        } else {
            false
        }
    }

    /// A strictly greater term always wins: adopt it and revert to Follower.
    pub fn step_down(&self, term: u64) {
        let mut s = self.lock();
        if term > s.term {
            s.term = term;
        }
        s.role = Role::Follower;
        s.votes = 0;
    }

    /// Bootstrap promotion, used when the proxy marks this node leader at
    /// registration time (first node in an empty cluster).
    pub fn become_leader(&self) {
        let mut s = self.lock();
        s.role = Role::Leader;
        s.leader_address = Some(self.address.clone());
    }

    // === Membership ===

    /// Record another node as the current leader and as a member.
    pub fn note_leader(&self, addr: &str) {
        let mut s = self.lock();
        s.leader_address = Some(addr.to_string());
        push_unique(&mut s.members, addr);
    }

    pub fn add_member(&self, addr: &str) {
        let mut s = self.lock();
        push_unique(&mut s.members, addr);
    }

    pub fn merge_members<I: IntoIterator<Item = String>>(&self, addrs: I) {
        let mut s = self.lock();
        for addr in addrs {
            push_unique(&mut s.members, &addr);
        }
    }

    // === Reads ===

    pub fn role(&self) -> Role {
        self.lock().role
    }

    pub fn is_leader(&self) -> bool {
        self.lock().role == Role::Leader
    }

    pub fn term(&self) -> u64 {
        self.lock().term
    }

    pub fn leader_address(&self) -> Option<String> {
        self.lock().leader_address.clone()
    }

    pub fn members(&self) -> Vec<String> {
        self.lock().members.clone()
    }

    /// Known members excluding this node.
    pub fn peers(&self) -> Vec<String> {
        let s = self.lock();
        peers_of(&s, &self.address)
    }

    /// True when this node should campaign: it is not the leader and has
    /// heard nothing from one for longer than `timeout`.
    pub fn election_due(&self, timeout: Duration) -> bool {
        let s = self.lock();
        s.role != Role::Leader && s.last_heartbeat.elapsed() > timeout
    }
}

fn peers_of(s: &NodeState, own: &str) -> Vec<String> {
    s.members.iter().filter(|m| *m != own).cloned().collect()
}

fn push_unique(members: &mut Vec<String>, addr: &str) {
    if !addr.is_empty() && !members.iter().any(|m| m == addr) {
        members.push(addr.to_string());
    }
}
