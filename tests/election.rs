//! Election state machine tests: term dominance, quorum, reconciliation

use linekv::node::{LineStore, NodeAgent, Role};
use std::time::Duration;
use tempfile::TempDir;

fn agent(addr: &str, dir: &TempDir) -> NodeAgent {
    let store = LineStore::open(dir.path().join(format!("{}.txt", addr.replace(':', "_")))).unwrap();
    NodeAgent::new(
        addr.to_string(),
        "127.0.0.1:50050".to_string(),
        Duration::from_millis(100),
        store,
    )
}

#[test]
fn follower_grants_vote_for_strictly_greater_term() {
    let dir = TempDir::new().unwrap();
    let voter = agent("127.0.0.1:7001", &dir);

    let (granted, term) = voter.handle_vote_request("127.0.0.1:7002", 5);
    assert!(granted);
    assert_eq!(term, 5);
    assert_eq!(voter.term(), 5);
    assert_eq!(voter.role(), Role::Follower);

    // Equal term is refused with no state change.
    let (granted, term) = voter.handle_vote_request("127.0.0.1:7003", 5);
    assert!(!granted);
    assert_eq!(term, 5);
}

#[test]
fn candidate_with_majority_becomes_leader() {
    let dir = TempDir::new().unwrap();
    let a = agent("127.0.0.1:7001", &dir);
    let b = agent("127.0.0.1:7002", &dir);
    let c = agent("127.0.0.1:7003", &dir);
    for x in [&a, &b, &c] {
        x.merge_members(vec![
            "127.0.0.1:7001".to_string(),
            "127.0.0.1:7002".to_string(),
            "127.0.0.1:7003".to_string(),
        ]);
    }

    let (term, peers) = a.begin_election();
    assert_eq!(peers.len(), 2);

    let (granted_b, _) = b.handle_vote_request(a.address(), term);
    assert!(granted_b);
    a.record_vote(term);
    let (granted_c, _) = c.handle_vote_request(a.address(), term);
    assert!(granted_c);
    a.record_vote(term);

    assert!(a.try_become_leader(term));
    assert_eq!(a.role(), Role::Leader);
    assert_eq!(a.leader_address().as_deref(), Some("127.0.0.1:7001"));
    // Voters adopted the campaign term.
    assert_eq!(b.term(), term);
    assert_eq!(c.term(), term);
}

#[test]
fn exactly_half_the_votes_is_not_a_majority() {
    let dir = TempDir::new().unwrap();
    let a = agent("127.0.0.1:7001", &dir);
    a.add_member("127.0.0.1:7002");

    // Two members, peer unreachable: only the self-vote, 1 is not > 2/2.
    let (term, _) = a.begin_election();
    assert!(!a.try_become_leader(term));
    assert_eq!(a.role(), Role::Candidate);
}

#[test]
fn single_node_cluster_elects_itself() {
    let dir = TempDir::new().unwrap();
    let a = agent("127.0.0.1:7001", &dir);

    let (term, peers) = a.begin_election();
    assert!(peers.is_empty());
    assert!(a.try_become_leader(term));
    assert!(a.is_leader());
}

#[test]
fn split_leaders_reconcile_on_first_heartbeat() {
    let dir = TempDir::new().unwrap();
    let a = agent("127.0.0.1:7001", &dir);
    let b = agent("127.0.0.1:7002", &dir);

    // Both sides of a partition believe they lead.
    a.become_leader();
    b.become_leader();

    // Delivery resumes: b hears a's heartbeat and steps down.
    b.observe_heartbeat();
    assert_eq!(b.role(), Role::Follower);
    assert!(a.is_leader());
}

#[test]
fn leader_demoted_by_higher_term_vote_request() {
    let dir = TempDir::new().unwrap();
    let a = agent("127.0.0.1:7001", &dir);
    a.become_leader();

    let (granted, term) = a.handle_vote_request("127.0.0.1:7002", a.term() + 1);
    assert!(granted);
    assert_eq!(a.role(), Role::Follower);
    assert_eq!(a.term(), term);
}

#[test]
fn election_not_due_while_heartbeats_flow() {
    let dir = TempDir::new().unwrap();
    let a = agent("127.0.0.1:7001", &dir);

    a.observe_heartbeat();
    assert!(!a.election_due(Duration::from_secs(3)));
    // Silence longer than the timeout triggers a campaign.
    std::thread::sleep(Duration::from_millis(20));
    assert!(a.election_due(Duration::from_millis(10)));

    // A leader never campaigns against itself.
    a.become_leader();
    assert!(!a.election_due(Duration::from_millis(10)));
}
