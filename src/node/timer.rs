//! Heartbeat and election timer loop
//!
//! One background task per node drives failure detection. Each tick: a
//! leader fans out heartbeats; everyone else checks how long the leader has
//! been silent and campaigns when the election timeout lapses. All peer
//! calls are bounded, so the loop can never wedge on a dead node.

use crate::common::NodeConfig;
use crate::node::peers;
use crate::node::state::NodeAgent;
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;

/// Spawn the timer loop for a node agent.
pub fn start_timer(agent: Arc<NodeAgent>, config: NodeConfig) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(config.heartbeat_interval());
        // Per-campaign jitter avoids synchronized candidates livelocking
        // on split votes.
        let mut timeout = config.election_timeout() + jitter();

        loop {
            interval.tick().await;

            if agent.is_leader() {
                broadcast_heartbeats(&agent).await;
            } else if agent.election_due(timeout) {
                run_election(&agent).await;
                timeout = config.election_timeout() + jitter();
            }
        }
    })
}

fn jitter() -> Duration {
    Duration::from_millis(rand::thread_rng().gen_range(0..500))
}

/// Leader fan-out: one empty AppendEntries per peer per tick. Unreachable
/// peers are logged and skipped; they are retried on the next tick.
pub async fn broadcast_heartbeats(agent: &NodeAgent) {
    for peer in agent.peers() {
        if let Err(e) = peers::append_entries(&peer, agent.rpc_timeout()).await {
            tracing::debug!(peer = %peer, error = %e, "heartbeat skipped");
        }
    }
}

/// Run one election round: bump the term, solicit votes sequentially, and
/// promote on a strict majority. A vote response carrying a greater term
/// aborts the campaign; late grants after a step-down are discarded by the
/// role/term check inside `record_vote`.
pub async fn run_election(agent: &NodeAgent) {
    let (term, peers) = agent.begin_election();
    tracing::info!(term, "starting election");

    for peer in &peers {
        match peers::request_vote(peer, agent.address(), term, agent.rpc_timeout()).await {
            Ok(resp) if resp.vote_granted => {
                agent.record_vote(term);
            }
            Ok(resp) => {
                if resp.term > term {
                    tracing::info!(term, observed = resp.term, "superseded, abandoning campaign");
                    agent.step_down(resp.term);
                    return;
                }
            }
            Err(e) => {
                // Timeout or refusal: same thing, that peer did not vote.
                tracing::debug!(peer = %peer, error = %e, "no vote from peer");
            }
        }
    }

    if agent.try_become_leader(term) {
        tracing::info!(term, "elected leader");
        announce_leadership(agent).await;
    }
}

/// Tell the proxy we won and absorb the membership snapshot it returns,
/// which may include nodes registered after our last update.
async fn announce_leadership(agent: &NodeAgent) {
    match peers::declare_leader(agent.proxy_addr(), agent.address(), agent.rpc_timeout()).await {
        Ok(addresses) => agent.merge_members(addresses),
        Err(e) => tracing::warn!(error = %e, "could not announce leadership to proxy"),
    }
}
