//! # Consensus Flows
//!
//! A prepared DAG is submitted to one node's intake, which journals each
//! event, inserts it into the hashgraph and applies decided rounds to the
//! platform state.
//!
//! ## Flows Tested:
//!
//! 1. **First event**: the genesis event of a four-member network becomes a
//!    famous round-1 witness and is ordered first
//! 2. **Determinism**: any topological insertion order yields the same order
//! 3. **Idempotence**: a duplicate changes nothing
//! 4. **Forgery**: a bad signature is rejected and the sender penalized
//! 5. **Orphans**: an event waits for its parent
//! 6. **Delivery**: rounds are final, consecutive and topologically ordered

#[cfg(test)]
mod tests {
    use crate::fixtures::{consensus_order, shuffled_topological, DagBuilder, Pipeline};
    use hg_02_event_intake::{EventIntakeApi, IntakeOutcome, ValidationError};
    use shared_types::{ConsensusRound, GossipEvent, Hash, NodeId, ROUND_FIRST};
    use std::collections::HashSet;

    async fn submit_all(pipeline: &Pipeline, events: &[GossipEvent]) {
        for event in events {
            let sender = Some(event.event.creator);
            let outcome = pipeline.intake.submit(event.clone(), sender).await.unwrap();
            assert!(outcome.is_accepted(), "{outcome:?}");
        }
    }

    #[tokio::test]
    async fn test_genesis_event_famous_and_ordered_first() {
        let dir = tempfile::tempdir().unwrap();
        let mut dag = DagBuilder::new(4, 1);
        let e1 = dag.create(0, None);
        for creator in 1..4 {
            dag.create(creator, Some(0));
        }
        for _ in 0..30 {
            dag.ring();
        }

        let mut pipeline = Pipeline::open(dir.path(), dag.rosters(), 5);
        submit_all(&pipeline, dag.events()).await;
        let rounds = pipeline.drain_rounds();

        let first = rounds.first().expect("round 1 decided");
        assert_eq!(first.round, ROUND_FIRST);
        assert!(first.judges.contains(&e1.event.hash()));
        assert_eq!(first.events[0].event.hash(), e1.event.hash());
        assert_eq!(first.events[0].consensus_order, 0);
        assert_eq!(first.events[0].round_received, ROUND_FIRST);
        assert!(pipeline.state.current().round >= ROUND_FIRST);
    }

    #[tokio::test]
    async fn test_insertion_order_does_not_change_consensus() {
        let mut dag = DagBuilder::new(4, 7);
        dag.random(240);

        let dir_a = tempfile::tempdir().unwrap();
        let mut a = Pipeline::open(dir_a.path(), dag.rosters(), 5);
        submit_all(&a, dag.events()).await;
        let order_a = consensus_order(&a.drain_rounds());

        let dir_b = tempfile::tempdir().unwrap();
        let mut b = Pipeline::open(dir_b.path(), dag.rosters(), 5);
        submit_all(&b, &shuffled_topological(dag.events(), 99)).await;
        let order_b = consensus_order(&b.drain_rounds());

        let reference = consensus_order(dag.decided());
        let common = order_a.len().min(order_b.len()).min(reference.len());
        assert!(common > 0);
        assert_eq!(order_a[..common], order_b[..common]);
        assert_eq!(order_a[..common], reference[..common]);

        let (state_a, state_b) = (a.state.current(), b.state.current());
        if state_a.round == state_b.round {
            assert_eq!(state_a.running_hash, state_b.running_hash);
        }
    }

    #[tokio::test]
    async fn test_duplicate_changes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut dag = DagBuilder::new(4, 3);
        dag.random(80);
        let pipeline = Pipeline::open(dir.path(), dag.rosters(), 5);
        submit_all(&pipeline, dag.events()).await;

        let status = pipeline.intake.status().await;
        let state = pipeline.state.current();
        let added = pipeline.sink.added().len();

        let last = dag.events().last().unwrap().clone();
        let outcome = pipeline.intake.submit(last, Some(NodeId(2))).await.unwrap();

        assert_eq!(outcome, IntakeOutcome::Duplicate);
        assert_eq!(pipeline.intake.status().await, status);
        assert_eq!(pipeline.state.current(), state);
        assert_eq!(pipeline.sink.added().len(), added);
        assert!(pipeline.penalizer.penalized().is_empty());
    }

    #[tokio::test]
    async fn test_forged_signature_rejected_and_sender_penalized() {
        let dir = tempfile::tempdir().unwrap();
        let mut dag = DagBuilder::new(4, 5);
        dag.random(20);
        let (last, earlier) = dag.events().split_last().unwrap();
        let pipeline = Pipeline::open(dir.path(), dag.rosters(), 5);
        submit_all(&pipeline, earlier).await;
        let known = pipeline.intake.status().await.known_events;

        let mut forged = last.clone();
        forged.signature[7] ^= 0x55;
        let outcome = pipeline.intake.submit(forged, Some(NodeId(2))).await.unwrap();

        assert_eq!(outcome, IntakeOutcome::Invalid(ValidationError::InvalidSignature));
        assert_eq!(
            pipeline.penalizer.penalized(),
            vec![(NodeId(2), ValidationError::InvalidSignature)]
        );
        assert_eq!(pipeline.intake.status().await.known_events, known);
        assert!(!pipeline.sink.added().contains(&last.event.hash()));

        // the genuine event is still welcome
        let outcome = pipeline.intake.submit(last.clone(), Some(NodeId(1))).await.unwrap();
        assert!(outcome.is_accepted());
    }

    #[tokio::test]
    async fn test_tampered_body_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut dag = DagBuilder::new(4, 6);
        let event = dag.create(1, None);
        let pipeline = Pipeline::open(dir.path(), dag.rosters(), 5);

        let mut tampered = event;
        tampered.event.transactions.push(b"injected".to_vec());
        let outcome = pipeline.intake.submit(tampered, Some(NodeId(3))).await.unwrap();

        assert_eq!(outcome, IntakeOutcome::Invalid(ValidationError::InvalidSignature));
        assert!(pipeline.sink.added().is_empty());
    }

    #[tokio::test]
    async fn test_orphan_inserted_after_its_parent() {
        let dir = tempfile::tempdir().unwrap();
        let mut dag = DagBuilder::new(4, 8);
        let parent = dag.create(0, None);
        let child = dag.create(1, Some(0));
        let pipeline = Pipeline::open(dir.path(), dag.rosters(), 5);

        let outcome = pipeline.intake.submit(child.clone(), Some(NodeId(1))).await.unwrap();
        assert_eq!(
            outcome,
            IntakeOutcome::Orphan {
                missing: vec![parent.event.hash()]
            }
        );
        assert!(pipeline.sink.added().is_empty());

        let outcome = pipeline.intake.submit(parent.clone(), Some(NodeId(0))).await.unwrap();
        assert!(outcome.is_accepted());
        assert_eq!(
            pipeline.sink.added(),
            vec![parent.event.hash(), child.event.hash()]
        );
        assert_eq!(pipeline.intake.status().await.orphans, 0);
    }

    fn assert_delivery_invariants(rounds: &[ConsensusRound]) {
        let mut delivered: HashSet<Hash> = HashSet::new();
        let mut next_order = 0;
        let mut last_timestamp = None;
        for (i, round) in rounds.iter().enumerate() {
            assert_eq!(round.round, ROUND_FIRST + i as u64);
            assert_eq!(round.snapshot.round, round.round);
            for event in &round.events {
                assert_eq!(event.consensus_order, next_order);
                assert_eq!(event.round_received, round.round);
                if let Some(last) = last_timestamp {
                    assert!(event.consensus_timestamp > last);
                }
                for parent in event.event.parents() {
                    assert!(
                        delivered.contains(&parent.hash),
                        "event delivered before its parent"
                    );
                }
                delivered.insert(event.event.hash());
                next_order += 1;
                last_timestamp = Some(event.consensus_timestamp);
            }
            if let Some(last) = round.events.last() {
                assert!(last.last_in_round);
                assert_eq!(round.consensus_timestamp, last.consensus_timestamp);
            }
        }
    }

    #[tokio::test]
    async fn test_rounds_final_consecutive_and_topological() {
        let dir = tempfile::tempdir().unwrap();
        let mut dag = DagBuilder::new(5, 11);
        dag.random(300);
        let (early, late) = dag.events().split_at(150);
        let mut pipeline = Pipeline::open(dir.path(), dag.rosters(), 5);

        submit_all(&pipeline, early).await;
        let mut rounds = pipeline.drain_rounds();
        let decided_early = rounds.len();
        submit_all(&pipeline, late).await;
        rounds.extend(pipeline.drain_rounds());

        assert!(rounds.len() >= 2);
        assert!(rounds.len() >= decided_early);
        assert_delivery_invariants(&rounds);

        // decided rounds are never revised by later events
        let reference = consensus_order(dag.decided());
        let delivered = consensus_order(&rounds);
        assert_eq!(delivered[..], reference[..delivered.len()]);

        let state = pipeline.state.current();
        let last = rounds.last().unwrap();
        assert_eq!(state.round, last.round);
        assert_eq!(state.consensus_events, delivered.len() as u64);
    }
}
