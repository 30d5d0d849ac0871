//! # Restart Flows
//!
//! A node that stops at any point resumes from its latest platform state
//! checkpoint and replays its preconsensus event stream, then reaches the
//! same consensus as a node that never stopped.

#[cfg(test)]
mod tests {
    use crate::fixtures::{consensus_order, DagBuilder, Pipeline};
    use hg_02_event_intake::EventIntakeApi;
    use hg_06_pces::replay;
    use shared_types::GossipEvent;

    async fn submit_all(pipeline: &Pipeline, events: &[GossipEvent]) {
        for event in events {
            let outcome = pipeline
                .intake
                .submit(event.clone(), Some(event.event.creator))
                .await
                .unwrap();
            assert!(outcome.is_accepted(), "{outcome:?}");
        }
    }

    /// Load the checkpoint snapshot and replay the journal, as node startup
    /// does. Returns the number of replayed events inserted.
    async fn resume(pipeline: &Pipeline, directory: &std::path::Path) -> usize {
        let resumed = pipeline.state.current();
        if !resumed.is_genesis() {
            pipeline.intake.load_snapshot(&resumed.snapshot).await;
        }
        let threshold = resumed.event_window.ancient_threshold;
        let outcome = replay(&directory.join("pces"), threshold).unwrap();
        assert_eq!(outcome.damaged_segments, 0);
        let mut inserted = 0;
        for event in outcome.events {
            if pipeline.intake.replay(event).await.unwrap().is_accepted() {
                inserted += 1;
            }
        }
        inserted
    }

    #[tokio::test]
    async fn test_crashed_node_matches_live_node() {
        let mut dag = DagBuilder::new(4, 21);
        dag.random(400);
        let (before, after) = dag.events().split_at(250);

        let live_dir = tempfile::tempdir().unwrap();
        let mut live = Pipeline::open(live_dir.path(), dag.rosters(), 2);
        submit_all(&live, dag.events()).await;
        let live_rounds = live.drain_rounds();

        let dir = tempfile::tempdir().unwrap();
        let crashed_round = {
            let mut first = Pipeline::open(dir.path(), dag.rosters(), 2);
            submit_all(&first, before).await;
            first.drain_rounds();
            // no shutdown checkpoint: only interval checkpoints survive
            first.journal.close();
            first.state.current().round
        };
        assert!(crashed_round >= 2);

        let mut restarted = Pipeline::open(dir.path(), dag.rosters(), 2);
        let resumed = restarted.state.current();
        assert!(resumed.round <= crashed_round);
        assert_eq!(resumed.round % 2, 0);

        let replayed = resume(&restarted, dir.path()).await;
        assert!(replayed > 0);
        submit_all(&restarted, after).await;
        let restarted_rounds = restarted.drain_rounds();

        // delivery continues right after the checkpoint
        assert_eq!(restarted_rounds.first().map(|r| r.round), Some(resumed.round + 1));
        let expected: Vec<_> = live_rounds
            .iter()
            .filter(|r| r.round > resumed.round)
            .cloned()
            .collect();
        assert_eq!(consensus_order(&restarted_rounds), consensus_order(&expected));

        let (a, b) = (restarted.state.current(), live.state.current());
        assert_eq!(a.round, b.round);
        assert_eq!(a.running_hash, b.running_hash);
        assert_eq!(a.consensus_events, b.consensus_events);
    }

    #[tokio::test]
    async fn test_clean_shutdown_resumes_at_last_round() {
        let mut dag = DagBuilder::new(4, 31);
        dag.random(200);
        let dir = tempfile::tempdir().unwrap();

        let stopped = {
            let first = Pipeline::open(dir.path(), dag.rosters(), 1_000);
            submit_all(&first, dag.events()).await;
            first.state.checkpoint().unwrap();
            first.journal.close();
            first.state.current()
        };
        assert!(stopped.round > 0);

        let restarted = Pipeline::open(dir.path(), dag.rosters(), 1_000);
        assert_eq!(restarted.state.current(), stopped);
        resume(&restarted, dir.path()).await;

        // replay re-decides nothing past the checkpoint
        assert_eq!(restarted.state.current(), stopped);
        let status = restarted.intake.status().await;
        assert_eq!(status.event_window, stopped.event_window);
    }
}
