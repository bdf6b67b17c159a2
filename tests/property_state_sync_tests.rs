use std::collections::BTreeSet;

use chartpro::api::{ChartHandle, ChartSession, ChartSessionConfig, HeadlessChart, Synchronizer};
use chartpro::core::{LiveOverlay, OverlayCreate, OverlayProperties, Point};
use chartpro::store::{ChartStateDocument, MemoryStore, OverlayEntry, StateCodec};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Upsert(u8, i64),
    Remove(u8),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0u8..8, -1_000i64..1_000).prop_map(|(id, ts)| Op::Upsert(id, ts)),
        (0u8..8).prop_map(Op::Remove),
    ]
}

fn overlay(id: u8, timestamp: i64) -> LiveOverlay {
    LiveOverlay::from_create(
        format!("ov{id}"),
        "candle_pane",
        &OverlayCreate::new("segment", vec![Point::new(timestamp, timestamp as f64 / 4.0)]),
    )
}

proptest! {
    #[test]
    fn overlay_list_tracks_upserts_minus_removals(
        ops in prop::collection::vec(op_strategy(), 0..40),
    ) {
        let mut sync = Synchronizer::new(MemoryStore::new());
        let mut expected = BTreeSet::new();
        for op in &ops {
            match op {
                Op::Upsert(id, ts) => {
                    sync.record_overlay_upserted(&overlay(*id, *ts));
                    expected.insert(format!("ov{id}"));
                }
                Op::Remove(id) => {
                    sync.record_overlay_removed(&format!("ov{id}"));
                    expected.remove(&format!("ov{id}"));
                }
            }
        }

        let document = sync.load();
        let stored: Vec<String> =
            document.overlays.iter().map(|entry| entry.id().to_owned()).collect();
        let unique: BTreeSet<String> = stored.iter().cloned().collect();
        prop_assert_eq!(stored.len(), unique.len());
        prop_assert_eq!(unique, expected);
    }

    #[test]
    fn decode_inverts_encode_for_plain_fields(
        points in prop::collection::vec((-1_000_000i64..1_000_000, -4_000_000i32..4_000_000), 0..6),
        lock in any::<bool>(),
        visible in any::<bool>(),
        z_level in -5i32..5,
        label in "[a-z]{0,8}",
    ) {
        let mut create = OverlayCreate::new(
            "priceLine",
            points.iter().map(|(ts, quarter)| Point::new(*ts, f64::from(*quarter) / 4.0)).collect(),
        )
        .with_properties(OverlayProperties::new().with("text", label.clone()));
        create.lock = lock;
        create.visible = visible;
        create.z_level = z_level;
        let live = LiveOverlay::from_create("ov1", "pane_2", &create);

        let document = ChartStateDocument {
            overlays: vec![OverlayEntry::new(
                StateCodec::encode_overlay(&live),
                live.pane_id.clone(),
            )],
            ..ChartStateDocument::default()
        };
        let text = StateCodec::encode(&document).expect("encode");
        let decoded = StateCodec::try_decode(&text).expect("decode");

        prop_assert_eq!(decoded, document);
    }

    #[test]
    fn replay_restores_every_recorded_overlay(count in 0usize..12) {
        let config = ChartSessionConfig::new()
            .with_main_indicators(Vec::new())
            .with_sub_indicators(Vec::new());
        let mut session =
            ChartSession::new(HeadlessChart::new(), MemoryStore::new(), config.clone())
                .expect("session init");
        session.mount(ChartHandle::new("a"));
        let mut ids = Vec::new();
        for i in 0..count {
            let start = i as i64;
            let points = vec![Point::new(start, 1.0), Point::new(start + 1, 2.0)];
            let create = OverlayCreate::new("rect", points);
            ids.push(session.push_overlay(&create, None, false).expect("overlay id"));
        }
        let (_, store) = session.unmount();

        let mut restored =
            ChartSession::new(HeadlessChart::new(), store, config).expect("session init");
        let report = restored.mount(ChartHandle::new("b"));

        prop_assert_eq!(report.overlays_restored, count);
        prop_assert_eq!(restored.chart().overlay_ids(), ids);
    }
}
