use linea_core::{ConfidenceTier, EdgeDetails, EdgeKind, LineageEdge};

#[test]
fn serializes_edge_deterministically() {
    let edge = LineageEdge {
        from_asset_id: 11,
        to_asset_id: 7,
        from_column: Some("customer_id".to_string()),
        to_column: Some("id".to_string()),
        kind: EdgeKind::DatabaseFk,
        score: 100,
        tier: ConfidenceTier::Absolute,
        details: EdgeDetails::DatabaseFk {
            constraint: Some("fk_orders_customer".to_string()),
        },
    };

    let json = serde_json::to_string_pretty(&edge).expect("serialize edge");
    let expected = r#"{
  "from_asset_id": 11,
  "to_asset_id": 7,
  "from_column": "customer_id",
  "to_column": "id",
  "kind": "database_fk",
  "score": 100,
  "tier": "absolute",
  "details": {
    "method": "database_fk",
    "constraint": "fk_orders_customer"
  }
}"#;
    assert_eq!(json, expected);
}

#[test]
fn edge_round_trips_through_json() {
    let edge = LineageEdge {
        from_asset_id: 3,
        to_asset_id: 4,
        from_column: None,
        to_column: None,
        kind: EdgeKind::ViewSource,
        score: 90,
        tier: ConfidenceTier::High,
        details: EdgeDetails::ViewSource {
            overlap_count: 5,
            overlap_ratio: 1.0,
            matched_columns: vec!["id".to_string(), "status".to_string()],
        },
    };

    let json = serde_json::to_string(&edge).expect("serialize edge");
    let back: LineageEdge = serde_json::from_str(&json).expect("deserialize edge");
    assert_eq!(back.kind, EdgeKind::ViewSource);
    assert_eq!(back.tier, ConfidenceTier::High);
    assert_eq!(back.key(), edge.key());
}
