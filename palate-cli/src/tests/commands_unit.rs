//! In-process runs of each subcommand against a seeded database.

use super::helpers::{Workspace, invoke};
use super::*;
use palate_scorer::ScoringError;
use palate_social::SocialError;
use rstest::{fixture, rstest};
use serde_json::json;

#[fixture]
fn community() -> Workspace {
    let workspace = Workspace::new();
    workspace.seed_community();
    workspace
}

#[rstest]
fn import_reports_the_number_of_notes() {
    let workspace = Workspace::new();
    let path = workspace.write_notes(
        "notes.json",
        &palate_core::test_support::dishes_for("dora", &[("Ramen", 7), ("Pho", 3)]),
    );
    let data = invoke(&workspace, &["import", path.as_str()]).expect("import succeeds");
    assert_eq!(data, json!({ "imported": 2 }));
    assert!(workspace.database().exists(), "database created in a new directory");
}

#[rstest]
fn import_rejects_malformed_files() {
    let workspace = Workspace::new();
    let path = workspace.write("broken.json", "{ not json");
    let err = invoke(&workspace, &["import", path.as_str()]).expect_err("malformed import");
    match err {
        CliError::Store(palate_data::SqliteStoreError::ParseImport { .. }) => {}
        other => panic!("expected ParseImport, found {other:?}"),
    }
}

#[rstest]
fn similarity_reports_every_category(community: Workspace) {
    let data = invoke(&community, &["similarity", "alice", "bob"]).expect("similarity");
    let entries = data.as_array().expect("array of categories");
    assert_eq!(entries.len(), 3);
    let restaurant = entries.first().expect("restaurant entry");
    assert_eq!(restaurant["category"], "RESTAURANT");
    assert_eq!(restaurant["score"], 1.0);
    assert_eq!(restaurant["overlapCount"], 6);
    assert_eq!(restaurant["insufficientData"], false);
    let wine = entries.get(1).expect("wine entry");
    assert!(wine["score"].is_null());
    assert_eq!(wine["insufficientData"], true);
}

#[rstest]
fn similarity_accepts_a_category_name(community: Workspace) {
    let data = invoke(
        &community,
        &["similarity", "alice", "cara", "--category", "restaurant"],
    )
    .expect("similarity");
    let entries = data.as_array().expect("array of categories");
    assert_eq!(entries.len(), 1);
    assert_eq!(entries.first().map(|entry| &entry["overlapCount"]), Some(&json!(2)));
}

#[rstest]
fn similarity_rejects_unknown_categories(community: Workspace) {
    let err = invoke(&community, &["similarity", "alice", "bob", "--category", "beer"])
        .expect_err("unknown category");
    match err {
        CliError::Scoring(ScoringError::InvalidCategory(parse)) => assert_eq!(parse.name, "beer"),
        other => panic!("expected InvalidCategory, found {other:?}"),
    }
}

#[rstest]
fn can_pin_lists_eligible_categories(community: Workspace) {
    let data = invoke(&community, &["can-pin", "alice", "bob"]).expect("can-pin");
    assert_eq!(data["canPin"], true);
    assert_eq!(data["eligibleCategories"], json!(["RESTAURANT"]));

    let rejected = invoke(&community, &["can-pin", "alice", "cara"]).expect("can-pin");
    assert_eq!(rejected["canPin"], false);
}

#[rstest]
fn pin_is_refused_below_the_threshold(community: Workspace) {
    let err = invoke(
        &community,
        &["pin", "alice", "cara", "--category", "RESTAURANT"],
    )
    .expect_err("ineligible pin");
    match err {
        CliError::Social(SocialError::IneligibleCategory { overlap_count, .. }) => {
            assert_eq!(overlap_count, 2);
        }
        other => panic!("expected IneligibleCategory, found {other:?}"),
    }
}

#[rstest]
fn pin_lifecycle_updates_profile_and_friends(community: Workspace) {
    let pin = invoke(&community, &["pin", "alice", "bob", "--category", "restaurant"])
        .expect("pin");
    assert_eq!(pin["categories"], json!(["RESTAURANT"]));

    let profile = invoke(&community, &["profile", "alice", "bob"]).expect("profile");
    assert_eq!(profile["isPinned"], true);

    let friends = invoke(&community, &["friends", "alice"]).expect("friends");
    assert_eq!(friends.as_array().map(Vec::len), Some(1));

    let unpinned = invoke(
        &community,
        &["unpin", "alice", "bob", "--category", "RESTAURANT"],
    )
    .expect("unpin category");
    assert!(unpinned["remaining"].is_null());

    let after = invoke(&community, &["friends", "alice"]).expect("friends");
    assert_eq!(after, json!([]));
    let removed = invoke(&community, &["unpin", "alice", "bob"]).expect("unpin");
    assert_eq!(removed, json!({ "removed": false }));
}

#[rstest]
fn feed_pages_through_ranked_notes(community: Workspace) {
    let first = invoke(&community, &["feed", "alice", "--limit", "1"]).expect("feed");
    assert_eq!(first["hasMore"], true);
    assert_eq!(first["nextCursor"], "bob-5");

    let rest = invoke(
        &community,
        &["feed", "alice", "--cursor", "bob-5", "--limit", "10"],
    )
    .expect("feed");
    assert_eq!(rest["items"].as_array().map(Vec::len), Some(7));
    assert_eq!(rest["hasMore"], false);
}

#[rstest]
fn bucketed_feed_groups_by_tier(community: Workspace) {
    let buckets = invoke(&community, &["feed", "alice", "--bucketed"]).expect("feed");
    assert_eq!(buckets["tier1"], json!([]));
    assert_eq!(buckets["tier2"].as_array().map(Vec::len), Some(6));
    assert_eq!(buckets["tier4"].as_array().map(Vec::len), Some(2));
}

#[rstest]
fn discover_orders_by_best_score(community: Workspace) {
    let suggestions = invoke(&community, &["discover", "alice"]).expect("discover");
    let users: Vec<&str> = suggestions
        .as_array()
        .expect("array of suggestions")
        .iter()
        .filter_map(|entry| entry["userId"].as_str())
        .collect();
    assert_eq!(users, vec!["bob", "cara"]);

    let limited = invoke(&community, &["discover", "alice", "--limit", "1"]).expect("discover");
    assert_eq!(limited.as_array().map(Vec::len), Some(1));
}
