//! Stored monitor state across consecutive runs

use chrono::{Duration, TimeZone, Utc};
use oncall_common::{
    extract_contributors, mentions_line, merge_contributors, ContributorMap, MonitorMessage,
    Release,
};
use pretty_assertions::assert_eq;

const T: i64 = 1_700_000_000_000;

fn on_call() -> Duration {
    Duration::minutes(30)
}

#[test]
fn test_contributors_survive_until_expiry_across_runs() {
    let first_run = Utc.timestamp_millis_opt(T).unwrap();
    let stored = "Payment failures above threshold";

    // Run 1: release mentions alice
    let release = Release::with_body("Shipped by @alice");
    let new_contributors = extract_contributors(Some(&release), on_call(), first_run).unwrap();
    let decoded = MonitorMessage::decode(stored).unwrap();
    let merged = merge_contributors(&decoded.contributors, &new_contributors, first_run);
    let stored = MonitorMessage::new(decoded.description, merged)
        .encode(&mentions_line("@slack-payments", "<@UALICE>"))
        .unwrap();

    // Run 2, ten minutes later: release mentions bob, alice still on call
    let second_run = first_run + Duration::minutes(10);
    let release = Release::with_body("Hotfix from @bob");
    let new_contributors = extract_contributors(Some(&release), on_call(), second_run).unwrap();
    let decoded = MonitorMessage::decode(&stored).unwrap();
    assert_eq!(decoded.description, "Payment failures above threshold");
    let merged = merge_contributors(&decoded.contributors, &new_contributors, second_run);

    let mut expected = ContributorMap::new();
    expected.insert("@alice", T + 30 * 60_000);
    expected.insert("@bob", T + 40 * 60_000);
    assert_eq!(merged, expected);

    let stored = MonitorMessage::new(decoded.description, merged)
        .encode("@slack-payments <@UALICE> <@UBOB>")
        .unwrap();

    // Run 3, after alice's window closed, from an event without a release
    let third_run = first_run + Duration::minutes(35);
    let new_contributors = extract_contributors(None, on_call(), third_run).unwrap();
    let decoded = MonitorMessage::decode(&stored).unwrap();
    let merged = merge_contributors(&decoded.contributors, &new_contributors, third_run);

    let mut expected = ContributorMap::new();
    expected.insert("@bob", T + 40 * 60_000);
    assert_eq!(merged, expected);
}

#[test]
fn test_description_with_surrounding_whitespace_is_trimmed_once() {
    let message = MonitorMessage::new("Latency  ", ContributorMap::new())
        .encode("@chan ")
        .unwrap();

    let decoded = MonitorMessage::decode(&message).unwrap();

    assert_eq!(decoded.description, "Latency");
    assert!(decoded.contributors.is_empty());
}
