use rstest::rstest;
use tb_metrics::version::{
    CompatibilityEvaluator, CompatibilityRange, TargetVersion, Version, VersionEntry,
    channel_label,
};

struct Entry(Option<(&'static str, &'static str)>);

impl VersionEntry for Entry {
    fn compatibility(&self, app: &str) -> Option<(&str, &str)> {
        (app == "thunderbird").then_some(self.0).flatten()
    }
}

fn v(text: &str) -> Version {
    text.parse().unwrap()
}

#[test]
fn versions_sort_by_release_grammar() {
    let mut versions: Vec<Version> = [
        "115.0", "115.0pre1", "115.0b2", "115.0a1", "115.*", "102.15.1", "115.0b10", "115",
    ]
    .into_iter()
    .map(v)
    .collect();

    versions.sort();

    let rendered: Vec<String> = versions.iter().map(Version::to_string).collect();
    assert_eq!(
        rendered,
        vec![
            "102.15.1.0",
            "115.0.0.0a1",
            "115.0.0.0b2",
            "115.0.0.0b10",
            "115.0.0.0pre1",
            "115.0.0.0",
            "115.0.0.0",
            "115.*.0.0",
        ]
    );
}

#[rstest]
#[case("128.*", true)]
#[case("128.2.*", true)]
#[case("128.1", false)]
#[case("*", true)]
fn wildcard_max_admits_every_release_of_the_series(#[case] max: &str, #[case] expected: bool) {
    let range = CompatibilityRange::parse("115.0", max).unwrap();
    assert_eq!(range.contains(&v("128.2.1")), expected);
}

#[test]
fn evaluator_checks_history_when_current_version_is_incompatible() {
    let evaluator = CompatibilityEvaluator::new("thunderbird");
    let target = TargetVersion::parse("115.18.0", "Old ESR").unwrap();
    let current = Entry(Some(("128.0", "*")));
    let history = vec![
        Entry(None),
        Entry(Some(("bogus", "115.*"))),
        Entry(Some(("102.0", "115.*"))),
    ];

    assert!(!evaluator.is_compatible(&target.version, &current));
    assert!(evaluator.is_compatible_with_any(&target.version, &current, &history));
    assert!(!evaluator.is_compatible_with_any(&target.version, &current, &history[..2]));
}

#[rstest]
#[case("133.0a1", "133 Daily")]
#[case("132.0b3", "132 Beta")]
#[case("128.3.1esr", "128 ESR")]
#[case("131.0.2", "131")]
#[case("unknown", "unknown")]
fn channel_labels(#[case] raw: &str, #[case] expected: &str) {
    assert_eq!(channel_label(raw), expected);
}
