//! Eligibility matching against the remote descriptor.

use boneclone_core::RemoteDescriptor;
use rstest::rstest;

fn descriptor(accepts: &[&str]) -> RemoteDescriptor {
    RemoteDescriptor {
        accepts: accepts.iter().map(|s| s.to_string()).collect(),
        reviewers: vec![],
    }
}

#[rstest]
#[case(&["php-skeleton"], "php-skeleton", true)]
#[case(&["  php-skeleton  "], "php-skeleton", true)]
#[case(&["php-skeleton"], "  php-skeleton\t", true)]
#[case(&["go-skeleton", "php-skeleton"], "php-skeleton", true)]
#[case(&["php-skeleton-v2"], "php-skeleton", false)]
#[case(&["PHP-Skeleton"], "php-skeleton", false)]
#[case(&[], "php-skeleton", false)]
#[case(&["php-skeleton"], "", false)]
#[case(&[""], "", false)]
#[case(&["  "], "   ", false)]
fn accepts_skeleton(#[case] accepts: &[&str], #[case] skeleton: &str, #[case] expected: bool) {
    assert_eq!(descriptor(accepts).accepts_skeleton(skeleton), expected);
}

#[test]
fn parses_accepts_and_reviewers() {
    let d = RemoteDescriptor::from_yaml("accepts:\n  - php-skeleton\nreviewers:\n  - alice\n  - bob\n")
        .expect("parse");
    assert_eq!(d.accepts, vec!["php-skeleton"]);
    assert_eq!(d.reviewers, vec!["alice", "bob"]);
}

#[test]
fn reviewers_are_optional() {
    let d = RemoteDescriptor::from_yaml("accepts: [a]\n").expect("parse");
    assert!(d.reviewers.is_empty());
}

#[rstest]
#[case("accepts: php-skeleton\n")]
#[case("accepts: [unclosed\n")]
#[case("- just\n- a list\n")]
fn malformed_descriptors_fail_to_parse(#[case] yaml: &str) {
    assert!(RemoteDescriptor::from_yaml(yaml).is_err());
}
