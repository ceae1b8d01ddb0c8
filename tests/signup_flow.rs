// This file is part of the product Homestead.
// SPDX-FileCopyrightText: 2025-2026 Homestead Contributors
// SPDX-License-Identifier: AGPL-3.0-or-later

mod common;

use common::{request, TestHarness};
use homestead::signup::{SignupError, SignupField};

#[tokio::test]
async fn signup_succeeds_and_provisions_the_landing_page() {
    let harness = TestHarness::new();

    let descriptor = harness
        .service
        .submit(&request("alice", "secret1", ""))
        .await
        .expect("signup");

    assert_eq!(descriptor.username, "alice");
    assert!(descriptor.tags.is_empty());
    assert!(harness.service.sites().site_exists("alice").expect("exists"));
    assert!(harness.landing_path("alice").exists());
}

#[tokio::test]
async fn second_signup_for_the_same_username_is_rejected() {
    let harness = TestHarness::new();

    harness
        .service
        .submit(&request("alice", "secret1", ""))
        .await
        .expect("first signup");
    let err = harness
        .service
        .submit(&request("alice", "secret1", ""))
        .await
        .expect_err("duplicate signup");

    assert!(matches!(err, SignupError::UsernameTaken));
    assert!(err.to_string().contains("already taken"));
    assert_eq!(harness.service.sites().list_sites().expect("list").len(), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn concurrent_duplicate_signups_yield_exactly_one_site() {
    let harness = TestHarness::new();

    let first_request = request("alice", "secret1", "");
    let second_request = request("alice", "secret1", "");
    let first = harness.service.submit(&first_request);
    let second = harness.service.submit(&second_request);
    let (first, second) = tokio::join!(first, second);

    assert_ne!(first.is_ok(), second.is_ok());
    assert_eq!(harness.service.sites().list_sites().expect("list").len(), 1);
    assert!(harness.landing_path("alice").exists());
}

#[tokio::test]
async fn invalid_hostname_usernames_are_rejected() {
    let harness = TestHarness::new();

    for username in ["|\\|0p|E", "nope-", "-nope"] {
        let err = harness
            .service
            .submit(&request(username, "secret1", ""))
            .await
            .expect_err("invalid username");
        assert_eq!(err.field(), SignupField::Username);
        assert_eq!(err.to_string(), "A valid user/site name is required");
    }
}

#[tokio::test]
async fn overlong_username_reports_the_length_cap() {
    let harness = TestHarness::new();
    let username = "a".repeat(65);

    let err = harness
        .service
        .submit(&request(&username, "secret1", ""))
        .await
        .expect_err("overlong username");

    assert!(err.to_string().contains("cannot exceed 32 characters"));
}

#[tokio::test]
async fn short_and_missing_passwords_are_rejected() {
    let harness = TestHarness::new();

    for password in ["", "derp"] {
        let err = harness
            .service
            .submit(&request("alice", password, ""))
            .await
            .expect_err("short password");
        assert_eq!(err.field(), SignupField::Password);
        assert_eq!(
            err.to_string(),
            "Password must be at least 5 characters"
        );
    }
}

#[tokio::test]
async fn password_validation_short_circuits_before_tags() {
    let harness = TestHarness::new();

    let err = harness
        .service
        .submit(&request("bob", "x", "one, two, three, four, five, six"))
        .await
        .expect_err("short password");

    assert_eq!(err.field(), SignupField::Password);
}

#[tokio::test]
async fn tag_errors_carry_the_form_messages() {
    let harness = TestHarness::new();

    let cases = [
        ("$POLICE OFFICER$$$$$, derp", "can only contain"),
        ("police    officer, hi", "cannot have spaces"),
        ("police officer", "cannot be more than 1 word"),
        ("one, two, three, four, five, six", "Cannot have more than 5 tags for your site"),
    ];
    for (tags, fragment) in cases {
        let err = harness
            .service
            .submit(&request("alice", "secret1", tags))
            .await
            .expect_err("tag error");
        assert_eq!(err.field(), SignupField::Tags);
        assert!(
            err.to_string().contains(fragment),
            "expected {:?} in {:?}",
            fragment,
            err.to_string()
        );
    }
}

#[tokio::test]
async fn overlong_tag_reports_the_length_cap() {
    let harness = TestHarness::new();
    let tags = "a".repeat(50);

    let err = harness
        .service
        .submit(&request("alice", "secret1", &tags))
        .await
        .expect_err("overlong tag");

    assert!(err.to_string().contains("cannot be longer than 25"));
}

#[tokio::test]
async fn duplicate_tags_are_stored_once() {
    let harness = TestHarness::new();

    let descriptor = harness
        .service
        .submit(&request("alice", "secret1", "one, one"))
        .await
        .expect("signup");

    assert_eq!(descriptor.tags, vec!["one"]);
    let site = harness
        .service
        .sites()
        .get_site("alice")
        .expect("get")
        .expect("site");
    assert_eq!(site.tags, vec!["one"]);
}

#[tokio::test]
async fn tag_order_of_first_occurrence_is_persisted() {
    let harness = TestHarness::new();

    harness
        .service
        .submit(&request("alice", "secret1", "derpie, shoujo"))
        .await
        .expect("signup");

    let site = harness
        .service
        .sites()
        .get_site("alice")
        .expect("get")
        .expect("site");
    assert_eq!(site.tags, vec!["derpie", "shoujo"]);
}

#[tokio::test]
async fn failed_provisioning_removes_the_site_record() {
    let harness = TestHarness::with_broken_sites_root();

    let err = harness
        .service
        .submit(&request("alice", "secret1", ""))
        .await
        .expect_err("provisioning failure");

    assert!(matches!(err, SignupError::Provisioning(_)));
    assert_eq!(err.field(), SignupField::System);
    assert!(!harness.service.sites().site_exists("alice").expect("exists"));
}

#[tokio::test]
async fn landing_page_greets_the_new_tenant() {
    let harness = TestHarness::new();

    harness
        .service
        .submit(&request("alice", "secret1", ""))
        .await
        .expect("signup");

    let html = std::fs::read_to_string(harness.landing_path("alice")).expect("landing");
    assert!(html.contains("Welcome to alice's new website!"));
}
