//! Behavioural coverage for pin construction and policy validation.

use std::cell::RefCell;

use chrono::{DateTime, TimeZone, Utc};
use palate_core::{Category, GourmetFriendPin, PinError, PolicyError, TastePolicy, UserId};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};

/// Shared state for the pin and policy scenarios.
pub struct TestContext {
    pinner: RefCell<Option<UserId>>,
    pinned: RefCell<Option<UserId>>,
    outcome: RefCell<Option<Result<GourmetFriendPin, PinError>>>,
    original_created_at: RefCell<Option<DateTime<Utc>>>,
    policy: RefCell<TastePolicy>,
    validation: RefCell<Option<Result<TastePolicy, PolicyError>>>,
}

#[fixture]
/// Build a fresh `TestContext` for each scenario run.
pub fn context() -> TestContext {
    TestContext {
        pinner: RefCell::new(None),
        pinned: RefCell::new(None),
        outcome: RefCell::new(None),
        original_created_at: RefCell::new(None),
        policy: RefCell::new(TastePolicy::default()),
        validation: RefCell::new(None),
    }
}

fn created_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 9, 30, 0)
        .single()
        .expect("valid fixture timestamp")
}

fn attempt_pin(context: &TestContext, categories: Vec<Category>) {
    let pinner = context.pinner.borrow().clone().expect("pinner chosen");
    let pinned = context.pinned.borrow().clone().expect("pinned user chosen");
    *context.outcome.borrow_mut() =
        Some(GourmetFriendPin::new(pinner, pinned, categories, created_at()));
}

fn created_pin(context: &TestContext) -> GourmetFriendPin {
    context
        .outcome
        .borrow()
        .clone()
        .expect("pin attempted")
        .expect("pin accepted")
}

#[given("alice wants to pin bob")]
fn alice_and_bob(context: &TestContext) {
    *context.pinner.borrow_mut() = Some("alice".into());
    *context.pinned.borrow_mut() = Some("bob".into());
}

#[given("alice wants to pin herself")]
fn alice_alone(context: &TestContext) {
    *context.pinner.borrow_mut() = Some("alice".into());
    *context.pinned.borrow_mut() = Some("alice".into());
}

#[given("alice has pinned bob for WINE")]
fn existing_wine_pin(context: &TestContext) {
    alice_and_bob(context);
    attempt_pin(context, vec![Category::Wine]);
    *context.original_created_at.borrow_mut() = Some(created_pin(context).created_at);
}

#[when("she pins bob for WINE")]
fn pin_wine(context: &TestContext) {
    attempt_pin(context, vec![Category::Wine]);
}

#[when("she pins herself for WINE")]
fn pin_self(context: &TestContext) {
    attempt_pin(context, vec![Category::Wine]);
}

#[when("she pins bob for no categories")]
fn pin_nothing(context: &TestContext) {
    attempt_pin(context, Vec::new());
}

#[when("she adds SPIRIT and WINE to the pin")]
fn add_categories(context: &TestContext) {
    let mut pin = created_pin(context);
    pin.merge_categories([Category::Spirit, Category::Wine]);
    *context.outcome.borrow_mut() = Some(Ok(pin));
}

#[then("the pin is created")]
fn pin_created(context: &TestContext) {
    assert!(matches!(*context.outcome.borrow(), Some(Ok(_))));
}

#[then("the pin covers WINE only")]
fn covers_wine_only(context: &TestContext) {
    let pin = created_pin(context);
    assert!(pin.covers(Category::Wine));
    assert_eq!(pin.categories.len(), 1);
}

#[then("the pin covers WINE and SPIRIT")]
fn covers_wine_and_spirit(context: &TestContext) {
    let pin = created_pin(context);
    assert!(pin.covers(Category::Wine));
    assert!(pin.covers(Category::Spirit));
    assert!(!pin.covers(Category::Restaurant));
}

#[then("the creation time is unchanged")]
fn creation_time_kept(context: &TestContext) {
    let original = context
        .original_created_at
        .borrow()
        .expect("original creation time recorded");
    assert_eq!(created_pin(context).created_at, original);
}

#[then("the pin is rejected for having no categories")]
fn rejected_empty(context: &TestContext) {
    assert!(matches!(
        *context.outcome.borrow(),
        Some(Err(PinError::EmptyCategories))
    ));
}

#[then("the pin is rejected as a self pin")]
fn rejected_self(context: &TestContext) {
    assert!(matches!(
        *context.outcome.borrow(),
        Some(Err(PinError::SelfPin { .. }))
    ));
}

#[given("the default taste policy")]
fn default_policy(context: &TestContext) {
    *context.policy.borrow_mut() = TastePolicy::default();
}

#[given("a taste policy whose moderate floor is 0.8")]
fn high_floor(context: &TestContext) {
    context.policy.borrow_mut().moderate_score_floor = 0.8;
}

#[given("a taste policy whose pin threshold is 1.2")]
fn excessive_threshold(context: &TestContext) {
    context.policy.borrow_mut().pin_score_threshold = 1.2;
}

#[when("I validate the policy")]
fn validate_policy(context: &TestContext) {
    let policy = *context.policy.borrow();
    *context.validation.borrow_mut() = Some(policy.validate());
}

#[then("the policy is accepted")]
fn policy_accepted(context: &TestContext) {
    assert!(matches!(*context.validation.borrow(), Some(Ok(_))));
}

#[then("the policy is rejected because the floor exceeds the threshold")]
fn floor_rejected(context: &TestContext) {
    assert!(matches!(
        *context.validation.borrow(),
        Some(Err(PolicyError::FloorAboveThreshold { .. }))
    ));
}

#[then("the policy is rejected because a threshold is out of range")]
fn threshold_rejected(context: &TestContext) {
    assert!(matches!(
        *context.validation.borrow(),
        Some(Err(PolicyError::ThresholdOutOfRange {
            field: "pin_score_threshold",
            ..
        }))
    ));
}

#[scenario(path = "tests/features/pin.feature", index = 0)]
fn single_category_pin(context: TestContext) {
    let _ = context;
}

#[scenario(path = "tests/features/pin.feature", index = 1)]
fn empty_category_pin(context: TestContext) {
    let _ = context;
}

#[scenario(path = "tests/features/pin.feature", index = 2)]
fn self_pin(context: TestContext) {
    let _ = context;
}

#[scenario(path = "tests/features/pin.feature", index = 3)]
fn merged_pin(context: TestContext) {
    let _ = context;
}

#[scenario(path = "tests/features/policy.feature", index = 0)]
fn default_policy_is_valid(context: TestContext) {
    let _ = context;
}

#[scenario(path = "tests/features/policy.feature", index = 1)]
fn floor_above_threshold(context: TestContext) {
    let _ = context;
}

#[scenario(path = "tests/features/policy.feature", index = 2)]
fn threshold_out_of_range(context: TestContext) {
    let _ = context;
}
