use chrono::{TimeZone, Utc};

use super::*;

fn sample_new_business() -> NewBusiness {
    NewBusiness {
        name: "Aklan Seafood House".to_string(),
        description: "Grilled catch of the day".to_string(),
        category: Category::Seafood,
        price_tier: PriceTier::Moderate,
        location: Coordinate::new(11.7061, 122.3645),
        address: Address {
            city: Some("Kalibo".to_string()),
            ..Address::default()
        },
        phone: None,
        website: None,
        image_url: None,
        hours: None,
        amenities: BTreeSet::new(),
        owner_id: "owner-1".to_string(),
    }
}

#[test]
fn category_round_trips_through_str() {
    for category in Category::ALL {
        assert_eq!(category.as_str().parse::<Category>().unwrap(), category);
    }
}

#[test]
fn category_parse_accepts_dashes_and_case() {
    assert_eq!("Fast-Food".parse::<Category>().unwrap(), Category::FastFood);
    assert_eq!("fast food".parse::<Category>().unwrap(), Category::FastFood);
    assert!(matches!(
        "sushi-burrito".parse::<Category>(),
        Err(ValidationError::UnknownVariant { field: "category", .. })
    ));
}

#[test]
fn category_serializes_snake_case() {
    let json = serde_json::to_string(&Category::FastFood).unwrap();
    assert_eq!(json, "\"fast_food\"");
}

#[test]
fn price_tier_parses_words_and_symbols() {
    assert_eq!("$$".parse::<PriceTier>().unwrap(), PriceTier::Moderate);
    assert_eq!("LUXURY".parse::<PriceTier>().unwrap(), PriceTier::Luxury);
    assert!("$$$$$".parse::<PriceTier>().is_err());
}

#[test]
fn price_tier_maps_directory_price_levels() {
    assert_eq!(PriceTier::from_price_level(0), Some(PriceTier::Budget));
    assert_eq!(PriceTier::from_price_level(1), Some(PriceTier::Budget));
    assert_eq!(PriceTier::from_price_level(4), Some(PriceTier::Luxury));
    assert_eq!(PriceTier::from_price_level(5), None);
    assert!(PriceTier::Budget < PriceTier::Luxury);
}

#[test]
fn clamp_rating_enforces_range() {
    assert!((clamp_rating(7.2) - 5.0).abs() < f64::EPSILON);
    assert!(clamp_rating(-1.0).abs() < f64::EPSILON);
    assert!(clamp_rating(f64::NAN).abs() < f64::EPSILON);
    assert!((clamp_rating(4.4) - 4.4).abs() < f64::EPSILON);
}

#[test]
fn business_new_is_active_with_default_hours() {
    let now = Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap();
    let b = Business::new(
        "abc",
        "Sample",
        Category::Cafe,
        PriceTier::Budget,
        Coordinate::new(11.0, 122.0),
        ProviderKind::StaticFixture,
        now,
    )
    .with_rating(9.0, 3);
    assert!(b.is_active);
    assert!(!b.is_verified);
    assert_eq!(b.hours, WeeklyHours::default());
    assert!((b.rating - 5.0).abs() < f64::EPSILON);
    assert_eq!(b.review_count, 3);
    assert_eq!(b.created_at, now);
}

#[test]
fn new_business_validation_accepts_well_formed_payload() {
    assert!(sample_new_business().validate().is_ok());
}

#[test]
fn new_business_validation_rejects_blank_name() {
    let mut payload = sample_new_business();
    payload.name = "   ".to_string();
    assert_eq!(payload.validate(), Err(ValidationError::EmptyName));
}

#[test]
fn new_business_validation_rejects_long_name() {
    let mut payload = sample_new_business();
    payload.name = "x".repeat(MAX_NAME_LEN + 1);
    assert!(matches!(
        payload.validate(),
        Err(ValidationError::NameTooLong { len: 201, max: 200 })
    ));
}

#[test]
fn new_business_validation_rejects_missing_owner_and_bad_coordinates() {
    let mut payload = sample_new_business();
    payload.owner_id = String::new();
    assert_eq!(payload.validate(), Err(ValidationError::EmptyOwner));

    let mut payload = sample_new_business();
    payload.location = Coordinate::new(11.0, 200.0);
    assert_eq!(
        payload.validate(),
        Err(ValidationError::LongitudeOutOfRange(200.0))
    );
}

#[test]
fn patch_apply_only_touches_present_fields() {
    let created = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
    let later = Utc.with_ymd_and_hms(2025, 2, 1, 0, 0, 0).unwrap();
    let mut b = Business::new(
        "id-1",
        "Old Name",
        Category::Bakery,
        PriceTier::Budget,
        Coordinate::new(11.0, 122.0),
        ProviderKind::UserContent,
        created,
    );
    let patch = BusinessPatch {
        name: Some("  New Name ".to_string()),
        price_tier: Some(PriceTier::Expensive),
        ..BusinessPatch::default()
    };
    patch.apply(&mut b, later);

    assert_eq!(b.name, "New Name");
    assert_eq!(b.price_tier, PriceTier::Expensive);
    assert_eq!(b.category, Category::Bakery);
    assert_eq!(b.created_at, created);
    assert_eq!(b.updated_at, later);
}

#[test]
fn empty_patch_is_detected() {
    assert!(BusinessPatch::default().is_empty());
    let patch = BusinessPatch {
        is_active: Some(false),
        ..BusinessPatch::default()
    };
    assert!(!patch.is_empty());
}
