// Property tests for size clamping, slider bounds and size formatting
use proptest::prelude::*;

use git_fit::compression::human_size;
use git_fit::geometry::{calculate_slider_position, knob_offset_percent, ContainerRect};
use git_fit::size_unit::{SizeInput, SizeUnit};

fn unit() -> impl Strategy<Value = SizeUnit> {
    prop_oneof![Just(SizeUnit::Kb), Just(SizeUnit::Mb)]
}

fn raw_value() -> impl Strategy<Value = String> {
    prop_oneof![
        (-5000.0f64..5000.0).prop_map(|v| format!("{}", v)),
        (0u32..3000).prop_map(|v| v.to_string()),
        "[a-z]{0,4}",
        Just(String::new()),
    ]
}

proptest! {
    #[test]
    fn clamp_is_idempotent(value in raw_value(), unit in unit()) {
        let mut once = SizeInput::new(value, unit);
        once.clamp();
        let mut twice = once.clone();
        twice.clamp();
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn clamped_value_is_within_unit_bounds(value in raw_value(), unit in unit()) {
        let mut input = SizeInput::new(value, unit);
        input.clamp();
        let parsed: f64 = input.value().parse().expect("clamped value is numeric");
        prop_assert!(parsed >= unit.min() && parsed <= unit.max());
    }

    #[test]
    fn slider_position_stays_within_knob_bounds(
        left in -2000.0f64..2000.0,
        width in 1.0f64..4000.0,
        client_x in -10_000.0f64..10_000.0,
    ) {
        let position = calculate_slider_position(client_x, ContainerRect::new(left, width));
        let offset = knob_offset_percent(width);
        prop_assert!(position >= -offset && position <= 100.0 + offset);
    }

    #[test]
    fn sizes_from_one_million_bytes_are_megabytes(bytes in 1_000_000u64..u64::from(u32::MAX)) {
        prop_assert!(human_size(bytes, 2).ends_with(" MB"));
    }

    #[test]
    fn sizes_below_1024_are_plain_bytes(bytes in 1u64..1024) {
        prop_assert_eq!(human_size(bytes, 2), format!("{} Bytes", bytes));
    }

    #[test]
    fn sizes_between_tiers_are_kilobytes(bytes in 1024u64..1_000_000) {
        prop_assert!(human_size(bytes, 2).ends_with(" KB"));
    }
}
