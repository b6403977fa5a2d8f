//! Coordinate bounds properties.

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::{dispatcher, RecordingBackend};
use deskpilot_tools::*;
use proptest::prelude::*;
use serde_json::json;

proptest! {
    #[test]
    fn validation_accepts_iff_inside(
        x in -5_000i64..5_000,
        y in -5_000i64..5_000,
        width in 1u32..4_000,
        height in 1u32..4_000,
    ) {
        let display = Display::new(width, height);
        let inside = x >= 0 && x < i64::from(width) && y >= 0 && y < i64::from(height);
        prop_assert_eq!(display.validate(x, y).is_ok(), inside);
        prop_assert_eq!(display.contains(x, y), inside);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn out_of_bounds_pointer_actions_never_touch_device(
        x in prop_oneof![-3_000i64..0, 1_920i64..6_000],
        y in -3_000i64..6_000,
        kind in prop_oneof![
            Just("mouse_move"),
            Just("left_click"),
            Just("right_click"),
            Just("double_click"),
            Just("scroll"),
        ],
    ) {
        let backend = RecordingBackend::new(64, 36);
        let dispatcher = dispatcher(backend.clone());

        let result = tokio_test::block_on(dispatcher.dispatch(&ActionRequest::new(
            "p1",
            "computer",
            json!({"action": kind, "coordinate": [x, y]}),
        )));

        prop_assert!(result.is_error);
        prop_assert!(backend.calls().is_empty());
    }
}
