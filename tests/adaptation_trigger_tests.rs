use regime_engine::adaptation::{crossed_boundary, should_adapt};

struct Case {
    name: &'static str,
    last: f64,
    current: f64,
    threshold: f64,
    expected: bool,
}

#[test]
fn adaptation_trigger_table() {
    let cases = [
        Case {
            name: "crossing zero below threshold",
            last: -0.1,
            current: 0.1,
            threshold: 0.5,
            expected: true,
        },
        Case {
            name: "crossing zero at default threshold",
            last: -0.1,
            current: 0.1,
            threshold: 0.1,
            expected: true,
        },
        Case {
            name: "crossing bull boundary",
            last: 0.2,
            current: 0.4,
            threshold: 0.33,
            expected: true,
        },
        Case {
            name: "crossing bear boundary",
            last: -0.2,
            current: -0.4,
            threshold: 0.33,
            expected: true,
        },
        Case {
            name: "small change within one band",
            last: 0.1,
            current: 0.15,
            threshold: 0.1,
            expected: false,
        },
        Case {
            name: "large move within the bull band",
            last: 0.4,
            current: 0.95,
            threshold: 0.1,
            expected: true,
        },
        Case {
            name: "large move below a huge threshold",
            last: 0.4,
            current: 0.95,
            threshold: 2.0,
            expected: false,
        },
        Case {
            name: "no movement",
            last: -0.5,
            current: -0.5,
            threshold: 0.0,
            expected: false,
        },
    ];

    for case in cases {
        assert_eq!(
            should_adapt(case.current, case.last, case.threshold),
            case.expected,
            "{}",
            case.name
        );
    }
}

#[test]
fn crossing_is_symmetric_in_direction() {
    for (a, b) in [(-0.1, 0.1), (0.2, 0.4), (-0.2, -0.4), (-0.9, 0.9)] {
        assert!(crossed_boundary(a, b).is_some());
        assert!(crossed_boundary(b, a).is_some());
    }
}

#[test]
fn jump_across_all_boundaries_reports_first_key() {
    assert_eq!(crossed_boundary(0.9, -0.9), Some(-0.33));
    assert_eq!(crossed_boundary(-0.9, 0.9), Some(-0.33));
}
