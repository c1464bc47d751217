use regime_engine::adaptation::types::{FUNDAMENTALS, LONG_TERM};
use regime_engine::adaptation::{AdaptiveParameterMapper, WEIGHT_CATEGORIES};

fn score_grid() -> Vec<f64> {
    (-100..=100).map(|i| i as f64 / 100.0).collect()
}

#[test]
fn weights_sum_to_one_for_every_score() {
    let mapper = AdaptiveParameterMapper::default();
    for score in score_grid() {
        let sum = mapper.weights(score).sum();
        assert!((sum - 1.0).abs() <= 0.01, "score {score} sums to {sum}");
    }
}

#[test]
fn weights_always_carry_every_category() {
    let mapper = AdaptiveParameterMapper::default();
    for score in [-1.0, -0.3, 0.0, 0.6, 1.0] {
        let weights = mapper.weights(score);
        assert_eq!(weights.len(), WEIGHT_CATEGORIES.len());
        for category in WEIGHT_CATEGORIES {
            let w = weights.get(category).expect("category present");
            assert!((0.0..=1.0).contains(&w), "{category}={w}");
        }
    }
}

#[test]
fn bull_market_shifts_weight_to_long_term() {
    let mapper = AdaptiveParameterMapper::default();
    for score in [0.5, 0.6] {
        let weights = mapper.weights(score);
        assert!(weights.get(LONG_TERM).unwrap() > 0.25);
        assert!(weights.get(FUNDAMENTALS).unwrap() < 0.20);
    }
}

#[test]
fn bear_market_shifts_weight_to_fundamentals() {
    let mapper = AdaptiveParameterMapper::default();
    let weights = mapper.weights(-0.5);
    assert!(weights.get(LONG_TERM).unwrap() < 0.25);
    assert!(weights.get(FUNDAMENTALS).unwrap() > 0.20);
}

#[test]
fn blend_is_monotonically_non_increasing() {
    let mapper = AdaptiveParameterMapper::default();
    let grid = score_grid();
    for pair in grid.windows(2) {
        let (lo, hi) = (mapper.blend(pair[0]), mapper.blend(pair[1]));
        assert!(hi <= lo + 1e-12, "blend({}) = {lo} < blend({}) = {hi}", pair[0], pair[1]);
    }
    assert!((mapper.blend(-1.0) - 0.7).abs() < 1e-12);
    assert!((mapper.blend(0.0) - 0.5).abs() < 1e-12);
    assert!((mapper.blend(1.0) - 0.3).abs() < 1e-12);
}

#[test]
fn quality_gates_loosen_in_bull_and_tighten_in_bear() {
    let mapper = AdaptiveParameterMapper::default();
    let bull = mapper.quality_gates(0.6);
    assert!(bull.fundamentals < 0.60);
    assert!(bull.long_term < 0.50);

    let bear = mapper.quality_gates(-0.5);
    assert!(bear.fundamentals > 0.60);
    assert!(bear.long_term > 0.50);

    let extreme_bear = mapper.quality_gates(-1.0);
    assert!((extreme_bear.fundamentals - 0.65).abs() < 1e-12);
    assert!((extreme_bear.long_term - 0.55).abs() < 1e-12);
}

#[test]
/// Mappings are total: anything outside [-1, 1], including NaN and
/// infinities, still produces bounded values.
fn mappings_are_total_over_f64() {
    let mapper = AdaptiveParameterMapper::default();
    for score in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY, 1e12, -1e12, 1.0001] {
        let weights = mapper.weights(score);
        assert!((weights.sum() - 1.0).abs() <= 0.01);
        let blend = mapper.blend(score);
        assert!((0.0..=1.0).contains(&blend));
        let gates = mapper.quality_gates(score);
        assert!((0.0..=1.0).contains(&gates.fundamentals));
        assert!((0.0..=1.0).contains(&gates.long_term));
    }
    assert_eq!(mapper.blend(5.0), mapper.blend(1.0));
    assert_eq!(mapper.weights(-5.0), mapper.weights(-1.0));
}

#[test]
fn gradual_regime_moves_produce_gradual_parameters() {
    let mapper = AdaptiveParameterMapper::default();
    let scores = [-0.8, -0.5, -0.2, 0.0, 0.2, 0.5, 0.8];
    for pair in scores.windows(2) {
        let a = mapper.parameters(pair[0]);
        let b = mapper.parameters(pair[1]);
        let lt_step = (b.weights.get(LONG_TERM).unwrap() - a.weights.get(LONG_TERM).unwrap()).abs();
        assert!(lt_step < 0.15);
        assert!((b.blend - a.blend).abs() < 0.15);
    }
}

#[test]
fn weights_serialize_as_flat_map() {
    let mapper = AdaptiveParameterMapper::default();
    let json = serde_json::to_value(mapper.weights(0.0)).unwrap();
    let obj = json.as_object().expect("object");
    assert_eq!(obj.len(), 8);
    assert!((obj["long_term"].as_f64().unwrap() - 0.25).abs() < 1e-12);
}
