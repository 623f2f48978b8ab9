use crate::context::StyleContext;
use crate::counter::{
    CounterError, CounterOptions, LevelCounterConfig, MAX_SAFE_COUNTER, NumberingCounters,
};
use crate::numbering::{format_marker, level_formats};
use serde_json::json;

fn engine() -> NumberingCounters {
    NumberingCounters::new(CounterOptions::default())
}

#[test]
fn test_level_zero_sequence_and_child_restart() {
    let mut counters = engine();

    assert_eq!(counters.increment_counter(1, 0, 10, None).unwrap(), 1);
    assert_eq!(counters.increment_counter(1, 1, 15, None).unwrap(), 1);
    assert_eq!(counters.increment_counter(1, 0, 20, None).unwrap(), 2);
    // Level 0 at 20 sits between the level-1 siblings at 15 and 25.
    assert_eq!(counters.increment_counter(1, 1, 25, None).unwrap(), 1);
}

#[test]
fn test_siblings_increment_without_shallower_usage() {
    let mut counters = engine();
    counters.increment_counter(1, 0, 1, None).unwrap();
    assert_eq!(counters.increment_counter(1, 1, 2, None).unwrap(), 1);
    assert_eq!(counters.increment_counter(1, 1, 3, None).unwrap(), 2);
    assert_eq!(counters.increment_counter(1, 1, 4, None).unwrap(), 3);
}

#[test]
fn test_deeper_levels_do_not_affect_shallower() {
    let mut counters = engine();
    counters.increment_counter(1, 0, 10, None).unwrap();
    counters.increment_counter(1, 2, 12, None).unwrap();
    counters.increment_counter(1, 1, 14, None).unwrap();
    assert_eq!(counters.calculate_counter(1, 0, 20, None).unwrap(), 2);
}

#[test]
fn test_calculate_does_not_record() {
    let mut counters = engine();
    counters.increment_counter(3, 0, 1, None).unwrap();
    assert_eq!(counters.calculate_counter(3, 0, 5, None).unwrap(), 2);
    assert_eq!(counters.calculate_counter(3, 0, 5, None).unwrap(), 2);
    assert_eq!(counters.len(), 1);
}

#[test]
fn test_configured_start_value() {
    let mut counters = engine();
    counters.configure_level(
        7,
        0,
        LevelCounterConfig {
            start: 5,
            restart: None,
        },
    );
    assert_eq!(counters.increment_counter(7, 0, 0, None).unwrap(), 5);
    assert_eq!(counters.increment_counter(7, 0, 1, None).unwrap(), 6);
}

#[test]
fn test_restart_threshold_zero_never_restarts() {
    let mut counters = engine();
    counters.configure_level(
        1,
        1,
        LevelCounterConfig {
            start: 1,
            restart: Some(0),
        },
    );
    counters.increment_counter(1, 0, 10, None).unwrap();
    counters.increment_counter(1, 1, 15, None).unwrap();
    counters.increment_counter(1, 0, 20, None).unwrap();
    assert_eq!(counters.increment_counter(1, 1, 25, None).unwrap(), 2);
}

#[test]
fn test_restart_threshold_limits_triggering_levels() {
    let mut counters = engine();
    // Level 2 restarts only after level 0 (lvlRestart = 1).
    counters.configure_level(
        1,
        2,
        LevelCounterConfig {
            start: 1,
            restart: Some(1),
        },
    );
    counters.increment_counter(1, 0, 1, None).unwrap();
    counters.increment_counter(1, 2, 2, None).unwrap();
    counters.increment_counter(1, 1, 3, None).unwrap();
    assert_eq!(counters.increment_counter(1, 2, 4, None).unwrap(), 2);

    counters.increment_counter(1, 0, 5, None).unwrap();
    assert_eq!(counters.increment_counter(1, 2, 6, None).unwrap(), 1);
}

#[test]
fn test_overflow_is_an_error() {
    let mut counters = engine();
    counters.record_counter(1, 0, 0, MAX_SAFE_COUNTER, None).unwrap();
    let err = counters.calculate_counter(1, 0, 1, None).unwrap_err();
    assert_eq!(err, CounterError::Overflow { num_id: 1, level: 0 });

    let err = counters
        .record_counter(1, 0, 2, MAX_SAFE_COUNTER + 1, None)
        .unwrap_err();
    assert!(matches!(err, CounterError::Overflow { .. }));
}

#[test]
fn test_negative_arguments_name_the_field() {
    let mut counters = engine();
    let err = counters.calculate_counter(1, -1, 0, None).unwrap_err();
    assert_eq!(
        err,
        CounterError::InvalidArgument {
            field: "level",
            value: -1
        }
    );
    assert!(err.to_string().contains("level"));

    let err = counters.record_counter(1, 0, -5, 1, None).unwrap_err();
    assert_eq!(
        err,
        CounterError::InvalidArgument {
            field: "position",
            value: -5
        }
    );

    let err = counters.calculate_counter(1, 0, 0, Some(-2)).unwrap_err();
    assert!(matches!(
        err,
        CounterError::InvalidArgument {
            field: "abstractId",
            ..
        }
    ));
}

#[test]
fn test_abstract_bucket_shared_between_num_ids() {
    let mut counters = engine();
    counters.register_abstract(1, 100);
    counters.register_abstract(2, 100);

    assert_eq!(counters.increment_counter(1, 0, 10, None).unwrap(), 1);
    assert_eq!(counters.increment_counter(2, 0, 20, None).unwrap(), 2);
    // Explicit abstract id takes precedence over the registered mapping.
    assert_eq!(counters.increment_counter(3, 0, 30, Some(100)).unwrap(), 3);
    assert_eq!(counters.increment_counter(4, 0, 40, None).unwrap(), 1);
}

#[test]
fn test_memoization_toggle_invalidates() {
    let mut counters = NumberingCounters::new(CounterOptions { memoize: true });
    assert!(counters.is_memoizing());

    counters.increment_counter(1, 0, 1, None).unwrap();
    assert_eq!(counters.calculate_counter(1, 0, 5, None).unwrap(), 2);

    // Recording invalidates memoized results.
    counters.record_counter(1, 0, 3, 9, None).unwrap();
    assert_eq!(counters.calculate_counter(1, 0, 5, None).unwrap(), 10);

    counters.set_memoization(false);
    assert!(!counters.is_memoizing());
    assert_eq!(counters.calculate_counter(1, 0, 5, None).unwrap(), 10);
}

#[test]
fn test_ancestor_path_falls_back_to_start_values() {
    let mut counters = engine();
    counters.configure_level(
        1,
        1,
        LevelCounterConfig {
            start: 3,
            restart: None,
        },
    );
    counters.increment_counter(1, 0, 1, None).unwrap();
    counters.increment_counter(1, 0, 2, None).unwrap();

    assert_eq!(counters.get_ancestors_path(1, 2, 5, None).unwrap(), vec![2, 3]);
    assert_eq!(counters.calculate_path(1, 2, 5, None).unwrap(), vec![2, 3, 1]);
    assert!(counters.get_ancestors_path(1, 0, 5, None).unwrap().is_empty());
}

#[test]
fn test_clear_forgets_counters_but_keeps_configuration() {
    let mut counters = engine();
    counters.configure_level(
        1,
        0,
        LevelCounterConfig {
            start: 4,
            restart: None,
        },
    );
    counters.increment_counter(1, 0, 1, None).unwrap();
    counters.clear();
    assert!(counters.is_empty());
    assert_eq!(counters.increment_counter(1, 0, 2, None).unwrap(), 4);

    counters.reset();
    assert_eq!(counters.calculate_counter(1, 0, 3, None).unwrap(), 1);
}

#[test]
fn test_context_driven_marker_path() {
    let ctx: StyleContext = serde_json::from_value(json!({
        "numbering": {
            "5": {
                "abstractId": 2,
                "levels": [
                    { "level": 0, "format": "decimal", "text": "%1.", "start": 1 },
                    { "level": 1, "format": "lowerLetter", "text": "%1.%2", "start": 1, "restart": 1 }
                ]
            }
        }
    }))
    .unwrap();

    let mut counters = NumberingCounters::from_context(&ctx, CounterOptions::default());
    counters.increment_counter(5, 0, 0, None).unwrap();
    counters.increment_counter(5, 1, 1, None).unwrap();
    counters.increment_counter(5, 1, 2, None).unwrap();

    let path = counters.get_ancestors_path(5, 1, 2, None).unwrap();
    let mut full = path.clone();
    full.push(2);
    let formats = level_formats(5, 1, &ctx);
    assert_eq!(format_marker("%1.%2", &full, &formats), "1.b");
}
