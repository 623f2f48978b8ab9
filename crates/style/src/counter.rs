//! Ordered-list counter engine.
//!
//! Counters are recorded sparsely per `(scope, level)` keyed by document
//! position. A scope is the abstract numbering definition when one is known,
//! so that several `numId`s remapped onto the same abstract definition keep
//! counting together, and the `numId` itself otherwise.

use crate::context::StyleContext;
use crate::numbering::DEFAULT_LEVEL_START;
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;

/// Largest integer representable without loss in an IEEE double; counters
/// never pass it.
pub const MAX_SAFE_COUNTER: i64 = (1 << 53) - 1;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CounterError {
    #[error("Invalid {field}: {value} (expected a non-negative integer)")]
    InvalidArgument { field: &'static str, value: i64 },
    #[error("Counter overflow for numId {num_id} level {level}")]
    Overflow { num_id: i64, level: i64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum CounterScope {
    Abstract(i64),
    Num(i64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct CounterKey {
    scope: CounterScope,
    level: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelCounterConfig {
    pub start: i64,
    /// 1-based restart level (`w:lvlRestart`). `Some(0)` never restarts;
    /// `None` restarts after any shallower level.
    pub restart: Option<i64>,
}

impl Default for LevelCounterConfig {
    fn default() -> Self {
        Self {
            start: DEFAULT_LEVEL_START,
            restart: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CounterOptions {
    pub memoize: bool,
}

#[derive(Debug, Default)]
pub struct NumberingCounters {
    counters: HashMap<CounterKey, BTreeMap<u64, i64>>,
    abstract_ids: HashMap<i64, i64>,
    levels: HashMap<(i64, i64), LevelCounterConfig>,
    memo: Option<HashMap<(CounterKey, u64), i64>>,
}

fn validate(field: &'static str, value: i64) -> Result<(), CounterError> {
    if value < 0 {
        return Err(CounterError::InvalidArgument { field, value });
    }
    Ok(())
}

impl NumberingCounters {
    pub fn new(options: CounterOptions) -> Self {
        Self {
            memo: options.memoize.then(HashMap::new),
            ..Default::default()
        }
    }

    /// Builds an engine preloaded with the start values, restart thresholds,
    /// and abstract mappings of every numbering definition in `ctx`.
    pub fn from_context(ctx: &StyleContext, options: CounterOptions) -> Self {
        let mut engine = Self::new(options);
        engine.load_context(ctx);
        engine
    }

    pub fn load_context(&mut self, ctx: &StyleContext) {
        for (&num_id, definition) in &ctx.numbering {
            if let Some(abstract_id) = definition.abstract_id {
                self.abstract_ids.insert(num_id, abstract_id);
            }
            for (position, level) in definition.levels.iter().enumerate() {
                let level_index = level.level.unwrap_or(position as i64);
                self.levels.insert(
                    (num_id, level_index),
                    LevelCounterConfig {
                        start: level.start.unwrap_or(DEFAULT_LEVEL_START),
                        restart: level.restart,
                    },
                );
            }
        }
        self.invalidate_memo();
    }

    pub fn register_abstract(&mut self, num_id: i64, abstract_id: i64) {
        self.abstract_ids.insert(num_id, abstract_id);
        self.invalidate_memo();
    }

    pub fn configure_level(&mut self, num_id: i64, level: i64, config: LevelCounterConfig) {
        self.levels.insert((num_id, level), config);
        self.invalidate_memo();
    }

    /// Turns result memoization on or off. Either way, prior results are dropped.
    pub fn set_memoization(&mut self, enabled: bool) {
        self.memo = enabled.then(HashMap::new);
    }

    pub fn is_memoizing(&self) -> bool {
        self.memo.is_some()
    }

    /// Forgets every recorded counter (document reload). Level configuration stays.
    pub fn clear(&mut self) {
        self.counters.clear();
        self.invalidate_memo();
    }

    /// Drops counters, configuration, and abstract mappings.
    pub fn reset(&mut self) {
        self.counters.clear();
        self.abstract_ids.clear();
        self.levels.clear();
        self.invalidate_memo();
    }

    fn invalidate_memo(&mut self) {
        if let Some(memo) = self.memo.as_mut() {
            memo.clear();
        }
    }

    fn scope(&self, num_id: i64, abstract_id: Option<i64>) -> CounterScope {
        match abstract_id.or_else(|| self.abstract_ids.get(&num_id).copied()) {
            Some(id) => CounterScope::Abstract(id),
            None => CounterScope::Num(num_id),
        }
    }

    fn level_config(&self, num_id: i64, level: i64) -> LevelCounterConfig {
        self.levels.get(&(num_id, level)).copied().unwrap_or_default()
    }

    /// Computes the counter value for `level` at `position` without recording it.
    ///
    /// The value continues from the nearest earlier counter of the same level,
    /// unless a restart-triggering shallower level was used in between, in which
    /// case it starts over at the level's start value.
    pub fn calculate_counter(
        &mut self,
        num_id: i64,
        level: i64,
        position: i64,
        abstract_id: Option<i64>,
    ) -> Result<i64, CounterError> {
        validate("numId", num_id)?;
        validate("level", level)?;
        validate("position", position)?;
        if let Some(id) = abstract_id {
            validate("abstractId", id)?;
        }

        let key = CounterKey {
            scope: self.scope(num_id, abstract_id),
            level,
        };
        let position = position as u64;

        if let Some(value) = self.memo.as_ref().and_then(|m| m.get(&(key, position))) {
            return Ok(*value);
        }

        let config = self.level_config(num_id, level);
        let value = match self.previous(key, position) {
            None => config.start,
            Some((prev_position, prev_value)) => {
                if self.restarted_between(key, config, prev_position, position) {
                    config.start
                } else if prev_value >= MAX_SAFE_COUNTER {
                    return Err(CounterError::Overflow { num_id, level });
                } else {
                    prev_value + 1
                }
            }
        };

        if let Some(memo) = self.memo.as_mut() {
            memo.insert((key, position), value);
        }
        Ok(value)
    }

    /// Records `value` for `level` at `position`.
    pub fn record_counter(
        &mut self,
        num_id: i64,
        level: i64,
        position: i64,
        value: i64,
        abstract_id: Option<i64>,
    ) -> Result<(), CounterError> {
        validate("numId", num_id)?;
        validate("level", level)?;
        validate("position", position)?;
        validate("value", value)?;
        if value > MAX_SAFE_COUNTER {
            return Err(CounterError::Overflow { num_id, level });
        }

        let key = CounterKey {
            scope: self.scope(num_id, abstract_id),
            level,
        };
        self.counters
            .entry(key)
            .or_default()
            .insert(position as u64, value);
        self.invalidate_memo();
        Ok(())
    }

    /// Calculates and records in one step; the usual call while walking a document.
    pub fn increment_counter(
        &mut self,
        num_id: i64,
        level: i64,
        position: i64,
        abstract_id: Option<i64>,
    ) -> Result<i64, CounterError> {
        let value = self.calculate_counter(num_id, level, position, abstract_id)?;
        self.record_counter(num_id, level, position, value, abstract_id)?;
        Ok(value)
    }

    /// Counter values of levels `0..level` as seen at `position`. A level with no
    /// counter at or before `position` contributes its start value.
    pub fn get_ancestors_path(
        &self,
        num_id: i64,
        level: i64,
        position: i64,
        abstract_id: Option<i64>,
    ) -> Result<Vec<i64>, CounterError> {
        validate("numId", num_id)?;
        validate("level", level)?;
        validate("position", position)?;

        let scope = self.scope(num_id, abstract_id);
        let position = position as u64;
        Ok((0..level)
            .map(|ancestor| {
                let key = CounterKey {
                    scope,
                    level: ancestor,
                };
                self.counters
                    .get(&key)
                    .and_then(|map| map.range(..=position).next_back())
                    .map(|(_, value)| *value)
                    .unwrap_or_else(|| self.level_config(num_id, ancestor).start)
            })
            .collect())
    }

    /// Ancestor path followed by the current level's calculated value,
    /// e.g. `[1, 2, 3]` for a "1.2.3" marker.
    pub fn calculate_path(
        &mut self,
        num_id: i64,
        level: i64,
        position: i64,
        abstract_id: Option<i64>,
    ) -> Result<Vec<i64>, CounterError> {
        let mut path = self.get_ancestors_path(num_id, level, position, abstract_id)?;
        path.push(self.calculate_counter(num_id, level, position, abstract_id)?);
        Ok(path)
    }

    fn previous(&self, key: CounterKey, position: u64) -> Option<(u64, i64)> {
        self.counters
            .get(&key)?
            .range(..position)
            .next_back()
            .map(|(p, v)| (*p, *v))
    }

    fn restarted_between(
        &self,
        key: CounterKey,
        config: LevelCounterConfig,
        from: u64,
        to: u64,
    ) -> bool {
        // Levels strictly shallower than `bound` trigger a restart.
        let bound = match config.restart {
            Some(threshold) if threshold <= 0 => return false,
            Some(threshold) => threshold.min(key.level),
            None => key.level,
        };
        if from + 1 >= to {
            return false;
        }

        (0..bound).any(|shallower| {
            let shallower_key = CounterKey {
                scope: key.scope,
                level: shallower,
            };
            self.counters
                .get(&shallower_key)
                .is_some_and(|map| map.range(from + 1..to).next().is_some())
        })
    }

    /// Number of recorded counters across all scopes and levels.
    pub fn len(&self) -> usize {
        self.counters.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
