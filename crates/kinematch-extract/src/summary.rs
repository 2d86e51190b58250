//! Analytical summary of a session: counts, active time and per-label shares.

use std::collections::BTreeMap;

use crate::pattern::{Execution, MovementType, Pattern};

/// Total and correct execution counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountSummary {
    /// Number of accepted patterns.
    pub total: usize,
    /// Number of accepted patterns whose execution is correct.
    pub correct: usize,
}

/// Session and active time in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeSummary {
    /// Length of the whole session.
    pub total_ms: u64,
    /// Summed length of every accepted pattern.
    pub active_ms: u64,
}

/// Count and time of a group of patterns, with their share of the parent group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Share {
    /// Number of patterns in the group.
    pub count: usize,
    /// `count` as a rounded percentage of the parent count.
    pub count_percent: u32,
    /// Summed pattern length in milliseconds.
    pub time_ms: u64,
    /// `time_ms` as a rounded percentage of the parent time.
    pub time_percent: u32,
}

/// Breakdown for one execution of a movement type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionSummary {
    /// The execution.
    pub execution: Execution,
    /// Share of the movement type's patterns.
    pub share: Share,
}

/// Breakdown for one movement type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovementSummary {
    /// The movement type.
    pub movement: MovementType,
    /// Share of all accepted patterns.
    pub share: Share,
    /// Per-execution breakdown, ordered by execution.
    pub executions: Vec<ExecutionSummary>,
}

/// What happened during a session, derived from its accepted patterns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    /// Execution counts.
    pub count: CountSummary,
    /// Session and active time.
    pub time: TimeSummary,
    /// Per-movement breakdown, ordered by movement type.
    pub movements: Vec<MovementSummary>,
}

impl SessionSummary {
    /// Summarize `patterns` found in a session of `session_len` rows sampled
    /// at `sampling_hz`.
    ///
    /// Times are truncated to whole milliseconds. A non-positive or NaN
    /// sampling rate yields zero times. Percentages with a zero denominator are 0.
    #[must_use]
    pub fn new(patterns: &[Pattern], session_len: usize, sampling_hz: f64) -> Self {
        let rows_to_ms = |rows: usize| -> u64 {
            if sampling_hz > 0.0 {
                (rows as f64 * 1000.0 / sampling_hz) as u64
            } else {
                0
            }
        };

        let count = CountSummary {
            total: patterns.len(),
            correct: patterns.iter().filter(|p| p.label.execution.correct).count(),
        };
        let time = TimeSummary {
            total_ms: rows_to_ms(session_len),
            active_ms: rows_to_ms(patterns.iter().map(|p| p.range.len()).sum()),
        };

        let mut by_movement: BTreeMap<&MovementType, Vec<&Pattern>> = BTreeMap::new();
        for pattern in patterns {
            by_movement.entry(&pattern.label.movement).or_default().push(pattern);
        }

        let movements = by_movement
            .into_iter()
            .map(|(movement, group)| {
                let share = Share::of(group.len(), rows_to_ms(rows_of(&group)), count.total, time.active_ms);

                let mut by_execution: BTreeMap<&Execution, Vec<&Pattern>> = BTreeMap::new();
                for &pattern in &group {
                    by_execution.entry(&pattern.label.execution).or_default().push(pattern);
                }
                let executions = by_execution
                    .into_iter()
                    .map(|(execution, members)| ExecutionSummary {
                        execution: execution.clone(),
                        share: Share::of(
                            members.len(),
                            rows_to_ms(rows_of(&members)),
                            share.count,
                            share.time_ms,
                        ),
                    })
                    .collect();

                MovementSummary {
                    movement: movement.clone(),
                    share,
                    executions,
                }
            })
            .collect();

        Self {
            count,
            time,
            movements,
        }
    }
}

impl Share {
    fn of(count: usize, time_ms: u64, parent_count: usize, parent_time_ms: u64) -> Self {
        Self {
            count,
            count_percent: percent(count as f64, parent_count as f64),
            time_ms,
            time_percent: percent(time_ms as f64, parent_time_ms as f64),
        }
    }
}

fn rows_of(group: &[&Pattern]) -> usize {
    group.iter().map(|p| p.range.len()).sum()
}

fn percent(part: f64, whole: f64) -> u32 {
    if whole == 0.0 {
        0
    } else {
        (part / whole * 100.0).round() as u32
    }
}
