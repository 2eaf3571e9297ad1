//! Step program variants.

use core::fmt;

use crate::error::{ProgramError, Result};

use super::{DelayFn, Direction, StepTiming};

/// Repeat counts of a buffered program.
#[derive(Debug, Clone, Copy)]
pub enum SegmentRepeats<'a> {
    /// One signed repeat count per delay entry.
    Table(&'a [i32]),
    /// The same signed repeat count for every delay entry.
    Uniform(i32),
}

impl SegmentRepeats<'_> {
    /// Repeat count of `segment`; missing table entries count as zero.
    #[inline]
    fn at(&self, segment: usize) -> i32 {
        match self {
            SegmentRepeats::Table(repeats) => repeats.get(segment).copied().unwrap_or(0),
            SegmentRepeats::Uniform(scale) => *scale,
        }
    }
}

/// Delay/direction generator attached to a motor for one run.
pub enum StepProgram<'a> {
    /// Fixed number of steps at a constant delay; the sign of `remaining`
    /// gives the direction.
    FixedSteps {
        /// Steps left, signed.
        remaining: i64,
        /// Delay before each step.
        delay_us: u32,
    },
    /// Endless rotation at a constant delay.
    Whirl {
        /// Direction of rotation.
        dir: Direction,
        /// Delay before each step.
        delay_us: u32,
    },
    /// Table of delays, each applied to `|repeats[i]|` consecutive steps in
    /// the direction of the sign of `repeats[i]`.
    BufferedSteps {
        /// Delay per segment.
        delays: &'a [u32],
        /// Repeat count per segment.
        repeats: SegmentRepeats<'a>,
        /// Current segment.
        segment: usize,
        /// Steps already issued from the current segment.
        sub_step: u32,
    },
    /// Fixed number of steps with a delay computed per step.
    DynamicSteps {
        /// Steps left, signed.
        remaining: i64,
        /// 0-based index of the next hardware step.
        step_index: u32,
        /// Delay source.
        delay_fn: &'a DelayFn,
    },
    /// Endless rotation with a delay computed per step.
    DynamicWhirl {
        /// Direction of rotation.
        dir: Direction,
        /// 0-based index of the next hardware step.
        step_index: u32,
        /// Delay source.
        delay_fn: &'a DelayFn,
    },
}

impl<'a> StepProgram<'a> {
    /// `count` steps (sign = direction) with `delay_us` before each.
    pub fn fixed(count: i64, delay_us: u32) -> Self {
        StepProgram::FixedSteps {
            remaining: count,
            delay_us,
        }
    }

    /// Rotate in `dir` until the cycle is finished.
    pub fn whirl(dir: Direction, delay_us: u32) -> Self {
        StepProgram::Whirl { dir, delay_us }
    }

    /// Segments of `|repeats[i]|` steps at `delays[i]`.
    ///
    /// # Errors
    ///
    /// Returns an error if the tables are empty or differ in length.
    pub fn buffered(delays: &'a [u32], repeats: &'a [i32]) -> Result<Self> {
        if delays.is_empty() {
            return Err(ProgramError::EmptyTable.into());
        }
        if delays.len() != repeats.len() {
            return Err(ProgramError::LengthMismatch {
                delays: delays.len(),
                repeats: repeats.len(),
            }
            .into());
        }
        Ok(Self::segments(delays, SegmentRepeats::Table(repeats)))
    }

    /// Every entry of `delays` is used for `|scale|` steps in the direction of
    /// the sign of `scale`.
    ///
    /// # Errors
    ///
    /// Returns an error if `delays` is empty or `scale` is zero.
    pub fn simple_buffered(delays: &'a [u32], scale: i32) -> Result<Self> {
        if delays.is_empty() {
            return Err(ProgramError::EmptyTable.into());
        }
        if scale == 0 {
            return Err(ProgramError::ZeroScale.into());
        }
        Ok(Self::segments(delays, SegmentRepeats::Uniform(scale)))
    }

    fn segments(delays: &'a [u32], repeats: SegmentRepeats<'a>) -> Self {
        StepProgram::BufferedSteps {
            delays,
            repeats,
            segment: 0,
            sub_step: 0,
        }
    }

    /// `count` steps (sign = direction), delay of step `i` given by `delay_fn(i)`.
    pub fn dynamic(count: i64, delay_fn: &'a DelayFn) -> Self {
        StepProgram::DynamicSteps {
            remaining: count,
            step_index: 0,
            delay_fn,
        }
    }

    /// Rotate in `dir` until the cycle is finished, delay of step `i` given by
    /// `delay_fn(i)`.
    pub fn dynamic_whirl(dir: Direction, delay_fn: &'a DelayFn) -> Self {
        StepProgram::DynamicWhirl {
            dir,
            step_index: 0,
            delay_fn,
        }
    }

    /// Produce the next hardware step, or `None` once the program is exhausted.
    pub fn next_step(&mut self) -> Option<StepTiming> {
        match self {
            StepProgram::FixedSteps {
                remaining,
                delay_us,
            } => {
                let dir = take_one(remaining)?;
                Some(StepTiming {
                    dir,
                    delay_us: *delay_us,
                })
            }
            StepProgram::Whirl { dir, delay_us } => Some(StepTiming {
                dir: *dir,
                delay_us: *delay_us,
            }),
            StepProgram::BufferedSteps {
                delays,
                repeats,
                segment,
                sub_step,
            } => {
                // Zero-repeat segments are skipped; bounded by the table length.
                while *segment < delays.len() {
                    let count = repeats.at(*segment);
                    if *sub_step < count.unsigned_abs() {
                        *sub_step += 1;
                        return Some(StepTiming {
                            dir: Direction::from_sign(count as i64),
                            delay_us: delays[*segment],
                        });
                    }
                    *segment += 1;
                    *sub_step = 0;
                }
                None
            }
            StepProgram::DynamicSteps {
                remaining,
                step_index,
                delay_fn,
            } => {
                let dir = take_one(remaining)?;
                let delay_us = delay_fn(*step_index);
                *step_index = step_index.wrapping_add(1);
                Some(StepTiming { dir, delay_us })
            }
            StepProgram::DynamicWhirl {
                dir,
                step_index,
                delay_fn,
            } => {
                let delay_us = delay_fn(*step_index);
                *step_index = step_index.wrapping_add(1);
                Some(StepTiming {
                    dir: *dir,
                    delay_us,
                })
            }
        }
    }

    /// Hardware steps left, `None` for endless programs.
    pub fn remaining_steps(&self) -> Option<u64> {
        match self {
            StepProgram::FixedSteps { remaining, .. }
            | StepProgram::DynamicSteps { remaining, .. } => Some(remaining.unsigned_abs()),
            StepProgram::BufferedSteps {
                delays,
                repeats,
                segment,
                sub_step,
            } => {
                let total: u64 = (*segment..delays.len())
                    .map(|i| repeats.at(i).unsigned_abs() as u64)
                    .sum();
                Some(total.saturating_sub(*sub_step as u64))
            }
            StepProgram::Whirl { .. } | StepProgram::DynamicWhirl { .. } => None,
        }
    }

    /// Whether the program ends by itself.
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.remaining_steps().is_some()
    }
}

/// Move a signed counter one step towards zero, returning the step direction.
#[inline]
fn take_one(remaining: &mut i64) -> Option<Direction> {
    match (*remaining).cmp(&0) {
        core::cmp::Ordering::Equal => None,
        core::cmp::Ordering::Greater => {
            *remaining -= 1;
            Some(Direction::Forward)
        }
        core::cmp::Ordering::Less => {
            *remaining += 1;
            Some(Direction::Backward)
        }
    }
}

impl fmt::Debug for StepProgram<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepProgram::FixedSteps {
                remaining,
                delay_us,
            } => f
                .debug_struct("FixedSteps")
                .field("remaining", remaining)
                .field("delay_us", delay_us)
                .finish(),
            StepProgram::Whirl { dir, delay_us } => f
                .debug_struct("Whirl")
                .field("dir", dir)
                .field("delay_us", delay_us)
                .finish(),
            StepProgram::BufferedSteps {
                delays,
                repeats,
                segment,
                sub_step,
            } => f
                .debug_struct("BufferedSteps")
                .field("segments", &delays.len())
                .field("repeats", repeats)
                .field("segment", segment)
                .field("sub_step", sub_step)
                .finish(),
            StepProgram::DynamicSteps {
                remaining,
                step_index,
                ..
            } => f
                .debug_struct("DynamicSteps")
                .field("remaining", remaining)
                .field("step_index", step_index)
                .finish_non_exhaustive(),
            StepProgram::DynamicWhirl {
                dir, step_index, ..
            } => f
                .debug_struct("DynamicWhirl")
                .field("dir", dir)
                .field("step_index", step_index)
                .finish_non_exhaustive(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use proptest::prelude::*;

    fn drain(program: &mut StepProgram<'_>) -> Vec<StepTiming> {
        core::iter::from_fn(|| program.next_step()).collect()
    }

    #[test]
    fn test_fixed_negative_count() {
        let mut program = StepProgram::fixed(-3, 500);
        assert_eq!(program.remaining_steps(), Some(3));

        let steps = drain(&mut program);
        assert_eq!(steps.len(), 3);
        assert!(steps.iter().all(|s| s.dir == Direction::Backward && s.delay_us == 500));
        assert!(program.next_step().is_none());
    }

    #[test]
    fn test_fixed_zero_is_exhausted() {
        let mut program = StepProgram::fixed(0, 500);
        assert!(program.next_step().is_none());
    }

    #[test]
    fn test_whirl_never_ends() {
        let mut program = StepProgram::whirl(Direction::Forward, 100);
        for _ in 0..1000 {
            assert!(program.next_step().is_some());
        }
        assert!(!program.is_finite());
    }

    #[test]
    fn test_simple_buffered_scale() {
        let delays = [1000, 2000];
        let mut program = StepProgram::simple_buffered(&delays, 3).unwrap();

        let got: Vec<u32> = drain(&mut program).iter().map(|s| s.delay_us).collect();
        assert_eq!(got, [1000, 1000, 1000, 2000, 2000, 2000]);
    }

    #[test]
    fn test_short_repeat_table_ends_program() {
        let delays = [1000, 2000, 3000];
        let repeats = [2];
        let mut program = StepProgram::BufferedSteps {
            delays: &delays,
            repeats: SegmentRepeats::Table(&repeats),
            segment: 0,
            sub_step: 0,
        };

        assert_eq!(program.remaining_steps(), Some(2));
        let got: Vec<u32> = drain(&mut program).iter().map(|s| s.delay_us).collect();
        assert_eq!(got, [1000, 1000]);
    }

    #[test]
    fn test_buffered_direction_per_segment() {
        let delays = [1000, 3000, 2000];
        let repeats = [2, 0, -1];
        let mut program = StepProgram::buffered(&delays, &repeats).unwrap();

        let steps = drain(&mut program);
        assert_eq!(
            steps,
            [
                StepTiming { dir: Direction::Forward, delay_us: 1000 },
                StepTiming { dir: Direction::Forward, delay_us: 1000 },
                StepTiming { dir: Direction::Backward, delay_us: 2000 },
            ]
        );
    }

    #[test]
    fn test_buffered_validation() {
        let delays = [1000, 2000];
        assert!(matches!(
            StepProgram::buffered(&delays, &[1]),
            Err(Error::Program(ProgramError::LengthMismatch { delays: 2, repeats: 1 }))
        ));
        assert!(matches!(
            StepProgram::buffered(&[], &[]),
            Err(Error::Program(ProgramError::EmptyTable))
        ));
        assert!(matches!(
            StepProgram::simple_buffered(&delays, 0),
            Err(Error::Program(ProgramError::ZeroScale))
        ));
    }

    #[test]
    fn test_dynamic_passes_step_index() {
        let delay_fn = |i: u32| 1000 + i * 10;
        let mut program = StepProgram::dynamic(4, &delay_fn);

        let got: Vec<u32> = drain(&mut program).iter().map(|s| s.delay_us).collect();
        assert_eq!(got, [1000, 1010, 1020, 1030]);
    }

    #[test]
    fn test_dynamic_whirl_direction() {
        let delay_fn = |_: u32| 700;
        let mut program = StepProgram::dynamic_whirl(Direction::Backward, &delay_fn);
        let step = program.next_step().unwrap();
        assert_eq!(step.dir, Direction::Backward);
        assert_eq!(step.delay_us, 700);
    }

    proptest! {
        #[test]
        fn prop_buffered_emits_sum_of_repeats(
            segments in prop::collection::vec((1u32..10_000, -20i32..20), 1..16)
        ) {
            let delays: Vec<u32> = segments.iter().map(|(d, _)| *d).collect();
            let repeats: Vec<i32> = segments.iter().map(|(_, r)| *r).collect();
            let mut program = StepProgram::buffered(&delays, &repeats).unwrap();

            let expected: u64 = repeats.iter().map(|r| r.unsigned_abs() as u64).sum();
            prop_assert_eq!(program.remaining_steps(), Some(expected));

            let steps = drain(&mut program);
            prop_assert_eq!(steps.len() as u64, expected);

            // Each step carries its segment's delay and sign.
            let mut cursor = 0;
            for (i, r) in repeats.iter().enumerate() {
                for _ in 0..r.unsigned_abs() {
                    prop_assert_eq!(steps[cursor].delay_us, delays[i]);
                    prop_assert_eq!(steps[cursor].dir, Direction::from_sign(*r as i64));
                    cursor += 1;
                }
            }
        }
    }
}
