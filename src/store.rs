//! The canonical list of periods of one planning.
//!
//! Every mutation goes through `&mut PeriodStore`, so the overlap check and
//! the append that follows it can never interleave with another mutation.
//! Remote failures never roll back local state: deletes are applied
//! locally first and creates stay in the list as unconfirmed (no id) when
//! the backend refuses them.

use crate::error::{BoundaryError, OverlapError, PeriodError};
use crate::gateway::{GatewayError, PeriodGateway};
use crate::model::{Period, ScheduledExercise, default_period_name};
use crate::resolver::resolve_exercises;
use crate::timeline::{Timeline, WeekRange};

/// Which end of a period a boundary nudge moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Start,
    End,
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Endpoint::Start => write!(f, "start"),
            Endpoint::End => write!(f, "end"),
        }
    }
}

/// `Grow` adds one week to the endpoint's number, `Shrink` removes one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Grow,
    Shrink,
}

/// Handle for one in-flight load. Only the most recent ticket may apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    generation: u64,
}

/// Result of a delete. The period is gone locally whatever `remote` says.
#[derive(Debug)]
pub struct DeleteOutcome {
    pub removed: Period,
    pub remote: Result<(), GatewayError>,
}

impl DeleteOutcome {
    pub fn is_confirmed(&self) -> bool {
        self.remote.is_ok()
    }
}

pub struct PeriodStore<G> {
    planning_id: String,
    timeline: Timeline,
    schedule: Vec<ScheduledExercise>,
    periods: Vec<Period>,
    gateway: G,
    names_issued: usize,
    loaded: bool,
    generation: u64,
    in_flight: Option<u64>,
    detached: bool,
    last_error: Option<String>,
}

impl<G: PeriodGateway> PeriodStore<G> {
    pub fn new(
        planning_id: impl Into<String>,
        timeline: Timeline,
        schedule: Vec<ScheduledExercise>,
        gateway: G,
    ) -> Self {
        Self {
            planning_id: planning_id.into(),
            timeline,
            schedule,
            periods: Vec::new(),
            gateway,
            names_issued: 0,
            loaded: false,
            generation: 0,
            in_flight: None,
            detached: false,
            last_error: None,
        }
    }

    pub fn planning_id(&self) -> &str {
        &self.planning_id
    }

    pub fn timeline(&self) -> Timeline {
        self.timeline
    }

    pub fn schedule(&self) -> &[ScheduledExercise] {
        &self.schedule
    }

    pub fn periods(&self) -> &[Period] {
        &self.periods
    }

    pub fn get(&self, index: usize) -> Option<&Period> {
        self.periods.get(index)
    }

    pub fn len(&self) -> usize {
        self.periods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Message of the most recent gateway failure, cleared by a successful load.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Position of the period covering `week`, if any.
    pub fn period_at(&self, week: u32) -> Option<usize> {
        self.periods.iter().position(|p| p.range().contains(week))
    }

    /// Periods the backend has not acknowledged yet.
    pub fn unconfirmed(&self) -> impl Iterator<Item = (usize, &Period)> {
        self.periods
            .iter()
            .enumerate()
            .filter(|(_, p)| !p.is_persisted())
    }

    /// Pairs of positions whose ranges overlap. Creation never produces
    /// these, but boundary nudges and backend data can.
    pub fn conflicts(&self) -> Vec<(usize, usize)> {
        let mut out = Vec::new();
        for (i, a) in self.periods.iter().enumerate() {
            for (j, b) in self.periods.iter().enumerate().skip(i + 1) {
                if a.range().overlaps(&b.range()) {
                    out.push((i, j));
                }
            }
        }
        out
    }

    /// Check `candidate` against every period except the one at `skip`.
    pub fn check_overlap(&self, candidate: WeekRange, skip: Option<usize>) -> Result<(), OverlapError> {
        match self
            .periods
            .iter()
            .enumerate()
            .filter(|(i, _)| Some(*i) != skip)
            .find(|(_, p)| p.range().overlaps(&candidate))
        {
            Some((_, p)) => Err(OverlapError {
                candidate,
                existing: p.range(),
            }),
            None => Ok(()),
        }
    }

    /// Load the planning's periods unless some are already held locally
    /// (loaded or freshly created) or a load is still in flight, in which
    /// case the current list is returned.
    pub fn load_periods(&mut self) -> Result<&[Period], PeriodError> {
        if self.detached {
            return Err(PeriodError::Detached);
        }
        if self.in_flight.is_some() || !self.periods.is_empty() {
            log::debug!("Skipping redundant load for planning {}", self.planning_id);
            return Ok(&self.periods);
        }
        self.reload_periods()
    }

    /// Fetch the periods from the gateway regardless of what is held locally.
    pub fn reload_periods(&mut self) -> Result<&[Period], PeriodError> {
        if self.detached {
            return Err(PeriodError::Detached);
        }
        let ticket = self.begin_load();
        let result = self.gateway.fetch_periods(&self.planning_id);
        self.finish_load(ticket, result)?;
        Ok(&self.periods)
    }

    /// Start a load whose response will be handed to [`finish_load`].
    ///
    /// [`finish_load`]: PeriodStore::finish_load
    pub fn begin_load(&mut self) -> LoadTicket {
        self.generation += 1;
        self.in_flight = Some(self.generation);
        LoadTicket {
            generation: self.generation,
        }
    }

    /// Apply a load response. Returns `Ok(false)` when the response is stale:
    /// a newer load started, the list was mutated locally, or the store was
    /// detached in the meantime.
    ///
    /// Loaded periods outside the timeline are dropped. Local periods the
    /// backend never acknowledged are kept after the loaded ones.
    pub fn finish_load(
        &mut self,
        ticket: LoadTicket,
        result: Result<Vec<Period>, GatewayError>,
    ) -> Result<bool, PeriodError> {
        if self.detached || ticket.generation != self.generation {
            log::debug!(
                "Discarding stale load for planning {} (ticket {}, current {})",
                self.planning_id,
                ticket.generation,
                self.generation
            );
            return Ok(false);
        }
        self.in_flight = None;
        match result {
            Ok(loaded) => {
                let total = loaded.len();
                let mut periods: Vec<Period> = loaded
                    .into_iter()
                    .filter(|p| {
                        let fits = self.timeline.is_valid_range(p.start, p.end);
                        if !fits {
                            log::warn!(
                                "Dropping loaded period {} ({}) outside a timeline of {} weeks",
                                p.name,
                                p.range(),
                                self.timeline.total_weeks()
                            );
                        }
                        fits
                    })
                    .collect();
                log::info!(
                    "Loaded {} of {total} periods for planning {}",
                    periods.len(),
                    self.planning_id
                );
                self.names_issued = self.names_issued.max(total);
                let pending: Vec<Period> = self
                    .periods
                    .drain(..)
                    .filter(|p| !p.is_persisted())
                    .collect();
                if !pending.is_empty() {
                    log::info!("Keeping {} unconfirmed local periods", pending.len());
                }
                periods.extend(pending);
                self.periods = periods;
                self.loaded = true;
                self.last_error = None;
                let conflicts = self.conflicts();
                if !conflicts.is_empty() {
                    log::warn!("Loaded periods overlap at positions {conflicts:?}");
                }
                Ok(true)
            }
            Err(e) => {
                log::warn!("Failed to load periods for {}: {e}", self.planning_id);
                self.last_error = Some(e.to_string());
                Err(PeriodError::Gateway(e))
            }
        }
    }

    /// Stop accepting responses; any load in flight will be discarded.
    pub fn detach(&mut self) {
        self.detached = true;
        self.invalidate_loads();
    }

    fn invalidate_loads(&mut self) {
        if self.in_flight.take().is_some() {
            self.generation += 1;
        }
    }

    /// Create a period covering `start..=end`.
    ///
    /// The period is appended before the backend is asked to store it. If
    /// the backend call fails the error is returned and the period stays in
    /// the list without an id.
    pub fn create_period(&mut self, start: u32, end: u32) -> Result<Period, PeriodError> {
        if self.detached {
            return Err(PeriodError::Detached);
        }
        let range = WeekRange { start, end };
        if !self.timeline.is_valid_range(start, end) {
            return Err(PeriodError::OutsideTimeline(range));
        }
        self.check_overlap(range, None)?;

        self.names_issued += 1;
        let period = Period {
            id: None,
            start,
            end,
            name: default_period_name(self.names_issued),
            exercises: resolve_exercises(range, &self.schedule),
        };
        self.invalidate_loads();
        self.periods.push(period.clone());
        let index = self.periods.len() - 1;

        match self.gateway.create_period(&self.planning_id, &period) {
            Ok(remote) => match remote.id {
                Some(id) => {
                    log::info!("Created period {} ({range}) as {id}", period.name);
                    self.periods[index].id = Some(id);
                    Ok(self.periods[index].clone())
                }
                None => {
                    log::warn!("Backend accepted {} without returning an id", period.name);
                    let e = GatewayError::Decode("created period has no id".into());
                    self.last_error = Some(e.to_string());
                    Err(PeriodError::Gateway(e))
                }
            },
            Err(e) => {
                log::warn!("Could not save {}: {e}", period.name);
                self.last_error = Some(e.to_string());
                Err(PeriodError::Gateway(e))
            }
        }
    }

    /// Remove the period at `index`, then ask the backend to delete it.
    pub fn delete_period(&mut self, index: usize) -> Result<DeleteOutcome, PeriodError> {
        if self.detached {
            return Err(PeriodError::Detached);
        }
        if index >= self.periods.len() {
            return Err(PeriodError::UnknownPeriod(index));
        }
        self.invalidate_loads();
        let removed = self.periods.remove(index);
        let remote = match removed.id.as_deref() {
            Some(id) => {
                let result = self.gateway.delete_period(&self.planning_id, id);
                if let Err(e) = &result {
                    log::warn!("Removed {} locally but the backend refused: {e}", removed.name);
                    self.last_error = Some(e.to_string());
                }
                result
            }
            None => Ok(()),
        };
        Ok(DeleteOutcome { removed, remote })
    }

    /// Move one endpoint of a period by a single week and recompute its
    /// exercises. Overlap with other periods is not re-checked.
    pub fn adjust_boundary(
        &mut self,
        index: usize,
        endpoint: Endpoint,
        direction: Direction,
    ) -> Result<WeekRange, BoundaryError> {
        let period = self
            .periods
            .get_mut(index)
            .ok_or(BoundaryError::UnknownPeriod(index))?;
        let mut range = period.range();
        let target = match endpoint {
            Endpoint::Start => &mut range.start,
            Endpoint::End => &mut range.end,
        };
        *target = match direction {
            Direction::Grow => target.checked_add(1),
            Direction::Shrink => target.checked_sub(1),
        }
        .ok_or(BoundaryError::OutsideTimeline { index, endpoint })?;

        if range.start > range.end {
            return Err(BoundaryError::CrossesSibling { index, endpoint });
        }
        if !self.timeline.is_valid_range(range.start, range.end) {
            return Err(BoundaryError::OutsideTimeline { index, endpoint });
        }
        period.start = range.start;
        period.end = range.end;
        period.exercises = resolve_exercises(range, &self.schedule);
        Ok(range)
    }

    /// Rename a period. Blank names are ignored and the old name is kept.
    pub fn rename_period(&mut self, index: usize, new_name: &str) -> Result<(), PeriodError> {
        let period = self
            .periods
            .get_mut(index)
            .ok_or(PeriodError::UnknownPeriod(index))?;
        let trimmed = new_name.trim();
        if !trimmed.is_empty() {
            period.name = trimmed.to_string();
        }
        Ok(())
    }

    /// Change the load percentage of one exercise inside a period.
    pub fn set_variant(
        &mut self,
        index: usize,
        exercise_id: &str,
        percentage: f64,
    ) -> Result<(), PeriodError> {
        if !percentage.is_finite() || percentage < 0.0 {
            return Err(PeriodError::InvalidPercentage(percentage));
        }
        let period = self
            .periods
            .get_mut(index)
            .ok_or(PeriodError::UnknownPeriod(index))?;
        let assignment = period
            .exercises
            .iter_mut()
            .find(|a| a.exercise.id == exercise_id)
            .ok_or_else(|| PeriodError::UnknownExercise(exercise_id.to_string()))?;
        assignment.variant.percentage = percentage;
        Ok(())
    }
}
