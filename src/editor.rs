//! Two-click period selection and the rename workflow.
//!
//! Selecting a week while idle records it as the pending start. Selecting a
//! second week closes the range (endpoints in either order) and hands it to
//! the store. A range that overlaps an existing period is discarded and the
//! editor goes back to idle without creating anything.

use crate::error::{BoundaryError, OverlapError, PeriodError};
use crate::gateway::PeriodGateway;
use crate::model::Period;
use crate::store::{DeleteOutcome, Direction, Endpoint, PeriodStore};
use crate::timeline::WeekRange;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionState {
    #[default]
    Idle,
    PendingStart(u32),
}

/// What a call to [`PeriodEditor::select`] did.
#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    Pending(u32),
    Created(Period),
    Discarded(OverlapError),
}

/// How a week should be presented while selecting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeekStatus {
    Free,
    PendingStart,
    InPeriod(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct RenameDraft {
    index: usize,
    text: String,
}

pub struct PeriodEditor<G> {
    store: PeriodStore<G>,
    state: SelectionState,
    rename: Option<RenameDraft>,
}

impl<G: PeriodGateway> PeriodEditor<G> {
    pub fn new(store: PeriodStore<G>) -> Self {
        Self {
            store,
            state: SelectionState::Idle,
            rename: None,
        }
    }

    pub fn store(&self) -> &PeriodStore<G> {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut PeriodStore<G> {
        &mut self.store
    }

    pub fn into_store(self) -> PeriodStore<G> {
        self.store
    }

    pub fn state(&self) -> SelectionState {
        self.state
    }

    pub fn week_status(&self, week: u32) -> WeekStatus {
        if self.state == SelectionState::PendingStart(week) {
            return WeekStatus::PendingStart;
        }
        match self.store.period_at(week) {
            Some(i) => WeekStatus::InPeriod(i),
            None => WeekStatus::Free,
        }
    }

    /// Feed one week pick into the selection state machine.
    ///
    /// Weeks outside the timeline are refused and leave the state as it was.
    /// Gateway failures while creating are returned as errors; the editor is
    /// back to idle either way.
    pub fn select(&mut self, week: u32) -> Result<Selection, PeriodError> {
        if !self.store.timeline().contains(week) {
            return Err(PeriodError::OutsideTimeline(WeekRange::between(week, week)));
        }
        match self.state {
            SelectionState::Idle => {
                self.state = SelectionState::PendingStart(week);
                Ok(Selection::Pending(week))
            }
            SelectionState::PendingStart(first) => {
                self.state = SelectionState::Idle;
                let range = WeekRange::between(first, week);
                match self.store.create_period(range.start, range.end) {
                    Ok(period) => Ok(Selection::Created(period)),
                    Err(PeriodError::Overlap(e)) => {
                        log::debug!("Discarding selection: {e}");
                        Ok(Selection::Discarded(e))
                    }
                    Err(e) => Err(e),
                }
            }
        }
    }

    pub fn cancel_selection(&mut self) {
        self.state = SelectionState::Idle;
    }

    pub fn nudge(
        &mut self,
        index: usize,
        endpoint: Endpoint,
        direction: Direction,
    ) -> Result<WeekRange, BoundaryError> {
        self.store.adjust_boundary(index, endpoint, direction)
    }

    /// Delete a period, keeping an open rename pointed at the same period.
    pub fn delete(&mut self, index: usize) -> Result<DeleteOutcome, PeriodError> {
        let outcome = self.store.delete_period(index)?;
        if self.editing() == Some(index) {
            self.rename = None;
        } else if let Some(draft) = self.rename.as_mut().filter(|d| d.index > index) {
            draft.index -= 1;
        }
        Ok(outcome)
    }

    /// Begin renaming the period at `index`; the draft starts as its name.
    pub fn start_edit(&mut self, index: usize) -> Result<&str, PeriodError> {
        let name = self
            .store
            .get(index)
            .ok_or(PeriodError::UnknownPeriod(index))?
            .name
            .clone();
        let draft = self.rename.insert(RenameDraft { index, text: name });
        Ok(&draft.text)
    }

    pub fn editing(&self) -> Option<usize> {
        self.rename.as_ref().map(|d| d.index)
    }

    pub fn draft(&self) -> Option<&str> {
        self.rename.as_ref().map(|d| d.text.as_str())
    }

    pub fn draft_mut(&mut self) -> Option<&mut String> {
        self.rename.as_mut().map(|d| &mut d.text)
    }

    /// Apply the draft and stop editing. Blank drafts leave the name as is.
    pub fn save(&mut self) -> Result<(), PeriodError> {
        match self.rename.take() {
            Some(draft) => self.store.rename_period(draft.index, &draft.text),
            None => Ok(()),
        }
    }

    pub fn cancel_edit(&mut self) {
        self.rename = None;
    }
}
