//! Timetable (solution) model.
//!
//! A timetable holds one fixed-size week grid per batch. Every grid has
//! exactly `DAYS_PER_WEEK × PERIODS_PER_DAY` slots; an empty slot is an
//! explicit value, never an absent entry.
//!
//! Cloning a [`Timetable`] is a deep copy: grids are plain arrays of
//! `Copy` slots, so a retained clone can never observe later mutation
//! of the original.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use super::{BatchKey, Subject, SubjectCatalog, Teacher};

/// Teaching days per week.
pub const DAYS_PER_WEEK: usize = 5;
/// Periods per teaching day.
pub const PERIODS_PER_DAY: usize = 7;

/// A teaching day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
}

impl Weekday {
    /// All teaching days, in chronological order.
    pub const ALL: [Weekday; DAYS_PER_WEEK] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
    ];

    /// Zero-based position within the week.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Day at a zero-based position, if in range.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn name(self) -> &'static str {
        match self {
            Weekday::Monday => "Monday",
            Weekday::Tuesday => "Tuesday",
            Weekday::Wednesday => "Wednesday",
            Weekday::Thursday => "Thursday",
            Weekday::Friday => "Friday",
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One (day, period) cell of a batch's week.
///
/// `subject` indexes the batch's subject list in the [`SubjectCatalog`];
/// `teacher` indexes that subject's teacher candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Slot {
    #[default]
    Empty,
    Assigned { subject: usize, teacher: usize },
}

impl Slot {
    /// Creates an assigned slot.
    #[inline]
    pub fn assigned(subject: usize, teacher: usize) -> Self {
        Slot::Assigned { subject, teacher }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        matches!(self, Slot::Empty)
    }

    #[inline]
    pub fn is_occupied(&self) -> bool {
        !self.is_empty()
    }

    /// Subject index, if assigned.
    #[inline]
    pub fn subject(&self) -> Option<usize> {
        match *self {
            Slot::Assigned { subject, .. } => Some(subject),
            Slot::Empty => None,
        }
    }

    /// Whether the slot holds the given subject.
    #[inline]
    pub fn holds(&self, subject: usize) -> bool {
        self.subject() == Some(subject)
    }
}

/// One batch's week: `DAYS_PER_WEEK` days of `PERIODS_PER_DAY` slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WeekGrid {
    days: [[Slot; PERIODS_PER_DAY]; DAYS_PER_WEEK],
}

impl WeekGrid {
    /// An all-empty week.
    pub fn new() -> Self {
        Self::default()
    }

    /// The slot at `(day, period)`.
    ///
    /// # Panics
    /// If `period >= PERIODS_PER_DAY`. [`Timetable::get`] is the checked
    /// variant.
    #[inline]
    pub fn get(&self, day: Weekday, period: usize) -> Slot {
        self.days[day.index()][period]
    }

    /// Overwrites the slot at `(day, period)`.
    ///
    /// # Panics
    /// If `period >= PERIODS_PER_DAY`. [`Timetable::set`] is the checked
    /// variant.
    #[inline]
    pub fn set(&mut self, day: Weekday, period: usize, slot: Slot) {
        self.days[day.index()][period] = slot;
    }

    /// The ordered slots of one day.
    #[inline]
    pub fn day(&self, day: Weekday) -> &[Slot; PERIODS_PER_DAY] {
        &self.days[day.index()]
    }

    #[inline]
    pub fn day_mut(&mut self, day: Weekday) -> &mut [Slot; PERIODS_PER_DAY] {
        &mut self.days[day.index()]
    }

    /// Iterates `(day, period, slot)` in chronological order.
    pub fn cells(&self) -> impl Iterator<Item = (Weekday, usize, Slot)> + '_ {
        Weekday::ALL.into_iter().flat_map(move |day| {
            self.day(day)
                .iter()
                .enumerate()
                .map(move |(period, slot)| (day, period, *slot))
        })
    }

    /// Weekly occurrence count per subject index (length `subject_count`).
    ///
    /// Indices outside `0..subject_count` are ignored.
    pub fn weekly_counts(&self, subject_count: usize) -> Vec<u32> {
        let mut counts = vec![0u32; subject_count];
        for (_, _, slot) in self.cells() {
            if let Some(c) = slot.subject().and_then(|s| counts.get_mut(s)) {
                *c += 1;
            }
        }
        counts
    }

    /// Occurrences of `subject` on `day`.
    pub fn daily_count(&self, day: Weekday, subject: usize) -> u32 {
        self.day(day).iter().filter(|s| s.holds(subject)).count() as u32
    }

    /// Number of occupied slots.
    pub fn occupied_count(&self) -> usize {
        self.cells().filter(|(_, _, s)| s.is_occupied()).count()
    }

    /// Number of empty slots.
    pub fn empty_count(&self) -> usize {
        DAYS_PER_WEEK * PERIODS_PER_DAY - self.occupied_count()
    }

    /// Maximal runs of empty periods on a day, as inclusive `(start, end)`.
    pub fn empty_runs(&self, day: Weekday) -> Vec<(usize, usize)> {
        let mut runs = Vec::new();
        let mut start = None;
        for (p, slot) in self.day(day).iter().enumerate() {
            match (slot.is_empty(), start) {
                (true, None) => start = Some(p),
                (false, Some(s)) => {
                    runs.push((s, p - 1));
                    start = None;
                }
                _ => {}
            }
        }
        if let Some(s) = start {
            runs.push((s, PERIODS_PER_DAY - 1));
        }
        runs
    }
}

/// A complete timetable: one week grid per batch.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timetable {
    grids: BTreeMap<BatchKey, WeekGrid>,
}

impl Timetable {
    /// Creates an all-empty timetable for the given batches.
    pub fn new<'a, I>(batches: I) -> Self
    where
        I: IntoIterator<Item = &'a BatchKey>,
    {
        Self {
            grids: batches
                .into_iter()
                .map(|b| (b.clone(), WeekGrid::new()))
                .collect(),
        }
    }

    /// Reads one slot. `None` if the batch is absent or the period is out of range.
    pub fn get(&self, batch: &BatchKey, day: Weekday, period: usize) -> Option<Slot> {
        if period >= PERIODS_PER_DAY {
            return None;
        }
        self.grids.get(batch).map(|g| g.get(day, period))
    }

    /// Writes one slot. Returns `false` (and writes nothing) if the batch
    /// is absent or the period is out of range.
    pub fn set(&mut self, batch: &BatchKey, day: Weekday, period: usize, slot: Slot) -> bool {
        if period >= PERIODS_PER_DAY {
            return false;
        }
        match self.grids.get_mut(batch) {
            Some(grid) => {
                grid.set(day, period, slot);
                true
            }
            None => false,
        }
    }

    pub fn grid(&self, batch: &BatchKey) -> Option<&WeekGrid> {
        self.grids.get(batch)
    }

    pub fn grid_mut(&mut self, batch: &BatchKey) -> Option<&mut WeekGrid> {
        self.grids.get_mut(batch)
    }

    /// Iterates `(batch, grid)` in batch order.
    pub fn iter(&self) -> impl Iterator<Item = (&BatchKey, &WeekGrid)> {
        self.grids.iter()
    }

    /// Iterates `(batch, grid)` mutably in batch order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&BatchKey, &mut WeekGrid)> {
        self.grids.iter_mut()
    }

    /// Batches present, in order.
    pub fn batches(&self) -> impl Iterator<Item = &BatchKey> {
        self.grids.keys()
    }

    pub fn batch_count(&self) -> usize {
        self.grids.len()
    }

    /// Total occupied slots across all batches.
    pub fn occupied_count(&self) -> usize {
        self.grids.values().map(WeekGrid::occupied_count).sum()
    }

    /// Resolves a slot to its subject and teacher through the catalog.
    ///
    /// `None` for empty slots, absent batches, or dangling indices.
    pub fn resolve<'c>(
        &self,
        catalog: &'c SubjectCatalog,
        batch: &BatchKey,
        day: Weekday,
        period: usize,
    ) -> Option<(&'c Subject, &'c Teacher)> {
        match self.get(batch, day, period)? {
            Slot::Assigned { subject, teacher } => {
                let s = catalog.subject(batch, subject)?;
                let t = s.teachers.get(teacher)?;
                Some((s, t))
            }
            Slot::Empty => None,
        }
    }

    /// Unique `(subject name, teacher name)` pairs taught to a batch.
    pub fn subject_teacher_pairs(
        &self,
        catalog: &SubjectCatalog,
        batch: &BatchKey,
    ) -> BTreeSet<(String, String)> {
        let mut pairs = BTreeSet::new();
        if let Some(grid) = self.grid(batch) {
            for (day, period, _) in grid.cells() {
                if let Some((s, t)) = self.resolve(catalog, batch, day, period) {
                    pairs.insert((s.name.clone(), t.name.clone()));
                }
            }
        }
        pairs
    }
}
