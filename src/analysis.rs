//! Timetable compliance analysis.
//!
//! Computes per-batch, per-subject occupancy against configured caps for
//! a finished timetable. Read-only; intended for presentation and export
//! layers.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Daily count | Occurrences of a subject on one day vs. its daily cap |
//! | Weekly total | Occurrences across the week vs. its weekly cap |
//! | Compliant | Every day within cap and the week within cap |
//! | Empty periods | Unassigned slots in the batch's week |
//! | Teacher conflicts | Same teacher in two batches at one (day, period) |
//!
//! Batches are matched component-wise, so labels that differ only in
//! whitespace still find their subjects. Batches that cannot be matched
//! are skipped and listed in [`ComplianceReport::skipped`].

use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::{BatchKey, Slot, SubjectCatalog, Timetable, WeekGrid, Weekday, DAYS_PER_WEEK};

/// Occupancy of one subject on one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyCompliance {
    pub day: Weekday,
    pub count: u32,
    pub max: u32,
    pub compliant: bool,
}

/// Occupancy of one subject across the week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectCompliance {
    /// Subject code.
    pub code: String,
    /// Occurrences across the week.
    pub weekly_total: u32,
    /// Configured weekly cap.
    pub max_weekly: u32,
    /// `weekly_total <= max_weekly`.
    pub weekly_compliant: bool,
    /// One entry per weekday, Monday first.
    pub daily_counts: Vec<DailyCompliance>,
    /// All days and the week within caps.
    pub compliant: bool,
}

/// Compliance of one batch.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BatchCompliance {
    /// Keyed by subject name.
    pub subjects: BTreeMap<String, SubjectCompliance>,
    /// Unassigned slots in the week.
    pub empty_periods: usize,
    /// Occupied slots whose subject index is unknown to the catalog.
    pub unknown_assignments: usize,
}

impl BatchCompliance {
    /// Whether every subject in the batch is compliant.
    pub fn is_compliant(&self) -> bool {
        self.subjects.values().all(|s| s.compliant)
    }
}

/// A teacher booked in more than one batch at the same time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeacherConflict {
    pub teacher: String,
    pub day: Weekday,
    pub period: usize,
    /// The batches sharing the slot, in batch order.
    pub batches: Vec<BatchKey>,
}

/// Full compliance report.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ComplianceReport {
    /// Per-batch compliance, keyed by the batch as it appears in the timetable.
    pub batches: BTreeMap<BatchKey, BatchCompliance>,
    /// Batch labels that could not be parsed or matched.
    pub skipped: Vec<String>,
    /// Cross-batch teacher double-bookings among the analyzed batches.
    pub teacher_conflicts: Vec<TeacherConflict>,
}

impl ComplianceReport {
    /// Analyzes `batches` of a timetable against the catalog.
    pub fn analyze(timetable: &Timetable, catalog: &SubjectCatalog, batches: &[BatchKey]) -> Self {
        let mut report = Self::default();
        for batch in batches {
            report.add_batch(timetable, catalog, batch, &batch.to_string());
        }
        report.teacher_conflicts = find_teacher_conflicts(timetable, catalog, &report);
        report
    }

    /// Analyzes batches given as free-form labels.
    ///
    /// Labels that do not parse into four components are skipped.
    pub fn analyze_labels<S: AsRef<str>>(
        timetable: &Timetable,
        catalog: &SubjectCatalog,
        labels: &[S],
    ) -> Self {
        let mut report = Self::default();
        for label in labels {
            let label = label.as_ref();
            match BatchKey::parse(label) {
                Ok(batch) => report.add_batch(timetable, catalog, &batch, label),
                Err(e) => {
                    warn!("skipping batch in analysis: {e}");
                    report.skipped.push(label.to_string());
                }
            }
        }
        report.teacher_conflicts = find_teacher_conflicts(timetable, catalog, &report);
        report
    }

    /// Whether every analyzed batch is compliant and no teacher is double-booked.
    pub fn is_fully_compliant(&self) -> bool {
        self.teacher_conflicts.is_empty() && self.batches.values().all(BatchCompliance::is_compliant)
    }

    /// Empty slots summed over analyzed batches.
    pub fn total_empty_periods(&self) -> usize {
        self.batches.values().map(|b| b.empty_periods).sum()
    }

    fn add_batch(&mut self, timetable: &Timetable, catalog: &SubjectCatalog, batch: &BatchKey, label: &str) {
        let Some((grid_key, grid)) = find_grid(timetable, batch) else {
            warn!("batch '{label}' not present in timetable; skipping");
            self.skipped.push(label.to_string());
            return;
        };
        let Some(catalog_key) = find_catalog_key(catalog, batch) else {
            warn!("batch '{label}' has no matching subjects; skipping");
            self.skipped.push(label.to_string());
            return;
        };
        let compliance = analyze_grid(grid, catalog, &catalog_key);
        self.batches.insert(grid_key.clone(), compliance);
    }
}

/// Convenience wrapper for [`ComplianceReport::analyze`].
pub fn analyze(timetable: &Timetable, catalog: &SubjectCatalog, batches: &[BatchKey]) -> ComplianceReport {
    ComplianceReport::analyze(timetable, catalog, batches)
}

fn same_components(a: &BatchKey, b: &BatchKey) -> bool {
    let (a1, a2, a3, a4) = a.components();
    let (b1, b2, b3, b4) = b.components();
    a1.trim() == b1.trim() && a2.trim() == b2.trim() && a3.trim() == b3.trim() && a4.trim() == b4.trim()
}

fn find_grid<'t>(timetable: &'t Timetable, batch: &BatchKey) -> Option<(&'t BatchKey, &'t WeekGrid)> {
    timetable.iter().find(|(k, _)| *k == batch || same_components(k, batch))
}

fn find_catalog_key(catalog: &SubjectCatalog, batch: &BatchKey) -> Option<BatchKey> {
    if catalog.contains(batch) {
        return Some(batch.clone());
    }
    catalog
        .iter()
        .map(|(k, _)| k)
        .find(|k| same_components(k, batch))
        .cloned()
}

fn analyze_grid(grid: &WeekGrid, catalog: &SubjectCatalog, catalog_key: &BatchKey) -> BatchCompliance {
    let subjects = catalog.subjects(catalog_key);
    let mut daily = vec![[0u32; DAYS_PER_WEEK]; subjects.len()];
    let mut result = BatchCompliance::default();

    for (day, _, slot) in grid.cells() {
        match slot.subject() {
            None => result.empty_periods += 1,
            Some(s) if s < subjects.len() => daily[s][day.index()] += 1,
            Some(s) => {
                warn!("unknown subject index {s} in batch '{catalog_key}'");
                result.unknown_assignments += 1;
            }
        }
    }

    for (subject, counts) in subjects.iter().zip(&daily) {
        let max_daily = subject.max_per_day();
        let daily_counts: Vec<DailyCompliance> = Weekday::ALL
            .iter()
            .map(|&day| {
                let count = counts[day.index()];
                DailyCompliance {
                    day,
                    count,
                    max: max_daily,
                    compliant: count <= max_daily,
                }
            })
            .collect();
        let weekly_total: u32 = counts.iter().sum();
        let weekly_compliant = weekly_total <= subject.max_per_week();
        let compliant = weekly_compliant && daily_counts.iter().all(|d| d.compliant);

        result.subjects.insert(
            subject.name.clone(),
            SubjectCompliance {
                code: subject.code.clone(),
                weekly_total,
                max_weekly: subject.max_per_week(),
                weekly_compliant,
                daily_counts,
                compliant,
            },
        );
    }
    result
}

fn find_teacher_conflicts(
    timetable: &Timetable,
    catalog: &SubjectCatalog,
    report: &ComplianceReport,
) -> Vec<TeacherConflict> {
    let mut bookings: BTreeMap<(String, Weekday, usize), Vec<BatchKey>> = BTreeMap::new();
    for batch in report.batches.keys() {
        let (Some(grid), Some(catalog_key)) = (timetable.grid(batch), find_catalog_key(catalog, batch)) else {
            continue;
        };
        let subjects = catalog.subjects(&catalog_key);
        for (day, period, slot) in grid.cells() {
            let Slot::Assigned { subject, teacher } = slot else { continue };
            if let Some(t) = subjects.get(subject).and_then(|s| s.teachers.get(teacher)) {
                bookings
                    .entry((t.name.clone(), day, period))
                    .or_default()
                    .push(batch.clone());
            }
        }
    }

    bookings
        .into_iter()
        .filter(|(_, batches)| batches.len() > 1)
        .map(|((teacher, day, period), batches)| TeacherConflict {
            teacher,
            day,
            period,
            batches,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Subject, Teacher};

    fn key(label: &str) -> BatchKey {
        BatchKey::parse(label).unwrap()
    }

    fn sample_catalog() -> SubjectCatalog {
        SubjectCatalog::from_labeled(vec![
            (
                "1, 2024,1,A",
                vec![
                    Subject::new("M1", "Math")
                        .with_teacher(Teacher::new("Alice"))
                        .with_caps(1, 3),
                    Subject::new("P1", "Physics")
                        .with_teacher(Teacher::new("Bob"))
                        .with_caps(2, 4),
                ],
            ),
            (
                "1, 2024, 1, B",
                vec![Subject::new("M1", "Math")
                    .with_teacher(Teacher::new("Alice"))
                    .with_caps(1, 3)],
            ),
        ])
        .unwrap()
    }

    #[test]
    fn test_whitespace_variant_label_is_analyzed() {
        let catalog = sample_catalog();
        let a = key("1, 2024,1,A");
        let mut t = Timetable::new([&a]);
        t.set(&a, Weekday::Monday, 0, Slot::assigned(0, 0));

        let report = ComplianceReport::analyze_labels(&t, &catalog, &["1,2024, 1, A"]);
        assert!(report.skipped.is_empty());
        let batch = &report.batches[&a];
        assert_eq!(batch.subjects["Math"].weekly_total, 1);
        assert_eq!(batch.empty_periods, 34);
    }

    #[test]
    fn test_untrimmed_struct_key_matches_component_wise() {
        let catalog = sample_catalog();
        let a = key("1,2024,1,A");
        let t = Timetable::new([&a]);
        let sloppy = BatchKey {
            course_id: " 1".into(),
            year: "2024 ".into(),
            semester: "1".into(),
            batch_id: " A ".into(),
        };
        let report = analyze(&t, &catalog, &[sloppy]);
        assert!(report.skipped.is_empty());
        assert_eq!(report.batches.len(), 1);
    }

    #[test]
    fn test_malformed_and_unknown_labels_are_skipped() {
        let catalog = sample_catalog();
        let a = key("1,2024,1,A");
        let t = Timetable::new([&a]);
        let report =
            ComplianceReport::analyze_labels(&t, &catalog, &["1,2024,1", "9,2024,1,Z", "1,2024,1,A"]);
        assert_eq!(report.skipped, vec!["1,2024,1".to_string(), "9,2024,1,Z".to_string()]);
        assert_eq!(report.batches.len(), 1);
    }

    #[test]
    fn test_daily_and_weekly_flags() {
        let catalog = sample_catalog();
        let a = key("1,2024,1,A");
        let mut t = Timetable::new([&a]);
        // Math: twice Monday (daily cap 1), four in total (weekly cap 3).
        t.set(&a, Weekday::Monday, 0, Slot::assigned(0, 0));
        t.set(&a, Weekday::Monday, 1, Slot::assigned(0, 0));
        t.set(&a, Weekday::Tuesday, 0, Slot::assigned(0, 0));
        t.set(&a, Weekday::Friday, 0, Slot::assigned(0, 0));
        // Physics: within caps.
        t.set(&a, Weekday::Monday, 2, Slot::assigned(1, 0));

        let report = analyze(&t, &catalog, &[a.clone()]);
        let math = &report.batches[&a].subjects["Math"];
        assert_eq!(math.weekly_total, 4);
        assert!(!math.weekly_compliant);
        assert!(!math.compliant);
        assert_eq!(math.daily_counts[0].count, 2);
        assert!(!math.daily_counts[0].compliant);
        assert!(math.daily_counts[1].compliant);

        let physics = &report.batches[&a].subjects["Physics"];
        assert!(physics.compliant);
        assert_eq!(physics.code, "P1");
        assert!(!report.is_fully_compliant());
        assert_eq!(report.total_empty_periods(), 30);
    }

    #[test]
    fn test_teacher_conflicts_reported() {
        let catalog = sample_catalog();
        let a = key("1,2024,1,A");
        let b = key("1,2024,1,B");
        let mut t = Timetable::new([&a, &b]);
        t.set(&a, Weekday::Wednesday, 4, Slot::assigned(0, 0));
        t.set(&b, Weekday::Wednesday, 4, Slot::assigned(0, 0));

        let report = analyze(&t, &catalog, &[a.clone(), b.clone()]);
        assert_eq!(report.teacher_conflicts.len(), 1);
        let conflict = &report.teacher_conflicts[0];
        assert_eq!(conflict.teacher, "Alice");
        assert_eq!(conflict.day, Weekday::Wednesday);
        assert_eq!(conflict.period, 4);
        assert_eq!(conflict.batches, vec![a, b]);
    }

    #[test]
    fn test_unknown_subject_index_counted() {
        let catalog = sample_catalog();
        let b = key("1,2024,1,B");
        let mut t = Timetable::new([&b]);
        t.set(&b, Weekday::Monday, 0, Slot::assigned(5, 0));
        let report = analyze(&t, &catalog, &[b.clone()]);
        assert_eq!(report.batches[&b].unknown_assignments, 1);
        assert_eq!(report.batches[&b].empty_periods, 34);
    }

    #[test]
    fn test_report_serializes_to_json() {
        let catalog = sample_catalog();
        let a = key("1,2024,1,A");
        let t = Timetable::new([&a]);
        let report = analyze(&t, &catalog, &[a]);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["batches"]["1, 2024, 1, A"]["empty_periods"], 35);
        assert_eq!(
            json["batches"]["1, 2024, 1, A"]["subjects"]["Math"]["daily_counts"][0]["day"],
            "Monday"
        );
    }
}
