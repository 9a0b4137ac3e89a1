use chrono::NaiveDate;
use serde::Serialize;
use std::io::Write;
use std::path::Path;

use crate::model::Period;
use crate::timeline::Timeline;

/// One line of the period summary.
#[derive(Debug, Serialize, PartialEq)]
pub struct PeriodRow<'a> {
    pub position: usize,
    pub id: Option<&'a str>,
    pub name: &'a str,
    pub start_week: u32,
    pub end_week: u32,
    pub weeks: u32,
    pub starts_on: Option<NaiveDate>,
    pub ends_on: Option<NaiveDate>,
    pub exercises: usize,
}

pub fn period_rows<'a>(periods: &'a [Period], timeline: &Timeline) -> Vec<PeriodRow<'a>> {
    periods
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let span = timeline.range_span(p.range());
            PeriodRow {
                position: i,
                id: p.id.as_deref(),
                name: &p.name,
                start_week: p.start,
                end_week: p.end,
                weeks: p.range().len(),
                starts_on: span.map(|(s, _)| s),
                ends_on: span.map(|(_, e)| e),
                exercises: p.exercises.len(),
            }
        })
        .collect()
}

pub fn write_json<T: Serialize + ?Sized, P: AsRef<Path>>(
    value: &T,
    path: P,
) -> std::io::Result<()> {
    let file = std::fs::File::create(path)?;
    serde_json::to_writer_pretty(file, value).map_err(std::io::Error::other)
}

pub fn write_csv<T: Serialize>(writer: impl Write, records: &[T]) -> csv::Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for r in records {
        wtr.serialize(r)?;
    }
    wtr.flush().map_err(Into::into)
}

pub fn save_periods_csv<P: AsRef<Path>>(
    path: P,
    periods: &[Period],
    timeline: &Timeline,
) -> csv::Result<()> {
    write_csv(std::fs::File::create(path)?, &period_rows(periods, timeline))
}

/// Full periods, exercises included.
pub fn save_periods_json<P: AsRef<Path>>(path: P, periods: &[Period]) -> std::io::Result<()> {
    write_json(periods, path)
}

pub fn save_assignments_csv<P: AsRef<Path>>(path: P, periods: &[Period]) -> csv::Result<()> {
    #[derive(Serialize)]
    struct Row<'a> {
        period: &'a str,
        start_week: u32,
        end_week: u32,
        exercise_id: &'a str,
        exercise: &'a str,
        muscle_groups: String,
        percentage: f64,
    }
    let rows: Vec<Row> = periods
        .iter()
        .flat_map(|p| {
            p.exercises.iter().map(move |a| Row {
                period: &p.name,
                start_week: p.start,
                end_week: p.end,
                exercise_id: &a.exercise.id,
                exercise: &a.exercise.name,
                muscle_groups: a.exercise.muscle_groups.join("; "),
                percentage: a.variant.percentage,
            })
        })
        .collect();
    write_csv(std::fs::File::create(path)?, &rows)
}
