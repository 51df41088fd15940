//! Registration × date grid layout of the timeline.
//!
//! Coordinates are local to the grid: x = 0 is midnight of the first date
//! column, y = 0 is the top of the first registration row.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use egui::{Pos2, Rect, Vec2};

use crate::model::{Flight, TimelineViewport};
use crate::schedule::lanes;
use crate::schedule::time;

/// A timeline cell: one aircraft on one day.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CellKey {
    pub registration: String,
    pub date: String,
}

impl CellKey {
    pub fn new(registration: impl Into<String>, date: impl Into<String>) -> Self {
        Self {
            registration: registration.into(),
            date: date.into(),
        }
    }

    pub fn of(flight: &Flight) -> Self {
        Self::new(flight.registration.clone(), flight.date.clone())
    }
}

/// Resolves a pointer position to the cell under it.
pub trait CellIndex {
    fn cell_at(&self, pos: Pos2) -> Option<CellKey>;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutOptions {
    pub lane_height: f32,
    pub row_padding: f32,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            lane_height: 24.0,
            row_padding: 4.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RowLayout {
    pub registration: String,
    pub top: f32,
    pub height: f32,
    pub lanes: usize,
    pub flight_count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BarLayout {
    pub flight_id: String,
    pub cell: CellKey,
    pub lane: usize,
    pub rect: Rect,
    pub duration: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CellRect {
    pub key: CellKey,
    pub rect: Rect,
}

/// Positioned rows, cells and flight bars for one render pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GanttLayout {
    pub dates: Vec<String>,
    pub rows: Vec<RowLayout>,
    pub cells: Vec<CellRect>,
    pub bars: Vec<BarLayout>,
    pub day_width: f32,
    pub size: Vec2,
    /// Flights left out because their times do not parse.
    pub skipped: Vec<String>,
}

/// Chronological sort key for a date label such as `15/01` or `2025-01-15`.
pub fn date_sort_key(label: &str) -> (bool, Option<NaiveDate>, String) {
    let s = label.trim();
    let parsed = ["%Y-%m-%d", "%d/%m/%Y", "%d.%m.%Y"]
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        // Day/month labels carry no year; 2000 is a leap year so 29/02 parses.
        .or_else(|| NaiveDate::parse_from_str(&format!("{s}/2000"), "%d/%m/%Y").ok());
    (parsed.is_none(), parsed, s.to_string())
}

/// Distinct date labels in chronological order.
pub fn sorted_dates<'a>(labels: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut dates: Vec<String> = labels
        .into_iter()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect();
    dates.sort_by_key(|d| date_sort_key(d));
    dates
}

impl GanttLayout {
    /// Lay out `flights` (already carrying any optimistic overrides).
    pub fn build(flights: &[Flight], viewport: &TimelineViewport, options: &LayoutOptions) -> Self {
        Self::build_with_fleet(flights, &[], viewport, options)
    }

    /// Like [`GanttLayout::build`], with a row for every tail in `fleet` even
    /// when it has no flights yet, so bars can be dropped onto it.
    pub fn build_with_fleet(
        flights: &[Flight],
        fleet: &[String],
        viewport: &TimelineViewport,
        options: &LayoutOptions,
    ) -> Self {
        let mut skipped = Vec::new();
        let valid: Vec<&Flight> = flights
            .iter()
            .filter(|f| match time::interval(&f.std, &f.sta) {
                Ok(_) => true,
                Err(e) => {
                    tracing::warn!(flight = %f.flight_no, error = %e, "leaving flight out of the timeline");
                    skipped.push(f.id.clone());
                    false
                }
            })
            .collect();

        let dates = sorted_dates(valid.iter().map(|f| f.date.as_str()));
        let registrations: BTreeSet<&str> = valid
            .iter()
            .map(|f| f.registration.as_str())
            .chain(fleet.iter().map(String::as_str).filter(|t| !t.trim().is_empty()))
            .collect();

        let mut groups: BTreeMap<CellKey, Vec<&Flight>> = BTreeMap::new();
        for f in &valid {
            groups.entry(CellKey::of(f)).or_default().push(*f);
        }

        let day_width = viewport.day_width();
        let mut rows = Vec::with_capacity(registrations.len());
        let mut cells = Vec::with_capacity(registrations.len() * dates.len());
        let mut bars = Vec::with_capacity(valid.len());
        let mut top = 0.0;

        for registration in registrations {
            let mut assignments = Vec::new();
            let mut lane_count = 1;
            let mut flight_count = 0;
            for (col, date) in dates.iter().enumerate() {
                let key = CellKey::new(registration, date.clone());
                if let Some(group) = groups.get(&key) {
                    // Every flight in the group parsed above, so this cannot fail.
                    if let Ok(assignment) = lanes::assign_lanes(group) {
                        lane_count = lane_count.max(assignment.lane_count);
                        flight_count += group.len();
                        assignments.push((col, key, group, assignment));
                    }
                }
            }

            let height = lane_count as f32 * options.lane_height + options.row_padding * 2.0;
            for (col, date) in dates.iter().enumerate() {
                cells.push(CellRect {
                    key: CellKey::new(registration, date.clone()),
                    rect: Rect::from_min_size(
                        Pos2::new(col as f32 * day_width, top),
                        Vec2::new(day_width, height),
                    ),
                });
            }

            for (col, key, group, assignment) in assignments {
                for (flight_id, lane) in assignment.slots {
                    let Some(flight) = group.iter().find(|f| f.id == flight_id) else {
                        continue;
                    };
                    let Ok((start, end)) = time::interval(&flight.std, &flight.sta) else {
                        continue;
                    };
                    let duration = end - start;
                    let x = col as f32 * day_width + viewport.minutes_to_x(start);
                    let y = top + options.row_padding + lane as f32 * options.lane_height;
                    bars.push(BarLayout {
                        flight_id,
                        cell: key.clone(),
                        lane,
                        rect: Rect::from_min_size(
                            Pos2::new(x, y + 1.0),
                            Vec2::new(viewport.bar_width(duration), options.lane_height - 2.0),
                        ),
                        duration,
                    });
                }
            }

            rows.push(RowLayout {
                registration: registration.to_string(),
                top,
                height,
                lanes: lane_count,
                flight_count,
            });
            top += height;
        }

        tracing::debug!(rows = rows.len(), days = dates.len(), bars = bars.len(), "timeline layout");

        Self {
            size: Vec2::new(viewport.total_width(dates.len()), top),
            dates,
            rows,
            cells,
            bars,
            day_width,
            skipped,
        }
    }

    pub fn bar(&self, flight_id: &str) -> Option<&BarLayout> {
        self.bars.iter().find(|b| b.flight_id == flight_id)
    }

    /// Topmost bar under `pos`; bars drawn later win.
    pub fn bar_at(&self, pos: Pos2) -> Option<&BarLayout> {
        self.bars.iter().rev().find(|b| b.rect.contains(pos))
    }

    pub fn row(&self, registration: &str) -> Option<&RowLayout> {
        self.rows.iter().find(|r| r.registration == registration)
    }

    /// Left edge of a date column.
    pub fn column_x(&self, date: &str) -> Option<f32> {
        self.dates
            .iter()
            .position(|d| d == date)
            .map(|col| col as f32 * self.day_width)
    }
}

impl CellIndex for GanttLayout {
    /// Cells are half-open so a point on a shared edge belongs to the cell
    /// to its right or below.
    fn cell_at(&self, pos: Pos2) -> Option<CellKey> {
        self.cells
            .iter()
            .find(|c| {
                (c.rect.min.x..c.rect.max.x).contains(&pos.x)
                    && (c.rect.min.y..c.rect.max.y).contains(&pos.y)
            })
            .map(|c| c.key.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flight(no: &str, reg: &str, date: &str, std: &str, sta: &str) -> Flight {
        let mut f = Flight::new(no, reg, date, std, sta).unwrap();
        f.id = no.to_string();
        f
    }

    fn viewport() -> TimelineViewport {
        TimelineViewport::new(1440.0)
    }

    #[test]
    fn test_dates_sort_chronologically() {
        let dates = sorted_dates(["02/02", "15/01", "03/01", "15/01", "next week"]);
        assert_eq!(dates, vec!["03/01", "15/01", "02/02", "next week"]);
        let iso = sorted_dates(["2025-01-10", "2024-12-31"]);
        assert_eq!(iso, vec!["2024-12-31", "2025-01-10"]);
    }

    #[test]
    fn test_grid_dimensions_and_bar_placement() {
        let flights = vec![
            flight("F1", "A", "15/01", "10:00", "11:00"),
            flight("F2", "A", "15/01", "10:30", "12:00"),
            flight("F3", "A", "16/01", "06:00", "07:00"),
            flight("F4", "B", "16/01", "00:00", "02:00"),
        ];
        let opts = LayoutOptions {
            lane_height: 20.0,
            row_padding: 5.0,
        };
        let layout = GanttLayout::build(&flights, &viewport(), &opts);

        assert_eq!(layout.dates, vec!["15/01", "16/01"]);
        assert_eq!(layout.rows.len(), 2);
        assert_eq!(layout.cells.len(), 4);

        let row_a = layout.row("A").unwrap();
        assert_eq!(row_a.lanes, 2);
        assert_eq!(row_a.height, 50.0);
        assert_eq!(row_a.flight_count, 3);
        let row_b = layout.row("B").unwrap();
        assert_eq!(row_b.top, 50.0);
        assert_eq!(row_b.lanes, 1);
        assert_eq!(layout.size, Vec2::new(2880.0, 80.0));

        let f2 = layout.bar("F2").unwrap();
        assert_eq!(f2.lane, 1);
        assert_eq!(f2.rect.left(), 630.0);
        assert_eq!(f2.rect.width(), 90.0);
        assert_eq!(f2.rect.top(), 5.0 + 20.0 + 1.0);

        let f3 = layout.bar("F3").unwrap();
        assert_eq!(f3.rect.left(), 1440.0 + 360.0);
        assert_eq!(f3.lane, 0);

        let f4 = layout.bar("F4").unwrap();
        assert_eq!(f4.cell, CellKey::new("B", "16/01"));
        assert_eq!(f4.rect.top(), 50.0 + 5.0 + 1.0);
    }

    #[test]
    fn test_overnight_bar_extends_past_its_day() {
        let flights = vec![flight("N", "A", "15/01", "22:00", "02:00")];
        let layout = GanttLayout::build(&flights, &viewport(), &LayoutOptions::default());
        let bar = layout.bar("N").unwrap();
        assert_eq!(bar.duration, 240);
        assert_eq!(bar.rect.right(), 1320.0 + 240.0);
    }

    #[test]
    fn test_cell_index_resolves_pointer() {
        let flights = vec![
            flight("F1", "A", "15/01", "10:00", "11:00"),
            flight("F2", "B", "16/01", "10:00", "11:00"),
        ];
        let layout = GanttLayout::build(&flights, &viewport(), &LayoutOptions::default());
        let row_b = layout.row("B").unwrap().top;

        assert_eq!(layout.cell_at(Pos2::new(10.0, 5.0)), Some(CellKey::new("A", "15/01")));
        assert_eq!(
            layout.cell_at(Pos2::new(1500.0, row_b + 3.0)),
            Some(CellKey::new("B", "16/01"))
        );
        // empty cells are still drop targets
        assert_eq!(
            layout.cell_at(Pos2::new(1500.0, 3.0)),
            Some(CellKey::new("A", "16/01"))
        );
        assert_eq!(layout.cell_at(Pos2::new(-5.0, 3.0)), None);
        assert_eq!(layout.cell_at(Pos2::new(10.0, layout.size.y + 10.0)), None);
    }

    #[test]
    fn test_shared_edges_belong_to_the_next_cell() {
        let flights = vec![
            flight("F1", "A", "15/01", "10:00", "11:00"),
            flight("F2", "B", "16/01", "00:00", "01:00"),
        ];
        let layout = GanttLayout::build(&flights, &viewport(), &LayoutOptions::default());
        let row_b = layout.row("B").unwrap().top;

        // a midnight departure sits exactly on the column edge
        let f2 = layout.bar("F2").unwrap();
        assert_eq!(layout.cell_at(f2.rect.left_center()), Some(CellKey::new("B", "16/01")));
        assert_eq!(
            layout.cell_at(Pos2::new(1440.0, row_b)),
            Some(CellKey::new("B", "16/01"))
        );
        assert_eq!(layout.cell_at(Pos2::new(2880.0, row_b)), None);
    }

    #[test]
    fn test_fleet_tails_without_flights_get_empty_rows() {
        let flights = vec![flight("F1", "YR-ABC", "15/01", "10:00", "11:00")];
        let fleet = vec!["ER-BAJ".to_string(), "YR-ABC".to_string(), " ".to_string()];
        let layout =
            GanttLayout::build_with_fleet(&flights, &fleet, &viewport(), &LayoutOptions::default());

        let tails: Vec<_> = layout.rows.iter().map(|r| r.registration.as_str()).collect();
        assert_eq!(tails, ["ER-BAJ", "YR-ABC"]);
        let empty = layout.row("ER-BAJ").unwrap();
        assert_eq!((empty.flight_count, empty.lanes), (0, 1));
        assert_eq!(
            layout.cell_at(Pos2::new(10.0, empty.top + 3.0)),
            Some(CellKey::new("ER-BAJ", "15/01"))
        );
        assert_eq!(layout.bars.len(), 1);
    }

    #[test]
    fn test_bar_hit_testing() {
        let flights = vec![flight("F1", "A", "15/01", "10:00", "11:00")];
        let layout = GanttLayout::build(&flights, &viewport(), &LayoutOptions::default());
        let bar = layout.bar("F1").unwrap();
        assert_eq!(
            layout.bar_at(bar.rect.center()).map(|b| b.flight_id.as_str()),
            Some("F1")
        );
        assert!(layout.bar_at(Pos2::new(0.0, 0.0)).is_none());
    }

    #[test]
    fn test_malformed_flights_are_skipped() {
        let mut bad = flight("BAD", "A", "15/01", "10:00", "11:00");
        bad.std = "1000".into();
        let flights = vec![bad, flight("OK", "A", "15/01", "10:00", "11:00")];
        let layout = GanttLayout::build(&flights, &viewport(), &LayoutOptions::default());
        assert_eq!(layout.skipped, vec!["BAD"]);
        assert_eq!(layout.bars.len(), 1);
        assert_eq!(layout.column_x("15/01"), Some(0.0));
        assert_eq!(layout.column_x("16/01"), None);
    }
}
