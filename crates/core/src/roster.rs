// crates/core/src/roster.rs

//! Month view of the roster: one row per employee, one cell per day.

use chrono::{Datelike, Months, NaiveDate, Weekday};

use crate::actions::ItemKind;
use crate::error::ListError;
use crate::list_access::{ListQuery, ListReader};
use crate::records::{
    covered_days, CompensatieUren, Medewerker, RequestStatus, Verlof, Zittingsvrij,
};
use crate::types::ItemId;

/// What occupies a cell. Declaration order is display priority, highest last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum CellCode {
    Compensatie,
    Zittingsvrij,
    Verlof,
    Ziekte,
}

impl CellCode {
    pub fn code(&self) -> &'static str {
        match self {
            CellCode::Verlof => "VER",
            CellCode::Ziekte => "ZK",
            CellCode::Compensatie => "CU",
            CellCode::Zittingsvrij => "ZV",
        }
    }

    /// Context-menu type of the item behind the cell.
    pub fn item_kind(&self) -> ItemKind {
        match self {
            CellCode::Verlof => ItemKind::Verlof,
            CellCode::Ziekte => ItemKind::Ziekte,
            CellCode::Compensatie => ItemKind::Compensatie,
            CellCode::Zittingsvrij => ItemKind::Zittingsvrij,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellEntry {
    pub code: CellCode,
    pub item_id: ItemId,
    pub pending: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterCell {
    pub date: NaiveDate,
    pub weekend: bool,
    pub entry: Option<CellEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterRow {
    pub name: String,
    pub username: String,
    pub team: Option<String>,
    pub cells: Vec<RosterCell>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterMonth {
    pub first_day: NaiveDate,
    pub days: Vec<NaiveDate>,
    pub rows: Vec<RosterRow>,
}

/// Records the month view is built from.
#[derive(Debug, Default)]
pub struct RosterInput {
    pub medewerkers: Vec<Medewerker>,
    pub verlof: Vec<Verlof>,
    pub compensatie: Vec<CompensatieUren>,
    pub zittingsvrij: Vec<Zittingsvrij>,
}

fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

fn month_days(year: i32, month: u32) -> Option<Vec<NaiveDate>> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = first.checked_add_months(Months::new(1))?;
    Some(first.iter_days().take_while(|d| *d < next).collect())
}

/// Write `entry` into the row's cells between `from` and `to`, keeping the
/// higher-priority entry where two overlap.
fn mark(row: &mut RosterRow, from: NaiveDate, to: NaiveDate, entry: CellEntry) {
    for cell in row
        .cells
        .iter_mut()
        .filter(|c| c.date >= from && c.date <= to)
    {
        match cell.entry {
            Some(existing) if existing.code >= entry.code => {}
            _ => cell.entry = Some(entry),
        }
    }
}

/// Build the month grid. `None` for an invalid year/month.
pub fn build_month(year: i32, month: u32, input: &RosterInput) -> Option<RosterMonth> {
    let days = month_days(year, month)?;
    let first_day = days[0];

    let mut rows: Vec<RosterRow> = input
        .medewerkers
        .iter()
        .filter(|m| m.is_visible())
        .filter_map(|m| {
            let username = m.username.clone().filter(|u| !u.trim().is_empty())?;
            Some(RosterRow {
                name: m.display_name().to_string(),
                username,
                team: m.team.clone(),
                cells: days
                    .iter()
                    .map(|d| RosterCell {
                        date: *d,
                        weekend: is_weekend(*d),
                        entry: None,
                    })
                    .collect(),
            })
        })
        .collect();

    rows.sort_by(|a, b| a.team.cmp(&b.team).then_with(|| a.name.cmp(&b.name)));

    let mut place = |username: &str, from: NaiveDate, to: NaiveDate, entry: CellEntry| {
        if let Some(row) = rows
            .iter_mut()
            .find(|r| r.username.eq_ignore_ascii_case(username))
        {
            mark(row, from, to, entry);
        }
    };

    for v in input
        .verlof
        .iter()
        .filter(|v| v.status != RequestStatus::Afgewezen)
    {
        let (from, to) = covered_days(v.start_datum, v.eind_datum);
        let code = if v.is_ziekte() {
            CellCode::Ziekte
        } else {
            CellCode::Verlof
        };
        place(
            &v.medewerker_id,
            from,
            to,
            CellEntry {
                code,
                item_id: v.id,
                pending: v.status == RequestStatus::Nieuw,
            },
        );
    }

    for c in input
        .compensatie
        .iter()
        .filter(|c| c.status != RequestStatus::Afgewezen)
    {
        let (from, to) = covered_days(c.start_compensatie_uren, c.einde_compensatie_uren);
        place(
            &c.medewerker_id,
            from,
            to,
            CellEntry {
                code: CellCode::Compensatie,
                item_id: c.id,
                pending: c.status == RequestStatus::Nieuw,
            },
        );
    }

    for z in &input.zittingsvrij {
        let (from, to) = covered_days(z.start, z.einde);
        place(
            &z.gebruikersnaam,
            from,
            to,
            CellEntry {
                code: CellCode::Zittingsvrij,
                item_id: z.id,
                pending: false,
            },
        );
    }

    Some(RosterMonth {
        first_day,
        days,
        rows,
    })
}

/// `$filter` selecting items that overlap `[first, last]`.
fn overlap_filter(start_field: &str, end_field: &str, first: NaiveDate, last: NaiveDate) -> String {
    format!(
        "{start_field} le datetime'{}T23:59:59Z' and {end_field} ge datetime'{}T00:00:00Z'",
        last.format("%Y-%m-%d"),
        first.format("%Y-%m-%d"),
    )
}

/// Read everything the month view needs and build it.
pub fn load_month<R: ListReader>(
    reader: &R,
    year: i32,
    month: u32,
) -> Result<Option<RosterMonth>, ListError> {
    let Some(days) = month_days(year, month) else {
        return Ok(None);
    };
    let (first, last) = (days[0], days[days.len() - 1]);

    let input = RosterInput {
        medewerkers: reader.get_records(&ListQuery::new().filter("Actief eq 1"))?,
        verlof: reader.get_records(
            &ListQuery::new().filter(overlap_filter("StartDatum", "EindDatum", first, last)),
        )?,
        compensatie: reader.get_records(&ListQuery::new().filter(overlap_filter(
            "StartCompensatieUren",
            "EindeCompensatieUren",
            first,
            last,
        )))?,
        zittingsvrij: reader.get_records(&ListQuery::new().filter(overlap_filter(
            "ZittingsVrijeDagTijd",
            "ZittingsVrijeDagTijdEind",
            first,
            last,
        )))?,
    };

    Ok(build_month(year, month, &input))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::list_registry::ListRegistry;
    use crate::mock::MockDataProvider;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn july() -> RosterMonth {
        let mock = MockDataProvider::new(Arc::new(ListRegistry::builtin())).with_latency(0..0);
        load_month(&mock, 2026, 7).unwrap().unwrap()
    }

    fn cell<'a>(month: &'a RosterMonth, user: &str, day: &str) -> &'a RosterCell {
        let row = month.rows.iter().find(|r| r.username == user).unwrap();
        row.cells.iter().find(|c| c.date == date(day)).unwrap()
    }

    #[test]
    fn month_has_all_days() {
        let month = july();
        assert_eq!(month.days.len(), 31);
        assert_eq!(month.first_day, date("2026-07-01"));
        assert!(build_month(2026, 13, &RosterInput::default()).is_none());
        assert_eq!(month_days(2028, 2).unwrap().len(), 29);
    }

    #[test]
    fn hidden_employees_have_no_row() {
        let month = july();
        assert_eq!(month.rows.len(), 3);
        assert!(month.rows.iter().all(|r| r.username != "org\\oud"));
        assert_eq!(month.rows[0].team.as_deref(), Some("Team Noord"));
    }

    #[test]
    fn cells_carry_codes() {
        let month = july();
        let c = cell(&month, "org\\jdevries", "2026-07-07");
        assert_eq!(c.entry.unwrap().code, CellCode::Verlof);
        assert_eq!(c.entry.unwrap().item_id, 11);
        assert!(!c.entry.unwrap().pending);

        let c = cell(&month, "org\\pbakker", "2026-07-08");
        assert_eq!(c.entry.unwrap().code, CellCode::Ziekte);
        assert!(c.entry.unwrap().pending);

        let c = cell(&month, "org\\pbakker", "2026-07-14");
        assert_eq!(c.entry.unwrap().code, CellCode::Zittingsvrij);

        let c = cell(&month, "org\\felamrani", "2026-07-03");
        assert_eq!(c.entry.unwrap().code.code(), "CU");

        assert!(cell(&month, "org\\jdevries", "2026-07-20").entry.is_none());
        assert!(cell(&month, "org\\jdevries", "2026-07-04").weekend);
    }

    #[test]
    fn ziekte_wins_over_verlof() {
        let mut input = RosterInput::default();
        input.medewerkers.push(
            serde_json::from_value(serde_json::json!({"Id": 1, "Username": "u"})).unwrap(),
        );
        for (id, reden) in [(1, "Verlof/vakantie"), (2, "Ziekte"), (3, "Verlof/vakantie")] {
            input.verlof.push(
                serde_json::from_value(serde_json::json!({
                    "Id": id, "MedewerkerID": "U", "Reden": reden, "Status": "Goedgekeurd",
                    "StartDatum": "2026-03-02T00:00:00Z", "EindDatum": "2026-03-03T00:00:00Z"
                }))
                .unwrap(),
            );
        }
        let month = build_month(2026, 3, &input).unwrap();
        let entry = month.rows[0].cells[1].entry.unwrap();
        assert_eq!(entry.code, CellCode::Ziekte);
        assert_eq!(entry.item_id, 2);
    }

    #[test]
    fn rejected_requests_are_not_shown() {
        let mut input = RosterInput::default();
        input.medewerkers.push(
            serde_json::from_value(serde_json::json!({"Id": 1, "Username": "u"})).unwrap(),
        );
        input.verlof.push(
            serde_json::from_value(serde_json::json!({
                "Id": 9, "MedewerkerID": "u", "Status": "Afgewezen",
                "StartDatum": "2026-03-02T00:00:00Z", "EindDatum": "2026-03-03T00:00:00Z"
            }))
            .unwrap(),
        );
        let month = build_month(2026, 3, &input).unwrap();
        assert!(month.rows[0].cells.iter().all(|c| c.entry.is_none()));
    }

    #[test]
    fn overlap_filter_format() {
        assert_eq!(
            overlap_filter("StartDatum", "EindDatum", date("2026-07-01"), date("2026-07-31")),
            "StartDatum le datetime'2026-07-31T23:59:59Z' and EindDatum ge datetime'2026-07-01T00:00:00Z'"
        );
    }
}
