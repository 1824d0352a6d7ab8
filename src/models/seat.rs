//! Фиксированная схема зала и идентификаторы мест.
//!
//! У каждого сеанса одна и та же сетка 5 x 10: ряды `A`..`E`, места `1`..`10`.
//! После мест 4 и 7 идёт проход, он важен только для отрисовки.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

pub const ROWS: [char; 5] = ['A', 'B', 'C', 'D', 'E'];
pub const COLUMNS: u8 = 10;
pub const AISLE_COLUMNS: [u8; 2] = [4, 7];

/// Буква ряда и номер места, например `C7`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SeatId {
    row: char,
    column: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{0}' is not a seat on this map")]
pub struct InvalidSeat(pub String);

impl SeatId {
    pub fn new(row: char, column: u8) -> Result<Self, InvalidSeat> {
        if ROWS.contains(&row) && (1..=COLUMNS).contains(&column) {
            Ok(SeatId { row, column })
        } else {
            Err(InvalidSeat(format!("{}{}", row, column)))
        }
    }

    pub fn row(&self) -> char {
        self.row
    }

    pub fn column(&self) -> u8 {
        self.column
    }
}

impl fmt::Display for SeatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.row, self.column)
    }
}

impl FromStr for SeatId {
    type Err = InvalidSeat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let mut chars = trimmed.chars();
        let row = chars
            .next()
            .map(|c| c.to_ascii_uppercase())
            .ok_or_else(|| InvalidSeat(s.to_string()))?;
        let column: u8 = chars.as_str().parse().map_err(|_| InvalidSeat(s.to_string()))?;
        SeatId::new(row, column).map_err(|_| InvalidSeat(s.to_string()))
    }
}

impl TryFrom<String> for SeatId {
    type Error = InvalidSeat;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SeatId> for String {
    fn from(seat: SeatId) -> Self {
        seat.to_string()
    }
}

/// На проводе места передаются одной строкой через запятую: `"A1,A2,C7"`.
pub fn join_seats<'a>(seats: impl IntoIterator<Item = &'a SeatId>) -> String {
    seats
        .into_iter()
        .map(SeatId::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

/// Разбирает строку мест. Нераспознанные записи возвращаются отдельно,
/// вызывающий решает, логировать их или отвергнуть.
pub fn split_seats(raw: &str) -> (BTreeSet<SeatId>, Vec<String>) {
    let mut seats = BTreeSet::new();
    let mut rejected = Vec::new();
    for part in raw.split(',').filter(|p| !p.trim().is_empty()) {
        match part.parse::<SeatId>() {
            Ok(seat) => {
                seats.insert(seat);
            }
            Err(_) => rejected.push(part.trim().to_string()),
        }
    }
    (seats, rejected)
}

/// Как рисовать одно место.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeatStatus {
    Available,
    Selected,
    Booked,
}

pub struct SeatMap;

impl SeatMap {
    pub fn seats() -> impl Iterator<Item = SeatId> {
        ROWS.into_iter()
            .flat_map(|row| (1..=COLUMNS).map(move |column| SeatId { row, column }))
    }

    pub fn len() -> usize {
        ROWS.len() * COLUMNS as usize
    }

    pub fn has_aisle_after(column: u8) -> bool {
        AISLE_COLUMNS.contains(&column)
    }

    pub fn status_of(seat: &SeatId, booked: &BTreeSet<SeatId>, selected: &BTreeSet<SeatId>) -> SeatStatus {
        if booked.contains(seat) {
            SeatStatus::Booked
        } else if selected.contains(seat) {
            SeatStatus::Selected
        } else {
            SeatStatus::Available
        }
    }

    /// Текстовая схема: `.` свободно, `*` выбрано, `x` занято, у проходов лишний пробел.
    pub fn render(booked: &BTreeSet<SeatId>, selected: &BTreeSet<SeatId>) -> String {
        let mut out = String::from("   ");
        for column in 1..=COLUMNS {
            out.push_str(&format!("{:>3}", column));
            if Self::has_aisle_after(column) {
                out.push_str("  ");
            }
        }
        out.push('\n');

        for row in ROWS {
            out.push_str(&format!(" {} ", row));
            for column in 1..=COLUMNS {
                let seat = SeatId { row, column };
                let mark = match Self::status_of(&seat, booked, selected) {
                    SeatStatus::Available => '.',
                    SeatStatus::Selected => '*',
                    SeatStatus::Booked => 'x',
                };
                out.push_str(&format!("{:>3}", mark));
                if Self::has_aisle_after(column) {
                    out.push_str("  ");
                }
            }
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_has_fifty_distinct_seats() {
        let all: BTreeSet<SeatId> = SeatMap::seats().collect();
        assert_eq!(all.len(), 50);
        assert_eq!(SeatMap::len(), 50);
        assert!(all.contains(&"E10".parse().unwrap()));
    }

    #[test]
    fn parses_and_rejects_identifiers() {
        let seat: SeatId = " c7 ".parse().unwrap();
        assert_eq!(seat.to_string(), "C7");
        assert!("F1".parse::<SeatId>().is_err());
        assert!("A0".parse::<SeatId>().is_err());
        assert!("A11".parse::<SeatId>().is_err());
        assert!("".parse::<SeatId>().is_err());
    }

    #[test]
    fn seats_sort_by_row_then_number() {
        let (seats, rejected) = split_seats("A10,A2,B1,A1");
        assert!(rejected.is_empty());
        assert_eq!(join_seats(&seats), "A1,A2,A10,B1");
    }

    #[test]
    fn split_keeps_unknown_entries_aside() {
        let (seats, rejected) = split_seats("A1, Z9,,B2");
        assert_eq!(seats.len(), 2);
        assert_eq!(rejected, vec!["Z9".to_string()]);
    }

    #[test]
    fn render_marks_booked_and_selected() {
        let booked: BTreeSet<SeatId> = ["A1".parse().unwrap()].into();
        let selected: BTreeSet<SeatId> = ["A2".parse().unwrap()].into();
        let grid = SeatMap::render(&booked, &selected);
        let row_a = grid.lines().nth(1).unwrap();
        assert!(row_a.starts_with(" A "));
        assert!(row_a.contains('x'));
        assert!(row_a.contains('*'));
        assert_eq!(grid.lines().count(), 6);
    }
}
