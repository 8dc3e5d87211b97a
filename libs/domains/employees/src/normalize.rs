//! Conversions between the wire, domain and storage shapes of an employee.
//!
//! Everything here is pure. Inbound conversions fail only on a present but
//! unparsable `joining_date`; outbound conversions never fail, a stored
//! date that cannot be read is passed through as-is.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use mongodb::bson::{Bson, DateTime as BsonDateTime};

use crate::error::{EmployeeError, EmployeeResult};
use crate::models::{
    CreateEmployee, Employee, EmployeeChanges, EmployeeRecord, StoredDate, UpdateEmployee,
    WireDate,
};

/// Date-only notations tried in order after RFC 3339.
///
/// Month-first `MM/DD/YYYY` wins over day-first, so `03/10/2024` is March 10;
/// day-first forms only apply when the month-first reading is impossible.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%Y.%m.%d",
    "%Y%m%d",
    "%m/%d/%Y",
    "%d/%m/%Y",
    "%d.%m.%Y",
    "%d %B %Y",
    "%B %d, %Y",
    "%B %d %Y",
    "%A, %B %d, %Y",
    "%d-%B-%Y",
];

/// Timestamps without an offset; only the date part is kept
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
];

/// Parse a calendar date from the common notations.
///
/// Accepts ISO dates, RFC 3339 timestamps (the date in the given offset),
/// `YYYY/MM/DD`, `YYYY.MM.DD`, compact `YYYYMMDD`, US `MM/DD/YYYY`,
/// day-first `DD/MM/YYYY` and `DD.MM.YYYY`, and month-name forms such as
/// `15 January 2023`, `January 15, 2023`, `Jan 15, 2023` or
/// `Sunday, January 15, 2023`.
pub fn parse_date_lenient(input: &str) -> Option<NaiveDate> {
    let s = input.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
                .map(|dt| dt.date())
        })
}

/// Midnight UTC of `date`, so year/month/day read back unchanged
pub fn to_storage_date(date: NaiveDate) -> BsonDateTime {
    BsonDateTime::from_millis(date.and_time(NaiveTime::MIN).and_utc().timestamp_millis())
}

/// Parse an inbound `joining_date` into its storage form
pub fn parse_joining_date(input: &str) -> EmployeeResult<BsonDateTime> {
    parse_date_lenient(input)
        .map(to_storage_date)
        .ok_or_else(|| EmployeeError::InvalidDate(input.to_string()))
}

/// Classify a stored `joining_date`; missing, null and other BSON types resolve to `None`
pub fn resolve_stored_date(value: Option<Bson>) -> Option<StoredDate> {
    match value? {
        Bson::DateTime(dt) => Some(StoredDate::Timestamp(dt)),
        Bson::String(s) => Some(StoredDate::Legacy(s)),
        _ => None,
    }
}

pub fn to_wire_date(stored: StoredDate) -> WireDate {
    match stored {
        StoredDate::Timestamp(dt) => DateTime::<Utc>::from_timestamp_millis(dt.timestamp_millis())
            .map(|utc| WireDate::Date(utc.date_naive()))
            .unwrap_or_else(|| WireDate::Unparsed(dt.to_string())),
        StoredDate::Legacy(raw) => match parse_date_lenient(&raw) {
            Some(date) => WireDate::Date(date),
            None => {
                tracing::warn!(joining_date = %raw, "Stored joining_date is not a date, passing through");
                WireDate::Unparsed(raw)
            }
        },
    }
}

impl From<EmployeeRecord> for Employee {
    fn from(record: EmployeeRecord) -> Self {
        Self {
            employee_id: record.employee_id,
            name: record.name,
            department: record.department,
            salary: record.salary,
            joining_date: resolve_stored_date(record.joining_date).map(to_wire_date),
            skills: record.skills,
        }
    }
}

impl TryFrom<CreateEmployee> for EmployeeRecord {
    type Error = EmployeeError;

    fn try_from(input: CreateEmployee) -> EmployeeResult<Self> {
        let joining_date = parse_joining_date(&input.joining_date)?;

        Ok(Self {
            id: None,
            employee_id: input.employee_id,
            name: input.name,
            department: input.department,
            salary: input.salary,
            joining_date: Some(Bson::DateTime(joining_date)),
            skills: input.skills,
        })
    }
}

impl TryFrom<UpdateEmployee> for EmployeeChanges {
    type Error = EmployeeError;

    fn try_from(input: UpdateEmployee) -> EmployeeResult<Self> {
        let joining_date = input
            .joining_date
            .as_deref()
            .map(parse_joining_date)
            .transpose()?;

        Ok(Self {
            name: input.name,
            department: input.department,
            salary: input.salary,
            joining_date,
            skills: input.skills,
        })
    }
}

/// Round half away from zero to 2 decimal places
pub fn round_to_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
