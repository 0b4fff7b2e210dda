//! Hearing value types and the raw form payload they are parsed from.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

const DEFAULT_DURATION_MINUTES: u32 = 60;
const MAX_DURATION_MINUTES: u32 = 12 * 60;
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Opaque case identifier. Hearings are identified by the case they belong to.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CaseId(String);

impl CaseId {
    pub fn new(raw: impl AsRef<str>) -> Result<Self> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(Error::Validation("Case number cannot be empty".to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CaseId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for CaseId {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::new(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum HearingStatus {
    #[default]
    Active,
    Adjourned,
    Closed,
}

impl std::fmt::Display for HearingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HearingStatus::Active => write!(f, "active"),
            HearingStatus::Adjourned => write!(f, "adjourned"),
            HearingStatus::Closed => write!(f, "closed"),
        }
    }
}

impl std::str::FromStr for HearingStatus {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(HearingStatus::Active),
            "adjourned" => Ok(HearingStatus::Adjourned),
            "closed" => Ok(HearingStatus::Closed),
            other => Err(Error::Validation(format!("Unknown hearing status '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Normal,
    High,
    Urgent,
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Priority::Low => write!(f, "low"),
            Priority::Normal => write!(f, "normal"),
            Priority::High => write!(f, "high"),
            Priority::Urgent => write!(f, "urgent"),
        }
    }
}

impl std::str::FromStr for Priority {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "normal" | "medium" => Ok(Priority::Normal),
            "high" => Ok(Priority::High),
            "urgent" => Ok(Priority::Urgent),
            other => Err(Error::Validation(format!("Unknown priority '{}'", other))),
        }
    }
}

/// A scheduled (or proposed) court appearance. Plain value data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hearing {
    pub case_id: CaseId,
    pub client_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opposing_party: Option<String>,
    pub court_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub judge_name: Option<String>,
    pub date: NaiveDate,
    pub time: NaiveTime,
    #[serde(default = "default_duration")]
    pub duration_minutes: u32,
    #[serde(default)]
    pub status: HearingStatus,
    #[serde(default)]
    pub priority: Priority,
}

fn default_duration() -> u32 {
    DEFAULT_DURATION_MINUTES
}

impl Hearing {
    /// Minimal active hearing; optional fields can be set afterwards.
    pub fn new(
        case_id: CaseId,
        client_name: impl Into<String>,
        court_name: impl Into<String>,
        date: NaiveDate,
        time: NaiveTime,
    ) -> Self {
        Self {
            case_id,
            client_name: client_name.into(),
            opposing_party: None,
            court_name: court_name.into(),
            judge_name: None,
            date,
            time,
            duration_minutes: DEFAULT_DURATION_MINUTES,
            status: HearingStatus::Active,
            priority: Priority::Normal,
        }
    }

    pub fn with_opposing_party(mut self, party: impl Into<String>) -> Self {
        self.opposing_party = Some(party.into());
        self
    }

    pub fn with_status(mut self, status: HearingStatus) -> Self {
        self.status = status;
        self
    }

    pub fn is_active(&self) -> bool {
        self.status == HearingStatus::Active
    }
}

/// Raw hearing payload as entered in a form or sent over the wire.
///
/// Every field is a string so that validation errors can be reported for
/// the exact field the user typed, before any detection runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HearingForm {
    #[serde(default)]
    pub case_number: String,
    #[serde(default)]
    pub client_name: String,
    #[serde(default)]
    pub opposing_party: Option<String>,
    #[serde(default)]
    pub court_name: String,
    #[serde(default)]
    pub judge_name: Option<String>,
    #[serde(default)]
    pub hearing_date: String,
    #[serde(default)]
    pub hearing_time: String,
    #[serde(default)]
    pub duration_minutes: Option<u32>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
}

impl HearingForm {
    /// Validate the form and turn it into a `Hearing`.
    ///
    /// Dates before `today` are rejected unless `allow_past` is set.
    pub fn parse(&self, today: NaiveDate, allow_past: bool) -> Result<Hearing> {
        let case_id = CaseId::new(&self.case_number)?;
        let client_name = required("Client name", &self.client_name)?;
        let court_name = required("Court name", &self.court_name)?;
        let date = parse_date(&self.hearing_date)?;
        let time = parse_time(&self.hearing_time)?;

        if !allow_past && date < today {
            return Err(Error::Validation(format!(
                "Hearing date {} is in the past",
                date
            )));
        }

        let duration_minutes = self.duration_minutes.unwrap_or(DEFAULT_DURATION_MINUTES);
        if duration_minutes == 0 || duration_minutes > MAX_DURATION_MINUTES {
            return Err(Error::Validation(format!(
                "Duration must be between 1 and {} minutes",
                MAX_DURATION_MINUTES
            )));
        }

        let status = match non_blank(&self.status) {
            Some(s) => s.parse()?,
            None => HearingStatus::default(),
        };
        let priority = match non_blank(&self.priority) {
            Some(p) => p.parse()?,
            None => Priority::default(),
        };

        Ok(Hearing {
            case_id,
            client_name,
            opposing_party: non_blank(&self.opposing_party).map(str::to_string),
            court_name,
            judge_name: non_blank(&self.judge_name).map(str::to_string),
            date,
            time,
            duration_minutes,
            status,
            priority,
        })
    }

    /// The inverse of `parse`, used to reopen a stored hearing for editing.
    pub fn from_hearing(hearing: &Hearing) -> Self {
        Self {
            case_number: hearing.case_id.to_string(),
            client_name: hearing.client_name.clone(),
            opposing_party: hearing.opposing_party.clone(),
            court_name: hearing.court_name.clone(),
            judge_name: hearing.judge_name.clone(),
            hearing_date: hearing.date.format(DATE_FORMAT).to_string(),
            hearing_time: hearing.time.format("%H:%M").to_string(),
            duration_minutes: Some(hearing.duration_minutes),
            status: Some(hearing.status.to_string()),
            priority: Some(hearing.priority.to_string()),
        }
    }
}

fn required(field: &str, value: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::Validation(format!("{} is required", field)));
    }
    Ok(trimmed.to_string())
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

pub fn parse_date(raw: &str) -> Result<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(Error::Validation("Hearing date is required".to_string()));
    }
    NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
        .map_err(|_| Error::Validation(format!("Unparseable hearing date '{}'", trimmed)))
}

pub fn parse_time(raw: &str) -> Result<NaiveTime> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(Error::Validation("Hearing time is required".to_string()));
    }
    NaiveTime::parse_from_str(trimmed, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M:%S"))
        .map_err(|_| Error::Validation(format!("Unparseable hearing time '{}'", trimmed)))
}
