use std::collections::HashMap;
use std::fmt;
use std::io::Read;
use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};

use super::domain::{
    ApplicationWindow, BenefitCategory, BenefitOffer, GuardianRequirement, IncomeCondition,
    OfferId, ProfileId, ProfileRecord, RegionScope,
};

#[derive(Debug)]
pub enum ImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    Json(serde_json::Error),
    InvalidRow { line: u64, reason: String },
    UnsupportedFormat(String),
}

impl fmt::Display for ImportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportError::Io(err) => write!(f, "failed to read catalog source: {err}"),
            ImportError::Csv(err) => write!(f, "invalid catalog CSV data: {err}"),
            ImportError::Json(err) => write!(f, "invalid JSON data: {err}"),
            ImportError::InvalidRow { line, reason } => {
                write!(f, "catalog row on line {line} rejected: {reason}")
            }
            ImportError::UnsupportedFormat(ext) => {
                write!(f, "unsupported catalog format '{ext}' (expected json or csv)")
            }
        }
    }
}

impl std::error::Error for ImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ImportError::Io(err) => Some(err),
            ImportError::Csv(err) => Some(err),
            ImportError::Json(err) => Some(err),
            ImportError::InvalidRow { .. } | ImportError::UnsupportedFormat(_) => None,
        }
    }
}

impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

impl From<serde_json::Error> for ImportError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err)
    }
}

/// Loads offers from a `.json` or `.csv` file, chosen by extension.
pub fn load_catalog<P: AsRef<Path>>(path: P) -> Result<Vec<BenefitOffer>, ImportError> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    let file = std::fs::File::open(path)?;
    match extension.as_str() {
        "json" => catalog_from_json(file),
        "csv" => catalog_from_csv(file),
        _ => Err(ImportError::UnsupportedFormat(extension)),
    }
}

pub fn catalog_from_json<R: Read>(reader: R) -> Result<Vec<BenefitOffer>, ImportError> {
    Ok(serde_json::from_reader(reader)?)
}

pub fn catalog_from_csv<R: Read>(reader: R) -> Result<Vec<BenefitOffer>, ImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut offers = Vec::new();

    let headers = csv_reader.headers()?.clone();
    for result in csv_reader.records() {
        let record = result?;
        let line = record.position().map(|pos| pos.line()).unwrap_or_default();
        let row: CatalogRow = record.deserialize(Some(&headers))?;
        offers.push(row.into_offer(line)?);
    }

    Ok(offers)
}

/// Loads stored profiles from a JSON object keyed by profile id.
pub fn load_profiles<P: AsRef<Path>>(
    path: P,
) -> Result<HashMap<ProfileId, ProfileRecord>, ImportError> {
    let file = std::fs::File::open(path)?;
    profiles_from_json(file)
}

pub fn profiles_from_json<R: Read>(
    reader: R,
) -> Result<HashMap<ProfileId, ProfileRecord>, ImportError> {
    let raw: HashMap<String, ProfileRecord> = serde_json::from_reader(reader)?;
    Ok(raw
        .into_iter()
        .map(|(id, record)| (ProfileId(id), record))
        .collect())
}

#[derive(Debug, Deserialize)]
struct CatalogRow {
    id: String,
    title: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    category: Option<String>,
    target_age_min: u32,
    target_age_max: u32,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    province: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    city: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    income_condition: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    guardian_requirement: Option<String>,
    apply_start: String,
    apply_end: String,
    #[serde(default)]
    summary: String,
    #[serde(default)]
    required_documents: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    source_url: Option<String>,
}

impl CatalogRow {
    fn into_offer(self, line: u64) -> Result<BenefitOffer, ImportError> {
        let line_error = |reason: String| ImportError::InvalidRow {
            line,
            reason: format!("offer {}: {reason}", self.id),
        };

        let starts_at = parse_instant(&self.apply_start, NaiveTime::MIN)
            .ok_or_else(|| line_error(format!("unreadable apply_start '{}'", self.apply_start)))?;
        let ends_at = parse_instant(&self.apply_end, end_of_day())
            .ok_or_else(|| line_error(format!("unreadable apply_end '{}'", self.apply_end)))?;

        let province = self
            .province
            .as_deref()
            .filter(|value| !value.eq_ignore_ascii_case("all"));
        if let (None, Some(city)) = (province, self.city.as_deref()) {
            return Err(line_error(format!("city '{city}' given without a province")));
        }
        let category = parse_enum::<BenefitCategory>(self.category.as_deref())
            .map_err(|value| line_error(format!("unknown category '{value}'")))?;
        let income_condition = parse_enum::<IncomeCondition>(self.income_condition.as_deref())
            .map_err(|value| line_error(format!("unknown income condition '{value}'")))?;
        let guardian_requirement =
            parse_enum::<GuardianRequirement>(self.guardian_requirement.as_deref())
                .map_err(|value| line_error(format!("unknown guardian requirement '{value}'")))?;

        Ok(BenefitOffer {
            region: RegionScope::from_parts(province, self.city.as_deref()),
            id: OfferId(self.id),
            title: self.title,
            category,
            target_age_min: self.target_age_min,
            target_age_max: self.target_age_max,
            income_condition,
            guardian_requirement,
            application_window: ApplicationWindow::new(starts_at, ends_at),
            summary: self.summary,
            required_documents: self
                .required_documents
                .split(';')
                .map(str::trim)
                .filter(|doc| !doc.is_empty())
                .map(str::to_string)
                .collect(),
            source_url: self.source_url,
        })
    }
}

/// Parses a snake_case enum label; blanks fall back to the default variant.
fn parse_enum<T>(raw: Option<&str>) -> Result<T, String>
where
    T: Default + DeserializeOwned,
{
    match raw {
        None => Ok(T::default()),
        Some(value) => {
            let normalized = value.trim().to_ascii_lowercase().replace(['-', ' '], "_");
            serde_json::from_value(serde_json::Value::String(normalized))
                .map_err(|_| value.to_string())
        }
    }
}

fn end_of_day() -> NaiveTime {
    NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN)
}

/// RFC 3339 instants are taken as-is; bare dates land on `time_of_day` UTC.
pub(crate) fn parse_instant(value: &str, time_of_day: NaiveTime) -> Option<DateTime<Utc>> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .map(|date| date.and_time(time_of_day).and_utc())
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}
