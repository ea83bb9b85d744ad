use std::fmt;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Identifier wrapper for catalog offers.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OfferId(pub String);

/// Identifier wrapper for stored applicant profiles.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ProfileId(pub String);

impl fmt::Display for OfferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for ProfileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Self-reported household income band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncomeBucket {
    Low,
    Mid,
    High,
}

/// Income restriction attached to an offer; `None` means unrestricted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncomeCondition {
    #[default]
    None,
    Low,
    Mid,
    High,
}

impl IncomeCondition {
    /// Bucket an applicant must report to satisfy this condition, if any.
    pub const fn required_bucket(self) -> Option<IncomeBucket> {
        match self {
            Self::None => None,
            Self::Low => Some(IncomeBucket::Low),
            Self::Mid => Some(IncomeBucket::Mid),
            Self::High => Some(IncomeBucket::High),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuardianStatus {
    HasGuardian,
    NoGuardian,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuardianRequirement {
    #[default]
    Irrelevant,
    Required,
    NotRequired,
}

/// Geographic reach of an offer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "scope", rename_all = "snake_case")]
pub enum RegionScope {
    Nationwide,
    Province {
        province: String,
    },
    ProvinceCity {
        province: String,
        #[serde(default, deserialize_with = "blank_as_none")]
        city: Option<String>,
    },
}

impl RegionScope {
    /// Builds a scope from loose storage columns, treating blanks as absent.
    pub fn from_parts(province: Option<&str>, city: Option<&str>) -> Self {
        let province = province.map(str::trim).filter(|value| !value.is_empty());
        let city = city.map(str::trim).filter(|value| !value.is_empty());
        match (province, city) {
            (None, _) => Self::Nationwide,
            (Some(province), None) => Self::Province {
                province: province.to_string(),
            },
            (Some(province), Some(city)) => Self::ProvinceCity {
                province: province.to_string(),
                city: Some(city.to_string()),
            },
        }
    }

    pub const fn is_nationwide(&self) -> bool {
        matches!(self, Self::Nationwide)
    }

    pub fn label(&self) -> String {
        match self {
            Self::Nationwide => "nationwide".to_string(),
            Self::Province { province } => province.clone(),
            Self::ProvinceCity {
                province,
                city: Some(city),
            } => format!("{province} {city}"),
            Self::ProvinceCity {
                province,
                city: None,
            } => province.clone(),
        }
    }
}

/// Period during which applications are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationWindow {
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
}

impl ApplicationWindow {
    pub fn new(starts_at: DateTime<Utc>, ends_at: DateTime<Utc>) -> Self {
        Self { starts_at, ends_at }
    }

    /// A window closing before it opens is treated as already expired.
    pub fn is_inverted(&self) -> bool {
        self.ends_at < self.starts_at
    }

    pub fn is_open(&self, now: DateTime<Utc>) -> bool {
        !self.is_inverted() && self.starts_at <= now && now <= self.ends_at
    }

    /// Whole days left until the window closes, or `None` once it has closed.
    pub fn days_remaining(&self, now: DateTime<Utc>) -> Option<i64> {
        if self.is_inverted() || self.ends_at < now {
            return None;
        }
        Some((self.ends_at - now).num_days())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BenefitCategory {
    Scholarship,
    Education,
    Career,
    Voucher,
    Experience,
    Discount,
    Contest,
    #[default]
    Etc,
}

impl BenefitCategory {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Scholarship => "scholarship",
            Self::Education => "education",
            Self::Career => "career",
            Self::Voucher => "voucher",
            Self::Experience => "experience",
            Self::Discount => "discount",
            Self::Contest => "contest",
            Self::Etc => "etc",
        }
    }
}

/// Catalog entry describing who a benefit targets and when it can be applied for.
///
/// `title`, `category`, `summary`, `required_documents` and `source_url` are
/// carried for presentation only; matching never reads them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BenefitOffer {
    pub id: OfferId,
    pub title: String,
    #[serde(default)]
    pub category: BenefitCategory,
    pub target_age_min: u32,
    pub target_age_max: u32,
    pub region: RegionScope,
    #[serde(default)]
    pub income_condition: IncomeCondition,
    #[serde(default)]
    pub guardian_requirement: GuardianRequirement,
    pub application_window: ApplicationWindow,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub required_documents: Vec<String>,
    #[serde(default)]
    pub source_url: Option<String>,
}

/// Birth date as captured in storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BirthDate {
    Known(NaiveDate),
    /// Present but unparsable; evaluates as age 0.
    Malformed(String),
}

impl BirthDate {
    pub fn parse(raw: &str) -> Self {
        match NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d") {
            Ok(date) => Self::Known(date),
            Err(_) => Self::Malformed(raw.to_string()),
        }
    }

    /// Completed civil years on `today`. Future or malformed dates yield 0.
    pub fn age_on(&self, today: NaiveDate) -> u32 {
        let Self::Known(birth) = self else {
            return 0;
        };
        if *birth > today {
            return 0;
        }

        let mut years = today.year() - birth.year();
        if (today.month(), today.day()) < (birth.month(), birth.day()) {
            years -= 1;
        }
        u32::try_from(years).unwrap_or(0)
    }
}

/// Raw profile shape as held by a profile store, before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileRecord {
    #[serde(default, deserialize_with = "blank_as_none")]
    pub birth_date: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub province: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub city: Option<String>,
    #[serde(default)]
    pub income_bucket: Option<IncomeBucket>,
    #[serde(default)]
    pub guardian_status: Option<GuardianStatus>,
}

/// Validated applicant profile consumed by the matching engine.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "ProfileRecord")]
pub struct ApplicantProfile {
    pub birth_date: BirthDate,
    pub province: String,
    pub city: Option<String>,
    pub income_bucket: Option<IncomeBucket>,
    pub guardian_status: Option<GuardianStatus>,
}

impl ApplicantProfile {
    pub fn new(birth_date: NaiveDate, province: impl Into<String>) -> Self {
        let province: String = province.into();
        Self {
            birth_date: BirthDate::Known(birth_date),
            province: province.trim().to_string(),
            city: None,
            income_bucket: None,
            guardian_status: None,
        }
    }

    pub fn with_city(mut self, city: impl Into<String>) -> Self {
        let city: String = city.into();
        let city = city.trim();
        self.city = (!city.is_empty()).then(|| city.to_string());
        self
    }

    pub fn with_income(mut self, bucket: IncomeBucket) -> Self {
        self.income_bucket = Some(bucket);
        self
    }

    pub fn with_guardian(mut self, status: GuardianStatus) -> Self {
        self.guardian_status = Some(status);
        self
    }

    pub fn age_on(&self, today: NaiveDate) -> u32 {
        self.birth_date.age_on(today)
    }
}

impl TryFrom<ProfileRecord> for ApplicantProfile {
    type Error = ProfileError;

    fn try_from(record: ProfileRecord) -> Result<Self, Self::Error> {
        let birth_date = record
            .birth_date
            .as_deref()
            .map(BirthDate::parse)
            .ok_or(ProfileError::MissingBirthDate)?;
        let province = record
            .province
            .as_deref()
            .map(str::trim)
            .ok_or(ProfileError::MissingProvince)?
            .to_string();

        Ok(Self {
            birth_date,
            province,
            city: record.city.as_deref().map(str::trim).map(str::to_string),
            income_bucket: record.income_bucket,
            guardian_status: record.guardian_status,
        })
    }
}

/// Profile fields without which ranking cannot proceed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProfileError {
    #[error("profile is missing a birth date")]
    MissingBirthDate,
    #[error("profile is missing a province")]
    MissingProvince,
}

fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}
