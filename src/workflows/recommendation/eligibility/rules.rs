use super::super::domain::{
    ApplicantProfile, GuardianRequirement, GuardianStatus, IncomeCondition, RegionScope,
};

/// Inclusive on both ends; an inverted range never matches.
pub(crate) fn age_matches(age: u32, min: u32, max: u32) -> bool {
    min <= age && age <= max
}

pub(crate) fn region_matches(scope: &RegionScope, profile: &ApplicantProfile) -> bool {
    match scope {
        RegionScope::Nationwide => true,
        RegionScope::Province { province } => *province == profile.province,
        RegionScope::ProvinceCity { province, city } => {
            if *province != profile.province {
                return false;
            }
            match city {
                None => true,
                Some(city) => profile.city.as_deref() == Some(city.as_str()),
            }
        }
    }
}

pub(crate) fn income_matches(condition: IncomeCondition, profile: &ApplicantProfile) -> bool {
    match condition.required_bucket() {
        None => true,
        Some(required) => profile.income_bucket == Some(required),
    }
}

pub(crate) fn guardian_matches(
    requirement: GuardianRequirement,
    profile: &ApplicantProfile,
) -> bool {
    match requirement {
        GuardianRequirement::Irrelevant => true,
        GuardianRequirement::Required => {
            profile.guardian_status == Some(GuardianStatus::HasGuardian)
        }
        GuardianRequirement::NotRequired => matches!(
            profile.guardian_status,
            None | Some(GuardianStatus::NoGuardian)
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn profile() -> ApplicantProfile {
        ApplicantProfile::new(
            NaiveDate::from_ymd_opt(2009, 3, 1).expect("valid date"),
            "Seoul",
        )
        .with_city("Gangnam")
    }

    #[test]
    fn inverted_age_range_never_matches() {
        assert!(!age_matches(15, 19, 14));
        assert!(age_matches(14, 14, 14));
    }

    #[test]
    fn province_city_without_city_behaves_like_province_only() {
        let with_blank_city = RegionScope::ProvinceCity {
            province: "Seoul".to_string(),
            city: None,
        };
        let province_only = RegionScope::Province {
            province: "Seoul".to_string(),
        };
        let elsewhere = profile();
        let mut busan = profile();
        busan.province = "Busan".to_string();

        for candidate in [&elsewhere, &busan] {
            assert_eq!(
                region_matches(&with_blank_city, candidate),
                region_matches(&province_only, candidate)
            );
        }
    }

    #[test]
    fn city_scope_requires_matching_city() {
        let scope = RegionScope::ProvinceCity {
            province: "Seoul".to_string(),
            city: Some("Mapo".to_string()),
        };
        assert!(!region_matches(&scope, &profile()));

        let mut no_city = profile();
        no_city.city = None;
        assert!(!region_matches(&scope, &no_city));
    }
}
