use super::common::*;
use chrono::Duration;
use std::cmp::Reverse;

use crate::workflows::recommendation::domain::{
    ApplicantProfile, ApplicationWindow, BenefitOffer, GuardianRequirement, IncomeBucket,
    IncomeCondition, RegionScope,
};
use crate::workflows::recommendation::{evaluate, matches, rank, MatchResult, MatchingPolicy};

fn ids(results: &[MatchResult<'_>]) -> Vec<String> {
    results
        .iter()
        .map(|result| result.offer.id.0.clone())
        .collect()
}

fn mixed_catalog() -> Vec<BenefitOffer> {
    vec![
        BenefitOffer {
            application_window: window_closing_in(20),
            ..offer("broad-late")
        },
        BenefitOffer {
            application_window: window_closing_in(2),
            ..offer("broad-urgent")
        },
        BenefitOffer {
            application_window: window_closing_in(12),
            ..seoul_gangnam_low_income_offer("strong-mid")
        },
        BenefitOffer {
            application_window: window_closing_in(5),
            ..seoul_gangnam_low_income_offer("strong-urgent")
        },
        BenefitOffer {
            application_window: window_closing_in(9),
            ..offer("broad-early")
        },
        BenefitOffer {
            region: RegionScope::Province {
                province: "Busan".to_string(),
            },
            ..offer("busan")
        },
        BenefitOffer {
            guardian_requirement: GuardianRequirement::Required,
            ..offer("guardian")
        },
    ]
}

fn gangnam_low_income() -> ApplicantProfile {
    applicant()
        .with_city("Gangnam")
        .with_income(IncomeBucket::Low)
}

#[test]
fn empty_catalog_ranks_to_empty_result() {
    assert!(rank(&[], &applicant(), now()).is_empty());
}

#[test]
fn results_sort_by_score_then_deadline() {
    let catalog = mixed_catalog();
    let profile = gangnam_low_income();

    let results = rank(&catalog, &profile, now());

    assert_eq!(
        ids(&results),
        vec![
            "strong-urgent",
            "broad-urgent",
            "strong-mid",
            "broad-early",
            "broad-late"
        ]
    );
    let scores: Vec<u8> = results.iter().map(|result| result.score).collect();
    assert_eq!(scores, vec![3, 2, 2, 1, 1]);
}

#[test]
fn sort_order_holds_pairwise() {
    let catalog = mixed_catalog();
    let profile = gangnam_low_income();
    let results = rank(&catalog, &profile, now());

    for pair in results.windows(2) {
        let (first, second) = (&pair[0], &pair[1]);
        assert!(first.score >= second.score);
        if first.score == second.score {
            assert!(
                first.offer.application_window.ends_at
                    <= second.offer.application_window.ends_at
            );
        }
    }
}

#[test]
fn ranked_results_outlive_the_profile() {
    let catalog = vec![offer("kept")];

    let results = {
        let profile = applicant();
        rank(&catalog, &profile, now())
    };

    assert_eq!(ids(&results), vec!["kept"]);
}

#[test]
fn equal_score_and_deadline_fall_back_to_offer_id() {
    let catalog = vec![offer("charlie"), offer("alpha"), offer("bravo")];

    let results = rank(&catalog, &applicant(), now());

    assert_eq!(ids(&results), vec!["alpha", "bravo", "charlie"]);
}

#[test]
fn ranking_is_idempotent_and_leaves_input_untouched() {
    let catalog = mixed_catalog();
    let snapshot = catalog.clone();
    let profile = gangnam_low_income();

    let first = rank(&catalog, &profile, now());
    let second = rank(&catalog, &profile, now());

    assert_eq!(first, second);
    assert_eq!(catalog, snapshot);
}

#[test]
fn inclusion_matches_verdict_for_every_offer() {
    let profiles = [
        applicant(),
        gangnam_low_income(),
        ApplicantProfile::new(born_years_ago(21), "Busan"),
    ];

    for profile in &profiles {
        for offer in mixed_catalog() {
            let included = !rank(std::slice::from_ref(&offer), profile, now()).is_empty();
            assert_eq!(included, evaluate(&offer, profile, now()).is_eligible());
        }
    }
}

#[test]
fn scores_stay_within_bounds() {
    let catalog = mixed_catalog();
    for result in rank(&catalog, &gangnam_low_income(), now()) {
        assert!((1..=3).contains(&result.score));
    }
}

#[test]
fn profile_without_optional_fields_sees_only_unrestricted_offers() {
    let catalog = vec![
        offer("open"),
        BenefitOffer {
            income_condition: IncomeCondition::Mid,
            ..offer("mid-income")
        },
        BenefitOffer {
            guardian_requirement: GuardianRequirement::Required,
            ..offer("guardian")
        },
        seoul_gangnam_low_income_offer("gangnam"),
        BenefitOffer {
            guardian_requirement: GuardianRequirement::NotRequired,
            ..offer("independent")
        },
    ];

    let results = rank(&catalog, &applicant(), now());

    assert_eq!(ids(&results), vec!["independent", "open"]);
}

#[test]
fn seoul_gangnam_scenarios() {
    let offer = seoul_gangnam_low_income_offer("gangnam-low");
    let profile = gangnam_low_income();
    let catalog = vec![offer.clone()];

    let results = rank(&catalog, &profile, now());
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].score, 2);

    let mut busan = profile.clone();
    busan.province = "Busan".to_string();
    assert!(rank(&catalog, &busan, now()).is_empty());
}

#[test]
fn lazy_matches_yield_catalog_order_without_sorting() {
    let catalog = mixed_catalog();
    let profile = gangnam_low_income();

    let lazy: Vec<_> = matches(&catalog, &profile, now()).collect();

    assert_eq!(
        ids(&lazy),
        vec![
            "broad-late",
            "broad-urgent",
            "strong-mid",
            "strong-urgent",
            "broad-early"
        ]
    );
    let mut sorted = lazy.clone();
    sorted.sort_by_key(|result| {
        (
            Reverse(result.score),
            result.offer.application_window.ends_at,
            result.offer.id.clone(),
        )
    });
    assert_eq!(sorted, rank(&catalog, &profile, now()));
}

#[test]
fn match_result_exposes_urgency_helpers() {
    let catalog = vec![BenefitOffer {
        application_window: ApplicationWindow::new(
            now() - Duration::days(1),
            now() + Duration::days(4) + Duration::hours(6),
        ),
        ..offer("soon")
    }];

    let results = rank(&catalog, &applicant(), now());
    let result = results.first().expect("offer matches");

    assert_eq!(result.days_remaining(now()), Some(4));
    assert!(result.is_urgent(&MatchingPolicy::default(), now()));
    assert!(!result.is_urgent(
        &MatchingPolicy {
            urgency_window_days: 3,
            ..MatchingPolicy::default()
        },
        now()
    ));
}
