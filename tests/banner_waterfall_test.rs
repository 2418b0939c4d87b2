mod helpers;

use chrono::Duration;
use helpers::{account, project_limit_error, projects, setup_engine, trial_account};
use plangate::adapters::KvStore;
use plangate::banner::EngagementMetrics;
use plangate::types::{BannerKind, BannerPriority, PlanTier, UpgradeIntent};
use plangate::utils::constants::DISMISSALS_STORE_KEY;

fn engaged() -> EngagementMetrics {
    EngagementMetrics {
        project_count: 2,
        analysis_count: 3,
        completed_project_count: 1,
    }
}

#[test]
fn test_pro_never_sees_a_banner() {
    let t = setup_engine();
    let snapshot = t
        .engine
        .compute_entitlement(&account(PlanTier::Pro, 40), &projects(25));
    let busy = EngagementMetrics {
        project_count: 25,
        analysis_count: 40,
        completed_project_count: 20,
    };

    assert!(t.engine.classify(&project_limit_error()).is_some());
    assert_eq!(t.engine.decide_banner(&snapshot, &busy), None);
    assert!(t.engine.explain_banners(&snapshot, &busy).is_empty());
}

#[test]
fn test_free_user_with_one_project() {
    let t = setup_engine();
    let snapshot = t
        .engine
        .compute_entitlement(&account(PlanTier::Free, 10), &projects(1));

    let decision = t
        .engine
        .decide_banner(&snapshot, &EngagementMetrics::default())
        .expect("free users always get a banner");

    assert_eq!(decision.kind, BannerKind::ProjectLimitApproaching);
    assert_eq!(decision.priority, BannerPriority::Medium);
    assert!(decision.dismissible);
    assert!(decision.message.contains('2'));
}

#[test]
fn test_trial_two_days_left_is_critical() {
    let t = setup_engine();
    let snapshot = t
        .engine
        .compute_entitlement(&trial_account(Duration::days(2)), &projects(0));
    assert_eq!(snapshot.trial_days_remaining(), Some(2));

    let decision = t
        .engine
        .decide_banner(&snapshot, &EngagementMetrics::default())
        .unwrap();

    assert_eq!(decision.kind, BannerKind::TrialEndingCritical);
    assert_eq!(decision.priority, BannerPriority::High);
    assert!(!decision.dismissible);
    assert!(decision.urgent);
    assert_eq!(decision.cta, UpgradeIntent::UpgradeToPro);
}

#[test]
fn test_trial_banner_bands() {
    let t = setup_engine();
    let cases = [
        (Duration::days(12), BannerKind::TrialProgress),
        (Duration::days(5), BannerKind::TrialValueDemonstration),
        (Duration::hours(2), BannerKind::TrialEndingCritical),
    ];
    for (ends_in, expected) in cases {
        let snapshot = t
            .engine
            .compute_entitlement(&trial_account(ends_in), &projects(0));
        let decision = t
            .engine
            .decide_banner(&snapshot, &EngagementMetrics::default())
            .unwrap();
        assert_eq!(decision.kind, expected, "trial ending in {:?}", ends_in);
    }
}

#[test]
fn test_lapsed_trial_shows_nothing_without_a_limit_hit() {
    let t = setup_engine();
    let snapshot = t
        .engine
        .compute_entitlement(&trial_account(Duration::hours(-1)), &projects(1));
    assert_eq!(snapshot.effective_tier, PlanTier::Free);

    let decision = t
        .engine
        .decide_banner(&snapshot, &EngagementMetrics::default());
    // Recorded tier is still Trial, so neither free nor trial rules match.
    assert_eq!(decision, None);
}

#[test]
fn test_limit_hit_window_boundary() {
    let t = setup_engine();
    let snapshot = t
        .engine
        .compute_entitlement(&account(PlanTier::Free, 10), &projects(2));

    t.engine.classify(&project_limit_error()).unwrap();

    t.clock.advance(Duration::seconds(4 * 60 + 59));
    let decision = t
        .engine
        .decide_banner(&snapshot, &EngagementMetrics::default())
        .unwrap();
    assert_eq!(decision.kind, BannerKind::LimitReached);
    assert!(!decision.dismissible);
    assert_eq!(decision.message, "Project limit reached");

    t.clock.advance(Duration::seconds(2));
    let decision = t
        .engine
        .decide_banner(&snapshot, &EngagementMetrics::default())
        .unwrap();
    assert_ne!(decision.kind, BannerKind::LimitReached);
}

#[test]
fn test_earlier_rules_win() {
    let t = setup_engine();
    let snapshot = t
        .engine
        .compute_entitlement(&account(PlanTier::Free, 1), &projects(1));
    let engaged = EngagementMetrics {
        project_count: 1,
        analysis_count: 3,
        completed_project_count: 1,
    };

    let all = t.engine.explain_banners(&snapshot, &engaged);
    let kinds: Vec<BannerKind> = all.iter().map(|d| d.kind).collect();
    assert_eq!(
        kinds,
        vec![
            BannerKind::ValueDemonstration,
            BannerKind::ProjectLimitApproaching,
            BannerKind::WelcomeFree,
        ]
    );

    let winner = t.engine.decide_banner(&snapshot, &engaged).unwrap();
    assert_eq!(winner.kind, BannerKind::ValueDemonstration);
}

#[test]
fn test_dismissed_banner_is_hidden_not_replaced() {
    let t = setup_engine();
    let snapshot = t
        .engine
        .compute_entitlement(&account(PlanTier::Free, 10), &projects(0));

    let first = t
        .engine
        .decide_banner(&snapshot, &EngagementMetrics::default())
        .unwrap();
    assert_eq!(first.kind, BannerKind::FreeValueProposition);

    t.engine.dismiss(first.kind).unwrap();
    assert_eq!(
        t.engine
            .decide_banner(&snapshot, &EngagementMetrics::default()),
        None
    );

    t.clock.advance(Duration::hours(24));
    assert_eq!(
        t.engine
            .decide_banner(&snapshot, &EngagementMetrics::default())
            .map(|d| d.kind),
        Some(BannerKind::FreeValueProposition)
    );
}

#[test]
fn test_new_free_user_is_welcomed() {
    let t = setup_engine();
    let snapshot = t
        .engine
        .compute_entitlement(&account(PlanTier::Free, 2), &projects(0));
    let decision = t
        .engine
        .decide_banner(&snapshot, &EngagementMetrics::default())
        .unwrap();
    assert_eq!(decision.kind, BannerKind::WelcomeFree);
    assert_eq!(decision.priority, BannerPriority::Low);
    assert_eq!(decision.cta, UpgradeIntent::StartTrial);
}

#[test]
fn test_limit_reached_ignores_a_live_dismissal() {
    let t = setup_engine();
    let snapshot = t
        .engine
        .compute_entitlement(&account(PlanTier::Free, 10), &projects(2));

    t.engine.classify(&project_limit_error()).unwrap();
    t.store
        .set(
            DISMISSALS_STORE_KEY,
            r#"{"limit_reached":{"dismissedAt":"2026-03-10T12:00:00Z"}}"#,
        )
        .unwrap();
    assert!(t.engine.is_dismissed(BannerKind::LimitReached));

    let decision = t
        .engine
        .decide_banner(&snapshot, &EngagementMetrics::default())
        .unwrap();
    assert_eq!(decision.kind, BannerKind::LimitReached);
    assert!(!decision.dismissible);
}

#[test]
fn test_expired_and_cancelled_accounts() {
    for tier in [PlanTier::Expired, PlanTier::Cancelled] {
        let t = setup_engine();
        let snapshot = t
            .engine
            .compute_entitlement(&account(tier, 10), &projects(1));

        assert_eq!(
            t.engine
                .decide_banner(&snapshot, &EngagementMetrics::default()),
            None,
            "{tier} without engagement"
        );
        assert_eq!(
            t.engine.decide_banner(&snapshot, &engaged()).map(|d| d.kind),
            Some(BannerKind::ValueDemonstration),
            "{tier} engaged"
        );

        t.engine.classify(&project_limit_error()).unwrap();
        assert_eq!(
            t.engine
                .decide_banner(&snapshot, &EngagementMetrics::default())
                .map(|d| d.kind),
            Some(BannerKind::LimitReached),
            "{tier} after a limit hit"
        );
    }
}

#[test]
fn test_engaged_trial_mid_band_sees_value_demonstration() {
    let t = setup_engine();
    let snapshot = t
        .engine
        .compute_entitlement(&trial_account(Duration::days(5)), &projects(2));

    let kinds: Vec<BannerKind> = t
        .engine
        .explain_banners(&snapshot, &engaged())
        .iter()
        .map(|d| d.kind)
        .collect();
    assert_eq!(
        kinds,
        vec![
            BannerKind::ValueDemonstration,
            BannerKind::TrialValueDemonstration,
        ]
    );

    let winner = t.engine.decide_banner(&snapshot, &engaged()).unwrap();
    assert_eq!(winner.kind, BannerKind::ValueDemonstration);
}
