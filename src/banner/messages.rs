//! Default English copy. Callers with a localisation layer key off `BannerKind`.

use crate::types::{LimitKind, UpgradeIntent};

pub fn cta_label(intent: UpgradeIntent) -> &'static str {
    match intent {
        UpgradeIntent::StartTrial => "Start free trial",
        UpgradeIntent::UpgradeToPro => "Upgrade to Pro",
    }
}

pub fn limit_reached(kind: LimitKind, backend_message: &str) -> String {
    if !backend_message.trim().is_empty() {
        return backend_message.to_string();
    }
    match kind {
        LimitKind::ProjectLimit => "You have reached your project limit.".to_string(),
        LimitKind::AnalysisLimit => "You have used all analyses on your plan.".to_string(),
        LimitKind::OpinionLimit => "This project cannot collect more opinions.".to_string(),
    }
}

pub fn trial_ending(days: i64) -> String {
    format!(
        "Your trial ends in {} {}. Upgrade now to keep your projects and analyses.",
        days,
        plural_days(days)
    )
}

pub fn trial_value(days: i64) -> String {
    format!(
        "{} {} left in your trial. Keep the insights coming with Pro.",
        days,
        plural_days(days)
    )
}

pub fn trial_progress(days: i64) -> String {
    format!("You're on the Pro trial: {} {} remaining.", days, plural_days(days))
}

pub fn trial_progress_open_ended() -> String {
    "You're on the Pro trial.".to_string()
}

pub fn value_demonstration() -> String {
    "Your analyses are paying off. Unlock unlimited projects and analyses.".to_string()
}

pub fn project_limit_approaching(limit: i64) -> String {
    if limit > 0 {
        format!("You're using 1 of {} projects on the free plan.", limit)
    } else {
        "You're close to the project limit on the free plan.".to_string()
    }
}

pub fn welcome_free() -> String {
    "Welcome! Create a project and start collecting opinions.".to_string()
}

pub fn free_value_proposition() -> String {
    "Get more projects, analyses and opinions with Pro.".to_string()
}

fn plural_days(days: i64) -> &'static str {
    if days == 1 { "day" } else { "days" }
}
