use atelier_domain::AutoGuardConfig;
use serde::Serialize;
use ts_rs::TS;

/// One labelled rate limit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/console-types/src/generated/guard-limit-view.ts"
)]
pub struct GuardLimitView {
    pub label: String,
    pub value: String,
}

/// Auto-guard panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/console-types/src/generated/auto-guard-config-view.ts"
)]
pub struct AutoGuardConfigView {
    pub enabled: bool,
    pub enabled_label: String,
    pub timezone: String,
    pub weekdays_label: String,
    pub hours_label: String,
    pub limits: Vec<GuardLimitView>,
    /// The engine does not expose its policy yet; values are indicative.
    pub is_placeholder: bool,
}

impl AutoGuardConfigView {
    pub fn build(config: &AutoGuardConfig) -> Self {
        let window = &config.sending_window;
        let limits = &config.rate_limits;

        Self {
            enabled: config.enabled,
            enabled_label: if config.enabled { "Activé" } else { "Désactivé" }.to_owned(),
            timezone: window.timezone.clone(),
            weekdays_label: weekdays_label(&window.allowed_weekdays),
            hours_label: format!("{}h - {}h", window.start_hour, window.end_hour),
            limits: vec![
                limit("Messages par heure", limits.max_per_hour.to_string()),
                limit("Messages par jour", limits.max_per_day.to_string()),
                limit(
                    "Messages par contact et par jour",
                    limits.max_per_contact_per_day.to_string(),
                ),
                limit(
                    "Intervalle minimum",
                    format!("{} min", limits.min_interval_minutes),
                ),
            ],
            is_placeholder: true,
        }
    }
}

fn limit(label: &str, value: String) -> GuardLimitView {
    GuardLimitView {
        label: label.to_owned(),
        value,
    }
}

fn weekdays_label(weekdays: &[u8]) -> String {
    const NAMES: [&str; 7] = ["Lun", "Mar", "Mer", "Jeu", "Ven", "Sam", "Dim"];

    let mut days = weekdays
        .iter()
        .copied()
        .filter(|day| (1..=7).contains(day))
        .collect::<Vec<_>>();
    days.sort_unstable();
    days.dedup();

    let is_contiguous = days.windows(2).all(|pair| pair[1] == pair[0] + 1);
    match days.as_slice() {
        [] => "Aucun jour".to_owned(),
        [only] => NAMES[usize::from(*only - 1)].to_owned(),
        [first, .., last] if is_contiguous && days.len() > 2 => format!(
            "{} - {}",
            NAMES[usize::from(*first - 1)],
            NAMES[usize::from(*last - 1)]
        ),
        _ => days
            .iter()
            .map(|day| NAMES[usize::from(*day - 1)])
            .collect::<Vec<_>>()
            .join(", "),
    }
}
