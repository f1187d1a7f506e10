//! Plain-text rendering of the automation page for terminals.

use crate::views::{
    AutoGuardConfigView, AutomationPageView, ErrorBannerView, ExecutionStatsView,
    FilterDraftView, TemplateGroupView, TemplatePreview, TemplateRowView, TemplateSource,
    TemplatesSectionView, TriggerNoticeView, WorkflowCardView, WorkflowDetailView,
    WorkflowStepView,
};

const RULE: &str = "────────────────────────────────────────";

pub fn render_page(page: &AutomationPageView) -> String {
    let mut out = String::new();

    line(&mut out, "AUTOMATISATIONS");
    line(&mut out, RULE);

    if let Some(banner) = &page.error_banner {
        render_banner(&mut out, banner);
    }
    if let Some(notice) = &page.last_trigger {
        render_notice(&mut out, notice);
    }
    render_filters(&mut out, &page.filters);

    if page.is_loading {
        line(&mut out, "Chargement des workflows…");
    }
    line(
        &mut out,
        format!("Workflows : {} affichés sur {}", page.visible_count, page.total),
    );
    for card in &page.workflows {
        render_card(&mut out, card);
    }

    if page.is_loading_detail {
        line(&mut out, "Chargement du détail…");
    }
    if let Some(detail) = &page.detail {
        render_detail(&mut out, detail);
    }
    if let Some(guard) = &page.auto_guard {
        render_auto_guard(&mut out, guard);
    }
    render_templates(&mut out, &page.templates);

    out
}

fn render_banner(out: &mut String, banner: &ErrorBannerView) {
    line(out, format!("! {}", banner.message));
    if banner.can_retry {
        line(out, "  (dismiss | retry)");
    }
}

fn render_notice(out: &mut String, notice: &TriggerNoticeView) {
    line(
        out,
        format!("✓ {} déclenché le {}", notice.code, notice.triggered_at),
    );
}

fn render_filters(out: &mut String, filters: &FilterDraftView) {
    let mut filter_line = format!(
        "Filtres : statut [{}] déclencheur [{}] recherche «{}»",
        filters.statuses.join(", "),
        filters.trigger_types.join(", "),
        filters.search
    );
    if filters.has_pending_changes {
        filter_line.push_str(" (non appliqués)");
    }
    line(out, filter_line);
}

fn render_card(out: &mut String, card: &WorkflowCardView) {
    let marker = if card.is_selected { ">" } else { " " };
    line(
        out,
        format!(
            "{marker} [{}] {} ({})",
            card.status_label, card.name, card.id
        ),
    );
    line(out, format!("    {}", card.description));

    let steps = card
        .action_count
        .map_or_else(|| "—".to_owned(), |count| count.to_string());
    line(
        out,
        format!(
            "    Déclencheur : {} | étapes : {steps} | {}",
            card.trigger_label,
            stats_summary(&card.stats)
        ),
    );
    if card.is_triggering {
        line(out, "    Déclenchement en cours…");
    }
}

fn stats_summary(stats: &ExecutionStatsView) -> String {
    let last_run = stats.last_run_label.as_deref().unwrap_or("jamais");
    format!(
        "{} exécutions, {} de succès, durée moyenne {}, dernière {last_run}",
        stats.execution_count, stats.success_rate_label, stats.average_duration_label
    )
}

fn render_detail(out: &mut String, detail: &WorkflowDetailView) {
    line(out, RULE);
    line(out, format!("{} [{}]", detail.name, detail.status_label));
    line(out, detail.description.as_str());
    line(
        out,
        format!(
            "Déclencheur : {} ({}) {}",
            detail.trigger_label, detail.trigger_type, detail.trigger_config
        ),
    );
    for step in &detail.steps {
        render_step(out, step);
    }
    line(out, stats_summary(&detail.stats));
    line(
        out,
        format!(
            "Créé par {} le {}, modifié le {}",
            detail.created_by, detail.created_at, detail.updated_at
        ),
    );
}

fn render_step(out: &mut String, step: &WorkflowStepView) {
    line(
        out,
        format!("  {}. {} : {}", step.order, step.label, step.summary),
    );
    if let Some(description) = &step.description {
        line(out, format!("     {description}"));
    }

    match &step.template {
        None => {}
        Some(TemplatePreview::Loading { reference }) => {
            line(out, format!("     template {reference} : chargement…"));
        }
        Some(TemplatePreview::NotFound { reference, message }) => {
            line(out, format!("     template {reference} : {message}"));
        }
        Some(TemplatePreview::Found {
            reference,
            channel,
            subject,
            content,
            ..
        }) => {
            line(out, format!("     template {reference} ({channel})"));
            if let Some(subject) = subject {
                line(out, format!("     Objet : {subject}"));
            }
            for content_line in content.lines() {
                line(out, format!("     | {content_line}"));
            }
        }
    }
}

fn render_auto_guard(out: &mut String, guard: &AutoGuardConfigView) {
    line(out, RULE);
    let placeholder = if guard.is_placeholder {
        " (valeurs indicatives)"
    } else {
        ""
    };
    line(
        out,
        format!("Auto-guard : {}{placeholder}", guard.enabled_label),
    );
    line(
        out,
        format!(
            "  Fenêtre d'envoi : {} {} ({})",
            guard.weekdays_label, guard.hours_label, guard.timezone
        ),
    );
    for limit in &guard.limits {
        line(out, format!("  {} : {}", limit.label, limit.value));
    }
}

fn render_templates(out: &mut String, section: &TemplatesSectionView) {
    line(out, RULE);
    let source = match section.source {
        TemplateSource::Remote => "",
        TemplateSource::OfflineFallback => " (hors ligne, liste par défaut)",
    };
    line(out, format!("Templates : {}{source}", section.total));
    if let Some(error) = &section.error {
        line(out, format!("! {error}"));
    }
    if section.is_loading {
        line(out, "Chargement des templates…");
    }
    line(
        out,
        format!(
            "Filtres : canal {} statut {} recherche «{}»",
            section.channel_filter.as_deref().unwrap_or("tous"),
            section.status_filter.as_deref().unwrap_or("tous"),
            section.search
        ),
    );

    for group in &section.groups {
        render_group(out, group);
    }

    if let Some(selected) = &section.selected {
        line(out, RULE);
        render_row(out, selected);
        for content_line in selected.content.lines() {
            line(out, format!("    | {content_line}"));
        }
    }
}

fn render_group(out: &mut String, group: &TemplateGroupView) {
    let toggle = if group.expanded { "▾" } else { "▸" };
    line(out, format!("{toggle} {} ({})", group.label, group.count));
    if group.expanded {
        for row in &group.templates {
            render_row(out, row);
        }
    }
}

fn render_row(out: &mut String, row: &TemplateRowView) {
    let id = row.id.as_deref().unwrap_or("-");
    line(
        out,
        format!(
            "  {} [{}] {} ({id})",
            row.name, row.status_label, row.category
        ),
    );
    if let Some(subject) = &row.subject {
        line(out, format!("    Objet : {subject}"));
    }
    if !row.variables.is_empty() {
        line(out, format!("    Variables : {}", row.variables.join(", ")));
    }
    if !row.undeclared_variables.is_empty() {
        line(
            out,
            format!(
                "    Variables non déclarées : {}",
                row.undeclared_variables.join(", ")
            ),
        );
    }
}

fn line(out: &mut String, text: impl AsRef<str>) {
    out.push_str(text.as_ref());
    out.push('\n');
}
