use std::fmt::Write;

use chrono::NaiveDate;

use crate::models::StatsSummary;
use crate::trend::{self, Period};

pub fn build_report(summary: &StatsSummary, today: NaiveDate) -> String {
    let metrics = trend::dashboard_metrics(summary, today);
    let mut output = String::new();

    let _ = writeln!(output, "# Tuotannon reklamaatiot");
    let _ = writeln!(output, "Luotu {}", trend::format_fi_date(today));
    let _ = writeln!(output);
    let _ = writeln!(output, "## Uusin reklamaatio");

    match &summary.newest {
        Some(newest) => {
            let _ = writeln!(output, "- Päivämäärä: {}", trend::format_fi_date(newest.date));
            let _ = writeln!(output, "- Tuote: {}", newest.product);
            let _ = writeln!(output, "- Asiakas: {}", newest.customer);
            let _ = writeln!(output, "- Syy: {}", trend::short_reason(&newest.reason));
        }
        None => {
            let _ = writeln!(output, "{}.", trend::NO_DATA_LABEL);
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Päiviä edellisestä reklamaatiosta");
    let _ = writeln!(output, "**{}**", summary.days_since_previous);
    let _ = writeln!(
        output,
        "{}: {}",
        metrics.streak_tier.title(),
        metrics.streak_tier.subtitle()
    );

    let _ = writeln!(output);
    let _ = writeln!(output, "## Reklamaatiot tänä vuonna ({})", summary.year);
    let _ = writeln!(
        output,
        "**{}** ({} {})",
        metrics.year.current,
        metrics.year.signed_label(),
        metrics.year.caption(Period::Year)
    );

    let _ = writeln!(output);
    let _ = writeln!(output, "## Reklamaatiot tässä kuussa");
    let _ = writeln!(
        output,
        "**{}** ({} {})",
        metrics.month.current,
        metrics.month.signed_label(),
        metrics.month.caption(Period::Month)
    );

    let _ = writeln!(output);
    let _ = writeln!(output, "## Pisin jakso ilman reklamaatioita");
    let _ = writeln!(
        output,
        "**{}** ({})",
        summary.longest_gap.days, metrics.longest_streak_range
    );
    let _ = writeln!(
        output,
        "Nykyinen jakso vs Ennätys: {:.0}%",
        metrics.streak_progress
    );

    let _ = writeln!(output);
    let _ = writeln!(output, "## Reklamaatiot kuukausittain");
    let _ = writeln!(output, "| Kuukausi | Reklamaatiot |");
    let _ = writeln!(output, "|---|---|");
    for month in &summary.monthly_trend {
        let _ = writeln!(output, "| {} | {} |", month.month, month.reclamations);
    }

    output
}
