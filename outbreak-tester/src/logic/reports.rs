use anyhow::Result;
use colored::Colorize;
use outbreak_core::numbers::round_f32_to_i32;
use std::time::Duration;

use super::SessionReport;

struct Aggregate {
    total: usize,
    victories: usize,
    defeats: usize,
    undecided: usize,
    avg_victory_day: Option<f64>,
}

fn aggregate(reports: &[SessionReport]) -> Aggregate {
    let victories = reports.iter().filter(|r| r.victorious()).count();
    let defeats = reports
        .iter()
        .filter(|r| r.outcome.is_some() && !r.victorious())
        .count();
    let undecided = reports.len() - victories - defeats;

    let victory_days: Vec<u32> = reports
        .iter()
        .filter(|r| r.victorious())
        .filter_map(|r| r.outcome_day)
        .collect();
    #[allow(clippy::cast_precision_loss)]
    let avg_victory_day = (!victory_days.is_empty()).then(|| {
        victory_days.iter().map(|&d| f64::from(d)).sum::<f64>() / victory_days.len() as f64
    });

    Aggregate {
        total: reports.len(),
        victories,
        defeats,
        undecided,
        avg_victory_day,
    }
}

pub fn generate_console_report(reports: &[SessionReport], total_duration: Duration) {
    println!();
    println!("{}", "📊 Outbreak Session Results".bright_cyan().bold());
    println!("{}", "===========================".cyan());

    let stats = aggregate(reports);
    println!("Total sessions: {}", stats.total);
    println!("Victories: {}", stats.victories.to_string().green());
    println!("Defeats: {}", stats.defeats.to_string().red());
    println!("Undecided at cap: {}", stats.undecided.to_string().yellow());
    if stats.total > 0 {
        #[allow(clippy::cast_precision_loss)]
        let rate = (stats.victories as f64 / stats.total as f64) * 100.0;
        println!("Victory rate: {rate:.1}%");
    }
    if let Some(avg) = stats.avg_victory_day {
        println!("Average victory day: {avg:.1}");
    }
    println!("Total time: {total_duration:?}");
    println!();

    for report in reports {
        let status = match report.outcome {
            Some(outbreak_core::OutcomeKind::Victory) => "✅ VICTORY".green(),
            Some(outbreak_core::OutcomeKind::Defeat) => "❌ DEFEAT".red(),
            None => "⏳ UNDECIDED".yellow(),
        };
        println!(
            "{} seed {} [{}]",
            status,
            report.seed,
            report.strategy.bold()
        );
        println!(
            "   Days: {}  Saved: {}/{}  Cure: {}%",
            report.days,
            report.provinces_saved,
            report.provinces_saved + report.provinces_fully_infected,
            round_f32_to_i32(report.cure_progress * 100.0)
        );
        println!(
            "   Outposts: {}  Spend: R{}  Budget left: R{}",
            report.builds.len(),
            report.total_spend(),
            report.budget_remaining
        );
    }
}

/// # Errors
///
/// Returns an error if the reports cannot be serialized.
pub fn generate_json_report(reports: &[SessionReport]) -> Result<()> {
    let json_output = serde_json::to_string_pretty(reports)?;
    println!("{json_output}");
    Ok(())
}

pub fn generate_markdown_report(reports: &[SessionReport]) {
    println!("# Outbreak Session Results\n");

    let stats = aggregate(reports);
    println!("## Summary\n");
    println!("- **Total sessions**: {}", stats.total);
    println!("- **Victories**: {}", stats.victories);
    println!("- **Defeats**: {}", stats.defeats);
    println!("- **Undecided at cap**: {}", stats.undecided);
    if let Some(avg) = stats.avg_victory_day {
        println!("- **Average victory day**: {avg:.1}");
    }
    println!();

    println!("## Sessions\n");
    println!("| Seed | Strategy | Outcome | Days | Saved | Cure | Outposts |");
    println!("|------|----------|---------|------|-------|------|----------|");
    for report in reports {
        let outcome = report
            .outcome
            .map_or("undecided".to_string(), |kind| kind.to_string());
        println!(
            "| {} | {} | {} | {} | {}/{} | {}% | {} |",
            report.seed,
            report.strategy,
            outcome,
            report.days,
            report.provinces_saved,
            report.provinces_saved + report.provinces_fully_infected,
            round_f32_to_i32(report.cure_progress * 100.0),
            report.builds.len()
        );
    }
}
