use comfy_table::Table;
use comfy_table::presets::NOTHING;

use crate::models::report::RunReport;

pub fn print(report: &RunReport, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        println!("{}", render(report));
        println!("{}", summary(report));
    }
    Ok(())
}

fn yes_no(flag: bool) -> String {
    let text = if flag { "yes" } else { "no" };
    text.to_string()
}

pub fn render(report: &RunReport) -> Table {
    let counters = &report.counters;
    let mut table = Table::new();
    table.load_preset(NOTHING);
    table.set_header(vec!["Application", report.target_name.as_str()]);
    table.add_row(vec!["Uninstaller executed".to_string(), yes_no(counters.uninstaller_executed)]);
    table.add_row(vec!["Registry entries".to_string(), counters.registry_entries_removed.to_string()]);
    table.add_row(vec!["Directories".to_string(), counters.directories_removed.to_string()]);
    if report.thorough {
        table.add_row(vec!["Files".to_string(), counters.files_removed.to_string()]);
        table.add_row(vec!["Deep scan keys".to_string(), counters.deep_scan_keys_removed.to_string()]);
    }
    if report.backup_enabled {
        table.add_row(vec!["Backup".to_string(), report.backup_dir.display().to_string()]);
        let saved = report.backups.iter().filter(|b| b.succeeded).count();
        table.add_row(vec!["Backed up items".to_string(), saved.to_string()]);
        if report.backups_failed > 0 {
            table.add_row(vec!["Failed backups".to_string(), report.backups_failed.to_string()]);
            for record in report.backups.iter().filter(|b| !b.succeeded) {
                table.add_row(vec!["  not saved".to_string(), record.source.to_string()]);
            }
        }
    }
    table
}

pub fn summary(report: &RunReport) -> String {
    let total = report.counters.total_removed();
    let mut line = if report.dry_run {
        format!("Would have removed {} items", total)
    } else {
        format!("Removed {} items", total)
    };
    if report.cancelled {
        line.push_str(" before the run was cancelled");
    }
    line
}
