//! Terminal formatting for the one-shot commands
//!
//! Every formatter takes a `json` flag; JSON output is the same shape the
//! HTTP API returns.

use comfy_table::{Cell, Color, ContentArrangement, Row, Table};
use replaydeck_core::models::{AnalysisArtifact, InventoryEntry, ReplayPreview, StatsReport};
use replaydeck_core::ConversionSummary;
use serde::Serialize;

// ============================================================================
// Formatters
// ============================================================================

/// Directory listing as table (human) or JSON
pub fn format_listing(entries: &[InventoryEntry], json: bool, no_color: bool) -> String {
    if json {
        return to_json(entries, "[]");
    }

    if entries.is_empty() {
        return "No folders or replays here.".to_string();
    }

    let mut table = new_table(
        &["Name", "Size", "Modified", "Analyzed", "Map", "Winner"],
        no_color,
    );

    for entry in entries {
        match entry {
            InventoryEntry::Folder(folder) => {
                table.add_row(Row::from(vec![
                    format!("{}/", folder.name),
                    "-".to_string(),
                    format_modified(folder.modified),
                    String::new(),
                    String::new(),
                    String::new(),
                ]));
            }
            InventoryEntry::File(file) => {
                let (map, winner) = file
                    .preview
                    .as_ref()
                    .map(|p| (truncate(&p.game.map, 24), winner_names(p)))
                    .unwrap_or_else(|| ("-".to_string(), "-".to_string()));

                table.add_row(Row::from(vec![
                    file.name.clone(),
                    format_size(file.size),
                    format_modified(file.modified),
                    if file.has_analysis { "yes" } else { "no" }.to_string(),
                    map,
                    winner,
                ]));
            }
        }
    }

    table.to_string()
}

/// Single game summary (human) or the full artifact (JSON)
pub fn format_analysis(
    artifact: &AnalysisArtifact,
    preview: &ReplayPreview,
    json: bool,
    no_color: bool,
) -> String {
    if json {
        return to_json(artifact, "{}");
    }

    let mut lines = vec![];
    lines.push(format!("Map:              {}", preview.game.map));
    lines.push(format!(
        "Duration:         {}",
        format_duration(preview.game.duration)
    ));
    lines.push(format!("Players:          {}", preview.game.player_count));
    lines.push(format!(
        "Winner team:      {}",
        preview
            .game
            .winner_team
            .map(|t| t.to_string())
            .unwrap_or_else(|| "-".to_string())
    ));
    lines.push(String::new());

    let mut table = new_table(&["Player", "Team", "Race", "APM", "Result"], no_color);
    for player in &preview.players {
        let name = display_name(player.name.as_deref(), player.normalized_name.as_deref());
        let won = preview.game.winner_team.is_some() && player.team == preview.game.winner_team;

        table.add_row(Row::from(vec![
            name,
            player
                .team
                .map(|t| t.to_string())
                .unwrap_or_else(|| "-".to_string()),
            player.effective_race().to_string(),
            player.apm.to_string(),
            if won { "win" } else { "loss" }.to_string(),
        ]));
    }
    lines.push(table.to_string());

    lines.join("\n")
}

/// Bulk conversion result (human or JSON)
pub fn format_conversion(summary: &ConversionSummary, json: bool) -> String {
    if json {
        return to_json(summary, "{}");
    }

    let mut lines = vec![format!(
        "Replays: {}  converted: {}  up to date: {}  failed: {}",
        summary.total, summary.converted, summary.skipped, summary.failed
    )];
    for failure in &summary.errors.failures {
        lines.push(format!(
            "  - {}: {}",
            failure.path.display(),
            failure.message
        ));
    }
    lines.join("\n")
}

/// Leaderboard table (human) or the full report (JSON)
pub fn format_stats_table(
    report: &StatsReport,
    limit: Option<usize>,
    json: bool,
    no_color: bool,
) -> String {
    if json {
        return to_json(report, "{}");
    }

    if report.player_stats.is_empty() {
        return format!(
            "No player statistics ({} games analyzed).",
            report.total_games
        );
    }

    let mut table = new_table(
        &[
            "Player", "Games", "Wins", "Losses", "Win %", "Main race", "Top hero",
        ],
        no_color,
    );

    let leaderboard = report.leaderboard();
    let shown = limit.unwrap_or(leaderboard.len());
    for (name, stats) in leaderboard.into_iter().take(shown) {
        let top_hero = stats
            .hero_picks()
            .into_iter()
            .max_by(|(a_name, a), (b_name, b)| a.cmp(b).then(b_name.cmp(a_name)))
            .map(|(hero, picks)| format!("{} ({})", hero, picks))
            .unwrap_or_else(|| "-".to_string());

        table.add_row(Row::from(vec![
            truncate(name, 24),
            stats.games().to_string(),
            stats.wins.to_string(),
            stats.losses.to_string(),
            format!("{:.1}", stats.win_rate() * 100.0),
            stats.main_race().unwrap_or("-").to_string(),
            top_hero,
        ]));
    }

    let races = report
        .race_distribution
        .iter()
        .map(|(race, games)| format!("{} {}", race, games))
        .collect::<Vec<_>>();
    let heroes = report
        .top_heroes(5)
        .into_iter()
        .map(|(hero, picks)| format!("{} {}", hero, picks))
        .collect::<Vec<_>>();

    format!(
        "{}\n{} games analyzed, {} players\nRaces: {}\nTop heroes: {}",
        table,
        report.total_games,
        report.player_stats.len(),
        join_or_dash(&races),
        join_or_dash(&heroes)
    )
}

// ============================================================================
// Utilities
// ============================================================================

fn new_table(headers: &[&str], no_color: bool) -> Table {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);

    if no_color {
        table.set_header(headers.to_vec());
    } else {
        table.set_header(
            headers
                .iter()
                .map(|h| Cell::new(h).fg(Color::Cyan))
                .collect::<Vec<_>>(),
        );
    }
    table
}

fn to_json<T: Serialize + ?Sized>(value: &T, fallback: &str) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| fallback.to_string())
}

fn join_or_dash(items: &[String]) -> String {
    if items.is_empty() {
        "-".to_string()
    } else {
        items.join(", ")
    }
}

fn display_name(name: Option<&str>, normalized: Option<&str>) -> String {
    match (name, normalized) {
        (Some(name), Some(canonical)) => format!("{} ({})", canonical, name),
        (Some(name), None) => name.to_string(),
        (None, _) => "?".to_string(),
    }
}

fn winner_names(preview: &ReplayPreview) -> String {
    if preview.winners.is_empty() {
        return "-".to_string();
    }
    preview
        .winners
        .iter()
        .map(|w| {
            w.normalized_name
                .as_deref()
                .or(w.name.as_deref())
                .unwrap_or("?")
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn format_modified(modified: Option<chrono::DateTime<chrono::Utc>>) -> String {
    modified
        .map(|ts| ts.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Milliseconds as `m:ss` (or `h:mm:ss`)
fn format_duration(ms: u64) -> String {
    let secs = ms / 1000;
    let (h, m, s) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    if h > 0 {
        format!("{}:{:02}:{:02}", h, m, s)
    } else {
        format!("{}:{:02}", m, s)
    }
}

fn format_size(bytes: u64) -> String {
    if bytes >= 1024 * 1024 {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    } else if bytes >= 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{} B", bytes)
    }
}

fn truncate(s: &str, max: usize) -> String {
    let char_count = s.chars().count();
    if char_count <= max {
        s.to_string()
    } else {
        s.chars().take(max - 1).collect::<String>() + "…"
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use replaydeck_core::models::{PlayerStatAggregate, RaceRecord};
    use replaydeck_core::parsers::build_preview;
    use replaydeck_core::NameAliases;

    fn report() -> StatsReport {
        let mut report = StatsReport {
            total_games: 3,
            ..Default::default()
        };

        let mut neko = PlayerStatAggregate {
            wins: 2,
            losses: 1,
            ..Default::default()
        };
        neko.races
            .insert("Human".to_string(), RaceRecord { wins: 2, losses: 1 });
        neko.heroes.insert(
            "Human".to_string(),
            [("Archmage".to_string(), 3), ("Paladin".to_string(), 1)]
                .into_iter()
                .collect(),
        );
        report.player_stats.insert("Neko".to_string(), neko);
        report.race_distribution.insert("Human".to_string(), 3);
        report.race_distribution.insert("Unknown".to_string(), 1);
        report.hero_usage.insert("Archmage".to_string(), 3);
        report.hero_usage.insert("Paladin".to_string(), 1);

        report.player_stats.insert(
            "Foe".to_string(),
            PlayerStatAggregate {
                losses: 1,
                ..Default::default()
            },
        );
        report
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0), "0:00");
        assert_eq!(format_duration(65_000), "1:05");
        assert_eq!(format_duration(3_725_000), "1:02:05");
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2.0 KB");
        assert_eq!(format_size(3 * 1024 * 1024), "3.0 MB");
    }

    #[test]
    fn test_truncate_multibyte() {
        assert_eq!(truncate("ネコネコネコ", 4), "ネコネ…");
        assert_eq!(truncate("Neko", 10), "Neko");
    }

    #[test]
    fn test_stats_table_orders_and_limits() {
        let out = format_stats_table(&report(), Some(1), false, true);
        assert!(out.contains("Neko"));
        assert!(!out.contains("Foe"));
        assert!(out.contains("66.7"));
        assert!(out.contains("Archmage (3)"));
        assert!(out.contains("3 games analyzed, 2 players"));
        assert!(out.contains("Races: Human 3, Unknown 1"));
        assert!(out.contains("Top heroes: Archmage 3, Paladin 1"));
    }

    #[test]
    fn test_stats_json_matches_api_shape() {
        let out = format_stats_table(&report(), None, true, true);
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["totalGames"], 3);
        assert_eq!(value["playerStats"]["Neko"]["wins"], 2);
        assert_eq!(value["raceDistribution"]["Human"], 3);
        assert_eq!(value["heroUsage"]["Archmage"], 3);
    }

    #[test]
    fn test_empty_stats() {
        let out = format_stats_table(&StatsReport::default(), None, false, true);
        assert_eq!(out, "No player statistics (0 games analyzed).");
    }

    #[test]
    fn test_analysis_shows_canonical_names() {
        let artifact: AnalysisArtifact = serde_json::from_str(
            r#"{"game": {"player_count": 2, "map": "Maps\\Twisted Meadows.w3x", "winner_team": 1},
                "header": {"length": 65000},
                "teams": [
                    {"1": {"name": "nekochan", "race": "Human", "team": 0, "actions": 10}},
                    {"2": {"name": "Foe", "race": "Orc", "team": 1, "actions": 20}}
                ]}"#,
        )
        .unwrap();
        let names = NameAliases::from_pairs([("nekochan", "Neko")]);
        let preview = build_preview(&artifact, &names);

        let out = format_analysis(&artifact, &preview, false, true);
        assert!(out.contains("Twisted Meadows"));
        assert!(out.contains("1:05"));
        assert!(out.contains("Neko (nekochan)"));
    }

    #[test]
    fn test_analysis_race_matches_stats_rule() {
        let artifact: AnalysisArtifact = serde_json::from_str(
            r#"{"game": {"player_count": 2, "winner_team": 0},
                "teams": [
                    {"1": {"name": "Neko", "race": "Human", "race_detected": "", "team": 0, "actions": 10}},
                    {"2": {"name": "Drifter", "actions": 20}}
                ]}"#,
        )
        .unwrap();
        let preview = build_preview(&artifact, &NameAliases::new());

        let out = format_analysis(&artifact, &preview, false, true);
        let neko = out.lines().find(|l| l.contains("Neko")).unwrap();
        assert!(neko.contains("Human"));
        assert!(neko.contains("win"));

        let drifter = out.lines().find(|l| l.contains("Drifter")).unwrap();
        assert!(drifter.contains("Unknown"));
        assert!(drifter.contains("loss"));
    }
}
