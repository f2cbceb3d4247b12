//! Preview extraction: a compact listing summary of one artifact

use super::artifact::read_artifact;
use crate::models::{
    AnalysisArtifact, PreviewGame, PreviewPlayer, PreviewWinner, ReplayPreview,
};
use crate::names::NameAliases;
use std::path::Path;
use tracing::debug;

/// Summarize a parsed artifact
pub fn build_preview(artifact: &AnalysisArtifact, names: &NameAliases) -> ReplayPreview {
    let game = PreviewGame {
        player_count: artifact.game.player_count,
        map: artifact.map_name(),
        duration: artifact.header.length,
        winner_team: artifact.game.winner_team,
    };

    let mut players = Vec::new();
    let mut winners = Vec::new();

    for player in artifact.active_players() {
        let normalized_name = names.changed(player.name.as_deref());

        if artifact.is_winner(player) {
            winners.push(PreviewWinner {
                name: player.name.clone(),
                normalized_name: normalized_name.clone(),
                color: player.color.clone(),
            });
        }

        players.push(PreviewPlayer {
            name: player.name.clone(),
            normalized_name,
            race: player.race.clone(),
            race_detected: player.race_detected.clone(),
            color: player.color.clone(),
            team: player.team,
            apm: player.rounded_apm(),
        });
    }

    ReplayPreview {
        game,
        players,
        winners,
    }
}

/// Preview of the artifact at `path`, `None` if it cannot be read or parsed
pub fn preview_file(path: &Path, names: &NameAliases) -> Option<ReplayPreview> {
    match read_artifact(path) {
        Ok(artifact) => Some(build_preview(&artifact, names)),
        Err(e) => {
            debug!(path = %path.display(), error = %e, "No preview for artifact");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const GAME: &str = r#"{
        "game": {"player_count": 3, "map": "Maps/FrozenThrone/(4)TwistedMeadows.w3x", "winner_team": 1},
        "header": {"length": 754000},
        "teams": [
            {"1": {"name": "NekoChan", "race": "Human", "team": 0, "color": 0, "actions": 900, "apm": 71.5}},
            {"2": {"name": "Foe", "race": "Orc", "race_detected": "Orc", "team": 1, "color": 1, "actions": 1100, "apm": 88.4},
             "5": {"name": "Obs", "team": 1, "color": 5, "actions": 0}}
        ]
    }"#;

    fn names() -> NameAliases {
        NameAliases::from_pairs([("nekochan", "Neko")])
    }

    #[test]
    fn test_preview_game_info() {
        let artifact: AnalysisArtifact = serde_json::from_str(GAME).unwrap();
        let preview = build_preview(&artifact, &names());

        assert_eq!(preview.game.player_count, 3);
        assert_eq!(preview.game.map, "(4)TwistedMeadows");
        assert_eq!(preview.game.duration, 754_000);
        assert_eq!(preview.game.winner_team, Some(1));
    }

    #[test]
    fn test_preview_skips_inactive_players() {
        let artifact: AnalysisArtifact = serde_json::from_str(GAME).unwrap();
        let preview = build_preview(&artifact, &names());

        let names: Vec<_> = preview
            .players
            .iter()
            .map(|p| p.name.as_deref().unwrap())
            .collect();
        assert_eq!(names, vec!["NekoChan", "Foe"]);
        assert_eq!(preview.players[0].apm, 72);
        assert_eq!(preview.players[1].apm, 88);
    }

    #[test]
    fn test_normalized_name_only_when_changed() {
        let artifact: AnalysisArtifact = serde_json::from_str(GAME).unwrap();
        let preview = build_preview(&artifact, &names());

        assert_eq!(preview.players[0].normalized_name.as_deref(), Some("Neko"));
        assert_eq!(preview.players[1].normalized_name, None);
    }

    #[test]
    fn test_winners_match_winning_team() {
        let artifact: AnalysisArtifact = serde_json::from_str(GAME).unwrap();
        let preview = build_preview(&artifact, &names());

        assert_eq!(preview.winners.len(), 1);
        assert_eq!(preview.winners[0].name.as_deref(), Some("Foe"));
        assert_eq!(preview.winners[0].color, Some(serde_json::json!(1)));
    }

    #[test]
    fn test_defaults_for_missing_sections() {
        let artifact: AnalysisArtifact =
            serde_json::from_str(r#"{"game": {"player_count": 0}, "teams": []}"#).unwrap();
        let preview = build_preview(&artifact, &NameAliases::new());

        assert_eq!(preview.game.map, "Unknown");
        assert_eq!(preview.game.duration, 0);
        assert!(preview.players.is_empty());
        assert!(preview.winners.is_empty());
    }

    #[test]
    fn test_null_apm_and_missing_team_still_preview() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("game.json");
        std::fs::write(
            &path,
            r#"{"game": {"player_count": 3, "winner_team": 0},
                "teams": [{"1": {"name": "Neko", "team": 0, "actions": 50, "apm": 60.4},
                           "2": {"name": "Drifter", "actions": 20, "apm": null},
                           "3": {"name": "Watcher", "team": 1, "actions": 0, "apm": null}}]}"#,
        )
        .unwrap();

        let preview = preview_file(&path, &names()).unwrap();
        assert_eq!(preview.players.len(), 2);
        assert_eq!(preview.players[1].team, None);
        assert_eq!(preview.players[1].apm, 0);
        assert_eq!(preview.winners.len(), 1);
        assert_eq!(preview.winners[0].name.as_deref(), Some("Neko"));
    }

    #[test]
    fn test_corrupt_artifact_gives_no_preview() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("game.json");
        std::fs::write(&path, "{\"game\": ").unwrap();

        assert!(preview_file(&path, &names()).is_none());
        assert!(preview_file(&dir.path().join("missing.json"), &names()).is_none());
    }
}
