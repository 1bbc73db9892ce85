//! Record parser for ISS game lines
//!
//! A record is one line of `MARKER[payload]` parts, e.g.
//! `(;GM[Skat]PC[International Skat Server]ID[4711]P0[anna]P1[bert]P2[carl]...)`.
//! Known markers are lifted into fields; everything else stays searchable
//! through the raw line.

use crate::types::{GameDocument, GameField};
use regex::Regex;
use std::sync::OnceLock;

static RE_SUMMARY_PART: OnceLock<Regex> = OnceLock::new();

/// Markers lifted into document fields
pub const MARKER_FIELDS: &[(&str, GameField)] = &[
    ("ID", GameField::GameId),
    ("P0", GameField::Forehand),
    ("P1", GameField::Middlehand),
    ("P2", GameField::Rearhand),
];

fn summary_part_pattern() -> &'static Regex {
    RE_SUMMARY_PART.get_or_init(|| {
        // Payload ends at the first ']'; escaped brackets are not supported.
        Regex::new(r"([A-Za-z0-9_]+)\[(.*?)\]").expect("summary part pattern is valid")
    })
}

/// Field a marker maps to, if any
pub fn field_for_marker(marker: &str) -> Option<GameField> {
    MARKER_FIELDS
        .iter()
        .find(|(name, _)| *name == marker)
        .map(|(_, field)| *field)
}

/// Parse one record line. Never fails: unknown or missing markers just leave
/// fields empty, and a later occurrence of a marker overwrites an earlier one.
pub fn parse_line(line: &str) -> GameDocument {
    let mut document = GameDocument::default();

    for captures in summary_part_pattern().captures_iter(line) {
        let (Some(marker), Some(payload)) = (captures.get(1), captures.get(2)) else {
            continue;
        };
        if let Some(field) = field_for_marker(marker.as_str()) {
            document.set(field, payload.as_str());
        }
    }

    document.complete_game = line.to_string();
    document
}

#[cfg(test)]
mod tests {
    use super::*;

    const GAME: &str = "(;GM[Skat]PC[International Skat Server]CO[]SE[24072]ID[541877]DT[2007-10-12/14:53:12/UTC]P0[zoot]P1[kermit]P2[theCount]R0[]R1[]R2[0.0]MV[w CA.SK.H9 1 p 2 18 0 y] R[d:1 win v:-96 m:-1 bidok p:43 t:3 s:0 z:0 p0:0 p1:0 p2:0 l:-1 to:-1 r:0] ;)";

    #[test]
    fn test_parses_iss_record() {
        let doc = parse_line(GAME);
        assert_eq!(doc.game_id.as_deref(), Some("541877"));
        assert_eq!(doc.forehand.as_deref(), Some("zoot"));
        assert_eq!(doc.middlehand.as_deref(), Some("kermit"));
        assert_eq!(doc.rearhand.as_deref(), Some("theCount"));
        assert_eq!(doc.complete_game, GAME);
    }

    #[test]
    fn test_line_without_markers_degrades_gracefully() {
        for line in ["", "no markers at all", "P0 without brackets", "[]]["] {
            let doc = parse_line(line);
            assert_eq!(doc.complete_game, line);
            assert!(doc.game_id.is_none());
            assert!(doc.forehand.is_none());
            assert!(doc.middlehand.is_none());
            assert!(doc.rearhand.is_none());
        }
    }

    #[test]
    fn test_marker_order_does_not_matter() {
        let line = "P2[w]x P0[y] ID[x] P1[z]";
        let doc = parse_line(line);
        assert_eq!(doc.game_id.as_deref(), Some("x"));
        assert_eq!(doc.forehand.as_deref(), Some("y"));
        assert_eq!(doc.middlehand.as_deref(), Some("z"));
        assert_eq!(doc.rearhand.as_deref(), Some("w"));
        assert_eq!(doc.complete_game, line);
    }

    #[test]
    fn test_last_occurrence_wins() {
        let doc = parse_line("P0[first] P0[second] P0[third]");
        assert_eq!(doc.forehand.as_deref(), Some("third"));
    }

    #[test]
    fn test_unknown_markers_ignored() {
        let doc = parse_line("GM[Skat] P3[nobody] XID[7] P0[anna]");
        assert_eq!(doc.forehand.as_deref(), Some("anna"));
        assert!(doc.game_id.is_none());
    }

    #[test]
    fn test_empty_payload_is_present_but_empty() {
        let doc = parse_line("P1[]");
        assert_eq!(doc.middlehand.as_deref(), Some(""));
    }

    #[test]
    fn test_payload_stops_at_first_closing_bracket() {
        let doc = parse_line("P0[a]b]");
        assert_eq!(doc.forehand.as_deref(), Some("a"));
    }

    #[test]
    fn test_marker_table_lookup() {
        assert_eq!(field_for_marker("ID"), Some(GameField::GameId));
        assert_eq!(field_for_marker("P2"), Some(GameField::Rearhand));
        assert_eq!(field_for_marker("id"), None);
    }
}
