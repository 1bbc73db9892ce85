//! Query service over one game index

use super::command::{ConsoleCommand, ConsoleOutcome};
use crate::config::QueryConfig;
use crate::index::{EngineError, GameQuery, SearchEngine};
use crate::types::QueryResult;
use crate::util::truncate_str;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("search index unavailable: {0}")]
    IndexUnavailable(#[from] EngineError),
}

/// Runs identity and detail searches against a named index
#[derive(Clone)]
pub struct QueryService {
    engine: Arc<dyn SearchEngine>,
    index: String,
    top_k: usize,
}

impl QueryService {
    pub fn new(engine: Arc<dyn SearchEngine>, index: impl Into<String>, config: &QueryConfig) -> Self {
        Self {
            engine,
            index: index.into(),
            top_k: config.top_k.max(1),
        }
    }

    pub fn index(&self) -> &str {
        &self.index
    }

    /// Games where `name` plays in any seat
    pub fn search_by_identity(&self, name: &str) -> Result<QueryResult, QueryError> {
        self.execute(&GameQuery::identity(name))
    }

    /// Games whose raw record matches `text`
    pub fn search_by_detail(&self, text: &str) -> Result<QueryResult, QueryError> {
        self.execute(&GameQuery::detail(text))
    }

    /// Execute a query and keep only the best hit
    pub fn execute(&self, query: &GameQuery) -> Result<QueryResult, QueryError> {
        let response = self.engine.search(&self.index, query, self.top_k)?;

        debug!(
            "Executed {} on '{}': {} hits in {:?}",
            truncate_str(&format!("{:?}", query), 80),
            self.index,
            response.total_hits,
            response.took
        );

        let first_hit = response.hits.into_iter().next();
        Ok(QueryResult::new(response.total_hits, response.took, first_hit))
    }

    pub fn index_exists(&self) -> Result<bool, QueryError> {
        Ok(self.engine.index_exists(&self.index)?)
    }

    /// Number of games in the index
    pub fn game_count(&self) -> Result<u64, QueryError> {
        Ok(self.engine.search(&self.index, &GameQuery::MatchAll, 1)?.total_hits)
    }

    /// Run one console line; `None` means the session should end
    pub fn dispatch(&self, line: &str) -> Result<Option<ConsoleOutcome>, QueryError> {
        let command = ConsoleCommand::parse(line);
        let result = match &command {
            ConsoleCommand::Quit => return Ok(None),
            ConsoleCommand::Identity(name) => self.search_by_identity(name)?,
            ConsoleCommand::Detail(text) => self.search_by_detail(text)?,
        };
        Ok(Some(ConsoleOutcome { command, result }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::TantivyEngine;
    use crate::types::{GameDocument, GameField};

    fn service_with(games: &[GameDocument]) -> QueryService {
        let engine = Arc::new(TantivyEngine::in_memory());
        if !games.is_empty() {
            engine.bulk("iss", games).unwrap();
            engine.refresh("iss").unwrap();
        }
        QueryService::new(engine, "iss", &QueryConfig::default())
    }

    fn game(id: &str, seats: [&str; 3]) -> GameDocument {
        GameDocument::new(format!(
            "ID[{}]P0[{}]P1[{}]P2[{}]",
            id, seats[0], seats[1], seats[2]
        ))
        .with(GameField::GameId, id)
        .with(GameField::Forehand, seats[0])
        .with(GameField::Middlehand, seats[1])
        .with(GameField::Rearhand, seats[2])
    }

    #[test]
    fn test_identity_search_in_any_seat() {
        let service = service_with(&[
            game("1", ["anna", "bert", "carl"]),
            game("2", ["dora", "anna", "emil"]),
            game("3", ["fritz", "gert", "hans"]),
        ]);

        let result = service.search_by_identity("anna").unwrap();
        assert_eq!(result.total_hits, 2);
        let first = result.first_hit.unwrap();
        assert!(first.document.players().any(|p| p == "anna"));
    }

    #[test]
    fn test_detail_search_matches_raw_record() {
        let service = service_with(&[game("42", ["a", "b", "c"]), game("7", ["d", "e", "f"])]);

        let result = service.search_by_detail("ID[42]").unwrap();
        assert!(result.total_hits >= 1);
        assert!(result
            .first_hit
            .unwrap()
            .document
            .complete_game
            .contains("ID[42]"));
    }

    #[test]
    fn test_detail_search_ranks_adjacent_tokens_first() {
        let full = GameDocument::new(
            "(;GM[Skat]PC[International Skat Server]CO[]SE[24072]ID[42]DT[2007-11-30/13:53:27/UTC]\
             P0[zoot]P1[kermit]P2[foo]R0[]R1[]R2[]MV[w HA.SK.SQ.C9.CK.HT.H8.H7.SA.SJ.D8.DA.\
             C7.D7.CJ.CA.ST.DQ.S7.HQ.DK.SQ.H9.D9.C8.CQ.CT.D7.HJ.S9.S8 1 p 0 18 2 p 1 p 0 s \
             w SK.S9 0 G.C9.CK 1 CJ 2 HJ 0 CA 1 C7 2 C8]R[d:0 win v:61 m:1 bidok p:61 t:4 \
             s:0 z:0 p0:0 p1:0 p2:0 l:-1 to:-1 r:0] ;)",
        )
        .with(GameField::GameId, "42")
        .with(GameField::Forehand, "zoot")
        .with(GameField::Middlehand, "kermit")
        .with(GameField::Rearhand, "foo");
        let short = GameDocument::new("(;GM[Skat]ID[7]P0[a]P1[b]P2[c]R[d:1 win p:42] ;)")
            .with(GameField::GameId, "7")
            .with(GameField::Forehand, "a")
            .with(GameField::Middlehand, "b")
            .with(GameField::Rearhand, "c");
        let service = service_with(&[full, short]);

        let result = service.search_by_detail("ID[42]").unwrap();
        assert_eq!(result.total_hits, 2);
        assert!(result
            .first_hit
            .unwrap()
            .document
            .complete_game
            .contains("ID[42]"));
    }

    #[test]
    fn test_missing_index_yields_no_hits() {
        let service = service_with(&[]);

        let result = service.search_by_identity("anyone").unwrap();
        assert!(result.is_empty());
        assert!(result.first_hit.is_none());
        assert_eq!(service.game_count().unwrap(), 0);
        assert!(!service.index_exists().unwrap());
    }

    #[test]
    fn test_game_count() {
        let service = service_with(&[game("1", ["a", "b", "c"]), game("2", ["d", "e", "f"])]);
        assert_eq!(service.game_count().unwrap(), 2);
    }

    #[test]
    fn test_dispatch_routes_commands() {
        let service = service_with(&[game("42", ["meier", "b", "c"])]);

        let identity = service.dispatch("meier").unwrap().unwrap();
        assert_eq!(identity.command, ConsoleCommand::Identity("meier".to_string()));
        assert_eq!(identity.result.total_hits, 1);

        let detail = service.dispatch("detail ID[42]").unwrap().unwrap();
        assert_eq!(detail.command, ConsoleCommand::Detail("ID[42]".to_string()));
        assert_eq!(detail.result.total_hits, 1);

        assert!(service.dispatch("").unwrap().is_none());
        assert!(service.dispatch("quit").unwrap().is_none());
    }
}
