//! Game index backed by Tantivy
//!
//! Each named index lives in its own directory below the data directory (or
//! in RAM). Bulk writes are committed immediately; readers only pick them up
//! on `refresh`, so a refresh is what makes an import visible.

use super::engine::{
    BulkItemFailure, BulkResponse, EngineError, GameQuery, SearchEngine, SearchResponse,
};
use crate::config::IndexConfig;
use crate::types::{GameDocument, GameField, Hit};
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tantivy::{
    collector::{Count, TopDocs},
    directory::MmapDirectory,
    query::{AllQuery, BooleanQuery, BoostQuery, EmptyQuery, Occur, PhraseQuery, Query, TermQuery},
    schema::{Field, IndexRecordOption, Schema, Value, STORED, TEXT},
    tokenizer::TokenStream,
    Index, IndexReader, IndexWriter, ReloadPolicy, TantivyDocument, Term,
};
use tracing::{debug, info};

/// File Tantivy writes into every initialized index directory
const META_FILE: &str = "meta.json";

/// Weight of the adjacent-token clause over the single-token clauses
const PHRASE_BOOST: f32 = 10.0;

/// Tantivy-backed search engine holding any number of named game indexes
pub struct TantivyEngine {
    /// `None` keeps every index in RAM
    root: Option<PathBuf>,
    writer_heap_bytes: usize,
    open: RwLock<HashMap<String, Arc<GameIndex>>>,
}

/// One open index
struct GameIndex {
    index: Index,
    reader: IndexReader,
    /// Taken on first write so read-only users never hold the directory lock
    writer: Mutex<Option<IndexWriter>>,
    writer_heap_bytes: usize,
    fields: GameSchema,
}

/// Schema fields of a game index
struct GameSchema {
    game_id: Field,
    forehand: Field,
    middlehand: Field,
    rearhand: Field,
    complete_game: Field,
}

impl GameSchema {
    fn build() -> (Schema, Self) {
        let mut schema_builder = Schema::builder();

        let game_id = schema_builder.add_text_field(GameField::GameId.index_name(), TEXT | STORED);
        let forehand =
            schema_builder.add_text_field(GameField::Forehand.index_name(), TEXT | STORED);
        let middlehand =
            schema_builder.add_text_field(GameField::Middlehand.index_name(), TEXT | STORED);
        let rearhand =
            schema_builder.add_text_field(GameField::Rearhand.index_name(), TEXT | STORED);
        let complete_game =
            schema_builder.add_text_field(GameField::CompleteGame.index_name(), TEXT | STORED);

        let schema = schema_builder.build();
        let fields = Self {
            game_id,
            forehand,
            middlehand,
            rearhand,
            complete_game,
        };

        (schema, fields)
    }

    fn field(&self, field: GameField) -> Field {
        match field {
            GameField::GameId => self.game_id,
            GameField::Forehand => self.forehand,
            GameField::Middlehand => self.middlehand,
            GameField::Rearhand => self.rearhand,
            GameField::CompleteGame => self.complete_game,
        }
    }
}

impl TantivyEngine {
    /// Engine persisting indexes below `root`
    pub fn open(root: impl AsRef<Path>, writer_heap_bytes: usize) -> Result<Self, EngineError> {
        let root = root.as_ref().to_path_buf();
        std::fs::create_dir_all(&root)?;
        info!("Search engine data directory: {}", root.display());

        Ok(Self {
            root: Some(root),
            writer_heap_bytes,
            open: RwLock::new(HashMap::new()),
        })
    }

    /// Engine keeping every index in memory
    pub fn in_memory() -> Self {
        Self {
            root: None,
            writer_heap_bytes: 50_000_000,
            open: RwLock::new(HashMap::new()),
        }
    }

    /// Build the engine described by the index configuration
    pub fn from_config(config: &IndexConfig) -> Result<Self, EngineError> {
        if config.in_memory {
            let mut engine = Self::in_memory();
            engine.writer_heap_bytes = config.writer_heap_bytes;
            Ok(engine)
        } else {
            Self::open(&config.data_dir, config.writer_heap_bytes)
        }
    }

    fn index_dir(&self, name: &str) -> Option<PathBuf> {
        self.root.as_ref().map(|root| root.join(name))
    }

    /// Open index if already loaded or present on disk
    fn existing(&self, name: &str) -> Result<Option<Arc<GameIndex>>, EngineError> {
        validate_index_name(name)?;

        if let Some(index) = self.open.read().get(name) {
            return Ok(Some(index.clone()));
        }

        match self.index_dir(name) {
            Some(dir) if dir.join(META_FILE).exists() => self.load_or_create(name).map(Some),
            _ => Ok(None),
        }
    }

    fn load_or_create(&self, name: &str) -> Result<Arc<GameIndex>, EngineError> {
        validate_index_name(name)?;

        let mut open = self.open.write();
        if let Some(index) = open.get(name) {
            return Ok(index.clone());
        }

        let (schema, fields) = GameSchema::build();
        let index = match self.index_dir(name) {
            Some(dir) => {
                std::fs::create_dir_all(&dir)?;
                let directory = MmapDirectory::open(&dir).map_err(tantivy::TantivyError::from)?;
                Index::open_or_create(directory, schema)?
            }
            None => Index::create_in_ram(schema),
        };

        let reader = index
            .reader_builder()
            .reload_policy(ReloadPolicy::Manual)
            .try_into()?;

        debug!("Opened index '{}'", name);

        let game_index = Arc::new(GameIndex {
            index,
            reader,
            writer: Mutex::new(None),
            writer_heap_bytes: self.writer_heap_bytes,
            fields,
        });
        open.insert(name.to_string(), game_index.clone());
        Ok(game_index)
    }
}

impl SearchEngine for TantivyEngine {
    fn index_exists(&self, index: &str) -> Result<bool, EngineError> {
        Ok(self.existing(index)?.is_some())
    }

    fn bulk(&self, index: &str, documents: &[GameDocument]) -> Result<BulkResponse, EngineError> {
        let start = Instant::now();
        let game_index = self.load_or_create(index)?;

        let failures = game_index.with_writer(|writer| {
            let mut failures = Vec::new();
            for (position, document) in documents.iter().enumerate() {
                if document.complete_game.is_empty() {
                    failures.push(BulkItemFailure {
                        position,
                        reason: format!("{} must not be empty", GameField::CompleteGame),
                    });
                    continue;
                }

                if let Err(e) = writer.add_document(game_index.tantivy_document(document)) {
                    failures.push(BulkItemFailure {
                        position,
                        reason: e.to_string(),
                    });
                }
            }
            writer.commit()?;
            Ok(failures)
        })?;

        Ok(BulkResponse {
            items: documents.len(),
            failures,
            took: start.elapsed(),
        })
    }

    fn refresh(&self, index: &str) -> Result<(), EngineError> {
        let game_index = self.load_or_create(index)?;
        game_index.reader.reload()?;
        debug!("Refreshed index '{}'", index);
        Ok(())
    }

    fn search(
        &self,
        index: &str,
        query: &GameQuery,
        limit: usize,
    ) -> Result<SearchResponse, EngineError> {
        let start = Instant::now();
        let Some(game_index) = self.existing(index)? else {
            return Ok(SearchResponse {
                took: start.elapsed(),
                ..Default::default()
            });
        };

        let query = game_index.build_query(query)?;
        let searcher = game_index.reader.searcher();
        let (count, top_docs) =
            searcher.search(&*query, &(Count, TopDocs::with_limit(limit.max(1))))?;

        let mut hits = Vec::with_capacity(top_docs.len().min(limit));
        for (score, doc_address) in top_docs.into_iter().take(limit) {
            let doc: TantivyDocument = searcher.doc(doc_address)?;
            hits.push(Hit {
                score,
                document: game_index.game_document(&doc),
            });
        }

        Ok(SearchResponse {
            total_hits: count as u64,
            hits,
            took: start.elapsed(),
        })
    }

    fn delete_index(&self, index: &str) -> Result<bool, EngineError> {
        validate_index_name(index)?;

        let was_open = self.open.write().remove(index).is_some();
        let removed_dir = match self.index_dir(index) {
            Some(dir) if dir.exists() => {
                std::fs::remove_dir_all(&dir)?;
                true
            }
            _ => false,
        };

        if was_open || removed_dir {
            info!("Deleted index '{}'", index);
        }
        Ok(was_open || removed_dir)
    }
}

impl GameIndex {
    fn with_writer<T>(
        &self,
        f: impl FnOnce(&mut IndexWriter) -> Result<T, EngineError>,
    ) -> Result<T, EngineError> {
        let mut slot = self.writer.lock();
        let writer = match slot.take() {
            Some(writer) => writer,
            None => self.index.writer(self.writer_heap_bytes)?,
        };
        f(slot.insert(writer))
    }

    fn tantivy_document(&self, document: &GameDocument) -> TantivyDocument {
        let mut doc = TantivyDocument::new();
        for field in GameField::ALL {
            if let Some(value) = document.get(field) {
                doc.add_text(self.fields.field(field), value);
            }
        }
        doc
    }

    fn game_document(&self, doc: &TantivyDocument) -> GameDocument {
        let mut document = GameDocument::default();
        for field in GameField::ALL {
            if let Some(value) = doc
                .get_first(self.fields.field(field))
                .and_then(|v| v.as_str())
            {
                document.set(field, value);
            }
        }
        document
    }

    fn build_query(&self, query: &GameQuery) -> Result<Box<dyn Query>, EngineError> {
        match query {
            GameQuery::MatchAll => Ok(Box::new(AllQuery)),
            GameQuery::Match { field, text } => self.match_query(std::slice::from_ref(field), text),
            GameQuery::MultiMatch { fields, text } => self.match_query(fields, text),
        }
    }

    /// OR of every query token against every listed field.
    ///
    /// Text is run through the same analyzer the field was indexed with, so
    /// matching is case-insensitive and splits on punctuation. Multi-token
    /// text also adds a boosted phrase clause per field, so documents holding
    /// the tokens side by side (`ID[42]`) rank above ones that merely contain
    /// each token somewhere (`ID[7] ... p:42`).
    fn match_query(&self, fields: &[GameField], text: &str) -> Result<Box<dyn Query>, EngineError> {
        let mut clauses: Vec<(Occur, Box<dyn Query>)> = Vec::new();

        for game_field in fields {
            let field = self.fields.field(*game_field);
            let mut analyzer = self.index.tokenizer_for_field(field)?;
            let mut terms = Vec::new();
            let mut stream = analyzer.token_stream(text);
            stream.process(&mut |token| {
                terms.push((token.position, Term::from_field_text(field, &token.text)));
            });

            if terms.len() >= 2 {
                let phrase = PhraseQuery::new_with_offset(terms.clone());
                clauses.push((
                    Occur::Should,
                    Box::new(BoostQuery::new(Box::new(phrase), PHRASE_BOOST)),
                ));
            }

            for (_, term) in terms {
                clauses.push((
                    Occur::Should,
                    Box::new(TermQuery::new(term, IndexRecordOption::WithFreqs)),
                ));
            }
        }

        if clauses.is_empty() {
            return Ok(Box::new(EmptyQuery));
        }
        Ok(Box::new(BooleanQuery::new(clauses)))
    }
}

fn validate_index_name(name: &str) -> Result<(), EngineError> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(EngineError::InvalidIndexName(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn game(id: &str, forehand: &str, middlehand: &str, rearhand: &str) -> GameDocument {
        let line = format!(
            "(;GM[Skat]PC[International Skat Server]ID[{}]P0[{}]P1[{}]P2[{}]R[d:0 win v:24])",
            id, forehand, middlehand, rearhand
        );
        GameDocument::new(line)
            .with(GameField::GameId, id)
            .with(GameField::Forehand, forehand)
            .with(GameField::Middlehand, middlehand)
            .with(GameField::Rearhand, rearhand)
    }

    #[test]
    fn test_bulk_is_invisible_until_refresh() {
        let engine = TantivyEngine::in_memory();
        engine.bulk("iss", &[game("1", "anna", "bert", "carl")]).unwrap();

        let before = engine.search("iss", &GameQuery::MatchAll, 10).unwrap();
        assert_eq!(before.total_hits, 0);

        engine.refresh("iss").unwrap();
        let after = engine.search("iss", &GameQuery::MatchAll, 10).unwrap();
        assert_eq!(after.total_hits, 1);
    }

    #[test]
    fn test_multi_match_hits_any_seat() {
        let engine = TantivyEngine::in_memory();
        engine
            .bulk(
                "iss",
                &[
                    game("1", "anna", "bert", "carl"),
                    game("2", "dora", "anna", "emil"),
                    game("3", "fritz", "gerd", "anna"),
                    game("4", "hans", "ida", "jan"),
                ],
            )
            .unwrap();
        engine.refresh("iss").unwrap();

        let response = engine
            .search("iss", &GameQuery::identity("Anna"), 10)
            .unwrap();
        assert_eq!(response.total_hits, 3);
        assert_eq!(response.hits.len(), 3);
    }

    #[test]
    fn test_empty_raw_record_is_rejected_per_item() {
        let engine = TantivyEngine::in_memory();
        let response = engine
            .bulk(
                "iss",
                &[game("1", "anna", "bert", "carl"), GameDocument::default()],
            )
            .unwrap();

        assert_eq!(response.items, 2);
        assert_eq!(response.failures.len(), 1);
        assert_eq!(response.failures[0].position, 1);

        engine.refresh("iss").unwrap();
        let all = engine.search("iss", &GameQuery::MatchAll, 10).unwrap();
        assert_eq!(all.total_hits, 1);
    }

    #[test]
    fn test_stored_document_round_trips() {
        let engine = TantivyEngine::in_memory();
        let original = game("77", "anna", "bert", "carl");
        engine.bulk("iss", std::slice::from_ref(&original)).unwrap();
        engine.refresh("iss").unwrap();

        let response = engine.search("iss", &GameQuery::detail("77"), 1).unwrap();
        assert_eq!(response.hits[0].document, original);
    }

    #[test]
    fn test_missing_index_searches_empty() {
        let engine = TantivyEngine::in_memory();
        assert!(!engine.index_exists("iss").unwrap());

        let response = engine.search("iss", &GameQuery::identity("anna"), 10).unwrap();
        assert_eq!(response.total_hits, 0);
        assert!(response.hits.is_empty());
    }

    #[test]
    fn test_punctuation_only_query_matches_nothing() {
        let engine = TantivyEngine::in_memory();
        engine.bulk("iss", &[game("1", "anna", "bert", "carl")]).unwrap();
        engine.refresh("iss").unwrap();

        let response = engine.search("iss", &GameQuery::detail("[]"), 10).unwrap();
        assert_eq!(response.total_hits, 0);
    }

    #[test]
    fn test_invalid_index_name_rejected() {
        let engine = TantivyEngine::in_memory();
        assert!(matches!(
            engine.index_exists("../etc"),
            Err(EngineError::InvalidIndexName(_))
        ));
    }

    #[test]
    fn test_index_persists_across_engines() {
        let temp_dir = TempDir::new().unwrap();

        {
            let engine = TantivyEngine::open(temp_dir.path(), 50_000_000).unwrap();
            assert!(!engine.index_exists("iss").unwrap());
            engine.bulk("iss", &[game("1", "anna", "bert", "carl")]).unwrap();
            engine.refresh("iss").unwrap();
        }

        let engine = TantivyEngine::open(temp_dir.path(), 50_000_000).unwrap();
        assert!(engine.index_exists("iss").unwrap());
        let response = engine.search("iss", &GameQuery::identity("bert"), 10).unwrap();
        assert_eq!(response.total_hits, 1);
    }

    #[test]
    fn test_delete_index_removes_documents() {
        let temp_dir = TempDir::new().unwrap();
        let engine = TantivyEngine::open(temp_dir.path(), 50_000_000).unwrap();
        engine.bulk("iss", &[game("1", "anna", "bert", "carl")]).unwrap();
        engine.refresh("iss").unwrap();

        assert!(engine.delete_index("iss").unwrap());
        assert!(!engine.index_exists("iss").unwrap());
        assert!(!engine.delete_index("iss").unwrap());
    }
}
