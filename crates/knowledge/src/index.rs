//! SQLite-backed vector index.
//!
//! An index is a single `index.sqlite` file inside the persist directory. It is
//! written to a uniquely named staging file in one transaction and renamed over
//! the previous file only once complete, so readers see either the old index or
//! the new one. Opening an index loads every chunk into memory; search is an
//! exact cosine-distance scan over that snapshot.

use crate::config::{get_index_path, get_staging_path};
use crate::embeddings::EmbeddingConfig;
use crate::types::{Chunk, ChunkMetadata, IndexStats, SearchHit};
use crate::vector_index::VectorIndex;
use assistant_core::{AppError, AppResult};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OpenFlags};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

const SCHEMA: &str = r#"
    CREATE TABLE index_info (
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );

    CREATE TABLE chunks (
        id INTEGER PRIMARY KEY,
        source_name TEXT NOT NULL,
        position INTEGER NOT NULL,
        content TEXT NOT NULL,
        embedding BLOB NOT NULL,
        metadata TEXT NOT NULL
    );

    CREATE INDEX idx_chunks_source ON chunks(source_name);
"#;

/// Build-level facts stored alongside the chunks.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexInfo {
    pub embedding: EmbeddingConfig,
    pub built_at: DateTime<Utc>,
    pub document_count: u32,
    pub chunk_count: u32,
}

#[derive(Debug, Clone)]
struct IndexEntry {
    chunk: Chunk,
    embedding: Vec<f32>,
}

/// In-memory snapshot of a persisted index.
#[derive(Debug)]
pub struct SqliteVectorIndex {
    persist_dir: PathBuf,
    info: Option<IndexInfo>,
    entries: Vec<IndexEntry>,
}

fn sql_err(context: &'static str) -> impl Fn(rusqlite::Error) -> AppError {
    move |e| AppError::Index(format!("{}: {}", context, e))
}

impl SqliteVectorIndex {
    /// Write a new index, atomically replacing any existing one.
    ///
    /// `embeddings[i]` belongs to `chunks[i]`. On error the previous index is
    /// left untouched.
    pub fn build(
        persist_dir: &Path,
        embedding: &EmbeddingConfig,
        chunks: &[Chunk],
        embeddings: &[Vec<f32>],
    ) -> AppResult<IndexInfo> {
        if chunks.len() != embeddings.len() {
            return Err(AppError::Index(format!(
                "Got {} embeddings for {} chunks",
                embeddings.len(),
                chunks.len()
            )));
        }
        if let Some(bad) = embeddings.iter().find(|e| e.len() != embedding.dimensions) {
            return Err(AppError::Index(format!(
                "Embedding has {} dimensions, index expects {}",
                bad.len(),
                embedding.dimensions
            )));
        }

        fs::create_dir_all(persist_dir).map_err(|e| {
            AppError::Index(format!(
                "Failed to create index directory {}: {}",
                persist_dir.display(),
                e
            ))
        })?;

        let document_count = chunks
            .iter()
            .map(|c| c.metadata.source_name.as_str())
            .collect::<HashSet<_>>()
            .len() as u32;

        let info = IndexInfo {
            embedding: embedding.clone(),
            built_at: Utc::now(),
            document_count,
            chunk_count: chunks.len() as u32,
        };

        let staging = get_staging_path(persist_dir);
        let written = write_database(&staging, &info, chunks, embeddings).and_then(|_| {
            fs::rename(&staging, get_index_path(persist_dir))
                .map_err(|e| AppError::Index(format!("Failed to replace index: {}", e)))
        });

        if let Err(e) = written {
            if staging.exists() {
                if let Err(cleanup) = fs::remove_file(&staging) {
                    tracing::warn!("Failed to remove {}: {}", staging.display(), cleanup);
                }
            }
            return Err(e);
        }

        tracing::info!(
            "Wrote index with {} chunks from {} documents to {}",
            info.chunk_count,
            info.document_count,
            persist_dir.display()
        );

        Ok(info)
    }

    /// Load the index persisted in `persist_dir`.
    ///
    /// Fails with [`AppError::NotIngested`] when the directory does not exist.
    /// A directory without an index file yields an empty index.
    pub fn open(persist_dir: &Path) -> AppResult<Self> {
        if !persist_dir.is_dir() {
            return Err(AppError::NotIngested {
                path: persist_dir.to_path_buf(),
            });
        }

        let path = get_index_path(persist_dir);
        if !path.exists() {
            tracing::debug!("No index file in {}, starting empty", persist_dir.display());
            return Ok(Self {
                persist_dir: persist_dir.to_path_buf(),
                info: None,
                entries: Vec::new(),
            });
        }

        let conn = Connection::open_with_flags(&path, OpenFlags::SQLITE_OPEN_READ_ONLY)
            .map_err(sql_err("Failed to open index"))?;

        let info = read_info(&conn)?;
        let entries = read_entries(&conn, info.embedding.dimensions)?;

        tracing::debug!(
            "Loaded {} chunks from {} (model: {})",
            entries.len(),
            path.display(),
            info.embedding.identifier()
        );

        Ok(Self {
            persist_dir: persist_dir.to_path_buf(),
            info: Some(info),
            entries,
        })
    }

    pub fn persist_dir(&self) -> &Path {
        &self.persist_dir
    }

    pub fn info(&self) -> Option<&IndexInfo> {
        self.info.as_ref()
    }

    pub fn stats(&self) -> IndexStats {
        let db_size_bytes = fs::metadata(get_index_path(&self.persist_dir))
            .map(|m| m.len())
            .unwrap_or(0);

        IndexStats {
            persist_dir: self.persist_dir.clone(),
            documents_count: self.info.as_ref().map_or(0, |i| i.document_count),
            chunks_count: self.entries.len() as u32,
            model: self.info.as_ref().map(|i| i.embedding.identifier()),
            dimensions: self.info.as_ref().map(|i| i.embedding.dimensions),
            built_at: self.info.as_ref().map(|i| i.built_at),
            db_size_bytes,
        }
    }
}

impl VectorIndex for SqliteVectorIndex {
    fn search(&self, query_embedding: &[f32], top_k: usize) -> AppResult<Vec<SearchHit>> {
        if top_k == 0 || self.entries.is_empty() {
            return Ok(Vec::new());
        }

        if let Some(info) = &self.info {
            if query_embedding.len() != info.embedding.dimensions {
                return Err(AppError::Embedding(format!(
                    "Query embedding has {} dimensions, index expects {}",
                    query_embedding.len(),
                    info.embedding.dimensions
                )));
            }
        }

        let mut scored: Vec<(usize, f32)> = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, entry)| (i, 1.0 - cosine_similarity(query_embedding, &entry.embedding)))
            .collect();

        // Stable: equal distances stay in ingestion order.
        scored.sort_by(|a, b| a.1.total_cmp(&b.1));
        scored.truncate(top_k);

        Ok(scored
            .into_iter()
            .map(|(i, distance)| SearchHit {
                chunk: self.entries[i].chunk.clone(),
                distance,
            })
            .collect())
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn embedding_config(&self) -> Option<&EmbeddingConfig> {
        self.info.as_ref().map(|i| &i.embedding)
    }
}

fn write_database(
    path: &Path,
    info: &IndexInfo,
    chunks: &[Chunk],
    embeddings: &[Vec<f32>],
) -> AppResult<()> {
    let mut conn = Connection::open(path).map_err(sql_err("Failed to create index"))?;
    conn.execute_batch(SCHEMA)
        .map_err(sql_err("Failed to create tables"))?;

    let tx = conn
        .transaction()
        .map_err(sql_err("Failed to begin transaction"))?;
    {
        let mut info_stmt = tx
            .prepare("INSERT INTO index_info (key, value) VALUES (?1, ?2)")
            .map_err(sql_err("Failed to prepare insert"))?;
        let pairs = [
            ("model", info.embedding.identifier()),
            ("provider", info.embedding.provider.clone()),
            ("dimensions", info.embedding.dimensions.to_string()),
            ("built_at", info.built_at.to_rfc3339()),
            ("document_count", info.document_count.to_string()),
            ("chunk_count", info.chunk_count.to_string()),
        ];
        for (key, value) in pairs {
            info_stmt
                .execute(params![key, value])
                .map_err(sql_err("Failed to write index info"))?;
        }

        let mut chunk_stmt = tx
            .prepare(
                "INSERT INTO chunks (id, source_name, position, content, embedding, metadata)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )
            .map_err(sql_err("Failed to prepare insert"))?;
        for (id, (chunk, embedding)) in chunks.iter().zip(embeddings).enumerate() {
            let metadata = serde_json::to_string(&chunk.metadata)?;
            chunk_stmt
                .execute(params![
                    id as i64,
                    chunk.metadata.source_name,
                    chunk.metadata.position,
                    chunk.content,
                    embedding_to_bytes(embedding),
                    metadata,
                ])
                .map_err(sql_err("Failed to insert chunk"))?;
        }
    }
    tx.commit().map_err(sql_err("Failed to commit index"))?;

    Ok(())
}

fn read_info(conn: &Connection) -> AppResult<IndexInfo> {
    let mut stmt = conn
        .prepare("SELECT key, value FROM index_info")
        .map_err(sql_err("Failed to read index info"))?;
    let values = stmt
        .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))
        .map_err(sql_err("Failed to read index info"))?
        .collect::<Result<HashMap<String, String>, _>>()
        .map_err(sql_err("Failed to read index info"))?;

    let get = |key: &str| {
        values
            .get(key)
            .map(String::as_str)
            .ok_or_else(|| AppError::Index(format!("Index is missing '{}'", key)))
    };
    let parse_count = |key: &str| -> AppResult<u32> {
        get(key)?
            .parse()
            .map_err(|_| AppError::Index(format!("Index has an invalid '{}'", key)))
    };

    let embedding = EmbeddingConfig::for_model(get("model")?)?;
    let dimensions: usize = get("dimensions")?
        .parse()
        .map_err(|_| AppError::Index("Index has invalid dimensions".to_string()))?;
    if dimensions != embedding.dimensions {
        return Err(AppError::Index(format!(
            "Index records {} dimensions but model '{}' has {}",
            dimensions,
            embedding.identifier(),
            embedding.dimensions
        )));
    }

    let built_at = DateTime::parse_from_rfc3339(get("built_at")?)
        .map_err(|e| AppError::Index(format!("Index has an invalid build time: {}", e)))?
        .with_timezone(&Utc);

    Ok(IndexInfo {
        embedding,
        built_at,
        document_count: parse_count("document_count")?,
        chunk_count: parse_count("chunk_count")?,
    })
}

fn read_entries(conn: &Connection, dimensions: usize) -> AppResult<Vec<IndexEntry>> {
    let mut stmt = conn
        .prepare("SELECT content, embedding, metadata FROM chunks ORDER BY id")
        .map_err(sql_err("Failed to read chunks"))?;
    let rows = stmt
        .query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, Vec<u8>>(1)?,
                row.get::<_, String>(2)?,
            ))
        })
        .map_err(sql_err("Failed to read chunks"))?;

    let mut entries = Vec::new();
    for row in rows {
        let (content, blob, metadata) = row.map_err(sql_err("Failed to read chunk"))?;
        let embedding = bytes_to_embedding(&blob)?;
        if embedding.len() != dimensions {
            return Err(AppError::Index(format!(
                "Stored embedding has {} dimensions, expected {}",
                embedding.len(),
                dimensions
            )));
        }
        let metadata: ChunkMetadata = serde_json::from_str(&metadata)?;
        entries.push(IndexEntry {
            chunk: Chunk { content, metadata },
            embedding,
        });
    }

    Ok(entries)
}

/// Convert embedding vector to little-endian bytes for storage.
fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
    embedding.iter().flat_map(|v| v.to_le_bytes()).collect()
}

/// Convert bytes back to embedding vector.
fn bytes_to_embedding(bytes: &[u8]) -> AppResult<Vec<f32>> {
    if bytes.len() % 4 != 0 {
        return Err(AppError::Index(
            "Invalid embedding bytes length".to_string(),
        ));
    }

    Ok(bytes
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect())
}

/// Cosine similarity; zero when either vector has no magnitude.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}
