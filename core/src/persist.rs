use crate::error::{Artifact, IndexError, Result};
use crate::index::{DocLengths, DocMap, InvertedIndex, Postings, TermFrequencies};
use crate::tokenizer::Normalizer;
use bincode::Options;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs::{create_dir_all, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetaFile {
    pub num_docs: u32,
    pub num_terms: u32,
    pub created_at: String,
    pub version: u32,
}

#[derive(Debug, Clone)]
pub struct IndexPaths {
    pub root: PathBuf,
}

impl IndexPaths {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }
    pub fn index(&self) -> PathBuf { self.root.join("index.bin") }
    pub fn docmap(&self) -> PathBuf { self.root.join("docmap.json") }
    pub fn term_frequencies(&self) -> PathBuf { self.root.join("term_frequencies.bin") }
    pub fn doc_lengths(&self) -> PathBuf { self.root.join("doc_lengths.bin") }
    pub fn meta(&self) -> PathBuf { self.root.join("meta.json") }
}

fn read_file(artifact: Artifact, path: &Path) -> Result<Vec<u8>> {
    let mut f = File::open(path).map_err(|e| IndexError::persistence(artifact, path, e))?;
    let mut buf = Vec::new();
    f.read_to_end(&mut buf).map_err(|e| IndexError::persistence(artifact, path, e))?;
    tracing::debug!(%artifact, bytes = buf.len(), "read artifact");
    Ok(buf)
}

fn write_file(artifact: Artifact, path: &Path, bytes: &[u8]) -> Result<()> {
    let mut f = File::create(path).map_err(|e| IndexError::persistence(artifact, path, e))?;
    f.write_all(bytes).map_err(|e| IndexError::persistence(artifact, path, e))?;
    tracing::debug!(%artifact, bytes = bytes.len(), "wrote artifact");
    Ok(())
}

/// Fixed-width integers like `bincode::serialize`, but a table followed by
/// stray bytes is a decode error rather than a silent success.
fn bincode_options() -> impl Options {
    bincode::DefaultOptions::new().with_fixint_encoding().reject_trailing_bytes()
}

fn save_bincode<T: Serialize>(artifact: Artifact, path: &Path, value: &T) -> Result<()> {
    let bytes = bincode_options().serialize(value).map_err(|e| IndexError::persistence(artifact, path, e))?;
    write_file(artifact, path, &bytes)
}

fn load_bincode<T: DeserializeOwned>(artifact: Artifact, path: &Path) -> Result<T> {
    let buf = read_file(artifact, path)?;
    bincode_options().deserialize(&buf).map_err(|e| IndexError::persistence(artifact, path, e))
}

fn save_json<T: Serialize>(artifact: Artifact, path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_vec_pretty(value).map_err(|e| IndexError::persistence(artifact, path, e))?;
    write_file(artifact, path, &json)
}

fn load_json<T: DeserializeOwned>(artifact: Artifact, path: &Path) -> Result<T> {
    let buf = read_file(artifact, path)?;
    serde_json::from_slice(&buf).map_err(|e| IndexError::persistence(artifact, path, e))
}

pub fn save_postings(paths: &IndexPaths, postings: &Postings) -> Result<()> {
    save_bincode(Artifact::Index, &paths.index(), postings)
}

pub fn load_postings(paths: &IndexPaths) -> Result<Postings> {
    load_bincode(Artifact::Index, &paths.index())
}

pub fn save_docmap(paths: &IndexPaths, docs: &DocMap) -> Result<()> {
    save_json(Artifact::DocMap, &paths.docmap(), docs)
}

pub fn load_docmap(paths: &IndexPaths) -> Result<DocMap> {
    load_json(Artifact::DocMap, &paths.docmap())
}

pub fn save_term_frequencies(paths: &IndexPaths, tf: &TermFrequencies) -> Result<()> {
    save_bincode(Artifact::TermFrequencies, &paths.term_frequencies(), tf)
}

pub fn load_term_frequencies(paths: &IndexPaths) -> Result<TermFrequencies> {
    load_bincode(Artifact::TermFrequencies, &paths.term_frequencies())
}

pub fn save_doc_lengths(paths: &IndexPaths, lengths: &DocLengths) -> Result<()> {
    save_bincode(Artifact::DocLengths, &paths.doc_lengths(), lengths)
}

pub fn load_doc_lengths(paths: &IndexPaths) -> Result<DocLengths> {
    load_bincode(Artifact::DocLengths, &paths.doc_lengths())
}

pub fn save_meta(paths: &IndexPaths, meta: &MetaFile) -> Result<()> {
    save_json(Artifact::Meta, &paths.meta(), meta)
}

pub fn load_meta(paths: &IndexPaths) -> Result<MetaFile> {
    load_json(Artifact::Meta, &paths.meta())
}

/// Write all four tables plus `meta.json`, creating the cache directory if needed.
pub fn save_index(paths: &IndexPaths, index: &InvertedIndex) -> Result<()> {
    index.ensure_ready()?;
    create_dir_all(&paths.root).map_err(|e| IndexError::persistence(Artifact::Directory, &paths.root, e))?;
    save_postings(paths, index.postings())?;
    save_docmap(paths, index.docs())?;
    save_term_frequencies(paths, index.term_frequencies())?;
    save_doc_lengths(paths, index.doc_lengths())?;

    let meta = MetaFile {
        num_docs: index.num_documents() as u32,
        num_terms: index.num_terms() as u32,
        created_at: time::OffsetDateTime::now_utc()
            .format(&time::format_description::well_known::Rfc3339)
            .unwrap_or_default(),
        version: FORMAT_VERSION,
    };
    save_meta(paths, &meta)?;
    tracing::info!(root = %paths.root.display(), num_docs = meta.num_docs, "index saved");
    Ok(())
}

/// Load the four tables and reassemble a ready index. Every table must be
/// present and decodable; `meta.json` is not required.
pub fn load_index(paths: &IndexPaths, normalizer: Arc<Normalizer>) -> Result<InvertedIndex> {
    let postings = load_postings(paths)?;
    let docs = load_docmap(paths)?;
    let term_frequencies = load_term_frequencies(paths)?;
    let doc_lengths = load_doc_lengths(paths)?;
    if !paths.meta().exists() {
        tracing::warn!(root = %paths.root.display(), "meta.json missing from cache");
    }
    let index = InvertedIndex::from_parts(normalizer, postings, docs, term_frequencies, doc_lengths)?;
    tracing::info!(root = %paths.root.display(), num_docs = index.num_documents(), "index loaded");
    Ok(index)
}
