mod loader;

use anyhow::Result;
use clap::{Parser, Subcommand};
use kwsearch_core::persist::{load_index, load_meta, save_index, IndexPaths};
use kwsearch_core::{Bm25Params, DocId, InvertedIndex, Normalizer, NormalizerConfig, Scoring, SearchOptions, DEFAULT_SEARCH_LIMIT};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "kwsearch")]
#[command(about = "Build a keyword index over a document set and query it with BM25", long_about = None)]
struct Cli {
    /// Cache directory holding the saved index [env: KWSEARCH_CACHE_DIR, default: ./cache]
    #[arg(long, global = true)]
    cache_dir: Option<String>,
    /// Stopword file, one word per line [env: KWSEARCH_STOPWORDS]
    #[arg(long, global = true)]
    stopwords: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the index from a JSON/JSONL file or directory and save it
    Build {
        #[arg(long)]
        input: String,
    },
    /// Search the saved index
    Search {
        query: String,
        #[arg(long, default_value_t = DEFAULT_SEARCH_LIMIT)]
        limit: usize,
        /// Weight terms by plain IDF instead of BM25 IDF
        #[arg(long, default_value_t = false)]
        legacy_idf: bool,
    },
    /// List the ids of documents containing a term
    Documents { term: String },
    /// Raw term frequency of a term in a document
    Tf { doc_id: DocId, term: String },
    /// Inverse document frequency of a term
    Idf { term: String },
    /// Term frequency times inverse document frequency
    Tfidf { doc_id: DocId, term: String },
    /// BM25 inverse document frequency of a term
    Bm25idf { term: String },
    /// BM25 saturated term frequency of a term in a document
    Bm25tf {
        doc_id: DocId,
        term: String,
        #[arg(long)]
        k1: Option<f64>,
        #[arg(long)]
        b: Option<f64>,
    },
    /// Show what the saved index contains
    Info,
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    let cache_dir = cli
        .cache_dir
        .or_else(|| std::env::var("KWSEARCH_CACHE_DIR").ok())
        .unwrap_or_else(|| "./cache".into());
    let paths = IndexPaths::new(&cache_dir);
    let normalizer = Arc::new(build_normalizer(cli.stopwords.or_else(|| std::env::var("KWSEARCH_STOPWORDS").ok()))?);

    match cli.command {
        Commands::Build { input } => build_index(Path::new(&input), &paths, normalizer),
        Commands::Search { query, limit, legacy_idf } => {
            let index = load_index(&paths, normalizer)?;
            let scoring = if legacy_idf { Scoring::LegacyIdf } else { Scoring::Bm25 };
            let options = SearchOptions { limit, scoring, ..SearchOptions::default() };
            println!("Searching for: {query}");
            for (rank, hit) in index.search_with(&query, &options)?.iter().enumerate() {
                println!("{}. ({}) {} [{:.4}]", rank + 1, hit.doc_id, hit.document.title, hit.score);
            }
            Ok(())
        }
        Commands::Documents { term } => {
            let index = load_index(&paths, normalizer)?;
            let ids = index.documents_for(&term)?;
            println!("{}", ids.iter().map(|id| id.to_string()).collect::<Vec<_>>().join(" "));
            Ok(())
        }
        Commands::Tf { doc_id, term } => {
            let index = load_index(&paths, normalizer)?;
            println!("Term frequency of '{term}' in document '{doc_id}': {}", index.term_frequency(doc_id, &term)?);
            Ok(())
        }
        Commands::Idf { term } => {
            let index = load_index(&paths, normalizer)?;
            println!("Inverse document frequency of '{term}': {:.2}", index.idf(&term)?);
            Ok(())
        }
        Commands::Tfidf { doc_id, term } => {
            let index = load_index(&paths, normalizer)?;
            println!("TF-IDF score of '{term}' in document '{doc_id}': {:.2}", index.tf_idf(doc_id, &term)?);
            Ok(())
        }
        Commands::Bm25idf { term } => {
            let index = load_index(&paths, normalizer)?;
            println!("BM25 IDF score of '{term}': {:.2}", index.bm25_idf(&term)?);
            Ok(())
        }
        Commands::Bm25tf { doc_id, term, k1, b } => {
            let index = load_index(&paths, normalizer)?;
            let defaults = Bm25Params::default();
            let params = Bm25Params { k1: k1.unwrap_or(defaults.k1), b: b.unwrap_or(defaults.b) };
            println!("BM25 TF score of '{term}' in document '{doc_id}': {:.2}", index.bm25_term_score(doc_id, &term, params)?);
            Ok(())
        }
        Commands::Info => {
            let meta = load_meta(&paths)?;
            println!("{}", serde_json::to_string_pretty(&meta)?);
            Ok(())
        }
    }
}

fn build_normalizer(stopwords: Option<String>) -> Result<Normalizer> {
    let mut config = NormalizerConfig::default();
    if let Some(path) = stopwords {
        config = config.with_stopwords_file(PathBuf::from(path))?;
    }
    Ok(Normalizer::new(config))
}

fn build_index(input: &Path, paths: &IndexPaths, normalizer: Arc<Normalizer>) -> Result<()> {
    let docs = loader::load_documents(input)?;
    tracing::info!(num_docs = docs.len(), input = %input.display(), "ingested documents");
    let mut index = InvertedIndex::new(normalizer);
    index.build(docs)?;
    save_index(paths, &index)?;
    println!("Indexed {} documents into {}", index.num_documents(), paths.root.display());
    Ok(())
}
