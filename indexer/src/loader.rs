use anyhow::{Context, Result};
use kwsearch_core::Document;
use serde::Deserialize;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Shapes accepted for a `.json` input file.
#[derive(Deserialize)]
#[serde(untagged)]
enum JsonInput {
    List(Vec<Document>),
    Wrapped {
        #[serde(alias = "movies")]
        documents: Vec<Document>,
    },
    Single(Document),
}

/// Collect documents from a `.json`/`.jsonl` file or a directory of them.
/// Files are read in path order so ids keep a stable build order.
pub fn load_documents(input: &Path) -> Result<Vec<Document>> {
    let mut files: Vec<PathBuf> = Vec::new();
    if input.is_dir() {
        for entry in WalkDir::new(input).sort_by_file_name().into_iter().filter_map(|e| e.ok()) {
            let p = entry.path();
            if p.is_file() && matches!(extension(p), Some("json" | "jsonl")) {
                files.push(p.to_path_buf());
            }
        }
    } else if input.is_file() {
        files.push(input.to_path_buf());
    } else {
        anyhow::bail!("input path {} does not exist", input.display());
    }

    let mut docs = Vec::new();
    for file in files {
        let before = docs.len();
        if extension(&file) == Some("jsonl") {
            read_jsonl(&file, &mut docs)?;
        } else {
            read_json(&file, &mut docs)?;
        }
        tracing::debug!(file = %file.display(), count = docs.len() - before, "read documents");
    }
    Ok(docs)
}

fn extension(p: &Path) -> Option<&str> {
    p.extension().and_then(|s| s.to_str())
}

fn read_jsonl(file: &Path, docs: &mut Vec<Document>) -> Result<()> {
    let f = File::open(file).with_context(|| format!("opening {}", file.display()))?;
    for (lineno, line) in BufReader::new(f).lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() { continue; }
        let doc: Document = serde_json::from_str(&line)
            .with_context(|| format!("{}:{}: invalid document", file.display(), lineno + 1))?;
        docs.push(doc);
    }
    Ok(())
}

fn read_json(file: &Path, docs: &mut Vec<Document>) -> Result<()> {
    let f = File::open(file).with_context(|| format!("opening {}", file.display()))?;
    let input: JsonInput = serde_json::from_reader(BufReader::new(f))
        .with_context(|| format!("{}: expected a document, a list of documents, or {{\"documents\": [...]}}", file.display()))?;
    match input {
        JsonInput::List(list) | JsonInput::Wrapped { documents: list } => docs.extend(list),
        JsonInput::Single(doc) => docs.push(doc),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn reads_wrapped_movie_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("movies.json");
        fs::write(&path, r#"{"movies": [{"id": 1, "title": "Heat", "description": "Heist"}]}"#).unwrap();
        let docs = load_documents(&path).unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].body, "Heist");
    }

    #[test]
    fn walks_directories_in_name_order() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("b.jsonl"), "{\"id\": 2, \"title\": \"B\", \"body\": \"\"}\n\n").unwrap();
        fs::write(dir.path().join("a.json"), r#"[{"id": 1, "title": "A", "body": "x"}]"#).unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();
        let ids: Vec<u32> = load_documents(dir.path()).unwrap().iter().map(|d| d.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn missing_input_is_an_error() {
        let dir = tempdir().unwrap();
        assert!(load_documents(&dir.path().join("absent.json")).is_err());
    }
}
