use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::TempDir;

use docqa_core::chunker::Chunker;
use docqa_core::config::{expand_path, ChunkingConfig, Config, EmbeddingProvider};
use docqa_core::loader::DocumentLoader;
use docqa_core::Error;

#[test]
fn load_directory_single_small_file() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path();
    let mut f = fs::File::create(dir.join("a.txt")).unwrap();
    writeln!(f, "Short text").unwrap();

    let docs = DocumentLoader::new(["txt"]).load(dir).expect("load");

    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0].id, "a.txt");
    assert_eq!(docs[0].text.trim(), "Short text");
}

#[test]
fn load_walks_subdirectories_and_filters_extensions() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path();
    fs::create_dir_all(dir.join("rules/combat")).unwrap();
    fs::write(dir.join("rules/combat/initiative.md"), "Roll a d20.").unwrap();
    fs::write(dir.join("spells.txt"), "Fireball deals 8d6.").unwrap();
    fs::write(dir.join("map.png"), [0u8, 1, 2]).unwrap();

    let docs = DocumentLoader::new(["txt", "md"]).load(dir).expect("load");
    let ids: Vec<&str> = docs.iter().map(|d| d.id.as_str()).collect();

    assert_eq!(ids, vec!["rules/combat/initiative.md", "spells.txt"]);
}

#[test]
fn load_skips_undecodable_and_blank_files() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path();
    fs::write(dir.join("good.txt"), "readable").unwrap();
    fs::write(dir.join("bad.txt"), [0xff, 0xfe, 0xfd]).unwrap();
    fs::write(dir.join("blank.txt"), "   \n").unwrap();

    let docs = DocumentLoader::new(["txt"]).load(dir).expect("one bad file must not abort the batch");

    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0].id, "good.txt");
}

#[test]
fn load_missing_directory_is_a_load_error() {
    let tmp = TempDir::new().unwrap();
    let missing = tmp.path().join("nope");

    let err = DocumentLoader::default().load(&missing).unwrap_err();
    assert!(matches!(err, Error::Load(_)), "got {err:?}");
}

#[test]
fn load_file_instead_of_directory_is_a_load_error() {
    let tmp = TempDir::new().unwrap();
    let file = tmp.path().join("a.txt");
    fs::write(&file, "x").unwrap();

    let err = DocumentLoader::default().load(&file).unwrap_err();
    assert!(matches!(err, Error::Load(_)), "got {err:?}");
}

#[cfg(unix)]
#[test]
fn load_follows_symlinked_files_and_survives_loops() {
    use std::os::unix::fs::symlink;

    let tmp = TempDir::new().unwrap();
    let outside = tmp.path().join("outside");
    let dir = tmp.path().join("data");
    fs::create_dir_all(&outside).unwrap();
    fs::create_dir_all(dir.join("nested")).unwrap();
    fs::write(outside.join("shared.txt"), "Kept outside the tree.").unwrap();
    symlink(outside.join("shared.txt"), dir.join("linked.txt")).unwrap();
    symlink(&dir, dir.join("nested").join("loop")).unwrap();

    let docs = DocumentLoader::new(["txt"]).load(&dir).expect("a link loop must not abort the walk");

    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0].id, "linked.txt");
    assert_eq!(docs[0].text, "Kept outside the tree.");
}

#[cfg(target_os = "linux")]
#[test]
fn load_skips_files_with_non_utf8_names() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let tmp = TempDir::new().unwrap();
    let dir = tmp.path();
    fs::write(dir.join(OsStr::from_bytes(b"bad\xfe.txt")), "first").unwrap();
    fs::write(dir.join(OsStr::from_bytes(b"bad\xff.txt")), "second").unwrap();
    fs::write(dir.join("good.txt"), "readable").unwrap();

    let docs = DocumentLoader::new(["txt"]).load(dir).expect("load");
    let ids: Vec<&str> = docs.iter().map(|d| d.id.as_str()).collect();

    assert_eq!(ids, vec!["good.txt"]);
}

#[test]
fn chunked_document_has_stable_monotonic_indices() {
    let tmp = TempDir::new().unwrap();
    let text = (0..200).map(|i| format!("word{i}")).collect::<Vec<_>>().join(" ");
    fs::write(tmp.path().join("long.txt"), &text).unwrap();
    let docs = DocumentLoader::new(["txt"]).load(tmp.path()).unwrap();

    let chunker = Chunker::new(ChunkingConfig { max_chars: 120, overlap_chars: 30 }).unwrap();
    let first = chunker.chunk(&docs[0]);
    let second = chunker.chunk(&docs[0]);

    assert!(first.len() > 1);
    assert_eq!(first, second, "chunking is deterministic");
    for (i, p) in first.iter().enumerate() {
        assert_eq!(p.chunk_index, i);
        assert_eq!(p.total_chunks, first.len());
        assert_eq!(p.id, format!("long.txt:{i}"));
        assert_eq!(p.doc_id, "long.txt");
        assert!(!p.text.trim().is_empty());
        assert!(p.text.chars().count() <= 120);
    }
    // every word survives chunking
    for i in 0..200 {
        let w = format!("word{i}");
        assert!(first.iter().any(|p| p.text.split(' ').any(|t| t == w)), "{w} missing");
    }
}

#[test]
fn config_defaults_env_and_file_layering() {
    figment::Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
                [retrieval]
                top_k = 3

                [embedding]
                provider = "hash"
                dimension = 256
            "#,
        )?;
        jail.set_env("RUST_ENV", "test");
        jail.create_file("config.test.toml", "[chunking]\nmax_chars = 400\n")?;
        jail.set_env("APP_RETRIEVAL__MIN_SCORE", "0.5");

        let app = Config::load().map_err(|e| e.to_string())?.app().map_err(|e| e.to_string())?;
        assert_eq!(app.retrieval.top_k, 3);
        assert!((app.retrieval.min_score - 0.5).abs() < f32::EPSILON);
        assert_eq!(app.embedding.provider, EmbeddingProvider::Hash);
        assert_eq!(app.embedding.dimension, 256);
        assert_eq!(app.chunking.max_chars, 400);
        assert_eq!(app.chunking.overlap_chars, 200, "untouched keys keep defaults");
        assert_eq!(app.data.index_dir, "./storage");
        Ok(())
    });
}

#[test]
fn config_rejects_zero_top_k() {
    figment::Jail::expect_with(|jail| {
        jail.create_file("config.toml", "[retrieval]\ntop_k = 0\n")?;
        let config = Config::load().map_err(|e| e.to_string())?;
        match config.app() {
            Err(Error::InvalidConfig(msg)) => assert!(msg.contains("top_k")),
            other => panic!("expected InvalidConfig, got {other:?}"),
        }
        Ok(())
    });
}

#[test]
fn configured_paths_expand_variables() {
    figment::Jail::expect_with(|jail| {
        jail.set_env("DOCQA_ROOT", "/srv/docqa");
        assert_eq!(expand_path("${DOCQA_ROOT}/storage"), Path::new("/srv/docqa/storage"));
        assert_eq!(expand_path("plain/dir"), Path::new("plain/dir"));
        Ok(())
    });
}
