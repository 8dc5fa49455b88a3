//! Build → save → reload → lookup against real artifact files.

mod common;

use std::sync::Arc;

use common::*;
use gramdex::index::{normalize, Vocabulary};
use gramdex::{discard_order, CacheKey, Error, LookupCache};

#[test]
fn reloaded_engine_answers_like_built_one() {
    let t = TestDir::new(4);
    let built = t.open(&STORIES);
    let reloaded = t.reopen();

    assert_eq!(built.stats(), reloaded.stats());
    assert_eq!(reloaded.doc_count(), STORIES.len() as u32);

    for query in [
        "the quick brown fox",
        "lazy dog",
        "the dog",
        "fox the",
        "quick",
        "the cat",
        "sun",
        "nothing here",
        "",
    ] {
        assert_eq!(
            built.lookup(query).unwrap(),
            reloaded.lookup(query).unwrap(),
            "{}",
            query
        );
    }
    assert_eq!(
        reloaded.lookup("the quick brown fox").unwrap().matches,
        vec![0, 5]
    );
    assert_eq!(reloaded.lookup("lazy dog").unwrap().matches, vec![0, 1]);
}

#[test]
fn every_document_ngram_is_found() {
    let t = TestDir::new(3);
    t.open(&STORIES);
    let lookup = t.reopen();

    for (doc, text) in STORIES.iter().enumerate() {
        let words = normalize(text);
        for n in 1..=3 {
            for window in words.windows(n) {
                let result = lookup.lookup_words(window).unwrap();
                assert_eq!(result.case, LookupCase::MatchFound, "{:?}", window);
                assert!(result.matches.contains(&(doc as u32)), "{:?}", window);
            }
        }
    }
}

#[test]
fn vocabulary_file_round_trips() {
    let t = TestDir::new(2);
    let built = t.open(&STORIES);
    let loaded = Vocabulary::load(&t.config.vocab_file()).unwrap();

    assert_eq!(loaded.size(), built.vocabulary().size());
    for (id, word, freq) in built.vocabulary().iter() {
        assert_eq!(loaded.id_of(word), id);
        assert_eq!(loaded.word_of(id), word);
        assert_eq!(loaded.frequency(id), freq);
    }
}

#[test]
fn rebuild_is_byte_identical() {
    let first = TestDir::new(3);
    first.open(&STORIES);
    let second = TestDir::new(3);
    second.open(&STORIES);

    for n in 1..=3 {
        assert_eq!(first.artifact_bytes(n), second.artifact_bytes(n), "order {}", n);
    }
    assert_eq!(
        std::fs::read(first.config.vocab_file()).unwrap(),
        std::fs::read(second.config.vocab_file()).unwrap()
    );
}

#[test]
fn parallel_and_sequential_builds_agree() {
    let parallel = NgramLookup::build(&STORIES, OrderRange::new(1, 4).unwrap(), None, true).unwrap();
    let sequential =
        NgramLookup::build(&STORIES, OrderRange::new(1, 4).unwrap(), None, false).unwrap();
    assert_eq!(parallel.stats(), sequential.stats());
    assert_eq!(
        parallel.lookup("the dog").unwrap(),
        sequential.lookup("the dog").unwrap()
    );
}

#[test]
fn capped_build_persists_capped_vocabulary() {
    let dir = tempfile::TempDir::new().unwrap();
    let config = NgramConfig {
        max_order: 2,
        max_vocab_size: 5,
        ..NgramConfig::default()
    }
    .resolve_paths(dir.path());

    let built = NgramLookup::open(&config, Some(&STORIES[..])).unwrap();
    assert_eq!(built.vocabulary().size(), 5);

    let reloaded = NgramLookup::open::<&str>(&config, None).unwrap();
    assert_eq!(reloaded.vocabulary().size(), 5);
    assert_eq!(reloaded.vocabulary().word_of(0), gramdex::UNKNOWN_WORD);
    assert_eq!(built.stats(), reloaded.stats());
}

#[test]
fn corrupted_index_is_rejected() {
    let t = TestDir::new(2);
    t.open(&CAT_DOG);

    let path = t.config.ngram_template().unwrap().path_for(2);
    let mut bytes = std::fs::read(&path).unwrap();
    bytes.truncate(bytes.len() - 1);
    std::fs::write(&path, &bytes).unwrap();

    let err = NgramLookup::open::<&str>(&t.config, None).unwrap_err();
    assert!(matches!(err, Error::Corruption(_)), "{:?}", err);
    assert!(!err.is_configuration());
}

#[test]
fn discarded_order_rebuilt_from_corpus() {
    let t = TestDir::new(3);
    t.open(&CAT_DOG);
    let before = t.artifact_bytes(2);

    assert!(discard_order(&t.config, 2).unwrap());
    assert!(matches!(
        NgramLookup::open::<&str>(&t.config, None),
        Err(Error::MissingArtifact { .. })
    ));

    t.open(&CAT_DOG);
    assert_eq!(t.artifact_bytes(2), before);
}

#[test]
fn rebuilt_vocabulary_replaces_stale_indices() {
    let t = TestDir::new(2);
    t.open(&CAT_DOG);
    std::fs::remove_file(t.config.vocab_file()).unwrap();

    // Same words, same vocabulary size, different documents.
    let other = ["the the the", "cat", "sat", "dog", "ran"];
    let lookup = t.open(&other);
    assert_eq!(lookup.doc_count(), 5);
    assert_eq!(
        lookup.lookup("the cat").unwrap().case,
        LookupCase::MatchNotFound
    );
    assert_eq!(lookup.lookup("cat").unwrap().matches, vec![1]);

    let reloaded = t.reopen();
    assert_eq!(
        reloaded.lookup("the cat").unwrap().case,
        LookupCase::MatchNotFound
    );
    assert_eq!(reloaded.lookup("the the").unwrap().matches, vec![0]);
}

#[test]
fn index_from_other_vocabulary_is_rejected() {
    let t = TestDir::new(2);
    let built = t.open(&CAT_DOG);

    // Same size, different id assignment.
    let swapped = Vocabulary::build_from_corpus(&["ran dog sat cat the"], false);
    assert_eq!(swapped.size(), built.vocabulary().size());
    swapped.save(&t.config.vocab_file()).unwrap();

    let err = NgramLookup::open::<&str>(&t.config, None).unwrap_err();
    assert!(matches!(err, Error::VocabularyMismatch { .. }), "{:?}", err);
}

#[test]
fn uncapped_large_vocabulary_indexes_fourgrams() {
    let t = TestDir::new(4);
    assert_eq!(t.config.vocab_cap(), None);
    t.config.validate().unwrap();

    let words: Vec<String> = (0..10_001).map(|i| format!("w{}", i)).collect();
    let doc = words.join(" ");
    let built = t.open(&[doc.as_str()]);
    assert_eq!(built.vocabulary().size(), 10_002);
    assert_eq!(
        built.lookup("w9997 w9998 w9999 w10000").unwrap().matches,
        vec![0]
    );
    assert_eq!(
        built.lookup("w1 w0").unwrap().case,
        LookupCase::MatchNotFound
    );

    let reloaded = t.reopen();
    assert_eq!(reloaded.lookup("w0 w1 w2 w3").unwrap().matches, vec![0]);
    assert_eq!(reloaded.stats(), built.stats());
}

#[test]
fn load_only_serves_existing_artifacts() {
    let t = TestDir::new(2);
    t.open(&CAT_DOG);

    let config = NgramConfig {
        load_only: true,
        ..t.config.clone()
    };
    let lookup = NgramLookup::open::<&str>(&config, None).unwrap();
    assert_eq!(lookup.lookup("dog ran").unwrap().matches, vec![1]);
}

#[test]
fn config_file_drives_open() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join(gramdex::CONFIG_FILE_NAME);
    std::fs::write(
        &path,
        "min_order = 2\nmax_order = 3\nngram_path = \"idx/grams_%d.ngx\"\n",
    )
    .unwrap();

    let config = NgramConfig::from_file(&path).unwrap().resolve_paths(dir.path());
    let lookup = NgramLookup::open(&config, Some(&CAT_DOG[..])).unwrap();
    assert!(dir.path().join("idx/grams_2.ngx").exists());
    assert!(dir.path().join("idx/grams_3.ngx").exists());
    assert!(!dir.path().join("idx/grams_1.ngx").exists());

    assert!(matches!(
        lookup.lookup("dog"),
        Err(Error::OrderNotBuilt { order: 1, min: 2, max: 3 })
    ));
    assert_eq!(lookup.lookup("the dog ran").unwrap().matches, vec![1]);
}

#[test]
fn cache_shares_engines_across_threads() {
    let t = TestDir::new(2);
    // Build once so the threads only load.
    t.open(&CAT_DOG);
    let cache = Arc::new(LookupCache::new());

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let cache = Arc::clone(&cache);
            let config = t.config.clone();
            std::thread::spawn(move || {
                let lookup = cache.get_or_open(&config, Some(&CAT_DOG[..])).unwrap();
                lookup.lookup("the cat").unwrap().matches
            })
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap(), vec![0]);
    }

    assert_eq!(cache.len(), 1);
    let key = CacheKey::new(&t.config, Some(&CAT_DOG[..]));
    assert!(cache.get(&key).is_some());
}
