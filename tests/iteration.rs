use anyhow::Result;
use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;

use BurrowDB::db::{Db, StoreFlag};

#[test]
fn empty_db_has_no_first_key() -> Result<()> {
    let root = unique_root("iter-empty");
    fs::create_dir_all(&root)?;
    let mut db = Db::open(root.join("db"))?;
    assert!(db.first_key()?.is_none());
    assert!(db.next_key()?.is_none());
    Ok(())
}

#[test]
fn first_key_is_idempotent() -> Result<()> {
    let root = unique_root("iter-first");
    fs::create_dir_all(&root)?;
    let mut db = Db::open(root.join("db"))?;

    for i in 1..=10 {
        let k = format!("key{i}");
        let v = format!("val{i}");
        db.store(k.as_bytes(), v.as_bytes(), StoreFlag::Replace)?;
    }

    // 10 маленьких пар живут на странице 0 в порядке вставки
    assert_eq!(db.first_key()?.as_deref(), Some(&b"key1"[..]));
    assert_eq!(db.next_key()?.as_deref(), Some(&b"key2"[..]));
    // повторный first_key сбрасывает курсор
    assert_eq!(db.first_key()?.as_deref(), Some(&b"key1"[..]));
    Ok(())
}

#[test]
fn enumerates_every_key_exactly_once() -> Result<()> {
    let root = unique_root("iter-all");
    fs::create_dir_all(&root)?;
    let mut db = Db::open(root.join("db"))?;

    let mut expect = HashSet::new();
    for i in 0..400u32 {
        let k = format!("key-{i:04}");
        db.store(k.as_bytes(), format!("v{i}").as_bytes(), StoreFlag::Replace)?;
        expect.insert(k.into_bytes());
    }

    // статичный обход: каждый ключ ровно один раз, затем конец
    let mut seen = Vec::new();
    let mut cur = db.first_key()?;
    while let Some(k) = cur {
        seen.push(k);
        cur = db.next_key()?;
    }
    assert_eq!(seen.len(), expect.len(), "no duplicates and no losses");
    let seen_set: HashSet<Vec<u8>> = seen.into_iter().collect();
    assert_eq!(seen_set, expect);
    Ok(())
}

#[test]
fn keys_iterator_matches_two_call_protocol() -> Result<()> {
    let root = unique_root("iter-keys");
    fs::create_dir_all(&root)?;
    let mut db = Db::open(root.join("db"))?;

    for i in 0..50u32 {
        db.store(format!("k{i}").as_bytes(), b"v", StoreFlag::Replace)?;
    }

    let manual = {
        let mut acc = Vec::new();
        let mut cur = db.first_key()?;
        while let Some(k) = cur {
            acc.push(k);
            cur = db.next_key()?;
        }
        acc
    };

    let iterated: Vec<Vec<u8>> = db.keys().collect::<BurrowDB::Result<_>>()?;
    assert_eq!(manual, iterated);
    Ok(())
}

#[test]
fn iteration_survives_interleaved_fetch() -> Result<()> {
    let root = unique_root("iter-fetch");
    fs::create_dir_all(&root)?;
    let mut db = Db::open(root.join("db"))?;

    let mut expect = HashSet::new();
    for i in 0..300u32 {
        let k = format!("key-{i:04}");
        db.store(k.as_bytes(), format!("val-{i}").as_bytes(), StoreFlag::Replace)?;
        expect.insert(k.into_bytes());
    }

    // точечные чтения между next_key сбивают позицию файла; курсор
    // обязан восстановиться seek'ом
    let mut seen = HashSet::new();
    let mut cur = db.first_key()?;
    while let Some(k) = cur {
        let v = db.fetch(&k)?;
        assert!(v.is_some(), "iterated key must fetch");
        seen.insert(k);
        cur = db.next_key()?;
    }
    assert_eq!(seen, expect);
    Ok(())
}

fn unique_root(prefix: &str) -> PathBuf {
    let pid = std::process::id();
    let t = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("bdb-{}-{}-{}", prefix, pid, t))
}
