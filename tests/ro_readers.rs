use anyhow::Result;
use std::fs;
use std::path::PathBuf;

use BurrowDB::db::{Db, OpenMode, StoreFlag};
use BurrowDB::error::Error;

#[test]
fn readonly_handle_rejects_mutations() -> Result<()> {
    let root = unique_root("ro");
    fs::create_dir_all(&root)?;
    let prefix = root.join("db");

    {
        let mut db = Db::open(&prefix)?;
        for i in 0..200u32 {
            let k = format!("key{i}");
            db.store(k.as_bytes(), b"value-bytes", StoreFlag::Replace)?;
        }
        db.close()?;
    }

    // снимок байтов до RO-сессии
    let pag_before = fs::read(root.join("db.pag"))?;
    let dir_before = fs::read(root.join("db.dir"))?;

    {
        let mut db = Db::open_ro(&prefix)?;
        assert!(db.readonly());

        assert_eq!(db.fetch(b"key0")?.as_deref(), Some(&b"value-bytes"[..]));
        assert_eq!(db.fetch(b"key199")?.as_deref(), Some(&b"value-bytes"[..]));

        assert!(matches!(
            db.store(b"key0", b"x", StoreFlag::Replace),
            Err(Error::ReadOnly)
        ));
        assert!(matches!(db.delete(b"key0"), Err(Error::ReadOnly)));

        // обход в RO-режиме работает
        assert!(db.first_key()?.is_some());
    }

    // байты обоих файлов не изменились
    assert_eq!(fs::read(root.join("db.pag"))?, pag_before);
    assert_eq!(fs::read(root.join("db.dir"))?, dir_before);
    Ok(())
}

#[test]
fn write_only_is_promoted_to_read_write() -> Result<()> {
    let root = unique_root("wo");
    fs::create_dir_all(&root)?;
    let prefix = root.join("db");

    let mut db = Db::open_with(&prefix, OpenMode::WriteOnly, true)?;
    assert!(!db.readonly());
    // store внутри читает страницу перед вставкой — WriteOnly обязан
    // уметь читать
    db.store(b"k", b"v", StoreFlag::Replace)?;
    assert_eq!(db.fetch(b"k")?.as_deref(), Some(&b"v"[..]));
    Ok(())
}

#[test]
fn open_ro_missing_database_fails() {
    let root = unique_root("ro-missing");
    let err = Db::open_ro(root.join("nope")).unwrap_err();
    match err {
        Error::Io { op, .. } => assert_eq!(op, "open"),
        other => panic!("expected Io error, got {other:?}"),
    }
}

#[test]
fn empty_prefix_rejected() {
    assert!(matches!(Db::open(""), Err(Error::InvalidArgument)));
}

fn unique_root(prefix: &str) -> PathBuf {
    let pid = std::process::id();
    let t = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("bdb-{}-{}-{}", prefix, pid, t))
}
