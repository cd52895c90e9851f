//! Минимальный CLI поверх библиотеки (бинарник burrowdb).
//!
//! Команды: put/get/del поверх открытого хэндла, scan — полный обход
//! ключей, check — последовательная проверка всех страниц .pag файла.

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use std::io::{Read, Write};
use std::path::PathBuf;

use crate::consts::{PAGFEXT, PBLKSIZ};
use crate::db::{Db, StoreFlag};
use crate::page::Page;

#[derive(Parser, Debug)]
#[command(name = "burrowdb", version, about = "BurrowDB key-value store CLI")]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Cmd,
}

#[derive(Subcommand, Debug)]
pub enum Cmd {
    /// Put key/value (value as string or from file)
    Put {
        /// Database prefix (files <prefix>.pag and <prefix>.dir)
        #[arg(long)]
        path: PathBuf,
        #[arg(long)]
        key: String,
        /// Value as a literal string (UTF-8). Ignored if --value-file is set.
        #[arg(long)]
        value: Option<String>,
        /// Read value bytes from a file
        #[arg(long)]
        value_file: Option<PathBuf>,
        /// Keep an existing value instead of replacing it
        #[arg(long, default_value_t = false)]
        keep_existing: bool,
    },
    /// Get key
    Get {
        #[arg(long)]
        path: PathBuf,
        #[arg(long)]
        key: String,
        /// Optional file to write raw value into
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Delete key
    Del {
        #[arg(long)]
        path: PathBuf,
        #[arg(long)]
        key: String,
    },
    /// List all keys (optionally with values)
    Scan {
        #[arg(long)]
        path: PathBuf,
        /// Print values too (key<TAB>value)
        #[arg(long, default_value_t = false)]
        values: bool,
    },
    /// Validate every page of the .pag file
    Check {
        #[arg(long)]
        path: PathBuf,
    },
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Cmd::Put {
            path,
            key,
            value,
            value_file,
            keep_existing,
        } => cmd_put(path, key, value, value_file, keep_existing),
        Cmd::Get { path, key, out } => cmd_get(path, key, out),
        Cmd::Del { path, key } => cmd_del(path, key),
        Cmd::Scan { path, values } => cmd_scan(path, values),
        Cmd::Check { path } => cmd_check(path),
    }
}

fn cmd_put(
    path: PathBuf,
    key: String,
    value: Option<String>,
    value_file: Option<PathBuf>,
    keep_existing: bool,
) -> Result<()> {
    let val: Vec<u8> = match (value_file, value) {
        (Some(p), _) => std::fs::read(&p).with_context(|| format!("read {}", p.display()))?,
        (None, Some(s)) => s.into_bytes(),
        (None, None) => return Err(anyhow!("either --value or --value-file is required")),
    };

    let flag = if keep_existing {
        StoreFlag::SkipDups
    } else {
        StoreFlag::Replace
    };

    let mut db = Db::open(&path).with_context(|| format!("open {}", path.display()))?;
    db.store(key.as_bytes(), &val, flag)?;
    db.close()?;
    Ok(())
}

fn cmd_get(path: PathBuf, key: String, out: Option<PathBuf>) -> Result<()> {
    let mut db = Db::open_ro(&path).with_context(|| format!("open {}", path.display()))?;
    let val = db
        .fetch(key.as_bytes())?
        .ok_or_else(|| anyhow!("key not found: {}", key))?;

    match out {
        Some(p) => {
            std::fs::write(&p, &val).with_context(|| format!("write {}", p.display()))?;
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&val)?;
            stdout.write_all(b"\n")?;
        }
    }
    Ok(())
}

fn cmd_del(path: PathBuf, key: String) -> Result<()> {
    let mut db = Db::open(&path).with_context(|| format!("open {}", path.display()))?;
    let existed = db.delete(key.as_bytes())?;
    db.close()?;
    if !existed {
        return Err(anyhow!("key not found: {}", key));
    }
    Ok(())
}

fn cmd_scan(path: PathBuf, values: bool) -> Result<()> {
    let mut db = Db::open_ro(&path).with_context(|| format!("open {}", path.display()))?;
    let mut stdout = std::io::stdout().lock();

    let mut cur = db.first_key()?;
    while let Some(key) = cur {
        stdout.write_all(&key)?;
        if values {
            // точечное чтение между next_key безопасно: курсор обхода
            // переживает сбой позиции файла за счёт seek
            if let Some(val) = db.fetch(&key)? {
                stdout.write_all(b"\t")?;
                stdout.write_all(&val)?;
            }
        }
        stdout.write_all(b"\n")?;
        cur = db.next_key()?;
    }
    Ok(())
}

fn cmd_check(path: PathBuf) -> Result<()> {
    let mut pag_path = path.into_os_string();
    pag_path.push(PAGFEXT);
    let pag_path = PathBuf::from(pag_path);

    let mut f = std::fs::File::open(&pag_path)
        .with_context(|| format!("open {}", pag_path.display()))?;

    let mut buf = [0u8; PBLKSIZ];
    let mut pageno: u64 = 0;
    let mut pairs: u64 = 0;
    let mut bad: u64 = 0;

    loop {
        let mut got = 0;
        while got < PBLKSIZ {
            let k = f.read(&mut buf[got..])?;
            if k == 0 {
                break;
            }
            got += k;
        }
        if got == 0 {
            break;
        }
        buf[got..].fill(0);

        let page = Page::from_bytes(buf);
        if page.check() {
            pairs += page.pairs() as u64;
        } else {
            bad += 1;
            println!("page {}: INVALID", pageno);
        }
        pageno += 1;
        if got < PBLKSIZ {
            break;
        }
    }

    println!("pages: {}, pairs: {}, invalid: {}", pageno, pairs, bad);
    if bad > 0 {
        return Err(anyhow!("{} invalid pages", bad));
    }
    Ok(())
}
