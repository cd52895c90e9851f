//! db/open — открытие и закрытие базы (writer/read-only).

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use crate::consts::{DIRFEXT, PAGFEXT};
use crate::dir::Directory;
use crate::error::{Error, Result};
use crate::page::Page;

use super::Db;

/// Режим доступа к базе. WriteOnly внутри повышается до ReadWrite:
/// операции записи всё равно читают страницу перед модификацией.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    ReadOnly,
    WriteOnly,
    ReadWrite,
}

impl Db {
    /// Открыть базу на чтение и запись, создав файлы при отсутствии.
    pub fn open(prefix: impl AsRef<Path>) -> Result<Db> {
        Self::open_with(prefix, OpenMode::ReadWrite, true)
    }

    /// Открыть существующую базу только на чтение.
    pub fn open_ro(prefix: impl AsRef<Path>) -> Result<Db> {
        Self::open_with(prefix, OpenMode::ReadOnly, false)
    }

    /// Открыть базу с явным режимом доступа.
    ///
    /// К префиксу дописываются расширения .dir и .pag. create уходит в
    /// файловую систему как есть; сам формат created/existing не
    /// различает — пустые файлы означают пустую базу.
    pub fn open_with(prefix: impl AsRef<Path>, mode: OpenMode, create: bool) -> Result<Db> {
        let prefix = prefix.as_ref();
        if prefix.as_os_str().is_empty() {
            return Err(Error::InvalidArgument);
        }

        let dir_path = append_ext(prefix, DIRFEXT);
        let pag_path = append_ext(prefix, PAGFEXT);

        let rdonly = mode == OpenMode::ReadOnly;
        let mut opts = OpenOptions::new();
        opts.read(true);
        if !rdonly {
            opts.write(true).create(create);
        }

        let dirf = opts
            .open(&dir_path)
            .map_err(|e| Error::io("open", &dir_path, e))?;
        // при отказе на втором файле первый закроется при drop
        let pagf = opts
            .open(&pag_path)
            .map_err(|e| Error::io("open", &pag_path, e))?;

        let dir = Directory::new(dirf, dir_path)?;

        Ok(Db {
            pagf,
            pag_path,
            dir,
            rdonly,
            pag: Page::zeroed(),
            pagbno: -1,
            curbit: 0,
            hmask: 0,
            blkptr: 0,
            keyptr: 0,
        })
    }

    /// Закрыть базу: сбросить оба файла на диск. Первая ошибка (сначала
    /// каталог) возвращается, но второй файл сбрасывается в любом случае.
    pub fn close(mut self) -> Result<()> {
        if self.rdonly {
            return Ok(());
        }
        let dir_res = self.dir.sync();
        let pag_res = self
            .pagf
            .sync_all()
            .map_err(|e| Error::io("close", &self.pag_path, e));
        dir_res.and(pag_res)
    }
}

fn append_ext(prefix: &Path, ext: &str) -> PathBuf {
    let mut os = prefix.as_os_str().to_os_string();
    os.push(ext);
    PathBuf::from(os)
}
