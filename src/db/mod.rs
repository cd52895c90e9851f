//! db — высокоуровневый хэндл хранилища.
//!
//! Связывает файл страниц и каталог расщеплений: open/close,
//! fetch/store/delete, полный обход ключей и оркестрация расщеплений.
//! Весь изменяемый стейт (постраничный кэш, кэш блока каталога, курсоры)
//! принадлежит хэндлу монопольно; для конкурентного доступа оборачивайте
//! его внешним мьютексом.

mod kv;
mod open;
mod scan;

pub use kv::StoreFlag;
pub use open::OpenMode;
pub use scan::Keys;

use std::fs::File;
use std::path::PathBuf;

use crate::dir::Directory;
use crate::page::Page;

/// Открытый хэндл базы: два файла, одностраничный кэш и курсоры обхода.
#[derive(Debug)]
pub struct Db {
    pub(crate) pagf: File,
    pub(crate) pag_path: PathBuf,
    pub(crate) dir: Directory,
    pub(crate) rdonly: bool,

    /// Кэш .pag файла: одна страница и её номер (-1 — кэш пуст).
    pub(crate) pag: Page,
    pub(crate) pagbno: i64,

    /// Лист трая и маска хэша последнего спуска.
    pub(crate) curbit: i64,
    pub(crate) hmask: i64,

    /// Курсоры обхода: номер страницы и порядковый номер ключа на ней.
    pub(crate) blkptr: i64,
    pub(crate) keyptr: usize,
}

impl Db {
    /// Открыта ли база только на чтение.
    #[inline]
    pub fn readonly(&self) -> bool {
        self.rdonly
    }
}
