//! Типизированные ошибки хранилища.
//!
//! Все отказы возвращаются значениями; раскрутка стека на путях записи
//! ломала бы порядок записи при расщеплении. Ошибки ввода/вывода несут
//! имя операции и путь файла.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result-алиас для операций хранилища.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Пустой ключ, пустой путь или слишком большая пара.
    #[error("invalid argument")]
    InvalidArgument,

    /// Страница не прошла проверку целостности при чтении.
    #[error("invalid page")]
    InvalidPage,

    /// Попытка записи в базу, открытую только на чтение.
    #[error("database is read-only")]
    ReadOnly,

    /// После attempts расщеплений место под пару так и не нашлось.
    #[error("cannot insert pair after {attempts} page splits")]
    SplitLimit { attempts: usize },

    /// Ошибка ввода/вывода: операция, путь и исходная ошибка.
    #[error("{op} {}: {source}", .path.display())]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl Error {
    #[inline]
    pub(crate) fn io(op: &'static str, path: &Path, source: io::Error) -> Self {
        Error::Io {
            op,
            path: path.to_path_buf(),
            source,
        }
    }
}
