#![allow(non_snake_case)]

// Базовые модули
pub mod consts;
pub mod error;
pub mod hash;

// Компоненты хранилища
pub mod dir;
pub mod page; // src/page/{mod,split}.rs
pub mod db; // src/db/{mod,open,kv,scan}.rs

// CLI (используется бинарником burrowdb)
pub mod cli;

// Утилиты (seek_read/seek_write, оффсеты страниц и блоков)
pub mod util;

// Удобные реэкспорты
pub use db::{Db, Keys, OpenMode, StoreFlag};
pub use error::{Error, Result};
pub use page::Page;
