//! Общие константы формата (.pag страницы, .dir каталог).
//!
//! Все значения зафиксированы раскладкой файлов на диске; менять их —
//! значит менять формат.

/// Размер страницы данных в .pag файле.
pub const PBLKSIZ: usize = 1024;

/// Размер блока битовой карты в .dir файле.
pub const DBLKSIZ: usize = 4096;

/// Бит в байте.
pub const BITSIZ: i64 = 8;

/// Размер слота таблицы смещений (u16, little-endian).
pub const SHORTSIZE: usize = 2;

/// Максимальный суммарный размер пары key+value на одной странице.
pub const PAIRMAX: usize = 1008;

/// Максимальное число расщеплений страницы на одну вставку.
pub const SPLTMAX: usize = 10;

/// Расширение файла каталога.
pub const DIRFEXT: &str = ".dir";

/// Расширение файла страниц.
pub const PAGFEXT: &str = ".pag";

/// Маски хэша по глубине спуска: HMASKS[d] == (1 << d) - 1.
pub(crate) const HMASKS: [i64; 32] = {
    let mut m = [0i64; 32];
    let mut i = 1;
    while i < 32 {
        m[i] = (m[i - 1] << 1) | 1;
        i += 1;
    }
    m
};
