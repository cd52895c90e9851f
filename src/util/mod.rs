//! util — низкоуровневый файловый ввод/вывод по вычисленным смещениям.
//!
//! Короткое чтение (дыра разреженного файла или хвост за EOF) добивается
//! нулями: формат рассчитывает, что незаписанные страницы и блоки
//! каталога читаются как пустые.

use std::fs::File;
use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::Path;

use crate::consts::{DBLKSIZ, PBLKSIZ};
use crate::error::{Error, Result};

/// Байтовое смещение страницы pagbno в .pag файле.
#[inline]
pub(crate) fn off_pag(pagbno: i64) -> u64 {
    pagbno as u64 * PBLKSIZ as u64
}

/// Байтовое смещение блока dirbno в .dir файле.
#[inline]
pub(crate) fn off_dir(dirbno: i64) -> u64 {
    dirbno as u64 * DBLKSIZ as u64
}

/// Читать с текущей позиции до заполнения буфера либо EOF; остаток после
/// EOF зануляется. Возвращает число реально прочитанных байт (0 — чистый
/// EOF).
pub(crate) fn read_fill(f: &mut File, path: &Path, buf: &mut [u8]) -> Result<usize> {
    let mut got = 0;
    while got < buf.len() {
        match f.read(&mut buf[got..]) {
            Ok(0) => break,
            Ok(k) => got += k,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(Error::io("read", path, e)),
        }
    }
    for b in &mut buf[got..] {
        *b = 0;
    }
    Ok(got)
}

/// seek + чтение с добивкой нулями после EOF.
pub(crate) fn seek_read(f: &mut File, path: &Path, offset: u64, buf: &mut [u8]) -> Result<()> {
    f.seek(SeekFrom::Start(offset))
        .map_err(|e| Error::io("seek", path, e))?;
    read_fill(f, path, buf)?;
    Ok(())
}

/// seek + полная запись буфера.
pub(crate) fn seek_write(f: &mut File, path: &Path, offset: u64, buf: &[u8]) -> Result<()> {
    f.seek(SeekFrom::Start(offset))
        .map_err(|e| Error::io("seek", path, e))?;
    f.write_all(buf).map_err(|e| Error::io("write", path, e))
}
