//! Каталог расщеплений: битовый бинарный трай поверх .dir файла.
//!
//! Бит dbit == 1 означает "поддерево этого узла трая расщеплено". Сам
//! трай неявный: корень — dbit 0, потомки узла d — 2d+1 (бит хэша 0) и
//! 2d+2 (бит хэша 1). Физически файл — битовая карта блоками по DBLKSIZ
//! байт; в памяти держится ровно один блок. Дыры и хвост за EOF читаются
//! нулями, то есть "не расщеплено"; файл растёт целыми блоками.

use std::fs::File;
use std::path::PathBuf;

use log::debug;

use crate::consts::{BITSIZ, DBLKSIZ, HMASKS};
use crate::error::{Error, Result};
use crate::util::{off_dir, seek_read, seek_write};

#[derive(Debug)]
pub struct Directory {
    file: File,
    path: PathBuf,
    /// Размер файла каталога в битах; растёт порциями по DBLKSIZ*8.
    maxbno: i64,
    /// Номер закэшированного блока; -1 — кэш невалиден.
    blkno: i64,
    buf: [u8; DBLKSIZ],
}

impl Directory {
    /// Обернуть открытый .dir файл. У свежей базы каталог пуст и заведомо
    /// нулевой: блок 0 считается загруженным без чтения.
    pub(crate) fn new(file: File, path: PathBuf) -> Result<Self> {
        let len = file
            .metadata()
            .map_err(|e| Error::io("open", &path, e))?
            .len();
        Ok(Directory {
            file,
            path,
            maxbno: len as i64 * BITSIZ,
            blkno: if len == 0 { 0 } else { -1 },
            buf: [0u8; DBLKSIZ],
        })
    }

    fn load_block(&mut self, blk: i64) -> Result<()> {
        if blk != self.blkno {
            seek_read(&mut self.file, &self.path, off_dir(blk), &mut self.buf)?;
            self.blkno = blk;
            debug!("dir read: {}", blk);
        }
        Ok(())
    }

    /// Бит dbit каталога. Ошибка чтения блока трактуется как "не
    /// расщеплено" — так же ведут себя дыры файла.
    pub(crate) fn bit(&mut self, dbit: i64) -> bool {
        let c = dbit / BITSIZ;
        let blk = c / DBLKSIZ as i64;
        if self.load_block(blk).is_err() {
            return false;
        }
        self.buf[(c % DBLKSIZ as i64) as usize] & (1u8 << (dbit % BITSIZ) as u32) != 0
    }

    /// Установить бит dbit и записать его блок целиком на диск.
    pub(crate) fn set_bit(&mut self, dbit: i64) -> Result<()> {
        let c = dbit / BITSIZ;
        let blk = c / DBLKSIZ as i64;
        self.load_block(blk)?;

        self.buf[(c % DBLKSIZ as i64) as usize] |= 1u8 << (dbit % BITSIZ) as u32;
        if dbit >= self.maxbno {
            self.maxbno += DBLKSIZ as i64 * BITSIZ;
        }
        seek_write(&mut self.file, &self.path, off_dir(blk), &self.buf)
    }

    /// Спуск по траю: биты хэша потребляются, пока узлы расщеплены.
    /// Возвращает (curbit, hmask) найденного нерасщеплённого листа.
    pub(crate) fn walk(&mut self, hash: i64) -> (i64, i64) {
        let mut dbit: i64 = 0;
        let mut hbit = 0usize;
        while dbit < self.maxbno && self.bit(dbit) {
            dbit = if hash & (1i64 << hbit) != 0 {
                2 * dbit + 2
            } else {
                2 * dbit + 1
            };
            hbit += 1;
        }
        debug!("dbit: {}", dbit);
        (dbit, HMASKS[hbit])
    }

    /// Сбросить каталог на диск (используется при закрытии базы).
    pub(crate) fn sync(&mut self) -> Result<()> {
        self.file
            .sync_all()
            .map_err(|e| Error::io("close", &self.path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::OpenOptions;

    fn scratch_dir_file(tag: &str) -> (File, PathBuf) {
        let pid = std::process::id();
        let t = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let path = std::env::temp_dir().join(format!("bdb-dir-{tag}-{pid}-{t}"));
        let f = OpenOptions::new()
            .create_new(true)
            .read(true)
            .write(true)
            .open(&path)
            .unwrap();
        (f, path)
    }

    #[test]
    fn fresh_directory_is_all_zero() {
        let (f, path) = scratch_dir_file("fresh");
        let mut d = Directory::new(f, path.clone()).unwrap();
        assert_eq!(d.maxbno, 0);
        assert!(!d.bit(0));
        assert!(!d.bit(12345));
        // спуск по пустому траю останавливается в корне
        assert_eq!(d.walk(-1), (0, 0));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn set_bit_roundtrip_and_growth() {
        let (f, path) = scratch_dir_file("set");
        let mut d = Directory::new(f, path.clone()).unwrap();

        d.set_bit(0).unwrap();
        assert!(d.bit(0));
        assert!(!d.bit(1));
        assert_eq!(d.maxbno, DBLKSIZ as i64 * BITSIZ);

        // бит в середине блока
        d.set_bit(777).unwrap();
        assert!(d.bit(777));
        assert!(!d.bit(776));

        // файл вырос ровно на блок
        assert_eq!(std::fs::metadata(&path).unwrap().len(), DBLKSIZ as u64);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn walk_descends_split_nodes() {
        let (f, path) = scratch_dir_file("walk");
        let mut d = Directory::new(f, path.clone()).unwrap();

        // расщепляем корень: обе половины на глубине 1
        d.set_bit(0).unwrap();
        assert_eq!(d.walk(0), (1, 1)); // бит 0 хэша == 0 -> узел 1
        assert_eq!(d.walk(1), (2, 1)); // бит 0 хэша == 1 -> узел 2

        // расщепляем узел 2: хэши с младшим битом 1 идут глубже
        d.set_bit(2).unwrap();
        assert_eq!(d.walk(1), (5, 3)); // бит 1 == 0 -> узел 5
        assert_eq!(d.walk(3), (6, 3)); // бит 1 == 1 -> узел 6
        assert_eq!(d.walk(0), (1, 1)); // нерасщеплённая половина не тронута

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn persisted_bits_visible_after_reopen() {
        let (f, path) = scratch_dir_file("reopen");
        {
            let mut d = Directory::new(f, path.clone()).unwrap();
            d.set_bit(0).unwrap();
            d.set_bit(9).unwrap();
            d.sync().unwrap();
        }
        let f = OpenOptions::new().read(true).open(&path).unwrap();
        let mut d = Directory::new(f, path.clone()).unwrap();
        assert_eq!(d.maxbno, DBLKSIZ as i64 * BITSIZ);
        assert!(d.bit(0));
        assert!(d.bit(9));
        assert!(!d.bit(1));
        let _ = std::fs::remove_file(&path);
    }
}
