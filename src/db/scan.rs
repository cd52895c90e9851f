//! db/scan — последовательный обход всех ключей базы.
//!
//! Двухвызовный протокол first_key/next_key держит курсор на хэндле.
//! Порядок обхода: страницы по возрастанию номеров, внутри страницы —
//! порядок живых слотов. Обход, перемешанный со вставками, может выдать
//! ключ дважды или пропустить его — известное ограничение формата.

use std::io::{Seek, SeekFrom};

use crate::error::{Error, Result};
use crate::util::{off_pag, read_fill, seek_read};

use super::Db;

impl Db {
    /// Первый ключ базы: курсор сбрасывается на страницу 0.
    pub fn first_key(&mut self) -> Result<Option<Vec<u8>>> {
        seek_read(
            &mut self.pagf,
            &self.pag_path,
            off_pag(0),
            self.pag.as_bytes_mut(),
        )?;
        if !self.pag.check() {
            return Err(Error::InvalidPage);
        }
        self.pagbno = 0;
        self.blkptr = 0;
        self.keyptr = 0;

        self.next_in_page()
    }

    /// Следующий ключ после first_key либо предыдущего next_key.
    pub fn next_key(&mut self) -> Result<Option<Vec<u8>>> {
        self.next_in_page()
    }

    /// Итератор по всем ключам. Конечный и не перезапускаемый; курсор
    /// живёт на хэндле, поэтому итератор занимает Db эксклюзивно.
    pub fn keys(&mut self) -> Keys<'_> {
        Keys {
            db: self,
            started: false,
        }
    }

    fn next_in_page(&mut self) -> Result<Option<Vec<u8>>> {
        loop {
            self.keyptr += 1;
            if let Some(k) = self.pag.nth_key(self.keyptr) {
                return Ok(Some(k.to_vec()));
            }

            // Ключи на странице кончились — идём на следующую. Если
            // позицию файла увело точечное чтение, восстанавливаем её
            // seek'ом.
            self.keyptr = 0;
            if self.pagbno != self.blkptr {
                self.pagf
                    .seek(SeekFrom::Start(off_pag(self.blkptr + 1)))
                    .map_err(|e| Error::io("seek", &self.pag_path, e))?;
            }
            self.blkptr += 1;
            self.pagbno = self.blkptr;

            let got = read_fill(&mut self.pagf, &self.pag_path, self.pag.as_bytes_mut())?;
            if got == 0 {
                // конец файла — обход завершён
                return Ok(None);
            }
            if !self.pag.check() {
                return Err(Error::InvalidPage);
            }
        }
    }
}

/// Итератор-обёртка над first_key/next_key.
pub struct Keys<'a> {
    db: &'a mut Db,
    started: bool,
}

impl Iterator for Keys<'_> {
    type Item = Result<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        let step = if self.started {
            self.db.next_key()
        } else {
            self.started = true;
            self.db.first_key()
        };
        match step {
            Ok(Some(k)) => Some(Ok(k)),
            Ok(None) => None,
            Err(e) => Some(Err(e)),
        }
    }
}
