//! db/kv — точечные операции fetch/store/delete и цикл расщепления.

use log::{debug, warn};

use crate::consts::{PAIRMAX, SPLTMAX};
use crate::error::{Error, Result};
use crate::hash::key_hash;
use crate::page::Page;
use crate::util::{off_pag, seek_read, seek_write};

use super::Db;

/// Поведение store при уже существующем ключе.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreFlag {
    /// Заменить значение существующего ключа.
    Replace,
    /// Оставить существующее значение; вставка дубликата — успех без
    /// записи на диск.
    SkipDups,
}

impl Db {
    /// Значение по ключу; None — ключа нет.
    pub fn fetch(&mut self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        if key.is_empty() {
            return Err(Error::InvalidArgument);
        }
        self.load_page(key_hash(key))?;
        Ok(self.pag.get_pair(key).map(|v| v.to_vec()))
    }

    /// Удалить пару по ключу. Ok(false) — ключа не было, диск не тронут.
    pub fn delete(&mut self, key: &[u8]) -> Result<bool> {
        if key.is_empty() {
            return Err(Error::InvalidArgument);
        }
        if self.rdonly {
            return Err(Error::ReadOnly);
        }

        self.load_page(key_hash(key))?;
        if !self.pag.del_pair(key) {
            return Ok(false);
        }
        self.write_current_page()?;
        Ok(true)
    }

    /// Вставить или обновить пару.
    pub fn store(&mut self, key: &[u8], val: &[u8], flag: StoreFlag) -> Result<()> {
        if key.is_empty() {
            return Err(Error::InvalidArgument);
        }
        let need = key.len() + val.len();
        if need > PAIRMAX {
            return Err(Error::InvalidArgument);
        }
        if self.rdonly {
            return Err(Error::ReadOnly);
        }

        let hash = key_hash(key);
        self.load_page(hash)?;

        match flag {
            // при замене старую пару просто убираем; её отсутствие — не
            // ошибка
            StoreFlag::Replace => {
                let _ = self.pag.del_pair(key);
            }
            StoreFlag::SkipDups => {
                if self.pag.dup_pair(key) {
                    return Ok(());
                }
            }
        }

        if !self.pag.fit_pair(need) {
            self.make_room(hash, need)?;
        }

        self.pag.put_pair(key, val);
        self.write_current_page()
    }

    // -------- внутренние помощники --------

    /// Спуск по траю и загрузка нужной страницы в кэш с проверкой.
    pub(crate) fn load_page(&mut self, hash: i64) -> Result<()> {
        let (curbit, hmask) = self.dir.walk(hash);
        self.curbit = curbit;
        self.hmask = hmask;

        let pagb = hash & hmask;
        if pagb != self.pagbno {
            seek_read(
                &mut self.pagf,
                &self.pag_path,
                off_pag(pagb),
                self.pag.as_bytes_mut(),
            )?;
            if !self.pag.check() {
                // pagbno не обновляем: битая страница не должна осесть в
                // кэше
                return Err(Error::InvalidPage);
            }
            self.pagbno = pagb;
            debug!("pag read: {}", pagb);
        }
        Ok(())
    }

    #[inline]
    pub(crate) fn write_current_page(&mut self) -> Result<()> {
        seek_write(
            &mut self.pagf,
            &self.pag_path,
            off_pag(self.pagbno),
            self.pag.as_bytes(),
        )
    }

    /// Цикл расщепления: до SPLTMAX попыток освободить место под пару.
    ///
    /// Порядок записи существенен для восстановления: старая страница
    /// уходит на диск раньше, чем ставится бит каталога, поэтому после
    /// сбоя каталог не может ссылаться на расщепление, которого нет в
    /// .pag файле. Обратное окно (бит есть, пара ещё не записана)
    /// допустимо: чтение увидит нерасщеплённую страницу и промахнётся.
    fn make_room(&mut self, hash: i64, need: usize) -> Result<()> {
        let mut twin = Page::zeroed();

        for _ in 0..SPLTMAX {
            let sbit = self.hmask + 1;
            self.pag.split_into(&mut twin, sbit);

            // адрес новой страницы
            let newp = (hash & self.hmask) | sbit;

            // Выбор страницы под входящую пару: если ключ уходит на
            // новую, записываем старую и делаем новую текущей; иначе
            // записываем новую, а текущей остаётся старая. Текущая
            // страница здесь на диск не пишется — это сделает store
            // после вставки пары.
            if hash & sbit != 0 {
                self.write_current_page()?;
                std::mem::swap(&mut self.pag, &mut twin);
                self.pagbno = newp;
            } else {
                seek_write(&mut self.pagf, &self.pag_path, off_pag(newp), twin.as_bytes())?;
            }

            self.dir.set_bit(self.curbit)?;

            if self.pag.fit_pair(need) {
                return Ok(());
            }

            // Спускаемся на бит глубже, как это сделал бы load_page, и
            // сразу записываем текущую страницу: окно отказа и без того
            // велико.
            self.curbit = if hash & sbit != 0 {
                2 * self.curbit + 2
            } else {
                2 * self.curbit + 1
            };
            self.hmask |= sbit;
            self.write_current_page()?;
        }

        warn!("cannot insert pair after {} split attempts", SPLTMAX);
        Err(Error::SplitLimit { attempts: SPLTMAX })
    }
}
