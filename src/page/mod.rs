//! Страница данных .pag файла.
//!
//! Формат (все слоты — u16 little-endian):
//!
//! ```text
//!      +-------------------------------+
//! ino  | n | keyOff | valOff | keyOff  |
//!      +-----------+--------+----------+
//!      | valOff | - - - --->           |
//!      +--------+----------------------+
//!      |      С В О Б О Д Н А Я        |
//!      |          З О Н А              |
//!      +--------------+----------------+
//!      |  <--- - - -  | value          |
//!      +--------+-----+-----+----------+
//!      |  key   | value     | key      |
//!      +--------+-----------+----------+
//! ```
//!
//! n — число занятых слотов; ключ и значение занимают по слоту, так что
//! n всегда чётно. Нечётный слот хранит смещение начала ключа, следующий
//! чётный — смещение начала его значения. Таблица растёт от головы
//! страницы, байты ключей и значений — от хвоста (PBLKSIZ) вниз; данные
//! слота i занимают [ino(i), ino(i-1)), где ino(0) читается как PBLKSIZ.
//! Конец свободной зоны — PBLKSIZ при n == 0, иначе ino(n).

mod split;

use byteorder::{ByteOrder, LittleEndian};
use log::trace;

use crate::consts::{PBLKSIZ, SHORTSIZE};

/// Одна страница данных: ровно PBLKSIZ байт.
#[derive(Debug)]
pub struct Page {
    buf: [u8; PBLKSIZ],
}

impl Page {
    /// Пустая (нулевая) страница: n == 0, валидна по check().
    pub fn zeroed() -> Self {
        Page {
            buf: [0u8; PBLKSIZ],
        }
    }

    /// Страница из готовых байт (например, прочитанных мимо хэндла).
    /// Содержимое не проверяется — вызывающий код обязан звать check().
    pub fn from_bytes(buf: [u8; PBLKSIZ]) -> Self {
        Page { buf }
    }

    /// Сырые байты страницы (для записи на диск).
    #[inline]
    pub fn as_bytes(&self) -> &[u8; PBLKSIZ] {
        &self.buf
    }

    #[inline]
    pub(crate) fn as_bytes_mut(&mut self) -> &mut [u8; PBLKSIZ] {
        &mut self.buf
    }

    // -------- слоты таблицы смещений --------

    #[inline]
    fn ino(&self, i: usize) -> usize {
        let p = i * SHORTSIZE;
        LittleEndian::read_u16(&self.buf[p..p + SHORTSIZE]) as usize
    }

    #[inline]
    fn set_ino(&mut self, i: usize, v: usize) {
        debug_assert!(v <= u16::MAX as usize);
        let p = i * SHORTSIZE;
        LittleEndian::write_u16(&mut self.buf[p..p + SHORTSIZE], v as u16);
    }

    /// Число занятых слотов (слот 0 таблицы).
    #[inline]
    pub fn slots(&self) -> usize {
        self.ino(0)
    }

    #[inline]
    fn set_slots(&mut self, n: usize) {
        self.set_ino(0, n);
    }

    /// Число пар на странице.
    #[inline]
    pub fn pairs(&self) -> usize {
        self.slots() / 2
    }

    // -------- операции над парами --------

    /// Поместится ли пара размером need байт (плюс два слота таблицы).
    pub fn fit_pair(&self, need: usize) -> bool {
        let n = self.slots();
        let off = if n > 0 { self.ino(n) } else { PBLKSIZ };
        let free = off - (n + 1) * SHORTSIZE;
        trace!("free {} need {}", free, need + 2 * SHORTSIZE);
        need + 2 * SHORTSIZE <= free
    }

    /// Дописать пару в хвост. Вызывать только после успешного fit_pair.
    pub fn put_pair(&mut self, key: &[u8], val: &[u8]) {
        let n = self.slots();
        let mut off = if n > 0 { self.ino(n) } else { PBLKSIZ };

        // сначала ключ
        off -= key.len();
        self.buf[off..off + key.len()].copy_from_slice(key);
        self.set_ino(n + 1, off);

        // затем значение
        off -= val.len();
        self.buf[off..off + val.len()].copy_from_slice(val);
        self.set_ino(n + 2, off);

        self.set_slots(n + 2);
    }

    /// Значение по ключу; None — ключа на странице нет.
    pub fn get_pair(&self, key: &[u8]) -> Option<&[u8]> {
        let n = self.slots();
        if n == 0 {
            return None;
        }
        let i = self.see_pair(n, key);
        if i == 0 {
            return None;
        }
        Some(&self.buf[self.ino(i + 1)..self.ino(i)])
    }

    /// Есть ли ключ на странице.
    pub fn dup_pair(&self, key: &[u8]) -> bool {
        let n = self.slots();
        n > 0 && self.see_pair(n, key) > 0
    }

    /// num-й ключ страницы (нумерация с 1), в порядке живых слотов.
    pub fn nth_key(&self, num: usize) -> Option<&[u8]> {
        if num == 0 {
            return None;
        }
        let slot = num * 2 - 1;
        let n = self.slots();
        if n == 0 || slot > n {
            return None;
        }
        let end = if slot > 1 { self.ino(slot - 1) } else { PBLKSIZ };
        Some(&self.buf[self.ino(slot)..end])
    }

    /// Удалить пару по ключу. false — ключа не было.
    pub fn del_pair(&mut self, key: &[u8]) -> bool {
        let n = self.slots();
        if n == 0 {
            return false;
        }
        let i = self.see_pair(n, key);
        if i == 0 {
            return false;
        }

        // Последняя пара — достаточно уменьшить счётчик. Иначе: байты
        // пар, вставленных позже удаляемой, сдвигаются вверх на размер
        // удалённой пары, а их слоты съезжают на две позиции с поправкой
        // смещений.
        if i < n - 1 {
            let dst = if i == 1 { PBLKSIZ } else { self.ino(i - 1) };
            let src = self.ino(i + 1);
            let gap = dst - src;
            trace!("free-up {}", gap);

            let tail = self.ino(n);
            self.buf.copy_within(tail..src, tail + gap);

            let mut j = i;
            while j < n - 1 {
                let v = self.ino(j + 2) + gap;
                self.set_ino(j, v);
                j += 1;
            }
        }
        self.set_slots(n - 2);
        true
    }

    /// Проверка целостности страницы; зовётся на каждое чтение с диска.
    ///
    /// Проверяется: чётность и диапазон n, умещение таблицы смещений до
    /// начала данных, монотонный спуск смещений от PBLKSIZ и отсутствие
    /// налезания данных на таблицу. Нулевая страница валидна (n == 0).
    pub fn check(&self) -> bool {
        let n = self.slots();
        if n == 0 {
            return true;
        }
        if n % 2 != 0 || (n + 1) * SHORTSIZE > PBLKSIZ {
            return false;
        }

        let mut prev = PBLKSIZ;
        let mut i = 1;
        while i < n {
            let koff = self.ino(i);
            let voff = self.ino(i + 1);
            if koff > prev || voff > koff {
                return false;
            }
            prev = voff;
            i += 2;
        }
        // prev == ino(n): данные не должны доставать до таблицы
        prev >= (n + 1) * SHORTSIZE
    }

    /// Линейный поиск ключа по нечётным слотам; индекс слота или 0.
    /// Ключи на странице не сортированы: пар немного, линейного прохода
    /// достаточно.
    fn see_pair(&self, n: usize, key: &[u8]) -> usize {
        let mut off = PBLKSIZ;
        let mut i = 1;
        while i < n {
            let cur = self.ino(i);
            if key.len() == off - cur && key == &self.buf[cur..off] {
                return i;
            }
            off = self.ino(i + 1);
            i += 2;
        }
        0
    }
}
