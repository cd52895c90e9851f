//! Расщепление страницы: перераспределение пар по одному биту хэша.

use log::trace;

use crate::consts::PBLKSIZ;
use crate::hash::key_hash;

use super::Page;

impl Page {
    /// Перераспределить пары между этой страницей и new_page.
    ///
    /// sbit — одиночный бит (hmask + 1): пары, у которых hash(key) & sbit
    /// ненулевой, уходят на новую страницу, остальные остаются здесь.
    /// Обе страницы сначала обнуляются; после возврата обе корректны по
    /// check().
    pub fn split_into(&mut self, new_page: &mut Page, sbit: i64) {
        // снимок исходного содержимого
        let cur = Page { buf: self.buf };
        self.buf = [0u8; PBLKSIZ];
        new_page.buf = [0u8; PBLKSIZ];

        let n = cur.slots();
        let mut off = PBLKSIZ;
        let mut i = 1;
        while i < n {
            let koff = cur.ino(i);
            let voff = cur.ino(i + 1);
            let key = &cur.buf[koff..off];
            let val = &cur.buf[voff..koff];

            if key_hash(key) & sbit != 0 {
                new_page.put_pair(key, val);
            } else {
                self.put_pair(key, val);
            }

            off = voff;
            i += 2;
        }

        trace!("{} split {}/{}", n / 2, new_page.pairs(), self.pairs());
    }
}
