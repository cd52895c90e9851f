//! Stable key hashing.
//!
//! Хэш зафиксирован форматом: один и тот же ключ обязан попадать на одну
//! и ту же страницу на любой платформе и любом тулчейне, поэтому
//! std::DefaultHasher не годится. Используется полином с множителем
//! 65599 поверх u64 с переполнением.

/// 64-битный полиномиальный хэш ключа: h = 65599*h + b.
///
/// Результат отдаётся как i64; знаковый бит безразличен — все решения по
/// траю маскируют только младшие биты (hmask, 1<<hbit).
#[inline]
pub fn key_hash(data: &[u8]) -> i64 {
    let mut h: u64 = 0;
    for &b in data {
        h = h.wrapping_mul(65599).wrapping_add(b as u64);
    }
    h as i64
}
