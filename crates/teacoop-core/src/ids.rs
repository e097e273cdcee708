//! # Identifier Generation
//!
//! Record ids are `<PREFIX><base36 millis><5 base36 random chars>`, upper-cased:
//!
//! ```text
//!   IB  LRX4K2P9  Q7Z1M
//!   │   │         │
//!   │   │         └── 5 random base-36 digits
//!   │   └──────────── creation time, ms since epoch, base 36
//!   └──────────────── collection prefix (F, IB, PB, B, S)
//! ```
//!
//! The engine never reads a clock or an RNG itself; it asks an [`IdGenerator`]
//! passed in through the mutation context, so tests can use
//! [`SequenceIdGenerator`] and get predictable ids.

use chrono::Utc;
use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

use crate::collections::CollectionKey;

/// Number of random base-36 digits appended to every id.
pub const RANDOM_SUFFIX_LEN: usize = 5;

const BASE36_DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Source of fresh record ids.
pub trait IdGenerator {
    /// Returns a new id for a record of the given collection.
    fn next_id(&self, key: CollectionKey) -> String;
}

// =============================================================================
// Formatting
// =============================================================================

/// Renders `n` in lowercase base 36.
pub fn to_base36(mut n: u64) -> String {
    if n == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while n > 0 {
        digits.push(BASE36_DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    digits.reverse();
    String::from_utf8_lossy(&digits).into_owned()
}

/// Builds an id from its parts.
///
/// `random` is reduced to [`RANDOM_SUFFIX_LEN`] base-36 digits (zero padded).
pub fn format_id(prefix: &str, millis: u64, random: u64) -> String {
    let modulus = 36_u64.pow(RANDOM_SUFFIX_LEN as u32);
    let suffix = format!(
        "{:0>width$}",
        to_base36(random % modulus),
        width = RANDOM_SUFFIX_LEN
    );
    format!("{}{}{}", prefix, to_base36(millis), suffix).to_uppercase()
}

// =============================================================================
// Generators
// =============================================================================

/// Production generator: wall-clock millis plus a UUID-v4-derived suffix.
#[derive(Debug, Default, Clone, Copy)]
pub struct TimestampIdGenerator;

impl IdGenerator for TimestampIdGenerator {
    fn next_id(&self, key: CollectionKey) -> String {
        let millis = Utc::now().timestamp_millis().max(0) as u64;
        let random = (Uuid::new_v4().as_u128() % u64::MAX as u128) as u64;
        format_id(key.id_prefix(), millis, random)
    }
}

/// Deterministic generator for tests and demos: `F001`-style ids from a
/// shared counter.
#[derive(Debug)]
pub struct SequenceIdGenerator {
    next: AtomicU64,
}

impl SequenceIdGenerator {
    pub fn new() -> Self {
        Self::starting_at(1)
    }

    /// First id handed out uses `start`.
    pub fn starting_at(start: u64) -> Self {
        Self {
            next: AtomicU64::new(start),
        }
    }
}

impl Default for SequenceIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl IdGenerator for SequenceIdGenerator {
    fn next_id(&self, key: CollectionKey) -> String {
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        format!("{}{:03}", key.id_prefix(), n)
    }
}
