//! First-use seeding.
//!
//! Each record type knows its default records; a repository writes them back
//! the first time its key is found absent.

use teacoop_core::{seed, Buyer, Delivery, Farmer, ProcessedLot, Record, Sale};

/// A record type with a default dataset.
pub trait SeedData: Record {
    fn seed() -> Vec<Self>;
}

impl SeedData for Farmer {
    fn seed() -> Vec<Self> {
        seed::farmers()
    }
}

impl SeedData for Delivery {
    fn seed() -> Vec<Self> {
        seed::deliveries()
    }
}

impl SeedData for ProcessedLot {
    fn seed() -> Vec<Self> {
        seed::lots()
    }
}

impl SeedData for Buyer {
    fn seed() -> Vec<Self> {
        seed::buyers()
    }
}

impl SeedData for Sale {
    fn seed() -> Vec<Self> {
        seed::sales()
    }
}
