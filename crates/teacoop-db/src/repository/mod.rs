//! # Repository Module
//!
//! One repository type serves all five collections, parameterised by record type.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Collection Repositories                              │
//! │                                                                         │
//! │  Command                                                               │
//! │       │  db.deliveries().load()                                        │
//! │       ▼                                                                 │
//! │  CollectionRepository<Delivery>                                        │
//! │  ├── load(&self)          absent key → seed + write back               │
//! │  ├── save(&self, records) whole-collection upsert, version + 1         │
//! │  ├── get(&self, id)                                                    │
//! │  ├── count(&self)                                                      │
//! │  └── version(&self)                                                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  collections table: key = 'incomingBatches', payload = [ ... ]         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod collection;

pub use collection::CollectionRepository;
