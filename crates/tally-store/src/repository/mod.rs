//! # Repository Module
//!
//! ```text
//!   persist::save_session(&db, ...)
//!        │
//!        ▼
//!   KvRepository
//!   ├── get_json / set_json   typed slices
//!   ├── get_raw  / set_raw    plain strings (tokens)
//!   └── remove
//!        │
//!        ▼
//!   kv_store (key, value, updated_at)
//! ```

pub mod kv;
