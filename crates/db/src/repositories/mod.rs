pub mod cat_store;

pub use cat_store::{clamp_limit, clamp_offset, CatStore, MemoryCatStore, PgCatStore};
