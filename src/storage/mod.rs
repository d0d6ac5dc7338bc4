// Persistence for the catalog tables: read-only access for the query layer,
// administrative writes for data entry

pub mod in_memory;
pub mod sqlite;
pub mod traits;

pub use in_memory::InMemoryStorage;
pub use sqlite::SqliteStorage;
pub use traits::{AdminStorage, Storage};
