pub mod journal_json;

pub use journal_json::{JournalJson, read_export, write_export};
