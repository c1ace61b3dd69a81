//! Model module - data types exchanged with the SoundCloud API
//!
//! - `types`: search parameter keys and their query-string mapping
//! - `content`: typed records decoded from responses

mod content;
mod types;

pub use content::{Track, User};

pub use types::{to_query_pairs, SearchKey};
