//! mailsearch-core
//!
//! Domain types shared by the ranking crates: the `Record` and `EmbedProvider`
//! seams, content fingerprints, the error taxonomy, configuration and the email
//! record the CLI and agent tool search over.

#![deny(warnings)]
#![deny(dead_code)]
#![deny(unused_variables)]
#![deny(unused_imports)]

pub mod config;
pub mod email;
pub mod error;
pub mod fingerprint;
pub mod traits;
pub mod types;

pub use error::{Error, Result};
pub use fingerprint::{fingerprint, Fingerprint};
pub use traits::{EmbedProvider, Record};
pub use types::{Embedding, RankedItem, SearchMode, SearchQuery};
