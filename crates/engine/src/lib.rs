//! AVMDBG Engine - decoding and indexing of AVM debugging assets
//!
//! Turns a captured simulate response and a program sources manifest into a validated,
//! queryable [`DebuggingAssets`] bundle: the typed trace plus the source map of every program,
//! looked up by program hash.

pub mod assets;
pub use assets::*;

pub mod simulate;
pub use simulate::*;

pub mod source;
pub use source::*;

pub mod utils;
pub use utils::*;
