//! Links Loteca lottery fixtures to BetExplorer matches.
//!
//! Team labels from both sources are parsed into a formatted name plus
//! tokens, a rule-based alias dictionary is seeded from them, and the linker
//! runs a fixed list of passes from strict to loose, growing the dictionary
//! as it goes.

pub mod alias;
pub mod db;
pub mod error;
pub mod linker;
pub mod matches;
pub mod metrics;
pub mod pipeline;
pub mod settings;
pub mod teams;
