pub mod alias;
pub mod context;
pub mod extract;
pub mod resolve;

pub use context::{assemble, Context, Provenance};
pub use extract::Extractor;
pub use resolve::{resolve, ResolvedRows};

use anyhow::Result;
use std::path::Path;

use crate::config::Config;
use crate::storage::{StatsSource, StatsStore};

/// Build the lexicon from the configured databases, falling back to the fixed
/// party list when they are unavailable.
pub fn load_extractor(config: &Config, root: &Path) -> Extractor {
    let store = StatsStore::open(&config.members_db_path(root), &config.parties_db_path(root));
    match store {
        Ok(store) => {
            let extractor = Extractor::load(&store, &config.aliases);
            tracing::info!(
                members = extractor.member_count(),
                parties = extractor.parties().len(),
                "Lexicon loaded"
            );
            extractor
        }
        Err(e) => {
            tracing::warn!("Ranking databases unavailable, using fallback lexicon: {:#}", e);
            Extractor::fallback(&config.aliases)
        }
    }
}

/// Run a question through extraction, resolution and assembly.
///
/// The store is opened lazily: a question with no recognisable subject never
/// touches it, and an open failure is folded into a faulted empty context.
pub fn build_context<S, F>(
    extractor: &Extractor,
    open_source: F,
    question: &str,
    max_rows: usize,
) -> Context
where
    S: StatsSource,
    F: FnOnce() -> Result<S>,
{
    let intent = extractor.extract(question);
    tracing::debug!(intent = intent.kind(), "Extracted intent");

    let rows = if intent.is_unknown() {
        ResolvedRows::default()
    } else {
        match open_source() {
            Ok(source) => resolve(&source, &intent),
            Err(e) => {
                tracing::warn!("Failed to open ranking databases: {:#}", e);
                ResolvedRows::failed(&e)
            }
        }
    };

    assemble(question, intent, rows, max_rows)
}
