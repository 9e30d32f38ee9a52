use serde::Serialize;
use std::collections::BTreeMap;

use crate::storage::StatsSource;
use crate::types::{Intent, Row, Table};

/// Rows matched for an intent, keyed by table.
///
/// Empty means "nothing matched". A storage fault also yields no rows but
/// records the fault, so callers can tell the two apart.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct ResolvedRows {
    tables: BTreeMap<Table, Vec<Row>>,
    #[serde(skip)]
    fault: Option<String>,
}

impl ResolvedRows {
    pub fn failed(err: &anyhow::Error) -> Self {
        Self {
            tables: BTreeMap::new(),
            fault: Some(format!("{err:#}")),
        }
    }

    pub fn push(&mut self, row: Row) {
        self.tables.entry(row.table()).or_default().push(row);
    }

    pub fn is_empty(&self) -> bool {
        self.tables.values().all(Vec::is_empty)
    }

    pub fn row_count(&self) -> usize {
        self.tables.values().map(Vec::len).sum()
    }

    pub fn get(&self, table: Table) -> &[Row] {
        self.tables.get(&table).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn tables(&self) -> impl Iterator<Item = Table> + '_ {
        self.tables.keys().copied()
    }

    pub fn rows(&self) -> impl Iterator<Item = &Row> {
        self.tables.values().flatten()
    }

    pub fn fault(&self) -> Option<&str> {
        self.fault.as_deref()
    }

    /// Keep at most `max` rows across all tables (in table order) and
    /// return how many were dropped.
    pub fn truncate(&mut self, max: usize) -> usize {
        let mut budget = max;
        let mut dropped = 0;
        for rows in self.tables.values_mut() {
            let keep = rows.len().min(budget);
            dropped += rows.len() - keep;
            rows.truncate(keep);
            budget -= keep;
        }
        self.tables.retain(|_, rows| !rows.is_empty());
        dropped
    }
}

/// Fetch the rows an intent refers to.
///
/// `Unknown` returns immediately without touching the source. Storage errors
/// are logged and folded into an empty, faulted result.
pub fn resolve(source: &dyn StatsSource, intent: &Intent) -> ResolvedRows {
    if intent.is_unknown() {
        return ResolvedRows::default();
    }

    match fetch(source, intent) {
        Ok(resolved) => resolved,
        Err(e) => {
            tracing::warn!(intent = intent.kind(), "Row resolution failed: {:#}", e);
            ResolvedRows::failed(&e)
        }
    }
}

fn fetch(source: &dyn StatsSource, intent: &Intent) -> anyhow::Result<ResolvedRows> {
    let mut resolved = ResolvedRows::default();
    match intent {
        Intent::Unknown => {}
        Intent::Member { name } => {
            if let Some(m) = source.member_by_name(name)? {
                resolved.push(Row::Member(m));
            }
        }
        Intent::Party { party } => {
            if let Some(s) = source.party_score(party)? {
                resolved.push(Row::PartyScore(s));
            }
            if let Some(s) = source.party_statistics(party)? {
                resolved.push(Row::PartyStats(s));
            }
        }
        Intent::Metric { column, mode, .. } => {
            if let Some(r) = source.top_by(*column, *mode)? {
                resolved.push(r);
            }
        }
    }
    Ok(resolved)
}
