pub mod sqlite;

pub use self::sqlite::StatsStore;

use anyhow::Result;

use crate::types::{Column, MemberRow, Mode, PartyScoreRow, PartyStatsRow, Row, TableCounts};

/// Read access to the ranking tables.
///
/// The tables are written by the external weighting job; nothing here mutates them.
pub trait StatsSource {
    /// Every member name, in table order
    fn member_names(&self) -> Result<Vec<String>>;

    /// Distinct party names across `party_score` and `party_statistics_kr`
    fn party_names(&self) -> Result<Vec<String>>;

    fn member_by_name(&self, name: &str) -> Result<Option<MemberRow>>;

    fn party_score(&self, party: &str) -> Result<Option<PartyScoreRow>>;

    fn party_statistics(&self, party: &str) -> Result<Option<PartyStatsRow>>;

    /// The single row with the largest (`Mode::Max`) or smallest (`Mode::Min`)
    /// value in `column`; ties go to the earliest row.
    fn top_by(&self, column: Column, mode: Mode) -> Result<Option<Row>>;

    fn table_counts(&self) -> Result<TableCounts>;
}
