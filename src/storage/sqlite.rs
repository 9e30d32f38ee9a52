use anyhow::{Context, Result};
use rusqlite::{Connection, OpenFlags, OptionalExtension};
use std::collections::BTreeSet;
use std::path::Path;

use super::StatsSource;
use crate::types::{
    Column, MemberRow, Mode, PartyScoreRow, PartyStatsRow, Row, Table, TableCounts,
};

const MEMBER_COLUMNS: &str = r#""HG_NM", "POLY_NM", "총점", "출석", "법안가결", "청원제시",
    "청원결과", "위원회", "기권_무효", "표결일치", "표결불일치", "총점_순위", "출석_순위",
    "법안가결_순위", "청원제시_순위", "청원결과_순위", "위원회_순위", "기권_무효_순위",
    "표결일치_순위", "표결불일치_순위""#;

const PARTY_SCORE_COLUMNS: &str = r#""POLY_NM", "평균실적", "의원수", "가중점수",
    "평균실적_순위", "의원수_순위", "가중점수_순위""#;

const PARTY_STATS_COLUMNS: &str = r#""정당", "출석_평균", "출석_최고", "출석_최저",
    "출석_표준편차", "기권무효_평균", "기권무효_최고", "기권무효_최저", "기권무효_표준편차",
    "표결일치_평균", "표결일치_최고", "표결일치_최저", "표결일치_표준편차", "표결불일치_평균",
    "표결불일치_최고", "표결불일치_최저", "표결불일치_표준편차", "법안가결_총합",
    "청원제시_총합", "청원결과_총합", "위원회_총합""#;

/// Read-only access to the member and party ranking databases
pub struct StatsStore {
    members: Connection,
    parties: Connection,
}

impl StatsStore {
    /// Open both ranking databases read-only
    pub fn open(members_path: &Path, parties_path: &Path) -> Result<Self> {
        Ok(Self {
            members: open_readonly(members_path)?,
            parties: open_readonly(parties_path)?,
        })
    }

    fn conn(&self, table: Table) -> &Connection {
        match table {
            Table::Members => &self.members,
            Table::PartyScore | Table::PartyStatistics => &self.parties,
        }
    }

    fn names(&self, table: Table) -> Result<Vec<String>> {
        let sql = format!(
            r#"SELECT "{key}" FROM {table} WHERE "{key}" IS NOT NULL ORDER BY rowid"#,
            key = table.key_column(),
        );
        let mut stmt = self
            .conn(table)
            .prepare(&sql)
            .with_context(|| format!("Failed to read names from {table}"))?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(names
            .into_iter()
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .collect())
    }

    fn count(&self, table: Table) -> Result<u64> {
        let n: i64 = self
            .conn(table)
            .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| {
                row.get(0)
            })
            .with_context(|| format!("Failed to count rows in {table}"))?;
        Ok(n.max(0) as u64)
    }
}

impl StatsSource for StatsStore {
    fn member_names(&self) -> Result<Vec<String>> {
        self.names(Table::Members)
    }

    fn party_names(&self) -> Result<Vec<String>> {
        // Either table alone is enough to know the parties
        let score = self.names(Table::PartyScore);
        let stats = self.names(Table::PartyStatistics);
        let (score, stats) = match (score, stats) {
            (Err(e), Err(_)) => return Err(e),
            (score, stats) => (score.unwrap_or_default(), stats.unwrap_or_default()),
        };

        let mut seen = BTreeSet::new();
        Ok(score
            .into_iter()
            .chain(stats)
            .filter(|p| seen.insert(p.clone()))
            .collect())
    }

    fn member_by_name(&self, name: &str) -> Result<Option<MemberRow>> {
        let sql = format!(
            r#"SELECT {MEMBER_COLUMNS} FROM ranking_members WHERE "HG_NM" = ?1 LIMIT 1"#
        );
        let row = self
            .members
            .query_row(&sql, [name], member_from_row)
            .optional()
            .with_context(|| format!("Failed to look up member {name}"))?;
        Ok(row)
    }

    fn party_score(&self, party: &str) -> Result<Option<PartyScoreRow>> {
        let sql = format!(
            r#"SELECT {PARTY_SCORE_COLUMNS} FROM party_score WHERE "POLY_NM" = ?1 LIMIT 1"#
        );
        let row = self
            .parties
            .query_row(&sql, [party], party_score_from_row)
            .optional()
            .with_context(|| format!("Failed to look up party score for {party}"))?;
        Ok(row)
    }

    fn party_statistics(&self, party: &str) -> Result<Option<PartyStatsRow>> {
        let sql = format!(
            r#"SELECT {PARTY_STATS_COLUMNS} FROM party_statistics_kr WHERE "정당" = ?1 LIMIT 1"#
        );
        let row = self
            .parties
            .query_row(&sql, [party], party_stats_from_row)
            .optional()
            .with_context(|| format!("Failed to look up party statistics for {party}"))?;
        Ok(row)
    }

    fn top_by(&self, column: Column, mode: Mode) -> Result<Option<Row>> {
        let table = column.table();
        let columns = match table {
            Table::Members => MEMBER_COLUMNS,
            Table::PartyScore => PARTY_SCORE_COLUMNS,
            Table::PartyStatistics => PARTY_STATS_COLUMNS,
        };
        // Column and table names come from closed enums, never from user text
        let sql = format!(
            r#"SELECT {columns} FROM {table}
               WHERE "{col}" IS NOT NULL
               ORDER BY "{col}" {order}, rowid ASC
               LIMIT 1"#,
            col = column.sql_name(),
            order = mode.sql_order(),
        );

        let row = self
            .conn(table)
            .query_row(&sql, [], |row| match table {
                Table::Members => member_from_row(row).map(Row::Member),
                Table::PartyScore => party_score_from_row(row).map(Row::PartyScore),
                Table::PartyStatistics => party_stats_from_row(row).map(Row::PartyStats),
            })
            .optional()
            .with_context(|| format!("Failed to rank {table} by {column}"))?;
        Ok(row)
    }

    fn table_counts(&self) -> Result<TableCounts> {
        Ok(TableCounts {
            members: self.count(Table::Members)?,
            party_score: self.count(Table::PartyScore)?,
            party_statistics: self.count(Table::PartyStatistics)?,
        })
    }
}

fn open_readonly(path: &Path) -> Result<Connection> {
    if !path.exists() {
        anyhow::bail!("Ranking database not found: {}", path.display());
    }
    Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)
        .with_context(|| format!("Failed to open database: {}", path.display()))
}

/// Numeric cell that may be stored as INTEGER or REAL; NULL reads as zero
fn real(row: &rusqlite::Row<'_>, idx: usize) -> rusqlite::Result<f64> {
    Ok(row.get::<_, Option<f64>>(idx)?.unwrap_or(0.0))
}

/// Ranks and counts are written as floats by the ranking job
fn int(row: &rusqlite::Row<'_>, idx: usize) -> rusqlite::Result<i64> {
    Ok(real(row, idx)?.round() as i64)
}

fn member_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<MemberRow> {
    Ok(MemberRow {
        name: row.get(0)?,
        party: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
        total_score: real(row, 2)?,
        attendance: real(row, 3)?,
        bill_passage: real(row, 4)?,
        petitions_filed: real(row, 5)?,
        petitions_resolved: real(row, 6)?,
        committee: real(row, 7)?,
        abstention_invalid: real(row, 8)?,
        vote_agreement: real(row, 9)?,
        vote_disagreement: real(row, 10)?,
        total_score_rank: int(row, 11)?,
        attendance_rank: int(row, 12)?,
        bill_passage_rank: int(row, 13)?,
        petitions_filed_rank: int(row, 14)?,
        petitions_resolved_rank: int(row, 15)?,
        committee_rank: int(row, 16)?,
        abstention_invalid_rank: int(row, 17)?,
        vote_agreement_rank: int(row, 18)?,
        vote_disagreement_rank: int(row, 19)?,
    })
}

fn party_score_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<PartyScoreRow> {
    Ok(PartyScoreRow {
        party: row.get(0)?,
        average_score: real(row, 1)?,
        member_count: int(row, 2)?,
        weighted_score: real(row, 3)?,
        average_score_rank: int(row, 4)?,
        member_count_rank: int(row, 5)?,
        weighted_score_rank: int(row, 6)?,
    })
}

fn party_stats_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<PartyStatsRow> {
    Ok(PartyStatsRow {
        party: row.get(0)?,
        attendance_mean: real(row, 1)?,
        attendance_max: real(row, 2)?,
        attendance_min: real(row, 3)?,
        attendance_std: real(row, 4)?,
        abstention_mean: real(row, 5)?,
        abstention_max: real(row, 6)?,
        abstention_min: real(row, 7)?,
        abstention_std: real(row, 8)?,
        agreement_mean: real(row, 9)?,
        agreement_max: real(row, 10)?,
        agreement_min: real(row, 11)?,
        agreement_std: real(row, 12)?,
        disagreement_mean: real(row, 13)?,
        disagreement_max: real(row, 14)?,
        disagreement_min: real(row, 15)?,
        disagreement_std: real(row, 16)?,
        bill_passage_total: real(row, 17)?,
        petitions_filed_total: real(row, 18)?,
        petitions_resolved_total: real(row, 19)?,
        committee_total: real(row, 20)?,
    })
}
