use serde::{Serialize, Serializer};

/// One of the three ranking tables produced by the weighting job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Table {
    #[serde(rename = "ranking_members")]
    Members,
    #[serde(rename = "party_score")]
    PartyScore,
    #[serde(rename = "party_statistics_kr")]
    PartyStatistics,
}

impl Table {
    pub fn sql_name(self) -> &'static str {
        match self {
            Table::Members => "ranking_members",
            Table::PartyScore => "party_score",
            Table::PartyStatistics => "party_statistics_kr",
        }
    }

    /// Column holding the row's identity (member or party name)
    pub fn key_column(self) -> &'static str {
        match self {
            Table::Members => "HG_NM",
            Table::PartyScore => "POLY_NM",
            Table::PartyStatistics => "정당",
        }
    }
}

impl std::fmt::Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.sql_name())
    }
}

/// A numeric column that can be ranked with an order-by query.
///
/// Serializes as the physical column name so provenance reads the same as the
/// stored data handed to the answering model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    // ranking_members
    TotalScore,
    Attendance,
    BillPassage,
    PetitionsFiled,
    PetitionsResolved,
    Committee,
    AbstentionInvalid,
    VoteAgreement,
    VoteDisagreement,
    // party_score
    AverageScore,
    MemberCount,
    WeightedScore,
    // party_statistics_kr
    AttendanceMean,
    AbstentionMean,
    AgreementMean,
    DisagreementMean,
    BillPassageTotal,
    PetitionsFiledTotal,
    PetitionsResolvedTotal,
    CommitteeTotal,
}

impl Column {
    pub fn table(self) -> Table {
        use Column::*;
        match self {
            TotalScore | Attendance | BillPassage | PetitionsFiled | PetitionsResolved
            | Committee | AbstentionInvalid | VoteAgreement | VoteDisagreement => Table::Members,
            AverageScore | MemberCount | WeightedScore => Table::PartyScore,
            AttendanceMean | AbstentionMean | AgreementMean | DisagreementMean
            | BillPassageTotal | PetitionsFiledTotal | PetitionsResolvedTotal | CommitteeTotal => {
                Table::PartyStatistics
            }
        }
    }

    pub fn sql_name(self) -> &'static str {
        use Column::*;
        match self {
            TotalScore => "총점",
            Attendance => "출석",
            BillPassage => "법안가결",
            PetitionsFiled => "청원제시",
            PetitionsResolved => "청원결과",
            Committee => "위원회",
            AbstentionInvalid => "기권_무효",
            VoteAgreement => "표결일치",
            VoteDisagreement => "표결불일치",
            AverageScore => "평균실적",
            MemberCount => "의원수",
            WeightedScore => "가중점수",
            AttendanceMean => "출석_평균",
            AbstentionMean => "기권무효_평균",
            AgreementMean => "표결일치_평균",
            DisagreementMean => "표결불일치_평균",
            BillPassageTotal => "법안가결_총합",
            PetitionsFiledTotal => "청원제시_총합",
            PetitionsResolvedTotal => "청원결과_총합",
            CommitteeTotal => "위원회_총합",
        }
    }
}

impl Serialize for Column {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.sql_name())
    }
}

impl std::fmt::Display for Column {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.sql_name())
    }
}

/// Ordering direction requested by a superlative cue.
///
/// `Max` always means the largest raw value and `Min` the smallest, whatever
/// the metric. Whether a large value is good is left to the reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Max,
    Min,
}

impl Mode {
    pub fn sql_order(self) -> &'static str {
        match self {
            Mode::Max => "DESC",
            Mode::Min => "ASC",
        }
    }
}

/// What a question is asking about
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Intent {
    Member { name: String },
    Party { party: String },
    Metric { table: Table, column: Column, mode: Mode },
    Unknown,
}

impl Intent {
    pub fn metric(column: Column, mode: Mode) -> Self {
        Intent::Metric {
            table: column.table(),
            column,
            mode,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Intent::Member { .. } => "member",
            Intent::Party { .. } => "party",
            Intent::Metric { .. } => "metric",
            Intent::Unknown => "unknown",
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Intent::Unknown)
    }
}

/// A row of `ranking_members`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemberRow {
    #[serde(rename = "HG_NM")]
    pub name: String,
    #[serde(rename = "POLY_NM")]
    pub party: String,
    #[serde(rename = "총점")]
    pub total_score: f64,
    #[serde(rename = "출석")]
    pub attendance: f64,
    #[serde(rename = "법안가결")]
    pub bill_passage: f64,
    #[serde(rename = "청원제시")]
    pub petitions_filed: f64,
    #[serde(rename = "청원결과")]
    pub petitions_resolved: f64,
    #[serde(rename = "위원회")]
    pub committee: f64,
    #[serde(rename = "기권_무효")]
    pub abstention_invalid: f64,
    #[serde(rename = "표결일치")]
    pub vote_agreement: f64,
    #[serde(rename = "표결불일치")]
    pub vote_disagreement: f64,
    #[serde(rename = "총점_순위")]
    pub total_score_rank: i64,
    #[serde(rename = "출석_순위")]
    pub attendance_rank: i64,
    #[serde(rename = "법안가결_순위")]
    pub bill_passage_rank: i64,
    #[serde(rename = "청원제시_순위")]
    pub petitions_filed_rank: i64,
    #[serde(rename = "청원결과_순위")]
    pub petitions_resolved_rank: i64,
    #[serde(rename = "위원회_순위")]
    pub committee_rank: i64,
    #[serde(rename = "기권_무효_순위")]
    pub abstention_invalid_rank: i64,
    #[serde(rename = "표결일치_순위")]
    pub vote_agreement_rank: i64,
    #[serde(rename = "표결불일치_순위")]
    pub vote_disagreement_rank: i64,
}

/// A row of `party_score`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PartyScoreRow {
    #[serde(rename = "POLY_NM")]
    pub party: String,
    #[serde(rename = "평균실적")]
    pub average_score: f64,
    #[serde(rename = "의원수")]
    pub member_count: i64,
    #[serde(rename = "가중점수")]
    pub weighted_score: f64,
    #[serde(rename = "평균실적_순위")]
    pub average_score_rank: i64,
    #[serde(rename = "의원수_순위")]
    pub member_count_rank: i64,
    #[serde(rename = "가중점수_순위")]
    pub weighted_score_rank: i64,
}

/// A row of `party_statistics_kr`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PartyStatsRow {
    #[serde(rename = "정당")]
    pub party: String,
    #[serde(rename = "출석_평균")]
    pub attendance_mean: f64,
    #[serde(rename = "출석_최고")]
    pub attendance_max: f64,
    #[serde(rename = "출석_최저")]
    pub attendance_min: f64,
    #[serde(rename = "출석_표준편차")]
    pub attendance_std: f64,
    #[serde(rename = "기권무효_평균")]
    pub abstention_mean: f64,
    #[serde(rename = "기권무효_최고")]
    pub abstention_max: f64,
    #[serde(rename = "기권무효_최저")]
    pub abstention_min: f64,
    #[serde(rename = "기권무효_표준편차")]
    pub abstention_std: f64,
    #[serde(rename = "표결일치_평균")]
    pub agreement_mean: f64,
    #[serde(rename = "표결일치_최고")]
    pub agreement_max: f64,
    #[serde(rename = "표결일치_최저")]
    pub agreement_min: f64,
    #[serde(rename = "표결일치_표준편차")]
    pub agreement_std: f64,
    #[serde(rename = "표결불일치_평균")]
    pub disagreement_mean: f64,
    #[serde(rename = "표결불일치_최고")]
    pub disagreement_max: f64,
    #[serde(rename = "표결불일치_최저")]
    pub disagreement_min: f64,
    #[serde(rename = "표결불일치_표준편차")]
    pub disagreement_std: f64,
    #[serde(rename = "법안가결_총합")]
    pub bill_passage_total: f64,
    #[serde(rename = "청원제시_총합")]
    pub petitions_filed_total: f64,
    #[serde(rename = "청원결과_총합")]
    pub petitions_resolved_total: f64,
    #[serde(rename = "위원회_총합")]
    pub committee_total: f64,
}

/// A resolved row from any of the ranking tables.
///
/// Untagged so that serialization yields the plain column → value mapping.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Row {
    Member(MemberRow),
    PartyScore(PartyScoreRow),
    PartyStats(PartyStatsRow),
}

impl Row {
    pub fn table(&self) -> Table {
        match self {
            Row::Member(_) => Table::Members,
            Row::PartyScore(_) => Table::PartyScore,
            Row::PartyStats(_) => Table::PartyStatistics,
        }
    }

    /// Member name or party name
    pub fn label(&self) -> &str {
        match self {
            Row::Member(m) => &m.name,
            Row::PartyScore(p) => &p.party,
            Row::PartyStats(p) => &p.party,
        }
    }

    /// Value of a rankable column, if this row belongs to the column's table
    pub fn value(&self, column: Column) -> Option<f64> {
        use Column::*;
        let v = match (self, column) {
            (Row::Member(m), TotalScore) => m.total_score,
            (Row::Member(m), Attendance) => m.attendance,
            (Row::Member(m), BillPassage) => m.bill_passage,
            (Row::Member(m), PetitionsFiled) => m.petitions_filed,
            (Row::Member(m), PetitionsResolved) => m.petitions_resolved,
            (Row::Member(m), Committee) => m.committee,
            (Row::Member(m), AbstentionInvalid) => m.abstention_invalid,
            (Row::Member(m), VoteAgreement) => m.vote_agreement,
            (Row::Member(m), VoteDisagreement) => m.vote_disagreement,
            (Row::PartyScore(p), AverageScore) => p.average_score,
            (Row::PartyScore(p), MemberCount) => p.member_count as f64,
            (Row::PartyScore(p), WeightedScore) => p.weighted_score,
            (Row::PartyStats(p), AttendanceMean) => p.attendance_mean,
            (Row::PartyStats(p), AbstentionMean) => p.abstention_mean,
            (Row::PartyStats(p), AgreementMean) => p.agreement_mean,
            (Row::PartyStats(p), DisagreementMean) => p.disagreement_mean,
            (Row::PartyStats(p), BillPassageTotal) => p.bill_passage_total,
            (Row::PartyStats(p), PetitionsFiledTotal) => p.petitions_filed_total,
            (Row::PartyStats(p), PetitionsResolvedTotal) => p.petitions_resolved_total,
            (Row::PartyStats(p), CommitteeTotal) => p.committee_total,
            _ => return None,
        };
        Some(v)
    }
}

/// Row counts per table
#[derive(Debug, Clone, Default, Serialize, serde::Deserialize)]
pub struct TableCounts {
    pub members: u64,
    pub party_score: u64,
    pub party_statistics: u64,
}
