//! Entity extraction: decides what a question is about.
//!
//! Precedence is member name, then party, then a ranked metric. A name is
//! more specific than a ranking request, so "이재명 의원 출석은?" is about the
//! member even though it also mentions attendance.

use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;

use super::alias::{AliasTable, FALLBACK_PARTIES};
use crate::storage::StatsSource;
use crate::types::{Column, Intent, Mode};

/// Metric keywords with the member-table column and the party-table column
/// they stand for. Longer keywords win when several match ("불일치" over "일치").
const METRIC_KEYWORDS: &[(&str, Column, Column)] = &[
    ("총점", Column::TotalScore, Column::AverageScore),
    ("출석", Column::Attendance, Column::AttendanceMean),
    ("법안", Column::BillPassage, Column::BillPassageTotal),
    ("가결", Column::BillPassage, Column::BillPassageTotal),
    ("청원제시", Column::PetitionsFiled, Column::PetitionsFiledTotal),
    ("청원 제시", Column::PetitionsFiled, Column::PetitionsFiledTotal),
    ("청원결과", Column::PetitionsResolved, Column::PetitionsResolvedTotal),
    ("청원 결과", Column::PetitionsResolved, Column::PetitionsResolvedTotal),
    ("청원", Column::PetitionsFiled, Column::PetitionsFiledTotal),
    ("위원회", Column::Committee, Column::CommitteeTotal),
    ("기권", Column::AbstentionInvalid, Column::AbstentionMean),
    ("무효", Column::AbstentionInvalid, Column::AbstentionMean),
    ("표결불일치", Column::VoteDisagreement, Column::DisagreementMean),
    ("불일치", Column::VoteDisagreement, Column::DisagreementMean),
    ("표결일치", Column::VoteAgreement, Column::AgreementMean),
    ("일치", Column::VoteAgreement, Column::AgreementMean),
];

/// Keywords that only exist at party level
const PARTY_METRIC_KEYWORDS: &[(&str, Column)] = &[
    ("의원수", Column::MemberCount),
    ("의원 수", Column::MemberCount),
    ("평균실적", Column::AverageScore),
    ("평균 실적", Column::AverageScore),
    ("가중점수", Column::WeightedScore),
    ("가중 점수", Column::WeightedScore),
    ("가중치", Column::WeightedScore),
];

/// Words that move a shared metric from the member table to the party tables
const PARTY_SCOPE_CUES: &[&str] = &["정당", "어느 당", "어떤 당", "무슨 당"];

// "1위" must not be the tail of "11위" or "21등"
static MAX_CUE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?:^|[^0-9])1\s*(?:위|등)",
        r"|일등|최고|최대|최다|(가장|제일)\s*(높|많|큰|잘)",
    ))
    .unwrap()
});

static MIN_CUE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"꼴\s*찌|꼴\s*등|최하위|최저|최소|(가장|제일)\s*(낮|적|작|못)").unwrap()
});

/// Classifies questions against the member and party names known at load time.
///
/// Built once and shared read-only; reloading builds a fresh one.
#[derive(Debug, Clone)]
pub struct Extractor {
    aliases: AliasTable,
    /// Longest first, so "남인순" is tried before a shorter name inside it
    members: Vec<String>,
    parties: Vec<String>,
}

impl Extractor {
    pub fn new(members: Vec<String>, parties: Vec<String>, aliases: AliasTable) -> Self {
        let mut members: Vec<String> = members
            .into_iter()
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
            .collect();
        members.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()).then(a.cmp(b)));
        members.dedup();

        Self {
            aliases,
            members,
            parties,
        }
    }

    /// Build from the current tables.
    ///
    /// Unreadable member names leave member matching empty; unreadable party
    /// names fall back to the fixed party list.
    pub fn load(source: &dyn StatsSource, extra_aliases: &BTreeMap<String, String>) -> Self {
        let members = source.member_names().unwrap_or_else(|e| {
            tracing::warn!("Failed to load member names: {:#}", e);
            Vec::new()
        });
        let parties = match source.party_names() {
            Ok(p) if !p.is_empty() => p,
            Ok(_) => {
                tracing::warn!("Party tables are empty, using fallback party list");
                fallback_parties()
            }
            Err(e) => {
                tracing::warn!("Failed to load party names, using fallback list: {:#}", e);
                fallback_parties()
            }
        };
        Self::with_parties(members, parties, extra_aliases)
    }

    /// Lexicon used when the ranking databases cannot be opened at all
    pub fn fallback(extra_aliases: &BTreeMap<String, String>) -> Self {
        Self::with_parties(Vec::new(), fallback_parties(), extra_aliases)
    }

    fn with_parties(
        members: Vec<String>,
        parties: Vec<String>,
        extra_aliases: &BTreeMap<String, String>,
    ) -> Self {
        let aliases = AliasTable::build(extra_aliases, parties.iter().map(String::as_str));
        Self::new(members, parties, aliases)
    }

    pub fn aliases(&self) -> &AliasTable {
        &self.aliases
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    pub fn parties(&self) -> &[String] {
        &self.parties
    }

    /// Classify a question. Never fails; anything unrecognised is `Unknown`.
    pub fn extract(&self, text: &str) -> Intent {
        let text = text.trim();
        if text.is_empty() {
            return Intent::Unknown;
        }

        let party = self.aliases.find(text);

        // Blank out the party mention so a short member name inside it
        // ("조국" in "조국혁신당") is not mistaken for the member.
        let member_text = match &party {
            Some(m) => text.replace(m.alias, " "),
            None => text.to_string(),
        };
        if let Some(name) = self.find_member(&member_text) {
            return Intent::Member {
                name: name.to_string(),
            };
        }

        if let Some(m) = party {
            return Intent::Party {
                party: m.canonical.to_string(),
            };
        }

        match (find_metric(text), superlative(text)) {
            (Some(column), Some(mode)) => Intent::metric(column, mode),
            _ => Intent::Unknown,
        }
    }

    fn find_member(&self, text: &str) -> Option<&str> {
        self.members
            .iter()
            .find(|name| text.contains(name.as_str()))
            .map(String::as_str)
    }
}

fn fallback_parties() -> Vec<String> {
    FALLBACK_PARTIES.iter().map(|p| (*p).to_string()).collect()
}

/// Column named by the longest metric keyword in `text`
fn find_metric(text: &str) -> Option<Column> {
    let party_scope = PARTY_SCOPE_CUES.iter().any(|cue| text.contains(cue));

    let shared = METRIC_KEYWORDS
        .iter()
        .filter(|(kw, _, _)| text.contains(kw))
        .map(|(kw, member_col, party_col)| {
            let col = if party_scope { *party_col } else { *member_col };
            (kw.chars().count(), col)
        });
    let party_only = PARTY_METRIC_KEYWORDS
        .iter()
        .filter(|(kw, _)| text.contains(kw))
        .map(|(kw, col)| (kw.chars().count(), *col));

    // max_by_key keeps the last maximum; reverse so the earliest entry wins ties
    let candidates: Vec<(usize, Column)> = party_only.chain(shared).collect();
    candidates
        .into_iter()
        .rev()
        .max_by_key(|(len, _)| *len)
        .map(|(_, col)| col)
}

/// Ordering requested by the first superlative cue in `text`
fn superlative(text: &str) -> Option<Mode> {
    let max = MAX_CUE.find(text).map(|m| m.start());
    let min = MIN_CUE.find(text).map(|m| m.start());
    match (max, min) {
        (Some(a), Some(b)) if b < a => Some(Mode::Min),
        (Some(_), _) => Some(Mode::Max),
        (None, Some(_)) => Some(Mode::Min),
        (None, None) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::alias::DEFAULT_ALIASES;
    use crate::types::Table;

    fn extractor() -> Extractor {
        Extractor::with_parties(
            vec![
                "이재명".to_string(),
                "김기현".to_string(),
                "조국".to_string(),
                "남인순".to_string(),
                "안철수".to_string(),
            ],
            vec![
                "더불어민주당".to_string(),
                "국민의힘".to_string(),
                "조국혁신당".to_string(),
                "개혁신당".to_string(),
            ],
            &BTreeMap::new(),
        )
    }

    #[test]
    fn test_member_name_beats_metric_keyword() {
        let intent = extractor().extract("이재명 의원 출석은 몇 점이야?");
        assert_eq!(
            intent,
            Intent::Member {
                name: "이재명".to_string()
            }
        );
    }

    #[test]
    fn test_member_name_beats_party() {
        let intent = extractor().extract("국민의힘 안철수 의원 총점 알려줘");
        assert_eq!(
            intent,
            Intent::Member {
                name: "안철수".to_string()
            }
        );
    }

    #[test]
    fn test_every_member_name_alone_is_a_member_intent() {
        let ex = extractor();
        for name in ["이재명", "김기현", "조국", "남인순", "안철수"] {
            assert_eq!(
                ex.extract(name),
                Intent::Member {
                    name: name.to_string()
                }
            );
        }
    }

    #[test]
    fn test_longest_member_name_wins() {
        let ex = Extractor::with_parties(
            vec!["김민".to_string(), "김민석".to_string()],
            vec![],
            &BTreeMap::new(),
        );
        assert_eq!(
            ex.extract("김민석 의원"),
            Intent::Member {
                name: "김민석".to_string()
            }
        );
    }

    #[test]
    fn test_member_name_inside_party_name_is_ignored() {
        let intent = extractor().extract("조국혁신당 의원수는?");
        assert_eq!(
            intent,
            Intent::Party {
                party: "조국혁신당".to_string()
            }
        );
    }

    #[test]
    fn test_party_alias_is_canonicalized() {
        let intent = extractor().extract("국힘 의원수는 몇 명이야?");
        assert_eq!(
            intent,
            Intent::Party {
                party: "국민의힘".to_string()
            }
        );
    }

    #[test]
    fn test_every_alias_yields_its_canonical_party() {
        let ex = extractor();
        for (alias, canonical) in DEFAULT_ALIASES {
            let intent = ex.extract(&format!("요즘 {alias} 평균실적 어때?"));
            assert_eq!(
                intent,
                Intent::Party {
                    party: (*canonical).to_string()
                },
                "alias {alias}"
            );
        }
    }

    #[test]
    fn test_party_beats_superlative_metric() {
        let intent = extractor().extract("더민주에서 출석 1위는?");
        assert_eq!(
            intent,
            Intent::Party {
                party: "더불어민주당".to_string()
            }
        );
    }

    #[test]
    fn test_metric_with_max_cue() {
        let intent = extractor().extract("출석률 1위는 누구야?");
        assert_eq!(
            intent,
            Intent::Metric {
                table: Table::Members,
                column: Column::Attendance,
                mode: Mode::Max,
            }
        );
    }

    #[test]
    fn test_metric_with_min_cue() {
        let intent = extractor().extract("청원 결과가 가장 적은 의원은?");
        assert_eq!(intent, Intent::metric(Column::PetitionsResolved, Mode::Min));

        let intent = extractor().extract("기권 꼴찌");
        assert_eq!(intent, Intent::metric(Column::AbstentionInvalid, Mode::Min));
    }

    #[test]
    fn test_longer_metric_keyword_wins() {
        let intent = extractor().extract("표결 불일치가 제일 많은 사람");
        assert_eq!(intent, Intent::metric(Column::VoteDisagreement, Mode::Max));
    }

    #[test]
    fn test_party_scope_metric() {
        let intent = extractor().extract("출석률이 가장 높은 정당은?");
        assert_eq!(intent, Intent::metric(Column::AttendanceMean, Mode::Max));

        let intent = extractor().extract("의원수가 가장 적은 곳은?");
        assert_eq!(intent, Intent::metric(Column::MemberCount, Mode::Min));

        let intent = extractor().extract("정당 총점 최고는?");
        assert_eq!(intent, Intent::metric(Column::AverageScore, Mode::Max));
    }

    #[test]
    fn test_first_cue_decides_mode() {
        assert_eq!(superlative("가장 낮은 출석과 가장 높은"), Some(Mode::Min));
        assert_eq!(superlative("최고와 최저"), Some(Mode::Max));
        assert_eq!(superlative("출석"), None);
    }

    #[test]
    fn test_other_ranks_are_not_first_place() {
        let ex = extractor();
        for text in [
            "출석 11위는?",
            "출석 11위는 누구야?",
            "법안 21등",
            "법안 21등 의원은?",
            "총점 101위",
        ] {
            assert_eq!(ex.extract(text), Intent::Unknown, "input {text:?}");
        }
        // still first place when the digit stands alone
        assert_eq!(
            ex.extract("출석1위"),
            Intent::metric(Column::Attendance, Mode::Max)
        );
        assert_eq!(
            ex.extract("법안 가결 1 등은?"),
            Intent::metric(Column::BillPassage, Mode::Max)
        );
    }

    #[test]
    fn test_metric_without_cue_is_unknown() {
        assert_eq!(extractor().extract("출석률이 궁금해"), Intent::Unknown);
    }

    #[test]
    fn test_unrecognised_input_is_unknown() {
        let ex = extractor();
        for text in ["", "   ", "안녕", "🙂🙂", "hello world", "1위"] {
            assert_eq!(ex.extract(text), Intent::Unknown, "input {text:?}");
        }
    }

    #[test]
    fn test_reform_party_without_table_entry_is_not_another_party() {
        let ex = Extractor::with_parties(
            vec![],
            vec!["국민의힘".to_string(), "조국혁신당".to_string()],
            &BTreeMap::new(),
        );
        assert_eq!(
            ex.extract("개혁신당 의원수는?"),
            Intent::Party {
                party: "개혁신당".to_string()
            }
        );
        assert_eq!(
            ex.extract("혁신당 의원수는?"),
            Intent::Party {
                party: "조국혁신당".to_string()
            }
        );
    }

    #[test]
    fn test_fallback_lexicon_knows_parties_only() {
        let ex = Extractor::fallback(&BTreeMap::new());
        assert_eq!(ex.member_count(), 0);
        assert!(ex.parties().iter().any(|p| p == "진보당"));
        assert_eq!(
            ex.extract("진보당 어때"),
            Intent::Party {
                party: "진보당".to_string()
            }
        );
    }
}
