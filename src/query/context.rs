use serde::Serialize;

use super::resolve::ResolvedRows;
use crate::types::{Column, Intent, Mode, Table};

/// Where the resolved rows came from
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum Provenance {
    /// Nothing matched, or nothing was looked up
    None,
    Member {
        table: Table,
    },
    Party {
        tables: Vec<Table>,
    },
    Metric {
        table: Table,
        column: Column,
        mode: Mode,
        #[serde(skip_serializing_if = "Option::is_none")]
        value: Option<f64>,
    },
}

/// Grounding payload for one question
#[derive(Debug, Clone, Serialize)]
pub struct Context {
    pub question: String,
    pub intent: Intent,
    pub data: ResolvedRows,
    pub provenance: Provenance,
    pub truncated: bool,
    #[serde(skip_serializing_if = "is_zero")]
    pub omitted_rows: usize,
}

fn is_zero(n: &usize) -> bool {
    *n == 0
}

impl Context {
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Storage fault hit while resolving, if any
    pub fn fault(&self) -> Option<&str> {
        self.data.fault()
    }

    /// Text handed to the answering model as the user turn
    pub fn render(&self) -> String {
        let data = serde_json::to_string(&self.data).unwrap_or_else(|_| "{}".to_string());
        let provenance =
            serde_json::to_string(&self.provenance).unwrap_or_else(|_| "{}".to_string());

        let mut out = String::new();
        out.push_str("[질문과 관련된 데이터]\n");
        out.push_str(&data);
        out.push_str("\n\n[데이터 출처]\n");
        out.push_str(&provenance);
        out.push('\n');
        if self.truncated {
            out.push_str(&format!(
                "(행이 많아 {}개를 생략했습니다)\n",
                self.omitted_rows
            ));
        }
        out.push_str(&format!("\n사용자 질문: {}\n답변:", self.question));
        out
    }
}

/// Package resolved rows with their provenance, keeping at most `max_rows`.
pub fn assemble(
    question: &str,
    intent: Intent,
    mut data: ResolvedRows,
    max_rows: usize,
) -> Context {
    let omitted_rows = data.truncate(max_rows);
    if omitted_rows > 0 {
        tracing::debug!(omitted_rows, max_rows, "Context truncated");
    }

    let provenance = if data.is_empty() {
        Provenance::None
    } else {
        match &intent {
            Intent::Unknown => Provenance::None,
            Intent::Member { .. } => Provenance::Member {
                table: Table::Members,
            },
            Intent::Party { .. } => Provenance::Party {
                tables: data.tables().collect(),
            },
            Intent::Metric {
                table,
                column,
                mode,
            } => Provenance::Metric {
                table: *table,
                column: *column,
                mode: *mode,
                value: data.rows().next().and_then(|r| r.value(*column)),
            },
        }
    };

    Context {
        question: question.trim().to_string(),
        intent,
        data,
        provenance,
        truncated: omitted_rows > 0,
        omitted_rows,
    }
}
