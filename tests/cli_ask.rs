mod common;

use assert_cmd::Command;
use common::{init_project, TestProject};
use predicates::prelude::*;

const NO_DATA: &str = "관련 데이터가 없습니다";

/// Run `--json ask --context-only` and parse the output
fn ask_context(project: &TestProject, question: &str) -> serde_json::Value {
    let output = Command::new(TestProject::parlbot_bin())
        .args(["--json", "ask", "--context-only", question])
        .arg(project.path())
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    serde_json::from_slice(&output).unwrap()
}

#[test]
fn ask_party_alias_resolves_both_party_tables() {
    let project = init_project();
    let json = ask_context(&project, "국힘 의원수는?");

    assert_eq!(json["intent"]["kind"], "party");
    assert_eq!(json["intent"]["party"], "국민의힘");
    assert_eq!(json["data"]["party_score"][0]["POLY_NM"], "국민의힘");
    assert_eq!(json["data"]["party_score"][0]["의원수"], 108);
    assert_eq!(json["data"]["party_statistics_kr"][0]["정당"], "국민의힘");
    assert_eq!(json["provenance"]["source"], "party");
    assert!(json.get("answer").is_none());
}

#[test]
fn ask_member_name_takes_precedence_over_metric() {
    let project = init_project();
    let json = ask_context(&project, "이재명 의원 출석률 알려줘");

    assert_eq!(json["intent"]["kind"], "member");
    assert_eq!(json["intent"]["name"], "이재명");
    let rows = json["data"]["ranking_members"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["출석"], 95.0);
}

#[test]
fn ask_superlative_returns_single_top_row() {
    let project = init_project();
    let json = ask_context(&project, "출석 가장 높은 의원은?");

    assert_eq!(json["intent"]["kind"], "metric");
    assert_eq!(json["intent"]["column"], "출석");
    assert_eq!(json["intent"]["mode"], "max");
    let rows = json["data"]["ranking_members"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    // 김기현 and 이준석 tie at 99.5; the earlier row wins
    assert_eq!(rows[0]["HG_NM"], "김기현");
    assert_eq!(json["provenance"]["value"], 99.5);
}

#[test]
fn ask_party_scope_superlative_uses_party_tables() {
    let project = init_project();
    let json = ask_context(&project, "의원수가 가장 적은 정당은?");

    assert_eq!(json["intent"]["table"], "party_score");
    assert_eq!(json["intent"]["mode"], "min");
    assert_eq!(json["data"]["party_score"][0]["POLY_NM"], "개혁신당");
}

#[test]
fn ask_unknown_returns_no_data_without_model() {
    let project = init_project();

    let output = Command::new(TestProject::parlbot_bin())
        .env_remove("GROQ_API_KEY")
        .args(["--json", "ask", "안녕"])
        .arg(project.path())
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let json: serde_json::Value = serde_json::from_slice(&output).unwrap();

    assert_eq!(json["intent"]["kind"], "unknown");
    assert_eq!(json["data"], serde_json::json!({}));
    assert!(json["answer"].as_str().unwrap().contains(NO_DATA));
}

#[test]
fn ask_without_api_key_prints_fallback() {
    let project = init_project();

    Command::new(TestProject::parlbot_bin())
        .env_remove("GROQ_API_KEY")
        .args(["ask", "국힘 의원수는?"])
        .arg(project.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("답변을 생성할 수 없습니다"));
}

#[test]
fn ask_context_only_prints_rendered_context() {
    let project = init_project();

    Command::new(TestProject::parlbot_bin())
        .args(["ask", "--context-only", "조국혁신당 출석"])
        .arg(project.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("[질문과 관련된 데이터]"))
        .stdout(predicate::str::contains("조국혁신당"))
        .stdout(predicate::str::contains("사용자 질문: 조국혁신당 출석"));
}

#[test]
fn ask_logs_questions() {
    let project = init_project();
    ask_context(&project, "국힘");
    ask_context(&project, "안녕");

    let log = std::fs::read_to_string(project.path().join(".parlbot/metrics.jsonl")).unwrap();
    let lines: Vec<serde_json::Value> = log
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["intent"], "party");
    assert_eq!(lines[0]["source"], "cli");
    assert_eq!(lines[1]["intent"], "unknown");
}

#[test]
fn ask_missing_databases_is_empty_not_error() {
    let project = TestProject::new();
    project.parlbot_init();

    let json = ask_context(&project, "국힘 의원수는?");
    assert_eq!(json["intent"]["kind"], "party");
    assert_eq!(json["data"], serde_json::json!({}));
    assert_eq!(json["provenance"]["source"], "none");
}

#[test]
fn ask_not_initialized_fails() {
    let project = TestProject::new();

    Command::new(TestProject::parlbot_bin())
        .args(["ask", "국힘"])
        .arg(project.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("not initialized"));
}

#[test]
fn ask_empty_question_fails() {
    let project = init_project();

    Command::new(TestProject::parlbot_bin())
        .args(["ask", "   "])
        .arg(project.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("must not be empty"));
}
