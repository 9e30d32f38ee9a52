#![allow(dead_code)]

use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A temporary project directory for CLI tests.
pub struct TestProject {
    pub dir: TempDir,
}

impl TestProject {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");
        Self { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write a file relative to the project root, creating parent dirs as needed.
    pub fn write_file(&self, relative_path: &str, content: &str) {
        let full = self.dir.path().join(relative_path);
        if let Some(parent) = full.parent() {
            std::fs::create_dir_all(parent).expect("failed to create parent dirs");
        }
        std::fs::write(&full, content).expect("failed to write file");
    }

    /// Write `ranking_members.db` and `ranking_parties.db` at the project root,
    /// shaped like the ranking job's output.
    pub fn write_ranking_dbs(&self) {
        let conn = rusqlite::Connection::open(self.path().join("ranking_members.db"))
            .expect("failed to create members db");
        conn.execute_batch(
            r#"
            CREATE TABLE ranking_members (
                HG_NM TEXT, POLY_NM TEXT, 총점 REAL, 출석 REAL, 법안가결 REAL,
                청원제시 REAL, 청원결과 REAL, 위원회 REAL, 기권_무효 REAL,
                표결일치 REAL, 표결불일치 REAL, 총점_순위 REAL, 출석_순위 REAL,
                법안가결_순위 REAL, 청원제시_순위 REAL, 청원결과_순위 REAL,
                위원회_순위 REAL, 기권_무효_순위 REAL, 표결일치_순위 REAL,
                표결불일치_순위 REAL
            );
            INSERT INTO ranking_members VALUES
                ('이재명', '더불어민주당', 88, 95.0, 12, 5, 2, 30, 1, 90, 10, 1, 3, 1, 1, 1, 1, 1, 1, 1),
                ('김기현', '국민의힘', 80, 99.5, 8, 3, 1, 25, 2, 92, 8, 2, 1, 2, 2, 2, 2, 2, 2, 2),
                ('이준석', '개혁신당', 70, 99.5, 5, 1, 0, 10, 0, 70, 30, 3, 2, 3, 3, 3, 3, 3, 3, 3),
                ('조국', '조국혁신당', 65, 70.0, 3, 0, 0, 5, 4, 88, 12, 4, 5, 4, 4, 4, 4, 4, 4, 4),
                ('안철수', '국민의힘', 60, 80.0, 1, 0, 0, 2, 1, 85, 15, 5, 4, 5, 5, 5, 5, 5, 5, 5);
            "#,
        )
        .expect("failed to write members db");

        let conn = rusqlite::Connection::open(self.path().join("ranking_parties.db"))
            .expect("failed to create parties db");
        conn.execute_batch(
            r#"
            CREATE TABLE party_score (
                POLY_NM TEXT, 평균실적 REAL, 의원수 INTEGER, 가중점수 REAL,
                평균실적_순위 REAL, 의원수_순위 REAL, 가중점수_순위 REAL
            );
            INSERT INTO party_score VALUES
                ('더불어민주당', 72.5, 170, 80.0, 1, 1, 1),
                ('국민의힘', 70.0, 108, 75.0, 2, 2, 2),
                ('조국혁신당', 66.0, 12, 50.0, 3, 3, 3),
                ('개혁신당', 65.0, 3, 40.0, 4, 4, 4);

            CREATE TABLE party_statistics_kr (
                정당 TEXT,
                출석_평균 REAL, 출석_최고 REAL, 출석_최저 REAL, 출석_표준편차 REAL,
                기권무효_평균 REAL, 기권무효_최고 REAL, 기권무효_최저 REAL, 기권무효_표준편차 REAL,
                표결일치_평균 REAL, 표결일치_최고 REAL, 표결일치_최저 REAL, 표결일치_표준편차 REAL,
                표결불일치_평균 REAL, 표결불일치_최고 REAL, 표결불일치_최저 REAL, 표결불일치_표준편차 REAL,
                법안가결_총합 REAL, 청원제시_총합 REAL, 청원결과_총합 REAL, 위원회_총합 REAL
            );
            INSERT INTO party_statistics_kr VALUES
                ('더불어민주당', 94, 100, 70, 3.5, 1, 4, 0, 0.8, 90, 99, 60, 5, 10, 40, 1, 5, 1200, 300, 80, 4500),
                ('국민의힘', 96, 100, 75, 2.5, 2, 6, 0, 1.1, 92, 99.5, 65, 4, 8, 35, 0.5, 4, 800, 150, 40, 3000),
                ('조국혁신당', 91, 98, 80, 4, 0.5, 2, 0, 0.4, 95, 99, 88, 2, 5, 12, 1, 2, 60, 20, 5, 200);
            "#,
        )
        .expect("failed to write parties db");
    }

    /// Initialize parlbot in this project directory.
    pub fn parlbot_init(&self) {
        std::process::Command::new(Self::parlbot_bin())
            .arg("init")
            .arg(self.path())
            .output()
            .expect("parlbot init failed");
    }

    /// Return the path to the parlbot binary (built via cargo).
    pub fn parlbot_bin() -> PathBuf {
        PathBuf::from(env!("CARGO_BIN_EXE_parlbot"))
    }
}

/// Create an initialized project with ranking databases in place.
pub fn init_project() -> TestProject {
    let project = TestProject::new();
    project.write_ranking_dbs();
    project.parlbot_init();
    project
}
