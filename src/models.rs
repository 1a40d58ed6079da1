use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

pub type ReportId = Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReportKind {
    EnrolledStudents,
    SectionPerformance,
    StudentProgress,
}

impl ReportKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::EnrolledStudents => "ENROLLED_STUDENTS",
            Self::SectionPerformance => "SECTION_PERFORMANCE",
            Self::StudentProgress => "STUDENT_PROGRESS",
        }
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ENROLLED_STUDENTS" => Ok(Self::EnrolledStudents),
            "SECTION_PERFORMANCE" => Ok(Self::SectionPerformance),
            "STUDENT_PROGRESS" => Ok(Self::StudentProgress),
            other => anyhow::bail!("unknown report kind `{other}`"),
        }
    }
}

/// A report as the store holds it: the payload is still encoded text.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub id: ReportId,
    pub generated_at: DateTime<Utc>,
    pub kind: ReportKind,
    pub generated_by: String,
    pub payload: String,
}

/// A report awaiting its store-assigned id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewReport {
    pub generated_at: DateTime<Utc>,
    pub kind: ReportKind,
    pub generated_by: String,
    pub payload: String,
}

impl NewReport {
    pub fn with_id(self, id: ReportId) -> Report {
        Report {
            id,
            generated_at: self.generated_at,
            kind: self.kind,
            generated_by: self.generated_by,
            payload: self.payload,
        }
    }
}

// Raw input shapes. Field names follow the wire format of the grading system feeding us.

#[derive(Debug, Clone, Deserialize)]
pub struct EnrollmentSection {
    #[serde(rename = "nombreCurso", alias = "courseName")]
    pub course_name: String,
    #[serde(rename = "nombreSeccion", alias = "sectionName")]
    pub section_name: String,
    #[serde(
        rename = "estudiantes",
        alias = "students",
        default,
        deserialize_with = "null_as_empty"
    )]
    pub students: Vec<EnrolledStudent>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EnrolledStudent {
    #[serde(rename = "nombre", alias = "name")]
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EvaluationInput {
    #[serde(rename = "curso", alias = "course")]
    pub course: String,
    #[serde(rename = "seccion", alias = "section")]
    pub section: String,
    #[serde(
        rename = "evaluaciones",
        alias = "evaluations",
        default,
        deserialize_with = "null_as_empty"
    )]
    pub evaluations: Vec<StudentEvaluation>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StudentEvaluation {
    #[serde(
        rename = "estudianteId",
        alias = "studentId",
        deserialize_with = "text_or_integer"
    )]
    pub student_id: String,
    #[serde(rename = "nombre", alias = "name")]
    pub name: String,
    #[serde(rename = "notas", alias = "scores", default, deserialize_with = "null_as_empty")]
    pub scores: Vec<f64>,
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

fn text_or_integer<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Signed(i64),
        Unsigned(u64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(value) => value,
        Raw::Signed(value) => value.to_string(),
        Raw::Unsigned(value) => value.to_string(),
    })
}

// Computed payloads, one shape per report kind.

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrolledStudentsPayload {
    pub total_courses: usize,
    pub total_students: usize,
    pub generated_at: DateTime<Utc>,
    pub per_course_detail: Vec<SectionEnrollment>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionEnrollment {
    pub course: String,
    pub section: String,
    pub enrolled: usize,
    pub student_names: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionPerformancePayload {
    pub course: String,
    pub section: String,
    pub generated_at: DateTime<Utc>,
    pub student_count: usize,
    pub passed_count: usize,
    pub failed_count: usize,
    pub overall_average: f64,
    pub per_student: Vec<StudentPerformance>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentPerformance {
    pub student_id: String,
    pub name: String,
    pub average: f64,
    pub passed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentProgressPayload {
    pub course: String,
    pub section: String,
    pub generated_at: DateTime<Utc>,
    pub per_student: Vec<StudentProgress>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentProgress {
    pub student_id: String,
    pub name: String,
    pub evaluation_count: usize,
    pub average: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ReportPayload {
    EnrolledStudents(EnrolledStudentsPayload),
    SectionPerformance(SectionPerformancePayload),
    StudentProgress(StudentProgressPayload),
}

/// What a read hands back in place of the stored text.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DecodedPayload {
    Parsed(ReportPayload),
    Corrupted(&'static str),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportView {
    pub id: ReportId,
    pub generated_at: DateTime<Utc>,
    pub kind: ReportKind,
    pub generated_by: String,
    pub payload: DecodedPayload,
}
