use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;

use crate::error::{ReportError, Result};
use crate::models::{
    EnrolledStudentsPayload, EnrollmentSection, EvaluationInput, ReportKind, ReportPayload,
    SectionEnrollment, SectionPerformancePayload, StudentPerformance,
    StudentProgress, StudentProgressPayload,
};

pub const PASSING_AVERAGE: f64 = 60.0;

/// Parses `raw` as the input shape `kind` expects and computes its payload.
pub fn aggregate(
    kind: ReportKind,
    raw: &str,
    generated_at: DateTime<Utc>,
) -> Result<ReportPayload> {
    let payload = match kind {
        ReportKind::EnrolledStudents => {
            let sections: Vec<EnrollmentSection> = parse(kind, raw)?;
            ReportPayload::EnrolledStudents(enrolled_students(&sections, generated_at))
        }
        ReportKind::SectionPerformance => {
            let input: EvaluationInput = parse(kind, raw)?;
            let payload = section_performance(&input, generated_at);
            let averages = payload.per_student.iter().map(|s| (s.student_id.as_str(), s.average));
            check_finite(kind, averages)?;
            check_finite(kind, [("overall", payload.overall_average)])?;
            ReportPayload::SectionPerformance(payload)
        }
        ReportKind::StudentProgress => {
            let input: EvaluationInput = parse(kind, raw)?;
            let payload = student_progress(&input, generated_at);
            let averages = payload.per_student.iter().map(|s| (s.student_id.as_str(), s.average));
            check_finite(kind, averages)?;
            ReportPayload::StudentProgress(payload)
        }
    };
    Ok(payload)
}

fn parse<T: DeserializeOwned>(kind: ReportKind, raw: &str) -> Result<T> {
    serde_json::from_str(raw).map_err(|err| ReportError::malformed(kind, err))
}

/// JSON has no encoding for non-finite numbers, so such an average could never be read back.
fn check_finite<'a>(
    kind: ReportKind,
    averages: impl IntoIterator<Item = (&'a str, f64)>,
) -> Result<()> {
    for (label, average) in averages {
        if !average.is_finite() {
            return Err(ReportError::malformed(
                kind,
                format!("average for {label} is out of range"),
            ));
        }
    }
    Ok(())
}

pub fn enrolled_students(
    sections: &[EnrollmentSection],
    generated_at: DateTime<Utc>,
) -> EnrolledStudentsPayload {
    let per_course_detail: Vec<SectionEnrollment> = sections
        .iter()
        .map(|section| SectionEnrollment {
            course: section.course_name.clone(),
            section: section.section_name.clone(),
            enrolled: section.students.len(),
            student_names: section.students.iter().map(|s| s.name.clone()).collect(),
        })
        .collect();

    EnrolledStudentsPayload {
        total_courses: per_course_detail.len(),
        total_students: per_course_detail.iter().map(|d| d.enrolled).sum(),
        generated_at,
        per_course_detail,
    }
}

pub fn section_performance(
    input: &EvaluationInput,
    generated_at: DateTime<Utc>,
) -> SectionPerformancePayload {
    let per_student: Vec<StudentPerformance> = input
        .evaluations
        .iter()
        .map(|evaluation| {
            let average = round2(mean(&evaluation.scores));
            StudentPerformance {
                student_id: evaluation.student_id.clone(),
                name: evaluation.name.clone(),
                average,
                passed: average >= PASSING_AVERAGE,
            }
        })
        .collect();

    let averages: Vec<f64> = per_student.iter().map(|s| s.average).collect();
    let passed_count = per_student.iter().filter(|s| s.passed).count();

    SectionPerformancePayload {
        course: input.course.clone(),
        section: input.section.clone(),
        generated_at,
        student_count: per_student.len(),
        passed_count,
        failed_count: per_student.len() - passed_count,
        overall_average: round2(mean(&averages)),
        per_student,
    }
}

pub fn student_progress(
    input: &EvaluationInput,
    generated_at: DateTime<Utc>,
) -> StudentProgressPayload {
    StudentProgressPayload {
        course: input.course.clone(),
        section: input.section.clone(),
        generated_at,
        per_student: input
            .evaluations
            .iter()
            .map(|evaluation| StudentProgress {
                student_id: evaluation.student_id.clone(),
                name: evaluation.name.clone(),
                evaluation_count: evaluation.scores.len(),
                average: round2(mean(&evaluation.scores)),
            })
            .collect(),
    }
}

/// Arithmetic mean, 0.0 for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

/// Rounds to two decimals, ties away from zero.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StudentEvaluation;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, 14, 30, 0).unwrap()
    }

    fn evaluation(id: &str, name: &str, scores: &[f64]) -> StudentEvaluation {
        StudentEvaluation {
            student_id: id.to_string(),
            name: name.to_string(),
            scores: scores.to_vec(),
        }
    }

    fn section(evaluations: Vec<StudentEvaluation>) -> EvaluationInput {
        EvaluationInput {
            course: "Matemáticas".to_string(),
            section: "Sección A".to_string(),
            evaluations,
        }
    }

    #[test]
    fn rounding_is_half_away_from_zero() {
        assert_eq!(round2(0.125), 0.13);
        assert_eq!(round2(-0.125), -0.13);
        assert_eq!(round2(85.0), 85.0);
        assert_eq!(round2(2.0 / 3.0), 0.67);
        assert_eq!(round2(67.495), 67.5);
        assert_eq!(round2(mean(&[67.49, 67.5])), 67.5);
        assert_eq!(mean(&[]), 0.0);
    }

    #[test]
    fn enrollment_totals_sum_sections() {
        let raw = r#"[
            {"nombreCurso": "Matemáticas", "nombreSeccion": "Sección A",
             "estudiantes": [{"nombre": "Juan Pérez"}, {"nombre": "María García"}]},
            {"nombreCurso": "Historia", "nombreSeccion": "Sección B",
             "estudiantes": [{"nombre": "Carlos López"}]}
        ]"#;
        let ReportPayload::EnrolledStudents(payload) =
            aggregate(ReportKind::EnrolledStudents, raw, now()).unwrap()
        else {
            panic!("wrong payload kind");
        };

        assert_eq!(payload.total_courses, 2);
        assert_eq!(payload.total_students, 3);
        assert_eq!(payload.per_course_detail[0].enrolled, 2);
        assert_eq!(
            payload.per_course_detail[0].student_names,
            vec!["Juan Pérez".to_string(), "María García".to_string()]
        );
        assert_eq!(payload.per_course_detail[1].course, "Historia");
        assert_eq!(payload.generated_at, now());
    }

    #[test]
    fn empty_enrollment_yields_zero_totals() {
        let payload = enrolled_students(&[], now());
        assert_eq!(payload.total_courses, 0);
        assert_eq!(payload.total_students, 0);
        assert!(payload.per_course_detail.is_empty());

        let raw = r#"[{"nombreCurso": "Arte", "nombreSeccion": "C", "estudiantes": []}]"#;
        let ReportPayload::EnrolledStudents(payload) =
            aggregate(ReportKind::EnrolledStudents, raw, now()).unwrap()
        else {
            panic!("wrong payload kind");
        };
        assert_eq!(payload.total_courses, 1);
        assert_eq!(payload.per_course_detail[0].enrolled, 0);
        assert!(payload.per_course_detail[0].student_names.is_empty());
    }

    #[test]
    fn performance_splits_pass_and_fail() {
        let input = section(vec![
            evaluation("001", "Juan Pérez", &[80.0, 85.0, 90.0]),
            evaluation("002", "María García", &[50.0, 55.0, 45.0]),
        ]);
        let payload = section_performance(&input, now());

        assert_eq!(payload.per_student[0].average, 85.0);
        assert!(payload.per_student[0].passed);
        assert_eq!(payload.per_student[1].average, 50.0);
        assert!(!payload.per_student[1].passed);
        assert_eq!(payload.student_count, 2);
        assert_eq!(payload.passed_count, 1);
        assert_eq!(payload.failed_count, 1);
        assert_eq!(payload.overall_average, 67.5);
    }

    #[test]
    fn sixty_is_a_pass() {
        let input = section(vec![
            evaluation("1", "Borde", &[60.0]),
            evaluation("2", "Debajo", &[59.0, 60.0]),
        ]);
        let payload = section_performance(&input, now());
        assert!(payload.per_student[0].passed);
        assert!(!payload.per_student[1].passed);
        assert_eq!(payload.per_student[1].average, 59.5);
    }

    #[test]
    fn performance_counts_always_cover_every_student() {
        let input = section(vec![
            evaluation("1", "A", &[]),
            evaluation("2", "B", &[100.0]),
            evaluation("3", "C", &[59.99]),
            evaluation("4", "D", &[61.0, 62.0, 63.0, 64.0]),
        ]);
        let payload = section_performance(&input, now());
        assert_eq!(payload.passed_count + payload.failed_count, payload.student_count);
        assert_eq!(payload.per_student[0].average, 0.0);
        assert!(!payload.per_student[0].passed);
    }

    #[test]
    fn empty_section_has_zero_overall_average() {
        let payload = section_performance(&section(Vec::new()), now());
        assert_eq!(payload.student_count, 0);
        assert_eq!(payload.overall_average, 0.0);
    }

    #[test]
    fn progress_reports_counts_without_classification() {
        let input = section(vec![
            evaluation("001", "Juan Pérez", &[]),
            evaluation("002", "María García", &[70.0, 75.5]),
        ]);
        let payload = student_progress(&input, now());
        assert_eq!(payload.per_student[0].evaluation_count, 0);
        assert_eq!(payload.per_student[0].average, 0.0);
        assert_eq!(payload.per_student[1].evaluation_count, 2);
        assert_eq!(payload.per_student[1].average, 72.75);
    }

    #[test]
    fn rejects_input_of_the_wrong_shape() {
        let evaluation_object = r#"{"curso":"X","seccion":"Y","evaluaciones":[]}"#;
        for (kind, raw) in [
            (ReportKind::EnrolledStudents, "{ invalid json }"),
            (ReportKind::EnrolledStudents, evaluation_object),
            (ReportKind::SectionPerformance, "[]"),
            (ReportKind::StudentProgress, r#"{"curso":"X","evaluaciones":[]}"#),
            (
                ReportKind::SectionPerformance,
                r#"{"curso":"X","seccion":"Y","evaluaciones":[{"estudianteId":"1","nombre":"A","notas":["ochenta"]}]}"#,
            ),
        ] {
            let err = aggregate(kind, raw, now()).unwrap_err();
            assert!(
                matches!(err, ReportError::MalformedInput { kind: k, .. } if k == kind),
                "{kind}: {raw}"
            );
        }
    }

    #[test]
    fn rejects_scores_that_overflow() {
        let summed = r#"{"curso":"X","seccion":"Y","evaluaciones":[
            {"estudianteId":"1","nombre":"A","notas":[1e308, 1e308]}]}"#;
        let single = r#"{"curso":"X","seccion":"Y","evaluaciones":[
            {"estudianteId":"1","nombre":"A","notas":[1e307]}]}"#;
        let pair = r#"{"curso":"X","seccion":"Y","evaluaciones":[
            {"estudianteId":"1","nombre":"A","notas":[1e307]},
            {"estudianteId":"2","nombre":"B","notas":[1e306]}]}"#;
        for kind in [ReportKind::SectionPerformance, ReportKind::StudentProgress] {
            for raw in [summed, single, pair] {
                assert!(
                    matches!(aggregate(kind, raw, now()), Err(ReportError::MalformedInput { .. })),
                    "{kind}: {raw}"
                );
            }
        }
    }

    #[test]
    fn large_but_representable_scores_are_accepted() {
        let raw = r#"{"curso":"X","seccion":"Y","evaluaciones":[
            {"estudianteId":"1","nombre":"A","notas":[1e300, 3e300]}]}"#;
        let ReportPayload::SectionPerformance(payload) =
            aggregate(ReportKind::SectionPerformance, raw, now()).unwrap()
        else {
            panic!("wrong payload kind");
        };
        assert!(payload.overall_average.is_finite());
        assert!(payload.per_student[0].passed);
    }
}
