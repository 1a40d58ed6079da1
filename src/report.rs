use std::fmt::Write;

use crate::models::{
    DecodedPayload, EnrolledStudentsPayload, ReportKind, ReportPayload, ReportView,
    SectionPerformancePayload, StudentProgressPayload,
};

pub fn render_markdown(view: &ReportView) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# {} Report", title(view));
    let _ = writeln!(
        output,
        "Report {} generated by {} at {}",
        view.id,
        view.generated_by,
        view.generated_at.to_rfc3339()
    );
    let _ = writeln!(output);

    match &view.payload {
        DecodedPayload::Parsed(ReportPayload::EnrolledStudents(payload)) => {
            render_enrollment(&mut output, payload)
        }
        DecodedPayload::Parsed(ReportPayload::SectionPerformance(payload)) => {
            render_performance(&mut output, payload)
        }
        DecodedPayload::Parsed(ReportPayload::StudentProgress(payload)) => {
            render_progress(&mut output, payload)
        }
        DecodedPayload::Corrupted(note) => {
            let _ = writeln!(output, "_{}_", note);
        }
    }

    output
}

fn title(view: &ReportView) -> &'static str {
    match view.kind {
        ReportKind::EnrolledStudents => "Enrolled Students",
        ReportKind::SectionPerformance => "Section Performance",
        ReportKind::StudentProgress => "Student Progress",
    }
}

fn render_enrollment(output: &mut String, payload: &EnrolledStudentsPayload) {
    let _ = writeln!(
        output,
        "{} students across {} course sections",
        payload.total_students, payload.total_courses
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Sections");

    if payload.per_course_detail.is_empty() {
        let _ = writeln!(output, "No sections submitted.");
        return;
    }

    for detail in &payload.per_course_detail {
        let names = if detail.student_names.is_empty() {
            "no students".to_string()
        } else {
            detail.student_names.join(", ")
        };
        let _ = writeln!(
            output,
            "- {} / {}: {} enrolled ({})",
            detail.course, detail.section, detail.enrolled, names
        );
    }
}

fn render_performance(output: &mut String, payload: &SectionPerformancePayload) {
    let _ = writeln!(output, "{} / {}", payload.course, payload.section);
    let _ = writeln!(
        output,
        "{} students, {} passed, {} failed, overall average {:.2}",
        payload.student_count, payload.passed_count, payload.failed_count, payload.overall_average
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Students");

    if payload.per_student.is_empty() {
        let _ = writeln!(output, "No evaluations submitted.");
        return;
    }

    for student in &payload.per_student {
        let _ = writeln!(
            output,
            "- {} ({}) average {:.2}: {}",
            student.name,
            student.student_id,
            student.average,
            if student.passed { "passed" } else { "failed" }
        );
    }
}

fn render_progress(output: &mut String, payload: &StudentProgressPayload) {
    let _ = writeln!(output, "{} / {}", payload.course, payload.section);
    let _ = writeln!(output);
    let _ = writeln!(output, "## Students");

    if payload.per_student.is_empty() {
        let _ = writeln!(output, "No evaluations submitted.");
        return;
    }

    for student in &payload.per_student {
        let _ = writeln!(
            output,
            "- {} ({}) average {:.2} across {} evaluations",
            student.name, student.student_id, student.average, student.evaluation_count
        );
    }
}
