//! Role-checked operations over the mentoring workflow.
//!
//! Each mutator checks the caller's role, then validates its text input, and
//! only then touches the store. Storage outcomes are turned into explicit
//! `ApiError`s; nothing is dropped silently.

use chrono::{NaiveDate, Utc};
use shared::{
    domain::{
        AnswerStamp, FacultyRequestId, FacultyRequestView, MentorQuestion, MentorQuestionId,
        NewFacultyRequest, NewMentorQuestion, Question, QuestionId, RemarkStatus, RequestStatus,
        Resolution, ResolutionStatus, Role, Student, StudentId, StudentRequest, StudentRequestId,
    },
    error::ApiError,
    protocol::{
        AnsweredQuestion, FacultyRequestResolved, HodSupportRequested, MentorQuestionSubmission,
        QuestionFilter, StudentDashboard, StudentFilter,
    },
};
use storage::Transition;
use tracing::{info, warn};

use crate::{internal, session::Session, ApiContext};

const STAFF: &[Role] = &[Role::Faculty, Role::Hod];

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

fn require_text<'a>(field: &str, value: &'a str) -> Result<&'a str, ApiError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ApiError::validation(format!("{field} must not be empty")));
    }
    Ok(trimmed)
}

pub async fn list_students(
    ctx: &ApiContext,
    session: &Session,
    filter: &StudentFilter,
) -> Result<Vec<Student>, ApiError> {
    session.require(STAFF)?;
    ctx.store.list_students(filter).await.map_err(internal)
}

pub async fn student_dashboard(
    ctx: &ApiContext,
    session: &Session,
    student_id: StudentId,
) -> Result<StudentDashboard, ApiError> {
    session.require(STAFF)?;
    let student = ctx
        .store
        .get_student(student_id)
        .await
        .map_err(internal)?
        .ok_or_else(|| ApiError::not_found("student", student_id.0))?;
    let questions = ctx
        .store
        .list_questions(&QuestionFilter {
            student_id: Some(student_id),
            status: None,
        })
        .await
        .map_err(internal)?;
    Ok(StudentDashboard { student, questions })
}

pub async fn list_questions(
    ctx: &ApiContext,
    session: &Session,
    filter: &QuestionFilter,
) -> Result<Vec<Question>, ApiError> {
    session.require(STAFF)?;
    ctx.store.list_questions(filter).await.map_err(internal)
}

pub async fn update_remark_status(
    ctx: &ApiContext,
    session: &Session,
    student_id: StudentId,
    status: RemarkStatus,
) -> Result<Student, ApiError> {
    session.require(&[Role::Faculty])?;
    let student = ctx
        .store
        .set_remark_status(student_id, status)
        .await
        .map_err(internal)?
        .ok_or_else(|| ApiError::not_found("student", student_id.0))?;
    info!(student_id = student_id.0, %status, "remark status updated");
    Ok(student)
}

/// Answers a pending question on behalf of the calling faculty member and
/// marks the owning student's remark status `Done` in the same write.
pub async fn answer_question(
    ctx: &ApiContext,
    session: &Session,
    question_id: QuestionId,
    answer: &str,
) -> Result<AnsweredQuestion, ApiError> {
    session.require(&[Role::Faculty])?;
    let answer = require_text("answer", answer)?;
    let stamp = AnswerStamp {
        answer: answer.to_string(),
        answered_by: session.display_name().to_string(),
        answered_date: today(),
    };
    match ctx
        .store
        .answer_question(question_id, &stamp)
        .await
        .map_err(internal)?
    {
        Transition::Applied((question, student)) => {
            info!(
                question_id = question_id.0,
                student_id = student.id.0,
                answered_by = %stamp.answered_by,
                "question answered"
            );
            Ok(AnsweredQuestion { question, student })
        }
        Transition::Blocked(question) => {
            warn!(
                question_id = question_id.0,
                status = %question.status,
                "question already answered"
            );
            Err(ApiError::conflict(format!(
                "question {} is already {}",
                question_id.0, question.status
            )))
        }
        Transition::Missing => Err(ApiError::not_found("question", question_id.0)),
    }
}

pub async fn update_request_status(
    ctx: &ApiContext,
    session: &Session,
    student_id: StudentId,
    status: RequestStatus,
) -> Result<Student, ApiError> {
    session.require(&[Role::Faculty])?;
    if !status.is_resolved() {
        return Err(ApiError::validation(format!(
            "request status can only move to {} or {}",
            RequestStatus::Accepted,
            RequestStatus::Rejected
        )));
    }
    match ctx
        .store
        .transition_request_status(student_id, RequestStatus::Pending, status)
        .await
        .map_err(internal)?
    {
        Transition::Applied(student) => {
            info!(student_id = student_id.0, %status, "mentoring request resolved");
            Ok(student)
        }
        Transition::Blocked(student) => {
            warn!(
                student_id = student_id.0,
                current = %student.request_status,
                requested = %status,
                "mentoring request already resolved"
            );
            Err(ApiError::conflict(format!(
                "request of student {} is already {}",
                student_id.0, student.request_status
            )))
        }
        Transition::Missing => Err(ApiError::not_found("student", student_id.0)),
    }
}

/// Escalates a student to the HOD, filing a pending faculty request signed by
/// the calling faculty member.
pub async fn request_hod_support(
    ctx: &ApiContext,
    session: &Session,
    student_id: StudentId,
    reason: &str,
) -> Result<HodSupportRequested, ApiError> {
    session.require(&[Role::Faculty])?;
    let reason = require_text("reason", reason)?;
    let request = NewFacultyRequest {
        faculty_name: session.display_name().to_string(),
        reason: reason.to_string(),
        request_date: today(),
    };
    match ctx
        .store
        .open_hod_support(student_id, &request)
        .await
        .map_err(internal)?
    {
        Transition::Applied((student, faculty_request)) => {
            info!(
                student_id = student_id.0,
                faculty_request_id = faculty_request.id.0,
                "hod support requested"
            );
            Ok(HodSupportRequested {
                student,
                faculty_request,
            })
        }
        Transition::Blocked(student) => {
            warn!(
                student_id = student_id.0,
                status = %student.hod_support_status,
                "hod support already in progress"
            );
            Err(ApiError::conflict(format!(
                "hod support for student {} is already {}",
                student_id.0, student.hod_support_status
            )))
        }
        Transition::Missing => Err(ApiError::not_found("student", student_id.0)),
    }
}

pub async fn list_student_requests(
    ctx: &ApiContext,
    session: &Session,
    status: Option<ResolutionStatus>,
) -> Result<Vec<StudentRequest>, ApiError> {
    session.require(&[Role::Hod])?;
    ctx.store
        .list_student_requests(status)
        .await
        .map_err(internal)
}

pub async fn resolve_student_request(
    ctx: &ApiContext,
    session: &Session,
    request_id: StudentRequestId,
    decision: Resolution,
) -> Result<StudentRequest, ApiError> {
    session.require(&[Role::Hod])?;
    let outcome = decision.outcome();
    match ctx
        .store
        .resolve_student_request(request_id, outcome)
        .await
        .map_err(internal)?
    {
        Transition::Applied(request) => {
            info!(request_id = request_id.0, status = %outcome, "student request resolved");
            Ok(request)
        }
        Transition::Blocked(request) => {
            warn!(
                request_id = request_id.0,
                status = %request.status,
                "student request already resolved"
            );
            Err(ApiError::conflict(format!(
                "student request {} is already {}",
                request_id.0, request.status
            )))
        }
        Transition::Missing => Err(ApiError::not_found("student request", request_id.0)),
    }
}

pub async fn list_faculty_requests(
    ctx: &ApiContext,
    session: &Session,
    status: Option<ResolutionStatus>,
) -> Result<Vec<FacultyRequestView>, ApiError> {
    session.require(&[Role::Hod])?;
    ctx.store
        .list_faculty_requests(status)
        .await
        .map_err(internal)
}

/// Resolves a faculty escalation. Approval also approves the student's HOD
/// support; rejection leaves it as it was.
pub async fn resolve_faculty_request(
    ctx: &ApiContext,
    session: &Session,
    request_id: FacultyRequestId,
    decision: Resolution,
) -> Result<FacultyRequestResolved, ApiError> {
    session.require(&[Role::Hod])?;
    let outcome = decision.outcome();
    match ctx
        .store
        .resolve_faculty_request(request_id, outcome)
        .await
        .map_err(internal)?
    {
        Transition::Applied((request, student)) => {
            info!(
                request_id = request_id.0,
                student_id = student.id.0,
                status = %outcome,
                hod_support = %student.hod_support_status,
                "faculty request resolved"
            );
            Ok(FacultyRequestResolved { request, student })
        }
        Transition::Blocked(view) => {
            warn!(
                request_id = request_id.0,
                status = %view.request.status,
                "faculty request already resolved"
            );
            Err(ApiError::conflict(format!(
                "faculty request {} is already {}",
                request_id.0, view.request.status
            )))
        }
        Transition::Missing => Err(ApiError::not_found("faculty request", request_id.0)),
    }
}

pub async fn submit_mentor_question(
    ctx: &ApiContext,
    session: &Session,
    input: &MentorQuestionSubmission,
) -> Result<MentorQuestion, ApiError> {
    session.require(&[Role::Student])?;
    let faculty_name = require_text("faculty_name", &input.faculty_name)?;
    let question = require_text("question", &input.question)?;
    let record = NewMentorQuestion {
        student_email: session.email.clone().unwrap_or_default(),
        date: today(),
        faculty_name: faculty_name.to_string(),
        branch: input.branch.trim().to_string(),
        phone_number: input.phone_number.trim().to_string(),
        question: question.to_string(),
    };
    let stored = ctx
        .store
        .insert_mentor_question(&record)
        .await
        .map_err(internal)?;
    info!(
        mentor_question_id = stored.id.0,
        faculty = %stored.faculty_name,
        "mentor question submitted"
    );
    Ok(stored)
}

/// Students see their own submissions, faculty see all of them.
pub async fn list_mentor_questions(
    ctx: &ApiContext,
    session: &Session,
) -> Result<Vec<MentorQuestion>, ApiError> {
    let role = session.require(&[Role::Student, Role::Faculty])?;
    let owner = match role {
        Role::Student => session.email.as_deref(),
        _ => None,
    };
    ctx.store
        .list_mentor_questions(owner)
        .await
        .map_err(internal)
}

pub async fn record_mentor_remarks(
    ctx: &ApiContext,
    session: &Session,
    id: MentorQuestionId,
    remarks: &str,
) -> Result<MentorQuestion, ApiError> {
    session.require(&[Role::Faculty])?;
    let remarks = require_text("remarks", remarks)?;
    match ctx
        .store
        .record_mentor_remarks(id, remarks)
        .await
        .map_err(internal)?
    {
        Transition::Applied(question) => {
            info!(mentor_question_id = id.0, "mentor remarks recorded");
            Ok(question)
        }
        Transition::Blocked(_) => {
            warn!(mentor_question_id = id.0, "mentor remarks already recorded");
            Err(ApiError::conflict(format!(
                "mentor question {} already has remarks",
                id.0
            )))
        }
        Transition::Missing => Err(ApiError::not_found("mentor question", id.0)),
    }
}

#[cfg(test)]
#[path = "tests/workflow_tests.rs"]
mod tests;
