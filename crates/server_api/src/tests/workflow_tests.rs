use super::*;
use crate::support::{faculty, hod, memory_ctx, sqlite_ctx, student};
use shared::{
    domain::{HodSupportStatus, QuestionStatus},
    error::ErrorCode,
};

async fn both() -> [ApiContext; 2] {
    [memory_ctx(), sqlite_ctx().await]
}

#[tokio::test]
async fn answering_the_data_structures_question_completes_the_remark() {
    for ctx in both().await {
        let answered = answer_question(&ctx, &faculty(), QuestionId(1), "See chapter 4")
            .await
            .expect("answer");
        assert_eq!(answered.question.status, QuestionStatus::Answered);
        assert_eq!(answered.question.answer.as_deref(), Some("See chapter 4"));
        assert_eq!(
            answered.question.answered_by.as_deref(),
            Some("Prof. Sunita Mishra")
        );
        assert_eq!(answered.question.answered_date, Some(today()));
        assert_eq!(answered.student.id, StudentId(2));
        assert_eq!(answered.student.remark_status, RemarkStatus::Done);

        let dashboard = student_dashboard(&ctx, &faculty(), StudentId(2))
            .await
            .expect("dashboard");
        assert_eq!(dashboard.student.remark_status, RemarkStatus::Done);
        assert_eq!(dashboard.questions[0].status, QuestionStatus::Answered);
    }
}

#[tokio::test]
async fn answering_twice_is_a_conflict() {
    for ctx in both().await {
        answer_question(&ctx, &faculty(), QuestionId(2), "Come to the lab on Friday")
            .await
            .expect("first answer");
        let err = answer_question(&ctx, &faculty(), QuestionId(2), "Different answer")
            .await
            .expect_err("second answer");
        assert_eq!(err.code, ErrorCode::Conflict);

        let question = ctx
            .store
            .get_question(QuestionId(2))
            .await
            .expect("read")
            .expect("exists");
        assert_eq!(question.answer.as_deref(), Some("Come to the lab on Friday"));
    }
}

#[tokio::test]
async fn blank_answer_is_rejected_before_any_write() {
    let ctx = memory_ctx();
    let err = answer_question(&ctx, &faculty(), QuestionId(1), "   ")
        .await
        .expect_err("blank");
    assert_eq!(err.code, ErrorCode::Validation);
    let question = ctx
        .store
        .get_question(QuestionId(1))
        .await
        .expect("read")
        .expect("exists");
    assert_eq!(question.status, QuestionStatus::Pending);

    let missing = answer_question(&ctx, &faculty(), QuestionId(40), "x")
        .await
        .expect_err("missing");
    assert_eq!(missing.code, ErrorCode::NotFound);
}

#[tokio::test]
async fn empty_hod_reason_leaves_student_untouched() {
    for ctx in both().await {
        let err = request_hod_support(&ctx, &faculty(), StudentId(3), "")
            .await
            .expect_err("blank reason");
        assert_eq!(err.code, ErrorCode::Validation);
        let student = ctx
            .store
            .get_student(StudentId(3))
            .await
            .expect("read")
            .expect("exists");
        assert_eq!(student.hod_support_status, HodSupportStatus::Requested);
    }
}

#[tokio::test]
async fn hod_support_files_a_faculty_request_once() {
    for ctx in both().await {
        let filed = request_hod_support(&ctx, &faculty(), StudentId(4), "Needs project guidance")
            .await
            .expect("file");
        assert_eq!(filed.student.hod_support_status, HodSupportStatus::Requested);
        assert_eq!(
            filed.student.request_reason.as_deref(),
            Some("Needs project guidance")
        );
        assert_eq!(filed.faculty_request.student_id, StudentId(4));
        assert_eq!(filed.faculty_request.faculty_name, "Prof. Sunita Mishra");
        assert_eq!(filed.faculty_request.status, ResolutionStatus::Pending);

        let err = request_hod_support(&ctx, &faculty(), StudentId(4), "Again")
            .await
            .expect_err("second escalation");
        assert_eq!(err.code, ErrorCode::Conflict);

        let pending = list_faculty_requests(&ctx, &hod(), Some(ResolutionStatus::Pending))
            .await
            .expect("list");
        assert!(pending
            .iter()
            .any(|view| view.request.id == filed.faculty_request.id
                && view.student_name == "Arjun Singh"));
    }
}

#[tokio::test]
async fn request_status_moves_one_way_from_pending() {
    for ctx in both().await {
        let err = update_request_status(&ctx, &faculty(), StudentId(2), RequestStatus::Pending)
            .await
            .expect_err("pending target");
        assert_eq!(err.code, ErrorCode::Validation);

        let accepted =
            update_request_status(&ctx, &faculty(), StudentId(2), RequestStatus::Accepted)
                .await
                .expect("accept");
        assert_eq!(accepted.request_status, RequestStatus::Accepted);

        let err = update_request_status(&ctx, &faculty(), StudentId(2), RequestStatus::Rejected)
            .await
            .expect_err("already resolved");
        assert_eq!(err.code, ErrorCode::Conflict);

        let missing =
            update_request_status(&ctx, &faculty(), StudentId(99), RequestStatus::Accepted)
                .await
                .expect_err("missing");
        assert_eq!(missing.code, ErrorCode::NotFound);
    }
}

#[tokio::test]
async fn remark_status_can_be_reopened() {
    let ctx = memory_ctx();
    let student = update_remark_status(&ctx, &faculty(), StudentId(1), RemarkStatus::New)
        .await
        .expect("reopen");
    assert_eq!(student.remark_status, RemarkStatus::New);
    let err = update_remark_status(&ctx, &faculty(), StudentId(50), RemarkStatus::Done)
        .await
        .expect_err("missing");
    assert_eq!(err.code, ErrorCode::NotFound);
}

#[tokio::test]
async fn faculty_approval_approves_student_support() {
    for ctx in both().await {
        let resolved =
            resolve_faculty_request(&ctx, &hod(), FacultyRequestId(1), Resolution::Approve)
                .await
                .expect("approve");
        assert_eq!(resolved.request.request.status, ResolutionStatus::Approved);
        assert_eq!(resolved.student.id, StudentId(6));
        assert_eq!(resolved.student.hod_support_status, HodSupportStatus::Approved);

        let err = resolve_faculty_request(&ctx, &hod(), FacultyRequestId(1), Resolution::Reject)
            .await
            .expect_err("already resolved");
        assert_eq!(err.code, ErrorCode::Conflict);
    }
}

#[tokio::test]
async fn faculty_rejection_keeps_student_support_status() {
    for ctx in both().await {
        let resolved =
            resolve_faculty_request(&ctx, &hod(), FacultyRequestId(2), Resolution::Reject)
                .await
                .expect("reject");
        assert_eq!(resolved.request.request.status, ResolutionStatus::Rejected);
        assert_eq!(resolved.student.hod_support_status, HodSupportStatus::Requested);
    }
}

#[tokio::test]
async fn student_requests_resolve_once() {
    for ctx in both().await {
        let approved =
            resolve_student_request(&ctx, &hod(), StudentRequestId(3), Resolution::Approve)
                .await
                .expect("approve");
        assert_eq!(approved.status, ResolutionStatus::Approved);

        let err = resolve_student_request(&ctx, &hod(), StudentRequestId(3), Resolution::Reject)
            .await
            .expect_err("terminal");
        assert_eq!(err.code, ErrorCode::Conflict);

        let pending = list_student_requests(&ctx, &hod(), Some(ResolutionStatus::Pending))
            .await
            .expect("list");
        assert_eq!(pending.len(), 4);

        let missing =
            resolve_student_request(&ctx, &hod(), StudentRequestId(77), Resolution::Approve)
                .await
                .expect_err("missing");
        assert_eq!(missing.code, ErrorCode::NotFound);
    }
}

#[tokio::test]
async fn roles_are_enforced_before_validation() {
    let ctx = memory_ctx();
    let err = request_hod_support(&ctx, &student(), StudentId(3), "")
        .await
        .expect_err("student cannot escalate");
    assert_eq!(err.code, ErrorCode::Forbidden);

    let err = resolve_student_request(&ctx, &faculty(), StudentRequestId(1), Resolution::Approve)
        .await
        .expect_err("faculty cannot resolve");
    assert_eq!(err.code, ErrorCode::Forbidden);

    let err = list_students(&ctx, &Session::anonymous(), &StudentFilter::default())
        .await
        .expect_err("anonymous");
    assert_eq!(err.code, ErrorCode::Unauthorized);
}

#[tokio::test]
async fn student_lists_follow_status_filters() {
    for ctx in both().await {
        let accepted = list_students(
            &ctx,
            &faculty(),
            &StudentFilter {
                request_status: Some(RequestStatus::Accepted),
                ..StudentFilter::default()
            },
        )
        .await
        .expect("accepted");
        assert_eq!(accepted.len(), 5);

        let escalation = list_students(
            &ctx,
            &hod(),
            &StudentFilter {
                hod_support_status: Some(HodSupportStatus::NotRequired),
                ..StudentFilter::default()
            },
        )
        .await
        .expect("not required");
        assert_eq!(escalation.len(), 4);
    }
}

#[tokio::test]
async fn mentor_questions_flow_from_student_to_faculty() {
    for ctx in both().await {
        let submitted = submit_mentor_question(
            &ctx,
            &student(),
            &MentorQuestionSubmission {
                faculty_name: "Dr. Ramesh Kumar".to_string(),
                branch: "ECE".to_string(),
                phone_number: "9876543210".to_string(),
                question: "Can we meet about my elective choice?".to_string(),
            },
        )
        .await
        .expect("submit");
        assert_eq!(submitted.student_email, "student@student.nitandhra.ac.in");
        assert_eq!(submitted.date, today());
        assert!(submitted.remarks_given.is_none());

        let own = list_mentor_questions(&ctx, &student()).await.expect("own");
        assert_eq!(own.len(), 1);
        let other = crate::support::session(
            Role::Student,
            "someone@student.nitandhra.ac.in",
            "Someone",
        );
        assert!(list_mentor_questions(&ctx, &other)
            .await
            .expect("other")
            .is_empty());
        assert_eq!(
            list_mentor_questions(&ctx, &faculty())
                .await
                .expect("faculty")
                .len(),
            1
        );

        let err = record_mentor_remarks(&ctx, &faculty(), submitted.id, "  ")
            .await
            .expect_err("blank remarks");
        assert_eq!(err.code, ErrorCode::Validation);

        let remarked = record_mentor_remarks(&ctx, &faculty(), submitted.id, "Sure, Monday 10am")
            .await
            .expect("remarks");
        assert_eq!(remarked.remarks_given.as_deref(), Some("Sure, Monday 10am"));

        let err = record_mentor_remarks(&ctx, &faculty(), submitted.id, "Again")
            .await
            .expect_err("one-shot");
        assert_eq!(err.code, ErrorCode::Conflict);
    }
}

#[tokio::test]
async fn mentor_question_requires_faculty_and_text() {
    let ctx = memory_ctx();
    let err = submit_mentor_question(
        &ctx,
        &student(),
        &MentorQuestionSubmission {
            faculty_name: String::new(),
            branch: String::new(),
            phone_number: String::new(),
            question: "Anything".to_string(),
        },
    )
    .await
    .expect_err("no faculty");
    assert_eq!(err.code, ErrorCode::Validation);
    assert!(err.message.contains("faculty_name"));
}

#[tokio::test]
async fn unknown_ids_are_not_found_for_escalations() {
    for ctx in both().await {
        let err = request_hod_support(&ctx, &faculty(), StudentId(404), "Needs guidance")
            .await
            .expect_err("missing student");
        assert_eq!(err.code, ErrorCode::NotFound);

        let err = resolve_faculty_request(&ctx, &hod(), FacultyRequestId(404), Resolution::Approve)
            .await
            .expect_err("missing faculty request");
        assert_eq!(err.code, ErrorCode::NotFound);

        let err = record_mentor_remarks(&ctx, &faculty(), MentorQuestionId(404), "Noted")
            .await
            .expect_err("missing mentor question");
        assert_eq!(err.code, ErrorCode::NotFound);

        let pending = list_faculty_requests(&ctx, &hod(), Some(ResolutionStatus::Pending))
            .await
            .expect("list");
        assert_eq!(pending.len(), 4);
    }
}
