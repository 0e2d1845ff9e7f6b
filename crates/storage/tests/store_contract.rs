use chrono::NaiveDate;
use shared::{
    domain::{
        AnswerStamp, FacultyRequestId, HodSupportStatus, NewFacultyRequest, QuestionId,
        RemarkStatus, RequestStatus, ResolutionStatus, StudentId,
    },
    protocol::StudentFilter,
};
use storage::{seed, MemoryStore, Storage, Transition, WorkflowStore};

async fn sqlite_store() -> Storage {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    storage
        .apply_seed(&seed::demo().expect("seed"))
        .await
        .expect("apply seed");
    storage
}

fn memory_store() -> MemoryStore {
    MemoryStore::from_seed(seed::demo().expect("seed")).expect("memory store")
}

/// Walks one student through every workflow axis and checks that both store
/// implementations agree on each outcome.
async fn full_lifecycle(store: &dyn WorkflowStore) {
    let today = NaiveDate::from_ymd_opt(2025, 4, 30).expect("date");

    let accepted = store
        .transition_request_status(StudentId(2), RequestStatus::Pending, RequestStatus::Accepted)
        .await
        .expect("accept");
    assert!(accepted.is_applied());

    let answered = store
        .answer_question(
            QuestionId(1),
            &AnswerStamp {
                answer: "See chapter 4".to_string(),
                answered_by: "Dr. Ramesh Kumar".to_string(),
                answered_date: today,
            },
        )
        .await
        .expect("answer");
    let Transition::Applied((question, student)) = answered else {
        panic!("expected applied answer");
    };
    assert!(question.answered_by.is_some());
    assert_eq!(student.remark_status, RemarkStatus::Done);

    let escalated = store
        .open_hod_support(
            StudentId(2),
            &NewFacultyRequest {
                faculty_name: "Dr. Ramesh Kumar".to_string(),
                reason: "Needs a lab slot".to_string(),
                request_date: today,
            },
        )
        .await
        .expect("escalate");
    let Transition::Applied((_, faculty_request)) = escalated else {
        panic!("expected applied escalation");
    };
    assert_eq!(faculty_request.id, FacultyRequestId(5));

    let approved = store
        .resolve_faculty_request(faculty_request.id, ResolutionStatus::Approved)
        .await
        .expect("approve");
    let Transition::Applied((view, student)) = approved else {
        panic!("expected applied approval");
    };
    assert_eq!(view.student_name, "Rahul Sharma");
    assert_eq!(student.hod_support_status, HodSupportStatus::Approved);

    let approved_students = store
        .list_students(&StudentFilter {
            hod_support_status: Some(HodSupportStatus::Approved),
            ..StudentFilter::default()
        })
        .await
        .expect("list");
    assert_eq!(approved_students.len(), 1);
    assert_eq!(approved_students[0].id, StudentId(2));
}

#[tokio::test]
async fn sqlite_store_follows_the_workflow_contract() {
    full_lifecycle(&sqlite_store().await).await;
}

#[tokio::test]
async fn memory_store_follows_the_workflow_contract() {
    full_lifecycle(&memory_store()).await;
}
