use super::*;
use crate::seed;
use chrono::NaiveDate;

fn store() -> MemoryStore {
    MemoryStore::from_seed(seed::demo().expect("seed")).expect("store")
}

fn stamp() -> AnswerStamp {
    AnswerStamp {
        answer: "Join the Tuesday meeting".to_string(),
        answered_by: "Prof. Sunita Mishra".to_string(),
        answered_date: NaiveDate::from_ymd_opt(2025, 4, 20).expect("date"),
    }
}

#[tokio::test]
async fn rejects_seed_with_dangling_student_reference() {
    let mut seed = seed::demo().expect("seed");
    seed.faculty_requests[0].student_id = StudentId(999);
    assert!(MemoryStore::from_seed(seed).is_err());
}

#[tokio::test]
async fn rejects_seed_with_duplicate_ids() {
    let mut seed = seed::demo().expect("seed");
    let copy = seed.students[0].clone();
    seed.students.push(copy);
    assert!(MemoryStore::from_seed(seed).is_err());
}

#[tokio::test]
async fn answer_updates_question_and_student_in_one_step() {
    let store = store();
    let outcome = store
        .answer_question(QuestionId(2), &stamp())
        .await
        .expect("answer");
    let Transition::Applied((question, student)) = outcome else {
        panic!("expected applied transition");
    };
    assert_eq!(question.status, QuestionStatus::Answered);
    assert_eq!(student.id, StudentId(4));
    assert_eq!(student.remark_status, RemarkStatus::Done);

    let pending = store
        .list_questions(&QuestionFilter {
            status: Some(QuestionStatus::Pending),
            ..QuestionFilter::default()
        })
        .await
        .expect("questions");
    assert_eq!(pending.len(), 1);
}

#[tokio::test]
async fn remark_status_on_unknown_student_reports_none() {
    let store = store();
    let missing = store
        .set_remark_status(StudentId(77), RemarkStatus::Done)
        .await
        .expect("update");
    assert!(missing.is_none());

    let reopened = store
        .set_remark_status(StudentId(1), RemarkStatus::New)
        .await
        .expect("update")
        .expect("exists");
    assert_eq!(reopened.remark_status, RemarkStatus::New);
}

#[tokio::test]
async fn hod_support_allocates_next_faculty_request_id() {
    let store = store();
    let outcome = store
        .open_hod_support(
            StudentId(2),
            &NewFacultyRequest {
                faculty_name: "Dr. Ramesh Kumar".to_string(),
                reason: "Attendance below threshold".to_string(),
                request_date: NaiveDate::from_ymd_opt(2025, 4, 22).expect("date"),
            },
        )
        .await
        .expect("open");
    let Transition::Applied((_, request)) = outcome else {
        panic!("expected applied transition");
    };
    assert_eq!(request.id, FacultyRequestId(5));

    let blocked = store
        .open_hod_support(
            StudentId(3),
            &NewFacultyRequest {
                faculty_name: "Dr. Ramesh Kumar".to_string(),
                reason: "again".to_string(),
                request_date: NaiveDate::from_ymd_opt(2025, 4, 22).expect("date"),
            },
        )
        .await
        .expect("open");
    let Transition::Blocked(student) = blocked else {
        panic!("expected blocked transition");
    };
    assert_eq!(student.hod_support_status, HodSupportStatus::Requested);
}

#[tokio::test]
async fn faculty_request_views_join_student_identity() {
    let store = store();
    let views = store.list_faculty_requests(None).await.expect("views");
    let karthik = views
        .iter()
        .find(|v| v.request.id == FacultyRequestId(3))
        .expect("request 3");
    assert_eq!(karthik.student_name, "Karthik Rajan");
    assert_eq!(karthik.student_roll_no, "BT20ME030");
    assert_eq!(karthik.student_branch, "MECH");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_resolutions_apply_exactly_once() {
    let store = store();
    let tasks: Vec<_> = [ResolutionStatus::Approved, ResolutionStatus::Rejected]
        .into_iter()
        .cycle()
        .take(8)
        .map(|outcome| {
            let store = store.clone();
            tokio::spawn(async move {
                store
                    .resolve_faculty_request(FacultyRequestId(1), outcome)
                    .await
            })
        })
        .collect();

    let mut applied = 0;
    for task in tasks {
        if task.await.expect("join").expect("resolve").is_applied() {
            applied += 1;
        }
    }
    assert_eq!(applied, 1);
}

#[tokio::test]
async fn documents_get_sequential_ids() {
    let store = MemoryStore::new();
    let internship = Internship {
        semester: 7,
        kind: "Winter".to_string(),
        organisation: "DRDO".to_string(),
        stipend: "Unpaid".to_string(),
        duration: "4 weeks".to_string(),
        location: "Hyderabad".to_string(),
    };
    let first = store.insert_internship(&internship).await.expect("first");
    let second = store.insert_internship(&internship).await.expect("second");
    assert_eq!(first.id, InternshipId(1));
    assert_eq!(second.id, InternshipId(2));
    assert!(store
        .get_profile(ProfileId(1))
        .await
        .expect("profile")
        .is_none());
}
