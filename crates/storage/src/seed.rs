use anyhow::{Context, Result};
use chrono::NaiveDate;
use shared::domain::{
    FacultyRequest, FacultyRequestId, HodSupportStatus, Question, QuestionId, QuestionStatus,
    RemarkStatus, RequestStatus, ResolutionStatus, Student, StudentId, StudentRequest,
    StudentRequestId, StudentRequestKind,
};

/// Records loaded into an empty store at startup.
#[derive(Debug, Clone, Default)]
pub struct SeedData {
    pub students: Vec<Student>,
    pub questions: Vec<Question>,
    pub student_requests: Vec<StudentRequest>,
    pub faculty_requests: Vec<FacultyRequest>,
}

fn day(year: i32, month: u32, day: u32) -> Result<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day)
        .with_context(|| format!("invalid seed date {year}-{month}-{day}"))
}

#[allow(clippy::too_many_arguments)]
fn student(
    id: i64,
    name: &str,
    branch: &str,
    year: &str,
    roll_no: &str,
    remark_status: RemarkStatus,
    request_status: RequestStatus,
    hod_support_status: HodSupportStatus,
) -> Student {
    Student {
        id: StudentId(id),
        name: name.to_string(),
        branch: branch.to_string(),
        year: year.to_string(),
        roll_no: roll_no.to_string(),
        remark_status,
        request_status,
        hod_support_status,
        request_reason: None,
    }
}

#[allow(clippy::too_many_arguments)]
fn student_request(
    id: i64,
    name: &str,
    roll_no: &str,
    branch: &str,
    request_type: StudentRequestKind,
    title: &str,
    description: &str,
    request_date: NaiveDate,
) -> StudentRequest {
    StudentRequest {
        id: StudentRequestId(id),
        name: name.to_string(),
        roll_no: roll_no.to_string(),
        branch: branch.to_string(),
        request_type,
        request_title: title.to_string(),
        request_description: description.to_string(),
        request_date,
        status: ResolutionStatus::Pending,
    }
}

fn faculty_request(
    id: i64,
    faculty_name: &str,
    student_id: i64,
    reason: &str,
    request_date: NaiveDate,
) -> FacultyRequest {
    FacultyRequest {
        id: FacultyRequestId(id),
        faculty_name: faculty_name.to_string(),
        student_id: StudentId(student_id),
        reason: reason.to_string(),
        request_date,
        status: ResolutionStatus::Pending,
    }
}

/// Demo department: five mentees, three students escalated by other
/// faculty, open questions and a queue of requests for the HOD.
pub fn demo() -> Result<SeedData> {
    use HodSupportStatus::{NotRequired, Requested};
    use RemarkStatus::{Done, New};
    use RequestStatus::{Accepted, Pending};

    let mut students = vec![
        student(1, "Yogesh Kumar", "CSE", "3rd", "422275", Done, Accepted, NotRequired),
        student(2, "Rahul Sharma", "ECE", "2nd", "422301", New, Pending, NotRequired),
        student(3, "Priya Patel", "CSE", "4th", "421150", Done, Accepted, Requested),
        student(4, "Arjun Singh", "MECH", "3rd", "422405", New, Pending, NotRequired),
        student(5, "Sneha Reddy", "CIVIL", "2nd", "422510", Done, Pending, NotRequired),
        student(6, "Suresh Reddy", "CSE", "4th", "BT20CSE020", Done, Accepted, Requested),
        student(7, "Ananya Gupta", "ECE", "4th", "BT20ECE025", Done, Accepted, Requested),
        student(8, "Karthik Rajan", "MECH", "4th", "BT20ME030", Done, Accepted, Requested),
    ];
    students[2].request_reason = Some("Student needs help securing a final-year project guide".into());
    students[5].request_reason =
        Some("Student needs additional guidance for research paper publication".into());
    students[6].request_reason =
        Some("Student requires additional lab access for project completion".into());
    students[7].request_reason = Some("Student needs support for industry collaboration".into());

    let questions = vec![
        Question {
            id: QuestionId(1),
            student_id: StudentId(2),
            question: "I'm facing difficulty with the Data Structures course. Can you suggest some additional resources?".into(),
            date: day(2025, 4, 1)?,
            status: QuestionStatus::Pending,
            answer: None,
            answered_by: None,
            answered_date: None,
        },
        Question {
            id: QuestionId(2),
            student_id: StudentId(4),
            question: "I want to join the robotics club. What are the requirements?".into(),
            date: day(2025, 4, 5)?,
            status: QuestionStatus::Pending,
            answer: None,
            answered_by: None,
            answered_date: None,
        },
        Question {
            id: QuestionId(3),
            student_id: StudentId(1),
            question: "Could you help me with choosing electives for next semester?".into(),
            date: day(2025, 3, 15)?,
            status: QuestionStatus::Answered,
            answer: Some("I would recommend the Machine Learning or Cloud Computing electives based on your interests. Let's schedule a meeting to discuss in detail.".into()),
            answered_by: Some("Dr. Ramesh Kumar".into()),
            answered_date: Some(day(2025, 3, 18)?),
        },
    ];

    let student_requests = vec![
        student_request(
            1,
            "John Doe",
            "BT20CSE001",
            "CSE",
            StudentRequestKind::Internship,
            "Summer Internship at Google",
            "3-month internship in software development",
            day(2025, 4, 1)?,
        ),
        student_request(
            2,
            "Jane Smith",
            "BT20CSE002",
            "CSE",
            StudentRequestKind::Project,
            "AI-based Attendance System",
            "Developing an AI system for automated attendance",
            day(2025, 4, 2)?,
        ),
        student_request(
            3,
            "Rahul Kumar",
            "BT20ECE005",
            "ECE",
            StudentRequestKind::Cocurricular,
            "IEEE Conference Participation",
            "Presenting a paper at IEEE conference",
            day(2025, 4, 3)?,
        ),
        student_request(
            4,
            "Priya Sharma",
            "BT20CSE010",
            "CSE",
            StudentRequestKind::Internship,
            "Research Internship at IISc",
            "6-month research internship in computer vision",
            day(2025, 4, 5)?,
        ),
        student_request(
            5,
            "Amit Patel",
            "BT20ME015",
            "MECH",
            StudentRequestKind::Project,
            "Renewable Energy System Design",
            "Designing a hybrid solar-wind energy system",
            day(2025, 4, 8)?,
        ),
    ];

    let faculty_requests = vec![
        faculty_request(
            1,
            "Dr. Ramesh Kumar",
            6,
            "Student needs additional guidance for research paper publication",
            day(2025, 4, 10)?,
        ),
        faculty_request(
            2,
            "Prof. Sunita Mishra",
            7,
            "Student requires additional lab access for project completion",
            day(2025, 4, 12)?,
        ),
        faculty_request(
            3,
            "Dr. Venkat Rao",
            8,
            "Student needs support for industry collaboration",
            day(2025, 4, 14)?,
        ),
        faculty_request(
            4,
            "Dr. Ramesh Kumar",
            3,
            "Student needs help securing a final-year project guide",
            day(2025, 4, 15)?,
        ),
    ];

    Ok(SeedData {
        students,
        questions,
        student_requests,
        faculty_requests,
    })
}
