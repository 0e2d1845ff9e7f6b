use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{
    FacultyRequest, FacultyRequestView, HodSupportStatus, MentorQuestion, Question, QuestionStatus,
    RemarkStatus, RequestStatus, Resolution, ResolutionStatus, Role, Student, StudentId,
    StudentRequest,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub role: Role,
    pub display_name: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StudentFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remark_status: Option<RemarkStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_status: Option<RequestStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hod_support_status: Option<HodSupportStatus>,
}

impl StudentFilter {
    pub fn matches(&self, student: &Student) -> bool {
        self.remark_status.map_or(true, |s| s == student.remark_status)
            && self.request_status.map_or(true, |s| s == student.request_status)
            && self
                .hod_support_status
                .map_or(true, |s| s == student.hod_support_status)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuestionFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub student_id: Option<StudentId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<QuestionStatus>,
}

impl QuestionFilter {
    pub fn matches(&self, question: &Question) -> bool {
        self.student_id.map_or(true, |id| id == question.student_id)
            && self.status.map_or(true, |s| s == question.status)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemarkStatusUpdate {
    pub status: RemarkStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestStatusUpdate {
    pub status: RequestStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerSubmission {
    pub answer: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HodSupportSubmission {
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolutionRequest {
    pub decision: Resolution,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MentorQuestionSubmission {
    pub faculty_name: String,
    #[serde(default)]
    pub branch: String,
    #[serde(default)]
    pub phone_number: String,
    pub question: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MentorRemarksSubmission {
    pub remarks: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolutionFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ResolutionStatus>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentDashboard {
    pub student: Student,
    pub questions: Vec<Question>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnsweredQuestion {
    pub question: Question,
    pub student: Student,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HodSupportRequested {
    pub student: Student,
    pub faculty_request: FacultyRequest,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacultyRequestResolved {
    pub request: FacultyRequestView,
    pub student: Student,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum ServerEvent {
    StudentUpdated {
        student: Student,
    },
    QuestionAnswered {
        question: Question,
        student: Student,
    },
    HodSupportRequested {
        student: Student,
        faculty_request: FacultyRequest,
    },
    StudentRequestResolved {
        request: StudentRequest,
    },
    FacultyRequestResolved {
        request: FacultyRequestView,
        student: Student,
    },
    MentorQuestionSubmitted {
        question: MentorQuestion,
    },
    MentorRemarksRecorded {
        question: MentorQuestion,
    },
}

impl From<AnsweredQuestion> for ServerEvent {
    fn from(value: AnsweredQuestion) -> Self {
        ServerEvent::QuestionAnswered {
            question: value.question,
            student: value.student,
        }
    }
}

impl From<HodSupportRequested> for ServerEvent {
    fn from(value: HodSupportRequested) -> Self {
        ServerEvent::HodSupportRequested {
            student: value.student,
            faculty_request: value.faculty_request,
        }
    }
}

impl From<FacultyRequestResolved> for ServerEvent {
    fn from(value: FacultyRequestResolved) -> Self {
        ServerEvent::FacultyRequestResolved {
            request: value.request,
            student: value.student,
        }
    }
}
