use std::{fmt, str::FromStr};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::ParseEnumError;

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub i64);
    };
}

id_newtype!(StudentId);
id_newtype!(QuestionId);
id_newtype!(StudentRequestId);
id_newtype!(FacultyRequestId);
id_newtype!(MentorQuestionId);
id_newtype!(ProfileId);
id_newtype!(InternshipId);

/// Declares a closed status enum whose variants travel as fixed strings, both
/// on the wire and in SQLite text columns.
macro_rules! string_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $text)]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $text,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = ParseEnumError;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                match value {
                    $($text => Ok($name::$variant),)+
                    other => Err(ParseEnumError::new(stringify!($name), other)),
                }
            }
        }
    };
}

string_enum!(
    Role {
        Student => "student",
        Faculty => "faculty",
        Hod => "hod",
    }
);

string_enum!(
    /// Whether a mentor has responded to the student's latest question.
    RemarkStatus {
        New => "New",
        Done => "Done",
    }
);

string_enum!(
    /// Whether a faculty member has taken the student onto their mentoring list.
    RequestStatus {
        Pending => "Pending",
        Accepted => "Accepted",
        Rejected => "Rejected",
    }
);

string_enum!(
    /// Escalation state of a faculty request for HOD intervention.
    HodSupportStatus {
        NotRequired => "Not Required",
        Requested => "Requested",
        Pending => "Pending",
        Approved => "Approved",
    }
);

string_enum!(
    QuestionStatus {
        Pending => "Pending",
        Answered => "Answered",
    }
);

string_enum!(
    /// Status of requests that land on the HOD's desk.
    ResolutionStatus {
        Pending => "Pending",
        Approved => "Approved",
        Rejected => "Rejected",
    }
);

string_enum!(
    Resolution {
        Approve => "approve",
        Reject => "reject",
    }
);

string_enum!(
    StudentRequestKind {
        Internship => "internship",
        Project => "project",
        Cocurricular => "cocurricular",
    }
);

impl RequestStatus {
    pub fn is_resolved(self) -> bool {
        !matches!(self, RequestStatus::Pending)
    }
}

impl HodSupportStatus {
    /// Approval only lands on an escalation that is still open.
    pub fn can_be_approved(self) -> bool {
        matches!(self, HodSupportStatus::Requested | HodSupportStatus::Pending)
    }
}

impl Resolution {
    pub fn outcome(self) -> ResolutionStatus {
        match self {
            Resolution::Approve => ResolutionStatus::Approved,
            Resolution::Reject => ResolutionStatus::Rejected,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    pub id: StudentId,
    pub name: String,
    pub branch: String,
    pub year: String,
    pub roll_no: String,
    pub remark_status: RemarkStatus,
    pub request_status: RequestStatus,
    pub hod_support_status: HodSupportStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    pub student_id: StudentId,
    pub question: String,
    pub date: NaiveDate,
    pub status: QuestionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answered_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answered_date: Option<NaiveDate>,
}

/// Answer stamp applied to a question in one step.
#[derive(Debug, Clone, PartialEq)]
pub struct AnswerStamp {
    pub answer: String,
    pub answered_by: String,
    pub answered_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentRequest {
    pub id: StudentRequestId,
    pub name: String,
    pub roll_no: String,
    pub branch: String,
    pub request_type: StudentRequestKind,
    pub request_title: String,
    pub request_description: String,
    pub request_date: NaiveDate,
    pub status: ResolutionStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacultyRequest {
    pub id: FacultyRequestId,
    pub faculty_name: String,
    pub student_id: StudentId,
    pub reason: String,
    pub request_date: NaiveDate,
    pub status: ResolutionStatus,
}

/// Faculty escalation joined with the identity of the student it is about.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacultyRequestView {
    #[serde(flatten)]
    pub request: FacultyRequest,
    pub student_name: String,
    pub student_roll_no: String,
    pub student_branch: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewFacultyRequest {
    pub faculty_name: String,
    pub reason: String,
    pub request_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MentorQuestion {
    pub id: MentorQuestionId,
    pub student_email: String,
    pub date: NaiveDate,
    pub faculty_name: String,
    pub branch: String,
    pub phone_number: String,
    pub question: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remarks_given: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewMentorQuestion {
    pub student_email: String,
    pub date: NaiveDate,
    pub faculty_name: String,
    pub branch: String,
    pub phone_number: String,
    pub question: String,
}
