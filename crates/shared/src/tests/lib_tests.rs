use chrono::NaiveDate;

use crate::{
    domain::{
        HodSupportStatus, MentorQuestion, MentorQuestionId, RemarkStatus, RequestStatus,
        Resolution, ResolutionStatus,
    },
    error::ErrorCode,
    protocol::ServerEvent,
};

#[test]
fn hod_support_status_uses_ui_spelling() {
    let text = serde_json::to_string(&HodSupportStatus::NotRequired).expect("json");
    assert_eq!(text, "\"Not Required\"");
    let parsed: HodSupportStatus = "Not Required".parse().expect("parse");
    assert_eq!(parsed, HodSupportStatus::NotRequired);
}

#[test]
fn unknown_status_text_is_rejected() {
    let err = "Maybe".parse::<RequestStatus>().expect_err("should fail");
    assert_eq!(err.kind, "RequestStatus");
    assert!(serde_json::from_str::<RemarkStatus>("\"Open\"").is_err());
}

#[test]
fn every_status_round_trips_through_its_text() {
    for status in RequestStatus::ALL {
        assert_eq!(status.as_str().parse::<RequestStatus>().expect("parse"), *status);
    }
    for status in HodSupportStatus::ALL {
        assert_eq!(
            status.as_str().parse::<HodSupportStatus>().expect("parse"),
            *status
        );
    }
}

#[test]
fn resolution_maps_to_terminal_status() {
    assert_eq!(Resolution::Approve.outcome(), ResolutionStatus::Approved);
    assert_eq!(Resolution::Reject.outcome(), ResolutionStatus::Rejected);
    assert_eq!(
        serde_json::from_str::<Resolution>("\"reject\"").expect("json"),
        Resolution::Reject
    );
}

#[test]
fn api_error_serializes_with_snake_case_code() {
    let err = crate::error::ApiError::new(ErrorCode::NotFound, "gone");
    let value = serde_json::to_value(&err).expect("json");
    assert_eq!(value["code"], "not_found");
    assert_eq!(value["message"], "gone");
}

#[test]
fn events_are_tagged_by_type_with_a_payload() {
    let event = ServerEvent::MentorRemarksRecorded {
        question: MentorQuestion {
            id: MentorQuestionId(7),
            student_email: "student2@student.nitandhra.ac.in".into(),
            date: NaiveDate::from_ymd_opt(2025, 4, 20).expect("date"),
            faculty_name: "Dr. Ramesh Kumar".into(),
            branch: "ECE".into(),
            phone_number: String::new(),
            question: "Electives?".into(),
            remarks_given: Some("See me Monday".into()),
        },
    };
    let value = serde_json::to_value(&event).expect("json");
    assert_eq!(value["type"], "mentor_remarks_recorded");
    assert_eq!(value["payload"]["question"]["id"], 7);
}
