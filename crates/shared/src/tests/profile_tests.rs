use super::*;
use crate::error::ErrorCode;

#[test]
fn passport_defaults_when_absent() {
    let mut value = serde_json::to_value(sample_profile()).expect("json");
    value
        .as_object_mut()
        .expect("object")
        .remove("passport");
    let profile: StudentProfile = serde_json::from_value(value).expect("profile");
    assert_eq!(profile.passport, "Not Available");
}

#[test]
fn community_uses_upper_case_codes() {
    assert_eq!(
        serde_json::to_string(&Community::Obc).expect("json"),
        "\"OBC\""
    );
}

#[test]
fn blank_required_fields_are_listed() {
    let mut profile = sample_profile();
    profile.father_name = "  ".into();
    profile.address.clear();
    let err = profile.validate().expect_err("should fail");
    assert_eq!(err.code, ErrorCode::Validation);
    assert!(err.message.contains("address"));
    assert!(err.message.contains("father_name"));
}

#[test]
fn negative_marks_are_rejected() {
    let mut profile = sample_profile();
    profile.marks.cgpa = -1.0;
    let err = profile.validate().expect_err("should fail");
    assert!(err.message.contains("cgpa"));
}

#[test]
fn internship_requires_organisation() {
    let internship = Internship {
        semester: 6,
        kind: "Summer".into(),
        organisation: String::new(),
        stipend: "20000".into(),
        duration: "8 weeks".into(),
        location: "Hyderabad".into(),
    };
    let err = internship.validate().expect_err("should fail");
    assert!(err.message.contains("organisation"));
}
