use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    domain::{InternshipId, ProfileId},
    error::ApiError,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Community {
    General,
    #[serde(rename = "OBC")]
    Obc,
    #[serde(rename = "SC")]
    Sc,
    #[serde(rename = "ST")]
    St,
    #[serde(rename = "EWS")]
    Ews,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcademicMarks {
    pub x_marks: f32,
    pub xii_marks: f32,
    pub jee_mains: f32,
    pub jee_advanced: f32,
    pub cgpa: f32,
}

/// Self-reported concerns from the intake survey. Every flag is required.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WellbeingSurvey {
    pub stress: bool,
    pub anger: bool,
    pub emotional_problem: bool,
    pub low_self_esteem: bool,
    pub examination_anxiety: bool,
    pub negative_thoughts: bool,
    pub exam_phobia: bool,
    pub stammering: bool,
    pub financial_problem: bool,
    pub mood_swings: bool,
    pub disturbed_relationship_with_parents: bool,
    pub disturbed_relationship_with_teachers: bool,
    pub disturbed_relationship_with_friends: bool,
    pub disciplinary_problems_in_college: bool,
    pub poor_command_of_english: bool,
    pub tobacco_or_alcohol_use: bool,
    pub suicidal_attempts_or_thoughts: bool,
    pub disappointment_with_courses: bool,
    pub time_management_problem: bool,
    pub relationship_problem: bool,
    pub low_self_motivation: bool,
    pub conflicts: bool,
    pub procrastination: bool,
    pub frustration: bool,
    pub poor_decisive_power: bool,
    pub adjustment_problem: bool,
    pub lack_of_expression: bool,
    pub poor_concentration: bool,
    pub stage_phobia: bool,
    pub worries_about_future: bool,
    pub poor_memory_problem: bool,
    pub migraine_headache: bool,
    pub fear_of_public_speaking: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interests {
    #[serde(default)]
    pub hobbies: Vec<String>,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub areas_to_improve: Vec<String>,
    #[serde(default)]
    pub core: Vec<String>,
    #[serde(default)]
    pub it: Vec<String>,
    #[serde(default)]
    pub higher_education: Vec<String>,
    #[serde(default)]
    pub startup: Vec<String>,
    #[serde(default)]
    pub family_business: Vec<String>,
    #[serde(default)]
    pub other_interests: Vec<String>,
}

fn default_passport() -> String {
    "Not Available".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentProfile {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aadhar: Option<i64>,
    pub phone: i64,
    pub registration: i64,
    pub roll_no: i64,
    #[serde(default = "default_passport")]
    pub passport: String,
    pub parent_phone: i64,
    pub emergency_contact: i64,
    pub email: String,
    pub dob: NaiveDate,
    pub address: String,
    pub program: String,
    pub blood_group: String,
    pub day_scholar: bool,
    pub branch: String,
    pub father_name: String,
    pub mother_name: String,
    pub father_occupation: String,
    pub mother_occupation: String,
    pub gender: Gender,
    pub community: Community,
    pub marks: AcademicMarks,
    pub survey: WellbeingSurvey,
    #[serde(default)]
    pub interests: Interests,
    #[serde(default)]
    pub internships: Vec<InternshipId>,
}

impl StudentProfile {
    /// Rejects blank required text fields and marks that are not finite,
    /// non-negative numbers.
    pub fn validate(&self) -> Result<(), ApiError> {
        let required = [
            ("name", &self.name),
            ("email", &self.email),
            ("address", &self.address),
            ("program", &self.program),
            ("blood_group", &self.blood_group),
            ("branch", &self.branch),
            ("father_name", &self.father_name),
            ("mother_name", &self.mother_name),
            ("father_occupation", &self.father_occupation),
            ("mother_occupation", &self.mother_occupation),
        ];
        let missing: Vec<&str> = required
            .iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(field, _)| *field)
            .collect();
        if !missing.is_empty() {
            return Err(ApiError::validation(format!(
                "missing required fields: {}",
                missing.join(", ")
            )));
        }

        let marks = [
            ("x_marks", self.marks.x_marks),
            ("xii_marks", self.marks.xii_marks),
            ("jee_mains", self.marks.jee_mains),
            ("jee_advanced", self.marks.jee_advanced),
            ("cgpa", self.marks.cgpa),
        ];
        if let Some((field, _)) = marks
            .iter()
            .find(|(_, value)| !value.is_finite() || *value < 0.0)
        {
            return Err(ApiError::validation(format!("{field} must be a non-negative number")));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredProfile {
    pub id: ProfileId,
    #[serde(flatten)]
    pub profile: StudentProfile,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Internship {
    pub semester: i64,
    #[serde(rename = "type")]
    pub kind: String,
    pub organisation: String,
    pub stipend: String,
    pub duration: String,
    pub location: String,
}

impl Internship {
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.semester < 1 {
            return Err(ApiError::validation("semester must be at least 1"));
        }
        let required = [
            ("type", &self.kind),
            ("organisation", &self.organisation),
            ("stipend", &self.stipend),
            ("duration", &self.duration),
            ("location", &self.location),
        ];
        if let Some((field, _)) = required.iter().find(|(_, value)| value.trim().is_empty()) {
            return Err(ApiError::validation(format!("{field} is required")));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredInternship {
    pub id: InternshipId,
    #[serde(flatten)]
    pub internship: Internship,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
pub(crate) fn sample_profile() -> StudentProfile {
    StudentProfile {
        name: "Suhani Reddy".into(),
        aadhar: None,
        phone: 9_876_543_210,
        registration: 2021_0042,
        roll_no: 421_042,
        passport: default_passport(),
        parent_phone: 9_876_500_000,
        emergency_contact: 9_876_511_111,
        email: "SuhaniReddy@student.nitandhra.ac.in".into(),
        dob: NaiveDate::from_ymd_opt(2003, 6, 14).expect("date"),
        address: "Tadepalligudem".into(),
        program: "B.Tech".into(),
        blood_group: "O+".into(),
        day_scholar: false,
        branch: "CSE".into(),
        father_name: "Ravi Reddy".into(),
        mother_name: "Lakshmi Reddy".into(),
        father_occupation: "Engineer".into(),
        mother_occupation: "Teacher".into(),
        gender: Gender::Female,
        community: Community::General,
        marks: AcademicMarks {
            x_marks: 96.0,
            xii_marks: 94.5,
            jee_mains: 97.2,
            jee_advanced: 0.0,
            cgpa: 8.7,
        },
        survey: WellbeingSurvey::default(),
        interests: Interests::default(),
        internships: Vec::new(),
    }
}

#[cfg(test)]
#[path = "tests/profile_tests.rs"]
mod tests;
