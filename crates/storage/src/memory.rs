use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex, MutexGuard},
};

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use shared::{
    domain::{
        AnswerStamp, FacultyRequest, FacultyRequestId, FacultyRequestView, HodSupportStatus,
        InternshipId, MentorQuestion, MentorQuestionId, NewFacultyRequest, NewMentorQuestion,
        ProfileId, Question, QuestionId, QuestionStatus, RemarkStatus, RequestStatus,
        ResolutionStatus, Student, StudentId, StudentRequest, StudentRequestId,
    },
    profile::{Internship, StoredInternship, StoredProfile, StudentProfile},
    protocol::{QuestionFilter, StudentFilter},
};

use crate::{
    seed::SeedData,
    store::{DocumentStore, Transition, WorkflowStore},
};

/// Process-local store. One mutex guards every collection, so each
/// operation observes and leaves a consistent snapshot.
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

#[derive(Default)]
struct MemoryState {
    students: BTreeMap<StudentId, Student>,
    questions: BTreeMap<QuestionId, Question>,
    student_requests: BTreeMap<StudentRequestId, StudentRequest>,
    faculty_requests: BTreeMap<FacultyRequestId, FacultyRequest>,
    mentor_questions: BTreeMap<MentorQuestionId, MentorQuestion>,
    profiles: BTreeMap<ProfileId, StoredProfile>,
    internships: BTreeMap<InternshipId, StoredInternship>,
}

fn next_id<K: Copy, V>(map: &BTreeMap<K, V>, raw: impl Fn(K) -> i64) -> i64 {
    map.keys().next_back().map_or(1, |key| raw(*key) + 1)
}

impl MemoryState {
    fn faculty_request_view(&self, request: &FacultyRequest) -> Result<FacultyRequestView> {
        let student = self
            .students
            .get(&request.student_id)
            .with_context(|| {
                format!("faculty request {} references a missing student", request.id.0)
            })?;
        Ok(FacultyRequestView {
            request: request.clone(),
            student_name: student.name.clone(),
            student_roll_no: student.roll_no.clone(),
            student_branch: student.branch.clone(),
        })
    }

    fn student(&self, id: StudentId) -> Result<Student> {
        self.students
            .get(&id)
            .cloned()
            .with_context(|| format!("student {} is missing", id.0))
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store from seed records, rejecting duplicate ids and
    /// dangling student references.
    pub fn from_seed(seed: SeedData) -> Result<Self> {
        let mut state = MemoryState::default();
        for student in seed.students {
            if state.students.insert(student.id, student).is_some() {
                bail!("duplicate student id in seed data");
            }
        }
        for question in seed.questions {
            if !state.students.contains_key(&question.student_id) {
                bail!("question {} references a missing student", question.id.0);
            }
            if state.questions.insert(question.id, question).is_some() {
                bail!("duplicate question id in seed data");
            }
        }
        for request in seed.student_requests {
            if state.student_requests.insert(request.id, request).is_some() {
                bail!("duplicate student request id in seed data");
            }
        }
        for request in seed.faculty_requests {
            if !state.students.contains_key(&request.student_id) {
                bail!("faculty request {} references a missing student", request.id.0);
            }
            if state.faculty_requests.insert(request.id, request).is_some() {
                bail!("duplicate faculty request id in seed data");
            }
        }
        Ok(Self {
            state: Arc::new(Mutex::new(state)),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, MemoryState>> {
        self.state
            .lock()
            .map_err(|_| anyhow!("memory store mutex poisoned"))
    }
}

#[async_trait]
impl WorkflowStore for MemoryStore {
    async fn health_check(&self) -> Result<()> {
        self.lock().map(|_| ())
    }

    async fn get_student(&self, id: StudentId) -> Result<Option<Student>> {
        Ok(self.lock()?.students.get(&id).cloned())
    }

    async fn list_students(&self, filter: &StudentFilter) -> Result<Vec<Student>> {
        Ok(self
            .lock()?
            .students
            .values()
            .filter(|student| filter.matches(student))
            .cloned()
            .collect())
    }

    async fn set_remark_status(
        &self,
        id: StudentId,
        status: RemarkStatus,
    ) -> Result<Option<Student>> {
        let mut state = self.lock()?;
        Ok(state.students.get_mut(&id).map(|student| {
            student.remark_status = status;
            student.clone()
        }))
    }

    async fn transition_request_status(
        &self,
        id: StudentId,
        from: RequestStatus,
        to: RequestStatus,
    ) -> Result<Transition<Student>> {
        let mut state = self.lock()?;
        let Some(student) = state.students.get_mut(&id) else {
            return Ok(Transition::Missing);
        };
        if student.request_status != from {
            return Ok(Transition::Blocked(student.clone()));
        }
        student.request_status = to;
        Ok(Transition::Applied(student.clone()))
    }

    async fn open_hod_support(
        &self,
        id: StudentId,
        request: &NewFacultyRequest,
    ) -> Result<Transition<(Student, FacultyRequest), Student>> {
        let mut state = self.lock()?;
        let request_id = FacultyRequestId(next_id(&state.faculty_requests, |k| k.0));
        let Some(student) = state.students.get_mut(&id) else {
            return Ok(Transition::Missing);
        };
        if student.hod_support_status != HodSupportStatus::NotRequired {
            return Ok(Transition::Blocked(student.clone()));
        }
        student.hod_support_status = HodSupportStatus::Requested;
        student.request_reason = Some(request.reason.clone());
        let student = student.clone();

        let faculty_request = FacultyRequest {
            id: request_id,
            faculty_name: request.faculty_name.clone(),
            student_id: id,
            reason: request.reason.clone(),
            request_date: request.request_date,
            status: ResolutionStatus::Pending,
        };
        state
            .faculty_requests
            .insert(request_id, faculty_request.clone());
        Ok(Transition::Applied((student, faculty_request)))
    }

    async fn get_question(&self, id: QuestionId) -> Result<Option<Question>> {
        Ok(self.lock()?.questions.get(&id).cloned())
    }

    async fn list_questions(&self, filter: &QuestionFilter) -> Result<Vec<Question>> {
        Ok(self
            .lock()?
            .questions
            .values()
            .filter(|question| filter.matches(question))
            .cloned()
            .collect())
    }

    async fn answer_question(
        &self,
        id: QuestionId,
        stamp: &AnswerStamp,
    ) -> Result<Transition<(Question, Student), Question>> {
        let mut state = self.lock()?;
        let Some(question) = state.questions.get(&id).cloned() else {
            return Ok(Transition::Missing);
        };
        if question.status != QuestionStatus::Pending {
            return Ok(Transition::Blocked(question));
        }
        // Both records are checked before either is written.
        let mut student = state.student(question.student_id)?;
        student.remark_status = RemarkStatus::Done;

        let question = Question {
            status: QuestionStatus::Answered,
            answer: Some(stamp.answer.clone()),
            answered_by: Some(stamp.answered_by.clone()),
            answered_date: Some(stamp.answered_date),
            ..question
        };
        state.questions.insert(id, question.clone());
        state.students.insert(student.id, student.clone());
        Ok(Transition::Applied((question, student)))
    }

    async fn list_student_requests(
        &self,
        status: Option<ResolutionStatus>,
    ) -> Result<Vec<StudentRequest>> {
        Ok(self
            .lock()?
            .student_requests
            .values()
            .filter(|request| status.map_or(true, |s| s == request.status))
            .cloned()
            .collect())
    }

    async fn resolve_student_request(
        &self,
        id: StudentRequestId,
        outcome: ResolutionStatus,
    ) -> Result<Transition<StudentRequest>> {
        let mut state = self.lock()?;
        let Some(request) = state.student_requests.get_mut(&id) else {
            return Ok(Transition::Missing);
        };
        if request.status != ResolutionStatus::Pending {
            return Ok(Transition::Blocked(request.clone()));
        }
        request.status = outcome;
        Ok(Transition::Applied(request.clone()))
    }

    async fn get_faculty_request(
        &self,
        id: FacultyRequestId,
    ) -> Result<Option<FacultyRequestView>> {
        let state = self.lock()?;
        state
            .faculty_requests
            .get(&id)
            .map(|request| state.faculty_request_view(request))
            .transpose()
    }

    async fn list_faculty_requests(
        &self,
        status: Option<ResolutionStatus>,
    ) -> Result<Vec<FacultyRequestView>> {
        let state = self.lock()?;
        state
            .faculty_requests
            .values()
            .filter(|request| status.map_or(true, |s| s == request.status))
            .map(|request| state.faculty_request_view(request))
            .collect()
    }

    async fn resolve_faculty_request(
        &self,
        id: FacultyRequestId,
        outcome: ResolutionStatus,
    ) -> Result<Transition<(FacultyRequestView, Student), FacultyRequestView>> {
        let mut state = self.lock()?;
        let Some(request) = state.faculty_requests.get(&id).cloned() else {
            return Ok(Transition::Missing);
        };
        if request.status != ResolutionStatus::Pending {
            return Ok(Transition::Blocked(state.faculty_request_view(&request)?));
        }
        let mut student = state.student(request.student_id)?;
        if outcome == ResolutionStatus::Approved && student.hod_support_status.can_be_approved() {
            student.hod_support_status = HodSupportStatus::Approved;
        }
        let request = FacultyRequest {
            status: outcome,
            ..request
        };
        state.faculty_requests.insert(id, request.clone());
        state.students.insert(student.id, student.clone());
        let view = state.faculty_request_view(&request)?;
        Ok(Transition::Applied((view, student)))
    }

    async fn insert_mentor_question(
        &self,
        question: &NewMentorQuestion,
    ) -> Result<MentorQuestion> {
        let mut state = self.lock()?;
        let id = MentorQuestionId(next_id(&state.mentor_questions, |k| k.0));
        let stored = MentorQuestion {
            id,
            student_email: question.student_email.clone(),
            date: question.date,
            faculty_name: question.faculty_name.clone(),
            branch: question.branch.clone(),
            phone_number: question.phone_number.clone(),
            question: question.question.clone(),
            remarks_given: None,
        };
        state.mentor_questions.insert(id, stored.clone());
        Ok(stored)
    }

    async fn list_mentor_questions(
        &self,
        student_email: Option<&str>,
    ) -> Result<Vec<MentorQuestion>> {
        Ok(self
            .lock()?
            .mentor_questions
            .values()
            .filter(|q| {
                student_email.map_or(true, |email| q.student_email.eq_ignore_ascii_case(email))
            })
            .cloned()
            .collect())
    }

    async fn record_mentor_remarks(
        &self,
        id: MentorQuestionId,
        remarks: &str,
    ) -> Result<Transition<MentorQuestion>> {
        let mut state = self.lock()?;
        let Some(question) = state.mentor_questions.get_mut(&id) else {
            return Ok(Transition::Missing);
        };
        if question.remarks_given.is_some() {
            return Ok(Transition::Blocked(question.clone()));
        }
        question.remarks_given = Some(remarks.to_string());
        Ok(Transition::Applied(question.clone()))
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn insert_profile(&self, profile: &StudentProfile) -> Result<StoredProfile> {
        let mut state = self.lock()?;
        let id = ProfileId(next_id(&state.profiles, |k| k.0));
        let now = Utc::now();
        let stored = StoredProfile {
            id,
            profile: profile.clone(),
            created_at: now,
            updated_at: now,
        };
        state.profiles.insert(id, stored.clone());
        Ok(stored)
    }

    async fn get_profile(&self, id: ProfileId) -> Result<Option<StoredProfile>> {
        Ok(self.lock()?.profiles.get(&id).cloned())
    }

    async fn insert_internship(&self, internship: &Internship) -> Result<StoredInternship> {
        let mut state = self.lock()?;
        let id = InternshipId(next_id(&state.internships, |k| k.0));
        let now = Utc::now();
        let stored = StoredInternship {
            id,
            internship: internship.clone(),
            created_at: now,
            updated_at: now,
        };
        state.internships.insert(id, stored.clone());
        Ok(stored)
    }

    async fn get_internship(&self, id: InternshipId) -> Result<Option<StoredInternship>> {
        Ok(self.lock()?.internships.get(&id).cloned())
    }

    async fn attach_internship(
        &self,
        profile_id: ProfileId,
        internship_id: InternshipId,
    ) -> Result<Option<StoredProfile>> {
        let mut state = self.lock()?;
        if !state.internships.contains_key(&internship_id) {
            bail!("internship {} does not exist", internship_id.0);
        }
        Ok(state.profiles.get_mut(&profile_id).map(|stored| {
            if !stored.profile.internships.contains(&internship_id) {
                stored.profile.internships.push(internship_id);
                stored.updated_at = Utc::now();
            }
            stored.clone()
        }))
    }
}

#[cfg(test)]
#[path = "tests/memory_tests.rs"]
mod tests;
