use anyhow::Result;
use async_trait::async_trait;
use shared::{
    domain::{
        AnswerStamp, FacultyRequest, FacultyRequestId, FacultyRequestView, InternshipId,
        MentorQuestion, MentorQuestionId, NewFacultyRequest, NewMentorQuestion, ProfileId,
        Question, QuestionId, RemarkStatus, RequestStatus, ResolutionStatus, Student, StudentId,
        StudentRequest, StudentRequestId,
    },
    profile::{Internship, StoredInternship, StoredProfile, StudentProfile},
    protocol::{QuestionFilter, StudentFilter},
};

/// Result of a conditional update against one entity.
///
/// `Applied` carries the records as they are after the write, `Blocked` the
/// unchanged record whose current status did not permit the change.
#[derive(Debug, Clone, PartialEq)]
pub enum Transition<T, C = T> {
    Applied(T),
    Blocked(C),
    Missing,
}

impl<T, C> Transition<T, C> {
    pub fn is_applied(&self) -> bool {
        matches!(self, Transition::Applied(_))
    }
}

/// Repository over the mentoring workflow entities.
///
/// Every mutating method is a compare-and-set scoped to one entity id and is
/// applied atomically together with its side effects.
#[async_trait]
pub trait WorkflowStore: Send + Sync {
    async fn health_check(&self) -> Result<()>;

    async fn get_student(&self, id: StudentId) -> Result<Option<Student>>;

    async fn list_students(&self, filter: &StudentFilter) -> Result<Vec<Student>>;

    async fn set_remark_status(
        &self,
        id: StudentId,
        status: RemarkStatus,
    ) -> Result<Option<Student>>;

    async fn transition_request_status(
        &self,
        id: StudentId,
        from: RequestStatus,
        to: RequestStatus,
    ) -> Result<Transition<Student>>;

    /// Moves a student from `Not Required` to `Requested` and files the
    /// matching faculty request for the HOD.
    async fn open_hod_support(
        &self,
        id: StudentId,
        request: &NewFacultyRequest,
    ) -> Result<Transition<(Student, FacultyRequest), Student>>;

    async fn get_question(&self, id: QuestionId) -> Result<Option<Question>>;

    async fn list_questions(&self, filter: &QuestionFilter) -> Result<Vec<Question>>;

    /// Marks a pending question answered and the owning student's remark
    /// status `Done`.
    async fn answer_question(
        &self,
        id: QuestionId,
        stamp: &AnswerStamp,
    ) -> Result<Transition<(Question, Student), Question>>;

    async fn list_student_requests(
        &self,
        status: Option<ResolutionStatus>,
    ) -> Result<Vec<StudentRequest>>;

    async fn resolve_student_request(
        &self,
        id: StudentRequestId,
        outcome: ResolutionStatus,
    ) -> Result<Transition<StudentRequest>>;

    async fn get_faculty_request(&self, id: FacultyRequestId)
        -> Result<Option<FacultyRequestView>>;

    async fn list_faculty_requests(
        &self,
        status: Option<ResolutionStatus>,
    ) -> Result<Vec<FacultyRequestView>>;

    /// Resolves a pending faculty request. Approval also marks the student's
    /// HOD support `Approved` when the escalation is still open.
    async fn resolve_faculty_request(
        &self,
        id: FacultyRequestId,
        outcome: ResolutionStatus,
    ) -> Result<Transition<(FacultyRequestView, Student), FacultyRequestView>>;

    async fn insert_mentor_question(&self, question: &NewMentorQuestion)
        -> Result<MentorQuestion>;

    async fn list_mentor_questions(&self, student_email: Option<&str>)
        -> Result<Vec<MentorQuestion>>;

    async fn record_mentor_remarks(
        &self,
        id: MentorQuestionId,
        remarks: &str,
    ) -> Result<Transition<MentorQuestion>>;
}

/// Document persistence for student intake profiles and internships.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn insert_profile(&self, profile: &StudentProfile) -> Result<StoredProfile>;

    async fn get_profile(&self, id: ProfileId) -> Result<Option<StoredProfile>>;

    async fn insert_internship(&self, internship: &Internship) -> Result<StoredInternship>;

    async fn get_internship(&self, id: InternshipId) -> Result<Option<StoredInternship>>;

    /// Appends the internship to the profile's list once; `None` when the
    /// profile does not exist.
    async fn attach_internship(
        &self,
        profile_id: ProfileId,
        internship_id: InternshipId,
    ) -> Result<Option<StoredProfile>>;
}
