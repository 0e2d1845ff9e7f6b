use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow},
    Executor, Pool, Row, Sqlite,
};
use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use shared::{
    domain::{
        AnswerStamp, FacultyRequest, FacultyRequestId, FacultyRequestView, HodSupportStatus,
        InternshipId, MentorQuestion, MentorQuestionId, NewFacultyRequest, NewMentorQuestion,
        ProfileId, Question, QuestionId, QuestionStatus, RemarkStatus, RequestStatus,
        ResolutionStatus, Student, StudentId, StudentRequest, StudentRequestId,
    },
    error::ParseEnumError,
    profile::{Internship, StoredInternship, StoredProfile, StudentProfile},
    protocol::{QuestionFilter, StudentFilter},
};

mod memory;
pub mod seed;
mod store;

pub use memory::MemoryStore;
pub use seed::SeedData;
pub use store::{DocumentStore, Transition, WorkflowStore};

#[derive(Clone)]
pub struct Storage {
    pool: Pool<Sqlite>,
}

const STUDENT_COLUMNS: &str = "SELECT id, name, branch, year, roll_no, remark_status, request_status, hod_support_status, request_reason FROM students";

const QUESTION_COLUMNS: &str = "SELECT id, student_id, question, date, status, answer, answered_by, answered_date FROM questions";

const STUDENT_REQUEST_COLUMNS: &str = "SELECT id, name, roll_no, branch, request_type, request_title, request_description, request_date, status FROM student_requests";

const FACULTY_REQUEST_COLUMNS: &str = "SELECT f.id, f.faculty_name, f.student_id, f.reason, f.request_date, f.status,
        s.name AS student_name, s.roll_no AS student_roll_no, s.branch AS student_branch
 FROM faculty_requests f
 INNER JOIN students s ON s.id = f.student_id";

const MENTOR_QUESTION_COLUMNS: &str = "SELECT id, student_email, date, faculty_name, branch, phone_number, question, remarks_given FROM mentor_questions";

impl Storage {
    pub async fn new(database_url: &str) -> Result<Self> {
        ensure_sqlite_parent_dir_exists(database_url)?;

        let connect_options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true);
        // Every in-memory connection is its own database, so keep exactly one.
        let pool_options = if is_in_memory(database_url) {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(5)
        };
        let pool = pool_options
            .connect_with(connect_options)
            .await
            .with_context(|| format!("failed to connect to '{database_url}'"))?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    /// Loads seed records into an empty database. Returns `false` without
    /// writing anything when students already exist.
    pub async fn apply_seed(&self, seed: &SeedData) -> Result<bool> {
        let mut tx = self.pool.begin().await?;
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM students")
            .fetch_one(&mut *tx)
            .await?;
        if count > 0 {
            return Ok(false);
        }

        for student in &seed.students {
            sqlx::query(
                "INSERT INTO students (id, name, branch, year, roll_no, remark_status, request_status, hod_support_status, request_reason)
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(student.id.0)
            .bind(&student.name)
            .bind(&student.branch)
            .bind(&student.year)
            .bind(&student.roll_no)
            .bind(student.remark_status.as_str())
            .bind(student.request_status.as_str())
            .bind(student.hod_support_status.as_str())
            .bind(student.request_reason.as_deref())
            .execute(&mut *tx)
            .await
            .with_context(|| format!("failed to seed student {}", student.id.0))?;
        }

        for question in &seed.questions {
            sqlx::query(
                "INSERT INTO questions (id, student_id, question, date, status, answer, answered_by, answered_date)
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(question.id.0)
            .bind(question.student_id.0)
            .bind(&question.question)
            .bind(question.date)
            .bind(question.status.as_str())
            .bind(question.answer.as_deref())
            .bind(question.answered_by.as_deref())
            .bind(question.answered_date)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("failed to seed question {}", question.id.0))?;
        }

        for request in &seed.student_requests {
            sqlx::query(
                "INSERT INTO student_requests (id, name, roll_no, branch, request_type, request_title, request_description, request_date, status)
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(request.id.0)
            .bind(&request.name)
            .bind(&request.roll_no)
            .bind(&request.branch)
            .bind(request.request_type.as_str())
            .bind(&request.request_title)
            .bind(&request.request_description)
            .bind(request.request_date)
            .bind(request.status.as_str())
            .execute(&mut *tx)
            .await
            .with_context(|| format!("failed to seed student request {}", request.id.0))?;
        }

        for request in &seed.faculty_requests {
            sqlx::query(
                "INSERT INTO faculty_requests (id, faculty_name, student_id, reason, request_date, status)
                 VALUES (?, ?, ?, ?, ?, ?)",
            )
            .bind(request.id.0)
            .bind(&request.faculty_name)
            .bind(request.student_id.0)
            .bind(&request.reason)
            .bind(request.request_date)
            .bind(request.status.as_str())
            .execute(&mut *tx)
            .await
            .with_context(|| format!("failed to seed faculty request {}", request.id.0))?;
        }

        tx.commit().await?;
        Ok(true)
    }
}

#[async_trait]
impl WorkflowStore for Storage {
    async fn health_check(&self) -> Result<()> {
        let _: i64 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .context("sqlite ping failed")?;
        Ok(())
    }

    async fn get_student(&self, id: StudentId) -> Result<Option<Student>> {
        fetch_student(&self.pool, id).await
    }

    async fn list_students(&self, filter: &StudentFilter) -> Result<Vec<Student>> {
        let rows = sqlx::query(&format!(
            "{STUDENT_COLUMNS}
             WHERE (?1 IS NULL OR remark_status = ?1)
               AND (?2 IS NULL OR request_status = ?2)
               AND (?3 IS NULL OR hod_support_status = ?3)
             ORDER BY id ASC"
        ))
        .bind(filter.remark_status.map(RemarkStatus::as_str))
        .bind(filter.request_status.map(RequestStatus::as_str))
        .bind(filter.hod_support_status.map(HodSupportStatus::as_str))
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(student_from_row).collect()
    }

    async fn set_remark_status(
        &self,
        id: StudentId,
        status: RemarkStatus,
    ) -> Result<Option<Student>> {
        let mut tx = self.pool.begin().await?;
        sqlx::query(
            "UPDATE students SET remark_status = ?, updated_at = CURRENT_TIMESTAMP WHERE id = ?",
        )
        .bind(status.as_str())
        .bind(id.0)
        .execute(&mut *tx)
        .await?;
        let student = fetch_student(&mut *tx, id).await?;
        tx.commit().await?;
        Ok(student)
    }

    async fn transition_request_status(
        &self,
        id: StudentId,
        from: RequestStatus,
        to: RequestStatus,
    ) -> Result<Transition<Student>> {
        let mut tx = self.pool.begin().await?;
        let updated = sqlx::query(
            "UPDATE students SET request_status = ?1, updated_at = CURRENT_TIMESTAMP
             WHERE id = ?2 AND request_status = ?3",
        )
        .bind(to.as_str())
        .bind(id.0)
        .bind(from.as_str())
        .execute(&mut *tx)
        .await?
        .rows_affected();
        let student = fetch_student(&mut *tx, id).await?;
        tx.commit().await?;
        Ok(settle(updated == 1, student))
    }

    async fn open_hod_support(
        &self,
        id: StudentId,
        request: &NewFacultyRequest,
    ) -> Result<Transition<(Student, FacultyRequest), Student>> {
        let mut tx = self.pool.begin().await?;
        let updated = sqlx::query(
            "UPDATE students SET hod_support_status = ?1, request_reason = ?2, updated_at = CURRENT_TIMESTAMP
             WHERE id = ?3 AND hod_support_status = ?4",
        )
        .bind(HodSupportStatus::Requested.as_str())
        .bind(&request.reason)
        .bind(id.0)
        .bind(HodSupportStatus::NotRequired.as_str())
        .execute(&mut *tx)
        .await?
        .rows_affected();

        let Some(student) = fetch_student(&mut *tx, id).await? else {
            return Ok(Transition::Missing);
        };
        if updated == 0 {
            return Ok(Transition::Blocked(student));
        }

        let rec = sqlx::query(
            "INSERT INTO faculty_requests (faculty_name, student_id, reason, request_date, status)
             VALUES (?, ?, ?, ?, ?) RETURNING id",
        )
        .bind(&request.faculty_name)
        .bind(id.0)
        .bind(&request.reason)
        .bind(request.request_date)
        .bind(ResolutionStatus::Pending.as_str())
        .fetch_one(&mut *tx)
        .await
        .context("failed to file faculty request")?;
        tx.commit().await?;

        let faculty_request = FacultyRequest {
            id: FacultyRequestId(rec.try_get::<i64, _>(0)?),
            faculty_name: request.faculty_name.clone(),
            student_id: id,
            reason: request.reason.clone(),
            request_date: request.request_date,
            status: ResolutionStatus::Pending,
        };
        Ok(Transition::Applied((student, faculty_request)))
    }

    async fn get_question(&self, id: QuestionId) -> Result<Option<Question>> {
        fetch_question(&self.pool, id).await
    }

    async fn list_questions(&self, filter: &QuestionFilter) -> Result<Vec<Question>> {
        let rows = sqlx::query(&format!(
            "{QUESTION_COLUMNS}
             WHERE (?1 IS NULL OR student_id = ?1)
               AND (?2 IS NULL OR status = ?2)
             ORDER BY id ASC"
        ))
        .bind(filter.student_id.map(|id| id.0))
        .bind(filter.status.map(QuestionStatus::as_str))
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(question_from_row).collect()
    }

    async fn answer_question(
        &self,
        id: QuestionId,
        stamp: &AnswerStamp,
    ) -> Result<Transition<(Question, Student), Question>> {
        let mut tx = self.pool.begin().await?;
        let updated = sqlx::query(
            "UPDATE questions SET status = ?1, answer = ?2, answered_by = ?3, answered_date = ?4
             WHERE id = ?5 AND status = ?6",
        )
        .bind(QuestionStatus::Answered.as_str())
        .bind(&stamp.answer)
        .bind(&stamp.answered_by)
        .bind(stamp.answered_date)
        .bind(id.0)
        .bind(QuestionStatus::Pending.as_str())
        .execute(&mut *tx)
        .await?
        .rows_affected();

        let Some(question) = fetch_question(&mut *tx, id).await? else {
            return Ok(Transition::Missing);
        };
        if updated == 0 {
            return Ok(Transition::Blocked(question));
        }

        let marked = sqlx::query(
            "UPDATE students SET remark_status = ?, updated_at = CURRENT_TIMESTAMP WHERE id = ?",
        )
        .bind(RemarkStatus::Done.as_str())
        .bind(question.student_id.0)
        .execute(&mut *tx)
        .await?
        .rows_affected();
        if marked != 1 {
            // Dropping the transaction rolls the answer back.
            bail!(
                "question {} references missing student {}",
                id.0,
                question.student_id.0
            );
        }
        let student = fetch_student(&mut *tx, question.student_id)
            .await?
            .context("student vanished inside transaction")?;
        tx.commit().await?;
        Ok(Transition::Applied((question, student)))
    }

    async fn list_student_requests(
        &self,
        status: Option<ResolutionStatus>,
    ) -> Result<Vec<StudentRequest>> {
        let rows = sqlx::query(&format!(
            "{STUDENT_REQUEST_COLUMNS} WHERE (?1 IS NULL OR status = ?1) ORDER BY id ASC"
        ))
        .bind(status.map(ResolutionStatus::as_str))
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(student_request_from_row).collect()
    }

    async fn resolve_student_request(
        &self,
        id: StudentRequestId,
        outcome: ResolutionStatus,
    ) -> Result<Transition<StudentRequest>> {
        let mut tx = self.pool.begin().await?;
        let updated = sqlx::query(
            "UPDATE student_requests SET status = ?1 WHERE id = ?2 AND status = ?3",
        )
        .bind(outcome.as_str())
        .bind(id.0)
        .bind(ResolutionStatus::Pending.as_str())
        .execute(&mut *tx)
        .await?
        .rows_affected();
        let request = fetch_student_request(&mut *tx, id).await?;
        tx.commit().await?;
        Ok(settle(updated == 1, request))
    }

    async fn get_faculty_request(
        &self,
        id: FacultyRequestId,
    ) -> Result<Option<FacultyRequestView>> {
        fetch_faculty_request(&self.pool, id).await
    }

    async fn list_faculty_requests(
        &self,
        status: Option<ResolutionStatus>,
    ) -> Result<Vec<FacultyRequestView>> {
        let rows = sqlx::query(&format!(
            "{FACULTY_REQUEST_COLUMNS} WHERE (?1 IS NULL OR f.status = ?1) ORDER BY f.id ASC"
        ))
        .bind(status.map(ResolutionStatus::as_str))
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(faculty_request_from_row).collect()
    }

    async fn resolve_faculty_request(
        &self,
        id: FacultyRequestId,
        outcome: ResolutionStatus,
    ) -> Result<Transition<(FacultyRequestView, Student), FacultyRequestView>> {
        let mut tx = self.pool.begin().await?;
        let updated = sqlx::query(
            "UPDATE faculty_requests SET status = ?1 WHERE id = ?2 AND status = ?3",
        )
        .bind(outcome.as_str())
        .bind(id.0)
        .bind(ResolutionStatus::Pending.as_str())
        .execute(&mut *tx)
        .await?
        .rows_affected();

        let Some(view) = fetch_faculty_request(&mut *tx, id).await? else {
            return Ok(Transition::Missing);
        };
        if updated == 0 {
            return Ok(Transition::Blocked(view));
        }

        if outcome == ResolutionStatus::Approved {
            sqlx::query(
                "UPDATE students SET hod_support_status = ?1, updated_at = CURRENT_TIMESTAMP
                 WHERE id = ?2 AND hod_support_status IN (?3, ?4)",
            )
            .bind(HodSupportStatus::Approved.as_str())
            .bind(view.request.student_id.0)
            .bind(HodSupportStatus::Requested.as_str())
            .bind(HodSupportStatus::Pending.as_str())
            .execute(&mut *tx)
            .await?;
        }
        let student = fetch_student(&mut *tx, view.request.student_id)
            .await?
            .context("faculty request references a missing student")?;
        tx.commit().await?;
        Ok(Transition::Applied((view, student)))
    }

    async fn insert_mentor_question(
        &self,
        question: &NewMentorQuestion,
    ) -> Result<MentorQuestion> {
        let rec = sqlx::query(
            "INSERT INTO mentor_questions (student_email, date, faculty_name, branch, phone_number, question)
             VALUES (?, ?, ?, ?, ?, ?) RETURNING id",
        )
        .bind(&question.student_email)
        .bind(question.date)
        .bind(&question.faculty_name)
        .bind(&question.branch)
        .bind(&question.phone_number)
        .bind(&question.question)
        .fetch_one(&self.pool)
        .await?;
        Ok(MentorQuestion {
            id: MentorQuestionId(rec.try_get::<i64, _>(0)?),
            student_email: question.student_email.clone(),
            date: question.date,
            faculty_name: question.faculty_name.clone(),
            branch: question.branch.clone(),
            phone_number: question.phone_number.clone(),
            question: question.question.clone(),
            remarks_given: None,
        })
    }

    async fn list_mentor_questions(
        &self,
        student_email: Option<&str>,
    ) -> Result<Vec<MentorQuestion>> {
        let rows = sqlx::query(&format!(
            "{MENTOR_QUESTION_COLUMNS}
             WHERE (?1 IS NULL OR student_email = ?1 COLLATE NOCASE)
             ORDER BY id ASC"
        ))
        .bind(student_email)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(mentor_question_from_row).collect()
    }

    async fn record_mentor_remarks(
        &self,
        id: MentorQuestionId,
        remarks: &str,
    ) -> Result<Transition<MentorQuestion>> {
        let mut tx = self.pool.begin().await?;
        let updated = sqlx::query(
            "UPDATE mentor_questions SET remarks_given = ? WHERE id = ? AND remarks_given IS NULL",
        )
        .bind(remarks)
        .bind(id.0)
        .execute(&mut *tx)
        .await?
        .rows_affected();
        let row = sqlx::query(&format!("{MENTOR_QUESTION_COLUMNS} WHERE id = ?"))
            .bind(id.0)
            .fetch_optional(&mut *tx)
            .await?;
        let question = row.as_ref().map(mentor_question_from_row).transpose()?;
        tx.commit().await?;
        Ok(settle(updated == 1, question))
    }
}

#[async_trait]
impl DocumentStore for Storage {
    async fn insert_profile(&self, profile: &StudentProfile) -> Result<StoredProfile> {
        let document = serde_json::to_string(profile).context("failed to encode profile")?;
        let now = Utc::now();
        let rec = sqlx::query(
            "INSERT INTO student_profiles (document, created_at, updated_at) VALUES (?, ?, ?) RETURNING id",
        )
        .bind(document)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;
        Ok(StoredProfile {
            id: ProfileId(rec.try_get::<i64, _>(0)?),
            profile: profile.clone(),
            created_at: now,
            updated_at: now,
        })
    }

    async fn get_profile(&self, id: ProfileId) -> Result<Option<StoredProfile>> {
        let row = sqlx::query(
            "SELECT id, document, created_at, updated_at FROM student_profiles WHERE id = ?",
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(profile_from_row).transpose()
    }

    async fn insert_internship(&self, internship: &Internship) -> Result<StoredInternship> {
        let now = Utc::now();
        let rec = sqlx::query(
            "INSERT INTO internships (semester, kind, organisation, stipend, duration, location, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?) RETURNING id",
        )
        .bind(internship.semester)
        .bind(&internship.kind)
        .bind(&internship.organisation)
        .bind(&internship.stipend)
        .bind(&internship.duration)
        .bind(&internship.location)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;
        Ok(StoredInternship {
            id: InternshipId(rec.try_get::<i64, _>(0)?),
            internship: internship.clone(),
            created_at: now,
            updated_at: now,
        })
    }

    async fn get_internship(&self, id: InternshipId) -> Result<Option<StoredInternship>> {
        let row = sqlx::query(
            "SELECT id, semester, kind, organisation, stipend, duration, location, created_at, updated_at
             FROM internships WHERE id = ?",
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(internship_from_row).transpose()
    }

    async fn attach_internship(
        &self,
        profile_id: ProfileId,
        internship_id: InternshipId,
    ) -> Result<Option<StoredProfile>> {
        let mut tx = self.pool.begin().await?;
        let exists: Option<i64> = sqlx::query_scalar("SELECT id FROM internships WHERE id = ?")
            .bind(internship_id.0)
            .fetch_optional(&mut *tx)
            .await?;
        if exists.is_none() {
            bail!("internship {} does not exist", internship_id.0);
        }

        let row = sqlx::query(
            "SELECT id, document, created_at, updated_at FROM student_profiles WHERE id = ?",
        )
        .bind(profile_id.0)
        .fetch_optional(&mut *tx)
        .await?;
        let Some(mut stored) = row.as_ref().map(profile_from_row).transpose()? else {
            return Ok(None);
        };
        if !stored.profile.internships.contains(&internship_id) {
            stored.profile.internships.push(internship_id);
            stored.updated_at = Utc::now();
            let document =
                serde_json::to_string(&stored.profile).context("failed to encode profile")?;
            sqlx::query("UPDATE student_profiles SET document = ?, updated_at = ? WHERE id = ?")
                .bind(document)
                .bind(stored.updated_at)
                .bind(profile_id.0)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(Some(stored))
    }
}

fn settle<T>(applied: bool, current: Option<T>) -> Transition<T> {
    match current {
        None => Transition::Missing,
        Some(record) if applied => Transition::Applied(record),
        Some(record) => Transition::Blocked(record),
    }
}

async fn fetch_student<'e, E>(executor: E, id: StudentId) -> Result<Option<Student>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let row = sqlx::query(&format!("{STUDENT_COLUMNS} WHERE id = ?"))
        .bind(id.0)
        .fetch_optional(executor)
        .await?;
    row.as_ref().map(student_from_row).transpose()
}

async fn fetch_question<'e, E>(executor: E, id: QuestionId) -> Result<Option<Question>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let row = sqlx::query(&format!("{QUESTION_COLUMNS} WHERE id = ?"))
        .bind(id.0)
        .fetch_optional(executor)
        .await?;
    row.as_ref().map(question_from_row).transpose()
}

async fn fetch_student_request<'e, E>(
    executor: E,
    id: StudentRequestId,
) -> Result<Option<StudentRequest>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let row = sqlx::query(&format!("{STUDENT_REQUEST_COLUMNS} WHERE id = ?"))
        .bind(id.0)
        .fetch_optional(executor)
        .await?;
    row.as_ref().map(student_request_from_row).transpose()
}

async fn fetch_faculty_request<'e, E>(
    executor: E,
    id: FacultyRequestId,
) -> Result<Option<FacultyRequestView>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let row = sqlx::query(&format!("{FACULTY_REQUEST_COLUMNS} WHERE f.id = ?"))
        .bind(id.0)
        .fetch_optional(executor)
        .await?;
    row.as_ref().map(faculty_request_from_row).transpose()
}

fn text_enum<T>(row: &SqliteRow, column: &str) -> Result<T>
where
    T: FromStr<Err = ParseEnumError>,
{
    let raw: String = row.try_get(column)?;
    raw.parse::<T>()
        .with_context(|| format!("column '{column}' holds an unknown value"))
}

fn student_from_row(r: &SqliteRow) -> Result<Student> {
    Ok(Student {
        id: StudentId(r.try_get("id")?),
        name: r.try_get("name")?,
        branch: r.try_get("branch")?,
        year: r.try_get("year")?,
        roll_no: r.try_get("roll_no")?,
        remark_status: text_enum(r, "remark_status")?,
        request_status: text_enum(r, "request_status")?,
        hod_support_status: text_enum(r, "hod_support_status")?,
        request_reason: r.try_get("request_reason")?,
    })
}

fn question_from_row(r: &SqliteRow) -> Result<Question> {
    Ok(Question {
        id: QuestionId(r.try_get("id")?),
        student_id: StudentId(r.try_get("student_id")?),
        question: r.try_get("question")?,
        date: r.try_get("date")?,
        status: text_enum(r, "status")?,
        answer: r.try_get("answer")?,
        answered_by: r.try_get("answered_by")?,
        answered_date: r.try_get("answered_date")?,
    })
}

fn student_request_from_row(r: &SqliteRow) -> Result<StudentRequest> {
    Ok(StudentRequest {
        id: StudentRequestId(r.try_get("id")?),
        name: r.try_get("name")?,
        roll_no: r.try_get("roll_no")?,
        branch: r.try_get("branch")?,
        request_type: text_enum(r, "request_type")?,
        request_title: r.try_get("request_title")?,
        request_description: r.try_get("request_description")?,
        request_date: r.try_get("request_date")?,
        status: text_enum(r, "status")?,
    })
}

fn faculty_request_from_row(r: &SqliteRow) -> Result<FacultyRequestView> {
    Ok(FacultyRequestView {
        request: FacultyRequest {
            id: FacultyRequestId(r.try_get("id")?),
            faculty_name: r.try_get("faculty_name")?,
            student_id: StudentId(r.try_get("student_id")?),
            reason: r.try_get("reason")?,
            request_date: r.try_get("request_date")?,
            status: text_enum(r, "status")?,
        },
        student_name: r.try_get("student_name")?,
        student_roll_no: r.try_get("student_roll_no")?,
        student_branch: r.try_get("student_branch")?,
    })
}

fn mentor_question_from_row(r: &SqliteRow) -> Result<MentorQuestion> {
    Ok(MentorQuestion {
        id: MentorQuestionId(r.try_get("id")?),
        student_email: r.try_get("student_email")?,
        date: r.try_get("date")?,
        faculty_name: r.try_get("faculty_name")?,
        branch: r.try_get("branch")?,
        phone_number: r.try_get("phone_number")?,
        question: r.try_get("question")?,
        remarks_given: r.try_get("remarks_given")?,
    })
}

fn profile_from_row(r: &SqliteRow) -> Result<StoredProfile> {
    let document: String = r.try_get("document")?;
    let id = ProfileId(r.try_get("id")?);
    let profile: StudentProfile = serde_json::from_str(&document)
        .with_context(|| format!("profile {} holds an unreadable document", id.0))?;
    Ok(StoredProfile {
        id,
        profile,
        created_at: r.try_get("created_at")?,
        updated_at: r.try_get("updated_at")?,
    })
}

fn internship_from_row(r: &SqliteRow) -> Result<StoredInternship> {
    Ok(StoredInternship {
        id: InternshipId(r.try_get("id")?),
        internship: Internship {
            semester: r.try_get("semester")?,
            kind: r.try_get("kind")?,
            organisation: r.try_get("organisation")?,
            stipend: r.try_get("stipend")?,
            duration: r.try_get("duration")?,
            location: r.try_get("location")?,
        },
        created_at: r.try_get("created_at")?,
        updated_at: r.try_get("updated_at")?,
    })
}

fn ensure_sqlite_parent_dir_exists(database_url: &str) -> Result<()> {
    let Some(path) = sqlite_path(database_url) else {
        return Ok(());
    };

    let Some(parent) = path.parent() else {
        return Ok(());
    };

    fs::create_dir_all(parent).with_context(|| {
        format!(
            "failed to create parent directory '{}' for database url '{database_url}'",
            parent.display()
        )
    })?;

    Ok(())
}

fn is_in_memory(database_url: &str) -> bool {
    database_url == "sqlite::memory:" || database_url.contains("mode=memory")
}

fn sqlite_path(database_url: &str) -> Option<PathBuf> {
    if is_in_memory(database_url) || !database_url.starts_with("sqlite:") {
        return None;
    }

    let path = database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:")
        .split('?')
        .next()
        .unwrap_or_default();

    if path.is_empty() {
        return None;
    }

    Some(Path::new(path).to_path_buf())
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
