//! Database rows and their mapping onto domain documents.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::postgres::PgDocument;
use crate::domain::{
    ApplicationField, ApplicationId, AuthSession, PaymentField, PaymentId, PaymentRecord,
    SessionField, TuitionField, TuitionId, TuitionRequest, TutorApplication, User, UserField,
};
use crate::error::AppError;

fn corrupted(table: &str, err: &AppError) -> AppError {
    AppError::Persistence(format!("corrupted row in {table}: {err}"))
}

/// A row from the `users` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRow {
    /// Primary key.
    pub email: String,
    /// Display name.
    pub name: String,
    /// Role discriminator.
    pub role: String,
    /// Contact phone.
    pub phone: Option<String>,
    /// Profile photo URL.
    pub photo_url: Option<String>,
    /// Argon2 PHC string.
    pub password_hash: String,
    /// Registration time (tutors only).
    pub created_at: Option<DateTime<Utc>>,
}

impl PgDocument for User {
    type Row = UserRow;

    const TABLE: &'static str = "users";
    const KEY_COLUMN: &'static str = "email";
    const FIELDS: &'static [UserField] = &[
        UserField::Email,
        UserField::Name,
        UserField::Role,
        UserField::Phone,
        UserField::PhotoUrl,
        UserField::PasswordHash,
        UserField::CreatedAt,
    ];
    const INTEGER_FIELDS: &'static [UserField] = &[];

    fn column(field: UserField) -> &'static str {
        match field {
            UserField::Email => "email",
            UserField::Name => "name",
            UserField::Role => "role",
            UserField::Phone => "phone",
            UserField::PhotoUrl => "photo_url",
            UserField::PasswordHash => "password_hash",
            UserField::CreatedAt => "created_at",
        }
    }

    fn from_row(row: UserRow) -> Result<Self, AppError> {
        Ok(Self {
            role: row.role.parse().map_err(|e| corrupted(Self::TABLE, &e))?,
            email: row.email,
            name: row.name,
            phone: row.phone,
            photo_url: row.photo_url,
            password_hash: row.password_hash,
            created_at: row.created_at,
        })
    }
}

/// A row from the `sessions` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SessionRow {
    /// Primary key (bearer token).
    pub token: String,
    /// Owner's email.
    pub email: String,
    /// Issue time.
    pub issued_at: DateTime<Utc>,
    /// Expiry time.
    pub expires_at: DateTime<Utc>,
}

impl PgDocument for AuthSession {
    type Row = SessionRow;

    const TABLE: &'static str = "sessions";
    const KEY_COLUMN: &'static str = "token";
    const FIELDS: &'static [SessionField] = &[
        SessionField::Token,
        SessionField::Email,
        SessionField::IssuedAt,
        SessionField::ExpiresAt,
    ];
    const INTEGER_FIELDS: &'static [SessionField] = &[];

    fn column(field: SessionField) -> &'static str {
        match field {
            SessionField::Token => "token",
            SessionField::Email => "email",
            SessionField::IssuedAt => "issued_at",
            SessionField::ExpiresAt => "expires_at",
        }
    }

    fn from_row(row: SessionRow) -> Result<Self, AppError> {
        Ok(Self {
            token: row.token,
            email: row.email,
            issued_at: row.issued_at,
            expires_at: row.expires_at,
        })
    }
}

/// A row from the `tuitions` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TuitionRow {
    /// Primary key.
    pub id: Uuid,
    /// Owning student.
    pub student_email: String,
    /// Subject.
    pub subject: String,
    /// Class / grade level.
    pub class_level: String,
    /// Location.
    pub location: String,
    /// Budget in whole currency units.
    pub budget: i64,
    /// Preferred schedule.
    pub schedule: Option<String>,
    /// Free-form description.
    pub description: Option<String>,
    /// Status discriminator.
    pub status: String,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

impl PgDocument for TuitionRequest {
    type Row = TuitionRow;

    const TABLE: &'static str = "tuitions";
    const KEY_COLUMN: &'static str = "id";
    const FIELDS: &'static [TuitionField] = &[
        TuitionField::Id,
        TuitionField::StudentEmail,
        TuitionField::Subject,
        TuitionField::ClassLevel,
        TuitionField::Location,
        TuitionField::Budget,
        TuitionField::Schedule,
        TuitionField::Description,
        TuitionField::Status,
        TuitionField::CreatedAt,
    ];
    const INTEGER_FIELDS: &'static [TuitionField] = &[TuitionField::Budget];

    fn column(field: TuitionField) -> &'static str {
        match field {
            TuitionField::Id => "id",
            TuitionField::StudentEmail => "student_email",
            TuitionField::Subject => "subject",
            TuitionField::ClassLevel => "class_level",
            TuitionField::Location => "location",
            TuitionField::Budget => "budget",
            TuitionField::Schedule => "schedule",
            TuitionField::Description => "description",
            TuitionField::Status => "status",
            TuitionField::CreatedAt => "created_at",
        }
    }

    fn from_row(row: TuitionRow) -> Result<Self, AppError> {
        Ok(Self {
            id: TuitionId::from_uuid(row.id),
            status: row.status.parse().map_err(|e| corrupted(Self::TABLE, &e))?,
            student_email: row.student_email,
            subject: row.subject,
            class_level: row.class_level,
            location: row.location,
            budget: row.budget,
            schedule: row.schedule,
            description: row.description,
            created_at: row.created_at,
        })
    }
}

/// A row from the `applications` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ApplicationRow {
    /// Primary key.
    pub id: Uuid,
    /// Tuition applied to.
    pub tuition_id: Uuid,
    /// Applying tutor.
    pub tutor_email: String,
    /// Tutor display name.
    pub tutor_name: String,
    /// Owning student.
    pub student_email: String,
    /// Qualifications.
    pub qualifications: String,
    /// Experience.
    pub experience: String,
    /// Expected monthly salary.
    pub expected_salary: i64,
    /// Status discriminator.
    pub status: String,
    /// Submission time.
    pub created_at: DateTime<Utc>,
}

impl PgDocument for TutorApplication {
    type Row = ApplicationRow;

    const TABLE: &'static str = "applications";
    const KEY_COLUMN: &'static str = "id";
    const FIELDS: &'static [ApplicationField] = &[
        ApplicationField::Id,
        ApplicationField::TuitionId,
        ApplicationField::TutorEmail,
        ApplicationField::TutorName,
        ApplicationField::StudentEmail,
        ApplicationField::Qualifications,
        ApplicationField::Experience,
        ApplicationField::ExpectedSalary,
        ApplicationField::Status,
        ApplicationField::CreatedAt,
    ];
    const INTEGER_FIELDS: &'static [ApplicationField] = &[ApplicationField::ExpectedSalary];

    fn column(field: ApplicationField) -> &'static str {
        match field {
            ApplicationField::Id => "id",
            ApplicationField::TuitionId => "tuition_id",
            ApplicationField::TutorEmail => "tutor_email",
            ApplicationField::TutorName => "tutor_name",
            ApplicationField::StudentEmail => "student_email",
            ApplicationField::Qualifications => "qualifications",
            ApplicationField::Experience => "experience",
            ApplicationField::ExpectedSalary => "expected_salary",
            ApplicationField::Status => "status",
            ApplicationField::CreatedAt => "created_at",
        }
    }

    fn from_row(row: ApplicationRow) -> Result<Self, AppError> {
        Ok(Self {
            id: ApplicationId::from_uuid(row.id),
            tuition_id: TuitionId::from_uuid(row.tuition_id),
            status: row.status.parse().map_err(|e| corrupted(Self::TABLE, &e))?,
            tutor_email: row.tutor_email,
            tutor_name: row.tutor_name,
            student_email: row.student_email,
            qualifications: row.qualifications,
            experience: row.experience,
            expected_salary: row.expected_salary,
            created_at: row.created_at,
        })
    }
}

/// A row from the `payments` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PaymentRow {
    /// Primary key.
    pub id: Uuid,
    /// Provider transaction id (unique).
    pub transaction_id: String,
    /// Amount in the smallest currency unit.
    pub amount: i64,
    /// Currency code.
    pub currency: String,
    /// Paying student.
    pub payer_email: String,
    /// Receiving tutor.
    pub payee_email: String,
    /// Paid application.
    pub application_id: Uuid,
    /// Related tuition.
    pub tuition_id: Uuid,
    /// Provider payment status.
    pub payment_status: String,
    /// Confirmation time.
    pub paid_at: DateTime<Utc>,
}

impl PgDocument for PaymentRecord {
    type Row = PaymentRow;

    const TABLE: &'static str = "payments";
    const KEY_COLUMN: &'static str = "id";
    const FIELDS: &'static [PaymentField] = &[
        PaymentField::Id,
        PaymentField::TransactionId,
        PaymentField::Amount,
        PaymentField::Currency,
        PaymentField::PayerEmail,
        PaymentField::PayeeEmail,
        PaymentField::ApplicationId,
        PaymentField::TuitionId,
        PaymentField::PaymentStatus,
        PaymentField::PaidAt,
    ];
    const INTEGER_FIELDS: &'static [PaymentField] = &[PaymentField::Amount];

    fn column(field: PaymentField) -> &'static str {
        match field {
            PaymentField::Id => "id",
            PaymentField::TransactionId => "transaction_id",
            PaymentField::Amount => "amount",
            PaymentField::Currency => "currency",
            PaymentField::PayerEmail => "payer_email",
            PaymentField::PayeeEmail => "payee_email",
            PaymentField::ApplicationId => "application_id",
            PaymentField::TuitionId => "tuition_id",
            PaymentField::PaymentStatus => "payment_status",
            PaymentField::PaidAt => "paid_at",
        }
    }

    fn from_row(row: PaymentRow) -> Result<Self, AppError> {
        Ok(Self {
            id: PaymentId::from_uuid(row.id),
            application_id: ApplicationId::from_uuid(row.application_id),
            tuition_id: TuitionId::from_uuid(row.tuition_id),
            transaction_id: row.transaction_id,
            amount: row.amount,
            currency: row.currency,
            payer_email: row.payer_email,
            payee_email: row.payee_email,
            payment_status: row.payment_status,
            paid_at: row.paid_at,
        })
    }
}
