/// Shared types used across the codebase
///
/// Every enumeration here is stored as TEXT in Postgres and travels as its
/// SCREAMING_SNAKE_CASE name on the wire.
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid {kind} value: {value}")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("cannot move {kind} from {from} to {to}")]
pub struct InvalidTransition {
    pub kind: &'static str,
    pub from: String,
    pub to: String,
}

/// Generates `as_str`, `FromStr`, `Display` and the sqlx TEXT mapping for a
/// fieldless enum.
macro_rules! text_enum {
    ($name:ident, $kind:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl FromStr for $name {
            type Err = ParseEnumError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => Err(ParseEnumError { kind: $kind, value: other.to_string() }),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl sqlx::Type<sqlx::Postgres> for $name {
            fn type_info() -> sqlx::postgres::PgTypeInfo {
                <str as sqlx::Type<sqlx::Postgres>>::type_info()
            }

            fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
                <str as sqlx::Type<sqlx::Postgres>>::compatible(ty)
            }
        }

        impl<'r> sqlx::Decode<'r, sqlx::Postgres> for $name {
            fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
                let text = <&str as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
                Ok(text.parse()?)
            }
        }

        impl sqlx::Encode<'_, sqlx::Postgres> for $name {
            fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
                <&str as sqlx::Encode<sqlx::Postgres>>::encode(self.as_str(), buf)
            }
        }
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    Student,
    Instructor,
    Admin,
}

text_enum!(UserRole, "role", {
    Student => "STUDENT",
    Instructor => "INSTRUCTOR",
    Admin => "ADMIN",
});

impl UserRole {
    /// Instructors and admins may author courses and categories.
    pub fn can_author(&self) -> bool {
        matches!(self, UserRole::Instructor | UserRole::Admin)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CourseLevel {
    Beginner,
    Intermediate,
    Advanced,
}

text_enum!(CourseLevel, "level", {
    Beginner => "BEGINNER",
    Intermediate => "INTERMEDIATE",
    Advanced => "ADVANCED",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CourseStatus {
    Draft,
    Published,
    Archived,
}

text_enum!(CourseStatus, "course status", {
    Draft => "DRAFT",
    Published => "PUBLISHED",
    Archived => "ARCHIVED",
});

impl CourseStatus {
    pub fn can_transition_to(&self, next: CourseStatus) -> bool {
        use CourseStatus::*;
        matches!(
            (self, next),
            (Draft, Draft)
                | (Published, Published)
                | (Archived, Archived)
                | (Draft, Published)
                | (Published, Archived)
                | (Published, Draft)
                | (Archived, Draft)
        )
    }

    pub fn transition(self, next: CourseStatus) -> Result<CourseStatus, InvalidTransition> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(InvalidTransition { kind: "course", from: self.to_string(), to: next.to_string() })
        }
    }

    /// Only published courses accept new enrollments.
    pub fn is_enrollable(&self) -> bool {
        matches!(self, CourseStatus::Published)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EnrollmentStatus {
    Active,
    Completed,
    Cancelled,
}

text_enum!(EnrollmentStatus, "enrollment status", {
    Active => "ACTIVE",
    Completed => "COMPLETED",
    Cancelled => "CANCELLED",
});

impl EnrollmentStatus {
    pub fn can_transition_to(&self, next: EnrollmentStatus) -> bool {
        use EnrollmentStatus::*;
        matches!(
            (self, next),
            (Active, Active)
                | (Completed, Completed)
                | (Active, Completed)
                | (Active, Cancelled)
                | (Completed, Active)
        )
    }

    pub fn transition(self, next: EnrollmentStatus) -> Result<EnrollmentStatus, InvalidTransition> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(InvalidTransition { kind: "enrollment", from: self.to_string(), to: next.to_string() })
        }
    }

    /// The status an enrollment should hold for a given completion percentage.
    pub fn for_progress(percentage: i32) -> EnrollmentStatus {
        if percentage >= 100 {
            EnrollmentStatus::Completed
        } else {
            EnrollmentStatus::Active
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LessonType {
    Video,
    Text,
    Quiz,
    Assignment,
}

text_enum!(LessonType, "lesson type", {
    Video => "VIDEO",
    Text => "TEXT",
    Quiz => "QUIZ",
    Assignment => "ASSIGNMENT",
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_prints_names() {
        assert_eq!("PUBLISHED".parse::<CourseStatus>().unwrap(), CourseStatus::Published);
        assert_eq!(CourseLevel::Intermediate.to_string(), "INTERMEDIATE");
        assert_eq!(UserRole::ALL.len(), 3);

        let err = "published".parse::<CourseStatus>().unwrap_err();
        assert_eq!(err.kind, "course status");
    }

    #[test]
    fn serde_uses_screaming_case() {
        let json = serde_json::to_string(&EnrollmentStatus::Cancelled).unwrap();
        assert_eq!(json, "\"CANCELLED\"");
        let role: UserRole = serde_json::from_str("\"INSTRUCTOR\"").unwrap();
        assert_eq!(role, UserRole::Instructor);
    }

    #[test]
    fn course_status_transitions() {
        use CourseStatus::*;
        assert!(Draft.can_transition_to(Published));
        assert!(Published.can_transition_to(Archived));
        assert!(Archived.can_transition_to(Draft));
        assert!(Draft.can_transition_to(Draft));
        assert!(!Draft.can_transition_to(Archived));
        assert!(!Archived.can_transition_to(Published));

        let err = Archived.transition(Published).unwrap_err();
        assert_eq!(err.to_string(), "cannot move course from ARCHIVED to PUBLISHED");
    }

    #[test]
    fn enrollment_cancelled_is_terminal() {
        use EnrollmentStatus::*;
        for next in EnrollmentStatus::ALL {
            assert!(!Cancelled.can_transition_to(*next));
        }
        assert!(Active.can_transition_to(Cancelled));
        assert!(!Completed.can_transition_to(Cancelled));
        assert!(Completed.can_transition_to(Active));
    }

    #[test]
    fn status_follows_progress() {
        assert_eq!(EnrollmentStatus::for_progress(0), EnrollmentStatus::Active);
        assert_eq!(EnrollmentStatus::for_progress(99), EnrollmentStatus::Active);
        assert_eq!(EnrollmentStatus::for_progress(100), EnrollmentStatus::Completed);
    }

    #[test]
    fn only_staff_can_author() {
        assert!(!UserRole::Student.can_author());
        assert!(UserRole::Instructor.can_author());
        assert!(UserRole::Admin.can_author());
    }
}
