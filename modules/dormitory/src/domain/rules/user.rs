use crate::contract::model::{NewUser, UserProfile};
use crate::domain::error::DomainError;

/// Trimmed copy, or `None` for blank input.
pub fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Emails compare case-insensitively, so they are stored lower-cased.
pub fn normalize_email(value: Option<String>) -> Option<String> {
    normalize_optional(value).map(|v| v.to_lowercase())
}

pub fn validate_username(username: &str, max_len: usize) -> Result<(), DomainError> {
    if username.is_empty() {
        return Err(DomainError::validation("username", "cannot be empty"));
    }
    let len = username.chars().count();
    if len > max_len {
        return Err(DomainError::validation(
            "username",
            format!("too long: {len} characters (max: {max_len})"),
        ));
    }
    if username.chars().any(char::is_whitespace) {
        return Err(DomainError::validation("username", "cannot contain whitespace"));
    }
    Ok(())
}

pub fn validate_real_name(real_name: &str) -> Result<(), DomainError> {
    if real_name.trim().is_empty() {
        return Err(DomainError::validation("real_name", "cannot be empty"));
    }
    Ok(())
}

/// Shape check only: one `@`, non-empty local part, a dot in the domain.
pub fn validate_email(email: &str) -> Result<(), DomainError> {
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(DomainError::validation("email", format!("invalid format: '{email}'")))
    }
}

pub fn validate_password(password: &str, min_len: usize) -> Result<(), DomainError> {
    if password.chars().count() < min_len {
        return Err(DomainError::validation(
            "password",
            format!("must be at least {min_len} characters"),
        ));
    }
    Ok(())
}

/// Trim free-text fields and blank-out empty optionals in place.
pub fn normalize_profile(profile: UserProfile) -> UserProfile {
    match profile {
        UserProfile::Student {
            student_number,
            class_name,
            major,
        } => UserProfile::Student {
            student_number: student_number.trim().to_string(),
            class_name: normalize_optional(class_name),
            major: normalize_optional(major),
        },
        UserProfile::Admin {
            department,
            position,
        } => UserProfile::Admin {
            department: normalize_optional(department),
            position: normalize_optional(position),
        },
    }
}

pub fn validate_profile(profile: &UserProfile) -> Result<(), DomainError> {
    if let UserProfile::Student { student_number, .. } = profile {
        if student_number.is_empty() {
            return Err(DomainError::validation("student_number", "required for students"));
        }
    }
    Ok(())
}

/// Normalized copy of `new`, validated against the configured limits.
pub fn prepare_new_user(
    new: NewUser,
    max_username_len: usize,
    min_password_len: usize,
) -> Result<NewUser, DomainError> {
    let prepared = NewUser {
        username: new.username.trim().to_string(),
        password: new.password,
        real_name: new.real_name.trim().to_string(),
        email: normalize_email(new.email),
        phone: normalize_optional(new.phone),
        profile: normalize_profile(new.profile),
    };
    validate_username(&prepared.username, max_username_len)?;
    validate_real_name(&prepared.real_name)?;
    if let Some(email) = &prepared.email {
        validate_email(email)?;
    }
    validate_password(&prepared.password, min_password_len)?;
    validate_profile(&prepared.profile)?;
    Ok(prepared)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn student(number: &str) -> NewUser {
        NewUser {
            username: "  alice ".into(),
            password: "secret1".into(),
            real_name: "Alice".into(),
            email: Some(" Alice@Example.COM ".into()),
            phone: Some("   ".into()),
            profile: UserProfile::Student {
                student_number: number.into(),
                class_name: Some("CS-1".into()),
                major: None,
            },
        }
    }

    #[test]
    fn normalizes_before_validating() {
        let u = prepare_new_user(student(" 2024001 "), 50, 6).unwrap();
        assert_eq!(u.username, "alice");
        assert_eq!(u.email.as_deref(), Some("alice@example.com"));
        assert_eq!(u.phone, None);
        assert_eq!(u.profile.student_number(), Some("2024001"));
    }

    #[test]
    fn rejects_bad_fields() {
        assert!(prepare_new_user(student("   "), 50, 6).is_err());

        let mut short_pw = student("1");
        short_pw.password = "12345".into();
        assert!(matches!(
            prepare_new_user(short_pw, 50, 6),
            Err(DomainError::Validation { field, .. }) if field == "password"
        ));

        let mut long_name = student("1");
        long_name.username = "x".repeat(51);
        assert!(prepare_new_user(long_name, 50, 6).is_err());
    }

    #[test]
    fn email_shape() {
        assert!(validate_email("a@b.cn").is_ok());
        for bad in ["", "ab.cn", "@b.cn", "a@b", "a@@b.cn", "a@.cn", "a@b."] {
            assert!(validate_email(bad).is_err(), "{bad}");
        }
    }
}
