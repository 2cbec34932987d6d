//! Seeded application accounts.
//!
//! Rows live in the application's `accounts_user` table, keyed by email.
//! The same three accounts are written on every startup so that a fresh
//! deployment is immediately usable by each role.

/// Application role stored in the `rol` column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Admin,
    Reviewer,
    Student,
}

impl Role {
    /// Database representation of the role
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Reviewer => "REVIEWER",
            Role::Student => "STUDENT",
        }
    }
}

/// One account written during provisioning
pub struct SeedAccount {
    pub email: &'static str,
    pub password: &'static str,
    pub first_name: &'static str,
    pub last_name: &'static str,
    pub role: Role,
    pub is_staff: bool,
    pub is_superuser: bool,
}

redacted_debug!(SeedAccount {
    show email,
    redact password,
    show role,
    show is_staff,
    show is_superuser,
});

/// The fixed provisioning set, one account per role.
pub const SEED_ACCOUNTS: [SeedAccount; 3] = [
    SeedAccount {
        email: "admin@ficha.local",
        password: "administrador1",
        first_name: "Admin",
        last_name: "General",
        role: Role::Admin,
        is_staff: true,
        is_superuser: true,
    },
    SeedAccount {
        email: "revisor@ficha.local",
        password: "revisor12345",
        first_name: "Revisor",
        last_name: "Clinico",
        role: Role::Reviewer,
        is_staff: true,
        is_superuser: false,
    },
    SeedAccount {
        email: "alumno@ficha.local",
        password: "alumno123456",
        first_name: "Alumno",
        last_name: "Practica",
        role: Role::Student,
        is_staff: false,
        is_superuser: false,
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_set_covers_every_role() {
        let roles: Vec<&str> = SEED_ACCOUNTS.iter().map(|a| a.role.as_str()).collect();
        assert_eq!(roles, vec!["ADMIN", "REVIEWER", "STUDENT"]);
    }

    #[test]
    fn test_seed_emails_are_unique() {
        let mut emails: Vec<&str> = SEED_ACCOUNTS.iter().map(|a| a.email).collect();
        emails.sort_unstable();
        emails.dedup();
        assert_eq!(emails.len(), SEED_ACCOUNTS.len());
    }

    #[test]
    fn test_only_admin_is_superuser() {
        for account in &SEED_ACCOUNTS {
            assert_eq!(
                account.is_superuser,
                matches!(account.role, Role::Admin),
                "{}",
                account.email
            );
        }
    }

    #[test]
    fn test_passwords_satisfy_length_validator() {
        // The application rejects logins seeded with passwords shorter than
        // its 10 character minimum.
        for account in &SEED_ACCOUNTS {
            assert!(account.password.len() >= 10, "{}", account.email);
        }
    }

    #[test]
    fn test_debug_output_redacts_seed_password() {
        let output = format!("{:?}", SEED_ACCOUNTS[0]);
        assert!(output.contains("admin@ficha.local"));
        assert!(!output.contains("administrador1"));
    }
}
