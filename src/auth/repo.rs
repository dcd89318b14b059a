pub use crate::auth::repo_types::{User, UserCollection, UserStatus};

impl UserCollection {
    /// Find a user by email, ignoring case.
    pub fn find_by_email(&self, email: &str) -> Option<&User> {
        let email = email.trim().to_lowercase();
        self.users.iter().find(|u| u.email.to_lowercase() == email)
    }

    pub fn find_by_id_mut(&mut self, id: &str) -> Option<&mut User> {
        self.users.iter_mut().find(|u| u.id == id)
    }

    pub fn find_by_session_token(&self, token: &str) -> Option<&User> {
        self.users
            .iter()
            .find(|u| u.session_token.as_deref() == Some(token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;

    fn collection() -> UserCollection {
        let mk = |id: &str, email: &str, token: Option<&str>| User {
            id: id.into(),
            name: "n".into(),
            email: email.into(),
            password_hash: "h".into(),
            plan: "p".into(),
            status: UserStatus::Pending,
            created_at: OffsetDateTime::now_utc(),
            session_token: token.map(str::to_string),
        };
        UserCollection {
            users: vec![mk("1", "ana@x.com", Some("tok")), mk("2", "Bob@X.com", None)],
        }
    }

    #[test]
    fn email_lookup_ignores_case() {
        let c = collection();
        assert_eq!(c.find_by_email("ANA@x.com").map(|u| u.id.as_str()), Some("1"));
        assert_eq!(c.find_by_email(" bob@x.com ").map(|u| u.id.as_str()), Some("2"));
        assert!(c.find_by_email("carol@x.com").is_none());
    }

    #[test]
    fn token_lookup_never_matches_users_without_a_token() {
        let c = collection();
        assert_eq!(c.find_by_session_token("tok").map(|u| u.id.as_str()), Some("1"));
        assert!(c.find_by_session_token("").is_none());
    }

    #[test]
    fn id_lookup_mutably() {
        let mut c = collection();
        c.find_by_id_mut("2").unwrap().status = UserStatus::Approved;
        assert_eq!(c.users[1].status, UserStatus::Approved);
        assert!(c.find_by_id_mut("3").is_none());
    }
}
