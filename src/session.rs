#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub id: String,
    pub display_name: String,
    pub email: Option<String>,
}

pub trait Identity: Send + Sync {
    fn is_signed_in(&self) -> bool;
    fn user(&self) -> Option<&UserProfile>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Anonymous;

impl Identity for Anonymous {
    fn is_signed_in(&self) -> bool {
        false
    }

    fn user(&self) -> Option<&UserProfile> {
        None
    }
}

#[derive(Debug, Clone)]
pub struct SignedIn(pub UserProfile);

impl Identity for SignedIn {
    fn is_signed_in(&self) -> bool {
        true
    }

    fn user(&self) -> Option<&UserProfile> {
        Some(&self.0)
    }
}
