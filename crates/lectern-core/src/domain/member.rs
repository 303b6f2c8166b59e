use serde::{Deserialize, Serialize};

/// Lowest `mb_level` treated as an administrator.
pub const ADMIN_LEVEL: u8 = 8;

/// Role at the gateway boundary. Only [`Role::from_level`] looks at the raw level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Member,
    Admin,
}

impl Role {
    pub fn from_level(level: u8) -> Self {
        if level >= ADMIN_LEVEL {
            Role::Admin
        } else {
            Role::Member
        }
    }
}

/// Member record as returned by the backend login and profile endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub mb_id: String,
    #[serde(default)]
    pub mb_name: String,
    #[serde(default)]
    pub mb_nick: String,
    #[serde(default)]
    pub mb_level: u8,
    #[serde(default, rename = "needProfileUpdate")]
    pub need_profile_update: bool,
}

impl SessionUser {
    pub fn role(&self) -> Role {
        Role::from_level(self.mb_level)
    }
}

/// Where the browser goes after a successful login or profile completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Landing {
    CompleteProfile,
    Admin,
    Home,
}

impl Landing {
    pub fn path(self) -> &'static str {
        match self {
            Landing::CompleteProfile => "/form/complete-profile",
            Landing::Admin => "/admin",
            Landing::Home => "/",
        }
    }
}

/// An authenticated session: the member record plus the backend bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user: SessionUser,
    pub access_token: String,
}

impl Session {
    pub fn new(user: SessionUser, access_token: impl Into<String>) -> Self {
        Self {
            user,
            access_token: access_token.into(),
        }
    }

    pub fn role(&self) -> Role {
        self.user.role()
    }

    /// Profile completion wins over the role check.
    pub fn landing(&self) -> Landing {
        if self.user.need_profile_update {
            Landing::CompleteProfile
        } else if self.role() == Role::Admin {
            Landing::Admin
        } else {
            Landing::Home
        }
    }
}

/// Why a request was refused by a role check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDenied {
    /// No session, or a session that could not be read.
    NotAuthenticated,
    /// Logged in, but below the required role.
    InsufficientRole,
}

/// Single authorization capability shared by every guarded route.
pub trait Authorize {
    fn require_role(&self, min: Role) -> Result<&Session, AccessDenied>;
}

impl Authorize for Option<Session> {
    fn require_role(&self, min: Role) -> Result<&Session, AccessDenied> {
        let session = self.as_ref().ok_or(AccessDenied::NotAuthenticated)?;
        if session.role() < min {
            return Err(AccessDenied::InsufficientRole);
        }
        Ok(session)
    }
}

/// Mask a member id for logs: keep the first two characters.
pub fn mask_id(mb_id: &str) -> String {
    let visible: String = mb_id.chars().take(2).collect();
    format!("{}***", visible)
}
