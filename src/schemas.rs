use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Error;

pub type Uid = String;

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Member {
    pub uid: Uid,
    pub name: String,
}

/// Record held by the profile directory; only `name` matters for legacy
/// payer resolution, the rest is carried for the frontend.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Profile {
    pub uid: Uid,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Expense {
    pub title: String,
    pub amount: f64,
    /// Member uid for expenses recorded through the API; imported data may
    /// still carry a display name (resolved through the shim in `resolve`).
    pub payer: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Project {
    pub id: String,
    pub name: String,
    pub members: Vec<Member>,
    pub expenses: Vec<Expense>,
}

impl Member {
    pub fn validate(&self) -> Result<(), Error> {
        if self.uid.trim().is_empty() {
            return Err(Error::EmptyMemberUid);
        }
        Ok(())
    }
}

impl Expense {
    pub fn validate(&self) -> Result<(), Error> {
        if !self.amount.is_finite() || self.amount < 0.0 {
            return Err(Error::InvalidAmount {
                amount: self.amount,
            });
        }
        if self.payer.trim().is_empty() {
            return Err(Error::EmptyPayer);
        }
        Ok(())
    }
}
