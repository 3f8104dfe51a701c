// src/models/account.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::db::collection::Record;

/// Nome reservado do "協力会社" que representa as equipes próprias (直営).
pub const INTERNAL_CONTRACTOR_NAME: &str = "直営班";

fn default_active() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contractor {
    pub id: Uuid,
    pub name: String,
    pub username: String,
    // Texto puro, visível para administradores
    pub password: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl Contractor {
    pub fn is_internal(&self) -> bool {
        self.name == INTERNAL_CONTRACTOR_NAME
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub id: Uuid,
    pub contractor_id: Uuid,
    pub team_name: String,
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Admin {
    pub id: Uuid,
    pub name: String,
    pub username: String,
    pub password: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl Record for Contractor {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl Record for Team {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl Record for Admin {
    fn id(&self) -> Uuid {
        self.id
    }
}

/// Contratada + suas equipes, como a tela de contas mostra.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractorWithTeams {
    #[serde(flatten)]
    pub contractor: Contractor,
    pub teams: Vec<Team>,
}

// --- Payloads ---

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewAccountPayload {
    #[validate(length(min = 1, message = "名前を入力してください"))]
    pub name: String,
    #[validate(custom(function = "crate::common::validators::validate_username"))]
    pub username: String,
    #[validate(length(min = 4, message = "パスワードは4文字以上で入力してください"))]
    pub password: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewTeamPayload {
    #[validate(length(min = 1, message = "班名を入力してください"))]
    pub team_name: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
}
