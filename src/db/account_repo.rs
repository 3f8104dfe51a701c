// src/db/account_repo.rs

use std::sync::Arc;

use serde_json::Value;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{
        collection::Collection,
        store::{CollectionStore, StorageKey},
    },
    models::account::{Admin, Contractor, Team},
};

// O repositório de contas: contratadas, equipes e admins
#[derive(Clone)]
pub struct AccountRepository {
    contractors: Collection<Contractor>,
    teams: Collection<Team>,
    admins: Collection<Admin>,
}

impl AccountRepository {
    pub fn new(store: Arc<dyn CollectionStore>) -> Self {
        Self {
            contractors: Collection::new(store.clone(), StorageKey::Contractors),
            teams: Collection::new(store.clone(), StorageKey::Teams),
            admins: Collection::new(store, StorageKey::Admins),
        }
    }

    // =========================================================================
    //  CONTRATADAS
    // =========================================================================

    pub async fn get_contractors(&self) -> Vec<Contractor> {
        self.contractors.get_all().await
    }

    pub async fn get_contractor(&self, id: Uuid) -> Option<Contractor> {
        self.contractors.get_by_id(id).await
    }

    pub async fn get_contractor_by_username(&self, username: &str) -> Option<Contractor> {
        self.contractors
            .find_by(|c| c.username == username)
            .await
            .into_iter()
            .next()
    }

    /// A pseudo-contratada 直営班 (equipes próprias), achada pelo nome.
    pub async fn get_internal_contractor(&self) -> Option<Contractor> {
        self.contractors
            .find_by(Contractor::is_internal)
            .await
            .into_iter()
            .next()
    }

    pub async fn add_contractor(&self, contractor: Contractor) -> Result<Contractor, AppError> {
        self.contractors.add(contractor).await
    }

    pub async fn update_contractor(
        &self,
        id: Uuid,
        partial: Value,
    ) -> Result<Option<Contractor>, AppError> {
        self.contractors.update(id, partial).await
    }

    /// Apaga a contratada e, em cascata, as equipes dela. Devolve quantas equipes saíram.
    pub async fn delete_contractor(&self, id: Uuid) -> Result<Option<usize>, AppError> {
        if !self.contractors.delete(id).await? {
            return Ok(None);
        }
        let removed_teams = self.teams.delete_where(|t| t.contractor_id == id).await?;
        Ok(Some(removed_teams))
    }

    // =========================================================================
    //  EQUIPES
    // =========================================================================

    pub async fn get_teams(&self) -> Vec<Team> {
        self.teams.get_all().await
    }

    pub async fn get_team(&self, id: Uuid) -> Option<Team> {
        self.teams.get_by_id(id).await
    }

    pub async fn get_teams_by_contractor(&self, contractor_id: Uuid) -> Vec<Team> {
        self.teams.find_by(|t| t.contractor_id == contractor_id).await
    }

    pub async fn add_team(&self, team: Team) -> Result<Team, AppError> {
        self.teams.add(team).await
    }

    pub async fn update_team(&self, id: Uuid, partial: Value) -> Result<Option<Team>, AppError> {
        self.teams.update(id, partial).await
    }

    pub async fn delete_team(&self, id: Uuid) -> Result<bool, AppError> {
        self.teams.delete(id).await
    }

    // =========================================================================
    //  ADMINS
    // =========================================================================

    pub async fn get_admins(&self) -> Vec<Admin> {
        self.admins.get_all().await
    }

    pub async fn get_admin(&self, id: Uuid) -> Option<Admin> {
        self.admins.get_by_id(id).await
    }

    pub async fn get_admin_by_username(&self, username: &str) -> Option<Admin> {
        self.admins
            .find_by(|a| a.username == username)
            .await
            .into_iter()
            .next()
    }

    pub async fn add_admin(&self, admin: Admin) -> Result<Admin, AppError> {
        self.admins.add(admin).await
    }

    pub async fn update_admin(&self, id: Uuid, partial: Value) -> Result<Option<Admin>, AppError> {
        self.admins.update(id, partial).await
    }

    pub async fn delete_admin(&self, id: Uuid) -> Result<bool, AppError> {
        self.admins.delete(id).await
    }

    /// Usernames são únicos entre admins e contratadas (a tela de login é uma só).
    pub async fn username_taken(&self, username: &str, except: Option<Uuid>) -> bool {
        let in_admins = self
            .admins
            .find_by(|a| a.username == username && Some(a.id) != except)
            .await;
        let in_contractors = self
            .contractors
            .find_by(|c| c.username == username && Some(c.id) != except)
            .await;
        !in_admins.is_empty() || !in_contractors.is_empty()
    }
}
