// src/services/account_service.rs

use chrono::Utc;
use serde_json::Value;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{error::AppError, validators::is_valid_username},
    db::{AccountRepository, ExclusionRepository},
    models::{
        account::{
            Admin, Contractor, ContractorWithTeams, NewAccountPayload, NewTeamPayload, Team,
            INTERNAL_CONTRACTOR_NAME,
        },
        auth::Session,
    },
};

#[derive(Clone)]
pub struct AccountService {
    repo: AccountRepository,
    exclusions: ExclusionRepository,
}

impl AccountService {
    pub fn new(repo: AccountRepository, exclusions: ExclusionRepository) -> Self {
        Self { repo, exclusions }
    }

    /// Garante o 直営班 e, se configurado, um admin inicial. Chamado no boot.
    pub async fn ensure_defaults(
        &self,
        default_admin: Option<(String, String)>,
    ) -> Result<(), AppError> {
        if self.repo.get_internal_contractor().await.is_none() {
            self.repo
                .add_contractor(Contractor {
                    id: Uuid::new_v4(),
                    name: INTERNAL_CONTRACTOR_NAME.to_string(),
                    username: "chokuei".to_string(),
                    password: Uuid::new_v4().simple().to_string(),
                    // Ninguém loga como 直営班
                    is_active: false,
                    created_at: Utc::now(),
                })
                .await?;
            tracing::info!("✅ Contratada reservada '{}' criada.", INTERNAL_CONTRACTOR_NAME);
        }

        if let Some((username, password)) = default_admin {
            if self.repo.get_admins().await.is_empty() {
                self.repo
                    .add_admin(Admin {
                        id: Uuid::new_v4(),
                        name: "管理者".to_string(),
                        username: username.clone(),
                        password,
                        is_active: true,
                        created_at: Utc::now(),
                    })
                    .await?;
                tracing::info!("✅ Admin inicial '{}' criado.", username);
            }
        }
        Ok(())
    }

    async fn ensure_username_free(
        &self,
        username: &str,
        except: Option<Uuid>,
    ) -> Result<(), AppError> {
        if self.repo.username_taken(username, except).await {
            return Err(AppError::UniqueConstraintViolation(format!(
                "A ユーザー名 '{}' já existe.",
                username
            )));
        }
        Ok(())
    }

    /// Patch de conta: se trouxer username, precisa ser válido e livre.
    async fn check_username_patch(&self, id: Uuid, partial: &Value) -> Result<(), AppError> {
        if let Some(username) = partial.get("username") {
            let username = username
                .as_str()
                .filter(|u| is_valid_username(u))
                .ok_or_else(|| AppError::InvalidInput("username".into()))?;
            self.ensure_username_free(username, Some(id)).await?;
        }
        Ok(())
    }

    // =========================================================================
    //  CONTRATADAS
    // =========================================================================

    pub async fn list_contractors(&self) -> Vec<ContractorWithTeams> {
        let teams = self.repo.get_teams().await;
        self.repo
            .get_contractors()
            .await
            .into_iter()
            .map(|contractor| ContractorWithTeams {
                teams: teams
                    .iter()
                    .filter(|t| t.contractor_id == contractor.id)
                    .cloned()
                    .collect(),
                contractor,
            })
            .collect()
    }

    pub async fn create_contractor(
        &self,
        payload: NewAccountPayload,
    ) -> Result<Contractor, AppError> {
        payload.validate()?;
        if payload.name == INTERNAL_CONTRACTOR_NAME {
            return Err(reserved_name());
        }
        self.ensure_username_free(&payload.username, None).await?;

        self.repo
            .add_contractor(Contractor {
                id: Uuid::new_v4(),
                name: payload.name,
                username: payload.username,
                password: payload.password,
                is_active: payload.is_active,
                created_at: Utc::now(),
            })
            .await
    }

    /// O nome 直営班 é reservado: a contratada interna não é renomeada
    /// e nenhuma outra passa a se chamar assim.
    pub async fn update_contractor(
        &self,
        id: Uuid,
        partial: Value,
    ) -> Result<Contractor, AppError> {
        let existing = self
            .repo
            .get_contractor(id)
            .await
            .ok_or_else(|| AppError::ResourceNotFound(format!("contractor {id}")))?;

        if let Some(name) = partial.get("name") {
            let renamed = name.as_str() != Some(existing.name.as_str());
            let takes_reserved = name.as_str() == Some(INTERNAL_CONTRACTOR_NAME);
            if renamed && (existing.is_internal() || takes_reserved) {
                return Err(reserved_name());
            }
        }

        self.check_username_patch(id, &partial).await?;
        self.repo
            .update_contractor(id, partial)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound(format!("contractor {id}")))
    }

    /// Cascata: equipes e seus 除外日 saem junto. Solicitações que apontam
    /// para a contratada ficam como estão (sem integridade referencial).
    pub async fn delete_contractor(&self, id: Uuid) -> Result<(), AppError> {
        let contractor = self
            .repo
            .get_contractor(id)
            .await
            .ok_or_else(|| AppError::ResourceNotFound(format!("contractor {id}")))?;
        if contractor.is_internal() {
            return Err(AppError::InvalidInput(format!(
                "'{}' is reserved and cannot be deleted",
                INTERNAL_CONTRACTOR_NAME
            )));
        }

        let teams = self.repo.get_teams_by_contractor(id).await;
        for team in &teams {
            self.exclusions.delete_by_team(team.id).await?;
        }
        let removed = self.repo.delete_contractor(id).await?.unwrap_or(0);
        tracing::info!("🗑️ Contratada '{}' apagada com {} equipe(s).", contractor.name, removed);
        Ok(())
    }

    // =========================================================================
    //  EQUIPES
    // =========================================================================

    pub async fn list_teams(&self, contractor_id: Uuid) -> Result<Vec<Team>, AppError> {
        self.repo
            .get_contractor(contractor_id)
            .await
            .ok_or_else(|| AppError::ResourceNotFound(format!("contractor {contractor_id}")))?;
        Ok(self.repo.get_teams_by_contractor(contractor_id).await)
    }

    pub async fn create_team(
        &self,
        contractor_id: Uuid,
        payload: NewTeamPayload,
    ) -> Result<Team, AppError> {
        payload.validate()?;
        self.repo
            .get_contractor(contractor_id)
            .await
            .ok_or_else(|| AppError::ResourceNotFound(format!("contractor {contractor_id}")))?;

        self.repo
            .add_team(Team {
                id: Uuid::new_v4(),
                contractor_id,
                team_name: payload.team_name,
                is_active: payload.is_active,
            })
            .await
    }

    /// A equipe não muda de dono por patch.
    pub async fn update_team(&self, id: Uuid, mut partial: Value) -> Result<Team, AppError> {
        if let Some(fields) = partial.as_object_mut() {
            fields.remove("contractorId");
        }
        self.repo
            .update_team(id, partial)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound(format!("team {id}")))
    }

    pub async fn delete_team(&self, id: Uuid) -> Result<(), AppError> {
        if !self.repo.delete_team(id).await? {
            return Err(AppError::ResourceNotFound(format!("team {id}")));
        }
        self.exclusions.delete_by_team(id).await?;
        Ok(())
    }

    // =========================================================================
    //  ADMINS
    // =========================================================================

    pub async fn list_admins(&self) -> Vec<Admin> {
        self.repo.get_admins().await
    }

    pub async fn create_admin(&self, payload: NewAccountPayload) -> Result<Admin, AppError> {
        payload.validate()?;
        self.ensure_username_free(&payload.username, None).await?;

        self.repo
            .add_admin(Admin {
                id: Uuid::new_v4(),
                name: payload.name,
                username: payload.username,
                password: payload.password,
                is_active: payload.is_active,
                created_at: Utc::now(),
            })
            .await
    }

    pub async fn update_admin(&self, id: Uuid, partial: Value) -> Result<Admin, AppError> {
        self.check_username_patch(id, &partial).await?;
        self.repo
            .update_admin(id, partial)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound(format!("admin {id}")))
    }

    /// Um admin não apaga a própria conta.
    pub async fn delete_admin(&self, session: &Session, id: Uuid) -> Result<(), AppError> {
        if session.account_id == id {
            return Err(AppError::InvalidInput("cannot delete own account".into()));
        }
        if !self.repo.delete_admin(id).await? {
            return Err(AppError::ResourceNotFound(format!("admin {id}")));
        }
        Ok(())
    }
}

fn reserved_name() -> AppError {
    AppError::InvalidInput(format!("'{}' is a reserved contractor name", INTERNAL_CONTRACTOR_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use chrono::NaiveDate;
    use serde_json::json;

    use crate::{
        db::MemoryCollectionStore,
        models::{
            auth::Role,
            exclusion::{ExclusionEntry, TimeType},
        },
    };

    fn setup() -> (AccountService, AccountRepository, ExclusionRepository) {
        let store = Arc::new(MemoryCollectionStore::default());
        let repo = AccountRepository::new(store.clone());
        let exclusions = ExclusionRepository::new(store);
        (AccountService::new(repo.clone(), exclusions.clone()), repo, exclusions)
    }

    fn account(name: &str, username: &str) -> NewAccountPayload {
        serde_json::from_value(json!({
            "name": name,
            "username": username,
            "password": "secret1",
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn ensure_defaults_is_idempotent() {
        let (service, repo, _) = setup();
        let admin = Some(("admin".to_string(), "admin123".to_string()));
        service.ensure_defaults(admin.clone()).await.unwrap();
        service.ensure_defaults(admin).await.unwrap();

        assert_eq!(repo.get_admins().await.len(), 1);
        let internal = repo.get_internal_contractor().await.unwrap();
        assert!(!internal.is_active);
        assert_eq!(repo.get_contractors().await.len(), 1);
    }

    #[tokio::test]
    async fn usernames_are_unique_across_admins_and_contractors() {
        let (service, _, _) = setup();
        service.create_admin(account("管理者", "taro")).await.unwrap();

        let err = service.create_contractor(account("山田電設", "taro")).await.unwrap_err();
        assert!(matches!(err, AppError::UniqueConstraintViolation(_)));

        let other = service.create_contractor(account("山田電設", "yamada")).await.unwrap();
        let err = service
            .update_contractor(other.id, json!({ "username": "taro" }))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::UniqueConstraintViolation(_)));

        // Manter o próprio username não conflita
        let same = service
            .update_contractor(other.id, json!({ "username": "yamada", "name": "山田電設(株)" }))
            .await
            .unwrap();
        assert_eq!(same.name, "山田電設(株)");
    }

    #[tokio::test]
    async fn deleting_contractor_cascades_to_teams_and_exclusions() {
        let (service, repo, exclusions) = setup();
        let contractor = service.create_contractor(account("山田電設", "yamada")).await.unwrap();
        let team = service
            .create_team(
                contractor.id,
                serde_json::from_value(json!({ "teamName": "A班" })).unwrap(),
            )
            .await
            .unwrap();
        exclusions
            .add(ExclusionEntry {
                id: Uuid::new_v4(),
                date: NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
                team_id: team.id,
                team_name: team.team_name.clone(),
                contractor_id: contractor.id,
                time_type: TimeType::AllDay,
                start_time: None,
                end_time: None,
                reason: String::new(),
                created_at: Utc::now(),
            })
            .await
            .unwrap();

        service.delete_contractor(contractor.id).await.unwrap();
        assert!(repo.get_teams().await.is_empty());
        assert!(exclusions.get_all().await.is_empty());
        assert!(service.list_contractors().await.is_empty());
    }

    #[tokio::test]
    async fn internal_contractor_and_own_admin_account_are_protected() {
        let (service, repo, _) = setup();
        service.ensure_defaults(None).await.unwrap();
        let internal = repo.get_internal_contractor().await.unwrap();
        assert!(matches!(
            service.delete_contractor(internal.id).await,
            Err(AppError::InvalidInput(_))
        ));

        let admin = service.create_admin(account("管理者", "kanri")).await.unwrap();
        let session = Session {
            account_id: admin.id,
            role: Role::Admin,
            name: admin.name.clone(),
        };
        assert!(service.delete_admin(&session, admin.id).await.is_err());
    }

    #[tokio::test]
    async fn reserved_contractor_name_cannot_move() {
        let (service, repo, _) = setup();
        service.ensure_defaults(None).await.unwrap();
        let internal = repo.get_internal_contractor().await.unwrap();

        let err = service
            .update_contractor(internal.id, json!({ "name": "外注A" }))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
        assert_eq!(repo.get_internal_contractor().await.map(|c| c.id), Some(internal.id));
        assert!(service.delete_contractor(internal.id).await.is_err());

        // Outros campos do 直営班 continuam editáveis
        let same = service
            .update_contractor(
                internal.id,
                json!({ "name": INTERNAL_CONTRACTOR_NAME, "password": "newpass" }),
            )
            .await
            .unwrap();
        assert_eq!(same.password, "newpass");

        let other = service.create_contractor(account("山田電設", "yamada")).await.unwrap();
        let err = service
            .update_contractor(other.id, json!({ "name": INTERNAL_CONTRACTOR_NAME }))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));

        let err = service
            .create_contractor(account(INTERNAL_CONTRACTOR_NAME, "chokuei2"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
        assert_eq!(
            repo.get_contractors().await.iter().filter(|c| c.is_internal()).count(),
            1
        );
    }

    #[tokio::test]
    async fn team_patch_cannot_move_team_to_another_contractor() {
        let (service, _, _) = setup();
        let a = service.create_contractor(account("山田電設", "yamada")).await.unwrap();
        let b = service.create_contractor(account("鈴木通信", "suzuki")).await.unwrap();
        let team = service
            .create_team(a.id, serde_json::from_value(json!({ "teamName": "A班" })).unwrap())
            .await
            .unwrap();

        let updated = service
            .update_team(team.id, json!({ "contractorId": b.id, "teamName": "A1班" }))
            .await
            .unwrap();
        assert_eq!(updated.contractor_id, a.id);
        assert_eq!(updated.team_name, "A1班");
        assert_eq!(service.list_teams(a.id).await.unwrap().len(), 1);
    }
}
