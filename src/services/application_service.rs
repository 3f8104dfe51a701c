// src/services/application_service.rs

use base64::{engine::general_purpose::STANDARD as B64, Engine};
use chrono::Utc;
use serde_json::{json, Value};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{
        date_utils::today,
        error::AppError,
        formatters::{format_phone, truncate},
        validators::require_fields,
    },
    db::{collection::shallow_merge, AccountRepository, ApplicationRepository},
    models::{
        application::{
            Application, AssigneeType, AttachedFile, NewApplication, NewRequestCore,
            ProgressReport, PropertyType, RequestCore, StatusLabel, UploaderRole,
        },
        auth::{Role, Session},
        order::FileUploadPayload,
    },
    services::application_filters::ApplicationFilters,
};

/// Contratada + equipe já resolvidas para gravar na solicitação.
struct Assignee {
    contractor_id: Uuid,
    contractor_name: String,
    team_id: Option<Uuid>,
    team_name: String,
}

#[derive(Clone)]
pub struct ApplicationService {
    repo: ApplicationRepository,
    accounts: AccountRepository,
}

impl ApplicationService {
    pub fn new(repo: ApplicationRepository, accounts: AccountRepository) -> Self {
        Self { repo, accounts }
    }

    // =========================================================================
    //  LEITURA
    // =========================================================================

    /// Lista filtrada. Contratadas só enxergam o que está atribuído a elas.
    pub async fn list<T: Application>(
        &self,
        session: &Session,
        filters: &ApplicationFilters,
    ) -> Vec<T> {
        let items = match session.contractor_scope() {
            Some(contractor_id) => self.repo.get_by_contractor::<T>(contractor_id).await,
            None => self.repo.get_all::<T>().await,
        };
        filters.apply(items)
    }

    pub async fn get<T: Application>(&self, session: &Session, id: Uuid) -> Result<T, AppError> {
        let item = self
            .repo
            .get_by_id::<T>(id)
            .await
            .ok_or_else(|| AppError::ResourceNotFound(format!("application {id}")))?;

        if !session.can_access_contractor(item.core().contractor_id) {
            return Err(AppError::Forbidden);
        }
        Ok(item)
    }

    // =========================================================================
    //  CRIAÇÃO (modal "新規依頼")
    // =========================================================================

    pub async fn create<T: Application>(
        &self,
        payload: NewApplication<T::Details>,
    ) -> Result<T, AppError> {
        let NewApplication { core: form, details } = payload;
        check_required(&form)?;
        form.validate()?;

        let assignee = self
            .resolve_assignee(form.assignee_type, form.contractor_id, form.team_id)
            .await?;
        let serial_number = self.repo.next_serial_number::<T>().await?;
        let now = Utc::now();

        let mut core = RequestCore {
            id: Uuid::new_v4(),
            serial_number,
            order_number: form.order_number,
            property_type: form.property_type,
            customer_code: form.customer_code,
            customer_name: form.customer_name,
            collective_code: form.collective_code,
            collective_housing_name: form.collective_housing_name,
            address: form.address,
            phone_number: format_phone(&form.phone_number),
            assignee_type: form.assignee_type,
            contractor_id: Some(assignee.contractor_id),
            contractor_name: assignee.contractor_name,
            team_id: assignee.team_id,
            team_name: assignee.team_name,
            requested_at: form.requested_at.unwrap_or_else(today),
            attachments: Default::default(),
            admin_notes: form.admin_notes,
            created_at: now,
            updated_at: now,
        };
        core.blank_unused_identity();

        let created = self.repo.add(T::from_parts(core, details)).await?;
        let core = created.core();
        tracing::info!(
            "📝 Solicitação criada: {} nº{} (pedido {}, {}, {})",
            T::KEY.as_str(),
            core.serial_number,
            core.order_number,
            core.property_type.label(),
            truncate(&core.address, 20)
        );
        Ok(created)
    }

    /// 直営 resolve sempre para a contratada reservada 直営班; 協力会社 exige contratada.
    async fn resolve_assignee(
        &self,
        assignee_type: AssigneeType,
        contractor_id: Option<Uuid>,
        team_id: Option<Uuid>,
    ) -> Result<Assignee, AppError> {
        let contractor = match assignee_type {
            AssigneeType::Internal => self.accounts.get_internal_contractor().await.ok_or_else(|| {
                AppError::ResourceNotFound("internal contractor (直営班)".into())
            })?,
            AssigneeType::Contractor => {
                let id = contractor_id
                    .ok_or_else(|| AppError::MissingFields(vec!["協力会社".into()]))?;
                self.accounts
                    .get_contractor(id)
                    .await
                    .ok_or_else(|| AppError::ResourceNotFound(format!("contractor {id}")))?
            }
        };

        let team = match team_id {
            Some(id) => {
                let team = self
                    .accounts
                    .get_team(id)
                    .await
                    .ok_or_else(|| AppError::ResourceNotFound(format!("team {id}")))?;
                if team.contractor_id != contractor.id {
                    return Err(AppError::InvalidInput(format!(
                        "team {} does not belong to {}",
                        team.team_name, contractor.name
                    )));
                }
                Some(team)
            }
            None => None,
        };

        Ok(Assignee {
            contractor_id: contractor.id,
            contractor_name: contractor.name,
            team_id: team.as_ref().map(|t| t.id),
            team_name: team.map(|t| t.team_name).unwrap_or_default(),
        })
    }

    // =========================================================================
    //  EDIÇÃO (modal do admin): qualquer status vale, sem guarda de transição
    // =========================================================================

    /// Número de série, criação e anexos não mudam por patch.
    pub async fn edit<T: Application>(&self, id: Uuid, mut partial: Value) -> Result<T, AppError> {
        if let Some(fields) = partial.as_object_mut() {
            for key in ["serialNumber", "createdAt", "attachments"] {
                fields.remove(key);
            }
        }

        let existing = self
            .repo
            .get_by_id::<T>(id)
            .await
            .ok_or_else(|| AppError::ResourceNotFound(format!("application {id}")))?;

        let reassigned = ["assigneeType", "contractorId", "teamId"]
            .iter()
            .any(|key| partial.get(key).is_some());

        let mut merged: T = shallow_merge(&existing, partial)?;

        if reassigned {
            let core = merged.core();
            let assignee = self
                .resolve_assignee(core.assignee_type, core.contractor_id, core.team_id)
                .await?;
            let core = merged.core_mut();
            core.contractor_id = Some(assignee.contractor_id);
            core.contractor_name = assignee.contractor_name;
            core.team_id = assignee.team_id;
            core.team_name = assignee.team_name;
        }

        let core = merged.core_mut();
        core.blank_unused_identity();
        core.updated_at = Utc::now();

        self.repo
            .replace(merged)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound(format!("application {id}")))
    }

    // =========================================================================
    //  PROGRESSO (modal da contratada: 未完了 / 完了)
    // =========================================================================

    pub async fn report_progress<T: Application>(
        &self,
        session: &Session,
        id: Uuid,
        report: ProgressReport,
    ) -> Result<T, AppError> {
        let item = self.get::<T>(session, id).await?;

        let mut patch = item.progress_patch(&report, today());
        patch["updatedAt"] = json!(Utc::now());

        let updated = self
            .repo
            .update::<T>(id, patch)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound(format!("application {id}")))?;

        tracing::info!(
            "📌 Progresso em {} nº{}: {}",
            T::KEY.as_str(),
            updated.core().serial_number,
            updated.status().label()
        );
        Ok(updated)
    }

    // =========================================================================
    //  ANEXOS
    // =========================================================================

    pub async fn add_attachment<T: Application>(
        &self,
        session: &Session,
        id: Uuid,
        upload: FileUploadPayload,
    ) -> Result<T, AppError> {
        upload.validate()?;
        B64.decode(upload.data.as_bytes())
            .map_err(|_| AppError::InvalidInput("file data is not valid base64".into()))?;

        let item = self.get::<T>(session, id).await?;
        let role = match session.role {
            Role::Admin => UploaderRole::Admin,
            Role::Contractor => UploaderRole::Contractor,
        };

        // O objeto attachments vai inteiro: o update é um merge raso.
        let mut attachments = item.core().attachments.clone();
        attachments.push(
            role,
            AttachedFile {
                id: Uuid::new_v4(),
                file_name: upload.file_name,
                content_type: upload.content_type,
                data: upload.data,
                uploaded_by: session.name.clone(),
                uploaded_at: Utc::now(),
            },
        );

        self.repo
            .update::<T>(id, json!({ "attachments": attachments, "updatedAt": Utc::now() }))
            .await?
            .ok_or_else(|| AppError::ResourceNotFound(format!("application {id}")))
    }

    /// Devolve o metadado e os bytes já decodificados.
    pub async fn get_attachment<T: Application>(
        &self,
        session: &Session,
        id: Uuid,
        file_id: Uuid,
    ) -> Result<(AttachedFile, Vec<u8>), AppError> {
        let item = self.get::<T>(session, id).await?;
        let file = item
            .core()
            .attachments
            .find(file_id)
            .cloned()
            .ok_or_else(|| AppError::ResourceNotFound(format!("attachment {file_id}")))?;

        let bytes = B64
            .decode(file.data.as_bytes())
            .map_err(|e| anyhow::anyhow!("Anexo {} corrompido: {}", file_id, e))?;
        Ok((file, bytes))
    }
}

/// Campos obrigatórios do formulário, com os rótulos da tela.
fn check_required(form: &NewRequestCore) -> Result<(), AppError> {
    let mut fields = vec![
        ("受注番号", form.order_number.as_str()),
        ("住所", form.address.as_str()),
    ];
    match form.property_type {
        PropertyType::Individual => {
            fields.push(("顧客コード", form.customer_code.as_str()));
            fields.push(("顧客名", form.customer_name.as_str()));
        }
        PropertyType::Collective => {
            fields.push(("集合コード", form.collective_code.as_str()));
            fields.push(("集合住宅名", form.collective_housing_name.as_str()));
        }
    }
    require_fields(&fields)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::{
        db::MemoryCollectionStore,
        models::{
            account::{Contractor, Team, INTERNAL_CONTRACTOR_NAME},
            application::{AttachmentRequest, SurveyRequest, SurveyStatus},
        },
    };

    struct Fixture {
        service: ApplicationService,
        internal: Contractor,
        partner: Contractor,
        partner_team: Team,
    }

    async fn contractor(accounts: &AccountRepository, name: &str, username: &str) -> Contractor {
        accounts
            .add_contractor(Contractor {
                id: Uuid::new_v4(),
                name: name.into(),
                username: username.into(),
                password: "pw".into(),
                is_active: true,
                created_at: Utc::now(),
            })
            .await
            .unwrap()
    }

    async fn fixture() -> Fixture {
        let store = Arc::new(MemoryCollectionStore::default());
        let accounts = AccountRepository::new(store.clone());
        let service = ApplicationService::new(ApplicationRepository::new(store), accounts.clone());

        let internal = contractor(&accounts, INTERNAL_CONTRACTOR_NAME, "chokuei").await;
        let partner = contractor(&accounts, "山田電設", "yamada").await;
        let partner_team = accounts
            .add_team(Team {
                id: Uuid::new_v4(),
                contractor_id: partner.id,
                team_name: "A班".into(),
                is_active: true,
            })
            .await
            .unwrap();

        Fixture {
            service,
            internal,
            partner,
            partner_team,
        }
    }

    fn admin() -> Session {
        Session {
            account_id: Uuid::new_v4(),
            role: Role::Admin,
            name: "管理者".into(),
        }
    }

    fn form<D: serde::de::DeserializeOwned>(extra: Value) -> NewApplication<D> {
        let mut base = json!({
            "orderNumber": "2024031500001",
            "propertyType": "individual",
            "customerCode": "C001",
            "customerName": "ヤマダ タロウ",
            "collectiveCode": "K9",
            "address": "岡山県岡山市北区1-1",
            "phoneNumber": "09012345678",
        });
        if let (Some(base), Some(extra)) = (base.as_object_mut(), extra.as_object()) {
            base.extend(extra.clone());
        }
        serde_json::from_value(base).unwrap()
    }

    #[tokio::test]
    async fn create_assigns_serials_and_internal_team() {
        let f = fixture().await;
        let first: SurveyRequest = f.service.create(form(json!({}))).await.unwrap();
        let second: SurveyRequest = f.service.create(form(json!({}))).await.unwrap();

        assert_eq!(first.core.serial_number, 1);
        assert_eq!(second.core.serial_number, 2);
        assert_eq!(first.core.contractor_id, Some(f.internal.id));
        assert_eq!(first.core.contractor_name, INTERNAL_CONTRACTOR_NAME);
        assert_eq!(first.core.phone_number, "090-1234-5678");
        // Individual: o código de 集合 digitado antes é descartado
        assert_eq!(first.core.collective_code, "");
        assert_eq!(first.status, SurveyStatus::Received);
    }

    #[tokio::test]
    async fn create_lists_missing_fields_by_screen_label() {
        let f = fixture().await;
        let err = f
            .service
            .create::<SurveyRequest>(form(json!({
                "orderNumber": "",
                "propertyType": "collective",
            })))
            .await
            .unwrap_err();
        match err {
            AppError::MissingFields(fields) => {
                assert_eq!(fields, vec!["受注番号", "集合住宅名"])
            }
            other => panic!("erro inesperado: {other:?}"),
        }
    }

    #[tokio::test]
    async fn team_must_belong_to_contractor() {
        let f = fixture().await;
        let err = f
            .service
            .create::<SurveyRequest>(form(json!({
                "assigneeType": "contractor",
                "contractorId": f.internal.id,
                "teamId": f.partner_team.id,
            })))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn contractors_see_and_report_only_their_own_work() {
        let f = fixture().await;
        let assigned: SurveyRequest = f
            .service
            .create(form(json!({
                "assigneeType": "contractor",
                "contractorId": f.partner.id,
                "teamId": f.partner_team.id,
            })))
            .await
            .unwrap();
        let internal: SurveyRequest = f.service.create(form(json!({}))).await.unwrap();

        let partner = Session {
            account_id: f.partner.id,
            role: Role::Contractor,
            name: "山田電設".into(),
        };
        let visible = f
            .service
            .list::<SurveyRequest>(&partner, &ApplicationFilters::default())
            .await;
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].core.team_name, "A班");

        assert!(matches!(
            f.service.get::<SurveyRequest>(&partner, internal.core.id).await,
            Err(AppError::Forbidden)
        ));

        let report: ProgressReport = serde_json::from_value(json!({
            "progress": "完了",
            "date": "2024-03-20",
            "notes": "引込線確認済",
        }))
        .unwrap();
        let done: SurveyRequest = f
            .service
            .report_progress(&partner, assigned.core.id, report)
            .await
            .unwrap();
        assert_eq!(done.status, SurveyStatus::Completed);
        assert_eq!(done.surveyed_date, chrono::NaiveDate::from_ymd_opt(2024, 3, 20));
        assert_eq!(done.feedback.as_deref(), Some("引込線確認済"));
    }

    #[tokio::test]
    async fn edit_merges_shallowly_and_reresolves_assignee() {
        let f = fixture().await;
        let created: AttachmentRequest = f
            .service
            .create(form(json!({ "poleNumbers": ["No.12"] })))
            .await
            .unwrap();

        let edited: AttachmentRequest = f
            .service
            .edit(
                created.core.id,
                json!({
                    "status": "提出済",
                    "assigneeType": "contractor",
                    "contractorId": f.partner.id,
                }),
            )
            .await
            .unwrap();
        assert_eq!(edited.status.label(), "提出済");
        assert_eq!(edited.core.contractor_name, "山田電設");
        assert_eq!(edited.pole_numbers, vec!["No.12".to_string()]);
        assert_eq!(edited.core.serial_number, created.core.serial_number);
    }

    #[tokio::test]
    async fn edit_keeps_serial_creation_and_attachments() {
        let f = fixture().await;
        let created: SurveyRequest = f.service.create(form(json!({}))).await.unwrap();

        let edited: SurveyRequest = f
            .service
            .edit(
                created.core.id,
                json!({
                    "serialNumber": u32::MAX,
                    "createdAt": "2000-01-01T00:00:00Z",
                    "attachments": { "fromAdmin": [{ "bogus": true }] },
                    "address": "岡山県倉敷市2-2",
                }),
            )
            .await
            .unwrap();
        assert_eq!(edited.core.serial_number, created.core.serial_number);
        assert_eq!(edited.core.created_at, created.core.created_at);
        assert_eq!(edited.core.attachments, created.core.attachments);
        assert_eq!(edited.core.address, "岡山県倉敷市2-2");

        let next: SurveyRequest = f.service.create(form(json!({}))).await.unwrap();
        assert_eq!(next.core.serial_number, 2);
    }

    #[tokio::test]
    async fn exhausted_serial_numbers_fail_without_panicking() {
        let f = fixture().await;
        let created: SurveyRequest = f.service.create(form(json!({}))).await.unwrap();
        f.service
            .repo
            .update::<SurveyRequest>(created.core.id, json!({ "serialNumber": u32::MAX }))
            .await
            .unwrap();

        let err = f.service.create::<SurveyRequest>(form(json!({}))).await.unwrap_err();
        assert!(matches!(err, AppError::InternalServerError(_)));
    }

    #[tokio::test]
    async fn attachment_content_type_must_be_a_header_value() {
        let f = fixture().await;
        let created: SurveyRequest = f.service.create(form(json!({}))).await.unwrap();

        let upload = FileUploadPayload {
            file_name: "写真.jpg".into(),
            content_type: "image/jpeg\r\nSet-Cookie: x=1".into(),
            data: B64.encode(b"jpeg-bytes"),
        };
        let err = f
            .service
            .add_attachment::<SurveyRequest>(&admin(), created.core.id, upload)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[tokio::test]
    async fn attachments_round_trip_through_base64() {
        let f = fixture().await;
        let created: SurveyRequest = f.service.create(form(json!({}))).await.unwrap();

        let bad = FileUploadPayload {
            file_name: "写真.jpg".into(),
            content_type: "image/jpeg".into(),
            data: "not base64!".into(),
        };
        assert!(matches!(
            f.service.add_attachment::<SurveyRequest>(&admin(), created.core.id, bad).await,
            Err(AppError::InvalidInput(_))
        ));

        let upload = FileUploadPayload {
            file_name: "写真.jpg".into(),
            content_type: "image/jpeg".into(),
            data: B64.encode(b"jpeg-bytes"),
        };
        let updated: SurveyRequest = f
            .service
            .add_attachment(&admin(), created.core.id, upload)
            .await
            .unwrap();
        let file_id = updated.core.attachments.from_admin[0].id;

        let (file, bytes) = f
            .service
            .get_attachment::<SurveyRequest>(&admin(), created.core.id, file_id)
            .await
            .unwrap();
        assert_eq!(file.uploaded_by, "管理者");
        assert_eq!(bytes, b"jpeg-bytes");
    }
}
