// src/models/application.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::filter_utils::Filterable,
    db::{collection::Record, StorageKey},
};

// --- Enums comuns ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyType {
    #[default]
    Individual,
    Collective,
}

impl PropertyType {
    /// Valor vindo do filtro da tela: aceita o rótulo japonês ou o valor serializado.
    pub fn from_filter_value(value: &str) -> Option<Self> {
        match value.trim() {
            "individual" | "個別" => Some(Self::Individual),
            "collective" | "集合" => Some(Self::Collective),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Individual => "個別",
            Self::Collective => "集合",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssigneeType {
    #[default]
    Internal,
    Contractor,
}

/// Resposta grossa que o 協力会社 dá nos modais de progresso.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Progress {
    #[serde(rename = "未完了")]
    Incomplete,
    #[serde(rename = "完了")]
    Complete,
}

pub trait StatusLabel {
    fn label(&self) -> &'static str;
}

// --- Anexos ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploaderRole {
    Admin,
    Contractor,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachedFile {
    pub id: Uuid,
    pub file_name: String,
    pub content_type: String,
    // base64
    pub data: String,
    pub uploaded_by: String,
    pub uploaded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachments {
    #[serde(default)]
    pub from_admin: Vec<AttachedFile>,
    #[serde(default)]
    pub from_contractor: Vec<AttachedFile>,
}

impl Attachments {
    pub fn push(&mut self, role: UploaderRole, file: AttachedFile) {
        match role {
            UploaderRole::Admin => self.from_admin.push(file),
            UploaderRole::Contractor => self.from_contractor.push(file),
        }
    }

    pub fn find(&self, file_id: Uuid) -> Option<&AttachedFile> {
        self.from_admin
            .iter()
            .chain(self.from_contractor.iter())
            .find(|f| f.id == file_id)
    }
}

// --- Núcleo comum às três solicitações ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestCore {
    pub id: Uuid,
    pub serial_number: u32,
    pub order_number: String,
    pub property_type: PropertyType,

    // Só têm sentido quando property_type == Individual
    #[serde(default)]
    pub customer_code: String,
    #[serde(default)]
    pub customer_name: String,

    // Só têm sentido quando property_type == Collective
    #[serde(default)]
    pub collective_code: String,
    #[serde(default)]
    pub collective_housing_name: String,

    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub phone_number: String,

    pub assignee_type: AssigneeType,
    pub contractor_id: Option<Uuid>,
    #[serde(default)]
    pub contractor_name: String,
    pub team_id: Option<Uuid>,
    #[serde(default)]
    pub team_name: String,

    pub requested_at: NaiveDate,
    #[serde(default)]
    pub attachments: Attachments,
    pub admin_notes: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RequestCore {
    /// Zera o par de identificação que não corresponde ao tipo de imóvel.
    pub fn blank_unused_identity(&mut self) {
        match self.property_type {
            PropertyType::Individual => {
                self.collective_code.clear();
                self.collective_housing_name.clear();
            }
            PropertyType::Collective => {
                self.customer_code.clear();
                self.customer_name.clear();
            }
        }
    }
}

/// Dados de formulário do modal "novo pedido", comuns às três variantes.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewRequestCore {
    #[validate(custom(function = "crate::common::validators::validate_order_number"))]
    pub order_number: String,
    #[serde(default)]
    pub property_type: PropertyType,
    #[serde(default)]
    pub customer_code: String,
    #[serde(default)]
    pub customer_name: String,
    #[serde(default)]
    pub collective_code: String,
    #[serde(default)]
    pub collective_housing_name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    #[validate(custom(function = "crate::common::validators::validate_phone"))]
    pub phone_number: String,
    #[serde(default)]
    pub assignee_type: AssigneeType,
    pub contractor_id: Option<Uuid>,
    pub team_id: Option<Uuid>,
    pub requested_at: Option<NaiveDate>,
    #[validate(length(max = 2000))]
    pub admin_notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewApplication<D> {
    #[serde(flatten)]
    pub core: NewRequestCore,
    #[serde(flatten)]
    pub details: D,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressReport {
    pub progress: Progress,
    pub date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub partial_reason: Option<String>,
}

/// Uma variante de solicitação guardada na sua própria coleção.
pub trait Application: Record {
    type Status: StatusLabel + Copy + Serialize + DeserializeOwned + Send + Sync;
    type Details: DeserializeOwned + Send + 'static;

    const KEY: StorageKey;

    fn core(&self) -> &RequestCore;
    fn core_mut(&mut self) -> &mut RequestCore;
    fn status(&self) -> Self::Status;
    fn from_parts(core: RequestCore, details: Self::Details) -> Self;

    /// Campos a gravar (merge raso) para o relato 未完了/完了 do 協力会社.
    /// Objetos aninhados vão inteiros.
    fn progress_patch(&self, report: &ProgressReport, today: NaiveDate) -> Value;
}

impl<T: Application> Filterable for T {
    fn order_number(&self) -> &str {
        &self.core().order_number
    }
    fn property_type(&self) -> PropertyType {
        self.core().property_type
    }
    fn customer_code(&self) -> &str {
        &self.core().customer_code
    }
    fn customer_name(&self) -> &str {
        &self.core().customer_name
    }
    fn collective_code(&self) -> &str {
        &self.core().collective_code
    }
    fn collective_housing_name(&self) -> &str {
        &self.core().collective_housing_name
    }
    fn phone_number(&self) -> &str {
        &self.core().phone_number
    }
    fn contractor_id(&self) -> Option<Uuid> {
        self.core().contractor_id
    }
    fn team_id(&self) -> Option<Uuid> {
        self.core().team_id
    }
    fn status_label(&self) -> &str {
        self.status().label()
    }
}

// =============================================================================
//  調査依頼 (Survey)
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SurveyStatus {
    #[default]
    #[serde(rename = "受付")]
    Received,
    #[serde(rename = "調査中")]
    InProgress,
    #[serde(rename = "完了")]
    Completed,
    #[serde(rename = "キャンセル")]
    Cancelled,
}

impl StatusLabel for SurveyStatus {
    fn label(&self) -> &'static str {
        match self {
            Self::Received => "受付",
            Self::InProgress => "調査中",
            Self::Completed => "完了",
            Self::Cancelled => "キャンセル",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveyRequest {
    #[serde(flatten)]
    pub core: RequestCore,
    pub status: SurveyStatus,
    pub scheduled_date: Option<NaiveDate>,
    pub surveyed_date: Option<NaiveDate>,
    pub feedback: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SurveyDetails {
    pub scheduled_date: Option<NaiveDate>,
}

impl Record for SurveyRequest {
    fn id(&self) -> Uuid {
        self.core.id
    }
}

impl Application for SurveyRequest {
    type Status = SurveyStatus;
    type Details = SurveyDetails;
    const KEY: StorageKey = StorageKey::SurveyApplications;

    fn core(&self) -> &RequestCore {
        &self.core
    }
    fn core_mut(&mut self) -> &mut RequestCore {
        &mut self.core
    }
    fn status(&self) -> SurveyStatus {
        self.status
    }

    fn from_parts(core: RequestCore, details: SurveyDetails) -> Self {
        Self {
            core,
            status: SurveyStatus::Received,
            scheduled_date: details.scheduled_date,
            surveyed_date: None,
            feedback: None,
        }
    }

    fn progress_patch(&self, report: &ProgressReport, today: NaiveDate) -> Value {
        match report.progress {
            Progress::Complete => json!({
                "status": SurveyStatus::Completed,
                "surveyedDate": report.date.unwrap_or(today),
                "feedback": report.notes,
            }),
            Progress::Incomplete => json!({
                "status": SurveyStatus::InProgress,
                "feedback": report.notes,
            }),
        }
    }
}

// =============================================================================
//  共架申請 (Attachment)
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AttachmentStatus {
    #[default]
    #[serde(rename = "受付")]
    Received,
    #[serde(rename = "調査済")]
    Surveyed,
    #[serde(rename = "提出済")]
    Submitted,
    #[serde(rename = "許可")]
    Permitted,
    #[serde(rename = "取下げ")]
    Withdrawn,
}

impl StatusLabel for AttachmentStatus {
    fn label(&self) -> &'static str {
        match self {
            Self::Received => "受付",
            Self::Surveyed => "調査済",
            Self::Submitted => "提出済",
            Self::Permitted => "許可",
            Self::Withdrawn => "取下げ",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentRequest {
    #[serde(flatten)]
    pub core: RequestCore,
    pub status: AttachmentStatus,
    #[serde(default)]
    pub survey_required: bool,
    pub survey_status: Option<Progress>,
    pub submitted_date: Option<NaiveDate>,
    pub permitted_date: Option<NaiveDate>,
    pub withdrawn_date: Option<NaiveDate>,
    #[serde(default)]
    pub pole_numbers: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AttachmentDetails {
    pub survey_required: bool,
    pub pole_numbers: Vec<String>,
}

impl Record for AttachmentRequest {
    fn id(&self) -> Uuid {
        self.core.id
    }
}

impl Application for AttachmentRequest {
    type Status = AttachmentStatus;
    type Details = AttachmentDetails;
    const KEY: StorageKey = StorageKey::AttachmentApplications;

    fn core(&self) -> &RequestCore {
        &self.core
    }
    fn core_mut(&mut self) -> &mut RequestCore {
        &mut self.core
    }
    fn status(&self) -> AttachmentStatus {
        self.status
    }

    fn from_parts(core: RequestCore, details: AttachmentDetails) -> Self {
        Self {
            core,
            status: AttachmentStatus::Received,
            survey_required: details.survey_required,
            survey_status: None,
            submitted_date: None,
            permitted_date: None,
            withdrawn_date: None,
            pole_numbers: details.pole_numbers,
        }
    }

    // O 協力会社 só relata a vistoria; o andamento do pedido de 共架 é do admin.
    // A única exceção: vistoria obrigatória concluída move 受付 -> 調査済.
    fn progress_patch(&self, report: &ProgressReport, _today: NaiveDate) -> Value {
        let mut patch = json!({ "surveyStatus": report.progress });
        if self.survey_required
            && self.status == AttachmentStatus::Received
            && report.progress == Progress::Complete
        {
            patch["status"] = json!(AttachmentStatus::Surveyed);
        }
        patch
    }
}

// =============================================================================
//  工事依頼 (Construction)
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConstructionStatus {
    #[default]
    #[serde(rename = "未着手")]
    NotStarted,
    #[serde(rename = "施工中")]
    InProgress,
    #[serde(rename = "完了")]
    Completed,
    #[serde(rename = "一部完了")]
    PartiallyCompleted,
    #[serde(rename = "中止")]
    Cancelled,
    #[serde(rename = "延期")]
    Postponed,
}

impl StatusLabel for ConstructionStatus {
    fn label(&self) -> &'static str {
        match self {
            Self::NotStarted => "未着手",
            Self::InProgress => "施工中",
            Self::Completed => "完了",
            Self::PartiallyCompleted => "一部完了",
            Self::Cancelled => "中止",
            Self::Postponed => "延期",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConstructionResult {
    pub completed: bool,
    pub partial_reason: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConstructionRequest {
    #[serde(flatten)]
    pub core: RequestCore,
    pub status: ConstructionStatus,
    pub construction_date: Option<NaiveDate>,
    pub completed_date: Option<NaiveDate>,
    pub construction_result: Option<ConstructionResult>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConstructionDetails {
    pub construction_date: Option<NaiveDate>,
}

impl Record for ConstructionRequest {
    fn id(&self) -> Uuid {
        self.core.id
    }
}

impl Application for ConstructionRequest {
    type Status = ConstructionStatus;
    type Details = ConstructionDetails;
    const KEY: StorageKey = StorageKey::ConstructionApplications;

    fn core(&self) -> &RequestCore {
        &self.core
    }
    fn core_mut(&mut self) -> &mut RequestCore {
        &mut self.core
    }
    fn status(&self) -> ConstructionStatus {
        self.status
    }

    fn from_parts(core: RequestCore, details: ConstructionDetails) -> Self {
        Self {
            core,
            status: ConstructionStatus::NotStarted,
            construction_date: details.construction_date,
            completed_date: None,
            construction_result: None,
        }
    }

    fn progress_patch(&self, report: &ProgressReport, today: NaiveDate) -> Value {
        let completed = report.progress == Progress::Complete;
        let partial_reason = report
            .partial_reason
            .clone()
            .filter(|reason| !completed && !reason.trim().is_empty());

        let status = match (completed, &partial_reason) {
            (true, _) => ConstructionStatus::Completed,
            (false, Some(_)) => ConstructionStatus::PartiallyCompleted,
            (false, None) => ConstructionStatus::InProgress,
        };

        // constructionResult vai completo: o merge é raso.
        let result = ConstructionResult {
            completed,
            partial_reason,
            notes: report.notes.clone(),
        };

        let mut patch = json!({
            "status": status,
            "constructionResult": result,
        });
        if completed {
            patch["completedDate"] = json!(report.date.unwrap_or(today));
        }
        patch
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn core(order_number: &str, property_type: PropertyType) -> RequestCore {
        let now = Utc::now();
        RequestCore {
            id: Uuid::new_v4(),
            serial_number: 1,
            order_number: order_number.to_string(),
            property_type,
            customer_code: String::new(),
            customer_name: String::new(),
            collective_code: String::new(),
            collective_housing_name: String::new(),
            address: "岡山県岡山市北区1-1".into(),
            phone_number: String::new(),
            assignee_type: AssigneeType::Internal,
            contractor_id: None,
            contractor_name: String::new(),
            team_id: None,
            team_name: String::new(),
            requested_at: NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
            attachments: Attachments::default(),
            admin_notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn report(progress: Progress) -> ProgressReport {
        ProgressReport {
            progress,
            date: None,
            notes: Some("メモ".into()),
            partial_reason: None,
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 4, 1).unwrap()
    }

    #[test]
    fn request_serializes_flat_with_japanese_status() {
        let request = SurveyRequest::from_parts(
            core("2024031500001", PropertyType::Individual),
            SurveyDetails::default(),
        );
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["status"], "受付");
        assert_eq!(value["orderNumber"], "2024031500001");
        assert_eq!(value["propertyType"], "individual");
        assert!(value.get("core").is_none());

        let back: SurveyRequest = serde_json::from_value(value).unwrap();
        assert_eq!(back, request);
    }

    #[test]
    fn survey_progress_maps_coarse_answer() {
        let request = SurveyRequest::from_parts(
            core("2024031500001", PropertyType::Individual),
            SurveyDetails::default(),
        );
        let done = request.progress_patch(&report(Progress::Complete), today());
        assert_eq!(done["status"], "完了");
        assert_eq!(done["surveyedDate"], "2024-04-01");
        let pending = request.progress_patch(&report(Progress::Incomplete), today());
        assert_eq!(pending["status"], "調査中");
    }

    #[test]
    fn attachment_progress_depends_on_survey_flag() {
        let mut request = AttachmentRequest::from_parts(
            core("2024031500001", PropertyType::Individual),
            AttachmentDetails {
                survey_required: true,
                pole_numbers: vec![],
            },
        );
        let patch = request.progress_patch(&report(Progress::Complete), today());
        assert_eq!(patch["status"], "調査済");
        assert_eq!(patch["surveyStatus"], "完了");

        let patch = request.progress_patch(&report(Progress::Incomplete), today());
        assert!(patch.get("status").is_none());

        request.survey_required = false;
        let patch = request.progress_patch(&report(Progress::Complete), today());
        assert!(patch.get("status").is_none());

        request.survey_required = true;
        request.status = AttachmentStatus::Submitted;
        let patch = request.progress_patch(&report(Progress::Complete), today());
        assert!(patch.get("status").is_none());
    }

    #[test]
    fn construction_progress_sends_whole_result() {
        let request = ConstructionRequest::from_parts(
            core("2024031500001", PropertyType::Collective),
            ConstructionDetails::default(),
        );
        let mut partial = report(Progress::Incomplete);
        partial.partial_reason = Some("雨天のため".into());
        let patch = request.progress_patch(&partial, today());
        assert_eq!(patch["status"], "一部完了");
        assert_eq!(patch["constructionResult"]["completed"], false);
        assert_eq!(patch["constructionResult"]["partialReason"], "雨天のため");
        assert_eq!(patch["constructionResult"]["notes"], "メモ");

        let patch = request.progress_patch(&report(Progress::Incomplete), today());
        assert_eq!(patch["status"], "施工中");

        let patch = request.progress_patch(&report(Progress::Complete), today());
        assert_eq!(patch["status"], "完了");
        assert_eq!(patch["completedDate"], "2024-04-01");
        assert!(patch["constructionResult"]["partialReason"].is_null());
    }

    #[test]
    fn blanking_follows_property_type() {
        let mut c = core("2024031500001", PropertyType::Collective);
        c.customer_code = "C001".into();
        c.collective_code = "K1".into();
        c.blank_unused_identity();
        assert!(c.customer_code.is_empty());
        assert_eq!(c.collective_code, "K1");
    }
}
