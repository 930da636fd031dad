//! HTTP request handlers.

use crate::error::RpcError;
use crate::pagination::{PaginationMeta, PaginationParams};
use crate::state::AppState;
use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use eduverify_governance::{ProposalAction, ProposalView, Roles};
use eduverify_ledger::{CredentialDraft, CredentialRecord, Verification};
use eduverify_types::{ContentId, Identity, Timestamp};
use serde::{Deserialize, Serialize};

fn parse_identity(field: &str, value: &str) -> Result<Identity, RpcError> {
    value
        .parse()
        .map_err(|e| RpcError::InvalidRequest(format!("{field}: {e}")))
}

fn parse_cid(value: &str) -> Result<ContentId, RpcError> {
    value
        .parse()
        .map_err(|e| RpcError::InvalidRequest(format!("cid: {e}")))
}

// ── Proposals ────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct ProposeRequest {
    pub actor: String,
    pub action: ProposalAction,
    pub target: String,
}

#[derive(Serialize, Deserialize)]
pub struct ProposeResponse {
    pub id: u64,
}

/// Body of vote and execute calls.
#[derive(Deserialize)]
pub struct ActorRequest {
    pub actor: String,
}

#[derive(Serialize, Deserialize)]
pub struct ProposalListResponse {
    pub proposals: Vec<ProposalView>,
    #[serde(flatten)]
    pub pagination: PaginationMeta,
}

#[derive(Serialize, Deserialize)]
pub struct HasVotedResponse {
    pub proposal_id: u64,
    pub voter: Identity,
    pub voted: bool,
}

pub async fn propose(
    State(state): State<AppState>,
    Json(req): Json<ProposeRequest>,
) -> Result<impl IntoResponse, RpcError> {
    let actor = parse_identity("actor", &req.actor)?;
    let target = parse_identity("target", &req.target)?;
    let id = state.engine.propose(&actor, req.action, target)?;
    Ok((StatusCode::CREATED, Json(ProposeResponse { id })))
}

pub async fn list_proposals(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> Json<ProposalListResponse> {
    let all = state.engine.list_proposals();
    let (proposals, pagination) = params.page(&all);
    Json(ProposalListResponse {
        proposals,
        pagination,
    })
}

pub async fn get_proposal(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<ProposalView>, RpcError> {
    Ok(Json(state.engine.get_proposal(id)?))
}

pub async fn vote(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(req): Json<ActorRequest>,
) -> Result<Json<ProposalView>, RpcError> {
    let actor = parse_identity("actor", &req.actor)?;
    state.engine.vote(&actor, id)?;
    Ok(Json(state.engine.get_proposal(id)?))
}

pub async fn execute(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(req): Json<ActorRequest>,
) -> Result<Json<ProposalView>, RpcError> {
    let actor = parse_identity("actor", &req.actor)?;
    state.engine.execute(&actor, id)?;
    Ok(Json(state.engine.get_proposal(id)?))
}

pub async fn has_voted(
    State(state): State<AppState>,
    Path((id, identity)): Path<(u64, String)>,
) -> Result<Json<HasVotedResponse>, RpcError> {
    let voter = parse_identity("identity", &identity)?;
    let voted = state.engine.has_voted(id, &voter)?;
    Ok(Json(HasVotedResponse {
        proposal_id: id,
        voter,
        voted,
    }))
}

// ── Membership ───────────────────────────────────────────────────────────

#[derive(Serialize, Deserialize)]
pub struct MembersResponse {
    pub members: Vec<Identity>,
    pub count: u32,
}

#[derive(Serialize, Deserialize)]
pub struct RoleResponse {
    pub identity: Identity,
    #[serde(flatten)]
    pub roles: Roles,
}

pub async fn list_governors(State(state): State<AppState>) -> Json<MembersResponse> {
    let members = state.engine.list_governors();
    let count = state.engine.governor_count();
    Json(MembersResponse { members, count })
}

pub async fn list_institutions(State(state): State<AppState>) -> Json<MembersResponse> {
    let members = state.engine.list_institutions();
    let count = state.engine.institution_count();
    Json(MembersResponse { members, count })
}

pub async fn role_of(
    State(state): State<AppState>,
    Path(identity): Path<String>,
) -> Result<Json<RoleResponse>, RpcError> {
    let identity = parse_identity("identity", &identity)?;
    let roles = state.engine.role_of(&identity);
    Ok(Json(RoleResponse { identity, roles }))
}

// ── Documents ────────────────────────────────────────────────────────────

/// Where a stored document can be fetched from.
#[derive(Serialize, Deserialize)]
pub struct DocumentLocation {
    pub cid: ContentId,
    pub url: String,
}

pub async fn upload_document(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<impl IntoResponse, RpcError> {
    let cid = state.documents.upload(&body)?;
    let url = state.documents.resolve(&cid)?;
    Ok((StatusCode::CREATED, Json(DocumentLocation { cid, url })))
}

pub async fn resolve_document(
    State(state): State<AppState>,
    Path(cid): Path<String>,
) -> Result<Json<DocumentLocation>, RpcError> {
    let cid = parse_cid(&cid)?;
    let url = state.documents.resolve(&cid)?;
    Ok(Json(DocumentLocation { cid, url }))
}

/// Raw document bytes.
pub async fn fetch_document(
    State(state): State<AppState>,
    Path(cid): Path<String>,
) -> Result<impl IntoResponse, RpcError> {
    let cid = parse_cid(&cid)?;
    let bytes = state.documents.fetch(&cid)?;
    Ok(([(header::CONTENT_TYPE, "application/octet-stream")], bytes))
}

// ── Credentials ──────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct IssueCredentialRequest {
    pub issuer: String,
    pub credential_id: String,
    pub student: String,
    pub student_name: String,
    pub institution_name: String,
    pub degree: String,
    pub cid: String,
}

#[derive(Serialize, Deserialize)]
pub struct CredentialListResponse {
    pub credentials: Vec<CredentialRecord>,
}

#[derive(Deserialize)]
pub struct VerifyRequest {
    pub cid: String,
    pub student: String,
}

pub async fn issue_credential(
    State(state): State<AppState>,
    Json(req): Json<IssueCredentialRequest>,
) -> Result<impl IntoResponse, RpcError> {
    let issuer = parse_identity("issuer", &req.issuer)?;
    let draft = CredentialDraft {
        credential_id: req.credential_id,
        student: parse_identity("student", &req.student)?,
        student_name: req.student_name,
        institution_name: req.institution_name,
        degree: req.degree,
        cid: parse_cid(&req.cid)?,
    };
    let record = state.ledger.issue(&issuer, draft, Timestamp::now())?;
    Ok((StatusCode::CREATED, Json(record)))
}

pub async fn get_credential(
    State(state): State<AppState>,
    Path(cid): Path<String>,
) -> Result<Json<CredentialRecord>, RpcError> {
    let cid = parse_cid(&cid)?;
    Ok(Json(state.ledger.get_by_content_id(&cid)?))
}

pub async fn get_credential_by_id(
    State(state): State<AppState>,
    Path(credential_id): Path<String>,
) -> Result<Json<CredentialRecord>, RpcError> {
    Ok(Json(state.ledger.get_by_credential_id(&credential_id)?))
}

pub async fn student_credentials(
    State(state): State<AppState>,
    Path(identity): Path<String>,
) -> Result<Json<CredentialListResponse>, RpcError> {
    let student = parse_identity("identity", &identity)?;
    let credentials = state.ledger.list_by_student(&student);
    Ok(Json(CredentialListResponse { credentials }))
}

pub async fn institution_credentials(
    State(state): State<AppState>,
    Path(identity): Path<String>,
) -> Result<Json<CredentialListResponse>, RpcError> {
    let institution = parse_identity("identity", &identity)?;
    let credentials = state.ledger.list_by_institution(&institution);
    Ok(Json(CredentialListResponse { credentials }))
}

pub async fn verify(
    State(state): State<AppState>,
    Json(req): Json<VerifyRequest>,
) -> Result<Json<Verification>, RpcError> {
    let cid = parse_cid(&req.cid)?;
    let student = parse_identity("student", &req.student)?;
    Ok(Json(state.ledger.verify(&cid, &student)))
}

// ── Node ─────────────────────────────────────────────────────────────────

#[derive(Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub governors: u32,
    pub institutions: u32,
    pub proposals: u64,
    pub credentials: usize,
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        governors: state.engine.governor_count(),
        institutions: state.engine.institution_count(),
        proposals: state.engine.proposal_count(),
        credentials: state.ledger.len(),
    })
}
