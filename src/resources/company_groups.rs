// Company Groups Client

use crate::executor::RequestExecutor;
use crate::resources::{ResourceClient, ResourceOperations};
use crate::types::*;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Access to `/company_groups`
#[derive(Clone)]
pub struct CompanyGroupsClient {
    executor: Arc<RequestExecutor>,
}

/// A company group as the service reports it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyGroup {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub members: Vec<CompanyGroupMember>,
    #[serde(default)]
    pub pending_invitations: Vec<String>,
    #[serde(default)]
    pub entitlements: Vec<CompanyGroupEntitlement>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyGroupMember {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(rename = "admin", default)]
    pub is_admin: bool,
}

/// Entitlement record; only the identity is typed, the rest is kept as-is
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyGroupEntitlement {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product: Option<serde_json::Value>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Deserialize)]
struct CompanyGroupsResponse {
    #[serde(default)]
    company_groups: Vec<CompanyGroup>,
}

#[derive(Debug, Serialize)]
struct MemberRequest<'a> {
    member: MemberBody<'a>,
}

#[derive(Debug, Serialize)]
struct MemberBody<'a> {
    email: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    admin: Option<bool>,
}

impl CompanyGroupsClient {
    pub(crate) fn new(executor: Arc<RequestExecutor>) -> Self {
        Self { executor }
    }

    /// All company groups visible to the caller, in service order
    pub async fn list(&self) -> PivnetResult<Vec<CompanyGroup>> {
        let response: CompanyGroupsResponse = self.fetch(self.resource_path(&[])?).await?;
        Ok(response.company_groups)
    }

    pub async fn get(&self, company_group_id: i64) -> PivnetResult<CompanyGroup> {
        let id = company_group_id.to_string();
        self.fetch(self.resource_path(&[id.as_str()])?).await
    }

    /// Add `email` to the group, returning the group after the change
    pub async fn add_member(
        &self,
        company_group_id: i64,
        email: impl Into<String>,
        is_admin: bool,
    ) -> PivnetResult<CompanyGroup> {
        let email = self.validate_string(email, "member email")?;
        let body = MemberRequest {
            member: MemberBody { email: &email, admin: Some(is_admin) },
        };

        let id = company_group_id.to_string();
        let path = self.resource_path(&[id.as_str(), "add_member"])?;
        self.mutate(Method::PATCH, path, &body).await
    }

    /// Remove `email` from the group, returning the group after the change
    pub async fn remove_member(
        &self,
        company_group_id: i64,
        email: impl Into<String>,
    ) -> PivnetResult<CompanyGroup> {
        let email = self.validate_string(email, "member email")?;
        let body = MemberRequest {
            member: MemberBody { email: &email, admin: None },
        };

        let id = company_group_id.to_string();
        let path = self.resource_path(&[id.as_str(), "remove_member"])?;
        self.mutate(Method::PATCH, path, &body).await
    }
}

impl ResourceClient for CompanyGroupsClient {
    fn resource_name(&self) -> &str {
        "company_groups"
    }

    fn executor(&self) -> &RequestExecutor {
        &self.executor
    }
}

impl ResourceOperations for CompanyGroupsClient {}
