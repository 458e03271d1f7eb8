//! Owner account service

use super::validated;
use crate::auth::password::hash_password;
use crate::auth::roles::{RoleDirectory, RoleError};
use crate::repository::{OwnerRepository, Repositories};
use canteen_core::{ids, CanteenError, Owner, PublicId, Result, ROLE_ADMIN, ROLE_OWNER};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// The account acting on an owner record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub id: Uuid,
    /// Resolved role name
    pub role: String,
}

impl Actor {
    /// Admins manage every owner account; anyone else only their own
    fn may_manage(&self, target: Uuid) -> Result<()> {
        if self.role == ROLE_ADMIN || self.id == target {
            return Ok(());
        }
        Err(CanteenError::Unauthorized(
            "owners may only manage their own account".to_string(),
        ))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
pub struct CreateOwnerRequest {
    #[validate(length(min = 1, max = 100, message = "fullname must be 1-100 characters"))]
    pub fullname: String,
    #[validate(length(min = 6, max = 20, message = "wa_number must be 6-20 characters"))]
    pub wa_number: String,
    #[validate(length(min = 3, max = 50, message = "username must be 3-50 characters"))]
    pub username: String,
    #[validate(length(min = 8, message = "password must be at least 8 characters"))]
    pub password: String,
}

/// Profile update; an empty `password` keeps the current one
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
pub struct UpdateOwnerRequest {
    #[validate(length(min = 1, max = 100, message = "fullname must be 1-100 characters"))]
    pub fullname: String,
    #[validate(length(min = 6, max = 20, message = "wa_number must be 6-20 characters"))]
    pub wa_number: String,
    #[validate(length(min = 3, max = 50, message = "username must be 3-50 characters"))]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Owner account without its password hash
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OwnerResponse {
    pub owner_id: PublicId,
    pub fullname: String,
    pub wa_number: String,
    pub username: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Owner> for OwnerResponse {
    fn from(owner: Owner) -> Self {
        Self {
            owner_id: owner.id.into(),
            fullname: owner.fullname,
            wa_number: owner.wa_number,
            username: owner.username,
            created_at: owner.created_at,
            updated_at: owner.updated_at,
        }
    }
}

fn hash(password: &str) -> Result<String> {
    hash_password(password).map_err(|e| {
        tracing::error!(error = %e, "[OWNER SERVICE] failed to hash password");
        CanteenError::Internal(anyhow::anyhow!("failed to hash password: {e}"))
    })
}

#[derive(Clone)]
pub struct OwnerService {
    owners: Arc<dyn OwnerRepository>,
    roles: Arc<dyn RoleDirectory>,
}

impl OwnerService {
    pub fn new(repos: &Repositories, roles: Arc<dyn RoleDirectory>) -> Self {
        Self {
            owners: repos.owners.clone(),
            roles,
        }
    }

    pub async fn fetch_all(&self) -> Result<Vec<OwnerResponse>> {
        let owners = self.owners.fetch_all().await?;
        Ok(owners.into_iter().map(OwnerResponse::from).collect())
    }

    pub async fn fetch_by_id(&self, actor: &Actor, id: &str) -> Result<OwnerResponse> {
        let id = ids::decode_uuid(id)?;
        actor.may_manage(id)?;
        Ok(self.owners.fetch_by_id(id).await?.into())
    }

    /// Create an account with the `Owner` role and a hashed password
    pub async fn create(&self, request: CreateOwnerRequest) -> Result<OwnerResponse> {
        validated(&request)?;

        let role = self.roles.find_by_name(ROLE_OWNER).await.map_err(|e| match e {
            RoleError::NotFound(name) => {
                CanteenError::Config(format!("role directory has no {name} role"))
            }
            RoleError::Database(e) => CanteenError::Database(e.to_string()),
        })?;

        let owner = Owner::new(
            request.fullname,
            request.wa_number,
            request.username,
            hash(&request.password)?,
        )
        .with_role(role.id);
        self.owners.insert(&owner).await?;

        tracing::info!(owner_id = %owner.id, username = %owner.username, "Owner created");
        Ok(owner.into())
    }

    /// Overwrite an owner's profile; only accounts holding the `Owner` role
    /// are reachable
    pub async fn update(&self, actor: &Actor, id: &str, request: UpdateOwnerRequest) -> Result<()> {
        let id = ids::decode_uuid(id)?;
        actor.may_manage(id)?;
        validated(&request)?;

        let password = if request.password.is_empty() {
            String::new()
        } else {
            hash(&request.password)?
        };

        let owner = Owner::new(request.fullname, request.wa_number, request.username, password);
        self.owners.update(id, &owner).await
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        let id = ids::decode_uuid(id)?;
        self.owners.delete(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::password::verify_password;
    use crate::auth::roles::MemoryRoleDirectory;

    fn setup() -> (Repositories, OwnerService, Arc<dyn RoleDirectory>) {
        let roles: Arc<dyn RoleDirectory> = Arc::new(MemoryRoleDirectory::standard());
        let repos = Repositories::in_memory(roles.clone());
        let service = OwnerService::new(&repos, roles.clone());
        (repos, service, roles)
    }

    fn admin() -> Actor {
        Actor {
            id: Uuid::new_v4(),
            role: ROLE_ADMIN.to_string(),
        }
    }

    fn profile(username: &str, password: &str) -> UpdateOwnerRequest {
        UpdateOwnerRequest {
            fullname: "Sri W.".to_string(),
            wa_number: "081234567890".to_string(),
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    fn create_request(username: &str) -> CreateOwnerRequest {
        CreateOwnerRequest {
            fullname: "Sri Wahyuni".to_string(),
            wa_number: "081234567890".to_string(),
            username: username.to_string(),
            password: "rahasia-warung".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_hashes_password_and_hides_it() {
        let (repos, service, _) = setup();

        let created = service.create(create_request("bu-sri")).await.unwrap();
        let json = serde_json::to_value(&created).unwrap();
        assert!(json.get("password").is_none());

        let stored = repos.owners.fetch_by_username("bu-sri").await.unwrap();
        assert_ne!(stored.password, "rahasia-warung");
        assert!(verify_password("rahasia-warung", &stored.password).unwrap());
        assert_ne!(stored.role_id, uuid::Uuid::nil());
    }

    #[tokio::test]
    async fn test_duplicate_username_conflicts() {
        let (_, service, _) = setup();

        service.create(create_request("bu-sri")).await.unwrap();
        assert!(matches!(
            service.create(create_request("bu-sri")).await,
            Err(CanteenError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_create_without_owner_role_is_config_error() {
        let roles: Arc<dyn RoleDirectory> = Arc::new(MemoryRoleDirectory::new());
        let service = OwnerService::new(&Repositories::in_memory(roles.clone()), roles);

        assert!(matches!(
            service.create(create_request("bu-sri")).await,
            Err(CanteenError::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_update_with_empty_password_keeps_hash() {
        let (repos, service, _) = setup();
        let created = service.create(create_request("bu-sri")).await.unwrap();
        let before = repos.owners.fetch_by_username("bu-sri").await.unwrap().password;

        service
            .update(&admin(), &created.owner_id.encoded(), profile("bu-sri", ""))
            .await
            .unwrap();

        let after = repos.owners.fetch_by_username("bu-sri").await.unwrap();
        assert_eq!(after.fullname, "Sri W.");
        assert_eq!(after.password, before);
    }

    #[tokio::test]
    async fn test_owner_manages_only_own_account() {
        let (_, service, _) = setup();
        let sri = service.create(create_request("bu-sri")).await.unwrap();
        let budi = service.create(create_request("pak-budi")).await.unwrap();
        let as_sri = Actor {
            id: sri.owner_id.uuid(),
            role: ROLE_OWNER.to_string(),
        };

        service
            .update(&as_sri, &sri.owner_id.encoded(), profile("bu-sri", ""))
            .await
            .unwrap();
        assert!(service.fetch_by_id(&as_sri, &sri.owner_id.encoded()).await.is_ok());

        let budi_id = budi.owner_id.encoded();
        assert!(matches!(
            service.fetch_by_id(&as_sri, &budi_id).await,
            Err(CanteenError::Unauthorized(_))
        ));
        assert!(matches!(
            service.update(&as_sri, &budi_id, profile("pak-budi", "dibajak-123")).await,
            Err(CanteenError::Unauthorized(_))
        ));
    }

    #[tokio::test]
    async fn test_update_cannot_reach_admin_accounts() {
        let (repos, service, roles) = setup();
        let admin_role = roles.find_by_name(ROLE_ADMIN).await.unwrap();
        let root = Owner::new("Root", "0800", "root", hash("root-password").unwrap())
            .with_role(admin_role.id);
        repos.owners.insert(&root).await.unwrap();

        let result = service
            .update(&admin(), &ids::encode(&root.id), profile("root", "dibajak-123"))
            .await;
        assert!(matches!(result, Err(CanteenError::NotFound(_))));

        let stored = repos.owners.fetch_by_username("root").await.unwrap();
        assert!(verify_password("root-password", &stored.password).unwrap());
    }
}
