//! Client records.
//!
//! Clients are deactivated rather than deleted so their visit history stays
//! readable.

use crate::{
    core::ids::StoredId,
    entities::{Client, client},
    errors::{Error, Result},
};
use sea_orm::{Condition, QueryOrder, Set, prelude::*};
use tracing::info;

/// Fields of a client to create.
#[derive(Debug, Clone, Default)]
pub struct NewClient {
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// Contact phone number
    pub phone: Option<String>,
    /// Free-text note
    pub note: Option<String>,
    /// Known allergies
    pub allergies: Option<String>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn required_names(fields: &NewClient) -> Result<(String, String)> {
    let first_name = fields.first_name.trim();
    let last_name = fields.last_name.trim();
    if first_name.is_empty() || last_name.is_empty() {
        return Err(Error::InvalidInput {
            message: "First and last name are required".to_string(),
        });
    }
    Ok((first_name.to_string(), last_name.to_string()))
}

/// Creates an active client.
///
/// # Errors
/// Returns [`Error::InvalidInput`] if the first or last name is blank, or a
/// database error if the insert fails.
pub async fn create_client(
    db: &DatabaseConnection,
    owner_id: &str,
    new_client: NewClient,
) -> Result<client::Model> {
    let (first_name, last_name) = required_names(&new_client)?;

    let now = chrono::Utc::now().naive_utc();
    let created = client::ActiveModel {
        owner_id: Set(owner_id.to_string()),
        first_name: Set(first_name),
        last_name: Set(last_name),
        phone: Set(non_blank(new_client.phone)),
        note: Set(non_blank(new_client.note)),
        allergies: Set(non_blank(new_client.allergies)),
        is_active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!(client_id = created.id, "Client created");
    Ok(created)
}

/// Loads one client of the owner.
///
/// # Errors
/// Returns [`Error::NotFound`] if the client does not exist for this owner.
pub async fn get_client(
    db: &DatabaseConnection,
    owner_id: &str,
    client_id: StoredId,
) -> Result<client::Model> {
    Client::find_by_id(client_id.get())
        .filter(client::Column::OwnerId.eq(owner_id))
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Client", client_id))
}

/// Replaces a client's name, contact and notes.
///
/// Stored visits and sales keep the name they were recorded with.
///
/// # Errors
/// Returns [`Error::InvalidInput`] if the first or last name is blank and
/// [`Error::NotFound`] if the client does not belong to the owner.
pub async fn update_client(
    db: &DatabaseConnection,
    owner_id: &str,
    client_id: StoredId,
    fields: NewClient,
) -> Result<client::Model> {
    let (first_name, last_name) = required_names(&fields)?;

    let mut active: client::ActiveModel = get_client(db, owner_id, client_id).await?.into();
    active.first_name = Set(first_name);
    active.last_name = Set(last_name);
    active.phone = Set(non_blank(fields.phone));
    active.note = Set(non_blank(fields.note));
    active.allergies = Set(non_blank(fields.allergies));
    active.updated_at = Set(chrono::Utc::now().naive_utc());

    let updated = active.update(db).await?;
    info!(client_id = updated.id, "Client updated");
    Ok(updated)
}

/// Active clients ordered by last name, then first name.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn get_active_clients(
    db: &DatabaseConnection,
    owner_id: &str,
) -> Result<Vec<client::Model>> {
    Client::find()
        .filter(client::Column::OwnerId.eq(owner_id))
        .filter(client::Column::IsActive.eq(true))
        .order_by_asc(client::Column::LastName)
        .order_by_asc(client::Column::FirstName)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Active clients whose name or phone contains `query`, ignoring case.
///
/// A blank query returns every active client.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn search_clients(
    db: &DatabaseConnection,
    owner_id: &str,
    query: &str,
) -> Result<Vec<client::Model>> {
    let needle = query.trim().to_lowercase();
    let clients = get_active_clients(db, owner_id).await?;
    if needle.is_empty() {
        return Ok(clients);
    }

    Ok(clients
        .into_iter()
        .filter(|c| {
            let full_name = format!("{} {}", c.first_name, c.last_name).to_lowercase();
            full_name.contains(&needle)
                || c.phone
                    .as_deref()
                    .is_some_and(|p| p.to_lowercase().contains(&needle))
        })
        .collect())
}

/// Hides a client from pickers and search.
///
/// # Errors
/// Returns [`Error::NotFound`] if the client does not exist for this owner or is
/// already inactive.
pub async fn deactivate_client(
    db: &DatabaseConnection,
    owner_id: &str,
    client_id: StoredId,
) -> Result<client::Model> {
    let existing = Client::find()
        .filter(
            Condition::all()
                .add(client::Column::Id.eq(client_id.get()))
                .add(client::Column::OwnerId.eq(owner_id))
                .add(client::Column::IsActive.eq(true)),
        )
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Client", client_id))?;

    let mut active: client::ActiveModel = existing.into();
    active.is_active = Set(false);
    active.updated_at = Set(chrono::Utc::now().naive_utc());
    active.update(db).await.map_err(Into::into)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::{
        catalog::load_catalog,
        visit::{NewVisit, create_visit, get_visit},
    };
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_create_client_trims_and_requires_names() -> Result<()> {
        let db = setup_test_db().await?;

        let created = create_client(
            &db,
            TEST_OWNER,
            NewClient {
                first_name: " Jana ".to_string(),
                last_name: "Nováková".to_string(),
                phone: Some("  ".to_string()),
                allergies: Some("PPD".to_string()),
                ..NewClient::default()
            },
        )
        .await?;
        assert_eq!(created.first_name, "Jana");
        assert_eq!(created.phone, None);
        assert_eq!(created.allergies.as_deref(), Some("PPD"));

        let missing_last = create_client(
            &db,
            TEST_OWNER,
            NewClient {
                first_name: "Jana".to_string(),
                ..NewClient::default()
            },
        )
        .await;
        assert!(matches!(missing_last, Err(Error::InvalidInput { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_get_client_is_owner_scoped() -> Result<()> {
        let db = setup_test_db().await?;
        let created = create_test_client(&db, "Jana", "Nováková").await?;
        let id = StoredId::new(created.id);

        assert_eq!(get_client(&db, TEST_OWNER, id).await?, created);
        assert!(get_client(&db, "someone-else", id).await.unwrap_err().is_not_found());
        Ok(())
    }

    #[tokio::test]
    async fn test_search_by_name_and_phone() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_client(&db, "Jana", "Nováková").await?;
        create_client(
            &db,
            TEST_OWNER,
            NewClient {
                first_name: "Eva".to_string(),
                last_name: "Malá".to_string(),
                phone: Some("+420 777 123 456".to_string()),
                ..NewClient::default()
            },
        )
        .await?;

        let by_name = search_clients(&db, TEST_OWNER, "nováK").await?;
        assert_eq!(by_name.len(), 1);
        assert_eq!(by_name[0].first_name, "Jana");

        let by_phone = search_clients(&db, TEST_OWNER, "777").await?;
        assert_eq!(by_phone.len(), 1);
        assert_eq!(by_phone[0].first_name, "Eva");

        let everyone = search_clients(&db, TEST_OWNER, " ").await?;
        assert_eq!(everyone[0].last_name, "Malá");
        assert_eq!(everyone.len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_deactivated_client_hidden() -> Result<()> {
        let db = setup_test_db().await?;
        let created = create_test_client(&db, "Jana", "Nováková").await?;
        let id = StoredId::new(created.id);

        let deactivated = deactivate_client(&db, TEST_OWNER, id).await?;
        assert!(!deactivated.is_active);
        assert!(get_active_clients(&db, TEST_OWNER).await?.is_empty());
        assert!(get_client(&db, TEST_OWNER, id).await.is_ok());
        assert!(deactivate_client(&db, TEST_OWNER, id).await.unwrap_err().is_not_found());
        Ok(())
    }

    #[tokio::test]
    async fn test_update_client_keeps_visit_snapshot() -> Result<()> {
        let db = setup_test_db().await?;
        let fixture = coloring_fixture(&db).await?;
        let catalog = load_catalog(&db, TEST_OWNER).await?;
        let payload = NewVisit::from_draft(&coloring_draft(&catalog, &fixture)?, &catalog)?;
        let visit_id = create_visit(&db, TEST_OWNER, &payload).await?;
        let id = StoredId::new(fixture.client.id);

        let updated = update_client(
            &db,
            TEST_OWNER,
            id,
            NewClient {
                first_name: "Jana".to_string(),
                last_name: " Malá ".to_string(),
                phone: Some("777 000 111".to_string()),
                note: Some(String::new()),
                ..NewClient::default()
            },
        )
        .await?;
        assert_eq!(updated.last_name, "Malá");
        assert_eq!(updated.phone.as_deref(), Some("777 000 111"));
        assert_eq!(updated.note, None);

        let visit = get_visit(&db, TEST_OWNER, visit_id).await?;
        assert_eq!(visit.client_last_name, "Nováková");

        let blank = update_client(&db, TEST_OWNER, id, NewClient::default()).await;
        assert!(matches!(blank, Err(Error::InvalidInput { .. })));
        let foreign = update_client(
            &db,
            "someone-else",
            id,
            NewClient {
                first_name: "X".to_string(),
                last_name: "Y".to_string(),
                ..NewClient::default()
            },
        )
        .await;
        assert!(foreign.unwrap_err().is_not_found());
        Ok(())
    }
}
