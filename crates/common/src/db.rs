//! MongoDB access layer for VisaHub collections.
//!
//! One driver round trip per operation; connection pooling stays inside
//! the driver. The client is constructed once at startup and injected
//! into handlers, never held as process-global state.

use crate::error::{Error, Result};
use crate::types::{
    AppliedVisa, DeleteAck, InsertAck, UpdateAck, VisaListing, VisaListingUpdate,
};
use futures::stream::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId, to_document, Document};
use mongodb::{Client, Collection};
use tracing::info;

/// Collection holding visa listings.
pub const LISTINGS_COLLECTION: &str = "visa";

/// Collection holding submitted applications. The name predates this
/// service and is kept for drop-in compatibility with existing data.
pub const APPLICATIONS_COLLECTION: &str = "Applied Visas";

/// Database wrapper owning the typed collection handles.
#[derive(Clone)]
pub struct Database {
    client: Client,
    listings: Collection<VisaListing>,
    applications: Collection<AppliedVisa>,
}

impl Database {
    /// Connect to the document store and bind the two collections.
    ///
    /// The driver defers socket establishment, so this succeeds without a
    /// reachable server; failures surface on the first operation.
    pub async fn connect(uri: &str, db_name: &str) -> Result<Self> {
        let client = Client::with_uri_str(uri).await?;
        let database = client.database(db_name);
        let listings = database.collection(LISTINGS_COLLECTION);
        let applications = database.collection(APPLICATIONS_COLLECTION);

        info!("Opened document store database {}", db_name);
        Ok(Self {
            client,
            listings,
            applications,
        })
    }

    /// Release the store client's pooled connections.
    pub async fn shutdown(self) {
        self.client.shutdown().await;
    }

    /// Insert a listing verbatim and return the store acknowledgment.
    pub async fn insert_listing(&self, listing: &VisaListing) -> Result<InsertAck> {
        let result = self.listings.insert_one(listing).await?;
        Ok(result.into())
    }

    /// List listings, optionally filtered by exact visa type.
    pub async fn list_listings(&self, visa_type: Option<&str>) -> Result<Vec<VisaListing>> {
        let cursor = self.listings.find(listing_filter(visa_type)).await?;
        Ok(cursor.try_collect().await?)
    }

    /// Fetch one listing by id. An unknown id is a distinct `NotFound`.
    pub async fn get_listing(&self, id: &str) -> Result<VisaListing> {
        let oid = parse_object_id(id)?;
        self.listings
            .find_one(doc! { "_id": oid })
            .await?
            .ok_or_else(|| Error::NotFound {
                kind: "visa".to_string(),
                id: id.to_string(),
            })
    }

    /// List the listings owned by an email.
    pub async fn listings_by_owner(&self, email: &str) -> Result<Vec<VisaListing>> {
        let cursor = self.listings.find(doc! { "email": email }).await?;
        Ok(cursor.try_collect().await?)
    }

    /// The most recently inserted listings, newest first.
    pub async fn latest_listings(&self, limit: i64) -> Result<Vec<VisaListing>> {
        let cursor = self
            .listings
            .find(doc! {})
            .sort(doc! { "_id": -1 })
            .limit(limit)
            .await?;
        Ok(cursor.try_collect().await?)
    }

    /// `$set` the fixed replacement field list on one listing.
    ///
    /// Updates never upsert; an unknown id is reported through a zero
    /// `matched_count` in the acknowledgment.
    pub async fn update_listing(&self, id: &str, update: &VisaListingUpdate) -> Result<UpdateAck> {
        let oid = parse_object_id(id)?;
        let fields = to_document(update)?;
        let result = self
            .listings
            .update_one(doc! { "_id": oid }, doc! { "$set": fields })
            .await?;
        Ok(result.into())
    }

    /// Remove one listing by id. A zero `deleted_count` means no match.
    pub async fn delete_listing(&self, id: &str) -> Result<DeleteAck> {
        let oid = parse_object_id(id)?;
        let result = self.listings.delete_one(doc! { "_id": oid }).await?;
        Ok(result.into())
    }

    /// Insert an application verbatim and return the store acknowledgment.
    pub async fn insert_application(&self, application: &AppliedVisa) -> Result<InsertAck> {
        let result = self.applications.insert_one(application).await?;
        Ok(result.into())
    }

    /// List applications submitted by an email, optionally narrowed by a
    /// case-insensitive country-name substring.
    pub async fn applications_by_email(
        &self,
        email: &str,
        search: Option<&str>,
    ) -> Result<Vec<AppliedVisa>> {
        let cursor = self
            .applications
            .find(application_filter(email, search))
            .await?;
        Ok(cursor.try_collect().await?)
    }

    /// Remove one application by id. A zero `deleted_count` means no match.
    pub async fn delete_application(&self, id: &str) -> Result<DeleteAck> {
        let oid = parse_object_id(id)?;
        let result = self.applications.delete_one(doc! { "_id": oid }).await?;
        Ok(result.into())
    }
}

fn parse_object_id(id: &str) -> Result<ObjectId> {
    Ok(ObjectId::parse_str(id)?)
}

fn listing_filter(visa_type: Option<&str>) -> Document {
    match visa_type {
        Some(visa_type) => doc! { "visaType": visa_type },
        None => doc! {},
    }
}

fn application_filter(email: &str, search: Option<&str>) -> Document {
    let mut filter = doc! { "email": email };
    if let Some(search) = search {
        filter.insert("countryName", doc! { "$regex": search, "$options": "i" });
    }
    filter
}
