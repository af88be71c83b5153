//! Domain types for visa listings and visa applications.
//!
//! Wire field names are camelCase to match the documents the frontend
//! already stores. Both persisted kinds carry a flattened catch-all
//! document so fields outside the modelled core survive a round trip
//! through the store untouched.

use mongodb::bson::{oid::ObjectId, Bson, Document};
use mongodb::results::{DeleteResult, InsertOneResult, UpdateResult};
use serde::{Deserialize, Serialize};

/// A visa offering submitted by a user.
///
/// The `email` field identifies the owner; per-user reads filter on it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisaListing {
    /// Store-generated identity. Absent until inserted.
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub country_name: String,
    pub visa_type: String,
    pub processing_time: String,
    pub required_documents: Vec<String>,
    pub description: String,
    pub age_restriction: String,
    pub fee: String,
    pub validity: String,
    pub application_method: String,
    pub image: String,
    /// Owner identity.
    pub email: String,
    /// Fields outside the modelled core, preserved verbatim.
    #[serde(flatten)]
    pub extra: Document,
}

/// Replacement fields for `PUT /visa/:id`.
///
/// Matches the fixed `$set` list of the update operation: everything a
/// listing carries except its identity and owner email.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisaListingUpdate {
    pub image: String,
    pub country_name: String,
    pub visa_type: String,
    pub processing_time: String,
    pub required_documents: Vec<String>,
    pub description: String,
    pub age_restriction: String,
    pub fee: String,
    pub validity: String,
    pub application_method: String,
}

/// A record of a user applying against a listing.
///
/// Carries a snapshot of the listing at application time; the snapshot
/// is never reconciled if the source listing is later edited or removed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppliedVisa {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    /// Applicant identity.
    pub email: String,
    /// Snapshot of the listing's country; the search filter matches on it.
    pub country_name: String,
    /// The rest of the listing snapshot plus application metadata.
    #[serde(flatten)]
    pub snapshot: Document,
}

/// Insert acknowledgment in the shape the store clients consume.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertAck {
    pub acknowledged: bool,
    pub inserted_id: Bson,
}

impl From<InsertOneResult> for InsertAck {
    fn from(result: InsertOneResult) -> Self {
        Self {
            acknowledged: true,
            inserted_id: result.inserted_id,
        }
    }
}

/// Update acknowledgment; `matched_count` of zero means the id did not
/// resolve to a document and nothing was written.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAck {
    pub acknowledged: bool,
    pub matched_count: u64,
    pub modified_count: u64,
}

impl From<UpdateResult> for UpdateAck {
    fn from(result: UpdateResult) -> Self {
        Self {
            acknowledged: true,
            matched_count: result.matched_count,
            modified_count: result.modified_count,
        }
    }
}

/// Delete acknowledgment; `deleted_count` of zero is not an error.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteAck {
    pub acknowledged: bool,
    pub deleted_count: u64,
}

impl From<DeleteResult> for DeleteAck {
    fn from(result: DeleteResult) -> Self {
        Self {
            acknowledged: true,
            deleted_count: result.deleted_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_preserves_unmodelled_fields() {
        let body = serde_json::json!({
            "countryName": "Japan",
            "visaType": "Tourist",
            "processingTime": "10 days",
            "requiredDocuments": ["Passport"],
            "description": "Short stay",
            "ageRestriction": "18",
            "fee": "100",
            "validity": "90 days",
            "applicationMethod": "Online",
            "image": "https://example.com/japan.png",
            "email": "a@x.com",
            "addedAt": "2024-11-02",
        });

        let listing: VisaListing = serde_json::from_value(body).unwrap();
        assert_eq!(listing.country_name, "Japan");
        assert_eq!(
            listing.extra.get_str("addedAt").unwrap(),
            "2024-11-02",
            "unknown fields land in the flattened document"
        );

        let stored = mongodb::bson::to_document(&listing).unwrap();
        assert!(!stored.contains_key("_id"));
        assert_eq!(stored.get_str("addedAt").unwrap(), "2024-11-02");
    }

    #[test]
    fn test_application_snapshot_is_loose() {
        let body = serde_json::json!({
            "email": "a@x.com",
            "countryName": "Japan",
            "fee": "100",
            "appliedDate": "2024-11-03",
        });

        let application: AppliedVisa = serde_json::from_value(body).unwrap();
        assert_eq!(application.country_name, "Japan");
        assert_eq!(application.snapshot.get_str("appliedDate").unwrap(), "2024-11-03");
    }
}

