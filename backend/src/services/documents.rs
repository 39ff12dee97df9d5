//! Document service: owner-scoped context documents
//!
//! Documents arrive as already-extracted text; converting binary formats
//! (PDF, DOCX, XLSX) happens upstream of this API. Unsupported type tags
//! are rejected at the door.

use crate::error::ApiError;
use crate::repositories::{NewDocument, Storage, UserRecord};
use assistant_platform_shared::types::{CreateDocumentRequest, DocumentResponse};
use assistant_platform_shared::validation::validate_doc_type;
use uuid::Uuid;

/// Document service
pub struct DocumentService;

impl DocumentService {
    /// List the owner's documents
    pub async fn list(
        storage: &dyn Storage,
        owner: &UserRecord,
    ) -> Result<Vec<DocumentResponse>, ApiError> {
        let records = storage
            .list_documents(owner.id)
            .await
            .map_err(ApiError::Internal)?;
        Ok(records.iter().map(|d| d.to_response()).collect())
    }

    /// Store a document for `owner`
    pub async fn create(
        storage: &dyn Storage,
        owner: &UserRecord,
        req: CreateDocumentRequest,
    ) -> Result<DocumentResponse, ApiError> {
        if req.name.trim().is_empty() {
            return Err(ApiError::Validation("Name cannot be empty".to_string()));
        }
        if req.content.trim().is_empty() {
            return Err(ApiError::Validation("Content cannot be empty".to_string()));
        }
        validate_doc_type(&req.doc_type).map_err(ApiError::Validation)?;

        let record = storage
            .insert_document(NewDocument {
                user_id: owner.id,
                name: req.name,
                content: req.content,
                doc_type: req.doc_type.to_lowercase(),
            })
            .await
            .map_err(ApiError::Internal)?;

        Ok(record.to_response())
    }

    /// Delete one of the owner's documents
    pub async fn delete(
        storage: &dyn Storage,
        owner: &UserRecord,
        id: Uuid,
    ) -> Result<(), ApiError> {
        let owned = storage
            .find_document(id)
            .await
            .map_err(ApiError::Internal)?
            .map(|d| d.user_id == owner.id)
            .unwrap_or(false);
        if !owned {
            return Err(ApiError::NotFound("Document not found".to_string()));
        }

        storage.delete_document(id).await.map_err(ApiError::Internal)?;
        Ok(())
    }
}
