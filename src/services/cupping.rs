//! Cupping notes service

use uuid::Uuid;

use crate::{
    error::AppResult,
    models::cupping::{CreateCuppingNote, CuppingNoteView},
    repository::Repository,
};

#[derive(Clone)]
pub struct CuppingService {
    repository: Repository,
}

impl CuppingService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list_for_brew(&self, account_id: Uuid, brew_id: Uuid) -> AppResult<Vec<CuppingNoteView>> {
        self.repository.brews.get_by_id(account_id, brew_id).await?;
        let notes = self.repository.cupping.list_for_brew(account_id, brew_id).await?;
        Ok(notes.into_iter().map(CuppingNoteView::from).collect())
    }

    pub async fn get_by_id(&self, account_id: Uuid, id: Uuid) -> AppResult<CuppingNoteView> {
        let note = self.repository.cupping.get_by_id(account_id, id).await?;
        Ok(note.into())
    }

    /// Score a brew. Sub-scores are validated before anything is written.
    pub async fn create(
        &self,
        account_id: Uuid,
        brew_id: Uuid,
        data: &CreateCuppingNote,
    ) -> AppResult<CuppingNoteView> {
        data.scores.check()?;
        self.repository.brews.get_by_id(account_id, brew_id).await?;

        let descriptors: Vec<String> = data
            .flavor_descriptors
            .iter()
            .map(|d| d.trim().to_lowercase())
            .filter(|d| !d.is_empty())
            .collect();
        let data = CreateCuppingNote {
            scores: data.scores,
            flavor_descriptors: descriptors,
            notes: data.notes.clone(),
        };

        let note = self.repository.cupping.create(account_id, brew_id, &data).await?;
        Ok(note.into())
    }

    pub async fn delete(&self, account_id: Uuid, id: Uuid) -> AppResult<()> {
        self.repository.cupping.delete(account_id, id).await
    }
}
