//! The client-side task collection and the operations that change it.
//!
//! The server is the source of truth: the collection only changes after a
//! request succeeded, and a failed request leaves it exactly as it was.

use chrono::{DateTime, Utc};
use todoman_api::v1::{NewTask, Task, TaskPatch, TaskStatus};
use tracing::{error, info};

use crate::{
    group::{TaskGroups, TaskStats},
    ApiClient, BoardError,
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum View {
    #[default]
    Active,
    Archived,
}

/// Result of [`Board::update`].
#[derive(Clone, Debug, PartialEq)]
pub enum Update {
    Applied(Task),
    /// The patch would archive the task and waits for [`Board::confirm_archive`].
    AwaitingConfirmation,
}

#[derive(Clone, Debug, PartialEq)]
struct PendingArchive {
    id: String,
    patch: TaskPatch,
}

#[derive(Debug, Default)]
pub struct Board {
    tasks: Vec<Task>,
    view: View,
    archive_candidate: Option<PendingArchive>,
    delete_candidate: Option<String>,
}

impl Board {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn set_view(&mut self, view: View) {
        self.view = view;
    }

    pub fn groups(&self) -> TaskGroups<'_> {
        TaskGroups::new(&self.tasks)
    }

    pub fn stats(&self, now: DateTime<Utc>) -> TaskStats {
        TaskStats::compute(&self.groups(), now)
    }

    pub fn archive_candidate(&self) -> Option<&Task> {
        let pending = self.archive_candidate.as_ref()?;
        self.get(&pending.id)
    }

    pub fn delete_candidate(&self) -> Option<&Task> {
        self.get(self.delete_candidate.as_deref()?)
    }

    /// Replaces the collection with the server's list.
    pub async fn refresh(&mut self, api: &ApiClient) -> Result<(), BoardError> {
        match api.list_tasks().await {
            Ok(tasks) => {
                self.tasks = tasks;
                Ok(())
            }
            Err(err) => {
                error!(error = %err, "failed to fetch tasks");
                Err(err.into())
            }
        }
    }

    pub async fn create(&mut self, api: &ApiClient, task: NewTask) -> Result<&Task, BoardError> {
        let title = task.title.trim();
        if title.is_empty() {
            return Err(BoardError::EmptyTitle);
        }

        let task = NewTask {
            title: title.to_owned(),
            ..task
        };

        let created = api.create_task(&task).await.map_err(|err| {
            error!(error = %err, title = %task.title, "failed to create task");
            err
        })?;

        info!(id = %created.id, title = %created.title, "created task");
        self.tasks.insert(0, created);

        Ok(&self.tasks[0])
    }

    /// Sends `patch`, unless it would archive the task: such a patch is held
    /// back until [`Board::confirm_archive`] or [`Board::cancel_archive`].
    pub async fn update(
        &mut self,
        api: &ApiClient,
        id: &str,
        patch: TaskPatch,
    ) -> Result<Update, BoardError> {
        if patch.is_empty() {
            return Err(BoardError::EmptyPatch);
        }
        if patch.title.as_deref().is_some_and(|title| title.trim().is_empty()) {
            return Err(BoardError::EmptyTitle);
        }
        self.ensure(id)?;

        if patch.archives() {
            self.archive_candidate = Some(PendingArchive {
                id: id.to_owned(),
                patch,
            });
            return Ok(Update::AwaitingConfirmation);
        }

        let updated = self.patch(api, id, &patch).await?;
        Ok(Update::Applied(updated))
    }

    pub async fn confirm_archive(&mut self, api: &ApiClient) -> Result<Task, BoardError> {
        let Some(pending) = self.archive_candidate.clone() else {
            return Err(BoardError::NothingPending("archive"));
        };

        let archived = self.patch(api, &pending.id, &pending.patch).await?;
        self.archive_candidate = None;

        Ok(archived)
    }

    pub fn cancel_archive(&mut self) {
        self.archive_candidate = None;
    }

    pub fn request_delete(&mut self, id: &str) -> Result<&Task, BoardError> {
        self.ensure(id)?;
        self.delete_candidate = Some(id.to_owned());
        self.get(id).ok_or_else(|| BoardError::UnknownTask(id.to_owned()))
    }

    pub async fn confirm_delete(&mut self, api: &ApiClient) -> Result<Task, BoardError> {
        let Some(id) = self.delete_candidate.clone() else {
            return Err(BoardError::NothingPending("delete"));
        };

        if let Err(err) = api.delete_task(&id).await {
            error!(error = %err, id = %id, "failed to delete task");
            return Err(err.into());
        }

        self.delete_candidate = None;
        let index = self.position(&id)?;
        let deleted = self.tasks.remove(index);
        info!(id = %deleted.id, "deleted task");

        Ok(deleted)
    }

    pub fn cancel_delete(&mut self) {
        self.delete_candidate = None;
    }

    /// Moves an archived task back to not-started and shows the active list.
    pub async fn restore(&mut self, api: &ApiClient, id: &str) -> Result<Task, BoardError> {
        self.ensure(id)?;

        let patch = TaskPatch::default().status(TaskStatus::NotStarted);
        let restored = self.patch(api, id, &patch).await?;
        self.view = View::Active;

        Ok(restored)
    }

    async fn patch(
        &mut self,
        api: &ApiClient,
        id: &str,
        patch: &TaskPatch,
    ) -> Result<Task, BoardError> {
        let updated = match api.update_task(id, patch).await {
            Ok(updated) => updated,
            Err(err) => {
                error!(error = %err, id = %id, "failed to update task");
                return Err(err.into());
            }
        };

        info!(id = %updated.id, status = ?updated.status, "updated task");
        self.replace(updated.clone());

        Ok(updated)
    }

    /// Puts the server's copy of a task in place of the local one.
    fn replace(&mut self, task: Task) {
        match self.tasks.iter_mut().find(|existing| existing.id == task.id) {
            Some(existing) => *existing = task,
            None => self.tasks.insert(0, task),
        }
    }

    fn position(&self, id: &str) -> Result<usize, BoardError> {
        (self.tasks.iter())
            .position(|task| task.id == id)
            .ok_or_else(|| BoardError::UnknownTask(id.to_owned()))
    }

    fn ensure(&self, id: &str) -> Result<(), BoardError> {
        self.position(id).map(|_| ())
    }
}
