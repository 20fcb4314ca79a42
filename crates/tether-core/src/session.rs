use chrono::Utc;
use chrono_tz::Tz;
use tracing::{debug, info, instrument, warn};

use crate::collection::TaskCollection;
use crate::datetime::stamp_local;
use crate::error::SessionError;
use crate::filter::FilterCriteria;
use crate::page;
use crate::remote::{NewTask, TaskStore};
use crate::task::Task;

#[derive(Debug)]
pub struct View<'a> {
    pub entries: Vec<&'a Task>,
    pub show_pagination: bool,
    pub current_page: usize,
    pub total_pages: usize,
}

#[derive(Debug)]
pub struct Session<S: TaskStore> {
    store: S,
    owner_id: u64,
    tz: Tz,
    collection: TaskCollection,
    filter: FilterCriteria,
    current_page: usize,
}

impl<S: TaskStore> Session<S> {
    pub fn new(store: S, owner_id: u64, tz: Tz) -> Self {
        Self {
            store,
            owner_id,
            tz,
            collection: TaskCollection::default(),
            filter: FilterCriteria::None,
            current_page: 1,
        }
    }

    #[instrument(skip(self))]
    pub async fn load(&mut self) -> Result<(), SessionError> {
        let records = self.store.fetch_all().await?;
        let tasks: Vec<Task> = records.into_iter().map(|r| r.into_task()).collect();
        info!(count = tasks.len(), "loaded tasks from remote store");

        self.collection.load(tasks);
        self.filter = FilterCriteria::None;
        self.current_page = 1;
        Ok(())
    }

    #[instrument(skip(self, title, description))]
    pub async fn add(&mut self, title: &str, description: &str) -> Result<Task, SessionError> {
        let title = title.trim();
        let description = description.trim();
        if title.is_empty() || description.is_empty() {
            return Err(SessionError::Validation(
                "both title and description are required".to_string(),
            ));
        }

        let created_at = stamp_local(Utc::now(), self.tz);
        let draft = NewTask {
            text: format!("{title} - {description}"),
            completed: false,
            owner_id: self.owner_id,
            created_at: created_at.clone(),
        };

        let record = self.store.add(&draft).await?;
        info!(id = record.id, "remote add succeeded");

        let mut task = record.into_task();
        task.created_at = Some(created_at);
        self.collection.append(task.clone());

        self.filter = FilterCriteria::None;
        self.current_page = 1;
        Ok(task)
    }

    #[instrument(skip(self))]
    pub async fn set_completed(&mut self, id: u64, completed: bool) -> Result<(), SessionError> {
        self.store.set_completed(id, completed).await?;

        if !self.collection.set_completed(id, completed) {
            warn!(id, "remote update succeeded for a task missing locally");
        }
        Ok(())
    }

    #[instrument(skip(self, query))]
    pub fn search(&mut self, query: &str) {
        self.filter = FilterCriteria::text(query);
        self.current_page = 1;
        debug!(filter = ?self.filter, "search filter set");
    }

    #[instrument(skip(self))]
    pub fn date_filter(
        &mut self,
        from: Option<chrono::NaiveDate>,
        to: Option<chrono::NaiveDate>,
    ) {
        self.filter = FilterCriteria::date_range(from, to);
        self.current_page = 1;
        debug!(filter = ?self.filter, "date filter set");
    }

    #[instrument(skip(self))]
    pub fn set_page(&mut self, page: usize) {
        if !self.filter.is_none() {
            warn!(page, "ignoring page change while a filter is active");
            return;
        }
        self.current_page = page.max(1);
    }

    pub fn view(&self) -> View<'_> {
        if self.filter.is_none() {
            let reversed: Vec<&Task> = self.collection.tasks().iter().rev().collect();
            let entries = page::slice(&reversed, self.current_page).to_vec();
            View {
                entries,
                show_pagination: true,
                current_page: self.current_page,
                total_pages: page::total_pages(self.collection.len()),
            }
        } else {
            View {
                entries: self.filter.apply(self.collection.tasks()),
                show_pagination: false,
                current_page: self.current_page,
                total_pages: 0,
            }
        }
    }

    pub fn filter(&self) -> &FilterCriteria {
        &self.filter
    }

    pub fn collection(&self) -> &TaskCollection {
        &self.collection
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::NaiveDate;
    use chrono_tz::Tz;

    use super::Session;
    use crate::error::StoreError;
    use crate::filter::FilterCriteria;
    use crate::remote::{NewTask, RemoteTask, TaskStore};

    #[derive(Debug, Default)]
    struct ScriptedStore {
        tasks: Vec<(u64, &'static str, bool)>,
        fail: bool,
        calls: Mutex<Vec<&'static str>>,
    }

    impl ScriptedStore {
        fn with_tasks(tasks: Vec<(u64, &'static str, bool)>) -> Self {
            Self {
                tasks,
                ..Self::default()
            }
        }

        fn failing(tasks: Vec<(u64, &'static str, bool)>) -> Self {
            Self {
                tasks,
                fail: true,
                ..Self::default()
            }
        }

        fn calls(&self) -> Vec<&'static str> {
            self.calls.lock().expect("calls lock").clone()
        }

        fn record(&self, call: &'static str) -> Result<(), StoreError> {
            self.calls.lock().expect("calls lock").push(call);
            if self.fail {
                Err(StoreError::Status {
                    url: format!("scripted://{call}"),
                    status: 500,
                })
            } else {
                Ok(())
            }
        }
    }

    #[async_trait]
    impl TaskStore for ScriptedStore {
        async fn fetch_all(&self) -> Result<Vec<RemoteTask>, StoreError> {
            self.record("fetch_all")?;
            Ok(self
                .tasks
                .iter()
                .map(|(id, text, completed)| RemoteTask {
                    id: *id,
                    text: (*text).to_string(),
                    completed: *completed,
                    owner_id: Some(5),
                    created_at: None,
                })
                .collect())
        }

        async fn add(&self, draft: &NewTask) -> Result<RemoteTask, StoreError> {
            self.record("add")?;
            let next_id = self.tasks.iter().map(|(id, ..)| *id).max().unwrap_or(0) + 1;
            Ok(RemoteTask {
                id: next_id,
                text: draft.text.clone(),
                completed: draft.completed,
                owner_id: Some(draft.owner_id),
                created_at: None,
            })
        }

        async fn set_completed(&self, id: u64, completed: bool) -> Result<RemoteTask, StoreError> {
            self.record("set_completed")?;
            Ok(RemoteTask {
                id,
                text: String::new(),
                completed,
                owner_id: None,
                created_at: None,
            })
        }
    }

    fn tz() -> Tz {
        "Asia/Kolkata".parse().expect("valid timezone")
    }

    fn numbered(count: u64) -> Vec<(u64, &'static str, bool)> {
        (1..=count)
            .map(|i| {
                let text: &'static str = Box::leak(format!("task {i}").into_boxed_str());
                (i, text, false)
            })
            .collect()
    }

    async fn loaded_session(store: ScriptedStore) -> Session<ScriptedStore> {
        let mut session = Session::new(store, 5, tz());
        session.load().await.expect("load");
        session
    }

    #[tokio::test]
    async fn load_resets_to_unfiltered_page_one() {
        let mut session = Session::new(ScriptedStore::with_tasks(numbered(3)), 5, tz());
        session.search("task");
        session.load().await.expect("load");

        assert!(session.filter().is_none());
        let view = session.view();
        assert!(view.show_pagination);
        assert_eq!(view.current_page, 1);
        assert_eq!(view.entries.len(), 3);
    }

    #[tokio::test]
    async fn load_failure_is_transport() {
        let mut session = Session::new(ScriptedStore::failing(vec![]), 5, tz());
        let err = session.load().await.expect_err("load should fail");
        assert!(err.is_transport());
    }

    #[tokio::test]
    async fn unfiltered_view_is_reversed_and_paginated() {
        let session = loaded_session(ScriptedStore::with_tasks(numbered(25))).await;

        let view = session.view();
        assert!(view.show_pagination);
        assert_eq!(view.total_pages, 3);
        assert_eq!(view.entries.len(), 10);
        assert_eq!(view.entries[0].id, 25);
        assert_eq!(view.entries[9].id, 16);
    }

    #[tokio::test]
    async fn last_page_holds_the_oldest_tasks() {
        let mut session = loaded_session(ScriptedStore::with_tasks(numbered(25))).await;
        session.set_page(3);

        let view = session.view();
        let ids: Vec<u64> = view.entries.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![5, 4, 3, 2, 1]);
    }

    #[tokio::test]
    async fn out_of_range_page_yields_empty_view() {
        let mut session = loaded_session(ScriptedStore::with_tasks(numbered(5))).await;
        session.set_page(4);
        assert!(session.view().entries.is_empty());
    }

    #[tokio::test]
    async fn add_merges_server_id_with_local_stamp() {
        let mut session = loaded_session(ScriptedStore::with_tasks(numbered(3))).await;

        let task = session.add("Buy milk", "2%").await.expect("add");
        assert_eq!(task.text, "Buy milk - 2%");
        assert!(!task.completed);
        assert_eq!(task.id, 4);
        assert!(task.created_at.is_some());

        let last = session.collection().tasks().last().expect("appended task");
        assert_eq!(last.id, 4);
        let view = session.view();
        assert_eq!(view.entries[0].id, 4);
        assert_eq!(view.current_page, 1);
    }

    #[tokio::test]
    async fn add_clears_any_active_filter() {
        let mut session = loaded_session(ScriptedStore::with_tasks(numbered(3))).await;
        session.search("task 2");

        session.add("Buy milk", "2%").await.expect("add");
        assert!(session.filter().is_none());
        assert!(session.view().show_pagination);
    }

    #[tokio::test]
    async fn blank_add_fields_fail_validation_without_remote_call() {
        let mut session = loaded_session(ScriptedStore::with_tasks(numbered(1))).await;

        let err = session.add("  ", "desc").await.expect_err("blank title");
        assert!(err.is_validation());
        let err = session.add("title", "").await.expect_err("blank description");
        assert!(err.is_validation());

        assert_eq!(session.store.calls(), vec!["fetch_all"]);
    }

    #[tokio::test]
    async fn add_failure_leaves_collection_unchanged() {
        let mut session = Session::new(ScriptedStore::with_tasks(numbered(2)), 5, tz());
        session.load().await.expect("load");
        session.store.fail = true;

        let err = session.add("Buy milk", "2%").await.expect_err("add fails");
        assert!(err.is_transport());
        assert_eq!(session.collection().len(), 2);
    }

    #[tokio::test]
    async fn toggle_patches_local_state_only_on_success() {
        let mut session = loaded_session(ScriptedStore::with_tasks(numbered(3))).await;

        session.set_completed(2, true).await.expect("toggle");
        assert!(session.collection().get(2).expect("task 2").completed);
    }

    #[tokio::test]
    async fn toggle_failure_leaves_local_state_untouched() {
        let mut session = Session::new(ScriptedStore::with_tasks(numbered(3)), 5, tz());
        session.load().await.expect("load");
        session.store.fail = true;

        let err = session.set_completed(2, true).await.expect_err("toggle fails");
        assert!(err.is_transport());
        assert!(!session.collection().get(2).expect("task 2").completed);
    }

    #[tokio::test]
    async fn toggle_preserves_active_filter_and_visibility() {
        let mut session = loaded_session(ScriptedStore::with_tasks(vec![
            (1, "water the plants", false),
            (2, "buy milk", false),
            (3, "milk the cows", false),
        ]))
        .await;
        session.search("milk");

        session.set_completed(2, true).await.expect("toggle");

        assert_eq!(session.filter(), &FilterCriteria::Text("milk".to_string()));
        let view = session.view();
        assert!(!view.show_pagination);
        let ids: Vec<u64> = view.entries.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![2, 3]);
        assert!(view.entries[0].completed);
    }

    #[tokio::test]
    async fn filters_are_mutually_exclusive_over_any_interleaving() {
        let mut session = loaded_session(ScriptedStore::with_tasks(numbered(3))).await;
        let from = NaiveDate::from_ymd_opt(2025, 7, 1);

        session.search("task");
        session.date_filter(from, None);
        assert!(matches!(session.filter(), FilterCriteria::DateRange { .. }));

        session.search("task");
        assert!(matches!(session.filter(), FilterCriteria::Text(_)));

        session.date_filter(from, None);
        session.search("   ");
        assert!(session.filter().is_none());

        session.search("task");
        session.date_filter(None, None);
        assert!(session.filter().is_none());
    }

    #[tokio::test]
    async fn pagination_visibility_tracks_filter_state() {
        let mut session = loaded_session(ScriptedStore::with_tasks(numbered(12))).await;
        assert!(session.view().show_pagination);

        session.search("task");
        assert!(!session.view().show_pagination);

        session.search("");
        assert!(session.view().show_pagination);

        session.date_filter(NaiveDate::from_ymd_opt(2025, 1, 1), None);
        assert!(!session.view().show_pagination);
    }

    #[tokio::test]
    async fn page_changes_are_ignored_while_filtered() {
        let mut session = loaded_session(ScriptedStore::with_tasks(numbered(25))).await;
        session.search("task");

        session.set_page(3);
        assert_eq!(session.view().current_page, 1);

        session.search("");
        assert_eq!(session.view().current_page, 1);
        assert_eq!(session.view().entries[0].id, 25);

        session.set_page(3);
        assert_eq!(session.view().current_page, 3);
    }

    #[tokio::test]
    async fn filtered_view_keeps_collection_order() {
        let mut session = loaded_session(ScriptedStore::with_tasks(numbered(15))).await;
        session.search("task 1");

        let ids: Vec<u64> = session.view().entries.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![1, 10, 11, 12, 13, 14, 15]);
    }
}
