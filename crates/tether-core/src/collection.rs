use tracing::debug;

use crate::task::Task;

#[derive(Debug, Clone, Default)]
pub struct TaskCollection {
    tasks: Vec<Task>,
}

impl TaskCollection {
    #[tracing::instrument(skip(self, tasks))]
    pub fn load(&mut self, tasks: Vec<Task>) {
        debug!(count = tasks.len(), "loading collection");
        self.tasks = tasks;
    }

    #[tracing::instrument(skip(self, task), fields(id = task.id))]
    pub fn append(&mut self, task: Task) {
        self.tasks.push(task);
    }

    #[tracing::instrument(skip(self))]
    pub fn set_completed(&mut self, id: u64, completed: bool) -> bool {
        match self.tasks.iter_mut().find(|t| t.id == id) {
            Some(task) => {
                task.completed = completed;
                true
            }
            None => {
                debug!(id, "task not in local collection, ignoring");
                false
            }
        }
    }

    pub fn get(&self, id: u64) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}
