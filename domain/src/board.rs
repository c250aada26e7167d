//! Task list view model: counts and search over the loaded tasks.

use crate::task::{Task, TaskStatus};

#[derive(Debug, Clone, Default)]
pub struct TaskBoard {
    tasks: Vec<Task>,
}

impl TaskBoard {
    pub fn new(tasks: Vec<Task>) -> Self {
        Self { tasks }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn total(&self) -> usize {
        self.tasks.len()
    }

    pub fn completed(&self) -> usize {
        self.tasks.iter().filter(|t| t.is_completed()).count()
    }

    /// Everything not completed, in-progress tasks included.
    pub fn pending(&self) -> usize {
        self.total() - self.completed()
    }

    /// Tasks whose title or description contains `query`, ignoring case.
    /// A blank query returns every task.
    pub fn search(&self, query: &str) -> Vec<&Task> {
        if query.trim().is_empty() {
            return self.tasks.iter().collect();
        }
        let needle = query.to_lowercase();
        self.tasks.iter().filter(|t| t.matches(&needle)).collect()
    }

    /// Replace the task with the same id, or append it.
    pub fn upsert(&mut self, task: Task) {
        match self.tasks.iter_mut().find(|t| t.id == task.id) {
            Some(existing) => *existing = task,
            None => self.tasks.push(task),
        }
    }

    pub fn set_status(&mut self, id: &str, status: TaskStatus) -> bool {
        match self.tasks.iter_mut().find(|t| t.id == id) {
            Some(task) => {
                task.status = status;
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, id: &str) -> Option<Task> {
        let index = self.tasks.iter().position(|t| t.id == id)?;
        Some(self.tasks.remove(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(id: &str, title: &str, status: TaskStatus) -> Task {
        Task {
            id: id.to_string(),
            title: title.to_string(),
            description: None,
            due_date: None,
            status,
        }
    }

    fn board() -> TaskBoard {
        TaskBoard::new(vec![
            task("1", "Write report", TaskStatus::Completed),
            task("2", "Review PR", TaskStatus::InProgress),
            task("3", "Book flights", TaskStatus::Pending),
        ])
    }

    #[test]
    fn test_counts() {
        let board = board();
        assert_eq!(board.total(), 3);
        assert_eq!(board.completed(), 1);
        assert_eq!(board.pending(), 2);
    }

    #[test]
    fn test_blank_search_returns_everything() {
        assert_eq!(board().search("   ").len(), 3);
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let board = board();
        let hits = board.search("REVIEW");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "2");
    }

    #[test]
    fn test_upsert_keeps_counts_consistent() {
        let mut board = board();
        board.upsert(task("3", "Book flights", TaskStatus::Completed));
        assert_eq!(board.total(), 3);
        assert_eq!(board.completed(), 2);

        board.upsert(task("4", "New", TaskStatus::Completed));
        assert_eq!(board.total(), 4);
        assert_eq!(board.completed(), 3);
    }

    #[test]
    fn test_set_status_and_remove() {
        let mut board = board();
        assert!(board.set_status("2", TaskStatus::Completed));
        assert!(!board.set_status("missing", TaskStatus::Completed));
        assert_eq!(board.completed(), 2);

        let removed = board.remove("1").unwrap();
        assert_eq!(removed.title, "Write report");
        assert_eq!(board.completed(), 1);
        assert!(board.remove("1").is_none());
    }
}
