use std::collections::HashMap;
use std::time::{Duration, Instant};

use uuid::Uuid;

pub const DEFAULT_DELAY_MS: u64 = 1500;

/// Row count reported by a successful simulated import. No file is parsed;
/// the figure is a fixed stand-in like the rest of the task's behavior.
pub const SIMULATED_IMPORT_ROWS: usize = 24;

const IMPORT_EXTENSIONS: &[&str] = &["csv", "xls", "xlsx"];

const MAX_TRACKED_TASKS: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    Import,
    Export,
    Refresh,
}

impl TaskKind {
    pub fn parse(s: &str) -> Option<TaskKind> {
        match s {
            "import" => Some(TaskKind::Import),
            "export" => Some(TaskKind::Export),
            "refresh" => Some(TaskKind::Refresh),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskKind::Import => "import",
            TaskKind::Export => "export",
            TaskKind::Refresh => "refresh",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    Pending,
    Success,
    Error,
    Cancelled,
}

impl TaskState {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskState::Pending => "pending",
            TaskState::Success => "success",
            TaskState::Error => "error",
            TaskState::Cancelled => "cancelled",
        }
    }
}

#[derive(Debug)]
pub struct Task {
    pub id: String,
    pub kind: TaskKind,
    pub file_name: Option<String>,
    ready_at: Instant,
    simulate_failure: bool,
    settled: Option<TaskState>,
}

#[derive(Debug)]
pub struct TaskError {
    pub code: &'static str,
    pub message: String,
}

fn bad(message: impl Into<String>) -> TaskError {
    TaskError {
        code: "bad_params",
        message: message.into(),
    }
}

/// Stand-ins for the network calls the real product would make. A task is a
/// timer with a tri-state outcome; it never touches the Record Store.
#[derive(Debug, Default)]
pub struct TaskTable {
    tasks: HashMap<String, Task>,
}

impl TaskTable {
    pub fn new() -> TaskTable {
        TaskTable {
            tasks: HashMap::new(),
        }
    }

    pub fn start(
        &mut self,
        kind: TaskKind,
        file_name: Option<String>,
        delay_ms: Option<u64>,
        simulate_failure: bool,
    ) -> Result<&Task, TaskError> {
        let file_name = match kind {
            TaskKind::Import => {
                let Some(name) = file_name.filter(|n| !n.trim().is_empty()) else {
                    return Err(bad("no file selected"));
                };
                let ext = name.rsplit('.').next().unwrap_or("").to_ascii_lowercase();
                if !IMPORT_EXTENSIONS.contains(&ext.as_str()) {
                    return Err(bad(
                        "invalid file format: expected .csv, .xls or .xlsx",
                    ));
                }
                Some(name)
            }
            _ => None,
        };

        // Bound the table: settled tasks are only kept so late polls can
        // still see their outcome, not forever.
        if self.tasks.len() >= MAX_TRACKED_TASKS {
            self.tasks.retain(|_, t| t.settled.is_none());
        }

        let id = Uuid::new_v4().to_string();
        let delay = Duration::from_millis(delay_ms.unwrap_or(DEFAULT_DELAY_MS));
        let task = Task {
            id: id.clone(),
            kind,
            file_name,
            ready_at: Instant::now() + delay,
            simulate_failure,
            settled: None,
        };
        Ok(self.tasks.entry(id).or_insert(task))
    }

    /// Resolves the task if its deadline has passed, then reports its state.
    pub fn poll(&mut self, id: &str) -> Option<(TaskState, &Task)> {
        let task = self.tasks.get_mut(id)?;
        if task.settled.is_none() && Instant::now() >= task.ready_at {
            task.settled = Some(if task.simulate_failure {
                TaskState::Error
            } else {
                TaskState::Success
            });
        }
        let state = task.settled.unwrap_or(TaskState::Pending);
        Some((state, task))
    }

    /// Cancels a still-pending task. A task whose deadline already passed
    /// settles first, so cancelling it reports a conflict.
    pub fn cancel(&mut self, id: &str) -> Option<Result<(), TaskState>> {
        let state = self.poll(id)?.0;
        if state != TaskState::Pending {
            return Some(Err(state));
        }
        let task = self.tasks.get_mut(id)?;
        task.settled = Some(TaskState::Cancelled);
        Some(Ok(()))
    }
}
