mod task;

pub use task::{Priority, Task, TaskDraft, TaskUpdate, due_moment, normalize_due_date};
