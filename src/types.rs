// Shared types used across the codebase

use serde::{Deserialize, Serialize};

/// Record operations issued by tenant-scoped views
/// Used for request logging and to key user-facing notices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operation {
    Create,
    Update,
    Delete,
    Select,
}

impl Operation {
    pub fn success_message(&self) -> &'static str {
        match self {
            Operation::Create => "Created successfully",
            Operation::Update => "Updated successfully",
            Operation::Delete => "Deleted successfully",
            Operation::Select => "Loaded successfully",
        }
    }

    pub fn failure_message(&self) -> &'static str {
        match self {
            Operation::Create | Operation::Update => "Failed to save",
            Operation::Delete => "Failed to delete",
            Operation::Select => "Failed to load",
        }
    }
}
