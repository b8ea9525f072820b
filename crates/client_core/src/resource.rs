use std::{fmt, hash::Hash};

use serde::de::DeserializeOwned;
use shared::{
    domain::{ProjectId, TaskId},
    protocol::{Project, Task},
};

use crate::{
    draft::Draft,
    error::{ClientError, ClientResult},
};

/// A REST-addressable entity type.
pub trait Resource: DeserializeOwned + Clone + fmt::Debug + Send + Sync + 'static {
    type Id: Copy + Eq + Hash + fmt::Display + fmt::Debug + Send + Sync + 'static;

    /// Collection path segment, e.g. `projects`.
    const COLLECTION: &'static str;
    /// Singular name used in notices, e.g. `project`.
    const NOUN: &'static str;

    fn id(&self) -> Self::Id;

    fn draft(&self) -> Draft;

    /// Path of this collection nested under a project, if the resource supports it.
    fn scoped_collection(_parent: ProjectId) -> Option<String> {
        None
    }

    fn list_path(parent: Option<ProjectId>) -> ClientResult<String> {
        match parent {
            None => Ok(Self::COLLECTION.to_string()),
            Some(parent) => Self::scoped_collection(parent).ok_or(ClientError::InvalidScope {
                resource: Self::COLLECTION,
            }),
        }
    }

    /// Parent recorded on a newly created element. Resources that only exist inside a
    /// project refuse to be created without one.
    fn creation_parent(parent: Option<ProjectId>) -> ClientResult<Option<ProjectId>> {
        Ok(parent)
    }

    fn item_path(id: Self::Id) -> String {
        format!("{}/{id}", Self::COLLECTION)
    }
}

impl Resource for Project {
    type Id = ProjectId;

    const COLLECTION: &'static str = "projects";
    const NOUN: &'static str = "project";

    fn id(&self) -> ProjectId {
        self.id
    }

    fn draft(&self) -> Draft {
        Draft::from_entity(
            &self.title,
            self.description.as_deref(),
            self.due_date,
            self.assignee.as_deref(),
            self.status,
            self.priority,
        )
    }
}

impl Resource for Task {
    type Id = TaskId;

    const COLLECTION: &'static str = "tasks";
    const NOUN: &'static str = "task";

    fn id(&self) -> TaskId {
        self.id
    }

    fn draft(&self) -> Draft {
        Draft::from_entity(
            &self.title,
            self.description.as_deref(),
            self.due_date,
            self.assignee.as_deref(),
            self.status,
            self.priority,
        )
    }

    fn scoped_collection(parent: ProjectId) -> Option<String> {
        Some(format!("{}/{parent}/{}", Project::COLLECTION, Self::COLLECTION))
    }

    fn creation_parent(parent: Option<ProjectId>) -> ClientResult<Option<ProjectId>> {
        match parent {
            Some(parent) => Ok(Some(parent)),
            None => Err(ClientError::MissingParent {
                resource: Self::COLLECTION,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tasks_nest_under_projects() {
        assert_eq!(Task::list_path(None).expect("flat"), "tasks");
        assert_eq!(
            Task::list_path(Some(ProjectId(32))).expect("scoped"),
            "projects/32/tasks"
        );
        assert_eq!(Task::item_path(TaskId(7)), "tasks/7");
    }

    #[test]
    fn projects_have_no_parent_scope() {
        assert_eq!(Project::list_path(None).expect("flat"), "projects");
        assert!(matches!(
            Project::list_path(Some(ProjectId(1))),
            Err(ClientError::InvalidScope { resource: "projects" })
        ));
    }

    #[test]
    fn only_tasks_need_a_parent_to_be_created() {
        assert_eq!(Project::creation_parent(None).expect("project"), None);
        assert_eq!(
            Task::creation_parent(Some(ProjectId(3))).expect("task"),
            Some(ProjectId(3))
        );
        assert!(matches!(
            Task::creation_parent(None),
            Err(ClientError::MissingParent { resource: "tasks" })
        ));
    }
}
