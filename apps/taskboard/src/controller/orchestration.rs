//! Routes parsed intents to the active view and switches between views.

use std::sync::Arc;

use client_core::{HttpResourceClient, ResourceClient};
use shared::{
    domain::ProjectId,
    protocol::{Project, Task},
};

use crate::{
    controller::view::ResourceView,
    ui::intent::{Intent, HELP},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub enum ActiveView {
    Projects(ResourceView<Project>),
    Tasks(ResourceView<Task>),
}

pub struct Session {
    projects: Arc<dyn ResourceClient<Project>>,
    tasks: Arc<dyn ResourceClient<Task>>,
    active: Option<ActiveView>,
    status: Option<String>,
}

impl Session {
    /// Opens the task list of `project` if given, otherwise the project list.
    pub async fn start(client: Arc<HttpResourceClient>, project: Option<ProjectId>) -> Self {
        let mut session = Self {
            projects: client.clone(),
            tasks: client,
            active: None,
            status: None,
        };
        match project {
            Some(project) => session.open_tasks(Some(project)).await,
            None => session.open_projects().await,
        }
        session
    }

    /// Shows a one-off line (parse errors, hints) above the next screen.
    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = Some(status.into());
    }

    pub async fn dispatch(&mut self, intent: Intent) -> Flow {
        tracing::debug!(?intent, "dispatching intent");
        match intent {
            Intent::Quit => {
                self.close_active().await;
                return Flow::Quit;
            }
            Intent::Help => self.status = Some(HELP.to_string()),
            Intent::OpenProjects => self.open_projects().await,
            Intent::OpenTasks(project) => self.open_tasks(project.map(ProjectId)).await,
            view_intent => {
                self.status = match self.active.as_mut() {
                    Some(ActiveView::Projects(view)) => view.handle(view_intent).await,
                    Some(ActiveView::Tasks(view)) => view.handle(view_intent).await,
                    None => Some("no view is open".into()),
                };
            }
        }
        Flow::Continue
    }

    /// Renders the active view; a pending status line is shown once.
    pub async fn render(&mut self) -> String {
        let screen = match &self.active {
            Some(ActiveView::Projects(view)) => view.render("Projects").await,
            Some(ActiveView::Tasks(view)) => {
                let heading = match view.parent().await {
                    Some(project) => format!("Tasks of project {project}"),
                    None => "Tasks".to_string(),
                };
                view.render(&heading).await
            }
            None => String::new(),
        };
        match self.status.take() {
            Some(status) => format!("{screen}\n\n{status}"),
            None => screen,
        }
    }

    async fn open_projects(&mut self) {
        self.close_active().await;
        let view = ResourceView::open(self.projects.clone(), None).await;
        self.active = Some(ActiveView::Projects(view));
    }

    async fn open_tasks(&mut self, project: Option<ProjectId>) {
        if let Some(ActiveView::Tasks(view)) = self.active.as_mut() {
            view.set_scope(project).await;
            return;
        }
        self.close_active().await;
        let view = ResourceView::open(self.tasks.clone(), project).await;
        self.active = Some(ActiveView::Tasks(view));
    }

    async fn close_active(&mut self) {
        match self.active.take() {
            Some(ActiveView::Projects(view)) => view.close().await,
            Some(ActiveView::Tasks(view)) => view.close().await,
            None => {}
        }
    }
}

#[cfg(test)]
#[path = "../tests/session_tests.rs"]
mod tests;
