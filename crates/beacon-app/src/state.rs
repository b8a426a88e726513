// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::time::Duration;

use crate::{ListEndpoint, ViewOptions};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
    Nav,
    Edit,
    Detail,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListViewSpec {
    pub label: String,
    pub endpoint: ListEndpoint,
    pub refresh_interval: Duration,
    pub time_field: Option<String>,
    pub filter_fields: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormViewSpec {
    pub label: String,
    pub schema_url: String,
    pub submit_url: String,
    pub values_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewSpec {
    List(ListViewSpec),
    Form(FormViewSpec),
}

impl ViewSpec {
    pub fn label(&self) -> &str {
        match self {
            Self::List(spec) => &spec.label,
            Self::Form(spec) => &spec.label,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    pub mode: AppMode,
    pub views: Vec<ViewSpec>,
    pub active_view: usize,
    pub options: ViewOptions,
    pub status_line: Option<String>,
}

impl AppState {
    pub fn new(views: Vec<ViewSpec>, options: ViewOptions) -> Self {
        Self {
            mode: AppMode::Nav,
            views,
            active_view: 0,
            options,
            status_line: None,
        }
    }

    pub fn active(&self) -> Option<&ViewSpec> {
        self.views.get(self.active_view)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    NextView,
    PrevView,
    EnterEditMode,
    OpenDetail,
    ExitToNav,
    SetStatus(String),
    ClearStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    ModeChanged(AppMode),
    ViewChanged { from: usize, to: usize },
    StatusUpdated(String),
    StatusCleared,
}

impl AppState {
    pub fn dispatch(&mut self, command: AppCommand) -> Vec<AppEvent> {
        match command {
            AppCommand::NextView => self.rotate_view(1),
            AppCommand::PrevView => self.rotate_view(-1),
            AppCommand::EnterEditMode => {
                self.mode = AppMode::Edit;
                vec![AppEvent::ModeChanged(self.mode)]
            }
            AppCommand::OpenDetail => {
                self.mode = AppMode::Detail;
                vec![AppEvent::ModeChanged(self.mode)]
            }
            AppCommand::ExitToNav => {
                self.mode = AppMode::Nav;
                vec![AppEvent::ModeChanged(self.mode)]
            }
            AppCommand::SetStatus(message) => {
                self.status_line = Some(message.clone());
                vec![AppEvent::StatusUpdated(message)]
            }
            AppCommand::ClearStatus => {
                self.status_line = None;
                vec![AppEvent::StatusCleared]
            }
        }
    }

    fn rotate_view(&mut self, delta: isize) -> Vec<AppEvent> {
        if self.views.is_empty() {
            return Vec::new();
        }
        let len = self.views.len() as isize;
        let from = self.active_view;
        let to = (from as isize + delta).rem_euclid(len) as usize;
        self.active_view = to;
        self.mode = AppMode::Nav;
        vec![AppEvent::ViewChanged { from, to }]
    }
}

#[cfg(test)]
mod tests {
    use super::{AppCommand, AppEvent, AppMode, AppState, FormViewSpec, ListViewSpec, ViewSpec};
    use crate::{ListEndpoint, ViewOptions};
    use std::time::Duration;

    fn views() -> Vec<ViewSpec> {
        vec![
            ViewSpec::List(ListViewSpec {
                label: "Profiles".to_owned(),
                endpoint: ListEndpoint::new("/profiles"),
                refresh_interval: Duration::ZERO,
                time_field: None,
                filter_fields: Vec::new(),
            }),
            ViewSpec::Form(FormViewSpec {
                label: "Plugin".to_owned(),
                schema_url: "/plugin/form".to_owned(),
                submit_url: "/plugin/config".to_owned(),
                values_url: None,
            }),
        ]
    }

    #[test]
    fn view_rotation_wraps_and_returns_to_nav() {
        let mut state = AppState::new(views(), ViewOptions::default());
        state.dispatch(AppCommand::EnterEditMode);

        let events = state.dispatch(AppCommand::NextView);
        assert_eq!(events, vec![AppEvent::ViewChanged { from: 0, to: 1 }]);
        assert_eq!(state.mode, AppMode::Nav);

        state.dispatch(AppCommand::NextView);
        assert_eq!(state.active_view, 0);

        state.dispatch(AppCommand::PrevView);
        assert_eq!(state.active().map(ViewSpec::label), Some("Plugin"));
    }

    #[test]
    fn rotation_without_views_is_a_no_op() {
        let mut state = AppState::new(Vec::new(), ViewOptions::default());
        assert!(state.dispatch(AppCommand::NextView).is_empty());
        assert!(state.active().is_none());
    }

    #[test]
    fn status_set_and_clear() {
        let mut state = AppState::new(views(), ViewOptions::default());
        let events = state.dispatch(AppCommand::SetStatus("saved".to_owned()));
        assert_eq!(events, vec![AppEvent::StatusUpdated("saved".to_owned())]);
        assert_eq!(state.status_line.as_deref(), Some("saved"));

        state.dispatch(AppCommand::ClearStatus);
        assert!(state.status_line.is_none());
    }

    #[test]
    fn detail_mode_transitions() {
        let mut state = AppState::new(views(), ViewOptions::default());
        state.dispatch(AppCommand::OpenDetail);
        assert_eq!(state.mode, AppMode::Detail);
        state.dispatch(AppCommand::ExitToNav);
        assert_eq!(state.mode, AppMode::Nav);
    }
}
