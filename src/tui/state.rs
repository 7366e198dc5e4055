//! Selection state machine
//!
//! `LoadingProjects -> SelectProject -> LoadingLayouts -> SelectLayout -> Done`,
//! with cancellation and errors ending the run from any step. The machine
//! never performs I/O itself: [`PickerState::update`] returns an [`Effect`]
//! that the runtime carries out.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::path::PathBuf;

use super::list::{Candidate, FilterList};
use crate::core::Layout;
use crate::utils::path::tildify;
use crate::utils::tui_writer::LogEntry;

const SPINNER_FRAMES: &[&str] = &["⣾", "⣽", "⣻", "⢿", "⡿", "⣟", "⣯", "⣷"];
// Rows taken by title, filter, count, notice and help lines
const PICKER_CHROME_ROWS: u16 = 8;
const MAX_NOTICES: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    LoadingProjects,
    SelectProject,
    LoadingLayouts,
    SelectLayout,
    Done,
}

impl Step {
    pub fn is_loading(&self) -> bool {
        matches!(self, Step::LoadingProjects | Step::LoadingLayouts)
    }
}

/// Everything that can happen to the picker
#[derive(Debug, Clone)]
pub enum PickerEvent {
    Resize(u16, u16),
    Key(KeyEvent),
    Tick,
    ProjectsLoaded(Vec<PathBuf>),
    LayoutsLoaded(Vec<Layout>),
    Error(String),
    Log(LogEntry),
}

/// Side effect requested by a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    None,
    LoadProjects,
    LoadLayouts,
    Exit,
}

/// How a picker run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickerOutcome {
    Selected { project: PathBuf, layout: String },
    Cancelled,
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct ProjectItem {
    pub path: PathBuf,
    pub label: String,
}

impl ProjectItem {
    pub fn new(path: PathBuf) -> Self {
        let label = tildify(&path);
        Self { path, label }
    }
}

impl Candidate for ProjectItem {
    fn label(&self) -> &str {
        &self.label
    }
}

impl Candidate for Layout {
    fn label(&self) -> &str {
        &self.name
    }
}

pub struct PickerState {
    step: Step,
    selected_project: Option<PathBuf>,
    selected_layout: Option<String>,
    error: Option<String>,
    quitting: bool,
    pub projects: FilterList<ProjectItem>,
    pub layouts: FilterList<Layout>,
    default_layout: Option<String>,
    spinner_frame: usize,
    viewport: (u16, u16),
    notices: Vec<LogEntry>,
}

impl PickerState {
    /// Start the machine, skipping the steps whose answer is already known
    pub fn new(
        project: Option<PathBuf>,
        layout: Option<String>,
        default_layout: Option<String>,
    ) -> Self {
        let step = match (&project, &layout) {
            (Some(_), Some(_)) => Step::Done,
            (Some(_), None) => Step::LoadingLayouts,
            (None, _) => Step::LoadingProjects,
        };

        Self {
            step,
            selected_project: project,
            selected_layout: layout,
            error: None,
            quitting: false,
            projects: FilterList::default(),
            layouts: FilterList::default(),
            default_layout: default_layout.filter(|l| !l.is_empty()),
            spinner_frame: 0,
            viewport: (80, 24),
            notices: Vec::new(),
        }
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn selected_project(&self) -> Option<&PathBuf> {
        self.selected_project.as_ref()
    }

    pub fn selected_layout(&self) -> Option<&str> {
        self.selected_layout.as_deref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_quitting(&self) -> bool {
        self.quitting
    }

    pub fn spinner(&self) -> &'static str {
        SPINNER_FRAMES[self.spinner_frame % SPINNER_FRAMES.len()]
    }

    pub fn viewport(&self) -> (u16, u16) {
        self.viewport
    }

    /// Rows moved by PageUp/PageDown
    pub fn page_size(&self) -> usize {
        self.viewport.1.saturating_sub(PICKER_CHROME_ROWS).max(1) as usize
    }

    pub fn notices(&self) -> &[LogEntry] {
        &self.notices
    }

    /// No more events will be processed
    pub fn is_finished(&self) -> bool {
        self.quitting || self.error.is_some() || self.step == Step::Done
    }

    /// Effect to run before the first event
    pub fn initial_effect(&self) -> Effect {
        if self.is_finished() {
            return Effect::Exit;
        }
        match self.step {
            Step::LoadingProjects => Effect::LoadProjects,
            Step::LoadingLayouts => Effect::LoadLayouts,
            _ => Effect::None,
        }
    }

    pub fn outcome(&self) -> PickerOutcome {
        if let Some(error) = &self.error {
            return PickerOutcome::Failed(error.clone());
        }
        match (&self.step, &self.selected_project, &self.selected_layout) {
            (Step::Done, Some(project), Some(layout)) if !self.quitting => {
                PickerOutcome::Selected {
                    project: project.clone(),
                    layout: layout.clone(),
                }
            }
            _ => PickerOutcome::Cancelled,
        }
    }

    pub fn update(&mut self, event: PickerEvent) -> Effect {
        if self.is_finished() {
            // Late discovery results after cancel land here
            return Effect::Exit;
        }

        match event {
            PickerEvent::Resize(width, height) => {
                self.viewport = (width, height);
                Effect::None
            }
            PickerEvent::Tick => {
                if self.step.is_loading() {
                    self.spinner_frame = self.spinner_frame.wrapping_add(1);
                }
                Effect::None
            }
            PickerEvent::Log(entry) => {
                if entry.level.is_notable() {
                    self.notices.push(entry);
                    if self.notices.len() > MAX_NOTICES {
                        self.notices.drain(0..self.notices.len() - MAX_NOTICES);
                    }
                }
                Effect::None
            }
            PickerEvent::Error(message) => self.fail(message),
            PickerEvent::ProjectsLoaded(paths) => {
                if self.step != Step::LoadingProjects {
                    tracing::debug!("Ignoring project list outside of project loading");
                    return Effect::None;
                }
                let mut paths = paths;
                paths.sort();
                paths.dedup();
                self.projects = FilterList::new(paths.into_iter().map(ProjectItem::new).collect());
                self.step = Step::SelectProject;
                Effect::None
            }
            PickerEvent::LayoutsLoaded(layouts) => {
                if self.step != Step::LoadingLayouts {
                    tracing::debug!("Ignoring layout list outside of layout loading");
                    return Effect::None;
                }
                self.layouts = FilterList::new(layouts);
                if let Some(default) = &self.default_layout {
                    self.layouts.select_label(default);
                }
                self.step = Step::SelectLayout;
                Effect::None
            }
            PickerEvent::Key(key) => self.handle_key(key),
        }
    }

    fn fail(&mut self, message: String) -> Effect {
        // First error wins; is_finished() blocks later ones
        tracing::error!("{}", message);
        self.error = Some(message);
        Effect::Exit
    }

    fn handle_key(&mut self, key: KeyEvent) -> Effect {
        if is_cancel(&key) {
            self.quitting = true;
            return Effect::Exit;
        }

        let page = self.page_size();
        match self.step {
            Step::SelectProject => {
                if key.code == KeyCode::Enter {
                    return self.confirm_project();
                }
                edit_list(&mut self.projects, &key, page);
                Effect::None
            }
            Step::SelectLayout => {
                if key.code == KeyCode::Enter {
                    return self.confirm_layout();
                }
                edit_list(&mut self.layouts, &key, page);
                Effect::None
            }
            // Only cancel is honoured while loading
            Step::LoadingProjects | Step::LoadingLayouts | Step::Done => Effect::None,
        }
    }

    fn confirm_project(&mut self) -> Effect {
        let Some(item) = self.projects.selected() else {
            return Effect::None;
        };
        tracing::info!("Selected project {}", item.path.display());
        self.selected_project = Some(item.path.clone());

        if self.selected_layout.is_some() {
            self.step = Step::Done;
            return Effect::Exit;
        }
        self.step = Step::LoadingLayouts;
        Effect::LoadLayouts
    }

    fn confirm_layout(&mut self) -> Effect {
        let Some(layout) = self.layouts.selected() else {
            return Effect::None;
        };
        tracing::info!("Selected layout {}", layout.name);
        self.selected_layout = Some(layout.name.clone());
        self.step = Step::Done;
        Effect::Exit
    }
}

fn is_cancel(key: &KeyEvent) -> bool {
    key.code == KeyCode::Esc
        || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
}

fn edit_list<T: Candidate>(list: &mut FilterList<T>, key: &KeyEvent, page: usize) {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Up => list.move_up(1),
        KeyCode::Down => list.move_down(1),
        KeyCode::Char('p') | KeyCode::Char('k') if ctrl => list.move_up(1),
        KeyCode::Char('n') | KeyCode::Char('j') if ctrl => list.move_down(1),
        KeyCode::Char('u') if ctrl => list.clear_filter(),
        KeyCode::PageUp => list.move_up(page),
        KeyCode::PageDown => list.move_down(page),
        KeyCode::Home => list.move_to_start(),
        KeyCode::End => list.move_to_end(),
        KeyCode::Backspace => list.pop_char(),
        KeyCode::Char(c) if !ctrl && !key.modifiers.contains(KeyModifiers::ALT) => {
            list.push_char(c)
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> PickerEvent {
        PickerEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn ctrl(c: char) -> PickerEvent {
        PickerEvent::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL))
    }

    fn layout(name: &str) -> Layout {
        Layout {
            name: name.to_string(),
            path: PathBuf::from("/layouts").join(name),
        }
    }

    fn projects() -> PickerEvent {
        PickerEvent::ProjectsLoaded(vec![
            PathBuf::from("/code/zeta"),
            PathBuf::from("/code/alpha"),
            PathBuf::from("/code/alpha"),
        ])
    }

    #[test]
    fn test_fresh_start_loads_projects() {
        let state = PickerState::new(None, None, None);
        assert_eq!(state.step(), Step::LoadingProjects);
        assert_eq!(state.initial_effect(), Effect::LoadProjects);
    }

    #[test]
    fn test_projects_loaded_are_sorted_and_deduped() {
        let mut state = PickerState::new(None, None, None);
        assert_eq!(state.update(projects()), Effect::None);
        assert_eq!(state.step(), Step::SelectProject);
        let paths: Vec<&PathBuf> = state.projects.items().iter().map(|p| &p.path).collect();
        assert_eq!(paths, vec![&PathBuf::from("/code/alpha"), &PathBuf::from("/code/zeta")]);
    }

    #[test]
    fn test_keys_other_than_cancel_ignored_while_loading() {
        let mut state = PickerState::new(None, None, None);
        assert_eq!(state.update(key(KeyCode::Enter)), Effect::None);
        assert_eq!(state.update(key(KeyCode::Char('x'))), Effect::None);
        assert_eq!(state.step(), Step::LoadingProjects);
        assert_eq!(state.update(key(KeyCode::Esc)), Effect::Exit);
        assert!(state.is_quitting());
    }

    #[test]
    fn test_full_walk() {
        let mut state = PickerState::new(None, None, Some("shell".to_string()));
        state.update(projects());
        assert_eq!(state.update(key(KeyCode::Down)), Effect::None);
        assert_eq!(state.update(key(KeyCode::Enter)), Effect::LoadLayouts);
        assert_eq!(state.step(), Step::LoadingLayouts);
        assert_eq!(state.selected_project(), Some(&PathBuf::from("/code/zeta")));

        state.update(PickerEvent::LayoutsLoaded(vec![layout("editor"), layout("shell")]));
        assert_eq!(state.step(), Step::SelectLayout);
        // Default layout is pre-highlighted
        assert_eq!(state.layouts.selected().map(|l| l.name.as_str()), Some("shell"));

        assert_eq!(state.update(key(KeyCode::Enter)), Effect::Exit);
        assert_eq!(state.step(), Step::Done);
        assert_eq!(
            state.outcome(),
            PickerOutcome::Selected {
                project: PathBuf::from("/code/zeta"),
                layout: "shell".to_string()
            }
        );
    }

    #[test]
    fn test_confirm_uses_filtered_row() {
        let mut state = PickerState::new(None, None, None);
        state.update(projects());
        for c in "zet".chars() {
            state.update(key(KeyCode::Char(c)));
        }
        state.update(key(KeyCode::Enter));
        assert_eq!(state.selected_project(), Some(&PathBuf::from("/code/zeta")));
    }

    #[test]
    fn test_confirm_with_no_match_does_nothing() {
        let mut state = PickerState::new(None, None, None);
        state.update(projects());
        state.update(key(KeyCode::Char('q')));
        state.update(key(KeyCode::Char('q')));
        assert_eq!(state.update(key(KeyCode::Enter)), Effect::None);
        assert_eq!(state.step(), Step::SelectProject);
        assert_eq!(state.selected_project(), None);
    }

    #[test]
    fn test_preselected_project_starts_at_layouts() {
        let state = PickerState::new(Some(PathBuf::from("/code/app")), None, None);
        assert_eq!(state.step(), Step::LoadingLayouts);
        assert_eq!(state.initial_effect(), Effect::LoadLayouts);
    }

    #[test]
    fn test_preselected_both_is_done_immediately() {
        let state = PickerState::new(
            Some(PathBuf::from("/code/app")),
            Some("shell".to_string()),
            None,
        );
        assert_eq!(state.step(), Step::Done);
        assert_eq!(state.initial_effect(), Effect::Exit);
        assert!(matches!(state.outcome(), PickerOutcome::Selected { .. }));
    }

    #[test]
    fn test_preselected_layout_skips_layout_picker() {
        let mut state = PickerState::new(None, Some("shell".to_string()), None);
        state.update(projects());
        assert_eq!(state.update(key(KeyCode::Enter)), Effect::Exit);
        assert_eq!(
            state.outcome(),
            PickerOutcome::Selected {
                project: PathBuf::from("/code/alpha"),
                layout: "shell".to_string()
            }
        );
    }

    #[test]
    fn test_cancel_keeps_partial_selection() {
        let mut state = PickerState::new(None, None, None);
        state.update(projects());
        state.update(key(KeyCode::Enter));
        state.update(PickerEvent::LayoutsLoaded(vec![layout("editor")]));
        assert_eq!(state.update(ctrl('c')), Effect::Exit);

        assert!(state.is_quitting());
        assert_eq!(state.selected_project(), Some(&PathBuf::from("/code/alpha")));
        assert_eq!(state.selected_layout(), None);
        assert_eq!(state.outcome(), PickerOutcome::Cancelled);
    }

    #[test]
    fn test_late_result_after_cancel_is_ignored() {
        let mut state = PickerState::new(None, None, None);
        state.update(key(KeyCode::Esc));
        assert_eq!(state.update(projects()), Effect::Exit);
        assert_eq!(state.step(), Step::LoadingProjects);
        assert!(state.projects.items().is_empty());
    }

    #[test]
    fn test_first_error_wins() {
        let mut state = PickerState::new(None, None, None);
        assert_eq!(state.update(PickerEvent::Error("first".to_string())), Effect::Exit);
        state.update(PickerEvent::Error("second".to_string()));
        assert_eq!(state.error(), Some("first"));
        assert_eq!(state.outcome(), PickerOutcome::Failed("first".to_string()));
    }

    #[test]
    fn test_mismatched_result_is_ignored() {
        let mut state = PickerState::new(None, None, None);
        state.update(PickerEvent::LayoutsLoaded(vec![layout("editor")]));
        assert_eq!(state.step(), Step::LoadingProjects);
    }

    #[test]
    fn test_tick_animates_only_while_loading() {
        let mut state = PickerState::new(None, None, None);
        let first = state.spinner();
        state.update(PickerEvent::Tick);
        assert_ne!(state.spinner(), first);

        state.update(projects());
        let frame = state.spinner();
        state.update(PickerEvent::Tick);
        assert_eq!(state.spinner(), frame);
    }

    #[test]
    fn test_page_moves_follow_viewport() {
        let mut state = PickerState::new(None, None, None);
        state.update(PickerEvent::Resize(80, 12));
        assert_eq!(state.page_size(), 4);
        let paths = (0..20).map(|i| PathBuf::from(format!("/code/p{:02}", i))).collect();
        state.update(PickerEvent::ProjectsLoaded(paths));

        state.update(key(KeyCode::PageDown));
        assert_eq!(state.projects.cursor(), 4);
        state.update(key(KeyCode::End));
        assert_eq!(state.projects.cursor(), 19);
        state.update(key(KeyCode::PageUp));
        assert_eq!(state.projects.cursor(), 15);
    }

    #[test]
    fn test_ctrl_u_clears_filter() {
        let mut state = PickerState::new(None, None, None);
        state.update(projects());
        state.update(key(KeyCode::Char('z')));
        assert_eq!(state.projects.visible_len(), 1);
        state.update(ctrl('u'));
        assert_eq!(state.projects.filter(), "");
        assert_eq!(state.projects.visible_len(), 2);
    }
}
