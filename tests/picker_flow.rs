#[cfg(test)]
mod tests {
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use muxpick::tui::{run_picker, Discovery, Effect, PickerEvent, PickerOutcome, PickerState, Step};
    use muxpick::{LayoutStore, ProjectFinder};
    use std::path::PathBuf;
    use tokio::sync::mpsc;

    fn press(code: KeyCode) -> PickerEvent {
        PickerEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn unreachable_discovery() -> Discovery {
        Discovery {
            finder: ProjectFinder::new(vec![], vec![]).with_tool(None),
            layouts: LayoutStore::new("/nonexistent/muxpick/layouts"),
        }
    }

    #[tokio::test]
    async fn preselected_run_skips_terminal_and_discovery() {
        let (_tx, log_rx) = mpsc::unbounded_channel();
        let state = PickerState::new(
            Some(PathBuf::from("/code/app")),
            Some("shell".to_string()),
            None,
        );

        // Would fail without a tty if a frame were drawn
        let outcome = run_picker(state, &unreachable_discovery(), log_rx)
            .await
            .unwrap();
        assert_eq!(
            outcome,
            PickerOutcome::Selected {
                project: PathBuf::from("/code/app"),
                layout: "shell".to_string()
            }
        );
    }

    #[tokio::test]
    async fn dispatch_delivers_one_event_per_discovery() {
        let temp = tempfile::TempDir::new().unwrap();
        let discovery = Discovery {
            finder: ProjectFinder::new(vec![], vec![]).with_tool(None),
            layouts: LayoutStore::new(temp.path()),
        };
        let (tx, mut rx) = mpsc::unbounded_channel();

        discovery.dispatch(Effect::LoadLayouts, &tx);
        assert!(matches!(rx.recv().await, Some(PickerEvent::LayoutsLoaded(l)) if l.is_empty()));

        discovery.dispatch(Effect::LoadProjects, &tx);
        assert!(matches!(rx.recv().await, Some(PickerEvent::Error(_))));

        discovery.dispatch(Effect::None, &tx);
        discovery.dispatch(Effect::Exit, &tx);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn unreadable_layout_dir_fails_the_run() {
        let temp = tempfile::TempDir::new().unwrap();
        let not_a_dir = temp.path().join("layouts");
        std::fs::write(&not_a_dir, "").unwrap();
        let discovery = Discovery {
            finder: ProjectFinder::new(vec![], vec![]).with_tool(None),
            layouts: LayoutStore::new(&not_a_dir),
        };
        let (tx, mut rx) = mpsc::unbounded_channel();

        let mut state = PickerState::new(Some(PathBuf::from("/code/app")), None, None);
        discovery.dispatch(state.initial_effect(), &tx);
        let event = rx.recv().await.unwrap();
        assert!(matches!(&event, PickerEvent::Error(msg) if msg.contains("layouts")));

        assert_eq!(state.update(event), Effect::Exit);
        assert!(matches!(state.outcome(), PickerOutcome::Failed(_)));
    }

    #[test]
    fn forward_only_walk_through_every_step() {
        let mut state = PickerState::new(None, None, None);
        let mut steps = vec![state.step()];

        state.update(PickerEvent::ProjectsLoaded(vec![PathBuf::from("/code/app")]));
        steps.push(state.step());
        assert_eq!(state.update(press(KeyCode::Enter)), Effect::LoadLayouts);
        steps.push(state.step());
        state.update(PickerEvent::LayoutsLoaded(vec![muxpick::Layout {
            name: "shell".to_string(),
            path: PathBuf::from("/layouts/shell"),
        }]));
        steps.push(state.step());
        assert_eq!(state.update(press(KeyCode::Enter)), Effect::Exit);
        steps.push(state.step());

        assert_eq!(
            steps,
            vec![
                Step::LoadingProjects,
                Step::SelectProject,
                Step::LoadingLayouts,
                Step::SelectLayout,
                Step::Done
            ]
        );
        assert!(state.selected_project().is_some() && state.selected_layout().is_some());
    }

    #[test]
    fn cancel_from_every_interactive_step() {
        let setups: Vec<Box<dyn Fn(&mut PickerState)>> = vec![
            Box::new(|_: &mut PickerState| {}),
            Box::new(|s: &mut PickerState| {
                s.update(PickerEvent::ProjectsLoaded(vec![PathBuf::from("/code/app")]));
            }),
            Box::new(|s: &mut PickerState| {
                s.update(PickerEvent::ProjectsLoaded(vec![PathBuf::from("/code/app")]));
                s.update(press(KeyCode::Enter));
            }),
        ];

        for setup in setups {
            for cancel in [
                press(KeyCode::Esc),
                PickerEvent::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            ] {
                let mut state = PickerState::new(None, None, None);
                setup(&mut state);
                let project_before = state.selected_project().cloned();

                assert_eq!(state.update(cancel), Effect::Exit);
                assert!(state.is_quitting());
                assert_eq!(state.selected_project().cloned(), project_before);
                assert_eq!(state.selected_layout(), None);
                assert_eq!(state.outcome(), PickerOutcome::Cancelled);
            }
        }
    }
}
