use crate::{error::Level, orchestrator::Orchestrator};
use crossterm::event::KeyCode;

/// Which cascade list has keyboard focus.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Panel {
    Zipcode,
    Road,
    Address,
}

impl Panel {
    fn level(self) -> Level {
        match self {
            Panel::Zipcode => Level::Zipcode,
            Panel::Road => Level::Road,
            Panel::Address => Level::Address,
        }
    }
}

pub struct AppState {
    pub session: Orchestrator,
    pub active_panel: Panel,
    /// Cursor per panel: zipcode, road, address.
    pub cursors: [usize; 3],
    pub status: String,
}

impl AppState {
    pub const HELP_TEXT: &'static str = "\
↑/↓: move in list
Enter: select
Tab / →: next level
Esc / Backspace / ←: clear and go back
q: quit";

    pub fn new(session: Orchestrator) -> Self {
        Self {
            session,
            active_panel: Panel::Zipcode,
            cursors: [0; 3],
            status: "Choose a zipcode".into(),
        }
    }

    fn options(&self, panel: Panel) -> &[String] {
        let model = self.session.render_model();
        match panel {
            Panel::Zipcode => &model.zipcode_options,
            Panel::Road => &model.road_options,
            Panel::Address => &model.address_options,
        }
    }

    pub fn cursor(&self, panel: Panel) -> usize {
        self.cursors[panel as usize]
    }

    /// Runs one queued fetch; called once per UI tick.
    pub fn tick(&mut self) {
        if self.session.run_next() {
            self.clamp_cursors();
        }
    }

    fn clamp_cursors(&mut self) {
        for panel in [Panel::Zipcode, Panel::Road, Panel::Address] {
            let len = self.options(panel).len();
            let cursor = &mut self.cursors[panel as usize];
            *cursor = (*cursor).min(len.saturating_sub(1));
        }
    }

    /// Returns true when the user asked to quit.
    pub fn handle_input(&mut self, key: KeyCode) -> bool {
        use KeyCode::*;
        match key {
            Char('q') => return true,
            Up => {
                let cursor = &mut self.cursors[self.active_panel as usize];
                *cursor = cursor.saturating_sub(1);
            }
            Down => {
                let len = self.options(self.active_panel).len();
                let cursor = &mut self.cursors[self.active_panel as usize];
                if *cursor + 1 < len {
                    *cursor += 1;
                }
            }
            Enter => self.select_at_cursor(),
            Tab | Right => {
                let model = self.session.render_model();
                self.active_panel = match self.active_panel {
                    Panel::Zipcode if model.zipcode.is_some() => Panel::Road,
                    Panel::Road if model.road.is_some() => Panel::Address,
                    other => other,
                };
            }
            Backspace | Esc | Left => self.clear_and_go_up(),
            _ => {}
        }
        false
    }

    fn select_at_cursor(&mut self) {
        let panel = self.active_panel;
        let Some(choice) = self.options(panel).get(self.cursor(panel)).cloned() else {
            return;
        };
        let result = match panel {
            Panel::Zipcode => self.session.select_zipcode(Some(&choice)),
            Panel::Road => self.session.select_road(Some(&choice)),
            Panel::Address => self.session.select_address(Some(&choice)),
        };
        match result {
            Ok(()) => {
                self.status = format!("{} {choice} selected", panel.level());
                // Everything below was invalidated; follow the cascade down.
                match panel {
                    Panel::Zipcode => {
                        self.cursors[1] = 0;
                        self.cursors[2] = 0;
                        self.active_panel = Panel::Road;
                    }
                    Panel::Road => {
                        self.cursors[2] = 0;
                        self.active_panel = Panel::Address;
                    }
                    Panel::Address => {}
                }
            }
            Err(e) => {
                tracing::warn!("selection rejected: {e}");
                self.status = e.to_string();
            }
        }
    }

    fn clear_and_go_up(&mut self) {
        let result = match self.active_panel {
            Panel::Zipcode => self.session.select_zipcode(None),
            Panel::Road => self.session.select_road(None),
            Panel::Address => self.session.select_address(None),
        };
        if let Err(e) = result {
            tracing::warn!("clear rejected: {e}");
        }
        self.active_panel = match self.active_panel {
            Panel::Address => Panel::Road,
            Panel::Road | Panel::Zipcode => Panel::Zipcode,
        };
        self.clamp_cursors();
    }
}
