use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickerAction {
    None,
    Cancel,
    Confirm,
}

/// Modal list of known project names.
pub struct ProjectPicker {
    options: Vec<String>,
    selected: usize,
}

impl ProjectPicker {
    pub fn new(options: Vec<String>, current: Option<&str>) -> Self {
        let selected = current
            .and_then(|current| options.iter().position(|option| option == current))
            .unwrap_or(0);
        Self { options, selected }
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn selected_project(&self) -> Option<&str> {
        self.options.get(self.selected).map(String::as_str)
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> PickerAction {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => return PickerAction::Cancel,
            KeyCode::Enter => return PickerAction::Confirm,
            KeyCode::Down | KeyCode::Char('j') => self.move_selection(1),
            KeyCode::Up | KeyCode::Char('k') => self.move_selection(-1),
            _ => {}
        }
        PickerAction::None
    }

    fn move_selection(&mut self, delta: isize) {
        let len = self.options.len() as isize;
        if len == 0 {
            self.selected = 0;
            return;
        }
        let next = (self.selected as isize + delta).rem_euclid(len);
        self.selected = next as usize;
    }
}

/// Single-line text input for the title search.
#[derive(Default)]
pub struct SearchPrompt {
    value: String,
}

impl SearchPrompt {
    pub fn new(current: Option<&str>) -> Self {
        Self {
            value: current.unwrap_or_default().to_string(),
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> PickerAction {
        match key.code {
            KeyCode::Esc => return PickerAction::Cancel,
            KeyCode::Enter => return PickerAction::Confirm,
            KeyCode::Backspace => {
                self.value.pop();
            }
            KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.value.clear();
            }
            KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.value.push(ch);
            }
            _ => {}
        }
        PickerAction::None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn project_picker_starts_on_current_and_wraps() {
        let mut picker = ProjectPicker::new(
            vec!["acme".to_string(), "zeta".to_string()],
            Some("zeta"),
        );
        assert_eq!(picker.selected_project(), Some("zeta"));

        assert_eq!(picker.handle_key(key(KeyCode::Char('j'))), PickerAction::None);
        assert_eq!(picker.selected_project(), Some("acme"));
        assert_eq!(picker.handle_key(key(KeyCode::Enter)), PickerAction::Confirm);
    }

    #[test]
    fn empty_project_picker_has_no_selection() {
        let mut picker = ProjectPicker::new(Vec::new(), None);
        picker.handle_key(key(KeyCode::Down));
        assert_eq!(picker.selected_project(), None);
    }

    #[test]
    fn search_prompt_edits_text() {
        let mut prompt = SearchPrompt::new(None);
        for ch in "milkx".chars() {
            prompt.handle_key(key(KeyCode::Char(ch)));
        }
        prompt.handle_key(key(KeyCode::Backspace));
        assert_eq!(prompt.value(), "milk");
        assert_eq!(prompt.handle_key(key(KeyCode::Esc)), PickerAction::Cancel);

        prompt.handle_key(KeyEvent::new(KeyCode::Char('u'), KeyModifiers::CONTROL));
        assert_eq!(prompt.value(), "");
    }
}
