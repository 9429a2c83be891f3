//! Menu model: buttons, rows, validation, and keyboard rendering.
//!
//! A [`Menu`] is built once at startup through row appends, validated
//! explicitly, then treated as read-only. `label` is the display text;
//! `callback_data` is the stable identifier the callback registry
//! dispatches on (defaults to the label when not given).

use crate::error::{MenubotError, Result};
use std::collections::HashSet;
use tracing::{debug, warn};

/// A single button: display label plus the callback identifier emitted
/// when it is clicked. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuButton {
    label: String,
    callback_data: String,
}

impl MenuButton {
    /// Creates a button. `callback_data = None` reuses the label as the
    /// identifier. Empty label or identifier is rejected.
    pub fn new(label: impl Into<String>, callback_data: Option<String>) -> Result<Self> {
        let label = label.into();
        if label.is_empty() {
            return Err(MenubotError::InvalidButton("empty label".to_string()));
        }
        let callback_data = match callback_data {
            Some(data) if data.is_empty() => {
                return Err(MenubotError::InvalidButton(format!(
                    "empty callback data for label '{}'",
                    label
                )))
            }
            Some(data) => data,
            None => label.clone(),
        };
        Ok(Self {
            label,
            callback_data,
        })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn callback_data(&self) -> &str {
        &self.callback_data
    }

    /// `(label, callback_data)` pair in the shape the transport renders.
    pub fn as_pair(&self) -> (String, String) {
        (self.label.clone(), self.callback_data.clone())
    }
}

/// Row element accepted by [`Menu::add_row`]: a bare label (identifier
/// defaults to the label), an explicit `(label, callback_data)` pair, or
/// an already-built [`MenuButton`].
#[derive(Debug, Clone)]
pub enum ButtonSpec {
    Label(String),
    Pair(String, String),
    Button(MenuButton),
}

impl ButtonSpec {
    fn into_button(self) -> Result<MenuButton> {
        match self {
            ButtonSpec::Label(label) => MenuButton::new(label, None),
            ButtonSpec::Pair(label, data) => MenuButton::new(label, Some(data)),
            ButtonSpec::Button(button) => Ok(button),
        }
    }
}

impl From<&str> for ButtonSpec {
    fn from(label: &str) -> Self {
        ButtonSpec::Label(label.to_string())
    }
}

impl From<String> for ButtonSpec {
    fn from(label: String) -> Self {
        ButtonSpec::Label(label)
    }
}

impl From<(&str, &str)> for ButtonSpec {
    fn from((label, data): (&str, &str)) -> Self {
        ButtonSpec::Pair(label.to_string(), data.to_string())
    }
}

impl From<(String, String)> for ButtonSpec {
    fn from((label, data): (String, String)) -> Self {
        ButtonSpec::Pair(label, data)
    }
}

impl From<MenuButton> for ButtonSpec {
    fn from(button: MenuButton) -> Self {
        ButtonSpec::Button(button)
    }
}

/// Validated, render-ready button matrix handed to the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keyboard {
    rows: Vec<Vec<(String, String)>>,
}

impl Keyboard {
    pub fn rows(&self) -> &[Vec<(String, String)>] {
        &self.rows
    }
}

/// Menu aggregate: title plus ordered button rows.
#[derive(Debug, Clone)]
pub struct Menu {
    title: String,
    rows: Vec<Vec<MenuButton>>,
    validated: bool,
}

impl Menu {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            rows: Vec::new(),
            validated: false,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Appends a row of buttons. Any row append clears the validated flag;
    /// callers must run [`Menu::validate`] again before first use.
    pub fn add_row<I, B>(&mut self, buttons: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = B>,
        B: Into<ButtonSpec>,
    {
        let mut row = Vec::new();
        for spec in buttons {
            row.push(spec.into().into_button()?);
        }
        debug!(menu = %self.title, buttons = row.len(), "added menu row");
        self.rows.push(row);
        self.validated = false;
        Ok(self)
    }

    /// Appends a single button as its own row.
    pub fn add_button(&mut self, label: &str, callback_data: Option<&str>) -> Result<&mut Self> {
        let button = MenuButton::new(label, callback_data.map(str::to_string))?;
        self.add_row([button])
    }

    /// Checks the structural invariants: non-empty title, at least one
    /// button. Duplicate callback data is allowed but logged, since both
    /// buttons will route to the same handler.
    pub fn validate(&mut self) -> Result<()> {
        self.check_structure()?;
        let mut seen = HashSet::new();
        for button in self.rows.iter().flatten() {
            if !seen.insert(button.callback_data()) {
                warn!(
                    menu = %self.title,
                    callback_data = %button.callback_data(),
                    "duplicate callback data in menu"
                );
            }
        }
        self.validated = true;
        Ok(())
    }

    pub fn is_validated(&self) -> bool {
        self.validated
    }

    /// Row-major `(label, callback_data)` matrix. Pure; no validation.
    pub fn buttons(&self) -> Vec<Vec<(String, String)>> {
        self.rows
            .iter()
            .map(|row| row.iter().map(MenuButton::as_pair).collect())
            .collect()
    }

    /// Renders the keyboard. Rendering a structurally invalid menu fails
    /// with the same errors as [`Menu::validate`].
    pub fn keyboard(&self) -> Result<Keyboard> {
        self.check_structure()?;
        Ok(Keyboard {
            rows: self.buttons(),
        })
    }

    fn check_structure(&self) -> Result<()> {
        if self.title.is_empty() {
            return Err(MenubotError::Structural("menu has no title".to_string()));
        }
        if self.rows.iter().all(|row| row.is_empty()) {
            return Err(MenubotError::Structural("menu has no buttons".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_button_defaults_callback_data_to_label() {
        let button = MenuButton::new("Status", None).unwrap();
        assert_eq!(button.label(), "Status");
        assert_eq!(button.callback_data(), "Status");
    }

    #[test]
    fn test_button_rejects_empty_label() {
        assert!(matches!(
            MenuButton::new("", None),
            Err(MenubotError::InvalidButton(_))
        ));
    }

    #[test]
    fn test_button_rejects_empty_callback_data() {
        assert!(matches!(
            MenuButton::new("Status", Some(String::new())),
            Err(MenubotError::InvalidButton(_))
        ));
    }

    #[test]
    fn test_validate_ok_with_title_and_buttons() {
        let mut menu = Menu::new("Main Menu");
        menu.add_row([("Status", "status"), ("Help", "help")]).unwrap();
        assert!(menu.validate().is_ok());
        assert!(menu.is_validated());
    }

    #[test]
    fn test_validate_fails_without_title() {
        let mut menu = Menu::new("");
        menu.add_row(["Status"]).unwrap();
        match menu.validate() {
            Err(MenubotError::Structural(msg)) => assert_eq!(msg, "menu has no title"),
            other => panic!("expected structural error, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_fails_without_buttons() {
        let mut menu = Menu::new("Main Menu");
        match menu.validate() {
            Err(MenubotError::Structural(msg)) => assert_eq!(msg, "menu has no buttons"),
            other => panic!("expected structural error, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_allows_duplicate_callback_data() {
        let mut menu = Menu::new("Main Menu");
        menu.add_row([("A", "same"), ("B", "same")]).unwrap();
        assert!(menu.validate().is_ok());
    }

    #[test]
    fn test_add_row_clears_validated_flag() {
        let mut menu = Menu::new("Main Menu");
        menu.add_row(["Status"]).unwrap();
        menu.validate().unwrap();
        menu.add_row(["Help"]).unwrap();
        assert!(!menu.is_validated());
    }

    #[test]
    fn test_buttons_row_major_order() {
        let mut menu = Menu::new("Main Menu");
        menu.add_row([("A", "a"), ("B", "b")]).unwrap();
        menu.add_button("C", None).unwrap();
        assert_eq!(
            menu.buttons(),
            vec![
                vec![
                    ("A".to_string(), "a".to_string()),
                    ("B".to_string(), "b".to_string())
                ],
                vec![("C".to_string(), "C".to_string())],
            ]
        );
    }

    #[test]
    fn test_keyboard_fails_on_invalid_menu() {
        let menu = Menu::new("Main Menu");
        assert!(matches!(
            menu.keyboard(),
            Err(MenubotError::Structural(_))
        ));
    }
}
