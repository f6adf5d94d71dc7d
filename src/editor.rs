//! The editing session: one open document plus the dialogs acting on it.

use std::path::{Path, PathBuf};

use crate::board::TimeBoard;
use crate::config::EditorConfig;
use crate::error::{BoardError, BoardResult};
use crate::models::{parse_hex_color, ColorTable, NodeId};
use crate::persistence::{LoadError, ProjectFile};
use crate::prompt::{Prompt, PromptRequest, PromptResult};

/// Answer of the color dialog: a color and, optionally, a name to file it
/// under in the project's color table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorChoice {
    pub color: String,
    pub name: Option<String>,
}

impl ColorChoice {
    pub fn new(color: impl Into<String>) -> Self {
        Self {
            color: color.into(),
            name: None,
        }
    }

    pub fn named(color: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            color: color.into(),
            name: Some(name.into()),
        }
    }
}

#[derive(Debug)]
pub struct Editor {
    pub board: TimeBoard,
    pub colors: ColorTable,
    project_name: String,
    config: EditorConfig,
    color_dialog: Prompt<ColorChoice>,
    category_dialog: Prompt<Vec<String>>,
}

impl Editor {
    pub fn new(config: EditorConfig) -> Self {
        Self {
            board: TimeBoard::new(config.grid()),
            colors: ColorTable::new(),
            project_name: config.default_project_name.clone(),
            config,
            color_dialog: Prompt::new("color"),
            category_dialog: Prompt::new("category"),
        }
    }

    pub fn project_name(&self) -> &str {
        &self.project_name
    }

    /// A blank name falls back to the configured default.
    pub fn set_project_name(&mut self, name: &str) {
        let name = name.trim();
        self.project_name = if name.is_empty() {
            self.config.default_project_name.clone()
        } else {
            name.to_string()
        };
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn set_grid_size(&mut self, size: f64) {
        self.config.grid_size = size;
        self.board.set_grid_size(size);
    }

    /// Snapshot the open document.
    pub fn project_file(&self) -> ProjectFile {
        ProjectFile::capture(&self.project_name, &self.board, &self.colors)
    }

    /// Write the document into `dir` under its safe file name.
    pub fn save(&self, dir: &Path) -> std::io::Result<PathBuf> {
        let file = self.project_file();
        let path = dir.join(file.file_name());
        file.write(&path)?;

        tracing::info!("Saved project {:?} to {}", self.project_name, path.display());
        Ok(path)
    }

    /// Replace the document with the project stored at `path`. On failure
    /// the error is logged and the current document stays open.
    pub fn open(&mut self, path: &Path) -> Result<(), LoadError> {
        match ProjectFile::read(path).and_then(|file| self.open_file(&file)) {
            Ok(()) => Ok(()),
            Err(e) => {
                tracing::error!("Could not open project file {}: {}", path.display(), e);
                Err(e)
            }
        }
    }

    /// Replace the document with an already parsed project file.
    pub fn open_file(&mut self, file: &ProjectFile) -> Result<(), LoadError> {
        let (board, colors) = file.restore(self.config.grid())?;

        self.color_dialog.cancel();
        self.category_dialog.cancel();
        self.board = board;
        self.colors = colors;
        self.project_name = file.name.clone();
        Ok(())
    }

    // ============================================================
    // Dialogs
    // ============================================================

    pub fn request_color(&mut self) -> PromptRequest<ColorChoice> {
        self.color_dialog.open()
    }

    pub fn request_categories(&mut self) -> PromptRequest<Vec<String>> {
        self.category_dialog.open()
    }

    pub fn color_dialog(&mut self) -> &mut Prompt<ColorChoice> {
        &mut self.color_dialog
    }

    pub fn category_dialog(&mut self) -> &mut Prompt<Vec<String>> {
        &mut self.category_dialog
    }

    /// Apply a color dialog answer to an item. A named choice is recorded in
    /// the color table. Returns whether anything changed.
    pub fn apply_color_choice(&mut self, item: &NodeId, result: PromptResult<ColorChoice>) -> BoardResult<bool> {
        let Some(choice) = result.value() else {
            return Ok(false);
        };

        let color = parse_hex_color(&choice.color)
            .ok_or_else(|| BoardError::InvalidColor(choice.color.clone()))?;
        self.board.set_item_color(item, Some(color.clone()))?;
        if choice.name.is_some() || !self.colors.contains(&color) {
            self.colors.set(&color, choice.name.as_deref());
        }
        Ok(true)
    }

    /// Apply a category dialog answer to an item. Returns whether anything
    /// changed.
    pub fn apply_category_choice(&mut self, item: &NodeId, result: PromptResult<Vec<String>>) -> BoardResult<bool> {
        let Some(categories) = result.value() else {
            return Ok(false);
        };

        let categories = categories
            .iter()
            .map(|c| parse_hex_color(c).ok_or_else(|| BoardError::InvalidColor(c.clone())))
            .collect::<BoardResult<Vec<_>>>()?;
        self.board.edit_item(item, |item| item.set_categories(categories))?;
        Ok(true)
    }
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}
