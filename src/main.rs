use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use timeboard::board::ItemFilter;
use timeboard::config::EditorConfig;
use timeboard::editor::Editor;
use timeboard::geometry::Point;
use timeboard::models::{normalize_hex_color, NodeId};
use timeboard::persistence::ProjectFile;
use timeboard::tree_render::render_board;

#[derive(Parser)]
#[command(name = "timeboard")]
#[command(about = "Branching timeline boards on the command line")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new project with one empty time line
    New {
        /// Project name (defaults to the configured name)
        name: Option<String>,

        /// Directory to write the project file to
        #[arg(short, long, default_value = ".")]
        dir: PathBuf,
    },
    /// Print the branch tree of a project
    Show { file: PathBuf },
    /// Load a project and check its structure
    Validate { file: PathBuf },
    /// List items by color or category, one group per root time line
    Find {
        file: PathBuf,

        /// Match the item's own color
        #[arg(long, conflicts_with = "category", required_unless_present = "category")]
        color: Option<String>,

        /// Match items tagged with this category color
        #[arg(long)]
        category: Option<String>,
    },
    /// List the project's named colors alphabetically
    Colors { file: PathBuf },
    /// Add a time line and save the project in place
    AddTimeline {
        file: PathBuf,

        #[arg(long, requires = "y")]
        x: Option<f64>,

        #[arg(long, requires = "x")]
        y: Option<f64>,

        /// Title of the new time line's first item
        #[arg(short, long)]
        title: Option<String>,
    },
    /// Branch off a new time line next to an item and save in place
    Branch {
        file: PathBuf,

        /// Id of the item to branch from
        item: String,

        /// Insert the branch above the item instead of below
        #[arg(long)]
        above: bool,
    },
}

/// Initialize tracing with output to stderr so stdout stays clean for results
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "timeboard=info".into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn open_editor(path: &Path) -> anyhow::Result<Editor> {
    let mut editor = Editor::new(EditorConfig::load());
    editor
        .open(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;
    Ok(editor)
}

fn save_in_place(editor: &Editor, path: &Path) -> anyhow::Result<()> {
    editor
        .project_file()
        .write(path)
        .with_context(|| format!("Failed to write {}", path.display()))
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    match cli.command {
        Commands::New { name, dir } => {
            let mut editor = Editor::new(EditorConfig::load());
            if let Some(name) = name {
                editor.set_project_name(&name);
            }
            editor.board.create_item()?;

            let path = editor
                .save(&dir)
                .with_context(|| format!("Failed to save project to {}", dir.display()))?;
            println!("{}", path.display());
        }
        Commands::Show { file } => {
            let project = ProjectFile::read(&file)
                .with_context(|| format!("Failed to open {}", file.display()))?;
            let mut editor = Editor::new(EditorConfig::load());
            editor.open_file(&project)?;

            println!("{}", editor.project_name());
            if let Some(created) = project.created_at() {
                println!("saved {}", created.format("%Y-%m-%d %H:%M UTC"));
            }
            println!();
            print!("{}", render_board(&editor.board));
        }
        Commands::Validate { file } => {
            let editor = open_editor(&file)?;
            editor
                .board
                .check_invariants()
                .context("Loaded board is inconsistent")?;

            let items: usize = editor.board.time_lines().map(|line| line.items().count()).sum();
            println!(
                "ok: {} time lines ({} roots), {} items",
                editor.board.len(),
                editor.board.roots().count(),
                items
            );
        }
        Commands::Find {
            file,
            color,
            category,
        } => {
            let editor = open_editor(&file)?;
            let filter = match (color, category) {
                (Some(color), _) => ItemFilter::Color(normalize_hex_color(&color)),
                (None, Some(category)) => ItemFilter::Category(normalize_hex_color(&category)),
                (None, None) => anyhow::bail!("Either --color or --category is required"),
            };

            for (i, group) in editor.board.item_groups(&filter).iter().enumerate() {
                if i > 0 {
                    println!();
                }
                for item in group {
                    println!("{}\t{}", item.id, item.title.as_deref().unwrap_or("(untitled)"));
                }
            }
        }
        Commands::Colors { file } => {
            let editor = open_editor(&file)?;
            for entry in editor.colors.alphabetically() {
                let name = if entry.name.is_empty() { "NA" } else { entry.name.as_str() };
                println!("{}\t{}", entry.color, name);
            }
        }
        Commands::AddTimeline { file, x, y, title } => {
            let mut editor = open_editor(&file)?;
            let id = match (x, y) {
                (Some(x), Some(y)) => {
                    let pos = editor.board.grid().snap(Point::new(x, y));
                    editor.board.create_item_at(pos)?
                }
                _ => editor.board.create_item()?,
            };

            if let Some(title) = title {
                let first = editor
                    .board
                    .time_line(&id)?
                    .nodes()
                    .next()
                    .map(|node| node.id().clone())
                    .context("New time line has no items")?;
                editor.board.edit_item(&first, |item| item.set_title(Some(title)))?;
            }

            save_in_place(&editor, &file)?;
            println!("{}", id);
        }
        Commands::Branch { file, item, above } => {
            let mut editor = open_editor(&file)?;
            let item = NodeId::from(item);
            let child = if above {
                editor.board.branch_above(&item)?
            } else {
                editor.board.branch_below(&item)?
            };

            save_in_place(&editor, &file)?;
            println!("{}", child);
        }
    }

    Ok(())
}
