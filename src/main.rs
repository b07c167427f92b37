use anyhow::{Context, Result, anyhow, bail};
use clap::{ArgAction, Parser};
use flowframtk::actions::{
    CATEGORY_COUNT, ConstructionFlags, EditFlags, SelectionCategory, SelectionFlags, Tool,
};
use flowframtk::actions::{ActionRegistry, EditorState, Selection};
use flowframtk::messages::{LogSink, MessageSink};
use flowframtk::settings::probe::find_executable;
use flowframtk::settings::{ConfigDir, Profile};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "flowframtk")]
#[command(version, about = "Settings and command state tool for the FlowframTk editor")]
struct Cli {
    /// Configuration directory (defaults to the platform config dir)
    #[arg(long, value_name = "DIR")]
    config_dir: Option<PathBuf>,

    /// Load every configuration file and report problems
    #[arg(long, action = ArgAction::SetTrue)]
    check: bool,

    /// Write default configuration files
    #[arg(long, action = ArgAction::SetTrue)]
    write_defaults: bool,

    /// Rewrite the configuration files in canonical form
    #[arg(long, action = ArgAction::SetTrue)]
    normalize: bool,

    /// List the commands enabled for the described editor state
    #[arg(long, action = ArgAction::SetTrue)]
    actions: bool,

    /// Current tool for --actions (select, open-line, ..., math)
    #[arg(long, value_name = "TOOL", requires = "actions")]
    tool: Option<String>,

    /// Selected objects for --actions, e.g. `path=2` (repeatable)
    #[arg(long = "select", value_name = "CATEGORY=N", requires = "actions")]
    select: Vec<String>,

    /// Treat the document as non-empty for --actions
    #[arg(long, action = ArgAction::SetTrue, requires = "actions")]
    non_empty: bool,

    /// Editor is in path edit mode for --actions
    #[arg(long, action = ArgAction::SetTrue, requires = "actions")]
    path_edit: bool,

    /// Background I/O is running for --actions
    #[arg(long, action = ArgAction::SetTrue, requires = "actions")]
    io: bool,

    /// Print machine-readable JSON
    #[arg(long, action = ArgAction::SetTrue)]
    json: bool,

    /// Show settings diagnostics
    #[arg(long, action = ArgAction::SetTrue)]
    debug: bool,
}

impl Cli {
    fn config_dir(&self) -> Result<ConfigDir> {
        match &self.config_dir {
            Some(dir) => Ok(ConfigDir::new(dir)),
            None => ConfigDir::locate(),
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    if cli.write_defaults {
        write_defaults(&cli)?;
    } else if cli.normalize {
        normalize(&cli)?;
    } else if cli.check {
        check(&cli)?;
    } else if cli.actions {
        list_actions(&cli)?;
    } else {
        // No flags: show usage
        println!("flowframtk: Settings and command state tool for the FlowframTk editor");
        println!();
        println!("Usage:");
        println!("  flowframtk --check             Report problems in the configuration files");
        println!("  flowframtk --write-defaults    Create default configuration files");
        println!("  flowframtk --normalize         Rewrite configuration files in canonical form");
        println!("  flowframtk --actions           List commands enabled for an editor state");
        println!("  flowframtk --help              Show help");
        println!();
        println!("Examples:");
        println!("  flowframtk --actions --select path=2 --non-empty");
        println!("  flowframtk --actions --tool open-curve --json");
    }

    Ok(())
}

fn write_defaults(cli: &Cli) -> Result<()> {
    let dir = cli.config_dir()?;
    let settings_file = dir.settings_file();
    if settings_file.exists() {
        bail!(
            "Config file already exists at {}",
            settings_file.display()
        );
    }

    let mut profile = Profile::load(dir)?;
    profile.settings.refresh_tool_paths(true, find_executable);
    profile.save()?;

    println!("Wrote default configuration to {}", profile.dir.root().display());
    Ok(())
}

fn normalize(cli: &Cli) -> Result<()> {
    let mut profile = Profile::load(cli.config_dir()?)?;
    let mut sink = LogSink;
    profile.report.surface(cli.debug, &mut sink);

    let changed = profile
        .settings
        .refresh_tool_paths(profile.report.version_mismatch, find_executable);
    for key in changed {
        log::info!("Updated {}", key);
    }

    profile.save()?;
    println!(
        "Normalized {} ({} problem line(s) dropped)",
        profile.dir.root().display(),
        profile.error_count()
    );
    Ok(())
}

fn check(cli: &Cli) -> Result<()> {
    let dir = cli.config_dir()?;
    let profile = Profile::load(dir)?;

    let mut sink = LogSink;
    profile.report.surface(cli.debug, &mut sink);

    let settings_file = profile.dir.settings_file();
    let mut problems: Vec<(PathBuf, String)> = profile
        .report
        .errors
        .iter()
        .map(|err| (settings_file.clone(), err.to_string()))
        .collect();
    for file in &profile.problems {
        problems.extend(
            file.errors
                .iter()
                .map(|err| (file.path.clone(), err.to_string())),
        );
    }

    if cli.json {
        let entries: Vec<_> = problems
            .iter()
            .map(|(path, message)| {
                serde_json::json!({ "file": path.display().to_string(), "message": message })
            })
            .collect();
        let output = serde_json::json!({
            "version_mismatch": profile.report.version_mismatch,
            "stored_version": profile.report.stored_version,
            "problems": entries,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        if let (true, Some(stored)) = (
            profile.report.version_mismatch,
            profile.report.stored_version.as_deref(),
        ) {
            println!("Settings were written by version {}", stored);
        }
        for (path, message) in &problems {
            println!("{}: {}", path.display(), message);
        }
    }

    if !problems.is_empty() {
        sink.error(&format!("{} problem(s) found", problems.len()));
        bail!("Found {} problem(s) in {}", problems.len(), profile.dir.root().display());
    }

    if !cli.json {
        println!("No problems found in {}", profile.dir.root().display());
    }
    Ok(())
}

/// Parses `category=n` arguments into a selection summary.
///
/// The object count defaults to the sum of the per-kind counts.
fn parse_selection(args: &[String]) -> Result<Option<Selection>> {
    if args.is_empty() {
        return Ok(None);
    }

    let mut counts = [0usize; CATEGORY_COUNT];
    let mut object_given = false;
    for arg in args {
        let (name, count) = arg
            .split_once('=')
            .ok_or_else(|| anyhow!("Expected CATEGORY=N, found '{}'", arg))?;
        let category = SelectionCategory::from_name(name.trim())
            .ok_or_else(|| anyhow!("Unknown selection category '{}'", name))?;
        let count: usize = count
            .trim()
            .parse()
            .with_context(|| format!("Invalid count in '{}'", arg))?;
        counts[category.index()] = count;
        object_given |= category == SelectionCategory::Object;
    }

    if !object_given {
        use SelectionCategory::*;
        counts[Object.index()] = [Path, Text, TextPath, Bitmap, Group, Pattern]
            .iter()
            .map(|c| counts[c.index()])
            .sum();
    }

    let mut flags = SelectionFlags::EMPTY;
    for category in SelectionCategory::ALL {
        if counts[category.index()] > 0 {
            flags.insert(category);
        }
    }
    if counts[SelectionCategory::Object.index()] == 0 {
        flags = SelectionFlags::NOTHING;
    }

    Ok(Some(Selection::with_counts(flags, counts)))
}

fn list_actions(cli: &Cli) -> Result<()> {
    let tool = match &cli.tool {
        Some(name) => Some(
            Tool::from_name(name).ok_or_else(|| anyhow!("Unknown tool '{}'", name))?,
        ),
        None => Some(Tool::Select),
    };

    let selection = parse_selection(&cli.select)?.unwrap_or_else(Selection::empty);
    let has_objects = selection.count(SelectionCategory::Object) > 0;

    let state = EditorState {
        canvas_open: true,
        document_empty: !(cli.non_empty || has_objects),
        io_in_progress: cli.io,
        tool,
        edit: if cli.path_edit {
            EditFlags::PATH_EDIT
        } else {
            EditFlags::NORMAL
        },
        construction: ConstructionFlags::NONE,
        selection: Some(selection),
    };

    let mut registry = ActionRegistry::with_defaults();
    if let Some(dir) = cli.config_dir.as_ref().map(ConfigDir::new) {
        let profile = Profile::load(dir)?;
        for err in registry.apply_keymap(&profile.keymap) {
            log::warn!("accelerators: {}", err);
        }
    } else {
        registry.apply_keymap(&flowframtk::actions::catalogue::default_keymap());
    }
    registry.refresh_all(&state);

    let enabled: Vec<_> = registry
        .statuses()
        .into_iter()
        .filter(|status| status.control.enabled)
        .collect();

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&enabled)?);
    } else {
        for status in &enabled {
            match &status.accelerator {
                Some(key) => println!("{:<32} {}", status.name, key),
                None => println!("{}", status.name),
            }
        }
    }
    Ok(())
}
