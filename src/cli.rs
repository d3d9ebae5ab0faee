// File: ./src/cli.rs
//! Shared command-line interface logic: argument parsing, help text and
//! command execution against a file store.
use crate::controller::{self, ListedTask};
use crate::model::{DateKind, Priority, TaskDisplay, TaskEdit, TaskStatus};
use anyhow::{Context, Result, anyhow, bail};
use chrono::NaiveDate;
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    List { all: bool, json: bool },
    Add(String),
    /// Edit of a task, addressed by zero-based line number.
    Edit { line: usize, edit: TaskEdit },
    Help,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliArgs {
    pub root: Option<PathBuf>,
    /// Vault-relative file to operate on instead of the inbox.
    pub file: Option<PathBuf>,
    pub verbose: bool,
    pub command: Command,
}

/// Parses the arguments after the binary name.
pub fn parse_args(args: &[String]) -> Result<CliArgs> {
    let mut root = None;
    let mut file = None;
    let mut verbose = false;
    let mut rest: Vec<&str> = Vec::new();

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-r" | "--root" => {
                let v = iter.next().ok_or_else(|| anyhow!("{} needs a path", arg))?;
                root = Some(PathBuf::from(v));
            }
            "-f" | "--file" => {
                let v = iter.next().ok_or_else(|| anyhow!("{} needs a path", arg))?;
                file = Some(PathBuf::from(v));
            }
            "-v" | "--verbose" => verbose = true,
            "-h" | "--help" => rest.insert(0, "help"),
            other => rest.push(other),
        }
    }

    Ok(CliArgs {
        root,
        file,
        verbose,
        command: parse_command(&rest)?,
    })
}

fn parse_command(words: &[&str]) -> Result<Command> {
    let Some((&name, args)) = words.split_first() else {
        return Ok(Command::List {
            all: false,
            json: false,
        });
    };

    // Commands that do not address a line.
    match name {
        "help" => return Ok(Command::Help),
        "list" | "ls" => {
            let mut all = false;
            let mut json = false;
            for a in args {
                match *a {
                    "--all" | "-a" => all = true,
                    "--json" => json = true,
                    other => bail!("Unknown list option '{}'", other),
                }
            }
            return Ok(Command::List { all, json });
        }
        "add" => {
            if args.is_empty() {
                bail!("add needs the task text");
            }
            return Ok(Command::Add(args.join(" ")));
        }
        _ => {}
    }

    let (&n, args) = args
        .split_first()
        .ok_or_else(|| anyhow!("{} needs a line number", name))?;
    let line = parse_line_number(n)?;

    let edit = match (name, args) {
        ("done", []) => TaskEdit::Status(TaskStatus::Done),
        ("toggle", []) => TaskEdit::ToggleCompletion,
        ("status", [s]) => TaskEdit::Status(s.parse::<TaskStatus>()?),
        ("priority", [p]) => TaskEdit::Priority(p.parse::<Priority>()?),
        ("date", [kind, value]) => {
            let kind = kind.parse::<DateKind>()?;
            let date = match *value {
                "none" | "clear" => None,
                v => Some(
                    NaiveDate::parse_from_str(v, "%Y-%m-%d")
                        .with_context(|| format!("'{}' is not a YYYY-MM-DD date", v))?,
                ),
            };
            TaskEdit::Date(kind, date)
        }
        ("recur", phrase) => TaskEdit::Recurrence(phrase.join(" ")),
        ("prop", [key, value @ ..]) => TaskEdit::Property {
            key: key.to_string(),
            value: value.join(" "),
        },
        ("unprop", [key]) => TaskEdit::RemoveProperty(key.to_string()),
        ("describe", text) if !text.is_empty() => TaskEdit::Description(text.join(" ")),
        ("normalize", []) => TaskEdit::Normalize,
        _ => bail!("Invalid command or arguments: {}", words.join(" ")),
    };
    Ok(Command::Edit { line, edit })
}

/// Line numbers on the command line are 1-based, like in an editor.
fn parse_line_number(s: &str) -> Result<usize> {
    let n: usize = s
        .parse()
        .with_context(|| format!("'{}' is not a line number", s))?;
    n.checked_sub(1)
        .ok_or_else(|| anyhow!("line numbers start at 1"))
}

/// Executes `command` against `path` in `store`, writing output to `out`.
pub fn run(
    command: &Command,
    store: &dyn crate::storage::FileStore,
    path: &Path,
    show_completed: bool,
    out: &mut dyn Write,
) -> Result<()> {
    match command {
        Command::Help => print_help_to(out, "intuitask")?,
        Command::List { all, json } => {
            let tasks = controller::list_tasks(store, path, *all || show_completed)
                .with_context(|| format!("Failed to list tasks of '{}'", path.display()))?;
            if *json {
                let plain: Vec<_> = tasks.iter().map(|t| &t.task).collect();
                writeln!(out, "{}", serde_json::to_string_pretty(&plain)?)?;
            } else {
                write_listing(out, &tasks)?;
            }
        }
        Command::Add(text) => {
            let n = controller::append_task(store, path, text)?;
            writeln!(out, "Added task on line {}", n + 1)?;
        }
        Command::Edit { line, edit } => {
            let updated = controller::edit_task_in_file(store, path, *line, edit)
                .with_context(|| format!("Failed to edit line {}", line + 1))?;
            writeln!(out, "{}", updated)?;
        }
    }
    Ok(())
}

fn write_listing(out: &mut dyn Write, tasks: &[ListedTask]) -> Result<()> {
    if tasks.is_empty() {
        writeln!(out, "No tasks.")?;
        return Ok(());
    }
    for t in tasks {
        writeln!(
            out,
            "{:>4} {} {}",
            t.line + 1,
            t.task.checkbox_symbol(),
            t.task.description
        )?;
        writeln!(out, "         {}", t.task.format_metadata())?;
    }
    Ok(())
}

pub fn print_help(binary_name: &str) {
    let _ = print_help_to(&mut std::io::stdout(), binary_name);
}

fn print_help_to(out: &mut dyn Write, binary_name: &str) -> std::io::Result<()> {
    writeln!(
        out,
        "Intuitask v{} - edit markdown task lines from the terminal",
        env!("CARGO_PKG_VERSION")
    )?;
    writeln!(out)?;
    writeln!(out, "USAGE:")?;
    writeln!(out, "    {} [OPTIONS] [COMMAND]", binary_name)?;
    writeln!(out)?;
    writeln!(out, "OPTIONS:")?;
    writeln!(out, "    -r, --root <path>     Use a different directory for config and data.")?;
    writeln!(out, "    -f, --file <path>     Vault-relative task file (default: inbox).")?;
    writeln!(out, "    -v, --verbose         Debug logging on stderr.")?;
    writeln!(out, "    -h, --help            Show this help message.")?;
    writeln!(out)?;
    writeln!(out, "COMMANDS (<n> is the line number shown by 'list'):")?;
    writeln!(out, "    list [--all] [--json]         List open tasks (--all: include done)")?;
    writeln!(out, "    add <text>                    Append '- [ ] <text>'")?;
    writeln!(out, "    done <n>                      Mark as done")?;
    writeln!(out, "    toggle <n>                    Toggle done / todo")?;
    writeln!(out, "    status <n> <status>           todo | done | doing | cancelled")?;
    writeln!(out, "    priority <n> <level>          highest | high | medium | low | lowest | normal")?;
    writeln!(out, "    date <n> <kind> <date|none>   kind: created | due | scheduled | start | done | cancelled")?;
    writeln!(out, "    recur <n> [phrase]            Set recurrence (no phrase clears it)")?;
    writeln!(out, "    prop <n> <key> <value>        Set a [key:value] property")?;
    writeln!(out, "    unprop <n> <key>              Remove a property")?;
    writeln!(out, "    describe <n> <text>           Replace the description")?;
    writeln!(out, "    normalize <n>                 Rewrite the line in canonical order")?;
    writeln!(out)?;
    writeln!(out, "LINE FORMAT:")?;
    writeln!(out, "    - [ ] Ship report 🔺 📅 2024-03-01 🔁 every week [client:acme]")?;
    writeln!(out, "    Priority  🔺 highest  ⏫ high  🔼 medium  🔽 low  ⏬ lowest")?;
    writeln!(out, "    Dates     ➕ created  📅 due  ⏳ scheduled  🛫 start  ✅ done  ❌ cancelled")?;
    writeln!(out, "    Status    [ ] todo  [x] done  [/] in progress  [-] cancelled")?;
    Ok(())
}
