//! Line-oriented command shell
//!
//! Each input line is parsed into a [`Command`] and run against the
//! controller. Name lists on the command line are comma-separated; entries
//! with a name take the form `<name> = a, b, c`.

use std::path::PathBuf;

use sortpot_core::{
    Clock, KeyValueStore, RandomSource, RosterInput, SessionController, TurnOutcome,
};
use thiserror::Error;

pub const HELP: &str = "\
Commands:
  class add <name> = <students>        create a classroom
  class edit <id> <name> = <students>  replace a classroom
  class rm <id> | use <id> | list
  set add <name> = <options>           create a roulette option set
  set rm <id> | use <id> | list
  groups [size] [names]                make groups (last size, current classroom)
  pick [names]                         pick one name
  turns start|next|reset [names]       turn order without repeats
  exclude pick|turns <name>            toggle a student out of the draw
  dice <1|2>                           roll dice
  spin <options>                       spin the roulette
  timer start|pause|reset|status
  timer set <seconds>
  export json|html <path>
  import <path>
  reset                                erase all data
  quit";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ParseError {
    #[error("Unknown command: {0}. Type `help` for the list.")]
    Unknown(String),

    #[error("Usage: {0}")]
    Usage(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Picker,
    Turns,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnAction {
    Start,
    Next,
    Reset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerAction {
    Start,
    Pause,
    Reset,
    Status,
    Set(u32),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    ClassAdd { name: String, students: Vec<String> },
    ClassEdit { id: String, name: String, students: Vec<String> },
    ClassRemove(String),
    ClassUse(String),
    ClassList,
    SetAdd { name: String, options: Vec<String> },
    SetRemove(String),
    SetUse(String),
    SetList,
    Groups { size: Option<usize>, names: Vec<String> },
    Pick(Vec<String>),
    Turns(TurnAction, Vec<String>),
    Exclude(Tab, String),
    Dice(usize),
    Spin(Vec<String>),
    Timer(TimerAction),
    ExportJson(PathBuf),
    ExportHtml(PathBuf),
    Import(PathBuf),
    Reset,
    Quit,
}

/// What the loop should do after a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Print(String),
    Quit,
}

fn split_names(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn split_named(rest: &str, usage: &'static str) -> Result<(String, Vec<String>), ParseError> {
    let (name, list) = rest.split_once('=').ok_or(ParseError::Usage(usage))?;
    Ok((name.trim().to_string(), split_names(list)))
}

fn first_word(text: &str) -> (&str, &str) {
    let text = text.trim();
    match text.split_once(char::is_whitespace) {
        Some((head, tail)) => (head, tail.trim()),
        None => (text, ""),
    }
}

pub fn parse(line: &str) -> Result<Command, ParseError> {
    let (verb, rest) = first_word(line);
    let (sub, args) = first_word(rest);

    let command = match verb {
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        "reset" => Command::Reset,
        "class" => match sub {
            "add" => {
                let (name, students) = split_named(args, "class add <name> = <students>")?;
                Command::ClassAdd { name, students }
            }
            "edit" => {
                let (id, rest) = first_word(args);
                let (name, students) =
                    split_named(rest, "class edit <id> <name> = <students>")?;
                Command::ClassEdit {
                    id: id.to_string(),
                    name,
                    students,
                }
            }
            "rm" if !args.is_empty() => Command::ClassRemove(args.to_string()),
            "use" if !args.is_empty() => Command::ClassUse(args.to_string()),
            "list" => Command::ClassList,
            _ => return Err(ParseError::Usage("class add|edit|rm|use|list")),
        },
        "set" => match sub {
            "add" => {
                let (name, options) = split_named(args, "set add <name> = <options>")?;
                Command::SetAdd { name, options }
            }
            "rm" if !args.is_empty() => Command::SetRemove(args.to_string()),
            "use" if !args.is_empty() => Command::SetUse(args.to_string()),
            "list" => Command::SetList,
            _ => return Err(ParseError::Usage("set add|rm|use|list")),
        },
        "groups" => match sub.parse::<usize>() {
            Ok(size) => Command::Groups {
                size: Some(size),
                names: split_names(args),
            },
            Err(_) => Command::Groups {
                size: None,
                names: split_names(rest),
            },
        },
        "pick" => Command::Pick(split_names(rest)),
        "turns" => {
            let action = match sub {
                "start" => TurnAction::Start,
                "next" => TurnAction::Next,
                "reset" => TurnAction::Reset,
                _ => return Err(ParseError::Usage("turns start|next|reset [names]")),
            };
            Command::Turns(action, split_names(args))
        }
        "exclude" => {
            let tab = match sub {
                "pick" => Tab::Picker,
                "turns" => Tab::Turns,
                _ => return Err(ParseError::Usage("exclude pick|turns <name>")),
            };
            if args.is_empty() {
                return Err(ParseError::Usage("exclude pick|turns <name>"));
            }
            Command::Exclude(tab, args.to_string())
        }
        "dice" => match sub {
            "" => Command::Dice(1),
            n => Command::Dice(n.parse().map_err(|_| ParseError::Usage("dice <1|2>"))?),
        },
        "spin" => Command::Spin(split_names(rest)),
        "timer" => Command::Timer(match sub {
            "start" => TimerAction::Start,
            "pause" => TimerAction::Pause,
            "reset" => TimerAction::Reset,
            "status" | "" => TimerAction::Status,
            "set" => TimerAction::Set(
                args.parse()
                    .map_err(|_| ParseError::Usage("timer set <seconds>"))?,
            ),
            _ => return Err(ParseError::Usage("timer start|pause|reset|status|set")),
        }),
        "export" => match (sub, args) {
            ("json", path) if !path.is_empty() => Command::ExportJson(PathBuf::from(path)),
            ("html", path) if !path.is_empty() => Command::ExportHtml(PathBuf::from(path)),
            _ => return Err(ParseError::Usage("export json|html <path>")),
        },
        "import" if !rest.is_empty() => Command::Import(PathBuf::from(rest)),
        "import" => return Err(ParseError::Usage("import <path>")),
        other => return Err(ParseError::Unknown(other.to_string())),
    };
    Ok(command)
}

/// Manual names win; otherwise fall back to the current classroom
fn roster<S, R, C>(controller: &SessionController<S, R, C>, names: &[String]) -> RosterInput
where
    S: KeyValueStore,
    R: RandomSource,
    C: Clock,
{
    RosterInput {
        manual: names.join("\n"),
        class_id: controller.document().last_class_id.clone(),
    }
}

/// Run one command and render its result as text
pub fn execute<S, R, C>(
    controller: &mut SessionController<S, R, C>,
    command: Command,
) -> sortpot_core::Result<Outcome>
where
    S: KeyValueStore,
    R: RandomSource,
    C: Clock,
{
    let text = match command {
        Command::Help => HELP.to_string(),
        Command::Quit => return Ok(Outcome::Quit),
        Command::Reset => {
            controller.reset_all()?;
            "All data erased.".to_string()
        }
        Command::ClassAdd { name, students } => {
            let id = controller.save_classroom(None, &name, &students.join("\n"))?;
            format!("Classroom saved ({}).", id)
        }
        Command::ClassEdit { id, name, students } => {
            controller.save_classroom(Some(&id), &name, &students.join("\n"))?;
            "Classroom updated.".to_string()
        }
        Command::ClassRemove(id) => {
            controller.delete_classroom(&id)?;
            "Classroom deleted.".to_string()
        }
        Command::ClassUse(id) => {
            controller.select_classroom(&id)?;
            let students = controller.classroom_students(&id).unwrap_or_default();
            format!("Using classroom:\n{}", students)
        }
        Command::ClassList => {
            let doc = controller.document();
            if doc.classrooms.is_empty() {
                "No classrooms yet.".to_string()
            } else {
                doc.classrooms
                    .iter()
                    .map(|c| {
                        let marker = if c.id == doc.last_class_id { "*" } else { " " };
                        format!("{} {}  {} ({} students)", marker, c.id, c.name, c.len())
                    })
                    .collect::<Vec<_>>()
                    .join("\n")
            }
        }
        Command::SetAdd { name, options } => {
            let id = controller.save_option_set(None, &name, &options.join("\n"))?;
            format!("Option set saved ({}).", id)
        }
        Command::SetRemove(id) => {
            controller.delete_option_set(&id)?;
            "Option set deleted.".to_string()
        }
        Command::SetUse(id) => controller.select_option_set(&id)?.join(", "),
        Command::SetList => {
            let doc = controller.document();
            if doc.option_sets.is_empty() {
                "No option sets yet.".to_string()
            } else {
                doc.option_sets
                    .iter()
                    .map(|s| format!("  {}  {}: {}", s.id, s.name, s.options.join(", ")))
                    .collect::<Vec<_>>()
                    .join("\n")
            }
        }
        Command::Groups { size, names } => {
            let roster_text = if names.is_empty() {
                let id = controller.document().last_class_id.clone();
                controller.classroom_students(&id).unwrap_or_default()
            } else {
                names.join("\n")
            };
            let size = size.unwrap_or_else(|| controller.default_group_size());
            let groups = controller.generate_groups(&roster_text, size)?;
            groups
                .iter()
                .enumerate()
                .map(|(i, g)| format!("Group {}: {}", i + 1, g.join(", ")))
                .collect::<Vec<_>>()
                .join("\n")
        }
        Command::Pick(names) => {
            let input = roster(controller, &names);
            let result = controller.pick(&input)?;
            format!("Picked: {}", result.winner)
        }
        Command::Turns(action, names) => {
            let input = roster(controller, &names);
            let outcome = match action {
                TurnAction::Start => controller.start_turns(&input)?,
                TurnAction::Next => controller.next_turn(&input)?,
                TurnAction::Reset => {
                    controller.reset_turns(&input)?;
                    return Ok(Outcome::Print("Turns reshuffled.".to_string()));
                }
            };
            match outcome {
                TurnOutcome::Next { name, order } => format!("Turn {}: {}", order, name),
                TurnOutcome::Exhausted => "Everyone has had a turn.".to_string(),
            }
        }
        Command::Exclude(tab, name) => {
            let class_id = controller.document().last_class_id.clone();
            let excluded = match tab {
                Tab::Picker => {
                    controller.set_picker_class(&class_id)?;
                    controller.toggle_picker_exclusion(&name)
                }
                Tab::Turns => {
                    controller.set_turn_class(&class_id)?;
                    controller.toggle_turn_exclusion(&name)
                }
            };
            if excluded {
                format!("{} excluded.", name)
            } else {
                format!("{} included again.", name)
            }
        }
        Command::Dice(count) => {
            let roll = controller.roll_dice(count)?;
            let faces: Vec<String> = roll.faces.iter().map(u32::to_string).collect();
            format!("Rolled {} (total {})", faces.join(" + "), roll.sum())
        }
        Command::Spin(options) => {
            let options = if options.is_empty() {
                let id = controller.document().last_option_set_id.clone();
                controller
                    .document()
                    .option_set(&id)
                    .map(|s| s.options.clone())
                    .unwrap_or_default()
            } else {
                options
            };
            let spin = controller.spin_roulette(&options.join("\n"))?;
            format!("The wheel stops on: {}", spin.option)
        }
        Command::Timer(action) => {
            match action {
                TimerAction::Start => controller.start_timer(),
                TimerAction::Pause => controller.pause_timer(),
                TimerAction::Reset => controller.reset_timer(),
                TimerAction::Status => {}
                TimerAction::Set(seconds) => controller.set_timer_seconds(seconds)?,
            }
            let snapshot = controller.timer_snapshot();
            let state = if snapshot.running {
                "running"
            } else if snapshot.finished {
                "finished"
            } else {
                "stopped"
            };
            format!("{} ({})", snapshot.display, state)
        }
        Command::ExportJson(path) => {
            std::fs::write(&path, controller.export_json()?)?;
            format!("Exported to {}.", path.display())
        }
        Command::ExportHtml(path) => {
            std::fs::write(&path, controller.export_print_html()?)?;
            format!("Printable groups written to {}.", path.display())
        }
        Command::Import(path) => {
            let raw = std::fs::read_to_string(&path)?;
            controller.import_json(&raw)?;
            "Data imported.".to_string()
        }
    };
    Ok(Outcome::Print(text))
}
