use clap::{Parser, ValueEnum};
use log::{error, info, warn};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use tahdiri::content::GeminiClient;
use tahdiri::gui;
use tahdiri::lesson::{FieldKind, FieldValue, Grade, LessonField, LessonRecord, Subject, Term};
use tahdiri::preview::render_text;
use tahdiri::runtime;
use tahdiri::session::LessonSession;
use tahdiri::settings::{
    default_base_path, ensure_base_folders, load_or_init_settings, print_dir, save_settings,
    Settings,
};
use tahdiri::storage::{JsonFileSlot, LessonSlot};
use tahdiri::store::RecordStore;

#[derive(Parser, Debug)]
#[command(
    name = "tahdiri",
    version,
    about = "Tahdiri lesson card preparation (local-first, optional AI fill)"
)]
struct CliArgs {
    /// Choose GUI (default) or CLI mode
    #[arg(long, value_enum, default_value = "gui")]
    mode: RunMode,
    /// Override data base path (defaults to ./data next to the exe)
    #[arg(long)]
    base_path: Option<PathBuf>,
    /// Use this model for content fill instead of the one in settings.json
    #[arg(long)]
    model: Option<String>,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum RunMode {
    Gui,
    Cli,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = CliArgs::parse();
    let base_path = args.base_path.unwrap_or_else(default_base_path);

    if let Err(e) = ensure_base_folders(&base_path) {
        error!(
            "[settings] Failed to create base folders at {}: {}",
            base_path.display(),
            e
        );
        return;
    }

    let mut settings = match load_or_init_settings(&base_path) {
        Ok(s) => s,
        Err(e) => {
            error!("[settings] Failed to load settings: {}", e);
            return;
        }
    };

    info!("Using data path: {}", base_path.display());

    settings.base_path = base_path.to_string_lossy().to_string();
    settings.mode = match args.mode {
        RunMode::Gui => "gui".to_string(),
        RunMode::Cli => "cli".to_string(),
    };
    if let Some(model) = args.model {
        settings.api.model = model;
    }

    match args.mode {
        RunMode::Gui => {
            if let Err(e) = gui::launch_gui(base_path.clone(), settings.clone()) {
                error!("[gui] Failed to start GUI: {}", e);
            }
        }
        RunMode::Cli => {
            run_cli(&settings, &base_path);
        }
    }

    if let Err(e) = save_settings(&settings, &base_path) {
        warn!("[settings] Could not save settings: {}", e);
    }
}

const HELP: &str = "\
Commands:
  show                      list every field with its key
  text                      print the plain-text card
  set <field> <value>       set a field (lists: entries separated by '|')
  add <field> <entry>       append an entry to a list field
  remove <field> <n>        remove entry n (1-based) from a list field
  choices <field>           numbered options for subject, grade or term
  fill                      generate objectives, activities and the rest
  copy                      copy the plain-text card to the clipboard
  print                     write the print page and open it
  reset                     start a fresh card (asks first)
  exit";

fn run_cli(settings: &Settings, base_path: &Path) {
    let store = RecordStore::open(JsonFileSlot::in_base(base_path));
    let mut session = LessonSession::new(store);

    println!("Tahdiri CLI");
    println!("Base path: {}", base_path.display());
    println!("Draft: {}", session.store().slot().path().display());
    println!("Type 'help' for commands, 'exit' to quit.\n");

    loop {
        let title = session.record().lesson_title.trim().to_string();
        print!(
            "[{}] > ",
            if title.is_empty() { "بدون عنوان" } else { title.as_str() }
        );
        let _ = io::stdout().flush();

        let mut input = String::new();
        match io::stdin().read_line(&mut input) {
            Ok(0) => break,
            Ok(_) => {}
            Err(_) => {
                println!("Error reading input. Exiting.");
                break;
            }
        }

        let input = input.trim();
        let (command, rest) = input.split_once(' ').unwrap_or((input, ""));
        let rest = rest.trim();

        match command.to_lowercase().as_str() {
            "" => {}
            "exit" | "quit" => {
                println!("Goodbye");
                break;
            }
            "help" => println!("{HELP}"),
            "show" => print_record(&session.record()),
            "text" => println!("{}", render_text(&session.record())),
            "set" => cli_set(&mut session, rest),
            "add" => cli_add(&mut session, rest),
            "remove" => cli_remove(&mut session, rest),
            "choices" => cli_choices(rest),
            "fill" => cli_fill(&mut session, settings),
            "copy" => cli_copy(&mut session),
            "print" => cli_print(&session, base_path),
            "reset" => cli_reset(&mut session),
            other => println!("Unknown command '{other}'. Type 'help'."),
        }

        if let Some(message) = session.take_error() {
            println!("! {message}");
        }
    }
}

fn print_record(record: &LessonRecord) {
    for field in LessonField::ALL {
        match record.field(*field) {
            FieldValue::List(items) => {
                println!("{} ({}):", field.label(), field.key());
                for (i, item) in items.iter().enumerate() {
                    println!("  {}. {}", i + 1, item);
                }
            }
            FieldValue::Text(text) => println!("{} ({}): {}", field.label(), field.key(), text),
            FieldValue::Subject(s) => println!("{} ({}): {}", field.label(), field.key(), s),
            FieldValue::Grade(g) => println!("{} ({}): {}", field.label(), field.key(), g),
            FieldValue::Term(t) => println!("{} ({}): {}", field.label(), field.key(), t),
        }
    }
}

fn split_field(rest: &str) -> Result<(LessonField, &str), String> {
    let (key, value) = rest.split_once(' ').unwrap_or((rest, ""));
    let field = LessonField::from_key(key).ok_or_else(|| format!("Unknown field '{key}'"))?;
    Ok((field, value.trim()))
}

fn pick_choice<T: Copy>(all: &[T], raw: &str, label: fn(T) -> &'static str) -> Result<T, String> {
    if let Ok(n) = raw.parse::<usize>() {
        if (1..=all.len()).contains(&n) {
            return Ok(all[n - 1]);
        }
    }
    all.iter()
        .copied()
        .find(|c| label(*c) == raw)
        .ok_or_else(|| format!("Unknown choice '{raw}'"))
}

/// Turn typed text into a value of the field's kind.
fn parse_value(field: LessonField, raw: &str) -> Result<FieldValue, String> {
    let raw = raw.trim();
    match field.kind() {
        FieldKind::Text => Ok(FieldValue::Text(raw.to_string())),
        FieldKind::List => Ok(FieldValue::List(
            raw.split('|').map(|s| s.trim().to_string()).collect(),
        )),
        FieldKind::Choice => match field {
            LessonField::Subject => pick_choice(Subject::ALL, raw, Subject::label).map(FieldValue::Subject),
            LessonField::Grade => pick_choice(Grade::ALL, raw, Grade::label).map(FieldValue::Grade),
            _ => pick_choice(Term::ALL, raw, Term::label).map(FieldValue::Term),
        },
    }
}

fn list_of<S: LessonSlot>(session: &LessonSession<S>, field: LessonField) -> Option<Vec<String>> {
    match session.record().field(field) {
        FieldValue::List(items) => Some(items),
        _ => None,
    }
}

fn cli_set<S: LessonSlot>(session: &mut LessonSession<S>, rest: &str) {
    let parsed = split_field(rest).and_then(|(field, raw)| Ok((field, parse_value(field, raw)?)));
    match parsed {
        Ok((field, value)) => {
            if session.edit(field, value) {
                println!("Saved {}.", field.key());
            }
        }
        Err(e) => println!("{e}. Usage: set <field> <value>"),
    }
}

fn cli_add<S: LessonSlot>(session: &mut LessonSession<S>, rest: &str) {
    let (field, entry) = match split_field(rest) {
        Ok(parts) => parts,
        Err(e) => {
            println!("{e}. Usage: add <field> <entry>");
            return;
        }
    };
    let Some(mut items) = list_of(session, field) else {
        println!("{} is not a list field.", field.key());
        return;
    };
    items.push(entry.to_string());
    session.edit(field, FieldValue::List(items));
}

fn cli_remove<S: LessonSlot>(session: &mut LessonSession<S>, rest: &str) {
    let (field, index) = match split_field(rest) {
        Ok(parts) => parts,
        Err(e) => {
            println!("{e}. Usage: remove <field> <n>");
            return;
        }
    };
    let Some(mut items) = list_of(session, field) else {
        println!("{} is not a list field.", field.key());
        return;
    };
    match index.parse::<usize>() {
        Ok(n) if (1..=items.len()).contains(&n) => {
            items.remove(n - 1);
            session.edit(field, FieldValue::List(items));
        }
        _ => println!("No entry '{index}' in {}.", field.key()),
    }
}

fn cli_choices(rest: &str) {
    let labels: Vec<&str> = match LessonField::from_key(rest) {
        Some(LessonField::Subject) => Subject::ALL.iter().map(|s| s.label()).collect(),
        Some(LessonField::Grade) => Grade::ALL.iter().map(|g| g.label()).collect(),
        Some(LessonField::Term) => Term::ALL.iter().map(|t| t.label()).collect(),
        _ => {
            println!("Usage: choices subject|grade|term");
            return;
        }
    };
    for (i, label) in labels.iter().enumerate() {
        println!("  {}. {}", i + 1, label);
    }
}

fn cli_fill<S: LessonSlot>(session: &mut LessonSession<S>, settings: &Settings) {
    let rt = match runtime::shared() {
        Ok(rt) => rt,
        Err(e) => {
            error!("[content] Could not start the request runtime: {e}");
            return;
        }
    };
    let client = match GeminiClient::new(settings.api.clone()) {
        Ok(client) => client,
        Err(e) => {
            println!("{}", e.user_message());
            return;
        }
    };

    println!("جاري التوليد...");
    if rt.block_on(session.fill_with(&client)) {
        println!("Generated content merged into the card.");
    }
}

fn cli_copy<S: LessonSlot>(session: &mut LessonSession<S>) {
    let text = session.copy_text(Instant::now());
    let copied = arboard::Clipboard::new().and_then(|mut clipboard| clipboard.set_text(text));
    match copied {
        Ok(()) => println!("تم النسخ"),
        Err(e) => {
            warn!("[cli] Clipboard unavailable: {e}");
            println!("{}", render_text(&session.record()));
        }
    }
}

fn cli_print<S: LessonSlot>(session: &LessonSession<S>, base_path: &Path) {
    match session.export_print(&print_dir(base_path)) {
        Ok(path) => {
            println!("Wrote print page to {}", path.display());
            if let Err(e) = open::that(&path) {
                warn!("[cli] Could not open browser: {e}");
            }
        }
        Err(e) => println!("Failed to write print page: {e}"),
    }
}

fn cli_reset<S: LessonSlot>(session: &mut LessonSession<S>) {
    let mut ask = |question: &str| {
        prompt(&format!("{question} (y/n)"), "n")
            .map(|answer| {
                let answer = answer.to_lowercase();
                answer.starts_with('y') || answer.starts_with('ن')
            })
            .unwrap_or(false)
    };
    if session.reset(&mut ask) {
        println!("Started a fresh card.");
    }
}

fn prompt(field: &str, default_val: &str) -> io::Result<String> {
    print!("{field} [{default_val}]: ");
    io::stdout().flush()?;
    let mut buf = String::new();
    io::stdin().read_line(&mut buf)?;
    let trimmed = buf.trim();
    if trimmed.is_empty() {
        Ok(default_val.to_string())
    } else {
        Ok(trimmed.to_string())
    }
}
