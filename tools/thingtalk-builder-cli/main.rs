use clap::Parser;
use std::io::{self, Write};
use thingtalk_builder::builder::{
    FieldEditor, Form, FormKind, FormRow, FormSubmission, NOTHING_SELECTED, Stage,
    TYPE_YOUR_OWN, UNSUPPORTED_PLACEHOLDER,
};
use thingtalk_builder::prelude::*;
use thingtalk_builder::recipe::UPSTREAM_PREFIX;
use tracing::debug;

/// Build when/get/do rules from a device catalog
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to a rule recipe JSON file to replay
    recipe_path: Option<String>,

    /// Use an offline catalog JSON file instead of the Thingpedia server
    #[arg(short, long)]
    catalog: Option<String>,

    /// Path to a configuration JSON file
    #[arg(long)]
    config: Option<String>,

    /// Catalog locale (overrides the configuration file)
    #[arg(long)]
    locale: Option<String>,

    /// Thingpedia developer key (overrides the configuration file)
    #[arg(long)]
    developer_key: Option<String>,

    /// Thingpedia server URL (overrides the configuration file)
    #[arg(long)]
    thingpedia_url: Option<String>,

    /// Run in interactive mode to be prompted for each step
    #[arg(short = 'i', long, help = "Run in interactive 'human' mode")]
    human: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli);
    debug!(?config, "configuration loaded");

    let catalog: Box<dyn Catalog> = match &cli.catalog {
        Some(path) => Box::new(StaticCatalog::from_file(path).unwrap_or_else(|e| {
            exit_with_error(&format!("Failed to load catalog: {}", e))
        })),
        None => Box::new(ThingpediaClient::from_config(&config)),
    };
    let session = Session::new(catalog);

    if cli.human {
        run_interactive(&session).await;
    } else {
        run_non_interactive(cli, &session).await;
    }
}

fn load_config(cli: &Cli) -> BuilderConfig {
    let mut config = match &cli.config {
        Some(path) => BuilderConfig::from_file(path).unwrap_or_else(|e| {
            exit_with_error(&format!("Failed to read config file '{}': {}", path, e))
        }),
        None => BuilderConfig::default(),
    };
    if let Some(locale) = &cli.locale {
        config.locale = locale.clone();
    }
    if let Some(key) = &cli.developer_key {
        config.developer_key = Some(key.clone());
    }
    if let Some(url) = &cli.thingpedia_url {
        config.thingpedia_url = url.clone();
    }
    config
}

/// Replays a recipe file and prints the resulting program.
async fn run_non_interactive(cli: Cli, session: &Session<Box<dyn Catalog>>) {
    let recipe_path = cli.recipe_path.unwrap_or_else(|| {
        exit_with_error("Recipe path is required in non-interactive mode.");
    });
    let recipe = Recipe::from_file(&recipe_path)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to load recipe: {}", e)));

    let preview = recipe
        .replay(session)
        .await
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to build rule: {}", e)));
    println!("{}", preview);
}

/// Runs the CLI as a menu-driven builder.
async fn run_interactive(session: &Session<Box<dyn Catalog>>) {
    println!("--- ThingTalk Rule Builder ---");

    loop {
        print_summary(session);
        println!("\nWhat do you want to do?");
        println!("  1: Choose the 'when' function");
        println!("  2: Choose the 'get' function");
        println!("  3: Choose the 'do' function");
        println!("  4: Add inputs");
        println!("  5: Add filters");
        println!("  6: Clear a stage");
        println!("  q: Quit");

        let choice = prompt_for_input("Enter choice", Some("q"));
        let result = match choice.trim() {
            "1" => choose_function(session, Stage::Stream).await,
            "2" => choose_function(session, Stage::Query).await,
            "3" => choose_function(session, Stage::Action).await,
            "4" => match prompt_for_stage() {
                Some(stage) => add_inputs(session, stage),
                None => Ok(()),
            },
            "5" => match prompt_for_stage() {
                Some(stage) => add_filters(session, stage),
                None => Ok(()),
            },
            "6" => {
                if let Some(stage) = prompt_for_stage() {
                    session.clear_stage(stage);
                }
                Ok(())
            }
            "q" | "Q" => break,
            _ => {
                println!("Invalid choice.");
                Ok(())
            }
        };

        if let Err(e) = result {
            eprintln!("\nError: {}", e);
        }
    }

    println!("\n{}", session.preview());
}

fn print_summary(session: &Session<Box<dyn Catalog>>) {
    println!();
    for (stage, title) in [
        (Stage::Stream, "when"),
        (Stage::Query, "get"),
        (Stage::Action, "do"),
    ] {
        let component = session.component_preview(stage);
        let shown = if component.is_empty() { "-" } else { component.as_str() };
        println!("{:>5}: {}", title, shown);
    }
    let preview = session.preview();
    if preview != NOTHING_SELECTED {
        println!("\n{}", preview);
    }
}

async fn choose_function(
    session: &Session<Box<dyn Catalog>>,
    stage: Stage,
) -> std::result::Result<(), SessionError> {
    session.start_stage(stage);

    let query = prompt_for_input("Search device", None);
    let devices = session.search_devices(&query).await?.current().unwrap_or_default();
    if let Some(hint) = session.with_builder(|b| b.device_hint()) {
        println!("{}", hint);
    }
    if devices.is_empty() {
        return Ok(());
    }
    for (i, device) in devices.iter().enumerate() {
        println!("  {}: {} (@{})", i + 1, device.name, device.primary_kind);
    }
    let Some(device) = prompt_for_index(devices.len()).map(|i| &devices[i]) else {
        return Ok(());
    };

    let functions = session
        .select_device(&device.primary_kind)
        .await?
        .current()
        .unwrap_or_default();
    if let Some(hint) = session.with_builder(|b| b.function_hint()) {
        println!("{}", hint);
    }
    for (i, function) in functions.iter().enumerate() {
        println!("  {}: {}", i + 1, function.label);
    }
    if let Some(i) = prompt_for_index(functions.len()) {
        session.select_function(&functions[i].name)?;
    }
    Ok(())
}

fn add_inputs(
    session: &Session<Box<dyn Catalog>>,
    stage: Stage,
) -> std::result::Result<(), SessionError> {
    session.start_stage(stage);
    let form = session.render_input_form()?;
    let submission = fill_form(&form);
    if !session.apply_input_values(&submission)? {
        println!("No value entered, inputs left unchanged.");
    }
    Ok(())
}

fn add_filters(
    session: &Session<Box<dyn Catalog>>,
    stage: Stage,
) -> std::result::Result<(), SessionError> {
    session.start_stage(stage);
    let form = session.render_filter_form()?;
    let submission = fill_form(&form);
    if session.apply_filters(&submission)?.is_none() {
        println!("No filter entered, stage left unfiltered.");
    }
    Ok(())
}

/// Prompts for every row of `form`. Upstream values are picked by typing
/// `@` followed by their name.
fn fill_form(form: &Form) -> FormSubmission {
    if form.rows.is_empty() {
        println!("Nothing to fill for this function.");
    }
    let mut submission = FormSubmission::new();
    for row in &form.rows {
        println!("\n{} ({})", row.name, row.ty);
        if let FieldEditor::Unsupported { .. } = row.editor {
            println!("  {}", UNSUPPORTED_PLACEHOLDER);
            continue;
        }

        let op = if form.kind == FormKind::Filter {
            prompt_for_operator(row)
        } else {
            None
        };
        describe_editor(row);

        let raw = prompt_for_input("Value (empty to skip)", None);
        if raw.is_empty() {
            continue;
        }
        let field = match raw
            .strip_prefix(UPSTREAM_PREFIX)
            .and_then(|name| row.editor.candidates().iter().find(|c| c.name == name))
        {
            Some(candidate) => FieldValue {
                raw: candidate.name.clone(),
                use_upstream: true,
                op,
            },
            None => FieldValue {
                raw,
                use_upstream: false,
                op,
            },
        };
        submission = submission.field(&row.name, field);
    }
    submission
}

fn describe_editor(row: &FormRow) {
    if let FieldEditor::Select { options, .. } = &row.editor {
        let values: Vec<_> = options
            .iter()
            .map(|o| format!("{} ({})", o.label, o.value))
            .collect();
        println!("  Options: {}", values.join(", "));
    }
    let candidates = row.editor.candidates();
    for candidate in candidates {
        println!("  {}{}: {}", UPSTREAM_PREFIX, candidate.name, candidate.label);
    }
    if !candidates.is_empty() {
        println!("  or: {}", TYPE_YOUR_OWN);
    }
}

fn prompt_for_operator(row: &FormRow) -> Option<ComparisonOp> {
    if row.operators.len() < 2 {
        return row.operators.first().copied();
    }
    let labels = row.operator_labels().join(", ");
    let default = row.operators[0].label();
    let answer = prompt_for_input(&format!("Operator [{}]", labels), Some(default));
    match ComparisonOp::from_symbol(answer.trim()) {
        Some(op) => Some(op),
        None => {
            println!("Unknown operator, using '{}'.", default);
            row.operators.first().copied()
        }
    }
}

fn prompt_for_stage() -> Option<Stage> {
    match prompt_for_input("Stage (when/get/do)", None).as_str() {
        "when" => Some(Stage::Stream),
        "get" => Some(Stage::Query),
        "do" => Some(Stage::Action),
        _ => {
            println!("Invalid stage.");
            None
        }
    }
}

fn prompt_for_index(len: usize) -> Option<usize> {
    let answer = prompt_for_input("Choose", Some("1"));
    match answer.parse::<usize>() {
        Ok(n) if n >= 1 && n <= len => Some(n - 1),
        _ => {
            println!("Invalid choice.");
            None
        }
    }
}

/// A helper function to prompt the user and read a line of input.
fn prompt_for_input(prompt_text: &str, default: Option<&str>) -> String {
    let mut line = String::new();
    let default_prompt = default.map_or("".to_string(), |d| format!(" [default: {}]", d));

    print!("> {}{}: ", prompt_text, default_prompt);
    if io::stdout().flush().is_err() || io::stdin().read_line(&mut line).is_err() {
        exit_with_error("Failed to read from the terminal");
    }
    let trimmed = line.trim().to_string();

    if trimmed.is_empty() {
        default.unwrap_or("").to_string()
    } else {
        trimmed
    }
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}
