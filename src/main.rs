use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};
use people_book::app::{App, Mode};
use people_book::config::Config;
use people_book::model::{self, Model, Person, Record, ValidateOptions};
use people_book::store::FileStore;
use people_book::{Result, diagnostics, render, router};

#[derive(Parser)]
#[command(name = "people-book")]
#[command(about = "Keep a list of people and their addresses", long_about = None)]
struct Cli {
    #[command(flatten)]
    config: Config,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show everyone in the list.
    List,

    /// Add a person (person details first, then the address).
    Add {
        #[command(flatten)]
        fields: PersonFields,
    },

    /// Change an existing person. Only the given fields are touched.
    Edit {
        id: String,

        #[command(flatten)]
        fields: PersonFields,
    },

    /// Remove a person from the list and the store.
    Delete { id: String },

    /// Open a route (`add`, `edit/<id>`, anything else is the list) and
    /// print the resulting view.
    Route { fragment: String },

    /// Check a JSON array of person documents against the person rules.
    Validate { file: String },
}

#[derive(Args, Debug, Default)]
struct PersonFields {
    #[arg(long)]
    first_name: Option<String>,
    #[arg(long)]
    last_name: Option<String>,
    #[arg(long)]
    address_one: Option<String>,
    #[arg(long)]
    address_two: Option<String>,
    #[arg(long)]
    city: Option<String>,
    #[arg(long)]
    state: Option<String>,
    #[arg(long)]
    zip_code: Option<String>,
}

impl PersonFields {
    fn person_inputs(&self) -> Vec<(&'static str, &str)> {
        collect_inputs([
            ("firstName", &self.first_name),
            ("lastName", &self.last_name),
        ])
    }

    fn address_inputs(&self) -> Vec<(&'static str, &str)> {
        collect_inputs([
            ("address.addressOne", &self.address_one),
            ("address.addressTwo", &self.address_two),
            ("address.city", &self.city),
            ("address.state", &self.state),
            ("address.zipCode", &self.zip_code),
        ])
    }
}

fn collect_inputs<'a, const N: usize>(
    fields: [(&'static str, &'a Option<String>); N],
) -> Vec<(&'static str, &'a str)> {
    fields
        .into_iter()
        .filter_map(|(input, value)| value.as_deref().map(|v| (input, v)))
        .collect()
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    diagnostics::init(cli.config.verbose);

    // 1) Load the list from the store.
    let mut app = App::start(cli.config.open_store(), &cli.config.namespace)?;

    // 2) Drive the app the way the UI would.
    match cli.cmd {
        Commands::List => {
            print!("{}", render::render_list(app.people()));
        }
        Commands::Add { fields } => {
            app.add();
            let saved = fill_and_save(&mut app, &fields)?;
            println!("Saved {} ({})", saved.full_name(), saved.id().unwrap_or(""));
        }
        Commands::Edit { id, fields } => {
            if !app.edit(&id) {
                diagnostics::warn(format!("no person with id {}", id));
                print!("{}", render::render_list(app.people()));
                return Ok(());
            }
            let saved = fill_and_save(&mut app, &fields)?;
            println!("Saved {} ({})", saved.full_name(), saved.id().unwrap_or(""));
        }
        Commands::Delete { id } => match app.destroy(&id)? {
            Some(removed) => println!("Removed {} ({})", removed.full_name(), id),
            None => diagnostics::warn(format!("no person with id {}", id)),
        },
        Commands::Route { fragment } => {
            app.dispatch(router::Route::parse(&fragment));
            match app.mode() {
                Mode::List => print!("{}", render::render_list(app.people())),
                Mode::Add | Mode::Edit => print!("{}", render::render_form(app.form())),
            }
        }
        Commands::Validate { file } => validate_file(&file)?,
    }

    Ok(())
}

/// Fill both form pages from `fields` and save. On failure the form is
/// shown with its field errors and the flow is cancelled.
fn fill_and_save(app: &mut App<FileStore>, fields: &PersonFields) -> Result<Person> {
    for (input, value) in fields.person_inputs() {
        app.form_mut().blur(input, value)?;
    }
    if !app.next() {
        eprint!("{}", render::render_form(app.form()));
        app.cancel();
        bail!(
            "{}",
            diagnostics::error_message("person details are not valid")
        );
    }

    for (input, value) in fields.address_inputs() {
        app.form_mut().blur(input, value)?;
    }
    match app.complete() {
        Ok(saved) => Ok(saved),
        Err(err) => {
            eprint!("{}", render::render_form(app.form()));
            app.cancel();
            Err(err).with_context(|| diagnostics::error_message("cannot save person"))
        }
    }
}

/// Hydrate every document in `path` and report the first rule each breaks.
fn validate_file(path: &str) -> Result<()> {
    let text = std::fs::read_to_string(path)
        .with_context(|| diagnostics::error_message(format!("read {}", path)))?;
    let docs: Vec<serde_json::Value> = serde_json::from_str(&text).with_context(|| {
        diagnostics::error_message(format!("{} must hold a JSON array of people", path))
    })?;

    let mut invalid = 0usize;
    for (index, doc) in docs.into_iter().enumerate() {
        let person = model::into_attributes(doc)
            .and_then(Person::hydrate)
            .with_context(|| diagnostics::error_message(format!("{}[{}]", path, index)))?;
        let label = person
            .id()
            .map(str::to_string)
            .unwrap_or_else(|| format!("#{}", index));

        match person.validate(&person.to_json(), &ValidateOptions::default()) {
            Some(message) => {
                invalid += 1;
                println!("{}: {}", label, message);
            }
            None => println!("{}: ok", label),
        }
    }

    if invalid > 0 {
        bail!(
            "{}",
            diagnostics::error_message(format!("{} invalid record(s) in {}", invalid, path))
        );
    }
    Ok(())
}
