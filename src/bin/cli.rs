//! flatstore CLI
//!
//! Command-line interface over a single table file pair.

use std::io::{self, BufRead, Write};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use flatstore::{
    Config, FieldDescriptor, FieldType, FlatError, Result, SyncStrategy, Table, Value,
};
use tracing_subscriber::{fmt, EnvFilter};

/// flatstore CLI
#[derive(Parser, Debug)]
#[command(name = "flatstore")]
#[command(about = "A type based flat-file storage model")]
#[command(version)]
struct Args {
    /// Directory holding the table files
    #[arg(short = 'P', long, default_value = ".")]
    path: String,

    /// Table name (base name of the .dbf/.idx files)
    #[arg(short = 'N', long, default_value = "Storage")]
    name: String,

    /// fsync after every write
    #[arg(long)]
    sync: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create (or reset) the table with the given fields
    Init {
        /// Field as NAME:TYPE[:LENGTH], e.g. Id:int32 or Code:string:4
        #[arg(short, long = "field", required = true)]
        fields: Vec<String>,
    },

    /// Show header and schema
    Info,

    /// Append a row
    Create {
        /// One value per field, in schema order
        values: Vec<String>,
    },

    /// Insert a row at a position, shifting later rows up
    Insert {
        row: usize,
        values: Vec<String>,
    },

    /// Print one row as CSV
    Read { row: usize },

    /// Overwrite a row
    Update {
        row: usize,
        values: Vec<String>,
    },

    /// Delete a row, shifting later rows down
    Delete { row: usize },

    /// Print every row as CSV
    List,

    /// Append one row per CSV line from stdin (the format `list` prints)
    Load,

    /// Delete every row, keeping the schema
    Clear,

    /// Delete the table files
    Drop,
}

fn main() -> ExitCode {
    // Logs go to stderr so stdout carries only data
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,flatstore=info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    let config = Config::builder()
        .dir(&args.path)
        .name(&args.name)
        .sync_strategy(if args.sync {
            SyncStrategy::EveryWrite
        } else {
            SyncStrategy::OsBuffered
        })
        .build();

    match run(Table::new(config), args.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(table: Table, command: Commands) -> Result<()> {
    match command {
        Commands::Init { fields } => {
            let descriptors = fields
                .iter()
                .map(|arg| parse_field(arg))
                .collect::<Result<Vec<_>>>()?;
            table.reset()?;
            for descriptor in descriptors {
                table.add_field(descriptor)?;
            }
            println!("initialised {} fields", table.field_count()?);
            Ok(())
        }
        Commands::Drop => {
            if table.close()? {
                println!("dropped");
                Ok(())
            } else {
                Err(FlatError::NotFound(table.config().data_path()))
            }
        }
        command => {
            if !table.open()? {
                return Err(FlatError::NotFound(table.config().data_path()));
            }
            run_open(&table, command)
        }
    }
}

fn run_open(table: &Table, command: Commands) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match command {
        Commands::Info => {
            let header = table.header()?;
            writeln!(out, "rows:       {}", header.size)?;
            writeln!(out, "pointer:    {}", header.pointer)?;
            writeln!(out, "data start: {}", header.data_start)?;
            writeln!(out, "slots:      {}", header.item_count)?;
            for (i, field) in table.fields()?.iter().enumerate() {
                let length = match field.fixed_length() {
                    Some(len) => format!("[{}]", len),
                    None => String::new(),
                };
                let key = if field.primary_key { " (key)" } else { "" };
                writeln!(out, "  {}: {} {}{}{}", i, field.name, field.field_type, length, key)?;
            }
        }
        Commands::Create { values } => {
            let row = table.create(&parse_values(table, &values)?)?;
            writeln!(out, "{}", row)?;
        }
        Commands::Insert { row, values } => {
            table.insert(row, &parse_values(table, &values)?)?;
        }
        Commands::Read { row } => match table.read(row)? {
            Some(values) => writeln!(out, "{}", to_csv(&values))?,
            None => return Err(FlatError::IndexOutOfRange { index: row, len: 0 }),
        },
        Commands::Update { row, values } => {
            let placement = table.update(row, &parse_values(table, &values)?)?;
            tracing::debug!(row, ?placement, "updated");
        }
        Commands::Delete { row } => table.delete(row)?,
        Commands::List => {
            let names: Vec<Value> = table
                .fields()?
                .into_iter()
                .map(|field| Value::Text(field.name))
                .collect();
            writeln!(out, "{}", to_csv(&names))?;
            for row in table.rows() {
                writeln!(out, "{}", to_csv(&row?))?;
            }
        }
        Commands::Load => {
            let mut loaded = 0usize;
            for line in io::stdin().lock().lines() {
                let line = line?;
                if line.trim().is_empty() {
                    continue;
                }
                table.create(&parse_values(table, &from_csv(&line)?)?)?;
                loaded += 1;
            }
            writeln!(out, "loaded {} rows", loaded)?;
        }
        Commands::Clear => {
            table.clear()?;
        }
        Commands::Init { .. } | Commands::Drop => {
            return Err(FlatError::InvalidOperation(
                "command does not run against an open table".to_string(),
            ))
        }
    }
    Ok(())
}

/// `NAME:TYPE[:LENGTH]`
fn parse_field(arg: &str) -> Result<FieldDescriptor> {
    let mut parts = arg.splitn(3, ':');
    let name = parts.next().unwrap_or_default();
    let field_type: FieldType = parts
        .next()
        .ok_or_else(|| FlatError::Argument(format!("field '{}' has no type", arg)))?
        .parse()?;

    let mut descriptor = FieldDescriptor::new(name, field_type);
    if let Some(length) = parts.next() {
        let length: i8 = length
            .parse()
            .map_err(|e| FlatError::Argument(format!("invalid length in '{}': {}", arg, e)))?;
        descriptor = descriptor.with_length(length);
    }
    descriptor.validate()?;
    Ok(descriptor)
}

fn parse_values(table: &Table, values: &[String]) -> Result<Vec<Value>> {
    let fields = table.fields()?;
    if fields.len() != values.len() {
        return Err(FlatError::Argument(format!(
            "expected {} values, got {}",
            fields.len(),
            values.len()
        )));
    }
    fields
        .iter()
        .zip(values)
        .map(|(field, text)| Value::parse(field.field_type, text))
        .collect()
}

fn to_csv(values: &[Value]) -> String {
    values
        .iter()
        .map(|value| {
            let text = value.to_string();
            if text.contains([',', '"', '\n']) {
                format!("\"{}\"", text.replace('"', "\"\""))
            } else {
                text
            }
        })
        .collect::<Vec<_>>()
        .join(",")
}

/// Split one CSV line, honouring `"`-quoted cells and `""` escapes
fn from_csv(line: &str) -> Result<Vec<String>> {
    let mut cells = Vec::new();
    let mut cell = String::new();
    let mut quoted = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match (c, quoted) {
            ('"', true) if chars.peek() == Some(&'"') => {
                chars.next();
                cell.push('"');
            }
            ('"', true) => quoted = false,
            ('"', false) if cell.is_empty() => quoted = true,
            (',', false) => cells.push(std::mem::take(&mut cell)),
            (c, _) => cell.push(c),
        }
    }
    if quoted {
        return Err(FlatError::Argument(format!("unterminated quote in '{}'", line)));
    }
    cells.push(cell);
    Ok(cells)
}
