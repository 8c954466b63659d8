use clap::{Args, Parser, Subcommand};
use roster::config::{self, Config};
use roster::{NewRecord, RosterError, Store};
use std::io::{self, Write};
use std::path::PathBuf;

const CHART_WIDTH: usize = 40;

#[derive(Parser, Debug)]
#[command(name = "roster", version, about = "Personnel registry with name ordering and similarity search")]
pub struct Cli {
    /// Snapshot file loaded at startup and rewritten after every add
    #[arg(long, global = true, env = config::ENV_SNAPSHOT, default_value = config::DEFAULT_SNAPSHOT)]
    pub snapshot: PathBuf,

    /// Log filter, e.g. `info` or `roster=debug`
    #[arg(long, global = true, env = config::ENV_LOG, default_value = config::DEFAULT_LOG_FILTER)]
    pub log: String,

    /// Starts the REPL when omitted
    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Cli {
    pub fn config(&self) -> Config {
        Config {
            snapshot: self.snapshot.clone(),
            log_filter: self.log.clone(),
        }
    }
}

/// One line of REPL input, parsed with the same subcommands as the CLI.
#[derive(Parser, Debug)]
#[command(name = "roster", no_binary_name = true, disable_version_flag = true)]
struct ReplLine {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Add a record, replacing any record with the same identity
    Add(AddArgs),
    /// List records ordered by identity
    List,
    /// Show one record
    Get { identity: String },
    /// Show the record count
    Count,
    /// Show the records most similar to an identity
    Nearest {
        identity: String,
        /// Number of similar records to show
        #[arg(short, long, default_value_t = config::DEFAULT_K, value_parser = parse_k)]
        k: usize,
    },
    /// Bar chart of compensation per record
    Chart,
    /// Interactive session over the loaded store
    Repl,
    /// Serve the JSON API
    Serve {
        #[arg(long, env = config::ENV_BIND, default_value = config::DEFAULT_BIND)]
        bind: String,
    },
}

#[derive(Args, Debug)]
pub struct AddArgs {
    pub identity: String,
    #[arg(long, default_value = "")]
    pub role: String,
    #[arg(long, default_value = "")]
    pub city: String,
    #[arg(long, default_value = "")]
    pub education: String,
    #[arg(long, default_value = "")]
    pub specialty: String,
    /// Must be zero or more
    #[arg(long, default_value_t = 0.0)]
    pub compensation: f64,
    /// Percentage, 0 to 100
    #[arg(long, default_value_t = 0.0)]
    pub absenteeism: f64,
    /// Performance score, 0 to 100
    #[arg(long, default_value_t = 0.0)]
    pub score: f64,
}

impl From<AddArgs> for NewRecord {
    fn from(args: AddArgs) -> Self {
        NewRecord {
            identity: args.identity,
            role: args.role,
            compensation: args.compensation,
            city: args.city,
            education_level: args.education,
            specialty: args.specialty,
            absenteeism_rate: args.absenteeism,
            performance_score: args.score,
            start_date: None,
        }
    }
}

fn parse_k(s: &str) -> Result<usize, String> {
    match s.parse::<usize>() {
        Ok(k) if k >= 1 => Ok(k),
        _ => Err(format!("invalid k '{}'. Must be a positive integer.", s)),
    }
}

/// Splits a REPL line on whitespace, keeping double-quoted runs together.
fn tokenize(line: &str) -> Result<Vec<String>, String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut quoted = false;

    for c in line.chars() {
        match c {
            '"' => {
                quoted = !quoted;
                in_token = true;
            }
            c if c.is_whitespace() && !quoted => {
                if in_token {
                    tokens.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            c => {
                current.push(c);
                in_token = true;
            }
        }
    }

    if quoted {
        return Err("unterminated quote".to_string());
    }
    if in_token {
        tokens.push(current);
    }
    Ok(tokens)
}

/// REPL mode - interactive session over one loaded store
pub fn run_repl(store: &mut Store) {
    println!("roster - Personnel Registry ({} records)", store.count());
    println!("Type 'help' for commands, 'exit' or 'quit' to quit\n");

    loop {
        print!("roster> ");
        if io::stdout().flush().is_err() {
            break;
        }

        let mut input = String::new();
        match io::stdin().read_line(&mut input) {
            Ok(0) => break,
            Ok(_) => {}
            Err(error) => {
                eprintln!("Error reading input: {}", error);
                continue;
            }
        }

        let input = input.trim();
        if input.is_empty() {
            continue;
        }

        if input == "exit" || input == "quit" {
            println!("Goodbye!");
            break;
        }

        let args = match tokenize(input) {
            Ok(args) => args,
            Err(error) => {
                eprintln!("Error: {}", error);
                continue;
            }
        };

        let command = match ReplLine::try_parse_from(args) {
            Ok(line) => line.command,
            Err(error) => {
                // also covers `help`
                let _ = error.print();
                continue;
            }
        };

        match command {
            Command::Repl | Command::Serve { .. } => eprintln!("Error: not available inside the REPL"),
            command => {
                execute_command(store, command);
            }
        }
    }
}

/// Runs one command against the store. Returns false when it failed.
pub fn execute_command(store: &mut Store, command: Command) -> bool {
    let result = match command {
        Command::Add(args) => add(store, args.into()),
        Command::List => {
            list(store);
            Ok(())
        }
        Command::Get { identity } => get(store, &identity),
        Command::Count => {
            println!("{}", store.count());
            Ok(())
        }
        Command::Nearest { identity, k } => nearest(store, &identity, k),
        Command::Chart => {
            chart(store);
            Ok(())
        }
        Command::Repl | Command::Serve { .. } => Ok(()),
    };

    match result {
        Ok(()) => true,
        Err(error) => {
            eprintln!("Error: {}", error);
            false
        }
    }
}

fn add(store: &mut Store, new: NewRecord) -> Result<(), RosterError> {
    new.check_ranges()?;
    let record = store.add(new)?;
    println!("{} ({}) added", record.identity(), record.role());
    Ok(())
}

fn list(store: &Store) {
    let records = store.sorted_by_identity();
    if records.is_empty() {
        println!("Store is empty");
        return;
    }

    println!("Records by identity:");
    for r in &records {
        println!("  {} - {} - {}", r.identity(), r.role(), r.city());
    }
    println!("Total: {} records", records.len());
}

fn get(store: &Store, identity: &str) -> Result<(), RosterError> {
    let r = store.get(identity)?;
    println!("{}", r.identity());
    println!("  Role:          {}", r.role());
    println!("  City:          {}", r.city());
    println!("  Education:     {}", r.education_level());
    println!("  Specialty:     {}", r.specialty());
    println!("  Compensation:  {:.2}", r.compensation());
    println!("  Absenteeism:   {}%", r.absenteeism_rate());
    println!("  Performance:   {}/100", r.performance_score());
    println!("  Start date:    {}", r.start_date().format("%Y-%m-%d"));
    println!("  Tenure:        {} days", r.tenure_days());
    Ok(())
}

fn nearest(store: &Store, identity: &str, k: usize) -> Result<(), RosterError> {
    let neighbors = store.find_nearest(identity, k)?;
    if neighbors.is_empty() {
        println!("No other records to compare against");
        return Ok(());
    }

    println!("{} records most similar to {}:", neighbors.len(), store.get(identity)?.identity());
    for (rank, n) in neighbors.iter().enumerate() {
        println!(
            "{}. {} - Performance: {}/100 - Absenteeism: {}% - Compensation: {:.2} (distance {:.4})",
            rank + 1,
            n.record.identity(),
            n.record.performance_score(),
            n.record.absenteeism_rate(),
            n.record.compensation(),
            n.distance
        );
    }
    Ok(())
}

fn chart(store: &Store) {
    let series = store.compensation_series();
    if series.is_empty() {
        println!("No records to chart");
        return;
    }

    let label_width = series.iter().map(|(id, _)| id.chars().count()).max().unwrap_or(0);
    let max = series.iter().map(|(_, c)| *c).fold(0.0_f64, f64::max);

    for (identity, compensation) in series {
        println!(
            "{:<width$} | {} {:.2}",
            identity,
            "#".repeat(bar_len(compensation, max)),
            compensation,
            width = label_width
        );
    }
}

fn bar_len(value: f64, max: f64) -> usize {
    if max <= 0.0 || !value.is_finite() || value <= 0.0 {
        return 0;
    }
    ((value / max) * CHART_WIDTH as f64).round() as usize
}

#[cfg(test)]
mod cli_test {
    use super::*;

    #[test]
    fn test_tokenize_plain() {
        assert_eq!(tokenize("nearest ana -k 2").unwrap(), vec!["nearest", "ana", "-k", "2"]);
    }

    #[test]
    fn test_tokenize_quotes() {
        let tokens = tokenize(r#"add "Ana Souza" --city "Sao Paulo""#).unwrap();
        assert_eq!(tokens, vec!["add", "Ana Souza", "--city", "Sao Paulo"]);

        assert_eq!(tokenize(r#"add """#).unwrap(), vec!["add", ""]);
        assert!(tokenize(r#"add "Ana"#).is_err());
    }

    #[test]
    fn test_cli_resolves_config() {
        let cli = Cli::try_parse_from(["roster", "--snapshot", "team.json", "--log", "roster=debug", "list"]).unwrap();
        let config = cli.config();
        assert_eq!(config.snapshot, std::path::PathBuf::from("team.json"));
        assert_eq!(config.log_filter, "roster=debug");
    }

    #[test]
    fn test_parse_k() {
        assert_eq!(parse_k("3"), Ok(3));
        assert!(parse_k("0").is_err());
        assert!(parse_k("-1").is_err());
        assert!(parse_k("abc").is_err());
    }

    #[test]
    fn test_repl_line_parses_add() {
        let line = ReplLine::try_parse_from(["add", "ana", "--role", "nurse", "--compensation", "1500"]).unwrap();
        match line.command {
            Command::Add(args) => {
                let new: NewRecord = args.into();
                assert_eq!(new.identity, "ana");
                assert_eq!(new.role, "nurse");
                assert_eq!(new.compensation, 1500.0);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_repl_line_default_k() {
        let line = ReplLine::try_parse_from(["nearest", "ana"]).unwrap();
        assert!(matches!(line.command, Command::Nearest { k: 3, .. }));
    }

    #[test]
    fn test_execute_add_and_nearest() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = Store::new(dir.path().join("roster.json"));

        for (name, pay) in [("ana", "1000"), ("bea", "1100")] {
            let line = ReplLine::try_parse_from(["add", name, "--compensation", pay]).unwrap();
            assert!(execute_command(&mut store, line.command));
        }
        assert_eq!(store.count(), 2);

        let line = ReplLine::try_parse_from(["nearest", "ana", "-k", "1"]).unwrap();
        assert!(execute_command(&mut store, line.command));

        let line = ReplLine::try_parse_from(["nearest", "nobody"]).unwrap();
        assert!(!execute_command(&mut store, line.command));
    }

    #[test]
    fn test_execute_rejects_out_of_range() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = Store::new(dir.path().join("roster.json"));

        let line = ReplLine::try_parse_from(["add", "ana", "--absenteeism", "150"]).unwrap();
        assert!(!execute_command(&mut store, line.command));
        assert!(store.is_empty());
    }

    #[test]
    fn test_bar_len() {
        assert_eq!(bar_len(100.0, 100.0), CHART_WIDTH);
        assert_eq!(bar_len(50.0, 100.0), CHART_WIDTH / 2);
        assert_eq!(bar_len(0.0, 100.0), 0);
        assert_eq!(bar_len(10.0, 0.0), 0);
    }
}
