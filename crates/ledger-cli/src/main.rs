use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use ledger_core::{Ledger, LedgerConfig};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "ledger-cli")]
#[command(about = "Interactive shell over an in-memory hash-chained token ledger")]
struct Args {
    /// TOML file with ledger settings
    #[arg(long)]
    config: Option<PathBuf>,
    /// Leading zero hex digits required of mined blocks
    #[arg(long)]
    difficulty: Option<usize>,
    /// Give up mining a block after this many hashes
    #[arg(long)]
    max_attempts: Option<u64>,
    /// Mine on all cores
    #[arg(long)]
    parallel: bool,
}

#[derive(Parser, Debug)]
#[command(no_binary_name = true, name = "ledger")]
struct Line {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a wallet
    Register { name: String },
    /// List wallets and balances
    Wallets,
    /// Show a wallet's balance
    Balance { name: String },
    /// Credit a wallet from outside the ledger
    Receive {
        name: String,
        amount: u64,
        #[arg(long)]
        label: Option<String>,
    },
    /// Transfer between wallets
    Send {
        from: String,
        to: String,
        amount: u64,
        #[arg(long)]
        label: Option<String>,
    },
    /// Print a wallet's history as CSV, or write it to a file
    History {
        name: String,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Set mining difficulty for future blocks
    Difficulty { level: usize },
    /// Print the chain, or write it to a file
    Chain {
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Check hash links and proof-of-work of every block
    Verify,
    /// Print every Merkle level
    Merkle,
    /// Leave the shell
    #[command(alias = "exit")]
    Quit,
}

fn load_config(args: &Args) -> Result<LedgerConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            LedgerConfig::from_toml_str(&text)
                .with_context(|| format!("parsing {}", path.display()))?
        }
        None => LedgerConfig::default(),
    };
    if let Some(difficulty) = args.difficulty {
        config.difficulty = difficulty;
    }
    if args.max_attempts.is_some() {
        config.max_attempts = args.max_attempts;
    }
    config.parallel_mining |= args.parallel;
    Ok(config)
}

/// Whitespace split that keeps double-quoted runs together.
fn split_words(line: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    let mut pending = false;
    for c in line.chars() {
        match c {
            '"' => {
                quoted = !quoted;
                pending = true;
            }
            c if c.is_whitespace() && !quoted => {
                if pending {
                    words.push(std::mem::take(&mut current));
                    pending = false;
                }
            }
            c => {
                current.push(c);
                pending = true;
            }
        }
    }
    if pending {
        words.push(current);
    }
    words
}

fn emit(text: &str, out: Option<PathBuf>) -> Result<()> {
    match out {
        Some(path) => {
            std::fs::write(&path, text).with_context(|| format!("writing {}", path.display()))?;
            println!("wrote {}", path.display());
        }
        None => println!("{text}"),
    }
    Ok(())
}

/// Runs one command. Returns `false` when the shell should exit.
fn dispatch(ledger: &mut Ledger, cmd: Command) -> Result<bool> {
    match cmd {
        Command::Register { name } => {
            ledger.register(&name)?;
            println!("Wallet '{name}' created successfully.");
        }
        Command::Wallets => {
            for account in ledger.accounts() {
                println!("{}\t{} tokens", account.name, account.balance);
            }
        }
        Command::Balance { name } => {
            println!("{} tokens", ledger.balance_of(&name)?);
        }
        Command::Receive {
            name,
            amount,
            label,
        } => {
            let receipt = ledger.receive(&name, amount, label.as_deref())?;
            println!("{receipt}");
        }
        Command::Send {
            from,
            to,
            amount,
            label,
        } => {
            let receipt = ledger.send(&from, &to, amount, label.as_deref())?;
            println!("{receipt}");
        }
        Command::History { name, out } => emit(&ledger.export_history(&name)?, out)?,
        Command::Difficulty { level } => {
            ledger.set_difficulty(level)?;
            println!("Mining difficulty set to {level}");
        }
        Command::Chain { out } => emit(&ledger.export_chain(), out)?,
        Command::Verify => {
            ledger.blockchain().verify()?;
            println!("chain ok: {} blocks", ledger.blocks().len());
        }
        Command::Merkle => {
            if ledger.merkle_tree().is_empty() {
                println!("No transactions in the blockchain yet.");
            }
            for (depth, level) in ledger.merkle_levels().iter().enumerate() {
                println!("level {depth}: {}", level.join(" "));
            }
        }
        Command::Quit => return Ok(false),
    }
    Ok(true)
}

fn main() -> Result<()> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let config = load_config(&args)?;
    debug!(?config, "starting ledger");
    let mut ledger = Ledger::new(config)?;

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    loop {
        print!("ledger> ");
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let words = split_words(&line);
        if words.is_empty() {
            continue;
        }

        let cmd = match Line::try_parse_from(words) {
            Ok(parsed) => parsed.cmd,
            Err(e) => {
                // Help and usage errors both render here.
                print!("{e}");
                continue;
            }
        };
        match dispatch(&mut ledger, cmd) {
            Ok(true) => {}
            Ok(false) => break,
            Err(e) => println!("error: {e}"),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_keeps_quoted_labels() {
        assert_eq!(
            split_words(r#"send Alice Bob 5 --label "rent for may""#),
            vec!["send", "Alice", "Bob", "5", "--label", "rent for may"]
        );
        assert_eq!(split_words("  balance   Alice \n"), vec!["balance", "Alice"]);
        assert_eq!(split_words(r#"receive Alice 1 --label """#).last().unwrap(), "");
    }

    #[test]
    fn lines_parse_into_commands() {
        let line = Line::try_parse_from(split_words("receive Alice 10 --label gift")).unwrap();
        assert!(matches!(
            line.cmd,
            Command::Receive { ref name, amount: 10, label: Some(ref l) } if name == "Alice" && l == "gift"
        ));
        assert!(Line::try_parse_from(split_words("send Alice Bob -3")).is_err());
        assert!(matches!(
            Line::try_parse_from(["exit"]).unwrap().cmd,
            Command::Quit
        ));
    }

    #[test]
    fn dispatch_reports_ledger_errors() {
        let mut ledger = Ledger::with_difficulty(0).unwrap();
        assert!(dispatch(&mut ledger, Command::Register { name: "Alice".into() }).unwrap());
        let err = dispatch(&mut ledger, Command::Balance { name: "Bob".into() }).unwrap_err();
        assert_eq!(err.to_string(), "Wallet 'Bob' does not exist.");
        assert!(!dispatch(&mut ledger, Command::Quit).unwrap());
    }

    #[test]
    fn flags_override_config_file_values() {
        let args = Args::parse_from(["ledger-cli", "--difficulty", "3", "--parallel"]);
        let config = load_config(&args).unwrap();
        assert_eq!(config.difficulty, 3);
        assert!(config.parallel_mining);
        assert_eq!(config.max_attempts, None);
    }
}
