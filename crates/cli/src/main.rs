//! Vaultguard CLI — guardian actions from the shell.
//!
//! One action per invocation: `vaultguard [flags] COMMAND`. Storage problems
//! degrade (the guardian keeps answering from memory); actuator problems
//! exit non-zero with the transport's diagnostic on stderr.

use std::process;
use std::time::Duration;

use clap::{Arg, ArgAction, ArgMatches, Command};
use tracing_subscriber::EnvFilter;

use vaultguard::{access_report, Guardian, MosquittoActuator, DEFAULT_CHANNEL};

fn build_cli() -> Command {
    Command::new("vaultguard")
        .about("Access-gate guardian for the relay-locked vault")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("db")
                .long("db")
                .value_name("PATH")
                .help("Ledger file path (default: ~/.vault_guardian/ledger.vlg)"),
        )
        .arg(
            Arg::new("ephemeral")
                .long("ephemeral")
                .action(ArgAction::SetTrue)
                .help("Keep the ledger in memory only"),
        )
        .arg(
            Arg::new("broker")
                .long("broker")
                .value_name("HOST")
                .default_value("localhost")
                .help("MQTT broker host for the relay"),
        )
        .arg(
            Arg::new("channel")
                .long("channel")
                .value_name("NAME")
                .default_value(DEFAULT_CHANNEL)
                .help("Control channel to publish relay commands on"),
        )
        .arg(
            Arg::new("timeout-ms")
                .long("timeout-ms")
                .value_name("MS")
                .value_parser(clap::value_parser!(u64))
                .default_value("5000")
                .help("Bound on a single relay publish attempt"),
        )
        .subcommand(
            Command::new("history")
                .about("Report when the vault was last opened and how heavily it is used")
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Emit the raw access report as JSON"),
                ),
        )
        .subcommand(
            Command::new("unlock")
                .about("Unlock the vault, recording justification and intended use")
                .arg(Arg::new("justification").required(true))
                .arg(Arg::new("intended-use").required(true)),
        )
        .subcommand(Command::new("lock").about("Lock the vault back into its resting state"))
        .subcommand(Command::new("contract").about("Generate a usage contract"))
        .subcommand(Command::new("questions").about("Generate access review questions"))
        .subcommand(Command::new("log").about("List every recorded vault event, oldest first"))
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let matches = build_cli().get_matches();
    let guardian = open_guardian(&matches);

    let exit_code = match matches.subcommand() {
        Some(("history", sub)) => run_history(&guardian, sub),
        Some(("unlock", sub)) => run_unlock(&guardian, sub),
        Some(("lock", _)) => run_lock(&guardian),
        Some(("contract", _)) => {
            println!("{}", guardian.generate_contract());
            0
        }
        Some(("questions", _)) => {
            println!("{}", guardian.generate_review_questions());
            0
        }
        Some(("log", _)) => run_log(&guardian),
        _ => unreachable!("subcommand required"),
    };
    process::exit(exit_code);
}

fn open_guardian(matches: &ArgMatches) -> Guardian<MosquittoActuator> {
    let mut builder = Guardian::builder()
        .broker(matches.get_one::<String>("broker").unwrap().clone())
        .channel(matches.get_one::<String>("channel").unwrap().clone())
        .timeout(Duration::from_millis(
            *matches.get_one::<u64>("timeout-ms").unwrap(),
        ));

    if matches.get_flag("ephemeral") {
        builder = builder.ephemeral();
    } else if let Some(path) = matches.get_one::<String>("db") {
        builder = builder.path(path);
    }

    builder.open()
}

fn run_history(guardian: &Guardian<MosquittoActuator>, sub: &ArgMatches) -> i32 {
    if sub.get_flag("json") {
        let report = access_report(guardian.ledger());
        match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("failed to encode report: {e}");
                return 1;
            }
        }
    } else {
        println!("{}", guardian.check_access_history());
    }
    0
}

fn run_unlock(guardian: &Guardian<MosquittoActuator>, sub: &ArgMatches) -> i32 {
    let justification = sub.get_one::<String>("justification").unwrap();
    let intended_use = sub.get_one::<String>("intended-use").unwrap();

    match guardian.try_unlock(justification, intended_use) {
        Ok(transition) => {
            println!("Vault unlocked. Access granted for: '{intended_use}'");
            if let Some(warning) = transition.audit_warning {
                eprintln!("WARNING: audit record was not written: {warning}");
            }
            0
        }
        Err(e) => {
            eprintln!("Error unlocking vault: {e}");
            1
        }
    }
}

fn run_lock(guardian: &Guardian<MosquittoActuator>) -> i32 {
    match guardian.try_lock() {
        Ok(transition) => {
            println!("Vault secured.");
            if let Some(warning) = transition.audit_warning {
                eprintln!("WARNING: audit record was not written: {warning}");
            }
            0
        }
        Err(e) => {
            eprintln!("Error securing vault: {e}");
            1
        }
    }
}

fn run_log(guardian: &Guardian<MosquittoActuator>) -> i32 {
    let events = guardian.ledger().events();
    if events.is_empty() {
        println!("(no events recorded)");
        return 0;
    }
    for event in events {
        let mut line = format!("{:>4}  {}  {:<7}", event.id, event.timestamp, event.kind);
        if !event.details.is_empty() {
            line.push_str(&format!("  {}", event.details));
        }
        if !event.usage_intent.is_empty() {
            line.push_str(&format!("  ({})", event.usage_intent));
        }
        println!("{line}");
    }
    0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_unlock() {
        let matches = build_cli()
            .try_get_matches_from(["vaultguard", "unlock", "fix alarm", "set morning alarm"])
            .unwrap();
        let (name, sub) = matches.subcommand().unwrap();
        assert_eq!(name, "unlock");
        assert_eq!(sub.get_one::<String>("justification").unwrap(), "fix alarm");
    }

    #[test]
    fn cli_requires_a_subcommand() {
        assert!(build_cli().try_get_matches_from(["vaultguard"]).is_err());
    }

    #[test]
    fn channel_default_is_the_library_constant() {
        let matches = build_cli()
            .try_get_matches_from(["vaultguard", "lock"])
            .unwrap();
        assert_eq!(
            matches.get_one::<String>("channel").unwrap(),
            DEFAULT_CHANNEL
        );
    }

    #[test]
    fn cli_accepts_store_and_broker_flags() {
        let matches = build_cli()
            .try_get_matches_from([
                "vaultguard",
                "--db",
                "/tmp/ledger.vlg",
                "--broker",
                "mqtt.local",
                "--timeout-ms",
                "250",
                "history",
                "--json",
            ])
            .unwrap();
        assert_eq!(matches.get_one::<String>("db").unwrap(), "/tmp/ledger.vlg");
        assert_eq!(*matches.get_one::<u64>("timeout-ms").unwrap(), 250);
        let (_, sub) = matches.subcommand().unwrap();
        assert!(sub.get_flag("json"));
    }
}
