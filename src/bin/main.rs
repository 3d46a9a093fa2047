use anyhow::{Context, Result};
use callsuper::parser::parse_java;
use callsuper::{CheckSession, ClassName, Config};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "callsuper")]
#[command(about = "Checks that overrides of @MustCallSuper methods call super first")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check classes of a source tree
    Check {
        /// Qualified names of the top-level classes to check
        #[arg(value_name = "CLASS")]
        classes: Vec<String>,

        /// Source root (defaults to $CALLSUPER_SOURCE_ROOT, then src/main/java)
        #[arg(short, long, value_name = "DIR")]
        source_root: Option<PathBuf>,

        /// Qualified name of the marker annotation
        #[arg(short, long, value_name = "NAME")]
        marker: Option<String>,

        /// Report every violation instead of stopping at the first
        #[arg(short, long)]
        all: bool,
    },

    /// Show the obligations of a class
    Obligations {
        /// Qualified class name
        #[arg(value_name = "CLASS")]
        class: String,

        /// Source root (defaults to $CALLSUPER_SOURCE_ROOT, then src/main/java)
        #[arg(short, long, value_name = "DIR")]
        source_root: Option<PathBuf>,

        /// Qualified name of the marker annotation
        #[arg(short, long, value_name = "NAME")]
        marker: Option<String>,
    },

    /// Parse a .java file and show the AST
    Parse {
        /// Input .java file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Show detailed AST information
        #[arg(short, long)]
        detailed: bool,
    },

    /// Lexically analyze a .java file
    Lex {
        /// Input .java file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Show token locations
        #[arg(short, long)]
        locations: bool,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match &cli.command {
        Commands::Check { classes, source_root, marker, all } => {
            let config = build_config(source_root.as_ref(), marker.as_deref())?.accumulate(*all);
            check(config, classes)?;
        }
        Commands::Obligations { class, source_root, marker } => {
            let config = build_config(source_root.as_ref(), marker.as_deref())?;
            show_obligations(config, class)?;
        }
        Commands::Parse { input, detailed } => {
            parse_file(input, *detailed)?;
        }
        Commands::Lex { input, locations } => {
            lex_file(input, *locations)?;
        }
    }

    Ok(())
}

fn build_config(source_root: Option<&PathBuf>, marker: Option<&str>) -> Result<Config> {
    let mut config = Config::from_env();
    if let Some(root) = source_root {
        config = config.with_source_root(Config::resolve_source_root(Some(root.as_path())));
    }
    if let Some(marker) = marker {
        config = config.with_marker(marker);
    }
    config.validate()?;
    Ok(config)
}

fn check(config: Config, classes: &[String]) -> Result<()> {
    let classes: Vec<ClassName> = classes.iter().map(|c| ClassName::from(c.as_str())).collect();
    callsuper::check_tree(config, &classes)?;
    println!("No call-super violations found");
    Ok(())
}

fn show_obligations(config: Config, class: &str) -> Result<()> {
    let mut session = CheckSession::from_config(config)?;
    let class = ClassName::from(class);
    let obligations = session.obligations(&class);
    if obligations.is_empty() {
        println!("{} has no call-super obligations", class);
    }
    for obligation in obligations {
        println!(
            "{}.{} must call super.{} of {}",
            class, obligation.subject_method, obligation.ancestor_method, obligation.ancestor_class
        );
    }
    Ok(())
}

fn parse_file(input: &PathBuf, detailed: bool) -> Result<()> {
    let source = fs::read_to_string(input).with_context(|| format!("reading {}", input.display()))?;
    let ast = parse_java(&source)?;

    if detailed {
        println!("{:#?}", ast);
    } else {
        println!("{}", ast);
    }

    Ok(())
}

fn lex_file(input: &PathBuf, locations: bool) -> Result<()> {
    let source = fs::read_to_string(input).with_context(|| format!("reading {}", input.display()))?;
    let lexer = callsuper::parser::Lexer::new(&source);
    let tokens = lexer.tokenize().map_err(|e| anyhow::anyhow!("Lexical error: {}", e))?;

    for token in tokens {
        if locations {
            println!("{:?} at {}:{}", token.token_type(), token.location().line, token.location().column);
        } else {
            println!("{:?}: '{}'", token.token_type(), token.lexeme());
        }
    }

    Ok(())
}
