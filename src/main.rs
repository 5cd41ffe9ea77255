// pyfront: tokenizer, symbol table and parse tree viewer for a Python-like language

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, ValueEnum};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use pyfront::config::{Config, LexerOptions, ScopePolicy};
use pyfront::ui::App;
use pyfront::{analyze, dot, report, Analysis};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ScopeArg {
    /// `if`/`for`/`while`/`elif`/`else` also open scopes
    Blocks,
    /// Only `def` and `class` open scopes
    Lexical,
}

impl From<ScopeArg> for ScopePolicy {
    fn from(arg: ScopeArg) -> Self {
        match arg {
            ScopeArg::Blocks => ScopePolicy::ControlBlocks,
            ScopeArg::Lexical => ScopePolicy::Lexical,
        }
    }
}

/// Tokenize, build the symbol table for and parse a Python-like source file.
#[derive(Debug, Parser)]
#[command(name = "pyfront", version, about, long_about = None)]
struct Cli {
    /// Source file to analyze (`-` reads standard input)
    file: PathBuf,

    /// Print the results and exit instead of opening the viewer
    #[arg(long)]
    print: bool,

    /// With --print: include the token table
    #[arg(long, requires = "print")]
    tokens: bool,

    /// With --print: include the symbol table
    #[arg(long, requires = "print")]
    symbols: bool,

    /// With --print: include the parse tree outline
    #[arg(long, requires = "print")]
    tree: bool,

    /// With --print: include the diagnostics
    #[arg(long, requires = "print")]
    errors: bool,

    /// Write the parse tree as a Graphviz DOT graph
    #[arg(long, value_name = "PATH")]
    dot: Option<PathBuf>,

    /// Column stop for tabs in indentation
    #[arg(long, default_value_t = 8, value_parser = clap::value_parser!(u16).range(1..))]
    tab_width: u16,

    /// Which block headers open symbol table scopes
    #[arg(long, value_enum, default_value_t = ScopeArg::Blocks)]
    scopes: ScopeArg,

    /// Increase logging verbosity (-v: info, -vv: debug, -vvv: trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn config(&self) -> Config {
        Config {
            lexer: LexerOptions {
                tab_width: usize::from(self.tab_width),
            },
            scopes: self.scopes.into(),
        }
    }

    /// Sections to print; none selected means all of them.
    fn sections(&self) -> [bool; 4] {
        let chosen = [self.tokens, self.symbols, self.tree, self.errors];
        if chosen.iter().any(|&on| on) {
            chosen
        } else {
            [true; 4]
        }
    }
}

fn directive_for_verbosity(v: u8) -> &'static str {
    match v {
        0 => "pyfront=warn",
        1 => "pyfront=info",
        2 => "pyfront=debug",
        _ => "pyfront=trace",
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(directive_for_verbosity(cli.verbose))),
        )
        .with_writer(io::stderr)
        .init();

    match run(&cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::from(2)
        }
    }
}

fn run(cli: &Cli) -> Result<ExitCode> {
    let source = read_source(&cli.file)?;
    let analysis = analyze(&source, &cli.config());

    if let Some(path) = &cli.dot {
        fs::write(path, dot::to_dot(&analysis.tree))
            .with_context(|| format!("failed to write DOT graph to '{}'", path.display()))?;
        info!(path = %path.display(), "parse tree exported");
    }

    if cli.print {
        print_report(&analysis, cli.sections());
        return Ok(if analysis.is_clean() {
            ExitCode::SUCCESS
        } else {
            ExitCode::from(1)
        });
    }

    // --dot alone is a batch run
    if cli.dot.is_some() {
        return Ok(ExitCode::SUCCESS);
    }

    let name = cli.file.display().to_string();
    run_viewer(analysis, name).context("terminal viewer failed")?;
    Ok(ExitCode::SUCCESS)
}

fn read_source(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut source = String::new();
        io::stdin()
            .read_to_string(&mut source)
            .context("failed to read standard input")?;
        return Ok(source);
    }
    let source = fs::read_to_string(path)
        .with_context(|| format!("failed to read '{}'", path.display()))?;
    debug!(path = %path.display(), bytes = source.len(), "source loaded");
    Ok(source)
}

fn print_report(analysis: &Analysis, [tokens, symbols, tree, errors]: [bool; 4]) {
    if tokens {
        println!("TOKENS");
        print!("{}", report::token_table(&analysis.tokens));
        println!();
    }
    if symbols {
        println!("SYMBOL TABLE");
        print!("{}", report::symbol_table(&analysis.symbols));
        println!();
    }
    if tree {
        println!("PARSE TREE");
        print!("{}", report::tree_outline(&analysis.tree));
        println!();
    }
    if errors {
        println!("ERRORS");
        print!("{}", report::diagnostics(&analysis.diagnostics()));
    }
}

fn run_viewer(analysis: Analysis, name: String) -> Result<()> {
    // Set up terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(analysis, name);
    let res = app.run(&mut terminal);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res?;
    Ok(())
}
