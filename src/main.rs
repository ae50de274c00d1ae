use clap::Parser;
use miette::Result;
use qat::cli::{Cli, Commands};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> Result<()> {
    // Reset SIGPIPE to default behavior (terminate silently) for proper Unix piping.
    // Without this, piping to `head`, `grep -q`, etc. causes a panic on broken pipe.
    #[cfg(unix)]
    {
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }
    }
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    let global = cli.global;
    init_tracing(global.verbose);

    match cli.command {
        Commands::Init(args) => qat::cli::commands::init::run(args),
        Commands::Project(cmd) => qat::cli::commands::project::run(cmd, &global),
        Commands::User(cmd) => qat::cli::commands::user::run(cmd, &global),
        Commands::File(cmd) => qat::cli::commands::file::run(cmd, &global),
        Commands::TestCase(cmd) => qat::cli::commands::test_case::run(cmd, &global),
        Commands::Defect(cmd) => qat::cli::commands::defect::run(cmd, &global),
        Commands::Import(args) => qat::cli::commands::import::run(args, &global),
        Commands::Export(args) => qat::cli::commands::export::run(args, &global),
        Commands::Audit(cmd) => qat::cli::commands::audit::run(cmd, &global),
        Commands::Config(cmd) => qat::cli::commands::config::run(cmd, &global),
        Commands::Completions(args) => qat::cli::commands::completions::run(args),
    }
}

/// Log to stderr; `QAT_LOG` overrides the level picked by `--verbose`
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_env("QAT_LOG").unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}
