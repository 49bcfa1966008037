use clap::Parser;
use corpdb::cli::{commands, Cli, Commands, GlobalOpts};
use miette::Result;
use tracing_subscriber::EnvFilter;

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
    init_tracing(&global);

    match cli.command {
        Commands::Init(args) => commands::init::run(args, &global),
        Commands::List => commands::list::run(&global),
        Commands::Search(args) => commands::search::run(args, &global),
        Commands::Group(args) => commands::group::run(args, &global),
        Commands::Add(args) => commands::add::run(args, &global),
        Commands::Modify(args) => commands::modify::run(args, &global),
        Commands::Delete(args) => commands::delete::run(args, &global),
        Commands::Departments => commands::departments::run(&global),
        Commands::Admin(cmd) => commands::admin::run(cmd, &global),
        Commands::Login(args) => commands::login::run(args, &global),
        Commands::Completions(args) => commands::completions::run(args),
    }
}

/// Log to stderr; `CORPDB_LOG` takes a filter, `--verbose` forces debug
fn init_tracing(global: &GlobalOpts) {
    let filter = if global.verbose {
        EnvFilter::new("corpdb=debug")
    } else {
        EnvFilter::try_from_env("CORPDB_LOG").unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
