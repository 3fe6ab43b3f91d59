use crate::demo::{run_demo, DemoArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use waqti::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Waqti marketplace API",
    about = "Serve the Waqti marketplace workflows over HTTP or run a scripted demo",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Walk through onboarding, verification, the admin console and saved searches
    Demo(DemoArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Owner id given to the bundled saved searches
    #[arg(long, default_value = "demo-user")]
    pub(crate) seed_owner: String,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or_else(|| {
        Command::Serve(ServeArgs {
            seed_owner: "demo-user".to_string(),
            ..ServeArgs::default()
        })
    });

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Demo(args) => run_demo(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_flags_parse() {
        let cli = Cli::try_parse_from(["waqti-api", "demo", "--today", "2024-02-12", "--skip-admin"])
            .expect("arguments parse");
        match cli.command {
            Some(Command::Demo(args)) => {
                assert!(args.skip_admin);
                assert_eq!(
                    args.today.map(|date| date.to_string()).as_deref(),
                    Some("2024-02-12")
                );
            }
            other => panic!("expected demo command, got {other:?}"),
        }
    }

    #[test]
    fn serve_defaults_seed_owner() {
        let cli = Cli::try_parse_from(["waqti-api", "serve", "--port", "8080"]).expect("arguments parse");
        match cli.command {
            Some(Command::Serve(args)) => {
                assert_eq!(args.port, Some(8080));
                assert_eq!(args.seed_owner, "demo-user");
            }
            other => panic!("expected serve command, got {other:?}"),
        }
    }
}
