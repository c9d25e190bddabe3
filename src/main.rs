use clap::Parser;
use ghoststore::Opts;
use ghoststore::cli::SubCommandExtend;
use ghoststore::config::SubCommand;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let opts = Opts::parse();
    match &opts.subcmd {
        SubCommand::Init(cmd) => cmd.run().await,
        SubCommand::Add(cmd) => cmd.run().await,
        SubCommand::Server(cmd) => cmd.run().await,
    }
}
