use twistscan::app::App;
use twistscan::cli::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::from_args();
    let code = match App::run(&cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e}");
            1
        }
    };
    std::process::exit(code);
}
