#[tokio::main]
async fn main() {
    if let Err(error) = pomodoro_card::run().await {
        eprintln!("pomodoro-card: {error}");
        std::process::exit(1);
    }
}
