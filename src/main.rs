use env_logger::Env;
use ninja_samurai::ui::GameController;
use std::process;

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();

    let mut controller = GameController::new();
    match controller.run() {
        Ok(Some(winner)) => println!("\n{} wins. Thanks for playing!\n", winner),
        Ok(None) => println!("\nGoodbye!\n"),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}
