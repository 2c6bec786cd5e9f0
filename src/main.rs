use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    geechat::cli::main()
}
