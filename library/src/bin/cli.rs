use autonode::LibraryError;
use autonode::run;

fn main() -> Result<(), LibraryError> {
    env_logger::init();
    run(std::env::args().collect())
}
