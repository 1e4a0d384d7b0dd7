use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    tokenscope::example_apps::run_render_dataset(std::env::args().skip(1), &mut out)
}
