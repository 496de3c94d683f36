use anyhow::Result;
use sheet2csv::convert::{INPUT_PATH, OUTPUT_PATH, convert};
use tracing_subscriber::{EnvFilter, fmt};

fn main() -> Result<()> {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(std::io::stderr)
        .init();

    convert(INPUT_PATH, OUTPUT_PATH)?;
    println!("Conversion complete! File saved as {OUTPUT_PATH}");
    Ok(())
}
