use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use platescan::detection::ocr::MODEL_DIR_ENV;
use platescan::{
    AppConfig, OcrsRecognizer, PlateDetector, PlateReading, RecordClient, RecordKind, load_image,
};

#[derive(Parser)]
#[command(name = "platescan")]
#[command(about = "Locate a license plate in an image and read its text")]
struct Cli {
    /// Path to input image file
    #[arg(value_name = "IMAGE")]
    image_path: PathBuf,

    /// TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Directory holding the OCR model files
    #[arg(long, value_name = "DIR")]
    model_dir: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Save debug outputs to directory (must be empty)
    #[arg(long, value_name = "DIR")]
    debug_out: Option<PathBuf>,

    /// Skip OCR step (locate and normalize the plate only)
    #[arg(long)]
    skip_ocr: bool,

    /// Report the recognized plate to the record service
    #[arg(long, value_enum, value_name = "KIND", conflicts_with = "skip_ocr")]
    submit: Option<RecordKind>,

    /// API key for the record service (overrides the config file)
    #[arg(long, value_name = "KEY")]
    api_key: Option<String>,
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "platescan=debug" } else { "platescan=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();
}

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();
    init_tracing(args.verbose);

    let mut config = match &args.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };
    let explicit_dir = args.model_dir.or_else(|| std::env::var_os(MODEL_DIR_ENV).map(PathBuf::from));
    let home = std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(PathBuf::from);
    config.resolve_model_dir(explicit_dir, home);
    if let Some(key) = args.api_key {
        config.submission.api_key = key;
    }

    tracing::debug!(path = %args.image_path.display(), "loading image");
    let img = load_image(&args.image_path)?;
    tracing::debug!(width = img.width(), height = img.height(), "image loaded");

    let mut detector = PlateDetector::new(config.detection.clone());
    if !args.skip_ocr {
        let recognizer = OcrsRecognizer::new(&config.recognizer)?;
        detector = detector.with_recognizer(Arc::new(recognizer));
    }

    let mut pipeline = detector.pipeline();
    if let Some(debug_dir) = args.debug_out {
        pipeline = pipeline.with_debug(debug_dir)?;
    }

    if args.skip_ocr {
        match pipeline.run(img)?.first().and_then(|item| item.bbox) {
            Some(region) => println!(
                "Plate region: x={}..={} y={}..={}",
                region.x, region.end_x(), region.y, region.end_y()
            ),
            None => println!("No plate detected."),
        }
        return Ok(());
    }

    let reading = detector.read_with(&pipeline, img)?;

    let (text, region) = match &reading {
        PlateReading::NotFound => {
            println!("No plate detected.");
            return Ok(());
        }
        PlateReading::Found { text, region } => (text, region),
    };

    println!(
        "Plate region: x={}..={} y={}..={}",
        region.x, region.end_x(), region.y, region.end_y()
    );

    if text.is_empty() {
        println!("Plate found, but no characters were recognized.");
    } else {
        println!("Plate: {}", text);
    }

    if let Some(kind) = args.submit {
        let client = RecordClient::new(config.submission.clone())?;
        let outcome = client.submit(text, kind);
        println!("Submission ({}): {}", kind, outcome);
        if !outcome.is_success() {
            std::process::exit(2);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn submit_conflicts_with_skip_ocr() {
        let parsed = Cli::try_parse_from(["platescan", "car.jpg", "--skip-ocr", "--submit", "entry"]);
        assert!(parsed.is_err());

        let cli = Cli::try_parse_from(["platescan", "car.jpg", "--submit", "exit"]).unwrap();
        assert_eq!(cli.submit, Some(RecordKind::Exit));
    }
}
