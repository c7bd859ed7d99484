use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;

use clap::Parser;
use log::{info, LevelFilter};
use log4rs::append::console::{ConsoleAppender, Target};
use log4rs::config::{Appender, Config, Root};
use log4rs::encode::pattern::PatternEncoder;

use madpixels::{raster, Category, ChannelSink, Effect, Options, PixelBuffer, Processor};

#[derive(Parser, Debug)]
#[command(name = "madpixels", version, about = "Shuffle, boost and blur the pixels of an image")]
struct Args {
    /// Source image; omit it for the gradient effect
    #[arg(value_name = "INPUT")]
    input: Option<PathBuf>,

    /// Where to write the result; format follows the extension
    #[arg(long, short, required_unless_present = "list")]
    output: Option<PathBuf>,

    /// Effect to apply, by slug or display name
    #[arg(short, long, default_value = "global-shuffle")]
    effect: Effect,

    /// JSON options file; flags below override its values
    #[arg(long)]
    options: Option<PathBuf>,

    /// Working width for shuffles and gradient
    #[arg(long)]
    width: Option<u32>,

    /// Working height for shuffles and gradient
    #[arg(long)]
    height: Option<u32>,

    #[arg(long)]
    block_size: Option<u32>,

    /// Local shuffle spread, as a fraction of a quarter of the longer side
    #[arg(long)]
    spread: Option<f32>,

    /// Blur kernel size; sigma is half of it
    #[arg(long)]
    kernel_size: Option<u32>,

    /// Boost factors as R,G,B
    #[arg(long, value_delimiter = ',')]
    boost: Option<Vec<f32>>,

    /// Seed for reproducible shuffles
    #[arg(long)]
    seed: Option<u64>,

    /// Never use the parallel engine
    #[arg(long)]
    cpu_only: bool,

    /// List effects and exit
    #[arg(long)]
    list: bool,

    /// Save the resolved options as JSON
    #[arg(long)]
    write_options: Option<PathBuf>,

    /// off, error, warn, info, debug or trace
    #[arg(long, default_value = "info")]
    log_level: String,
}

/// Console logging on stderr
fn init_logging(level: LevelFilter) -> Result<(), String> {
    let stderr = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(PatternEncoder::new("{d(%H:%M:%S%.3f)} {h({l:<5})} {m}{n}")))
        .build();
    let config = Config::builder()
        .appender(Appender::builder().build("stderr", Box::new(stderr)))
        .build(Root::builder().appender("stderr").build(level))
        .map_err(|e| e.to_string())?;
    log4rs::init_config(config).map_err(|e| e.to_string())?;
    Ok(())
}

fn print_effects() {
    for category in Category::ALL {
        println!("{}:", category.name());
        for effect in category.effects() {
            println!("  {:<22} {}", effect.slug(), effect.name());
        }
    }
}

/// Options file (or defaults) with command line overrides applied
fn resolve_options(args: &Args) -> Result<Options, String> {
    let mut options = match &args.options {
        Some(path) => Options::load(path).map_err(|e| format!("{}: {}", path.display(), e))?,
        None => Options::default(),
    };
    if let Some(width) = args.width {
        options.width = width;
    }
    if let Some(height) = args.height {
        options.height = height;
    }
    if let Some(block_size) = args.block_size {
        options.block_size = block_size;
    }
    if let Some(spread) = args.spread {
        options.spread = spread;
    }
    if let Some(kernel_size) = args.kernel_size {
        options.kernel_size = kernel_size;
    }
    if let Some(boost) = &args.boost {
        let [red, green, blue] = boost.as_slice() else {
            return Err(format!("--boost takes three values, got {}", boost.len()));
        };
        options = options.with_boost(*red, *green, *blue);
    }
    Ok(options)
}

fn main() -> Result<(), String> {
    let args = Args::parse();

    let level = args
        .log_level
        .parse::<LevelFilter>()
        .map_err(|e| format!("--log-level: {}", e))?;
    init_logging(level)?;

    if args.list {
        print_effects();
        return Ok(());
    }

    let Some(output) = &args.output else {
        return Err("--output is required".to_string());
    };

    let options = resolve_options(&args)?;
    if let Some(path) = &args.write_options {
        options.save(path).map_err(|e| format!("{}: {}", path.display(), e))?;
        info!("options written to {}", path.display());
    }

    let effect = args.effect;
    let source = match (&args.input, effect) {
        (_, Effect::Gradient) => PixelBuffer::with_size(0, 0),
        (Some(input), _) => {
            raster::open(input).map_err(|e| format!("{}: {}", input.display(), e))?
        },
        (None, _) => return Err(format!("{} needs an INPUT image", effect)),
    };

    let (sender, receiver) = mpsc::channel();
    let mut processor = if args.cpu_only {
        Processor::cpu_only()
    } else {
        Processor::new()
    };
    if let Some(seed) = args.seed {
        processor = processor.with_seed(seed);
    }
    let mut processor = processor.with_sink(ChannelSink::new(sender));
    info!("{} on {} engine", effect, processor.engine_for(effect));

    // The sender lives in the processor, so the channel closes when the
    // worker finishes
    let worker = thread::spawn(move || processor.apply_buffer(effect, &source, &options));

    let mut shown = -1;
    for fraction in receiver {
        let decile = (fraction * 10.0) as i32;
        if decile > shown {
            shown = decile;
            info!("{:>3}%", decile * 10);
        }
    }

    let result = worker
        .join()
        .map_err(|_| "worker thread panicked".to_string())?
        .map_err(|e| format!("{}: {}", effect, e))?;

    raster::save(&result, output).map_err(|e| format!("{}: {}", output.display(), e))?;
    info!(
        "wrote {}x{} to {}",
        result.width(),
        result.height(),
        output.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gradient_needs_no_input() {
        let args = Args::try_parse_from(["madpixels", "-e", "gradient", "-o", "out.png"]).unwrap();
        assert!(args.input.is_none());
        assert_eq!(args.effect, Effect::Gradient);
    }

    #[test]
    fn test_output_required_unless_listing() {
        assert!(Args::try_parse_from(["madpixels", "in.png"]).is_err());
        assert!(Args::try_parse_from(["madpixels", "--list"]).is_ok());
    }

    #[test]
    fn test_boost_override_takes_three_values() {
        let args =
            Args::try_parse_from(["madpixels", "in.png", "-o", "o.png", "--boost", "1,2,3"]).unwrap();
        assert_eq!(resolve_options(&args).unwrap().boost(), [1.0, 2.0, 3.0]);
        let args = Args::try_parse_from(["madpixels", "in.png", "-o", "o.png", "--boost", "1,2"]).unwrap();
        assert!(resolve_options(&args).is_err());
    }
}
